//! Canonical wire codec for primitive scalar values.
//!
//! Fixed-width little-endian encoding: every type occupies exactly its
//! in-memory width (1/2/4/8 bytes), floats travel as the bit pattern of a
//! 32-bit IEEE-754 value. There is no error case — callers guarantee buffers
//! of at least [`WireType::width`] bytes, and `decode(encode(v)) == v` for
//! every representable `v`.

use core::fmt;

/// Wire-level type tag for a primitive scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Bool,
    Uint8,
    Int8,
    Uint16,
    Int16,
    Uint32,
    Int32,
    Uint64,
    Int64,
    Float,
}

impl WireType {
    /// Encoded width in bytes.
    pub const fn width(self) -> usize {
        match self {
            Self::Bool | Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 => 2,
            Self::Uint32 | Self::Int32 | Self::Float => 4,
            Self::Uint64 | Self::Int64 => 8,
        }
    }

    /// Type name as it appears in the JSON schema.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Uint32 => "uint32",
            Self::Int32 => "int32",
            Self::Uint64 => "uint64",
            Self::Int64 => "int64",
            Self::Float => "float",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Widest encoded value; scratch buffers of this size fit every type.
pub const MAX_VALUE_WIDTH: usize = 8;

/// A primitive value with a canonical fixed-width little-endian encoding.
///
/// Enumerations are exposed through their underlying integer type rather
/// than implementing this trait directly.
pub trait WireValue: Copy + Default + Send + Sync + 'static {
    /// Wire type tag (determines width and schema name).
    const TYPE: WireType;

    /// Encode into `out` (caller guarantees `out.len() >= TYPE.width()`).
    /// Returns the number of bytes written.
    fn write_le(self, out: &mut [u8]) -> usize;

    /// Decode from `bytes` (caller guarantees `bytes.len() >= TYPE.width()`).
    fn read_le(bytes: &[u8]) -> Self;
}

impl WireValue for bool {
    const TYPE: WireType = WireType::Bool;

    fn write_le(self, out: &mut [u8]) -> usize {
        out[0] = u8::from(self);
        1
    }

    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

macro_rules! impl_wire_int {
    ($($ty:ty => $tag:ident),* $(,)?) => {$(
        impl WireValue for $ty {
            const TYPE: WireType = WireType::$tag;

            fn write_le(self, out: &mut [u8]) -> usize {
                let bytes = self.to_le_bytes();
                out[..bytes.len()].copy_from_slice(&bytes);
                bytes.len()
            }

            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..size_of::<$ty>()]);
                Self::from_le_bytes(raw)
            }
        }
    )*};
}

impl_wire_int! {
    u8 => Uint8,
    i8 => Int8,
    u16 => Uint16,
    i16 => Int16,
    u32 => Uint32,
    i32 => Int32,
    u64 => Uint64,
    i64 => Int64,
}

impl WireValue for f32 {
    const TYPE: WireType = WireType::Float;

    fn write_le(self, out: &mut [u8]) -> usize {
        self.to_bits().write_le(out)
    }

    fn read_le(bytes: &[u8]) -> Self {
        Self::from_bits(u32::read_le(bytes))
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: WireValue + PartialEq + core::fmt::Debug>(value: T) {
        let mut buf = [0u8; MAX_VALUE_WIDTH];
        let n = value.write_le(&mut buf);
        assert_eq!(n, T::TYPE.width());
        assert_eq!(T::read_le(&buf), value);
    }

    #[test]
    fn round_trips() {
        round_trip(true);
        round_trip(false);
        round_trip(0xA5u8);
        round_trip(-7i8);
        round_trip(0xBEEFu16);
        round_trip(-12345i16);
        round_trip(0xDEAD_BEEFu32);
        round_trip(i32::MIN);
        round_trip(u64::MAX);
        round_trip(i64::MIN + 1);
        round_trip(1.5f32);
        round_trip(-0.0f32);
    }

    #[test]
    fn encoding_is_little_endian() {
        let mut buf = [0u8; 4];
        42u32.write_le(&mut buf);
        assert_eq!(buf, [0x2A, 0x00, 0x00, 0x00]);

        1.0f32.write_le(&mut buf);
        assert_eq!(buf, [0x00, 0x00, 0x80, 0x3F]);
    }

    #[test]
    fn bool_decodes_any_nonzero_as_true() {
        assert!(bool::read_le(&[0x02]));
        assert!(!bool::read_le(&[0x00]));
    }

    #[test]
    fn nan_bit_pattern_survives() {
        let nan = f32::from_bits(0x7FC0_0001);
        let mut buf = [0u8; 4];
        nan.write_le(&mut buf);
        assert_eq!(f32::read_le(&buf).to_bits(), nan.to_bits());
    }
}
