//! Consumer-side model of the JSON schema.
//!
//! The device streams its schema as comma-joined member fragments with no
//! outer delimiters (so emission and fingerprinting stay incremental);
//! [`parse`] brackets the raw stream and deserializes it into typed members.
//! Host tooling uses this to map dot paths to endpoint ids before switching
//! to compact id-addressed packets.

use serde::Deserialize;

/// One member of the schema document.
///
/// Properties carry `id`/`access`; functions carry `inputs`/`outputs`;
/// objects carry `members` and no id of their own. Deserialize-only: the
/// device side emits the document by streaming, never through this model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchemaMember {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub id: Option<u16>,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub inputs: Vec<SchemaMember>,
    #[serde(default)]
    pub outputs: Vec<SchemaMember>,
    #[serde(default)]
    pub members: Vec<SchemaMember>,
}

/// Parse the raw schema byte stream as fetched from endpoint 0.
pub fn parse(raw: &[u8]) -> serde_json::Result<Vec<SchemaMember>> {
    let mut doc = Vec::with_capacity(raw.len() + 2);
    doc.push(b'[');
    doc.extend_from_slice(raw);
    doc.push(b']');
    serde_json::from_slice(&doc)
}

/// Resolve a dot-separated path to an endpoint id, peeling one segment per
/// object level. Matches the device-side id assignment by construction.
pub fn resolve_id(members: &[SchemaMember], path: &str) -> Option<u16> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    for member in members {
        if member.name != head {
            continue;
        }
        match rest {
            None => return member.id,
            Some(rest) if member.ty == "object" => return resolve_id(&member.members, rest),
            Some(_) => {}
        }
    }
    None
}

// ── Tests ────────────────────────────────────────────────────
