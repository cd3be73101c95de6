//! Callable function endpoints with nested argument endpoints.
//!
//! A function's inputs and outputs are ordinary [`Property`] endpoints over
//! argument cells, occupying the ids immediately after the function's own id
//! (inputs first, then outputs). A caller therefore sets inputs, invokes, and
//! reads outputs through the exact same dispatch mechanism as any property —
//! three distinct steps or one pipelined exchange.
//!
//! Invocation itself is a boxed closure capturing the argument cells, which
//! reads inputs, calls the bound method, and stores results into the output
//! cells. This keeps argument marshaling table-driven with no type punning.

use core::fmt::Write as _;
use std::sync::Arc;

use crate::codec::WireValue;
use crate::endpoint::property::{Property, ValueCell};
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::sink::{write_all, ByteSink, FmtSink};

/// Create one named argument: a shared cell plus its endpoint.
///
/// The cell clone goes into the invocation closure; the endpoint goes into
/// the function's input or output list.
pub fn arg<T>(name: impl Into<String>) -> (ValueCell<T>, Arc<dyn Endpoint>)
where
    T: WireValue + core::fmt::Display + core::str::FromStr,
{
    let cell = ValueCell::new(T::default());
    let endpoint: Arc<dyn Endpoint> = Arc::new(Property::read_write(name, cell.clone()));
    (cell, endpoint)
}

/// A function endpoint bound to one object's method.
pub struct Function {
    name: String,
    n_inputs: usize,
    /// Inputs first, then outputs — the id assignment order.
    children: Vec<Arc<dyn Endpoint>>,
    invoke: Box<dyn Fn() + Send + Sync>,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Arc<dyn Endpoint>>,
        outputs: Vec<Arc<dyn Endpoint>>,
        invoke: Box<dyn Fn() + Send + Sync>,
    ) -> Self {
        let n_inputs = inputs.len();
        let mut children = inputs;
        children.extend(outputs);
        Self {
            name: name.into(),
            n_inputs,
            children,
            invoke,
        }
    }

    fn inputs(&self) -> &[Arc<dyn Endpoint>] {
        &self.children[..self.n_inputs]
    }

    fn outputs(&self) -> &[Arc<dyn Endpoint>] {
        &self.children[self.n_inputs..]
    }

    fn describe_args(
        args: &[Arc<dyn Endpoint>],
        mut id: usize,
        out: &mut dyn ByteSink,
    ) -> Result<()> {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                write_all(out, b",")?;
            }
            arg.describe(id, out)?;
            id += arg.endpoint_count();
        }
        Ok(())
    }
}

impl Endpoint for Function {
    fn name(&self) -> &str {
        &self.name
    }

    fn children(&self) -> &[Arc<dyn Endpoint>] {
        &self.children
    }

    fn describe(&self, id: usize, out: &mut dyn ByteSink) -> Result<()> {
        let mut w = FmtSink::new(out);
        let _ = write!(
            w,
            "{{\"name\":\"{}\",\"id\":{},\"type\":\"function\",\"inputs\":[",
            self.name, id,
        );
        w.finish()?;

        Self::describe_args(self.inputs(), id + 1, out)?;
        write_all(out, b"],\"outputs\":[")?;

        let outputs_first_id = id + 1 + self.inputs().iter().map(|a| a.endpoint_count()).sum::<usize>();
        Self::describe_args(self.outputs(), outputs_first_id, out)?;
        write_all(out, b"]}")
    }

    fn handle(&self, _input: &[u8], _output: Option<&mut dyn ByteSink>) {
        // The function endpoint carries no payload of its own; arguments are
        // dispatched through their nested endpoints.
        (self.invoke)();
    }
}

// ── Tests ────────────────────────────────────────────────────
