use crate::util::json::{INSPECT_DEPTH, inspect};
use serde_json::Value;
use std::error::Error;
use std::fmt;

/// Fixed message of every permission failure.
pub const NOT_ALLOWED: &str = "Neax::PermissionNeedRise";

/// A fault caught at the engine boundary, in the shape it is reported to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// A structured error: its kind and its message followed by the cause chain
    Error { name: String, trace: String },
    /// A plain text problem (also used for panics)
    Problem(String),
    /// Arbitrary data attached to a failure
    Data(Value),
}

impl Fault {
    pub fn from_error(name: impl Into<String>, err: &(dyn Error + 'static)) -> Self {
        let mut trace = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            trace.push_str(&format!("\n    caused by: {cause}"));
            source = cause.source();
        }
        Fault::Error {
            name: name.into(),
            trace,
        }
    }

    pub fn problem(text: impl Into<String>) -> Self {
        Fault::Problem(text.into())
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Error { name, trace } => write!(f, "Neax::{name} =\n\n{trace}"),
            Fault::Problem(text) => write!(f, "Neax::Problem = {text}"),
            Fault::Data(data) => write!(f, "Neax::ProblemData =:\n\n{}", inspect(data, INSPECT_DEPTH)),
        }
    }
}
