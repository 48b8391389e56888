//! The NeaxScript interpreter.
//!
//! A script is one statement:
//!
//!   [<modifier> ]<command>::<target> [<arg> ...] [--flag[ <value>]] ...
//!
//! Before the statement is parsed, `%name%` placeholders are replaced from the invocation
//! input and every `neax[<script>]` span is replaced by the output of that script.
//!
//! Examples:
//!   "print::self hello world"          -> print, target = sender, args = [hello, world]
//!   "rise uget::100012 money --json"   -> modifier rise, uget, flags = {json}
//!   "print::self neax[num:: 10]"       -> print::self 10

use serde::Serialize;
use std::fmt;

pub mod chunks;
pub mod engine;
pub mod fault;
pub mod inline;
pub mod lexer;
pub mod permission;
pub mod statement;
pub mod vars;

pub use chunks::Emitter;
pub use engine::Interpreter;
pub use fault::Fault;
pub use lexer::ArgList;
pub use permission::{Permission, Predicate};

/// Terminal outcome of an evaluation. Exactly one ends every invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Code {
    Success = 0,
    MalformedInput = 1,
    PermissionNeedRise = 2,
    ExecError = 3,
    MissingOrInvalidArgs = 4,
    CommandNotImplemented = 5,
    DepError = 6,
    CommandNotFound = 127,
}

impl Code {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Code::Success => "Success",
            Code::MalformedInput => "MalformedInput",
            Code::PermissionNeedRise => "PermissionNeedRise",
            Code::ExecError => "ExecError",
            Code::MissingOrInvalidArgs => "MissingOrInvalidArgs",
            Code::CommandNotImplemented => "CommandNotImplemented",
            Code::DepError => "DepError",
            Code::CommandNotFound => "CommandNotFound",
        }
    }

    pub fn is_success(self) -> bool {
        self == Code::Success
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `result` holds every chunk emitted before execution stopped, newline-joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub code: Code,
    pub result: String,
}

impl Evaluation {
    pub fn new(code: Code, result: impl Into<String>) -> Self {
        Self {
            code,
            result: result.into(),
        }
    }
}

/// How the engine delivers chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every chunk goes to the sink as soon as it is produced.
    Streaming,
    /// Chunks are composed into one string; the sink sees it once at the end.
    Buffered,
}

/// Receives output from the engine. Called synchronously, in production order.
pub trait Sink: Send {
    fn send(&mut self, chunk: &str);
}

impl<F> Sink for F
where
    F: FnMut(&str) + Send,
{
    fn send(&mut self, chunk: &str) {
        self(chunk)
    }
}

/// Discards everything, used for inline sub-invocations.
pub struct NullSink;

impl Sink for NullSink {
    fn send(&mut self, _chunk: &str) {}
}
