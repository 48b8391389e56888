pub mod commands;
pub mod config;
pub mod error;
pub mod script;
pub mod services;
pub mod state;
pub mod store;
pub mod util;

// Convenient re-exports (so call sites can do `neax::Interpreter`, etc.)
pub use script::{Code, Evaluation, Interpreter, Mode, Sink};
pub use state::{input::Input, registry::Registry};
