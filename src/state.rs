pub mod input;
pub mod registry;
