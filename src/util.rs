pub mod bet;
pub mod json;
