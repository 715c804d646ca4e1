pub mod finding;
pub mod rule;
pub mod value;
