pub mod builder;
pub mod ordering;
