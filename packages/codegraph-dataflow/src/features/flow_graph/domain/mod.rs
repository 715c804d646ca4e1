pub mod cfg;
pub mod operation;
pub mod procedure;
