pub mod laws;
