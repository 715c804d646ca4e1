//! Shared module - Common types used across features

pub mod models;

pub use models::*;
