pub mod cancellation;
pub mod result;
