pub mod call_frame;
pub mod policy;
