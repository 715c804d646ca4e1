//! Interprocedural call handling
//!
//! At an invocation the engine asks [`InterproceduralForker::decide`]
//! whether to analyze the callee in a derived context:
//!
//! - **Disabled**: policy kind `None` and the target is an ordinary method
//! - **Unresolved**: the [`CalleeResolver`] has no graph for the target
//! - **Recursive**: the callee is already on the call chain
//! - **ChainLimit**: the method or lambda chain bound is reached
//!
//! Skipped calls fall back to `unknown()` for the result and, when the
//! policy is pessimistic, reset argument and receiver state.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::forker::{CallDecision, InterproceduralForker, SkipReason};
pub use domain::call_frame::CallFrame;
pub use domain::policy::{InterproceduralKind, InterproceduralPolicy};
pub use infrastructure::registry::ProcedureRegistry;
pub use ports::CalleeResolver;
