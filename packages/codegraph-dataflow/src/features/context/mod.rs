//! Analysis contexts and sessions
//!
//! An [`AnalysisContext`] is everything one fixpoint run depends on: the
//! procedure, the effective policy, and for callees the call frame and the
//! bound entry state. An [`AnalysisSession`] owns the client, the callee
//! resolver and the result cache, and is shared by every context it runs.

pub mod application;
pub mod domain;

pub use application::session::AnalysisSession;
pub use domain::analysis_context::{AnalysisContext, AnalysisContextBuilder};
