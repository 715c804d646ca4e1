//! Port for locating callee graphs

use crate::features::flow_graph::{Procedure, SymbolId};
use std::sync::Arc;

/// Maps a call target to the procedure to analyze
///
/// `None` means no body is available (external or abstract methods); the
/// call is then treated as unresolved.
pub trait CalleeResolver: Send + Sync {
    fn resolve(&self, symbol: &SymbolId) -> Option<Arc<Procedure>>;
}
