//! Analysis result cache
//!
//! Results are memoized per [`CacheKey`]: graph identity, procedure symbol,
//! interprocedural policy, hazard tracking, predicate analysis, and (for
//! derived contexts) the call chain plus the bound argument state itself.
//! An order-independent fingerprint of that state is only its hash.
//!
//! Lookups are single-flight: concurrent requests for one key block on a
//! shared slot and observe the same `Arc`. Failed or cancelled runs leave
//! the slot empty.

pub mod result_cache;
pub mod types;

pub use result_cache::{CacheStats, ResultCache};
pub use types::{CacheKey, CallContextKey};
