//! State synchronization with the remote store.
//!
//! Provides:
//! - A per-campaign cache with sync bookkeeping
//! - The view-state synchronizer driving reads and mutations

mod cache;
mod synchronizer;

pub use cache::*;
pub use synchronizer::*;
