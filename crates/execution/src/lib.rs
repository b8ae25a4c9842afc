//! Client-side campaign state synchronization.
//!
//! This crate keeps a local view of crowdfunding campaigns consistent with
//! the remote store:
//! - Campaign refresh with partial-failure tolerance
//! - Per-campaign cache with sync bookkeeping
//! - Mutations with local precondition checks and re-read after confirmation
//! - User dashboard assembly

/// Prelude module for convenient imports.
pub mod prelude;

/// User dashboard.
pub mod dashboard;
/// Error types.
pub mod error;
/// State synchronization.
pub mod sync;
