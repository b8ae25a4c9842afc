//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use crowdfund_execution::prelude::*;
//! ```

// Dashboard
pub use crate::dashboard::{Contribution, Dashboard, OwnedCampaign};

// Errors
pub use crate::error::SyncError;

// Sync
pub use crate::sync::{
    CacheEntry, CampaignCache, MutationOutcome, SyncStatus, SynchronizerConfig,
    ViewStateSynchronizer,
};
