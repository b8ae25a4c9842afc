//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use crowdfund_protocols::prelude::*;
//! ```

pub use crate::action::{Action, Receipt};
pub use crate::error::StoreError;
pub use crate::memory::InMemoryLedger;
pub use crate::rpc::{JsonRpcStore, RpcConfig};
pub use crate::{RemoteStore, TransactionCoordinator};
