//! Remote store boundary for the crowdfunding contract.
//!
//! This crate provides:
//! - The `RemoteStore` read interface and `TransactionCoordinator` write interface
//! - Decoding of positional contract tuples into named records
//! - A JSON-RPC gateway client
//! - An in-memory ledger emulating the contract

/// Prelude module for convenient imports.
pub mod prelude;

/// Transaction actions and receipts.
pub mod action;
/// Wire decoding of contract responses.
pub mod codec;
/// Error types.
pub mod error;
/// In-memory contract emulation.
pub mod memory;
/// JSON-RPC gateway client.
pub mod rpc;

use action::{Action, Receipt};
use async_trait::async_trait;
use crowdfund_domain::{AccountId, Amount, Campaign, CampaignId, Feedback};
use error::StoreError;

/// Side-effect free reads against the contract.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn campaign_count(&self) -> Result<u64, StoreError>;

    /// Fails with `StoreError::NotFound` when no campaign exists at `id`.
    async fn campaign_detail(&self, id: CampaignId) -> Result<Campaign, StoreError>;

    async fn donation_amount(
        &self,
        id: CampaignId,
        donor: &AccountId,
    ) -> Result<Amount, StoreError>;

    async fn campaign_donors(&self, id: CampaignId) -> Result<Vec<AccountId>, StoreError>;

    async fn feedback(&self, id: CampaignId) -> Result<Vec<Feedback>, StoreError>;
}

/// Signs and submits state-changing actions, resolving once confirmed.
#[async_trait]
pub trait TransactionCoordinator: Send + Sync {
    /// Account the coordinator signs with.
    fn signer(&self) -> AccountId;

    async fn submit(&self, action: Action) -> Result<Receipt, StoreError>;
}
