use crowdfund_domain::CampaignId;
use thiserror::Error;

/// Failures reaching or talking to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Transport failure; the request may not have reached the store.
    #[error("network error: {0}")]
    Network(String),

    /// The store refused the request. Carries the store's reason verbatim.
    #[error("remote rejected: {0}")]
    Rejected(String),

    #[error("campaign {0} not found")]
    NotFound(CampaignId),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
