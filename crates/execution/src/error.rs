use crowdfund_domain::{CampaignId, DomainError};
use crowdfund_protocols::error::StoreError;
use thiserror::Error;

/// Errors surfaced by the synchronizer. None are retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A local precondition failed; nothing was sent to the remote store.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("campaign {0} not found")]
    NotFound(CampaignId),

    /// The remote store refused the request, with its reason verbatim.
    #[error("remote rejected: {0}")]
    RemoteRejected(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl SyncError {
    /// True only for transport failures.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Network(msg) => Self::Network(msg),
            StoreError::Rejected(reason) => Self::RemoteRejected(reason),
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::InvalidResponse(msg) => Self::InvalidResponse(msg),
        }
    }
}

impl From<DomainError> for SyncError {
    fn from(e: DomainError) -> Self {
        Self::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        assert_eq!(
            SyncError::from(StoreError::Rejected("Campaign has ended".into())),
            SyncError::RemoteRejected("Campaign has ended".into())
        );
        assert_eq!(
            SyncError::from(StoreError::NotFound(CampaignId(4))),
            SyncError::NotFound(CampaignId(4))
        );
    }

    #[test]
    fn test_only_network_errors_are_retryable() {
        assert!(SyncError::Network("reset".into()).is_retryable());
        assert!(!SyncError::RemoteRejected("no".into()).is_retryable());
        assert!(!SyncError::Validation("no".into()).is_retryable());
        assert!(!SyncError::NotFound(CampaignId(0)).is_retryable());
    }
}
