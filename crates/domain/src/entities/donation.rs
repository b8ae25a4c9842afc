use crate::entities::account::AccountId;
use crate::value_objects::amount::Amount;
use serde::{Deserialize, Serialize};

/// Cumulative contribution of one donor to one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub donor: AccountId,
    pub amount: Amount,
}

/// Comment left on a campaign by its owner or a donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub user: AccountId,
    pub message: String,
    /// Seconds since epoch.
    pub timestamp: u64,
}
