use crowdfund_domain::{AccountId, Amount, CampaignId, NewCampaign};
use serde::{Deserialize, Serialize};

/// State-changing contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    CreateCampaign(NewCampaign),
    Donate {
        id: CampaignId,
        amount: Amount,
    },
    Withdraw {
        id: CampaignId,
    },
    PayReward {
        id: CampaignId,
        donor: AccountId,
        amount: Amount,
    },
    RepayLoan {
        id: CampaignId,
        donor: AccountId,
        amount: Amount,
    },
    AddFeedback {
        id: CampaignId,
        message: String,
    },
}

impl Action {
    /// Contract function invoked by this action.
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::CreateCampaign(_) => "createCampaign",
            Self::Donate { .. } => "donateToCampaign",
            Self::Withdraw { .. } => "withdrawFunds",
            Self::PayReward { .. } => "payReward",
            Self::RepayLoan { .. } => "repayLoan",
            Self::AddFeedback { .. } => "addFeedback",
        }
    }

    pub fn campaign_id(&self) -> Option<CampaignId> {
        match self {
            Self::CreateCampaign(_) => None,
            Self::Donate { id, .. }
            | Self::Withdraw { id }
            | Self::PayReward { id, .. }
            | Self::RepayLoan { id, .. }
            | Self::AddFeedback { id, .. } => Some(*id),
        }
    }

    /// Payment attached to the transaction.
    pub fn value(&self) -> Amount {
        match self {
            Self::Donate { amount, .. }
            | Self::PayReward { amount, .. }
            | Self::RepayLoan { amount, .. } => *amount,
            _ => Amount::zero(),
        }
    }
}

/// Confirmation of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    /// Id assigned by a confirmed `CreateCampaign`, when the store reports it.
    pub created_campaign: Option<CampaignId>,
}
