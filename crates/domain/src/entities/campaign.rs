use crate::countdown::TimeRemaining;
use crate::entities::account::AccountId;
use crate::enums::{CampaignStatus, CampaignType, Category};
use crate::error::DomainError;
use crate::lifecycle::derive_status;
use crate::value_objects::{amount::Amount, percentage::Percentage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal campaign identifier assigned by the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub u64);

impl From<u64> for CampaignId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Local snapshot of a campaign as last read from the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub owner: AccountId,
    pub title: String,
    pub description: String,
    pub target: Amount,
    /// Seconds since epoch.
    pub deadline: u64,
    pub amount_collected: Amount,
    pub ended: bool,
    pub funds_withdrawn: bool,
    pub category: Category,
    pub campaign_type: CampaignType,
    pub reward_percentage: u8,
}

impl Campaign {
    pub fn status(&self, now: u64) -> CampaignStatus {
        derive_status(self, now)
    }

    pub fn is_owned_by(&self, account: &AccountId) -> bool {
        &self.owner == account
    }

    pub fn target_met(&self) -> bool {
        self.amount_collected >= self.target
    }

    pub fn progress(&self) -> Percentage {
        Percentage::of_ratio(self.amount_collected, self.target)
    }

    pub fn time_remaining(&self, now: u64) -> Option<TimeRemaining> {
        if self.ended || self.funds_withdrawn {
            return None;
        }
        TimeRemaining::until(self.deadline, now)
    }
}

/// Parameters for creating a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCampaign {
    pub title: String,
    pub description: String,
    pub target: Amount,
    pub deadline: u64,
    pub category: Category,
    pub campaign_type: CampaignType,
    pub reward_percentage: u8,
}

impl NewCampaign {
    /// Checks the preconditions the contract would otherwise revert on.
    pub fn validate(&self, now: u64) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::InvalidCampaign("title must not be empty".into()));
        }
        if self.target.is_zero() {
            return Err(DomainError::InvalidCampaign(
                "target must be greater than zero".into(),
            ));
        }
        if self.deadline <= now {
            return Err(DomainError::InvalidCampaign(
                "deadline must be in the future".into(),
            ));
        }
        if self.reward_percentage > 100 {
            return Err(DomainError::InvalidCampaign(format!(
                "reward percentage {} exceeds 100",
                self.reward_percentage
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_campaign(deadline: u64) -> NewCampaign {
        NewCampaign {
            title: "Solar roof".into(),
            description: "Panels for the community hall".into(),
            target: Amount::from(1_000u64),
            deadline,
            category: Category::Environment,
            campaign_type: CampaignType::Donation,
            reward_percentage: 0,
        }
    }

    #[test]
    fn test_new_campaign_validation() {
        assert!(new_campaign(2_000).validate(1_000).is_ok());
        assert!(new_campaign(1_000).validate(1_000).is_err());

        let mut untitled = new_campaign(2_000);
        untitled.title = "   ".into();
        assert!(untitled.validate(1_000).is_err());

        let mut zero_target = new_campaign(2_000);
        zero_target.target = Amount::zero();
        assert!(zero_target.validate(1_000).is_err());

        let mut generous = new_campaign(2_000);
        generous.campaign_type = CampaignType::Reward;
        generous.reward_percentage = 101;
        assert!(generous.validate(1_000).is_err());
    }

    #[test]
    fn test_campaign_id_display() {
        assert_eq!(CampaignId(7).to_string(), "#7");
    }
}
