//! Status derivation and eligibility predicates.
//!
//! All functions are pure over a snapshot and a caller-supplied `now`
//! (seconds since epoch).

use crate::entities::{AccountId, Campaign};
use crate::enums::{CampaignStatus, CampaignType};

/// Derives the lifecycle stage of a campaign at `now`.
///
/// `now == deadline` counts as ended.
pub fn derive_status(campaign: &Campaign, now: u64) -> CampaignStatus {
    if campaign.funds_withdrawn {
        CampaignStatus::Withdrawn
    } else if campaign.ended || now >= campaign.deadline {
        CampaignStatus::Ended
    } else {
        CampaignStatus::Active
    }
}

pub fn can_donate(campaign: &Campaign, now: u64) -> bool {
    derive_status(campaign, now) == CampaignStatus::Active
}

/// Owner may withdraw once the campaign ended, or early when the target is met.
pub fn can_withdraw(campaign: &Campaign, viewer: &AccountId, now: u64) -> bool {
    if !campaign.is_owned_by(viewer) {
        return false;
    }

    match derive_status(campaign, now) {
        CampaignStatus::Withdrawn => false,
        CampaignStatus::Ended => true,
        CampaignStatus::Active => campaign.target_met(),
    }
}

/// Owner-side settlement actions of the extended campaign variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideAction {
    PayReward,
    RepayLoan,
}

impl SideAction {
    pub fn campaign_type(&self) -> CampaignType {
        match self {
            Self::PayReward => CampaignType::Reward,
            Self::RepayLoan => CampaignType::Lending,
        }
    }
}

/// Whether `viewer` may trigger `action` on `campaign`.
///
/// Only ownership and campaign type are checked; payout rules belong to
/// the remote store.
pub fn can_settle(campaign: &Campaign, viewer: &AccountId, action: SideAction) -> bool {
    campaign.is_owned_by(viewer) && campaign.campaign_type == action.campaign_type()
}
