use crowdfund_domain::{
    AccountId, Amount, Campaign, CampaignStatus, Donation, can_withdraw,
};
use serde::Serialize;

/// A campaign owned by the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedCampaign {
    pub campaign: Campaign,
    /// Status at dashboard time.
    pub status: CampaignStatus,
    /// Donors with their cumulative amounts.
    pub donations: Vec<Donation>,
    /// Whether the viewer may withdraw right now.
    pub can_withdraw: bool,
}

/// A campaign the viewer has donated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contribution {
    pub campaign: Campaign,
    pub status: CampaignStatus,
    /// Viewer's cumulative donation.
    pub amount: Amount,
}

/// Everything one account sees about its own activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub viewer: AccountId,
    pub owned: Vec<OwnedCampaign>,
    pub contributions: Vec<Contribution>,
    /// Seconds since epoch.
    pub generated_at: u64,
}

impl Dashboard {
    /// Creates an empty dashboard for `viewer`.
    pub fn new(viewer: AccountId, generated_at: u64) -> Self {
        Self {
            viewer,
            owned: Vec::new(),
            contributions: Vec::new(),
            generated_at,
        }
    }

    /// Adds a campaign owned by the viewer.
    pub fn add_owned(&mut self, campaign: Campaign, donations: Vec<Donation>) {
        let status = campaign.status(self.generated_at);
        let can_withdraw = can_withdraw(&campaign, &self.viewer, self.generated_at);
        self.owned.push(OwnedCampaign {
            campaign,
            status,
            donations,
            can_withdraw,
        });
    }

    /// Adds a contribution. Zero amounts are ignored.
    pub fn add_contribution(&mut self, campaign: Campaign, amount: Amount) {
        if amount.is_zero() {
            return;
        }
        let status = campaign.status(self.generated_at);
        self.contributions.push(Contribution {
            campaign,
            status,
            amount,
        });
    }

    /// Sum collected across owned campaigns.
    pub fn total_raised(&self) -> Amount {
        self.owned
            .iter()
            .map(|o| o.campaign.amount_collected)
            .fold(Amount::zero(), |acc, a| acc.checked_add(a).unwrap_or(acc))
    }

    /// Sum the viewer has donated.
    pub fn total_contributed(&self) -> Amount {
        self.contributions
            .iter()
            .map(|c| c.amount)
            .fold(Amount::zero(), |acc, a| acc.checked_add(a).unwrap_or(acc))
    }

    /// Owned campaigns the viewer can withdraw from now.
    pub fn withdrawable(&self) -> impl Iterator<Item = &OwnedCampaign> {
        self.owned.iter().filter(|o| o.can_withdraw)
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty() && self.contributions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdfund_domain::{CampaignId, CampaignType, Category};

    const NOW: u64 = 10_000;

    fn campaign(id: u64, owner: &str, collected: u64, target: u64) -> Campaign {
        Campaign {
            id: CampaignId(id),
            owner: AccountId::new(owner),
            title: format!("Campaign {id}"),
            description: String::new(),
            target: Amount::from(target),
            deadline: NOW + 100,
            amount_collected: Amount::from(collected),
            ended: false,
            funds_withdrawn: false,
            category: Category::Health,
            campaign_type: CampaignType::Donation,
            reward_percentage: 0,
        }
    }

    #[test]
    fn test_owned_campaign_flags() {
        let mut dashboard = Dashboard::new(AccountId::new("0xowner"), NOW);
        dashboard.add_owned(campaign(0, "0xowner", 50, 100), vec![]);
        dashboard.add_owned(campaign(1, "0xowner", 100, 100), vec![]);

        let ids: Vec<CampaignId> = dashboard.withdrawable().map(|o| o.campaign.id).collect();
        assert_eq!(ids, vec![CampaignId(1)]);
        assert_eq!(dashboard.total_raised(), Amount::from(150u64));
        assert_eq!(dashboard.owned[0].status, CampaignStatus::Active);
    }

    #[test]
    fn test_zero_contributions_are_skipped() {
        let mut dashboard = Dashboard::new(AccountId::new("0xdonor"), NOW);
        assert!(dashboard.is_empty());

        dashboard.add_contribution(campaign(0, "0xowner", 10, 100), Amount::zero());
        dashboard.add_contribution(campaign(1, "0xowner", 10, 100), Amount::from(7u64));

        assert_eq!(dashboard.contributions.len(), 1);
        assert_eq!(dashboard.total_contributed(), Amount::from(7u64));
    }
}
