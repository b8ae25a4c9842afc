//! In-memory emulation of the crowdfunding contract.
//!
//! Enforces the contract's preconditions with its revert reasons, which
//! makes it usable as a local store for development and tests. Clones
//! share state; `as_signer` switches the acting account.

use crate::action::{Action, Receipt};
use crate::codec::{self, RawCampaign};
use crate::error::StoreError;
use crate::{RemoteStore, TransactionCoordinator};
use async_trait::async_trait;
use crowdfund_domain::{
    AccountId, Amount, Campaign, CampaignId, CampaignType, Clock, Feedback, NewCampaign,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct LedgerCampaign {
    owner: AccountId,
    params: NewCampaign,
    amount_collected: Amount,
    ended: bool,
    funds_withdrawn: bool,
    donors: Vec<AccountId>,
    donations: HashMap<AccountId, Amount>,
    feedback: Vec<Feedback>,
}

impl LedgerCampaign {
    fn raw(&self) -> RawCampaign {
        (
            self.owner.to_string(),
            self.params.title.clone(),
            self.params.description.clone(),
            self.params.target.raw(),
            self.params.deadline,
            self.amount_collected.raw(),
            self.ended,
            self.funds_withdrawn,
            self.params.category.index(),
            self.params.campaign_type.index(),
            self.params.reward_percentage,
        )
    }

    fn donation_of(&self, donor: &AccountId) -> Amount {
        self.donations.get(donor).copied().unwrap_or_else(Amount::zero)
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    campaigns: Vec<LedgerCampaign>,
    block_number: u64,
    offline: bool,
    failing_details: HashSet<CampaignId>,
    submissions: u64,
}

impl LedgerState {
    fn campaign(&self, id: CampaignId) -> Result<&LedgerCampaign, StoreError> {
        usize::try_from(id.0)
            .ok()
            .and_then(|i| self.campaigns.get(i))
            .ok_or(StoreError::NotFound(id))
    }

    fn campaign_mut(&mut self, id: CampaignId) -> Result<&mut LedgerCampaign, StoreError> {
        usize::try_from(id.0)
            .ok()
            .and_then(|i| self.campaigns.get_mut(i))
            .ok_or(StoreError::NotFound(id))
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::Network("ledger unreachable".into()))
        } else {
            Ok(())
        }
    }
}

fn revert(reason: &str) -> StoreError {
    StoreError::Rejected(reason.to_string())
}

/// Contract emulation implementing both the read and write interfaces.
#[derive(Clone)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
    clock: Arc<dyn Clock>,
    signer: AccountId,
}

impl InMemoryLedger {
    /// Creates an empty ledger acting as `signer`.
    pub fn new(clock: Arc<dyn Clock>, signer: AccountId) -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
            clock,
            signer,
        }
    }

    /// Handle on the same ledger acting as another account.
    #[must_use]
    pub fn as_signer(&self, signer: AccountId) -> Self {
        Self {
            state: self.state.clone(),
            clock: self.clock.clone(),
            signer,
        }
    }

    /// Makes every call fail with a network error while set.
    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.offline = offline;
    }

    /// Makes detail reads of `id` fail with a network error.
    pub async fn fail_detail(&self, id: CampaignId, failing: bool) {
        let mut state = self.state.write().await;
        if failing {
            state.failing_details.insert(id);
        } else {
            state.failing_details.remove(&id);
        }
    }

    /// Sets the contract-side `ended` flag, independent of the deadline.
    pub async fn force_end(&self, id: CampaignId) -> Result<(), StoreError> {
        self.state.write().await.campaign_mut(id)?.ended = true;
        Ok(())
    }

    /// Number of transactions accepted so far.
    pub async fn submission_count(&self) -> u64 {
        self.state.read().await.submissions
    }

    fn apply(&self, state: &mut LedgerState, action: Action) -> Result<Option<CampaignId>, StoreError> {
        let now = self.clock.now();
        let sender = &self.signer;

        match action {
            Action::CreateCampaign(params) => {
                if params.deadline <= now {
                    return Err(revert("Deadline must be in the future"));
                }
                let id = CampaignId(state.campaigns.len() as u64);
                state.campaigns.push(LedgerCampaign {
                    owner: sender.clone(),
                    params,
                    amount_collected: Amount::zero(),
                    ended: false,
                    funds_withdrawn: false,
                    donors: Vec::new(),
                    donations: HashMap::new(),
                    feedback: Vec::new(),
                });
                Ok(Some(id))
            }
            Action::Donate { id, amount } => {
                let campaign = state.campaign_mut(id)?;
                if campaign.ended || campaign.funds_withdrawn {
                    return Err(revert("Campaign has ended"));
                }
                if now >= campaign.params.deadline {
                    return Err(revert("Campaign deadline has passed"));
                }
                if amount.is_zero() {
                    return Err(revert("Donation amount must be greater than 0"));
                }

                let collected = campaign
                    .amount_collected
                    .checked_add(amount)
                    .ok_or_else(|| revert("Arithmetic overflow"))?;
                let donated = campaign
                    .donation_of(sender)
                    .checked_add(amount)
                    .ok_or_else(|| revert("Arithmetic overflow"))?;
                if !campaign.donors.contains(sender) {
                    campaign.donors.push(sender.clone());
                }
                campaign.amount_collected = collected;
                campaign.donations.insert(sender.clone(), donated);
                campaign.feedback.push(Feedback {
                    user: sender.clone(),
                    message: format!("Donation of {} ETH received", amount.format_ether()),
                    timestamp: now,
                });
                Ok(None)
            }
            Action::Withdraw { id } => {
                let campaign = state.campaign_mut(id)?;
                if &campaign.owner != sender {
                    return Err(revert("Only the campaign owner can withdraw funds"));
                }
                if campaign.funds_withdrawn {
                    return Err(revert("Funds have already been withdrawn"));
                }
                if now < campaign.params.deadline
                    && !campaign.ended
                    && campaign.amount_collected < campaign.params.target
                {
                    return Err(revert(
                        "Cannot withdraw before deadline unless target is met",
                    ));
                }
                campaign.funds_withdrawn = true;
                campaign.ended = true;
                Ok(None)
            }
            Action::PayReward { id, donor, amount } => {
                let campaign = state.campaign_mut(id)?;
                if &campaign.owner != sender {
                    return Err(revert("Only the campaign owner can pay rewards"));
                }
                if campaign.params.campaign_type != CampaignType::Reward {
                    return Err(revert("This is not a reward-based campaign"));
                }
                if campaign.donation_of(&donor).is_zero() || amount.is_zero() {
                    return Err(revert("No reward due to this donor"));
                }
                Ok(None)
            }
            Action::RepayLoan { id, donor, amount } => {
                let campaign = state.campaign_mut(id)?;
                if &campaign.owner != sender {
                    return Err(revert("Only the campaign owner can repay loans"));
                }
                if campaign.params.campaign_type != CampaignType::Lending {
                    return Err(revert("This is not a lending-based campaign"));
                }
                let outstanding = campaign.donation_of(&donor);
                if outstanding.is_zero() || amount != outstanding {
                    return Err(revert("Repayment must match the outstanding loan"));
                }
                campaign.donations.insert(donor, Amount::zero());
                Ok(None)
            }
            Action::AddFeedback { id, message } => {
                let campaign = state.campaign_mut(id)?;
                if &campaign.owner != sender && !campaign.donors.contains(sender) {
                    return Err(revert("Only the owner or donors can add feedback"));
                }
                campaign.feedback.push(Feedback {
                    user: sender.clone(),
                    message,
                    timestamp: now,
                });
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl RemoteStore for InMemoryLedger {
    async fn campaign_count(&self) -> Result<u64, StoreError> {
        let state = self.state.read().await;
        state.check_online()?;
        Ok(state.campaigns.len() as u64)
    }

    async fn campaign_detail(&self, id: CampaignId) -> Result<Campaign, StoreError> {
        let raw = {
            let state = self.state.read().await;
            state.check_online()?;
            if state.failing_details.contains(&id) {
                return Err(StoreError::Network(format!("detail read for {id} timed out")));
            }
            state.campaign(id)?.raw()
        };
        codec::campaign_from_tuple(id, raw)
    }

    async fn donation_amount(
        &self,
        id: CampaignId,
        donor: &AccountId,
    ) -> Result<Amount, StoreError> {
        let state = self.state.read().await;
        state.check_online()?;
        Ok(state.campaign(id)?.donation_of(donor))
    }

    async fn campaign_donors(&self, id: CampaignId) -> Result<Vec<AccountId>, StoreError> {
        let state = self.state.read().await;
        state.check_online()?;
        Ok(state.campaign(id)?.donors.clone())
    }

    async fn feedback(&self, id: CampaignId) -> Result<Vec<Feedback>, StoreError> {
        let state = self.state.read().await;
        state.check_online()?;
        Ok(state.campaign(id)?.feedback.clone())
    }
}

#[async_trait]
impl TransactionCoordinator for InMemoryLedger {
    fn signer(&self) -> AccountId {
        self.signer.clone()
    }

    async fn submit(&self, action: Action) -> Result<Receipt, StoreError> {
        let mut state = self.state.write().await;
        state.check_online()?;

        let function = action.function_name();
        let created_campaign = self.apply(&mut state, action)?;

        state.block_number += 1;
        state.submissions += 1;
        let receipt = Receipt {
            tx_hash: format!("0x{}", uuid::Uuid::new_v4().simple()),
            block_number: Some(state.block_number),
            created_campaign,
        };

        debug!(function, signer = %self.signer, block = state.block_number, "Ledger accepted transaction");
        if let Some(id) = created_campaign {
            info!(campaign = %id, "Ledger created campaign");
        }

        Ok(receipt)
    }
}
