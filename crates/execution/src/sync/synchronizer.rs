//! View-state synchronizer.
//!
//! Reads campaigns from the remote store into the local cache and routes
//! mutations through the transaction coordinator. After a confirmed
//! mutation the affected campaign is re-read; the local view is never
//! updated optimistically.

use super::{CacheEntry, CampaignCache};
use crate::dashboard::Dashboard;
use crate::error::SyncError;
use crowdfund_domain::{
    AccountId, Amount, Campaign, CampaignId, CampaignStatus, Clock, Donation, Feedback,
    NewCampaign, SideAction, can_donate, can_settle, can_withdraw,
};
use crowdfund_protocols::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Configuration for the synchronizer.
#[derive(Debug, Clone)]
pub struct SynchronizerConfig {
    /// Fetch campaign details concurrently during a full refresh.
    pub concurrent_refresh: bool,
    /// Interval of the background refresh loop in seconds.
    pub refresh_interval_secs: u64,
    /// Age after which a cached snapshot is reported stale in seconds.
    pub max_age_secs: u64,
    /// Consecutive failed refreshes before an entry is marked failed.
    pub max_failures: u32,
}

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            concurrent_refresh: true,
            refresh_interval_secs: 30,
            max_age_secs: 60,
            max_failures: 3,
        }
    }
}

/// Result of a confirmed mutation.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    /// Receipt of the confirmed transaction.
    pub receipt: Receipt,
    /// Fresh snapshot of the affected campaign, if the follow-up read succeeded.
    pub campaign: Option<Campaign>,
}

/// Keeps local campaign state consistent with the remote store.
pub struct ViewStateSynchronizer {
    /// Read side of the remote store.
    store: Arc<dyn RemoteStore>,
    /// Write side of the remote store.
    coordinator: Arc<dyn TransactionCoordinator>,
    /// Wall clock used for status derivation.
    clock: Arc<dyn Clock>,
    /// Local snapshots.
    cache: CampaignCache,
    /// Configuration.
    config: SynchronizerConfig,
}

impl ViewStateSynchronizer {
    /// Creates a new synchronizer.
    pub fn new(
        store: Arc<dyn RemoteStore>,
        coordinator: Arc<dyn TransactionCoordinator>,
        clock: Arc<dyn Clock>,
        config: SynchronizerConfig,
    ) -> Self {
        Self {
            store,
            coordinator,
            clock,
            cache: CampaignCache::new(config.max_failures),
            config,
        }
    }

    /// Current time in seconds since epoch.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Account mutations are signed with.
    pub fn viewer(&self) -> AccountId {
        self.coordinator.signer()
    }

    /// Status of `campaign` at the current time.
    pub fn status_of(&self, campaign: &Campaign) -> CampaignStatus {
        campaign.status(self.now())
    }

    /// Fetches every campaign, skipping ids whose detail read fails.
    ///
    /// The result is ordered by ascending id without duplicates. Each detail
    /// read is independent, so snapshots of different campaigns may reflect
    /// different points in remote state.
    ///
    /// # Errors
    /// Returns an error if the campaign count cannot be read; the cache is
    /// left untouched in that case.
    pub async fn refresh_all(&self) -> Result<Vec<Campaign>, SyncError> {
        let count = self.store.campaign_count().await.map_err(|e| {
            warn!(error = %e, "Failed to read campaign count");
            SyncError::from(e)
        })?;

        let ids: Vec<CampaignId> = (0..count).map(CampaignId).collect();
        let results = if self.config.concurrent_refresh {
            self.fetch_concurrently(&ids).await
        } else {
            self.fetch_sequentially(&ids).await
        };

        let mut campaigns = Vec::with_capacity(results.len());
        let mut skipped = 0u32;

        for (id, result) in results {
            match result {
                Ok(campaign) => {
                    self.cache.store(campaign.clone()).await;
                    campaigns.push(campaign);
                }
                Err(e) => {
                    warn!(campaign = %id, error = %e, "Skipping campaign after failed detail read");
                    self.cache.record_failure(id).await;
                    skipped += 1;
                }
            }
        }

        campaigns.sort_by_key(|c| c.id);
        campaigns.dedup_by_key(|c| c.id);

        info!(
            count,
            fetched = campaigns.len(),
            skipped,
            "Refreshed all campaigns"
        );

        Ok(campaigns)
    }

    async fn fetch_sequentially(
        &self,
        ids: &[CampaignId],
    ) -> Vec<(CampaignId, Result<Campaign, StoreError>)> {
        let mut results = Vec::with_capacity(ids.len());
        for &id in ids {
            results.push((id, self.store.campaign_detail(id).await));
        }
        results
    }

    async fn fetch_concurrently(
        &self,
        ids: &[CampaignId],
    ) -> Vec<(CampaignId, Result<Campaign, StoreError>)> {
        let mut tasks = JoinSet::new();
        for &id in ids {
            let store = self.store.clone();
            tasks.spawn(async move { (id, store.campaign_detail(id).await) });
        }

        let mut results = Vec::with_capacity(ids.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => error!(error = %e, "Detail read task failed"),
            }
        }

        results.sort_by_key(|(id, _)| *id);
        results
    }

    /// Fetches one campaign and replaces its cached snapshot.
    ///
    /// # Errors
    /// `SyncError::NotFound` when the remote store has no campaign at `id`.
    /// On any failure the previous snapshot stays cached.
    pub async fn refresh_one(&self, id: CampaignId) -> Result<Campaign, SyncError> {
        match self.store.campaign_detail(id).await {
            Ok(campaign) => {
                debug!(
                    campaign = %id,
                    collected = %campaign.amount_collected,
                    ended = campaign.ended,
                    withdrawn = campaign.funds_withdrawn,
                    "Refreshed campaign"
                );
                self.cache.store(campaign.clone()).await;
                Ok(campaign)
            }
            Err(StoreError::NotFound(id)) => {
                debug!(campaign = %id, "Campaign not found");
                Err(SyncError::NotFound(id))
            }
            Err(e) => {
                warn!(campaign = %id, error = %e, "Campaign refresh failed");
                self.cache.record_failure(id).await;
                Err(e.into())
            }
        }
    }

    /// Fetches the donors of a campaign with their cumulative amounts.
    pub async fn refresh_donations(&self, id: CampaignId) -> Result<Vec<Donation>, SyncError> {
        let donors = self.store.campaign_donors(id).await?;

        let mut donations = Vec::with_capacity(donors.len());
        for donor in donors {
            let amount = self.store.donation_amount(id, &donor).await?;
            donations.push(Donation { donor, amount });
        }

        debug!(campaign = %id, donors = donations.len(), "Refreshed donations");
        self.cache.store_donations(id, donations.clone()).await;
        Ok(donations)
    }

    /// Fetches the feedback thread of a campaign.
    pub async fn refresh_feedback(&self, id: CampaignId) -> Result<Vec<Feedback>, SyncError> {
        let feedback = self.store.feedback(id).await?;
        debug!(campaign = %id, entries = feedback.len(), "Refreshed feedback");
        self.cache.store_feedback(id, feedback.clone()).await;
        Ok(feedback)
    }

    /// Donates `amount` to a campaign.
    ///
    /// # Errors
    /// `SyncError::Validation` for a zero amount, or when the cached snapshot
    /// already shows the campaign past its active stage.
    pub async fn submit_donation(
        &self,
        id: CampaignId,
        amount: Amount,
    ) -> Result<MutationOutcome, SyncError> {
        if amount.is_zero() {
            return Err(SyncError::Validation(
                "donation amount must be greater than zero".into(),
            ));
        }

        // Status never moves back to Active, so a cached non-active snapshot is final.
        if let Some(campaign) = self.cache.get(id).await {
            let now = self.now();
            if !can_donate(&campaign, now) {
                return Err(SyncError::Validation(format!(
                    "campaign {} is {} and no longer accepts donations",
                    id,
                    campaign.status(now)
                )));
            }
        }

        self.execute(Action::Donate { id, amount }).await
    }

    /// Withdraws the collected funds of a campaign owned by the signer.
    ///
    /// Eligibility is checked against a fresh snapshot.
    pub async fn submit_withdrawal(&self, id: CampaignId) -> Result<MutationOutcome, SyncError> {
        let campaign = self.refresh_one(id).await?;
        let viewer = self.viewer();
        let now = self.now();

        if !can_withdraw(&campaign, &viewer, now) {
            let reason = if !campaign.is_owned_by(&viewer) {
                "only the campaign owner can withdraw funds"
            } else if campaign.status(now) == CampaignStatus::Withdrawn {
                "funds have already been withdrawn"
            } else {
                "cannot withdraw before the deadline unless the target is met"
            };
            return Err(SyncError::Validation(reason.into()));
        }

        self.execute(Action::Withdraw { id }).await
    }

    /// Creates a campaign owned by the signer.
    pub async fn create_campaign(&self, params: NewCampaign) -> Result<MutationOutcome, SyncError> {
        params.validate(self.now())?;
        self.execute(Action::CreateCampaign(params)).await
    }

    /// Posts a comment on a campaign and re-reads its feedback thread.
    pub async fn add_feedback(
        &self,
        id: CampaignId,
        message: impl Into<String>,
    ) -> Result<MutationOutcome, SyncError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(SyncError::Validation("feedback must not be empty".into()));
        }

        let outcome = self.execute(Action::AddFeedback { id, message }).await?;
        if let Err(e) = self.refresh_feedback(id).await {
            warn!(campaign = %id, error = %e, "Feedback refresh after confirmed comment failed");
        }
        Ok(outcome)
    }

    /// Pays the reward owed to `donor` on a reward campaign.
    ///
    /// The payment is quoted as `donation * reward_percentage / 100`.
    pub async fn pay_reward(
        &self,
        id: CampaignId,
        donor: &AccountId,
    ) -> Result<MutationOutcome, SyncError> {
        let campaign = self.settlement_target(id, SideAction::PayReward).await?;
        let donation = self.store.donation_amount(id, donor).await?;
        let amount = donation
            .percent(campaign.reward_percentage)
            .ok_or_else(|| SyncError::Validation("reward amount overflows".into()))?;

        if amount.is_zero() {
            return Err(SyncError::Validation(format!("no reward is due to {donor}")));
        }

        info!(campaign = %id, donor = %donor, amount = %amount, "Quoted reward");
        self.execute(Action::PayReward {
            id,
            donor: donor.clone(),
            amount,
        })
        .await
    }

    /// Repays the outstanding loan of `donor` on a lending campaign.
    pub async fn repay_loan(
        &self,
        id: CampaignId,
        donor: &AccountId,
    ) -> Result<MutationOutcome, SyncError> {
        self.settlement_target(id, SideAction::RepayLoan).await?;
        let amount = self.store.donation_amount(id, donor).await?;

        if amount.is_zero() {
            return Err(SyncError::Validation(format!(
                "no outstanding loan from {donor}"
            )));
        }

        self.execute(Action::RepayLoan {
            id,
            donor: donor.clone(),
            amount,
        })
        .await
    }

    /// Reads a fresh snapshot and checks the signer may settle on it.
    async fn settlement_target(
        &self,
        id: CampaignId,
        action: SideAction,
    ) -> Result<Campaign, SyncError> {
        let campaign = self.refresh_one(id).await?;
        if !can_settle(&campaign, &self.viewer(), action) {
            return Err(SyncError::Validation(format!(
                "only the owner of a {} campaign can do this",
                action.campaign_type()
            )));
        }
        Ok(campaign)
    }

    /// Submits an action and re-reads the affected campaign once confirmed.
    async fn execute(&self, action: Action) -> Result<MutationOutcome, SyncError> {
        let function = action.function_name();
        let target = action.campaign_id();

        info!(function, campaign = ?target, value = %action.value(), "Submitting transaction");

        let receipt = self.coordinator.submit(action).await.map_err(|e| {
            warn!(function, error = %e, "Transaction failed");
            SyncError::from(e)
        })?;

        info!(
            function,
            tx_hash = %receipt.tx_hash,
            block = ?receipt.block_number,
            "Transaction confirmed"
        );

        let campaign = match target.or(receipt.created_campaign) {
            Some(id) => self.refresh_after_mutation(id).await,
            None => None,
        };

        Ok(MutationOutcome { receipt, campaign })
    }

    /// A failed read here must not fail the already-confirmed mutation.
    async fn refresh_after_mutation(&self, id: CampaignId) -> Option<Campaign> {
        self.cache.invalidate(id).await;
        match self.refresh_one(id).await {
            Ok(campaign) => Some(campaign),
            Err(e) => {
                warn!(campaign = %id, error = %e, "Refresh after confirmed transaction failed");
                None
            }
        }
    }

    /// Builds the dashboard of `viewer` from a full refresh.
    ///
    /// Campaigns whose detail read failed are left out, like in `refresh_all`.
    pub async fn dashboard(&self, viewer: &AccountId) -> Result<Dashboard, SyncError> {
        let campaigns = self.refresh_all().await?;
        let mut dashboard = Dashboard::new(viewer.clone(), self.now());

        for campaign in campaigns {
            if campaign.is_owned_by(viewer) {
                let donations = self.refresh_donations(campaign.id).await?;
                dashboard.add_owned(campaign, donations);
            } else {
                let amount = self.store.donation_amount(campaign.id, viewer).await?;
                dashboard.add_contribution(campaign, amount);
            }
        }

        debug!(
            viewer = %viewer,
            owned = dashboard.owned.len(),
            contributions = dashboard.contributions.len(),
            "Built dashboard"
        );
        Ok(dashboard)
    }

    /// Last cached snapshot of a campaign.
    pub async fn cached(&self, id: CampaignId) -> Option<Campaign> {
        self.cache.get(id).await
    }

    /// All cached snapshots in ascending id order.
    pub async fn cached_all(&self) -> Vec<Campaign> {
        self.cache.campaigns().await
    }

    pub async fn cached_donations(&self, id: CampaignId) -> Option<Vec<Donation>> {
        self.cache.donations(id).await
    }

    pub async fn cached_feedback(&self, id: CampaignId) -> Option<Vec<Feedback>> {
        self.cache.feedback(id).await
    }

    /// Sync bookkeeping for a campaign.
    pub async fn sync_state(&self, id: CampaignId) -> Option<CacheEntry> {
        self.cache.entry(id).await
    }

    /// Campaigns whose snapshot is behind or too old.
    pub async fn stale_campaigns(&self) -> Vec<CampaignId> {
        self.cache
            .stale(Duration::from_secs(self.config.max_age_secs))
            .await
    }

    /// Campaigns whose refresh keeps failing.
    pub async fn failed_campaigns(&self) -> Vec<CampaignId> {
        self.cache.failed().await
    }

    /// Starts the periodic refresh loop.
    pub async fn start(&self) {
        info!(
            interval_secs = self.config.refresh_interval_secs,
            "Starting campaign refresh loop"
        );

        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.refresh_interval_secs));

        loop {
            interval.tick().await;

            match self.refresh_all().await {
                Ok(campaigns) => debug!(campaigns = campaigns.len(), "Refresh cycle complete"),
                Err(e) => warn!(error = %e, "Refresh cycle failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdfund_domain::{CampaignType, Category, ManualClock};

    const NOW: u64 = 1_700_000_000;

    fn setup() -> (ViewStateSynchronizer, InMemoryLedger) {
        let clock = Arc::new(ManualClock::new(NOW));
        let ledger = InMemoryLedger::new(clock.clone(), AccountId::new("0xowner"));
        let sync = ViewStateSynchronizer::new(
            Arc::new(ledger.clone()),
            Arc::new(ledger.clone()),
            clock,
            SynchronizerConfig::default(),
        );
        (sync, ledger)
    }

    fn params() -> NewCampaign {
        NewCampaign {
            title: "Community garden".into(),
            description: "Raised beds".into(),
            target: Amount::parse_ether("1").unwrap(),
            deadline: NOW + 3_600,
            category: Category::Community,
            campaign_type: CampaignType::Donation,
            reward_percentage: 0,
        }
    }

    #[tokio::test]
    async fn test_create_campaign_refreshes_created_id() {
        let (sync, _) = setup();
        let outcome = sync.create_campaign(params()).await.unwrap();

        let campaign = outcome.campaign.unwrap();
        assert_eq!(campaign.id, CampaignId(0));
        assert_eq!(campaign.owner, AccountId::new("0xOWNER"));
        assert_eq!(sync.cached(CampaignId(0)).await, Some(campaign));
    }

    #[tokio::test]
    async fn test_create_campaign_validates_locally() {
        let (sync, ledger) = setup();
        let mut past = params();
        past.deadline = NOW;

        let err = sync.create_campaign(past).await.unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(ledger.submission_count().await, 0);
    }

    #[tokio::test]
    async fn test_refresh_one_not_found() {
        let (sync, _) = setup();
        assert_eq!(
            sync.refresh_one(CampaignId(3)).await,
            Err(SyncError::NotFound(CampaignId(3)))
        );
    }

    #[tokio::test]
    async fn test_zero_donation_is_rejected_before_submission() {
        let (sync, ledger) = setup();
        sync.create_campaign(params()).await.unwrap();

        let err = sync
            .submit_donation(CampaignId(0), Amount::zero())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(ledger.submission_count().await, 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_cache_unchanged() {
        let (sync, ledger) = setup();
        sync.create_campaign(params()).await.unwrap();
        let before = sync.sync_state(CampaignId(0)).await.unwrap();

        ledger.set_offline(true).await;
        let err = sync
            .submit_donation(CampaignId(0), Amount::from(1u64))
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        let after = sync.sync_state(CampaignId(0)).await.unwrap();
        assert_eq!(after.campaign, before.campaign);
        assert_eq!(after.status, crate::sync::SyncStatus::InSync);
    }

    #[tokio::test]
    async fn test_feedback_flow() {
        let (sync, _) = setup();
        sync.create_campaign(params()).await.unwrap();

        assert!(matches!(
            sync.add_feedback(CampaignId(0), "  ").await,
            Err(SyncError::Validation(_))
        ));

        sync.add_feedback(CampaignId(0), "Thanks everyone").await.unwrap();
        let feedback = sync.cached_feedback(CampaignId(0)).await.unwrap();
        assert_eq!(feedback.len(), 1);
        assert_eq!(feedback[0].message, "Thanks everyone");
    }

    #[tokio::test]
    async fn test_sequential_refresh_matches_concurrent() {
        let (sync, ledger) = setup();
        for _ in 0..4 {
            sync.create_campaign(params()).await.unwrap();
        }

        let clock = Arc::new(ManualClock::new(NOW));
        let sequential = ViewStateSynchronizer::new(
            Arc::new(ledger.clone()),
            Arc::new(ledger),
            clock,
            SynchronizerConfig {
                concurrent_refresh: false,
                ..Default::default()
            },
        );

        assert_eq!(
            sync.refresh_all().await.unwrap(),
            sequential.refresh_all().await.unwrap()
        );
    }
}
