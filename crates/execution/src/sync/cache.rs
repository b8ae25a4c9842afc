//! Campaign cache with sync bookkeeping.

use crowdfund_domain::{Campaign, CampaignId, Donation, Feedback};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Sync status of a cached campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Snapshot reflects the last successful read.
    InSync,
    /// A mutation was confirmed or a refresh failed; snapshot may be behind.
    NeedsUpdate,
    /// Refresh failed `max_failures` times in a row.
    Failed,
}

/// Cached state for one campaign.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Last successfully read snapshot.
    pub campaign: Option<Campaign>,
    /// Donations as of the last donations read.
    pub donations: Option<Vec<Donation>>,
    /// Feedback as of the last feedback read.
    pub feedback: Option<Vec<Feedback>>,
    /// When the snapshot was read.
    pub fetched_at: Option<Instant>,
    /// Sync status.
    pub status: SyncStatus,
    /// Consecutive failed refreshes.
    pub failure_count: u32,
}

impl CacheEntry {
    fn empty() -> Self {
        Self {
            campaign: None,
            donations: None,
            feedback: None,
            fetched_at: None,
            status: SyncStatus::NeedsUpdate,
            failure_count: 0,
        }
    }

    /// Whether the entry should be re-read.
    pub fn is_stale(&self, now: Instant, max_age: Duration) -> bool {
        self.status != SyncStatus::InSync
            || self
                .fetched_at
                .is_none_or(|at| now.duration_since(at) > max_age)
    }
}

/// Id-ordered cache of campaign snapshots.
///
/// Failed reads never clear a snapshot; callers keep seeing the last good one.
pub struct CampaignCache {
    entries: RwLock<BTreeMap<CampaignId, CacheEntry>>,
    max_failures: u32,
}

impl CampaignCache {
    /// Creates an empty cache.
    pub fn new(max_failures: u32) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            max_failures,
        }
    }

    /// Replaces the snapshot for the campaign's id.
    pub async fn store(&self, campaign: Campaign) {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(campaign.id).or_insert_with(CacheEntry::empty);
        entry.campaign = Some(campaign);
        entry.fetched_at = Some(Instant::now());
        entry.status = SyncStatus::InSync;
        entry.failure_count = 0;
    }

    pub async fn store_donations(&self, id: CampaignId, donations: Vec<Donation>) {
        let mut entries = self.entries.write().await;
        entries.entry(id).or_insert_with(CacheEntry::empty).donations = Some(donations);
    }

    pub async fn store_feedback(&self, id: CampaignId, feedback: Vec<Feedback>) {
        let mut entries = self.entries.write().await;
        entries.entry(id).or_insert_with(CacheEntry::empty).feedback = Some(feedback);
    }

    /// Marks an entry as behind the remote store.
    pub async fn invalidate(&self, id: CampaignId) {
        let mut entries = self.entries.write().await;
        entries.entry(id).or_insert_with(CacheEntry::empty).status = SyncStatus::NeedsUpdate;
        debug!(campaign = %id, "Invalidated cached campaign");
    }

    /// Records a failed refresh, keeping the previous snapshot.
    pub async fn record_failure(&self, id: CampaignId) {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(id).or_insert_with(CacheEntry::empty);
        entry.failure_count += 1;
        entry.status = if entry.failure_count >= self.max_failures {
            SyncStatus::Failed
        } else {
            SyncStatus::NeedsUpdate
        };
    }

    pub async fn get(&self, id: CampaignId) -> Option<Campaign> {
        self.entries
            .read()
            .await
            .get(&id)
            .and_then(|e| e.campaign.clone())
    }

    pub async fn entry(&self, id: CampaignId) -> Option<CacheEntry> {
        self.entries.read().await.get(&id).cloned()
    }

    /// All cached snapshots in ascending id order.
    pub async fn campaigns(&self) -> Vec<Campaign> {
        self.entries
            .read()
            .await
            .values()
            .filter_map(|e| e.campaign.clone())
            .collect()
    }

    pub async fn donations(&self, id: CampaignId) -> Option<Vec<Donation>> {
        self.entries
            .read()
            .await
            .get(&id)
            .and_then(|e| e.donations.clone())
    }

    pub async fn feedback(&self, id: CampaignId) -> Option<Vec<Feedback>> {
        self.entries
            .read()
            .await
            .get(&id)
            .and_then(|e| e.feedback.clone())
    }

    /// Ids whose entries are not in sync or older than `max_age`.
    pub async fn stale(&self, max_age: Duration) -> Vec<CampaignId> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .iter()
            .filter(|(_, entry)| entry.is_stale(now, max_age))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Ids that hit the failure threshold.
    pub async fn failed(&self) -> Vec<CampaignId> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|(_, entry)| entry.status == SyncStatus::Failed)
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowdfund_domain::{AccountId, Amount, CampaignType, Category};

    fn campaign(id: u64) -> Campaign {
        Campaign {
            id: CampaignId(id),
            owner: AccountId::new("0xowner"),
            title: format!("Campaign {id}"),
            description: String::new(),
            target: Amount::from(100u64),
            deadline: 1_000,
            amount_collected: Amount::zero(),
            ended: false,
            funds_withdrawn: false,
            category: Category::Other,
            campaign_type: CampaignType::Donation,
            reward_percentage: 0,
        }
    }

    #[tokio::test]
    async fn test_cache_orders_by_id() {
        let cache = CampaignCache::new(3);
        for id in [3, 1, 2] {
            cache.store(campaign(id)).await;
        }
        let ids: Vec<u64> = cache.campaigns().await.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_failure_keeps_snapshot() {
        let cache = CampaignCache::new(2);
        cache.store(campaign(0)).await;

        cache.record_failure(CampaignId(0)).await;
        let entry = cache.entry(CampaignId(0)).await.unwrap();
        assert_eq!(entry.status, SyncStatus::NeedsUpdate);
        assert!(entry.campaign.is_some());

        cache.record_failure(CampaignId(0)).await;
        assert_eq!(cache.failed().await, vec![CampaignId(0)]);
        assert_eq!(cache.get(CampaignId(0)).await, Some(campaign(0)));

        cache.store(campaign(0)).await;
        let entry = cache.entry(CampaignId(0)).await.unwrap();
        assert_eq!(entry.status, SyncStatus::InSync);
        assert_eq!(entry.failure_count, 0);
    }

    #[tokio::test]
    async fn test_stale_tracking() {
        let cache = CampaignCache::new(3);
        cache.store(campaign(0)).await;
        cache.store(campaign(1)).await;
        cache.invalidate(CampaignId(1)).await;

        assert_eq!(cache.stale(Duration::from_secs(60)).await, vec![CampaignId(1)]);

        cache.record_failure(CampaignId(2)).await;
        let stale = cache.stale(Duration::from_secs(60)).await;
        assert_eq!(stale, vec![CampaignId(1), CampaignId(2)]);
        assert!(cache.get(CampaignId(2)).await.is_none());
    }
}
