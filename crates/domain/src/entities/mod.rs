pub mod account;
pub mod campaign;
pub mod donation;

// Re-export for easier access
pub use account::AccountId;
pub use campaign::{Campaign, CampaignId, NewCampaign};
pub use donation::{Donation, Feedback};
