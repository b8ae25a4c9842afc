//! Domain model for crowdfunding campaigns.
//!
//! Campaign snapshots mirror the remote store; everything here is pure:
//! - Fixed-point amounts and unit conversion
//! - Campaign, donation and feedback entities
//! - Lifecycle status and eligibility predicates
//! - Countdown and progress arithmetic

/// Wall-clock abstraction.
pub mod clock;
/// Countdown until a campaign deadline.
pub mod countdown;
/// Campaign, donation and feedback entities.
pub mod entities;
/// Classification enums.
pub mod enums;
/// Domain errors.
pub mod error;
/// Status derivation and eligibility predicates.
pub mod lifecycle;
/// Value objects.
pub mod value_objects;

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::TimeRemaining;
pub use entities::{AccountId, Campaign, CampaignId, Donation, Feedback, NewCampaign};
pub use enums::{CampaignStatus, CampaignType, Category};
pub use error::{AmountError, DomainError};
pub use lifecycle::{SideAction, can_donate, can_settle, can_withdraw, derive_status};
pub use value_objects::{ETHER_DECIMALS, amount::Amount, percentage::Percentage};
