use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Arts,
    Health,
    Education,
    Environment,
    Community,
    Business,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Technology,
        Category::Arts,
        Category::Health,
        Category::Education,
        Category::Environment,
        Category::Community,
        Category::Business,
        Category::Other,
    ];

    pub fn from_index(index: u8) -> Result<Self, DomainError> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or(DomainError::UnknownCategory(index))
    }

    /// Wire index used by the contract.
    pub fn index(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for Category {
    type Err = DomainError;

    /// Case-insensitive variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::InvalidCampaign(format!("unknown category '{s}'")))
    }
}

/// Funding model of a campaign. Reward and Lending campaigns carry
/// owner-side settlement actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignType {
    Reward,
    Donation,
    Lending,
}

impl CampaignType {
    pub fn from_index(index: u8) -> Result<Self, DomainError> {
        match index {
            0 => Ok(Self::Reward),
            1 => Ok(Self::Donation),
            2 => Ok(Self::Lending),
            other => Err(DomainError::UnknownCampaignType(other)),
        }
    }

    pub fn index(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for CampaignType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reward" => Ok(Self::Reward),
            "donation" => Ok(Self::Donation),
            "lending" => Ok(Self::Lending),
            _ => Err(DomainError::InvalidCampaign(format!(
                "unknown campaign type '{s}'"
            ))),
        }
    }
}

/// Lifecycle stage derived from a snapshot and the current time.
///
/// Never persisted: a deadline crossing happens without any remote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CampaignStatus {
    Active,
    Ended,
    Withdrawn,
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Ended => write!(f, "Ended"),
            Self::Withdrawn => write!(f, "Funds Withdrawn"),
        }
    }
}
