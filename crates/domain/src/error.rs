use thiserror::Error;

/// Errors raised when converting between human decimals and fixed-point amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("malformed amount: {0:?}")]
    Malformed(String),

    #[error("amount must not be negative: {0}")]
    Negative(String),

    #[error("amount {value} has more than {decimals} fractional digits")]
    TooPrecise { value: String, decimals: u8 },

    #[error("amount {0} is out of range")]
    Overflow(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("unknown category index {0}")]
    UnknownCategory(u8),

    #[error("unknown campaign type index {0}")]
    UnknownCampaignType(u8),

    #[error("invalid campaign: {0}")]
    InvalidCampaign(String),
}
