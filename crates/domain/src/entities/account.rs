use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier (wallet address).
///
/// Normalized to trimmed lowercase so that checksummed and plain hex
/// spellings of the same address compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AccountId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for AccountId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_is_case_insensitive() {
        let checksummed = AccountId::new("0xAbCdEf0000000000000000000000000000000001");
        let plain = AccountId::from("0xabcdef0000000000000000000000000000000001");
        assert_eq!(checksummed, plain);
    }

    #[test]
    fn test_account_id_serde_normalizes() {
        let id: AccountId = serde_json::from_str("\"0xFF\"").unwrap();
        assert_eq!(id.as_str(), "0xff");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"0xff\"");
    }
}
