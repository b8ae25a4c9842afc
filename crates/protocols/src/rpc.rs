//! JSON-RPC client for a contract gateway.
//!
//! Reads map to the contract's view functions by name; writes go through
//! `sendTransaction`, which the gateway signs for the configured account
//! and resolves once the transaction is mined.

use crate::action::{Action, Receipt};
use crate::codec;
use crate::error::StoreError;
use crate::{RemoteStore, TransactionCoordinator};
use async_trait::async_trait;
use crowdfund_domain::{AccountId, Amount, Campaign, CampaignId, Feedback};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Error code the gateway uses for reads of a missing campaign.
pub const CAMPAIGN_NOT_FOUND_CODE: i64 = -32004;

/// Configuration for the JSON-RPC client.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Gateway endpoint.
    pub url: String,
    /// Account transactions are signed with.
    pub account: AccountId,
}

impl RpcConfig {
    pub fn new(url: impl Into<String>, account: AccountId) -> Self {
        Self {
            url: url.into(),
            account,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Maps a JSON-RPC error object to a store error.
fn map_rpc_error(code: i64, message: String, campaign: Option<CampaignId>) -> StoreError {
    match (code, campaign) {
        (CAMPAIGN_NOT_FOUND_CODE, Some(id)) => StoreError::NotFound(id),
        _ => StoreError::Rejected(message),
    }
}

/// Remote store and transaction coordinator backed by a JSON-RPC gateway.
pub struct JsonRpcStore {
    client: reqwest::Client,
    config: RpcConfig,
    next_id: AtomicU64,
}

impl JsonRpcStore {
    /// Creates a new client.
    pub fn new(config: RpcConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            next_id: AtomicU64::new(1),
        }
    }

    /// Issues one JSON-RPC call. `campaign` scopes not-found errors.
    async fn call(
        &self,
        method: &str,
        params: Value,
        campaign: Option<CampaignId>,
    ) -> Result<Value, StoreError> {
        let request_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": request_id,
            "method": method,
            "params": params,
        });

        debug!(method, request_id, url = %self.config.url, "Sending JSON-RPC request");

        let response = self
            .client
            .post(&self.config.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            warn!(method, status = %status, "Gateway returned server error");
            return Err(StoreError::Network(format!("gateway returned {status}")));
        }

        let envelope: RpcResponse = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        if let Some(error) = envelope.error {
            debug!(method, code = error.code, message = %error.message, "JSON-RPC error");
            return Err(map_rpc_error(error.code, error.message, campaign));
        }

        envelope
            .result
            .ok_or_else(|| StoreError::InvalidResponse(format!("{method}: missing result")))
    }
}

#[async_trait]
impl RemoteStore for JsonRpcStore {
    async fn campaign_count(&self) -> Result<u64, StoreError> {
        let result = self.call("numberOfCampaigns", json!([]), None).await?;
        codec::decode_u64(&result)
    }

    async fn campaign_detail(&self, id: CampaignId) -> Result<Campaign, StoreError> {
        let result = self
            .call("getCampaignDetails", json!([id.0]), Some(id))
            .await?;
        let raw = codec::raw_campaign_from_json(&result)?;
        codec::campaign_from_tuple(id, raw)
    }

    async fn donation_amount(
        &self,
        id: CampaignId,
        donor: &AccountId,
    ) -> Result<Amount, StoreError> {
        let result = self
            .call("getDonationAmount", json!([id.0, donor.as_str()]), Some(id))
            .await?;
        codec::decode_amount(&result)
    }

    async fn campaign_donors(&self, id: CampaignId) -> Result<Vec<AccountId>, StoreError> {
        let result = self
            .call("getCampaignDonors", json!([id.0]), Some(id))
            .await?;
        codec::decode_accounts(&result)
    }

    async fn feedback(&self, id: CampaignId) -> Result<Vec<Feedback>, StoreError> {
        let result = self.call("getFeedback", json!([id.0]), Some(id)).await?;
        result
            .as_array()
            .ok_or_else(|| StoreError::InvalidResponse("feedback is not a list".into()))?
            .iter()
            .map(codec::decode_feedback)
            .collect()
    }
}

#[async_trait]
impl TransactionCoordinator for JsonRpcStore {
    fn signer(&self) -> AccountId {
        self.config.account.clone()
    }

    async fn submit(&self, action: Action) -> Result<Receipt, StoreError> {
        let tx = json!({
            "from": self.config.account.as_str(),
            "function": action.function_name(),
            "args": codec::encode_args(&action),
            "value": codec::encode_amount(action.value()),
        });

        let result = self
            .call("sendTransaction", json!([tx]), action.campaign_id())
            .await?;
        codec::decode_receipt(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_rpc_error() {
        assert_eq!(
            map_rpc_error(CAMPAIGN_NOT_FOUND_CODE, "no campaign".into(), Some(CampaignId(5))),
            StoreError::NotFound(CampaignId(5))
        );
        assert_eq!(
            map_rpc_error(CAMPAIGN_NOT_FOUND_CODE, "no campaign".into(), None),
            StoreError::Rejected("no campaign".into())
        );
        assert_eq!(
            map_rpc_error(3, "execution reverted: Campaign deadline has passed".into(), Some(CampaignId(1))),
            StoreError::Rejected("execution reverted: Campaign deadline has passed".into())
        );
    }

    #[test]
    fn test_response_envelope_parsing() {
        let ok: RpcResponse = serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": "0x2"})).unwrap();
        assert_eq!(ok.result, Some(json!("0x2")));
        assert!(ok.error.is_none());

        let err: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 2,
            "error": {"code": -32004, "message": "campaign not found"}
        }))
        .unwrap();
        let error = err.error.unwrap();
        assert_eq!(error.code, CAMPAIGN_NOT_FOUND_CODE);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_network_error() {
        let store = JsonRpcStore::new(RpcConfig::new(
            "http://127.0.0.1:9",
            AccountId::new("0xabc"),
        ));
        assert!(matches!(
            store.campaign_count().await,
            Err(StoreError::Network(_))
        ));
        assert_eq!(store.signer(), AccountId::new("0xABC"));
    }
}
