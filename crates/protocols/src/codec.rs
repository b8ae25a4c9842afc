//! Wire decoding of contract responses.
//!
//! Contract reads come back as positional tuples. They are mapped to named
//! records here so that nothing past this module indexes by position.

use crate::action::{Action, Receipt};
use crate::error::StoreError;
use crowdfund_domain::{
    AccountId, Amount, Campaign, CampaignId, CampaignType, Category, Feedback,
};
use primitive_types::U256;
use serde_json::{Value, json};

/// `getCampaignDetails` tuple:
/// `(owner, title, description, target, deadline, amountCollected, ended,
/// fundsWithdrawn, category, campaignType, rewardPercentage)`.
pub type RawCampaign = (
    String,
    String,
    String,
    U256,
    u64,
    U256,
    bool,
    bool,
    u8,
    u8,
    u8,
);

const RAW_CAMPAIGN_FIELDS: usize = 11;

fn invalid(msg: impl Into<String>) -> StoreError {
    StoreError::InvalidResponse(msg.into())
}

/// Unset contract storage reads back with the zero address as owner.
pub fn is_zero_address(address: &str) -> bool {
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    !hex.is_empty() && hex.chars().all(|c| c == '0')
}

/// Maps a positional tuple to a named `Campaign`.
pub fn campaign_from_tuple(id: CampaignId, raw: RawCampaign) -> Result<Campaign, StoreError> {
    let (
        owner,
        title,
        description,
        target,
        deadline,
        amount_collected,
        ended,
        funds_withdrawn,
        category,
        campaign_type,
        reward_percentage,
    ) = raw;

    if is_zero_address(&owner) {
        return Err(StoreError::NotFound(id));
    }

    Ok(Campaign {
        id,
        owner: AccountId::new(owner),
        title,
        description,
        target: Amount(target),
        deadline,
        amount_collected: Amount(amount_collected),
        ended,
        funds_withdrawn,
        category: Category::from_index(category).map_err(|e| invalid(e.to_string()))?,
        campaign_type: CampaignType::from_index(campaign_type)
            .map_err(|e| invalid(e.to_string()))?,
        reward_percentage,
    })
}

pub fn raw_campaign_from_json(value: &Value) -> Result<RawCampaign, StoreError> {
    let fields = value
        .as_array()
        .ok_or_else(|| invalid("campaign detail is not a tuple"))?;

    if fields.len() != RAW_CAMPAIGN_FIELDS {
        return Err(invalid(format!(
            "campaign detail has {} fields, expected {}",
            fields.len(),
            RAW_CAMPAIGN_FIELDS
        )));
    }

    Ok((
        decode_string(&fields[0])?,
        decode_string(&fields[1])?,
        decode_string(&fields[2])?,
        decode_u256(&fields[3])?,
        decode_u64(&fields[4])?,
        decode_u256(&fields[5])?,
        decode_bool(&fields[6])?,
        decode_bool(&fields[7])?,
        decode_u8(&fields[8])?,
        decode_u8(&fields[9])?,
        decode_u8(&fields[10])?,
    ))
}

fn parse_u256(s: &str) -> Result<U256, StoreError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => U256::from_str_radix(hex, 16).ok(),
        None => U256::from_dec_str(s).ok(),
    };
    parsed.ok_or_else(|| invalid(format!("not an unsigned integer: {s:?}")))
}

pub fn decode_u256(value: &Value) -> Result<U256, StoreError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| invalid(format!("not an unsigned integer: {n}"))),
        Value::String(s) => parse_u256(s),
        other => Err(invalid(format!("expected integer, got {other}"))),
    }
}

pub fn decode_u64(value: &Value) -> Result<u64, StoreError> {
    let v = decode_u256(value)?;
    if v > U256::from(u64::MAX) {
        return Err(invalid(format!("{v} does not fit in 64 bits")));
    }
    Ok(v.as_u64())
}

pub fn decode_u8(value: &Value) -> Result<u8, StoreError> {
    let v = decode_u64(value)?;
    u8::try_from(v).map_err(|_| invalid(format!("{v} does not fit in 8 bits")))
}

pub fn decode_bool(value: &Value) -> Result<bool, StoreError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" => Ok(true),
        Value::String(s) if s == "false" => Ok(false),
        other => Err(invalid(format!("expected bool, got {other}"))),
    }
}

pub fn decode_string(value: &Value) -> Result<String, StoreError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| invalid(format!("expected string, got {value}")))
}

pub fn decode_amount(value: &Value) -> Result<Amount, StoreError> {
    decode_u256(value).map(Amount)
}

pub fn decode_accounts(value: &Value) -> Result<Vec<AccountId>, StoreError> {
    value
        .as_array()
        .ok_or_else(|| invalid("expected an address list"))?
        .iter()
        .map(|v| decode_string(v).map(AccountId::new))
        .collect()
}

/// Accepts both `{user, message, timestamp}` objects and positional triples.
pub fn decode_feedback(value: &Value) -> Result<Feedback, StoreError> {
    let (user, message, timestamp) = match value {
        Value::Object(map) => (
            map.get("user").ok_or_else(|| invalid("feedback without user"))?,
            map.get("message")
                .ok_or_else(|| invalid("feedback without message"))?,
            map.get("timestamp")
                .ok_or_else(|| invalid("feedback without timestamp"))?,
        ),
        Value::Array(items) if items.len() == 3 => (&items[0], &items[1], &items[2]),
        other => return Err(invalid(format!("malformed feedback entry: {other}"))),
    };

    Ok(Feedback {
        user: AccountId::new(decode_string(user)?),
        message: decode_string(message)?,
        timestamp: decode_u64(timestamp)?,
    })
}

/// Decodes a transaction receipt. A `status` of 0 means the call reverted.
pub fn decode_receipt(value: &Value) -> Result<Receipt, StoreError> {
    let tx_hash = value
        .get("transactionHash")
        .ok_or_else(|| invalid("receipt without transactionHash"))
        .and_then(decode_string)?;

    if let Some(status) = value.get("status") {
        if decode_u64(status)? == 0 {
            let reason = value
                .get("revertReason")
                .and_then(Value::as_str)
                .unwrap_or("transaction reverted");
            return Err(StoreError::Rejected(reason.to_string()));
        }
    }

    let block_number = value
        .get("blockNumber")
        .filter(|v| !v.is_null())
        .map(decode_u64)
        .transpose()?;

    let created_campaign = value
        .get("campaignId")
        .filter(|v| !v.is_null())
        .map(|v| decode_u64(v).map(CampaignId))
        .transpose()?;

    Ok(Receipt {
        tx_hash,
        block_number,
        created_campaign,
    })
}

/// Amounts travel as decimal strings of smallest units.
pub fn encode_amount(amount: Amount) -> Value {
    Value::String(amount.raw().to_string())
}

/// Positional contract arguments for an action. The payment goes separately.
pub fn encode_args(action: &Action) -> Vec<Value> {
    match action {
        Action::CreateCampaign(params) => vec![
            json!(params.title),
            json!(params.description),
            encode_amount(params.target),
            json!(params.deadline),
            json!(params.category.index()),
            json!(params.campaign_type.index()),
            json!(params.reward_percentage),
        ],
        Action::Donate { id, .. } | Action::Withdraw { id } => vec![json!(id.0)],
        Action::PayReward { id, donor, .. } | Action::RepayLoan { id, donor, .. } => {
            vec![json!(id.0), json!(donor.as_str())]
        }
        Action::AddFeedback { id, message } => vec![json!(id.0), json!(message)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_json() -> Value {
        json!([
            "0xAbC0000000000000000000000000000000000001",
            "Clean water",
            "Wells for the village",
            "1000000000000000000",
            1_700_003_600u64,
            "0x6f05b59d3b20000",
            false,
            false,
            4,
            1,
            0
        ])
    }

    #[test]
    fn test_decode_campaign_detail() {
        let raw = raw_campaign_from_json(&detail_json()).unwrap();
        let campaign = campaign_from_tuple(CampaignId(2), raw).unwrap();

        assert_eq!(campaign.id, CampaignId(2));
        assert_eq!(
            campaign.owner,
            AccountId::new("0xabc0000000000000000000000000000000000001")
        );
        assert_eq!(campaign.target, Amount::parse_ether("1").unwrap());
        assert_eq!(campaign.amount_collected, Amount::parse_ether("0.5").unwrap());
        assert_eq!(campaign.deadline, 1_700_003_600);
        assert_eq!(campaign.category, Category::Environment);
        assert_eq!(campaign.campaign_type, CampaignType::Donation);
    }

    #[test]
    fn test_zero_owner_means_not_found() {
        let mut detail = detail_json();
        detail[0] = json!("0x0000000000000000000000000000000000000000");
        let raw = raw_campaign_from_json(&detail).unwrap();
        assert_eq!(
            campaign_from_tuple(CampaignId(9), raw),
            Err(StoreError::NotFound(CampaignId(9)))
        );
    }

    #[test]
    fn test_malformed_detail_is_invalid_response() {
        let short = json!(["0xabc", "title"]);
        assert!(matches!(
            raw_campaign_from_json(&short),
            Err(StoreError::InvalidResponse(_))
        ));

        let mut bad_category = detail_json();
        bad_category[8] = json!(42);
        let raw = raw_campaign_from_json(&bad_category).unwrap();
        assert!(matches!(
            campaign_from_tuple(CampaignId(0), raw),
            Err(StoreError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_decode_feedback_shapes() {
        let object = json!({"user": "0xAA", "message": "Go!", "timestamp": "1700000000"});
        let triple = json!(["0xaa", "Go!", 1_700_000_000u64]);
        assert_eq!(decode_feedback(&object).unwrap(), decode_feedback(&triple).unwrap());
    }

    #[test]
    fn test_decode_receipt() {
        let ok = json!({"transactionHash": "0x01", "blockNumber": "0x10", "status": 1, "campaignId": 4});
        let receipt = decode_receipt(&ok).unwrap();
        assert_eq!(receipt.block_number, Some(16));
        assert_eq!(receipt.created_campaign, Some(CampaignId(4)));

        let reverted = json!({"transactionHash": "0x02", "status": "0x0", "revertReason": "Campaign deadline has passed"});
        assert_eq!(
            decode_receipt(&reverted),
            Err(StoreError::Rejected("Campaign deadline has passed".into()))
        );
    }

    #[test]
    fn test_encode_args_keeps_contract_order() {
        let action = Action::PayReward {
            id: CampaignId(1),
            donor: AccountId::new("0xBEEF"),
            amount: Amount::from(10u64),
        };
        assert_eq!(encode_args(&action), vec![json!(1), json!("0xbeef")]);
        assert_eq!(encode_amount(Amount::from(10u64)), json!("10"));
    }
}
