use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LedgerError;

/// Status value the explorer uses for a failed query.
pub const STATUS_FAILURE: &str = "0";

/// Upper bound sent as `endblock` on list queries.
pub const END_BLOCK: u64 = 99_999_999;

/// The `{status, message, result}` wrapper around every explorer response.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Value,
}

impl Envelope {
    /// Unwrap the `result` payload, turning a failure status into `UpstreamFailure`.
    pub fn into_result<T: serde::de::DeserializeOwned>(self) -> Result<T, LedgerError> {
        if self.status == STATUS_FAILURE {
            // On failure `result` often holds the more specific reason.
            let message = match &self.result {
                Value::String(reason) if !reason.is_empty() => {
                    format!("{}: {}", self.message, reason)
                }
                _ => self.message,
            };
            return Err(LedgerError::UpstreamFailure { message });
        }
        Ok(serde_json::from_value(self.result)?)
    }
}

/// One transfer as returned by the txlist, txlistinternal and tokentx actions.
///
/// Only the fields this service reads are typed; everything else is carried in
/// `extra` and passed through untouched.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub block_number: String,
    pub time_stamp: String,
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_decimal: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry categories, each backed by one explorer action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerCategory {
    NativeBalance,
    HistoricalBalance,
    NativeTransfers,
    InternalTransfers,
    TokenTransfers,
    TokenBalance,
}

impl LedgerCategory {
    pub fn action(self) -> &'static str {
        match self {
            LedgerCategory::NativeBalance => "balance",
            LedgerCategory::HistoricalBalance => "balancehistory",
            LedgerCategory::NativeTransfers => "txlist",
            LedgerCategory::InternalTransfers => "txlistinternal",
            LedgerCategory::TokenTransfers => "tokentx",
            LedgerCategory::TokenBalance => "tokenbalance",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let envelope: Envelope = serde_json::from_value(json!({
            "status": "1",
            "message": "OK",
            "result": "2500000000000000000"
        }))
        .unwrap();
        let result: String = envelope.into_result().unwrap();
        assert_eq!(result, "2500000000000000000");
    }

    #[test]
    fn test_failure_envelope_carries_message() {
        let envelope: Envelope = serde_json::from_value(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Invalid API Key"
        }))
        .unwrap();
        match envelope.into_result::<String>() {
            Err(LedgerError::UpstreamFailure { message }) => {
                assert_eq!(message, "NOTOK: Invalid API Key")
            }
            other => panic!("expected UpstreamFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_envelope_with_empty_list() {
        let envelope: Envelope = serde_json::from_value(json!({
            "status": "0",
            "message": "No transactions found",
            "result": []
        }))
        .unwrap();
        match envelope.into_result::<Vec<LedgerEntry>>() {
            Err(LedgerError::UpstreamFailure { message }) => {
                assert_eq!(message, "No transactions found")
            }
            other => panic!("expected UpstreamFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_result_is_transport_failure() {
        let envelope: Envelope = serde_json::from_value(json!({
            "status": "1",
            "message": "OK",
            "result": [{"hash": "0x1"}]
        }))
        .unwrap();
        assert!(matches!(
            envelope.into_result::<Vec<LedgerEntry>>(),
            Err(LedgerError::TransportFailure(_))
        ));
    }

    #[test]
    fn test_entry_keeps_unknown_fields() {
        let raw = json!({
            "blockNumber": "17000000",
            "timeStamp": "1681000000",
            "hash": "0xabc",
            "nonce": "7",
            "from": "0x1",
            "to": "0x2",
            "value": "1000",
            "gas": "21000",
            "gasPrice": "30000000000",
            "gasUsed": "21000",
            "contractAddress": "",
            "isError": "0"
        });
        let entry: LedgerEntry = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(entry.block_number, "17000000");
        assert_eq!(entry.extra.get("nonce"), Some(&json!("7")));
        assert!(entry.token_decimal.is_none());

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back, raw);
    }
}
