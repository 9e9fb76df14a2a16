use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::LedgerError;
use crate::explorer::types::{LedgerCategory, LedgerEntry};

use super::amount::{self, NATIVE_DECIMALS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Normal,
    Internal,
    Token,
}

impl TransactionType {
    pub fn category(self) -> LedgerCategory {
        match self {
            TransactionType::Normal => LedgerCategory::NativeTransfers,
            TransactionType::Internal => LedgerCategory::InternalTransfers,
            TransactionType::Token => LedgerCategory::TokenTransfers,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Normal => "normal",
            TransactionType::Internal => "internal",
            TransactionType::Token => "token",
        }
    }
}

/// A ledger entry with its amount scaled to whole units and its timestamp in ISO-8601.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEntry {
    #[serde(flatten)]
    pub entry: LedgerEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_in_eth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_in_tokens: Option<f64>,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

/// Render seconds since epoch the way browsers print `Date#toISOString`.
pub fn iso_timestamp(seconds: i64) -> Result<String, LedgerError> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|dt| iso_string(&dt))
        .ok_or_else(|| LedgerError::InvalidDate(seconds.to_string()))
}

pub fn iso_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Midnight UTC of a `YYYY-MM-DD` calendar date.
pub fn midnight_utc(date: &str) -> Result<DateTime<Utc>, LedgerError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| LedgerError::InvalidDate(date.to_string()))
}

pub fn normalize_entry(
    mut entry: LedgerEntry,
    kind: TransactionType,
) -> Result<NormalizedEntry, LedgerError> {
    let seconds: i64 = entry
        .time_stamp
        .trim()
        .parse()
        .map_err(|_| LedgerError::InvalidDate(entry.time_stamp.clone()))?;
    let timestamp = iso_timestamp(seconds)?;

    // Internal traces carry their own `type` (call, create, ...).
    if let Some(call_type) = entry.extra.remove("type") {
        entry.extra.insert("callType".to_string(), call_type);
    }

    let (value_in_eth, value_in_tokens) = match kind {
        TransactionType::Token => {
            let decimals = amount::parse_decimals(entry.token_decimal.as_deref().unwrap_or(""))?;
            (None, Some(amount::normalize(&entry.value, decimals)?))
        }
        TransactionType::Normal | TransactionType::Internal => {
            (Some(amount::normalize(&entry.value, NATIVE_DECIMALS)?), None)
        }
    };

    Ok(NormalizedEntry {
        entry,
        value_in_eth,
        value_in_tokens,
        timestamp,
        transaction_type: kind,
    })
}

/// Normalize a whole listing; the first bad entry fails the batch.
pub fn normalize_entries(
    entries: Vec<LedgerEntry>,
    kind: TransactionType,
) -> Result<Vec<NormalizedEntry>, LedgerError> {
    entries
        .into_iter()
        .map(|entry| normalize_entry(entry, kind))
        .collect()
}

// ============================================================
// Token holdings
// ============================================================

/// Net token position of an account, folded from its transfer history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHolding {
    pub contract_address: String,
    pub token_name: Option<String>,
    pub token_symbol: Option<String>,
    pub token_decimal: Option<String>,
    /// Signed net flow in smallest units.
    pub balance: String,
    pub balance_in_tokens: f64,
    pub transfers: usize,
}

struct HoldingAcc {
    first: LedgerEntry,
    net: BigDecimal,
    transfers: usize,
}

/// Fold token transfers into one holding per contract, ordered by first appearance.
///
/// Only transfers observed in the listing count, so a `startBlock` filter yields
/// the net flow since that block rather than the absolute balance.
pub fn token_holdings(
    account: &str,
    transfers: &[LedgerEntry],
) -> Result<Vec<TokenHolding>, LedgerError> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut accs: Vec<HoldingAcc> = Vec::new();

    for transfer in transfers {
        let contract = transfer
            .contract_address
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        let value = amount::parse_raw_amount(&transfer.value)?;

        let slot = *index.entry(contract).or_insert_with(|| {
            accs.push(HoldingAcc {
                first: transfer.clone(),
                net: BigDecimal::from(0),
                transfers: 0,
            });
            accs.len() - 1
        });

        let acc = &mut accs[slot];
        if transfer.to.eq_ignore_ascii_case(account) {
            acc.net = &acc.net + &value;
        }
        if transfer.from.eq_ignore_ascii_case(account) {
            acc.net = &acc.net - &value;
        }
        acc.transfers += 1;
    }

    accs.into_iter()
        .map(|acc| {
            let decimals = match acc.first.token_decimal.as_deref() {
                Some(raw) if !raw.trim().is_empty() => amount::parse_decimals(raw)?,
                _ => NATIVE_DECIMALS,
            };
            let (digits, _) = acc.net.with_scale(0).as_bigint_and_exponent();
            Ok(TokenHolding {
                contract_address: acc.first.contract_address.clone().unwrap_or_default(),
                token_name: acc.first.token_name.clone(),
                token_symbol: acc.first.token_symbol.clone(),
                token_decimal: acc.first.token_decimal.clone(),
                balance: digits.to_string(),
                balance_in_tokens: amount::scale_down(&acc.net, decimals),
                transfers: acc.transfers,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: serde_json::Value) -> LedgerEntry {
        serde_json::from_value(value).unwrap()
    }

    fn token_transfer(contract: &str, from: &str, to: &str, value: &str) -> LedgerEntry {
        entry(json!({
            "blockNumber": "100",
            "timeStamp": "1700000000",
            "hash": "0xhash",
            "from": from,
            "to": to,
            "value": value,
            "contractAddress": contract,
            "tokenName": "USD Coin",
            "tokenSymbol": "USDC",
            "tokenDecimal": "6"
        }))
    }

    #[test]
    fn test_iso_timestamp() {
        assert_eq!(iso_timestamp(0).unwrap(), "1970-01-01T00:00:00.000Z");
        assert_eq!(iso_timestamp(1700000000).unwrap(), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn test_midnight_utc() {
        let midnight = midnight_utc("2024-03-15").unwrap();
        assert_eq!(midnight.timestamp(), 1710460800);
        assert_eq!(iso_string(&midnight), "2024-03-15T00:00:00.000Z");
    }

    #[test]
    fn test_midnight_utc_rejects_bad_dates() {
        for date in ["", "2024-02-30", "15/03/2024", "2024-3"] {
            assert!(
                matches!(midnight_utc(date), Err(LedgerError::InvalidDate(_))),
                "expected InvalidDate for {:?}",
                date
            );
        }
    }

    #[test]
    fn test_normalize_native_entry() {
        let raw = entry(json!({
            "blockNumber": "18000000",
            "timeStamp": "1700000000",
            "hash": "0xaaa",
            "from": "0x1",
            "to": "0x2",
            "value": "1500000000000000000",
            "gasPrice": "20000000000",
            "gasUsed": "21000"
        }));
        let normalized = normalize_entry(raw, TransactionType::Normal).unwrap();
        assert_eq!(normalized.value_in_eth, Some(1.5));
        assert!(normalized.value_in_tokens.is_none());

        let json = serde_json::to_value(&normalized).unwrap();
        assert_eq!(json["valueInEth"], json!(1.5));
        assert_eq!(json["timestamp"], json!("2023-11-14T22:13:20.000Z"));
        assert_eq!(json["type"], json!("normal"));
        assert_eq!(json["gasUsed"], json!("21000"));
        assert!(json.get("valueInTokens").is_none());
    }

    #[test]
    fn test_normalize_token_entry_uses_own_decimals() {
        let raw = token_transfer("0xc0ffee", "0x1", "0x2", "2500000");
        let normalized = normalize_entry(raw, TransactionType::Token).unwrap();
        assert_eq!(normalized.value_in_tokens, Some(2.5));
        assert!(normalized.value_in_eth.is_none());
    }

    #[test]
    fn test_token_entry_without_decimals_is_invalid() {
        let raw = entry(json!({
            "blockNumber": "1",
            "timeStamp": "1700000000",
            "hash": "0x1",
            "from": "0x1",
            "to": "0x2",
            "value": "10"
        }));
        assert!(matches!(
            normalize_entry(raw, TransactionType::Token),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_internal_type_preserved_as_call_type() {
        let raw = entry(json!({
            "blockNumber": "1",
            "timeStamp": "1700000000",
            "hash": "0x1",
            "from": "0x1",
            "to": "0x2",
            "value": "0",
            "type": "call",
            "traceId": "0_1"
        }));
        let normalized = normalize_entry(raw, TransactionType::Internal).unwrap();
        let json = serde_json::to_value(&normalized).unwrap();
        assert_eq!(json["type"], json!("internal"));
        assert_eq!(json["callType"], json!("call"));
        assert_eq!(json["traceId"], json!("0_1"));
    }

    #[test]
    fn test_bad_timestamp_is_invalid_date() {
        let raw = entry(json!({
            "blockNumber": "1",
            "timeStamp": "yesterday",
            "hash": "0x1",
            "from": "0x1",
            "to": "0x2",
            "value": "0"
        }));
        assert!(matches!(
            normalize_entry(raw, TransactionType::Normal),
            Err(LedgerError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_bad_value_fails_whole_batch() {
        let good = token_transfer("0xc", "0x1", "0x2", "1");
        let bad = token_transfer("0xc", "0x1", "0x2", "not-a-number");
        assert!(normalize_entries(vec![good, bad], TransactionType::Token).is_err());
    }

    #[test]
    fn test_token_holdings_net_flow() {
        let me = "0xAbC";
        let transfers = vec![
            token_transfer("0xUSDC", "0xother", "0xabc", "5000000"),
            token_transfer("0xdai", "0xother", "0xabc", "1000000"),
            token_transfer("0xusdc", "0xABC", "0xother", "1500000"),
            token_transfer("0xusdc", "0xabc", "0xabc", "700000"),
        ];

        let holdings = token_holdings(me, &transfers).unwrap();
        assert_eq!(holdings.len(), 2);

        assert_eq!(holdings[0].contract_address, "0xUSDC");
        assert_eq!(holdings[0].balance, "3500000");
        assert_eq!(holdings[0].balance_in_tokens, 3.5);
        assert_eq!(holdings[0].transfers, 3);

        assert_eq!(holdings[1].contract_address, "0xdai");
        assert_eq!(holdings[1].balance, "1000000");
        assert_eq!(holdings[1].balance_in_tokens, 1.0);
    }

    #[test]
    fn test_token_holdings_negative_net() {
        let transfers = vec![token_transfer("0xc", "0xme", "0xother", "2000000")];
        let holdings = token_holdings("0xme", &transfers).unwrap();
        assert_eq!(holdings[0].balance, "-2000000");
        assert_eq!(holdings[0].balance_in_tokens, -2.0);
    }
}
