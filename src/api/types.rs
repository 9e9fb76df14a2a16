use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::entry::{NormalizedEntry, TokenHolding, TransactionType};
use crate::ledger::pager::PaginationWindow;

pub const ADDRESS_REQUIRED: &str = "Address is required";
pub const CONTRACT_ADDRESS_REQUIRED: &str = "Contract address is required";

// ============================================================
// Query param helpers
// ============================================================

/// Empty query values count as absent.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn required<'a>(
    value: &'a Option<String>,
    message: &'static str,
) -> Result<&'a str, LedgerError> {
    non_empty(value).ok_or(LedgerError::MissingParameter(message))
}

/// Parse a 1-based page number or page size; zero and negatives are rejected.
pub fn parse_positive(
    name: &str,
    value: &Option<String>,
    default: usize,
) -> Result<usize, LedgerError> {
    match non_empty(value) {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(LedgerError::InvalidParameter(format!(
                "{} must be a positive integer",
                name
            ))),
        },
    }
}

pub fn parse_start_block(value: &Option<String>) -> Result<u64, LedgerError> {
    match non_empty(value) {
        None => Ok(0),
        Some(raw) => raw.parse::<u64>().map_err(|_| {
            LedgerError::InvalidParameter("startBlock must be a non-negative integer".to_string())
        }),
    }
}

pub fn parse_transaction_type(value: &Option<String>) -> Result<TransactionType, LedgerError> {
    match non_empty(value) {
        None | Some("normal") => Ok(TransactionType::Normal),
        Some("internal") => Ok(TransactionType::Internal),
        Some(other) => Err(LedgerError::InvalidParameter(format!(
            "Unsupported transaction type '{}', expected 'normal' or 'internal'",
            other
        ))),
    }
}

// ============================================================
// Query params
// ============================================================

#[derive(Debug, Deserialize)]
pub struct BalanceParams {
    pub address: Option<String>,
    /// `YYYY-MM-DD`; absent means the latest balance.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceParams {
    pub address: Option<String>,
    pub contract_address: Option<String>,
    pub decimals: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensParams {
    pub address: Option<String>,
    pub action: Option<String>,
    pub start_block: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
    pub address: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    pub start_block: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewParams {
    pub address: Option<String>,
    pub start_block: Option<String>,
}

// ============================================================
// Response types
// ============================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub upstream_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub address: String,
    pub balance: f64,
    /// "current" or the requested `YYYY-MM-DD`.
    pub date: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceResponse {
    pub address: String,
    pub contract_address: String,
    pub balance: f64,
    pub raw_balance: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    pub address: String,
    pub transactions: Vec<NormalizedEntry>,
    pub pagination: PaginationWindow,
    pub transaction_type: TransactionType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenHoldingsResponse {
    pub address: String,
    pub token_balances: Vec<TokenHolding>,
    pub total_tokens: usize,
}

/// `/tokens` answers with either shape depending on `action`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TokensResponse {
    Holdings(TokenHoldingsResponse),
    Transactions(TransactionsResponse),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<BalanceResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_balance: Option<TokenBalanceResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<TransactionsResponse>,
    /// First failing step's message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
