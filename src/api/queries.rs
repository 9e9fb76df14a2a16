use chrono::Utc;

use crate::error::LedgerError;
use crate::explorer::ExplorerClient;
use crate::ledger::amount::{self, NATIVE_DECIMALS};
use crate::ledger::entry::{self, TransactionType};
use crate::ledger::pager;

use super::types::*;

// ============================================================
// Balances
// ============================================================

pub async fn get_balance(
    explorer: &ExplorerClient,
    address: &str,
    date: Option<&str>,
) -> Result<BalanceResponse, LedgerError> {
    let (raw, date_label, as_of) = match date {
        Some(date) => {
            let midnight = entry::midnight_utc(date)?;
            tracing::info!(%address, %date, "Fetching historical balance");
            let raw = explorer
                .historical_balance(address, midnight.timestamp())
                .await?;
            (raw, date.to_string(), midnight)
        }
        None => {
            tracing::info!(%address, "Fetching current balance");
            let raw = explorer.native_balance(address).await?;
            (raw, "current".to_string(), Utc::now())
        }
    };

    Ok(BalanceResponse {
        address: address.to_string(),
        balance: amount::normalize(&raw, NATIVE_DECIMALS)?,
        date: date_label,
        timestamp: entry::iso_string(&as_of),
    })
}

pub async fn get_token_balance(
    explorer: &ExplorerClient,
    address: &str,
    contract_address: &str,
    decimals: u32,
) -> Result<TokenBalanceResponse, LedgerError> {
    tracing::info!(%address, contract = %contract_address, "Fetching token balance");
    let raw = explorer.token_balance(address, contract_address).await?;

    Ok(TokenBalanceResponse {
        address: address.to_string(),
        contract_address: contract_address.to_string(),
        balance: amount::normalize(&raw, decimals)?,
        raw_balance: raw,
        timestamp: entry::iso_string(&Utc::now()),
    })
}

// ============================================================
// Transfers
// ============================================================

/// Fetch, normalize and paginate one kind of transfer listing.
pub async fn get_transactions(
    explorer: &ExplorerClient,
    address: &str,
    kind: TransactionType,
    start_block: u64,
    page: usize,
    page_size: usize,
) -> Result<TransactionsResponse, LedgerError> {
    let entries = explorer.transfers(kind, address, start_block).await?;
    tracing::info!(
        %address,
        kind = kind.as_str(),
        start_block,
        entries = entries.len(),
        "Fetched transfers"
    );

    let normalized = entry::normalize_entries(entries, kind)?;
    let (transactions, pagination) = pager::paginate(normalized, page, page_size);

    Ok(TransactionsResponse {
        address: address.to_string(),
        transactions,
        pagination,
        transaction_type: kind,
    })
}

pub async fn get_token_holdings(
    explorer: &ExplorerClient,
    address: &str,
    start_block: u64,
) -> Result<TokenHoldingsResponse, LedgerError> {
    let transfers = explorer
        .transfers(TransactionType::Token, address, start_block)
        .await?;
    let token_balances = entry::token_holdings(address, &transfers)?;
    tracing::info!(
        %address,
        transfers = transfers.len(),
        tokens = token_balances.len(),
        "Folded token holdings"
    );

    Ok(TokenHoldingsResponse {
        address: address.to_string(),
        total_tokens: token_balances.len(),
        token_balances,
    })
}
