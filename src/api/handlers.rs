use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use std::sync::Arc;

use crate::error::LedgerError;
use crate::ledger::amount::{self, NATIVE_DECIMALS};
use crate::ledger::entry::TransactionType;

use super::queries;
use super::types::*;
use super::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Messages an endpoint answers with when the explorer rejects the query or
/// anything else fails while serving it.
struct FailureMessages {
    upstream: &'static str,
    internal: &'static str,
}

const BALANCE: FailureMessages = FailureMessages {
    upstream: "Failed to fetch balance",
    internal: "Failed to fetch balance data",
};

const HISTORICAL_BALANCE: FailureMessages = FailureMessages {
    upstream: "Failed to fetch historical balance",
    internal: "Failed to fetch balance data",
};

const TOKEN_BALANCE: FailureMessages = FailureMessages {
    upstream: "Failed to fetch token balance",
    internal: "Failed to fetch token balance",
};

const TOKEN_TRANSFERS: FailureMessages = FailureMessages {
    upstream: "Failed to fetch token transactions",
    internal: "Failed to fetch token data",
};

const TOKEN_HOLDINGS: FailureMessages = FailureMessages {
    upstream: "Failed to fetch token balances",
    internal: "Failed to fetch token data",
};

const TRANSACTIONS: FailureMessages = FailureMessages {
    upstream: "Failed to fetch transactions",
    internal: "Failed to fetch transaction data",
};

fn failure_message(e: &LedgerError, messages: &FailureMessages) -> String {
    match e {
        LedgerError::MissingParameter(_)
        | LedgerError::InvalidParameter(_)
        | LedgerError::MissingCredential => e.to_string(),
        LedgerError::UpstreamFailure { .. } => messages.upstream.to_string(),
        LedgerError::TransportFailure(_)
        | LedgerError::InvalidDate(_)
        | LedgerError::InvalidAmount(_) => messages.internal.to_string(),
    }
}

fn api_error(e: LedgerError, messages: &FailureMessages) -> (StatusCode, Json<ErrorResponse>) {
    match &e {
        LedgerError::UpstreamFailure { message } => {
            tracing::warn!(upstream = %message, "{}", messages.upstream)
        }
        LedgerError::TransportFailure(_)
        | LedgerError::InvalidDate(_)
        | LedgerError::InvalidAmount(_) => tracing::error!(error = %e, "{}", messages.internal),
        _ => {}
    }

    let status = e.status_code();
    let error = failure_message(&e, messages);
    let details = match e {
        LedgerError::UpstreamFailure { message } => Some(message),
        _ => None,
    };

    (status, Json(ErrorResponse { error, details }))
}

// ============================================================
// Health & Dashboard
// ============================================================

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        upstream_configured: state.explorer.is_some(),
    })
}

pub async fn dashboard() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

// ============================================================
// Balances
// ============================================================

pub async fn balance(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BalanceParams>,
) -> ApiResult<BalanceResponse> {
    let messages = if non_empty(&params.date).is_some() {
        &HISTORICAL_BALANCE
    } else {
        &BALANCE
    };
    fetch_balance(&state, &params)
        .await
        .map(Json)
        .map_err(|e| api_error(e, messages))
}

async fn fetch_balance(
    state: &AppState,
    params: &BalanceParams,
) -> Result<BalanceResponse, LedgerError> {
    let address = required(&params.address, ADDRESS_REQUIRED)?;
    let explorer = state.explorer()?;
    queries::get_balance(explorer, address, non_empty(&params.date)).await
}

pub async fn token_balance(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TokenBalanceParams>,
) -> ApiResult<TokenBalanceResponse> {
    fetch_token_balance(&state, &params)
        .await
        .map(Json)
        .map_err(|e| api_error(e, &TOKEN_BALANCE))
}

async fn fetch_token_balance(
    state: &AppState,
    params: &TokenBalanceParams,
) -> Result<TokenBalanceResponse, LedgerError> {
    let address = required(&params.address, ADDRESS_REQUIRED)?;
    let contract = required(&params.contract_address, CONTRACT_ADDRESS_REQUIRED)?;
    let decimals = match non_empty(&params.decimals) {
        None => NATIVE_DECIMALS,
        Some(raw) => amount::parse_decimals(raw).map_err(|_| {
            LedgerError::InvalidParameter("decimals must be a non-negative integer".to_string())
        })?,
    };
    let explorer = state.explorer()?;
    queries::get_token_balance(explorer, address, contract, decimals).await
}

// ============================================================
// Transfers
// ============================================================

pub async fn tokens(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TokensParams>,
) -> ApiResult<TokensResponse> {
    if non_empty(&params.action) == Some("balances") {
        fetch_token_holdings(&state, &params)
            .await
            .map(|r| Json(TokensResponse::Holdings(r)))
            .map_err(|e| api_error(e, &TOKEN_HOLDINGS))
    } else {
        fetch_token_transfers(&state, &params)
            .await
            .map(|r| Json(TokensResponse::Transactions(r)))
            .map_err(|e| api_error(e, &TOKEN_TRANSFERS))
    }
}

async fn fetch_token_holdings(
    state: &AppState,
    params: &TokensParams,
) -> Result<TokenHoldingsResponse, LedgerError> {
    let address = required(&params.address, ADDRESS_REQUIRED)?;
    let start_block = parse_start_block(&params.start_block)?;
    let explorer = state.explorer()?;
    queries::get_token_holdings(explorer, address, start_block).await
}

async fn fetch_token_transfers(
    state: &AppState,
    params: &TokensParams,
) -> Result<TransactionsResponse, LedgerError> {
    let address = required(&params.address, ADDRESS_REQUIRED)?;
    let start_block = parse_start_block(&params.start_block)?;
    let page = parse_positive("page", &params.page, 1)?;
    let page_size = parse_positive(
        "pageSize",
        &params.page_size,
        state.config.api.default_page_size,
    )?;
    let explorer = state.explorer()?;
    queries::get_transactions(
        explorer,
        address,
        TransactionType::Token,
        start_block,
        page,
        page_size,
    )
    .await
}

pub async fn transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionParams>,
) -> ApiResult<TransactionsResponse> {
    fetch_transactions(&state, &params)
        .await
        .map(Json)
        .map_err(|e| api_error(e, &TRANSACTIONS))
}

async fn fetch_transactions(
    state: &AppState,
    params: &TransactionParams,
) -> Result<TransactionsResponse, LedgerError> {
    let address = required(&params.address, ADDRESS_REQUIRED)?;
    let kind = parse_transaction_type(&params.transaction_type)?;
    let start_block = parse_start_block(&params.start_block)?;
    let page = parse_positive("page", &params.page, 1)?;
    let page_size = parse_positive(
        "pageSize",
        &params.page_size,
        state.config.api.default_page_size,
    )?;
    let explorer = state.explorer()?;
    queries::get_transactions(explorer, address, kind, start_block, page, page_size).await
}

// ============================================================
// Overview
// ============================================================

/// The dashboard's search action in one call: balance, the address's own token
/// balance, then the first page of normal transfers.
///
/// Steps run in order and never cancel each other. The first failing step's
/// message is reported; a token balance failure is only logged.
pub async fn overview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OverviewParams>,
) -> ApiResult<OverviewResponse> {
    let address =
        required(&params.address, ADDRESS_REQUIRED).map_err(|e| api_error(e, &BALANCE))?;
    let start_block =
        parse_start_block(&params.start_block).map_err(|e| api_error(e, &TRANSACTIONS))?;
    let explorer = state.explorer().map_err(|e| api_error(e, &BALANCE))?;

    let mut response = OverviewResponse {
        address: address.to_string(),
        balance: None,
        token_balance: None,
        transactions: None,
        error: None,
    };

    match queries::get_balance(explorer, address, None).await {
        Ok(balance) => response.balance = Some(balance),
        Err(e) => {
            let (_, Json(body)) = api_error(e, &BALANCE);
            response.error = response.error.or(Some(body.error));
        }
    }

    match queries::get_token_balance(explorer, address, address, NATIVE_DECIMALS).await {
        Ok(balance) => response.token_balance = Some(balance),
        Err(e) => tracing::warn!(%address, error = %e, "Token balance lookup failed, continuing"),
    }

    let page_size = state.config.api.default_page_size;
    match queries::get_transactions(
        explorer,
        address,
        TransactionType::Normal,
        start_block,
        1,
        page_size,
    )
    .await
    {
        Ok(transactions) => response.transactions = Some(transactions),
        Err(e) => {
            let (_, Json(body)) = api_error(e, &TRANSACTIONS);
            response.error = response.error.or(Some(body.error));
        }
    }

    Ok(Json(response))
}
