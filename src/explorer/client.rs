use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ExplorerConfig;
use crate::error::LedgerError;
use crate::ledger::entry::TransactionType;

use super::types::{Envelope, LedgerCategory, LedgerEntry, END_BLOCK};

/// Thin client over the explorer's `module=account` actions.
///
/// Every call is a single GET with no caching and no retry. Failures come back
/// as `UpstreamFailure` (status "0") or `TransportFailure` (network, HTTP status,
/// malformed JSON).
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: String,
    chain_id: Option<u64>,
    api_key: String,
}

impl ExplorerClient {
    pub fn new(config: &ExplorerConfig, api_key: String) -> eyre::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| eyre::eyre!("Failed to build explorer HTTP client: {}", e))?;

        // A base URL that already pins the chain keeps its own chainid.
        let chain_id = if config.base_url.contains("chainid=") {
            None
        } else {
            Some(config.chain_id)
        };

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            chain_id,
            api_key,
        })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        category: LedgerCategory,
        params: &[(&str, String)],
    ) -> Result<T, LedgerError> {
        let mut request = self.http.get(&self.base_url);
        if let Some(chain_id) = self.chain_id {
            request = request.query(&[("chainid", chain_id)]);
        }
        let request = request
            .query(&[("module", "account"), ("action", category.action())])
            .query(params)
            .query(&[("apikey", self.api_key.as_str())]);

        tracing::debug!(action = category.action(), "Querying explorer");

        let response = request.send().await?.error_for_status()?;
        let envelope: Envelope = response.json().await?;
        envelope.into_result()
    }

    /// Current native balance in smallest units.
    pub async fn native_balance(&self, address: &str) -> Result<String, LedgerError> {
        self.query(
            LedgerCategory::NativeBalance,
            &[("address", address.to_string()), ("tag", "latest".to_string())],
        )
        .await
    }

    /// Native balance as of `timestamp` (seconds since epoch), passed as `blockno`.
    pub async fn historical_balance(
        &self,
        address: &str,
        timestamp: i64,
    ) -> Result<String, LedgerError> {
        self.query(
            LedgerCategory::HistoricalBalance,
            &[
                ("address", address.to_string()),
                ("blockno", timestamp.to_string()),
            ],
        )
        .await
    }

    pub async fn token_balance(
        &self,
        address: &str,
        contract_address: &str,
    ) -> Result<String, LedgerError> {
        self.query(
            LedgerCategory::TokenBalance,
            &[
                ("contractaddress", contract_address.to_string()),
                ("address", address.to_string()),
                ("tag", "latest".to_string()),
            ],
        )
        .await
    }

    /// Transfers of one kind touching `address`, newest first.
    pub async fn transfers(
        &self,
        kind: TransactionType,
        address: &str,
        start_block: u64,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        self.query(
            kind.category(),
            &[
                ("address", address.to_string()),
                ("startblock", start_block.to_string()),
                ("endblock", END_BLOCK.to_string()),
                ("sort", "desc".to_string()),
            ],
        )
        .await
    }
}
