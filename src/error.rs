use axum::http::StatusCode;
use thiserror::Error;

/// Failures while fetching and reshaping ledger data for one request.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{0}")]
    MissingParameter(&'static str),

    #[error("{0}")]
    InvalidParameter(String),

    #[error("Etherscan API key is not configured")]
    MissingCredential,

    #[error("upstream explorer reported failure: {message}")]
    UpstreamFailure { message: String },

    #[error("explorer request failed: {0}")]
    TransportFailure(String),

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
}

impl LedgerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::MissingParameter(_)
            | LedgerError::InvalidParameter(_)
            | LedgerError::UpstreamFailure { .. } => StatusCode::BAD_REQUEST,
            LedgerError::MissingCredential
            | LedgerError::TransportFailure(_)
            | LedgerError::InvalidDate(_)
            | LedgerError::InvalidAmount(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// The request URL carries `apikey`, so it is dropped before formatting.
impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        LedgerError::TransportFailure(e.without_url().to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::TransportFailure(format!("malformed explorer payload: {}", e))
    }
}
