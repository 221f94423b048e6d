use reqwest::StatusCode;
use shared::error::ValidationError;
use thiserror::Error;

/// Why `GET /api/config` did not produce a usable snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("config request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("config endpoint answered {0}")]
    Status(StatusCode),
    #[error("config body is not a valid configuration document: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("config document rejected: {0}")]
    Invalid(#[from] ValidationError),
}

/// Why a command line did not reach the device.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("command request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("command endpoint answered {0}")]
    Status(StatusCode),
    #[error("command sink closed")]
    Closed,
}

/// A malformed entry in the control binding tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("control id is empty")]
    EmptyId,
    #[error("control id `{0}` contains whitespace")]
    MalformedId(String),
    #[error("control id `{0}` is bound more than once")]
    Duplicate(String),
}

/// Failure to assemble a control panel from its settings.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("invalid device url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid control bindings: {0}")]
    Bindings(#[from] BindingError),
}
