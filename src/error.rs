use sdp::SimulcastError;
use thiserror::Error;

use crate::browser::Browser;

#[derive(Debug, Error)]
pub enum WebDriverError {
    #[error("failed to build request: {0}")]
    InvalidRequest(String),
    #[error("transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("driver responded with {status} {error}: {message}")]
    Protocol {
        status: u16,
        error: String,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum TestbedError {
    #[error(transparent)]
    Sdp(#[from] SimulcastError),
    #[error("webdriver: {0}")]
    WebDriver(#[from] WebDriverError),
    #[error("page script failed: {0}")]
    Script(String),
    #[error("ICE connection failed")]
    IceFailed,
    #[error("step {step} timed out")]
    StepTimeout { step: String },
    #[error("step {step} ran without a session description to work on")]
    MissingDescription { step: String },
    #[error("scenario cancelled")]
    Cancelled,
    #[error("{browser} session did not quit in time")]
    QuitTimeout { browser: Browser },
    #[error("unsupported browser {0}")]
    UnsupportedBrowser(String),
    #[error("invalid value {value:?} for {name}")]
    InvalidConfig { name: &'static str, value: String },
}
