//! Clients for the remote scoring service and the dev-access endpoint.

pub mod actions;
pub mod dev_access;
pub mod neuroprofile;
pub mod payload;
pub mod response;

pub use actions::{A2Action, ActionSelection};
pub use dev_access::{AccessValidator, CheckAccessKeyResponse, DevAccessClient};
pub use neuroprofile::{NeuroprofileClient, NeuroprofileService, CONNECTION_ERROR_MESSAGE};
pub use response::{Narrowed, Neuroprofile, NeuroprofileResponse};

use thiserror::Error;

/// Errors raised while talking to a remote endpoint.
///
/// These never reach callers of the session controllers; the clients fold
/// them into their typed responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API config error: {0}")]
    Config(String),

    #[error("API network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("API serialization error: {0}")]
    Serialization(String),
}

/// Join a base URL and an endpoint path without doubling the slash.
pub(crate) fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
