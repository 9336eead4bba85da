//! Credential request failures and their HTTP mapping.

use std::net::IpAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::crypto::SigningError;
use crate::registry::LookupError;

/// Terminal outcome of a failed credential request.
///
/// Only the status code reaches the caller; the cause is logged.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to decode credential request: {0}")]
    Decode(String),

    #[error("cannot determine peer address: {0}")]
    PeerExtraction(String),

    #[error("registry lookup failed: {0}")]
    LookupTransport(#[from] LookupError),

    #[error("peer {peer} is not bound to any application")]
    Unauthorized { peer: IpAddr },

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("failed to encode credentials: {0}")]
    Encoding(String),
}

impl GatewayError {
    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is an expected outcome rather than a fault.
    pub fn is_denial(&self) -> bool {
        matches!(self, GatewayError::Unauthorized { .. })
    }

    fn log(&self) {
        match self {
            GatewayError::Unauthorized { peer } => {
                info!(peer = %peer, "Credential request denied: peer not registered");
            }
            GatewayError::Signing(SigningError::MalformedRequest(_))
            | GatewayError::Signing(SigningError::PolicyViolation(_))
            | GatewayError::Decode(_) => {
                warn!(error = %self, "Credential request rejected");
            }
            _ => {
                error!(error = %self, "Credential request failed");
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        self.log();
        self.status_code().into_response()
    }
}
