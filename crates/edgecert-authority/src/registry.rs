//! Application registry lookup client.
//!
//! Maps the IP address of a peer to the application bound to it by asking
//! the remote `IPApplicationLookupService`. A lookup either yields a
//! definitive [`LookupResult`] or fails with a [`LookupError`]; callers must
//! never treat an error as an authorization.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::Code;
use tracing::debug;

use edgecert_core::LookupResult;
use edgecert_proto::pb::IpApplicationLookupInfo;
use edgecert_proto::IpApplicationLookupServiceClient;

/// Default deadline of a single lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Pause between attempts while the registry is not ready.
const READY_BACKOFF: Duration = Duration::from_millis(50);

/// Errors that can occur during a lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid lookup endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("lookup did not complete within {0:?}")]
    Timeout(Duration),

    #[error("lookup transport failure: {0}")]
    Transport(#[from] tonic::Status),
}

/// Source of peer-to-application mappings.
#[async_trait]
pub trait ApplicationLookup: Send + Sync {
    /// Look up the application bound to `ip`.
    async fn lookup(&self, ip: IpAddr) -> Result<LookupResult, LookupError>;
}

/// gRPC client for the application registry.
///
/// Holds one lazily connected channel that is shared by all lookups; the
/// channel is cheap to clone and safe to use concurrently.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: IpApplicationLookupServiceClient<Channel>,
    endpoint: String,
    timeout: Duration,
}

impl RegistryClient {
    /// Create a client for `endpoint` without connecting yet.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect_lazy(
        endpoint: &str,
        timeout: Duration,
        tls: Option<ClientTlsConfig>,
    ) -> Result<Self, LookupError> {
        let invalid = |reason: String| LookupError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        let mut builder = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| invalid(e.to_string()))?
            .connect_timeout(timeout);
        if let Some(tls) = tls {
            builder = builder.tls_config(tls).map_err(|e| invalid(e.to_string()))?;
        }

        Ok(Self {
            client: IpApplicationLookupServiceClient::new(builder.connect_lazy()),
            endpoint: endpoint.to_string(),
            timeout,
        })
    }

    /// The configured registry endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The deadline applied to each lookup.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call_until_ready(&self, ip: IpAddr) -> Result<LookupResult, tonic::Status> {
        loop {
            let mut client = self.client.clone();
            let request = IpApplicationLookupInfo::from(ip);

            match client.get_application_by_ip(request).await {
                Ok(response) => return Ok(response.into_inner().into()),
                Err(status) if status.code() == Code::Unavailable => {
                    debug!(
                        endpoint = %self.endpoint,
                        error = %status,
                        "Registry not ready, retrying"
                    );
                    tokio::time::sleep(READY_BACKOFF).await;
                }
                Err(status) => return Err(status),
            }
        }
    }
}

#[async_trait]
impl ApplicationLookup for RegistryClient {
    async fn lookup(&self, ip: IpAddr) -> Result<LookupResult, LookupError> {
        // Dropping the in-flight call on timeout cancels the RPC.
        match tokio::time::timeout(self.timeout, self.call_until_ready(ip)).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(status)) if status.code() == Code::DeadlineExceeded => {
                Err(LookupError::Timeout(self.timeout))
            }
            Ok(Err(status)) => Err(LookupError::Transport(status)),
            Err(_) => Err(LookupError::Timeout(self.timeout)),
        }
    }
}
