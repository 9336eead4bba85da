//! edgecert credential authority server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use edgecert_authority::crypto::CertificateAuthority;
use edgecert_authority::http::create_router;
use edgecert_authority::tls::NodeCredentials;
use edgecert_authority::{AppState, Config, IssuancePolicy, RegistryClient};

#[derive(Parser, Debug)]
#[command(name = "edgecert-authority")]
#[command(about = "Issues application certificates to registered edge peers")]
#[command(version)]
struct Args {
    /// HTTP bind address for the credential endpoint
    #[arg(long, env = "EDGECERT_HTTP_ADDR", default_value = "0.0.0.0:8080")]
    http_addr: String,

    /// CA certificate file (PEM, signing CA first)
    #[arg(long, env = "EDGECERT_CA_CERT", default_value = "certs/ca.crt")]
    ca_cert: PathBuf,

    /// CA private key file (PEM)
    #[arg(long, env = "EDGECERT_CA_KEY", default_value = "certs/ca.key")]
    ca_key: PathBuf,

    /// Application registry gRPC endpoint
    #[arg(long, env = "EDGECERT_LOOKUP_ENDPOINT", default_value = "http://127.0.0.1:42101")]
    lookup_endpoint: String,

    /// Deadline of a registry lookup in milliseconds
    #[arg(long, env = "EDGECERT_LOOKUP_TIMEOUT_MS", default_value = "3000")]
    lookup_timeout_ms: u64,

    /// Application certificate validity in days
    #[arg(long, env = "EDGECERT_CERT_VALIDITY_DAYS", default_value = "7")]
    cert_validity_days: u32,

    /// Node credential directory for reaching the registry over mTLS
    #[arg(long, env = "EDGECERT_LOOKUP_TLS_DIR")]
    lookup_tls_dir: Option<PathBuf>,

    /// TLS server name of the registry (defaults to the endpoint host)
    #[arg(long, env = "EDGECERT_LOOKUP_TLS_DOMAIN")]
    lookup_tls_domain: Option<String>,

    /// Only sign CSRs whose Common Name equals the peer's application id
    #[arg(long, env = "EDGECERT_REQUIRE_CN_MATCH")]
    require_cn_match: bool,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            http_bind_addr: args.http_addr,
            ca_cert_path: args.ca_cert,
            ca_key_path: args.ca_key,
            cert_validity_days: args.cert_validity_days,
            lookup_endpoint: args.lookup_endpoint,
            lookup_timeout: Duration::from_millis(args.lookup_timeout_ms),
            lookup_tls_dir: args.lookup_tls_dir,
            lookup_tls_domain: args.lookup_tls_domain,
            require_cn_match: args.require_cn_match,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from(Args::parse());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let http_addr: SocketAddr = config.http_bind_addr.parse()?;

    // Without a CA there is nothing to serve.
    let ca = CertificateAuthority::from_files(
        &config.ca_cert_path,
        &config.ca_key_path,
        config.cert_validity_days,
    )
    .map_err(|e| {
        error!(
            ca_cert = %config.ca_cert_path.display(),
            error = %e,
            "Failed to load Certificate Authority"
        );
        e
    })?;
    info!(
        ca_cert = %config.ca_cert_path.display(),
        subject = %ca.subject(),
        validity_days = config.cert_validity_days,
        "Certificate Authority loaded"
    );

    let tls = match &config.lookup_tls_dir {
        Some(dir) => {
            let credentials = NodeCredentials::load(dir)?;
            info!(dir = %dir.display(), "Registry lookups use mTLS");
            Some(credentials.client_tls_config(config.lookup_tls_domain.as_deref()))
        }
        None => None,
    };

    let registry =
        RegistryClient::connect_lazy(&config.lookup_endpoint, config.lookup_timeout, tls)?;
    info!(
        endpoint = %registry.endpoint(),
        timeout_ms = registry.timeout().as_millis() as u64,
        "Registry client configured"
    );

    let policy = IssuancePolicy {
        require_cn_match: config.require_cn_match,
    };
    if policy.require_cn_match {
        info!("CSR Common Names must match the peer's application id");
    }
    let state = AppState::with_policy(ca, Arc::new(registry), policy);
    let router = create_router(state);

    let listener = TcpListener::bind(http_addr).await?;
    info!("HTTP server listening on {} (credentials)", http_addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Credential authority stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
