//! certrequester: provisions node credentials from the cluster CSR API.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use edgecert_requester::{KubeCertificateApi, ProvisionedArtifacts, Provisioner};

#[derive(Parser, Debug)]
#[command(name = "certrequester")]
#[command(about = "Requests a node certificate from the cluster and stores it")]
#[command(version)]
struct Args {
    /// CSR config path
    #[arg(long = "cfg", default_value = "certrequest.json")]
    cfg: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Failure reasons go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse_from(normalize_args(std::env::args())) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(&args).await {
        Ok(artifacts) => {
            info!(
                dir = %artifacts.output_dir.display(),
                serial = %artifacts.serial_number,
                expires_at = %artifacts.not_after,
                "Node credentials provisioned"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Failed to generate certificate");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<ProvisionedArtifacts, Box<dyn std::error::Error>> {
    let config = kube::Config::infer().await?;
    let cluster_ca = config.root_cert.clone().unwrap_or_default();
    let client = kube::Client::try_from(config)?;

    let provisioner = Provisioner::new(KubeCertificateApi::new(client)).with_cluster_ca(cluster_ca);
    Ok(provisioner.provision(&args.cfg).await?)
}

/// Accept the single-dash `-cfg` spelling alongside `--cfg`.
fn normalize_args(args: impl IntoIterator<Item = String>) -> Vec<String> {
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            if index > 0 && (arg == "-cfg" || arg.starts_with("-cfg=")) {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}
