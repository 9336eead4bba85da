//! The binary fails cleanly when the orchestrator cannot be reached.

use std::path::Path;
use std::process::Command;

use rcgen::{CertificateParams, IsCa, KeyPair};

const KUBECONFIG: &str = r#"apiVersion: v1
kind: Config
clusters:
- name: unreachable
  cluster:
    server: http://127.0.0.1:1
    certificate-authority: CA_PATH
contexts:
- name: unreachable
  context:
    cluster: unreachable
    user: nobody
current-context: unreachable
users:
- name: nobody
  user:
    token: test-token
"#;

/// Write a kubeconfig for an orchestrator nobody listens on.
fn write_kubeconfig(dir: &Path) -> std::path::PathBuf {
    let mut params = CertificateParams::default();
    params.is_ca = IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    let key_pair = KeyPair::generate().unwrap();
    let ca = params.self_signed(&key_pair).unwrap();
    let ca_path = dir.join("cluster-ca.pem");
    std::fs::write(&ca_path, ca.pem()).unwrap();

    let kubeconfig = dir.join("kubeconfig");
    let contents = KUBECONFIG.replace("CA_PATH", &ca_path.display().to_string());
    std::fs::write(&kubeconfig, contents).unwrap();
    kubeconfig
}

#[test]
fn unreachable_orchestrator_exits_with_failure_and_writes_nothing() {
    let root = tempfile::tempdir().unwrap();
    let kubeconfig = write_kubeconfig(root.path());

    let out = root.path().join("certs");
    let config = root.path().join("certrequest.json");
    let json = serde_json::json!({
        "csr": { "name": "edgenode-1", "subject": { "commonName": "edgenode-1" } },
        "signer": "example.com/node",
        "waitTimeSecs": 5,
        "outputDir": out,
    });
    std::fs::write(&config, json.to_string()).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_certrequester"))
        .arg("-cfg")
        .arg(&config)
        .env("KUBECONFIG", &kubeconfig)
        .env_remove("KUBERNETES_SERVICE_HOST")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
    assert!(!out.exists());
}

#[test]
fn missing_config_exits_with_failure() {
    let root = tempfile::tempdir().unwrap();
    let kubeconfig = write_kubeconfig(root.path());

    let output = Command::new(env!("CARGO_BIN_EXE_certrequester"))
        .arg("--cfg")
        .arg(root.path().join("missing.json"))
        .env("KUBECONFIG", &kubeconfig)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}
