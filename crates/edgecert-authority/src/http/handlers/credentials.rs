//! Application credential request handler.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, ConnectInfo, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::info;

use edgecert_core::CredentialRequest;

use crate::crypto::assemble;
use crate::http::GatewayError;
use crate::state::AppState;

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Credential request endpoint.
///
/// Authorizes the peer through the registry, signs its CSR and returns the
/// credential bundle. Failures only report a status code.
pub async fn request_credentials(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let remote = connect_info.map(|ConnectInfo(addr)| addr);
    // An unreadable body (including one over the size limit) is a decode failure.
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return GatewayError::Decode(rejection.body_text()).into_response(),
    };

    match issue_credentials(&state, remote, &body).await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Run one credential request to completion, returning the encoded bundle.
///
/// Steps run in order and the first failure ends the request: decode,
/// extract peer, authorize, sign, assemble. The CA is never reached unless
/// the registry positively identified the peer. With
/// [`IssuancePolicy::require_cn_match`](crate::state::IssuancePolicy) the
/// CSR's Common Name must also equal the peer's application id.
pub async fn issue_credentials(
    state: &AppState,
    remote: Option<SocketAddr>,
    body: &[u8],
) -> Result<Vec<u8>, GatewayError> {
    let request: CredentialRequest =
        serde_json::from_slice(body).map_err(|e| GatewayError::Decode(e.to_string()))?;
    request
        .validate()
        .map_err(|e| GatewayError::Decode(e.to_string()))?;

    let peer = peer_ip(remote)?;

    let lookup = state.registry.lookup(peer).await?;
    if !lookup.is_authorized() {
        return Err(GatewayError::Unauthorized { peer });
    }

    let expected_cn = state
        .policy
        .require_cn_match
        .then_some(lookup.application_id.as_str());
    let signed = state.ca.sign_for(&request.csr, expected_cn)?;

    let bundle =
        assemble(&signed, &state.ca).map_err(|e| GatewayError::Encoding(e.to_string()))?;
    let encoded =
        serde_json::to_vec(&bundle).map_err(|e| GatewayError::Encoding(e.to_string()))?;

    info!(
        peer = %peer,
        app_id = %lookup.application_id,
        subject_cn = %signed.subject_cn,
        serial = %signed.serial_number,
        fingerprint = %signed.fingerprint,
        expires_at = %signed.not_after,
        "Application certificate issued"
    );

    Ok(encoded)
}

/// Host part of the connection's remote address.
fn peer_ip(remote: Option<SocketAddr>) -> Result<IpAddr, GatewayError> {
    let addr = remote.ok_or_else(|| {
        GatewayError::PeerExtraction("connection has no remote address".to_string())
    })?;
    // The registry knows IPv4 peers by their dotted form.
    Ok(addr.ip().to_canonical())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::Request;
    use rcgen::{
        CertificateParams, DistinguishedName, DnType, IsCa, KeyPair, KeyUsagePurpose,
    };
    use tower::ServiceExt;

    use edgecert_core::{CredentialBundle, LookupResult};

    use super::*;
    use crate::crypto::{inspect_certificate, CertificateAuthority};
    use crate::http::create_router;
    use crate::registry::{ApplicationLookup, LookupError};
    use crate::state::IssuancePolicy;

    #[derive(Clone, Copy)]
    enum Failure {
        Timeout,
        Transport,
    }

    struct FakeRegistry {
        apps: HashMap<IpAddr, String>,
        failure: Option<Failure>,
        calls: Mutex<Vec<IpAddr>>,
    }

    impl FakeRegistry {
        fn new(failure: Option<Failure>) -> Arc<Self> {
            Arc::new(Self {
                apps: HashMap::from([("10.0.0.5".parse().unwrap(), "app-1".to_string())]),
                failure,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<IpAddr> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ApplicationLookup for FakeRegistry {
        async fn lookup(&self, ip: IpAddr) -> Result<LookupResult, LookupError> {
            self.calls.lock().unwrap().push(ip);
            match self.failure {
                Some(Failure::Timeout) => Err(LookupError::Timeout(Duration::from_secs(3))),
                Some(Failure::Transport) => {
                    Err(LookupError::Transport(tonic::Status::unavailable("down")))
                }
                None => Ok(self
                    .apps
                    .get(&ip)
                    .map(|id| LookupResult::from_application_id(id.as_str()))
                    .unwrap_or_else(LookupResult::not_found)),
            }
        }
    }

    fn test_ca() -> CertificateAuthority {
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, "Gateway Test CA");
        params.distinguished_name = dn;
        params.is_ca = IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
        params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];

        let key_pair = KeyPair::generate().unwrap();
        let cert = params.self_signed(&key_pair).unwrap();
        CertificateAuthority::from_pem(&cert.pem(), &key_pair.serialize_pem(), 1).unwrap()
    }

    fn csr(cn: &str) -> String {
        let mut params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, cn);
        params.distinguished_name = dn;
        let key_pair = KeyPair::generate().unwrap();
        params.serialize_request(&key_pair).unwrap().pem().unwrap()
    }

    fn request(peer: Option<&str>, body: String) -> (Request<Body>, Option<SocketAddr>) {
        let addr = peer.map(|p| p.parse::<SocketAddr>().unwrap());
        let request = Request::builder()
            .method("POST")
            .uri("/auth")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        (request, addr)
    }

    async fn send(
        state: Arc<AppState>,
        peer: Option<&str>,
        body: String,
    ) -> (StatusCode, Vec<u8>) {
        let (request, addr) = request(peer, body);
        let router = match addr {
            Some(addr) => create_router(state).layer(MockConnectInfo(addr)),
            None => create_router(state),
        };

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn csr_body(cn: &str) -> String {
        serde_json::json!({ "csr": csr(cn) }).to_string()
    }

    #[tokio::test]
    async fn test_known_peer_gets_credentials() {
        let registry = FakeRegistry::new(None);
        let state = AppState::new(test_ca(), registry.clone());

        let (status, body) = send(state.clone(), Some("10.0.0.5:40000"), csr_body("app-1")).await;
        assert_eq!(status, StatusCode::OK);

        let bundle: CredentialBundle = serde_json::from_slice(&body).unwrap();
        assert_eq!(bundle.id, "app-1");
        assert_eq!(bundle.ca_chain.len(), 1);
        assert_eq!(bundle.ca_pool.len(), 1);

        let leaf = ::pem::parse(&bundle.certificate).unwrap();
        let details = inspect_certificate(leaf.contents()).unwrap();
        assert_eq!(details.issuer, state.ca.subject());
        assert_eq!(details.subject_cn.as_deref(), Some("app-1"));

        assert_eq!(registry.calls(), vec!["10.0.0.5".parse::<IpAddr>().unwrap()]);
        assert_eq!(state.ca.issued_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_peer_is_denied_without_signing() {
        let registry = FakeRegistry::new(None);
        let state = AppState::new(test_ca(), registry.clone());

        let (status, body) =
            send(state.clone(), Some("10.0.0.99:40000"), csr_body("app-1")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.is_empty());
        assert_eq!(state.ca.issued_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_peer_denied_before_csr_is_parsed() {
        let state = AppState::new(test_ca(), FakeRegistry::new(None));

        let body = serde_json::json!({ "csr": "not a csr" }).to_string();
        let (status, _) = send(state.clone(), Some("10.0.0.99:40000"), body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(state.ca.issued_count(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failures_fail_closed() {
        for failure in [Failure::Timeout, Failure::Transport] {
            let state = AppState::new(test_ca(), FakeRegistry::new(Some(failure)));

            let (status, body) =
                send(state.clone(), Some("10.0.0.5:40000"), csr_body("app-1")).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(body.is_empty());
            assert_eq!(state.ca.issued_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_server_error() {
        let registry = FakeRegistry::new(None);
        let state = AppState::new(test_ca(), registry.clone());

        for body in ["not json", "{}", r#"{"csr": ""}"#, r#"{"csr": 42}"#] {
            let (status, _) = send(state.clone(), Some("10.0.0.5:40000"), body.to_string()).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "body {:?}", body);
        }
        assert!(registry.calls().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_body_is_server_error() {
        let registry = FakeRegistry::new(None);
        let state = AppState::new(test_ca(), registry.clone());

        let body = serde_json::json!({ "csr": "A".repeat(3 * 1024 * 1024) }).to_string();
        let (status, body) = send(state.clone(), Some("10.0.0.5:40000"), body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
        assert!(registry.calls().is_empty());
        assert_eq!(state.ca.issued_count(), 0);
    }

    #[tokio::test]
    async fn test_cn_must_match_application_when_required() {
        let policy = IssuancePolicy {
            require_cn_match: true,
        };
        let state = AppState::with_policy(test_ca(), FakeRegistry::new(None), policy);

        let (status, body) = send(state.clone(), Some("10.0.0.5:40000"), csr_body("app-2")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
        assert_eq!(state.ca.issued_count(), 0);

        let (status, _) = send(state.clone(), Some("10.0.0.5:40000"), csr_body("app-1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.ca.issued_count(), 1);
    }

    #[tokio::test]
    async fn test_cn_not_checked_by_default() {
        let state = AppState::new(test_ca(), FakeRegistry::new(None));

        let (status, body) = send(state, Some("10.0.0.5:40000"), csr_body("app-2")).await;
        assert_eq!(status, StatusCode::OK);
        let bundle: CredentialBundle = serde_json::from_slice(&body).unwrap();
        assert_eq!(bundle.id, "app-2");
    }

    #[tokio::test]
    async fn test_missing_peer_address_is_server_error() {
        let registry = FakeRegistry::new(None);
        let state = AppState::new(test_ca(), registry.clone());

        let (status, _) = send(state, None, csr_body("app-1")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(registry.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_csr_from_known_peer_is_server_error() {
        let state = AppState::new(test_ca(), FakeRegistry::new(None));

        let body = serde_json::json!({ "csr": "-----BEGIN CERTIFICATE REQUEST-----\nAAAA\n-----END CERTIFICATE REQUEST-----\n" }).to_string();
        let (status, body) = send(state.clone(), Some("10.0.0.5:40000"), body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.is_empty());
        assert_eq!(state.ca.issued_count(), 0);
    }

    #[tokio::test]
    async fn test_ipv4_mapped_peer_is_canonicalized() {
        let registry = FakeRegistry::new(None);
        let state = AppState::new(test_ca(), registry.clone());

        let (status, _) = send(state, Some("[::ffff:10.0.0.5]:40000"), csr_body("app-1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(registry.calls(), vec!["10.0.0.5".parse::<IpAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn test_health() {
        let state = AppState::new(test_ca(), FakeRegistry::new(None));
        let response = create_router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
