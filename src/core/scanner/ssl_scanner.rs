// src/core/scanner/ssl_scanner.rs

//! Certificate inspector: performs a raw TLS handshake against
//! `host:443` and grades whatever certificate the peer presents.
//!
//! Certificate verification is intentionally disabled for this handshake
//! and this handshake only, because the point is to retrieve and grade
//! the certificate even when it is invalid. Every other network call in the
//! crate goes through a fully validating `reqwest` client; the
//! no-verification config must never leave this module.

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, ProtocolVersion, SignatureScheme};
use tokio::task::spawn_blocking;
use tracing::{debug, error, info, warn};
use x509_parser::prelude::*;

use crate::core::models::{ProbeResult, SslGrade, SslInfo};

const TLS_PORT: u16 = 443;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Inspects the TLS certificate of `host:443`.
///
/// Never fails: connection, handshake and parse errors all collapse into
/// a degraded worst-case result (`valid=false`, grade F) so a scan still
/// has something gradable to aggregate.
pub async fn run_ssl_scan(host: &str) -> ProbeResult<SslInfo> {
    info!(host, "Starting SSL/TLS certificate inspection.");
    let host_owned = host.to_string();

    debug!("Spawning blocking task for the TLS handshake.");
    let result = spawn_blocking(move || inspect_certificate(&host_owned))
        .await
        .unwrap_or_else(|e| {
            error!(panic = %e, "Blocking TLS inspection task panicked!");
            Err(format!("Inspection task panicked: {}", e))
        });

    match result {
        Ok(info) => {
            info!(grade = ?info.grade, valid = info.valid, days_until_expiry = info.days_until_expiry, "SSL/TLS inspection finished.");
            ProbeResult::Ok(info)
        }
        Err(reason) => {
            warn!(host, %reason, "TLS inspection failed, returning worst-case result.");
            ProbeResult::degraded(SslInfo::unreachable(), reason)
        }
    }
}

/// Synchronous handshake + certificate evaluation. Runs inside
/// `spawn_blocking`; returns `Err` only for the caller to convert into a
/// degraded result.
fn inspect_certificate(host: &str) -> Result<SslInfo, String> {
    inspect_certificate_at(host, TLS_PORT)
}

fn inspect_certificate_at(host: &str, port: u16) -> Result<SslInfo, String> {
    debug!(host, port, "Resolving and connecting TCP stream.");
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|e| format!("DNS resolution failed: {}", e))?
        .next()
        .ok_or_else(|| "DNS resolution returned no addresses".to_string())?;

    let mut sock = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
        .map_err(|e| format!("TCP connection failed: {}", e))?;
    sock.set_read_timeout(Some(CONNECT_TIMEOUT))
        .and_then(|_| sock.set_write_timeout(Some(CONNECT_TIMEOUT)))
        .map_err(|e| format!("Could not set socket timeouts: {}", e))?;

    debug!(host, "Performing TLS handshake with verification disabled.");
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| format!("Invalid server name: {}", e))?;
    let mut conn = ClientConnection::new(inspection_config()?, server_name)
        .map_err(|e| format!("TLS client setup failed: {}", e))?;

    while conn.is_handshaking() {
        conn.complete_io(&mut sock)
            .map_err(|e| format!("TLS handshake failed: {}", e))?;
    }

    let protocol_version = conn.protocol_version();
    let protocol = protocol_version.map(protocol_name);
    let cipher = conn
        .negotiated_cipher_suite()
        .map(|suite| format!("{:?}", suite.suite()));

    let cert_der = conn
        .peer_certificates()
        .and_then(|certs| certs.first())
        .ok_or_else(|| "Server did not present a certificate".to_string())?;

    let (_, x509) = parse_x509_certificate(cert_der.as_ref())
        .map_err(|e| format!("X.509 parse error: {}", e))?;
    info!(subject = %x509.subject(), issuer = %x509.issuer(), "Parsed peer certificate.");

    let validity = x509.validity();
    let valid_from = asn1_time_to_chrono_utc(&validity.not_before);
    let valid_to = asn1_time_to_chrono_utc(&validity.not_after);
    let evaluation = evaluate_validity(
        valid_from,
        valid_to,
        protocol_version == Some(ProtocolVersion::TLSv1_3),
        Utc::now(),
    );

    Ok(SslInfo {
        valid: evaluation.valid,
        issuer: x509.issuer().to_string(),
        valid_from,
        valid_to,
        days_until_expiry: evaluation.days_until_expiry,
        protocol,
        cipher,
        grade: evaluation.grade,
        errors: evaluation.errors,
    })
}

struct ValidityEvaluation {
    valid: bool,
    days_until_expiry: i64,
    grade: SslGrade,
    errors: Vec<String>,
}

/// Pure grading of a certificate validity window, applied in order:
/// invalid or expired → F; ≤30 days left → C; ≤90 days → B;
/// otherwise A+ on TLS 1.3, A on anything older.
fn evaluate_validity(
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    latest_protocol: bool,
    now: DateTime<Utc>,
) -> ValidityEvaluation {
    let days_until_expiry = valid_to.signed_duration_since(now).num_days();
    // Both window edges count as valid.
    let valid = now >= valid_from && now <= valid_to;

    let mut errors = Vec::new();
    if now < valid_from {
        errors.push("Certificate is not yet valid".to_string());
    }
    if now > valid_to {
        errors.push("Certificate has expired".to_string());
    }

    let grade = if !valid {
        SslGrade::F
    } else if days_until_expiry <= 30 {
        errors.push(format!("Certificate expires in {} days", days_until_expiry));
        SslGrade::C
    } else if days_until_expiry <= 90 {
        SslGrade::B
    } else if latest_protocol {
        SslGrade::APlus
    } else {
        SslGrade::A
    };

    ValidityEvaluation { valid, days_until_expiry, grade, errors }
}

fn protocol_name(version: ProtocolVersion) -> String {
    match version {
        ProtocolVersion::TLSv1_3 => "TLSv1.3".to_string(),
        ProtocolVersion::TLSv1_2 => "TLSv1.2".to_string(),
        other => format!("{:?}", other),
    }
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

/// Client config that accepts any certificate. Local to this module on
/// purpose; see the module docs for the isolation invariant.
fn inspection_config() -> Result<Arc<ClientConfig>, String> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(|e| format!("TLS client setup failed: {}", e))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate { provider }))
        .with_no_client_auth();
    Ok(Arc::new(config))
}

/// Accepts every server certificate. Signature checks still run so the
/// handshake itself stays honest; only chain/hostname validation is
/// skipped.
#[derive(Debug)]
struct AcceptAnyCertificate {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
