// src/core/scanner/mod.rs

// Public interface of the probe layer: one module per probe plus the
// fan-out that runs them all concurrently.
pub mod cms_scanner;
pub mod headers_scanner;
pub mod injection_scanner;
pub mod port_scanner;
pub mod ssl_scanner;

use tracing::{info, warn};

use self::cms_scanner::run_cms_scan;
use self::headers_scanner::run_headers_scan;
use self::injection_scanner::{run_sqli_scan, run_xss_scan};
use self::port_scanner::run_port_scan;
use self::ssl_scanner::run_ssl_scan;
use crate::core::models::{CmsInfo, PortInfo, ProbeOutcome, ProbeResult, SecurityHeaders, SslInfo};
use crate::core::target;

/// User agent sent by every HTTP-level probe.
pub const USER_AGENT: &str = concat!("Palisade/", env!("CARGO_PKG_VERSION"));

/// Raw results of one probe fan-out, before aggregation and scoring.
#[derive(Debug)]
pub struct ProbeReport {
    pub ssl: ProbeResult<SslInfo>,
    pub headers: ProbeResult<SecurityHeaders>,
    pub cms: ProbeResult<CmsInfo>,
    pub xss: Vec<ProbeOutcome>,
    pub sqli: Vec<ProbeOutcome>,
    pub open_ports: Vec<PortInfo>,
}

/// Runs every probe against the normalized target concurrently and joins
/// their results.
///
/// `tokio::join!` gives the fan-out/fan-in: all six arms (certificate,
/// headers, CMS, XSS, SQLi, port sweep) are in flight at once and the
/// function returns when the last one finishes. Individual probes
/// contain their own failures, so this fan-out itself cannot fail.
pub async fn run_all_probes(normalized_target: &str) -> ProbeReport {
    // TLS and port probes dial TCP themselves and want the bare host.
    let host = target::host_of(normalized_target).unwrap_or_else(|| normalized_target.to_string());

    info!(target = normalized_target, %host, "Fanning out probes.");
    let (ssl, headers, cms, xss, sqli, open_ports) = tokio::join!(
        run_ssl_scan(&host),
        run_headers_scan(normalized_target),
        run_cms_scan(normalized_target),
        run_xss_scan(normalized_target),
        run_sqli_scan(normalized_target),
        run_port_scan(&host),
    );

    for (probe, reason) in [
        ("ssl", ssl.degraded_reason()),
        ("headers", headers.degraded_reason()),
        ("cms", cms.degraded_reason()),
    ] {
        if let Some(reason) = reason {
            warn!(probe, reason, "Probe completed in degraded mode.");
        }
    }
    info!(target = normalized_target, "All probes joined.");

    ProbeReport { ssl, headers, cms, xss, sqli, open_ports }
}
