// src/core/scanner/injection_scanner.rs

//! Reflected-XSS and SQL-injection testers.
//!
//! Both arms append a fixed payload list to the target as a query
//! parameter and look for coarse signatures in the response body:
//! reflection of the literal payload (or `alert`) for XSS, database
//! error strings for SQLi. Substring matching is deliberately coarse and
//! will both under- and over-report; that is the implemented contract,
//! not an oversight.
//!
//! Failure containment is per payload: a network error on one request is
//! logged and skipped, the remaining payloads still run, and only the
//! payloads that were actually evaluated produce outcomes. There is no
//! aggregate "probe failed" signal at this layer (known limitation).

use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::models::{ProbeOutcome, Severity};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REDIRECTS: usize = 3;

const XSS_TEST_TYPE: &str = "reflected_xss";
const SQLI_TEST_TYPE: &str = "sql_injection";

const XSS_PAYLOADS: [&str; 3] = [
    "<script>alert('XSS')</script>",
    "<img src=x onerror=alert('XSS')>",
    "\"><svg onload=alert(1)>",
];

const SQLI_PAYLOADS: [&str; 4] = [
    "'",
    "' OR '1'='1",
    "' OR '1'='1' --",
    "1' UNION SELECT NULL--",
];

/// Case-sensitive database error signatures checked in SQLi responses.
const SQL_ERROR_SIGNATURES: [&str; 3] = ["SQL syntax", "mysql", "database error"];

/// Runs the reflected-XSS payload list against `target?q=<payload>`.
pub async fn run_xss_scan(target: &str) -> Vec<ProbeOutcome> {
    info!(target, "Starting reflected-XSS probe.");
    let outcomes = run_payloads(
        target,
        "q",
        &XSS_PAYLOADS,
        XSS_TEST_TYPE,
        Severity::High,
        is_xss_reflected,
    )
    .await;
    info!(
        evaluated = outcomes.len(),
        vulnerable = outcomes.iter().filter(|o| o.vulnerable).count(),
        "Reflected-XSS probe finished."
    );
    outcomes
}

/// Runs the SQL-injection payload list against `target?id=<payload>`.
pub async fn run_sqli_scan(target: &str) -> Vec<ProbeOutcome> {
    info!(target, "Starting SQL-injection probe.");
    let outcomes = run_payloads(
        target,
        "id",
        &SQLI_PAYLOADS,
        SQLI_TEST_TYPE,
        Severity::Critical,
        |body, _| has_sql_error_signature(body),
    )
    .await;
    info!(
        evaluated = outcomes.len(),
        vulnerable = outcomes.iter().filter(|o| o.vulnerable).count(),
        "SQL-injection probe finished."
    );
    outcomes
}

/// Shared payload loop. Each payload is one GET with the payload
/// URL-encoded into `param`; `detect(body, payload)` decides whether the
/// response marks the target vulnerable for that payload.
async fn run_payloads(
    target: &str,
    param: &str,
    payloads: &[&str],
    test_type: &str,
    vulnerable_severity: Severity,
    detect: impl Fn(&str, &str) -> bool,
) -> Vec<ProbeOutcome> {
    let client = match reqwest::Client::builder()
        .user_agent(crate::core::scanner::USER_AGENT)
        .timeout(PROBE_TIMEOUT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to build HTTP client for injection probe.");
            return Vec::new();
        }
    };

    let mut outcomes = Vec::new();
    for &payload in payloads {
        let request = client.get(target).query(&[(param, payload)]);
        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                // Containment is per payload: skip and keep going.
                warn!(target, payload, error = %e, "Payload request failed, skipping.");
                continue;
            }
        };
        let location = response.url().to_string();
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(target, payload, error = %e, "Failed to read response body, skipping.");
                continue;
            }
        };

        let vulnerable = detect(&body, payload);
        debug!(payload, vulnerable, "Evaluated payload.");
        outcomes.push(ProbeOutcome {
            test_type: test_type.to_string(),
            vulnerable,
            payload: payload.to_string(),
            location,
            severity: if vulnerable { vulnerable_severity } else { Severity::Info },
        });
    }
    outcomes
}

/// XSS detection: the raw body contains the literal payload or `alert`.
fn is_xss_reflected(body: &str, payload: &str) -> bool {
    body.contains(payload) || body.contains("alert")
}

/// SQLi detection: any known database error signature, case-sensitive.
fn has_sql_error_signature(body: &str) -> bool {
    SQL_ERROR_SIGNATURES.iter().any(|sig| body.contains(sig))
}
