// src/core/aggregator.rs

//! Vulnerability aggregator: a pure transformation from raw probe
//! results to the uniform `Vulnerability` list. The aggregator is the
//! only producer of `Vulnerability` records; CMS detection and open
//! ports deliberately produce none (detection alone is not a
//! vulnerability in the current contract).

use tracing::debug;
use uuid::Uuid;

use crate::core::knowledge_base::{self, HEADER_MISSING, SQL_INJECTION, SSL_CERT_INVALID, XSS_REFLECTED};
use crate::core::models::{
    ProbeOutcome, SecurityHeaders, Severity, SslInfo, Vulnerability,
};

/// Missing-header findings escalate from medium to high when more than
/// this many headers are absent. The threshold applies uniformly to all
/// header findings in the same job.
const HEADER_ESCALATION_THRESHOLD: usize = 4;

/// Synthesizes the vulnerability list for one job.
pub fn aggregate(
    target: &str,
    ssl: &SslInfo,
    headers: &SecurityHeaders,
    xss: &[ProbeOutcome],
    sqli: &[ProbeOutcome],
) -> Vec<Vulnerability> {
    let mut vulnerabilities = Vec::new();

    if !ssl.valid {
        vulnerabilities.push(from_catalog(SSL_CERT_INVALID, None, target));
    }

    let header_severity = if headers.missing_headers.len() > HEADER_ESCALATION_THRESHOLD {
        Some(Severity::High)
    } else {
        None
    };
    for missing in &headers.missing_headers {
        let mut vuln = from_catalog(HEADER_MISSING, header_severity, target);
        vuln.title = format!("{}: {}", vuln.title, missing);
        vulnerabilities.push(vuln);
    }

    // One record per vulnerable outcome; no dedup by location. Multiple
    // payloads reflecting off the same endpoint each count.
    for outcome in xss.iter().filter(|o| o.vulnerable) {
        debug!(payload = %outcome.payload, "Recording XSS vulnerability.");
        vulnerabilities.push(from_catalog(XSS_REFLECTED, None, target));
    }
    for outcome in sqli.iter().filter(|o| o.vulnerable) {
        debug!(payload = %outcome.payload, "Recording SQL injection vulnerability.");
        vulnerabilities.push(from_catalog(SQL_INJECTION, None, target));
    }

    vulnerabilities
}

/// Builds a vulnerability from its catalog entry, optionally overriding
/// the baseline severity.
fn from_catalog(code: &str, severity: Option<Severity>, target: &str) -> Vulnerability {
    let detail = knowledge_base::detail(code)
        .unwrap_or_else(|| panic!("unknown vulnerability code {code}"));
    Vulnerability {
        id: Uuid::new_v4().to_string(),
        vuln_type: detail.vuln_type,
        severity: severity.unwrap_or(detail.severity),
        title: detail.title.to_string(),
        description: detail.description.to_string(),
        recommendation: detail.recommendation.to_string(),
        affected: target.to_string(),
        cve: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{SslGrade, VulnerabilityType};
    use chrono::Utc;

    const TARGET: &str = "https://example.com";

    fn valid_ssl() -> SslInfo {
        SslInfo {
            valid: true,
            issuer: "CN=Test CA".to_string(),
            valid_from: Utc::now(),
            valid_to: Utc::now(),
            days_until_expiry: 300,
            protocol: Some("TLSv1.3".to_string()),
            cipher: None,
            grade: SslGrade::APlus,
            errors: Vec::new(),
        }
    }

    fn headers_missing(count: usize) -> SecurityHeaders {
        let names = [
            "Strict-Transport-Security",
            "X-Frame-Options",
            "X-Content-Type-Options",
            "Content-Security-Policy",
            "X-XSS-Protection",
            "Referrer-Policy",
            "Permissions-Policy",
        ];
        SecurityHeaders {
            hsts: count < 1,
            x_frame_options: count < 2,
            x_content_type_options: count < 3,
            csp: count < 4,
            x_xss_protection: count < 5,
            referrer_policy: count < 6,
            permissions_policy: count < 7,
            missing_headers: names[..count].iter().map(|n| n.to_string()).collect(),
            score: 0,
        }
    }

    fn outcome(test_type: &str, vulnerable: bool, severity: Severity) -> ProbeOutcome {
        ProbeOutcome {
            test_type: test_type.to_string(),
            vulnerable,
            payload: "payload".to_string(),
            location: format!("{}/?q=payload", TARGET),
            severity,
        }
    }

    #[test]
    fn clean_results_produce_no_vulnerabilities() {
        let vulns = aggregate(TARGET, &valid_ssl(), &headers_missing(0), &[], &[]);
        assert!(vulns.is_empty());
    }

    #[test]
    fn invalid_ssl_is_one_critical() {
        let mut ssl = valid_ssl();
        ssl.valid = false;
        ssl.grade = SslGrade::F;
        let vulns = aggregate(TARGET, &ssl, &headers_missing(0), &[], &[]);
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].severity, Severity::Critical);
        assert_eq!(vulns[0].vuln_type, VulnerabilityType::Ssl);
        assert_eq!(vulns[0].title, "Invalid SSL Certificate");
        assert_eq!(vulns[0].affected, TARGET);
    }

    #[test]
    fn three_missing_headers_are_all_medium() {
        let vulns = aggregate(TARGET, &valid_ssl(), &headers_missing(3), &[], &[]);
        assert_eq!(vulns.len(), 3);
        assert!(vulns.iter().all(|v| v.severity == Severity::Medium));
        assert!(vulns.iter().all(|v| v.vuln_type == VulnerabilityType::Headers));
    }

    #[test]
    fn seven_missing_headers_are_all_high() {
        let vulns = aggregate(TARGET, &valid_ssl(), &headers_missing(7), &[], &[]);
        assert_eq!(vulns.len(), 7);
        assert!(vulns.iter().all(|v| v.severity == Severity::High));
    }

    #[test]
    fn header_titles_name_the_missing_header() {
        let vulns = aggregate(TARGET, &valid_ssl(), &headers_missing(1), &[], &[]);
        assert_eq!(vulns[0].title, "Missing Security Header: Strict-Transport-Security");
    }

    #[test]
    fn each_vulnerable_xss_outcome_counts() {
        let xss = vec![
            outcome("reflected_xss", true, Severity::High),
            outcome("reflected_xss", false, Severity::Info),
            outcome("reflected_xss", true, Severity::High),
        ];
        let vulns = aggregate(TARGET, &valid_ssl(), &headers_missing(0), &xss, &[]);
        assert_eq!(vulns.len(), 2);
        assert!(vulns.iter().all(|v| v.severity == Severity::High));
        assert!(vulns.iter().all(|v| v.title == "Cross-Site Scripting"));
    }

    #[test]
    fn vulnerable_sqli_outcome_is_critical() {
        let sqli = vec![outcome("sql_injection", true, Severity::Critical)];
        let vulns = aggregate(TARGET, &valid_ssl(), &headers_missing(0), &[], &sqli);
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].severity, Severity::Critical);
        assert_eq!(vulns[0].vuln_type, VulnerabilityType::Sql);
        assert_eq!(vulns[0].title, "SQL Injection");
    }

    #[test]
    fn degraded_header_sentinel_is_one_medium_finding() {
        let vulns = aggregate(TARGET, &valid_ssl(), &SecurityHeaders::unreachable(), &[], &[]);
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].severity, Severity::Medium);
        assert_eq!(vulns[0].title, "Missing Security Header: All headers");
    }

    #[test]
    fn vulnerability_ids_are_unique() {
        let vulns = aggregate(TARGET, &valid_ssl(), &headers_missing(7), &[], &[]);
        let mut ids: Vec<&str> = vulns.iter().map(|v| v.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), vulns.len());
    }
}
