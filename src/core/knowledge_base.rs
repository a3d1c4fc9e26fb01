// src/core/knowledge_base.rs

//! Static, read-only catalog of every vulnerability the aggregator can
//! synthesize, with human-readable explanations and remediation steps.
//! Keeping this data-driven lets the report wording evolve independently
//! of the orchestration logic.

use crate::core::models::{Severity, VulnerabilityType};

/// All the fixed, human-readable information about one vulnerability code.
pub struct VulnerabilityDetail {
    /// Unique, machine-readable identifier (e.g. "SSL_CERT_INVALID").
    pub code: &'static str,
    /// Short, human-readable title. For header findings this is a
    /// template completed by the aggregator with the header name.
    pub title: &'static str,
    /// The probe category the finding derives from.
    pub vuln_type: VulnerabilityType,
    /// Baseline severity. The aggregator may escalate it (missing-header
    /// findings become `high` when more than four headers are absent).
    pub severity: Severity,
    pub description: &'static str,
    pub recommendation: &'static str,
}

pub const SSL_CERT_INVALID: &str = "SSL_CERT_INVALID";
pub const HEADER_MISSING: &str = "HEADER_MISSING";
pub const XSS_REFLECTED: &str = "XSS_REFLECTED";
pub const SQL_INJECTION: &str = "SQL_INJECTION";

static CATALOG: &[VulnerabilityDetail] = &[
    VulnerabilityDetail {
        code: SSL_CERT_INVALID,
        title: "Invalid SSL Certificate",
        vuln_type: VulnerabilityType::Ssl,
        severity: Severity::Critical,
        description: "The SSL/TLS certificate presented by the server is invalid, expired, or could not be verified. Browsers will warn visitors away from the site, and encrypted traffic may be exposed to interception.",
        recommendation: "Install a valid certificate from a trusted certificate authority and make sure it is renewed before its expiry date. Automated issuance (e.g. Let's Encrypt with auto-renewal) removes the risk of silent expiry.",
    },
    VulnerabilityDetail {
        code: HEADER_MISSING,
        title: "Missing Security Header",
        vuln_type: VulnerabilityType::Headers,
        severity: Severity::Medium,
        description: "The response does not set a recommended security header. Security headers instruct browsers to enforce protections such as transport security, framing restrictions, and content-type discipline; without them the site relies entirely on browser defaults.",
        recommendation: "Configure the web server or application framework to send this header on every response. Most servers support this with a one-line configuration change.",
    },
    VulnerabilityDetail {
        code: XSS_REFLECTED,
        title: "Cross-Site Scripting",
        vuln_type: VulnerabilityType::Xss,
        severity: Severity::High,
        description: "A crafted script payload supplied in a query parameter was reflected in the response, indicating the application may echo user input into pages without encoding. Attackers can use this to run scripts in visitors' browsers and steal sessions or credentials.",
        recommendation: "Encode all user-supplied data on output, validate input server-side, and deploy a Content-Security-Policy header to limit what injected scripts could do.",
    },
    VulnerabilityDetail {
        code: SQL_INJECTION,
        title: "SQL Injection",
        vuln_type: VulnerabilityType::Sql,
        severity: Severity::Critical,
        description: "A crafted SQL payload in a query parameter triggered a database error signature in the response, indicating user input may reach the database unsanitized. SQL injection can expose, alter, or destroy the entire database.",
        recommendation: "Use parameterized queries or an ORM for every database access, never concatenate user input into SQL, and suppress detailed database errors in production responses.",
    },
];

/// Looks up the catalog entry for a vulnerability code.
pub fn detail(code: &str) -> Option<&'static VulnerabilityDetail> {
    CATALOG.iter().find(|d| d.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_resolves() {
        for code in [SSL_CERT_INVALID, HEADER_MISSING, XSS_REFLECTED, SQL_INJECTION] {
            let entry = detail(code).expect("catalog entry missing");
            assert!(!entry.title.is_empty());
            assert!(!entry.description.is_empty());
            assert!(!entry.recommendation.is_empty());
        }
    }

    #[test]
    fn unknown_code_is_none() {
        assert!(detail("NOT_A_CODE").is_none());
    }

    #[test]
    fn baseline_severities() {
        assert_eq!(detail(SSL_CERT_INVALID).unwrap().severity, Severity::Critical);
        assert_eq!(detail(HEADER_MISSING).unwrap().severity, Severity::Medium);
        assert_eq!(detail(XSS_REFLECTED).unwrap().severity, Severity::High);
        assert_eq!(detail(SQL_INJECTION).unwrap().severity, Severity::Critical);
    }
}
