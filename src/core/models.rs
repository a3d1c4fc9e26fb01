// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Probe Result Wrapper ---

/// The outcome of a single probe.
///
/// Every probe that has a defined "worst case" value produces one of these
/// instead of an error: `Ok` when the target was actually inspected, and
/// `Degraded` when a network failure forced the probe to fall back to its
/// worst-case value. Both variants carry a fully usable value, so a scan
/// always reaches aggregation; the `reason` lets callers and logs tell a
/// genuine finding apart from a connection failure.
#[derive(Debug, Clone)]
pub enum ProbeResult<T> {
    Ok(T),
    Degraded { value: T, reason: String },
}

impl<T> ProbeResult<T> {
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self::Degraded { value, reason: reason.into() }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Ok(value) => value,
            Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Ok(value) => value,
            Self::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}

// --- Shared Enums ---

/// Severity level shared by vulnerabilities, probe outcomes and port risk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

/// The probe category a vulnerability was derived from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VulnerabilityType {
    Ssl,
    Headers,
    Xss,
    Sql,
    Cms,
    Ports,
    Other,
}

/// Certificate grade assigned by the certificate inspector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SslGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

/// Closed set of CMS platforms the fingerprinter knows about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CmsType {
    Wordpress,
    Drupal,
    Joomla,
    Magento,
    Other,
}

/// Observed state of a probed TCP port.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Closed,
    Filtered,
}

// --- Per-Probe Result Models ---

/// TLS certificate details collected by the certificate inspector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SslInfo {
    pub valid: bool,
    pub issuer: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    /// Signed; negative means the certificate has already expired.
    pub days_until_expiry: i64,
    pub protocol: Option<String>,
    pub cipher: Option<String>,
    pub grade: SslGrade,
    pub errors: Vec<String>,
}

impl SslInfo {
    /// Worst-case value used when no TLS connection could be established.
    pub fn unreachable() -> Self {
        Self {
            valid: false,
            issuer: String::new(),
            valid_from: DateTime::UNIX_EPOCH,
            valid_to: DateTime::UNIX_EPOCH,
            days_until_expiry: 0,
            protocol: None,
            cipher: None,
            grade: SslGrade::F,
            errors: vec!["Failed to connect".to_string()],
        }
    }
}

/// Presence flags for the seven security headers the analyzer checks,
/// plus the derived missing list and score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityHeaders {
    pub hsts: bool,
    pub x_frame_options: bool,
    pub x_content_type_options: bool,
    pub csp: bool,
    pub x_xss_protection: bool,
    pub referrer_policy: bool,
    pub permissions_policy: bool,
    pub missing_headers: Vec<String>,
    /// Invariant: `score == round((7 - missing) / 7 * 100)`.
    pub score: u8,
}

impl SecurityHeaders {
    /// Worst-case value used when the header fetch failed outright. The
    /// `"All headers"` sentinel is deliberately distinct from per-header
    /// names so consumers can tell the two cases apart.
    pub fn unreachable() -> Self {
        Self {
            hsts: false,
            x_frame_options: false,
            x_content_type_options: false,
            csp: false,
            x_xss_protection: false,
            referrer_policy: false,
            permissions_policy: false,
            missing_headers: vec!["All headers".to_string()],
            score: 0,
        }
    }
}

/// CMS fingerprinting result. `version` is never populated and
/// `known_vulnerabilities` is always empty in the current contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsInfo {
    pub detected: bool,
    pub cms_type: Option<CmsType>,
    pub version: Option<String>,
    pub known_vulnerabilities: Vec<String>,
}

impl CmsInfo {
    pub fn not_detected() -> Self {
        Self {
            detected: false,
            cms_type: None,
            version: None,
            known_vulnerabilities: Vec::new(),
        }
    }
}

/// One evaluated injection payload (XSS or SQLi arm).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub test_type: String,
    pub vulnerable: bool,
    pub payload: String,
    pub location: String,
    pub severity: Severity,
}

/// One record per reported port from the port surface probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortInfo {
    pub port: u16,
    pub state: PortState,
    pub service: Option<String>,
    pub version: Option<String>,
    pub risk: Severity,
}

// --- Aggregated Models ---

/// A single synthesized vulnerability. Immutable once created; the
/// aggregator is the sole producer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    #[serde(rename = "type")]
    pub vuln_type: VulnerabilityType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub affected: String,
    pub cve: Option<String>,
}

/// The complete findings bundle persisted with a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Findings {
    pub vulnerabilities: Vec<Vulnerability>,
    pub ssl_info: Option<SslInfo>,
    pub security_headers: SecurityHeaders,
    pub cms_detection: Option<CmsInfo>,
    pub xss_tests: Vec<ProbeOutcome>,
    pub sql_injection_tests: Vec<ProbeOutcome>,
    pub open_ports: Vec<PortInfo>,
}

// --- Scan Job ---

/// Job lifecycle status. `Completed` and `Failed` are terminal: a record
/// that reached either is never rewritten.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// The persisted scan job record. Created `pending` by the engine and
/// mutated only by it, through the transition helpers below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanJob {
    pub id: String,
    pub user_id: String,
    /// Normalized target origin, e.g. `https://example.com`.
    pub target: String,
    pub status: ScanStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub risk_score: Option<u8>,
    pub findings: Option<Findings>,
    pub error: Option<String>,
}

impl ScanJob {
    pub fn new(user_id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            target: target.into(),
            status: ScanStatus::Pending,
            started_at: Utc::now(),
            completed_at: None,
            risk_score: None,
            findings: None,
            error: None,
        }
    }

    pub fn mark_running(&mut self) {
        self.status = ScanStatus::Running;
    }

    pub fn complete(&mut self, findings: Findings, risk_score: u8) {
        self.status = ScanStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.findings = Some(findings);
        self.risk_score = Some(risk_score);
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = ScanStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.error = Some(error.into());
    }
}
