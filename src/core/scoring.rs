// src/core/scoring.rs

//! Risk scorer: a pure, deterministic function from aggregated findings
//! to a single 0-100 integer. Called exactly once per completed job,
//! with the final probe results, never with partial results for a job
//! that is still running.

use crate::core::models::{ProbeOutcome, SecurityHeaders, Severity, SslInfo, Vulnerability};

const SSL_INVALID_PENALTY: i32 = 30;
const MISSING_HEADER_PENALTY: i32 = 3;
const XSS_FLAT_PENALTY: i32 = 15;
const SQLI_FLAT_PENALTY: i32 = 20;

/// Computes the composite risk score.
///
/// Starts at 100 and subtracts, in order: the SSL penalty (invalid −30,
/// else grade F −25 / C −15 / B −10), 3 per entry in `missing_headers`,
/// a per-vulnerability penalty by severity (critical −20, high −15,
/// medium −10, low −5), and flat penalties when any XSS (−15) or SQLi
/// (−20) outcome came back vulnerable. The result is clamped to [0, 100].
pub fn risk_score(
    ssl: Option<&SslInfo>,
    headers: &SecurityHeaders,
    vulnerabilities: &[Vulnerability],
    xss: &[ProbeOutcome],
    sqli: &[ProbeOutcome],
) -> u8 {
    let mut score: i32 = 100;

    if let Some(ssl) = ssl {
        if !ssl.valid {
            score -= SSL_INVALID_PENALTY;
        } else {
            score -= grade_penalty(ssl);
        }
    }

    score -= MISSING_HEADER_PENALTY * headers.missing_headers.len() as i32;

    for vuln in vulnerabilities {
        score -= severity_penalty(vuln.severity);
    }

    if xss.iter().any(|o| o.vulnerable) {
        score -= XSS_FLAT_PENALTY;
    }
    if sqli.iter().any(|o| o.vulnerable) {
        score -= SQLI_FLAT_PENALTY;
    }

    score.clamp(0, 100) as u8
}

fn grade_penalty(ssl: &SslInfo) -> i32 {
    use crate::core::models::SslGrade::*;
    match ssl.grade {
        F => 25,
        C => 15,
        B => 10,
        APlus | A | D => 0,
    }
}

fn severity_penalty(severity: Severity) -> i32 {
    match severity {
        Severity::Critical => 20,
        Severity::High => 15,
        Severity::Medium => 10,
        Severity::Low => 5,
        Severity::Info => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{SslGrade, VulnerabilityType};
    use chrono::Utc;
    use rand::prelude::*;

    fn ssl_with_grade(grade: SslGrade, valid: bool) -> SslInfo {
        SslInfo {
            valid,
            issuer: "CN=Test CA".to_string(),
            valid_from: Utc::now(),
            valid_to: Utc::now(),
            days_until_expiry: if valid { 200 } else { -10 },
            protocol: Some("TLSv1.3".to_string()),
            cipher: None,
            grade,
            errors: Vec::new(),
        }
    }

    fn headers_with_missing(count: usize) -> SecurityHeaders {
        let mut headers = SecurityHeaders {
            hsts: true,
            x_frame_options: true,
            x_content_type_options: true,
            csp: true,
            x_xss_protection: true,
            referrer_policy: true,
            permissions_policy: true,
            missing_headers: Vec::new(),
            score: 100,
        };
        for i in 0..count {
            headers.missing_headers.push(format!("Header-{}", i));
        }
        headers
    }

    fn vuln(severity: Severity) -> Vulnerability {
        Vulnerability {
            id: "v".to_string(),
            vuln_type: VulnerabilityType::Other,
            severity,
            title: String::new(),
            description: String::new(),
            recommendation: String::new(),
            affected: String::new(),
            cve: None,
        }
    }

    fn outcome(vulnerable: bool) -> ProbeOutcome {
        ProbeOutcome {
            test_type: "t".to_string(),
            vulnerable,
            payload: String::new(),
            location: String::new(),
            severity: if vulnerable { Severity::High } else { Severity::Info },
        }
    }

    #[test]
    fn perfect_scan_scores_100() {
        let ssl = ssl_with_grade(SslGrade::APlus, true);
        assert_eq!(risk_score(Some(&ssl), &headers_with_missing(0), &[], &[], &[]), 100);
    }

    #[test]
    fn worked_example_scores_54() {
        // Grade B (−10), 2 missing headers (−6), one high vulnerability
        // (−15) plus the flat XSS penalty (−15) = 54.
        let ssl = ssl_with_grade(SslGrade::B, true);
        let headers = headers_with_missing(2);
        let vulns = vec![vuln(Severity::High)];
        let xss = vec![outcome(true)];
        assert_eq!(risk_score(Some(&ssl), &headers, &vulns, &xss, &[]), 54);
    }

    #[test]
    fn invalid_ssl_outweighs_its_grade() {
        let ssl = ssl_with_grade(SslGrade::F, false);
        // −30 for invalid, not −30−25.
        assert_eq!(risk_score(Some(&ssl), &headers_with_missing(0), &[], &[], &[]), 70);
    }

    #[test]
    fn grade_penalties() {
        for (grade, expected) in [
            (SslGrade::F, 75),
            (SslGrade::C, 85),
            (SslGrade::B, 90),
            (SslGrade::A, 100),
            (SslGrade::APlus, 100),
        ] {
            let ssl = ssl_with_grade(grade, true);
            assert_eq!(risk_score(Some(&ssl), &headers_with_missing(0), &[], &[], &[]), expected);
        }
    }

    #[test]
    fn sqli_flat_penalty_applies_once() {
        let ssl = ssl_with_grade(SslGrade::A, true);
        let sqli = vec![outcome(true), outcome(true), outcome(false)];
        // Flat −20 regardless of how many payloads hit.
        assert_eq!(risk_score(Some(&ssl), &headers_with_missing(0), &[], &[], &sqli), 80);
    }

    #[test]
    fn floor_is_zero() {
        let ssl = ssl_with_grade(SslGrade::F, false);
        let headers = headers_with_missing(7);
        let vulns: Vec<Vulnerability> = (0..10).map(|_| vuln(Severity::Critical)).collect();
        let xss = vec![outcome(true)];
        let sqli = vec![outcome(true)];
        assert_eq!(risk_score(Some(&ssl), &headers, &vulns, &xss, &sqli), 0);
    }

    #[test]
    fn score_stays_in_range_for_random_inputs() {
        let mut rng = StdRng::seed_from_u64(0xBADC0DE);
        let grades = [SslGrade::APlus, SslGrade::A, SslGrade::B, SslGrade::C, SslGrade::D, SslGrade::F];
        let severities = [Severity::Critical, Severity::High, Severity::Medium, Severity::Low, Severity::Info];
        for _ in 0..500 {
            let ssl = if rng.gen_bool(0.8) {
                Some(ssl_with_grade(*grades.choose(&mut rng).unwrap(), rng.gen_bool(0.7)))
            } else {
                None
            };
            let headers = headers_with_missing(rng.gen_range(0..=7));
            let vulns: Vec<Vulnerability> = (0..rng.gen_range(0..20))
                .map(|_| vuln(*severities.choose(&mut rng).unwrap()))
                .collect();
            let xss: Vec<ProbeOutcome> = (0..rng.gen_range(0..4)).map(|_| outcome(rng.gen_bool(0.5))).collect();
            let sqli: Vec<ProbeOutcome> = (0..rng.gen_range(0..4)).map(|_| outcome(rng.gen_bool(0.5))).collect();

            let score = risk_score(ssl.as_ref(), &headers, &vulns, &xss, &sqli);
            assert!(score <= 100);
        }
    }

    #[test]
    fn score_is_monotone_in_findings() {
        let ssl = ssl_with_grade(SslGrade::A, true);
        // Adding missing headers never raises the score.
        let mut last = 100;
        for missing in 0..=7 {
            let score = risk_score(Some(&ssl), &headers_with_missing(missing), &[], &[], &[]);
            assert!(score <= last);
            last = score;
        }
        // Adding vulnerabilities never raises the score.
        let mut vulns = Vec::new();
        let mut last = 100;
        for _ in 0..10 {
            vulns.push(vuln(Severity::Medium));
            let score = risk_score(Some(&ssl), &headers_with_missing(0), &vulns, &[], &[]);
            assert!(score <= last);
            last = score;
        }
    }
}
