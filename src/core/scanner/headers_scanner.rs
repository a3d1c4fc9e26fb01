// src/core/scanner/headers_scanner.rs

use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::core::models::{ProbeResult, SecurityHeaders};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 5;

/// The seven headers the analyzer checks, as (lookup name, canonical
/// name) pairs. The canonical order here is the order missing headers
/// are reported in.
const SECURITY_HEADERS: [(&str, &str); 7] = [
    ("strict-transport-security", "Strict-Transport-Security"),
    ("x-frame-options", "X-Frame-Options"),
    ("x-content-type-options", "X-Content-Type-Options"),
    ("content-security-policy", "Content-Security-Policy"),
    ("x-xss-protection", "X-XSS-Protection"),
    ("referrer-policy", "Referrer-Policy"),
    ("permissions-policy", "Permissions-Policy"),
];

/// Fetches the target and checks the fixed security-header checklist.
///
/// Any HTTP status counts as a successful fetch; only a transport-level
/// failure (timeout, DNS, refused connection) degrades the result to the
/// zero-score worst case with the `"All headers"` sentinel.
pub async fn run_headers_scan(target: &str) -> ProbeResult<SecurityHeaders> {
    info!(target, "Starting security headers scan.");

    let client = match reqwest::Client::builder()
        .user_agent(crate::core::scanner::USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client for headers scan.");
            return ProbeResult::degraded(
                SecurityHeaders::unreachable(),
                format!("Failed to build HTTP client: {}", e),
            );
        }
    };

    match client.get(target).send().await {
        Ok(response) => {
            info!(status = %response.status(), "Received HTTP response for headers scan.");
            let headers = evaluate_headers(response.headers());
            info!(score = headers.score, missing = headers.missing_headers.len(), "Headers scan finished.");
            ProbeResult::Ok(headers)
        }
        Err(e) => {
            warn!(target, error = %e, "Header fetch failed, returning worst-case result.");
            ProbeResult::degraded(
                SecurityHeaders::unreachable(),
                format!("HTTP request failed: {}", e),
            )
        }
    }
}

/// Pure checklist evaluation of a response header map.
/// Score invariant: `score = round((7 - missing) / 7 * 100)`.
fn evaluate_headers(headers: &HeaderMap) -> SecurityHeaders {
    let mut present = [false; 7];
    let mut missing_headers = Vec::new();
    for (i, (lookup, canonical)) in SECURITY_HEADERS.iter().enumerate() {
        present[i] = headers.contains_key(*lookup);
        if present[i] {
            debug!(header = canonical, "Header present.");
        } else {
            debug!(header = canonical, "Header missing.");
            missing_headers.push((*canonical).to_string());
        }
    }

    SecurityHeaders {
        hsts: present[0],
        x_frame_options: present[1],
        x_content_type_options: present[2],
        csp: present[3],
        x_xss_protection: present[4],
        referrer_policy: present[5],
        permissions_policy: present[6],
        missing_headers,
        score: header_score(7 - (present.iter().filter(|p| **p).count())),
    }
}

/// `round((7 - missing) / 7 * 100)` as an integer in [0, 100].
fn header_score(missing: usize) -> u8 {
    let present = 7usize.saturating_sub(missing);
    ((present as f64 / 7.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn header_map(names: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for name in names {
            map.insert(
                name.parse::<HeaderName>().unwrap(),
                HeaderValue::from_static("x"),
            );
        }
        map
    }

    #[test]
    fn score_formula_for_every_missing_count() {
        let expected = [100u8, 86, 71, 57, 43, 29, 14, 0];
        for missing in 0..=7 {
            assert_eq!(header_score(missing), expected[missing], "missing={}", missing);
        }
    }

    #[test]
    fn all_headers_present_scores_100() {
        let map = header_map(&[
            "strict-transport-security",
            "x-frame-options",
            "x-content-type-options",
            "content-security-policy",
            "x-xss-protection",
            "referrer-policy",
            "permissions-policy",
        ]);
        let result = evaluate_headers(&map);
        assert!(result.hsts && result.csp && result.permissions_policy);
        assert!(result.missing_headers.is_empty());
        assert_eq!(result.score, 100);
    }

    #[test]
    fn empty_response_scores_0_with_all_seven_listed() {
        let result = evaluate_headers(&HeaderMap::new());
        assert_eq!(result.score, 0);
        assert_eq!(
            result.missing_headers,
            vec![
                "Strict-Transport-Security",
                "X-Frame-Options",
                "X-Content-Type-Options",
                "Content-Security-Policy",
                "X-XSS-Protection",
                "Referrer-Policy",
                "Permissions-Policy",
            ]
        );
    }

    #[test]
    fn missing_headers_keep_canonical_order() {
        let map = header_map(&["x-frame-options", "referrer-policy"]);
        let result = evaluate_headers(&map);
        assert_eq!(result.score, 29);
        assert_eq!(
            result.missing_headers,
            vec![
                "Strict-Transport-Security",
                "X-Content-Type-Options",
                "Content-Security-Policy",
                "X-XSS-Protection",
                "Permissions-Policy",
            ]
        );
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        // HeaderMap normalizes names to lowercase on insert; an
        // upper-cased wire header still counts as present.
        let mut map = HeaderMap::new();
        map.insert(
            "Strict-Transport-Security".parse::<HeaderName>().unwrap(),
            HeaderValue::from_static("max-age=63072000"),
        );
        assert!(evaluate_headers(&map).hsts);
    }

    #[test]
    fn unreachable_sentinel_is_distinct_from_header_names() {
        let worst = SecurityHeaders::unreachable();
        assert_eq!(worst.score, 0);
        assert_eq!(worst.missing_headers, vec!["All headers"]);
    }
}
