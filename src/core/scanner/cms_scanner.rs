// src/core/scanner/cms_scanner.rs

//! CMS fingerprinter: fetches the target page and matches its body
//! against per-CMS signature tables. A CMS counts as detected only when
//! at least two of its signatures match, which keeps a single generic
//! term from producing a false positive. Candidates are evaluated in a
//! fixed order and the first one past the threshold wins.
//!
//! Version extraction is not implemented; `version` is always `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::core::models::{CmsInfo, CmsType, ProbeResult};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 5;

/// A CMS must match at least this many of its signatures.
const DETECTION_THRESHOLD: usize = 2;

// Statically compiled signature regexes, one set per CMS candidate.
static RE_WP_CONTENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/wp-content/").unwrap());
static RE_WP_INCLUDES: Lazy<Regex> = Lazy::new(|| Regex::new(r"/wp-includes/").unwrap());
static RE_WP_JSON: Lazy<Regex> = Lazy::new(|| Regex::new(r"/wp-json/").unwrap());
static RE_WP_GENERATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<meta[^>]+name=["']generator["'][^>]+WordPress"#).unwrap());

static RE_DRUPAL_SETTINGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"Drupal\.settings").unwrap());
static RE_DRUPAL_SITES: Lazy<Regex> = Lazy::new(|| Regex::new(r"/sites/(default|all)/files").unwrap());
static RE_DRUPAL_GENERATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<meta[^>]+name=["']generator["'][^>]+Drupal"#).unwrap());
static RE_DRUPAL_JS: Lazy<Regex> = Lazy::new(|| Regex::new(r"drupal\.js").unwrap());

static RE_JOOMLA_GENERATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<meta[^>]+name=["']generator["'][^>]+Joomla"#).unwrap());
static RE_JOOMLA_MEDIA: Lazy<Regex> = Lazy::new(|| Regex::new(r"/media/(jui|system)/").unwrap());
static RE_JOOMLA_OPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"index\.php\?option=com_").unwrap());
static RE_JOOMLA_TEMPLATES: Lazy<Regex> = Lazy::new(|| Regex::new(r"/templates/[^/]+/").unwrap());

static RE_MAGENTO_COOKIES: Lazy<Regex> = Lazy::new(|| Regex::new(r"Mage\.Cookies").unwrap());
static RE_MAGENTO_SKIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"/skin/frontend/").unwrap());
static RE_MAGENTO_STATIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/static/(version\d+/)?frontend/").unwrap());
static RE_MAGENTO_VARIEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"Varien").unwrap());

struct CmsRule {
    cms: CmsType,
    signatures: &'static [&'static Lazy<Regex>],
}

/// Candidate order is fixed and significant: first match wins.
static RULES: &[CmsRule] = &[
    CmsRule {
        cms: CmsType::Wordpress,
        signatures: &[&RE_WP_CONTENT, &RE_WP_INCLUDES, &RE_WP_JSON, &RE_WP_GENERATOR],
    },
    CmsRule {
        cms: CmsType::Drupal,
        signatures: &[&RE_DRUPAL_SETTINGS, &RE_DRUPAL_SITES, &RE_DRUPAL_GENERATOR, &RE_DRUPAL_JS],
    },
    CmsRule {
        cms: CmsType::Joomla,
        signatures: &[&RE_JOOMLA_GENERATOR, &RE_JOOMLA_MEDIA, &RE_JOOMLA_OPTION, &RE_JOOMLA_TEMPLATES],
    },
    CmsRule {
        cms: CmsType::Magento,
        signatures: &[&RE_MAGENTO_COOKIES, &RE_MAGENTO_SKIN, &RE_MAGENTO_STATIC, &RE_MAGENTO_VARIEN],
    },
];

/// Fetches the target body and fingerprints it against the CMS rules.
/// On any fetch failure the result degrades to `detected=false`.
pub async fn run_cms_scan(target: &str) -> ProbeResult<CmsInfo> {
    info!(target, "Starting CMS fingerprint scan.");

    let client = match reqwest::Client::builder()
        .user_agent(crate::core::scanner::USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client for CMS scan.");
            return ProbeResult::degraded(
                CmsInfo::not_detected(),
                format!("Failed to build HTTP client: {}", e),
            );
        }
    };

    let body = match client.get(target).send().await {
        Ok(response) => {
            info!(status = %response.status(), "Received HTTP response for CMS scan.");
            match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!(target, error = %e, "Failed to read response body.");
                    return ProbeResult::degraded(
                        CmsInfo::not_detected(),
                        format!("Failed to read response body: {}", e),
                    );
                }
            }
        }
        Err(e) => {
            warn!(target, error = %e, "CMS fetch failed.");
            return ProbeResult::degraded(
                CmsInfo::not_detected(),
                format!("HTTP request failed: {}", e),
            );
        }
    };

    let info = match match_signatures(&body) {
        Some(cms) => {
            info!(cms = ?cms, "CMS detected.");
            CmsInfo {
                detected: true,
                cms_type: Some(cms),
                version: None,
                known_vulnerabilities: Vec::new(),
            }
        }
        None => {
            info!("No CMS detected.");
            CmsInfo::not_detected()
        }
    };
    ProbeResult::Ok(info)
}

/// Applies the rule table to a response body. First candidate reaching
/// the two-signature threshold wins; evaluation stops there.
fn match_signatures(body: &str) -> Option<CmsType> {
    for rule in RULES {
        let matches = rule
            .signatures
            .iter()
            .filter(|re| re.is_match(body))
            .count();
        debug!(cms = ?rule.cms, matches, "Evaluated CMS signatures.");
        if matches >= DETECTION_THRESHOLD {
            return Some(rule.cms);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wordpress_detected_with_two_signatures() {
        let body = r#"<link href="/wp-content/themes/x/style.css"><script src="/wp-includes/js/menu.js"></script>"#;
        assert_eq!(match_signatures(body), Some(CmsType::Wordpress));
    }

    #[test]
    fn single_signature_is_not_enough() {
        let body = r#"<a href="/wp-content/uploads/cat.jpg">a picture</a>"#;
        assert_eq!(match_signatures(body), None);
    }

    #[test]
    fn drupal_detected_via_settings_and_files() {
        let body = r#"<script>Drupal.settings = {};</script><img src="/sites/default/files/logo.png">"#;
        assert_eq!(match_signatures(body), Some(CmsType::Drupal));
    }

    #[test]
    fn joomla_detected_via_generator_and_media() {
        let body = r#"<meta name="generator" content="Joomla! - Open Source"><script src="/media/system/js/core.js"></script>"#;
        assert_eq!(match_signatures(body), Some(CmsType::Joomla));
    }

    #[test]
    fn magento_detected_via_static_and_varien() {
        let body = r#"<script src="/static/version1715/frontend/Acme/default/x.js"></script><script>var v = new Varien.Tabs();</script>"#;
        assert_eq!(match_signatures(body), Some(CmsType::Magento));
    }

    #[test]
    fn first_match_wins_over_later_candidates() {
        // Body matches both WordPress and Drupal thresholds; WordPress is
        // first in the rule order.
        let body = r#"
            /wp-content/ /wp-includes/
            Drupal.settings /sites/default/files
        "#;
        assert_eq!(match_signatures(body), Some(CmsType::Wordpress));
    }

    #[test]
    fn plain_page_detects_nothing() {
        assert_eq!(match_signatures("<html><body>hello</body></html>"), None);
    }

    #[test]
    fn not_detected_shape() {
        let info = CmsInfo::not_detected();
        assert!(!info.detected);
        assert!(info.cms_type.is_none());
        assert!(info.version.is_none());
        assert!(info.known_vulnerabilities.is_empty());
    }
}
