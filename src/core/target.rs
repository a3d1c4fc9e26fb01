// src/core/target.rs

use tracing::debug;
use url::Url;

use crate::errors::ScanError;

/// Validates and canonicalizes a user-supplied host or URL.
///
/// A bare hostname gets an `https://` scheme; the result is the
/// scheme+host origin only, with any path, query or fragment stripped.
/// Normalizing an already-normalized value returns the same value.
pub fn normalize(input: &str) -> Result<String, ScanError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScanError::InvalidTarget(input.to_string()));
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).map_err(|e| {
        debug!(input, error = %e, "Target failed to parse as a URL.");
        ScanError::InvalidTarget(input.to_string())
    })?;

    // `Url` accepts non-network schemes and scheme-relative oddities; a
    // scannable target must have an http(s) origin with a host.
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ScanError::InvalidTarget(input.to_string()));
    }
    let host = url
        .host_str()
        .ok_or_else(|| ScanError::InvalidTarget(input.to_string()))?;

    let origin = match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    };
    Ok(origin)
}

/// Extracts the bare host from a normalized target, for probes that dial
/// TCP themselves (certificate inspector, port sweep).
pub fn host_of(normalized: &str) -> Option<String> {
    Url::parse(normalized)
        .ok()
        .and_then(|url| url.host_str().map(String::from))
}
