// src/errors.rs

use thiserror::Error;

/// Caller-facing errors of the scan engine.
///
/// `InvalidTarget` and `ScanNotFound` are the only synchronous error kinds
/// the engine surfaces to callers; probe-level network failures never show
/// up here (they are contained as degraded probe values). `Store` wraps
/// failures of the persistence collaborator and is what drives a running
/// job to its `failed` state.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid target URL: {0}")]
    InvalidTarget(String),

    #[error("scan not found: {0}")]
    ScanNotFound(String),

    #[error("job store error: {0}")]
    Store(String),
}
