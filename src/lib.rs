// src/lib.rs

//! Palisade: an asynchronous web security scan orchestration engine.
//!
//! The engine normalizes a target, fans out independent network probes
//! (TLS certificate, security headers, CMS fingerprint, reflected-XSS
//! and SQL-injection testers, port sweep) concurrently, contains
//! per-probe failures as degraded results, aggregates findings into a
//! uniform vulnerability list and computes a deterministic 0-100 risk
//! score. Callers create a scan, get an identifier back immediately and
//! poll for the finished job record.

pub mod core;
pub mod errors;
pub mod logging;

pub use crate::core::engine::ScanEngine;
pub use crate::core::models::{Findings, ScanJob, ScanStatus};
pub use crate::core::store::{InMemoryJobStore, JobStore};
pub use crate::errors::ScanError;
