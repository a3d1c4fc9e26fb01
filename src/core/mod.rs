// src/core/mod.rs

// Root of the `core` module: the scan engine and everything it drives.

/// Shared data structures: job records, findings, per-probe result
/// models and the degraded-result wrapper.
pub mod models;

/// Target validation and canonicalization.
pub mod target;

/// The job store collaborator trait and its in-memory implementation.
pub mod store;

/// The individual probes and their concurrent fan-out.
pub mod scanner;

/// Static catalog of vulnerability titles, descriptions and remediation
/// steps, used by the aggregator.
pub mod knowledge_base;

/// Converts raw probe results into the uniform vulnerability list.
pub mod aggregator;

/// The pure findings-to-risk-score function.
pub mod scoring;

/// Job lifecycle manager: creation, orchestration, polling.
pub mod engine;
