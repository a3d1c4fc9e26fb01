// src/core/engine.rs

//! Job lifecycle manager: owns the `pending → running → completed|failed`
//! state machine, drives the probe fan-out, and persists every
//! transition through the job store collaborator.

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use crate::core::aggregator;
use crate::core::models::{Findings, ScanJob};
use crate::core::scanner;
use crate::core::scoring;
use crate::core::store::JobStore;
use crate::core::target;
use crate::errors::ScanError;

/// The scan orchestration engine.
///
/// Cheap to clone; clones share the job store and the task tracker. One
/// engine serves many concurrent jobs. Each job is owned by the single
/// orchestration task spawned for it, so no locking happens inside a
/// job's execution.
#[derive(Clone)]
pub struct ScanEngine {
    store: Arc<dyn JobStore>,
    tasks: TaskTracker,
}

impl ScanEngine {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            tasks: TaskTracker::new(),
        }
    }

    /// Validates and normalizes the target, persists a pending job and
    /// returns its identifier immediately. Orchestration continues as a
    /// supervised background task; its failure is recorded on the job
    /// and logged, never surfaced to this caller.
    ///
    /// The only synchronous failure modes are `InvalidTarget` (bad URL)
    /// and a store error on the initial insert.
    pub async fn create_scan(&self, target_url: &str, user_id: &str) -> Result<String, ScanError> {
        let normalized = target::normalize(target_url)?;
        let job = ScanJob::new(user_id, &normalized);
        let scan_id = job.id.clone();
        info!(%scan_id, target = %normalized, user_id, "Creating scan job.");
        self.store.insert(job).await?;

        let engine = self.clone();
        let id = scan_id.clone();
        let user = user_id.to_string();
        self.tasks.spawn(async move {
            if let Err(error) = engine.execute_scan(&id, &normalized, &user).await {
                error!(scan_id = %id, %error, "Scan orchestration failed.");
            }
        });

        Ok(scan_id)
    }

    /// Runs the full probe fan-out, aggregation, scoring and terminal
    /// persistence for one job. Normally invoked by `create_scan`'s
    /// background task rather than by external callers.
    ///
    /// Probe failures are contained inside the probes; the only errors
    /// that can escape the orchestration are store failures, and any
    /// such error transitions the job to `failed` with its message.
    pub async fn execute_scan(
        &self,
        scan_id: &str,
        target: &str,
        user_id: &str,
    ) -> Result<(), ScanError> {
        info!(scan_id, target, user_id, "Executing scan.");
        match self.orchestrate(scan_id, target).await {
            Ok(()) => Ok(()),
            Err(error) => {
                warn!(scan_id, %error, "Orchestration error, marking job failed.");
                self.mark_failed(scan_id, &error).await;
                Err(error)
            }
        }
    }

    /// Polls the current job record. Fails with `ScanNotFound` for an
    /// unknown identifier; the record returned may be non-terminal.
    pub async fn get_scan_status(&self, scan_id: &str) -> Result<ScanJob, ScanError> {
        self.store
            .get(scan_id)
            .await?
            .ok_or_else(|| ScanError::ScanNotFound(scan_id.to_string()))
    }

    /// Closes the tracker and waits for in-flight orchestration tasks.
    pub async fn shutdown(&self) {
        self.tasks.close();
        self.tasks.wait().await;
    }

    async fn orchestrate(&self, scan_id: &str, target: &str) -> Result<(), ScanError> {
        let mut job = self.fetch_job(scan_id).await?;
        job.mark_running();
        self.store.update(job).await?;

        let report = scanner::run_all_probes(target).await;

        let ssl_info = report.ssl.into_value();
        let security_headers = report.headers.into_value();
        let cms_info = report.cms.into_value();

        let vulnerabilities = aggregator::aggregate(
            target,
            &ssl_info,
            &security_headers,
            &report.xss,
            &report.sqli,
        );
        let risk_score = scoring::risk_score(
            Some(&ssl_info),
            &security_headers,
            &vulnerabilities,
            &report.xss,
            &report.sqli,
        );

        let findings = Findings {
            vulnerabilities,
            ssl_info: Some(ssl_info),
            security_headers,
            cms_detection: Some(cms_info),
            xss_tests: report.xss,
            sql_injection_tests: report.sqli,
            open_ports: report.open_ports,
        };

        let mut job = self.fetch_job(scan_id).await?;
        job.complete(findings, risk_score);
        self.store.update(job).await?;
        info!(scan_id, risk_score, "Scan completed.");
        Ok(())
    }

    async fn fetch_job(&self, scan_id: &str) -> Result<ScanJob, ScanError> {
        self.store
            .get(scan_id)
            .await?
            .ok_or_else(|| ScanError::ScanNotFound(scan_id.to_string()))
    }

    /// Best effort `running → failed` transition. A failure to persist
    /// the failure itself can only be logged.
    async fn mark_failed(&self, scan_id: &str, error: &ScanError) {
        match self.fetch_job(scan_id).await {
            Ok(mut job) => {
                job.fail(error.to_string());
                if let Err(persist_error) = self.store.update(job).await {
                    error!(scan_id, %persist_error, "Could not persist failed state.");
                }
            }
            Err(fetch_error) => {
                error!(scan_id, %fetch_error, "Could not load job to mark it failed.");
            }
        }
    }
}
