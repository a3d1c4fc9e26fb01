// src/core/scanner/port_scanner.rs

//! Port surface probe: a bounded TCP-connect sweep over a fixed list of
//! commonly exposed ports. Only ports that accept a connection are
//! reported; refused and filtered ports are logged and dropped. Ports
//! never generate vulnerability records (the aggregator ignores them by
//! contract), but each open port carries a service name and a risk level
//! for the report.

use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::core::models::{PortInfo, PortState, Severity};

const PER_PORT_TIMEOUT: Duration = Duration::from_secs(2);
const MAX_CONCURRENT_CONNECTS: usize = 8;

/// Fixed candidate list: (port, service name, risk when exposed).
const CANDIDATE_PORTS: [(u16, &str, Severity); 13] = [
    (21, "ftp", Severity::High),
    (22, "ssh", Severity::Medium),
    (23, "telnet", Severity::Critical),
    (25, "smtp", Severity::Medium),
    (53, "dns", Severity::Low),
    (80, "http", Severity::Low),
    (110, "pop3", Severity::Medium),
    (143, "imap", Severity::Medium),
    (443, "https", Severity::Info),
    (3306, "mysql", Severity::High),
    (3389, "rdp", Severity::High),
    (5432, "postgresql", Severity::High),
    (8080, "http-proxy", Severity::Medium),
];

/// Sweeps the candidate ports with bounded concurrency. A host that
/// cannot be resolved at all simply yields an empty list.
pub async fn run_port_scan(host: &str) -> Vec<PortInfo> {
    info!(host, "Starting port surface sweep.");

    let probes = CANDIDATE_PORTS.map(|(port, service, risk)| async move {
        let state = check_port(host, port).await;
        debug!(host, port, state = ?state, "Port checked.");
        (port, service, risk, state)
    });
    let results = stream::iter(probes)
        .buffer_unordered(MAX_CONCURRENT_CONNECTS)
        .collect::<Vec<_>>()
        .await;

    let mut open: Vec<PortInfo> = results
        .into_iter()
        .filter(|(_, _, _, state)| *state == PortState::Open)
        .map(|(port, service, risk, state)| PortInfo {
            port,
            state,
            service: Some(service.to_string()),
            version: None,
            risk,
        })
        .collect();
    open.sort_by_key(|p| p.port);

    info!(host, open = open.len(), "Port sweep finished.");
    open
}

async fn check_port(host: &str, port: u16) -> PortState {
    match timeout(PER_PORT_TIMEOUT, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => PortState::Open,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => PortState::Closed,
        // Timeouts, unreachable networks and resolution failures all look
        // the same from outside: something between us and the port ate
        // the connection attempt.
        _ => PortState::Filtered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn detects_locally_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        assert_eq!(check_port("127.0.0.1", port).await, PortState::Open);
    }

    #[tokio::test]
    async fn refused_connection_is_closed() {
        // Bind then drop to find a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        assert_eq!(check_port("127.0.0.1", port).await, PortState::Closed);
    }

    #[tokio::test]
    async fn unresolvable_host_yields_empty_sweep() {
        let open = run_port_scan("host.invalid").await;
        assert!(open.is_empty());
    }

    #[test]
    fn candidate_list_matches_contract() {
        let ports: Vec<u16> = CANDIDATE_PORTS.iter().map(|(p, _, _)| *p).collect();
        assert_eq!(ports, vec![21, 22, 23, 25, 53, 80, 110, 143, 443, 3306, 3389, 5432, 8080]);
    }
}
