// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// TCP reachability probing for diagnostics.
//
// Opens a connection, measures the wall-clock connect time, and closes it
// without exchanging any data. This is strictly informational — dispatch
// never waits on or consults a probe result.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tracing::debug;

use jetspool_core::config::{format_host_port, PrinterTarget, IPP_PORT, RAW_PORT};
use jetspool_core::types::ProbeResult;

/// Default probe timeout.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Probe a single `host:port` with a bounded connect timeout.
///
/// Never returns an error: timeout, refusal, and DNS failure all come back
/// as `reachable: false` with the underlying error rendered as text.
pub async fn probe(host: &str, port: u16, timeout: Duration) -> ProbeResult {
    let addr = format_host_port(host, port);
    let start = Instant::now();

    let outcome = tokio::time::timeout(timeout, TcpStream::connect(&addr)).await;
    match outcome {
        Ok(Ok(_stream)) => {
            let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
            debug!(addr = %addr, latency_ms, "probe connected");
            ProbeResult {
                port,
                reachable: true,
                latency_ms: Some(latency_ms),
                error: None,
            }
        }
        Ok(Err(e)) => {
            debug!(addr = %addr, error = %e, "probe failed");
            ProbeResult {
                port,
                reachable: false,
                latency_ms: None,
                error: Some(e.to_string()),
            }
        }
        Err(_) => {
            debug!(addr = %addr, timeout_ms = timeout.as_millis() as u64, "probe timed out");
            ProbeResult {
                port,
                reachable: false,
                latency_ms: None,
                error: Some(format!("connect timed out after {}s", timeout.as_secs())),
            }
        }
    }
}

/// A full probe report for the configured printer target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub host: String,
    pub results: Vec<ProbeResult>,
}

impl ProbeReport {
    /// Human-readable per-port summary, one line per candidate port.
    pub fn render_text(&self) -> String {
        let mut lines = vec![format!("TCP probe against {}:", self.host)];
        for r in &self.results {
            match (r.reachable, r.latency_ms, &r.error) {
                (true, Some(lat), _) => {
                    lines.push(format!("  port {}: open ({lat:.1} ms)", r.port));
                }
                (false, _, Some(err)) => {
                    lines.push(format!("  port {}: closed ({err})", r.port));
                }
                _ => lines.push(format!("  port {}: closed", r.port)),
            }
        }
        lines.join("\n")
    }
}

/// Probe every candidate port of the configured target.
///
/// The candidate set is derived from the URI scheme (see
/// `PrinterTarget::probe_candidates`); `host_override` substitutes the host
/// while keeping the scheme-derived port set. A host override also works
/// against a bare queue name, falling back to probing the common printer
/// ports (9100 and 631). Returns `None` only when there is neither a
/// probeable target nor an override.
pub async fn probe_target(
    target: &PrinterTarget,
    host_override: Option<&str>,
    timeout: Duration,
) -> Option<ProbeReport> {
    let (host, ports) = match (target.probe_candidates(), host_override) {
        (Some((host, ports)), override_host) => {
            (override_host.unwrap_or(host).to_string(), ports)
        }
        (None, Some(host)) => (host.to_string(), vec![RAW_PORT, IPP_PORT]),
        (None, None) => return None,
    };

    let mut results = Vec::with_capacity(ports.len());
    for port in ports {
        results.push(probe(&host, port, timeout).await);
    }
    Some(ProbeReport { host, results })
}
