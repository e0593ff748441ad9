// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The dispatcher: one call per inbound job, one DispatchResult back.
//
// Selects the backend from the immutable printer target, drives rendering
// for the raw path, and guarantees the rasterizer process is reaped on
// every exit path. Failures never escape as errors — the caller always
// receives a terse human-readable status.

use std::path::Path;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{error, info};

use jetspool_core::config::{Config, PrinterTarget};
use jetspool_core::error::Result;
use jetspool_core::options::parse_caption;
use jetspool_core::types::{DispatchResult, JobId, JobOptions, RenderRequest};

use crate::queue::QueueSubmitter;
use crate::raw;
use crate::render::Renderer;

/// Stateless per-job orchestrator. Holds no queue of its own; each job is
/// dispatched independently, and concurrent jobs are fine — except that
/// raw-socket transfers to the single configured target are serialized
/// through `raw_gate`, because port-9100 printing has no job framing and
/// two interleaved connections can corrupt both jobs on some firmware.
pub struct Dispatcher {
    config: Config,
    renderer: Renderer,
    queue: QueueSubmitter,
    raw_gate: Mutex<()>,
}

impl Dispatcher {
    pub fn new(config: Config) -> Self {
        Self::with_backends(config, Renderer::new(), QueueSubmitter::new())
    }

    /// Construct with explicit backends (tests inject stub programs here).
    pub fn with_backends(config: Config, renderer: Renderer, queue: QueueSubmitter) -> Self {
        Self {
            config,
            renderer,
            queue,
            raw_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dispatch one job: parse the caption directive, pick the backend, and
    /// fold every outcome into a single `DispatchResult`.
    pub async fn dispatch(&self, document: &Path, caption: Option<&str>) -> DispatchResult {
        let job = JobId::new();
        let options = parse_caption(caption, self.config.default_duplex);
        info!(
            job = %job,
            document = %document.display(),
            copies = options.copies,
            sides = options.duplex.sides_keyword(),
            backend = self.config.target.backend_name(),
            "dispatching job"
        );

        let outcome = match &self.config.target {
            PrinterTarget::Socket { host, port } => self
                .dispatch_raw(document, options, host, *port)
                .await
                .map(|sent| format!("Job sent to the printer ({sent} bytes).")),
            PrinterTarget::Queue {
                destination,
                server,
                ..
            } => self
                .queue
                .submit(
                    document,
                    &options,
                    &self.config.default_media,
                    destination,
                    server.as_deref(),
                )
                .await
                .map(|job_id| format!("Job queued (request id {job_id}).")),
        };

        match outcome {
            Ok(message) => {
                info!(job = %job, message, "job dispatched");
                DispatchResult::ok(message)
            }
            Err(e) => {
                error!(job = %job, error = %e, "job failed");
                DispatchResult::failed(e.to_string())
            }
        }
    }

    /// Raw path: render to a stream, pump it over TCP, then settle the
    /// rasterizer. The child is aborted on delivery failure and finished
    /// (bounded wait + exit check) otherwise — a full transfer followed by
    /// a non-zero rasterizer exit still fails the job.
    async fn dispatch_raw(
        &self,
        document: &Path,
        options: JobOptions,
        host: &str,
        port: u16,
    ) -> Result<u64> {
        let request = RenderRequest::new(document, options, &self.config.default_media);
        let mut stream = self.renderer.render(&request)?;
        let io_timeout = Duration::from_secs(self.config.raw_io_timeout_secs);

        let sent = {
            let _gate = self.raw_gate.lock().await;
            match raw::send_stream(&mut stream, host, port, io_timeout).await {
                Ok(sent) => sent,
                Err(e) => {
                    stream.abort().await;
                    return Err(e);
                }
            }
        };

        stream.finish().await?;
        Ok(sent)
    }
}
