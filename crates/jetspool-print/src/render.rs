// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Streaming Ghostscript renderer.
//
// Converts a PDF into a monochrome PCL XL (pxlmono) stream on the child's
// stdout, so the printer-native bytes are never materialized in memory. The
// returned `RenderedStream` owns the child process; the consumer must call
// `finish()` or `abort()` on every path so no process or pipe outlives the
// dispatch that created it.

use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, ReadBuf};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, info, warn};

use jetspool_core::error::{JetspoolError, Result};
use jetspool_core::types::RenderRequest;

/// How long to wait for the rasterizer to exit after its stdout is closed,
/// before killing it.
const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Map a media name to Ghostscript's `-sPAPERSIZE` token. Only a small
/// allow-list is mapped; anything else is passed through with no size hint
/// rather than failing the job.
pub fn media_size_token(media: &str) -> Option<&'static str> {
    match media.trim().to_ascii_lowercase().as_str() {
        "a4" => Some("a4"),
        "letter" => Some("letter"),
        "legal" => Some("legal"),
        _ => None,
    }
}

/// Invokes the external rasterizer and exposes its stdout as the job stream.
#[derive(Debug, Clone)]
pub struct Renderer {
    /// Rasterizer binary, normally `gs`. Injectable for tests.
    program: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            program: "gs".into(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Ghostscript argument list for one render request.
    ///
    /// `pxlmono` selects the monochrome PCL XL device; duplex adds
    /// `-dDuplex` with `-dTumble=false` for long-edge (book-style) binding
    /// and `-dTumble=true` for short-edge.
    pub fn build_args(request: &RenderRequest) -> Vec<String> {
        let mut args = vec![
            "-q".into(),
            "-dSAFER".into(),
            "-dBATCH".into(),
            "-dNOPAUSE".into(),
            "-sDEVICE=pxlmono".into(),
            "-sOutputFile=-".into(),
            format!("-r{}", request.resolution_dpi),
            format!("-dNumCopies={}", request.options.copies.max(1)),
        ];
        if let Some(token) = media_size_token(&request.media) {
            args.push(format!("-sPAPERSIZE={token}"));
        }
        if request.options.duplex.is_duplex() {
            args.push("-dDuplex".into());
            let tumble = match request.options.duplex {
                jetspool_core::types::DuplexMode::ShortEdge => "true",
                _ => "false",
            };
            args.push(format!("-dTumble={tumble}"));
        }
        args.push(request.document.display().to_string());
        args
    }

    /// Spawn the rasterizer for `request` and hand back its output stream.
    pub fn render(&self, request: &RenderRequest) -> Result<RenderedStream> {
        let args = Self::build_args(request);
        info!(program = %self.program, ?args, "spawning rasterizer");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                JetspoolError::Render(format!("failed to start {}: {e}", self.program))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            JetspoolError::Render("rasterizer stdout was not captured".into())
        })?;

        Ok(RenderedStream { child, stdout })
    }
}

/// An owned, single-pass printer-native byte stream backed by the rasterizer
/// process. Reads pull directly from the child's stdout pipe, so a slow
/// consumer throttles the rasterizer through OS pipe backpressure.
#[derive(Debug)]
pub struct RenderedStream {
    child: Child,
    stdout: ChildStdout,
}

impl RenderedStream {
    /// Close the stream and reap the rasterizer.
    ///
    /// Waits up to five seconds for a clean exit (the child is killed on
    /// timeout), and turns a non-zero exit into a render failure carrying
    /// the process's diagnostic output. Call this after draining the stream
    /// — a structurally invalid document only shows up here, as an early
    /// EOF followed by a non-zero exit.
    pub async fn finish(self) -> Result<()> {
        // Closing stdout unblocks a child stuck on a full pipe.
        drop(self.stdout);

        // wait_with_output collects the piped stderr; if the timeout fires
        // the dropped future takes the child down with it (kill_on_drop).
        match tokio::time::timeout(WAIT_TIMEOUT, self.child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => {
                debug!("rasterizer exited cleanly");
                Ok(())
            }
            Ok(Ok(output)) => {
                let diag = String::from_utf8_lossy(&output.stderr);
                let diag = diag.trim();
                warn!(status = %output.status, diag, "rasterizer failed");
                if diag.is_empty() {
                    Err(JetspoolError::Render(format!(
                        "rasterizer exited with {}",
                        output.status
                    )))
                } else {
                    Err(JetspoolError::Render(format!(
                        "rasterizer exited with {}: {diag}",
                        output.status
                    )))
                }
            }
            Ok(Err(e)) => Err(JetspoolError::Render(format!(
                "failed to reap rasterizer: {e}"
            ))),
            Err(_) => {
                warn!("rasterizer did not exit after stream close; killed");
                Err(JetspoolError::Render(format!(
                    "rasterizer did not exit within {}s and was killed",
                    WAIT_TIMEOUT.as_secs()
                )))
            }
        }
    }

    /// Kill the rasterizer without waiting for a clean exit. Used on
    /// delivery failure, where the stream may be only partially drained.
    pub async fn abort(mut self) {
        drop(self.stdout);
        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "failed to kill rasterizer");
        }
    }
}

impl AsyncRead for RenderedStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().stdout).poll_read(cx, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetspool_core::types::{DuplexMode, JobOptions};
    use tokio::io::AsyncReadExt;

    fn request(copies: u32, duplex: DuplexMode, media: &str) -> RenderRequest {
        RenderRequest::new("/tmp/job.pdf", JobOptions::new(copies, duplex), media)
    }

    #[test]
    fn simplex_args_have_no_duplex_flags() {
        let args = Renderer::build_args(&request(2, DuplexMode::Simplex, "A4"));
        assert!(args.contains(&"-sDEVICE=pxlmono".to_string()));
        assert!(args.contains(&"-r600".to_string()));
        assert!(args.contains(&"-dNumCopies=2".to_string()));
        assert!(args.contains(&"-sPAPERSIZE=a4".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("-dDuplex")));
        assert_eq!(args.last().unwrap(), "/tmp/job.pdf");
    }

    #[test]
    fn long_edge_maps_to_tumble_off() {
        let args = Renderer::build_args(&request(1, DuplexMode::LongEdge, "Letter"));
        assert!(args.contains(&"-dDuplex".to_string()));
        assert!(args.contains(&"-dTumble=false".to_string()));
        assert!(args.contains(&"-sPAPERSIZE=letter".to_string()));
    }

    #[test]
    fn short_edge_maps_to_tumble_on() {
        let args = Renderer::build_args(&request(1, DuplexMode::ShortEdge, "Legal"));
        assert!(args.contains(&"-dDuplex".to_string()));
        assert!(args.contains(&"-dTumble=true".to_string()));
    }

    #[test]
    fn unknown_media_gets_no_size_hint() {
        let args = Renderer::build_args(&request(1, DuplexMode::Simplex, "B5-extra-wide"));
        assert!(!args.iter().any(|a| a.starts_with("-sPAPERSIZE")));
    }

    #[test]
    fn media_allow_list() {
        assert_eq!(media_size_token(" A4 "), Some("a4"));
        assert_eq!(media_size_token("LETTER"), Some("letter"));
        assert_eq!(media_size_token("legal"), Some("legal"));
        assert_eq!(media_size_token("tabloid"), None);
        assert_eq!(media_size_token(""), None);
    }

    #[test]
    fn missing_binary_is_a_render_error() {
        let renderer = Renderer::with_program("jetspool-no-such-rasterizer");
        // Spawning happens inside a runtime guard in render(); use a small rt.
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = rt.enter();
        let err = renderer
            .render(&request(1, DuplexMode::Simplex, "A4"))
            .unwrap_err();
        assert!(matches!(err, JetspoolError::Render(_)));
        assert!(err.to_string().contains("failed to start"));
    }

    #[tokio::test]
    async fn nonzero_exit_surfaces_as_render_failure() {
        // `false` ignores its arguments, writes nothing, and exits 1 —
        // the same shape as Ghostscript rejecting a broken PDF.
        let renderer = Renderer::with_program("false");
        let mut stream = renderer
            .render(&request(1, DuplexMode::Simplex, "A4"))
            .unwrap();

        let mut sink = Vec::new();
        stream.read_to_end(&mut sink).await.unwrap();
        assert!(sink.is_empty());

        let err = stream.finish().await.unwrap_err();
        assert!(matches!(err, JetspoolError::Render(_)));
    }

    #[tokio::test]
    async fn clean_exit_finishes_ok() {
        let renderer = Renderer::with_program("true");
        let mut stream = renderer
            .render(&request(1, DuplexMode::Simplex, "A4"))
            .unwrap();
        let mut sink = Vec::new();
        stream.read_to_end(&mut sink).await.unwrap();
        stream.finish().await.unwrap();
    }

    #[tokio::test]
    async fn abort_reaps_a_partially_drained_child() {
        let renderer = Renderer::with_program("true");
        let stream = renderer
            .render(&request(1, DuplexMode::Simplex, "A4"))
            .unwrap();
        // No drain, no finish — abort alone must leave nothing behind.
        stream.abort().await;
    }
}
