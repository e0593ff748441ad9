// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print-queue submission backend.
//
// Hands the original PDF to the external spooler tool (`lp`) instead of
// rendering locally — the queue owns rasterization, framing, and ordering.
// The tool's acknowledgment ("request id is <token>") is parsed for a job
// identifier; anything else it prints is surfaced verbatim.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{info, warn};

use jetspool_core::error::{JetspoolError, Result};
use jetspool_core::types::JobOptions;

/// Bound on the whole submission command, spawn to exit.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);

/// The acknowledgment phrase printed by the spooler on success.
const REQUEST_ID_PHRASE: &str = "request id is";

/// Submits jobs to an external print queue via the `lp` command.
#[derive(Debug, Clone)]
pub struct QueueSubmitter {
    /// Spooler binary, normally `lp`. Injectable for tests.
    program: String,
}

impl Default for QueueSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueSubmitter {
    pub fn new() -> Self {
        Self {
            program: "lp".into(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `lp` argument list for one submission: destination, optional queue
    /// server, copy count, media, scaling mode, sides, then the file.
    pub fn build_args(
        document: &Path,
        options: &JobOptions,
        media: &str,
        destination: &str,
        server: Option<&str>,
    ) -> Vec<String> {
        let mut args = vec!["-d".into(), destination.to_string()];
        if let Some(server) = server {
            args.push("-h".into());
            args.push(server.to_string());
        }
        args.extend([
            "-n".into(),
            options.copies.max(1).to_string(),
            "-o".into(),
            format!("media={media}"),
            "-o".into(),
            "fit-to-page".into(),
            "-o".into(),
            format!("sides={}", options.duplex.sides_keyword()),
        ]);
        args.push(document.display().to_string());
        args
    }

    /// Run the spooler tool and return the acknowledged job identifier.
    ///
    /// Distinguishes a tool that ran and refused (`QueueCommand`, with its
    /// combined output) from a tool that could not be launched at all
    /// (`QueueMissing`).
    pub async fn submit(
        &self,
        document: &Path,
        options: &JobOptions,
        media: &str,
        destination: &str,
        server: Option<&str>,
    ) -> Result<String> {
        let args = Self::build_args(document, options, media, destination, server);
        info!(program = %self.program, ?args, "submitting to print queue");

        let output = tokio::time::timeout(
            SUBMIT_TIMEOUT,
            Command::new(&self.program)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            JetspoolError::QueueCommand(format!(
                "{} did not finish within {}s",
                self.program,
                SUBMIT_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|e| JetspoolError::QueueMissing(format!("cannot run {}: {e}", self.program)))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let combined = combined.trim().to_string();

        if !output.status.success() {
            warn!(status = %output.status, output = %combined, "queue submission failed");
            if combined.is_empty() {
                return Err(JetspoolError::QueueCommand(format!(
                    "{} exited with {}",
                    self.program, output.status
                )));
            }
            return Err(JetspoolError::QueueCommand(combined));
        }

        let job_id = parse_request_id(&combined).unwrap_or_else(|| combined.clone());
        info!(job_id = %job_id, "queue accepted job");
        Ok(job_id)
    }
}

/// Extract the job identifier from the spooler acknowledgment, e.g.
/// `request id is laser-42 (1 file(s))` yields `laser-42`. Matched
/// case-insensitively; `None` when the phrase is absent.
pub fn parse_request_id(output: &str) -> Option<String> {
    let lower = output.to_lowercase();
    let at = lower.find(REQUEST_ID_PHRASE)?;
    let token = output[at + REQUEST_ID_PHRASE.len()..]
        .split_whitespace()
        .next()?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetspool_core::types::DuplexMode;

    fn opts() -> JobOptions {
        JobOptions::new(2, DuplexMode::LongEdge)
    }

    #[test]
    fn request_id_is_extracted() {
        assert_eq!(
            parse_request_id("request id is abc123"),
            Some("abc123".into())
        );
        assert_eq!(
            parse_request_id("request id is laser-42 (1 file(s))"),
            Some("laser-42".into())
        );
        assert_eq!(
            parse_request_id("Request ID is UPPER-7\n"),
            Some("UPPER-7".into())
        );
    }

    #[test]
    fn missing_pattern_yields_none() {
        assert_eq!(parse_request_id("job queued ok"), None);
        assert_eq!(parse_request_id(""), None);
        assert_eq!(parse_request_id("request id is"), None);
    }

    #[test]
    fn args_carry_every_job_option() {
        let args = QueueSubmitter::build_args(
            Path::new("/tmp/job.pdf"),
            &opts(),
            "A4",
            "office-laser",
            Some("cups.lan:631"),
        );
        assert_eq!(
            args,
            vec![
                "-d",
                "office-laser",
                "-h",
                "cups.lan:631",
                "-n",
                "2",
                "-o",
                "media=A4",
                "-o",
                "fit-to-page",
                "-o",
                "sides=two-sided-long-edge",
                "/tmp/job.pdf",
            ]
        );
    }

    #[test]
    fn no_server_flag_without_override() {
        let args = QueueSubmitter::build_args(
            Path::new("/tmp/job.pdf"),
            &opts(),
            "A4",
            "office-laser",
            None,
        );
        assert!(!args.contains(&"-h".to_string()));
    }

    #[tokio::test]
    async fn missing_binary_is_queue_missing() {
        let submitter = QueueSubmitter::with_program("jetspool-no-such-spooler");
        let err = submitter
            .submit(Path::new("/tmp/job.pdf"), &opts(), "A4", "laser", None)
            .await
            .unwrap_err();
        assert!(matches!(err, JetspoolError::QueueMissing(_)));
    }

    #[tokio::test]
    async fn nonzero_exit_is_queue_command_failure() {
        let submitter = QueueSubmitter::with_program("false");
        let err = submitter
            .submit(Path::new("/tmp/job.pdf"), &opts(), "A4", "laser", None)
            .await
            .unwrap_err();
        assert!(matches!(err, JetspoolError::QueueCommand(_)));
    }

    #[tokio::test]
    async fn unrecognized_output_is_surfaced_verbatim() {
        // `echo` exits zero and parrots the argument list, which contains
        // no acknowledgment phrase — the raw output becomes the identifier.
        let submitter = QueueSubmitter::with_program("echo");
        let job_id = submitter
            .submit(Path::new("/tmp/job.pdf"), &opts(), "A4", "laser", None)
            .await
            .unwrap();
        assert!(job_id.contains("-d laser"));
    }
}
