// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Jetspool dispatch engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a print job, used for log correlation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Duplex printing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplexMode {
    Simplex,
    LongEdge,
    ShortEdge,
}

impl DuplexMode {
    /// The `sides` job-option keyword (RFC 8011 §5.2.8) for this mode,
    /// as understood by CUPS `lp -o sides=`.
    pub fn sides_keyword(&self) -> &'static str {
        match self {
            Self::Simplex => "one-sided",
            Self::LongEdge => "two-sided-long-edge",
            Self::ShortEdge => "two-sided-short-edge",
        }
    }

    /// Parse a `sides` keyword back into a mode.
    pub fn from_sides_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "one-sided" => Some(Self::Simplex),
            "two-sided-long-edge" => Some(Self::LongEdge),
            "two-sided-short-edge" => Some(Self::ShortEdge),
            _ => None,
        }
    }

    /// Whether both sides of the sheet are printed.
    pub fn is_duplex(&self) -> bool {
        !matches!(self, Self::Simplex)
    }
}

/// Normalized job options derived from the caption mini-language.
///
/// By the time a transport sees this, `copies` is at least 1 and `duplex`
/// is one of the closed enum values — never free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOptions {
    pub copies: u32,
    pub duplex: DuplexMode,
}

impl JobOptions {
    pub fn new(copies: u32, duplex: DuplexMode) -> Self {
        Self {
            copies: copies.max(1),
            duplex,
        }
    }
}

/// Everything the renderer needs for one job. Built once per dispatch,
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Path to the page-description (PDF) document.
    pub document: PathBuf,
    pub options: JobOptions,
    /// Media name as configured (e.g. "A4"); mapped to a rasterizer size
    /// token only for known papers.
    pub media: String,
    /// Output resolution. Fixed at 600 for the pxlmono profile.
    pub resolution_dpi: u32,
}

impl RenderRequest {
    pub fn new(document: impl Into<PathBuf>, options: JobOptions, media: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            options,
            media: media.into(),
            resolution_dpi: 600,
        }
    }
}

/// The one value handed back to the caller for every job.
///
/// Never exposes a raw transport error — `message` is always a short
/// human-readable summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub success: bool,
    pub message: String,
}

impl DispatchResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Outcome of one TCP reachability probe. Ephemeral, diagnostics only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub port: u16,
    pub reachable: bool,
    /// Wall-clock connect time, present only when reachable.
    pub latency_ms: Option<f64>,
    /// Underlying error rendered as text, present only when unreachable.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_keywords_round_trip() {
        for mode in [DuplexMode::Simplex, DuplexMode::LongEdge, DuplexMode::ShortEdge] {
            assert_eq!(DuplexMode::from_sides_keyword(mode.sides_keyword()), Some(mode));
        }
        assert_eq!(DuplexMode::from_sides_keyword("both-sides"), None);
    }

    #[test]
    fn job_options_clamp_copies() {
        assert_eq!(JobOptions::new(0, DuplexMode::Simplex).copies, 1);
        assert_eq!(JobOptions::new(7, DuplexMode::Simplex).copies, 7);
    }
}
