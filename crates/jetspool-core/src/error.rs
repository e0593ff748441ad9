// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Jetspool.

use thiserror::Error;

/// Top-level error type for all Jetspool operations.
#[derive(Debug, Error)]
pub enum JetspoolError {
    // -- Startup --
    /// Missing or malformed printer target. Fatal: raised before any job
    /// handling begins, never during dispatch.
    #[error("invalid printer configuration: {0}")]
    Config(String),

    // -- Rendering --
    /// The rasterizer could not be started, crashed, or exited non-zero.
    #[error("render failed: {0}")]
    Render(String),

    // -- Delivery --
    /// Raw socket connect/write/half-close failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The queue submission tool ran but exited non-zero.
    #[error("queue command failed: {0}")]
    QueueCommand(String),

    /// The queue submission tool could not be launched at all
    /// (missing binary, permission denied).
    #[error("queue tool unavailable: {0}")]
    QueueMissing(String),

    // -- I/O --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, JetspoolError>;
