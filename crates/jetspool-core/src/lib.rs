// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Jetspool — Core domain types, caption option parsing, and configuration
// shared across all crates.

pub mod config;
pub mod error;
pub mod options;
pub mod types;

pub use config::{Config, PrinterTarget};
pub use error::JetspoolError;
pub use types::*;
