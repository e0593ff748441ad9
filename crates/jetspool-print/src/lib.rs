// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Jetspool Print — the dispatch engine. Connectivity probing, streaming
// Ghostscript rendering, and the two delivery backends (raw socket 9100 and
// external print-queue submission), unified behind the `Dispatcher`.

pub mod dispatch;
pub mod probe;
pub mod queue;
pub mod raw;
pub mod render;

pub use dispatch::Dispatcher;
pub use probe::{probe, probe_target};
pub use queue::QueueSubmitter;
pub use render::Renderer;
