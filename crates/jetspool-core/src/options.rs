// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Caption mini-language parser.
//
// Users attach a short free-text directive to each job: "2 on" means two
// copies duplexed, "3 off" three copies single-sided, "2" keeps the default
// duplex. A key=value form (copies=2, sides=two-sided-long-edge, duplex=on)
// is also accepted and wins over the plain tokens when both appear.
//
// Parsing is total: any text, however garbled, yields usable JobOptions.

use crate::types::{DuplexMode, JobOptions};

/// Tokens that switch duplex on (long-edge binding). "in" is a common typo
/// for "on" that we accept.
const DUPLEX_ON: &[&str] = &["on", "in", "true", "yes"];
const DUPLEX_OFF: &[&str] = &["off", "false", "no"];

/// Parse a caption directive into normalized job options.
///
/// Unrecognized tokens are ignored; no input is ever an error. The first
/// purely numeric token sets the copy count (clamped to >= 1); duplex
/// keywords are scanned in order with the last match winning; key=value
/// pairs are applied after the plain pass and therefore take precedence.
pub fn parse_caption(text: Option<&str>, default_duplex: DuplexMode) -> JobOptions {
    let mut copies: u32 = 1;
    let mut duplex = default_duplex;

    let Some(text) = text else {
        return JobOptions::new(copies, duplex);
    };
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return JobOptions::new(copies, duplex);
    }

    let tokens: Vec<&str> = text.split_whitespace().collect();

    // Plain pass: first numeric token is the copy count.
    for tok in &tokens {
        if let Some(n) = parse_copy_count(tok) {
            copies = n;
            break;
        }
    }
    // Plain pass: duplex keywords, last match wins.
    for tok in &tokens {
        if DUPLEX_ON.contains(tok) {
            duplex = DuplexMode::LongEdge;
        } else if DUPLEX_OFF.contains(tok) {
            duplex = DuplexMode::Simplex;
        }
    }

    // key=value pass, applied after so it overrides the plain tokens.
    for tok in &tokens {
        let Some((key, value)) = tok.split_once('=') else {
            continue;
        };
        match key {
            "copies" => {
                if let Some(n) = parse_copy_count(value) {
                    copies = n;
                }
            }
            "sides" => {
                if let Some(mode) = DuplexMode::from_sides_keyword(value) {
                    duplex = mode;
                }
            }
            "duplex" => {
                if DUPLEX_ON.contains(&value) {
                    duplex = DuplexMode::LongEdge;
                } else if DUPLEX_OFF.contains(&value) {
                    duplex = DuplexMode::Simplex;
                }
            }
            _ => {}
        }
    }

    JobOptions::new(copies, duplex)
}

/// Interpret a purely numeric token as a copy count, clamped to at least 1
/// and saturating at `u32::MAX` rather than falling back on overflow.
fn parse_copy_count(tok: &str) -> Option<u32> {
    if tok.is_empty() || !tok.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(tok.parse::<u32>().unwrap_or(u32::MAX).max(1))
}
