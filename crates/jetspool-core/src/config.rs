// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// The printer target is resolved exactly once at process start from the
// PRINTER_URI value and is immutable afterwards. A missing or malformed
// value is a fatal startup error — no job handling begins without a target.

use serde::{Deserialize, Serialize};

use crate::error::{JetspoolError, Result};
use crate::types::DuplexMode;

/// Default port for direct-socket (JetDirect) printing.
pub const RAW_PORT: u16 = 9100;

/// Default port for IPP/HTTP-family printer URIs.
pub const IPP_PORT: u16 = 631;

/// The resolved delivery target, tagged by backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrinterTarget {
    /// Raw streaming-socket delivery (`socket://host[:port]`).
    Socket { host: String, port: u16 },
    /// Submission through an external print queue (`lp`). The destination is
    /// either a printer URI or a named queue; `server` is an optional
    /// non-default queue-server `host[:port]`. `host`/`port` are kept only
    /// for connectivity probing and may be absent for bare queue names.
    Queue {
        destination: String,
        server: Option<String>,
        host: Option<String>,
        port: Option<u16>,
    },
}

impl PrinterTarget {
    /// Parse a printer URI (plus optional queue-server override) into a
    /// target. Accepted forms:
    ///
    /// - `socket://host[:port]` — raw backend, port defaults to 9100
    /// - `ipp(s)://host[:port]/...` or `http(s)://...` — queue backend,
    ///   the full URI is the destination
    /// - a bare name — queue backend, named destination
    pub fn parse(uri: &str, server_override: Option<&str>) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(JetspoolError::Config(
                "PRINTER_URI is required (e.g. socket://192.168.1.50:9100)".into(),
            ));
        }

        let Some((scheme, rest)) = uri.split_once("://") else {
            // Bare queue name. Probing is only possible via the server override.
            let (host, port) = match server_override {
                Some(server) => {
                    let (h, p) = split_host_port(server)?;
                    (Some(h), Some(p.unwrap_or(IPP_PORT)))
                }
                None => (None, None),
            };
            return Ok(Self::Queue {
                destination: uri.to_string(),
                server: server_override.map(str::to_string),
                host,
                port,
            });
        };

        // Authority is everything up to the first path separator.
        let authority = rest.split('/').next().unwrap_or("");
        let (host, port) = split_host_port(authority)?;

        match scheme {
            "socket" => Ok(Self::Socket {
                host,
                port: port.unwrap_or(RAW_PORT),
            }),
            "ipp" | "ipps" | "http" | "https" => Ok(Self::Queue {
                destination: uri.to_string(),
                server: server_override.map(str::to_string),
                host: Some(host),
                port: Some(port.unwrap_or(IPP_PORT)),
            }),
            other => Err(JetspoolError::Config(format!(
                "unsupported printer URI scheme '{other}' (use socket://, ipp:// or a queue name)"
            ))),
        }
    }

    /// Host and candidate ports for connectivity probing, derived from the
    /// URI scheme: a socket target answers exactly on its configured port;
    /// IPP/HTTP-family targets get their port plus the 9100 fallback, since
    /// many devices answer on both. `None` for bare queue names with no
    /// server override — there is nothing to probe.
    pub fn probe_candidates(&self) -> Option<(&str, Vec<u16>)> {
        match self {
            Self::Socket { host, port } => Some((host, vec![*port])),
            Self::Queue { host, port, .. } => {
                let host = host.as_deref()?;
                let port = port.unwrap_or(IPP_PORT);
                let mut ports = vec![port];
                if port != RAW_PORT {
                    ports.push(RAW_PORT);
                }
                Some((host, ports))
            }
        }
    }

    /// Short backend label for status output and logs.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Socket { .. } => "raw socket",
            Self::Queue { .. } => "print queue",
        }
    }
}

/// Split `host[:port]`, rejecting empty hosts and unparsable ports.
///
/// IPv6 literals are accepted bracketed (`[fe80::1]:9100`) or, without a
/// port, bare (`::1` — more than one colon means the whole string is the
/// host).
fn split_host_port(s: &str) -> Result<(String, Option<u16>)> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix('[') {
        let Some((host, after)) = rest.split_once(']') else {
            return Err(JetspoolError::Config(format!(
                "unclosed '[' in printer address '{s}'"
            )));
        };
        let port = match after {
            "" => None,
            _ => {
                let port = after.strip_prefix(':').and_then(|p| p.parse::<u16>().ok());
                Some(port.ok_or_else(|| {
                    JetspoolError::Config(format!("invalid port in printer address '{s}'"))
                })?)
            }
        };
        if host.is_empty() {
            return Err(JetspoolError::Config(format!(
                "missing host in printer address '{s}'"
            )));
        }
        return Ok((host.to_string(), port));
    }

    let (host, port) = if s.matches(':').count() > 1 {
        // Bare IPv6 literal, no port.
        (s, None)
    } else {
        match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    JetspoolError::Config(format!("invalid port in printer address '{s}'"))
                })?;
                (host, Some(port))
            }
            None => (s, None),
        }
    };
    if host.is_empty() {
        return Err(JetspoolError::Config(format!(
            "missing host in printer address '{s}'"
        )));
    }
    Ok((host.to_string(), port))
}

/// Format `host:port` for connecting, bracketing IPv6 literals so the
/// resolver does not read their colons as a port separator.
pub fn format_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

/// Process-wide settings, constructed once in main and passed by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The raw PRINTER_URI value, kept for status display.
    pub printer_uri: String,
    /// The resolved delivery target.
    pub target: PrinterTarget,
    /// Media name forwarded to the renderer and the queue tool (default "A4").
    pub default_media: String,
    /// Duplex mode applied when the caption does not choose one.
    pub default_duplex: DuplexMode,
    /// Steady-state raw socket I/O timeout. The half-close end-of-job
    /// convention gives no completion signal, so this is tunable for slow
    /// devices rather than fixed.
    pub raw_io_timeout_secs: u64,
}

impl Config {
    /// Build a configuration from explicit values (used by `from_env` and
    /// by tests).
    pub fn new(
        printer_uri: &str,
        server_override: Option<&str>,
        default_media: &str,
        default_sides: &str,
        raw_io_timeout_secs: u64,
    ) -> Result<Self> {
        let target = PrinterTarget::parse(printer_uri, server_override)?;
        let default_duplex = DuplexMode::from_sides_keyword(default_sides).ok_or_else(|| {
            JetspoolError::Config(format!(
                "invalid DEFAULT_SIDES '{default_sides}' (expected one-sided, \
                 two-sided-long-edge or two-sided-short-edge)"
            ))
        })?;
        Ok(Self {
            printer_uri: printer_uri.trim().to_string(),
            target,
            default_media: default_media.to_string(),
            default_duplex,
            raw_io_timeout_secs,
        })
    }

    /// Load configuration from the environment:
    ///
    /// - `PRINTER_URI` (required)
    /// - `PRINT_SERVER` — optional queue-server `host[:port]` override
    /// - `DEFAULT_MEDIA` (default "A4")
    /// - `DEFAULT_SIDES` (default "one-sided")
    /// - `RAW_IO_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> Result<Self> {
        let printer_uri = std::env::var("PRINTER_URI").map_err(|_| {
            JetspoolError::Config("PRINTER_URI is required (e.g. socket://192.168.1.50:9100)".into())
        })?;
        let server = std::env::var("PRINT_SERVER").ok();
        let media = std::env::var("DEFAULT_MEDIA").unwrap_or_else(|_| "A4".into());
        let sides = std::env::var("DEFAULT_SIDES").unwrap_or_else(|_| "one-sided".into());
        let timeout = std::env::var("RAW_IO_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);
        Self::new(&printer_uri, server.as_deref(), &media, &sides, timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_uri_with_port() {
        let target = PrinterTarget::parse("socket://192.168.178.176:9100", None).unwrap();
        assert_eq!(
            target,
            PrinterTarget::Socket {
                host: "192.168.178.176".into(),
                port: 9100
            }
        );
    }

    #[test]
    fn socket_uri_defaults_to_9100() {
        let target = PrinterTarget::parse("socket://printer.lan", None).unwrap();
        assert_eq!(
            target,
            PrinterTarget::Socket {
                host: "printer.lan".into(),
                port: 9100
            }
        );
    }

    #[test]
    fn ipp_uri_becomes_queue_destination() {
        let target = PrinterTarget::parse("ipp://10.0.0.7/ipp/print", None).unwrap();
        let PrinterTarget::Queue {
            destination,
            host,
            port,
            server,
        } = target
        else {
            panic!("expected queue target");
        };
        assert_eq!(destination, "ipp://10.0.0.7/ipp/print");
        assert_eq!(host.as_deref(), Some("10.0.0.7"));
        assert_eq!(port, Some(631));
        assert!(server.is_none());
    }

    #[test]
    fn bare_name_is_named_queue() {
        let target = PrinterTarget::parse("office-laser", Some("cups.lan:631")).unwrap();
        let PrinterTarget::Queue {
            destination,
            server,
            host,
            ..
        } = target
        else {
            panic!("expected queue target");
        };
        assert_eq!(destination, "office-laser");
        assert_eq!(server.as_deref(), Some("cups.lan:631"));
        assert_eq!(host.as_deref(), Some("cups.lan"));
    }

    #[test]
    fn ipv6_hosts_are_parsed() {
        let target = PrinterTarget::parse("socket://[fe80::1]:9101", None).unwrap();
        assert_eq!(
            target,
            PrinterTarget::Socket {
                host: "fe80::1".into(),
                port: 9101
            }
        );

        let target = PrinterTarget::parse("socket://::1", None).unwrap();
        assert_eq!(
            target,
            PrinterTarget::Socket {
                host: "::1".into(),
                port: 9100
            }
        );

        assert!(PrinterTarget::parse("socket://[fe80::1", None).is_err());
        assert!(PrinterTarget::parse("socket://[fe80::1]:x", None).is_err());
    }

    #[test]
    fn ipv6_hosts_are_bracketed_for_connect() {
        assert_eq!(format_host_port("::1", 9100), "[::1]:9100");
        assert_eq!(format_host_port("printer.lan", 9100), "printer.lan:9100");
    }

    #[test]
    fn empty_and_malformed_uris_are_fatal() {
        assert!(PrinterTarget::parse("", None).is_err());
        assert!(PrinterTarget::parse("socket://", None).is_err());
        assert!(PrinterTarget::parse("socket://host:notaport", None).is_err());
        assert!(PrinterTarget::parse("gopher://host", None).is_err());
    }

    #[test]
    fn probe_candidates_by_scheme() {
        let socket = PrinterTarget::parse("socket://p:9101", None).unwrap();
        assert_eq!(socket.probe_candidates(), Some(("p", vec![9101])));

        let ipp = PrinterTarget::parse("ipp://p", None).unwrap();
        assert_eq!(ipp.probe_candidates(), Some(("p", vec![631, 9100])));

        let bare = PrinterTarget::parse("office-laser", None).unwrap();
        assert!(bare.probe_candidates().is_none());
    }

    #[test]
    fn config_rejects_bad_sides() {
        let err = Config::new("socket://p", None, "A4", "both", 30).unwrap_err();
        assert!(err.to_string().contains("DEFAULT_SIDES"));
    }

    #[test]
    fn config_carries_defaults() {
        let config = Config::new("socket://p", None, "A4", "two-sided-long-edge", 45).unwrap();
        assert_eq!(config.default_duplex, DuplexMode::LongEdge);
        assert_eq!(config.raw_io_timeout_secs, 45);
        assert_eq!(config.target.backend_name(), "raw socket");
    }
}
