// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Jetspool — print-job dispatch engine, CLI front end.
//
// Entry point. Initialises logging, loads the printer configuration from
// the environment (fatal if missing or malformed), and runs one command:
// status, ping, testpage, or print.

mod testpage;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use jetspool_core::config::Config;
use jetspool_print::probe::{self, PROBE_TIMEOUT};
use jetspool_print::Dispatcher;

#[derive(Debug, Parser)]
#[command(
    name = "jetspool",
    about = "Dispatch PDF print jobs to a raw-9100 printer or an external print queue",
    version
)]
struct Cli {
    /// Emit machine-readable JSON instead of text where applicable.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the configured printer target and job defaults.
    Status,
    /// TCP-probe the printer's candidate ports (diagnostics only).
    Ping {
        /// Probe this host instead of the configured one.
        host: Option<String>,
    },
    /// Generate a test page and dispatch it (1 copy, single-sided).
    Testpage,
    /// Dispatch a PDF, with an optional caption directive such as "2 on",
    /// "3 off", or "copies=2 sides=two-sided-long-edge".
    Print {
        /// Path to the PDF document.
        file: PathBuf,
        /// Caption directive controlling copies and duplex.
        #[arg(short, long)]
        options: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // The target is resolved exactly once, before any job handling.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    tracing::info!(
        printer = %config.printer_uri,
        backend = config.target.backend_name(),
        "jetspool configured"
    );

    match cli.command {
        Command::Status => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&config).unwrap());
            } else {
                println!("printer:  {}", config.printer_uri);
                println!("backend:  {}", config.target.backend_name());
                println!("media:    {}", config.default_media);
                println!("sides:    {}", config.default_duplex.sides_keyword());
                println!("raw I/O timeout: {}s", config.raw_io_timeout_secs);
            }
            ExitCode::SUCCESS
        }

        Command::Ping { host } => {
            match probe::probe_target(&config.target, host.as_deref(), PROBE_TIMEOUT).await {
                Some(report) => {
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&report).unwrap());
                    } else {
                        println!("{}", report.render_text());
                    }
                    ExitCode::SUCCESS
                }
                None => {
                    eprintln!(
                        "nothing to probe: the target is a named queue and no \
                         PRINT_SERVER is configured — pass a host (jetspool ping <host>)"
                    );
                    ExitCode::FAILURE
                }
            }
        }

        Command::Testpage => {
            let dir = match tempfile::tempdir() {
                Ok(dir) => dir,
                Err(e) => {
                    eprintln!("cannot create temp dir: {e}");
                    return ExitCode::FAILURE;
                }
            };
            let page = match testpage::write_test_page(dir.path()) {
                Ok(path) => path,
                Err(e) => {
                    eprintln!("{e}");
                    return ExitCode::FAILURE;
                }
            };

            let dispatcher = Dispatcher::new(config);
            let result = dispatcher.dispatch(&page, Some("1 off")).await;
            println!("{}", result.message);
            if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }

        Command::Print { file, options } => {
            if !file.is_file() {
                eprintln!("no such file: {}", file.display());
                return ExitCode::FAILURE;
            }
            let dispatcher = Dispatcher::new(config);
            let result = dispatcher.dispatch(&file, options.as_deref()).await;
            println!("{}", result.message);
            if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
