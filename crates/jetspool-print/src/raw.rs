// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP delivery (JetDirect, port 9100).
//
// The simplest delivery contract: open a TCP socket and pump the rendered
// bytes. There is no job header and no terminator record — the half-close of
// the write side is the de-facto end-of-job marker, and omitting it can
// leave the device waiting for more data forever.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use jetspool_core::config::format_host_port;
use jetspool_core::error::{JetspoolError, Result};

/// One pump unit. The next chunk is not read until the previous write
/// completed, so a slow printer throttles the rasterizer through the OS
/// pipe buffer.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Connect timeout; short, since an unreachable printer should fail fast.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Stream a rendered job to `host:port` and half-close to mark end-of-job.
///
/// `io_timeout` bounds every steady-state read and write individually (it
/// is per-operation, not per-job, so arbitrarily large jobs are fine as
/// long as bytes keep moving). Returns the number of bytes delivered.
pub async fn send_stream<R>(
    reader: &mut R,
    host: &str,
    port: u16,
    io_timeout: Duration,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    let addr = format_host_port(host, port);
    info!(addr = %addr, "connecting via raw TCP");

    let mut stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr))
        .await
        .map_err(|_| {
            JetspoolError::Transport(format!(
                "connect to {addr} timed out after {}s",
                CONNECT_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|e| JetspoolError::Transport(format!("connect to {addr}: {e}")))?;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = tokio::time::timeout(io_timeout, reader.read(&mut buf))
            .await
            .map_err(|_| {
                JetspoolError::Transport(format!(
                    "job stream stalled for {}s at byte {total}",
                    io_timeout.as_secs()
                ))
            })?
            .map_err(|e| JetspoolError::Transport(format!("reading job stream: {e}")))?;
        if n == 0 {
            break;
        }

        tokio::time::timeout(io_timeout, stream.write_all(&buf[..n]))
            .await
            .map_err(|_| {
                JetspoolError::Transport(format!(
                    "send to {addr} stalled for {}s at byte {total}",
                    io_timeout.as_secs()
                ))
            })?
            .map_err(|e| JetspoolError::Transport(format!("send to {addr} at byte {total}: {e}")))?;

        total += n as u64;
        debug!(total, chunk = n, "raw TCP progress");
    }

    // Half-close: flush, then shut down only the write side so the device
    // sees end-of-job while any trailing response could still be read.
    tokio::time::timeout(io_timeout, stream.flush())
        .await
        .map_err(|_| JetspoolError::Transport(format!("flush to {addr} timed out")))?
        .map_err(|e| JetspoolError::Transport(format!("flush to {addr}: {e}")))?;
    tokio::time::timeout(io_timeout, stream.shutdown())
        .await
        .map_err(|_| JetspoolError::Transport(format!("half-close to {addr} timed out")))?
        .map_err(|e| JetspoolError::Transport(format!("half-close to {addr}: {e}")))?;

    info!(total, addr = %addr, "raw TCP job sent");
    Ok(total)
}
