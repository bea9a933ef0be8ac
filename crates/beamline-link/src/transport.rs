// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// TCP transport to the device: bounded connect retries with a per-attempt
// watchdog, and the framed connection the rest of the protocol runs over.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use beamline_core::error::{BeamlineError, Result};

/// Default LPD port.
pub const LPD_PORT: u16 = 515;

/// Hard wall-clock bound on a single connect attempt (resolution plus the
/// candidate sweep). Deliberately independent of the attempt count: one
/// caps how long an attempt may hang, the other caps how many attempts
/// the window allows.
const ATTEMPT_WATCHDOG: Duration = Duration::from_secs(10);

/// How long to wait for the device's single-byte ack.
const ACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between connect attempts.
const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Resolves a host to connectable endpoints. Name resolution is an
/// external collaborator of the protocol core, so the connect loop takes
/// it as a seam and tests substitute their own.
pub trait Resolver {
    /// Resolve `host:port` to candidate socket addresses.
    fn resolve(
        &mut self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = io::Result<Vec<SocketAddr>>>;
}

/// System DNS through tokio's resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

impl Resolver for DnsResolver {
    async fn resolve(&mut self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        let addrs = tokio::net::lookup_host((host, port)).await?;
        Ok(addrs.collect())
    }
}

/// Connect to the device, attempting once per second for at most
/// `timeout_secs` attempts.
pub async fn connect(host: &str, port: u16, timeout_secs: u32) -> Result<Connection<TcpStream>> {
    connect_with(DnsResolver, host, port, timeout_secs).await
}

/// Connect using a caller-supplied resolver.
///
/// Each attempt resolves the host and sweeps every candidate address; the
/// first stream that opens wins. A resolution failure or a failed sweep
/// pauses one second before the next attempt. The whole of one attempt
/// runs under [`ATTEMPT_WATCHDOG`], so a hung connect cannot stall the
/// rest of the window.
pub async fn connect_with<R: Resolver>(
    mut resolver: R,
    host: &str,
    port: u16,
    timeout_secs: u32,
) -> Result<Connection<TcpStream>> {
    for attempt in 1..=timeout_secs {
        match tokio::time::timeout(ATTEMPT_WATCHDOG, attempt_once(&mut resolver, host, port)).await
        {
            Ok(Ok(stream)) => {
                info!(host, port, attempt, "connected");
                return Ok(Connection::new(stream, format!("{host}:{port}")));
            }
            Ok(Err(reason)) => {
                debug!(host, attempt, reason = %reason, "connect attempt failed");
            }
            Err(_) => {
                warn!(host, attempt, "connect attempt hit the watchdog");
            }
        }
        tokio::time::sleep(RETRY_PAUSE).await;
    }

    Err(BeamlineError::ConnectTimeout {
        host: host.to_string(),
        attempts: timeout_secs,
    })
}

/// One resolve-and-sweep attempt.
async fn attempt_once<R: Resolver>(
    resolver: &mut R,
    host: &str,
    port: u16,
) -> Result<TcpStream> {
    let addrs = resolver
        .resolve(host, port)
        .await
        .map_err(|_| BeamlineError::Resolution {
            host: host.to_string(),
        })?;
    if addrs.is_empty() {
        return Err(BeamlineError::Resolution {
            host: host.to_string(),
        });
    }

    let mut last = None;
    for addr in addrs {
        debug!(%addr, "trying candidate address");
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                debug!(%addr, error = %err, "candidate refused");
                last = Some(err);
            }
        }
    }

    // Non-empty candidate list, so at least one connect ran and failed.
    Err(last
        .map(BeamlineError::Io)
        .unwrap_or_else(|| BeamlineError::Resolution {
            host: host.to_string(),
        }))
}

/// An open duplex byte stream to the device.
///
/// Exactly one exists per job. The job driver owns it from connect to the
/// consuming [`close`](Connection::close), so use-after-close is not
/// expressible.
pub struct Connection<S> {
    stream: S,
    peer: String,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, peer: String) -> Self {
        Self { stream, peer }
    }

    /// Write one protocol frame with a single write call.
    ///
    /// The device parser has no way to resynchronise a truncated escape
    /// sequence, so a short write fails the whole job.
    pub async fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        let written = self.stream.write(frame).await?;
        if written != frame.len() {
            return Err(BeamlineError::ShortWrite {
                requested: frame.len(),
                written,
            });
        }
        self.stream.flush().await?;
        debug!(peer = %self.peer, len = frame.len(), frame = %preview(frame), "sent frame");
        Ok(())
    }

    /// Read the device's single-byte ack under [`ACK_TIMEOUT`].
    ///
    /// Returns the raw byte; the handshake layer decides what a non-zero
    /// value means. A timeout, read error, or short read all surface as
    /// I/O failures.
    pub async fn read_ack(&mut self) -> Result<u8> {
        let mut ack = [0u8; 1];
        tokio::time::timeout(ACK_TIMEOUT, self.stream.read_exact(&mut ack))
            .await
            .map_err(|_| {
                io::Error::new(io::ErrorKind::TimedOut, "timed out waiting for device ack")
            })??;
        debug!(peer = %self.peer, ack = ack[0], "device ack");
        Ok(ack[0])
    }

    /// Close the stream. Returns whether the close succeeded; a failed
    /// close is logged, not raised.
    pub async fn close(mut self) -> bool {
        match self.stream.shutdown().await {
            Ok(()) => {
                debug!(peer = %self.peer, "connection closed");
                true
            }
            Err(err) => {
                warn!(peer = %self.peer, error = %err, "close failed");
                false
            }
        }
    }
}

/// Printable rendering of a frame for the debug log, truncated so the
/// footer pad does not flood it.
fn preview(frame: &[u8]) -> String {
    const MAX: usize = 64;
    let mut text = frame[..frame.len().min(MAX)].escape_ascii().to_string();
    if frame.len() > MAX {
        text.push_str("...");
    }
    text
}
