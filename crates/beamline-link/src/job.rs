// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job driver: sequences one complete job from connect to disconnect.
//
// Ordering is the whole point here. Vector commands are only serialized
// between `vector_init` and `vector_end`, the footer only after the
// stream ends, and the connection is closed exactly once whatever
// happened before.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc::Receiver;
use tracing::{info, warn};

use beamline_core::config::JobConfig;
use beamline_core::error::Result;
use beamline_core::types::VectorCommand;

use crate::handshake::{self, Handshake};
use crate::transport::{self, Connection};
use crate::wire;

/// Run one job end to end: connect, submit, stream, finish, close.
///
/// `points` is the external point source. It may run indefinitely; every
/// command it produces is serialized in order, synchronously, before the
/// next is accepted. When it closes, the vector stream is ended and the
/// job footer flushed.
pub async fn run(config: &JobConfig, points: Receiver<VectorCommand>) -> Result<()> {
    config.validate()?;
    let conn: Connection<TcpStream> =
        transport::connect(&config.host, config.port, config.connect_timeout_secs).await?;
    run_on(conn, config, points).await
}

/// Same as [`run`] but over an already-open connection, which lets tests
/// drive a whole job against an in-memory device.
pub async fn run_on<S: AsyncRead + AsyncWrite + Unpin>(
    mut conn: Connection<S>,
    config: &JobConfig,
    mut points: Receiver<VectorCommand>,
) -> Result<()> {
    let result = drive(&mut conn, config, &mut points).await;
    if !conn.close().await {
        warn!("device connection did not close cleanly");
    }
    result
}

async fn drive<S: AsyncRead + AsyncWrite + Unpin>(
    conn: &mut Connection<S>,
    config: &JobConfig,
    points: &mut Receiver<VectorCommand>,
) -> Result<()> {
    let host_label = handshake::local_host_label();
    info!(
        host = %config.host,
        job = %config.job_name,
        user = %config.user,
        submitting_host = %host_label,
        "starting job"
    );

    Handshake::new(conn).run(config, &host_label).await?;

    conn.send_frame(&wire::job_header(config)).await?;
    conn.send_frame(&wire::vector_init(config)).await?;
    conn.send_frame(&wire::vector_param(config.beam)).await?;

    let mut moves: u64 = 0;
    while let Some(command) = points.recv().await {
        match command {
            VectorCommand::Move { pen, x, y } => {
                conn.send_frame(&wire::moveto(pen, x, y)).await?;
                moves += 1;
            }
            VectorCommand::Param(params) => {
                conn.send_frame(&wire::vector_param(params)).await?;
            }
        }
    }

    info!(moves, "point source finished, closing out the job");
    conn.send_frame(&wire::vector_end()).await?;
    conn.send_frame(&wire::job_footer()).await?;
    Ok(())
}
