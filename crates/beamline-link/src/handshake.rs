// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// LPD job-submission handshake.
//
// The exchange is a strict request/ack state machine: every frame,
// announcement or content, must be acknowledged with a single zero byte
// before the next may be sent. No pipelining, no reordering, and no retry
// at this layer; a caller that wants another go re-runs the whole
// submission.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use beamline_core::config::JobConfig;
use beamline_core::error::{BeamlineError, Result};
use beamline_core::types::HandshakeStage;

use crate::transport::Connection;
use crate::wire;

/// Where the submission has got to. Each advance sends exactly one frame
/// and awaits exactly one ack, so skipping an announcement is not
/// expressible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandshakeState {
    /// Connected, nothing sent.
    Idle,
    /// Queue-selection frame acknowledged.
    QueueSelected,
    /// Sized control-file announcement acknowledged.
    ControlAnnounced,
    /// Control-file payload acknowledged.
    ControlDelivered,
    /// Data-file announcement acknowledged; the device now expects the
    /// job byte stream.
    Ready,
    /// A rejected ack ended the submission. Terminal.
    Aborted,
}

/// Drives the four ack-gated exchanges that open a job on the device.
pub struct Handshake<'a, S> {
    conn: &'a mut Connection<S>,
    state: HandshakeState,
}

impl<'a, S: AsyncRead + AsyncWrite + Unpin> Handshake<'a, S> {
    pub fn new(conn: &'a mut Connection<S>) -> Self {
        Self {
            conn,
            state: HandshakeState::Idle,
        }
    }

    /// Run the submission through to `Ready`.
    ///
    /// `host_label` is the short name of the submitting host, carried in
    /// the control file and both announcements. On a rejected ack the
    /// machine parks in `Aborted`, the error names the stage and the raw
    /// ack byte, and no further frames are sent.
    pub async fn run(mut self, config: &JobConfig, host_label: &str) -> Result<()> {
        while self.state != HandshakeState::Ready {
            self.advance(config, host_label).await?;
        }
        debug!(job = %config.job_name, "job submission accepted");
        Ok(())
    }

    async fn advance(&mut self, config: &JobConfig, host_label: &str) -> Result<()> {
        let (stage, frame, next) = match self.state {
            HandshakeState::Idle => (
                HandshakeStage::QueueSelect,
                wire::queue_select(&config.queue),
                HandshakeState::QueueSelected,
            ),
            HandshakeState::QueueSelected => (
                HandshakeStage::ControlAnnounce,
                wire::control_file_announce(&config.job_name, host_label),
                HandshakeState::ControlAnnounced,
            ),
            HandshakeState::ControlAnnounced => (
                HandshakeStage::ControlPayload,
                wire::control_file(host_label),
                HandshakeState::ControlDelivered,
            ),
            HandshakeState::ControlDelivered => (
                HandshakeStage::DataAnnounce,
                wire::data_file_announce(config.job_size, &config.job_name, host_label),
                HandshakeState::Ready,
            ),
            // Terminal states. `run` stops at `Ready` and returns the
            // error that parked the machine in `Aborted`, so neither is
            // ever stepped again.
            HandshakeState::Ready | HandshakeState::Aborted => return Ok(()),
        };

        if let Err(err) = self.exchange(stage, &frame).await {
            self.state = HandshakeState::Aborted;
            return Err(err);
        }
        self.state = next;
        Ok(())
    }

    /// The send-then-await-ack primitive every transition runs through.
    async fn exchange(&mut self, stage: HandshakeStage, frame: &[u8]) -> Result<()> {
        self.conn.send_frame(frame).await?;
        let ack = self.conn.read_ack().await?;
        if ack != 0 {
            return Err(BeamlineError::HandshakeRejected { stage, ack });
        }
        debug!(%stage, "stage acknowledged");
        Ok(())
    }
}

/// Short local hostname for the control-file `H` line: everything before
/// the first dot, falling back to `localhost` when the lookup fails.
pub fn local_host_label() -> String {
    let name = hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let short = name.split('.').next().unwrap_or("").trim();
    if short.is_empty() {
        "localhost".to_string()
    } else {
        short.to_string()
    }
}
