// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Beamline.

use thiserror::Error;

use crate::types::HandshakeStage;

/// Top-level error type for all Beamline operations.
///
/// Every variant is fatal to the current job. Nothing below the connect
/// retry loop is retried internally; a caller that wants another go
/// re-runs the whole job.
#[derive(Debug, Error)]
pub enum BeamlineError {
    // -- Transport errors --
    #[error("no usable address for {host}")]
    Resolution { host: String },

    #[error("could not connect to {host} within {attempts} attempts")]
    ConnectTimeout { host: String, attempts: u32 },

    /// The device accepted fewer bytes than we asked it to. A truncated
    /// escape sequence leaves the device parser in an undefined state, so
    /// the job cannot continue.
    #[error("short write: device accepted {written} of {requested} bytes")]
    ShortWrite { requested: usize, written: usize },

    // -- Handshake errors --
    #[error("device rejected {stage} frame with ack 0x{ack:02x}")]
    HandshakeRejected { stage: HandshakeStage, ack: u8 },

    // -- Configuration --
    #[error("invalid job configuration: {0}")]
    InvalidConfig(String),

    // -- Ambient --
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BeamlineError>;
