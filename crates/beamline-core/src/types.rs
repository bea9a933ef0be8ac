// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Beamline laser driver.

use serde::{Deserialize, Serialize};

/// Pen state for a vector move. `Down` fires the beam along the move,
/// `Up` travels without cutting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PenState {
    Up,
    Down,
}

impl PenState {
    /// HPGL command letter for this pen state (`PU` / `PD`).
    pub fn command_letter(&self) -> char {
        match self {
            Self::Up => 'U',
            Self::Down => 'D',
        }
    }
}

/// Beam parameters for the vector stream: pulse frequency, laser power,
/// and head speed. The device consumes these as fixed-width decimal
/// fields, so values beyond the field width are clamped at serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorParams {
    /// Pulse frequency in Hz (wire field: 4 digits).
    pub frequency: u32,
    /// Laser power in percent (wire field: 3 digits).
    pub power: u32,
    /// Head speed (wire field: 3 digits).
    pub speed: u32,
}

/// One unit of work from the point source. Produced externally
/// (operator-paced in the CLI), consumed in order by the job driver,
/// never retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VectorCommand {
    /// Move the head to device coordinates `(x, y)` with the given pen state.
    Move { pen: PenState, x: u32, y: u32 },
    /// Switch beam parameters mid-stream.
    Param(VectorParams),
}

/// The four ack-gated exchanges of the LPD job submission, in protocol
/// order. Carried in errors so a rejection names the stage it happened at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandshakeStage {
    /// `\x02<queue>\n` — select the target queue.
    QueueSelect,
    /// `\x02<len> cfA...` — announce the sized control file.
    ControlAnnounce,
    /// `H<host>\n\0` — the control file itself.
    ControlPayload,
    /// `\x03<size> dfA...` — announce the sized data file.
    DataAnnounce,
}

impl std::fmt::Display for HandshakeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::QueueSelect => "queue select",
            Self::ControlAnnounce => "control file announce",
            Self::ControlPayload => "control file payload",
            Self::DataAnnounce => "data file announce",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pen_letters_match_hpgl() {
        assert_eq!(PenState::Down.command_letter(), 'D');
        assert_eq!(PenState::Up.command_letter(), 'U');
    }

    #[test]
    fn stage_names_are_readable() {
        assert_eq!(HandshakeStage::QueueSelect.to_string(), "queue select");
        assert_eq!(
            HandshakeStage::DataAnnounce.to_string(),
            "data file announce"
        );
    }
}
