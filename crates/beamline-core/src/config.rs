// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BeamlineError, Result};
use crate::types::VectorParams;

/// Everything a single job needs to know, fixed for the job's lifetime.
///
/// Created once by the caller, owned by the job driver, read-only for
/// every other component. Two concurrent jobs from the same host must not
/// share a `job_name`: the device files jobs by name and the protocol
/// has no way to express the collision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Hostname or IP address of the device.
    pub host: String,
    /// TCP port of the LPD service.
    pub port: u16,
    /// Target queue name. The device ignores the label, but the frame
    /// still carries it.
    pub queue: String,
    /// Submitting user, for the control-file metadata.
    pub user: String,
    /// Data-file name announced to the device.
    pub job_name: String,
    /// Job title shown on the device front panel.
    pub title: String,
    /// Declared data-file size in bytes. The device only uses this for
    /// accounting; a live stream declares a generous fixed size up front.
    pub job_size: u64,
    /// Device resolution in DPI. Emitted twice in the job header and both
    /// fields must agree.
    pub resolution: u32,
    /// Raster page width in device units.
    pub width: u32,
    /// Raster page height in device units.
    pub height: u32,
    /// Whether the device should auto-focus before the job.
    pub auto_focus: bool,
    /// Connect retry window in seconds (one attempt per second).
    pub connect_timeout_secs: u32,
    /// Beam parameters emitted before the first vector move.
    pub beam: VectorParams,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 515,
            queue: String::new(),
            user: "user".to_string(),
            job_name: "beamline.pdf".to_string(),
            title: "beamline".to_string(),
            job_size: 1 << 20,
            resolution: 1200,
            width: 8,
            height: 8,
            auto_focus: false,
            connect_timeout_secs: 60,
            beam: VectorParams {
                frequency: 5000,
                power: 100,
                speed: 5,
            },
        }
    }
}

impl JobConfig {
    /// Load a configuration from a JSON file. Missing fields fall back to
    /// their defaults, so a config file only needs to name what it changes.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Reject configurations the wire format cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(BeamlineError::InvalidConfig("host must be set".into()));
        }
        if self.job_name.is_empty() {
            return Err(BeamlineError::InvalidConfig(
                "job_name must not be empty".into(),
            ));
        }
        if self.resolution == 0 {
            return Err(BeamlineError::InvalidConfig(
                "resolution must be non-zero".into(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(BeamlineError::InvalidConfig(
                "page dimensions must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_pass_validation_once_host_is_set() {
        let config = JobConfig {
            host: "laser.local".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_host_is_rejected() {
        let config = JobConfig::default();
        assert!(matches!(
            config.validate(),
            Err(BeamlineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let config = JobConfig {
            host: "laser.local".to_string(),
            resolution: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"host": "10.0.0.7", "resolution": 600}}"#).expect("write config");

        let config = JobConfig::from_file(file.path()).expect("load config");
        assert_eq!(config.host, "10.0.0.7");
        assert_eq!(config.resolution, 600);
        // Untouched fields keep their defaults.
        assert_eq!(config.port, 515);
        assert_eq!(config.beam.frequency, 5000);
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write config");

        assert!(matches!(
            JobConfig::from_file(file.path()),
            Err(BeamlineError::Serialization(_))
        ));
    }
}
