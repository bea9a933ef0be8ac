// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Beamline — live vector streaming CLI.
//
// Entry point. Thin wrapper only: argument parsing, logging init, and an
// operator-paced stdin point source. All protocol logic lives in
// beamline-link.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::sync::mpsc;

use beamline_core::config::JobConfig;
use beamline_core::types::{PenState, VectorCommand};

#[derive(Debug, Parser)]
#[command(
    name = "beamline",
    about = "Stream a live vector job to an LPD-attached laser cutter"
)]
struct Args {
    /// Hostname or IP address of the device.
    host: Option<String>,

    /// JSON config file. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// LPD port of the device.
    #[arg(long)]
    port: Option<u16>,

    /// Target queue name.
    #[arg(long)]
    queue: Option<String>,

    /// Job title shown on the device front panel.
    #[arg(long)]
    title: Option<String>,

    /// Data-file name announced to the device.
    #[arg(long)]
    job_name: Option<String>,

    /// Device resolution in DPI.
    #[arg(long)]
    resolution: Option<u32>,

    /// Raster page width in device units.
    #[arg(long)]
    width: Option<u32>,

    /// Raster page height in device units.
    #[arg(long)]
    height: Option<u32>,

    /// Ask the device to auto-focus before the job.
    #[arg(long)]
    auto_focus: bool,

    /// Connect retry window in seconds.
    #[arg(long)]
    timeout: Option<u32>,
}

impl Args {
    fn into_config(self) -> beamline_core::Result<JobConfig> {
        let mut config = match &self.config {
            Some(path) => JobConfig::from_file(path)?,
            None => JobConfig::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(queue) = self.queue {
            config.queue = queue;
        }
        if let Some(title) = self.title {
            config.title = title;
        }
        if let Some(job_name) = self.job_name {
            config.job_name = job_name;
        }
        if let Some(resolution) = self.resolution {
            config.resolution = resolution;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.auto_focus {
            config.auto_focus = true;
        }
        if let Some(timeout) = self.timeout {
            config.connect_timeout_secs = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "bad configuration");
            return ExitCode::FAILURE;
        }
    };

    let (tx, rx) = mpsc::channel(1);
    // Plain OS thread so a job failure never leaves the process waiting
    // on an operator keystroke.
    std::thread::spawn(move || operator_loop(&tx));

    match beamline_link::job::run(&config, rx).await {
        Ok(()) => {
            tracing::info!("job complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "job failed");
            ExitCode::FAILURE
        }
    }
}

/// Operator-paced point source: each input line advances one corner of a
/// demo square, pen down. `q` or end-of-input ends the stream, which lets
/// the driver emit the footer and close out the job.
fn operator_loop(tx: &mpsc::Sender<VectorCommand>) {
    const SQUARE: [(u32, u32); 4] = [(0, 0), (1200, 0), (1200, 1200), (0, 1200)];

    let stdin = std::io::stdin();
    let mut corner = 0;
    let mut line = String::new();

    loop {
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "stdin read failed");
                break;
            }
        }
        if line.trim() == "q" {
            break;
        }

        let (x, y) = SQUARE[corner];
        corner = (corner + 1) % SQUARE.len();
        tracing::info!(x, y, "sending point");

        let command = VectorCommand::Move {
            pen: PenState::Down,
            x,
            y,
        };
        if tx.blocking_send(command).is_err() {
            // The job ended underneath us.
            break;
        }
    }
}
