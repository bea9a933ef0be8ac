// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame serializer for the device's three command layers: the LPD
// submission frames, the PJL/PCL job bracketing, and the HPGL-like vector
// stream. Every function here is pure: it formats one frame into a fresh
// byte vector and the transport writes it in a single call.
//
// The byte layouts are a firmware contract. Change nothing here without a
// capture from a real device to compare against.

use beamline_core::config::JobConfig;
use beamline_core::types::{PenState, VectorParams};

/// The escape character, we insert this _a lot_.
const ESC: char = '\x1b';

/// Number of zero bytes padded after the PJL EOJ line. The device buffers
/// trailing job state and only commits it once this much extra input has
/// arrived.
pub const FOOTER_PAD: usize = 4096;

// ---------------------------------------------------------------------------
// LPD submission frames
// ---------------------------------------------------------------------------

/// `\x02<queue>\n` — begin a job on the named queue. The device accepts an
/// empty queue label.
pub fn queue_select(queue: &str) -> Vec<u8> {
    format!("\x02{queue}\n").into_bytes()
}

/// `\x02<len> cfA<job_name><host>\n` — announce the sized control file.
///
/// `<len>` is the byte length of the control file that follows, excluding
/// its NUL terminator: the `H` command letter, the host label, and the
/// newline.
pub fn control_file_announce(job_name: &str, host: &str) -> Vec<u8> {
    let len = host.len() + 2;
    format!("\x02{len} cfA{job_name}{host}\n").into_bytes()
}

/// The control file itself: the submitting host line, NUL-terminated.
pub fn control_file(host: &str) -> Vec<u8> {
    format!("H{host}\n\0").into_bytes()
}

/// `\x03<job_size> dfA<job_name><host>\n` — announce the sized data file.
pub fn data_file_announce(job_size: u64, job_name: &str, host: &str) -> Vec<u8> {
    format!("\x03{job_size} dfA{job_name}{host}\n").into_bytes()
}

// ---------------------------------------------------------------------------
// PJL / PCL job bracketing
// ---------------------------------------------------------------------------

/// The PJL job header: name the job, enter PCL, then set focus, offset
/// registration, resolution, and home the logical page.
///
/// Resolution appears twice (`&u…D` and `*t…R`) and the device requires
/// both fields to carry the same value.
pub fn job_header(config: &JobConfig) -> Vec<u8> {
    [
        format!("{ESC}%-12345X@PJL JOB NAME={}\r\n", config.title),
        format!("{ESC}E@PJL ENTER LANGUAGE=PCL\r\n"),
        // Autofocus on or off.
        format!("{ESC}&y{}A", u8::from(config.auto_focus)),
        // Left (long-edge) offset registration.
        format!("{ESC}&l0U"),
        // Top (short-edge) offset registration.
        format!("{ESC}&l0Z"),
        format!("{ESC}&u{}D", config.resolution),
        // Home the cursor.
        format!("{ESC}*p0X"),
        format!("{ESC}*p0Y"),
        format!("{ESC}*t{}R", config.resolution),
    ]
    .join("")
    .into_bytes()
}

/// Re-enter PCL, declare the raster page, and switch the device into the
/// vector sub-language. `IN;` initialises the vector parser; only after it
/// may moves and beam parameters be sent.
pub fn vector_init(config: &JobConfig) -> Vec<u8> {
    [
        format!("{ESC}E@PJL ENTER LANGUAGE=PCL\r\n"),
        // Page orientation.
        format!("{ESC}*r0F"),
        format!("{ESC}*r{}T", config.height),
        format!("{ESC}*r{}S", config.width),
        format!("{ESC}*r1A"),
        format!("{ESC}*rC"),
        format!("{ESC}%1B"),
        "IN;".to_string(),
    ]
    .join("")
    .into_bytes()
}

/// Leave the vector sub-language.
pub fn vector_end() -> Vec<u8> {
    format!("{ESC}%0B").into_bytes()
}

/// Reset the device, exit PCL, end the PJL job, then pad with
/// [`FOOTER_PAD`] zero bytes so the device flushes its tail state.
pub fn job_footer() -> Vec<u8> {
    let mut frame = format!("{ESC}E{ESC}%-12345X@PJL EOJ \r\n").into_bytes();
    frame.resize(frame.len() + FOOTER_PAD, 0);
    frame
}

// ---------------------------------------------------------------------------
// Vector stream
// ---------------------------------------------------------------------------

/// Beam parameter frame: `XR<freq>;YP<power>;ZS<speed>;` with fixed
/// 4/3/3-digit zero-padded decimal fields.
///
/// The field widths are part of the firmware contract, so values wider
/// than their field are clamped rather than widened. The frame shape
/// never varies with value magnitude.
pub fn vector_param(params: VectorParams) -> Vec<u8> {
    let frequency = params.frequency.min(9999);
    let power = params.power.min(999);
    let speed = params.speed.min(999);
    format!("XR{frequency:04};YP{power:03};ZS{speed:03};").into_bytes()
}

/// Pen move: `PD<x>,<y>;` cuts to the point, `PU<x>,<y>;` travels to it.
/// Coordinates are device units.
pub fn moveto(pen: PenState, x: u32, y: u32) -> Vec<u8> {
    format!("P{}{x},{y};", pen.command_letter()).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JobConfig {
        JobConfig {
            host: "laser.local".to_string(),
            title: "bracket".to_string(),
            job_name: "bracket.pdf".to_string(),
            resolution: 1200,
            width: 8,
            height: 8,
            ..Default::default()
        }
    }

    #[test]
    fn queue_select_frames_the_queue_name() {
        assert_eq!(queue_select(""), b"\x02\n");
        assert_eq!(queue_select("Legend"), b"\x02Legend\n");
    }

    #[test]
    fn control_announce_sizes_the_host_line() {
        // "Hworkbench\n" is 11 bytes.
        assert_eq!(
            control_file_announce("bracket.pdf", "workbench"),
            b"\x0211 cfAbracket.pdfworkbench\n"
        );
    }

    #[test]
    fn control_file_is_nul_terminated() {
        assert_eq!(control_file("workbench"), b"Hworkbench\n\0");
    }

    #[test]
    fn announced_length_matches_the_payload() {
        let announce = control_file_announce("bracket.pdf", "workbench");
        let announced: usize = std::str::from_utf8(&announce[1..3])
            .expect("decimal length field")
            .parse()
            .expect("decimal length field");
        // The payload minus its NUL terminator.
        assert_eq!(announced, control_file("workbench").len() - 1);
    }

    #[test]
    fn data_announce_carries_size_job_and_host() {
        assert_eq!(
            data_file_announce(1 << 20, "bracket.pdf", "workbench"),
            b"\x031048576 dfAbracket.pdfworkbench\n"
        );
    }

    #[test]
    fn job_header_bytes() {
        let header = job_header(&test_config());
        assert_eq!(
            header,
            b"\x1b%-12345X@PJL JOB NAME=bracket\r\n\
              \x1bE@PJL ENTER LANGUAGE=PCL\r\n\
              \x1b&y0A\x1b&l0U\x1b&l0Z\x1b&u1200D\x1b*p0X\x1b*p0Y\x1b*t1200R"
        );
    }

    #[test]
    fn job_header_repeats_the_resolution() {
        let mut config = test_config();
        config.resolution = 600;
        let header = String::from_utf8(job_header(&config)).expect("header is ascii");
        assert!(header.contains("\x1b&u600D"), "unit-of-measure field");
        assert!(header.contains("\x1b*t600R"), "raster resolution field");
    }

    #[test]
    fn vector_init_ends_in_the_vector_language() {
        let init = vector_init(&test_config());
        assert_eq!(
            init,
            b"\x1bE@PJL ENTER LANGUAGE=PCL\r\n\
              \x1b*r0F\x1b*r8T\x1b*r8S\x1b*r1A\x1b*rC\x1b%1BIN;"
        );
    }

    #[test]
    fn vector_param_fixed_widths() {
        let frame = vector_param(VectorParams {
            frequency: 5000,
            power: 100,
            speed: 5,
        });
        assert_eq!(frame, b"XR5000;YP100;ZS005;");
    }

    #[test]
    fn vector_param_clamps_oversized_values() {
        // Out-of-range values clamp to the field maximum instead of
        // widening the frame.
        let frame = vector_param(VectorParams {
            frequency: 123_456,
            power: 1000,
            speed: 0,
        });
        assert_eq!(frame, b"XR9999;YP999;ZS000;");
        assert_eq!(frame.len(), b"XR0000;YP000;ZS000;".len());
    }

    #[test]
    fn moveto_pen_down() {
        assert_eq!(moveto(PenState::Down, 1200, 1200), b"PD1200,1200;");
    }

    #[test]
    fn moveto_pen_up_at_origin() {
        assert_eq!(moveto(PenState::Up, 0, 0), b"PU0,0;");
    }

    #[test]
    fn vector_end_exits_the_sub_language() {
        assert_eq!(vector_end(), b"\x1b%0B");
    }

    #[test]
    fn footer_pads_with_exactly_4096_zeros() {
        let footer = job_footer();
        let prefix = b"\x1bE\x1b%-12345X@PJL EOJ \r\n";
        assert!(footer.starts_with(prefix));
        let pad = &footer[prefix.len()..];
        assert_eq!(pad.len(), FOOTER_PAD);
        assert!(pad.iter().all(|&byte| byte == 0));
    }
}
