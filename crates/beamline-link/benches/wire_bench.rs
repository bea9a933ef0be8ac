// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the frame serializer in the beamline-link
// crate. The vector-stream builders run once per operator action, but the
// footer allocates its whole pad per call, so keep an eye on both.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use beamline_core::config::JobConfig;
use beamline_core::types::{PenState, VectorParams};
use beamline_link::wire;

fn bench_config() -> JobConfig {
    JobConfig {
        host: "laser.local".to_string(),
        title: "bench".to_string(),
        job_name: "bench.pdf".to_string(),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Benchmark the job bracketing frames (header, vector init, footer).
fn bench_job_bracketing(c: &mut Criterion) {
    let config = bench_config();

    c.bench_function("job_header", |b| {
        b.iter(|| {
            let frame = wire::job_header(black_box(&config));
            black_box(frame);
        });
    });

    c.bench_function("vector_init", |b| {
        b.iter(|| {
            let frame = wire::vector_init(black_box(&config));
            black_box(frame);
        });
    });

    c.bench_function("job_footer (4 KiB pad)", |b| {
        b.iter(|| {
            let frame = wire::job_footer();
            black_box(frame);
        });
    });
}

/// Benchmark the per-point vector stream frames.
fn bench_vector_stream(c: &mut Criterion) {
    c.bench_function("moveto", |b| {
        b.iter(|| {
            let frame = wire::moveto(
                black_box(PenState::Down),
                black_box(1200),
                black_box(1200),
            );
            black_box(frame);
        });
    });

    c.bench_function("vector_param", |b| {
        let params = VectorParams {
            frequency: 5000,
            power: 100,
            speed: 5,
        };
        b.iter(|| {
            let frame = wire::vector_param(black_box(params));
            black_box(frame);
        });
    });
}

criterion_group!(benches, bench_job_bracketing, bench_vector_stream);
criterion_main!(benches);
