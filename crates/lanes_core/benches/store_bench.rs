//! # Columnar Store Benchmark
//!
//! Compares:
//! 1. Row append throughput against a plain `Vec` of structs
//! 2. Partial traversal (two of five columns) against whole-row traversal

#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lanes_core::columnar;

const ROW_COUNT: usize = 1_000_000;

columnar! {
    /// Five-column particle state.
    pub struct Particles {
        x: f32,
        y: f32,
        dx: f32,
        dy: f32,
        ttl: u32,
    }
}

/// Array-of-structs baseline with the same fields.
#[derive(Clone, Default)]
struct PackedParticle {
    x: f32,
    y: f32,
    dx: f32,
    dy: f32,
    ttl: u32,
}

fn filled_store() -> Particles {
    let mut particles = Particles::with_capacity(ROW_COUNT);
    for i in 0..ROW_COUNT {
        let f = i as f32;
        particles.push(f, f * 0.5, 0.1, -0.1, (i % 600) as u32);
    }
    particles
}

// =============================================================================
// APPEND THROUGHPUT
// =============================================================================

fn bench_push(c: &mut Criterion) {
    c.bench_function("columnar_push_1M", |b| {
        b.iter(|| {
            let particles = filled_store();
            black_box(particles.len())
        });
    });

    c.bench_function("aos_push_1M", |b| {
        b.iter(|| {
            let mut particles = Vec::with_capacity(ROW_COUNT);
            for i in 0..ROW_COUNT {
                let f = i as f32;
                particles.push(PackedParticle {
                    x: f,
                    y: f * 0.5,
                    dx: 0.1,
                    dy: -0.1,
                    ttl: (i % 600) as u32,
                });
            }
            black_box(particles.len())
        });
    });
}

// =============================================================================
// TRAVERSAL: PARTIAL VIEW VS WHOLE ROWS
// =============================================================================

fn bench_traversal(c: &mut Criterion) {
    let mut particles = filled_store();

    c.bench_function("columnar_integrate_partial_1M", |b| {
        b.iter(|| {
            for (x, dx) in
                particles.iter_fields_mut::<(particles_fields::x, particles_fields::dx)>()
            {
                *x += *dx;
            }
            black_box(particles.len())
        });
    });

    c.bench_function("columnar_integrate_whole_rows_1M", |b| {
        b.iter(|| {
            for row in &mut particles {
                *row.x += *row.dx;
            }
            black_box(particles.len())
        });
    });

    let mut aos: Vec<PackedParticle> = vec![PackedParticle::default(); ROW_COUNT];
    c.bench_function("aos_integrate_1M", |b| {
        b.iter(|| {
            for p in &mut aos {
                p.x += p.dx;
            }
            black_box(aos.len())
        });
    });
}

criterion_group!(benches, bench_push, bench_traversal);
criterion_main!(benches);
