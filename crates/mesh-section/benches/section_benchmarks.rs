//! Benchmarks for cross-section measurement.
//!
//! Run with: cargo bench -p mesh-section
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-section -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-section -- --baseline main

use std::f64::consts::PI;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use mesh_section::{
    CrossSectionCalculator, Plane, PlaneCutter, PolyData, PolyDataFilter, SectionParams,
    Stripper, polydata_from_faces,
};
use nalgebra::{Point3, Vector3};
use ndarray::Array2;

// =============================================================================
// Test Mesh Generation
// =============================================================================

/// Closed cylinder around the z axis with `segments` sides and `rings` rings.
fn create_tube(segments: usize, rings: usize, radius: f64, height: f64) -> PolyData {
    let mut vertices = Vec::with_capacity(segments * rings + 2);
    for r in 0..rings {
        let z = height * r as f64 / (rings - 1) as f64;
        for i in 0..segments {
            let angle = 2.0 * PI * i as f64 / segments as f64;
            vertices.push([radius * angle.cos(), radius * angle.sin(), z]);
        }
    }

    let s = segments as u32;
    let mut faces = Vec::new();
    for r in 0..(rings as u32 - 1) {
        for i in 0..s {
            let a = r * s + i;
            let b = r * s + (i + 1) % s;
            faces.push([a, b, b + s]);
            faces.push([a, b + s, a + s]);
        }
    }

    // Caps fanned from centre points
    let bottom = vertices.len() as u32;
    vertices.push([0.0, 0.0, 0.0]);
    let top = vertices.len() as u32;
    vertices.push([0.0, 0.0, height]);
    let last = (rings as u32 - 1) * s;
    for i in 0..s {
        let j = (i + 1) % s;
        faces.push([bottom, j, i]);
        faces.push([top, last + i, last + j]);
    }

    polydata_from_faces(&vertices, &faces).expect("valid tube")
}

/// A centreline of `count` edges along the tube axis.
fn create_centreline(count: usize, height: f64) -> (Array2<f64>, Array2<usize>) {
    let step = height / (count + 2) as f64;
    let vertices = Array2::from_shape_fn((count + 1, 3), |(i, c)| {
        if c == 2 { step * (i + 1) as f64 } else { 0.0 }
    });
    let edges = Array2::from_shape_fn((count, 2), |(i, c)| i + c);
    (vertices, edges)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_plane_cut(c: &mut Criterion) {
    let mut group = c.benchmark_group("plane_cut");

    for &segments in &[32usize, 128, 512] {
        let mesh = create_tube(segments, 64, 1.0, 10.0);
        let plane = Plane::new(Point3::new(0.0, 0.0, 5.03), Vector3::z()).expect("plane");
        group.throughput(Throughput::Elements(mesh.poly_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(segments), &mesh, |b, mesh| {
            b.iter(|| PlaneCutter::new(plane).apply(black_box(mesh)))
        });
    }

    group.finish();
}

fn bench_stripper(c: &mut Criterion) {
    let mesh = create_tube(1024, 8, 1.0, 10.0);
    let plane = Plane::new(Point3::new(0.0, 0.0, 5.03), Vector3::z()).expect("plane");
    let cut = PlaneCutter::new(plane).apply(&mesh);

    c.bench_function("stripper_2048_segments", |b| {
        b.iter(|| Stripper::new().apply(black_box(&cut)))
    });
}

fn bench_single_profile(c: &mut Criterion) {
    let mesh = create_tube(256, 32, 1.0, 10.0);
    let calc = CrossSectionCalculator::new(mesh, SectionParams::default()).expect("calculator");
    let plane = Plane::new(Point3::new(0.0, 0.0, 5.03), Vector3::z()).expect("plane");

    c.bench_function("profile_tube_256", |b| {
        b.iter(|| calc.profile(black_box(&plane), Point3::new(0.0, 0.0, 5.03)))
    });
}

fn bench_graph_sections(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_sections");
    group.sample_size(20);

    let mesh = create_tube(128, 128, 1.0, 10.0);
    let (vertices, edges) = create_centreline(200, 10.0);

    for parallel in [false, true] {
        let params = SectionParams::default().with_parallel(parallel);
        let calc = CrossSectionCalculator::new(mesh.clone(), params).expect("calculator");
        let name = if parallel { "parallel" } else { "serial" };
        group.throughput(Throughput::Elements(edges.nrows() as u64));
        group.bench_function(name, |b| {
            b.iter(|| calc.areas(black_box(vertices.view()), edges.view()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_plane_cut,
    bench_stripper,
    bench_single_profile,
    bench_graph_sections
);
criterion_main!(benches);
