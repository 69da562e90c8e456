use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use tetsim::*;

fn prepare_body(resolution: usize, parallel: bool) -> (SoftBody, PhysicsParams) {
    let params = PhysicsParams::default();
    let mesh = TetMesh::block(Vec3::new(0.0, 1.0, 0.0), Vec3::splat(0.5), resolution);
    let mut body = SoftBody::new(&mesh, &params).expect("block mesh is valid");
    body.set_parallel(parallel);
    (body, params)
}

fn bench_step_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_frame");
    for &resolution in &[4usize, 8, 12] {
        group.bench_with_input(
            BenchmarkId::new("sequential", resolution),
            &resolution,
            |b, &resolution| {
                let (mut body, params) = prepare_body(resolution, false);
                b.iter(|| body.step_frame(black_box(&params)))
            },
        );
        group.bench_with_input(
            BenchmarkId::new("parallel", resolution),
            &resolution,
            |b, &resolution| {
                let (mut body, params) = prepare_body(resolution, true);
                b.iter(|| body.step_frame(black_box(&params)))
            },
        );
    }
    group.finish();
}

fn bench_solve_constraints(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_constraints");
    let dt = PhysicsParams::default().substep_dt();
    for &resolution in &[4usize, 8, 12] {
        group.bench_with_input(
            BenchmarkId::from_parameter(resolution),
            &resolution,
            |b, &resolution| {
                let (mut body, params) = prepare_body(resolution, false);
                b.iter(|| black_box(body.solve_constraints(black_box(dt), &params)))
            },
        );
    }
    group.finish();
}

fn bench_world_frame(c: &mut Criterion) {
    c.bench_function("world_frame_four_bodies", |b| {
        let mut world = PhysicsWorld::default();
        for i in 0..4 {
            let center = Vec3::new(i as f32 - 1.5, 1.0, 0.0);
            world
                .add_body(&TetMesh::block(center, Vec3::splat(0.3), 4))
                .expect("block mesh is valid");
        }
        b.iter(|| world.step_frame())
    });
}

criterion_group!(
    benches,
    bench_step_frame,
    bench_solve_constraints,
    bench_world_frame
);
criterion_main!(benches);
