use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Mat4, Vec3};
use shadow_scene::camera::{move_camera_on_keyboard, Camera, CameraShake};
use shadow_scene::config::CameraConfig;
use shadow_scene::core::{Button, HeldButtons};
use shadow_scene::math::{light_view_projection, shadow_map_transform, AABB};
use shadow_scene::model::MeshData;
use shadow_scene::types::{FullUniforms, LightParams};

/// Benchmark: Per-frame projection-view rebuild
fn bench_projection_view(c: &mut Criterion) {
    let mut camera = Camera::new(&CameraConfig::default());
    camera.reshape(1920, 1080);

    c.bench_function("projection_view_matrix", |b| {
        b.iter(|| black_box(&camera).projection_view_matrix())
    });
}

/// Benchmark: Keyboard movement with an increasing number of held keys
fn bench_keyboard_movement(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_camera_on_keyboard");
    for held in [0usize, 1, 3, 6] {
        let controller = HeldButtons::new(&Button::MOVEMENT[..held]);
        group.bench_with_input(BenchmarkId::from_parameter(held), &controller, |b, controller| {
            b.iter(|| {
                move_camera_on_keyboard(
                    black_box(Vec3::new(1.0, 2.0, 3.0)),
                    Vec3::Y,
                    black_box(Vec3::new(0.3, -0.1, -0.9)),
                    controller,
                    0.1,
                )
            })
        });
    }
    group.finish();
}

/// Benchmark: One frame of camera shake
fn bench_shake(c: &mut Criterion) {
    let mut shake = CameraShake::new(4.0, Some(1));
    c.bench_function("smooth_random_movement", |b| {
        b.iter(|| shake.smooth_random_movement(black_box(Vec3::ZERO), 0.2))
    });
}

/// Benchmark: Uniform packing for one full-shader draw, normal matrix included
fn bench_full_uniforms(c: &mut Criterion) {
    let bounds = AABB::new(Vec3::splat(-10.0), Vec3::splat(10.0));
    let light = light_view_projection(Vec3::new(-0.4, -1.0, -0.3), &bounds);
    let model = Mat4::from_scale_rotation_translation(
        Vec3::new(2.0, 1.0, 0.5),
        glam::Quat::from_rotation_y(0.7),
        Vec3::new(3.0, 0.0, -2.0),
    );
    let mvp = Camera::default().projection_view_matrix() * model;
    let params = LightParams {
        direction: Vec3::new(-0.4, -1.0, -0.3),
        ambient: 0.25,
        shadow_bias: 0.002,
        shadow_map_size: 2048,
    };

    c.bench_function("full_uniforms_pack", |b| {
        b.iter(|| {
            let smt = shadow_map_transform(&light, black_box(&model));
            FullUniforms::new(&mvp, &smt, &model, [1.0; 4], 0.8, &params)
        })
    });
}

/// Benchmark: Smooth normal generation for a subdivided box
fn bench_compute_normals(c: &mut Criterion) {
    let mut mesh = MeshData::default();
    for i in 0..64 {
        let mut cube = MeshData::cuboid(Vec3::ONE);
        for v in &mut cube.vertices {
            v.position[0] += i as f32 * 2.5;
        }
        mesh.append(&cube);
    }

    c.bench_function("compute_normals_64_boxes", |b| {
        b.iter(|| {
            let mut m = mesh.clone();
            m.compute_normals();
            m
        })
    });
}

criterion_group!(
    benches,
    bench_projection_view,
    bench_keyboard_movement,
    bench_shake,
    bench_full_uniforms,
    bench_compute_normals,
);

criterion_main!(benches);
