use criterion::{black_box, criterion_group, criterion_main, Criterion};
use printprep_kernel::Solid;
use printprep_math::{Point3, Vec3};

fn panel() -> Solid {
    let wall = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(60.0, 1.2, 40.0)).unwrap();
    let window = Solid::cuboid(Point3::new(20.0, -1.0, 15.0), Vec3::new(10.0, 4.0, 12.0)).unwrap();
    wall.difference(&window).unwrap()
}

fn bench_column_intersection(c: &mut Criterion) {
    let panel = panel();
    let column = Solid::cylinder(Point3::new(25.0, 0.6, 0.0), Vec3::z(), 0.4, 30.0, 16).unwrap();
    c.bench_function("column_panel_intersection", |b| {
        b.iter(|| black_box(&column).intersection(black_box(&panel)).unwrap())
    });
}

fn bench_support_clip(c: &mut Criterion) {
    let panel = panel();
    let column = Solid::cylinder(Point3::new(10.0, 0.6, 0.0), Vec3::z(), 0.4, 20.0, 16).unwrap();
    c.bench_function("support_panel_difference", |b| {
        b.iter(|| black_box(&column).difference(black_box(&panel)).unwrap())
    });
}

fn bench_segment_distance(c: &mut Criterion) {
    let panel = panel();
    let a = Point3::new(25.0, 3.0, 0.1);
    let top = Point3::new(25.0, 3.0, 40.0);
    c.bench_function("segment_distance", |b| {
        b.iter(|| black_box(&panel).distance_to_segment(&a, &top).unwrap())
    });
}

criterion_group!(
    benches,
    bench_column_intersection,
    bench_support_clip,
    bench_segment_distance
);
criterion_main!(benches);
