//! Splitting and registering pieces of a wall panel.

use approx::assert_relative_eq;
use printprep_kernel::Solid;
use printprep_math::{Axis, Point3, Vec3};
use printprep_split::{split_and_register, split_and_register_axis, RegistrationConfig};

fn panel() -> Solid {
    Solid::cuboid(Point3::origin(), Vec3::new(80.0, 20.0, 6.0)).unwrap()
}

#[test]
fn test_pins_fit_their_sockets() {
    let cfg = RegistrationConfig::default();
    let split = split_and_register_axis(&panel(), Axis::Y, 10.0, &cfg).unwrap();
    assert!(split.pins.len() >= 2);

    for p in &split.pins {
        // Just beyond the seam: pin material on the negative half, a void on the positive.
        let inside = p + Vec3::new(0.0, 0.2, 0.0);
        assert!(split.negative.contains_point(&inside));
        assert!(!split.positive.contains_point(&inside));
    }
    // Halves overlap only where pins sit inside sockets.
    let overlap = split.negative.intersection(&split.positive).unwrap();
    assert!(overlap.volume() < 1e-6);
}

#[test]
fn test_registration_from_toml() {
    let cfg: RegistrationConfig = toml::from_str("pin_radius = 1.0\nspacing = 30.0").unwrap();
    assert_eq!(cfg.pin_height, 1.5);
    let split = split_and_register_axis(&panel(), Axis::Y, 10.0, &cfg).unwrap();
    // 80 mm face, 3 mm margins, 30 mm spacing.
    assert_eq!(split.pins.len(), 3);
    assert_relative_eq!(split.negative.bounding_box().max.y, 11.5, epsilon = 1e-9);
}

#[test]
fn test_reversed_normal_swaps_roles() {
    let cfg = RegistrationConfig::default();
    let split = split_and_register(&panel(), &Point3::new(40.0, 0.0, 0.0), &-Vec3::x(), &cfg).unwrap();
    // Negative half is now the +X side; pins point toward -X.
    assert!(split.negative.bounding_box().min.x < 40.0);
    assert!(split.negative.bounding_box().max.x > 79.0);
    assert!(split.positive.bounding_box().max.x <= 40.0 + 1e-9);
}
