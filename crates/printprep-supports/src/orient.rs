//! Print orientation: rotation sequences, raise and wall-normal tracking.
//!
//! Supports are computed in the print frame, so the model is oriented
//! first and the wall-outward reference normal is carried through the same
//! rotation.

use printprep_kernel::Aabb3;
use printprep_math::{Transform, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::OrientationConfig;
use crate::contact::Contact;
use crate::model::Model;

/// Which orientation sequence to apply before placing supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationMode {
    /// Four-step building sequence (re-orient, lean back, peel tilts),
    /// then moved into the positive octant at the model raise.
    #[default]
    Building,
    /// Single wall tilted about X (and optionally Z), then raised.
    WallTilt,
    /// Raise only; the model is already in print orientation.
    RaiseOnly,
}

/// Rotation of the building sequence.
///
/// Applied in order: Z re-orient, X lean, Y peel tilt, Z peel tilt.
pub fn orientation_rotation(cfg: &OrientationConfig) -> Transform {
    Transform::rotation_z(cfg.tilt_z_deg.to_radians())
        .after(&Transform::rotation_y(cfg.tilt_y_deg.to_radians()))
        .after(&Transform::rotation_x(cfg.tilt_x_deg.to_radians()))
        .after(&Transform::rotation_z(cfg.reorient_z_deg.to_radians()))
}

/// Rotate with the building sequence and shift so the bounds start at
/// `(0, 0, model_raise)`.
pub fn orient_model(model: &Model, cfg: &OrientationConfig) -> Model {
    let rotated = model.transformed(&orientation_rotation(cfg));
    let bb = rotated.bounding_box();
    let oriented = rotated.translated(-bb.min.x, -bb.min.y, cfg.model_raise - bb.min.z);
    let size = bb.size();
    info!(
        footprint_x = size.x,
        footprint_y = size.y,
        height = size.z,
        "oriented model"
    );
    oriented
}

/// Move the model up by `amount`.
pub fn raise_model(model: &Model, amount: f64) -> Model {
    model.translated(0.0, 0.0, amount)
}

fn wall_tilt_rotation(tilt_deg: f64, display_negative_y: bool, z_tilt_deg: f64) -> Transform {
    // Interior toward the plate: the top leans away from the display side,
    // so the display normal always gains +Z.
    let angle = if display_negative_y { -tilt_deg } else { tilt_deg };
    Transform::rotation_z(z_tilt_deg.to_radians()).after(&Transform::rotation_x(angle.to_radians()))
}

/// Tilt a wall so its interior faces the build plate, lowest point at Z = 0.
///
/// The wall lies roughly in XZ, thin in Y, with the display surface on the
/// -Y side when `display_negative_y` is set.
pub fn tilt_for_printing(model: &Model, tilt_deg: f64, display_negative_y: bool, z_tilt_deg: f64) -> Model {
    let tilted = model.transformed(&wall_tilt_rotation(tilt_deg, display_negative_y, z_tilt_deg));
    let z_min = tilted.bounding_box().min.z;
    tilted.translated(0.0, 0.0, -z_min)
}

/// Display-side normal of a wall after [`tilt_for_printing`].
///
/// With no Z tilt this is `(0, -cos t, sin t)` for a display at -Y and
/// `(0, cos t, sin t)` for a display at +Y: the display faces up and away
/// from the plate either way.
pub fn tilted_wall_outward_normal(tilt_deg: f64, display_negative_y: bool, z_tilt_deg: f64) -> Vec3 {
    let untilted = if display_negative_y { -Vec3::y() } else { Vec3::y() };
    wall_tilt_rotation(tilt_deg, display_negative_y, z_tilt_deg).apply_vec(&untilted)
}

/// Check that every contact lies on the interior half of the model.
///
/// The model bounds are projected onto `wall_outward`; contacts projecting
/// past the midplane toward the display side are counted as bad.
pub fn validate_tilt_direction(contacts: &[Contact], bbox: &Aabb3, wall_outward: &Vec3) -> bool {
    let n = wall_outward.try_normalize(1e-12).unwrap_or_else(|| -Vec3::y());
    let (lo, hi) = bbox
        .corners()
        .iter()
        .map(|c| c.coords.dot(&n))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p), hi.max(p)));
    let midplane = 0.5 * (lo + hi);

    let bad = contacts
        .iter()
        .filter(|c| c.position.coords.dot(&n) > midplane)
        .count();
    if bad > 0 {
        warn!(
            bad,
            total = contacts.len(),
            interior = lo,
            display = hi,
            midplane,
            "contacts on display side"
        );
        false
    } else {
        info!(total = contacts.len(), "all contacts on interior side");
        true
    }
}

/// The model in print orientation.
#[derive(Debug, Clone)]
pub struct PrintOrientation {
    /// Oriented and raised model.
    pub model: Model,
    /// Wall-outward reference normal in the print frame.
    pub wall_outward: Vec3,
    /// Height of the model's lowest point above the raft.
    pub raise: f64,
}

/// Apply the configured orientation mode.
pub fn prepare_orientation(model: &Model, cfg: &OrientationConfig) -> PrintOrientation {
    let untilted = if cfg.display_negative_y { -Vec3::y() } else { Vec3::y() };
    let (oriented, wall_outward) = match cfg.mode {
        OrientationMode::Building => (
            orient_model(model, cfg),
            orientation_rotation(cfg).apply_vec(&untilted),
        ),
        OrientationMode::WallTilt => {
            let tilted = tilt_for_printing(model, cfg.wall_tilt_deg, cfg.display_negative_y, cfg.wall_z_tilt_deg);
            (
                raise_model(&tilted, cfg.model_raise),
                tilted_wall_outward_normal(cfg.wall_tilt_deg, cfg.display_negative_y, cfg.wall_z_tilt_deg),
            )
        }
        OrientationMode::RaiseOnly => (raise_model(model, cfg.model_raise), untilted),
    };
    PrintOrientation {
        model: oriented,
        wall_outward,
        raise: cfg.model_raise,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use printprep_kernel::Solid;
    use printprep_math::Point3;

    fn wall() -> Model {
        Model::from_solid(Solid::cuboid(Point3::origin(), Vec3::new(20.0, 1.2, 30.0)).unwrap()).unwrap()
    }

    #[test]
    fn test_single_axis_display_negative_y() {
        let n = tilted_wall_outward_normal(18.0, true, 0.0);
        let t = 18f64.to_radians();
        assert_abs_diff_eq!(n.x, 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(n.y, -t.cos(), epsilon = 1e-10);
        assert_abs_diff_eq!(n.z, t.sin(), epsilon = 1e-10);
    }

    #[test]
    fn test_single_axis_display_positive_y() {
        let n = tilted_wall_outward_normal(18.0, false, 0.0);
        let t = 18f64.to_radians();
        assert_abs_diff_eq!(n.x, 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(n.y, t.cos(), epsilon = 1e-10);
        assert_abs_diff_eq!(n.z, t.sin(), epsilon = 1e-10);
    }

    #[test]
    fn test_positive_y_wall_rests_on_interior_edge() {
        let tilted = tilt_for_printing(&wall(), 18.0, false, 0.0);
        let display_n = tilted_wall_outward_normal(18.0, false, 0.0);
        let faces = tilted.panels()[0].solid().faces();
        let lowest = |n: &Vec3| {
            faces
                .iter()
                .filter(|f| f.raw_normal().normalize().dot(n) > 0.999)
                .flat_map(|f| f.vertices().iter().map(|p| p.z))
                .fold(f64::INFINITY, f64::min)
        };
        // The interior face (original -Y side) carries the Z = 0 edge and
        // faces the plate; the display face stays clear of it.
        assert!(display_n.z > 0.0);
        assert_abs_diff_eq!(lowest(&-display_n), 0.0, epsilon = 1e-9);
        assert!(lowest(&display_n) > 0.3);
    }

    #[test]
    fn test_dual_axis_gains_x_component() {
        let n = tilted_wall_outward_normal(18.0, true, 8.0);
        let (t, z) = (18f64.to_radians(), 8f64.to_radians());
        assert_abs_diff_eq!(n.x, t.cos() * z.sin(), epsilon = 1e-10);
        assert_abs_diff_eq!(n.y, -t.cos() * z.cos(), epsilon = 1e-10);
        assert_abs_diff_eq!(n.z, t.sin(), epsilon = 1e-10);
        assert_abs_diff_eq!(n.norm(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_tilt() {
        let n = tilted_wall_outward_normal(0.0, true, 0.0);
        assert_abs_diff_eq!(n, -Vec3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_tilted_display_face_matches_normal() {
        let tilted = tilt_for_printing(&wall(), 18.0, true, 0.0);
        assert_abs_diff_eq!(tilted.bounding_box().min.z, 0.0, epsilon = 1e-9);

        let expected = tilted_wall_outward_normal(18.0, true, 0.0);
        let faces = tilted.panels()[0].solid().faces();
        let display = faces
            .iter()
            .find(|f| f.raw_normal().dot(&expected) > 0.999)
            .expect("display face");
        // The display face is the large one.
        assert_abs_diff_eq!(display.area(), 600.0, epsilon = 1e-6);
        // Interior faces the plate.
        assert!(expected.z > 0.0);
    }

    #[test]
    fn test_orient_model_shifts_to_raise() {
        let cfg = OrientationConfig::default();
        let oriented = orient_model(&wall(), &cfg);
        let bb = oriented.bounding_box();
        assert_abs_diff_eq!(bb.min.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bb.min.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bb.min.z, 3.0, epsilon = 1e-9);
        let before = wall().panels()[0].solid().volume();
        assert_abs_diff_eq!(oriented.panels()[0].solid().volume(), before, epsilon = 1e-6);
    }

    #[test]
    fn test_reorient_only_swaps_axes() {
        let cfg = OrientationConfig {
            tilt_x_deg: 0.0,
            tilt_y_deg: 0.0,
            tilt_z_deg: 0.0,
            ..OrientationConfig::default()
        };
        let size = orient_model(&wall(), &cfg).bounding_box().size();
        // -90 about Z turns the 20 mm X extent into Y.
        assert_abs_diff_eq!(size.x, 1.2, epsilon = 1e-9);
        assert_abs_diff_eq!(size.y, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(size.z, 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_validate_tilt_direction() {
        let bbox = Aabb3::new(Point3::origin(), Point3::new(40.0, 30.0, 20.0));
        let n = -Vec3::y();
        let interior = [Contact::new(Point3::new(5.0, 25.0, 4.0)), Contact::new(Point3::new(30.0, 20.0, 4.0))];
        assert!(validate_tilt_direction(&interior, &bbox, &n));

        let mixed = [interior[0], Contact::new(Point3::new(5.0, 2.0, 4.0))];
        assert!(!validate_tilt_direction(&mixed, &bbox, &n));
        assert!(validate_tilt_direction(&[], &bbox, &n));
    }

    #[test]
    fn test_prepare_orientation_modes() {
        let base = OrientationConfig::default();

        let building = prepare_orientation(&wall(), &base);
        assert_abs_diff_eq!(building.model.bounding_box().min.z, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(building.wall_outward.norm(), 1.0, epsilon = 1e-12);
        assert_eq!(building.raise, 3.0);

        let tilt = OrientationConfig { mode: OrientationMode::WallTilt, ..base.clone() };
        let tilted = prepare_orientation(&wall(), &tilt);
        assert_abs_diff_eq!(tilted.model.bounding_box().min.z, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            tilted.wall_outward,
            tilted_wall_outward_normal(18.0, true, 0.0),
            epsilon = 1e-12
        );

        let raise = OrientationConfig { mode: OrientationMode::RaiseOnly, ..base };
        let raised = prepare_orientation(&wall(), &raise);
        assert_abs_diff_eq!(raised.model.bounding_box().min.z, 3.0, epsilon = 1e-12);
        assert_eq!(raised.wall_outward, -Vec3::y());
    }
}
