//! Clipping supports against panels and their exterior slabs.

use printprep_kernel::{KernelResult, Solid};
use printprep_math::{Point3, Vec3};
use tracing::{info, warn};

use crate::config::ClipConfig;
use crate::model::{Model, Panel};

/// Box just beyond the exterior face of `panel`.
///
/// The exterior side is the one facing away from `model_center` along the
/// dominant horizontal offset of the panel's centroid.
pub fn exterior_slab(panel: &Panel, model_center: &Point3, cfg: &ClipConfig) -> KernelResult<Solid> {
    let pbb = panel.bbox();
    let size = pbb.size();
    let com = panel.centroid();
    let dx = com.x - model_center.x;
    let dy = com.y - model_center.y;
    let (d, m, o) = (cfg.slab_depth, cfg.slab_margin, cfg.slab_overlap);

    let (min, extent) = if dx.abs() > dy.abs() {
        let x = if dx > 0.0 { pbb.max.x - o } else { pbb.min.x - d + o };
        (
            Point3::new(x, pbb.min.y - m, pbb.min.z - m),
            Vec3::new(d, size.y + 2.0 * m, size.z + 2.0 * m),
        )
    } else {
        let y = if dy > 0.0 { pbb.max.y - o } else { pbb.min.y - d + o };
        (
            Point3::new(pbb.min.x - m, y, pbb.min.z - m),
            Vec3::new(size.x + 2.0 * m, d, size.z + 2.0 * m),
        )
    };
    Solid::cuboid(min, extent)
}

/// Exterior slabs for every panel, parallel to [`Model::panels`].
pub fn exterior_slabs(model: &Model, cfg: &ClipConfig) -> Vec<Option<Solid>> {
    let center = model.bounding_box().center();
    model
        .panels()
        .iter()
        .enumerate()
        .map(|(i, panel)| match exterior_slab(panel, &center, cfg) {
            Ok(slab) => Some(slab),
            Err(e) => {
                warn!(panel = i, "exterior slab failed: {e}");
                None
            }
        })
        .collect()
}

/// Supports after clipping.
#[derive(Debug, Clone, Default)]
pub struct ClipOutcome {
    /// Clipped (or untouched) support shapes, parallel to the input.
    pub shapes: Vec<Solid>,
    /// How many shapes changed.
    pub clipped: usize,
}

/// Remove support material inside panels and beyond their exterior faces.
///
/// For every panel a shape overlaps, the panel and then its exterior slab
/// are subtracted. A cut that leaves too little material is discarded and
/// the shape keeps its previous state.
pub fn clip_supports(shapes: &[Solid], model: &Model, cfg: &ClipConfig) -> ClipOutcome {
    let slabs = exterior_slabs(model, cfg);
    let mut outcome = ClipOutcome {
        shapes: Vec::with_capacity(shapes.len()),
        clipped: 0,
    };

    for shape in shapes {
        let mut result = shape.clone();
        let mut changed = false;
        for (j, (panel, slab)) in model.panels().iter().zip(&slabs).enumerate() {
            if !result
                .bounding_box()
                .overlaps(&panel.bbox().expanded(cfg.bbox_margin))
            {
                continue;
            }
            match clip_once(&result, panel, slab.as_ref(), cfg) {
                Ok(Some(clipped)) => {
                    result = clipped;
                    changed = true;
                }
                Ok(None) => {}
                Err(e) => warn!(panel = j, "clip failed: {e}"),
            }
        }
        if changed {
            outcome.clipped += 1;
        }
        outcome.shapes.push(result);
    }

    info!(
        shapes = shapes.len(),
        clipped = outcome.clipped,
        "clipped supports against panels and exterior slabs"
    );
    outcome
}

fn clip_once(
    shape: &Solid,
    panel: &Panel,
    slab: Option<&Solid>,
    cfg: &ClipConfig,
) -> KernelResult<Option<Solid>> {
    let common = panel.solid().intersection(shape)?;
    if common.volume() < cfg.min_overlap_volume {
        return Ok(None);
    }
    let mut cut = shape.difference(panel.solid())?;
    if let Some(slab) = slab {
        cut = cut.difference(slab)?;
    }
    Ok((cut.volume() > cfg.min_keep_volume).then_some(cut))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Left and right walls of a 40 x 30 footprint.
    fn two_walls() -> Model {
        let left = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(1.2, 30.0, 20.0)).unwrap();
        let right = Solid::cuboid(Point3::new(38.8, 0.0, 3.0), Vec3::new(1.2, 30.0, 20.0)).unwrap();
        Model::new([left, right]).unwrap()
    }

    fn column(x: f64, y: f64, z0: f64, h: f64) -> Solid {
        Solid::cylinder(Point3::new(x, y, z0), Vec3::z(), 0.4, h, 16).unwrap()
    }

    #[test]
    fn test_slab_sits_outside_exterior_face() {
        let model = two_walls();
        let center = model.bounding_box().center();
        let cfg = ClipConfig::default();

        let right = exterior_slab(&model.panels()[1], &center, &cfg).unwrap().bounding_box();
        assert_abs_diff_eq!(right.min.x, 39.9, epsilon = 1e-9);
        assert_abs_diff_eq!(right.max.x, 42.9, epsilon = 1e-9);
        assert_abs_diff_eq!(right.min.y, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(right.max.z, 24.0, epsilon = 1e-9);

        let left = exterior_slab(&model.panels()[0], &center, &cfg).unwrap().bounding_box();
        assert_abs_diff_eq!(left.min.x, -2.9, epsilon = 1e-9);
        assert_abs_diff_eq!(left.max.x, 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_slab_on_y_dominant_panel() {
        let front = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(40.0, 1.2, 20.0)).unwrap();
        let back = Solid::cuboid(Point3::new(0.0, 28.8, 3.0), Vec3::new(40.0, 1.2, 20.0)).unwrap();
        let model = Model::new([front, back]).unwrap();
        let center = model.bounding_box().center();
        let slab = exterior_slab(&model.panels()[0], &center, &ClipConfig::default())
            .unwrap()
            .bounding_box();
        assert_abs_diff_eq!(slab.min.y, -2.9, epsilon = 1e-9);
        assert_abs_diff_eq!(slab.max.y, 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(slab.min.x, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_protruding_column_is_trimmed() {
        let model = two_walls();
        // Straddles the right wall's exterior face at x = 40.
        let shapes = [column(40.0, 15.0, 0.0, 10.0), column(20.0, 15.0, 0.0, 10.0)];
        let outcome = clip_supports(&shapes, &model, &ClipConfig::default());
        assert_eq!(outcome.clipped, 1);
        assert_eq!(outcome.shapes.len(), 2);

        let trimmed = outcome.shapes[0].bounding_box();
        // Nothing survives above the wall bottom, and nothing past the slab start.
        assert!(trimmed.max.z <= 3.0 + 1e-6);
        assert!(outcome.shapes[0].volume() < shapes[0].volume());
        assert!(outcome.shapes[0].volume() > 0.01);

        // The far column is untouched.
        assert_abs_diff_eq!(outcome.shapes[1].volume(), shapes[1].volume(), epsilon = 1e-9);
    }

    #[test]
    fn test_fully_consumed_shape_keeps_previous_state() {
        let model = two_walls();
        // Entirely inside the right wall and its slab.
        let inside = Solid::cuboid(Point3::new(39.0, 10.0, 5.0), Vec3::new(0.5, 0.5, 0.5)).unwrap();
        let outcome = clip_supports(&[inside.clone()], &model, &ClipConfig::default());
        assert_eq!(outcome.clipped, 0);
        assert_abs_diff_eq!(outcome.shapes[0].volume(), inside.volume(), epsilon = 1e-12);
    }
}
