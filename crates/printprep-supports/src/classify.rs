//! Face classification by printability.
//!
//! Each face gets exactly one [`FaceCategory`] from an ordered decision
//! list over its normal, bounding extents and area, relative to a wall
//! outward (display) normal. The result is a pure function of those
//! inputs.

use std::collections::BTreeMap;
use std::fmt;

use printprep_kernel::{Aabb3, BoundaryFace, Solid};
use printprep_math::{plane_basis, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ClassifierConfig;

/// Printability category of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceCategory {
    /// Wall surface facing the viewer.
    Display,
    /// Wall surface facing the building interior.
    Interior,
    /// Vertical or upward-facing; needs no support.
    Vertical,
    /// Thin wall-side face such as a brick course edge.
    BrickSide,
    /// Small or shallow decorative overhang; left unsupported.
    CosmeticOverhang,
    /// Overhang with enough area and depth to need support.
    StructuralOverhang,
    /// Thin feature inside a window opening, such as a mullion.
    Fragile,
}

impl FaceCategory {
    /// Snake-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            FaceCategory::Display => "display",
            FaceCategory::Interior => "interior",
            FaceCategory::Vertical => "vertical",
            FaceCategory::BrickSide => "brick_side",
            FaceCategory::CosmeticOverhang => "cosmetic_overhang",
            FaceCategory::StructuralOverhang => "structural_overhang",
            FaceCategory::Fragile => "fragile",
        }
    }
}

impl fmt::Display for FaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Window opening in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowBounds {
    /// Left edge.
    pub x_min: f64,
    /// Right edge.
    pub x_max: f64,
    /// Sill height.
    pub z_min: f64,
    /// Head height.
    pub z_max: f64,
}

impl WindowBounds {
    /// Whether `bbox` lies fully inside the opening in X and Z.
    pub fn contains(&self, bbox: &Aabb3) -> bool {
        bbox.min.x >= self.x_min
            && bbox.max.x <= self.x_max
            && bbox.min.z >= self.z_min
            && bbox.max.z <= self.z_max
    }
}

/// Geometric summary the classifier works from.
#[derive(Debug, Clone, Copy)]
pub struct FaceSummary {
    /// Outward unit normal, or zero when it could not be computed.
    pub normal: Vec3,
    /// Face area (mm²).
    pub area: f64,
    /// Face bounds.
    pub bbox: Aabb3,
    /// Smallest extent measured within the face's own plane.
    pub thickness: f64,
}

impl FaceSummary {
    /// Summarize a kernel face; a failed normal becomes the zero vector.
    pub fn of(face: &BoundaryFace) -> Self {
        let normal = match face.normal() {
            Ok(n) => n.into_inner(),
            Err(e) => {
                debug!("face normal failed: {e}");
                Vec3::zeros()
            }
        };
        let bbox = face.bounding_box();
        let thickness = if normal.norm() > 0.5 {
            in_plane_thickness(face, &normal)
        } else {
            sorted_extents(&bbox)[0]
        };
        Self {
            normal,
            area: face.area(),
            bbox,
            thickness,
        }
    }

    /// Bounding extents sorted ascending: thickness, depth, length.
    pub fn dims_sorted(&self) -> [f64; 3] {
        sorted_extents(&self.bbox)
    }
}

fn sorted_extents(bbox: &Aabb3) -> [f64; 3] {
    let s = bbox.size();
    let mut dims = [s.x, s.y, s.z];
    dims.sort_by(f64::total_cmp);
    dims
}

/// Narrower of the two in-plane spans of the face outline.
fn in_plane_thickness(face: &BoundaryFace, normal: &Vec3) -> f64 {
    let (u, v) = plane_basis(normal);
    let span = |axis: &Vec3| {
        let (lo, hi) = face
            .vertices()
            .iter()
            .map(|p| p.coords.dot(axis))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)));
        hi - lo
    };
    span(&u).min(span(&v))
}

/// A face with its category.
#[derive(Debug, Clone)]
pub struct ClassifiedFace {
    /// Index into [`Solid::faces`].
    pub index: usize,
    /// The face itself.
    pub face: BoundaryFace,
    /// Geometry the decision was made from.
    pub summary: FaceSummary,
    /// Assigned category.
    pub category: FaceCategory,
}

/// Classify one face.
pub fn classify_face(
    summary: &FaceSummary,
    wall_outward: &Vec3,
    window: Option<&WindowBounds>,
    cfg: &ClassifierConfig,
) -> FaceCategory {
    let n = summary.normal;
    let dims = summary.dims_sorted();
    // In-plane thickness, not the smallest bounding extent: that one is ~0 for any axis-aligned face.
    let thin = summary.thickness < cfg.fragile_threshold;
    let in_window = window.is_some_and(|w| w.contains(&summary.bbox));

    // Wall surfaces first: a tilted interior wall can look like an overhang by nz alone.
    let alignment = n.dot(wall_outward);
    if alignment.abs() > cfg.wall_alignment {
        if thin {
            return if in_window {
                FaceCategory::Fragile
            } else {
                FaceCategory::BrickSide
            };
        }
        return if alignment > cfg.display_alignment {
            FaceCategory::Display
        } else {
            FaceCategory::Interior
        };
    }

    if n.z < cfg.overhang_normal_z {
        if in_window && thin {
            return FaceCategory::Fragile;
        }
        let depth = dims[1];
        return if summary.area < cfg.cosmetic_area_max || depth < cfg.cosmetic_depth_max {
            FaceCategory::CosmeticOverhang
        } else {
            FaceCategory::StructuralOverhang
        };
    }

    if n.z.abs() < cfg.vertical_normal_z && thin {
        return if in_window {
            FaceCategory::Fragile
        } else {
            FaceCategory::BrickSide
        };
    }

    FaceCategory::Vertical
}

/// Classify every boundary face of `solid`.
pub fn classify_faces(
    solid: &Solid,
    wall_outward: &Vec3,
    cfg: &ClassifierConfig,
) -> Vec<ClassifiedFace> {
    solid
        .faces()
        .into_iter()
        .enumerate()
        .map(|(index, face)| {
            let summary = FaceSummary::of(&face);
            let category = classify_face(&summary, wall_outward, cfg.window.as_ref(), cfg);
            ClassifiedFace {
                index,
                face,
                summary,
                category,
            }
        })
        .collect()
}

/// Count faces per category and log the breakdown.
pub fn summarize(classified: &[ClassifiedFace]) -> BTreeMap<FaceCategory, usize> {
    let mut counts = BTreeMap::new();
    for c in classified {
        *counts.entry(c.category).or_insert(0) += 1;
    }
    info!(faces = classified.len(), "face classification");
    for (category, count) in &counts {
        info!("  {category}: {count}");
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use printprep_math::Point3;

    fn summary(normal: Vec3, min: [f64; 3], max: [f64; 3], area: f64) -> FaceSummary {
        let bbox = Aabb3::new(Point3::new(min[0], min[1], min[2]), Point3::new(max[0], max[1], max[2]));
        // Axis-aligned test faces: thickness is the smaller non-zero extent.
        let dims = sorted_extents(&bbox);
        FaceSummary {
            normal,
            area,
            bbox,
            thickness: dims[1],
        }
    }

    fn wall() -> Vec3 {
        Vec3::new(0.0, -1.0, 0.0)
    }

    fn classify(s: &FaceSummary, window: Option<&WindowBounds>) -> FaceCategory {
        classify_face(s, &wall(), window, &ClassifierConfig::default())
    }

    #[test]
    fn test_display_and_interior_faces() {
        let front = summary(Vec3::new(0.0, -1.0, 0.0), [0.0, 0.0, 0.0], [10.0, 0.0, 10.0], 100.0);
        assert_eq!(classify(&front, None), FaceCategory::Display);
        let back = summary(Vec3::new(0.0, 1.0, 0.0), [0.0, 1.2, 0.0], [10.0, 1.2, 10.0], 100.0);
        assert_eq!(classify(&back, None), FaceCategory::Interior);
    }

    #[test]
    fn test_thin_wall_face_is_brick_side_or_fragile() {
        // A 0.4 mm wide strip facing the viewer.
        let strip = summary(Vec3::new(0.0, -1.0, 0.0), [2.0, 0.0, 2.0], [2.4, 0.0, 8.0], 2.4);
        assert_eq!(classify(&strip, None), FaceCategory::BrickSide);
        let window = WindowBounds {
            x_min: 1.0,
            x_max: 5.0,
            z_min: 1.0,
            z_max: 9.0,
        };
        assert_eq!(classify(&strip, Some(&window)), FaceCategory::Fragile);
    }

    #[test]
    fn test_structural_overhang_needs_area_and_depth() {
        // 10 x 1.2 lintel underside.
        let lintel = summary(Vec3::new(0.0, 0.0, -1.0), [0.0, 0.0, 5.0], [10.0, 1.2, 5.0], 12.0);
        assert_eq!(classify(&lintel, None), FaceCategory::StructuralOverhang);
    }

    #[test]
    fn test_shallow_step_is_cosmetic_even_with_large_area() {
        // Clapboard step: wide (20 mm) but only 0.4 mm deep, area 8 mm².
        let step = summary(Vec3::new(0.0, 0.0, -1.0), [0.0, 0.0, 5.0], [20.0, 0.4, 5.0], 8.0);
        assert_eq!(classify(&step, None), FaceCategory::CosmeticOverhang);
    }

    #[test]
    fn test_small_area_is_cosmetic() {
        let nub = summary(Vec3::new(0.0, 0.0, -1.0), [0.0, 0.0, 5.0], [1.5, 1.5, 5.0], 0.8);
        assert_eq!(classify(&nub, None), FaceCategory::CosmeticOverhang);
    }

    #[test]
    fn test_thin_overhang_in_window_is_fragile() {
        let mullion = summary(Vec3::new(0.0, 0.0, -1.0), [2.0, 0.0, 4.0], [2.5, 1.2, 4.0], 0.6);
        let window = WindowBounds {
            x_min: 1.0,
            x_max: 5.0,
            z_min: 1.0,
            z_max: 9.0,
        };
        assert_eq!(classify(&mullion, Some(&window)), FaceCategory::Fragile);
    }

    #[test]
    fn test_side_faces_and_tops() {
        let side = summary(Vec3::new(1.0, 0.0, 0.0), [10.0, 0.0, 0.0], [10.0, 1.2, 10.0], 12.0);
        assert_eq!(classify(&side, None), FaceCategory::Vertical);
        let course = summary(Vec3::new(1.0, 0.0, 0.0), [10.0, 0.0, 0.0], [10.0, 0.4, 10.0], 4.0);
        assert_eq!(classify(&course, None), FaceCategory::BrickSide);
        let top = summary(Vec3::new(0.0, 0.0, 1.0), [0.0, 0.0, 10.0], [10.0, 1.2, 10.0], 12.0);
        assert_eq!(classify(&top, None), FaceCategory::Vertical);
    }

    #[test]
    fn test_tilted_interior_wall_is_not_overhang() {
        // Interior wall after an 18° tilt.
        let t = 18.0f64.to_radians();
        let wall_n = Vec3::new(0.0, -t.cos(), t.sin());
        let interior = FaceSummary {
            normal: -wall_n,
            area: 100.0,
            bbox: Aabb3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 3.0, 9.5)),
            thickness: 10.0,
        };
        // nz = -sin18 ≈ -0.309 is below the overhang threshold; alignment is checked first.
        let cat = classify_face(&interior, &wall_n, None, &ClassifierConfig::default());
        assert_eq!(cat, FaceCategory::Interior);
    }

    #[test]
    fn test_thickness_measured_in_face_plane() {
        let strip = Solid::cuboid(Point3::new(0.0, 0.0, 0.0), Vec3::new(0.4, 1.2, 8.0)).unwrap();
        let front = strip
            .faces()
            .into_iter()
            .find(|f| f.normal().unwrap().y < -0.9)
            .unwrap();
        let s = FaceSummary::of(&front);
        assert!((s.thickness - 0.4).abs() < 1e-9);
        assert_eq!(s.dims_sorted()[0], 0.0);
    }

    #[test]
    fn test_zero_normal_falls_through_to_vertical() {
        let degenerate = summary(Vec3::zeros(), [0.0, 0.0, 0.0], [5.0, 5.0, 5.0], 10.0);
        assert_eq!(classify(&degenerate, None), FaceCategory::Vertical);
    }

    #[test]
    fn test_classify_box_and_summarize() {
        let slab = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(10.0, 1.2, 20.0)).unwrap();
        let classified = classify_faces(&slab, &wall(), &ClassifierConfig::default());
        assert_eq!(classified.len(), 6);
        let counts = summarize(&classified);
        assert_eq!(counts.get(&FaceCategory::Display), Some(&1));
        assert_eq!(counts.get(&FaceCategory::Interior), Some(&1));
        assert_eq!(counts.get(&FaceCategory::StructuralOverhang), Some(&1));
        // Two 1.2 mm ends and the top.
        assert_eq!(counts.get(&FaceCategory::Vertical), Some(&3));
        assert_eq!(counts.get(&FaceCategory::BrickSide), None);
    }

    #[test]
    fn test_window_wall_sides_classified_whole() {
        let wall_solid = Solid::cuboid(Point3::origin(), Vec3::new(40.0, 1.2, 20.0)).unwrap();
        let window = Solid::cuboid(Point3::new(10.0, -1.0, 5.0), Vec3::new(20.0, 4.0, 10.0)).unwrap();
        let panel = wall_solid.difference(&window).unwrap();
        assert!(panel.piece_count() > 1);

        let classified = classify_faces(&panel, &wall(), &ClassifierConfig::default());
        let counts = summarize(&classified);
        assert_eq!(counts.get(&FaceCategory::Display), Some(&1));
        assert_eq!(counts.get(&FaceCategory::Interior), Some(&1));
        // Wall base and lintel underside.
        assert_eq!(counts.get(&FaceCategory::StructuralOverhang), Some(&2));
        let display = classified
            .iter()
            .find(|c| c.category == FaceCategory::Display)
            .unwrap();
        assert!((display.summary.area - 600.0).abs() < 1e-6);
    }
}
