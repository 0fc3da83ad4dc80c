//! Contact generation on selected faces.
//!
//! Two independent choices drive placement: which faces receive contacts
//! ([`FaceSelection`]) and how points are laid out on each face
//! ([`PlacementStrategy`]). Heights always come from the face's plane
//! equation, never from its bounding box.

use printprep_kernel::{Aabb3, BoundaryFace, Solid};
use printprep_math::{Point3, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classify::{classify_faces, FaceCategory};
use crate::config::{PlacementConfig, PrepConfig, SupportConfig};
use crate::contact::Contact;
use crate::error::{PrepError, Result};
use crate::model::Model;

/// Below this |nz| the plane equation is not solved for height.
const MIN_SOLVABLE_NZ: f64 = 1e-6;

// =============================================================================
// Strategies
// =============================================================================

/// Which faces receive support contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FaceSelection {
    /// Strongly downward faces whose shortest edge is long enough.
    ///
    /// After tilting, wall bases and decorative steps share a similar normal;
    /// the edge-length filter separates the two populations.
    DualFilter {
        /// Faces with normal Z above this are ignored.
        #[serde(default = "default_normal_z_max")]
        normal_z_max: f64,
        /// Faces whose shortest edge is below this are ignored (mm).
        #[serde(default = "default_min_edge_length")]
        min_edge_length: f64,
    },
    /// Faces the classifier labels as structural overhangs.
    Classified,
}

fn default_normal_z_max() -> f64 {
    -0.5
}

fn default_min_edge_length() -> f64 {
    0.6
}

impl Default for FaceSelection {
    fn default() -> Self {
        FaceSelection::DualFilter {
            normal_z_max: default_normal_z_max(),
            min_edge_length: default_min_edge_length(),
        }
    }
}

impl FaceSelection {
    pub(crate) fn validate(&self) -> Result<()> {
        if let FaceSelection::DualFilter {
            normal_z_max,
            min_edge_length,
        } = self
        {
            if !(-1.0..0.0).contains(normal_z_max) {
                return Err(PrepError::InvalidConfig(
                    "placement.selection.normal_z_max must be in [-1, 0)".into(),
                ));
            }
            if !(*min_edge_length >= 0.0) {
                return Err(PrepError::InvalidConfig(
                    "placement.selection.min_edge_length must not be negative".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Which bounding-box side of a face is the interior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteriorSide {
    /// The low-Y side.
    #[default]
    Min,
    /// The high-Y side.
    Max,
}

/// How contacts are laid out on one face.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Grid points with asymmetric edge clearance and narrow-face bias.
    #[default]
    ClearanceGrid,
    /// One row of evenly spaced points along X on the interior side.
    InteriorRow {
        /// Interior side of each face.
        #[serde(default)]
        side: InteriorSide,
        /// Target spacing along X (mm).
        #[serde(default = "default_row_spacing")]
        spacing: f64,
    },
    /// Lintel contacts at the structural junctions: just inside both jambs
    /// and on each side of an optional mullion, in a front and a back row.
    JambCorners {
        /// X of the mullion center, if the opening has one.
        #[serde(default)]
        mullion_x: Option<f64>,
    },
    /// Interior rows on the large faces and interior jamb corners on the rest.
    ///
    /// A face is large when its area reaches `large_ratio` times the
    /// largest selected face.
    AreaSplit {
        /// Interior side of each face.
        #[serde(default)]
        side: InteriorSide,
        /// Target spacing of the rows along X (mm).
        #[serde(default = "default_row_spacing")]
        spacing: f64,
        /// Area fraction of the largest face that counts as large.
        #[serde(default = "default_large_ratio")]
        large_ratio: f64,
    },
}

fn default_row_spacing() -> f64 {
    5.0
}

fn default_large_ratio() -> f64 {
    0.5
}

impl PlacementStrategy {
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            PlacementStrategy::ClearanceGrid => Ok(()),
            PlacementStrategy::InteriorRow { spacing, .. } => validate_spacing(*spacing),
            PlacementStrategy::JambCorners { mullion_x } => match mullion_x {
                Some(x) if !x.is_finite() => Err(PrepError::InvalidConfig(
                    "placement.strategy.mullion_x must be finite".into(),
                )),
                _ => Ok(()),
            },
            PlacementStrategy::AreaSplit {
                spacing,
                large_ratio,
                ..
            } => {
                validate_spacing(*spacing)?;
                if !(*large_ratio > 0.0 && *large_ratio <= 1.0) {
                    return Err(PrepError::InvalidConfig(
                        "placement.strategy.large_ratio must be in (0, 1]".into(),
                    ));
                }
                Ok(())
            }
        }
    }
}

fn validate_spacing(spacing: f64) -> Result<()> {
    if !(spacing > 0.0 && spacing.is_finite()) {
        return Err(PrepError::InvalidConfig(
            "placement.strategy.spacing must be positive".into(),
        ));
    }
    Ok(())
}

// =============================================================================
// Plane height
// =============================================================================

/// Height of the plane through `centroid` with `normal` at `(x, y)`.
///
/// Near-vertical planes have no usable solution; their centroid height is
/// returned instead.
pub fn plane_height(normal: &Vec3, centroid: &Point3, x: f64, y: f64) -> f64 {
    if normal.z.abs() < MIN_SOLVABLE_NZ {
        return centroid.z;
    }
    centroid.z - (normal.x * (x - centroid.x) + normal.y * (y - centroid.y)) / normal.z
}

/// Plane height at `(x, y)`, or `None` when that point is further than
/// `tol` from the face. Merged faces need not be convex, so their bounds
/// can cover holes.
fn height_on_face(face: &BoundaryFace, n: &Vec3, com: &Point3, x: f64, y: f64, tol: f64) -> Option<f64> {
    let z = plane_height(n, com, x, y);
    (face.distance_to_point(&Point3::new(x, y, z)) <= tol).then_some(z)
}

// =============================================================================
// Clearance grid
// =============================================================================

/// Grid coordinates along one axis: half a cell in, then one per cell.
fn grid_positions(min: f64, len: f64, grid: f64) -> Vec<f64> {
    let count = (len / grid).floor() as usize + 1;
    (0..count).map(|i| min + grid / 2.0 + i as f64 * grid).collect()
}

/// Positions along one axis that keep the column clear of both edges.
///
/// `exterior_at_max` says which edge faces the model's outside; that edge
/// gets the larger clearance.
fn safe_positions(
    min: f64,
    max: f64,
    center: f64,
    exterior_at_max: bool,
    interior_clear: f64,
    exterior_clear: f64,
    grid: f64,
) -> Vec<f64> {
    let (safe_min, safe_max) = if exterior_at_max {
        (min + interior_clear, max - exterior_clear)
    } else {
        (min + exterior_clear, max - interior_clear)
    };

    if safe_min > safe_max {
        // No room for both clearances: hug the interior edge.
        return vec![if exterior_at_max {
            min + interior_clear
        } else {
            max - interior_clear
        }];
    }

    let clamp = |v: f64| safe_min.max(safe_max.min(v));
    if max - min < grid {
        return vec![clamp(center)];
    }

    let mut out: Vec<f64> = Vec::new();
    for v in grid_positions(min, max - min, grid) {
        let v = clamp(v);
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/// Raw contacts for one face using the clearance grid.
///
/// `model_bbox` decides which edges face the exterior; `floor_z` is the
/// lowest allowed contact height.
pub fn face_contacts(
    face: &BoundaryFace,
    model_bbox: &Aabb3,
    floor_z: f64,
    placement: &PlacementConfig,
    support: &SupportConfig,
) -> Vec<Contact> {
    let Some(n) = usable_normal(face, placement) else {
        return Vec::new();
    };

    let com = face.centroid();
    let fbb = face.bounding_box();
    let size = fbb.size();
    let center = model_bbox.center();

    let grid = placement.grid;
    let interior = placement.interior_clearance(support);
    let exterior = placement.exterior_clearance(support);
    let bias = placement.narrow_bias(support);
    let narrow = placement.narrow_face_threshold(support);

    let ext_at_xmax = com.x > center.x;
    let ext_at_ymax = com.y > center.y;

    let narrow_in_x = size.x < narrow && size.y > narrow;
    let (xs, ys) = if narrow_in_x {
        let x = if ext_at_xmax {
            fbb.max.x - bias
        } else {
            fbb.min.x + bias
        };
        let ys = safe_positions(fbb.min.y, fbb.max.y, com.y, ext_at_ymax, interior, exterior, grid);
        (vec![x], ys)
    } else {
        let narrow_in_y = size.y < narrow && size.x > narrow;
        let ys = if narrow_in_y {
            vec![if ext_at_ymax {
                fbb.max.y - bias
            } else {
                fbb.min.y + bias
            }]
        } else {
            safe_positions(fbb.min.y, fbb.max.y, com.y, ext_at_ymax, interior, exterior, grid)
        };
        let xs = if size.x < grid {
            vec![com.x]
        } else {
            grid_positions(fbb.min.x, size.x, grid)
        };
        (xs, ys)
    };

    let tol = placement.bbox_tolerance;
    let mut contacts = Vec::with_capacity(xs.len() * ys.len());
    for &x in &xs {
        for &y in &ys {
            if x < fbb.min.x - tol || x > fbb.max.x + tol || y < fbb.min.y - tol || y > fbb.max.y + tol {
                continue;
            }
            let Some(z) = height_on_face(face, &n, &com, x, y, tol) else {
                continue;
            };
            contacts.push(Contact::with_normal(Point3::new(x, y, z.max(floor_z)), n));
        }
    }
    contacts
}

// =============================================================================
// Interior row
// =============================================================================

/// Raw contacts for one face as a single row on its interior side.
pub fn interior_row_contacts(
    face: &BoundaryFace,
    side: InteriorSide,
    spacing: f64,
    floor_z: f64,
    placement: &PlacementConfig,
) -> Vec<Contact> {
    let Some(n) = usable_normal(face, placement) else {
        return Vec::new();
    };

    let com = face.centroid();
    let fbb = face.bounding_box();
    let len_x = fbb.size().x;

    let y = match side {
        InteriorSide::Min => fbb.min.y + placement.row_y_margin,
        InteriorSide::Max => fbb.max.y - placement.row_y_margin,
    };

    let count = ((len_x / spacing).floor() as usize + 1).max(2);
    let usable = len_x - 2.0 * placement.row_x_margin;
    (0..count)
        .filter_map(|i| {
            let t = (i as f64 + 0.5) / count as f64;
            let x = fbb.min.x + placement.row_x_margin + t * usable;
            let z = height_on_face(face, &n, &com, x, y, placement.bbox_tolerance)?;
            Some(Contact::with_normal(Point3::new(x, y, z.max(floor_z)), n))
        })
        .collect()
}

// =============================================================================
// Jamb corners
// =============================================================================

/// Raw contacts for one face at its jamb corners.
///
/// X positions sit `jamb_inset` inside both ends of the face and, when a
/// mullion lies within the face, `mullion_flank` either side of it. With
/// `side` set only the interior row is used; otherwise front and back rows.
pub fn jamb_corner_contacts(
    face: &BoundaryFace,
    mullion_x: Option<f64>,
    side: Option<InteriorSide>,
    floor_z: f64,
    placement: &PlacementConfig,
) -> Vec<Contact> {
    let Some(n) = usable_normal(face, placement) else {
        return Vec::new();
    };

    let com = face.centroid();
    let fbb = face.bounding_box();

    let mut xs = vec![fbb.min.x + placement.jamb_inset, fbb.max.x - placement.jamb_inset];
    if let Some(m) = mullion_x.filter(|m| *m > fbb.min.x && *m < fbb.max.x) {
        xs.extend([m - placement.mullion_flank, m + placement.mullion_flank]);
    }
    xs.sort_by(f64::total_cmp);
    xs.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

    let front = fbb.min.y + placement.row_y_margin;
    let back = fbb.max.y - placement.row_y_margin;
    let ys = match side {
        Some(InteriorSide::Min) => vec![front],
        Some(InteriorSide::Max) => vec![back],
        None if back - front > 1e-9 => vec![front, back],
        None => vec![0.5 * (fbb.min.y + fbb.max.y)],
    };

    let mut contacts = Vec::with_capacity(xs.len() * ys.len());
    for &x in &xs {
        for &y in &ys {
            if let Some(z) = height_on_face(face, &n, &com, x, y, placement.bbox_tolerance) {
                contacts.push(Contact::with_normal(Point3::new(x, y, z.max(floor_z)), n));
            }
        }
    }
    contacts
}

/// Normal of a face large and non-vertical enough to carry contacts.
fn usable_normal(face: &BoundaryFace, placement: &PlacementConfig) -> Option<Vec3> {
    if face.area() < placement.min_face_area {
        return None;
    }
    let n = match face.normal() {
        Ok(n) => n.into_inner(),
        Err(e) => {
            debug!("skipping face without normal: {e}");
            return None;
        }
    };
    if n.z.abs() < placement.min_abs_normal_z {
        return None;
    }
    Some(n)
}

// =============================================================================
// Selection and generation
// =============================================================================

/// Faces of `model` that receive contacts.
pub fn select_faces(model: &Solid, wall_outward: &Vec3, cfg: &PrepConfig) -> Vec<BoundaryFace> {
    match &cfg.placement.selection {
        FaceSelection::DualFilter {
            normal_z_max,
            min_edge_length,
        } => model
            .faces()
            .into_iter()
            .filter(|face| match face.normal() {
                Ok(n) => n.z <= *normal_z_max && face.min_edge_length() >= *min_edge_length,
                Err(e) => {
                    debug!("skipping face without normal: {e}");
                    false
                }
            })
            .collect(),
        FaceSelection::Classified => classify_faces(model, wall_outward, &cfg.classifier)
            .into_iter()
            .filter(|c| c.category == FaceCategory::StructuralOverhang)
            .map(|c| c.face)
            .collect(),
    }
}

/// Raw (unclustered) contacts for the whole model.
///
/// Faces are selected panel by panel: coplanar faces of different panels
/// stay separate even where the panels touch. `model_raise` is the model's
/// lowest height above the raft; contacts never go below it plus the
/// configured floor margin.
pub fn generate_contacts(
    model: &Model,
    wall_outward: &Vec3,
    model_raise: f64,
    cfg: &PrepConfig,
) -> Vec<Contact> {
    let faces: Vec<BoundaryFace> = model
        .panels()
        .iter()
        .flat_map(|panel| select_faces(panel.solid(), wall_outward, cfg))
        .collect();
    let model_bbox = model.bounding_box();
    let floor_z = model_raise + cfg.placement.contact_floor_margin;

    let largest = faces.iter().map(BoundaryFace::area).fold(0.0, f64::max);

    let contacts: Vec<Contact> = faces
        .iter()
        .flat_map(|face| match &cfg.placement.strategy {
            PlacementStrategy::ClearanceGrid => {
                face_contacts(face, &model_bbox, floor_z, &cfg.placement, &cfg.support)
            }
            PlacementStrategy::InteriorRow { side, spacing } => {
                interior_row_contacts(face, *side, *spacing, floor_z, &cfg.placement)
            }
            PlacementStrategy::JambCorners { mullion_x } => {
                jamb_corner_contacts(face, *mullion_x, None, floor_z, &cfg.placement)
            }
            PlacementStrategy::AreaSplit {
                side,
                spacing,
                large_ratio,
            } => {
                if face.area() >= large_ratio * largest {
                    interior_row_contacts(face, *side, *spacing, floor_z, &cfg.placement)
                } else {
                    jamb_corner_contacts(face, None, Some(*side), floor_z, &cfg.placement)
                }
            }
        })
        .collect();

    info!(faces = faces.len(), contacts = contacts.len(), "raw contacts");
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn bottom_face(solid: &Solid) -> BoundaryFace {
        solid
            .faces()
            .into_iter()
            .find(|f| f.normal().unwrap().z < -0.9)
            .unwrap()
    }

    #[test]
    fn test_plane_height_horizontal_is_constant() {
        let n = Vec3::new(0.0, 0.0, -1.0);
        let c = Point3::new(5.0, 5.0, 10.0);
        assert_abs_diff_eq!(plane_height(&n, &c, 0.0, 0.0), 10.0);
        assert_abs_diff_eq!(plane_height(&n, &c, 100.0, 200.0), 10.0);
    }

    #[test]
    fn test_plane_height_tilted_about_x() {
        let t = 18.0f64.to_radians();
        let n = Vec3::new(0.0, t.sin(), -t.cos());
        let c = Point3::new(50.0, 30.0, 20.0);
        assert_abs_diff_eq!(plane_height(&n, &c, 50.0, 30.0), 20.0, epsilon = 1e-10);
        let expected = 20.0 - (n.y / n.z) * 10.0;
        assert_abs_diff_eq!(plane_height(&n, &c, 50.0, 40.0), expected, epsilon = 1e-9);
        assert_abs_diff_eq!(plane_height(&n, &c, 100.0, 30.0), 20.0, epsilon = 1e-10);
    }

    #[test]
    fn test_plane_height_dual_axis() {
        let n = Vec3::new(0.15, 0.30, -0.94);
        let c = Point3::new(40.0, 25.0, 15.0);
        let expected = 15.0 - (0.15 * 5.0 + 0.30 * 3.0) / -0.94;
        assert_abs_diff_eq!(plane_height(&n, &c, 45.0, 28.0), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_plane_height_vertical_returns_centroid() {
        let n = Vec3::new(1.0, 0.0, 0.0);
        let c = Point3::new(10.0, 20.0, 30.0);
        assert_abs_diff_eq!(plane_height(&n, &c, 0.0, 0.0), 30.0);
    }

    #[test]
    fn test_narrow_in_y_biases_single_row() {
        // Front wall base: 40 long, 1.2 deep.
        let wall = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(40.0, 1.2, 20.0)).unwrap();
        let model_bbox = Aabb3::new(Point3::new(0.0, 0.0, 3.0), Point3::new(40.0, 30.0, 23.0));
        let cfg = PrepConfig::default();
        let contacts = face_contacts(&bottom_face(&wall), &model_bbox, 0.0, &cfg.placement, &cfg.support);

        // x grid 4, 12, 20, 28, 36; 44 falls outside the face.
        assert_eq!(contacts.len(), 5);
        for c in &contacts {
            // Exterior is the low-Y edge: 0.65 in from it.
            assert_abs_diff_eq!(c.y(), 0.65, epsilon = 1e-12);
            assert_abs_diff_eq!(c.z(), 3.0, epsilon = 1e-12);
            assert_abs_diff_eq!(c.normal.z, -1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_narrow_in_x_uses_asymmetric_clearance() {
        // Right wall base on the +X side of a 40 x 30 footprint.
        let wall = Solid::cuboid(Point3::new(38.8, 0.0, 3.0), Vec3::new(1.2, 30.0, 20.0)).unwrap();
        let model_bbox = Aabb3::new(Point3::new(0.0, 0.0, 3.0), Point3::new(40.0, 30.0, 23.0));
        let cfg = PrepConfig::default();
        let contacts = face_contacts(&bottom_face(&wall), &model_bbox, 0.0, &cfg.placement, &cfg.support);

        let ys: Vec<f64> = contacts.iter().map(|c| c.y()).collect();
        assert_eq!(ys, vec![4.0, 12.0, 20.0, 28.0]);
        for c in &contacts {
            assert_abs_diff_eq!(c.x(), 40.0 - 0.65, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_safe_positions_clamp_and_dedupe() {
        // Exterior at min: safe range [1.9, 9.3] on a 10 mm span.
        let ys = safe_positions(0.0, 10.0, 5.0, false, 0.7, 1.9, 8.0);
        assert_eq!(ys.len(), 2);
        assert_abs_diff_eq!(ys[0], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ys[1], 9.3, epsilon = 1e-12);
        // Span too small for both clearances.
        let ys = safe_positions(0.0, 2.0, 1.0, true, 0.7, 1.9, 8.0);
        assert_eq!(ys.len(), 1);
        assert_abs_diff_eq!(ys[0], 0.7, epsilon = 1e-12);
        // Short span: centroid clamped into the safe range.
        let ys = safe_positions(0.0, 5.0, 4.5, false, 0.7, 1.9, 8.0);
        assert_eq!(ys.len(), 1);
        assert_abs_diff_eq!(ys[0], 4.3, epsilon = 1e-12);
    }

    #[test]
    fn test_contacts_respect_floor() {
        let wall = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(40.0, 1.2, 20.0)).unwrap();
        let cfg = PrepConfig::default();
        let contacts = face_contacts(
            &bottom_face(&wall),
            &wall.bounding_box(),
            3.1,
            &cfg.placement,
            &cfg.support,
        );
        assert!(contacts.iter().all(|c| c.z() >= 3.1));
    }

    #[test]
    fn test_small_and_vertical_faces_get_nothing() {
        let nub = Solid::cuboid(Point3::new(0.0, 0.0, 5.0), Vec3::new(0.5, 0.5, 0.5)).unwrap();
        let cfg = PrepConfig::default();
        let bbox = nub.bounding_box();
        assert!(face_contacts(&bottom_face(&nub), &bbox, 0.0, &cfg.placement, &cfg.support).is_empty());

        let block = Solid::cuboid(Point3::origin(), Vec3::new(10.0, 10.0, 10.0)).unwrap();
        let side = block
            .faces()
            .into_iter()
            .find(|f| f.normal().unwrap().x > 0.9)
            .unwrap();
        assert!(face_contacts(&side, &block.bounding_box(), 0.0, &cfg.placement, &cfg.support).is_empty());
    }

    #[test]
    fn test_interior_row_layout() {
        let slab = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(20.0, 4.0, 2.0)).unwrap();
        let cfg = PrepConfig::default();
        let face = bottom_face(&slab);

        let row = interior_row_contacts(&face, InteriorSide::Max, 5.0, 0.0, &cfg.placement);
        // int(20 / 5) + 1 = 5 points over the 17 mm inset span.
        assert_eq!(row.len(), 5);
        assert_abs_diff_eq!(row[0].x(), 1.5 + 0.1 * 17.0, epsilon = 1e-12);
        assert_abs_diff_eq!(row[4].x(), 1.5 + 0.9 * 17.0, epsilon = 1e-12);
        assert!(row.iter().all(|c| (c.y() - 3.5).abs() < 1e-12));

        let row = interior_row_contacts(&face, InteriorSide::Min, 50.0, 0.0, &cfg.placement);
        assert_eq!(row.len(), 2);
        assert!(row.iter().all(|c| (c.y() - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_dual_filter_rejects_shallow_steps() {
        // Wall base (1.2 deep) and a clapboard step (0.4 deep) side by side.
        let base = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(20.0, 1.2, 5.0)).unwrap();
        let step = Solid::cuboid(Point3::new(0.0, -0.4, 6.0), Vec3::new(20.0, 0.4, 2.0)).unwrap();
        let model = base.union(&step).unwrap();
        let cfg = PrepConfig::default();
        let faces = select_faces(&model, &Vec3::new(0.0, -1.0, 0.0), &cfg);
        assert_eq!(faces.len(), 1);
        assert_abs_diff_eq!(faces[0].centroid().z, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_classified_selection_picks_structural_overhangs() {
        let slab = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(10.0, 1.2, 20.0)).unwrap();
        let cfg = PrepConfig {
            placement: PlacementConfig {
                selection: FaceSelection::Classified,
                ..PlacementConfig::default()
            },
            ..PrepConfig::default()
        };
        let faces = select_faces(&slab, &Vec3::new(0.0, -1.0, 0.0), &cfg);
        assert_eq!(faces.len(), 1);
        assert!(faces[0].normal().unwrap().z < -0.9);
    }

    #[test]
    fn test_generate_contacts_applies_floor() {
        let wall = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(40.0, 1.2, 20.0)).unwrap();
        let cfg = PrepConfig::default();
        let model = Model::from_solid(wall).unwrap();
        let contacts = generate_contacts(&model, &Vec3::new(0.0, -1.0, 0.0), 3.0, &cfg);
        assert_eq!(contacts.len(), 5);
        assert!(contacts.iter().all(|c| (c.z() - 3.1).abs() < 1e-12));
    }

    #[test]
    fn test_window_cut_wall_base_is_one_face() {
        // The window splits the wall into pieces; the base stays one face.
        let wall = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(40.0, 1.2, 20.0)).unwrap();
        let window = Solid::cuboid(Point3::new(10.0, -1.0, 8.0), Vec3::new(20.0, 4.0, 10.0)).unwrap();
        let model = wall.difference(&window).unwrap();
        assert!(model.piece_count() > 1);

        let cfg = PrepConfig::default();
        let faces = select_faces(&model, &Vec3::new(0.0, -1.0, 0.0), &cfg);
        let base: Vec<_> = faces.iter().filter(|f| f.centroid().z < 3.01).collect();
        assert_eq!(base.len(), 1);
        assert_abs_diff_eq!(base[0].area(), 48.0, epsilon = 1e-6);

        let contacts = face_contacts(base[0], &model.bounding_box(), 0.0, &cfg.placement, &cfg.support);
        let xs: Vec<f64> = contacts.iter().map(|c| c.x()).collect();
        assert_eq!(xs, vec![4.0, 12.0, 20.0, 28.0, 36.0]);
    }

    fn lintel() -> BoundaryFace {
        let block = Solid::cuboid(Point3::new(10.0, 0.0, 15.0), Vec3::new(20.0, 4.0, 3.0)).unwrap();
        bottom_face(&block)
    }

    #[test]
    fn test_jamb_corners_without_mullion() {
        let cfg = PrepConfig::default();
        let contacts = jamb_corner_contacts(&lintel(), None, None, 0.0, &cfg.placement);
        assert_eq!(contacts.len(), 4);
        let xy: Vec<(f64, f64)> = contacts.iter().map(|c| (c.x(), c.y())).collect();
        assert_eq!(xy, vec![(10.5, 0.5), (10.5, 3.5), (29.5, 0.5), (29.5, 3.5)]);
        for c in &contacts {
            assert_abs_diff_eq!(c.z(), 15.0, epsilon = 1e-12);
            assert_abs_diff_eq!(c.normal.z, -1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_jamb_corners_flank_mullion() {
        let cfg = PrepConfig::default();
        let contacts = jamb_corner_contacts(&lintel(), Some(20.0), None, 0.0, &cfg.placement);
        assert_eq!(contacts.len(), 8);
        let mut xs: Vec<f64> = contacts.iter().map(|c| c.x()).collect();
        xs.dedup();
        assert_eq!(xs, vec![10.5, 18.5, 21.5, 29.5]);

        // A mullion outside the opening adds nothing.
        let outside = jamb_corner_contacts(&lintel(), Some(50.0), None, 0.0, &cfg.placement);
        assert_eq!(outside.len(), 4);

        let interior = jamb_corner_contacts(&lintel(), Some(20.0), Some(InteriorSide::Max), 0.0, &cfg.placement);
        assert_eq!(interior.len(), 4);
        assert!(interior.iter().all(|c| (c.y() - 3.5).abs() < 1e-12));
    }

    #[test]
    fn test_area_split_rows_and_corners() {
        // 40 x 4 floor at Z 3 and a 10 x 4 lintel underside at Z 15.
        let floor = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(40.0, 4.0, 2.0)).unwrap();
        let head = Solid::cuboid(Point3::new(15.0, 0.0, 15.0), Vec3::new(10.0, 4.0, 3.0)).unwrap();
        let model = Model::new([floor, head]).unwrap();
        let cfg = PrepConfig {
            placement: PlacementConfig {
                strategy: PlacementStrategy::AreaSplit {
                    side: InteriorSide::Min,
                    spacing: 5.0,
                    large_ratio: 0.5,
                },
                ..PlacementConfig::default()
            },
            ..PrepConfig::default()
        };
        let contacts = generate_contacts(&model, &Vec3::new(0.0, -1.0, 0.0), 3.0, &cfg);

        let (low, high): (Vec<Contact>, Vec<Contact>) = contacts.into_iter().partition(|c| c.z() < 10.0);
        // int(40 / 5) + 1 row points on the floor.
        assert_eq!(low.len(), 9);
        assert!(low.iter().all(|c| (c.z() - 3.1).abs() < 1e-12 && (c.y() - 0.5).abs() < 1e-12));
        let xs: Vec<f64> = high.iter().map(|c| c.x()).collect();
        assert_eq!(xs, vec![15.5, 24.5]);
        assert!(high.iter().all(|c| (c.y() - 0.5).abs() < 1e-12 && (c.z() - 15.0).abs() < 1e-12));
    }

    #[test]
    fn test_area_split_validation() {
        let bad = PlacementStrategy::AreaSplit {
            side: InteriorSide::Min,
            spacing: 5.0,
            large_ratio: 0.0,
        };
        assert!(bad.validate().is_err());
        let bad = PlacementStrategy::JambCorners { mullion_x: Some(f64::NAN) };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_ring_base_gets_no_contacts_in_hole() {
        // Four joined 6 mm walls: the base is one ring-shaped face.
        let outer = Solid::cuboid(Point3::new(0.0, 0.0, 3.0), Vec3::new(40.0, 30.0, 10.0)).unwrap();
        let hole = Solid::cuboid(Point3::new(6.0, 6.0, 2.0), Vec3::new(28.0, 18.0, 12.0)).unwrap();
        let walls = outer.difference(&hole).unwrap();
        let cfg = PrepConfig::default();

        let bottoms: Vec<_> = walls
            .faces()
            .into_iter()
            .filter(|f| f.normal().unwrap().z < -0.9)
            .collect();
        assert_eq!(bottoms.len(), 1);

        let contacts = face_contacts(&bottoms[0], &walls.bounding_box(), 0.0, &cfg.placement, &cfg.support);
        assert!(!contacts.is_empty());
        for c in &contacts {
            let on_wall = c.x() < 6.5 || c.x() > 33.5 || c.y() < 6.5 || c.y() > 23.5;
            assert!(on_wall, "contact at ({}, {}) over the hole", c.x(), c.y());
        }
    }
}
