//! Tapered pin/socket registration across a split seam.
//!
//! Pins grow from the negative half along the split normal; matching
//! sockets, wider by a radial clearance and deeper by the same amount, are
//! cut into the positive half. Both share the same base points on the
//! split face.

use printprep_kernel::{BoundaryFace, KernelResult, Solid};
use printprep_math::{plane_basis, Axis, Point3, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SplitError};
use crate::split::{axis_plane, cutting_plane, split_plane};

/// Minimum |cos| between a face normal and the split normal.
const PARALLEL_DOT: f64 = 0.95;

/// Pin and socket dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    /// Pin base radius (mm).
    pub pin_radius: f64,
    /// Pin length beyond the split face (mm).
    pub pin_height: f64,
    /// Taper angle of pins and sockets (degrees).
    pub draft_deg: f64,
    /// Radial and depth clearance of sockets (mm).
    pub clearance: f64,
    /// Smallest pin tip radius (mm).
    pub min_tip_radius: f64,
    /// Target distance between pins (mm).
    pub spacing: f64,
    /// Inset of the first and last pin from the face edges (mm).
    pub edge_margin: f64,
    /// Distance within which a face counts as lying on the split plane (mm).
    pub face_tolerance: f64,
    /// Facets per circle.
    pub segments: u32,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            pin_radius: 0.6,
            pin_height: 1.5,
            draft_deg: 2.0,
            clearance: 0.12,
            min_tip_radius: 0.1,
            spacing: 15.0,
            edge_margin: 3.0,
            face_tolerance: 0.1,
            segments: 24,
        }
    }
}

impl RegistrationConfig {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("pin_radius", self.pin_radius),
            ("pin_height", self.pin_height),
            ("min_tip_radius", self.min_tip_radius),
            ("spacing", self.spacing),
            ("face_tolerance", self.face_tolerance),
        ];
        for (name, v) in positive {
            if !(v > 0.0 && v.is_finite()) {
                return Err(SplitError::InvalidConfig(format!("{name} must be positive, got {v}")));
            }
        }
        for (name, v) in [("clearance", self.clearance), ("edge_margin", self.edge_margin)] {
            if !(v >= 0.0 && v.is_finite()) {
                return Err(SplitError::InvalidConfig(format!("{name} must not be negative, got {v}")));
            }
        }
        if !(0.0..45.0).contains(&self.draft_deg) {
            return Err(SplitError::InvalidConfig("draft_deg must be in [0, 45)".into()));
        }
        if self.segments < 3 {
            return Err(SplitError::InvalidConfig("segments must be at least 3".into()));
        }
        Ok(())
    }

    /// Pin radius at its free end.
    pub fn pin_tip_radius(&self) -> f64 {
        (self.pin_radius - self.pin_height * self.draft_deg.to_radians().tan()).max(self.min_tip_radius)
    }
}

/// Two split halves, with registration features when they fit.
#[derive(Debug, Clone)]
pub struct RegisteredSplit {
    /// Half opposite the split normal, carrying the pins.
    pub negative: Solid,
    /// Half on the normal side, carrying the sockets.
    pub positive: Solid,
    /// Shared base points of each pin/socket pair.
    pub pins: Vec<Point3>,
}

/// The largest face of `solid` lying on the split plane.
///
/// Faces are whole planar regions, so a seam crossing several pieces of a
/// panel is found in one piece.
pub fn find_split_face(
    solid: &Solid,
    point: &Point3,
    normal: &Vec3,
    tolerance: f64,
) -> Option<BoundaryFace> {
    let n = normal.try_normalize(1e-12)?;
    solid
        .faces()
        .into_iter()
        .filter(|face| {
            face.normal()
                .map(|fnorm| fnorm.dot(&n).abs() >= PARALLEL_DOT)
                .unwrap_or(false)
        })
        .filter(|face| (face.centroid() - point).dot(&n).abs() < tolerance)
        .max_by(|a, b| a.area().total_cmp(&b.area()))
}

/// Pin base points across `face`.
///
/// Points run along the face's longer in-plane extent, inset by the edge
/// margin, at least two of them, and centered across the shorter extent.
/// Empty when the face is too short for the margins.
pub fn pin_positions(face: &BoundaryFace, normal: &Vec3, cfg: &RegistrationConfig) -> Vec<Point3> {
    if face.vertices().len() < 3 {
        return Vec::new();
    }
    let (u, v) = plane_basis(normal);
    let com = face.centroid();

    let extent = |dir: &Vec3| {
        face.vertices()
            .iter()
            .map(|p| (p - com).dot(dir))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| (lo.min(t), hi.max(t)))
    };
    let (u_range, v_range) = (extent(&u), extent(&v));
    let ((long_dir, (long_min, long_max)), (short_dir, (short_min, short_max))) =
        if u_range.1 - u_range.0 >= v_range.1 - v_range.0 {
            ((u, u_range), (v, v_range))
        } else {
            ((v, v_range), (u, u_range))
        };

    let span = long_max - long_min - 2.0 * cfg.edge_margin;
    if span <= 0.0 {
        return Vec::new();
    }
    let count = ((span / cfg.spacing) as usize + 1).max(2);
    let step = span / (count - 1) as f64;
    let short_center = 0.5 * (short_min + short_max);

    (0..count)
        .map(|i| {
            let along = long_min + cfg.edge_margin + i as f64 * step;
            com + long_dir * along + short_dir * short_center
        })
        .collect()
}

/// Tapered pin standing on `center`, pointing along `direction`.
pub fn make_pin(center: &Point3, direction: &Vec3, cfg: &RegistrationConfig) -> KernelResult<Solid> {
    Solid::frustum(
        *center,
        *direction,
        cfg.pin_radius,
        cfg.pin_tip_radius(),
        cfg.pin_height,
        cfg.segments,
    )
}

/// Socket cavity opening at `center`, reaching along `direction`.
///
/// Wider than the matching pin by the clearance at both ends, and deeper
/// by the clearance.
pub fn make_socket(center: &Point3, direction: &Vec3, cfg: &RegistrationConfig) -> KernelResult<Solid> {
    Solid::frustum(
        *center,
        *direction,
        cfg.pin_radius + cfg.clearance,
        cfg.pin_tip_radius() + cfg.clearance,
        cfg.pin_height + cfg.clearance,
        cfg.segments,
    )
}

/// Add pins to `negative` and sockets to `positive` along the split plane.
///
/// When no split face is found, or it is too small for pins, the halves
/// come back unchanged with no pins.
pub fn add_registration(
    mut negative: Solid,
    mut positive: Solid,
    point: &Point3,
    normal: &Vec3,
    cfg: &RegistrationConfig,
) -> Result<RegisteredSplit> {
    cfg.validate()?;
    let n = cutting_plane(point, normal)?.normal;

    let face = find_split_face(&negative, point, &n, cfg.face_tolerance)
        .or_else(|| find_split_face(&positive, point, &n, cfg.face_tolerance));
    let Some(face) = face else {
        warn!("no split face found for registration pins");
        return Ok(RegisteredSplit { negative, positive, pins: Vec::new() });
    };

    let pins = pin_positions(&face, &n, cfg);
    if pins.is_empty() {
        warn!(area = face.area(), "split face too small for registration pins");
        return Ok(RegisteredSplit { negative, positive, pins });
    }

    for p in &pins {
        negative = negative.union(&make_pin(p, &n, cfg)?)?;
        positive = positive.difference(&make_socket(p, &n, cfg)?)?;
    }
    info!(pairs = pins.len(), "added registration pins");
    Ok(RegisteredSplit { negative, positive, pins })
}

/// Split by a plane and register the halves.
pub fn split_and_register(
    solid: &Solid,
    point: &Point3,
    normal: &Vec3,
    cfg: &RegistrationConfig,
) -> Result<RegisteredSplit> {
    let (negative, positive) = split_plane(solid, point, normal)?;
    add_registration(negative, positive, point, normal, cfg)
}

/// Split perpendicular to `axis` at `position` and register the halves.
pub fn split_and_register_axis(
    solid: &Solid,
    axis: Axis,
    position: f64,
    cfg: &RegistrationConfig,
) -> Result<RegisteredSplit> {
    let (point, normal) = axis_plane(axis, position);
    split_and_register(solid, &point, &normal, cfg)
}
