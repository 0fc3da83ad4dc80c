//! Splitting a solid into two half-space pieces.

use printprep_kernel::Solid;
use printprep_math::{Axis, Plane, Point3, Vec3};
use tracing::info;

use crate::error::{Result, SplitError};

/// Validated cutting plane through `point` with unit `normal`.
pub(crate) fn cutting_plane(point: &Point3, normal: &Vec3) -> Result<Plane> {
    if !point.iter().all(|c| c.is_finite()) || !normal.iter().all(|c| c.is_finite()) {
        return Err(SplitError::InvalidPlane("non-finite point or normal".into()));
    }
    if normal.norm() < 1e-12 {
        return Err(SplitError::InvalidPlane("normal has zero length".into()));
    }
    Ok(Plane::from_point_normal(point, normal))
}

/// Point and normal of the plane perpendicular to `axis` at `position`.
pub fn axis_plane(axis: Axis, position: f64) -> (Point3, Vec3) {
    let n = axis.unit();
    (Point3::from(n * position), n)
}

/// Split `solid` by the plane through `point` with `normal`.
///
/// Returns `(negative, positive)`; the positive half lies on the side the
/// normal points toward. Either half may be empty.
pub fn split_plane(solid: &Solid, point: &Point3, normal: &Vec3) -> Result<(Solid, Solid)> {
    let plane = cutting_plane(point, normal)?;
    let negative = solid.clip_half_space(&plane)?;
    let positive = solid.clip_half_space(&plane.flipped())?;
    info!(
        normal = ?plane.normal,
        negative = negative.components().len(),
        positive = positive.components().len(),
        "split solid"
    );
    Ok((negative, positive))
}

/// Split perpendicular to `axis` at `position`.
///
/// The negative half has coordinates below `position` on that axis.
pub fn split_axis(solid: &Solid, axis: Axis, position: f64) -> Result<(Solid, Solid)> {
    let (point, normal) = axis_plane(axis, position);
    split_plane(solid, &point, &normal)
}
