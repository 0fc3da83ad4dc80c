#![warn(missing_docs)]

//! Math types shared by the printprep crates.
//!
//! Points, vectors and unit directions are nalgebra aliases. [`Transform`]
//! is a homogeneous 4x4 matrix for the rigid moves used to orient models;
//! [`Plane`] and [`plane_basis`] serve splitting and in-plane measurements.

use nalgebra::{Matrix4, Rotation3, Translation3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// A point in model space (mm).
pub type Point3 = nalgebra::Point3<f64>;

/// A displacement or direction in model space.
pub type Vec3 = Vector3<f64>;

/// A unit-length direction.
pub type Dir3 = Unit<Vector3<f64>>;

/// Homogeneous transform applied to points, vectors and normals.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Column-major homogeneous matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// The transform that changes nothing.
    pub fn identity() -> Self {
        Self { matrix: Matrix4::identity() }
    }

    /// Shift by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Translation3::new(dx, dy, dz).to_homogeneous(),
        }
    }

    /// Right-handed rotation about a coordinate axis through the origin.
    pub fn rotation(axis: Axis, angle: f64) -> Self {
        let axis = Unit::new_unchecked(axis.unit());
        Self {
            matrix: Rotation3::from_axis_angle(&axis, angle).to_homogeneous(),
        }
    }

    /// Rotation about X, `angle` in radians.
    pub fn rotation_x(angle: f64) -> Self {
        Self::rotation(Axis::X, angle)
    }

    /// Rotation about Y, `angle` in radians.
    pub fn rotation_y(angle: f64) -> Self {
        Self::rotation(Axis::Y, angle)
    }

    /// Rotation about Z, `angle` in radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self::rotation(Axis::Z, angle)
    }

    /// `self` applied after `other`, the product `self * other`.
    ///
    /// `a.after(&b)` moves a point by `b` first, then by `a`.
    pub fn after(&self, other: &Transform) -> Self {
        Self { matrix: self.matrix * other.matrix }
    }

    /// Move a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.matrix.transform_point(p)
    }

    /// Move a free vector; translation does not apply.
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.matrix.transform_vector(v)
    }

    /// Move a surface normal with the inverse transpose of the linear part.
    ///
    /// A singular linear part leaves `n` as is.
    pub fn apply_normal(&self, n: &Vec3) -> Vec3 {
        self.matrix
            .fixed_view::<3, 3>(0, 0)
            .try_inverse()
            .map_or(*n, |inv| inv.transpose() * n)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Comparison thresholds used by the kernel.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Distance below which two positions coincide (mm).
    pub linear: f64,
    /// Volume below which a solid counts as empty (mm³).
    pub volume: f64,
}

impl Tolerance {
    /// 1e-7 mm and 1e-9 mm³.
    pub const DEFAULT: Self = Self {
        linear: 1e-7,
        volume: 1e-9,
    };

    /// Whether `a` and `b` coincide.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Whether a length is indistinguishable from zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Coordinate axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// Component index (0, 1, 2).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::x(),
            Axis::Y => Vec3::y(),
            Axis::Z => Vec3::z(),
        }
    }
}

/// Two orthonormal vectors `(u, v)` perpendicular to `normal`.
///
/// `u × v` equals the normalized `normal`, so polygons ordered by angle in
/// `(u, v)` wind counter-clockwise when viewed from the normal side.
pub fn plane_basis(normal: &Vec3) -> (Vec3, Vec3) {
    let n = normal.normalize();
    let reference = if n.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    let u = n.cross(&reference).normalize();
    let v = n.cross(&u).normalize();
    (u, v)
}

/// An oriented plane `normal · p = offset`.
///
/// The normal points toward the "outside"; [`Plane::signed_distance`] is
/// positive on that side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal.
    pub normal: Vec3,
    /// Signed offset from the origin along the normal.
    pub offset: f64,
}

impl Plane {
    /// Plane through `point` with the given normal (normalized here).
    pub fn from_point_normal(point: &Point3, normal: &Vec3) -> Self {
        let n = normal.normalize();
        Self {
            normal: n,
            offset: n.dot(&point.coords),
        }
    }

    /// Signed distance from the plane, positive on the normal side.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&p.coords) - self.offset
    }

    /// The same plane facing the other way.
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Closest point on the plane.
    pub fn project(&self, p: &Point3) -> Point3 {
        p - self.signed_distance(p) * self.normal
    }

    /// Intersection parameter `t` of the segment `a + t (b - a)` with the plane.
    ///
    /// Returns `None` when the segment is parallel to the plane.
    pub fn segment_parameter(&self, a: &Point3, b: &Point3) -> Option<f64> {
        let da = self.signed_distance(a);
        let db = self.signed_distance(b);
        let denom = da - db;
        if denom.abs() < 1e-15 {
            None
        } else {
            Some(da / denom)
        }
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.normal.iter().all(|c| c.is_finite()) && self.offset.is_finite()
    }
}
