//! Support contact points.

use printprep_math::{Point3, Vec3};

/// A point where a support tip touches the model.
///
/// Contacts are immutable values: the collision stage produces new
/// contacts with a base height instead of mutating existing ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Where the tip touches the model surface.
    pub position: Point3,
    /// Outward normal of the contacted face; unit length, or zero for
    /// "no directional bias".
    pub normal: Vec3,
    /// Height where the support starts. Zero grows from the raft.
    pub base_z: f64,
}

impl Contact {
    /// Base heights above this rest on the model instead of the raft (mm).
    pub const MODEL_RESTING_THRESHOLD: f64 = 0.1;

    /// Contact at `position` with a straight-down normal, growing from the raft.
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            normal: Vec3::new(0.0, 0.0, -1.0),
            base_z: 0.0,
        }
    }

    /// Contact carrying the normal of its originating face.
    ///
    /// The normal is normalized; vectors too short to normalize become the
    /// zero sentinel.
    pub fn with_normal(position: Point3, normal: Vec3) -> Self {
        let len = normal.norm();
        let normal = if len > 1e-9 && len.is_finite() {
            normal / len
        } else {
            Vec3::zeros()
        };
        Self {
            position,
            normal,
            base_z: 0.0,
        }
    }

    /// Copy of this contact starting at `base_z`.
    pub fn with_base_z(self, base_z: f64) -> Self {
        Self { base_z, ..self }
    }

    /// Copy of this contact moved to `(x, y)`, keeping its height.
    pub fn with_xy(self, x: f64, y: f64) -> Self {
        Self {
            position: Point3::new(x, y, self.position.z),
            ..self
        }
    }

    /// X coordinate.
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Y coordinate.
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Z coordinate.
    pub fn z(&self) -> f64 {
        self.position.z
    }

    /// Whether the support rests on another part of the model.
    pub fn is_model_resting(&self) -> bool {
        self.base_z > Self::MODEL_RESTING_THRESHOLD
    }

    /// Whether the normal carries a direction.
    pub fn has_direction(&self) -> bool {
        self.normal.norm() > 0.01
    }

    /// Unit normal, or straight down for the zero sentinel.
    pub fn unit_normal_or_down(&self) -> Vec3 {
        if self.has_direction() {
            self.normal.normalize()
        } else {
            Vec3::new(0.0, 0.0, -1.0)
        }
    }
}

impl Default for Contact {
    fn default() -> Self {
        Self::new(Point3::origin())
    }
}
