//! Axis-aligned bounding boxes.
//!
//! Used as a broadphase filter: only solid pairs with overlapping boxes
//! need exact boolean or distance queries.

use printprep_math::{Point3, Vec3};

/// Box with faces parallel to the coordinate planes.
///
/// An inverted box (`min > max` on some axis) is empty; [`Aabb3::empty`]
/// is the identity for [`Aabb3::union`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Lowest corner.
    pub min: Point3,
    /// Highest corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Box spanning `min` to `max`.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// The empty box.
    pub fn empty() -> Self {
        Self {
            min: Point3::from(Vec3::repeat(f64::INFINITY)),
            max: Point3::from(Vec3::repeat(f64::NEG_INFINITY)),
        }
    }

    /// Smallest box containing all `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.include_point(p);
        }
        aabb
    }

    /// True when no point has been included.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    /// Grow to cover `p`.
    pub fn include_point(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Aabb3) -> Aabb3 {
        if other.is_empty() {
            return *self;
        }
        Aabb3::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Whether the boxes share at least a boundary point.
    pub fn overlaps(&self, other: &Aabb3) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }

    /// Overlap of the XY shadows, ignoring Z.
    pub fn overlaps_xy(&self, other: &Aabb3) -> bool {
        (0..2).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }

    /// Whether `p` lies inside or on the box.
    pub fn contains_point(&self, p: &Point3) -> bool {
        (0..3).all(|i| self.min[i] <= p[i] && p[i] <= self.max[i])
    }

    /// Push every face out by `tol`.
    pub fn expand(&mut self, tol: f64) {
        let d = Vec3::repeat(tol);
        self.min -= d;
        self.max += d;
    }

    /// Copy of this box grown by `tol` in every direction.
    pub fn expanded(&self, tol: f64) -> Aabb3 {
        let mut out = *self;
        out.expand(tol);
        out
    }

    /// Extent along each axis (`XLength`, `YLength`, `ZLength`).
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center point.
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// The eight corners.
    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }
}

impl Default for Aabb3 {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(offset: f64) -> Aabb3 {
        Aabb3::new(
            Point3::new(offset, offset, offset),
            Point3::new(offset + 1.0, offset + 1.0, offset + 1.0),
        )
    }

    #[test]
    fn test_empty_box_includes_points() {
        let mut aabb = Aabb3::empty();
        assert!(aabb.is_empty());
        aabb.include_point(&Point3::new(1.0, -2.0, 3.0));
        aabb.include_point(&Point3::new(-1.0, 2.0, 0.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_overlap_touching_counts() {
        assert!(unit_box(0.0).overlaps(&unit_box(1.0)));
        assert!(!unit_box(0.0).overlaps(&unit_box(1.5)));
    }

    #[test]
    fn test_expanded_and_size() {
        let b = unit_box(0.0).expanded(0.5);
        let s = b.size();
        assert!((s.x - 2.0).abs() < 1e-12);
        assert!((b.center().z - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_union_with_empty_is_identity() {
        let b = unit_box(2.0);
        assert_eq!(b.union(&Aabb3::empty()), b);
        assert_eq!(Aabb3::empty().union(&b), b);
    }
}
