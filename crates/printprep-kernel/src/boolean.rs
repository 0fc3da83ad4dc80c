//! Boolean operations on solids.
//!
//! Every operation returns `Ok` with a possibly empty solid. Errors are
//! reserved for inputs with non-finite coordinates.

use printprep_math::Plane;
use tracing::trace;

use crate::error::{KernelError, KernelResult};
use crate::piece::ConvexPiece;
use crate::solid::Solid;

fn check_operands(op: &str, a: &Solid, b: &Solid) -> KernelResult<()> {
    if a.is_finite() && b.is_finite() {
        Ok(())
    } else {
        Err(KernelError::Degenerate(format!("{op}: operand has non-finite coordinates")))
    }
}

impl Solid {
    /// Material common to both solids.
    pub fn intersection(&self, other: &Solid) -> KernelResult<Solid> {
        check_operands("intersection", self, other)?;
        let mut pieces = Vec::new();
        for a in self.pieces() {
            for b in other.pieces() {
                if let Some(common) = a.intersect(b) {
                    pieces.push(common);
                }
            }
        }
        trace!(pieces = pieces.len(), "intersection");
        Ok(Solid::from_pieces(pieces))
    }

    /// Material of `self` not inside `other`.
    pub fn difference(&self, other: &Solid) -> KernelResult<Solid> {
        check_operands("difference", self, other)?;
        let mut pieces: Vec<ConvexPiece> = self.pieces().to_vec();
        for cutter in other.pieces() {
            pieces = pieces
                .iter()
                .flat_map(|p| p.subtract(cutter))
                .collect();
            if pieces.is_empty() {
                break;
            }
        }
        trace!(pieces = pieces.len(), "difference");
        Ok(Solid::from_pieces(pieces))
    }

    /// Material in either solid.
    pub fn union(&self, other: &Solid) -> KernelResult<Solid> {
        let extra = other.difference(self)?;
        let mut pieces = self.pieces().to_vec();
        pieces.extend_from_slice(extra.pieces());
        Ok(Solid::from_pieces(pieces))
    }

    /// Part of the solid on the side opposite to the plane normal.
    pub fn clip_half_space(&self, plane: &Plane) -> KernelResult<Solid> {
        if !plane.is_finite() || !self.is_finite() {
            return Err(KernelError::Degenerate(
                "half-space clip: non-finite plane or solid".into(),
            ));
        }
        if plane.normal.norm() < 1e-12 {
            return Err(KernelError::InvalidInput("half-space normal has zero length".into()));
        }
        let plane = Plane {
            normal: plane.normal.normalize(),
            offset: plane.offset / plane.normal.norm(),
        };
        Ok(Solid::from_pieces(
            self.pieces().iter().filter_map(|p| p.clip(&plane)).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use printprep_math::{Point3, Vec3};

    fn cube(x: f64, y: f64, z: f64, s: f64) -> Solid {
        Solid::cuboid(Point3::new(x, y, z), Vec3::new(s, s, s)).unwrap()
    }

    #[test]
    fn test_intersection_overlapping_cubes() {
        let a = cube(0.0, 0.0, 0.0, 2.0);
        let b = cube(1.0, 1.0, 1.0, 2.0);
        let i = a.intersection(&b).unwrap();
        assert_relative_eq!(i.volume(), 1.0, epsilon = 1e-9);
        let bb = i.bounding_box();
        assert_relative_eq!(bb.min.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(bb.max.z, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_intersection_disjoint_is_empty() {
        let a = cube(0.0, 0.0, 0.0, 1.0);
        let b = cube(5.0, 0.0, 0.0, 1.0);
        assert!(a.intersection(&b).unwrap().is_empty());
    }

    #[test]
    fn test_difference_and_union_volumes() {
        let a = cube(0.0, 0.0, 0.0, 2.0);
        let b = cube(1.0, 1.0, 1.0, 2.0);
        assert_relative_eq!(a.difference(&b).unwrap().volume(), 7.0, epsilon = 1e-9);
        assert_relative_eq!(a.union(&b).unwrap().volume(), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_difference_through_hole() {
        let wall = Solid::cuboid(Point3::origin(), Vec3::new(10.0, 1.0, 10.0)).unwrap();
        let window = Solid::cuboid(Point3::new(3.0, -1.0, 3.0), Vec3::new(4.0, 3.0, 4.0)).unwrap();
        let cut = wall.difference(&window).unwrap();
        assert_relative_eq!(cut.volume(), 100.0 - 16.0, epsilon = 1e-9);
        assert!(!cut.contains_point(&Point3::new(5.0, 0.5, 5.0)));
        assert!(cut.contains_point(&Point3::new(1.0, 0.5, 5.0)));
    }

    #[test]
    fn test_difference_removing_everything() {
        let a = cube(0.0, 0.0, 0.0, 1.0);
        let b = cube(-1.0, -1.0, -1.0, 3.0);
        assert!(a.difference(&b).unwrap().is_empty());
    }

    #[test]
    fn test_cylinder_cube_intersection_bbox() {
        let col = Solid::cylinder(Point3::new(5.0, 5.0, 0.0), Vec3::z(), 0.4, 10.0, 16).unwrap();
        let slab = Solid::cuboid(Point3::new(0.0, 0.0, 2.0), Vec3::new(10.0, 10.0, 1.0)).unwrap();
        let i = col.intersection(&slab).unwrap();
        let bb = i.bounding_box();
        assert_relative_eq!(bb.min.z, 2.0, epsilon = 1e-9);
        assert_relative_eq!(bb.max.z, 3.0, epsilon = 1e-9);
        assert!(i.volume() > 0.001);
    }

    #[test]
    fn test_clip_half_space_normalizes_plane() {
        let a = cube(0.0, 0.0, 0.0, 2.0);
        // 2z <= 2, i.e. z <= 1.
        let plane = Plane {
            normal: Vec3::new(0.0, 0.0, 2.0),
            offset: 2.0,
        };
        let lower = a.clip_half_space(&plane).unwrap();
        assert_relative_eq!(lower.volume(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_finite_operand_is_error() {
        let a = cube(0.0, 0.0, 0.0, 1.0);
        let bad = Plane {
            normal: Vec3::new(0.0, 0.0, f64::NAN),
            offset: 0.0,
        };
        assert!(matches!(a.clip_half_space(&bad), Err(KernelError::Degenerate(_))));
    }
}
