//! Convex polytopes, the building blocks of every [`Solid`](crate::Solid).

use printprep_math::{plane_basis, Plane, Point3, Tolerance, Transform, Vec3};

use crate::bbox::Aabb3;
use crate::error::{KernelError, KernelResult};
use crate::face::{clip_loop, vertex_average, Face, EPS, MERGE_EPS};

/// A bounded convex polytope described by its outward-facing faces.
#[derive(Debug, Clone)]
pub(crate) struct ConvexPiece {
    faces: Vec<Face>,
    bbox: Aabb3,
}

impl ConvexPiece {
    /// Assemble a piece from faces, flipping any face that points inward.
    pub(crate) fn from_faces(faces: Vec<Face>) -> KernelResult<Self> {
        if faces.len() < 4 {
            return Err(KernelError::Degenerate(format!(
                "convex piece needs at least 4 faces, got {}",
                faces.len()
            )));
        }
        let interior = interior_point(&faces);
        let faces = faces
            .into_iter()
            .map(|f| {
                if f.plane().signed_distance(&interior) > 0.0 {
                    f.reversed()
                } else {
                    f
                }
            })
            .collect();
        Ok(Self::assemble(faces))
    }

    fn assemble(faces: Vec<Face>) -> Self {
        let bbox = Aabb3::from_points(faces.iter().flat_map(|f| f.vertices()));
        Self { faces, bbox }
    }

    pub(crate) fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub(crate) fn planes(&self) -> impl Iterator<Item = &Plane> + '_ {
        self.faces.iter().map(Face::plane)
    }

    pub(crate) fn vertices(&self) -> impl Iterator<Item = &Point3> + '_ {
        self.faces.iter().flat_map(|f| f.vertices())
    }

    pub(crate) fn bounding_box(&self) -> Aabb3 {
        self.bbox
    }

    /// Volume and center of mass by pyramid decomposition around an interior point.
    pub(crate) fn mass_properties(&self) -> (f64, Point3) {
        let apex = interior_point(&self.faces);
        let mut volume = 0.0;
        let mut moment = Vec3::zeros();
        for face in &self.faces {
            let height = -face.plane().signed_distance(&apex);
            let v = face.area() * height / 3.0;
            let c = apex + (face.centroid() - apex) * 0.75;
            volume += v;
            moment += c.coords * v;
        }
        if volume <= 0.0 {
            (0.0, apex)
        } else {
            (volume, Point3::from(moment / volume))
        }
    }

    pub(crate) fn volume(&self) -> f64 {
        self.mass_properties().0
    }

    /// Whether `p` satisfies every face plane within `tol`.
    pub(crate) fn contains_point(&self, p: &Point3, tol: f64) -> bool {
        self.bbox.expanded(tol.max(0.0)).contains_point(p)
            && self.planes().all(|pl| pl.signed_distance(p) <= tol)
    }

    /// True when some face plane of either piece separates the two.
    pub(crate) fn is_separated_from(&self, other: &ConvexPiece) -> bool {
        if !self.bbox.overlaps(&other.bbox) {
            return true;
        }
        let separates = |a: &ConvexPiece, b: &ConvexPiece| {
            a.planes()
                .any(|pl| b.vertices().all(|v| pl.signed_distance(v) >= -EPS))
        };
        separates(self, other) || separates(other, self)
    }

    /// Part of the piece with `plane.signed_distance(p) <= 0`, or `None` if empty.
    pub(crate) fn clip(&self, plane: &Plane) -> Option<ConvexPiece> {
        let mut any_inside = false;
        let mut any_outside = false;
        for v in self.vertices() {
            let d = plane.signed_distance(v);
            any_inside |= d < -EPS;
            any_outside |= d > EPS;
        }
        if !any_inside {
            return None;
        }
        if !any_outside {
            return Some(self.clone());
        }

        let mut cap_points = Vec::new();
        let mut faces: Vec<Face> = self
            .faces
            .iter()
            .filter_map(|f| {
                let kept = clip_loop(f.vertices(), plane, Some(&mut cap_points));
                Face::on_plane(kept, *f.plane())
            })
            .collect();
        if let Some(cap) = cap_face(cap_points, plane) {
            faces.push(cap);
        }
        if faces.len() < 4 {
            return None;
        }
        let piece = Self::assemble(faces);
        if piece.volume() <= Tolerance::DEFAULT.volume {
            None
        } else {
            Some(piece)
        }
    }

    /// Pieces covering `self` minus `other`; interior-disjoint.
    pub(crate) fn subtract(&self, other: &ConvexPiece) -> Vec<ConvexPiece> {
        if self.is_separated_from(other) {
            return vec![self.clone()];
        }
        let mut out = Vec::new();
        let mut remainder = self.clone();
        for plane in other.planes() {
            if let Some(outside) = remainder.clip(&plane.flipped()) {
                out.push(outside);
            }
            match remainder.clip(plane) {
                Some(inside) => remainder = inside,
                None => break,
            }
        }
        out
    }

    /// Intersection of two convex pieces, or `None` if they do not overlap.
    pub(crate) fn intersect(&self, other: &ConvexPiece) -> Option<ConvexPiece> {
        if self.is_separated_from(other) {
            return None;
        }
        let mut current = self.clone();
        for plane in other.planes() {
            current = current.clip(plane)?;
        }
        Some(current)
    }

    pub(crate) fn transformed(&self, t: &Transform) -> ConvexPiece {
        Self::assemble(self.faces.iter().map(|f| f.transformed(t)).collect())
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.vertices().all(|v| v.coords.iter().all(|c| c.is_finite()))
            && self.planes().all(Plane::is_finite)
    }
}

fn interior_point(faces: &[Face]) -> Point3 {
    let all: Vec<Point3> = faces.iter().flat_map(|f| f.vertices().iter().copied()).collect();
    vertex_average(&all)
}

/// Polygon closing a clipped piece on the cutting plane.
fn cap_face(mut points: Vec<Point3>, plane: &Plane) -> Option<Face> {
    let mut unique: Vec<Point3> = Vec::with_capacity(points.len());
    for p in points.drain(..) {
        if unique.iter().all(|q| (p - q).norm() >= MERGE_EPS) {
            unique.push(p);
        }
    }
    if unique.len() < 3 {
        return None;
    }
    let center = vertex_average(&unique);
    let (u, v) = plane_basis(&plane.normal);
    let angle = |p: &Point3| {
        let d = p - center;
        d.dot(&v).atan2(d.dot(&u))
    };
    unique.sort_by(|a, b| angle(a).total_cmp(&angle(b)));
    Face::on_plane(unique, *plane)
}
