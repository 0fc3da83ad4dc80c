//! Planar convex faces.
//!
//! Every face of a convex piece is a convex polygon with a counter-clockwise vertex
//! loop around its outward normal. Polygon clipping against planes lives
//! here and is shared by the solid booleans and the boundary extraction.

use printprep_math::{Dir3, Plane, Point3, Transform, Vec3};

use crate::bbox::Aabb3;
use crate::error::{KernelError, KernelResult};

/// Signed-distance tolerance for plane classification, in mm.
pub(crate) const EPS: f64 = 1e-7;

/// Distance below which two vertices are merged, in mm.
pub(crate) const MERGE_EPS: f64 = 1e-6;

/// Area below which a polygon is considered degenerate, in mm².
pub(crate) const AREA_EPS: f64 = 1e-10;

/// A planar convex polygon with an outward normal.
#[derive(Debug, Clone)]
pub struct Face {
    vertices: Vec<Point3>,
    plane: Plane,
}

impl Face {
    /// Build a face from a vertex loop; the normal follows the loop winding.
    ///
    /// Duplicate and collinear vertices are dropped. Fails when fewer than
    /// three distinct vertices remain or the loop encloses no area.
    pub fn from_loop(vertices: Vec<Point3>) -> KernelResult<Self> {
        let vertices = simplify_loop(vertices);
        if vertices.len() < 3 {
            return Err(KernelError::Degenerate(format!(
                "face loop has {} distinct vertices",
                vertices.len()
            )));
        }
        let n = newell(&vertices);
        let len = n.norm();
        if !(len > 2.0 * AREA_EPS) {
            return Err(KernelError::Degenerate("face loop encloses no area".into()));
        }
        let plane = Plane::from_point_normal(&vertex_average(&vertices), &(n / len));
        Ok(Self { vertices, plane })
    }

    /// Build a face on a known supporting plane, or `None` if degenerate.
    pub(crate) fn on_plane(vertices: Vec<Point3>, plane: Plane) -> Option<Self> {
        let vertices = simplify_loop(vertices);
        if vertices.len() < 3 || newell(&vertices).norm() <= 2.0 * AREA_EPS {
            return None;
        }
        Some(Self { vertices, plane })
    }

    /// Vertex loop, counter-clockwise around the outward normal.
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Supporting plane; its normal is the outward face normal.
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Stored outward normal, without re-deriving it from the vertices.
    pub fn raw_normal(&self) -> Vec3 {
        self.plane.normal
    }

    /// Outward unit normal recomputed from the vertex loop.
    ///
    /// Fails for loops that have collapsed to a line or a point.
    pub fn normal(&self) -> KernelResult<Dir3> {
        let n = newell(&self.vertices);
        if !n.iter().all(|c| c.is_finite()) {
            return Err(KernelError::Degenerate("non-finite face normal".into()));
        }
        Dir3::try_new(n, 2.0 * AREA_EPS)
            .ok_or_else(|| KernelError::Degenerate("zero-length face normal".into()))
    }

    /// Polygon area.
    pub fn area(&self) -> f64 {
        0.5 * newell(&self.vertices).norm()
    }

    /// Area centroid of the polygon.
    pub fn centroid(&self) -> Point3 {
        let origin = self.vertices[0];
        let mut total = 0.0;
        let mut weighted = Vec3::zeros();
        for w in self.vertices[1..].windows(2) {
            let (a, b) = (w[0], w[1]);
            let area = 0.5 * (a - origin).cross(&(b - origin)).dot(&self.plane.normal);
            total += area;
            weighted += area * (origin.coords + a.coords + b.coords) / 3.0;
        }
        if total.abs() <= AREA_EPS {
            vertex_average(&self.vertices)
        } else {
            Point3::from(weighted / total)
        }
    }

    /// Axis-aligned bounds of the vertex loop.
    pub fn bounding_box(&self) -> Aabb3 {
        Aabb3::from_points(&self.vertices)
    }

    /// Boundary edges as `(start, end)` pairs following the loop.
    pub fn edges(&self) -> impl Iterator<Item = (Point3, Point3)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Length of the shortest boundary edge.
    pub fn min_edge_length(&self) -> f64 {
        self.edges()
            .map(|(a, b)| (b - a).norm())
            .fold(f64::INFINITY, f64::min)
    }

    /// Whether the projection of `p` onto the face plane lies inside the polygon.
    pub fn contains_projection(&self, p: &Point3) -> bool {
        let n = self.plane.normal;
        self.edges()
            .all(|(a, b)| (b - a).cross(&(p - a)).dot(&n) >= -EPS * (b - a).norm())
    }

    /// Euclidean distance from `p` to the polygon.
    pub fn distance_to_point(&self, p: &Point3) -> f64 {
        if self.contains_projection(p) {
            return self.plane.signed_distance(p).abs();
        }
        self.edges()
            .map(|(a, b)| point_segment_distance(p, &a, &b))
            .fold(f64::INFINITY, f64::min)
    }

    /// Same polygon facing the other way.
    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Self {
            vertices,
            plane: self.plane.flipped(),
        }
    }

    /// Face with every vertex mapped through `t`.
    pub(crate) fn transformed(&self, t: &Transform) -> Self {
        let vertices: Vec<Point3> = self.vertices.iter().map(|p| t.apply_point(p)).collect();
        let normal = t.apply_normal(&self.plane.normal).normalize();
        let plane = Plane::from_point_normal(&vertex_average(&vertices), &normal);
        Self { vertices, plane }
    }

    /// Whether `other` lies on the same plane with the opposite orientation.
    pub(crate) fn is_opposite_coplanar(&self, other: &Face) -> bool {
        self.plane.normal.dot(&other.plane.normal) < -1.0 + 1e-9
            && (self.plane.offset + other.plane.offset).abs() < MERGE_EPS
    }

    /// Part of this face not covered by the coplanar polygon `other`.
    ///
    /// The result is a set of convex fragments; it is empty when `other`
    /// covers the whole face.
    pub(crate) fn subtract_coplanar(&self, other: &Face) -> Vec<Face> {
        if !self
            .bounding_box()
            .expanded(MERGE_EPS)
            .overlaps(&other.bounding_box())
        {
            return vec![self.clone()];
        }
        let cutters: Vec<Plane> = other
            .edges()
            .map(|(a, b)| Plane::from_point_normal(&a, &(b - a).cross(&other.plane.normal)))
            .collect();
        // Separated by one of the cutting lines: nothing to remove.
        if cutters
            .iter()
            .any(|c| self.vertices.iter().all(|v| c.signed_distance(v) >= -EPS))
        {
            return vec![self.clone()];
        }

        let mut fragments = Vec::new();
        let mut remainder = self.vertices.clone();
        for cutter in &cutters {
            let outside = clip_loop(&remainder, &cutter.flipped(), None);
            if let Some(face) = Face::on_plane(outside, self.plane) {
                fragments.push(face);
            }
            remainder = clip_loop(&remainder, cutter, None);
            if remainder.len() < 3 {
                break;
            }
        }
        fragments
    }
}

/// Clip a convex loop to the half-space `plane.signed_distance(p) <= 0`.
///
/// Vertices on the plane and new crossing points are appended to `on_plane`
/// when given.
pub(crate) fn clip_loop(
    vertices: &[Point3],
    plane: &Plane,
    mut on_plane: Option<&mut Vec<Point3>>,
) -> Vec<Point3> {
    let n = vertices.len();
    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let da = plane.signed_distance(&a);
        let db = plane.signed_distance(&b);
        if da <= EPS {
            out.push(a);
            if da >= -EPS {
                if let Some(cap) = on_plane.as_deref_mut() {
                    cap.push(a);
                }
            }
        }
        if (da < -EPS && db > EPS) || (da > EPS && db < -EPS) {
            let t = da / (da - db);
            let p = a + (b - a) * t;
            out.push(p);
            if let Some(cap) = on_plane.as_deref_mut() {
                cap.push(p);
            }
        }
    }
    out
}

/// Newell normal of a loop; its length is twice the enclosed area.
pub(crate) fn newell(vertices: &[Point3]) -> Vec3 {
    let Some(origin) = vertices.first() else {
        return Vec3::zeros();
    };
    let mut n = Vec3::zeros();
    for w in vertices[1..].windows(2) {
        n += (w[0] - origin).cross(&(w[1] - origin));
    }
    n
}

pub(crate) fn vertex_average(vertices: &[Point3]) -> Point3 {
    if vertices.is_empty() {
        return Point3::origin();
    }
    let sum = vertices.iter().fold(Vec3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / vertices.len() as f64)
}

/// Drop repeated and collinear vertices from a closed loop.
pub(crate) fn simplify_loop(mut vertices: Vec<Point3>) -> Vec<Point3> {
    vertices.dedup_by(|a, b| (*a - *b).norm() < MERGE_EPS);
    while vertices.len() > 1 {
        let last = vertices.len() - 1;
        if (vertices[last] - vertices[0]).norm() < MERGE_EPS {
            vertices.pop();
        } else {
            break;
        }
    }
    let mut changed = true;
    while changed && vertices.len() >= 3 {
        changed = false;
        let n = vertices.len();
        for i in 0..n {
            let prev = vertices[(i + n - 1) % n];
            let cur = vertices[i];
            let next = vertices[(i + 1) % n];
            let (d0, d1) = (cur - prev, next - cur);
            if d0.cross(&d1).norm() <= 1e-9 * d0.norm() * d1.norm() {
                vertices.remove(i);
                changed = true;
                break;
            }
        }
    }
    vertices
}

/// Distance from `p` to the segment `a`–`b`.
pub(crate) fn point_segment_distance(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= f64::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}
