//! Maximal planar regions of a solid's boundary.
//!
//! Booleans cut flat regions along piece boundaries, so a single wall side
//! or cut seam arrives as several convex fragments. [`BoundaryFace`] gathers
//! the coplanar fragments that share edges back into one region and keeps
//! its true outline, with the cut edges between fragments removed.

use printprep_math::{Dir3, Plane, Point3, Vec3};

use crate::bbox::Aabb3;
use crate::error::{KernelError, KernelResult};
use crate::face::{newell, vertex_average, Face, AREA_EPS, MERGE_EPS};

/// A connected planar region on the boundary of a solid.
///
/// The region may be non-convex and may have holes. Queries that need a
/// convex polygon work on [`BoundaryFace::fragments`].
#[derive(Debug, Clone)]
pub struct BoundaryFace {
    plane: Plane,
    fragments: Vec<Face>,
    outline: Vec<(Point3, Point3)>,
    corners: Vec<Point3>,
}

impl BoundaryFace {
    fn from_fragments(plane: Plane, fragments: Vec<Face>) -> Self {
        let outline = join_collinear(outline_segments(&fragments));
        let mut corners: Vec<Point3> = Vec::with_capacity(outline.len());
        for (a, _) in &outline {
            if !corners.iter().any(|c| (c - a).norm() < MERGE_EPS) {
                corners.push(*a);
            }
        }
        Self {
            plane,
            fragments,
            outline,
            corners,
        }
    }

    /// Convex pieces of the region, interior-disjoint.
    pub fn fragments(&self) -> &[Face] {
        &self.fragments
    }

    /// Supporting plane; its normal is the outward normal.
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Stored outward normal.
    pub fn raw_normal(&self) -> Vec3 {
        self.plane.normal
    }

    /// Outward unit normal recomputed from the fragment loops.
    pub fn normal(&self) -> KernelResult<Dir3> {
        let n = self
            .fragments
            .iter()
            .fold(Vec3::zeros(), |acc, f| acc + newell(f.vertices()));
        if !n.iter().all(|c| c.is_finite()) {
            return Err(KernelError::Degenerate("non-finite face normal".into()));
        }
        Dir3::try_new(n, 2.0 * AREA_EPS)
            .ok_or_else(|| KernelError::Degenerate("zero-length face normal".into()))
    }

    /// Region area.
    pub fn area(&self) -> f64 {
        self.fragments.iter().map(Face::area).sum()
    }

    /// Area centroid of the region.
    pub fn centroid(&self) -> Point3 {
        let mut total = 0.0;
        let mut weighted = Vec3::zeros();
        for f in &self.fragments {
            let a = f.area();
            total += a;
            weighted += f.centroid().coords * a;
        }
        if total <= AREA_EPS {
            vertex_average(&self.corners)
        } else {
            Point3::from(weighted / total)
        }
    }

    /// Corners of the outline, holes included.
    pub fn vertices(&self) -> &[Point3] {
        &self.corners
    }

    /// Axis-aligned bounds of the region.
    pub fn bounding_box(&self) -> Aabb3 {
        self.fragments
            .iter()
            .fold(Aabb3::empty(), |acc, f| acc.union(&f.bounding_box()))
    }

    /// Outline edges as `(start, end)` pairs, counter-clockwise around the
    /// normal for the outer boundary.
    pub fn edges(&self) -> impl Iterator<Item = (Point3, Point3)> + '_ {
        self.outline.iter().copied()
    }

    /// Length of the shortest outline edge.
    pub fn min_edge_length(&self) -> f64 {
        self.edges()
            .map(|(a, b)| (b - a).norm())
            .fold(f64::INFINITY, f64::min)
    }

    /// Whether the projection of `p` onto the plane lies inside the region.
    pub fn contains_projection(&self, p: &Point3) -> bool {
        self.fragments.iter().any(|f| f.contains_projection(p))
    }

    /// Euclidean distance from `p` to the region.
    pub fn distance_to_point(&self, p: &Point3) -> f64 {
        self.fragments
            .iter()
            .map(|f| f.distance_to_point(p))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Group boundary fragments into connected coplanar regions.
///
/// Regions come out in the order of their first fragment.
pub(crate) fn merge_fragments(fragments: Vec<Face>) -> Vec<BoundaryFace> {
    let n = fragments.len();
    let mut parent: Vec<usize> = (0..n).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            let (f, g) = (&fragments[i], &fragments[j]);
            if !same_plane(f, g)
                || !f.bounding_box().expanded(MERGE_EPS).overlaps(&g.bounding_box())
                || !share_edge(f, g)
            {
                continue;
            }
            let (ri, rj) = (find_root(&mut parent, i), find_root(&mut parent, j));
            if ri != rj {
                parent[rj.max(ri)] = ri.min(rj);
            }
        }
    }

    let mut groups: Vec<(usize, Vec<Face>)> = Vec::new();
    for (i, face) in fragments.into_iter().enumerate() {
        let root = find_root(&mut parent, i);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, group)) => group.push(face),
            None => groups.push((root, vec![face])),
        }
    }
    groups
        .into_iter()
        .map(|(_, group)| BoundaryFace::from_fragments(*group[0].plane(), group))
        .collect()
}

pub(crate) fn find_root(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn same_plane(f: &Face, g: &Face) -> bool {
    f.plane().normal.dot(&g.plane().normal) > 1.0 - 1e-9
        && (f.plane().offset - g.plane().offset).abs() < MERGE_EPS
}

fn share_edge(f: &Face, g: &Face) -> bool {
    f.edges()
        .any(|(a, b)| g.edges().any(|(c, d)| opposite_overlap(&a, &b, &c, &d).is_some()))
}

/// Span of `a`–`b`, as distances from `a`, covered by the collinear edge
/// `c`–`d` running the other way.
fn opposite_overlap(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> Option<(f64, f64)> {
    let ab = b - a;
    let len = ab.norm();
    if len <= MERGE_EPS {
        return None;
    }
    let u = ab / len;
    if (d - c).dot(&u) >= 0.0 {
        return None;
    }
    let off_line = |p: &Point3| {
        let ap = p - a;
        (ap - u * ap.dot(&u)).norm()
    };
    if off_line(c) > MERGE_EPS || off_line(d) > MERGE_EPS {
        return None;
    }
    let (tc, td) = ((c - a).dot(&u), (d - a).dot(&u));
    let lo = tc.min(td).max(0.0);
    let hi = tc.max(td).min(len);
    (hi - lo > MERGE_EPS).then_some((lo, hi))
}

/// Fragment edges minus the parts shared with another fragment.
fn outline_segments(fragments: &[Face]) -> Vec<(Point3, Point3)> {
    let mut out = Vec::new();
    for (i, face) in fragments.iter().enumerate() {
        for (a, b) in face.edges() {
            let len = (b - a).norm();
            if len <= MERGE_EPS {
                continue;
            }
            let mut spans = vec![(0.0, len)];
            for (j, other) in fragments.iter().enumerate() {
                if i == j {
                    continue;
                }
                for (c, d) in other.edges() {
                    if let Some(cover) = opposite_overlap(&a, &b, &c, &d) {
                        spans = subtract_span(&spans, cover);
                    }
                }
            }
            let u = (b - a) / len;
            out.extend(spans.into_iter().map(|(s, t)| (a + u * s, a + u * t)));
        }
    }
    out
}

fn subtract_span(spans: &[(f64, f64)], (lo, hi): (f64, f64)) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(spans.len() + 1);
    for &(s, t) in spans {
        if hi <= s || lo >= t {
            out.push((s, t));
            continue;
        }
        if lo - s > MERGE_EPS {
            out.push((s, lo));
        }
        if t - hi > MERGE_EPS {
            out.push((hi, t));
        }
    }
    out
}

/// Fuse segments that continue each other in a straight line.
fn join_collinear(mut segments: Vec<(Point3, Point3)>) -> Vec<(Point3, Point3)> {
    'scan: loop {
        for i in 0..segments.len() {
            let (a, b) = segments[i];
            let ab = b - a;
            let next = segments.iter().enumerate().position(|(j, &(c, d))| {
                let cd = d - c;
                j != i
                    && (c - b).norm() < MERGE_EPS
                    && ab.dot(&cd) > 0.0
                    && ab.cross(&cd).norm() <= 1e-9 * ab.norm() * cd.norm()
            });
            if let Some(j) = next {
                segments[i].1 = segments[j].1;
                segments.remove(j);
                continue 'scan;
            }
        }
        return segments;
    }
}
