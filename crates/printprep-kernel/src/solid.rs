//! The [`Solid`] type and its geometric queries.

use printprep_math::{Point3, Transform, Vec3};

use crate::bbox::Aabb3;
use crate::boundary::{find_root, merge_fragments, BoundaryFace};
use crate::face::{Face, AREA_EPS, EPS};
use crate::piece::ConvexPiece;

/// A solid made of interior-disjoint convex pieces.
///
/// The empty solid is a valid value: booleans that remove everything return
/// it instead of failing. Compounds built with [`Solid::compound`] may hold
/// overlapping pieces; only boolean results are guaranteed disjoint.
#[derive(Debug, Clone, Default)]
pub struct Solid {
    pieces: Vec<ConvexPiece>,
}

impl Solid {
    /// The empty solid.
    pub fn empty() -> Self {
        Self { pieces: Vec::new() }
    }

    pub(crate) fn from_pieces(pieces: Vec<ConvexPiece>) -> Self {
        Self { pieces }
    }

    pub(crate) fn pieces(&self) -> &[ConvexPiece] {
        &self.pieces
    }

    /// Collect several solids into one without merging them.
    pub fn compound(solids: impl IntoIterator<Item = Solid>) -> Self {
        Self {
            pieces: solids.into_iter().flat_map(|s| s.pieces).collect(),
        }
    }

    /// True when the solid has no material.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Number of convex pieces.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Enclosed volume in mm³.
    pub fn volume(&self) -> f64 {
        self.pieces.iter().map(ConvexPiece::volume).sum()
    }

    /// Center of mass, or `None` for the empty solid.
    pub fn centroid(&self) -> Option<Point3> {
        let mut volume = 0.0;
        let mut moment = Vec3::zeros();
        for piece in &self.pieces {
            let (v, c) = piece.mass_properties();
            volume += v;
            moment += c.coords * v;
        }
        (volume > 0.0).then(|| Point3::from(moment / volume))
    }

    /// Axis-aligned bounds; inverted when empty.
    pub fn bounding_box(&self) -> Aabb3 {
        self.pieces
            .iter()
            .fold(Aabb3::empty(), |acc, p| acc.union(&p.bounding_box()))
    }

    /// Maximal planar regions of the outer boundary.
    ///
    /// Coplanar fragments that share an edge are reported as one face, so a
    /// wall side or a cut seam is a single [`BoundaryFace`] however many
    /// pieces it spans.
    pub fn faces(&self) -> Vec<BoundaryFace> {
        merge_fragments(self.face_fragments())
    }

    /// Convex faces on the outer boundary.
    ///
    /// Regions where two pieces touch are removed, so a planar boundary
    /// region may be reported as several convex faces.
    pub fn face_fragments(&self) -> Vec<Face> {
        let mut out = Vec::new();
        for (i, piece) in self.pieces.iter().enumerate() {
            for face in piece.faces() {
                let mut fragments = vec![face.clone()];
                for (j, other) in self.pieces.iter().enumerate() {
                    if i == j || !other.bounding_box().expanded(EPS).overlaps(&face.bounding_box()) {
                        continue;
                    }
                    for cover in other.faces().iter().filter(|g| face.is_opposite_coplanar(g)) {
                        fragments = fragments
                            .iter()
                            .flat_map(|f| f.subtract_coplanar(cover))
                            .collect();
                        if fragments.is_empty() {
                            break;
                        }
                    }
                }
                out.extend(fragments);
            }
        }
        out
    }

    /// Whether `p` lies inside or on the boundary.
    pub fn contains_point(&self, p: &Point3) -> bool {
        self.pieces.iter().any(|piece| piece.contains_point(p, EPS))
    }

    /// Copy of the solid mapped through a rigid transform.
    pub fn transformed(&self, t: &Transform) -> Solid {
        Self {
            pieces: self.pieces.iter().map(|p| p.transformed(t)).collect(),
        }
    }

    /// Copy of the solid moved by `(dx, dy, dz)`.
    pub fn translated(&self, dx: f64, dy: f64, dz: f64) -> Solid {
        self.transformed(&Transform::translation(dx, dy, dz))
    }

    /// Whether every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.pieces.iter().all(ConvexPiece::is_finite)
    }

    /// Split into connected solids.
    ///
    /// Pieces belong to the same solid when they overlap or share a face
    /// region of positive area; touching along an edge does not connect.
    pub fn components(&self) -> Vec<Solid> {
        let n = self.pieces.len();
        let mut parent: Vec<usize> = (0..n).collect();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.pieces[i], &self.pieces[j]);
                if !a.bounding_box().expanded(EPS).overlaps(&b.bounding_box()) {
                    continue;
                }
                if !a.is_separated_from(b) || shares_face(a, b) {
                    let (ri, rj) = (find_root(&mut parent, i), find_root(&mut parent, j));
                    if ri != rj {
                        parent[rj] = ri;
                    }
                }
            }
        }

        let mut groups: Vec<(usize, Vec<ConvexPiece>)> = Vec::new();
        for i in 0..n {
            let root = find_root(&mut parent, i);
            let piece = self.pieces[i].clone();
            match groups.iter_mut().find(|(r, _)| *r == root) {
                Some((_, group)) => group.push(piece),
                None => groups.push((root, vec![piece])),
            }
        }
        groups
            .into_iter()
            .map(|(_, pieces)| Solid::from_pieces(pieces))
            .collect()
    }
}

/// Whether some face of `a` and some face of `b` overlap with opposite orientation.
fn shares_face(a: &ConvexPiece, b: &ConvexPiece) -> bool {
    a.faces().iter().any(|f| {
        b.faces().iter().any(|g| {
            if !f.is_opposite_coplanar(g) {
                return false;
            }
            let uncovered: f64 = f.subtract_coplanar(g).iter().map(Face::area).sum();
            f.area() - uncovered > AREA_EPS
        })
    })
}
