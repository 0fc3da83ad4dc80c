//! Edge chamfering for single-piece solids.
//!
//! A chamfer replaces a convex edge with a flat bevel. Each selected edge
//! defines a cutting plane whose normal bisects the two adjacent face
//! normals and which meets both faces `distance` away from the edge.

use printprep_math::{Plane, Point3, Vec3};
use tracing::debug;

use crate::error::{KernelError, KernelResult};
use crate::face::Face;
use crate::solid::Solid;

/// Tolerance for matching edge endpoints against face planes.
const EDGE_TOL: f64 = 1e-6;

/// A convex edge shared by two faces.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    /// First endpoint.
    pub start: Point3,
    /// Second endpoint.
    pub end: Point3,
    /// Outward normals of the two adjacent faces.
    pub normals: [Vec3; 2],
}

impl Edge {
    /// Edge length.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Midpoint.
    pub fn midpoint(&self) -> Point3 {
        nalgebra::center(&self.start, &self.end)
    }
}

impl Solid {
    /// Edges of a single-piece solid, each reported once.
    pub fn edges(&self) -> KernelResult<Vec<Edge>> {
        let piece = self.single_piece("edges")?;
        let faces = piece.faces();
        let mut out = Vec::new();
        for (i, face) in faces.iter().enumerate() {
            for (a, b) in face.edges() {
                let neighbour = faces.iter().enumerate().find(|(j, g)| {
                    *j != i
                        && g.plane().signed_distance(&a).abs() < EDGE_TOL
                        && g.plane().signed_distance(&b).abs() < EDGE_TOL
                });
                if let Some((j, g)) = neighbour {
                    if i < j {
                        out.push(Edge {
                            start: a,
                            end: b,
                            normals: [face.raw_normal(), g.raw_normal()],
                        });
                    }
                }
            }
        }
        Ok(out)
    }

    /// Bevel every edge accepted by `select` by `distance` along both faces.
    ///
    /// Fails when the solid has more than one piece, when no edge is
    /// selected, or when a bevel would consume one of the original faces.
    pub fn chamfer_edges<F>(&self, distance: f64, select: F) -> KernelResult<Solid>
    where
        F: Fn(&Edge) -> bool,
    {
        if !(distance > 0.0) || !distance.is_finite() {
            return Err(KernelError::InvalidInput(format!(
                "chamfer distance must be positive, got {distance}"
            )));
        }
        let piece = self.single_piece("chamfer")?;
        let selected: Vec<Edge> = self.edges()?.into_iter().filter(|e| select(e)).collect();
        if selected.is_empty() {
            return Err(KernelError::InvalidInput("chamfer selected no edges".into()));
        }

        let mut current = piece.clone();
        for edge in &selected {
            let plane = bevel_plane(edge, piece.faces(), distance)?;
            current = current.clip(&plane).ok_or_else(|| {
                KernelError::Degenerate("chamfer removed the whole solid".into())
            })?;
        }

        for original in piece.faces() {
            let survives = current.faces().iter().any(|f| {
                f.raw_normal().dot(&original.raw_normal()) > 1.0 - 1e-9 && f.area() > 1e-9
            });
            if !survives {
                return Err(KernelError::Degenerate(format!(
                    "chamfer of {distance} mm consumes a face"
                )));
            }
        }
        debug!(edges = selected.len(), distance, "chamfered solid");
        Ok(Solid::from_pieces(vec![current]))
    }

    fn single_piece(&self, op: &str) -> KernelResult<&crate::piece::ConvexPiece> {
        match self.pieces() {
            [piece] => Ok(piece),
            pieces => Err(KernelError::InvalidInput(format!(
                "{op} needs a single convex piece, solid has {}",
                pieces.len()
            ))),
        }
    }
}

fn bevel_plane(edge: &Edge, faces: &[Face], distance: f64) -> KernelResult<Plane> {
    let [n1, n2] = edge.normals;
    let bisector = n1 + n2;
    if bisector.norm() < 1e-9 {
        return Err(KernelError::Degenerate("edge between opposite faces".into()));
    }
    let dir = (edge.end - edge.start).normalize();
    // In-face direction perpendicular to the edge, pointing away from it.
    let face = faces
        .iter()
        .find(|f| f.raw_normal().dot(&n1) > 1.0 - 1e-9)
        .ok_or_else(|| KernelError::Degenerate("edge face not found".into()))?;
    let mut inward = n1.cross(&dir);
    if (face.centroid() - edge.start).dot(&inward) < 0.0 {
        inward = -inward;
    }
    let on_face = edge.start + inward * distance;
    Ok(Plane::from_point_normal(&on_face, &bisector))
}
