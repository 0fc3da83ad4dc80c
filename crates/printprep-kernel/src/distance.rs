//! Minimum-distance queries between solids and points or line segments.

use printprep_math::Point3;

use crate::error::{KernelError, KernelResult};
use crate::face::{point_segment_distance, EPS};
use crate::piece::ConvexPiece;
use crate::solid::Solid;

impl Solid {
    /// Minimum distance from the segment `a`–`b` to the solid; zero when they touch.
    pub fn distance_to_segment(&self, a: &Point3, b: &Point3) -> KernelResult<f64> {
        self.check_query(&[a, b])?;
        Ok(self
            .pieces()
            .iter()
            .map(|piece| piece_segment_distance(piece, a, b))
            .fold(f64::INFINITY, f64::min))
    }

    /// Minimum distance from `p` to the solid; zero inside.
    pub fn distance_to_point(&self, p: &Point3) -> KernelResult<f64> {
        self.check_query(&[p])?;
        Ok(self
            .pieces()
            .iter()
            .map(|piece| {
                if piece.contains_point(p, EPS) {
                    0.0
                } else {
                    piece
                        .faces()
                        .iter()
                        .map(|f| f.distance_to_point(p))
                        .fold(f64::INFINITY, f64::min)
                }
            })
            .fold(f64::INFINITY, f64::min))
    }

    fn check_query(&self, points: &[&Point3]) -> KernelResult<()> {
        if self.is_empty() {
            return Err(KernelError::InvalidInput("distance query on empty solid".into()));
        }
        if !points.iter().all(|p| p.coords.iter().all(|c| c.is_finite())) {
            return Err(KernelError::Degenerate("distance query with non-finite point".into()));
        }
        Ok(())
    }
}

fn piece_segment_distance(piece: &ConvexPiece, a: &Point3, b: &Point3) -> f64 {
    if segment_hits_piece(piece, a, b) {
        return 0.0;
    }
    let mut best = f64::INFINITY;
    for face in piece.faces() {
        best = best
            .min(face.distance_to_point(a))
            .min(face.distance_to_point(b));
        for (p, q) in face.edges() {
            best = best.min(segment_segment_distance(a, b, &p, &q));
        }
    }
    best
}

/// Parametric clip of the segment against every face plane.
fn segment_hits_piece(piece: &ConvexPiece, a: &Point3, b: &Point3) -> bool {
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for plane in piece.planes() {
        let da = plane.signed_distance(a);
        let db = plane.signed_distance(b);
        if da > EPS && db > EPS {
            return false;
        }
        if da <= EPS && db <= EPS {
            continue;
        }
        let t = da / (da - db);
        if da > EPS {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 + 1e-12 {
            return false;
        }
    }
    true
}

/// Distance between segments `p1`–`q1` and `p2`–`q2`.
fn segment_segment_distance(p1: &Point3, q1: &Point3, p2: &Point3, q2: &Point3) -> f64 {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    if a <= f64::EPSILON && e <= f64::EPSILON {
        return r.norm();
    }
    if a <= f64::EPSILON {
        return point_segment_distance(p1, p2, q2);
    }
    if e <= f64::EPSILON {
        return point_segment_distance(p2, p1, q1);
    }

    let c = d1.dot(&r);
    let b = d1.dot(&d2);
    let denom = a * e - b * b;
    let mut s = if denom > f64::EPSILON * a * e {
        ((b * f - c * e) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut t = (b * s + f) / e;
    if t < 0.0 {
        t = 0.0;
        s = (-c / a).clamp(0.0, 1.0);
    } else if t > 1.0 {
        t = 1.0;
        s = ((b - c) / a).clamp(0.0, 1.0);
    }
    ((p1 + d1 * s) - (p2 + d2 * t)).norm()
}
