//! Primitive solid constructors: box, frustum/cone, cylinder and sphere.
//!
//! Curved primitives are faceted: circles become regular `segments`-gons
//! inscribed in the true circle, and the sphere is a UV polyhedron whose
//! ring faces are planar trapezoids.

use std::f64::consts::PI;

use printprep_math::{plane_basis, Point3, Vec3};

use crate::error::{KernelError, KernelResult};
use crate::face::Face;
use crate::piece::ConvexPiece;
use crate::solid::Solid;

/// Radius below which a frustum end collapses to an apex.
const APEX_RADIUS: f64 = 1e-9;

fn check_finite(values: &[f64], what: &str) -> KernelResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(KernelError::InvalidInput(format!("{what}: non-finite argument")))
    }
}

impl Solid {
    /// Axis-aligned box with minimum corner `min` and extents `size`.
    pub fn cuboid(min: Point3, size: Vec3) -> KernelResult<Solid> {
        check_finite(&[min.x, min.y, min.z, size.x, size.y, size.z], "cuboid")?;
        if size.iter().any(|&s| s <= 0.0) {
            return Err(KernelError::InvalidInput(format!(
                "cuboid size must be positive, got ({}, {}, {})",
                size.x, size.y, size.z
            )));
        }
        let max = min + size;
        let p = |x: bool, y: bool, z: bool| {
            Point3::new(
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            )
        };
        let (f, t) = (false, true);
        let loops = [
            [p(f, f, f), p(f, f, t), p(f, t, t), p(f, t, f)], // -X
            [p(t, f, f), p(t, t, f), p(t, t, t), p(t, f, t)], // +X
            [p(f, f, f), p(t, f, f), p(t, f, t), p(f, f, t)], // -Y
            [p(f, t, f), p(f, t, t), p(t, t, t), p(t, t, f)], // +Y
            [p(f, f, f), p(f, t, f), p(t, t, f), p(t, f, f)], // -Z
            [p(f, f, t), p(t, f, t), p(t, t, t), p(f, t, t)], // +Z
        ];
        let faces = loops
            .into_iter()
            .map(|l| Face::from_loop(l.to_vec()))
            .collect::<KernelResult<Vec<_>>>()?;
        Ok(Solid::from_pieces(vec![ConvexPiece::from_faces(faces)?]))
    }

    /// Circular cylinder standing on `base` along `axis`.
    pub fn cylinder(
        base: Point3,
        axis: Vec3,
        radius: f64,
        height: f64,
        segments: u32,
    ) -> KernelResult<Solid> {
        Self::frustum(base, axis, radius, radius, height, segments)
    }

    /// Truncated cone standing on `base` along `axis`.
    ///
    /// A zero `r_top` (or `r_bottom`) yields a cone with an apex.
    pub fn frustum(
        base: Point3,
        axis: Vec3,
        r_bottom: f64,
        r_top: f64,
        height: f64,
        segments: u32,
    ) -> KernelResult<Solid> {
        check_finite(
            &[base.x, base.y, base.z, axis.x, axis.y, axis.z, r_bottom, r_top, height],
            "frustum",
        )?;
        if segments < 3 {
            return Err(KernelError::InvalidInput(format!(
                "frustum needs at least 3 segments, got {segments}"
            )));
        }
        if height <= 0.0 || r_bottom < 0.0 || r_top < 0.0 {
            return Err(KernelError::InvalidInput(format!(
                "frustum dimensions must be positive (r1={r_bottom}, r2={r_top}, h={height})"
            )));
        }
        if r_bottom <= APEX_RADIUS && r_top <= APEX_RADIUS {
            return Err(KernelError::InvalidInput("frustum has no radius".into()));
        }
        let axis_len = axis.norm();
        if axis_len < 1e-12 {
            return Err(KernelError::InvalidInput("frustum axis has zero length".into()));
        }
        let axis = axis / axis_len;
        let (u, v) = plane_basis(&axis);
        let top = base + axis * height;
        let ring = |center: Point3, r: f64| -> Vec<Point3> {
            (0..segments)
                .map(|k| {
                    let theta = 2.0 * PI * k as f64 / segments as f64;
                    center + (u * theta.cos() + v * theta.sin()) * r
                })
                .collect()
        };
        let bottom_ring = ring(base, r_bottom);
        let top_ring = ring(top, r_top);
        let has_bottom = r_bottom > APEX_RADIUS;
        let has_top = r_top > APEX_RADIUS;

        let n = segments as usize;
        let mut loops: Vec<Vec<Point3>> = Vec::with_capacity(n + 2);
        if has_bottom {
            loops.push(bottom_ring.iter().rev().copied().collect());
        }
        if has_top {
            loops.push(top_ring.clone());
        }
        for k in 0..n {
            let k1 = (k + 1) % n;
            loops.push(match (has_bottom, has_top) {
                (true, true) => vec![bottom_ring[k], bottom_ring[k1], top_ring[k1], top_ring[k]],
                (true, false) => vec![bottom_ring[k], bottom_ring[k1], top],
                _ => vec![base, top_ring[k1], top_ring[k]],
            });
        }
        let faces = loops
            .into_iter()
            .map(Face::from_loop)
            .collect::<KernelResult<Vec<_>>>()?;
        Ok(Solid::from_pieces(vec![ConvexPiece::from_faces(faces)?]))
    }

    /// Faceted sphere with `segments` meridians and `segments / 2` bands.
    pub fn sphere(center: Point3, radius: f64, segments: u32) -> KernelResult<Solid> {
        check_finite(&[center.x, center.y, center.z, radius], "sphere")?;
        if radius <= 0.0 {
            return Err(KernelError::InvalidInput(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        if segments < 4 {
            return Err(KernelError::InvalidInput(format!(
                "sphere needs at least 4 segments, got {segments}"
            )));
        }
        let n = segments as usize;
        let bands = (n / 2).max(2);
        let south = center - Vec3::z() * radius;
        let north = center + Vec3::z() * radius;
        // rings[i] is latitude i + 1 counted from the south pole.
        let rings: Vec<Vec<Point3>> = (1..bands)
            .map(|i| {
                let phi = -PI / 2.0 + PI * i as f64 / bands as f64;
                let (rho, z) = (radius * phi.cos(), radius * phi.sin());
                (0..n)
                    .map(|k| {
                        let theta = 2.0 * PI * k as f64 / n as f64;
                        center + Vec3::new(rho * theta.cos(), rho * theta.sin(), z)
                    })
                    .collect()
            })
            .collect();

        let mut loops: Vec<Vec<Point3>> = Vec::new();
        for k in 0..n {
            let k1 = (k + 1) % n;
            loops.push(vec![south, rings[0][k1], rings[0][k]]);
            for band in rings.windows(2) {
                loops.push(vec![band[0][k], band[0][k1], band[1][k1], band[1][k]]);
            }
            let last = &rings[rings.len() - 1];
            loops.push(vec![last[k], last[k1], north]);
        }
        let faces = loops
            .into_iter()
            .map(Face::from_loop)
            .collect::<KernelResult<Vec<_>>>()?;
        Ok(Solid::from_pieces(vec![ConvexPiece::from_faces(faces)?]))
    }
}
