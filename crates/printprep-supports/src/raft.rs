//! Raft plate under the model and its supports.

use printprep_kernel::{Aabb3, Solid};
use printprep_math::{Point3, Vec3};
use tracing::{debug, info};

use crate::config::{RaftConfig, SupportConfig};
use crate::error::{PrepError, Result};

const BOTTOM_EDGE_TOL: f64 = 0.01;

/// Build the raft plate spanning `[-thickness, 0]` in Z.
///
/// The plate covers the model footprint and every base pad (centre plus
/// pad radius), grown by the raft margin. Bottom edges are chamfered when
/// the kernel can; a failed chamfer leaves the plain plate.
pub fn build_raft(
    model_bbox: &Aabb3,
    pad_centers: &[(f64, f64)],
    support: &SupportConfig,
    cfg: &RaftConfig,
) -> Result<Solid> {
    if model_bbox.is_empty() {
        return Err(PrepError::EmptyModel);
    }

    let r = support.base_pad_radius;
    let (mut x0, mut x1) = (model_bbox.min.x, model_bbox.max.x);
    let (mut y0, mut y1) = (model_bbox.min.y, model_bbox.max.y);
    for &(px, py) in pad_centers {
        x0 = x0.min(px - r);
        x1 = x1.max(px + r);
        y0 = y0.min(py - r);
        y1 = y1.max(py + r);
    }
    x0 -= cfg.margin;
    x1 += cfg.margin;
    y0 -= cfg.margin;
    y1 += cfg.margin;

    let t = cfg.thickness;
    let plate = Solid::cuboid(Point3::new(x0, y0, -t), Vec3::new(x1 - x0, y1 - y0, t))?;

    let raft = if cfg.chamfer > 0.0 {
        let on_bottom = |p: &Point3| (p.z + t).abs() < BOTTOM_EDGE_TOL;
        match plate.chamfer_edges(cfg.chamfer, |e| on_bottom(&e.start) && on_bottom(&e.end)) {
            Ok(chamfered) => chamfered,
            Err(e) => {
                debug!("raft chamfer skipped: {e}");
                plate
            }
        }
    } else {
        plate
    };

    info!(
        x = x1 - x0,
        y = y1 - y0,
        thickness = t,
        pads = pad_centers.len(),
        "built raft"
    );
    Ok(raft)
}
