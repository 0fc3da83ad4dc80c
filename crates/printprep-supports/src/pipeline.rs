//! The consolidated support pipeline.
//!
//! orient → select faces → raw contacts → cluster/nudge → collisions →
//! support synthesis → panel clipping → raft → build-fit check.
//!
//! Face selection and contact placement strategies come from
//! [`PlacementConfig`](crate::config::PlacementConfig), so one pipeline
//! covers every model family.

use printprep_kernel::{Aabb3, Solid};
use printprep_math::Vec3;
use serde::Serialize;
use tracing::info;

use crate::clip::clip_supports;
use crate::cluster::cluster_and_nudge;
use crate::collision::detect_collisions;
use crate::config::PrepConfig;
use crate::error::Result;
use crate::fit::{check_build_fit, FitReport};
use crate::model::Model;
use crate::orient::{prepare_orientation, validate_tilt_direction};
use crate::placement::generate_contacts;
use crate::raft::build_raft;
use crate::synth::build_all_supports;

/// Counts reported by each stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    /// Contacts before clustering.
    pub raw_contacts: usize,
    /// Contacts after clustering.
    pub clustered_contacts: usize,
    /// Supports growing from the raft.
    pub raft_supports: usize,
    /// Supports resting on the model.
    pub model_resting_supports: usize,
    /// Contacts dropped for lack of room.
    pub skipped_contacts: usize,
    /// Support primitives after synthesis.
    pub support_shapes: usize,
    /// Primitives changed by panel clipping.
    pub clipped_shapes: usize,
    /// Every clustered contact lies on the interior half.
    pub interior_side: bool,
}

/// Everything needed to export one print.
#[derive(Debug, Clone)]
pub struct PrintJob {
    /// The model in print orientation.
    pub model: Model,
    /// Wall-outward reference normal in the print frame.
    pub wall_outward: Vec3,
    /// Clipped support primitives.
    pub supports: Vec<Solid>,
    /// The raft plate.
    pub raft: Solid,
    /// Stage counts.
    pub stats: PipelineStats,
    /// Build-volume check of model, supports and raft together.
    pub fit: FitReport,
}

impl PrintJob {
    /// Model panels, supports and raft, in that order.
    pub fn parts(&self) -> Vec<Solid> {
        self.model
            .panels()
            .iter()
            .map(|p| p.solid().clone())
            .chain(self.supports.iter().cloned())
            .chain(std::iter::once(self.raft.clone()))
            .collect()
    }

    /// The whole print as one compound.
    pub fn to_solid(&self) -> Solid {
        Solid::compound(self.parts())
    }

    /// Bounds of the whole print.
    pub fn bounding_box(&self) -> Aabb3 {
        print_bounds(&self.model, &self.supports, &self.raft)
    }
}

fn print_bounds(model: &Model, supports: &[Solid], raft: &Solid) -> Aabb3 {
    supports
        .iter()
        .chain(std::iter::once(raft))
        .fold(model.bounding_box(), |acc, s| acc.union(&s.bounding_box()))
}

/// Run every stage on `model`.
///
/// Only invalid configuration, an empty model or an unknown printer fail
/// the run; per-face, per-contact and per-panel failures are logged and
/// skipped. A print that does not fit is reported in [`PrintJob::fit`].
pub fn prepare_print(model: &Model, cfg: &PrepConfig) -> Result<PrintJob> {
    cfg.validate()?;

    let oriented = prepare_orientation(model, &cfg.orientation);
    let model = oriented.model;
    let model_bbox = model.bounding_box();

    let raw = generate_contacts(&model, &oriented.wall_outward, oriented.raise, cfg);
    let clustered = cluster_and_nudge(&raw, &model_bbox, &cfg.cluster);
    let interior_side = validate_tilt_direction(&clustered, &model_bbox, &oriented.wall_outward);

    let report = detect_collisions(&clustered, &model, &cfg.support, &cfg.collision);
    let built = build_all_supports(&report, &cfg.support);
    let pads: Vec<(f64, f64)> = built
        .iter()
        .filter_map(|s| s.pad_center)
        .map(|p| (p.x, p.y))
        .collect();
    let shapes: Vec<Solid> = built.iter().flat_map(|s| s.parts.iter().cloned()).collect();

    let clipped = clip_supports(&shapes, &model, &cfg.clip);
    let raft = build_raft(&model_bbox, &pads, &cfg.support, &cfg.raft)?;
    let fit = check_build_fit(&print_bounds(&model, &clipped.shapes, &raft), &cfg.fit)?;

    let stats = PipelineStats {
        raw_contacts: raw.len(),
        clustered_contacts: clustered.len(),
        raft_supports: report.raft.len(),
        model_resting_supports: report.model_resting.len(),
        skipped_contacts: report.skipped,
        support_shapes: clipped.shapes.len(),
        clipped_shapes: clipped.clipped,
        interior_side,
    };
    info!(
        raw = stats.raw_contacts,
        clustered = stats.clustered_contacts,
        raft = stats.raft_supports,
        model_resting = stats.model_resting_supports,
        skipped = stats.skipped_contacts,
        shapes = stats.support_shapes,
        clipped = stats.clipped_shapes,
        fits = fit.fits,
        "print prepared"
    );

    Ok(PrintJob {
        model,
        wall_outward: oriented.wall_outward,
        supports: clipped.shapes,
        raft,
        stats,
        fit,
    })
}
