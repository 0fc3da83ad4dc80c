//! Cross-panel collision checks along support paths.
//!
//! A support grows straight up from the raft to its contact. When another
//! panel sits in the way, the support starts on top of that panel instead,
//! or is dropped when the remaining height cannot fit a tip and neck.

use printprep_kernel::Solid;
use printprep_math::{Point3, Vec3};
use tracing::{debug, info, warn};

use crate::config::{CollisionConfig, SupportConfig};
use crate::contact::Contact;
use crate::model::{Model, Panel};

/// Where a support starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SupportBase {
    /// Grows from the raft.
    Raft,
    /// Rests on the model at this height.
    ModelResting(f64),
    /// No room for a support; the contact is dropped.
    Skipped,
}

/// Contacts sorted by where their supports start.
#[derive(Debug, Clone, Default)]
pub struct CollisionReport {
    /// Contacts with a clear path to the raft.
    pub raft: Vec<Contact>,
    /// Contacts whose supports start on another panel; `base_z` is set.
    pub model_resting: Vec<Contact>,
    /// Contacts dropped for lack of vertical room.
    pub skipped: usize,
}

impl CollisionReport {
    /// Every placed contact, raft-based first.
    pub fn placed(&self) -> impl Iterator<Item = &Contact> + '_ {
        self.raft.iter().chain(self.model_resting.iter())
    }
}

/// Highest point where `panel` blocks the column under `contact`, if any.
fn blocked_height(
    contact: &Contact,
    panel: &Panel,
    support: &SupportConfig,
    cfg: &CollisionConfig,
) -> Option<f64> {
    let (cx, cy, cz) = (contact.x(), contact.y(), contact.z());
    let col_r = support.column_radius;
    let pbb = panel.bbox();
    let margin = col_r + cfg.footprint_margin;

    if cx + margin < pbb.min.x || cx - margin > pbb.max.x || cy + margin < pbb.min.y || cy - margin > pbb.max.y {
        return None;
    }
    let ceiling = cz - cfg.contact_clearance;
    if pbb.min.z > ceiling || pbb.max.z < cfg.raft_floor {
        return None;
    }

    // Cheap center-line test before the exact boolean.
    let line_z0 = cfg.raft_floor.max(pbb.min.z);
    let line_z1 = ceiling.min(pbb.max.z);
    if line_z1 <= line_z0 + cfg.min_line_span {
        return None;
    }
    let dist = match panel
        .solid()
        .distance_to_segment(&Point3::new(cx, cy, line_z0), &Point3::new(cx, cy, line_z1))
    {
        Ok(d) => d,
        Err(e) => {
            warn!("distance query failed: {e}");
            return None;
        }
    };
    if dist > col_r + cfg.distance_tolerance {
        return None;
    }

    let col_z0 = (pbb.min.z - cfg.column_overshoot).max(0.0);
    let col_z1 = ceiling.min(pbb.max.z + cfg.column_overshoot);
    if col_z1 <= col_z0 + cfg.min_column_span {
        return None;
    }
    let column = match Solid::cylinder(
        Point3::new(cx, cy, col_z0),
        Vec3::z(),
        col_r,
        col_z1 - col_z0,
        support.segments,
    ) {
        Ok(c) => c,
        Err(e) => {
            warn!("collision column failed: {e}");
            return None;
        }
    };
    match panel.solid().intersection(&column) {
        Ok(common) if common.volume() > cfg.min_overlap_volume => Some(common.bounding_box().max.z),
        Ok(_) => None,
        Err(e) => {
            warn!("collision intersection failed: {e}");
            None
        }
    }
}

/// Decide where the support for `contact` starts.
pub fn find_support_base(
    contact: &Contact,
    model: &Model,
    support: &SupportConfig,
    cfg: &CollisionConfig,
) -> SupportBase {
    let max_hit = model
        .panels()
        .iter()
        .filter_map(|panel| blocked_height(contact, panel, support, cfg))
        .fold(None, |acc: Option<f64>, z| Some(acc.map_or(z, |a| a.max(z))));

    let Some(max_hit) = max_hit else {
        return SupportBase::Raft;
    };

    let base_z = max_hit + cfg.model_rest_gap;
    let highest_base =
        contact.z() - (support.tip_radius + support.neck_length) * cfg.neck_room_factor - cfg.neck_room_margin;
    if base_z > highest_base {
        debug!(
            x = contact.x(),
            y = contact.y(),
            z = contact.z(),
            base_z,
            "no room below contact"
        );
        return SupportBase::Skipped;
    }
    if base_z < Contact::MODEL_RESTING_THRESHOLD {
        SupportBase::Raft
    } else {
        SupportBase::ModelResting(base_z)
    }
}

/// Sort contacts into raft-based, model-resting and skipped.
pub fn detect_collisions(
    contacts: &[Contact],
    model: &Model,
    support: &SupportConfig,
    cfg: &CollisionConfig,
) -> CollisionReport {
    info!(
        contacts = contacts.len(),
        panels = model.panels().len(),
        "checking support paths"
    );
    let mut report = CollisionReport::default();
    for c in contacts {
        match find_support_base(c, model, support, cfg) {
            SupportBase::Raft => report.raft.push(c.with_base_z(0.0)),
            SupportBase::ModelResting(z) => report.model_resting.push(c.with_base_z(z)),
            SupportBase::Skipped => report.skipped += 1,
        }
    }
    info!(
        raft = report.raft.len(),
        model_resting = report.model_resting.len(),
        skipped = report.skipped,
        "support bases"
    );
    report
}
