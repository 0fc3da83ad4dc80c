//! Grid clustering and inward nudge of raw contacts.

use std::collections::BTreeMap;

use printprep_kernel::Aabb3;
use tracing::info;

use crate::config::ClusterConfig;
use crate::contact::Contact;

/// Merge contacts sharing a grid cell, keeping the lowest one per cell.
///
/// Cells are keyed by `(round(x / grid), round(y / grid))`. The surviving
/// contact keeps its own coordinates; snapping to the cell center could
/// move it off the face it was computed on. Output is ordered by cell.
pub fn cluster_contacts(contacts: &[Contact], grid: f64) -> Vec<Contact> {
    let mut cells: BTreeMap<(i64, i64), Contact> = BTreeMap::new();
    for c in contacts {
        let key = ((c.x() / grid).round() as i64, (c.y() / grid).round() as i64);
        cells
            .entry(key)
            .and_modify(|kept| {
                if c.z() < kept.z() {
                    *kept = *c;
                }
            })
            .or_insert(*c);
    }
    cells.into_values().collect()
}

/// Clamp a contact's XY into the footprint of `bbox`.
pub fn clip_to_footprint(contact: Contact, bbox: &Aabb3) -> Contact {
    let x = bbox.min.x.max(bbox.max.x.min(contact.x()));
    let y = bbox.min.y.max(bbox.max.y.min(contact.y()));
    contact.with_xy(x, y)
}

/// Shift a contact `distance` toward `(center_x, center_y)` in XY.
///
/// Contacts within `epsilon` of the center stay put.
pub fn nudge_inward(contact: Contact, center_x: f64, center_y: f64, distance: f64, epsilon: f64) -> Contact {
    let dx = contact.x() - center_x;
    let dy = contact.y() - center_y;
    let d = dx.hypot(dy);
    if d <= epsilon {
        return contact;
    }
    contact.with_xy(contact.x() - distance * dx / d, contact.y() - distance * dy / d)
}

/// Cluster, clip into the model footprint, then nudge toward its center.
pub fn cluster_and_nudge(contacts: &[Contact], model_bbox: &Aabb3, cfg: &ClusterConfig) -> Vec<Contact> {
    let center = model_bbox.center();
    let clustered: Vec<Contact> = cluster_contacts(contacts, cfg.grid)
        .into_iter()
        .map(|c| clip_to_footprint(c, model_bbox))
        .map(|c| nudge_inward(c, center.x, center.y, cfg.inward_nudge, cfg.center_epsilon))
        .collect();
    info!(
        raw = contacts.len(),
        clustered = clustered.len(),
        nudge = cfg.inward_nudge,
        "clustered contacts"
    );
    clustered
}
