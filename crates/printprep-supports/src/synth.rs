//! Support geometry synthesis.
//!
//! Each support is a short list of primitives kept as separate solids:
//! an optional base pad, a vertical column, and either a cone tip
//! (vertical approach) or an angled neck ending in a tip sphere.
//!
//! The angled approach stands the column off from the contact, away from
//! the face along the horizontal part of its normal, so the column body
//! clears thin walls.

use printprep_kernel::{KernelResult, Solid};
use printprep_math::{Point3, Vec3};
use tracing::{info, warn};

use crate::collision::CollisionReport;
use crate::config::SupportConfig;
use crate::contact::Contact;

/// How a support reaches its contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportStyle {
    /// Column straight under the contact with a cone tip.
    Vertical,
    /// Displaced column with a neck sweeping to a tip sphere.
    AngledNeck,
}

/// Primitives for one support.
#[derive(Debug, Clone)]
pub struct SupportShapes {
    /// The contact this support touches.
    pub contact: Contact,
    /// Which approach was built.
    pub style: SupportStyle,
    /// Center of the base pad, when one was built.
    pub pad_center: Option<Point3>,
    /// Pad, column, tip and neck solids in build order.
    pub parts: Vec<Solid>,
}

impl SupportShapes {
    /// All parts as one compound solid.
    pub fn to_solid(&self) -> Solid {
        Solid::compound(self.parts.iter().cloned())
    }
}

/// Angled-neck geometry derived from a contact.
struct NeckLayout {
    tip_center: Point3,
    column_x: f64,
    column_y: f64,
    column_top: f64,
}

impl NeckLayout {
    fn new(contact: &Contact, support: &SupportConfig) -> Self {
        let n = contact.unit_normal_or_down();
        let tip_center = contact.position + n * support.tip_radius;
        Self {
            tip_center,
            column_x: tip_center.x - support.neck_length * n.x,
            column_y: tip_center.y - support.neck_length * n.y,
            column_top: tip_center.z - support.neck_length,
        }
    }

    fn column_top_point(&self) -> Point3 {
        Point3::new(self.column_x, self.column_y, self.column_top)
    }
}

/// XY where the column of an angled support stands.
///
/// Raft pads are centered here, not under the contact.
pub fn pad_center(contact: &Contact, support: &SupportConfig) -> (f64, f64) {
    if support.angled_necks && contact.has_direction() {
        let layout = NeckLayout::new(contact, support);
        (layout.column_x, layout.column_y)
    } else {
        (contact.x(), contact.y())
    }
}

/// Build the primitives for one support.
///
/// `include_pad` adds a base pad under the column (raft-based supports).
/// Falls back to the vertical approach when the neck has no room.
pub fn build_support(
    contact: &Contact,
    include_pad: bool,
    support: &SupportConfig,
) -> KernelResult<SupportShapes> {
    if support.angled_necks && contact.has_direction() {
        if let Some(shapes) = build_angled(contact, include_pad, support)? {
            return Ok(shapes);
        }
    }
    build_vertical(contact, include_pad, support)
}

fn pad(center: Point3, support: &SupportConfig) -> KernelResult<Solid> {
    Solid::cylinder(
        center,
        Vec3::z(),
        support.base_pad_radius,
        support.base_pad_height,
        support.segments,
    )
}

fn column_bottom(contact: &Contact, include_pad: bool, support: &SupportConfig) -> f64 {
    if include_pad {
        contact.base_z + support.base_pad_height
    } else {
        contact.base_z
    }
}

fn build_vertical(
    contact: &Contact,
    include_pad: bool,
    support: &SupportConfig,
) -> KernelResult<SupportShapes> {
    let (cx, cy) = (contact.x(), contact.y());
    let mut parts = Vec::with_capacity(3);

    let pad_center = include_pad.then(|| Point3::new(cx, cy, contact.base_z));
    if let Some(center) = pad_center {
        parts.push(pad(center, support)?);
    }

    let col_bot = column_bottom(contact, include_pad, support);
    let mut col_top = contact.z() - support.tip_height;
    if col_top > col_bot {
        parts.push(Solid::cylinder(
            Point3::new(cx, cy, col_bot),
            Vec3::z(),
            support.column_radius,
            col_top - col_bot,
            support.segments,
        )?);
    } else {
        col_top = col_bot;
    }

    parts.push(Solid::frustum(
        Point3::new(cx, cy, col_top),
        Vec3::z(),
        support.column_radius,
        support.tip_radius,
        support.tip_height,
        support.segments,
    )?);

    Ok(SupportShapes {
        contact: *contact,
        style: SupportStyle::Vertical,
        pad_center,
        parts,
    })
}

fn build_angled(
    contact: &Contact,
    include_pad: bool,
    support: &SupportConfig,
) -> KernelResult<Option<SupportShapes>> {
    let layout = NeckLayout::new(contact, support);
    let col_bot = column_bottom(contact, include_pad, support);
    if layout.column_top <= col_bot {
        return Ok(None);
    }

    let neck_base = layout.column_top_point();
    let neck = layout.tip_center - neck_base;
    let neck_len = neck.norm();
    if neck_len < support.tip_height {
        return Ok(None);
    }

    let mut parts = Vec::with_capacity(4);
    let pad_center = include_pad.then(|| Point3::new(layout.column_x, layout.column_y, contact.base_z));
    if let Some(center) = pad_center {
        parts.push(pad(center, support)?);
    }
    parts.push(Solid::cylinder(
        Point3::new(layout.column_x, layout.column_y, col_bot),
        Vec3::z(),
        support.column_radius,
        layout.column_top - col_bot,
        support.segments,
    )?);
    parts.push(Solid::frustum(
        neck_base,
        neck,
        support.column_radius,
        support.tip_radius,
        neck_len,
        support.segments,
    )?);
    parts.push(Solid::sphere(layout.tip_center, support.tip_radius, support.segments)?);

    Ok(Some(SupportShapes {
        contact: *contact,
        style: SupportStyle::AngledNeck,
        pad_center,
        parts,
    }))
}

/// Build supports for every placed contact.
///
/// Raft-based supports get a base pad; model-resting ones do not.
/// Supports that fail to build are logged and left out.
pub fn build_all_supports(report: &CollisionReport, support: &SupportConfig) -> Vec<SupportShapes> {
    let with_pads = report.raft.iter().map(|c| (c, true));
    let without = report.model_resting.iter().map(|c| (c, false));

    let supports: Vec<SupportShapes> = with_pads
        .chain(without)
        .filter_map(|(c, include_pad)| match build_support(c, include_pad, support) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(x = c.x(), y = c.y(), z = c.z(), "support build failed: {e}");
                None
            }
        })
        .collect();

    let shapes: usize = supports.iter().map(|s| s.parts.len()).sum();
    info!(supports = supports.len(), shapes, "built supports");
    supports
}
