//! Pipeline configuration.
//!
//! Every empirical threshold of the pipeline lives here, grouped by stage.
//! The defaults are calibrated for thin-walled building models printed at
//! roughly 1:160 scale; other model families should load their own values
//! from TOML:
//!
//! ```toml
//! [support]
//! column_radius = 0.5
//!
//! [placement.selection]
//! kind = "dual_filter"
//! normal_z_max = -0.5
//! min_edge_length = 0.6
//!
//! [fit]
//! printer = "m7_max"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classify::WindowBounds;
use crate::error::{PrepError, Result};
use crate::fit::printer_volume;
use crate::orient::OrientationMode;
use crate::placement::{FaceSelection, PlacementStrategy};

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// Face classifier thresholds.
    pub classifier: ClassifierConfig,
    /// Support shape dimensions.
    pub support: SupportConfig,
    /// Contact placement.
    pub placement: PlacementConfig,
    /// Contact clustering.
    pub cluster: ClusterConfig,
    /// Collision detection.
    pub collision: CollisionConfig,
    /// Panel clipping.
    pub clip: ClipConfig,
    /// Raft dimensions.
    pub raft: RaftConfig,
    /// Model orientation.
    pub orientation: OrientationConfig,
    /// Build-volume check.
    pub fit: FitConfig,
}

impl PrepConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: PrepConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        self.classifier.validate()?;
        self.support.validate()?;
        self.placement.validate()?;
        self.cluster.validate()?;
        self.collision.validate()?;
        self.clip.validate()?;
        self.raft.validate()?;
        self.orientation.validate()?;
        self.fit.validate()?;
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> PrepError {
    PrepError::InvalidConfig(msg.into())
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be positive, got {value}")))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} must not be negative, got {value}")))
    }
}

// =============================================================================
// Classifier
// =============================================================================

/// Thresholds for the face classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Faces whose thinnest extent is below this are thin sides or fragile (mm).
    pub fragile_threshold: f64,
    /// Overhangs smaller than this area are cosmetic (mm²).
    pub cosmetic_area_max: f64,
    /// Overhangs shallower than this depth are cosmetic (mm).
    pub cosmetic_depth_max: f64,
    /// Normal Z below this marks a downward-facing overhang.
    pub overhang_normal_z: f64,
    /// |dot(normal, wall normal)| above this marks a wall surface.
    pub wall_alignment: f64,
    /// dot(normal, wall normal) above this marks the display side.
    pub display_alignment: f64,
    /// |normal Z| below this marks a near-vertical face.
    pub vertical_normal_z: f64,
    /// Window opening, in the print frame, whose thin faces are fragile.
    pub window: Option<WindowBounds>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            fragile_threshold: 0.6,
            cosmetic_area_max: 1.0,
            cosmetic_depth_max: 1.0,
            overhang_normal_z: -0.3,
            wall_alignment: 0.7,
            display_alignment: 0.5,
            vertical_normal_z: 0.3,
            window: None,
        }
    }
}

impl ClassifierConfig {
    fn validate(&self) -> Result<()> {
        require_positive("classifier.fragile_threshold", self.fragile_threshold)?;
        require_positive("classifier.cosmetic_area_max", self.cosmetic_area_max)?;
        require_positive("classifier.cosmetic_depth_max", self.cosmetic_depth_max)?;
        if !(-1.0..0.0).contains(&self.overhang_normal_z) {
            return Err(invalid("classifier.overhang_normal_z must be in [-1, 0)"));
        }
        if !(self.wall_alignment > 0.0 && self.wall_alignment <= 1.0) {
            return Err(invalid("classifier.wall_alignment must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.vertical_normal_z) {
            return Err(invalid("classifier.vertical_normal_z must be in [0, 1]"));
        }
        if let Some(w) = &self.window {
            if w.x_min >= w.x_max || w.z_min >= w.z_max {
                return Err(invalid("classifier.window must have min < max"));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Support geometry
// =============================================================================

/// Dimensions of one tapered support.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportConfig {
    /// Radius where the support touches the model (mm).
    pub tip_radius: f64,
    /// Length of the tapering cone below the tip (mm).
    pub tip_height: f64,
    /// Column radius (mm).
    pub column_radius: f64,
    /// Radius of the pad on the raft (mm).
    pub base_pad_radius: f64,
    /// Pad height (mm).
    pub base_pad_height: f64,
    /// Length of the angled neck between column and tip (mm).
    pub neck_length: f64,
    /// Facets per circle for columns, cones and tips.
    pub segments: u32,
    /// Offset the column from the contact along the face normal.
    pub angled_necks: bool,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            tip_radius: 0.15,
            tip_height: 1.0,
            column_radius: 0.4,
            base_pad_radius: 1.0,
            base_pad_height: 0.5,
            neck_length: 2.0,
            segments: 16,
            angled_necks: true,
        }
    }
}

impl SupportConfig {
    fn validate(&self) -> Result<()> {
        require_positive("support.tip_radius", self.tip_radius)?;
        require_positive("support.tip_height", self.tip_height)?;
        require_positive("support.column_radius", self.column_radius)?;
        require_positive("support.base_pad_radius", self.base_pad_radius)?;
        require_positive("support.base_pad_height", self.base_pad_height)?;
        require_positive("support.neck_length", self.neck_length)?;
        if self.tip_radius >= self.column_radius {
            return Err(invalid("support.tip_radius must be smaller than column_radius"));
        }
        if self.segments < 4 {
            return Err(invalid("support.segments must be at least 4"));
        }
        Ok(())
    }
}

// =============================================================================
// Placement
// =============================================================================

/// Contact placement on selected faces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Grid spacing (mm).
    pub grid: f64,
    /// Faces smaller than this get no contacts (mm²).
    pub min_face_area: f64,
    /// Faces with |normal Z| below this get no contacts.
    pub min_abs_normal_z: f64,
    /// Interior-edge clearance beyond the column radius (mm).
    pub interior_clearance_margin: f64,
    /// Exterior-edge clearance beyond the column radius (mm).
    pub exterior_clearance_margin: f64,
    /// Narrow-face bias beyond column and tip radii (mm).
    pub narrow_bias_margin: f64,
    /// Narrow-face threshold beyond both sides' column and tip radii (mm).
    pub narrow_face_margin: f64,
    /// Candidates further than this outside the face bounds are dropped (mm).
    pub bbox_tolerance: f64,
    /// Contacts stay at least this far above the model raise (mm).
    pub contact_floor_margin: f64,
    /// X inset for interior-row placement (mm).
    pub row_x_margin: f64,
    /// Y inset for interior-row and jamb-corner placement (mm).
    pub row_y_margin: f64,
    /// X inset of jamb-corner contacts from the face ends (mm).
    pub jamb_inset: f64,
    /// Offset of jamb-corner contacts on each side of a mullion (mm).
    pub mullion_flank: f64,
    /// Which faces receive contacts.
    pub selection: FaceSelection,
    /// How contacts are laid out on a face.
    pub strategy: PlacementStrategy,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            grid: 8.0,
            min_face_area: 0.5,
            min_abs_normal_z: 0.05,
            interior_clearance_margin: 0.3,
            exterior_clearance_margin: 1.5,
            narrow_bias_margin: 0.1,
            narrow_face_margin: 0.9,
            bbox_tolerance: 0.5,
            contact_floor_margin: 0.1,
            row_x_margin: 1.5,
            row_y_margin: 0.5,
            jamb_inset: 0.5,
            mullion_flank: 1.5,
            selection: FaceSelection::default(),
            strategy: PlacementStrategy::default(),
        }
    }
}

impl PlacementConfig {
    /// Clearance from the interior-facing edge.
    pub fn interior_clearance(&self, support: &SupportConfig) -> f64 {
        support.column_radius + self.interior_clearance_margin
    }

    /// Clearance from the exterior-facing edge.
    pub fn exterior_clearance(&self, support: &SupportConfig) -> f64 {
        support.column_radius + self.exterior_clearance_margin
    }

    /// Distance of a narrow face's single contact from its exterior edge.
    pub fn narrow_bias(&self, support: &SupportConfig) -> f64 {
        support.column_radius + support.tip_radius + self.narrow_bias_margin
    }

    /// Spans below this cannot fit a support with clearance on both sides.
    pub fn narrow_face_threshold(&self, support: &SupportConfig) -> f64 {
        2.0 * (support.column_radius + support.tip_radius) + self.narrow_face_margin
    }

    fn validate(&self) -> Result<()> {
        require_positive("placement.grid", self.grid)?;
        require_non_negative("placement.min_face_area", self.min_face_area)?;
        require_non_negative("placement.min_abs_normal_z", self.min_abs_normal_z)?;
        require_non_negative("placement.interior_clearance_margin", self.interior_clearance_margin)?;
        require_non_negative("placement.exterior_clearance_margin", self.exterior_clearance_margin)?;
        require_non_negative("placement.narrow_bias_margin", self.narrow_bias_margin)?;
        require_non_negative("placement.narrow_face_margin", self.narrow_face_margin)?;
        require_non_negative("placement.bbox_tolerance", self.bbox_tolerance)?;
        require_non_negative("placement.contact_floor_margin", self.contact_floor_margin)?;
        require_non_negative("placement.row_x_margin", self.row_x_margin)?;
        require_non_negative("placement.row_y_margin", self.row_y_margin)?;
        require_non_negative("placement.jamb_inset", self.jamb_inset)?;
        require_non_negative("placement.mullion_flank", self.mullion_flank)?;
        self.selection.validate()?;
        self.strategy.validate()
    }
}

// =============================================================================
// Clustering
// =============================================================================

/// Grid clustering and inward nudge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Cell size (mm).
    pub grid: f64,
    /// Radial shift toward the model center (mm).
    pub inward_nudge: f64,
    /// Points closer than this to the center are not nudged (mm).
    pub center_epsilon: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            grid: 8.0,
            inward_nudge: 0.3,
            center_epsilon: 0.01,
        }
    }
}

impl ClusterConfig {
    fn validate(&self) -> Result<()> {
        require_positive("cluster.grid", self.grid)?;
        require_non_negative("cluster.inward_nudge", self.inward_nudge)?;
        require_non_negative("cluster.center_epsilon", self.center_epsilon)
    }
}

// =============================================================================
// Collision
// =============================================================================

/// Collision detection for vertical support paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Footprint growth beyond the column radius for the bbox filter (mm).
    pub footprint_margin: f64,
    /// Panels must lie this far below the contact to block it (mm).
    pub contact_clearance: f64,
    /// Panels entirely below this height never block (mm).
    pub raft_floor: f64,
    /// Minimum length of the probe line (mm).
    pub min_line_span: f64,
    /// Extra allowance on the centerline distance test (mm).
    pub distance_tolerance: f64,
    /// Test cylinder extends this far beyond the panel in Z (mm).
    pub column_overshoot: f64,
    /// Minimum test cylinder height (mm).
    pub min_column_span: f64,
    /// Intersections below this volume do not block (mm³).
    pub min_overlap_volume: f64,
    /// Gap between a blocking surface and a model-resting base (mm).
    pub model_rest_gap: f64,
    /// Fraction of tip radius plus neck length that must fit above the base.
    pub neck_room_factor: f64,
    /// Additional room required above the base (mm).
    pub neck_room_margin: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            footprint_margin: 0.5,
            contact_clearance: 3.0,
            raft_floor: 0.1,
            min_line_span: 0.1,
            distance_tolerance: 0.1,
            column_overshoot: 1.0,
            min_column_span: 0.5,
            min_overlap_volume: 0.001,
            model_rest_gap: 0.3,
            neck_room_factor: 0.95,
            neck_room_margin: 1.0,
        }
    }
}

impl CollisionConfig {
    fn validate(&self) -> Result<()> {
        require_non_negative("collision.footprint_margin", self.footprint_margin)?;
        require_non_negative("collision.contact_clearance", self.contact_clearance)?;
        require_non_negative("collision.raft_floor", self.raft_floor)?;
        require_non_negative("collision.min_line_span", self.min_line_span)?;
        require_non_negative("collision.distance_tolerance", self.distance_tolerance)?;
        require_non_negative("collision.column_overshoot", self.column_overshoot)?;
        require_positive("collision.min_column_span", self.min_column_span)?;
        require_non_negative("collision.min_overlap_volume", self.min_overlap_volume)?;
        require_non_negative("collision.model_rest_gap", self.model_rest_gap)?;
        require_positive("collision.neck_room_factor", self.neck_room_factor)?;
        require_non_negative("collision.neck_room_margin", self.neck_room_margin)
    }
}

// =============================================================================
// Clipping
// =============================================================================

/// Clipping of supports against panels and exterior slabs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Slab depth beyond the exterior face (mm).
    pub slab_depth: f64,
    /// Slab growth in the two other directions (mm).
    pub slab_margin: f64,
    /// Slab overlap into the panel (mm).
    pub slab_overlap: f64,
    /// Bounding-box prefilter margin (mm).
    pub bbox_margin: f64,
    /// Overlaps below this volume are ignored (mm³).
    pub min_overlap_volume: f64,
    /// Clipped shapes must keep at least this volume (mm³).
    pub min_keep_volume: f64,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            slab_depth: 3.0,
            slab_margin: 1.0,
            slab_overlap: 0.1,
            bbox_margin: 0.5,
            min_overlap_volume: 0.001,
            min_keep_volume: 0.01,
        }
    }
}

impl ClipConfig {
    fn validate(&self) -> Result<()> {
        require_positive("clip.slab_depth", self.slab_depth)?;
        require_non_negative("clip.slab_margin", self.slab_margin)?;
        require_non_negative("clip.slab_overlap", self.slab_overlap)?;
        if self.slab_overlap >= self.slab_depth {
            return Err(invalid("clip.slab_overlap must be smaller than slab_depth"));
        }
        require_non_negative("clip.bbox_margin", self.bbox_margin)?;
        require_non_negative("clip.min_overlap_volume", self.min_overlap_volume)?;
        require_non_negative("clip.min_keep_volume", self.min_keep_volume)
    }
}

// =============================================================================
// Raft
// =============================================================================

/// Raft plate dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaftConfig {
    /// Extension beyond the model and pad footprint (mm).
    pub margin: f64,
    /// Plate thickness; the plate spans `[-thickness, 0]` in Z (mm).
    pub thickness: f64,
    /// Bottom-edge chamfer; zero disables it (mm).
    pub chamfer: f64,
}

impl Default for RaftConfig {
    fn default() -> Self {
        Self {
            margin: 2.0,
            thickness: 1.5,
            chamfer: 0.4,
        }
    }
}

impl RaftConfig {
    fn validate(&self) -> Result<()> {
        require_non_negative("raft.margin", self.margin)?;
        require_positive("raft.thickness", self.thickness)?;
        require_non_negative("raft.chamfer", self.chamfer)?;
        if self.chamfer >= self.thickness {
            return Err(invalid("raft.chamfer must be smaller than raft.thickness"));
        }
        Ok(())
    }
}

// =============================================================================
// Orientation
// =============================================================================

/// Print orientation of the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    /// Which orientation sequence to apply.
    pub mode: OrientationMode,
    /// Initial Z rotation putting the long axis along X (degrees).
    pub reorient_z_deg: f64,
    /// Lean back about X (degrees).
    pub tilt_x_deg: f64,
    /// Progressive peel tilt about Y (degrees).
    pub tilt_y_deg: f64,
    /// Diagonal peel tilt about Z (degrees).
    pub tilt_z_deg: f64,
    /// Single-wall tilt about X (degrees).
    pub wall_tilt_deg: f64,
    /// Single-wall rotation about Z after the tilt (degrees).
    pub wall_z_tilt_deg: f64,
    /// The display surface faces -Y before orientation.
    pub display_negative_y: bool,
    /// Height of the model's lowest point above the raft (mm).
    pub model_raise: f64,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            mode: OrientationMode::default(),
            reorient_z_deg: -90.0,
            tilt_x_deg: 18.0,
            tilt_y_deg: 5.0,
            tilt_z_deg: 2.0,
            wall_tilt_deg: 18.0,
            wall_z_tilt_deg: 0.0,
            display_negative_y: true,
            model_raise: 3.0,
        }
    }
}

impl OrientationConfig {
    fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("orientation.reorient_z_deg", self.reorient_z_deg),
            ("orientation.tilt_x_deg", self.tilt_x_deg),
            ("orientation.tilt_y_deg", self.tilt_y_deg),
            ("orientation.tilt_z_deg", self.tilt_z_deg),
            ("orientation.wall_tilt_deg", self.wall_tilt_deg),
            ("orientation.wall_z_tilt_deg", self.wall_z_tilt_deg),
        ] {
            if !v.is_finite() {
                return Err(invalid(format!("{name} must be finite")));
            }
        }
        require_non_negative("orientation.model_raise", self.model_raise)
    }
}

// =============================================================================
// Build fit
// =============================================================================

/// Build-volume check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Printer name from the catalogue.
    pub printer: String,
    /// Safety margin on every side (mm).
    pub margin: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            printer: "m7_pro".into(),
            margin: 2.0,
        }
    }
}

impl FitConfig {
    fn validate(&self) -> Result<()> {
        require_non_negative("fit.margin", self.margin)?;
        printer_volume(&self.printer).map(|_| ())
    }
}
