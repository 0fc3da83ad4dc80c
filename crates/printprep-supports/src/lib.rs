#![warn(missing_docs)]

//! Support generation for printing thin-walled building models.
//!
//! This crate takes a multi-panel model through print preparation: it
//! orients the model, picks the faces that need support, places contact
//! points with edge clearance, sorts them into raft-based and model-resting
//! supports, builds tapered supports with angled necks, clips them against
//! the panels and sizes a chamfered raft. A build-volume check closes the
//! run.
//!
//! # Example
//!
//! ```
//! use printprep_kernel::Solid;
//! use printprep_math::{Point3, Vec3};
//! use printprep_supports::{prepare_print, Model, OrientationMode, PrepConfig};
//!
//! let ledge = Solid::cuboid(Point3::origin(), Vec3::new(30.0, 10.0, 2.0)).unwrap();
//! let model = Model::from_solid(ledge).unwrap();
//!
//! let mut config = PrepConfig::default();
//! config.orientation.mode = OrientationMode::RaiseOnly;
//!
//! let job = prepare_print(&model, &config).unwrap();
//! assert!(job.stats.raft_supports > 0);
//! assert!(job.fit.fits);
//! ```

pub mod classify;
pub mod clip;
pub mod cluster;
pub mod collision;
pub mod config;
pub mod contact;
pub mod document;
pub mod error;
pub mod fit;
pub mod model;
pub mod orient;
pub mod pipeline;
pub mod placement;
pub mod raft;
pub mod synth;

pub use classify::{classify_face, classify_faces, summarize, ClassifiedFace, FaceCategory, FaceSummary, WindowBounds};
pub use clip::{clip_supports, exterior_slab, ClipOutcome};
pub use cluster::{cluster_and_nudge, cluster_contacts, nudge_inward};
pub use collision::{detect_collisions, find_support_base, CollisionReport, SupportBase};
pub use config::PrepConfig;
pub use contact::Contact;
pub use document::{export_print, prepare_document, Document, PRINT_OBJECT};
pub use error::{PrepError, Result};
pub use fit::{check_build_fit, printer_names, printer_volume, FitReport};
pub use model::{Model, Panel};
pub use orient::{
    orient_model, prepare_orientation, raise_model, tilt_for_printing, tilted_wall_outward_normal,
    validate_tilt_direction, OrientationMode, PrintOrientation,
};
pub use pipeline::{prepare_print, PipelineStats, PrintJob};
pub use placement::{generate_contacts, plane_height, select_faces, FaceSelection, InteriorSide, PlacementStrategy};
pub use raft::build_raft;
pub use synth::{build_all_supports, build_support, pad_center, SupportShapes, SupportStyle};
