#![warn(missing_docs)]

//! Plane splitting with pin/socket registration.
//!
//! Large prints are cut into pieces that fit the build volume. Each cut
//! leaves a flat seam; tapered pins on one half and clearance sockets on
//! the other line the pieces up again at assembly.
//!
//! # Example
//!
//! ```
//! use printprep_kernel::Solid;
//! use printprep_math::{Axis, Point3, Vec3};
//! use printprep_split::{split_and_register_axis, RegistrationConfig};
//!
//! let wall = Solid::cuboid(Point3::origin(), Vec3::new(40.0, 10.0, 10.0)).unwrap();
//! let split = split_and_register_axis(&wall, Axis::X, 20.0, &RegistrationConfig::default()).unwrap();
//! assert_eq!(split.pins.len(), 2);
//! assert!(split.negative.volume() > 2000.0);
//! assert!(split.positive.volume() < 2000.0);
//! ```

pub mod error;
pub mod registration;
pub mod split;

pub use error::{Result, SplitError};
pub use registration::{
    add_registration, find_split_face, make_pin, make_socket, pin_positions, split_and_register,
    split_and_register_axis, RegisteredSplit, RegistrationConfig,
};
pub use split::{axis_plane, split_axis, split_plane};
