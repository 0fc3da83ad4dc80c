#![warn(missing_docs)]

//! Solid geometry kernel for print preparation.
//!
//! Solids are unions of interior-disjoint convex polytopes. That keeps
//! every boolean exact up to floating-point tolerance: intersecting and
//! subtracting convex pieces only ever needs half-space clipping.
//!
//! The kernel provides what the support pipeline and the splitter need:
//! primitive constructors, booleans, bounding boxes, boundary faces with
//! normals, areas and centroids, point and segment distance queries, rigid
//! transforms, edge chamfers, tessellation and binary STL export.
//!
//! # Example
//!
//! ```
//! use printprep_kernel::Solid;
//! use printprep_math::{Point3, Vec3};
//!
//! let wall = Solid::cuboid(Point3::origin(), Vec3::new(20.0, 1.2, 30.0)).unwrap();
//! let window = Solid::cuboid(Point3::new(5.0, -1.0, 10.0), Vec3::new(6.0, 4.0, 8.0)).unwrap();
//! let panel = wall.difference(&window).unwrap();
//! assert!((panel.volume() - (720.0 - 57.6)).abs() < 1e-6);
//! ```

mod bbox;
mod boolean;
mod boundary;
mod chamfer;
mod distance;
mod error;
pub mod export;
mod face;
mod mesh;
mod piece;
mod primitives;
mod solid;

pub use bbox::Aabb3;
pub use boundary::BoundaryFace;
pub use chamfer::Edge;
pub use error::{KernelError, KernelResult};
pub use face::Face;
pub use mesh::TriangleMesh;
pub use solid::Solid;
