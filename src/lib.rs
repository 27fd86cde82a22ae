//! Boolean **subtraction** of closed polygonal solids, computed directly on their
//! boundary representation.
//!
//! Operands are [`Mesh`]es: indexed vertex arrays plus planar, convex or
//! non-convex faces wound clockwise when seen from outside. Subtraction keeps
//! the original faces wherever they survive, so a cut through a box yields a few
//! large polygons instead of a triangle soup.
//!
//! ```text
//! split  : cut every polygon along its intersections with the other solid
//! classify: label each fragment Inside / Outside / Same / Opposite by ray casting
//! select : keep Outside + Opposite of A, reversed Inside of B
//! merge  : re-join fragments of the same source face into maximal polygons
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon to classify polygons in parallel

#![forbid(unsafe_code)]
#![warn(clippy::approx_constant, clippy::all)]

pub mod classify;
pub mod context;
pub mod csg;
pub mod errors;
pub mod float_types;
pub mod math;
pub mod mesh;
pub mod model;
pub mod operations;
pub mod plane;
pub mod recompose;
pub mod spatial;
pub mod split;
pub mod traits;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use context::CsgContext;
pub use csg::CsgObject;
pub use csg::polygon::{CsgPolygon, FaceProperties, PolygonStatus};
pub use errors::{CsgError, ValidationError};
pub use float_types::Real;
pub use mesh::{Face, Mesh, MeshId};
pub use model::{MeshModel, Model};
pub use operations::{SubtractOutcome, subtract, subtract_mesh_from_model};
pub use spatial::{SpatialIndex, SpatialPartitioner};
pub use traits::CsgOps;
