//! Validation and operation errors

use crate::float_types::Real;
use crate::mesh::MeshId;
use nalgebra::Point3;

/// All the possible validation issues we might encounter while building a solid
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A face has fewer than three distinct vertices
    #[error("(TooFewPoints) A face has fewer than 3 distinct vertices near: {0}")]
    TooFewPoints(Point3<Real>),
    /// Two consecutive vertices of a face coincide
    #[error("(RepeatedPoint) Two consecutive vertices are identical at: {0}")]
    RepeatedPoint(Point3<Real>),
    /// All vertices of a face lie on one line, so it has no area and no plane
    #[error("(Collinear) The face has zero area, its vertices are collinear near: {0}")]
    Collinear(Point3<Real>),
    /// A coordinate is NaN or infinite
    #[error("(InvalidCoordinate) The coordinate ({0}) has a NaN or infinite")]
    InvalidCoordinate(Point3<Real>),
    /// A face refers to a vertex the mesh does not have
    #[error("Face index {index} is out of range (points.len = {len})")]
    FaceIndexOutOfRange { index: usize, len: usize },
}

/// Failures of a whole boolean operation. Callers treat every variant as "no change".
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CsgError {
    /// An operand produced no usable polygons
    #[error("operand mesh {0:?} has no valid faces")]
    EmptyOperand(MeshId),
    /// The computed boundary is not watertight
    #[error("result of the operation is not watertight ({open_edges} unmatched edges)")]
    InvalidResult { open_edges: usize },
    /// The model has no mesh with this id
    #[error("mesh {0:?} is not part of the model")]
    UnknownMesh(MeshId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
