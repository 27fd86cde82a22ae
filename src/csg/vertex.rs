//! Vertices shared between the polygons of a solid.

use crate::float_types::Real;
use nalgebra::Point3;

slotmap::new_key_type! {
    /// Stable handle of a vertex minted by a [`crate::context::CsgContext`].
    ///
    /// Two handles are the same vertex only if they compare equal; equal positions
    /// are not enough.
    pub struct VertexKey;
}

/// A vertex record in the context's arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsgVertex {
    pub pos: Point3<Real>,
}

impl CsgVertex {
    /// Create a new [`CsgVertex`]. Non-finite coordinates are sanitised to `0.0`.
    #[inline]
    pub fn new(mut pos: Point3<Real>) -> Self {
        for c in pos.coords.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }
        CsgVertex { pos }
    }

    pub fn distance_to(&self, other: &CsgVertex) -> Real {
        (self.pos - other.pos).norm()
    }
}
