//! Planes and the handful of plane queries the kernel is built on.
//!
//! A plane is stored as a unit normal `n` and an offset `w`, so that every point
//! `p` on it satisfies `n · p = w`. Normals follow the winding of the polygon
//! they were computed from (see [`crate::math::newell_normal`]).

use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// An oriented plane `normal · p = w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal vector of the plane
    pub normal: Vector3<Real>,
    /// Distance from origin along normal
    pub w: Real,
}

impl Plane {
    /// Create a new plane from a normal (normalized here) and an offset.
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Self {
        Plane {
            normal: normal.normalize(),
            w,
        }
    }

    /// Create the plane with unit normal `normal` passing through `point`.
    pub fn from_normal_and_point(normal: Vector3<Real>, point: &Point3<Real>) -> Self {
        let normal = normal.normalize();
        Plane {
            normal,
            w: normal.dot(&point.coords),
        }
    }

    /// Get the plane normal
    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    /// Get the offset (distance from origin)
    pub const fn offset(&self) -> Real {
        self.w
    }

    /// Flip the plane (reverse normal and distance)
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Return a flipped copy of this plane
    pub fn flipped(&self) -> Self {
        Plane {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Signed distance of `point` to the plane, positive on the side the normal points to.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.w
    }

    /// The point of the plane closest to the origin.
    ///
    /// Any point of the plane would do; this one is stable for a given plane and
    /// serves as the anchor for distance queries.
    pub fn point_on_plane(&self) -> Point3<Real> {
        Point3::from(self.normal * (self.w / self.normal.norm_squared()))
    }

    /// `true` when both planes are parallel (either orientation) within `angle_tolerance`,
    /// expressed as the sine of the angle between their normals.
    pub fn is_parallel_to(&self, other: &Plane, angle_tolerance: Real) -> bool {
        self.normal.cross(&other.normal).norm() <= angle_tolerance
    }

    /// `true` when both planes are the same unoriented plane: parallel, and `other`'s
    /// anchor point lies on `self` within `distance_tolerance`.
    pub fn is_coincident_with(
        &self,
        other: &Plane,
        distance_tolerance: Real,
        angle_tolerance: Real,
    ) -> bool {
        self.is_parallel_to(other, angle_tolerance)
            && self.signed_distance(&other.point_on_plane()).abs() <= distance_tolerance
    }

    /// Line shared by two planes, as `(origin, unit direction)` with
    /// `direction = self.normal × other.normal`.
    ///
    /// Returns `None` for (near) parallel planes.
    pub fn intersection_line(
        &self,
        other: &Plane,
        angle_tolerance: Real,
    ) -> Option<(Point3<Real>, Vector3<Real>)> {
        let direction = self.normal.cross(&other.normal);
        let norm_sq = direction.norm_squared();
        if norm_sq.sqrt() <= angle_tolerance {
            return None;
        }
        // p = (w1 (n2 × u) + w2 (u × n1)) / |u|² satisfies both plane equations
        let origin = (other.normal.cross(&direction) * self.w
            + direction.cross(&self.normal) * other.w)
            / norm_sq;
        Some((Point3::from(origin), direction / norm_sq.sqrt()))
    }
}

/// Intersect the ray `origin + t·direction` with `plane`.
///
/// If `origin` already lies on the plane it is returned unchanged. The ray must not be
/// parallel to the plane (`direction · normal ≠ 0`); callers guard that case, and a
/// parallel ray yields `origin` rather than a division by zero.
pub fn ray_plane_intersection(
    origin: &Point3<Real>,
    direction: &Vector3<Real>,
    plane: &Plane,
) -> Point3<Real> {
    let distance = plane.signed_distance(origin);
    if distance == 0.0 {
        return *origin;
    }
    let denom = plane.normal.dot(direction);
    if denom == 0.0 {
        debug_assert!(false, "ray_plane_intersection called with a ray parallel to the plane");
        return *origin;
    }
    origin - direction * (distance / denom)
}
