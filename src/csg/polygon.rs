//! Struct and functions for working with planar `CsgPolygon`s.

use crate::context::CsgContext;
use crate::csg::vertex::VertexKey;
use crate::errors::ValidationError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::math::{barycenter, interior_point, newell_normal, point_in_polygon};
use crate::plane::Plane;
use nalgebra::{Point3, Vector3};
use std::sync::OnceLock;

/// Opaque per-face data carried unchanged through every split and merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FaceProperties {
    pub material_id: i32,
}

impl FaceProperties {
    pub const fn new(material_id: i32) -> Self {
        FaceProperties { material_id }
    }
}

/// Result of classifying a polygon against a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonStatus {
    #[default]
    Unknown,
    Inside,
    Outside,
    /// Coplanar with a polygon of the other solid, same orientation
    Same,
    /// Coplanar with a polygon of the other solid, opposite orientation
    Opposite,
}

/// A planar, simple polygon of a solid's boundary.
///
/// `vertices` is a cyclic loop, clockwise when viewed from outside the solid.
/// Plane, barycenter, interior point and bounds are computed on first use from the positions held
/// by the [`CsgContext`] that minted the vertices, and never change afterwards.
#[derive(Debug, Clone)]
pub struct CsgPolygon {
    pub vertices: Vec<VertexKey>,
    pub properties: FaceProperties,
    pub status: PolygonStatus,
    /// Index of the mesh face this polygon (or the polygon it was split from) came from
    pub source_face: usize,

    plane: OnceLock<Plane>,
    barycenter: OnceLock<Point3<Real>>,
    interior_point: OnceLock<Point3<Real>>,
    bounding_box: OnceLock<Aabb>,
}

impl CsgPolygon {
    pub fn new(vertices: Vec<VertexKey>, properties: FaceProperties, source_face: usize) -> Self {
        debug_assert!(vertices.len() >= 3, "degenerate polygon");
        CsgPolygon {
            vertices,
            properties,
            status: PolygonStatus::Unknown,
            source_face,
            plane: OnceLock::new(),
            barycenter: OnceLock::new(),
            interior_point: OnceLock::new(),
            bounding_box: OnceLock::new(),
        }
    }

    /// A polygon cut from this one: same face properties and origin, fresh caches.
    pub fn derive(&self, vertices: Vec<VertexKey>) -> Self {
        CsgPolygon::new(vertices, self.properties, self.source_face)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn positions(&self, ctx: &CsgContext) -> Vec<Point3<Real>> {
        ctx.positions(&self.vertices)
    }

    /// Supporting plane, normal pointing out of the solid.
    pub fn plane(&self, ctx: &CsgContext) -> Plane {
        *self.plane.get_or_init(|| {
            let points = self.positions(ctx);
            // clockwise from outside => the right-hand normal points inwards
            let normal = -newell_normal(&points);
            let normal = if normal.norm_squared() > 0.0 {
                normal.normalize()
            } else {
                Vector3::z()
            };
            Plane::from_normal_and_point(normal, &barycenter(&points))
        })
    }

    pub fn normal(&self, ctx: &CsgContext) -> Vector3<Real> {
        self.plane(ctx).normal
    }

    /// Mean of the vertex positions.
    pub fn barycenter(&self, ctx: &CsgContext) -> Point3<Real> {
        *self
            .barycenter
            .get_or_init(|| barycenter(&self.positions(ctx)))
    }

    /// A point strictly inside the polygon, away from its boundary. Same as the
    /// barycenter whenever that lies inside, which is always the case for convex
    /// polygons.
    pub fn interior_point(&self, ctx: &CsgContext) -> Point3<Real> {
        *self.interior_point.get_or_init(|| {
            let points = self.positions(ctx);
            interior_point(&points, &self.normal(ctx), ctx.distance_tolerance())
                .unwrap_or_else(|| barycenter(&points))
        })
    }

    pub fn bounding_box(&self, ctx: &CsgContext) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for &key in &self.vertices {
                let pos = ctx.position(key);
                mins.x = mins.x.min(pos.x);
                mins.y = mins.y.min(pos.y);
                mins.z = mins.z.min(pos.z);
                maxs.x = maxs.x.max(pos.x);
                maxs.y = maxs.y.max(pos.y);
                maxs.z = maxs.z.max(pos.z);
            }
            Aabb::new(mins, maxs)
        })
    }

    /// Area of the polygon.
    pub fn area(&self, ctx: &CsgContext) -> Real {
        newell_normal(&self.positions(ctx)).norm() * 0.5
    }

    /// `1` inside, `-1` outside, `0` on the boundary, for a point coplanar with the polygon.
    pub fn is_inside(&self, ctx: &CsgContext, point: &Point3<Real>) -> i8 {
        point_in_polygon(
            &self.positions(ctx),
            &self.normal(ctx),
            point,
            ctx.distance_tolerance(),
        )
    }

    /// Directed edges `(from, to)` of the loop.
    pub fn edges(&self) -> impl Iterator<Item = (VertexKey, VertexKey)> + '_ {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
            .map(|(&a, &b)| (a, b))
    }

    /// Reverse the winding, turning the polygon inside out.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        if let Some(plane) = self.plane.get_mut() {
            plane.flip();
        }
    }

    pub fn flipped(&self) -> Self {
        let mut poly = self.clone();
        poly.flip();
        poly
    }
}

/// Check that `points` describe a usable polygon: at least three finite, distinct,
/// non-collinear positions with no two consecutive ones within `tolerance`.
pub fn validate_loop(points: &[Point3<Real>], tolerance: Real) -> Result<(), ValidationError> {
    let first = points.first().copied().unwrap_or_else(Point3::origin);
    if points.len() < 3 {
        return Err(ValidationError::TooFewPoints(first));
    }
    if let Some(bad) = points
        .iter()
        .find(|p| p.coords.iter().any(|c| !c.is_finite()))
    {
        return Err(ValidationError::InvalidCoordinate(*bad));
    }
    let n = points.len();
    for i in 0..n {
        if (points[(i + 1) % n] - points[i]).norm() <= tolerance {
            return Err(ValidationError::RepeatedPoint(points[i]));
        }
    }
    let longest_edge = (0..n)
        .map(|i| (points[(i + 1) % n] - points[i]).norm())
        .fold(0.0, Real::max);
    // twice the area must exceed a sliver of tolerance width along the longest edge
    if newell_normal(points).norm() <= tolerance * longest_edge {
        return Err(ValidationError::Collinear(first));
    }
    Ok(())
}
