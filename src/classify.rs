//! Inside/outside classification of polygons against a solid by ray casting.

use crate::context::CsgContext;
use crate::csg::CsgObject;
use crate::csg::polygon::{CsgPolygon, PolygonStatus};
use crate::float_types::Real;
use crate::plane::ray_plane_intersection;
use nalgebra::{Point3, Vector3};
use std::cmp::Ordering;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A crossing of the classification ray with one target polygon.
#[derive(Debug, Clone, Copy)]
struct RayHit {
    t: Real,
    /// `normal · direction` of the crossed polygon
    facing: Real,
    /// Result of the target polygon's inside test at the hit point
    inside: i8,
    barycenter: Point3<Real>,
    /// Where a retried ray aims at this polygon
    anchor: Point3<Real>,
}

enum Cast {
    Miss,
    Hit(PolygonStatus),
    /// Nearest crossings that disagree or touch a polygon boundary, in
    /// deterministic order
    Ambiguous(Vec<RayHit>),
}

fn lexicographic(a: &Point3<Real>, b: &Point3<Real>) -> Ordering {
    a.x.total_cmp(&b.x)
        .then(a.y.total_cmp(&b.y))
        .then(a.z.total_cmp(&b.z))
}

fn status_for(facing: Real) -> PolygonStatus {
    // leaving the target through its boundary means we started inside it
    if facing > 0.0 {
        PolygonStatus::Inside
    } else {
        PolygonStatus::Outside
    }
}

fn cast(
    ctx: &CsgContext,
    origin: &Point3<Real>,
    direction: &Vector3<Real>,
    target: &CsgObject,
) -> Cast {
    let tolerance = ctx.distance_tolerance();
    let mut hits: Vec<RayHit> = Vec::new();
    for poly in target.polygons.values() {
        let plane = poly.plane(ctx);
        let facing = plane.normal.dot(direction);
        if facing.abs() <= ctx.angle_tolerance() {
            continue;
        }
        let t = -plane.signed_distance(origin) / facing;
        if t <= tolerance {
            continue;
        }
        let hit = ray_plane_intersection(origin, direction, &plane);
        let inside = poly.is_inside(ctx, &hit);
        if inside < 0 {
            continue;
        }
        hits.push(RayHit {
            t,
            facing,
            inside,
            barycenter: poly.barycenter(ctx),
            anchor: poly.interior_point(ctx),
        });
    }

    let Some(nearest) = hits.iter().map(|h| h.t).min_by(|a, b| a.total_cmp(b)) else {
        return Cast::Miss;
    };
    let mut ties: Vec<RayHit> = hits
        .into_iter()
        .filter(|h| h.t - nearest <= tolerance)
        .collect();
    ties.sort_by(|a, b| lexicographic(&a.barycenter, &b.barycenter));

    let clean = ties.iter().all(|h| h.inside > 0);
    let agree = ties
        .iter()
        .all(|h| (h.facing > 0.0) == (ties[0].facing > 0.0));
    if clean && agree {
        Cast::Hit(status_for(ties[0].facing))
    } else {
        Cast::Ambiguous(ties)
    }
}

/// Coplanar status of `polygon` against `target`, if some target polygon shares
/// its plane and contains its interior point.
fn coplanar_status(ctx: &CsgContext, polygon: &CsgPolygon, target: &CsgObject) -> Option<PolygonStatus> {
    let plane = polygon.plane(ctx);
    let inner = polygon.interior_point(ctx);
    let tolerance = ctx.distance_tolerance();

    let mut matches: Vec<(i8, Point3<Real>, Real)> = target
        .polygons
        .values()
        .filter_map(|other| {
            let other_plane = other.plane(ctx);
            if !other_plane.is_parallel_to(&plane, ctx.angle_tolerance())
                || other_plane.signed_distance(&inner).abs() > tolerance
            {
                return None;
            }
            let inside = other.is_inside(ctx, &inner);
            (inside >= 0).then(|| (inside, other.barycenter(ctx), other_plane.normal.dot(&plane.normal)))
        })
        .collect();
    matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| lexicographic(&a.1, &b.1)));

    matches.first().map(|&(_, _, alignment)| {
        if alignment > 0.0 {
            PolygonStatus::Same
        } else {
            PolygonStatus::Opposite
        }
    })
}

/// Classify `polygon` against the closed solid `target`.
///
/// Rays and the coplanar test start from [`CsgPolygon::interior_point`], the
/// barycenter unless a non-convex fragment puts that on or outside its own
/// boundary. A polygon lying in the plane of a target polygon that contains this
/// point is [`PolygonStatus::Same`] or [`PolygonStatus::Opposite`] depending on
/// orientation. Otherwise a ray is cast from it along the outward normal; the
/// nearest target polygon it crosses decides between inside and outside. When
/// the nearest crossing grazes a boundary or several polygons disagree, the ray
/// is cast again towards the first of them in lexicographic barycenter order, so
/// the result does not depend on the order of the target's polygons.
pub fn classify_polygon_using_raycast(
    ctx: &CsgContext,
    polygon: &CsgPolygon,
    target: &CsgObject,
) -> PolygonStatus {
    if let Some(status) = coplanar_status(ctx, polygon, target) {
        return status;
    }

    let origin = polygon.interior_point(ctx);
    let direction = polygon.normal(ctx);
    let ties = match cast(ctx, &origin, &direction, target) {
        Cast::Miss => return PolygonStatus::Outside,
        Cast::Hit(status) => return status,
        Cast::Ambiguous(ties) => ties,
    };

    let first = ties[0];
    let towards = first.anchor - origin;
    if towards.norm() > ctx.distance_tolerance() {
        match cast(ctx, &origin, &towards.normalize(), target) {
            Cast::Hit(status) => return status,
            Cast::Miss => {
                debug!("retry ray missed the target, using the first grazing hit");
            },
            Cast::Ambiguous(retry) => {
                debug!(hits = retry.len(), "retry ray still ambiguous");
                return status_for(retry[0].facing);
            },
        }
    }
    status_for(first.facing)
}

/// Classify every polygon of `solid` against `target`, storing the result in
/// each polygon's `status`.
pub fn classify_object(ctx: &CsgContext, solid: &mut CsgObject, target: &CsgObject) {
    #[cfg(not(feature = "parallel"))]
    let statuses: Vec<_> = solid
        .polygons
        .iter()
        .map(|(key, poly)| (key, classify_polygon_using_raycast(ctx, poly, target)))
        .collect();

    #[cfg(feature = "parallel")]
    let statuses: Vec<_> = {
        let polys: Vec<_> = solid.polygons.iter().collect();
        polys
            .into_par_iter()
            .map(|(key, poly)| (key, classify_polygon_using_raycast(ctx, poly, target)))
            .collect()
    };

    for (key, status) in statuses {
        solid.polygons[key].status = status;
    }
    debug!(
        inside = solid.count_status(PolygonStatus::Inside),
        outside = solid.count_status(PolygonStatus::Outside),
        same = solid.count_status(PolygonStatus::Same),
        opposite = solid.count_status(PolygonStatus::Opposite),
        "classified object"
    );
}
