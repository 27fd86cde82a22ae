//! Polygon splitting: aligning one solid's boundary with another's.
//!
//! Splitting a polygon by a second polygon cuts it along the part of their common
//! line that lies inside both. New vertices come from the shared
//! [`CsgContext`], so two polygons cut at the same place end up sharing vertices
//! and the solid stays watertight.

use crate::context::CsgContext;
use crate::csg::polygon::CsgPolygon;
use crate::csg::{CsgObject, PolygonKey};
use crate::float_types::parry3d::bounding_volume::BoundingVolume;
use crate::float_types::Real;
use tracing::{debug, warn};

pub mod polygon_split;
pub mod segment;

pub use polygon_split::{is_valid_polygon_split, polygon_pieces, split_poly_on_segment};
pub use segment::{
    Endpoint, ObservedIntersection, ResolvedIntersection, SegmentDescriptor,
    calc_segment_descriptor,
};

/// Upper bound on successive cuts of one polygon by one cutting polygon.
const MAX_SPLITS_PER_PAIR: usize = 64;

/// Descriptors of the cuts `split_by` makes in `polygon`: each chord of `polygon`
/// along the line shared by both planes, trimmed to the part that also crosses
/// `split_by`.
///
/// Empty when the polygons are apart, do not cross, or are coplanar. Coplanar
/// overlap is settled by classification.
pub fn cut_descriptors(
    ctx: &CsgContext,
    polygon: &CsgPolygon,
    split_by: &CsgPolygon,
) -> Vec<SegmentDescriptor> {
    let tolerance = ctx.distance_tolerance();
    if !polygon
        .bounding_box(ctx)
        .loosened(tolerance)
        .intersects(&split_by.bounding_box(ctx))
    {
        return Vec::new();
    }

    let cutting_plane = split_by.plane(ctx);
    let distances: Vec<Real> = polygon
        .positions(ctx)
        .iter()
        .map(|p| cutting_plane.signed_distance(p))
        .collect();
    if one_sided(&distances, tolerance) {
        return Vec::new();
    }

    let own_plane = polygon.plane(ctx);
    let cutter_distances: Vec<Real> = split_by
        .positions(ctx)
        .iter()
        .map(|p| own_plane.signed_distance(p))
        .collect();
    if one_sided(&cutter_distances, tolerance) {
        return Vec::new();
    }

    let Some((origin, direction)) = own_plane.intersection_line(&cutting_plane, ctx.angle_tolerance())
    else {
        return Vec::new();
    };
    let own_chords = calc_segment_descriptor(ctx, &origin, &direction, &distances, polygon);
    if own_chords.is_empty() {
        return Vec::new();
    }
    let cutter_chords = calc_segment_descriptor(ctx, &origin, &direction, &cutter_distances, split_by);

    own_chords
        .iter()
        .flat_map(|chord| {
            cutter_chords
                .iter()
                .filter_map(move |cutter| chord.overlap(cutter, tolerance))
        })
        .collect()
}

/// Pieces of `polygon` cut by `split_by`, or `None` when `split_by` does not cut it.
pub fn split_fragment(
    ctx: &mut CsgContext,
    polygon: &CsgPolygon,
    split_by: &CsgPolygon,
) -> Option<Vec<CsgPolygon>> {
    cut_descriptors(ctx, polygon, split_by)
        .iter()
        .find_map(|descriptor| polygon_pieces(ctx, polygon, descriptor))
}

/// `true` when every distance is beyond `tolerance` on the same side, or every
/// distance is within it (coplanar).
fn one_sided(distances: &[Real], tolerance: Real) -> bool {
    distances.iter().all(|&d| d > tolerance)
        || distances.iter().all(|&d| d < -tolerance)
        || distances.iter().all(|&d| d.abs() <= tolerance)
}

/// Cut `polygon` by `split_by` until no cut applies, returning the fragments, or
/// `None` when it was not cut at all.
fn fragment_against(
    ctx: &mut CsgContext,
    polygon: &CsgPolygon,
    split_by: &CsgPolygon,
) -> Option<Vec<CsgPolygon>> {
    let mut pending = vec![polygon.clone()];
    let mut done = Vec::new();
    let mut splits = 0;
    while let Some(fragment) = pending.pop() {
        if splits >= MAX_SPLITS_PER_PAIR {
            warn!(limit = MAX_SPLITS_PER_PAIR, "split limit reached, keeping fragments as they are");
            done.push(fragment);
            continue;
        }
        match split_fragment(ctx, &fragment, split_by) {
            Some(pieces) => {
                splits += 1;
                pending.extend(pieces);
            },
            None => done.push(fragment),
        }
    }
    (splits > 0).then_some(done)
}

/// Split the polygon `key` of `solid` by `split_by` in place, cutting the
/// resulting pieces again until `split_by` no longer cuts any of them.
///
/// Returns whether the polygon was replaced.
pub fn split_polys(
    ctx: &mut CsgContext,
    solid: &mut CsgObject,
    key: PolygonKey,
    split_by: &CsgPolygon,
) -> bool {
    if !solid.contains(key) {
        debug_assert!(false, "splitting polygon {key:?} that is not part of the solid");
        return false;
    }
    let mut pending = vec![key];
    let mut splits = 0;
    while let Some(current) = pending.pop() {
        if splits >= MAX_SPLITS_PER_PAIR {
            warn!(limit = MAX_SPLITS_PER_PAIR, "split limit reached, keeping fragments as they are");
            break;
        }
        let descriptors = match solid.polygon(current) {
            Some(polygon) => cut_descriptors(ctx, polygon, split_by),
            None => continue,
        };
        for descriptor in &descriptors {
            if let Some(pieces) = split_poly_on_segment(ctx, solid, current, descriptor) {
                splits += 1;
                pending.extend(pieces);
                break;
            }
        }
    }
    if splits > 0 {
        solid.prune_vertices();
    }
    splits > 0
}

/// Polygon replacements collected during a split pass and committed afterwards.
///
/// `apply` consumes the set, so a pass cannot be committed twice.
#[derive(Debug, Default)]
#[must_use = "a change set does nothing until applied"]
pub struct ChangeSet {
    removals: Vec<PolygonKey>,
    insertions: Vec<CsgPolygon>,
}

impl ChangeSet {
    /// Stage replacing polygon `key` by `pieces`.
    pub fn replace(&mut self, key: PolygonKey, pieces: Vec<CsgPolygon>) {
        debug_assert!(!self.removals.contains(&key), "polygon {key:?} replaced twice");
        self.removals.push(key);
        self.insertions.extend(pieces);
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty()
    }

    /// Number of polygons staged for removal.
    pub fn len(&self) -> usize {
        self.removals.len()
    }

    /// Commit to `solid`, returning the number of polygons replaced. A set staged
    /// against another solid is rejected as a whole.
    pub fn apply(self, solid: &mut CsgObject) -> usize {
        if let Some(missing) = self.removals.iter().find(|&&key| !solid.contains(key)) {
            debug_assert!(false, "change set refers to polygon {missing:?} not in the solid");
            return 0;
        }
        for &key in &self.removals {
            solid.remove_polygon(key);
        }
        for polygon in self.insertions {
            solid.add_polygon(polygon);
        }
        solid.prune_vertices();
        self.removals.len()
    }
}

/// Split every polygon of `a` against every polygon of `b` whose bounds it
/// overlaps. Call it in both directions to align two solids along their
/// intersection curve.
pub fn split_object(ctx: &mut CsgContext, a: &mut CsgObject, b: &CsgObject) {
    let tolerance = ctx.distance_tolerance();
    let cutters: Vec<(&CsgPolygon, _)> = b
        .polygons
        .values()
        .map(|q| (q, q.bounding_box(ctx)))
        .collect();
    let mut changes = ChangeSet::default();

    for key in a.polygon_keys() {
        let original = &a.polygons[key];
        let bounds = original.bounding_box(ctx).loosened(tolerance);
        let mut fragments = vec![original.clone()];
        let mut changed = false;
        for &(cutter, _) in cutters.iter().filter(|(_, bb)| bounds.intersects(bb)) {
            let mut next = Vec::with_capacity(fragments.len());
            for fragment in fragments {
                match fragment_against(ctx, &fragment, cutter) {
                    Some(pieces) => {
                        changed = true;
                        next.extend(pieces);
                    },
                    None => next.push(fragment),
                }
            }
            fragments = next;
        }
        if changed {
            changes.replace(key, fragments);
        }
    }

    let before = a.len();
    let replaced = changes.apply(a);
    debug!(replaced, before, after = a.len(), "split object");
}
