//! Cutting one polygon into pieces along a [`SegmentDescriptor`].

use crate::context::CsgContext;
use crate::csg::polygon::{CsgPolygon, validate_loop};
use crate::csg::vertex::VertexKey;
use crate::csg::{CsgObject, PolygonKey};
use crate::float_types::Real;
use crate::math::{Projection, distance_to_segment, newell_normal, segments_touch_2d};
use crate::split::segment::{Endpoint, ResolvedIntersection, SegmentDescriptor};
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use tracing::debug;

/// Replacement polygons for `polygon` cut along `descriptor`.
///
/// A chord along an edge only inserts its edge points into that edge and yields a
/// single polygon. A chord through the face yields two polygons whose shared
/// boundary is the cut; an end strictly inside the face is joined to a polygon
/// vertex visible from it so both pieces stay simple. Returns `None` when the
/// descriptor does not change the polygon or when no valid pair of pieces exists.
pub fn polygon_pieces(
    ctx: &mut CsgContext,
    polygon: &CsgPolygon,
    descriptor: &SegmentDescriptor,
) -> Option<Vec<CsgPolygon>> {
    let keys = &polygon.vertices;
    let points = polygon.positions(ctx);
    let start = descriptor.start.resolve(ctx, keys, &points);
    let end = descriptor.end.resolve(ctx, keys, &points);
    if start.vertex == end.vertex {
        return None;
    }

    match descriptor.middle {
        Endpoint::Edge => {
            if start.kind == Endpoint::Vertex && end.kind == Endpoint::Vertex {
                return None;
            }
            let edge = descriptor.middle_edge?;
            let inserts: Vec<(usize, VertexKey)> = [start, end]
                .iter()
                .filter(|r| r.kind != Endpoint::Vertex)
                .map(|r| (edge.0, r.vertex))
                .collect();
            let (ring, _) = insert_on_edges(ctx, keys, &points, &inserts);
            let piece = polygon.derive(ring);
            validate_loop(&piece.positions(ctx), ctx.distance_tolerance()).ok()?;
            Some(vec![piece])
        },
        _ => split_through_face(ctx, polygon, &points, start, end),
    }
}

/// `keys` with every `(edge_start, vertex)` insertion placed inside edge
/// `edge_start → edge_start + 1`, ordered along the edge. Also returns each
/// inserted vertex's index in the new ring.
fn insert_on_edges(
    ctx: &CsgContext,
    keys: &[VertexKey],
    points: &[Point3<Real>],
    inserts: &[(usize, VertexKey)],
) -> (Vec<VertexKey>, HashMap<VertexKey, usize>) {
    let mut ring = Vec::with_capacity(keys.len() + inserts.len());
    let mut placed = HashMap::new();
    for (i, &key) in keys.iter().enumerate() {
        ring.push(key);
        let mut on_edge: Vec<(Real, VertexKey)> = inserts
            .iter()
            .filter(|(edge_start, _)| *edge_start == i)
            .map(|&(_, v)| ((ctx.position(v) - points[i]).norm(), v))
            .collect();
        on_edge.sort_by(|a, b| a.0.total_cmp(&b.0));
        on_edge.dedup_by_key(|(_, v)| *v);
        for (_, v) in on_edge {
            placed.insert(v, ring.len());
            ring.push(v);
        }
    }
    (ring, placed)
}

fn split_through_face(
    ctx: &CsgContext,
    polygon: &CsgPolygon,
    points: &[Point3<Real>],
    start: ResolvedIntersection,
    end: ResolvedIntersection,
) -> Option<Vec<CsgPolygon>> {
    let tolerance = ctx.distance_tolerance();
    let inserts: Vec<(usize, VertexKey)> = [start, end]
        .iter()
        .filter(|r| r.kind == Endpoint::Edge)
        .filter_map(|r| r.edge.map(|(i, _)| (i, r.vertex)))
        .collect();
    let (ring, _) = insert_on_edges(ctx, &polygon.vertices, points, &inserts);
    let ring_points = ctx.positions(&ring);
    let anchor = |r: &ResolvedIntersection| {
        (r.kind != Endpoint::Face)
            .then(|| ring.iter().position(|&k| k == r.vertex))
            .flatten()
    };
    let start_anchor = anchor(&start);
    let end_anchor = anchor(&end);
    if (start.kind != Endpoint::Face && start_anchor.is_none())
        || (end.kind != Endpoint::Face && end_anchor.is_none())
    {
        return None;
    }

    let start_pos = ctx.position(start.vertex);
    let end_pos = ctx.position(end.vertex);
    let direction = end_pos - start_pos;
    if direction.norm() <= tolerance {
        return None;
    }
    let direction = direction.normalize();
    let reference = newell_normal(points);
    let projection = Projection::for_normal(&reference);
    let original_area = reference.norm() * 0.5;
    let perimeter: Real = (0..ring_points.len())
        .map(|i| (ring_points[(i + 1) % ring_points.len()] - ring_points[i]).norm())
        .sum();

    let start_options: Vec<Option<usize>> = match start_anchor {
        Some(_) => vec![None],
        None => connector_candidates(&ring_points, &start_pos, &-direction, end_anchor)
            .into_iter()
            .map(Some)
            .collect(),
    };
    let end_options: Vec<Option<usize>> = match end_anchor {
        Some(_) => vec![None],
        None => connector_candidates(&ring_points, &end_pos, &direction, start_anchor)
            .into_iter()
            .map(Some)
            .collect(),
    };

    for start_link in &start_options {
        for end_link in &end_options {
            let a = start_anchor.or(*start_link)?;
            let b = end_anchor.or(*end_link)?;
            if a == b {
                continue;
            }
            if let Some(link) = start_link {
                if !connector_is_clear(&ring_points, &projection, &start_pos, *link, tolerance)
                    || distance_to_segment(&end_pos, &start_pos, &ring_points[*link]) <= tolerance
                {
                    continue;
                }
            }
            if let Some(link) = end_link {
                if !connector_is_clear(&ring_points, &projection, &end_pos, *link, tolerance)
                    || distance_to_segment(&start_pos, &end_pos, &ring_points[*link]) <= tolerance
                {
                    continue;
                }
            }
            if let (Some(s), Some(e)) = (start_link, end_link) {
                if segments_touch_2d(
                    &projection.project(&start_pos),
                    &projection.project(&ring_points[*s]),
                    &projection.project(&end_pos),
                    &projection.project(&ring_points[*e]),
                    tolerance,
                ) {
                    continue;
                }
            }

            let mut interior = Vec::with_capacity(2);
            if start_link.is_some() {
                interior.push(start.vertex);
            }
            if end_link.is_some() {
                interior.push(end.vertex);
            }
            let mut first = ring_walk(&ring, a, b);
            first.extend(interior.iter().rev().copied());
            let mut second = ring_walk(&ring, b, a);
            second.extend(interior.iter().copied());

            let pieces = [polygon.derive(first), polygon.derive(second)];
            if pieces_are_valid(ctx, &pieces, &reference, original_area, perimeter) {
                debug!(
                    start = ?start.kind,
                    end = ?end.kind,
                    first = pieces[0].len(),
                    second = pieces[1].len(),
                    "split polygon through its face"
                );
                return Some(pieces.into());
            }
        }
    }
    None
}

/// Ring indices `from..=to`, walking forward and wrapping around.
fn ring_walk(ring: &[VertexKey], from: usize, to: usize) -> Vec<VertexKey> {
    let n = ring.len();
    let mut out = Vec::new();
    let mut i = from;
    loop {
        out.push(ring[i]);
        if i == to {
            break;
        }
        i = (i + 1) % n;
    }
    out
}

/// Ring vertices ordered by how well they continue `preferred` from `from`; ties
/// go to the lower ring index. `exclude` is never offered.
fn connector_candidates(
    ring: &[Point3<Real>],
    from: &Point3<Real>,
    preferred: &Vector3<Real>,
    exclude: Option<usize>,
) -> Vec<usize> {
    let mut scored: Vec<(i64, usize)> = ring
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != exclude)
        .filter_map(|(i, p)| {
            let offset = p - from;
            let len = offset.norm();
            (len > 0.0).then(|| {
                let cosine = offset.dot(preferred) / len;
                (-(cosine * 1e9).round() as i64, i)
            })
        })
        .collect();
    scored.sort();
    scored.into_iter().map(|(_, i)| i).collect()
}

/// `true` when the segment from `from` to ring vertex `target` touches no ring
/// edge other than the two meeting at `target`.
fn connector_is_clear(
    ring: &[Point3<Real>],
    projection: &Projection,
    from: &Point3<Real>,
    target: usize,
    tolerance: Real,
) -> bool {
    let n = ring.len();
    let p = projection.project(from);
    let q = projection.project(&ring[target]);
    (0..n)
        .filter(|&i| i != target && (i + 1) % n != target)
        .all(|i| {
            !segments_touch_2d(
                &p,
                &q,
                &projection.project(&ring[i]),
                &projection.project(&ring[(i + 1) % n]),
                tolerance,
            )
        })
}

fn pieces_are_valid(
    ctx: &CsgContext,
    pieces: &[CsgPolygon],
    reference: &Vector3<Real>,
    original_area: Real,
    perimeter: Real,
) -> bool {
    let tolerance = ctx.distance_tolerance();
    let mut area = 0.0;
    for piece in pieces {
        let points = piece.positions(ctx);
        if validate_loop(&points, tolerance).is_err() {
            return false;
        }
        let normal = newell_normal(&points);
        if normal.dot(reference) <= 0.0 {
            return false;
        }
        area += normal.norm() * 0.5;
    }
    (area - original_area).abs() <= tolerance * perimeter
}

/// Replace the polygon `key` of `solid` by its pieces along `descriptor`.
///
/// Returns the keys of the pieces, or `None` when the descriptor leaves the
/// polygon as it is.
pub fn split_poly_on_segment(
    ctx: &mut CsgContext,
    solid: &mut CsgObject,
    key: PolygonKey,
    descriptor: &SegmentDescriptor,
) -> Option<Vec<PolygonKey>> {
    let Some(polygon) = solid.polygon(key) else {
        debug_assert!(false, "splitting polygon {key:?} that is not part of the solid");
        return None;
    };
    let pieces = polygon_pieces(ctx, polygon, descriptor)?;
    solid.remove_polygon(key);
    Some(pieces.into_iter().map(|piece| solid.add_polygon(piece)).collect())
}

/// Check that `pieces` partition `original`: equal total area, consistent
/// orientation, and every edge either shared by two pieces in opposite
/// directions or lying on the original boundary, which they cover exactly.
pub fn is_valid_polygon_split(ctx: &CsgContext, original: &CsgPolygon, pieces: &[CsgPolygon]) -> bool {
    let tolerance = ctx.distance_tolerance();
    let reference = newell_normal(&original.positions(ctx));
    let boundary = original.positions(ctx);
    let n = boundary.len();
    let perimeter: Real = (0..n).map(|i| (boundary[(i + 1) % n] - boundary[i]).norm()).sum();

    let mut area = 0.0;
    let mut edges: HashMap<(VertexKey, VertexKey), i32> = HashMap::new();
    for piece in pieces {
        let points = piece.positions(ctx);
        let normal = newell_normal(&points);
        if normal.dot(&reference) <= 0.0 {
            return false;
        }
        area += normal.norm() * 0.5;
        for edge in piece.edges() {
            *edges.entry(edge).or_insert(0) += 1;
        }
    }
    if (area - reference.norm() * 0.5).abs() > tolerance * perimeter.max(1.0) {
        return false;
    }

    let mut covered = 0.0;
    for (&(a, b), &count) in &edges {
        let reverse = edges.get(&(b, a)).copied().unwrap_or(0);
        if count == reverse {
            continue;
        }
        if count - reverse != 1 {
            return false;
        }
        let (pa, pb) = (ctx.position(a), ctx.position(b));
        let on_boundary = (0..n).any(|i| {
            let (s, e) = (&boundary[i], &boundary[(i + 1) % n]);
            distance_to_segment(&pa, s, e) <= tolerance
                && distance_to_segment(&pb, s, e) <= tolerance
                && (pb - pa).dot(&(e - s)) > 0.0
        });
        if !on_boundary {
            return false;
        }
        covered += (pb - pa).norm();
    }
    (covered - perimeter).abs() <= tolerance * (n as Real)
}
