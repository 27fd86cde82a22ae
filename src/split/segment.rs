//! Where the line shared by two planes crosses a polygon.
//!
//! A polygon cut by the plane of another polygon is crossed by their common line
//! along zero or more chords. Each chord is reported as a [`SegmentDescriptor`]:
//! its two ends and its middle, each classified as lying on a polygon vertex, in
//! the interior of an edge, or in the interior of the face.

use crate::context::CsgContext;
use crate::csg::polygon::CsgPolygon;
use crate::csg::vertex::VertexKey;
use crate::float_types::Real;
use crate::math::{distance_to_segment, point_in_polygon};
use nalgebra::{Point3, Vector3};

/// Where an intersection point lies relative to a polygon's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// On one of the polygon's vertices
    Vertex,
    /// In the interior of one of its edges
    Edge,
    /// Strictly inside the polygon
    Face,
}

/// An intersection point as seen against the polygon before it is split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservedIntersection {
    pub kind: Endpoint,
    /// Parameter along the intersection line
    pub t: Real,
    pub position: Point3<Real>,
    /// Index of the polygon vertex, for [`Endpoint::Vertex`]
    pub vertex_index: Option<usize>,
    /// Indices `(i, (i + 1) % n)` of the crossed edge, for [`Endpoint::Edge`]
    pub edge: Option<(usize, usize)>,
}

impl ObservedIntersection {
    fn at_vertex(index: usize, position: Point3<Real>, t: Real) -> Self {
        ObservedIntersection {
            kind: Endpoint::Vertex,
            t,
            position,
            vertex_index: Some(index),
            edge: None,
        }
    }

    fn on_edge(edge: (usize, usize), position: Point3<Real>, t: Real) -> Self {
        ObservedIntersection {
            kind: Endpoint::Edge,
            t,
            position,
            vertex_index: None,
            edge: Some(edge),
        }
    }

    /// A point moved inside the chord it belongs to.
    pub(crate) fn trimmed(
        position: Point3<Real>,
        t: Real,
        middle: Endpoint,
        middle_edge: Option<(usize, usize)>,
    ) -> Self {
        match middle {
            Endpoint::Edge => ObservedIntersection {
                kind: Endpoint::Edge,
                t,
                position,
                vertex_index: None,
                edge: middle_edge,
            },
            _ => ObservedIntersection {
                kind: Endpoint::Face,
                t,
                position,
                vertex_index: None,
                edge: None,
            },
        }
    }

    /// Mint (or reuse) the vertex for this point and re-derive its classification
    /// against `polygon`, whose vertex handles are `keys` and positions `points`.
    ///
    /// An edge or face point that lands on an existing polygon vertex becomes a
    /// [`Endpoint::Vertex`]; a face point within tolerance of an edge becomes an
    /// [`Endpoint::Edge`].
    pub fn resolve(
        &self,
        ctx: &mut CsgContext,
        keys: &[VertexKey],
        points: &[Point3<Real>],
    ) -> ResolvedIntersection {
        if let (Endpoint::Vertex, Some(index)) = (self.kind, self.vertex_index) {
            return ResolvedIntersection {
                kind: Endpoint::Vertex,
                vertex: keys[index],
                vertex_index: Some(index),
                edge: None,
            };
        }

        let vertex = ctx.get_or_create_vertex(self.position);
        if let Some(index) = keys.iter().position(|&k| k == vertex) {
            return ResolvedIntersection {
                kind: Endpoint::Vertex,
                vertex,
                vertex_index: Some(index),
                edge: None,
            };
        }

        let edge = match (self.kind, self.edge) {
            (Endpoint::Edge, Some(edge)) => Some(edge),
            _ => {
                let n = points.len();
                let tolerance = ctx.distance_tolerance();
                (0..n)
                    .find(|&i| {
                        distance_to_segment(&self.position, &points[i], &points[(i + 1) % n])
                            <= tolerance
                    })
                    .map(|i| (i, (i + 1) % n))
            },
        };
        ResolvedIntersection {
            kind: if edge.is_some() {
                Endpoint::Edge
            } else {
                Endpoint::Face
            },
            vertex,
            vertex_index: None,
            edge,
        }
    }
}

/// An intersection point as used by the polygons replacing the split one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedIntersection {
    pub kind: Endpoint,
    pub vertex: VertexKey,
    pub vertex_index: Option<usize>,
    pub edge: Option<(usize, usize)>,
}

/// One chord of the intersection line through a polygon, `start.t < end.t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDescriptor {
    pub start: ObservedIntersection,
    /// [`Endpoint::Edge`] when the chord runs along a polygon edge, otherwise
    /// [`Endpoint::Face`]
    pub middle: Endpoint,
    pub end: ObservedIntersection,
    /// The edge the chord runs along, when `middle` is [`Endpoint::Edge`]
    pub middle_edge: Option<(usize, usize)>,
}

impl SegmentDescriptor {
    pub fn length(&self) -> Real {
        self.end.t - self.start.t
    }

    /// Restrict this chord to the part also covered by `other`, a chord of a
    /// different polygon along the same line.
    ///
    /// Ends that move become face points (edge points for a chord along an edge)
    /// placed at `other`'s ends. Returns `None` unless the overlap is longer than
    /// `tolerance`.
    pub fn overlap(&self, other: &SegmentDescriptor, tolerance: Real) -> Option<SegmentDescriptor> {
        let lo = self.start.t.max(other.start.t);
        let hi = self.end.t.min(other.end.t);
        if hi - lo <= tolerance {
            return None;
        }
        let start = if lo - self.start.t <= tolerance {
            self.start
        } else {
            ObservedIntersection::trimmed(other.start.position, lo, self.middle, self.middle_edge)
        };
        let end = if self.end.t - hi <= tolerance {
            self.end
        } else {
            ObservedIntersection::trimmed(other.end.position, hi, self.middle, self.middle_edge)
        };
        Some(SegmentDescriptor {
            start,
            middle: self.middle,
            end,
            middle_edge: self.middle_edge,
        })
    }
}

/// Every chord of the line `origin + t·direction` through the polygon `points`.
///
/// `distances[i]` is the signed distance of `points[i]` to the cutting plane.
/// Vertices within `tolerance` of the plane are crossings of their own; other
/// crossings come from edges whose ends lie strictly on opposite sides.
pub fn polygon_chords(
    points: &[Point3<Real>],
    distances: &[Real],
    origin: &Point3<Real>,
    direction: &Vector3<Real>,
    normal: &Vector3<Real>,
    tolerance: Real,
) -> Vec<SegmentDescriptor> {
    let n = points.len();
    debug_assert_eq!(n, distances.len());
    let param = |p: &Point3<Real>| (p - origin).dot(direction);

    let mut events: Vec<ObservedIntersection> = Vec::new();
    for i in 0..n {
        if distances[i].abs() <= tolerance {
            events.push(ObservedIntersection::at_vertex(i, points[i], param(&points[i])));
        }
    }
    for i in 0..n {
        let j = (i + 1) % n;
        let (di, dj) = (distances[i], distances[j]);
        if (di > tolerance && dj < -tolerance) || (di < -tolerance && dj > tolerance) {
            let position = points[i] + (points[j] - points[i]) * (di / (di - dj));
            events.push(ObservedIntersection::on_edge((i, j), position, param(&position)));
        }
    }
    if events.len() < 2 {
        return Vec::new();
    }

    events.sort_by(|a, b| {
        a.t.total_cmp(&b.t)
            .then_with(|| (a.kind != Endpoint::Vertex).cmp(&(b.kind != Endpoint::Vertex)))
    });
    let mut merged: Vec<ObservedIntersection> = Vec::with_capacity(events.len());
    for event in events {
        match merged.last_mut() {
            Some(last) if event.t - last.t <= tolerance => {
                if last.kind != Endpoint::Vertex && event.kind == Endpoint::Vertex {
                    *last = event;
                }
            },
            _ => merged.push(event),
        }
    }

    let mut chords = Vec::new();
    for pair in merged.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b.t - a.t <= tolerance {
            continue;
        }
        if let (Some(i), Some(j)) = (a.vertex_index, b.vertex_index) {
            let along_edge = if (i + 1) % n == j {
                Some((i, j))
            } else if (j + 1) % n == i {
                Some((j, i))
            } else {
                None
            };
            if along_edge.is_some() {
                chords.push(SegmentDescriptor {
                    start: a,
                    middle: Endpoint::Edge,
                    end: b,
                    middle_edge: along_edge,
                });
                continue;
            }
        }
        let midpoint = Point3::from((a.position.coords + b.position.coords) * 0.5);
        if point_in_polygon(points, normal, &midpoint, tolerance) > 0 {
            chords.push(SegmentDescriptor {
                start: a,
                middle: Endpoint::Face,
                end: b,
                middle_edge: None,
            });
        }
    }
    chords
}

/// Chords of the line `origin + t·direction` through `polygon`, in order along the
/// line.
///
/// `signed_distances[i]` is the distance of the polygon's i-th vertex to the
/// cutting plane. A convex polygon has at most one chord.
pub fn calc_segment_descriptor(
    ctx: &CsgContext,
    origin: &Point3<Real>,
    direction: &Vector3<Real>,
    signed_distances: &[Real],
    polygon: &CsgPolygon,
) -> Vec<SegmentDescriptor> {
    polygon_chords(
        &polygon.positions(ctx),
        signed_distances,
        origin,
        direction,
        &polygon.normal(ctx),
        ctx.distance_tolerance(),
    )
}
