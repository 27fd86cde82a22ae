//! Boundary representation of a solid: polygons sharing vertices minted by a
//! [`CsgContext`](crate::context::CsgContext).

use crate::context::CsgContext;
use crate::errors::ValidationError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use hashbrown::{HashMap, HashSet};
use nalgebra::Point3;
use slotmap::SlotMap;

pub mod polygon;
pub mod vertex;

use polygon::{CsgPolygon, PolygonStatus, validate_loop};
use vertex::VertexKey;

slotmap::new_key_type! {
    /// Handle of a polygon inside one [`CsgObject`].
    pub struct PolygonKey;
}

/// A solid as an unordered set of polygons plus the vertices they reference.
///
/// Outside of a split pass the polygon set is watertight: every directed edge
/// `a → b` of one polygon is matched by exactly one `b → a` of another.
#[derive(Debug, Clone, Default)]
pub struct CsgObject {
    pub polygons: SlotMap<PolygonKey, CsgPolygon>,
    vertices: HashSet<VertexKey>,
}

impl CsgObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_polygons(polygons: impl IntoIterator<Item = CsgPolygon>) -> Self {
        let mut solid = CsgObject::new();
        for poly in polygons {
            solid.add_polygon(poly);
        }
        solid
    }

    pub fn add_polygon(&mut self, polygon: CsgPolygon) -> PolygonKey {
        self.vertices.extend(polygon.vertices.iter().copied());
        self.polygons.insert(polygon)
    }

    /// Remove a polygon. Its vertices stay referenced until [`Self::prune_vertices`].
    pub fn remove_polygon(&mut self, key: PolygonKey) -> Option<CsgPolygon> {
        self.polygons.remove(key)
    }

    pub fn polygon(&self, key: PolygonKey) -> Option<&CsgPolygon> {
        self.polygons.get(key)
    }

    pub fn contains(&self, key: PolygonKey) -> bool {
        self.polygons.contains_key(key)
    }

    /// Snapshot of the current polygon handles, in storage order.
    pub fn polygon_keys(&self) -> Vec<PolygonKey> {
        self.polygons.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Handles of every vertex referenced by the solid.
    pub fn vertex_keys(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertices.iter().copied()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Drop vertex handles no polygon references anymore.
    pub fn prune_vertices(&mut self) {
        self.vertices = self
            .polygons
            .values()
            .flat_map(|p| p.vertices.iter().copied())
            .collect();
    }

    pub fn bounding_box(&self, ctx: &CsgContext) -> Aabb {
        let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
        let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
        for poly in self.polygons.values() {
            let bb = poly.bounding_box(ctx);
            mins = mins.inf(&bb.mins);
            maxs = maxs.sup(&bb.maxs);
        }
        if mins.x > maxs.x {
            return Aabb::new(Point3::origin(), Point3::origin());
        }
        Aabb::new(mins, maxs)
    }

    /// Check that polygon `key` is still a simple, non-degenerate loop.
    pub fn validate_polygon(&self, ctx: &CsgContext, key: PolygonKey) -> Result<(), ValidationError> {
        // a missing polygon has no points at all
        let Some(poly) = self.polygons.get(key) else {
            return Err(ValidationError::TooFewPoints(Point3::origin()));
        };
        validate_loop(&poly.positions(ctx), ctx.distance_tolerance())
    }

    /// Number of polygons currently carrying `status`.
    pub fn count_status(&self, status: PolygonStatus) -> usize {
        self.polygons.values().filter(|p| p.status == status).count()
    }

    /// Reset every polygon to [`PolygonStatus::Unknown`].
    pub fn clear_status(&mut self) {
        for poly in self.polygons.values_mut() {
            poly.status = PolygonStatus::Unknown;
        }
    }

    /// Directed edges that have no matching reverse edge, with multiplicity.
    pub fn open_edges(&self) -> Vec<(VertexKey, VertexKey)> {
        let mut counts: HashMap<(VertexKey, VertexKey), i32> = HashMap::new();
        for poly in self.polygons.values() {
            for (a, b) in poly.edges() {
                *counts.entry((a, b)).or_insert(0) += 1;
            }
        }
        let mut open = Vec::new();
        for (&(a, b), &count) in &counts {
            let reverse = counts.get(&(b, a)).copied().unwrap_or(0);
            for _ in 0..(count - reverse).max(0) {
                open.push((a, b));
            }
        }
        open.sort();
        open
    }

    /// `true` when every directed edge is matched by exactly one reverse edge.
    pub fn is_watertight(&self) -> bool {
        let mut counts: HashMap<(VertexKey, VertexKey), u32> = HashMap::new();
        for poly in self.polygons.values() {
            for (a, b) in poly.edges() {
                *counts.entry((a, b)).or_insert(0) += 1;
            }
        }
        counts
            .iter()
            .all(|(&(a, b), &count)| count == 1 && counts.get(&(b, a)) == Some(&1))
    }
}
