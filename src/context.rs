//! Per-operation tolerances and vertex identity.
//!
//! A [`CsgContext`] is created for one boolean operation. Its distance epsilon is
//! a fraction of the diagonal of both operands' combined bounds, so the same
//! operation behaves identically at any model scale. Every vertex the operation
//! touches is minted through [`CsgContext::get_or_create_vertex`]; positions that
//! land within epsilon of an existing vertex reuse that vertex, which is what
//! keeps two polygons cut by the same plane stitched together.

use crate::csg::vertex::{CsgVertex, VertexKey};
use crate::float_types::{
    ANGLE_TOLERANCE, MIN_DISTANCE_TOLERANCE, Real,
    parry3d::bounding_volume::{Aabb, BoundingVolume},
    tolerance_fraction,
};
use hashbrown::HashMap;
use nalgebra::Point3;
use slotmap::SlotMap;

type Cell = (i64, i64, i64);

#[derive(Debug, Clone)]
pub struct CsgContext {
    distance_tolerance: Real,
    angle_tolerance: Real,
    vertices: SlotMap<VertexKey, CsgVertex>,
    cells: HashMap<Cell, Vec<VertexKey>>,
    cell_size: Real,
}

impl CsgContext {
    /// Context whose tolerances derive from `bounds`, usually the merged bounds of
    /// both operands.
    pub fn new(bounds: &Aabb) -> Self {
        let diagonal = (bounds.maxs - bounds.mins).norm();
        let distance = (diagonal * tolerance_fraction()).max(MIN_DISTANCE_TOLERANCE);
        Self::with_tolerances(distance, ANGLE_TOLERANCE)
    }

    /// Context for an operation between two solids with the given bounds.
    pub fn for_operands(a: &Aabb, b: &Aabb) -> Self {
        Self::new(&a.merged(b))
    }

    /// Context with explicit tolerances. `angle_tolerance` is the sine of the largest
    /// angle still treated as parallel.
    pub fn with_tolerances(distance_tolerance: Real, angle_tolerance: Real) -> Self {
        let distance_tolerance = distance_tolerance.max(MIN_DISTANCE_TOLERANCE);
        CsgContext {
            distance_tolerance,
            angle_tolerance,
            vertices: SlotMap::with_key(),
            cells: HashMap::new(),
            // two tolerances per cell keeps every match inside the 3x3x3 neighbourhood
            cell_size: distance_tolerance * 2.0,
        }
    }

    pub const fn distance_tolerance(&self) -> Real {
        self.distance_tolerance
    }

    pub const fn angle_tolerance(&self) -> Real {
        self.angle_tolerance
    }

    #[inline]
    fn cell_of(&self, p: &Point3<Real>) -> Cell {
        let discretize = |v: Real| (v / self.cell_size).floor() as i64;
        (discretize(p.x), discretize(p.y), discretize(p.z))
    }

    /// Existing vertex within tolerance of `position`, the closest one if several are.
    pub fn find_vertex(&self, position: &Point3<Real>) -> Option<VertexKey> {
        let (cx, cy, cz) = self.cell_of(position);
        let mut best: Option<(Real, VertexKey)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(keys) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &key in keys {
                        let d = (self.vertices[key].pos - position).norm();
                        if d > self.distance_tolerance {
                            continue;
                        }
                        let closer = match best {
                            None => true,
                            Some((best_d, best_key)) => {
                                d < best_d || (d == best_d && key < best_key)
                            },
                        };
                        if closer {
                            best = Some((d, key));
                        }
                    }
                }
            }
        }
        best.map(|(_, key)| key)
    }

    /// Return the vertex already minted within tolerance of `position`, or mint a new one.
    pub fn get_or_create_vertex(&mut self, position: Point3<Real>) -> VertexKey {
        if let Some(existing) = self.find_vertex(&position) {
            return existing;
        }
        let vertex = CsgVertex::new(position);
        let cell = self.cell_of(&vertex.pos);
        let key = self.vertices.insert(vertex);
        self.cells.entry(cell).or_default().push(key);
        key
    }

    /// Panics if `key` was not minted by this context.
    #[inline]
    pub fn vertex(&self, key: VertexKey) -> &CsgVertex {
        &self.vertices[key]
    }

    #[inline]
    pub fn position(&self, key: VertexKey) -> Point3<Real> {
        self.vertices[key].pos
    }

    pub fn positions(&self, keys: &[VertexKey]) -> Vec<Point3<Real>> {
        keys.iter().map(|&k| self.vertices[k].pos).collect()
    }

    /// Number of distinct vertices minted so far.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}
