//! Broad-phase lookup of meshes by bounding box.

use crate::float_types::parry3d::bounding_volume::{Aabb, BoundingVolume};
use crate::mesh::{Mesh, MeshId};
use crate::traits::CsgOps;
use hashbrown::HashMap;

/// Query side of a broad-phase structure, as needed by
/// [`subtract_mesh_from_model`](crate::operations::subtract_mesh_from_model).
pub trait SpatialIndex {
    /// Ids of every item whose bounds intersect `volume`, touching included.
    fn intersected_by(&self, volume: &Aabb) -> Vec<MeshId>;
}

/// Flat list of item bounds scanned linearly on every query.
///
/// Removal swaps the last item into the freed slot, so queries report items in
/// no particular order.
#[derive(Debug, Clone, Default)]
pub struct SpatialPartitioner {
    items: Vec<(MeshId, Aabb)>,
    index_of: HashMap<MeshId, usize>,
}

impl SpatialPartitioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partitioner holding the bounds of each mesh.
    pub fn from_meshes<'a>(meshes: impl IntoIterator<Item = &'a Mesh>) -> Self {
        let mut partitioner = SpatialPartitioner::new();
        for mesh in meshes {
            partitioner.add_item(mesh.id, mesh.bounding_box());
        }
        partitioner
    }

    /// Add `id` with `bounds`, replacing its bounds if it is already present.
    pub fn add_item(&mut self, id: MeshId, bounds: Aabb) {
        if self.update_item(id, bounds) {
            return;
        }
        self.index_of.insert(id, self.items.len());
        self.items.push((id, bounds));
    }

    /// Replace the bounds of `id`. Returns `false` if it is unknown.
    pub fn update_item(&mut self, id: MeshId, bounds: Aabb) -> bool {
        match self.index_of.get(&id) {
            Some(&index) => {
                self.items[index].1 = bounds;
                true
            },
            None => false,
        }
    }

    /// Remove `id`. Returns `false` if it is unknown.
    pub fn remove_item(&mut self, id: MeshId) -> bool {
        let Some(index) = self.index_of.remove(&id) else {
            return false;
        };
        self.items.swap_remove(index);
        if let Some(&(moved, _)) = self.items.get(index) {
            self.index_of.insert(moved, index);
        }
        true
    }

    pub fn has_item(&self, id: MeshId) -> bool {
        self.index_of.contains_key(&id)
    }

    pub fn bounds(&self, id: MeshId) -> Option<Aabb> {
        self.index_of.get(&id).map(|&i| self.items[i].1)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids of every item whose bounds lie entirely inside `volume`.
    pub fn contained_by(&self, volume: &Aabb) -> Vec<MeshId> {
        self.items
            .iter()
            .filter(|(_, bounds)| volume.contains(bounds))
            .map(|&(id, _)| id)
            .collect()
    }
}

impl SpatialIndex for SpatialPartitioner {
    fn intersected_by(&self, volume: &Aabb) -> Vec<MeshId> {
        self.items
            .iter()
            .filter(|(_, bounds)| volume.intersects(bounds))
            .map(|&(id, _)| id)
            .collect()
    }
}
