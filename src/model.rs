//! The collection of meshes a subtraction edits.

use crate::mesh::{Mesh, MeshId};
use hashbrown::HashMap;

/// A mutable collection of meshes keyed by id.
pub trait Model {
    fn has_mesh(&self, id: MeshId) -> bool;
    fn get_mesh(&self, id: MeshId) -> Option<&Mesh>;
    /// Insert `mesh` under its own id, returning the mesh it replaced.
    fn add_mesh(&mut self, mesh: Mesh) -> Option<Mesh>;
    fn remove_mesh(&mut self, id: MeshId) -> Option<Mesh>;

    /// Swap the mesh stored under `mesh.id` for `mesh` in one step.
    fn replace_mesh(&mut self, mesh: Mesh) -> Option<Mesh> {
        self.add_mesh(mesh)
    }
}

/// In-memory [`Model`].
#[derive(Debug, Clone, Default)]
pub struct MeshModel {
    meshes: HashMap<MeshId, Mesh>,
}

impl MeshModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Ids of all meshes, sorted.
    pub fn mesh_ids(&self) -> Vec<MeshId> {
        let mut ids: Vec<MeshId> = self.meshes.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.values()
    }
}

impl FromIterator<Mesh> for MeshModel {
    fn from_iter<I: IntoIterator<Item = Mesh>>(iter: I) -> Self {
        MeshModel {
            meshes: iter.into_iter().map(|m| (m.id, m)).collect(),
        }
    }
}

impl Model for MeshModel {
    fn has_mesh(&self, id: MeshId) -> bool {
        self.meshes.contains_key(&id)
    }

    fn get_mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    fn add_mesh(&mut self, mesh: Mesh) -> Option<Mesh> {
        self.meshes.insert(mesh.id, mesh)
    }

    fn remove_mesh(&mut self, id: MeshId) -> Option<Mesh> {
        self.meshes.remove(&id)
    }
}
