//! `Mesh`: indexed polygon meshes exchanged with the modeling tool, and the
//! implementation of the `CsgOps` trait for `Mesh`.

use crate::csg::polygon::FaceProperties;
use crate::errors::{CsgError, ValidationError};
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::traits::CsgOps;
use hashbrown::HashMap;
use nalgebra::{Matrix4, Point3};
use std::sync::OnceLock;

pub mod manifold;
pub mod shapes;

/// Identifier of a mesh inside a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MeshId(pub u32);

/// One face: a loop of indices into [`Mesh::vertices`], clockwise seen from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub vertex_ids: Vec<usize>,
    pub properties: FaceProperties,
}

impl Face {
    pub fn new(vertex_ids: Vec<usize>, properties: FaceProperties) -> Self {
        Face {
            vertex_ids,
            properties,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub id: MeshId,
    pub vertices: Vec<Point3<Real>>,
    pub faces: Vec<Face>,

    /// Lazily calculated AABB that spans `vertices`.
    pub bounding_box: OnceLock<Aabb>,
}

impl PartialEq for Mesh {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.vertices == other.vertices && self.faces == other.faces
    }
}

impl Mesh {
    /// A mesh with no faces.
    pub fn new(id: MeshId) -> Self {
        Mesh {
            id,
            vertices: Vec::new(),
            faces: Vec::new(),
            bounding_box: OnceLock::new(),
        }
    }

    /// Build a mesh from explicit vertices and faces.
    pub fn from_parts(id: MeshId, vertices: Vec<Point3<Real>>, faces: Vec<Face>) -> Self {
        Mesh {
            id,
            vertices,
            faces,
            bounding_box: OnceLock::new(),
        }
    }

    /// Build a mesh from polygons given as position loops; bit-identical
    /// positions share one vertex.
    pub fn from_polygons(id: MeshId, polygons: &[(Vec<Point3<Real>>, FaceProperties)]) -> Self {
        let mut mesh = Mesh::new(id);
        let mut index_of: HashMap<[u64; 3], usize> = HashMap::new();
        for (points, properties) in polygons {
            let vertex_ids = points
                .iter()
                .map(|p| {
                    // adding zero folds -0.0 into 0.0
                    let key = [
                        (p.x as f64 + 0.0).to_bits(),
                        (p.y as f64 + 0.0).to_bits(),
                        (p.z as f64 + 0.0).to_bits(),
                    ];
                    *index_of.entry(key).or_insert_with(|| {
                        mesh.vertices.push(*p);
                        mesh.vertices.len() - 1
                    })
                })
                .collect();
            mesh.faces.push(Face::new(vertex_ids, *properties));
        }
        mesh
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Positions of `face`'s loop.
    pub fn face_positions(&self, face: &Face) -> Result<Vec<Point3<Real>>, ValidationError> {
        face.vertex_ids
            .iter()
            .map(|&index| {
                self.vertices
                    .get(index)
                    .copied()
                    .ok_or(ValidationError::FaceIndexOutOfRange {
                        index,
                        len: self.vertices.len(),
                    })
            })
            .collect()
    }

    /// Enclosed volume; positive for a closed mesh wound clockwise from outside.
    pub fn volume(&self) -> Real {
        let mut six_volume = 0.0;
        for face in &self.faces {
            let Ok(points) = self.face_positions(face) else {
                continue;
            };
            for k in 1..points.len().saturating_sub(1) {
                six_volume += points[0].coords.dot(&points[k].coords.cross(&points[k + 1].coords));
            }
        }
        // clockwise loops have inward right-hand normals
        -six_volume / 6.0
    }
}

impl CsgOps for Mesh {
    /// Remove `other`'s volume from this mesh.
    ///
    /// ```text
    /// c = a.subtract(&b)
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |    +--+
    ///     +----+--+    |       +----+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn subtract(&self, other: &Mesh) -> Result<Option<Mesh>, CsgError> {
        crate::operations::subtract(self, other)
    }

    /// Apply an arbitrary 3D transform (as a 4x4 matrix) to the mesh.
    ///
    /// Mirroring transforms reverse every face so faces keep pointing outwards.
    fn transform(&self, mat: &Matrix4<Real>) -> Mesh {
        let mut mesh = self.clone();
        for pos in &mut mesh.vertices {
            let homog_pos = mat * pos.to_homogeneous();
            if let Some(moved) = Point3::from_homogeneous(homog_pos) {
                *pos = moved;
            }
        }
        if mat.fixed_view::<3, 3>(0, 0).determinant() < 0.0 {
            for face in &mut mesh.faces {
                face.vertex_ids.reverse();
            }
        }

        // invalidate the old cached bounding box
        mesh.bounding_box = OnceLock::new();
        mesh
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`] indicating the 3D bounds of all `vertices`.
    fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for face in &self.faces {
                for p in face.vertex_ids.iter().filter_map(|&i| self.vertices.get(i)) {
                    mins = mins.inf(p);
                    maxs = maxs.sup(p);
                }
            }

            // If still uninitialized (e.g., no faces), return a trivial AABB at origin
            if mins.x > maxs.x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }
            Aabb::new(mins, maxs)
        })
    }

    /// Invalidates object's cached bounding box.
    fn invalidate_bounding_box(&mut self) {
        self.bounding_box = OnceLock::new();
    }

    /// Invert this Mesh (flip inside vs. outside)
    fn inverse(&self) -> Mesh {
        let mut mesh = self.clone();
        for face in &mut mesh.faces {
            face.vertex_ids.reverse();
        }
        mesh
    }
}
