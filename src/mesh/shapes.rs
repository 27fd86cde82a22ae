//! Primitive solids as `Mesh`es

use crate::csg::polygon::FaceProperties;
use crate::float_types::{PI, Real, TAU};
use crate::mesh::{Face, Mesh, MeshId};
use nalgebra::Point3;

impl Mesh {
    /// Axis-aligned box spanning `min`..`max`.
    ///
    /// ```text
    /// Vertex Layout (8 vertices total):
    ///     7-------6
    ///    /|      /|
    ///   4-------5 |
    ///   | |     | |
    ///   | 3-----|-2
    ///   |/      |/
    ///   0-------1
    /// ```
    ///
    /// Faces are wound clockwise seen from outside:
    /// - **Bottom**: [0,1,2,3] (z=min, outward -Z)
    /// - **Top**: [4,7,6,5] (z=max, outward +Z)
    /// - **Front**: [0,4,5,1] (y=min, outward -Y)
    /// - **Back**: [3,2,6,7] (y=max, outward +Y)
    /// - **Left**: [0,3,7,4] (x=min, outward -X)
    /// - **Right**: [1,5,6,2] (x=max, outward +X)
    pub fn cuboid(
        id: MeshId,
        min: Point3<Real>,
        max: Point3<Real>,
        properties: FaceProperties,
    ) -> Mesh {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let vertices = vec![
            Point3::new(x0, y0, z0),
            Point3::new(x1, y0, z0),
            Point3::new(x1, y1, z0),
            Point3::new(x0, y1, z0),
            Point3::new(x0, y0, z1),
            Point3::new(x1, y0, z1),
            Point3::new(x1, y1, z1),
            Point3::new(x0, y1, z1),
        ];
        let faces = [
            [0, 1, 2, 3],
            [4, 7, 6, 5],
            [0, 4, 5, 1],
            [3, 2, 6, 7],
            [0, 3, 7, 4],
            [1, 5, 6, 2],
        ]
        .into_iter()
        .map(|ids| Face::new(ids.to_vec(), properties))
        .collect();
        Mesh::from_parts(id, vertices, faces)
    }

    /// Cube of edge length `size` centered on `center`.
    pub fn cube(id: MeshId, center: Point3<Real>, size: Real, properties: FaceProperties) -> Mesh {
        let half = size * 0.5;
        Mesh::cuboid(
            id,
            center - nalgebra::Vector3::repeat(half),
            center + nalgebra::Vector3::repeat(half),
            properties,
        )
    }

    /// UV sphere around `center`, poles on the Y axis. Caps are triangles, the
    /// other faces planar quads.
    pub fn sphere(
        id: MeshId,
        center: Point3<Real>,
        radius: Real,
        segments: usize,
        stacks: usize,
        properties: FaceProperties,
    ) -> Mesh {
        let segments = segments.max(3);
        let stacks = stacks.max(2);
        let mut vertices = Vec::with_capacity(2 + (stacks - 1) * segments);

        vertices.push(center + nalgebra::Vector3::new(0.0, radius, 0.0));
        for j in 1..stacks {
            let phi = j as Real / stacks as Real * PI;
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();
            for i in 0..segments {
                let theta = i as Real / segments as Real * TAU;
                vertices.push(
                    center
                        + nalgebra::Vector3::new(
                            ring_radius * theta.cos(),
                            y,
                            ring_radius * theta.sin(),
                        ),
                );
            }
        }
        vertices.push(center + nalgebra::Vector3::new(0.0, -radius, 0.0));

        let north = 0;
        let south = vertices.len() - 1;
        let ring = |j: usize, i: usize| 1 + (j - 1) * segments + i % segments;
        let mut faces = Vec::new();

        for i in 0..segments {
            faces.push(Face::new(vec![north, ring(1, i), ring(1, i + 1)], properties));
        }
        for j in 1..stacks - 1 {
            for i in 0..segments {
                faces.push(Face::new(
                    vec![ring(j, i), ring(j + 1, i), ring(j + 1, i + 1), ring(j, i + 1)],
                    properties,
                ));
            }
        }
        for i in 0..segments {
            faces.push(Face::new(
                vec![south, ring(stacks - 1, i + 1), ring(stacks - 1, i)],
                properties,
            ));
        }
        Mesh::from_parts(id, vertices, faces)
    }
}
