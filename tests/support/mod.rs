//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use nalgebra::Point3;
use polycsg::{
    CsgContext, CsgObject, FaceProperties, Mesh, MeshId, Real, operations::to_csg, traits::CsgOps,
};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

pub const PROPS: FaceProperties = FaceProperties::new(1);

/// Cube with edge `size` centered on `(x, y, z)`.
pub fn cube_at(id: u32, x: Real, y: Real, z: Real, size: Real) -> Mesh {
    Mesh::cube(MeshId(id), Point3::new(x, y, z), size, PROPS)
}

/// Box spanning `min`..`max`.
pub fn cuboid(id: u32, min: [Real; 3], max: [Real; 3]) -> Mesh {
    Mesh::cuboid(
        MeshId(id),
        Point3::new(min[0], min[1], min[2]),
        Point3::new(max[0], max[1], max[2]),
        PROPS,
    )
}

/// Both meshes as solids sharing one context, the way a subtraction builds them.
pub fn solids(a: &Mesh, b: &Mesh) -> (CsgContext, CsgObject, CsgObject) {
    let mut ctx = CsgContext::for_operands(&a.bounding_box(), &b.bounding_box());
    let solid_a = to_csg(&mut ctx, a).expect("first operand has faces");
    let solid_b = to_csg(&mut ctx, b).expect("second operand has faces");
    (ctx, solid_a, solid_b)
}

/// Same mesh with every face loop starting one vertex later and faces in reverse order.
pub fn reordered(mesh: &Mesh) -> Mesh {
    let mut out = mesh.clone();
    out.faces.reverse();
    for face in &mut out.faces {
        face.vertex_ids.rotate_left(1);
    }
    out.invalidate_bounding_box();
    out
}
