mod support;

use nalgebra::{Matrix4, Point3, Vector3};
use polycsg::{
    CsgContext, CsgError, CsgOps, Face, FaceProperties, Mesh, MeshId, ValidationError,
    float_types::{PI, Real},
    operations::to_csg,
};
use support::*;

#[test]
fn cube_basics() {
    let cube = cube_at(1, 0.0, 0.0, 0.0, 2.0);
    assert_eq!(cube.face_count(), 6);
    assert_eq!(cube.vertex_count(), 8);
    assert!(cube.is_watertight());
    assert!(cube.boundary_edges().is_empty());
    assert!(approx_eq(cube.volume(), 8.0, 1e-12));

    let bb = cube.bounding_box();
    assert!(approx_eq(bb.mins.x, -1.0, 1e-12));
    assert!(approx_eq(bb.maxs.y, 1.0, 1e-12));
}

#[test]
fn sphere_is_closed() {
    let sphere = Mesh::sphere(MeshId(1), Point3::origin(), 1.0, 16, 8, PROPS);
    assert_eq!(sphere.face_count(), 16 * 8);
    assert!(sphere.is_watertight(), "open: {:?}", sphere.boundary_edges());
    let volume = sphere.volume();
    assert!(volume > 0.0);
    assert!(volume < 4.0 / 3.0 * PI);
}

#[test]
fn open_box_reports_its_rim() {
    let mut cube = cube_at(1, 0.0, 0.0, 0.0, 2.0);
    cube.faces.pop();
    assert!(!cube.is_watertight());
    assert_eq!(cube.boundary_edges().len(), 4);
}

#[test]
fn from_polygons_welds_shared_corners() {
    let cube = cube_at(1, 0.0, 0.0, 0.0, 2.0);
    let polygons: Vec<(Vec<Point3<Real>>, FaceProperties)> = cube
        .faces
        .iter()
        .map(|f| (cube.face_positions(f).unwrap(), f.properties))
        .collect();
    let rebuilt = Mesh::from_polygons(MeshId(2), &polygons);
    assert_eq!(rebuilt.vertex_count(), 8);
    assert!(rebuilt.is_watertight());
    assert!(approx_eq(rebuilt.volume(), 8.0, 1e-12));
}

#[test]
fn face_positions_rejects_dangling_indices() {
    let mut cube = cube_at(1, 0.0, 0.0, 0.0, 2.0);
    cube.faces[0].vertex_ids[0] = 42;
    assert_eq!(
        cube.face_positions(&cube.faces[0]),
        Err(ValidationError::FaceIndexOutOfRange { index: 42, len: 8 })
    );
    assert!(!cube.is_watertight());
}

#[test]
fn mirroring_keeps_faces_outward() {
    let cube = cube_at(1, 3.0, 0.0, 0.0, 2.0);
    let mirrored = cube.scale(-1.0, 1.0, 1.0);
    assert!(approx_eq(mirrored.volume(), 8.0, 1e-9));
    assert!(approx_eq(mirrored.bounding_box().maxs.x, -2.0, 1e-12));

    let inverted = cube.inverse();
    assert!(approx_eq(inverted.volume(), -8.0, 1e-9));
}

#[test]
fn transform_invalidates_cached_bounds() {
    let cube = cube_at(1, 0.0, 0.0, 0.0, 2.0);
    let _ = cube.bounding_box();
    let moved = cube.transform(&Matrix4::new_translation(&Vector3::new(5.0, 0.0, 0.0)));
    assert!(approx_eq(moved.bounding_box().mins.x, 4.0, 1e-12));
    let centered = moved.center();
    assert!(approx_eq(centered.bounding_box().mins.x, -1.0, 1e-12));
    let rotated = cube.rotate(0.0, 0.0, 90.0);
    assert!(approx_eq(rotated.volume(), 8.0, 1e-9));
}

#[test]
fn to_csg_drops_degenerate_faces() {
    let mut cube = cube_at(1, 0.0, 0.0, 0.0, 2.0);
    // a sliver along one edge of the cube
    cube.faces.push(Face::new(vec![0, 1, 0], PROPS));
    cube.faces.push(Face::new(vec![0, 99, 1], PROPS));
    let mut ctx = CsgContext::for_operands(&cube.bounding_box(), &cube.bounding_box());
    let solid = to_csg(&mut ctx, &cube).unwrap();
    assert_eq!(solid.len(), 6);
    assert_eq!(ctx.vertex_count(), 8);
    assert!(solid.is_watertight());
}

#[test]
fn to_csg_of_an_empty_mesh_fails() {
    let empty = Mesh::new(MeshId(7));
    let mut ctx = CsgContext::with_tolerances(1e-9, 1e-6);
    assert_eq!(to_csg(&mut ctx, &empty).unwrap_err(), CsgError::EmptyOperand(MeshId(7)));
}
