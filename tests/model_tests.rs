mod support;

use nalgebra::Point3;
use polycsg::{
    CsgOps, Face, Mesh, MeshId, MeshModel, Model, SpatialIndex, SpatialPartitioner,
    float_types::parry3d::bounding_volume::Aabb, subtract_mesh_from_model,
};
use support::*;

fn scene() -> MeshModel {
    [
        // partially inside the tool
        cube_at(1, 0.0, 0.0, 0.0, 2.0),
        // fully inside the tool
        cube_at(2, 1.0, 1.0, 1.0, 0.5),
        // far away
        cube_at(3, 10.0, 10.0, 10.0, 1.0),
    ]
    .into_iter()
    .collect()
}

#[test]
fn tool_erases_enclosed_cuts_partial_and_skips_far() {
    let mut model = scene();
    let index = SpatialPartitioner::from_meshes(model.meshes());
    let far_before = model.get_mesh(MeshId(3)).cloned().unwrap();
    let partial_faces = model.get_mesh(MeshId(1)).unwrap().face_count();

    let tool = cuboid(10, [0.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
    assert!(subtract_mesh_from_model(&mut model, &index, &tool));

    assert!(!model.has_mesh(MeshId(2)));
    assert_eq!(model.get_mesh(MeshId(3)), Some(&far_before));
    let partial = model.get_mesh(MeshId(1)).unwrap();
    assert!(partial.face_count() > partial_faces);
    assert!(partial.is_watertight());
    assert!(!model.has_mesh(MeshId(10)));
    assert_eq!(model.mesh_ids(), vec![MeshId(1), MeshId(3)]);
}

#[test]
fn tool_missing_everything_reports_no_change() {
    let mut model = scene();
    let index = SpatialPartitioner::from_meshes(model.meshes());
    let tool = cube_at(10, -20.0, 0.0, 0.0, 1.0);
    assert!(!subtract_mesh_from_model(&mut model, &index, &tool));
    assert_eq!(model.len(), 3);
}

#[test]
fn tool_stored_in_the_model_is_not_subtracted_from_itself() {
    let mut model = scene();
    let tool = cube_at(4, 30.0, 0.0, 0.0, 1.0);
    model.add_mesh(tool.clone());
    let index = SpatialPartitioner::from_meshes(model.meshes());
    assert!(!subtract_mesh_from_model(&mut model, &index, &tool));
    assert_eq!(model.get_mesh(MeshId(4)), Some(&tool));
}

#[test]
fn failing_candidate_is_left_untouched() {
    let mut model = scene();
    let broken = Mesh::from_parts(
        MeshId(5),
        vec![
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.5, 1.5, 1.5),
        ],
        vec![Face::new(vec![0, 1, 2], PROPS)],
    );
    model.add_mesh(broken.clone());
    let index = SpatialPartitioner::from_meshes(model.meshes());

    let tool = cuboid(10, [0.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
    assert!(subtract_mesh_from_model(&mut model, &index, &tool));
    assert_eq!(model.get_mesh(MeshId(5)), Some(&broken));
    assert!(!model.has_mesh(MeshId(2)));
}

#[test]
fn stale_index_entries_are_skipped() {
    let mut model = scene();
    let mut index = SpatialPartitioner::from_meshes(model.meshes());
    index.add_item(MeshId(99), Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)));
    model.remove_mesh(MeshId(2));

    let tool = cuboid(10, [0.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
    assert!(subtract_mesh_from_model(&mut model, &index, &tool));
    assert_eq!(model.len(), 2);
}

#[test]
fn partitioner_tracks_moved_meshes() {
    let model = scene();
    let mut index = SpatialPartitioner::from_meshes(model.meshes());
    assert_eq!(index.len(), 3);

    let query = Aabb::new(Point3::new(9.0, 9.0, 9.0), Point3::new(11.0, 11.0, 11.0));
    assert_eq!(index.intersected_by(&query), vec![MeshId(3)]);

    let moved = model.get_mesh(MeshId(1)).unwrap().translate(10.0, 10.0, 10.5);
    assert!(index.update_item(MeshId(1), moved.bounding_box()));
    let mut hits = index.intersected_by(&query);
    hits.sort();
    assert_eq!(hits, vec![MeshId(1), MeshId(3)]);
    assert_eq!(index.contained_by(&query), vec![MeshId(3)]);

    assert!(index.remove_item(MeshId(3)));
    assert_eq!(index.intersected_by(&query), vec![MeshId(1)]);
    assert_eq!(index.bounds(MeshId(3)), None);
}
