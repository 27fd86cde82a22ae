mod support;

use nalgebra::{Point3, Vector3};
use polycsg::{
    CsgContext, CsgObject, CsgPolygon, Real,
    float_types::ANGLE_TOLERANCE,
    operations::split_object,
    split::{
        Endpoint, SegmentDescriptor, calc_segment_descriptor, is_valid_polygon_split, polygon_pieces,
        segment::polygon_chords, split_poly_on_segment, split_polys,
    },
};
use support::*;

const TOL: Real = 1e-9;

/// 2x2 square in the z = 0 plane, clockwise seen from +z.
fn square(ctx: &mut CsgContext) -> CsgPolygon {
    let keys = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
        Point3::new(2.0, 2.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
    ]
    .into_iter()
    .map(|p| ctx.get_or_create_vertex(p))
    .collect();
    CsgPolygon::new(keys, PROPS, 0)
}

fn chords_at_x(ctx: &CsgContext, polygon: &CsgPolygon, x: Real) -> Vec<SegmentDescriptor> {
    let points = polygon.positions(ctx);
    let distances: Vec<Real> = points.iter().map(|p| p.x - x).collect();
    polygon_chords(
        &points,
        &distances,
        &Point3::new(x, 0.0, 0.0),
        &Vector3::y(),
        &polygon.normal(ctx),
        TOL,
    )
}

#[test]
fn edge_to_edge_split_is_valid() {
    let mut ctx = CsgContext::with_tolerances(TOL, ANGLE_TOLERANCE);
    let polygon = square(&mut ctx);
    let chords = chords_at_x(&ctx, &polygon, 1.0);
    assert_eq!(chords.len(), 1);

    let pieces = polygon_pieces(&mut ctx, &polygon, &chords[0]).expect("square is cut");
    assert_eq!(pieces.len(), 2);
    assert!(pieces.iter().all(|p| p.len() == 4));
    assert!(pieces.iter().all(|p| p.properties == polygon.properties));
    assert!(is_valid_polygon_split(&ctx, &polygon, &pieces));
    assert!(!is_valid_polygon_split(&ctx, &polygon, &pieces[..1]));
}

#[test]
fn slit_inside_the_face_is_valid() {
    let mut ctx = CsgContext::with_tolerances(TOL, ANGLE_TOLERANCE);
    let polygon = square(&mut ctx);
    let chord = chords_at_x(&ctx, &polygon, 1.0)[0];
    let mut cutter = chord;
    cutter.start.t = 0.5;
    cutter.start.position = Point3::new(1.0, 0.5, 0.0);
    cutter.end.t = 1.5;
    cutter.end.position = Point3::new(1.0, 1.5, 0.0);
    let slit = chord.overlap(&cutter, TOL).expect("chords overlap");
    assert_eq!(slit.start.kind, Endpoint::Face);
    assert_eq!(slit.end.kind, Endpoint::Face);

    let pieces = polygon_pieces(&mut ctx, &polygon, &slit).expect("square is cut");
    assert_eq!(pieces.len(), 2);
    assert!(is_valid_polygon_split(&ctx, &polygon, &pieces));
    let area: Real = pieces.iter().map(|p| p.area(&ctx)).sum();
    assert!(approx_eq(area, 4.0, 1e-12));
}

#[test]
fn chord_along_an_edge_only_inserts_vertices() {
    let mut ctx = CsgContext::with_tolerances(TOL, ANGLE_TOLERANCE);
    let polygon = square(&mut ctx);
    let chord = chords_at_x(&ctx, &polygon, 0.0)[0];
    assert_eq!(chord.middle, Endpoint::Edge);

    // a cutter covering only the middle of that edge
    let mut cutter = chord;
    cutter.start.t = 0.5;
    cutter.start.position = Point3::new(0.0, 0.5, 0.0);
    cutter.end.t = 1.5;
    cutter.end.position = Point3::new(0.0, 1.5, 0.0);
    let trimmed = chord.overlap(&cutter, TOL).unwrap();
    let pieces = polygon_pieces(&mut ctx, &polygon, &trimmed).unwrap();
    assert_eq!(pieces.len(), 1);
    assert_eq!(pieces[0].len(), 6);
    assert!(approx_eq(pieces[0].area(&ctx), 4.0, 1e-12));

    // the whole edge changes nothing
    assert!(polygon_pieces(&mut ctx, &polygon, &chord).is_none());
}

#[test]
fn split_poly_on_segment_replaces_the_polygon() {
    let mut ctx = CsgContext::with_tolerances(TOL, ANGLE_TOLERANCE);
    let polygon = square(&mut ctx);
    let chord = chords_at_x(&ctx, &polygon, 1.0)[0];
    let mut solid = CsgObject::new();
    let key = solid.add_polygon(polygon);
    let pieces = split_poly_on_segment(&mut ctx, &mut solid, key, &chord).expect("square is cut");
    assert_eq!(pieces.len(), 2);
    assert_eq!(solid.len(), 2);
    assert!(!solid.contains(key));
    for key in pieces {
        assert!(solid.validate_polygon(&ctx, key).is_ok());
    }
}

/// Descriptors of the line through `from` along `direction` across the test square,
/// with signed distances measured to the plane containing that line and the z axis.
fn descriptors_along(
    ctx: &mut CsgContext,
    from: Point3<Real>,
    direction: Vector3<Real>,
) -> Vec<SegmentDescriptor> {
    let polygon = square(ctx);
    let direction = direction.normalize();
    let cutting_normal = Vector3::z().cross(&direction);
    let distances: Vec<Real> = polygon
        .positions(ctx)
        .iter()
        .map(|p| (p - from).dot(&cutting_normal))
        .collect();
    calc_segment_descriptor(ctx, &from, &direction, &distances, &polygon)
}

#[test]
fn descriptor_from_vertex_to_vertex() {
    let mut ctx = CsgContext::with_tolerances(TOL, ANGLE_TOLERANCE);
    let descriptors = descriptors_along(&mut ctx, Point3::origin(), Vector3::new(1.0, 1.0, 0.0));
    assert_eq!(descriptors.len(), 1);
    let d = descriptors[0];
    assert_eq!(d.start.kind, Endpoint::Vertex);
    assert_eq!(d.start.vertex_index, Some(0));
    assert_eq!(d.middle, Endpoint::Face);
    assert_eq!(d.end.kind, Endpoint::Vertex);
    assert_eq!(d.end.vertex_index, Some(2));
    assert!(approx_eq(d.length(), (8.0 as Real).sqrt(), 1e-9));
}

#[test]
fn descriptor_from_vertex_to_edge() {
    let mut ctx = CsgContext::with_tolerances(TOL, ANGLE_TOLERANCE);
    let descriptors = descriptors_along(&mut ctx, Point3::origin(), Vector3::new(2.0, 1.0, 0.0));
    assert_eq!(descriptors.len(), 1);
    let d = descriptors[0];
    assert_eq!(d.start.kind, Endpoint::Vertex);
    assert_eq!(d.start.vertex_index, Some(0));
    assert_eq!(d.middle, Endpoint::Face);
    assert_eq!(d.end.kind, Endpoint::Edge);
    assert_eq!(d.end.edge, Some((2, 3)));
    assert!((d.end.position - Point3::new(2.0, 1.0, 0.0)).norm() < 1e-9);
}

#[test]
fn descriptor_along_an_edge() {
    let mut ctx = CsgContext::with_tolerances(TOL, ANGLE_TOLERANCE);
    let descriptors = descriptors_along(&mut ctx, Point3::origin(), Vector3::y());
    assert_eq!(descriptors.len(), 1);
    let d = descriptors[0];
    assert_eq!(d.start.kind, Endpoint::Vertex);
    assert_eq!(d.middle, Endpoint::Edge);
    assert_eq!(d.middle_edge, Some((0, 1)));
    assert_eq!(d.end.kind, Endpoint::Vertex);

    // both ends are corners already, so there is nothing to cut
    let polygon = square(&mut ctx);
    assert!(polygon_pieces(&mut ctx, &polygon, &d).is_none());
}

#[test]
fn split_polys_cuts_a_face_once() {
    let a = cube_at(1, 0.0, 0.0, 0.0, 2.0);
    let b = cube_at(2, 1.0, 0.0, 0.0, 2.0);
    let (mut ctx, mut solid_a, solid_b) = solids(&a, &b);

    let top = solid_a
        .polygon_keys()
        .into_iter()
        .find(|&key| solid_a.polygons[key].normal(&ctx).z > 0.5)
        .expect("cube has a top face");
    let original = solid_a.polygons[top].clone();
    // the tool's face in the plane x = 0 crosses the top face along its middle
    let wall = solid_b
        .polygons
        .values()
        .find(|p| p.normal(&ctx).x < -0.5)
        .expect("tool has a -x face")
        .clone();

    assert!(split_polys(&mut ctx, &mut solid_a, top, &wall));
    assert!(!solid_a.contains(top));
    assert_eq!(solid_a.len(), 7);

    let pieces: Vec<(_, CsgPolygon)> = solid_a
        .polygons
        .iter()
        .filter(|(_, p)| p.normal(&ctx).z > 0.5)
        .map(|(key, p)| (key, p.clone()))
        .collect();
    assert_eq!(pieces.len(), 2);
    let polygons: Vec<CsgPolygon> = pieces.iter().map(|(_, p)| p.clone()).collect();
    assert!(is_valid_polygon_split(&ctx, &original, &polygons));
    let area: Real = polygons.iter().map(|p| p.area(&ctx)).sum();
    assert!(approx_eq(area, 4.0, 1e-9));

    // the cut is already there
    for (key, _) in pieces {
        assert!(!split_polys(&mut ctx, &mut solid_a, key, &wall));
    }
    assert_eq!(solid_a.len(), 7);
}

#[test]
fn overlapping_cubes_stay_watertight() {
    let a = cube_at(1, 0.0, 0.0, 0.0, 2.0);
    let b = cube_at(2, 1.0, 0.0, 0.0, 2.0);
    let (mut ctx, mut solid_a, mut solid_b) = solids(&a, &b);

    split_object(&mut ctx, &mut solid_a, &solid_b);
    assert_eq!(solid_a.len(), 10);
    assert!(solid_a.is_watertight(), "open: {:?}", solid_a.open_edges());

    split_object(&mut ctx, &mut solid_b, &solid_a);
    assert_eq!(solid_b.len(), 10);
    assert!(solid_b.is_watertight(), "open: {:?}", solid_b.open_edges());
}

#[test]
fn splitting_again_changes_nothing() {
    let a = cube_at(1, 0.0, 0.0, 0.0, 2.0);
    let b = cuboid(2, [0.0, 0.0, 0.0], [2.0, 2.0, 2.0]);
    let (mut ctx, mut solid_a, mut solid_b) = solids(&a, &b);
    split_object(&mut ctx, &mut solid_a, &solid_b);
    split_object(&mut ctx, &mut solid_b, &solid_a);
    let (count_a, count_b) = (solid_a.len(), solid_b.len());
    let vertices = ctx.vertex_count();

    split_object(&mut ctx, &mut solid_a, &solid_b);
    split_object(&mut ctx, &mut solid_b, &solid_a);
    assert_eq!(solid_a.len(), count_a);
    assert_eq!(solid_b.len(), count_b);
    assert_eq!(ctx.vertex_count(), vertices);
    assert!(solid_a.is_watertight());
    assert!(solid_b.is_watertight());
}

#[test]
fn split_polys_ignores_distant_cutters() {
    let a = cube_at(1, 0.0, 0.0, 0.0, 2.0);
    let b = cube_at(2, 5.0, 0.0, 0.0, 2.0);
    let (mut ctx, mut solid_a, solid_b) = solids(&a, &b);
    for key in solid_a.polygon_keys() {
        for cutter in solid_b.polygons.values() {
            assert!(!split_polys(&mut ctx, &mut solid_a, key, cutter));
        }
    }
    assert_eq!(solid_a.len(), 6);
}

#[test]
fn coplanar_polygons_do_not_cut_each_other() {
    let a = cube_at(1, 0.0, 0.0, 0.0, 2.0);
    let b = cube_at(2, 2.0, 0.0, 0.0, 2.0);
    let (mut ctx, mut solid_a, solid_b) = solids(&a, &b);
    split_object(&mut ctx, &mut solid_a, &solid_b);
    assert_eq!(solid_a.len(), 6);
}
