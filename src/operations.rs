//! Boolean subtraction of meshes, and its model-level entry point.
//!
//! ```text
//! mesh A, mesh B
//!   └─ to_csg ──► solids sharing one CsgContext
//!        └─ split_object (A by B, B by A, A by B)
//!             └─ classify_object (A against B, B against A)
//!                  └─ select_polygons ──► recompose_face per source face ──► Mesh
//! ```

use crate::classify::classify_object;
use crate::context::CsgContext;
use crate::csg::CsgObject;
use crate::csg::polygon::{CsgPolygon, FaceProperties, PolygonStatus, validate_loop};
use crate::csg::vertex::VertexKey;
use crate::errors::CsgError;
use crate::float_types::parry3d::bounding_volume::BoundingVolume;
use crate::mesh::{Face, Mesh, MeshId};
use crate::model::Model;
use crate::recompose::recompose_face;
use crate::spatial::SpatialIndex;
use crate::traits::CsgOps;
use hashbrown::HashMap;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

pub use crate::split::split_object;

/// Polygons of `A` kept by `A - B`.
pub const SUBTRACT_KEEP_A: &[PolygonStatus] = &[PolygonStatus::Outside, PolygonStatus::Opposite];
/// Polygons of `B` kept (reversed) by `A - B`.
pub const SUBTRACT_KEEP_B: &[PolygonStatus] = &[PolygonStatus::Inside];

/// Convert `mesh` into a solid whose vertices are minted by `ctx`.
///
/// Faces that are degenerate (fewer than three distinct points, zero area,
/// non-finite coordinates, dangling indices) are logged and dropped.
pub fn to_csg(ctx: &mut CsgContext, mesh: &Mesh) -> Result<CsgObject, CsgError> {
    let tolerance = ctx.distance_tolerance();
    let mut solid = CsgObject::new();
    for (index, face) in mesh.faces.iter().enumerate() {
        let points = match mesh
            .face_positions(face)
            .and_then(|points| validate_loop(&points, tolerance).map(|()| points))
        {
            Ok(points) => points,
            Err(err) => {
                warn!(mesh = ?mesh.id, face = index, %err, "dropping degenerate face");
                continue;
            },
        };
        let mut keys: Vec<VertexKey> = points.iter().map(|p| ctx.get_or_create_vertex(*p)).collect();
        keys.dedup();
        while keys.len() > 1 && keys.first() == keys.last() {
            keys.pop();
        }
        if keys.len() < 3 {
            warn!(mesh = ?mesh.id, face = index, "face collapsed after merging vertices");
            continue;
        }
        solid.add_polygon(CsgPolygon::new(keys, face.properties, index));
    }
    if solid.is_empty() {
        return Err(CsgError::EmptyOperand(mesh.id));
    }
    Ok(solid)
}

/// Clones of the polygons of `solid` whose status is in `keep`, reversed when
/// `flip` is set.
pub fn select_polygons(solid: &CsgObject, keep: &[PolygonStatus], flip: bool) -> Vec<CsgPolygon> {
    solid
        .polygons
        .values()
        .filter(|p| keep.contains(&p.status))
        .map(|p| if flip { p.flipped() } else { p.clone() })
        .collect()
}

/// What a subtraction does to its first operand.
#[derive(Debug, Clone, PartialEq)]
pub enum SubtractOutcome {
    /// The tool does not remove anything
    Unchanged,
    /// Nothing is left
    Removed,
    Replaced(Mesh),
}

/// `a - b`. `Ok(None)` when nothing of `a` is left; an unaffected `a` is
/// returned as is.
#[instrument(skip_all, fields(a = ?a.id, b = ?b.id))]
pub fn subtract(a: &Mesh, b: &Mesh) -> Result<Option<Mesh>, CsgError> {
    Ok(match subtract_outcome(a, b)? {
        SubtractOutcome::Unchanged => Some(a.clone()),
        SubtractOutcome::Removed => None,
        SubtractOutcome::Replaced(mesh) => Some(mesh),
    })
}

/// `a - b`, reporting whether `a` changed at all.
pub fn subtract_outcome(a: &Mesh, b: &Mesh) -> Result<SubtractOutcome, CsgError> {
    let (bounds_a, bounds_b) = (a.bounding_box(), b.bounding_box());
    if !bounds_a.intersects(&bounds_b) {
        debug!("bounding boxes do not overlap");
        return Ok(SubtractOutcome::Unchanged);
    }

    let mut ctx = CsgContext::for_operands(&bounds_a, &bounds_b);
    let mut solid_a = to_csg(&mut ctx, a)?;
    let mut solid_b = to_csg(&mut ctx, b)?;
    let (faces_a, faces_b) = (solid_a.len(), solid_b.len());

    split_object(&mut ctx, &mut solid_a, &solid_b);
    split_object(&mut ctx, &mut solid_b, &solid_a);
    split_object(&mut ctx, &mut solid_a, &solid_b);
    debug!(
        faces_a,
        faces_b,
        fragments_a = solid_a.len(),
        fragments_b = solid_b.len(),
        tolerance = ctx.distance_tolerance(),
        "split operands"
    );

    classify_object(&ctx, &mut solid_a, &solid_b);
    classify_object(&ctx, &mut solid_b, &solid_a);

    let a_untouched = solid_a
        .polygons
        .values()
        .all(|p| SUBTRACT_KEEP_A.contains(&p.status));
    if a_untouched && solid_b.count_status(PolygonStatus::Inside) == 0 {
        debug!("tool does not reach into the mesh");
        return Ok(SubtractOutcome::Unchanged);
    }

    let kept_a = select_polygons(&solid_a, SUBTRACT_KEEP_A, false);
    let kept_b = select_polygons(&solid_b, SUBTRACT_KEEP_B, true);
    let mesh = build_mesh(&ctx, a.id, [kept_a, kept_b]);
    if mesh.is_empty() {
        info!("subtraction removed the whole mesh");
        return Ok(SubtractOutcome::Removed);
    }
    if !mesh.is_watertight() {
        let open_edges = mesh.boundary_edges().len();
        warn!(open_edges, "subtraction produced an open mesh, discarding it");
        return Err(CsgError::InvalidResult { open_edges });
    }
    info!(faces_before = a.face_count(), faces_after = mesh.face_count(), "subtracted");
    Ok(SubtractOutcome::Replaced(mesh))
}

/// Recompose the kept polygons face by face and index their vertices.
///
/// Fragments are grouped by operand and source face, so a face of `A` and a
/// face of `B` never merge even when coplanar.
fn build_mesh<const N: usize>(ctx: &CsgContext, id: MeshId, operands: [Vec<CsgPolygon>; N]) -> Mesh {
    let mut groups: BTreeMap<(usize, usize), (FaceProperties, Vec<Vec<VertexKey>>)> = BTreeMap::new();
    for (operand, polygons) in operands.into_iter().enumerate() {
        for poly in polygons {
            groups
                .entry((operand, poly.source_face))
                .or_insert_with(|| (poly.properties, Vec::new()))
                .1
                .push(poly.vertices);
        }
    }

    let mut vertices = Vec::new();
    let mut index_of: HashMap<VertexKey, usize> = HashMap::new();
    let mut faces = Vec::new();
    for (properties, fragments) in groups.into_values() {
        for ring in recompose_face(fragments) {
            let vertex_ids = ring
                .iter()
                .map(|&key| {
                    *index_of.entry(key).or_insert_with(|| {
                        vertices.push(ctx.position(key));
                        vertices.len() - 1
                    })
                })
                .collect();
            faces.push(Face::new(vertex_ids, properties));
        }
    }
    Mesh::from_parts(id, vertices, faces)
}

fn outcome_in_model<M: Model + ?Sized>(model: &M, id: MeshId, tool: &Mesh) -> Result<SubtractOutcome, CsgError> {
    let mesh = model.get_mesh(id).ok_or(CsgError::UnknownMesh(id))?;
    subtract_outcome(mesh, tool)
}

/// Subtract `tool` from every mesh of `model` whose bounds meet the tool's.
///
/// Candidates come from `index`; the tool itself is skipped if the model holds
/// it. All results are computed before the model is touched, and a mesh whose
/// subtraction fails is left as it was. Returns whether any mesh changed.
#[instrument(skip_all, fields(tool = ?tool.id))]
pub fn subtract_mesh_from_model<M, S>(model: &mut M, index: &S, tool: &Mesh) -> bool
where
    M: Model + ?Sized,
    S: SpatialIndex + ?Sized,
{
    let mut candidates = index.intersected_by(&tool.bounding_box());
    candidates.sort();
    candidates.dedup();

    let mut outcomes = Vec::new();
    for id in candidates {
        if id == tool.id {
            continue;
        }
        match outcome_in_model(model, id, tool) {
            Ok(SubtractOutcome::Unchanged) => {},
            Ok(outcome) => outcomes.push((id, outcome)),
            Err(err) => warn!(mesh = ?id, %err, "subtraction failed, mesh left unchanged"),
        }
    }

    let changed = outcomes.len();
    for (id, outcome) in outcomes {
        match outcome {
            SubtractOutcome::Removed => {
                model.remove_mesh(id);
            },
            SubtractOutcome::Replaced(mesh) => {
                model.replace_mesh(mesh);
            },
            SubtractOutcome::Unchanged => {},
        }
    }
    info!(changed, "applied tool to model");
    changed > 0
}
