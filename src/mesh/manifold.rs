use crate::float_types::Real;
use crate::mesh::Mesh;
use hashbrown::HashMap;
use nalgebra::Point3;

const QUANTIZATION_FACTOR: Real = 1e7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct QuantizedPoint(i64, i64, i64);

fn quantize_point(p: &Point3<Real>) -> QuantizedPoint {
    QuantizedPoint(
        (p.x * QUANTIZATION_FACTOR).round() as i64,
        (p.y * QUANTIZATION_FACTOR).round() as i64,
        (p.z * QUANTIZATION_FACTOR).round() as i64,
    )
}

impl Mesh {
    /// Directed edge counts keyed by quantized endpoint positions.
    fn directed_edges(&self) -> HashMap<(QuantizedPoint, QuantizedPoint), u32> {
        let mut counts = HashMap::new();
        for face in &self.faces {
            let Ok(points) = self.face_positions(face) else {
                continue;
            };
            let n = points.len();
            for i in 0..n {
                let a = quantize_point(&points[i]);
                let b = quantize_point(&points[(i + 1) % n]);
                *counts.entry((a, b)).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Checks whether the mesh is a closed, consistently oriented surface.
    ///
    /// ### Returns
    /// `true` if every directed edge `a → b` appears exactly once and is matched by
    /// exactly one `b → a`, and no face refers to a missing vertex.
    ///
    /// ### Notes:
    /// - Positions are compared after quantization, so meshes that duplicate
    ///   vertices per face are handled.
    /// - A mesh without faces is not watertight.
    pub fn is_watertight(&self) -> bool {
        if self.faces.is_empty() || self.faces.iter().any(|f| self.face_positions(f).is_err()) {
            return false;
        }
        let counts = self.directed_edges();
        counts
            .iter()
            .all(|(&(a, b), &count)| count == 1 && counts.get(&(b, a)) == Some(&1))
    }

    /// Edges `(from, to)` lacking a single matching reverse edge, sorted.
    pub fn boundary_edges(&self) -> Vec<(Point3<Real>, Point3<Real>)> {
        let counts = self.directed_edges();
        let mut open: Vec<(QuantizedPoint, QuantizedPoint)> = counts
            .iter()
            .filter(|&(&(a, b), &count)| count != 1 || counts.get(&(b, a)) != Some(&1))
            .map(|(&edge, _)| edge)
            .collect();
        open.sort();
        let unquantize = |q: QuantizedPoint| {
            Point3::new(
                q.0 as Real / QUANTIZATION_FACTOR,
                q.1 as Real / QUANTIZATION_FACTOR,
                q.2 as Real / QUANTIZATION_FACTOR,
            )
        };
        open.into_iter()
            .map(|(a, b)| (unquantize(a), unquantize(b)))
            .collect()
    }
}
