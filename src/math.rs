//! Point and polygon predicates on planar loops.
//!
//! Everything here works on plain position slices so it can be shared by the
//! boundary representation, the splitter and the classifier.

use crate::float_types::Real;
use nalgebra::{Point2, Point3, Vector3};

/// Arithmetic mean of `points`. Not the area centroid.
pub fn barycenter(points: &[Point3<Real>]) -> Point3<Real> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as Real)
}

/// Area-weighted normal of a closed loop by Newell's method.
///
/// The result is **not** normalized; its length is twice the loop's area, which
/// makes it a cheap degeneracy test. It points towards the viewer for which the
/// loop runs counter-clockwise, i.e. outwards for a loop that is clockwise when
/// seen from inside the solid.
pub fn newell_normal(points: &[Point3<Real>]) -> Vector3<Real> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let current = points[i];
        let next = points[(i + 1) % n];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

/// Drops the coordinate along which `normal` is largest, so the remaining two axes
/// are the ones most orthogonal to the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    u: usize,
    v: usize,
}

impl Projection {
    pub fn for_normal(normal: &Vector3<Real>) -> Self {
        let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
        if ax >= ay && ax >= az {
            Projection { u: 1, v: 2 }
        } else if ay >= az {
            Projection { u: 2, v: 0 }
        } else {
            Projection { u: 0, v: 1 }
        }
    }

    #[inline]
    pub fn project(&self, p: &Point3<Real>) -> Point2<Real> {
        Point2::new(p[self.u], p[self.v])
    }
}

/// Distance from `p` to the segment `a`–`b`.
pub fn distance_to_segment(p: &Point3<Real>, a: &Point3<Real>, b: &Point3<Real>) -> Real {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Classify `point`, assumed coplanar with the loop `points`, as inside (`1`),
/// outside (`-1`) or on the boundary within `tolerance` (`0`).
///
/// Boundary contact is tested in 3D against every edge; the remaining cases use a
/// crossing-number test in the projection that drops the normal's dominant axis.
pub fn point_in_polygon(
    points: &[Point3<Real>],
    normal: &Vector3<Real>,
    point: &Point3<Real>,
    tolerance: Real,
) -> i8 {
    let n = points.len();
    if n < 3 {
        return -1;
    }
    for i in 0..n {
        if distance_to_segment(point, &points[i], &points[(i + 1) % n]) <= tolerance {
            return 0;
        }
    }

    let projection = Projection::for_normal(normal);
    let p = projection.project(point);
    let mut inside = false;
    for i in 0..n {
        let a = projection.project(&points[i]);
        let b = projection.project(&points[(i + 1) % n]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }
    if inside { 1 } else { -1 }
}

/// Smallest distance from `p` to an edge of the loop `points`.
fn clearance(points: &[Point3<Real>], p: &Point3<Real>) -> Real {
    let n = points.len();
    (0..n)
        .map(|i| distance_to_segment(p, &points[i], &points[(i + 1) % n]))
        .fold(Real::MAX, Real::min)
}

/// A point strictly inside the loop `points`.
///
/// The barycenter when it lies inside. Otherwise the centroid of a triangle made
/// of a vertex and its two neighbours: a simple loop has at least one such ear
/// inside it, and the one furthest from the boundary is taken. `None` if no
/// candidate lies strictly inside.
pub fn interior_point(
    points: &[Point3<Real>],
    normal: &Vector3<Real>,
    tolerance: Real,
) -> Option<Point3<Real>> {
    let center = barycenter(points);
    if point_in_polygon(points, normal, &center, tolerance) > 0 {
        return Some(center);
    }
    let n = points.len();
    (0..n)
        .map(|i| {
            let sum = points[(i + n - 1) % n].coords + points[i].coords + points[(i + 1) % n].coords;
            Point3::from(sum / 3.0)
        })
        .filter(|c| point_in_polygon(points, normal, c, tolerance) > 0)
        .map(|c| (clearance(points, &c), c))
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c)
}

/// Twice the signed area of the triangle `a`, `b`, `c`.
#[inline]
fn orient_2d(a: &Point2<Real>, b: &Point2<Real>, c: &Point2<Real>) -> Real {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// `true` when the closed segments `p1`–`p2` and `q1`–`q2` share at least one point.
/// Points closer than `tolerance` to the other segment count as touching.
pub fn segments_touch_2d(
    p1: &Point2<Real>,
    p2: &Point2<Real>,
    q1: &Point2<Real>,
    q2: &Point2<Real>,
    tolerance: Real,
) -> bool {
    let d1 = orient_2d(q1, q2, p1);
    let d2 = orient_2d(q1, q2, p2);
    let d3 = orient_2d(p1, p2, q1);
    let d4 = orient_2d(p1, p2, q2);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    let near = |p: &Point2<Real>, a: &Point2<Real>, b: &Point2<Real>| {
        let ab = b - a;
        let len_sq = ab.norm_squared();
        let t = if len_sq == 0.0 {
            0.0
        } else {
            ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0)
        };
        (p - (a + ab * t)).norm() <= tolerance
    };
    near(p1, q1, q2) || near(p2, q1, q2) || near(q1, p1, p2) || near(q2, p1, p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point3<Real>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn newell_normal_follows_winding() {
        let pts = square();
        let n = newell_normal(&pts);
        // clockwise seen from +z, so the normal points to -z
        assert!(n.z < 0.0);
        assert!((n.norm() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn interior_point_of_a_convex_loop_is_its_barycenter() {
        let pts = square();
        let normal = -newell_normal(&pts).normalize();
        let p = interior_point(&pts, &normal, 1e-9).unwrap();
        assert!((p - barycenter(&pts)).norm() < 1e-12);
    }

    #[test]
    fn interior_point_avoids_a_barycenter_on_the_boundary() {
        // a square with a notch cut from its lower side; the vertex mean lies on
        // the notch's top edge
        let pts = vec![
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, 2.0, 0.0),
            Point3::new(3.0, 2.0, 0.0),
        ];
        let normal = -newell_normal(&pts).normalize();
        assert_eq!(point_in_polygon(&pts, &normal, &barycenter(&pts), 1e-9), 0);

        let p = interior_point(&pts, &normal, 1e-9).unwrap();
        assert_eq!(point_in_polygon(&pts, &normal, &p, 1e-9), 1);
        assert!(clearance(&pts, &p) > 0.1);
    }

    #[test]
    fn touching_segments() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 0.0);
        assert!(segments_touch_2d(&a, &b, &Point2::new(1.0, -1.0), &Point2::new(1.0, 1.0), 1e-9));
        assert!(segments_touch_2d(&a, &b, &Point2::new(2.0, 0.0), &Point2::new(3.0, 1.0), 1e-9));
        assert!(!segments_touch_2d(&a, &b, &Point2::new(0.0, 1.0), &Point2::new(2.0, 1.0), 1e-9));
    }
}
