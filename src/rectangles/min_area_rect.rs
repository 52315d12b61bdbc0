//! Minimum-area enclosing rectangle of a point set and convex polygon fill.
//!
//! The rectangle is found with Andrew's monotone chain hull followed by
//! rotating calipers over the hull edges; one side of the optimal rectangle
//! is always collinear with a hull edge.
use imageproc::point::Point;
use nalgebra::{Point2, Vector2};
use serde::Serialize;

use crate::image::ImageU8;

/// Rotated rectangle: `width` runs along `angle` (radians), `height` across it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotatedRect {
    pub center: Point2<f64>,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
}

impl RotatedRect {
    /// Side lengths as `(long, short)`.
    pub fn sides(&self) -> (f64, f64) {
        if self.width > self.height {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        }
    }

    /// Corner points in traversal order.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let u = Vector2::new(self.angle.cos(), self.angle.sin()) * (self.width * 0.5);
        let v = Vector2::new(-self.angle.sin(), self.angle.cos()) * (self.height * 0.5);
        let c = self.center;
        [c - u - v, c + u - v, c + u + v, c - u + v]
    }
}

/// Smallest-area rectangle enclosing `points`, or `None` for an empty set.
pub fn min_area_rect(points: &[Point<i32>]) -> Option<RotatedRect> {
    let hull = convex_hull(points);
    match hull.len() {
        0 => None,
        1 => Some(RotatedRect {
            center: to_f64(hull[0]),
            width: 0.0,
            height: 0.0,
            angle: 0.0,
        }),
        2 => {
            let (a, b) = (to_f64(hull[0]), to_f64(hull[1]));
            let d = b - a;
            Some(RotatedRect {
                center: Point2::from((a.coords + b.coords) * 0.5),
                width: d.norm(),
                height: 0.0,
                angle: d.y.atan2(d.x),
            })
        }
        _ => Some(rotating_calipers(&hull)),
    }
}

fn to_f64(p: Point<i32>) -> Point2<f64> {
    Point2::new(p.x as f64, p.y as f64)
}

fn cross(o: Point<i32>, a: Point<i32>, b: Point<i32>) -> i64 {
    let (ox, oy) = (o.x as i64, o.y as i64);
    (a.x as i64 - ox) * (b.y as i64 - oy) - (a.y as i64 - oy) * (b.x as i64 - ox)
}

/// Counter-clockwise hull without collinear points. Collinear input collapses
/// to its two extreme points.
fn convex_hull(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut pts: Vec<Point<i32>> = points.to_vec();
    pts.sort_by_key(|p| (p.x, p.y));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Point<i32>> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Point<i32>> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn rotating_calipers(hull: &[Point<i32>]) -> RotatedRect {
    let pts: Vec<Point2<f64>> = hull.iter().map(|&p| to_f64(p)).collect();
    let n = pts.len();
    let mut best: Option<(f64, RotatedRect)> = None;

    for i in 0..n {
        let p1 = pts[i];
        let edge = pts[(i + 1) % n] - p1;
        let len = edge.norm();
        if len < 1e-12 {
            continue;
        }
        let u = edge / len;
        let v = Vector2::new(-u.y, u.x);

        let (mut min_u, mut max_u) = (f64::MAX, f64::MIN);
        let (mut min_v, mut max_v) = (f64::MAX, f64::MIN);
        for p in &pts {
            let d = p - p1;
            let pu = d.dot(&u);
            let pv = d.dot(&v);
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }

        let width = max_u - min_u;
        let height = max_v - min_v;
        let area = width * height;
        if best.as_ref().map_or(true, |(a, _)| area < *a) {
            let center = p1 + u * ((min_u + max_u) * 0.5) + v * ((min_v + max_v) * 0.5);
            best = Some((
                area,
                RotatedRect {
                    center,
                    width,
                    height,
                    angle: u.y.atan2(u.x),
                },
            ));
        }
    }

    best.map(|(_, r)| r).unwrap_or(RotatedRect {
        center: pts[0],
        width: 0.0,
        height: 0.0,
        angle: 0.0,
    })
}

/// Set every pixel whose centre lies inside or on the convex polygon `poly`.
///
/// Vertex coordinates are truncated toward zero first. Degenerate polygons
/// (segments, single points) rasterize to the pixels on them.
pub fn fill_convex_polygon(img: &mut ImageU8, poly: &[Point2<f64>], value: u8) {
    if poly.is_empty() || img.w == 0 || img.h == 0 {
        return;
    }
    let verts: Vec<(i64, i64)> = poly.iter().map(|p| (p.x as i64, p.y as i64)).collect();

    let x_min = verts.iter().map(|v| v.0).min().unwrap_or(0).max(0);
    let x_max = verts.iter().map(|v| v.0).max().unwrap_or(-1).min(img.w as i64 - 1);
    let y_min = verts.iter().map(|v| v.1).min().unwrap_or(0).max(0);
    let y_max = verts.iter().map(|v| v.1).max().unwrap_or(-1).min(img.h as i64 - 1);
    if x_min > x_max || y_min > y_max {
        return;
    }

    let n = verts.len();
    let edge_side = |i: usize, x: i64, y: i64| -> i64 {
        let (ax, ay) = verts[i];
        let (bx, by) = verts[(i + 1) % n];
        (bx - ax) * (y - ay) - (by - ay) * (x - ax)
    };
    let on_segment = |i: usize, x: i64, y: i64| -> bool {
        let (ax, ay) = verts[i];
        let (bx, by) = verts[(i + 1) % n];
        edge_side(i, x, y) == 0
            && x >= ax.min(bx)
            && x <= ax.max(bx)
            && y >= ay.min(by)
            && y <= ay.max(by)
    };

    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let mut pos = false;
            let mut neg = false;
            for i in 0..n {
                let s = edge_side(i, x, y);
                pos |= s > 0;
                neg |= s < 0;
            }
            let inside = !(pos && neg) && (pos || neg);
            if inside || (0..n).any(|i| on_segment(i, x, y)) {
                img.set(x as usize, y as usize, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(i32, i32)]) -> Vec<Point<i32>> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn axis_aligned_box() {
        let r = min_area_rect(&pts(&[(0, 0), (10, 0), (10, 4), (0, 4), (5, 2)])).unwrap();
        let (long, short) = r.sides();
        assert!((long - 10.0).abs() < 1e-9);
        assert!((short - 4.0).abs() < 1e-9);
        assert!((r.center.x - 5.0).abs() < 1e-9 && (r.center.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn diagonal_strip_is_thin() {
        let mut raw = Vec::new();
        for t in 0..20 {
            raw.push((t, t));
            raw.push((t + 1, t));
        }
        let r = min_area_rect(&pts(&raw)).unwrap();
        let (long, short) = r.sides();
        assert!(long > 26.0, "long side {long}");
        assert!(short < 1.0, "short side {short}");
    }

    #[test]
    fn collinear_points_have_zero_width() {
        let r = min_area_rect(&pts(&[(0, 0), (3, 0), (7, 0)])).unwrap();
        assert_eq!(r.sides(), (7.0, 0.0));
        assert!(min_area_rect(&[]).is_none());
    }

    #[test]
    fn corners_round_trip_to_extent() {
        let r = RotatedRect {
            center: Point2::new(10.0, 10.0),
            width: 8.0,
            height: 2.0,
            angle: 0.0,
        };
        let c = r.corners();
        assert_eq!(c[0], Point2::new(6.0, 9.0));
        assert_eq!(c[2], Point2::new(14.0, 11.0));
    }

    #[test]
    fn fill_includes_boundary() {
        let mut img = ImageU8::new(12, 12);
        let poly = [
            Point2::new(2.0, 3.0),
            Point2::new(8.0, 3.0),
            Point2::new(8.0, 5.0),
            Point2::new(2.0, 5.0),
        ];
        fill_convex_polygon(&mut img, &poly, 255);
        assert_eq!(img.count_nonzero(), 7 * 3);
        assert_eq!(img.get(2, 3), 255);
        assert_eq!(img.get(8, 5), 255);
        assert_eq!(img.get(9, 4), 0);
    }

    #[test]
    fn fill_degenerate_segment_and_clipping() {
        let mut img = ImageU8::new(10, 10);
        let seg = [Point2::new(1.0, 1.0), Point2::new(4.0, 1.0), Point2::new(4.0, 1.0)];
        fill_convex_polygon(&mut img, &seg, 255);
        assert_eq!(img.count_nonzero(), 4);

        let mut img = ImageU8::new(10, 10);
        let big = [
            Point2::new(-5.0, -5.0),
            Point2::new(20.0, -5.0),
            Point2::new(20.0, 20.0),
            Point2::new(-5.0, 20.0),
        ];
        fill_convex_polygon(&mut img, &big, 7);
        assert_eq!(img.count_nonzero(), 100);
    }
}
