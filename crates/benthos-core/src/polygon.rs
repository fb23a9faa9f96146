//! Thin adapters over the 2D geometry library: minimum bounding rectangle
//! metrics, boundary chords for profile construction, and shared-boundary
//! measurement for the consolidation step.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{BoundingRect, Coord, Line, MinimumRotatedRect, Polygon};

/// Length, width and orientation of a polygon's minimum bounding rectangle.
/// Orientation is the angle of the long axis in radians, measured
/// counter-clockwise from the +x axis.
#[derive(Debug, Clone, Copy)]
pub struct MbrMetrics {
    pub length: f64,
    pub width: f64,
    pub orientation_rad: f64,
    /// Centre of the rectangle (midpoint of its diagonal).
    pub centre: Coord<f64>,
}

/// Compute minimum-bounding-rectangle metrics for a polygon.
/// Returns None for degenerate geometry (no rectangle, or zero-length axis).
pub fn mbr_metrics(poly: &Polygon<f64>) -> Option<MbrMetrics> {
    let mbr = poly.minimum_rotated_rect()?;
    let coords: Vec<Coord<f64>> = mbr.exterior().coords().copied().collect();
    if coords.len() < 4 {
        return None;
    }
    let v1 = Coord {
        x: coords[1].x - coords[0].x,
        y: coords[1].y - coords[0].y,
    };
    let v2 = Coord {
        x: coords[2].x - coords[1].x,
        y: coords[2].y - coords[1].y,
    };
    let l1 = (v1.x * v1.x + v1.y * v1.y).sqrt();
    let l2 = (v2.x * v2.x + v2.y * v2.y).sqrt();
    let (long, length, width) = if l1 >= l2 { (v1, l1, l2) } else { (v2, l2, l1) };
    if length <= 0.0 {
        return None;
    }
    Some(MbrMetrics {
        length,
        width,
        orientation_rad: long.y.atan2(long.x),
        centre: Coord {
            x: (coords[0].x + coords[2].x) / 2.0,
            y: (coords[0].y + coords[2].y) / 2.0,
        },
    })
}

/// Intersect a line through `origin` at `angle_rad` with the polygon's
/// exterior ring, returning the two extreme crossing points. None when the
/// line misses the boundary or only grazes it at a single point.
pub fn chord_through(
    poly: &Polygon<f64>,
    origin: Coord<f64>,
    angle_rad: f64,
) -> Option<(Coord<f64>, Coord<f64>)> {
    let rect = poly.bounding_rect()?;
    let reach = rect.width() + rect.height();
    if reach <= 0.0 {
        return None;
    }
    let u = Coord {
        x: angle_rad.cos(),
        y: angle_rad.sin(),
    };
    let probe = Line::new(
        Coord {
            x: origin.x - reach * u.x,
            y: origin.y - reach * u.y,
        },
        Coord {
            x: origin.x + reach * u.x,
            y: origin.y + reach * u.y,
        },
    );

    let t_of = |p: Coord<f64>| (p.x - origin.x) * u.x + (p.y - origin.y) * u.y;
    let mut t_min = f64::INFINITY;
    let mut t_max = f64::NEG_INFINITY;
    for segment in poly.exterior().lines() {
        match line_intersection(probe, segment) {
            Some(LineIntersection::SinglePoint { intersection, .. }) => {
                let t = t_of(intersection);
                t_min = t_min.min(t);
                t_max = t_max.max(t);
            }
            Some(LineIntersection::Collinear { intersection }) => {
                for p in [intersection.start, intersection.end] {
                    let t = t_of(p);
                    t_min = t_min.min(t);
                    t_max = t_max.max(t);
                }
            }
            None => {}
        }
    }
    if !t_min.is_finite() || t_max - t_min < 1e-9 {
        return None;
    }
    let at = |t: f64| Coord {
        x: origin.x + t * u.x,
        y: origin.y + t * u.y,
    };
    Some((at(t_min), at(t_max)))
}

/// Total length of boundary shared between two polygons, accumulated from
/// collinear overlaps of their exterior segments. Zero means the polygons are
/// not edge-adjacent (point contact does not count).
pub fn shared_boundary_length(a: &Polygon<f64>, b: &Polygon<f64>) -> f64 {
    let mut total = 0.0;
    for sa in a.exterior().lines() {
        for sb in b.exterior().lines() {
            if let Some(LineIntersection::Collinear { intersection }) = line_intersection(sa, sb) {
                total += plan_distance(intersection.start, intersection.end);
            }
        }
    }
    total
}

/// Euclidean distance between two plan coordinates.
#[inline]
pub fn plan_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::polygon;

    #[test]
    fn mbr_metrics_of_axis_aligned_rectangle() {
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 40.0, y: 0.0),
            (x: 40.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ];
        let m = mbr_metrics(&poly).unwrap();
        assert_relative_eq!(m.length, 40.0, epsilon = 1e-6);
        assert_relative_eq!(m.width, 10.0, epsilon = 1e-6);
        // Long axis parallel to x: orientation 0 or pi.
        let ang = m.orientation_rad.sin().abs();
        assert!(ang < 1e-6, "long axis should be horizontal, got {}", m.orientation_rad);
    }

    #[test]
    fn chord_through_centroid_spans_the_polygon() {
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 40.0, y: 0.0),
            (x: 40.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ];
        let (a, b) = chord_through(&poly, Coord { x: 20.0, y: 5.0 }, 0.0).unwrap();
        assert_relative_eq!(plan_distance(a, b), 40.0, epsilon = 1e-6);
    }

    #[test]
    fn chord_missing_the_polygon_is_none() {
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ];
        assert!(chord_through(&poly, Coord { x: 50.0, y: 50.0 }, 0.0).is_none());
    }

    #[test]
    fn shared_boundary_of_adjacent_squares() {
        let a = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ];
        let b = polygon![
            (x: 10.0, y: 2.0),
            (x: 20.0, y: 2.0),
            (x: 20.0, y: 8.0),
            (x: 10.0, y: 8.0),
            (x: 10.0, y: 2.0),
        ];
        assert_relative_eq!(shared_boundary_length(&a, &b), 6.0, epsilon = 1e-6);
        // Disjoint polygons share nothing.
        let c = polygon![
            (x: 100.0, y: 100.0),
            (x: 110.0, y: 100.0),
            (x: 110.0, y: 110.0),
            (x: 100.0, y: 100.0),
        ];
        assert_eq!(shared_boundary_length(&a, &c), 0.0);
    }
}
