//! Planimetric shape attributes: MBR-derived lengths, cross-section widths,
//! and the dimensionless ratios built from them.

use geo::{Area, ConvexHull, Coord, EuclideanLength, Polygon};

use crate::polygon::{chord_through, mbr_metrics, plan_distance};

/// Number of evenly spaced cross-sections used for the width estimate.
const CROSS_SECTIONS: usize = 10;

/// Planimetric attributes of one polygon. Ratios are `None` when a
/// denominator degenerates to zero.
#[derive(Debug, Clone)]
pub struct ShapeResult {
    pub area: f64,
    pub perimeter: f64,
    /// Long-axis length of the minimum bounding rectangle.
    pub head_foot_length: Option<f64>,
    /// Length of the medial path threaded through the cross-section midpoints.
    pub sinuous_length: Option<f64>,
    pub mean_width: Option<f64>,
    pub compactness: Option<f64>,
    pub sinuosity: Option<f64>,
    pub length_width_ratio: Option<f64>,
    pub circularity: Option<f64>,
    pub convexity: Option<f64>,
    pub solidity: Option<f64>,
}

/// Compute shape attributes for a polygon.
///
/// Cross-sections are chords perpendicular to the MBR long axis, taken at
/// evenly spaced stations along the axis through the rectangle centre. The
/// medial path joins the long-axis chord head, the cross-section midpoints
/// ordered along the axis, and the long-axis chord foot; its length captures
/// sinuosity that the straight MBR length misses.
pub fn compute_shape(poly: &Polygon<f64>) -> ShapeResult {
    let area = poly.unsigned_area();
    let perimeter = poly.exterior().euclidean_length();

    let hull = poly.convex_hull();
    let hull_area = hull.unsigned_area();
    let hull_perimeter = hull.exterior().euclidean_length();

    let mut result = ShapeResult {
        area,
        perimeter,
        head_foot_length: None,
        sinuous_length: None,
        mean_width: None,
        compactness: ratio(4.0 * std::f64::consts::PI * area, perimeter * perimeter),
        sinuosity: None,
        length_width_ratio: None,
        circularity: ratio(
            4.0 * std::f64::consts::PI * area,
            hull_perimeter * hull_perimeter,
        ),
        convexity: ratio(hull_perimeter, perimeter),
        solidity: ratio(area, hull_area),
    };

    let Some(mbr) = mbr_metrics(poly) else {
        return result;
    };
    result.head_foot_length = Some(mbr.length);

    let axis = Coord {
        x: mbr.orientation_rad.cos(),
        y: mbr.orientation_rad.sin(),
    };
    let perp = mbr.orientation_rad + std::f64::consts::FRAC_PI_2;

    // Station parameters along the long axis, strictly inside the rectangle
    // so every perpendicular chord can cross the boundary.
    let mut widths = Vec::with_capacity(CROSS_SECTIONS);
    let mut midpoints: Vec<(f64, Coord<f64>)> = Vec::with_capacity(CROSS_SECTIONS);
    for i in 0..CROSS_SECTIONS {
        let t = mbr.length * ((i as f64 + 0.5) / CROSS_SECTIONS as f64 - 0.5);
        let station = Coord {
            x: mbr.centre.x + t * axis.x,
            y: mbr.centre.y + t * axis.y,
        };
        if let Some((a, b)) = chord_through(poly, station, perp) {
            widths.push(plan_distance(a, b));
            midpoints.push((
                t,
                Coord {
                    x: (a.x + b.x) / 2.0,
                    y: (a.y + b.y) / 2.0,
                },
            ));
        }
    }
    if !widths.is_empty() {
        result.mean_width = Some(widths.iter().sum::<f64>() / widths.len() as f64);
    }

    // Medial path: head, ordered midpoints, foot.
    if let Some((head, foot)) = chord_through(poly, mbr.centre, mbr.orientation_rad) {
        midpoints.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut path = Vec::with_capacity(midpoints.len() + 2);
        path.push(head);
        path.extend(midpoints.iter().map(|(_, p)| *p));
        path.push(foot);
        let sinuous: f64 = path.windows(2).map(|w| plan_distance(w[0], w[1])).sum();
        result.sinuous_length = Some(sinuous);
        result.sinuosity = ratio(sinuous, mbr.length);
        if let Some(w) = result.mean_width {
            result.length_width_ratio = ratio(sinuous, w);
        }
    }

    result
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    if den > 0.0 {
        Some(num / den)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::polygon;

    fn rectangle(length: f64, width: f64) -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: length, y: 0.0),
            (x: length, y: width),
            (x: 0.0, y: width),
            (x: 0.0, y: 0.0),
        ]
    }

    #[test]
    fn rectangle_shape_attributes() {
        let s = compute_shape(&rectangle(40.0, 10.0));
        assert_relative_eq!(s.area, 400.0, epsilon = 1e-9);
        assert_relative_eq!(s.perimeter, 100.0, epsilon = 1e-9);
        assert_relative_eq!(s.head_foot_length.unwrap(), 40.0, epsilon = 1e-6);
        // All perpendicular chords of a rectangle equal its width.
        assert_relative_eq!(s.mean_width.unwrap(), 10.0, epsilon = 1e-6);
        // The medial path of a straight rectangle is the axis itself.
        assert_relative_eq!(s.sinuous_length.unwrap(), 40.0, epsilon = 1e-6);
        assert_relative_eq!(s.sinuosity.unwrap(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(s.length_width_ratio.unwrap(), 4.0, epsilon = 1e-6);
        // A convex polygon is its own hull.
        assert_relative_eq!(s.convexity.unwrap(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(s.solidity.unwrap(), 1.0, epsilon = 1e-9);
        // Compactness of a rectangle: 4*pi*400 / 100^2.
        assert_relative_eq!(s.compactness.unwrap(), 0.502654824574, epsilon = 1e-9);
        assert_relative_eq!(s.circularity.unwrap(), s.compactness.unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn elongate_feature_has_high_length_width_ratio() {
        let s = compute_shape(&rectangle(1000.0, 50.0));
        assert!(s.length_width_ratio.unwrap() > 8.0);
        assert!(s.compactness.unwrap() < 0.3);
    }

    #[test]
    fn notched_polygon_is_less_solid_than_its_hull() {
        // A square with a deep rectangular notch cut into the top edge.
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 0.0),
            (x: 100.0, y: 100.0),
            (x: 60.0, y: 100.0),
            (x: 60.0, y: 30.0),
            (x: 40.0, y: 30.0),
            (x: 40.0, y: 100.0),
            (x: 0.0, y: 100.0),
            (x: 0.0, y: 0.0),
        ];
        let s = compute_shape(&poly);
        // Area 10000 - notch 20*70 = 8600; hull area 10000.
        assert_relative_eq!(s.solidity.unwrap(), 0.86, epsilon = 1e-9);
        assert!(s.convexity.unwrap() < 1.0);
    }

    #[test]
    fn degenerate_polygon_yields_none_ratios() {
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 0.0, y: 0.0),
            (x: 0.0, y: 0.0),
        ];
        let s = compute_shape(&poly);
        assert_eq!(s.area, 0.0);
        assert!(s.compactness.is_none());
        assert!(s.head_foot_length.is_none());
    }
}
