//! Knickpoint reduction and profile-level attribute derivation.
//!
//! The simplifier keeps the two endpoints and grows the knickpoint set by
//! repeatedly inserting the interior point with the largest slope
//! discontinuity against its bracketing knickpoints, until no discontinuity
//! exceeds the tolerance. The driver is the change in segment gradient, not
//! perpendicular distance, so a long gentle ramp collapses to its endpoints
//! while a sharp break in gradient survives.

use crate::attributes::{Concavity, ProfileShape, ProfileSymmetry, SlopeClass};
use crate::config::FeaturePolarity;
use crate::profile::{Profile, ProfileAttributes, ProfileSample};

/// Signed gradient of the segment from `a` to `b`, in degrees. A zero-length
/// plan distance degenerates to a vertical step of ±90 degrees.
pub(crate) fn segment_slope_deg(a: &ProfileSample, b: &ProfileSample) -> f64 {
    let d = (b.x - a.x).hypot(b.y - a.y);
    let dz = b.z - a.z;
    if d == 0.0 {
        90.0_f64.copysign(dz)
    } else {
        (dz / d).atan().to_degrees()
    }
}

/// Reduce a profile to its knickpoints. Returns the ordered sample indices;
/// the first and last sample are always included, so the result has at least
/// two entries and never more than the sample count.
///
/// Re-running on a profile built from an already-simplified knickpoint set
/// yields the same set: every interior knickpoint was inserted because its
/// discontinuity exceeded the tolerance, and removing the points between two
/// knickpoints only sharpens that discontinuity.
pub fn simplify(profile: &Profile, tolerance_deg: f64) -> Vec<usize> {
    let n = profile.samples.len();
    let mut knicks = vec![0, n - 1];
    if n <= 2 {
        knicks.dedup();
        return knicks;
    }

    loop {
        let mut best: Option<(usize, f64)> = None;
        for pair in knicks.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            for i in lo + 1..hi {
                let left = segment_slope_deg(&profile.samples[lo], &profile.samples[i]);
                let right = segment_slope_deg(&profile.samples[i], &profile.samples[hi]);
                let deviation = (left - right).abs();
                if deviation > tolerance_deg && best.map_or(true, |(_, d)| deviation > d) {
                    best = Some((i, deviation));
                }
            }
        }
        match best {
            Some((i, _)) => {
                let pos = knicks.partition_point(|&k| k < i);
                knicks.insert(pos, i);
            }
            None => break,
        }
    }
    knicks
}

/// Classify an absolute gradient (degrees) into the closed slope categories.
fn slope_class(slope_deg: f64) -> SlopeClass {
    if slope_deg < 5.0 {
        SlopeClass::Flat
    } else if slope_deg < 10.0 {
        SlopeClass::Gentle
    } else if slope_deg < 30.0 {
        SlopeClass::Moderate
    } else {
        SlopeClass::Steep
    }
}

/// Pearson moment skewness of a sample; 0.0 for degenerate distributions.
fn skewness(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std < 1e-12 {
        return 0.0;
    }
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n;
    m3 / (std * std * std)
}

/// Derive the categorical and scalar attributes of one simplified profile.
///
/// The knickpoint polyline, closed by the segment from last back to first,
/// forms a polygon in the distance-depth plane. Its interior lies below the
/// polyline for a high feature and above it for a low feature, which decides
/// the sign of the interior-angle test used for concavity and shape.
pub fn profile_attributes(
    profile: &Profile,
    knicks: &[usize],
    polarity: FeaturePolarity,
) -> ProfileAttributes {
    let pts: Vec<&ProfileSample> = knicks.iter().map(|&i| &profile.samples[i]).collect();
    let k = pts.len();

    if k <= 2 {
        return ProfileAttributes {
            shape: ProfileShape::Flat,
            symmetry: ProfileSymmetry::Na,
            concavity: Concavity::Na,
            top_slope_class: SlopeClass::Na,
            side_slope_class: SlopeClass::Na,
            top_depth: None,
            relief: None,
            length: None,
        };
    }

    // Signed gradients and plan lengths of the consecutive knick segments.
    let slopes: Vec<f64> = pts.windows(2).map(|w| segment_slope_deg(w[0], w[1])).collect();
    let lengths: Vec<f64> = pts
        .windows(2)
        .map(|w| (w[1].x - w[0].x).hypot(w[1].y - w[0].y))
        .collect();

    // The two side segments are the first and the last.
    let (s1, s2) = (slopes[0].abs(), slopes[k - 2].abs());
    let (d1, d2) = (lengths[0], lengths[k - 2]);
    let side_slope = if d1 == 0.0 || d2 == 0.0 {
        (s1 + s2) / 2.0
    } else {
        let (w1, w2) = (1.0 / d1, 1.0 / d2);
        (s1 * w1 + s2 * w2) / (w1 + w2)
    };
    let side_slope_class = slope_class(side_slope);

    // Symmetry reads the full sample distribution, not only the knickpoints:
    // a symmetric peak keeps three knickpoints whose depth histogram is
    // skewed, while the dense samples along its flanks are balanced.
    let all_depths: Vec<f64> = profile.samples.iter().map(|p| p.z).collect();
    let symmetry = if skewness(&all_depths).abs() < 0.2 {
        ProfileSymmetry::Symmetric
    } else {
        ProfileSymmetry::Asymmetric
    };

    let depths: Vec<f64> = pts.iter().map(|p| p.z).collect();

    let (shape, concavity, top_slope_class) = if k == 3 {
        // Two segments only: a triangle has sides but no top.
        (ProfileShape::Triangle, Concavity::Convex, SlopeClass::NoTop)
    } else {
        let top: Vec<f64> = slopes[1..k - 2].iter().map(|s| s.abs()).collect();
        let top_slope = top.iter().sum::<f64>() / top.len() as f64;

        // Interior angle at each interior knickpoint. The turn is the change
        // of gradient; the polygon interior flips side with the polarity.
        let mut concave = false;
        for v in 1..k - 1 {
            let turn = slopes[v] - slopes[v - 1];
            let interior = match polarity {
                FeaturePolarity::High => 180.0 + turn,
                FeaturePolarity::Low => 180.0 - turn,
            };
            if interior > 180.0 + 1e-9 {
                concave = true;
                break;
            }
        }
        if concave {
            (ProfileShape::Irregular, Concavity::Concave, slope_class(top_slope))
        } else {
            (ProfileShape::Regular, Concavity::Convex, slope_class(top_slope))
        }
    };

    let z_max = depths.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let z_min = depths.iter().cloned().fold(f64::INFINITY, f64::min);

    ProfileAttributes {
        shape,
        symmetry,
        concavity,
        top_slope_class,
        side_slope_class,
        top_depth: Some(z_max.abs()),
        relief: Some(z_max - z_min),
        length: Some((pts[k - 1].x - pts[0].x).hypot(pts[k - 1].y - pts[0].y)),
    }
}
