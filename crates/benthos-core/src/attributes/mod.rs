//! Per-polygon attribute computation: closed categorical types, the
//! attribute record, and the batch entry point.
//!
//! Every calculator takes an immutable polygon plus the execution context and
//! returns a new record; geometry is never mutated. Computation across
//! polygons is independent, so the batch map runs in parallel when the
//! `threading` feature is enabled, preserving order and surfacing every
//! per-polygon failure.

pub mod shape;
pub mod topographic;

use geo::Polygon;
use serde::{Deserialize, Serialize};

use crate::config::{ExecutionContext, FeaturePolarity};
use crate::error::AttributeError;
use crate::profile::{
    aggregate_attributes, build_profiles, mean_segment_slope, simplify::profile_attributes,
    simplify::simplify, ProfileAttributes,
};

// ── Categorical attribute types ──────────────────────────────────────────────

/// Gradient category of a profile segment group. `NoTop` marks a triangular
/// profile that has sides but no top segment; `Na` marks a flat profile with
/// no segments to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlopeClass {
    Flat,
    Gentle,
    Moderate,
    Steep,
    NoTop,
    Na,
}

impl SlopeClass {
    /// Preference order for majority-vote ties: flatter wins.
    pub(crate) fn vote_rank(self) -> u8 {
        match self {
            SlopeClass::Flat => 0,
            SlopeClass::Gentle => 1,
            SlopeClass::Moderate => 2,
            SlopeClass::Steep => 3,
            SlopeClass::NoTop => 4,
            SlopeClass::Na => 5,
        }
    }
}

/// Shape of a simplified profile: two knickpoints are flat, three form a
/// triangle, more form a polygon that is regular (convex) or irregular
/// (concave).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileShape {
    Flat,
    Triangle,
    Regular,
    Irregular,
}

impl ProfileShape {
    pub(crate) fn vote_rank(self) -> u8 {
        match self {
            ProfileShape::Flat => 0,
            ProfileShape::Regular => 1,
            ProfileShape::Triangle => 2,
            ProfileShape::Irregular => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileSymmetry {
    Symmetric,
    Asymmetric,
    Na,
}

impl ProfileSymmetry {
    pub(crate) fn vote_rank(self) -> u8 {
        match self {
            ProfileSymmetry::Symmetric => 0,
            ProfileSymmetry::Asymmetric => 1,
            ProfileSymmetry::Na => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Concavity {
    Convex,
    Concave,
    Na,
}

impl Concavity {
    pub(crate) fn vote_rank(self) -> u8 {
        match self {
            Concavity::Convex => 0,
            Concavity::Concave => 1,
            Concavity::Na => 2,
        }
    }
}

// ── The attribute record ─────────────────────────────────────────────────────

/// The full attribute set of one feature polygon. Scalar fields are `None`
/// when the underlying geometry is degenerate (a zero denominator, a hull
/// with fewer than three vertices) or the attribute does not apply to the
/// feature polarity. Depth fields are positive-down metres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeRecord {
    /// Index of the polygon in the batch input.
    pub feature: usize,
    pub area: f64,
    pub perimeter: f64,

    // Shape
    pub head_foot_length: Option<f64>,
    pub sinuous_length: Option<f64>,
    pub mean_width: Option<f64>,
    pub compactness: Option<f64>,
    pub sinuosity: Option<f64>,
    pub length_width_ratio: Option<f64>,
    pub circularity: Option<f64>,
    pub convexity: Option<f64>,
    pub solidity: Option<f64>,

    // Topographic
    pub min_depth: Option<f64>,
    pub max_depth: Option<f64>,
    pub depth_range: Option<f64>,
    pub mean_depth: Option<f64>,
    pub std_depth: Option<f64>,
    pub min_gradient: Option<f64>,
    pub max_gradient: Option<f64>,
    pub mean_gradient: Option<f64>,
    pub std_gradient: Option<f64>,
    /// Depth at the shallower end of the long-axis profile (low features).
    pub head_depth: Option<f64>,
    /// Depth at the deeper end of the long-axis profile (low features).
    pub foot_depth: Option<f64>,
    pub head_foot_depth_range: Option<f64>,
    /// atan(head_foot_depth_range / head_foot_length) in degrees.
    pub head_foot_gradient: Option<f64>,
    /// Mean absolute slope of the head–thalweg–foot segment chain
    /// (low features).
    pub mean_segment_slope: Option<f64>,

    // Profile
    pub profile_shape: ProfileShape,
    pub profile_symmetry: ProfileSymmetry,
    pub profile_concavity: Concavity,
    pub profile_top_slope_class: SlopeClass,
    pub profile_side_slope_class: SlopeClass,
    pub profile_top_depth: Option<f64>,
    pub profile_relief: Option<f64>,
    pub profile_length: Option<f64>,
}

// ── Computation ──────────────────────────────────────────────────────────────

/// Compute the full attribute record for one polygon.
pub fn compute_attribute_record(
    poly: &Polygon<f64>,
    feature: usize,
    ctx: &ExecutionContext,
) -> Result<AttributeRecord, AttributeError> {
    let shape = shape::compute_shape(poly);

    let profiles = build_profiles(poly, feature, ctx)?;
    let per: Vec<ProfileAttributes> = profiles
        .iter()
        .map(|p| {
            let knicks = simplify(p, ctx.knick_tolerance_deg);
            profile_attributes(p, &knicks, ctx.polarity)
        })
        .collect();
    let prof = aggregate_attributes(&per);

    let topo = topographic::compute_topographic(
        poly,
        feature,
        ctx,
        profiles.first(),
        shape.head_foot_length,
    )?;

    let mean_segment_slope = match ctx.polarity {
        FeaturePolarity::Low => mean_segment_slope(&profiles),
        FeaturePolarity::High => None,
    };

    Ok(AttributeRecord {
        feature,
        area: shape.area,
        perimeter: shape.perimeter,
        head_foot_length: shape.head_foot_length,
        sinuous_length: shape.sinuous_length,
        mean_width: shape.mean_width,
        compactness: shape.compactness,
        sinuosity: shape.sinuosity,
        length_width_ratio: shape.length_width_ratio,
        circularity: shape.circularity,
        convexity: shape.convexity,
        solidity: shape.solidity,
        min_depth: topo.min_depth,
        max_depth: topo.max_depth,
        depth_range: topo.depth_range,
        mean_depth: topo.mean_depth,
        std_depth: topo.std_depth,
        min_gradient: topo.min_gradient,
        max_gradient: topo.max_gradient,
        mean_gradient: topo.mean_gradient,
        std_gradient: topo.std_gradient,
        head_depth: topo.head_depth,
        foot_depth: topo.foot_depth,
        head_foot_depth_range: topo.head_foot_depth_range,
        head_foot_gradient: topo.head_foot_gradient,
        mean_segment_slope,
        profile_shape: prof.shape,
        profile_symmetry: prof.symmetry,
        profile_concavity: prof.concavity,
        profile_top_slope_class: prof.top_slope_class,
        profile_side_slope_class: prof.side_slope_class,
        profile_top_depth: prof.top_depth,
        profile_relief: prof.relief,
        profile_length: prof.length,
    })
}

/// Compute attribute records for a batch of polygons.
///
/// The result has exactly one entry per input polygon, in input order; a
/// failed polygon carries its error instead of being dropped. With the
/// `threading` feature the map fans out across a work-stealing pool with no
/// shared mutable state between polygons.
#[cfg(feature = "threading")]
pub fn compute_attributes(
    polygons: &[Polygon<f64>],
    ctx: &ExecutionContext,
) -> Vec<Result<AttributeRecord, AttributeError>> {
    use rayon::prelude::*;
    polygons
        .par_iter()
        .enumerate()
        .map(|(i, poly)| compute_attribute_record(poly, i, ctx))
        .collect()
}

/// Serial fallback used when the `threading` feature is disabled.
#[cfg(not(feature = "threading"))]
pub fn compute_attributes(
    polygons: &[Polygon<f64>],
    ctx: &ExecutionContext,
) -> Vec<Result<AttributeRecord, AttributeError>> {
    polygons
        .iter()
        .enumerate()
        .map(|(i, poly)| compute_attribute_record(poly, i, ctx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdConfig;
    use crate::grid::BathyGrid;
    use geo::polygon;

    /// A seamount-like grid: a broad cone rising from a -1500 m plain.
    fn cone_grid(n: usize, cell: f64) -> BathyGrid {
        let mut g = BathyGrid::filled(n, n, 0.0, 0.0, cell, -1500.0);
        let cx = (n / 2) as f64;
        let cy = (n / 2) as f64;
        let radius = n as f64 * 0.4;
        for row in 0..n {
            for col in 0..n {
                let r = ((col as f64 - cx).powi(2) + (row as f64 - cy).powi(2)).sqrt();
                if r < radius {
                    let rise = 1200.0 * (1.0 - r / radius);
                    g.set(row, col, (-1500.0 + rise) as f32);
                }
            }
        }
        g
    }

    #[test]
    fn batch_preserves_count_order_and_failures() {
        let bathy = cone_grid(64, 100.0);
        let slope = BathyGrid::filled(64, 64, 0.0, 0.0, 100.0, 10.0);
        let ctx = ExecutionContext::new(
            &bathy,
            &slope,
            ThresholdConfig::default(),
            FeaturePolarity::High,
        )
        .unwrap();

        let good = polygon![
            (x: 1000.0, y: 1000.0),
            (x: 5000.0, y: 1000.0),
            (x: 5000.0, y: 5000.0),
            (x: 1000.0, y: 5000.0),
            (x: 1000.0, y: 1000.0),
        ];
        // Far outside the grid: every chord sample is out of bounds.
        let outside = polygon![
            (x: 1.0e6, y: 1.0e6),
            (x: 1.1e6, y: 1.0e6),
            (x: 1.1e6, y: 1.1e6),
            (x: 1.0e6, y: 1.1e6),
            (x: 1.0e6, y: 1.0e6),
        ];

        let results = compute_attributes(&[good.clone(), outside, good], &ctx);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
        assert_eq!(results[0].as_ref().unwrap().feature, 0);
        assert_eq!(results[2].as_ref().unwrap().feature, 2);
    }

    #[test]
    fn record_fields_are_populated_for_a_cone() {
        let bathy = cone_grid(64, 100.0);
        let slope = BathyGrid::filled(64, 64, 0.0, 0.0, 100.0, 20.0);
        let ctx = ExecutionContext::new(
            &bathy,
            &slope,
            ThresholdConfig::default(),
            FeaturePolarity::High,
        )
        .unwrap();

        let poly = polygon![
            (x: 800.0, y: 800.0),
            (x: 5600.0, y: 800.0),
            (x: 5600.0, y: 5600.0),
            (x: 800.0, y: 5600.0),
            (x: 800.0, y: 800.0),
        ];
        let rec = compute_attribute_record(&poly, 7, &ctx).unwrap();
        assert_eq!(rec.feature, 7);
        assert!(rec.area > 0.0);
        assert!(rec.depth_range.unwrap() > 500.0);
        assert!(rec.min_depth.unwrap() < rec.max_depth.unwrap());
        assert!(rec.compactness.unwrap() > 0.0);
        // A cone rises toward the centre, so the profile is not flat.
        assert_ne!(rec.profile_shape, ProfileShape::Flat);
        assert!(rec.profile_relief.unwrap() > 0.0);
        // High-polarity runs do not compute the low-feature chain slope.
        assert!(rec.mean_segment_slope.is_none());
    }
}
