//! Topographic attributes: depth and gradient statistics over the cells a
//! polygon covers, plus the head/foot depths read off the long-axis profile.

use geo::Polygon;

use crate::config::{ExecutionContext, FeaturePolarity};
use crate::error::AttributeError;
use crate::profile::Profile;

/// Zonal statistics for one polygon. Depths are positive-down metres;
/// gradients are whatever unit the slope grid carries (degrees by
/// convention).
#[derive(Debug, Clone, Default)]
pub struct TopographicResult {
    /// Shallowest depth inside the polygon.
    pub min_depth: Option<f64>,
    /// Deepest depth inside the polygon.
    pub max_depth: Option<f64>,
    pub depth_range: Option<f64>,
    pub mean_depth: Option<f64>,
    pub std_depth: Option<f64>,
    pub min_gradient: Option<f64>,
    pub max_gradient: Option<f64>,
    pub mean_gradient: Option<f64>,
    pub std_gradient: Option<f64>,
    pub head_depth: Option<f64>,
    pub foot_depth: Option<f64>,
    pub head_foot_depth_range: Option<f64>,
    pub head_foot_gradient: Option<f64>,
}

/// Compute zonal depth and gradient statistics.
///
/// `long_profile` is the cross-section along the MBR long axis; its shallower
/// endpoint is the head and its deeper endpoint the foot. Head/foot fields
/// apply to low features only and stay `None` for high-polarity runs.
/// A polygon covering no bathymetry cells is an error; a polygon covering no
/// slope cells merely leaves the gradient fields empty.
pub fn compute_topographic(
    poly: &Polygon<f64>,
    feature: usize,
    ctx: &ExecutionContext,
    long_profile: Option<&Profile>,
    head_foot_length: Option<f64>,
) -> Result<TopographicResult, AttributeError> {
    let elevations = ctx.bathymetry.values_in(poly);
    if elevations.is_empty() {
        return Err(AttributeError::NoRasterCoverage { feature });
    }
    // Grids store elevation, negative below datum; records report depth
    // positive-down, so the deepest cell has the most negative elevation.
    let depths: Vec<f64> = elevations.iter().map(|&z| -(z as f64)).collect();
    let (d_min, d_max, d_mean, d_std) = stats(&depths);

    let mut result = TopographicResult {
        min_depth: Some(d_min),
        max_depth: Some(d_max),
        depth_range: Some(d_max - d_min),
        mean_depth: Some(d_mean),
        std_depth: Some(d_std),
        ..TopographicResult::default()
    };

    let gradients: Vec<f64> = ctx
        .slope
        .values_in(poly)
        .iter()
        .map(|&g| g as f64)
        .collect();
    if !gradients.is_empty() {
        let (g_min, g_max, g_mean, g_std) = stats(&gradients);
        result.min_gradient = Some(g_min);
        result.max_gradient = Some(g_max);
        result.mean_gradient = Some(g_mean);
        result.std_gradient = Some(g_std);
    }

    if ctx.polarity == FeaturePolarity::Low {
        if let Some(profile) = long_profile {
            let (da, db) = (-profile.first().z, -profile.last().z);
            let head = da.min(db);
            let foot = da.max(db);
            let range = foot - head;
            result.head_depth = Some(head);
            result.foot_depth = Some(foot);
            result.head_foot_depth_range = Some(range);
            if let Some(len) = head_foot_length {
                if len > 0.0 {
                    result.head_foot_gradient = Some((range / len).atan().to_degrees());
                }
            }
        }
    }

    Ok(result)
}

fn stats(values: &[f64]) -> (f64, f64, f64, f64) {
    let n = values.len() as f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    let mean = sum / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (min, max, mean, var.sqrt())
}
