//! Decision-tree classification of attribute records into feature types.
//!
//! Both trees are pure functions over an `AttributeRecord` and the threshold
//! configuration: no state, no side effects, and every record maps to
//! exactly one label. A missing attribute never satisfies a condition, so a
//! degenerate record falls through to the tree's final branch.

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeRecord, ProfileShape, ProfileSymmetry, SlopeClass};
use crate::config::{FeaturePolarity, ThresholdConfig};

/// Labels for bathymetric highs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighFeatureType {
    Ridge,
    Seamount,
    Pinnacle,
    Cone,
    Bank,
    Plateau,
    Knoll,
    Hill,
    Hummock,
    Mound,
}

/// Labels for bathymetric lows. `Channel` is reserved: the source rules
/// never settled how to tell a channel from a valley, so the elongate
/// fallback always emits `Valley`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LowFeatureType {
    Trench,
    Trough,
    Gully,
    Canyon,
    Valley,
    Channel,
    Hole,
    Depression,
}

/// A classification result of either polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    High(HighFeatureType),
    Low(LowFeatureType),
}

/// Classify one record according to its polarity.
pub fn classify(
    record: &AttributeRecord,
    polarity: FeaturePolarity,
    thresholds: &ThresholdConfig,
) -> FeatureType {
    match polarity {
        FeaturePolarity::High => FeatureType::High(classify_high(record, thresholds)),
        FeaturePolarity::Low => FeatureType::Low(classify_low(record, thresholds)),
    }
}

/// High-feature tree, evaluated top to bottom; the first matching rule wins.
pub fn classify_high(record: &AttributeRecord, t: &ThresholdConfig) -> HighFeatureType {
    let side_moderate_or_steep = matches!(
        record.profile_side_slope_class,
        SlopeClass::Moderate | SlopeClass::Steep
    );

    if ge(record.length_width_ratio, t.ridge_lw_ratio) {
        HighFeatureType::Ridge
    } else if ge(record.depth_range, 1000.0) {
        HighFeatureType::Seamount
    } else if ge_opt(record.depth_range, record.mean_width) {
        HighFeatureType::Pinnacle
    } else if record.profile_shape == ProfileShape::Triangle
        && side_moderate_or_steep
        && ge(record.circularity, t.cone_circularity)
    {
        HighFeatureType::Cone
    } else if record.profile_top_slope_class == SlopeClass::Flat
        && le(record.min_depth, t.bank_min_depth)
        && record.area >= t.bank_area
    {
        HighFeatureType::Bank
    } else if record.profile_top_slope_class == SlopeClass::Flat
        && record.area > t.plateau_area
        && side_moderate_or_steep
    {
        HighFeatureType::Plateau
    } else if ge(record.depth_range, 500.0) {
        if record.profile_shape == ProfileShape::Regular {
            HighFeatureType::Knoll
        } else {
            HighFeatureType::Hill
        }
    } else if le(record.depth_range, t.hummock_depth_range) && record.area <= t.hummock_area {
        HighFeatureType::Hummock
    } else {
        HighFeatureType::Mound
    }
}

/// Low-feature tree, evaluated top to bottom; the first matching rule wins.
pub fn classify_low(record: &AttributeRecord, t: &ThresholdConfig) -> LowFeatureType {
    let slope = profile_slope(record);
    let side_moderate_or_steep = matches!(
        record.profile_side_slope_class,
        SlopeClass::Moderate | SlopeClass::Steep
    );

    if ge(record.length_width_ratio, t.lw_ratio) {
        if ge(record.head_depth, t.head_depth) {
            if record.profile_symmetry == ProfileSymmetry::Asymmetric
                && matches!(slope, SlopeClass::Steep | SlopeClass::Moderate)
            {
                LowFeatureType::Trench
            } else {
                LowFeatureType::Trough
            }
        } else if ge(record.mean_segment_slope, t.mean_segment_slope_t1)
            && side_moderate_or_steep
        {
            LowFeatureType::Gully
        } else if ge(record.head_foot_depth_range, t.head_foot_depth_range)
            && ge(record.mean_segment_slope, t.mean_segment_slope_t2)
        {
            LowFeatureType::Canyon
        } else {
            LowFeatureType::Valley
        }
    } else if ge(record.circularity, t.circularity)
        && record.profile_side_slope_class == SlopeClass::Steep
    {
        LowFeatureType::Hole
    } else {
        LowFeatureType::Depression
    }
}

/// The slope class the trees compare against: the top class, or the side
/// class for a triangular profile that has no top segment.
fn profile_slope(record: &AttributeRecord) -> SlopeClass {
    if record.profile_shape == ProfileShape::Triangle {
        record.profile_side_slope_class
    } else {
        record.profile_top_slope_class
    }
}

// Missing attributes never satisfy a threshold condition.

#[inline]
fn ge(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v >= threshold)
}

#[inline]
fn le(value: Option<f64>, threshold: f64) -> bool {
    value.is_some_and(|v| v <= threshold)
}

#[inline]
fn ge_opt(value: Option<f64>, threshold: Option<f64>) -> bool {
    matches!((value, threshold), (Some(v), Some(t)) if v >= t)
}
