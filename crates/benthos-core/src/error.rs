use thiserror::Error;

/// Rejection of a threshold configuration before any classification runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error(
        "mean_segment_slope_t2 ({t2}) must be strictly less than mean_segment_slope_t1 ({t1}); \
         otherwise the Canyon branch of the low-feature tree is unreachable"
    )]
    SegmentSlopeOrder { t1: f64, t2: f64 },
    #[error("threshold {name} must be finite and non-negative, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
}

/// Failure of attribute computation for a single feature polygon. The batch
/// driver decides whether to abort or continue with the remaining polygons.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttributeError {
    #[error("feature {feature}: degenerate geometry (no long axis)")]
    DegenerateGeometry { feature: usize },
    #[error("feature {feature}: profile chord at {angle_deg:.1} deg does not cross the boundary twice")]
    ChordOutsideBoundary { feature: usize, angle_deg: f64 },
    #[error("feature {feature}: bathymetry grid does not cover the polygon")]
    NoRasterCoverage { feature: usize },
    #[error("feature {feature}: fewer than two valid samples along the profile")]
    ProfileTooShort { feature: usize },
}
