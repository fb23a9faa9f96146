use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::BathyGrid;

/// Whether the candidate polygons are bathymetric highs (local elevations)
/// or bathymetric lows (local depressions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeaturePolarity {
    High,
    Low,
}

/// Named classification cutoffs. Every field is overridable by the caller;
/// defaults are calibrated for metre-based grids (areas in m², depths in m,
/// slopes in degrees, depth values positive-down).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// High tree: length/width ratio at or above which a feature is a Ridge.
    pub ridge_lw_ratio: f64,
    /// High tree: minimum circularity for a Cone.
    pub cone_circularity: f64,
    /// High tree: maximum (shallowest) depth for a Bank.
    pub bank_min_depth: f64,
    /// High tree: minimum area for a Bank.
    pub bank_area: f64,
    /// High tree: minimum area for a Plateau.
    pub plateau_area: f64,
    /// High tree: maximum relief for a Hummock.
    pub hummock_depth_range: f64,
    /// High tree: maximum area for a Hummock.
    pub hummock_area: f64,
    /// Low tree: length/width ratio separating elongate from round features.
    pub lw_ratio: f64,
    /// Low tree: minimum head depth for the Trench/Trough branch.
    pub head_depth: f64,
    /// Low tree: mean segment slope at or above which an elongate feature
    /// with steep or moderate sides is a Gully.
    pub mean_segment_slope_t1: f64,
    /// Low tree: mean segment slope floor for a Canyon. Must be strictly
    /// less than `mean_segment_slope_t1`.
    pub mean_segment_slope_t2: f64,
    /// Low tree: minimum head-to-foot depth range for a Canyon.
    pub head_foot_depth_range: f64,
    /// Low tree: minimum circularity for a Hole.
    pub circularity: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            ridge_lw_ratio: 5.0,
            cone_circularity: 0.5,
            bank_min_depth: 200.0,
            bank_area: 1.0e8,
            plateau_area: 1.0e8,
            hummock_depth_range: 50.0,
            hummock_area: 1.0e6,
            lw_ratio: 8.0,
            head_depth: 4000.0,
            mean_segment_slope_t1: 4.0,
            mean_segment_slope_t2: 2.0,
            head_foot_depth_range: 300.0,
            circularity: 0.5,
        }
    }
}

impl ThresholdConfig {
    /// Validate the configuration. Called by `ExecutionContext::new` so that
    /// a bad configuration is rejected before any classification runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("ridge_lw_ratio", self.ridge_lw_ratio),
            ("cone_circularity", self.cone_circularity),
            ("bank_min_depth", self.bank_min_depth),
            ("bank_area", self.bank_area),
            ("plateau_area", self.plateau_area),
            ("hummock_depth_range", self.hummock_depth_range),
            ("hummock_area", self.hummock_area),
            ("lw_ratio", self.lw_ratio),
            ("head_depth", self.head_depth),
            ("mean_segment_slope_t1", self.mean_segment_slope_t1),
            ("mean_segment_slope_t2", self.mean_segment_slope_t2),
            ("head_foot_depth_range", self.head_foot_depth_range),
            ("circularity", self.circularity),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }
        if self.mean_segment_slope_t2 >= self.mean_segment_slope_t1 {
            return Err(ConfigError::SegmentSlopeOrder {
                t1: self.mean_segment_slope_t1,
                t2: self.mean_segment_slope_t2,
            });
        }
        Ok(())
    }
}

/// Everything one attribute/classification run needs, passed explicitly to
/// each component. There is no process-wide workspace state.
#[derive(Debug, Clone)]
pub struct ExecutionContext<'a> {
    pub bathymetry: &'a BathyGrid,
    pub slope: &'a BathyGrid,
    pub thresholds: ThresholdConfig,
    pub polarity: FeaturePolarity,
    /// Polygons larger than this (m²) get five cross-section profiles
    /// instead of one.
    pub profile_area_threshold: f64,
    /// Slope discontinuity (degrees) below which a profile point is not a
    /// knickpoint.
    pub knick_tolerance_deg: f64,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        bathymetry: &'a BathyGrid,
        slope: &'a BathyGrid,
        thresholds: ThresholdConfig,
        polarity: FeaturePolarity,
    ) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        Ok(Self {
            bathymetry,
            slope,
            thresholds,
            polarity,
            profile_area_threshold: 1.0e6,
            knick_tolerance_deg: 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ThresholdConfig::default().validate().is_ok());
    }

    #[test]
    fn segment_slope_order_is_enforced() {
        let mut cfg = ThresholdConfig::default();
        cfg.mean_segment_slope_t2 = cfg.mean_segment_slope_t1;
        match cfg.validate() {
            Err(ConfigError::SegmentSlopeOrder { t1, t2 }) => {
                assert_eq!(t1, t2);
            }
            other => panic!("expected SegmentSlopeOrder, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_threshold_is_rejected() {
        let cfg = ThresholdConfig {
            ridge_lw_ratio: f64::NAN,
            ..ThresholdConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidThreshold { name: "ridge_lw_ratio", .. })
        ));
    }
}
