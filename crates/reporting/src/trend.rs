//! Linear trend over a campaign's daily ROI series.

use campaign_core::config::AnalyzerConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    Weak,
    Moderate,
    Strong,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Rising => "rising",
            Self::Stable => "stable",
            Self::Declining => "declining",
        })
    }
}

impl std::fmt::Display for TrendStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub strength: TrendStrength,
    /// ROI points per day.
    pub slope: f64,
    /// Last observed ROI plus one day of slope, never below zero.
    pub predicted_roi_24h: f64,
}

impl Trend {
    /// Trend reported when there are too few points to fit a line.
    pub fn flat() -> Self {
        Self {
            direction: TrendDirection::Stable,
            strength: TrendStrength::Weak,
            slope: 0.0,
            predicted_roi_24h: 0.0,
        }
    }
}

/// Classifies the OLS slope of daily ROI against day index.
#[derive(Debug, Clone, Copy)]
pub struct TrendDetector {
    stable_slope: f64,
    strong_slope: f64,
}

impl TrendDetector {
    pub fn new(stable_slope: f64, strong_slope: f64) -> Self {
        Self {
            stable_slope,
            strong_slope,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.stable_slope, config.strong_slope)
    }

    pub fn detect(&self, daily_roi: &[f64]) -> Trend {
        let Some(&last) = daily_roi.last() else {
            return Trend::flat();
        };
        if daily_roi.len() < 2 {
            return Trend::flat();
        }

        let slope = ols_slope(daily_roi);
        let magnitude = slope.abs();

        let (direction, strength) = if magnitude < self.stable_slope {
            (TrendDirection::Stable, TrendStrength::Weak)
        } else {
            let direction = if slope > 0.0 {
                TrendDirection::Rising
            } else {
                TrendDirection::Declining
            };
            let strength = if magnitude > self.strong_slope {
                TrendStrength::Strong
            } else {
                TrendStrength::Moderate
            };
            (direction, strength)
        };

        Trend {
            direction,
            strength,
            slope,
            // Projections are reported floored at zero even though ROI itself
            // can go negative.
            predicted_roi_24h: (last + slope).max(0.0),
        }
    }
}

impl Default for TrendDetector {
    fn default() -> Self {
        Self::from_config(&AnalyzerConfig::default())
    }
}

/// Least-squares slope of `values` against indices `0..n`.
fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xx: f64 = (0..values.len()).map(|i| (i * i) as f64).sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fewer_than_two_points_is_flat() {
        let detector = TrendDetector::default();
        assert_eq!(detector.detect(&[]), Trend::flat());
        assert_eq!(detector.detect(&[42.0]), Trend::flat());
    }

    #[test]
    fn test_strong_rising_slope() {
        let trend = TrendDetector::default().detect(&[20.0, 70.0, 90.0]);
        assert_eq!(trend.direction, TrendDirection::Rising);
        assert_eq!(trend.strength, TrendStrength::Strong);
        assert!((trend.slope - 35.0).abs() < 1e-9);
        assert!((trend.predicted_roi_24h - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_series_direction() {
        let detector = TrendDetector::default();
        assert_eq!(
            detector.detect(&[1.0, 5.0, 9.0, 20.0]).direction,
            TrendDirection::Rising
        );
        assert_eq!(
            detector.detect(&[30.0, 22.0, 10.0]).direction,
            TrendDirection::Declining
        );
        let constant = detector.detect(&[15.0, 15.0, 15.0]);
        assert_eq!(constant.direction, TrendDirection::Stable);
        assert_eq!(constant.strength, TrendStrength::Weak);
    }

    #[test]
    fn test_moderate_strength_between_breakpoints() {
        let trend = TrendDetector::default().detect(&[10.0, 12.0, 14.0]);
        assert_eq!(trend.direction, TrendDirection::Rising);
        assert_eq!(trend.strength, TrendStrength::Moderate);
        assert!((trend.slope - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_slope_on_either_breakpoint_is_moderate() {
        let detector = TrendDetector::default();

        let at_stable = detector.detect(&[10.0, 11.0, 12.0]);
        assert_eq!(at_stable.direction, TrendDirection::Rising);
        assert_eq!(at_stable.strength, TrendStrength::Moderate);
        assert_eq!(at_stable.slope, 1.0);

        let at_strong = detector.detect(&[10.0, 13.0, 16.0]);
        assert_eq!(at_strong.direction, TrendDirection::Rising);
        assert_eq!(at_strong.strength, TrendStrength::Moderate);
        assert_eq!(at_strong.slope, 3.0);

        let falling = detector.detect(&[12.0, 11.0, 10.0]);
        assert_eq!(falling.direction, TrendDirection::Declining);
        assert_eq!(falling.strength, TrendStrength::Moderate);
    }

    #[test]
    fn test_small_slope_is_stable() {
        let trend = TrendDetector::default().detect(&[10.0, 10.5, 10.9]);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.strength, TrendStrength::Weak);
        assert!((trend.predicted_roi_24h - (10.9 + trend.slope)).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_floored_at_zero() {
        let trend = TrendDetector::default().detect(&[-5.0, -20.0, -40.0]);
        assert_eq!(trend.direction, TrendDirection::Declining);
        assert_eq!(trend.strength, TrendStrength::Strong);
        assert_eq!(trend.predicted_roi_24h, 0.0);
    }

    #[test]
    fn test_direction_serializes_snake_case() {
        let json = serde_json::to_string(&TrendDirection::Declining).unwrap();
        assert_eq!(json, "\"declining\"");
    }
}
