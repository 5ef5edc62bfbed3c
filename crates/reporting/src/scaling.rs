//! Scaling recommendations from windowed ROI, trend and data sufficiency.

use campaign_core::config::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::trend::{Trend, TrendDirection, TrendStrength};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingAction {
    ScaleUp,
    ScaleDown,
    Pause,
    Maintain,
}

impl ScalingAction {
    /// Whether the action asks the actuator to change the live campaign.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::Maintain)
    }
}

impl std::fmt::Display for ScalingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::ScaleUp => "scale_up",
            Self::ScaleDown => "scale_down",
            Self::Pause => "pause",
            Self::Maintain => "maintain",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingRecommendation {
    pub action: ScalingAction,
    /// Signed budget change in percent.
    pub budget_change: i32,
    /// 0-100.
    pub confidence: f64,
    pub reason: String,
}

/// Turns aggregate ROI and trend into one of four actions.
///
/// Rules are evaluated in order and the first match wins:
///
/// 1. confidence below the floor: maintain
/// 2. ROI at or above the scale-up threshold, trend not declining: scale up
/// 3. ROI at or below the pause threshold: pause
/// 4. ROI at or below the scale-down threshold: scale down
/// 5. otherwise: maintain
pub struct ScalingDecisionEngine {
    config: AnalyzerConfig,
}

impl ScalingDecisionEngine {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// `min(ceiling, sample_size / full_sample_size * sample_weight + bonus)`
    /// where the bonus grows with trend strength.
    pub fn confidence(&self, sample_size: usize, strength: TrendStrength) -> f64 {
        let cfg = &self.config;
        let bonus = match strength {
            TrendStrength::Strong => cfg.strong_trend_bonus,
            TrendStrength::Moderate => cfg.moderate_trend_bonus,
            TrendStrength::Weak => cfg.weak_trend_bonus,
        };
        let sample_score =
            sample_size as f64 / f64::from(cfg.full_sample_size.max(1)) * cfg.sample_weight;

        (sample_score + bonus).min(cfg.confidence_ceiling)
    }

    pub fn decide(
        &self,
        aggregate_roi: f64,
        trend: &Trend,
        sample_size: usize,
    ) -> ScalingRecommendation {
        let cfg = &self.config;
        let confidence = self.confidence(sample_size, trend.strength);
        let descriptor = format!("{} {} trend", trend.strength, trend.direction);

        let (action, budget_change, reason) = if confidence < cfg.confidence_floor {
            (
                ScalingAction::Maintain,
                0,
                format!(
                    "Confidence {:.0}% is below the {:.0}% minimum with {} day(s) of data; \
                     holding at ROI {:.1}% ({})",
                    confidence, cfg.confidence_floor, sample_size, aggregate_roi, descriptor
                ),
            )
        } else if aggregate_roi >= cfg.scale_up_roi
            && trend.direction != TrendDirection::Declining
        {
            let base = ((aggregate_roi - cfg.scale_up_roi) * cfg.budget_step)
                .clamp(cfg.min_budget_increase, cfg.max_budget_increase);
            let confidence_multiplier = if confidence >= cfg.high_confidence {
                cfg.high_confidence_multiplier
            } else {
                1.0
            };
            let trend_multiplier = if trend.direction == TrendDirection::Rising {
                cfg.rising_multiplier
            } else {
                1.0
            };
            let change = (base * confidence_multiplier * trend_multiplier).round() as i32;
            (
                ScalingAction::ScaleUp,
                change,
                format!(
                    "ROI {:.1}% is at or above the {:.0}% scale-up threshold with a {}; \
                     increase budget {}%",
                    aggregate_roi, cfg.scale_up_roi, descriptor, change
                ),
            )
        } else if aggregate_roi <= cfg.pause_roi {
            (
                ScalingAction::Pause,
                0,
                format!(
                    "ROI {:.1}% is at or below the {:.0}% break-even threshold ({}); \
                     pause campaign",
                    aggregate_roi, cfg.pause_roi, descriptor
                ),
            )
        } else if aggregate_roi <= cfg.scale_down_roi {
            let change = -((cfg.scale_down_anchor_roi - aggregate_roi) * cfg.budget_step)
                .clamp(cfg.min_budget_decrease, cfg.max_budget_decrease)
                .round() as i32;
            (
                ScalingAction::ScaleDown,
                change,
                format!(
                    "ROI {:.1}% is at or below the {:.0}% scale-down threshold ({}); \
                     reduce budget {}%",
                    aggregate_roi,
                    cfg.scale_down_roi,
                    descriptor,
                    change.abs()
                ),
            )
        } else if aggregate_roi >= cfg.scale_up_roi {
            (
                ScalingAction::Maintain,
                0,
                format!(
                    "ROI {:.1}% clears the {:.0}% scale-up threshold but the {} blocks scaling",
                    aggregate_roi, cfg.scale_up_roi, descriptor
                ),
            )
        } else {
            (
                ScalingAction::Maintain,
                0,
                format!(
                    "ROI {:.1}% is between the {:.0}% scale-down and {:.0}% scale-up \
                     thresholds ({})",
                    aggregate_roi, cfg.scale_down_roi, cfg.scale_up_roi, descriptor
                ),
            )
        };

        debug!(
            %action,
            budget_change,
            confidence,
            roi = aggregate_roi,
            slope = trend.slope,
            "Scaling decision"
        );

        ScalingRecommendation {
            action,
            budget_change,
            confidence,
            reason,
        }
    }
}

impl Default for ScalingDecisionEngine {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}
