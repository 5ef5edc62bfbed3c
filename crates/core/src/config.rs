use serde::Deserialize;

use crate::error::{CampaignError, CampaignResult};

/// Root application configuration. Loaded from environment variables
/// with the prefix `CAMPAIGN_ROI__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tuning constants for the ROI analyzer and scaling decisions.
///
/// The defaults are the values the engine has always run with. None of them
/// has a documented derivation, so they live here rather than inline where
/// they can be revisited per deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Trailing calendar days (including today) fed into each analysis.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    /// Calendar days of history kept per campaign.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// |slope| below this is a stable trend.
    #[serde(default = "default_stable_slope")]
    pub stable_slope: f64,
    /// |slope| above this is a strong trend.
    #[serde(default = "default_strong_slope")]
    pub strong_slope: f64,

    /// Sample size that earns the full sample weight.
    #[serde(default = "default_full_sample_size")]
    pub full_sample_size: u32,
    #[serde(default = "default_sample_weight")]
    pub sample_weight: f64,
    #[serde(default = "default_weak_bonus")]
    pub weak_trend_bonus: f64,
    #[serde(default = "default_moderate_bonus")]
    pub moderate_trend_bonus: f64,
    #[serde(default = "default_strong_bonus")]
    pub strong_trend_bonus: f64,
    /// Below this confidence no scaling action is recommended.
    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f64,
    #[serde(default = "default_confidence_ceiling")]
    pub confidence_ceiling: f64,
    #[serde(default = "default_high_confidence")]
    pub high_confidence: f64,

    #[serde(default = "default_scale_up_roi")]
    pub scale_up_roi: f64,
    #[serde(default = "default_pause_roi")]
    pub pause_roi: f64,
    #[serde(default = "default_scale_down_roi")]
    pub scale_down_roi: f64,
    /// ROI the scale-down cut is measured from.
    #[serde(default = "default_scale_down_anchor_roi")]
    pub scale_down_anchor_roi: f64,
    /// Budget percentage points per ROI point of distance from a threshold.
    #[serde(default = "default_budget_step")]
    pub budget_step: f64,
    #[serde(default = "default_min_increase")]
    pub min_budget_increase: f64,
    #[serde(default = "default_max_increase")]
    pub max_budget_increase: f64,
    #[serde(default = "default_min_decrease")]
    pub min_budget_decrease: f64,
    #[serde(default = "default_max_decrease")]
    pub max_budget_decrease: f64,
    #[serde(default = "default_high_confidence_multiplier")]
    pub high_confidence_multiplier: f64,
    #[serde(default = "default_rising_multiplier")]
    pub rising_multiplier: f64,

    #[serde(default = "default_top_performer_roi")]
    pub top_performer_roi: f64,
    #[serde(default = "default_underperformer_roi")]
    pub underperformer_roi: f64,
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default = "default_log_json")]
    pub json: bool,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_window_days() -> u32 {
    3
}
fn default_retention_days() -> u32 {
    7
}
fn default_stable_slope() -> f64 {
    1.0
}
fn default_strong_slope() -> f64 {
    3.0
}
fn default_full_sample_size() -> u32 {
    3
}
fn default_sample_weight() -> f64 {
    70.0
}
fn default_weak_bonus() -> f64 {
    5.0
}
fn default_moderate_bonus() -> f64 {
    10.0
}
fn default_strong_bonus() -> f64 {
    15.0
}
fn default_confidence_floor() -> f64 {
    70.0
}
fn default_confidence_ceiling() -> f64 {
    95.0
}
fn default_high_confidence() -> f64 {
    85.0
}
fn default_scale_up_roi() -> f64 {
    60.0
}
fn default_pause_roi() -> f64 {
    0.0
}
fn default_scale_down_roi() -> f64 {
    10.0
}
fn default_scale_down_anchor_roi() -> f64 {
    30.0
}
fn default_budget_step() -> f64 {
    2.0
}
fn default_min_increase() -> f64 {
    10.0
}
fn default_max_increase() -> f64 {
    50.0
}
fn default_min_decrease() -> f64 {
    10.0
}
fn default_max_decrease() -> f64 {
    30.0
}
fn default_high_confidence_multiplier() -> f64 {
    1.5
}
fn default_rising_multiplier() -> f64 {
    1.2
}
fn default_top_performer_roi() -> f64 {
    50.0
}
fn default_underperformer_roi() -> f64 {
    20.0
}
fn default_leaderboard_size() -> usize {
    5
}
fn default_log_filter() -> String {
    "campaign_roi=info,campaign_reporting=info".to_string()
}
fn default_log_json() -> bool {
    true
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            retention_days: default_retention_days(),
            stable_slope: default_stable_slope(),
            strong_slope: default_strong_slope(),
            full_sample_size: default_full_sample_size(),
            sample_weight: default_sample_weight(),
            weak_trend_bonus: default_weak_bonus(),
            moderate_trend_bonus: default_moderate_bonus(),
            strong_trend_bonus: default_strong_bonus(),
            confidence_floor: default_confidence_floor(),
            confidence_ceiling: default_confidence_ceiling(),
            high_confidence: default_high_confidence(),
            scale_up_roi: default_scale_up_roi(),
            pause_roi: default_pause_roi(),
            scale_down_roi: default_scale_down_roi(),
            scale_down_anchor_roi: default_scale_down_anchor_roi(),
            budget_step: default_budget_step(),
            min_budget_increase: default_min_increase(),
            max_budget_increase: default_max_increase(),
            min_budget_decrease: default_min_decrease(),
            max_budget_decrease: default_max_decrease(),
            high_confidence_multiplier: default_high_confidence_multiplier(),
            rising_multiplier: default_rising_multiplier(),
            top_performer_roi: default_top_performer_roi(),
            underperformer_roi: default_underperformer_roi(),
            leaderboard_size: default_leaderboard_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: default_log_json(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            analyzer: AnalyzerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Reject threshold combinations the decision rules cannot work with.
    pub fn validate(&self) -> CampaignResult<()> {
        if self.window_days == 0 || self.retention_days == 0 {
            return Err(CampaignError::Config(
                "window_days and retention_days must be at least 1".to_string(),
            ));
        }
        if self.window_days > self.retention_days {
            return Err(CampaignError::Config(format!(
                "window_days ({}) exceeds retention_days ({})",
                self.window_days, self.retention_days
            )));
        }
        if self.full_sample_size == 0 {
            return Err(CampaignError::Config(
                "full_sample_size must be at least 1".to_string(),
            ));
        }
        if self.stable_slope > self.strong_slope {
            return Err(CampaignError::Config(format!(
                "stable_slope ({}) exceeds strong_slope ({})",
                self.stable_slope, self.strong_slope
            )));
        }
        if self.confidence_floor > self.confidence_ceiling {
            return Err(CampaignError::Config(format!(
                "confidence_floor ({}) exceeds confidence_ceiling ({})",
                self.confidence_floor, self.confidence_ceiling
            )));
        }
        if self.min_budget_increase > self.max_budget_increase
            || self.min_budget_decrease > self.max_budget_decrease
        {
            return Err(CampaignError::Config(
                "budget change minimums must not exceed maximums".to_string(),
            ));
        }
        if self.pause_roi > self.scale_down_roi || self.scale_down_roi > self.scale_up_roi {
            return Err(CampaignError::Config(format!(
                "ROI thresholds out of order: pause {} / scale_down {} / scale_up {}",
                self.pause_roi, self.scale_down_roi, self.scale_up_roi
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional config file.
    pub fn load(path: Option<&str>) -> CampaignResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_ROI")
                .separator("__")
                .try_parsing(true),
        );

        Self::from_source(builder.build()?)
    }

    /// Deserialize an assembled source and reject invalid analyzer thresholds.
    pub fn from_source(source: config::Config) -> CampaignResult<Self> {
        let config: Self = source.try_deserialize()?;
        config.analyzer.validate()?;
        Ok(config)
    }
}
