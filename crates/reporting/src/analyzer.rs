//! ROI analysis pipeline: store -> window aggregate -> trend -> scaling decision.

use std::sync::Arc;

use campaign_core::config::AnalyzerConfig;
use campaign_core::types::MetricRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::portfolio::{PortfolioReport, PortfolioReporter};
use crate::scaling::{ScalingDecisionEngine, ScalingRecommendation};
use crate::store::MetricsStore;
use crate::trend::{Trend, TrendDetector};
use crate::window::{AggregateMetrics, AnalysisPeriod, WindowAggregator};

/// Result of analyzing one campaign. Derived from the store on every call
/// and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiAnalysis {
    pub campaign_id: String,
    pub campaign_name: String,
    pub period: AnalysisPeriod,
    pub metrics: AggregateMetrics,
    pub trend: Trend,
    pub scaling_recommendation: ScalingRecommendation,
    pub sample_size: usize,
    pub computed_at: DateTime<Utc>,
}

impl RoiAnalysis {
    pub fn roi(&self) -> f64 {
        self.metrics.roi
    }
}

/// Entry point for telemetry pollers, budget actuators and dashboards.
pub struct RoiAnalyzer {
    store: Arc<MetricsStore>,
    aggregator: WindowAggregator,
    detector: TrendDetector,
    engine: ScalingDecisionEngine,
    config: AnalyzerConfig,
}

impl RoiAnalyzer {
    /// Analyzer over a fresh store that keeps `config.retention_days` of history.
    pub fn new(config: AnalyzerConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(MetricsStore::new(config.retention_days, clock));
        Self::with_store(config, store)
    }

    /// Analyzer over an existing, possibly shared, store.
    pub fn with_store(config: AnalyzerConfig, store: Arc<MetricsStore>) -> Self {
        info!(
            window_days = config.window_days,
            retention_days = store.retention_days(),
            "ROI analyzer initialized"
        );
        Self {
            aggregator: WindowAggregator::new(store.clone(), config.window_days),
            detector: TrendDetector::from_config(&config),
            engine: ScalingDecisionEngine::new(config.clone()),
            store,
            config,
        }
    }

    pub fn ingest(&self, records: Vec<MetricRecord>) {
        self.store.ingest(records);
    }

    /// Analyze one campaign. `None` when it has no records in the window.
    pub fn analyze(&self, campaign_id: &str) -> Option<RoiAnalysis> {
        let Some(aggregate) = self.aggregator.aggregate(campaign_id) else {
            debug!(campaign_id, "No metrics in analysis window");
            return None;
        };

        let trend = self.detector.detect(&aggregate.daily_roi_series);
        let recommendation = self
            .engine
            .decide(aggregate.metrics.roi, &trend, aggregate.sample_size);

        debug!(
            campaign_id,
            roi = aggregate.metrics.roi,
            direction = %trend.direction,
            action = %recommendation.action,
            "Campaign analyzed"
        );

        Some(RoiAnalysis {
            campaign_id: aggregate.campaign_id,
            campaign_name: aggregate.campaign_name,
            period: aggregate.period,
            metrics: aggregate.metrics,
            trend,
            scaling_recommendation: recommendation,
            sample_size: aggregate.sample_size,
            computed_at: self.store.now(),
        })
    }

    pub fn portfolio(&self) -> PortfolioReporter<'_> {
        PortfolioReporter::new(self)
    }

    pub fn analyze_all(&self) -> Vec<RoiAnalysis> {
        self.portfolio().analyze_all()
    }

    pub fn for_scaling(&self) -> Vec<RoiAnalysis> {
        self.portfolio().for_scaling()
    }

    pub fn report(&self) -> PortfolioReport {
        self.portfolio().report()
    }

    pub fn store(&self) -> &Arc<MetricsStore> {
        &self.store
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }
}

impl Default for RoiAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default(), Arc::new(SystemClock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::scaling::ScalingAction;
    use crate::trend::{TrendDirection, TrendStrength};
    use campaign_core::types::Platform;
    use chrono::{Duration, NaiveDate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn analyzer() -> RoiAnalyzer {
        RoiAnalyzer::new(AnalyzerConfig::default(), Arc::new(FixedClock(today())))
    }

    fn record(campaign_id: &str, days_ago: i64, spend: f64, revenue: f64) -> MetricRecord {
        MetricRecord {
            campaign_id: campaign_id.to_string(),
            campaign_name: "Summer Launch".to_string(),
            date: today() - Duration::days(days_ago),
            spend,
            revenue,
            conversions: 2,
            clicks: 80,
            impressions: 3_200,
            ctr: 0.025,
            cpc: 1.25,
            platform: Platform::Microsoft,
            product_id: None,
            presell_type: Some("quiz".to_string()),
        }
    }

    #[test]
    fn test_rising_campaign_scales_up() {
        let analyzer = analyzer();
        analyzer.ingest(vec![
            record("cmp", 2, 100.0, 120.0),
            record("cmp", 1, 100.0, 170.0),
            record("cmp", 0, 100.0, 190.0),
        ]);

        let analysis = analyzer.analyze("cmp").unwrap();
        assert!((analysis.metrics.total_spend - 300.0).abs() < f64::EPSILON);
        assert!((analysis.metrics.total_revenue - 480.0).abs() < f64::EPSILON);
        assert!((analysis.roi() - 60.0).abs() < 1e-9);
        assert_eq!(analysis.trend.direction, TrendDirection::Rising);
        assert_eq!(analysis.trend.strength, TrendStrength::Strong);
        assert!((analysis.trend.slope - 35.0).abs() < 1e-9);

        let rec = &analysis.scaling_recommendation;
        assert_eq!(rec.action, ScalingAction::ScaleUp);
        assert!((rec.confidence - 85.0).abs() < 1e-9);
        assert!(rec.budget_change > 0);
        assert_eq!(analysis.period.start, today() - Duration::days(2));
        assert_eq!(analysis.period.end, today());
    }

    #[test]
    fn test_single_day_is_low_confidence() {
        let analyzer = analyzer();
        analyzer.ingest(vec![record("cmp", 0, 100.0, 105.0)]);

        let analysis = analyzer.analyze("cmp").unwrap();
        assert!((analysis.roi() - 5.0).abs() < 1e-9);
        assert_eq!(analysis.scaling_recommendation.action, ScalingAction::Maintain);
        assert!(analysis.scaling_recommendation.confidence < 70.0);
    }

    #[test]
    fn test_losing_campaign_pauses() {
        let analyzer = analyzer();
        analyzer.ingest((0..3).map(|d| record("cmp", d, 100.0, 90.0)).collect());

        let analysis = analyzer.analyze("cmp").unwrap();
        assert!((analysis.roi() + 10.0).abs() < 1e-9);
        assert_eq!(analysis.trend.direction, TrendDirection::Stable);
        assert_eq!(analysis.scaling_recommendation.action, ScalingAction::Pause);
        assert_eq!(analysis.scaling_recommendation.budget_change, 0);
    }

    #[test]
    fn test_absent_when_window_empty_but_history_retained() {
        let analyzer = analyzer();
        analyzer.ingest(vec![record("cmp", 4, 100.0, 200.0), record("cmp", 6, 100.0, 200.0)]);

        assert_eq!(analyzer.store().history("cmp").len(), 2);
        assert!(analyzer.analyze("cmp").is_none());
    }

    #[test]
    fn test_zero_spend_campaign_is_not_absent() {
        let analyzer = analyzer();
        analyzer.ingest(vec![record("cmp", 0, 0.0, 0.0)]);

        let analysis = analyzer.analyze("cmp").unwrap();
        assert_eq!(analysis.metrics.roi, 0.0);
        assert_eq!(analysis.metrics.roas, 0.0);
    }

    #[test]
    fn test_computed_at_comes_from_injected_clock() {
        let analyzer = analyzer();
        analyzer.ingest(vec![record("cmp", 0, 100.0, 150.0)]);

        let analysis = analyzer.analyze("cmp").unwrap();
        assert_eq!(analysis.computed_at.date_naive(), today());
    }

    #[test]
    fn test_analysis_serializes_snake_case_enums() {
        let analyzer = analyzer();
        analyzer.ingest((0..3).map(|d| record("cmp", d, 100.0, 90.0)).collect());

        let json = serde_json::to_value(analyzer.analyze("cmp").unwrap()).unwrap();
        assert_eq!(json["scaling_recommendation"]["action"], "pause");
        assert_eq!(json["trend"]["direction"], "stable");
        assert_eq!(json["period"]["start"], "2024-06-13");
    }
}
