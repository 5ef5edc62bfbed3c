//! Portfolio-wide ranking and totals across every tracked campaign.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analyzer::{RoiAnalysis, RoiAnalyzer};
use crate::scaling::ScalingAction;
use crate::trend::{TrendDirection, TrendStrength};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub campaign_count: usize,
    /// Campaigns not recommended for pausing.
    pub active_count: usize,
    /// Unweighted mean of campaign ROI (0.0 for an empty portfolio).
    pub average_roi: f64,
    pub total_spend: f64,
    pub total_revenue: f64,
    pub profitable_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    pub scale_up: usize,
    pub scale_down: usize,
    pub pause: usize,
    pub maintain: usize,
}

impl ActionCounts {
    fn record(&mut self, action: ScalingAction) {
        match action {
            ScalingAction::ScaleUp => self.scale_up += 1,
            ScalingAction::ScaleDown => self.scale_down += 1,
            ScalingAction::Pause => self.pause += 1,
            ScalingAction::Maintain => self.maintain += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub summary: PortfolioSummary,
    pub actions: ActionCounts,
    /// Best first.
    pub top_performers: Vec<RoiAnalysis>,
    /// Worst first.
    pub underperformers: Vec<RoiAnalysis>,
    pub generated_at: DateTime<Utc>,
}

/// Runs the analysis pipeline over every campaign in the analyzer's store.
pub struct PortfolioReporter<'a> {
    analyzer: &'a RoiAnalyzer,
}

impl<'a> PortfolioReporter<'a> {
    pub fn new(analyzer: &'a RoiAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Analyses for every campaign with windowed data, highest ROI first.
    pub fn analyze_all(&self) -> Vec<RoiAnalysis> {
        let mut analyses: Vec<RoiAnalysis> = self
            .analyzer
            .store()
            .campaign_ids()
            .iter()
            .filter_map(|id| self.analyzer.analyze(id))
            .collect();

        analyses.sort_by(|a, b| {
            b.metrics
                .roi
                .total_cmp(&a.metrics.roi)
                .then_with(|| a.campaign_id.cmp(&b.campaign_id))
        });
        analyses
    }

    /// Campaigns whose recommendation asks for a live budget change.
    pub fn for_scaling(&self) -> Vec<RoiAnalysis> {
        self.analyze_all()
            .into_iter()
            .filter(|a| a.scaling_recommendation.action.is_actionable())
            .collect()
    }

    pub fn report(&self) -> PortfolioReport {
        let cfg = self.analyzer.config();
        let analyses = self.analyze_all();

        let mut actions = ActionCounts::default();
        for analysis in &analyses {
            actions.record(analysis.scaling_recommendation.action);
        }

        let campaign_count = analyses.len();
        let average_roi = if campaign_count > 0 {
            analyses.iter().map(|a| a.metrics.roi).sum::<f64>() / campaign_count as f64
        } else {
            0.0
        };

        let summary = PortfolioSummary {
            campaign_count,
            active_count: campaign_count - actions.pause,
            average_roi,
            total_spend: analyses.iter().map(|a| a.metrics.total_spend).sum(),
            total_revenue: analyses.iter().map(|a| a.metrics.total_revenue).sum(),
            profitable_count: analyses.iter().filter(|a| a.metrics.roi > 0.0).count(),
        };

        let top_performers: Vec<RoiAnalysis> = analyses
            .iter()
            .filter(|a| {
                a.metrics.roi >= cfg.top_performer_roi
                    && a.trend.direction != TrendDirection::Declining
            })
            .take(cfg.leaderboard_size)
            .cloned()
            .collect();

        let underperformers: Vec<RoiAnalysis> = analyses
            .iter()
            .rev()
            .filter(|a| {
                a.metrics.roi < cfg.underperformer_roi
                    || (a.trend.direction == TrendDirection::Declining
                        && a.trend.strength == TrendStrength::Strong)
            })
            .take(cfg.leaderboard_size)
            .cloned()
            .collect();

        info!(
            campaigns = summary.campaign_count,
            profitable = summary.profitable_count,
            scale_up = actions.scale_up,
            scale_down = actions.scale_down,
            pause = actions.pause,
            "Portfolio report generated"
        );

        PortfolioReport {
            summary,
            actions,
            top_performers,
            underperformers,
            generated_at: self.analyzer.store().now(),
        }
    }
}
