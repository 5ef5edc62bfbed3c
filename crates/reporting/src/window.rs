//! Trailing-window aggregation of a campaign's daily metrics into ROI,
//! ROAS and profit margin.

use std::sync::Arc;

use campaign_core::types::MetricRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::MetricsStore;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// First and last date actually present in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub total_spend: f64,
    pub total_revenue: f64,
    pub total_conversions: u64,
    /// `(revenue - spend) / spend * 100` (0.0 when spend is zero).
    pub roi: f64,
    /// `revenue / spend` (0.0 when spend is zero).
    pub roas: f64,
    /// `(revenue - spend) / revenue * 100` (0.0 when revenue is zero).
    pub profit_margin: f64,
}

/// A campaign's window reduced to totals plus the per-day ROI series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowAggregate {
    pub campaign_id: String,
    pub campaign_name: String,
    pub period: AnalysisPeriod,
    pub metrics: AggregateMetrics,
    /// ROI of each individual day, ascending by date.
    pub daily_roi_series: Vec<f64>,
    pub sample_size: usize,
}

// ---------------------------------------------------------------------------
// WindowAggregator
// ---------------------------------------------------------------------------

pub struct WindowAggregator {
    store: Arc<MetricsStore>,
    window_days: u32,
}

impl WindowAggregator {
    pub fn new(store: Arc<MetricsStore>, window_days: u32) -> Self {
        Self { store, window_days }
    }

    /// Reduce the campaign's trailing window. `None` when the window holds no
    /// records, which callers must treat as "insufficient data" rather than a
    /// zero-ROI campaign.
    pub fn aggregate(&self, campaign_id: &str) -> Option<WindowAggregate> {
        let records = self.store.records_in_window(campaign_id, self.window_days);
        summarize(campaign_id, &records)
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }
}

/// Reduce an ascending run of daily records.
pub fn summarize(campaign_id: &str, records: &[MetricRecord]) -> Option<WindowAggregate> {
    let first = records.first()?;
    let last = records.last()?;

    let total_spend: f64 = records.iter().map(|r| r.spend).sum();
    let total_revenue: f64 = records.iter().map(|r| r.revenue).sum();
    let total_conversions: u64 = records.iter().map(|r| r.conversions).sum();

    Some(WindowAggregate {
        campaign_id: campaign_id.to_string(),
        campaign_name: last.campaign_name.clone(),
        period: AnalysisPeriod {
            start: first.date,
            end: last.date,
        },
        metrics: AggregateMetrics {
            total_spend,
            total_revenue,
            total_conversions,
            roi: roi(total_spend, total_revenue),
            roas: roas(total_spend, total_revenue),
            profit_margin: profit_margin(total_spend, total_revenue),
        },
        daily_roi_series: records.iter().map(|r| roi(r.spend, r.revenue)).collect(),
        sample_size: records.len(),
    })
}

pub fn roi(spend: f64, revenue: f64) -> f64 {
    if spend > 0.0 {
        (revenue - spend) / spend * 100.0
    } else {
        0.0
    }
}

pub fn roas(spend: f64, revenue: f64) -> f64 {
    if spend > 0.0 {
        revenue / spend
    } else {
        0.0
    }
}

pub fn profit_margin(spend: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        (revenue - spend) / revenue * 100.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
