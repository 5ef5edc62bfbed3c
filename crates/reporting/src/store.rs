//! Per-campaign daily metric history with bounded retention.

use std::collections::HashMap;
use std::sync::Arc;

use campaign_core::types::MetricRecord;
use chrono::{DateTime, Days, NaiveDate, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};

/// Daily metric records keyed by campaign, ascending by date, at most one
/// record per day.
///
/// Each campaign's sequence sits behind its own `DashMap` shard lock, so
/// ingestion for one campaign is serialized while other campaigns proceed in
/// parallel, and readers always clone a complete sequence.
pub struct MetricsStore {
    /// campaign_id -> records, ascending by date
    records: DashMap<String, Vec<MetricRecord>>,
    retention_days: u32,
    clock: Arc<dyn Clock>,
}

impl MetricsStore {
    pub fn new(retention_days: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            retention_days,
            clock,
        }
    }

    /// Upsert a batch of records, then prune every campaign's history to the
    /// retention bound.
    ///
    /// Records without a campaign id are skipped. Negative money is clamped
    /// to zero and amounts are rounded to cents.
    pub fn ingest(&self, records: Vec<MetricRecord>) {
        let received = records.len();
        let mut batches: HashMap<String, Vec<MetricRecord>> = HashMap::new();
        let mut skipped = 0usize;

        for record in records {
            if record.campaign_id.trim().is_empty() {
                skipped += 1;
                continue;
            }
            batches
                .entry(record.campaign_id.clone())
                .or_default()
                .push(record.sanitized());
        }

        if skipped > 0 {
            warn!(skipped, "Skipped metric records without a campaign id");
        }

        let campaigns = batches.len();
        for (campaign_id, batch) in batches {
            let mut history = self.records.entry(campaign_id).or_default();
            for record in batch {
                upsert(&mut history, record);
            }
        }

        let pruned = self.prune();

        debug!(
            received,
            campaigns,
            pruned,
            stored = self.len(),
            "Ingested metric records"
        );
    }

    /// Records dated within the last `window_days` calendar days, today
    /// included, ascending by date. Empty for unknown campaigns.
    pub fn records_in_window(&self, campaign_id: &str, window_days: u32) -> Vec<MetricRecord> {
        if window_days == 0 {
            return Vec::new();
        }
        let cutoff = cutoff(self.today(), window_days);

        match self.records.get(campaign_id) {
            Some(history) => history
                .iter()
                .filter(|r| r.date >= cutoff)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Full retained history for a campaign.
    pub fn history(&self, campaign_id: &str) -> Vec<MetricRecord> {
        self.records
            .get(campaign_id)
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Tracked campaign ids, sorted.
    pub fn campaign_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Drop a campaign's history. Returns `true` if it was tracked.
    pub fn remove_campaign(&self, campaign_id: &str) -> bool {
        self.records.remove(campaign_id).is_some()
    }

    /// Total number of stored records across all campaigns.
    pub fn len(&self) -> usize {
        self.records.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Timestamp for computed analyses, taken from the same clock as `today`.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // -- internal helpers ---------------------------------------------------

    fn prune(&self) -> usize {
        let cutoff = cutoff(self.today(), self.retention_days);
        let mut pruned = 0usize;

        self.records.retain(|_, history| {
            let before = history.len();
            history.retain(|r| r.date >= cutoff);
            pruned += before - history.len();
            !history.is_empty()
        });

        pruned
    }
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new(7, Arc::new(SystemClock))
    }
}

/// Earliest date inside a trailing window of `days` calendar days ending today.
/// Saturates at `NaiveDate::MIN` when the window reaches past the calendar.
fn cutoff(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days.max(1)) - 1))
        .unwrap_or(NaiveDate::MIN)
}

fn upsert(history: &mut Vec<MetricRecord>, record: MetricRecord) {
    match history.binary_search_by(|r| r.date.cmp(&record.date)) {
        Ok(idx) => history[idx] = record,
        Err(idx) => history.insert(idx, record),
    }
}
