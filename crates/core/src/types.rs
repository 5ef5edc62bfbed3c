use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CampaignError, CampaignResult};

/// Ad platform a campaign runs on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Google,
    Facebook,
    Microsoft,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
            Self::Microsoft => "microsoft",
        };
        f.write_str(name)
    }
}

/// One campaign's performance for one calendar day, as reported by the
/// platform poller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRecord {
    pub campaign_id: String,
    pub campaign_name: String,
    pub date: NaiveDate,
    pub spend: f64,
    pub revenue: f64,
    pub conversions: u64,
    pub clicks: u64,
    pub impressions: u64,
    /// Click-through rate as a ratio (clicks / impressions).
    pub ctr: f64,
    /// Cost per click.
    pub cpc: f64,
    pub platform: Platform,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub presell_type: Option<String>,
}

impl MetricRecord {
    /// Check the record against the ingestion boundary rules.
    pub fn validate(&self) -> CampaignResult<()> {
        if self.campaign_id.trim().is_empty() {
            return Err(CampaignError::Validation(format!(
                "record for {} has an empty campaign_id",
                self.date
            )));
        }
        for (field, value) in [
            ("spend", self.spend),
            ("revenue", self.revenue),
            ("ctr", self.ctr),
            ("cpc", self.cpc),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CampaignError::Validation(format!(
                    "campaign {} on {}: {} must be a non-negative number, got {}",
                    self.campaign_id, self.date, field, value
                )));
            }
        }
        Ok(())
    }

    /// Copy of the record with money clamped to non-negative cents and
    /// ratios clamped to zero when negative or not finite.
    pub fn sanitized(&self) -> Self {
        Self {
            spend: round_money(self.spend),
            revenue: round_money(self.revenue),
            ctr: non_negative(self.ctr),
            cpc: round_money(self.cpc),
            ..self.clone()
        }
    }
}

/// Validate a whole batch, failing on the first bad record.
pub fn validate_records(records: &[MetricRecord]) -> CampaignResult<()> {
    records.iter().try_for_each(MetricRecord::validate)
}

/// Parse a JSON array of records and validate every one.
pub fn parse_records(json: &str) -> CampaignResult<Vec<MetricRecord>> {
    let records: Vec<MetricRecord> = serde_json::from_str(json)?;
    validate_records(&records)?;
    Ok(records)
}

/// Read and validate a JSON metrics export from disk.
pub fn read_records(path: &Path) -> CampaignResult<Vec<MetricRecord>> {
    parse_records(&std::fs::read_to_string(path)?)
}

/// Round a money amount to two decimal places, treating negatives and
/// non-finite values as zero.
pub fn round_money(amount: f64) -> f64 {
    (non_negative(amount) * 100.0).round() / 100.0
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
