pub mod config;
pub mod error;
pub mod types;

pub use config::{AnalyzerConfig, AppConfig};
pub use error::{CampaignError, CampaignResult};
pub use types::{parse_records, read_records, MetricRecord, Platform};
