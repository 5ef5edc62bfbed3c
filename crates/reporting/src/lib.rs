//! Campaign ROI analysis: rolling-window aggregation, trend detection and
//! scaling recommendations, plus portfolio reporting.

pub mod analyzer;
pub mod clock;
pub mod portfolio;
pub mod scaling;
pub mod store;
pub mod trend;
pub mod window;

pub use analyzer::{RoiAnalysis, RoiAnalyzer};
pub use clock::{Clock, FixedClock, SystemClock};
pub use portfolio::{PortfolioReport, PortfolioReporter};
pub use scaling::{ScalingAction, ScalingDecisionEngine, ScalingRecommendation};
pub use store::MetricsStore;
pub use trend::{Trend, TrendDetector, TrendDirection, TrendStrength};
pub use window::{WindowAggregate, WindowAggregator};
