//! End-to-end runs of the analyzer over a feed that advances day by day.

use std::sync::{Arc, Mutex};

use campaign_core::config::AnalyzerConfig;
use campaign_core::types::{MetricRecord, Platform};
use campaign_reporting::{Clock, RoiAnalyzer, ScalingAction, TrendDirection};
use chrono::{Duration, NaiveDate};

/// Clock the test can move forward between reporting cycles.
struct SteppingClock(Mutex<NaiveDate>);

impl SteppingClock {
    fn advance(&self) {
        let mut day = self.0.lock().unwrap();
        *day += Duration::days(1);
    }
}

impl Clock for SteppingClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock().unwrap()
    }
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn record(campaign_id: &str, date: NaiveDate, spend: f64, revenue: f64) -> MetricRecord {
    MetricRecord {
        campaign_id: campaign_id.to_string(),
        campaign_name: format!("{campaign_id} campaign"),
        date,
        spend,
        revenue,
        conversions: 5,
        clicks: 100,
        impressions: 5_000,
        ctr: 0.02,
        cpc: spend / 100.0,
        platform: Platform::Facebook,
        product_id: None,
        presell_type: None,
    }
}

#[test]
fn test_daily_cycles_respect_retention_and_window() {
    let clock = Arc::new(SteppingClock(Mutex::new(start())));
    let analyzer = RoiAnalyzer::new(AnalyzerConfig::default(), clock.clone());

    for day in 0..12 {
        let today = clock.today();
        // Revenue improves every day.
        analyzer.ingest(vec![record("growth", today, 100.0, 110.0 + 10.0 * day as f64)]);

        let oldest_allowed = today - Duration::days(6);
        let history = analyzer.store().history("growth");
        assert!(history.iter().all(|r| r.date >= oldest_allowed));
        assert!(history.len() <= 7);

        let analysis = analyzer.analyze("growth").unwrap();
        assert!(analysis.sample_size <= 3);
        assert_eq!(analysis.period.end, today);

        clock.advance();
    }

    // Nothing reported yet for the new day; the window still holds two days.
    let analysis = analyzer.analyze("growth").unwrap();
    assert_eq!(analysis.sample_size, 2);
    assert_eq!(analysis.period.end, clock.today() - Duration::days(1));
    assert_eq!(analysis.trend.direction, TrendDirection::Rising);

    for _ in 0..3 {
        clock.advance();
    }
    assert!(analyzer.analyze("growth").is_none());
    assert!(!analyzer.store().history("growth").is_empty());
}

#[test]
fn test_restatement_replaces_previous_report() {
    let clock = Arc::new(SteppingClock(Mutex::new(start())));
    let analyzer = RoiAnalyzer::new(AnalyzerConfig::default(), clock.clone());
    let today = clock.today();

    analyzer.ingest(vec![
        record("c", today - Duration::days(2), 100.0, 200.0),
        record("c", today - Duration::days(1), 100.0, 200.0),
        record("c", today, 100.0, 200.0),
    ]);
    assert_eq!(
        analyzer.analyze("c").unwrap().scaling_recommendation.action,
        ScalingAction::ScaleUp
    );

    // The platform restates every day as a loss.
    analyzer.ingest(
        (0..3)
            .map(|d| record("c", today - Duration::days(d), 100.0, 80.0))
            .collect(),
    );

    let analysis = analyzer.analyze("c").unwrap();
    assert_eq!(analyzer.store().history("c").len(), 3);
    assert!((analysis.metrics.total_revenue - 240.0).abs() < 1e-9);
    assert_eq!(analysis.scaling_recommendation.action, ScalingAction::Pause);
}

#[test]
fn test_concurrent_ingest_across_campaigns() {
    let clock = Arc::new(SteppingClock(Mutex::new(start())));
    let analyzer = Arc::new(RoiAnalyzer::new(AnalyzerConfig::default(), clock.clone()));
    let today = clock.today();

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let analyzer = analyzer.clone();
            scope.spawn(move || {
                let id = format!("cmp-{worker}");
                for d in 0..3 {
                    let revenue = 100.0 + 40.0 * (d as f64) + worker as f64;
                    let date = today - Duration::days(2 - d);
                    analyzer.ingest(vec![record(&id, date, 100.0, revenue)]);
                    let _ = analyzer.analyze(&id);
                }
            });
        }
    });

    let analyses = analyzer.analyze_all();
    assert_eq!(analyses.len(), 8);
    assert!(analyses.iter().all(|a| a.sample_size == 3));
    assert!(analyses
        .iter()
        .all(|a| a.trend.direction == TrendDirection::Rising));
    assert!(analyses.windows(2).all(|w| w[0].metrics.roi >= w[1].metrics.roi));

    let report = analyzer.report();
    assert_eq!(report.summary.campaign_count, 8);
    assert!((report.summary.total_spend - 2_400.0).abs() < 1e-9);
}
