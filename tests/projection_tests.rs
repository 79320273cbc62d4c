use chrono::{Datelike, NaiveDate, Weekday};
use quant_forecast::error::ForecastError;
use quant_forecast::projection::{next_trading_day, skip_weekend, ForecastProjector, ProjectionConfig};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn three_day_trend_hold() {
    let projector = ForecastProjector::default();
    let r = (34.85f64 / 34.50).ln();
    // Tuesday base
    let items = projector.project(r, 34.50, day(2024, 6, 11), 3).unwrap();
    let prices: Vec<f64> = items.iter().map(|i| i.rounded().price).collect();
    assert_eq!(prices, vec![34.85, 35.20, 35.56]);
    let conf: Vec<f64> = items.iter().map(|i| i.rounded().confidence).collect();
    assert_eq!(conf, vec![0.55, 0.52, 0.49]);
    assert_eq!(items[0].date, day(2024, 6, 12));
    assert_eq!(items[2].date, day(2024, 6, 14));
}

#[test]
fn friday_base_skips_weekend() {
    let projector = ForecastProjector::default();
    let items = projector.project(0.0, 10.0, day(2024, 6, 14), 2).unwrap();
    assert_eq!(items[0].date, day(2024, 6, 17));
    assert_eq!(items[0].date.weekday(), Weekday::Mon);
    assert_eq!(items[1].date, day(2024, 6, 18));
}

#[test]
fn dates_strictly_increase_and_avoid_weekends() {
    let projector = ForecastProjector::default();
    for start in 1..=7 {
        let items = projector.project(0.001, 20.0, day(2024, 6, start), 5).unwrap();
        let mut prev = day(2024, 6, start);
        for item in &items {
            assert!(item.date > prev);
            assert!(!matches!(item.date.weekday(), Weekday::Sat | Weekday::Sun));
            prev = item.date;
        }
    }
}

#[test]
fn confidence_decays_to_floor() {
    let projector = ForecastProjector::new(ProjectionConfig {
        base_confidence: 0.55,
        decay_per_day: 0.05,
        floor_confidence: 0.40,
        max_horizon_days: 10,
    });
    let items = projector.project(0.0, 10.0, day(2024, 6, 10), 6).unwrap();
    let conf: Vec<f64> = items.iter().map(|i| i.confidence).collect();
    for w in conf.windows(2) {
        assert!(w[1] <= w[0]);
    }
    assert!((conf[5] - 0.40).abs() < 1e-12);
    assert!(conf.iter().all(|c| (0.0..=1.0).contains(c)));
}

#[test]
fn negative_return_compounds_down() {
    let projector = ForecastProjector::default();
    let items = projector.project(-0.01, 100.0, day(2024, 6, 10), 2).unwrap();
    assert!(items[0].price < 100.0);
    assert!(items[1].price < items[0].price);
}

#[test]
fn horizon_outside_bounds_is_rejected() {
    let projector = ForecastProjector::default();
    let base = day(2024, 6, 10);
    assert!(matches!(
        projector.project(0.0, 10.0, base, 0),
        Err(ForecastError::InvalidHorizon { requested: 0, max: 5 })
    ));
    assert!(matches!(
        projector.project(0.0, 10.0, base, 6),
        Err(ForecastError::InvalidHorizon { requested: 6, max: 5 })
    ));
}

#[test]
fn weekend_mapping() {
    assert_eq!(skip_weekend(day(2024, 6, 15)), day(2024, 6, 17));
    assert_eq!(skip_weekend(day(2024, 6, 16)), day(2024, 6, 17));
    assert_eq!(skip_weekend(day(2024, 6, 12)), day(2024, 6, 12));
    assert_eq!(next_trading_day(day(2024, 6, 15)), day(2024, 6, 17));
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = ProjectionConfig {
        floor_confidence: 0.9,
        ..ProjectionConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(ForecastError::Config(_))));
    assert!(ProjectionConfig::default().validate().is_ok());
}
