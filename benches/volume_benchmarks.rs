use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use chrono::{Datelike, Duration, NaiveDate};
use volcast::forecast::{project_from, ForecastParams};
use volcast::models::{ActivityPeriodSummary, Sport, VolumeBySport};
use volcast::volume::{aggregate_on, primary_series_on, week_keys};
use volcast::week::normalize_week_on;

/// Benchmarks for the weekly aggregation and forecast paths
///
/// Sizes cover a few months up to several years of weekly history.

fn create_volume(weeks: usize) -> VolumeBySport {
    let first_monday = NaiveDate::from_ymd_opt(2020, 1, 6).unwrap();
    let sports = [Sport::Running, Sport::TrailRunning, Sport::Cycling, Sport::Elliptical];

    sports
        .iter()
        .enumerate()
        .map(|(sport_index, sport)| {
            let entries = (0..weeks)
                .filter(|week| (week + sport_index) % 3 != 0)
                .map(|week| {
                    let monday = first_monday + Duration::weeks(week as i64);
                    // mix both period formats
                    let period = if week % 2 == 0 {
                        format!("{}-W{:02}", monday.iso_week().year(), monday.iso_week().week())
                    } else {
                        monday.format("%Y-%m-%d").to_string()
                    };
                    ActivityPeriodSummary {
                        period,
                        activity_count: 3,
                        total_distance_meters: 10_000.0 + (week * 137 % 5_000) as f64,
                        total_elapsed_time_seconds: 4_000.0,
                        total_moving_time_seconds: 3_600.0 + (week * 61 % 900) as f64,
                        total_elevation_gain_meters: 120.0 + (week % 40) as f64,
                    }
                })
                .collect();
            (sport.clone(), entries)
        })
        .collect()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
}

fn bench_normalize_week(c: &mut Criterion) {
    let mut group = c.benchmark_group("Week Normalization");

    for period in ["2024-W03", "2024-01-17", "not-a-week"] {
        group.bench_with_input(BenchmarkId::new("normalize_week", period), &period, |b, period| {
            b.iter(|| normalize_week_on(black_box(period), today()));
        });
    }

    group.finish();
}

fn bench_primary_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("Primary Series");
    let primary = [Sport::Running, Sport::TrailRunning];

    for &weeks in &[12, 52, 260] {
        let volume = create_volume(weeks);

        group.throughput(Throughput::Elements(weeks as u64));
        group.bench_with_input(BenchmarkId::new("primary_series", weeks), &volume, |b, volume| {
            b.iter(|| primary_series_on(black_box(volume), &primary, today()));
        });
    }

    group.finish();
}

fn bench_cross_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("Cross-Training Aggregation");
    let primary = [Sport::Running, Sport::TrailRunning];
    let tracked = [Sport::Elliptical, Sport::Cycling];

    for &weeks in &[12, 52, 260] {
        let volume = create_volume(weeks);
        let reference = week_keys(&primary_series_on(&volume, &primary, today()));

        group.throughput(Throughput::Elements(weeks as u64));
        group.bench_with_input(BenchmarkId::new("aggregate", weeks), &volume, |b, volume| {
            b.iter(|| aggregate_on(black_box(volume), &tracked, &reference, today()));
        });
    }

    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let params = ForecastParams {
        weeks_ahead: 24,
        weekly_increase_pct: 7.5,
        rest_frequency: 4,
    };

    c.bench_function("project_24_weeks", |b| {
        b.iter(|| project_from(black_box(42.3), start, &params));
    });
}

criterion_group!(
    benches,
    bench_normalize_week,
    bench_primary_series,
    bench_cross_training,
    bench_forecast
);
criterion_main!(benches);
