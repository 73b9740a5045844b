use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::json;

/// End-to-end runs of the volume and forecast pipeline through the public API

#[cfg(test)]
mod integration_tests {
    use super::*;
    use volcast::forecast::{project_from, ForecastParams, ForecastSummary};
    use volcast::models::{Sport, VolumeResponse};
    use volcast::volume::{aggregate_on, primary_series_on, week_keys};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    fn summary(period: &str, count: u32, meters: f64, moving: f64, elevation: f64) -> serde_json::Value {
        json!({
            "period": period,
            "activityCount": count,
            "totalDistanceMeters": meters,
            "totalElapsedTimeSeconds": moving + 120.0,
            "totalMovingTimeSeconds": moving,
            "totalElevationGainMeters": elevation,
        })
    }

    /// Volume response shaped like the metrics API output
    fn sample_response() -> VolumeResponse {
        let body = json!({
            "data": {
                "running": [
                    summary("2024-W01", 3, 10000.0, 3600.0, 100.0),
                    summary("2024-W02", 4, 15000.0, 5400.0, 150.0),
                    summary("2024-W03", 2, 12000.0, 4500.0, 90.0)
                ],
                "trail-running": [
                    summary("2024-W02", 1, 5000.0, 2700.0, 400.0)
                ],
                "cycling": [
                    summary("2024-W02", 1, 40000.0, 5400.0, 300.0),
                    summary("2024-W04", 2, 60000.0, 7200.0, 500.0)
                ],
                "elliptical": []
            },
            "frequency": "week",
            "provider": "strava",
            "sports": ["running", "trail-running", "cycling", "elliptical"],
            "startDate": "2024-01-01",
            "userId": "c263ed11-624f-43c8-a217-666ae8427dbb"
        });
        serde_json::from_value(body).unwrap()
    }

    /// Primary series merges running and trail running per week
    #[test]
    fn test_primary_series_workflow() {
        let response = sample_response();
        let primary = primary_series_on(&response.data, &[Sport::Running, Sport::TrailRunning], today());

        assert_eq!(primary.len(), 3);
        assert_eq!(primary[0].week_start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(primary[1].week_label, "Jan 8");

        // Week 2: 15 km road + 5 km trail
        assert_eq!(primary[1].distance_km, dec!(20.0));
        assert_eq!(primary[1].elevation_m, 550);
        assert_eq!(primary[1].time_seconds, 8100.0);

        assert_eq!(primary[0].previous_week_distance_change_pct, 0.0);
        assert_eq!(primary[1].previous_week_distance_change_pct, 100.0);
        assert_eq!(primary[2].previous_week_distance_change_pct, -40.0);
    }

    /// Cross-training series share the primary week domain
    #[test]
    fn test_cross_training_shares_weeks_with_primary() {
        let response = sample_response();
        let primary = primary_series_on(&response.data, &[Sport::Running, Sport::TrailRunning], today());
        let reference = week_keys(&primary);

        let cross = aggregate_on(&response.data, &[Sport::Elliptical, Sport::Cycling], &reference, today());

        // W01..W03 from the primary chart plus W04 from cycling
        assert_eq!(cross.overall.len(), 4);
        let starts: Vec<NaiveDate> = cross.overall.iter().map(|p| p.week_start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(starts, sorted);

        let cycling = cross.series(&Sport::Cycling).unwrap();
        assert_eq!(cycling.len(), 4);
        assert_eq!(cycling[0].activity_count, 0);
        assert_eq!(cycling[1].distance_km, dec!(40.0));
        assert_eq!(cycling[1].moving_hours, 1.5);

        // No elliptical records at all
        assert!(cross.series(&Sport::Elliptical).unwrap().is_empty());
        assert_eq!(cross.first_sport_with_data(), Some(&Sport::Cycling));

        assert_eq!(cross.overall[3].total_hours, 2.0);
    }

    /// Forecast from the latest primary week
    #[test]
    fn test_forecast_from_latest_week() {
        let response = sample_response();
        let primary = primary_series_on(&response.data, &[Sport::Running, Sport::TrailRunning], today());
        let latest = primary.last().unwrap();
        assert_eq!(latest.distance_km, dec!(12.0));

        let points = project_from(12.0, latest.week_start, &ForecastParams::default());
        assert_eq!(points.len(), 8);
        assert_eq!(points[0].week_start, NaiveDate::from_ymd_opt(2024, 1, 22).unwrap());
        assert_eq!(points[0].mileage_km, dec!(12.6));
        assert!(points[3].is_rest_week);
        assert_eq!(points[3].mileage_km, dec!(0));

        let summary = ForecastSummary::from_points(&points);
        assert_eq!(summary.rest_weeks, 2);
        assert_eq!(summary.weeks, 8);
    }

    /// Infinite change survives as JSON null in the serialized series
    #[test]
    fn test_serialized_series_shape() {
        let body = json!({
            "data": {
                "running": [
                    summary("2024-W01", 0, 0.0, 0.0, 0.0),
                    summary("2024-W02", 1, 8000.0, 2400.0, 40.0)
                ]
            },
            "frequency": "week",
            "provider": "strava",
            "sports": ["running"],
            "startDate": "2024-01-01",
            "userId": "u"
        });
        let response: VolumeResponse = serde_json::from_value(body).unwrap();
        let primary = primary_series_on(&response.data, &[Sport::Running], today());

        let value = serde_json::to_value(&primary).unwrap();
        assert_eq!(value[1]["weekStartISO"], "2024-01-08");
        assert_eq!(value[1]["distanceKm"], 8.0);
        assert!(value[1]["previousWeekDistanceChangePct"].is_null());
        assert_eq!(value[0]["previousWeekDistanceChangePct"], 0.0);
    }

    /// Malformed periods still produce a point instead of an error
    #[test]
    fn test_malformed_period_is_kept() {
        let body = json!({
            "data": { "running": [ summary("not-a-week", 1, 5000.0, 1800.0, 20.0) ] },
            "frequency": "week",
            "provider": "strava",
            "sports": ["running"],
            "startDate": "2024-01-01",
            "userId": "u"
        });
        let response: VolumeResponse = serde_json::from_value(body).unwrap();
        let primary = primary_series_on(&response.data, &[Sport::Running], today());

        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].week_label, "not-a-week");
        assert_eq!(primary[0].distance_km, dec!(5.0));
    }
}
