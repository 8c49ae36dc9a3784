// tests/fusion_test.rs
//
// Integration tests for timeline fusion and tidal classification.
// Fixtures are synthetic half-hour sensor logs with camera events
// dropped on and off the sensor grid.

use chrono::{NaiveDate, NaiveDateTime};

use tidewatchr::core::binning::CategoryColumn;
use tidewatchr::core::events::DetectionEvent;
use tidewatchr::core::fusion::{fuse, InterpolationConfig, SensorSample};
use tidewatchr::core::rates::{aggregate, RateMode};
use tidewatchr::core::tidal::{flow_column, TidalConfig};

fn ts(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 6, 14)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn sample(at: NaiveDateTime, depth: f64) -> SensorSample {
    SensorSample {
        timestamp: at,
        depth: Some(depth),
        depth_inside: Some(depth - 0.3),
        gate_primary_deg: Some(45.0),
        gate_secondary_deg: Some(10.0),
        air_temp_c: Some(14.0),
        wind_speed_kmh: Some(6.0),
    }
}

/// One tide cycle at half-hour cadence: rise, high slack, fall, low
/// slack, rise again. Depth deltas are 0.2 m per period except at the
/// slack turns, where they are 0.01 m.
fn tide_cycle() -> Vec<SensorSample> {
    let depths = [
        1.00, 1.20, 1.40, 1.60, 1.61, 1.60, 1.40, 1.20, 1.00, 0.80, 0.79, 0.80, 1.00,
    ];
    depths
        .iter()
        .enumerate()
        .map(|(i, &d)| sample(ts(6 + i as u32 / 2, (i as u32 % 2) * 30), d))
        .collect()
}

#[test]
fn test_fused_timeline_is_union_of_sources() {
    let samples = tide_cycle();
    let events = vec![
        DetectionEvent::detection(ts(6, 45), "Lontra canadensis".to_string(), 1, String::new()),
        DetectionEvent::no_detection(ts(8, 0)),
    ];

    let (table, stats) = fuse(&events, &samples, &InterpolationConfig::default());

    // 13 sensor timestamps plus one off-grid event; 08:00 merges
    assert_eq!(table.len(), 14);
    assert_eq!(table.camera_active_rows(), 2);
    assert_eq!(table.detection_rows(), 1);
    assert_eq!(stats.event_rows, 2);
    assert_eq!(stats.union_timestamps, 14);

    let off_grid = table
        .rows()
        .iter()
        .find(|r| r.timestamp == ts(6, 45))
        .unwrap();
    assert!(off_grid.camera_active);
    assert!(off_grid.animal_detected);
    assert_eq!(off_grid.species.as_deref(), Some("Lontra canadensis"));

    let merged = table
        .rows()
        .iter()
        .find(|r| r.timestamp == ts(8, 0))
        .unwrap();
    assert!(merged.camera_active);
    assert!(!merged.animal_detected);
    assert_eq!(merged.depth, Some(1.61));

    let sensor_only = table
        .rows()
        .iter()
        .find(|r| r.timestamp == ts(9, 0))
        .unwrap();
    assert!(!sensor_only.camera_active);
    assert!(!sensor_only.animal_detected);
    assert_eq!(sensor_only.count, 0);
}

#[test]
fn test_offgrid_event_reads_interpolated_sensor_values() {
    let samples = tide_cycle();
    let events = vec![DetectionEvent::detection(
        ts(6, 45),
        "Ardea alba".to_string(),
        1,
        String::new(),
    )];

    let (table, _) = fuse(&events, &samples, &InterpolationConfig::default());
    let row = table
        .rows()
        .iter()
        .find(|r| r.timestamp == ts(6, 45))
        .unwrap();

    // midway between the 06:30 and 07:00 readings
    assert!((row.depth.unwrap() - 1.30).abs() < 1e-9);
    assert!((row.depth_inside.unwrap() - 1.00).abs() < 1e-9);
    assert_eq!(row.air_temp_c, Some(14.0));
}

#[test]
fn test_gap_bound_blanks_distant_event_rows() {
    let samples = vec![sample(ts(6, 0), 1.0), sample(ts(8, 0), 2.0)];
    let events = vec![DetectionEvent::no_detection(ts(7, 0))];

    let (strict, _) = fuse(&events, &samples, &InterpolationConfig::default());
    let row = strict.rows().iter().find(|r| r.timestamp == ts(7, 0)).unwrap();
    assert_eq!(row.depth, None, "a two hour gap must not be bridged by default");

    let loose_config = InterpolationConfig { max_gap_minutes: 120 };
    let (loose, _) = fuse(&events, &samples, &loose_config);
    let row = loose.rows().iter().find(|r| r.timestamp == ts(7, 0)).unwrap();
    assert_eq!(row.depth, Some(1.5));
}

#[test]
fn test_flow_states_over_one_tide_cycle() {
    let (table, _) = fuse(&[], &tide_cycle(), &InterpolationConfig::default());
    let flow = flow_column(&table, &TidalConfig::default());

    let expected = [
        None,
        Some("Rising"),
        Some("Rising"),
        Some("Rising"),
        Some("High Slack"),
        Some("High Slack"),
        Some("Falling"),
        Some("Falling"),
        Some("Falling"),
        Some("Falling"),
        Some("Low Slack"),
        Some("Low Slack"),
        Some("Rising"),
    ];
    for (i, want) in expected.iter().enumerate() {
        assert_eq!(flow.label_at(i), *want, "row {}", i);
    }
}

#[test]
fn test_rate_modes_use_different_denominators() {
    let samples: Vec<SensorSample> = (0..10).map(|i| sample(ts(6 + i, 0), 1.0)).collect();
    let events = vec![
        DetectionEvent::detection(ts(6, 15), "Branta canadensis".to_string(), 2, String::new()),
        DetectionEvent::detection(ts(8, 15), "Bucephala albeola".to_string(), 1, String::new()),
        DetectionEvent::no_detection(ts(10, 15)),
        DetectionEvent::no_detection(ts(12, 15)),
        DetectionEvent::no_detection(ts(14, 15)),
    ];

    let (table, _) = fuse(&events, &samples, &InterpolationConfig::default());
    assert_eq!(table.len(), 15);

    let everything = CategoryColumn::new(
        "all",
        vec!["All".to_string()],
        vec![Some(0); table.len()],
    );

    let activity = aggregate(&table, &[&everything], RateMode::AllPeriods);
    assert_eq!(activity.rows[0].total, 15);
    assert_eq!(activity.rows[0].positives, 5);

    let success = aggregate(&table, &[&everything], RateMode::ActiveOnly);
    assert_eq!(success.rows[0].total, 5);
    assert_eq!(success.rows[0].positives, 2);
    assert!((success.rows[0].rate - 0.4).abs() < 1e-9);
}
