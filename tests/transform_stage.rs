//! End-to-end tests of the transform stage: configuration in, shaped
//! reports out.

mod common;

use common::{pen_report, test_extents, RecordingNotifier};
use penshaper::{Extents, Report, Severity, ShaperConfig, ShaperStage};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn stage_with(config: &ShaperConfig) -> ShaperStage<Extents> {
    common::init_tracing();
    ShaperStage::new(config, test_extents())
}

#[test]
fn identity_config_leaves_reports_unchanged() {
    let mut stage = stage_with(&ShaperConfig::default());

    for report in [
        pen_report(0.0, 0.0, 0),
        pen_report(99.9, 0.1, 1000),
        Report {
            position: Some((50.0, 50.0)),
            pressure: Some(512),
            tilt: Some((0.3, -0.7)),
            hover_distance: Some(12),
            out_of_range: false,
        },
        Report {
            tilt: Some((1.0, 1.0)),
            ..Report::default()
        },
    ] {
        let mut shaped = report;
        stage.transform(&mut shaped);
        assert_eq!(shaped, report);
    }
}

#[test]
fn documented_scenario_produces_expected_output_and_state() {
    let config = ShaperConfig {
        x_formula: "x * 2".into(),
        ..ShaperConfig::default()
    };
    let mut stage = stage_with(&config);

    let mut report = pen_report(10.0, 20.0, 500);
    stage.transform(&mut report);

    assert_eq!(report.position, Some((20.0, 20.0)));
    assert_eq!(report.pressure, Some(500));

    let state = stage.state();
    assert_eq!(state.last_computed().x, 20.0);
    assert_eq!(state.last_computed().y, 20.0);
    assert_eq!(state.last_computed().pressure, 500);
}

#[test]
fn tilt_channels_observe_new_position() {
    let config = ShaperConfig {
        x_formula: "x + 1".into(),
        tilt_x_formula: "cx".into(),
        ..ShaperConfig::default()
    };
    let mut stage = stage_with(&config);

    let mut report = Report {
        position: Some((10.0, 20.0)),
        pressure: Some(500),
        tilt: Some((0.0, 0.0)),
        ..Report::default()
    };
    stage.transform(&mut report);

    // Tilt X equals the new X (10 + 1), not the pre-evaluation X.
    assert_eq!(report.tilt.unwrap().0, 11.0);
}

#[test]
fn degenerate_pressure_formula_saturates_instead_of_crashing() {
    let config = ShaperConfig {
        pressure_formula: "p / 0".into(),
        ..ShaperConfig::default()
    };
    let mut stage = stage_with(&config);

    let mut report = pen_report(10.0, 20.0, 500);
    stage.transform(&mut report);
    assert_eq!(report.pressure, Some(u32::MAX));

    // The stage keeps working afterwards
    let mut next = pen_report(1.0, 1.0, 1);
    stage.transform(&mut next);
    assert_eq!(next.position, Some((1.0, 1.0)));
}

#[test]
fn malformed_formulas_fall_back_and_notify_per_channel() {
    let notifier = Arc::new(RecordingNotifier::default());
    let config = ShaperConfig {
        x_formula: "x +".into(),
        tilt_y_formula: "unknown_name * 2".into(),
        y_formula: "y * 2".into(),
        ..ShaperConfig::default()
    };
    let mut stage = ShaperStage::with_notifier(&config, test_extents(), notifier.clone());

    {
        let notifications = notifier.notifications.lock().unwrap();
        assert_eq!(notifications.len(), 2);
        assert!(notifications
            .iter()
            .all(|(source, _, severity)| source == "penshaper" && *severity == Severity::Warning));
    }
    assert_eq!(notifier.exceptions.lock().unwrap().len(), 2);

    let mut report = Report {
        position: Some((10.0, 20.0)),
        pressure: Some(500),
        tilt: Some((0.25, 0.5)),
        ..Report::default()
    };
    stage.transform(&mut report);

    // X fell back to identity, Y compiled, TiltY fell back to identity
    assert_eq!(report.position, Some((10.0, 40.0)));
    assert_eq!(report.tilt, Some((0.25, 0.5)));
}

#[test]
fn reset_timeout_zero_discards_history_before_every_report() {
    let config = ShaperConfig {
        x_formula: "x / 2 + cx / 2".into(),
        reset_time_ms: 0,
        ..ShaperConfig::default()
    };
    let mut stage = stage_with(&config);
    let t0 = Instant::now();

    let mut outputs = Vec::new();
    for i in 0..4 {
        let mut report = pen_report(10.0, 0.0, 100);
        stage.transform_at(&mut report, t0 + Duration::from_millis(i * 5));
        outputs.push(report.position.unwrap().0);
    }

    // No EMA-style accumulation: every report starts from zeroed history
    assert!(outputs.iter().all(|&x| x == 5.0), "outputs: {:?}", outputs);
}

#[test]
fn reset_timeout_negative_keeps_history_forever() {
    let config = ShaperConfig {
        x_formula: "x / 2 + cx / 2".into(),
        reset_time_ms: -1,
        ..ShaperConfig::default()
    };
    let mut stage = stage_with(&config);
    let t0 = Instant::now();

    let mut first = pen_report(10.0, 0.0, 100);
    stage.transform_at(&mut first, t0);
    let mut second = pen_report(10.0, 0.0, 100);
    stage.transform_at(&mut second, t0 + Duration::from_secs(86_400));

    // State from report N is visible to report N+1 regardless of gap
    assert_eq!(first.position, Some((5.0, 0.0)));
    assert_eq!(second.position, Some((7.5, 0.0)));
}

#[test]
fn out_of_range_marker_is_forwarded_untouched() {
    let config = ShaperConfig {
        x_formula: "x * 100".into(),
        ..ShaperConfig::default()
    };
    let mut stage = stage_with(&config);

    let mut marker = Report {
        position: Some((3.0, 4.0)),
        pressure: Some(5),
        out_of_range: true,
        ..Report::default()
    };
    let original = marker;
    stage.transform(&mut marker);
    assert_eq!(marker, original);

    // And it left no trace in the history
    let mut probe_config = ShaperConfig::default();
    probe_config.x_formula = "lx".into();
    stage.reconfigure(&probe_config);
    let mut probe = pen_report(1.0, 1.0, 1);
    stage.transform(&mut probe);
    assert_eq!(probe.position, Some((0.0, 0.0)));
}

#[test]
fn reconfiguration_over_handle_swaps_atomically_per_report() {
    let mut stage = stage_with(&ShaperConfig::default());
    let handle = stage.handle();

    let mut before = pen_report(10.0, 10.0, 100);
    stage.transform(&mut before);
    assert_eq!(before.position, Some((10.0, 10.0)));

    // Reconfigure from another thread, as a host control plane would
    let worker = std::thread::spawn(move || {
        handle.reconfigure(&ShaperConfig {
            x_formula: "x * 2".into(),
            y_formula: "y * 2".into(),
            ..ShaperConfig::default()
        })
    });
    worker.join().unwrap().unwrap();

    // Both channels swap together: the next report sees the full new set
    let mut after = pen_report(10.0, 10.0, 100);
    stage.transform(&mut after);
    assert_eq!(after.position, Some((20.0, 20.0)));
}

#[test]
fn partial_capability_reports_shape_only_their_fields() {
    let config = ShaperConfig {
        x_formula: "x + 5".into(),
        tilt_x_formula: "tx * 2".into(),
        ..ShaperConfig::default()
    };
    let mut stage = stage_with(&config);

    // Tilt-only report: position channels never run
    let mut tilt_only = Report {
        tilt: Some((1.0, -1.0)),
        ..Report::default()
    };
    stage.transform(&mut tilt_only);
    assert_eq!(tilt_only.tilt, Some((2.0, -1.0)));
    assert_eq!(tilt_only.position, None);
    assert_eq!(tilt_only.pressure, None);

    // Position without pressure is not the pen capability
    let mut position_only = Report {
        position: Some((1.0, 1.0)),
        ..Report::default()
    };
    stage.transform(&mut position_only);
    assert_eq!(position_only.position, Some((1.0, 1.0)));
}

#[test]
fn hover_distance_feeds_formulas_but_is_never_written() {
    let config = ShaperConfig {
        x_formula: "d".into(),
        ..ShaperConfig::default()
    };
    let mut stage = stage_with(&config);

    let mut report = Report {
        position: Some((10.0, 20.0)),
        pressure: Some(500),
        hover_distance: Some(42),
        ..Report::default()
    };
    stage.transform(&mut report);

    assert_eq!(report.position, Some((42.0, 20.0)));
    assert_eq!(report.hover_distance, Some(42));
}
