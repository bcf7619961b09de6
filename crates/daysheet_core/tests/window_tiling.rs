use daysheet_core::{
    ConfigError, ReflowPolicy, ScheduleConfig, ScheduleController, TimeOfDay, WindowModel,
};
use std::io::Write;

fn hm(hours: u32, minutes: u32) -> TimeOfDay {
    TimeOfDay::from_hm(hours, minutes)
}

fn assert_exact_tiling(model: &WindowModel) {
    let blocks = model.blocks();
    assert!(!blocks.is_empty());
    assert_eq!(blocks[0].start, model.window_start());
    assert_eq!(blocks.last().unwrap().end, model.window_end());
    for pair in blocks.windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    for block in blocks {
        assert_eq!(block.duration_minutes(), model.step_minutes());
        assert!(block.is_settled());
    }
}

#[test]
fn rebuild_tiles_every_window_and_step() {
    let cases = [
        (30, hm(8, 0), hm(19, 0), 22),
        (15, hm(6, 0), hm(12, 0), 24),
        (30, hm(0, 0), TimeOfDay::END_OF_DAY, 48),
        (60, hm(9, 0), hm(10, 0), 1),
    ];

    for (step, start, end, expected) in cases {
        let config = ScheduleConfig::default()
            .with_step(step)
            .with_window(start, end);
        let model = WindowModel::new(&config);
        assert_eq!(model.len(), expected, "step {step} window {start}-{end}");
        assert_exact_tiling(&model);
    }
}

#[test]
fn set_window_rebuilds_and_drops_old_blocks() {
    let mut model = WindowModel::new(&ScheduleConfig::default());
    let old_ids: Vec<_> = model.blocks().iter().map(|block| block.id).collect();

    assert!(model.set_window(hm(10, 0), hm(12, 0)));

    assert_eq!(model.len(), 4);
    assert_exact_tiling(&model);
    assert!(model.blocks().iter().all(|block| !old_ids.contains(&block.id)));
}

#[test]
fn set_window_snaps_bounds() {
    let mut model = WindowModel::new(&ScheduleConfig::default());
    model.set_window(hm(9, 10), hm(11, 50));

    assert_eq!(model.window_start(), hm(9, 0));
    assert_eq!(model.window_end(), hm(12, 0));
    assert_exact_tiling(&model);
}

#[test]
fn cascade_reflow_keeps_tail_contiguous() {
    let mut model = WindowModel::new(&ScheduleConfig::default().with_window(hm(8, 0), hm(12, 0)));
    model.assign_end(2, hm(10, 0));
    model.normalize_boundary(2, daysheet_core::BoundaryField::End);

    let blocks = model.blocks();
    assert_eq!(blocks[2].end, hm(10, 0));
    for pair in blocks[2..].windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
    assert_eq!(blocks.last().unwrap().end, hm(12, 0));
    assert_eq!(blocks.len(), 7);
}

#[test]
fn config_file_loads_and_builds_schedule() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"stepMinutes": 15, "windowStart": "09:00", "windowEnd": "10:00", "reflowPolicy": "align_next"}}"#
    )
    .unwrap();

    let config = ScheduleConfig::load(file.path()).unwrap();
    let schedule = ScheduleController::try_new(&config).unwrap();

    assert_eq!(schedule.policy(), ReflowPolicy::AlignNext);
    assert_eq!(schedule.blocks().len(), 4);
    assert_eq!(schedule.step_minutes(), 15);
}

#[test]
fn config_load_reports_missing_file_and_invalid_window() {
    let dir = tempfile::tempdir().unwrap();
    let err = ScheduleConfig::load(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));

    let err = ScheduleConfig::from_json_str(r#"{"windowStart": "12:00", "windowEnd": "09:00"}"#)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
