use super::*;
use crate::{board::ControlBoard, error::DispatchError};
use async_trait::async_trait;
use shared::domain::Attribute;
use tokio::sync::mpsc;

struct RecordingSink {
    tx: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl CommandSink for RecordingSink {
    async fn dispatch(&self, command: &Command) -> Result<(), DispatchError> {
        self.tx
            .send(command.to_string())
            .map_err(|_| DispatchError::Closed)
    }
}

struct FailingSink;

#[async_trait]
impl CommandSink for FailingSink {
    async fn dispatch(&self, _command: &Command) -> Result<(), DispatchError> {
        Err(DispatchError::Closed)
    }
}

fn bound_binder() -> (UiBinder<RecordingSink>, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut binder = UiBinder::new(
        BindingTable::standard().expect("bindings"),
        Arc::new(RecordingSink { tx }),
        DeviceEndpoints::new("http://device.local").expect("url"),
    );
    assert!(binder.bind());
    (binder, rx)
}

fn scenario_config() -> Configuration {
    serde_json::from_value(serde_json::json!({
        "background": "blend",
        "thermal": {
            "enabled": true, "smooth": 3, "offset_x": 5, "offset_y": -2,
            "scale": 1.2, "opacity": 0.8, "rotate": 90
        },
        "usb_cam": {
            "enabled": false, "emboss": true, "offset_x": 0, "offset_y": 0,
            "scale": 1.0, "opacity": 1.0, "rotate": 0
        }
    }))
    .expect("config")
}

fn commit(control: &str, value: &str) -> ControlEvent {
    ControlEvent::Commit {
        control: control.into(),
        value: value.into(),
    }
}

fn toggle(control: &str, checked: bool) -> ControlEvent {
    ControlEvent::Toggle {
        control: control.into(),
        checked,
    }
}

async fn dispatched_line(
    outcome: EventOutcome,
    rx: &mut mpsc::UnboundedReceiver<String>,
) -> String {
    let (command, handle) = match outcome {
        EventOutcome::Dispatched { command, handle } => (command, handle),
        other => panic!("expected a dispatch, got {other:?}"),
    };
    handle.await.expect("dispatch task");
    let line = rx.try_recv().expect("sink received command");
    assert_eq!(line, command.to_string());
    line
}

#[test]
fn projection_sets_every_bound_control() {
    let (binder, _rx) = bound_binder();
    let mut board = ControlBoard::new();
    binder.apply_config(&mut board, Some(&scenario_config()));

    assert_eq!(board.value(controls::BG_MODE).as_deref(), Some("blend"));
    assert_eq!(board.value(controls::TH_ROT).as_deref(), Some("90"));
    assert_eq!(board.value(controls::TH_OFFY).as_deref(), Some("-2"));
    assert_eq!(board.value(controls::TH_SCALE).as_deref(), Some("1.2"));
    assert_eq!(board.value(controls::CAM_OPACITY).as_deref(), Some("1"));
    assert_eq!(board.value(controls::THERMAL_SMOOTH).as_deref(), Some("3"));
    assert_eq!(board.checked(controls::CAM_EMBOSS), Some(true));
    assert_eq!(board.checked(controls::THERMAL_ENABLED), Some(true));
    assert_eq!(board.checked(controls::CAM_ENABLED), Some(false));
    assert_eq!(board.checked(controls::TH_FLIP_H), Some(false));

    assert_eq!(board.label("th_opacity_val"), Some("0.8"));
    assert_eq!(board.label("thermal_smooth_val"), Some("3"));
    assert_eq!(board.label("cam_rot_val"), Some("0"));
    assert_eq!(board.label("bg_mode_val"), None);
}

#[test]
fn projection_is_idempotent() {
    let (binder, _rx) = bound_binder();
    let config = scenario_config();

    let mut once = ControlBoard::new();
    binder.apply_config(&mut once, Some(&config));
    let mut twice = once.clone();
    binder.apply_config(&mut twice, Some(&config));

    assert_eq!(once, twice);
}

#[test]
fn projection_of_absent_config_changes_nothing() {
    let (binder, _rx) = bound_binder();
    let mut board = ControlBoard::new();
    binder.apply_config(&mut board, None);
    assert_eq!(board, ControlBoard::new());
}

#[tokio::test]
async fn rotation_commit_uses_wire_name() {
    let (binder, mut rx) = bound_binder();
    let mut board = ControlBoard::new();

    let outcome = binder.handle_event(&mut board, commit(controls::TH_ROT, "90"));
    assert_eq!(
        dispatched_line(outcome, &mut rx).await,
        "set thermal rotate_deg 90"
    );
}

#[tokio::test]
async fn slider_commit_maps_control_to_target_and_attribute() {
    let (binder, mut rx) = bound_binder();
    let mut board = ControlBoard::new();

    let outcome = binder.handle_event(&mut board, commit(controls::CAM_OFFX, "-14"));
    assert_eq!(
        dispatched_line(outcome, &mut rx).await,
        "set usb offset_x -14"
    );
    let outcome = binder.handle_event(&mut board, commit(controls::TH_OPACITY, "0.45"));
    assert_eq!(
        dispatched_line(outcome, &mut rx).await,
        "set thermal opacity 0.45"
    );
}

#[tokio::test]
async fn live_preview_only_updates_label() {
    let (binder, mut rx) = bound_binder();
    let mut board = ControlBoard::new();

    for value in ["0.1", "0.2", "0.3", "0.35"] {
        let outcome = binder.handle_event(
            &mut board,
            ControlEvent::Input {
                control: controls::TH_OPACITY.into(),
                value: value.into(),
            },
        );
        assert!(matches!(outcome, EventOutcome::Previewed));
    }
    tokio::task::yield_now().await;

    assert_eq!(board.label("th_opacity_val"), Some("0.35"));
    assert!(board.value(controls::TH_OPACITY).is_none());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn emboss_toggle_renders_digits() {
    let (binder, mut rx) = bound_binder();
    let mut board = ControlBoard::new();

    let on = binder.handle_event(&mut board, toggle(controls::CAM_EMBOSS, true));
    assert_eq!(dispatched_line(on, &mut rx).await, "set usb emboss 1");
    let off = binder.handle_event(&mut board, toggle(controls::CAM_EMBOSS, false));
    assert_eq!(dispatched_line(off, &mut rx).await, "set usb emboss 0");
}

#[tokio::test]
async fn discrete_selectors_dispatch_their_commands() {
    let (binder, mut rx) = bound_binder();
    let mut board = ControlBoard::new();

    let bg = binder.handle_event(&mut board, commit(controls::BG_MODE, "grey"));
    assert_eq!(dispatched_line(bg, &mut rx).await, "bg grey");

    let smooth = binder.handle_event(&mut board, commit(controls::THERMAL_SMOOTH, "4"));
    assert_eq!(
        dispatched_line(smooth, &mut rx).await,
        "set thermal smooth 4"
    );

    let flip = binder.handle_event(&mut board, toggle(controls::CAM_FLIP_V, true));
    assert_eq!(dispatched_line(flip, &mut rx).await, "set usb flip_v 1");
}

#[tokio::test]
async fn unknown_control_dispatches_nothing() {
    let (binder, mut rx) = bound_binder();
    let mut board = ControlBoard::new();

    let outcome = binder.handle_event(&mut board, commit("th_brightness", "7"));
    assert!(matches!(outcome, EventOutcome::Ignored));
    let outcome = binder.handle_event(&mut board, toggle("cam_mirror", true));
    assert!(matches!(outcome, EventOutcome::Ignored));
    let outcome = binder.handle_event(
        &mut board,
        ControlEvent::Click {
            control: "btn_unknown".into(),
        },
    );
    assert!(matches!(outcome, EventOutcome::Ignored));

    tokio::task::yield_now().await;
    assert!(rx.try_recv().is_err());
    assert_eq!(board, ControlBoard::new());
}

#[tokio::test]
async fn enable_toggles_and_blank_values_dispatch_nothing() {
    let (binder, mut rx) = bound_binder();
    let mut board = ControlBoard::new();

    let outcome = binder.handle_event(&mut board, toggle(controls::THERMAL_ENABLED, false));
    assert!(matches!(outcome, EventOutcome::Ignored));
    let outcome = binder.handle_event(&mut board, commit(controls::TH_SCALE, "  "));
    assert!(matches!(outcome, EventOutcome::Ignored));
    let outcome = binder.handle_event(&mut board, commit(controls::THERMAL_SMOOTH, "2.5"));
    assert!(matches!(outcome, EventOutcome::Ignored));

    tokio::task::yield_now().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn events_before_bind_are_dropped() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut binder = UiBinder::new(
        BindingTable::standard().expect("bindings"),
        Arc::new(RecordingSink { tx }),
        DeviceEndpoints::new("http://device.local").expect("url"),
    );
    let mut board = ControlBoard::new();
    assert_eq!(binder.state(), BinderState::Unbound);

    let outcome = binder.handle_event(&mut board, commit(controls::TH_ROT, "45"));
    assert!(matches!(outcome, EventOutcome::Ignored));

    assert!(binder.bind());
    assert!(!binder.bind());
    assert_eq!(binder.state(), BinderState::Bound);

    let outcome = binder.handle_event(&mut board, commit(controls::TH_ROT, "45"));
    assert_eq!(
        dispatched_line(outcome, &mut rx).await,
        "set thermal rotate_deg 45"
    );
}

#[tokio::test]
async fn reload_points_stream_at_fresh_url() {
    let (binder, mut rx) = bound_binder();
    let mut board = ControlBoard::new();

    let outcome = binder.handle_event(
        &mut board,
        ControlEvent::Click {
            control: controls::BTN_RELOAD.into(),
        },
    );
    let url = match outcome {
        EventOutcome::StreamReloaded(url) => url,
        other => panic!("expected stream reload, got {other:?}"),
    };
    assert_eq!(url.path(), "/mjpeg");
    let ts: i64 = url
        .query()
        .and_then(|q| q.strip_prefix("ts="))
        .and_then(|ts| ts.parse().ok())
        .expect("timestamp query");
    assert!(ts > 0);
    assert_eq!(board.stream(), Some(&url));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn dispatch_failure_is_swallowed() {
    let mut binder = UiBinder::new(
        BindingTable::standard().expect("bindings"),
        Arc::new(FailingSink),
        DeviceEndpoints::new("http://device.local").expect("url"),
    );
    binder.bind();
    let mut board = ControlBoard::new();

    let outcome = binder.handle_event(&mut board, commit(controls::CAM_SCALE, "2"));
    let (command, handle) = match outcome {
        EventOutcome::Dispatched { command, handle } => (command, handle),
        other => panic!("expected a dispatch, got {other:?}"),
    };
    assert_eq!(command, Command::set(Target::Usb, Attribute::Scale, "2"));
    handle.await.expect("task completes without panicking");
}

#[test]
fn commit_outside_runtime_is_dropped_without_panicking() {
    let (binder, mut rx) = bound_binder();
    let mut board = ControlBoard::new();

    let outcome = binder.handle_event(&mut board, commit(controls::TH_SCALE, "1.5"));

    assert!(matches!(outcome, EventOutcome::Ignored));
    assert!(rx.try_recv().is_err());
}

#[test]
fn board_records_operator_edits_before_binder_sees_them() {
    let mut board = ControlBoard::new();
    board.record_user_event(&commit(controls::TH_SCALE, "1.7"));
    board.record_user_event(&toggle(controls::CAM_EMBOSS, true));
    board.record_user_event(&ControlEvent::Click {
        control: controls::BTN_RELOAD.into(),
    });

    assert_eq!(board.value(controls::TH_SCALE).as_deref(), Some("1.7"));
    assert_eq!(board.checked(controls::CAM_EMBOSS), Some(true));
    assert!(board.control(controls::BTN_RELOAD).is_none());
}
