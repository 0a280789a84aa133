mod common;

use common::*;
use teleop_core::state::FlightController;
use teleop_core::{Bindings, ControlConfig, FlightState, RateVector, Session, TrimState};

fn session() -> Session {
    Session::new(&ControlConfig::default(), Bindings::default())
}

#[tokio::test]
async fn takeoff_from_grounded_issues_one_command() {
    let log = log();
    let mut v = RecordingVehicle::new(log.clone());
    let mut s = session();

    s.step(&frame(vec![down(5)], &[0.0; 4]), &mut v).await.unwrap();

    assert_eq!(s.flight().flight(), FlightState::Airborne);
    assert_eq!(count(&log, "takeoff"), 1);
}

#[tokio::test]
async fn duplicate_takeoff_and_grounded_land_are_noops() {
    let log = log();
    let mut v = RecordingVehicle::new(log.clone());
    let mut s = session();

    s.step(&frame(vec![down(3)], &[0.0; 4]), &mut v).await.unwrap();
    assert_eq!(count(&log, "land"), 0);

    s.step(&frame(vec![down(5), down(5)], &[0.0; 4]), &mut v).await.unwrap();
    assert_eq!(count(&log, "takeoff"), 1);

    let mut fc = FlightController::default();
    assert!(!fc.land(&mut v).await.unwrap());
    assert!(fc.takeoff(&mut v).await.unwrap());
    assert!(!fc.takeoff(&mut v).await.unwrap());
    assert_eq!(count(&log, "takeoff"), 2);
}

#[tokio::test]
async fn rejected_takeoff_stays_grounded() {
    let log = log();
    let mut v = RecordingVehicle { log: log.clone(), reject: Some("takeoff") };
    let mut s = session();

    let err = s.step(&frame(vec![down(5)], &[0.0; 4]), &mut v).await.unwrap_err();
    assert!(format!("{:#}", err).contains("takeoff"));
    assert_eq!(s.flight().flight(), FlightState::Grounded);
}

#[tokio::test]
async fn airborne_frame_sends_documented_rates() {
    let log = log();
    let mut v = RecordingVehicle::new(log.clone());
    let mut s = session();
    s.step(&frame(vec![down(5)], &[0.0; 4]), &mut v).await.unwrap();

    let sent = s.step(&frame(vec![], &[0.5, -0.2, 0.1, 0.3]), &mut v).await.unwrap();
    assert_eq!(sent, Some(RateVector { roll: 13, pitch: 1, yaw: -3, throttle: 0 }));
    assert_eq!(log.borrow().last().unwrap(), "rc 13 1 -3 0");
}

#[tokio::test]
async fn grounded_frame_sends_nothing() {
    let log = log();
    let mut v = RecordingVehicle::new(log.clone());
    let mut s = session();
    let sent = s.step(&frame(vec![], &[0.5, 0.5, 0.5, 0.5]), &mut v).await.unwrap();
    assert_eq!(sent, None);
    assert_eq!(count(&log, "rc"), 0);
}

#[tokio::test]
async fn trim_capture_between_press_and_release() {
    let mut v = RecordingVehicle::new(log());
    let mut s = session();
    s.step(&frame(vec![down(5)], &[0.0; 4]), &mut v).await.unwrap();

    let held = [0.04, -0.02, 0.01, 0.06];
    let sent = s.step(&frame(vec![down(0)], &held), &mut v).await.unwrap();
    assert_eq!(s.flight().trim_state(), TrimState::Trimming);
    assert_eq!(sent, Some(RateVector::default()));

    s.step(&frame(vec![up(0)], &[0.9, 0.9, 0.9, 0.9]), &mut v).await.unwrap();
    assert_eq!(s.flight().trim_state(), TrimState::Idle);
    assert_eq!(s.trim().current().values(), &held);

    // the captured stick position now reads as neutral
    let sent = s.step(&frame(vec![], &held), &mut v).await.unwrap().unwrap();
    assert!(sent.is_neutral());
}

#[tokio::test]
async fn trim_button_ignored_on_ground_and_reset_works_anywhere() {
    let mut v = RecordingVehicle::new(log());
    let mut s = session();

    s.step(&frame(vec![down(0)], &[0.3; 4]), &mut v).await.unwrap();
    assert_eq!(s.flight().trim_state(), TrimState::Idle);

    s.step(&frame(vec![down(5), down(0)], &[0.3; 4]), &mut v).await.unwrap();
    assert!(!s.trim().is_zero());

    s.step(&frame(vec![up(0), down(3)], &[0.0; 4]), &mut v).await.unwrap();
    s.step(&frame(vec![down(1)], &[0.0; 4]), &mut v).await.unwrap();
    assert!(s.trim().is_zero());
}

#[tokio::test]
async fn landing_ends_trimming_but_keeps_trim() {
    let mut v = RecordingVehicle::new(log());
    let mut s = session();
    s.step(&frame(vec![down(5)], &[0.0; 4]), &mut v).await.unwrap();
    s.step(&frame(vec![down(0)], &[0.2; 4]), &mut v).await.unwrap();

    s.step(&frame(vec![down(3)], &[0.0; 4]), &mut v).await.unwrap();
    assert_eq!(s.flight().flight(), FlightState::Grounded);
    assert_eq!(s.flight().trim_state(), TrimState::Idle);
    assert_eq!(s.trim().current().values(), &[0.2; 4]);
}

#[tokio::test]
async fn speed_tiers_clamp() {
    let log = log();
    let mut v = RecordingVehicle::new(log.clone());
    let mut s = session();
    s.step(&frame(vec![down(5)], &[0.0; 4]), &mut v).await.unwrap();

    let mut tiers = Vec::new();
    for _ in 0..4 {
        s.step(&frame(vec![down(4)], &[0.0; 4]), &mut v).await.unwrap();
        tiers.push(s.flight().speed());
    }
    assert_eq!(tiers, vec![40, 70, 100, 100]);

    for _ in 0..4 {
        s.step(&frame(vec![down(2)], &[0.0; 4]), &mut v).await.unwrap();
    }
    assert_eq!(s.flight().speed(), 10);
    assert_eq!(count(&log, "speed"), 8);
}

#[tokio::test]
async fn speed_buttons_ignored_on_ground() {
    let log = log();
    let mut v = RecordingVehicle::new(log.clone());
    let mut s = session();
    s.step(&frame(vec![down(4), down(2)], &[0.0; 4]), &mut v).await.unwrap();
    assert_eq!(count(&log, "speed"), 0);
    assert_eq!(s.flight().speed(), 10);
}

#[tokio::test]
async fn hat_flips_only_airborne() {
    let log = log();
    let mut v = RecordingVehicle::new(log.clone());
    let mut s = session();
    s.step(&frame(vec![hat(-1, 0)], &[0.0; 4]), &mut v).await.unwrap();
    assert_eq!(count(&log, "flip"), 0);

    s.step(&frame(vec![down(5), hat(0, 1), hat(0, 0), hat(1, 0)], &[0.0; 4]), &mut v).await.unwrap();
    let flips: Vec<String> = log.borrow().iter().filter(|l| l.starts_with("flip")).cloned().collect();
    assert_eq!(flips, vec!["flip Forward", "flip Right"]);
}

#[tokio::test]
async fn short_axis_snapshot_fails_loudly() {
    let mut v = RecordingVehicle::new(log());
    let mut s = session();
    s.step(&frame(vec![down(5)], &[0.0; 4]), &mut v).await.unwrap();
    let err = s.step(&frame(vec![], &[0.0, 0.0]), &mut v).await.unwrap_err();
    assert!(err.to_string().contains("out of range"), "{}", err);
}

#[tokio::test]
async fn quit_sets_flag_without_stopping_the_frame() {
    let log = log();
    let mut v = RecordingVehicle::new(log.clone());
    let mut s = session();
    s.step(&frame(vec![teleop_core::InputEvent::Quit, down(5)], &[0.0; 4]), &mut v).await.unwrap();
    assert!(s.quit_requested());
    assert_eq!(count(&log, "takeoff"), 1);
}
