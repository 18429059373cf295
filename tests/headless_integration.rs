use std::sync::mpsc;
use std::time::Duration;

use pomotui::controller::SessionController;
use pomotui::runtime::{
    AppEvent, FixedTicker, ManualTickScheduler, Runner, TestEventSource, ThreadTickScheduler,
    TICK_INTERVAL,
};
use pomotui::session::Phase;
use pomotui::settings::{SettingField, Settings};

// Headless integration using the internal runtime + controller without a TTY.
// Ticks are injected through the test event source the same way the tick
// thread delivers them in the binary.
#[test]
fn headless_work_session_rolls_into_short_break() {
    let settings = Settings::new(1, 2, 15).unwrap();
    let mut controller = SessionController::new(settings, ManualTickScheduler::new());
    controller.start_pause();
    let generation = controller.generation();

    let (tx, rx) = mpsc::channel();
    for _ in 0..60 {
        tx.send(AppEvent::Tick(generation)).unwrap();
    }

    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    for _ in 0..100u32 {
        match runner.step() {
            AppEvent::Tick(g) => controller.on_tick(g),
            AppEvent::Frame | AppEvent::Closed => break,
            AppEvent::Key(_) | AppEvent::Resize => {}
        }
    }

    let state = controller.snapshot();
    assert_eq!(state.phase, Phase::ShortBreak);
    assert_eq!(state.remaining_secs, 2 * 60);
    assert_eq!(state.completed_work_sessions, 1);
    assert!(state.is_running);
}

#[test]
fn headless_long_break_cadence() {
    // Work phases of one minute; count which break follows each work phase
    let settings = Settings::new(1, 1, 15).unwrap();
    let mut controller = SessionController::new(settings, ManualTickScheduler::new());
    controller.start_pause();

    let mut breaks = Vec::new();
    while breaks.len() < 6 {
        let before = controller.snapshot().phase;
        controller.on_tick(controller.generation());
        let after = controller.snapshot().phase;
        if before == Phase::Work && after != Phase::Work {
            breaks.push(after);
        }
    }

    assert_eq!(
        breaks,
        vec![
            Phase::ShortBreak,
            Phase::ShortBreak,
            Phase::ShortBreak,
            Phase::ShortBreak,
            Phase::LongBreak,
            Phase::ShortBreak,
        ]
    );
    assert_eq!(controller.snapshot().completed_work_sessions, 6);
}

#[test]
fn headless_paused_edits_then_reset() {
    let ticks = ManualTickScheduler::new();
    let mut controller = SessionController::new(Settings::default(), ticks.clone());

    controller.change_setting(SettingField::WorkTime, 30).unwrap();
    assert_eq!(controller.snapshot().remaining_secs, 1800);

    controller.set_mode(Phase::ShortBreak);
    controller.change_setting(SettingField::WorkTime, 45).unwrap();
    assert_eq!(controller.snapshot().remaining_secs, 5 * 60);

    assert!(controller
        .change_setting(SettingField::ShortBreakTime, 0)
        .is_err());

    controller.start_pause();
    controller.tick();
    controller.reset();

    let state = controller.snapshot();
    assert_eq!(state.phase, Phase::Work);
    assert_eq!(state.remaining_secs, 45 * 60);
    assert_eq!(state.completed_work_sessions, 0);
    assert!(!state.is_running);
    assert_eq!(ticks.live_handles(), 0);
}

#[test]
fn headless_thread_ticks_drive_countdown() {
    let (tx, rx) = mpsc::channel();
    let scheduler = ThreadTickScheduler::new(tx, Duration::from_millis(5));
    let mut controller = SessionController::new(Settings::default(), scheduler);
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(500)),
    );

    controller.start_pause();
    let start = controller.snapshot().remaining_secs;

    let mut applied = 0;
    for _ in 0..200u32 {
        if let AppEvent::Tick(g) = runner.step() {
            controller.on_tick(g);
            applied += 1;
            if applied == 3 {
                break;
            }
        }
    }
    controller.start_pause();

    assert_eq!(applied, 3);
    assert_eq!(controller.snapshot().remaining_secs, start - 3);
    assert!(!controller.is_ticking());
}

#[test]
fn tick_interval_is_one_second() {
    assert_eq!(TICK_INTERVAL, Duration::from_secs(1));
}
