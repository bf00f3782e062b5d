use std::time::Duration;

use ferroservo::prelude::*;
use ferroservo_clients::experiment::PhaseKind;
use ferroservo_demos::{ManualClock, ScriptedInput, SimRig};

fn press(signal: Signal) -> InputState {
    InputState::new().hold(signal)
}

fn rig(config: &ServoConfig) -> SimRig {
    SimRig::new(
        Particle::new(Point2D::new(430., 560.), config.frame_period())
            .coils(config.coils.clone())
            .params(config.params),
    )
}

#[test]
fn click_to_target() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = ServoConfig::default();
    let rig = rig(&config);
    let target = Point2D::new(520., 580.);
    let clock = ManualClock::new();
    let servo = ServoLoop::new(config)
        .sensor(rig.sensor())
        .driver(rig.driver())
        .clock(clock.clone())
        .input(
            ScriptedInput::new()
                .at(0, press(Signal::ModeToggle))
                .at(1, InputState::new().click(target)),
        )
        .max_cycles(200)
        .check()?
        .run()?;
    let position = rig.position().unwrap();
    assert!(position.within(&target, 3.), "{position}");
    assert_eq!(servo.command(), target);
    assert_eq!(servo.state().mode, ControlMode::Automatic);
    let report = servo.report();
    assert_eq!(report.cycles, 200);
    assert_eq!(report.tracking_losses, 0);
    assert_eq!(report.solver_failures, 0);
    assert_eq!(report.elapsed, Duration::from_secs(20));
    assert_eq!(clock.now(), Duration::from_secs(20));
    assert_eq!(rig.writes().last(), Some(&ActivationMask::OFF));
    Ok(())
}

#[test]
fn recording() -> anyhow::Result<()> {
    let config = ServoConfig::default();
    let rig = rig(&config);
    let sink = MemoryLog::new();
    ServoLoop::new(config)
        .sensor(rig.sensor())
        .driver(rig.driver())
        .clock(ManualClock::new())
        .sink(sink.clone())
        .input(
            ScriptedInput::new()
                .at(0, press(Signal::ModeToggle))
                .at(1, press(Signal::RecordingToggle))
                .at(11, press(Signal::RecordingToggle)),
        )
        .max_cycles(20)
        .check()?
        .run()?;
    let recordings = sink.recordings();
    assert_eq!(recordings.len(), 1);
    let records = &recordings[0];
    assert_eq!(records.len(), 10);
    assert_eq!(records[0].elapsed, Duration::ZERO);
    assert_eq!(records[9].elapsed, Duration::from_millis(900));
    assert!(records
        .iter()
        .all(|record| record.command == Point2D::new(470., 532.)));
    let lines = sink.lines();
    assert!(lines[1].starts_with("100000,470,532,"), "{}", lines[1]);
    assert_eq!(lines[1].split(',').count(), 6);
    Ok(())
}

#[test]
fn tracking_loss() -> anyhow::Result<()> {
    let config = ServoConfig::default();
    let rig = rig(&config);
    let servo = ServoLoop::new(config)
        .sensor(rig.sensor().dropouts([10]))
        .driver(rig.driver())
        .clock(ManualClock::new())
        .input(
            ScriptedInput::new()
                .at(0, press(Signal::ModeToggle))
                .at(2, press(Signal::StepToggle)),
        )
        .max_cycles(20)
        .check()?
        .run()?;
    assert_eq!(servo.state().mode, ControlMode::Manual);
    assert_eq!(servo.state().source(), TargetSource::Click);
    assert_eq!(servo.report().tracking_losses, 1);
    // coils off from the tracking loss on
    assert!(rig.writes()[10..].iter().all(|mask| mask.is_off()));
    Ok(())
}

#[test]
fn actuator_failure() -> anyhow::Result<()> {
    let config = ServoConfig::default();
    let rig = rig(&config);
    let result = ServoLoop::new(config)
        .sensor(rig.sensor())
        .driver(rig.driver().fail_after(5))
        .clock(ManualClock::new())
        .input(ScriptedInput::new().at(0, press(Signal::ModeToggle)))
        .max_cycles(20)
        .check()?
        .run();
    assert!(matches!(result, Err(ServoError::Actuator(_))));
    let writes = rig.writes();
    assert_eq!(writes.len(), 6);
    assert_eq!(writes.last(), Some(&ActivationMask::OFF));
    Ok(())
}

#[test]
fn quit() -> anyhow::Result<()> {
    let config = ServoConfig::default();
    let rig = rig(&config);
    let servo = ServoLoop::new(config)
        .sensor(rig.sensor())
        .driver(rig.driver())
        .clock(ManualClock::new())
        .input(
            ScriptedInput::new()
                .at(0, press(Signal::ModeToggle))
                .at(5, press(Signal::Quit)),
        )
        .check()?
        .run()?;
    assert_eq!(servo.report().cycles, 6);
    assert_eq!(rig.writes().len(), 6);
    assert_eq!(rig.writes().last(), Some(&ActivationMask::OFF));
    Ok(())
}

#[test]
fn trajectory() -> anyhow::Result<()> {
    let mut config = ServoConfig::default();
    config.trajectory.shape = Shape::Square;
    let rig = rig(&config);
    let sink = MemoryLog::new();
    let servo = ServoLoop::new(config)
        .sensor(rig.sensor())
        .driver(rig.driver())
        .clock(ManualClock::new())
        .sink(sink.clone())
        .input(
            ScriptedInput::new()
                .at(0, press(Signal::ModeToggle))
                .at(1, press(Signal::TrajectoryToggle)),
        )
        .max_cycles(300)
        .check()?
        .run()?;
    assert!(servo.state().is_active(TargetSource::Trajectory));
    assert!(servo.trajectories().progress().segment > 0);
    assert_eq!(sink.recordings().len(), 1);
    assert_eq!(sink.recordings()[0].len(), 299);
    Ok(())
}

#[test]
fn experiment() -> anyhow::Result<()> {
    let mut config = ServoConfig::default();
    config.experiment.kind = ExperimentKind::ClosedLoopPositioning;
    let rig = rig(&config);
    let sink = MemoryLog::new();
    let servo = ServoLoop::new(config)
        .sensor(rig.sensor())
        .driver(rig.driver())
        .clock(ManualClock::new())
        .sink(sink.clone())
        .input(
            ScriptedInput::new()
                .at(0, press(Signal::ModeToggle))
                .at(1, press(Signal::OpenLoopToggle)),
        )
        .max_cycles(200)
        .check()?
        .run()?;
    assert!(servo.state().open_loop);
    assert_eq!(
        servo.experiment().phase().map(|phase| phase.kind),
        Some(PhaseKind::Record)
    );
    assert_eq!(sink.recordings().len(), 1);
    assert!(!sink.recordings()[0].is_empty());
    Ok(())
}
