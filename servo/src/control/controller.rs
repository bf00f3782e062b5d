//! Control logic of a cycle

use std::time::Duration;

use ferroservo_clients::{
    manual::manual_mask, CoilSelector, CycleRecord, Experiment, PointToPoint, RecordSink,
    Recording, StepTrajectory, Trajectories, Trajectory, TuningEditor,
};
use ferroservo_clients_io::{
    ActivationMask, CoilActivation, ParticlePosition, Point2D, TargetPosition,
};
use interface::{print_info, Data, Read, Update, Write};

use crate::{
    collaborators::PositionSensor,
    events::{EdgeDetector, Events, Signal},
    state::{Command, ControlMode, ControlState, TargetSource},
    ServoConfig,
};

/// Step size increment of the step size change signal `[px]`
const STEPSIZE_INCREMENT: f64 = 5.5;
/// Step size wrapping threshold `[px]`
const STEPSIZE_MAX: f64 = 55.;

pub(super) struct Controller {
    pub(super) state: ControlState,
    pub(super) edges: EdgeDetector,
    pub(super) selector: CoilSelector,
    pub(super) tuning: TuningEditor,
    pub(super) trajectories: Trajectories,
    point_to_point: PointToPoint,
    step: StepTrajectory,
    pub(super) experiment: Experiment,
    pub(super) sink: Option<Box<dyn RecordSink>>,
    one_coil: ActivationMask,
    centre: Point2D,
    clicked: Point2D,
    keypad: Vec<u8>,
    pub(super) command: Point2D,
    pub(super) position: Option<Point2D>,
    pub(super) mask: ActivationMask,
    recording_since: Duration,
    pub(super) quit: bool,
}

impl Controller {
    pub fn new(config: &ServoConfig) -> Self {
        let trajectories = Trajectories::new(config.trajectory.clone());
        let centre = config.trajectory.layout.centre;
        let table = config.experiment.kind.table(centre, &config.coils);
        let experiment = Experiment::new(table, config.trajectory.arrival.tolerance);
        Self {
            state: ControlState::new(),
            edges: EdgeDetector::new(),
            selector: config.selector(),
            tuning: TuningEditor::new(config.tuning_step),
            point_to_point: trajectories.point_to_point(),
            step: trajectories.step(),
            trajectories,
            experiment: match config.experiment.max_passes {
                Some(max_passes) => experiment.max_passes(max_passes),
                None => experiment,
            },
            sink: None,
            one_coil: config.one_coil,
            centre,
            clicked: centre,
            keypad: vec![],
            command: centre,
            position: None,
            mask: ActivationMask::OFF,
            recording_since: Duration::ZERO,
            quit: false,
        }
    }
    /// Detects the operator events and applies them
    pub fn apply(&mut self, events: Events, sensor: &mut dyn PositionSensor, now: Duration) {
        if events.contains(Signal::KeyboardToggle) {
            self.state.keyboard_enabled = !self.state.keyboard_enabled;
            log::info!(
                "keyboard {}",
                if self.state.keyboard_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
        }
        if !self.state.keyboard_enabled {
            self.keypad.clear();
            return;
        }
        if let Some(clicked) = events.clicked {
            log::info!("target: {clicked}");
            self.clicked = clicked;
        }
        self.keypad = events.keypad;
        for signal in events.fired {
            match signal {
                Signal::ModeToggle => self.toggle_mode(sensor),
                Signal::Quit => {
                    log::info!("quitting");
                    self.quit = true;
                }
                Signal::TrajectoryToggle => {
                    let on = self.state.toggle(TargetSource::Trajectory);
                    if on {
                        self.trajectories.restart();
                        log::info!("drawing {}", self.trajectories);
                    }
                    self.set_recording(on, now);
                }
                Signal::PointToPointToggle => {
                    let on = self.state.toggle(TargetSource::PointToPoint);
                    if on {
                        self.point_to_point = self.trajectories.point_to_point();
                        log::info!("point-to-point {}", self.trajectories.shape());
                    }
                    self.set_recording(on, now);
                }
                Signal::StepToggle => {
                    let on = self.state.toggle(TargetSource::Step);
                    if on {
                        self.step.reset();
                        log::info!("step response along {}", self.step.axis());
                    }
                    self.set_recording(on, now);
                }
                Signal::StepAxisToggle => {
                    self.step.toggle_axis();
                }
                Signal::StepTrigger => {
                    if !self.state.is_active(TargetSource::Step) || self.step.trigger().is_none() {
                        log::warn!("no step response in progress");
                    }
                }
                Signal::OneCoilToggle => {
                    self.state.one_coil = !self.state.one_coil;
                    log::info!(
                        "one coil {}: {}",
                        if self.state.one_coil { "on" } else { "off" },
                        self.one_coil
                    );
                    self.set_recording(self.state.one_coil, now);
                }
                Signal::OpenLoopToggle => {
                    self.state.open_loop = !self.state.open_loop;
                    if self.state.open_loop {
                        self.experiment.reset();
                        log::info!("{} experiment", self.experiment.table().name);
                    } else {
                        log::info!("{} stopped", self.experiment.table().name);
                        self.set_recording(false, now);
                    }
                }
                Signal::RecordingToggle => self.set_recording(!self.state.recording, now),
                Signal::SkipLevel => {
                    let skip = self.trajectories.skip().next();
                    self.trajectories.set_skip(skip);
                    if let Some(arrival) = self.point_to_point.arrival_mut() {
                        arrival.skip = skip;
                    }
                }
                Signal::ShapeChange => {
                    self.trajectories.next_shape();
                    self.point_to_point = self.trajectories.point_to_point();
                }
                Signal::StepSizeChange => {
                    let mut stepsize = self.trajectories.stepsize() + STEPSIZE_INCREMENT;
                    if stepsize >= STEPSIZE_MAX {
                        stepsize = STEPSIZE_INCREMENT;
                    }
                    self.trajectories.set_stepsize(stepsize);
                    log::info!("stepsize: {stepsize}px");
                }
                Signal::TuningPrint => self.tuning.print(self.selector.params()),
                Signal::TuningSelect => {
                    self.tuning.select_next();
                }
                Signal::TuningIncrement => {
                    self.tuning.increment(self.selector.params_mut());
                }
                Signal::TuningDecrement => {
                    self.tuning.decrement(self.selector.params_mut());
                }
                Signal::KeyboardToggle | Signal::Keypad(_) => (),
            }
        }
    }
    fn toggle_mode(&mut self, sensor: &mut dyn PositionSensor) {
        match self.state.mode {
            ControlMode::Manual => {
                if sensor.acquire() {
                    self.state.mode = ControlMode::Automatic;
                    self.clicked = self.centre;
                    self.command = self.centre;
                    log::info!("{} mode", self.state.mode);
                } else {
                    log::warn!("particle tracking failed, staying in manual mode");
                }
            }
            ControlMode::Automatic => {
                self.state.mode = ControlMode::Manual;
                log::info!("{} mode", self.state.mode);
            }
        }
    }
    /// Reads the particle position
    ///
    /// Returns `true` if the tracking is lost in automatic mode
    pub fn sense(&mut self, sensor: &mut dyn PositionSensor, now: Duration) -> bool {
        let position = sensor.position();
        if position.is_some() {
            self.position = position;
        }
        if position.is_none() && self.state.mode == ControlMode::Automatic {
            log::warn!("particle tracking lost, back to manual mode");
            self.state.mode = ControlMode::Manual;
            self.set_recording(false, now);
            self.state.stop_operations();
            true
        } else {
            false
        }
    }
    /// Activation mask of the cycle
    ///
    /// The one coil override bypasses the coil selection and freezes the
    /// target generators.
    pub fn actuation(&mut self, now: Duration) -> ActivationMask {
        if self.state.one_coil {
            return self.one_coil;
        }
        match (self.state.mode, self.position) {
            (ControlMode::Manual, _) => manual_mask(self.keypad.iter().copied()),
            (ControlMode::Automatic, None) => ActivationMask::OFF,
            (ControlMode::Automatic, Some(position)) => self.automatic(position, now),
        }
    }
    fn automatic(&mut self, position: Point2D, now: Duration) -> ActivationMask {
        let target = match self.state.command() {
            Command::Experiment => {
                let step = self.experiment.step(now, position, &mut self.selector);
                for recording in &step.recording {
                    self.set_recording(*recording == Recording::Start, now);
                }
                if let Some(target) = step.target {
                    self.command = target;
                }
                return step.mask;
            }
            Command::Source(TargetSource::Click) => self.clicked,
            Command::Source(TargetSource::Trajectory) => {
                <Trajectories as Read<ParticlePosition>>::read(
                    &mut self.trajectories,
                    Data::new(position),
                );
                self.trajectories.update();
                <Trajectories as Write<TargetPosition>>::write(&mut self.trajectories)
                    .map_or(self.command, |target| target.get())
            }
            Command::Source(TargetSource::PointToPoint) => self.point_to_point.next(position),
            Command::Source(TargetSource::Step) => self.step.next(position),
        };
        self.command = target;
        <CoilSelector as Read<ParticlePosition>>::read(&mut self.selector, Data::new(position));
        <CoilSelector as Read<TargetPosition>>::read(&mut self.selector, Data::new(target));
        self.selector.update();
        <CoilSelector as Write<CoilActivation>>::write(&mut self.selector)
            .map_or(ActivationMask::OFF, |mask| mask.get())
    }
    /// Starts or stops the recording
    pub fn set_recording(&mut self, on: bool, now: Duration) {
        if on == self.state.recording {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            if on {
                log::debug!("no record sink, recording skipped");
            }
            return;
        };
        let result = if on { sink.start() } else { sink.stop() };
        match result {
            Ok(()) => {
                self.state.recording = on;
                self.recording_since = now;
                log::info!("recording {}", if on { "started" } else { "stopped" });
            }
            Err(e) => {
                self.state.recording = false;
                print_info("recording failed", Some(&e));
            }
        }
    }
    /// Appends the cycle record to the recording
    pub fn record(&mut self, now: Duration) {
        if !self.state.recording {
            return;
        }
        let record = CycleRecord {
            elapsed: now.saturating_sub(self.recording_since),
            command: self.command,
            measured: self.position.unwrap_or_default(),
            mask: self.mask,
        };
        log::debug!("{record}");
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(e) = sink.record(&record) {
            print_info("recording failed, recording stopped", Some(&e));
            self.set_recording(false, now);
        }
    }
}
