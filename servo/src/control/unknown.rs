use std::marker::PhantomData;

use ferroservo_clients::{RecordSink, Solver, TextLog};
use interface::trim_type_name;

use super::{Controller, LoopReport, Ready, Rig, ServoLoop, Unknown};
use crate::{
    collaborators::{CoilDriver, FrameClock, InputSource, NoInput, PositionSensor, SystemClock},
    pacing::FramePacer,
    Result, ServoConfig, ServoError,
};

impl ServoLoop<Unknown> {
    /// Returns a new servo loop
    ///
    /// The loop paces itself on the wall clock and has no operator inputs,
    /// recordings are written to `config.record_dir` if it is set.
    pub fn new(config: ServoConfig) -> Self {
        let mut controller = Controller::new(&config);
        if let Some(directory) = config.record_dir.as_ref() {
            controller.sink = Some(Box::new(TextLog::new(directory)));
        }
        Self {
            pacer: FramePacer::new(config.frame_period()),
            config,
            rig: Rig {
                sensor: None,
                driver: None,
                clock: Box::new(SystemClock::new()),
                input: Box::new(NoInput),
            },
            controller,
            report: LoopReport::default(),
            state: PhantomData,
        }
    }
    /// Attaches the particle position sensor
    pub fn sensor<T: PositionSensor + 'static>(mut self, sensor: T) -> Self {
        log::debug!("position sensor: {}", trim_type_name::<T>());
        self.rig.sensor = Some(Box::new(sensor));
        self
    }
    /// Attaches the coil driver
    pub fn driver<T: CoilDriver + 'static>(mut self, driver: T) -> Self {
        log::debug!("coil driver: {}", trim_type_name::<T>());
        self.rig.driver = Some(Box::new(driver));
        self
    }
    pub fn clock<T: FrameClock + 'static>(mut self, clock: T) -> Self {
        log::debug!("frame clock: {}", trim_type_name::<T>());
        self.rig.clock = Box::new(clock);
        self
    }
    /// Attaches the operator inputs
    pub fn input<T: InputSource + 'static>(mut self, input: T) -> Self {
        log::debug!("operator inputs: {}", trim_type_name::<T>());
        self.rig.input = Box::new(input);
        self
    }
    /// Sets the destination of the recordings
    pub fn sink<T: RecordSink + 'static>(mut self, sink: T) -> Self {
        log::debug!("record sink: {}", trim_type_name::<T>());
        self.controller.sink = Some(Box::new(sink));
        self
    }
    /// Sets the coil selection solver
    pub fn solver<T: Solver + 'static>(mut self, solver: T) -> Self {
        log::debug!("coil selection solver: {}", trim_type_name::<T>());
        self.controller.selector = std::mem::take(&mut self.controller.selector).solver(solver);
        self
    }
    /// Completes the loop after `max_cycles` cycles
    pub fn max_cycles(mut self, max_cycles: usize) -> Self {
        self.config.max_cycles = Some(max_cycles);
        self
    }
    /// Validates the rig
    pub fn check(self) -> Result<ServoLoop<Ready>> {
        if self.rig.sensor.is_none() {
            return Err(ServoError::Missing("position sensor"));
        }
        if self.rig.driver.is_none() {
            return Err(ServoError::Missing("coil driver"));
        }
        log::info!(
            "servo loop @ {:.1}fps, {} solver",
            self.config.fps,
            self.controller.selector.solver_name()
        );
        Ok(self.into_state())
    }
}
