/*!
# Servo loop

The loop has 3 states:
 1. [Unknown]: loop state at its creation, the rig collaborators are attached
 2. [Ready]: loop state after checking that the position sensor and the coil driver are attached
 3. [Completed]: loop state after the operator quits or the cycle cap is reached

A loop is checked and run with:
```ignore
let report = ServoLoop::new(config)
    .sensor(sensor)
    .driver(driver)
    .check()?
    .run()?;
```

Each cycle the loop polls the operator inputs, reads the particle position,
computes the coil activation mask, writes it to the coil driver, records
the cycle and sleeps until the end of the frame.
*/

use std::{fmt, marker::PhantomData, time::Duration};

use ferroservo_clients::{CoilSelector, Experiment, Trajectories, TuningEditor};
use ferroservo_clients_io::{ActivationMask, Point2D};
use humantime::format_duration;

use crate::{
    collaborators::{CoilDriver, FrameClock, InputSource, PositionSensor},
    pacing::{FramePacer, FrameReport},
    state::ControlState,
    ServoConfig,
};

mod completed;
mod controller;
mod ready;
mod unknown;

use controller::Controller;

/// [ServoLoop] initial state
pub enum Unknown {}
/// Valid [ServoLoop] state
pub enum Ready {}
/// [ServoLoop] final state
pub enum Completed {}

/// Hardware and operator interfaces
struct Rig {
    sensor: Option<Box<dyn PositionSensor>>,
    driver: Option<Box<dyn CoilDriver>>,
    clock: Box<dyn FrameClock>,
    input: Box<dyn InputSource>,
}

/// Outcome of a control cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// Cycle index
    pub cycle: usize,
    /// Measured particle position
    pub position: Option<Point2D>,
    /// Commanded particle position
    pub command: Point2D,
    pub mask: ActivationMask,
    pub frame: FrameReport,
    /// The operator quit at this cycle
    pub quit: bool,
}

/// Servo loop statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopReport {
    pub cycles: usize,
    pub overruns: usize,
    pub tracking_losses: usize,
    pub solver_failures: usize,
    pub elapsed: Duration,
}

impl fmt::Display for LoopReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cycles in {}: {} overruns, {} tracking losses, {} solver failures",
            self.cycles,
            format_duration(self.elapsed),
            self.overruns,
            self.tracking_losses,
            self.solver_failures
        )
    }
}

/// Frame-paced control loop
pub struct ServoLoop<State> {
    config: ServoConfig,
    rig: Rig,
    controller: Controller,
    pacer: FramePacer,
    report: LoopReport,
    state: PhantomData<State>,
}

impl<S> fmt::Display for ServoLoop<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SERVO LOOP @ {:.1}fps", self.config.fps)?;
        writeln!(f, " {}", self.controller.state)?;
        writeln!(f, " {}", self.controller.trajectories)?;
        writeln!(f, " {}", self.controller.experiment)?;
        write!(f, " {}", self.report)
    }
}

impl<S> ServoLoop<S> {
    pub fn config(&self) -> &ServoConfig {
        &self.config
    }
    pub fn state(&self) -> &ControlState {
        &self.controller.state
    }
    /// Last commanded position
    pub fn command(&self) -> Point2D {
        self.controller.command
    }
    /// Last measured position
    pub fn position(&self) -> Option<Point2D> {
        self.controller.position
    }
    /// Last activation mask written to the coil driver
    pub fn mask(&self) -> ActivationMask {
        self.controller.mask
    }
    pub fn selector(&self) -> &CoilSelector {
        &self.controller.selector
    }
    pub fn trajectories(&self) -> &Trajectories {
        &self.controller.trajectories
    }
    pub fn experiment(&self) -> &Experiment {
        &self.controller.experiment
    }
    pub fn tuning(&self) -> &TuningEditor {
        &self.controller.tuning
    }
    pub fn report(&self) -> LoopReport {
        LoopReport {
            solver_failures: self.controller.selector.failures(),
            ..self.report
        }
    }
    fn into_state<T>(self) -> ServoLoop<T> {
        ServoLoop {
            config: self.config,
            rig: self.rig,
            controller: self.controller,
            pacer: self.pacer,
            report: self.report,
            state: PhantomData,
        }
    }
}
