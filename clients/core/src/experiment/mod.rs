/*!
# Experiment sequencer

Open loop characterisation experiments share one phase skeleton:
move to a point with the coil selector, optionally settle on it, turn the coils off
to cool down and record the particle motion under a fixed activation pattern.
Each experiment is an [ExperimentTable] run by the same [Experiment] sequencer.

After the last phase, the sequencer loops back to the first one; every `iterations`
loops it advances to the next sweep position (next target and/or next activation pattern).
*/

use std::{fmt, time::Duration};

use ferroservo_clients_io::{ActivationMask, Point2D};

use crate::CoilSelector;

mod tables;
pub use tables::ExperimentKind;

/// Phase kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    MoveToPoint,
    Settle,
    Cooldown,
    /// Recording is on for the duration of the phase
    Record,
}

/// Coil activation during a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuation {
    /// Coils selected by the coil selector
    Servo,
    /// All coils off
    Off,
    /// Activation of the previous cycle
    Hold,
    /// Activation pattern of the current sweep position
    Pattern,
}

/// Phase exit predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exit {
    /// The particle is within tolerance of the target
    Arrived,
    /// The phase has lasted longer than the given duration
    Elapsed(Duration),
    /// Elapsed, or the particle is further away from the experiment centre than the given radius `[px]`
    ElapsedOrEscaped(Duration, f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    pub kind: PhaseKind,
    pub actuation: Actuation,
    pub exit: Exit,
}

impl Phase {
    pub fn new(kind: PhaseKind, actuation: Actuation, exit: Exit) -> Self {
        Self {
            kind,
            actuation,
            exit,
        }
    }
}

/// Declarative experiment definition
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentTable {
    pub name: String,
    /// Reference point of the escape radius
    pub centre: Point2D,
    pub targets: Vec<Point2D>,
    pub patterns: Vec<ActivationMask>,
    pub phases: Vec<Phase>,
    /// Number of loops per sweep position
    pub iterations: usize,
}

impl ExperimentTable {
    /// Number of sweep positions
    pub fn sweep_len(&self) -> usize {
        self.targets.len().max(self.patterns.len()).max(1)
    }
    /// Target of a sweep position
    pub fn target(&self, sweep: usize) -> Option<Point2D> {
        (!self.targets.is_empty()).then(|| self.targets[sweep % self.targets.len()])
    }
    /// Activation pattern of a sweep position
    pub fn pattern(&self, sweep: usize) -> ActivationMask {
        if self.patterns.is_empty() {
            ActivationMask::OFF
        } else {
            self.patterns[sweep % self.patterns.len()]
        }
    }
    /// Checks if `position` is out of the square of half width `radius` around the centre
    pub fn escaped(&self, position: &Point2D, radius: f64) -> bool {
        let delta = *position - self.centre;
        delta.u.abs() > radius || delta.v.abs() > radius
    }
}

/// Sequencer state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ExperimentState {
    #[default]
    Init,
    Running {
        phase: usize,
        /// Time of entry in the phase
        since: Duration,
    },
    /// All the passes are completed, the coils are off
    Finished,
}

/// Recording switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recording {
    Start,
    Stop,
}

/// Sequencer output of a cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentStep {
    /// Commanded position
    pub target: Option<Point2D>,
    pub mask: ActivationMask,
    /// Recording switches, in the order they must be applied
    pub recording: Vec<Recording>,
}

/// Experiment sequencer
#[derive(Debug, Clone)]
pub struct Experiment {
    table: ExperimentTable,
    tolerance: f64,
    state: ExperimentState,
    iteration: usize,
    sweep: usize,
    passes: usize,
    max_passes: Option<usize>,
    mask: ActivationMask,
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: sweep {}/{}, iteration {}/{}, pass #{}",
            self.table.name,
            self.sweep + 1,
            self.table.sweep_len(),
            self.iteration + 1,
            self.table.iterations,
            self.passes + 1
        )
    }
}

impl Experiment {
    /// Creates an experiment sequencer with the position error `tolerance`
    pub fn new(table: ExperimentTable, tolerance: f64) -> Self {
        Self {
            table,
            tolerance,
            state: ExperimentState::Init,
            iteration: 0,
            sweep: 0,
            passes: 0,
            max_passes: None,
            mask: ActivationMask::OFF,
        }
    }
    /// Stops the experiment after `max_passes` complete sweeps
    pub fn max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = Some(max_passes);
        self
    }
    pub fn table(&self) -> &ExperimentTable {
        &self.table
    }
    pub fn state(&self) -> ExperimentState {
        self.state
    }
    /// Current phase
    pub fn phase(&self) -> Option<&Phase> {
        match self.state {
            ExperimentState::Running { phase, .. } => self.table.phases.get(phase),
            _ => None,
        }
    }
    pub fn iteration(&self) -> usize {
        self.iteration
    }
    pub fn sweep(&self) -> usize {
        self.sweep
    }
    pub fn passes(&self) -> usize {
        self.passes
    }
    pub fn is_finished(&self) -> bool {
        self.state == ExperimentState::Finished
    }
    /// Rewinds the experiment to its first sweep position
    pub fn reset(&mut self) {
        self.state = ExperimentState::Init;
        self.iteration = 0;
        self.sweep = 0;
        self.passes = 0;
        self.mask = ActivationMask::OFF;
    }
    /// Advances the sequencer by one cycle at time `now`
    pub fn step(
        &mut self,
        now: Duration,
        position: Point2D,
        selector: &mut CoilSelector,
    ) -> ExperimentStep {
        let mut recording = Vec::new();
        if self.state == ExperimentState::Init {
            log::info!("{} started", self.table.name);
            recording.extend(self.enter(0, now));
        }
        let ExperimentState::Running { phase, since } = self.state else {
            self.mask = ActivationMask::OFF;
            return ExperimentStep {
                target: None,
                mask: self.mask,
                recording,
            };
        };
        let target = self.table.target(self.sweep);
        if let Some(current) = self.table.phases.get(phase).copied() {
            let elapsed = now.saturating_sub(since);
            let exit = match current.exit {
                Exit::Arrived => target.map_or(true, |t| t.within(&position, self.tolerance)),
                Exit::Elapsed(duration) => elapsed > duration,
                Exit::ElapsedOrEscaped(duration, radius) => {
                    elapsed > duration || self.table.escaped(&position, radius)
                }
            };
            if exit {
                log::debug!("{:?} completed after {:?}", current.kind, elapsed);
                if current.kind == PhaseKind::Record {
                    recording.push(Recording::Stop);
                }
                let start = if phase + 1 < self.table.phases.len() {
                    self.enter(phase + 1, now)
                } else {
                    self.iterate(now)
                };
                recording.extend(start);
            }
        }
        // the sweep position may have changed
        let target = match self.state {
            ExperimentState::Finished => None,
            _ => self.table.target(self.sweep).or(target),
        };
        self.mask = match self.phase().map(|phase| phase.actuation) {
            Some(Actuation::Servo) => {
                target.map_or(ActivationMask::OFF, |t| selector.select_coils(position, t))
            }
            Some(Actuation::Hold) => self.mask,
            Some(Actuation::Pattern) => self.table.pattern(self.sweep),
            Some(Actuation::Off) | None => ActivationMask::OFF,
        };
        ExperimentStep {
            target,
            mask: self.mask,
            recording,
        }
    }
    fn enter(&mut self, phase: usize, now: Duration) -> Option<Recording> {
        if self.table.phases.get(phase).is_none() {
            log::warn!("{} has no phase #{phase}", self.table.name);
            self.state = ExperimentState::Finished;
            return None;
        }
        self.state = ExperimentState::Running { phase, since: now };
        self.phase()
            .filter(|phase| phase.kind == PhaseKind::Record)
            .map(|_| Recording::Start)
    }
    fn iterate(&mut self, now: Duration) -> Option<Recording> {
        self.iteration += 1;
        if self.iteration >= self.table.iterations {
            self.iteration = 0;
            self.sweep += 1;
            if self.sweep >= self.table.sweep_len() {
                self.sweep = 0;
                self.passes += 1;
                log::info!("{} pass #{} completed", self.table.name, self.passes);
                if self.max_passes.is_some_and(|max| self.passes >= max) {
                    self.state = ExperimentState::Finished;
                    log::info!("{} finished", self.table.name);
                    return None;
                }
            }
        }
        log::info!("{self}");
        self.enter(0, now)
    }
}
