//! # Simulated rig
//!
//! Collaborators of the servo loop backed by the simulated [Particle]:
//! the [SimSensor] returns the particle position and the [SimDriver]
//! actuates the particle and moves it by one time step.
//! Time is given by a [ManualClock] and the operator by [ScriptedInput].

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use ferroservo_clients::Particle;
use ferroservo_clients_io::{ActivationMask, CoilActivation, ParticlePosition, Point2D};
use ferroservo_servo::{
    CoilDriver, DriverError, FrameClock, InputSource, InputState, PositionSensor,
};
use interface::{Data, Read, Update, Write};

/// Simulated particle shared by the sensor and the driver
#[derive(Debug, Clone)]
pub struct SimRig {
    particle: Arc<Mutex<Particle>>,
    writes: Arc<Mutex<Vec<ActivationMask>>>,
}

impl SimRig {
    pub fn new(particle: Particle) -> Self {
        Self {
            particle: Arc::new(Mutex::new(particle)),
            writes: Default::default(),
        }
    }
    fn lock(&self) -> Option<MutexGuard<'_, Particle>> {
        self.particle.lock().ok()
    }
    /// Particle position
    pub fn position(&self) -> Option<Point2D> {
        self.lock().map(|particle| particle.position())
    }
    /// Activation masks written to the driver
    pub fn writes(&self) -> Vec<ActivationMask> {
        self.writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }
    /// Particle tracker
    pub fn sensor(&self) -> SimSensor {
        SimSensor {
            rig: self.clone(),
            cycle: 0,
            dropouts: BTreeSet::new(),
        }
    }
    /// Coil driver
    pub fn driver(&self) -> SimDriver {
        SimDriver {
            rig: self.clone(),
            fail_after: None,
        }
    }
}

/// Simulated particle tracker
#[derive(Debug, Clone)]
pub struct SimSensor {
    rig: SimRig,
    cycle: usize,
    dropouts: BTreeSet<usize>,
}

impl SimSensor {
    /// Loses the particle at the given cycles
    pub fn dropouts<I: IntoIterator<Item = usize>>(mut self, cycles: I) -> Self {
        self.dropouts.extend(cycles);
        self
    }
}

impl PositionSensor for SimSensor {
    fn position(&mut self) -> Option<Point2D> {
        let cycle = self.cycle;
        self.cycle += 1;
        if self.dropouts.contains(&cycle) {
            return None;
        }
        let mut particle = self.rig.lock()?;
        <Particle as Write<ParticlePosition>>::write(&mut particle).map(|data| data.get())
    }
}

/// Simulated coil driver
///
/// Each write moves the particle by one time step.
#[derive(Debug, Clone)]
pub struct SimDriver {
    rig: SimRig,
    fail_after: Option<usize>,
}

impl SimDriver {
    /// Fails to write any coil pattern after `writes` successful writes
    pub fn fail_after(mut self, writes: usize) -> Self {
        self.fail_after = Some(writes);
        self
    }
}

impl CoilDriver for SimDriver {
    fn write(&mut self, mask: ActivationMask) -> Result<(), DriverError> {
        let mut writes = self.rig.writes.lock().map_err(|e| DriverError::Write {
            mask,
            reason: e.to_string(),
        })?;
        if !mask.is_off() && self.fail_after.is_some_and(|n| writes.len() >= n) {
            return Err(DriverError::Write {
                mask,
                reason: "simulated output fault".into(),
            });
        }
        let mut particle = self.rig.lock().ok_or_else(|| DriverError::Write {
            mask,
            reason: "particle lock poisoned".into(),
        })?;
        <Particle as Read<CoilActivation>>::read(&mut particle, Data::new(mask));
        particle.update();
        writes.push(mask);
        Ok(())
    }
}

/// Clock advanced by the frame pacer sleeps
///
/// Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<Mutex<Duration>>);

impl ManualClock {
    pub fn new() -> Self {
        Default::default()
    }
    /// Moves the clock forward
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut now) = self.0.lock() {
            *now += duration;
        }
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> Duration {
        self.0.lock().map(|now| *now).unwrap_or_default()
    }
    fn sleep(&mut self, duration: Duration) {
        self.advance(duration);
    }
}

/// Operator inputs scheduled per cycle
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: BTreeMap<usize, InputState>,
    cycle: usize,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Default::default()
    }
    /// Asserts `state` at `cycle`
    pub fn at(mut self, cycle: usize, state: InputState) -> Self {
        self.script.insert(cycle, state);
        self
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputState {
        let state = self.script.remove(&self.cycle).unwrap_or_default();
        self.cycle += 1;
        state
    }
}
