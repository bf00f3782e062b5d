//! Control state
//!
//! Operating flags of the servo loop. Target sources are mutually exclusive,
//! an experiment overrides the target source while it runs.

use std::fmt;

/// Coil commands origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    /// Coils driven from the keypad
    #[default]
    Manual,
    /// Coils selected by the optimizer
    Automatic,
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMode::Manual => write!(f, "manual"),
            ControlMode::Automatic => write!(f, "automatic"),
        }
    }
}

/// Origin of the automatic mode target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetSource {
    /// Last clicked position
    #[default]
    Click,
    Trajectory,
    PointToPoint,
    Step,
}

impl fmt::Display for TargetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSource::Click => write!(f, "click"),
            TargetSource::Trajectory => write!(f, "trajectory"),
            TargetSource::PointToPoint => write!(f, "point-to-point"),
            TargetSource::Step => write!(f, "step"),
        }
    }
}

/// Active target generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Experiment,
    Source(TargetSource),
}

/// Servo loop flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    pub mode: ControlMode,
    source: TargetSource,
    /// Fixed single coil override
    pub one_coil: bool,
    /// Experiment running
    pub open_loop: bool,
    pub recording: bool,
    /// Operator signals accepted
    pub keyboard_enabled: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            mode: ControlMode::Manual,
            source: TargetSource::Click,
            one_coil: false,
            open_loop: false,
            recording: false,
            keyboard_enabled: true,
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mode, target: {}", self.mode, self.source)?;
        for (flag, name) in [
            (self.one_coil, "one coil"),
            (self.open_loop, "open loop"),
            (self.recording, "recording"),
        ] {
            if flag {
                write!(f, ", {name}")?;
            }
        }
        if !self.keyboard_enabled {
            write!(f, ", keyboard disabled")?;
        }
        Ok(())
    }
}

impl ControlState {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn source(&self) -> TargetSource {
        self.source
    }
    pub fn is_active(&self, source: TargetSource) -> bool {
        self.source == source
    }
    /// Switches `source` on, or back to [TargetSource::Click] if it is already on
    ///
    /// Returns `true` if `source` is now active
    pub fn toggle(&mut self, source: TargetSource) -> bool {
        self.source = if self.source == source {
            TargetSource::Click
        } else {
            source
        };
        self.source == source && source != TargetSource::Click
    }
    /// Generator of the automatic mode target
    pub fn command(&self) -> Command {
        if self.open_loop {
            Command::Experiment
        } else {
            Command::Source(self.source)
        }
    }
    /// Falls back to the clicked target, stopping the recording and the overrides
    pub fn stop_operations(&mut self) {
        self.source = TargetSource::Click;
        self.one_coil = false;
        self.recording = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_sources() {
        let mut state = ControlState::new();
        assert!(state.toggle(TargetSource::Trajectory));
        assert!(state.toggle(TargetSource::Step));
        assert!(!state.is_active(TargetSource::Trajectory));
        assert!(!state.toggle(TargetSource::Step));
        assert_eq!(state.source(), TargetSource::Click);
    }

    #[test]
    fn experiment_first() {
        let mut state = ControlState::new();
        state.toggle(TargetSource::PointToPoint);
        assert_eq!(
            state.command(),
            Command::Source(TargetSource::PointToPoint)
        );
        state.open_loop = true;
        assert_eq!(state.command(), Command::Experiment);
    }

    #[test]
    fn stop() {
        let mut state = ControlState::new();
        state.toggle(TargetSource::Trajectory);
        state.one_coil = true;
        state.recording = true;
        state.open_loop = true;
        state.stop_operations();
        assert_eq!(state.source(), TargetSource::Click);
        assert!(!state.one_coil && !state.recording);
        assert!(state.open_loop);
    }
}
