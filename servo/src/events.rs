//! Input events
//!
//! The input source reports the signals asserted during the cycle.
//! The [EdgeDetector] turns them into events that fire once per press,
//! the keypad keys are reported for as long as they are held.

use std::collections::BTreeSet;

use ferroservo_clients_io::Point2D;

/// Operator signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Signal {
    /// Manual/automatic mode switch
    ModeToggle,
    Quit,
    TrajectoryToggle,
    PointToPointToggle,
    StepToggle,
    /// Switches the step axis between X and Y
    StepAxisToggle,
    /// Applies a step
    StepTrigger,
    OneCoilToggle,
    /// Starts or stops the experiment
    OpenLoopToggle,
    RecordingToggle,
    /// Cycles through the skip levels
    SkipLevel,
    ShapeChange,
    StepSizeChange,
    TuningPrint,
    TuningSelect,
    TuningIncrement,
    TuningDecrement,
    /// Enables or disables all the other signals
    KeyboardToggle,
    /// Numeric keypad key `1..=9`
    Keypad(u8),
}

/// Signals asserted during a cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    pub held: BTreeSet<Signal>,
    /// Target clicked on the image
    pub clicked: Option<Point2D>,
}

impl InputState {
    pub fn new() -> Self {
        Default::default()
    }
    /// Adds a held signal
    pub fn hold(mut self, signal: Signal) -> Self {
        self.held.insert(signal);
        self
    }
    pub fn click(mut self, target: Point2D) -> Self {
        self.clicked = Some(target);
        self
    }
}

impl FromIterator<Signal> for InputState {
    fn from_iter<T: IntoIterator<Item = Signal>>(iter: T) -> Self {
        Self {
            held: iter.into_iter().collect(),
            clicked: None,
        }
    }
}

/// Events of a cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Events {
    /// Signals that fired, in [Signal] order
    pub fired: Vec<Signal>,
    /// Held keypad keys
    pub keypad: Vec<u8>,
    pub clicked: Option<Point2D>,
}

impl Events {
    pub fn contains(&self, signal: Signal) -> bool {
        self.fired.contains(&signal)
    }
}

/// Rising edge detector
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    previous: BTreeSet<Signal>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Default::default()
    }
    /// Events of the signals asserted at this cycle
    pub fn detect(&mut self, state: &InputState) -> Events {
        let mut events = Events {
            clicked: state.clicked,
            ..Default::default()
        };
        for signal in &state.held {
            match signal {
                Signal::Keypad(key) => events.keypad.push(*key),
                signal if !self.previous.contains(signal) => events.fired.push(*signal),
                _ => (),
            }
        }
        self.previous = state.held.clone();
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_once_per_press() {
        let mut edges = EdgeDetector::new();
        let pressed = InputState::new().hold(Signal::ModeToggle);
        assert_eq!(edges.detect(&pressed).fired, vec![Signal::ModeToggle]);
        assert!(edges.detect(&pressed).fired.is_empty());
        assert!(edges.detect(&InputState::new()).fired.is_empty());
        assert_eq!(edges.detect(&pressed).fired, vec![Signal::ModeToggle]);
    }

    #[test]
    fn tuning_steps_once_per_press() {
        let mut edges = EdgeDetector::new();
        let held: InputState = [Signal::TuningIncrement, Signal::TuningSelect]
            .into_iter()
            .collect();
        assert_eq!(
            edges.detect(&held).fired,
            vec![Signal::TuningSelect, Signal::TuningIncrement]
        );
        assert!(edges.detect(&held).fired.is_empty());
        let decrement = InputState::new().hold(Signal::TuningDecrement);
        assert_eq!(edges.detect(&decrement).fired, vec![Signal::TuningDecrement]);
        assert!(edges.detect(&decrement).fired.is_empty());
        assert_eq!(
            edges.detect(&held).fired,
            vec![Signal::TuningSelect, Signal::TuningIncrement]
        );
    }

    #[test]
    fn keypad_is_level_triggered() {
        let mut edges = EdgeDetector::new();
        let held: InputState = [Signal::Keypad(9), Signal::Keypad(1)].into_iter().collect();
        for _ in 0..3 {
            let events = edges.detect(&held);
            assert_eq!(events.keypad, vec![1, 9]);
            assert!(events.fired.is_empty());
        }
    }

    #[test]
    fn clicks() {
        let mut edges = EdgeDetector::new();
        let events = edges.detect(&InputState::new().click(Point2D::new(400., 500.)));
        assert_eq!(events.clicked, Some(Point2D::new(400., 500.)));
    }
}
