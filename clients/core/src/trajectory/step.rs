use std::fmt;

use ferroservo_clients_io::Point2D;
use serde::{Deserialize, Serialize};

use super::{Progress, Trajectory};

/// Step axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Axis {
    #[default]
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
        }
    }
}

/// Step response trajectory
///
/// Holds the particle position at the first call after a reset,
/// each [trigger](StepTrajectory::trigger) moves the held position by `increment` along the selected axis.
#[derive(Debug, Clone)]
pub struct StepTrajectory {
    increment: f64,
    axis: Axis,
    held: Option<Point2D>,
    steps: usize,
}

impl StepTrajectory {
    pub fn new(increment: f64) -> Self {
        Self {
            increment,
            axis: Axis::default(),
            held: None,
            steps: 0,
        }
    }
    pub fn axis(&self) -> Axis {
        self.axis
    }
    /// Switches the step axis
    pub fn toggle_axis(&mut self) -> Axis {
        self.axis = match self.axis {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        };
        log::info!("step along {}", self.axis);
        self.axis
    }
    /// Applies a step to the held position
    pub fn trigger(&mut self) -> Option<Point2D> {
        let held = self.held.as_mut()?;
        match self.axis {
            Axis::X => held.u += self.increment,
            Axis::Y => held.v += self.increment,
        }
        self.steps += 1;
        log::info!("step #{} to {}", self.steps, held);
        Some(*held)
    }
    pub fn held(&self) -> Option<Point2D> {
        self.held
    }
}

impl Trajectory for StepTrajectory {
    fn next(&mut self, position: Point2D) -> Point2D {
        *self.held.get_or_insert(position)
    }
    fn reset(&mut self) {
        self.held = None;
        self.steps = 0;
    }
    fn progress(&self) -> Progress {
        Progress {
            segment: self.steps,
            sub_step: 0,
        }
    }
    fn repeats(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps() {
        let mut step = StepTrajectory::new(50.);
        assert!(step.trigger().is_none());
        let start = Point2D::new(470., 532.);
        assert_eq!(step.next(start), start);
        assert_eq!(step.next(Point2D::new(0., 0.)), start);
        assert_eq!(step.trigger(), Some(Point2D::new(520., 532.)));
        assert_eq!(step.toggle_axis(), Axis::Y);
        step.trigger();
        assert_eq!(step.next(start), Point2D::new(520., 582.));
        step.reset();
        assert_eq!(step.progress(), Progress::default());
        assert_eq!(step.next(start), start);
    }
}
