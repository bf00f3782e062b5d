//! Interfaces of the rig hardware and of the operator
//!
//! The loop only depends on the traits below: the camera tracker is a
//! [PositionSensor], the digital output board a [CoilDriver], the operator
//! an [InputSource] and time is given by a [FrameClock].
//!
//! [ChannelSensor] and [ChannelInput] are thread-safe adapters for producers
//! running on other threads.

use std::time::{Duration, Instant};

use ferroservo_clients_io::{ActivationMask, Point2D};

use crate::events::InputState;

/// Particle tracker
pub trait PositionSensor: Send {
    /// Particle position, `None` if the tracking is lost
    fn position(&mut self) -> Option<Point2D>;
    /// (Re)initializes the tracking, returns `false` on failure
    fn acquire(&mut self) -> bool {
        true
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to write {mask} to the coil driver: {reason}")]
    Write { mask: ActivationMask, reason: String },
    #[error("coil driver I/O error")]
    Io(#[from] std::io::Error),
    #[error("coil driver shutdown failed: {0}")]
    Shutdown(String),
}

/// Digital output driving the coils
pub trait CoilDriver: Send {
    fn write(&mut self, mask: ActivationMask) -> Result<(), DriverError>;
    /// Turns all the coils off
    fn all_off(&mut self) -> Result<(), DriverError> {
        self.write(ActivationMask::OFF)
    }
    /// Releases the hardware
    fn shutdown(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}

/// Monotonic time source
pub trait FrameClock: Send {
    /// Time elapsed since the clock origin
    fn now(&self) -> Duration;
    /// Blocks for `duration`
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Default::default()
    }
}

impl FrameClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Operator inputs
pub trait InputSource: Send {
    /// Signals asserted since the last poll
    fn poll(&mut self) -> InputState;
}

/// No operator
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self) -> InputState {
        InputState::default()
    }
}

/// Position sensor fed by a channel
///
/// The sensor returns the latest position received since the previous cycle;
/// a cycle without a new position is a tracking loss.
#[derive(Debug, Clone)]
pub struct ChannelSensor {
    rx: flume::Receiver<Point2D>,
}

impl ChannelSensor {
    /// Creates the sensor and the sender of the positions
    pub fn new() -> (flume::Sender<Point2D>, Self) {
        let (tx, rx) = flume::unbounded();
        (tx, Self { rx })
    }
}

impl PositionSensor for ChannelSensor {
    fn position(&mut self) -> Option<Point2D> {
        self.rx.try_iter().last()
    }
    fn acquire(&mut self) -> bool {
        !self.rx.is_disconnected()
    }
}

/// Input source fed by a channel
///
/// Signals stay held until a new input state is received,
/// a click is reported only once.
#[derive(Debug, Clone)]
pub struct ChannelInput {
    rx: flume::Receiver<InputState>,
    latest: InputState,
}

impl ChannelInput {
    /// Creates the input source and the sender of the input states
    pub fn new() -> (flume::Sender<InputState>, Self) {
        let (tx, rx) = flume::unbounded();
        (
            tx,
            Self {
                rx,
                latest: InputState::default(),
            },
        )
    }
}

impl InputSource for ChannelInput {
    fn poll(&mut self) -> InputState {
        match self.rx.try_iter().last() {
            Some(state) => {
                self.latest = InputState {
                    held: state.held.clone(),
                    clicked: None,
                };
                state
            }
            None => self.latest.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Signal;

    #[test]
    fn channel_sensor() {
        let (tx, mut sensor) = ChannelSensor::new();
        assert!(sensor.acquire());
        assert!(sensor.position().is_none());
        tx.send(Point2D::new(1., 2.)).unwrap();
        tx.send(Point2D::new(3., 4.)).unwrap();
        assert_eq!(sensor.position(), Some(Point2D::new(3., 4.)));
        assert!(sensor.position().is_none());
        drop(tx);
        assert!(!sensor.acquire());
    }

    #[test]
    fn channel_input() {
        let (tx, mut input) = ChannelInput::new();
        assert_eq!(input.poll(), InputState::default());
        let state = InputState::new()
            .hold(Signal::Keypad(9))
            .click(Point2D::new(400., 400.));
        std::thread::spawn(move || tx.send(state).unwrap())
            .join()
            .unwrap();
        let polled = input.poll();
        assert_eq!(polled.clicked, Some(Point2D::new(400., 400.)));
        let polled = input.poll();
        assert!(polled.clicked.is_none());
        assert!(polled.held.contains(&Signal::Keypad(9)));
    }
}
