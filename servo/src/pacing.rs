//! Frame pacing
//!
//! The loop runs at a fixed frame rate: after the compute phase of a cycle the
//! [FramePacer] sleeps for the remainder of the frame period.
//! A compute phase longer than the period is an overrun, it is reported and
//! the next cycle starts right away.

use std::{fmt, time::Duration};

use humantime::format_duration;

use crate::collaborators::FrameClock;

/// Timing of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Compute phase duration
    pub compute: Duration,
    /// Sleep padding the frame to its period
    pub pad: Duration,
    pub overrun: bool,
}

impl FrameReport {
    /// Achieved frame rate
    pub fn fps(&self) -> f64 {
        let frame = self.compute + self.pad;
        if frame.is_zero() {
            f64::INFINITY
        } else {
            frame.as_secs_f64().recip()
        }
    }
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "compute: {}, pad: {} ({:.1}fps)",
            format_duration(self.compute),
            format_duration(self.pad),
            self.fps()
        )
    }
}

/// Fixed period frame pacer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePacer {
    period: Duration,
}

impl FramePacer {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }
    pub fn from_fps(fps: f64) -> Self {
        Self::new(Duration::from_secs_f64(fps.recip()))
    }
    pub fn period(&self) -> Duration {
        self.period
    }
    /// Timing of a frame with a compute phase of duration `compute`
    pub fn report(&self, compute: Duration) -> FrameReport {
        FrameReport {
            compute,
            pad: self.period.saturating_sub(compute),
            overrun: compute > self.period,
        }
    }
    /// Sleeps until the end of the frame that started at `start`
    pub fn pace(&self, clock: &mut dyn FrameClock, start: Duration) -> FrameReport {
        let report = self.report(clock.now().saturating_sub(start));
        if report.overrun {
            log::warn!(
                "frame overrun: {} > {} ({:.1}fps)",
                format_duration(report.compute),
                format_duration(self.period),
                report.fps()
            );
        } else {
            clock.sleep(report.pad);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Steps {
        now: Duration,
        slept: Vec<Duration>,
    }
    impl FrameClock for Steps {
        fn now(&self) -> Duration {
            self.now
        }
        fn sleep(&mut self, duration: Duration) {
            self.now += duration;
            self.slept.push(duration);
        }
    }

    #[test]
    fn pad() {
        let pacer = FramePacer::new(Duration::from_millis(100));
        let mut clock = Steps {
            now: Duration::from_millis(1030),
            slept: vec![],
        };
        let report = pacer.pace(&mut clock, Duration::from_secs(1));
        assert!(!report.overrun);
        assert!(report.pad >= Duration::from_millis(65));
        assert_eq!(clock.slept, vec![report.pad]);
        assert_eq!(clock.now, Duration::from_millis(1100));
        assert!((report.fps() - 10.).abs() < 1e-9);
    }

    #[test]
    fn overrun() {
        let pacer = FramePacer::new(Duration::from_millis(100));
        let mut clock = Steps {
            now: Duration::from_millis(150),
            slept: vec![],
        };
        let report = pacer.pace(&mut clock, Duration::ZERO);
        assert!(report.overrun);
        assert_eq!(report.pad, Duration::ZERO);
        assert!(clock.slept.is_empty());
        assert!(report.fps() < 10.);
    }

    #[test]
    fn frame_rate() {
        let period = FramePacer::from_fps(10.).period();
        assert!((period.as_secs_f64() - 0.1).abs() < 1e-9);
    }
}
