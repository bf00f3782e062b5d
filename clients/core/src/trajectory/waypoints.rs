use ferroservo_clients_io::{linspace_points, Point2D};

use super::{Arrival, Progress, Trajectory};

/// Piecewise linear trajectory
///
/// The first waypoint is commanded until the particle reaches it.
/// Each following segment is interpolated into `max(2, ⌊length / stepsize⌋)`
/// points commanded one after the other as the particle reaches them.
#[derive(Debug, Clone)]
pub struct WaypointTrajectory {
    waypoints: Vec<Point2D>,
    stepsize: f64,
    arrival: Arrival,
    segment: usize,
    sub_step: usize,
    repeats: usize,
}

impl WaypointTrajectory {
    pub fn new(waypoints: Vec<Point2D>, stepsize: f64, arrival: Arrival) -> Self {
        Self {
            waypoints,
            stepsize,
            arrival,
            segment: 0,
            sub_step: 0,
            repeats: 0,
        }
    }
    pub fn waypoints(&self) -> &[Point2D] {
        &self.waypoints
    }
    /// Number of interpolated points of a segment of length `length`
    pub fn steps(&self, length: f64) -> usize {
        if self.stepsize > 0f64 && length.is_finite() {
            ((length / self.stepsize) as usize).max(2)
        } else {
            2
        }
    }
    /// Interpolated points of segment `k` from waypoint `k-1` to waypoint `k`
    pub fn segment(&self, k: usize) -> Vec<Point2D> {
        match (self.waypoints.get(k.wrapping_sub(1)), self.waypoints.get(k)) {
            (Some(&start), Some(&end)) => linspace_points(start, end, self.steps(start.distance(&end))),
            _ => Vec::new(),
        }
    }
}

impl Trajectory for WaypointTrajectory {
    fn next(&mut self, position: Point2D) -> Point2D {
        let Some(&first) = self.waypoints.first() else {
            return position;
        };
        let mut command = first;
        if self.segment == 0 && self.arrival.reached(&first, &position) {
            self.segment = 1;
        }
        if self.segment > 0 && self.segment < self.waypoints.len() {
            let points = self.segment(self.segment);
            // the step size may have changed since the last cycle
            self.sub_step = self.sub_step.min(points.len() - 1);
            command = points[self.sub_step];
            self.sub_step += self.arrival.advance(&points[self.sub_step..], &position);
            if self.sub_step >= points.len() {
                self.sub_step = 0;
                self.segment += 1;
            }
        }
        if self.segment >= self.waypoints.len() {
            self.segment = 0;
            self.repeats += 1;
            log::info!("iteration #{} completed", self.repeats);
        }
        command
    }
    fn reset(&mut self) {
        self.segment = 0;
        self.sub_step = 0;
    }
    fn progress(&self) -> Progress {
        Progress {
            segment: self.segment,
            sub_step: self.sub_step,
        }
    }
    fn repeats(&self) -> usize {
        self.repeats
    }
    fn arrival_mut(&mut self) -> Option<&mut Arrival> {
        Some(&mut self.arrival)
    }
    fn set_stepsize(&mut self, stepsize: f64) {
        self.stepsize = stepsize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::SkipLevel;

    fn arrival(skip: SkipLevel) -> Arrival {
        Arrival {
            tolerance: 3.,
            skip,
        }
    }

    #[test]
    fn two_points() {
        let mut trajectory = WaypointTrajectory::new(
            vec![Point2D::new(0., 0.), Point2D::new(10., 0.)],
            5.,
            arrival(SkipLevel::None),
        );
        assert_eq!(
            trajectory.segment(1),
            vec![Point2D::new(0., 0.), Point2D::new(10., 0.)]
        );
        let far = Point2D::new(-20., 0.);
        assert_eq!(trajectory.next(far), Point2D::new(0., 0.));
        assert_eq!(trajectory.progress(), Progress::default());
        // on the first waypoint, the first interpolated point is reached as well
        assert_eq!(trajectory.next(Point2D::new(0.5, 0.)), Point2D::new(0., 0.));
        assert_eq!(
            trajectory.progress(),
            Progress {
                segment: 1,
                sub_step: 1
            }
        );
        assert_eq!(trajectory.next(Point2D::new(0.5, 0.)), Point2D::new(10., 0.));
        assert_eq!(trajectory.repeats(), 0);
        assert_eq!(trajectory.next(Point2D::new(9., 1.)), Point2D::new(10., 0.));
        assert_eq!(trajectory.repeats(), 1);
        assert_eq!(trajectory.progress(), Progress::default());
    }

    #[test]
    fn interpolation() {
        let trajectory = WaypointTrajectory::new(
            vec![Point2D::new(0., 0.), Point2D::new(0., 60.), Point2D::new(0., 61.)],
            6.,
            arrival(SkipLevel::None),
        );
        let segment = trajectory.segment(1);
        assert_eq!(segment.len(), 10);
        assert_eq!(segment.last(), Some(&Point2D::new(0., 60.)));
        // short segments still command their end point
        assert_eq!(
            trajectory.segment(2),
            vec![Point2D::new(0., 60.), Point2D::new(0., 61.)]
        );
        assert!(trajectory.segment(0).is_empty());
        assert!(trajectory.segment(3).is_empty());
    }

    #[test]
    fn skip() {
        let waypoints = vec![Point2D::new(0., 0.), Point2D::new(40., 0.)];
        for (u, skip, sub_step) in [
            (20., SkipLevel::None, 1),
            (20., SkipLevel::One, 3),
            (30., SkipLevel::One, 1),
            (30., SkipLevel::Two, 4),
        ] {
            // segment interpolated at 0, 10, 20, 30 and 40
            let mut trajectory = WaypointTrajectory::new(waypoints.clone(), 8., arrival(skip));
            trajectory.next(Point2D::new(0., 0.));
            assert_eq!(trajectory.progress().sub_step, 1);
            trajectory.next(Point2D::new(u, 0.));
            assert_eq!(trajectory.progress().sub_step, sub_step, "{skip:?} at {u}");
        }
    }

    #[test]
    fn reset() {
        let mut trajectory = WaypointTrajectory::new(
            vec![Point2D::new(0., 0.), Point2D::new(100., 0.), Point2D::new(100., 100.)],
            6.,
            arrival(SkipLevel::Two),
        );
        let mut position = Point2D::new(0., 0.);
        for _ in 0..10 {
            position = trajectory.next(position);
        }
        assert_ne!(trajectory.progress(), Progress::default());
        trajectory.reset();
        assert_eq!(trajectory.progress(), Progress::default());
    }

    #[test]
    fn stepsize_change_clamps_the_sub_step() {
        let mut trajectory = WaypointTrajectory::new(
            vec![Point2D::new(0., 0.), Point2D::new(100., 0.)],
            5.,
            arrival(SkipLevel::None),
        );
        let mut position = Point2D::new(0., 0.);
        for _ in 0..8 {
            position = trajectory.next(position);
        }
        assert!(trajectory.progress().sub_step > 2);
        trajectory.set_stepsize(55.);
        assert_eq!(trajectory.next(Point2D::new(-50., 0.)), Point2D::new(100., 0.));
    }
}
