use ferroservo_clients_io::Point2D;

use super::{Arrival, Progress, Trajectory};

/// Point-to-point trajectory
///
/// Each waypoint is held until the particle stays within tolerance
/// for `settle_cycles` consecutive cycles.
#[derive(Debug, Clone)]
pub struct PointToPoint {
    waypoints: Vec<Point2D>,
    arrival: Arrival,
    settle_cycles: usize,
    index: usize,
    settled: usize,
    repeats: usize,
}

impl PointToPoint {
    pub fn new(waypoints: Vec<Point2D>, settle_cycles: usize, arrival: Arrival) -> Self {
        Self {
            waypoints,
            arrival,
            settle_cycles,
            index: 0,
            settled: 0,
            repeats: 0,
        }
    }
    /// Number of consecutive cycles spent on the current waypoint
    pub fn settled(&self) -> usize {
        self.settled
    }
}

impl Trajectory for PointToPoint {
    fn next(&mut self, position: Point2D) -> Point2D {
        let Some(&command) = self.waypoints.get(self.index) else {
            return position;
        };
        if self.arrival.reached(&command, &position) {
            self.settled += 1;
            if self.settled >= self.settle_cycles {
                self.settled = 0;
                self.index += 1;
            }
        } else {
            self.settled = 0;
        }
        if self.index >= self.waypoints.len() {
            self.index = 0;
            self.repeats += 1;
            log::info!("iteration #{} completed", self.repeats);
        }
        command
    }
    fn reset(&mut self) {
        self.index = 0;
        self.settled = 0;
    }
    fn progress(&self) -> Progress {
        Progress {
            segment: self.index,
            sub_step: 0,
        }
    }
    fn repeats(&self) -> usize {
        self.repeats
    }
    fn arrival_mut(&mut self) -> Option<&mut Arrival> {
        Some(&mut self.arrival)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::SkipLevel;

    fn point_to_point() -> PointToPoint {
        PointToPoint::new(
            vec![Point2D::new(0., 0.), Point2D::new(50., 0.)],
            20,
            Arrival {
                tolerance: 3.,
                skip: SkipLevel::None,
            },
        )
    }

    #[test]
    fn settle_before_advancing() {
        let mut p2p = point_to_point();
        let on_target = Point2D::new(1., -1.);
        for _ in 0..19 {
            assert_eq!(p2p.next(on_target), Point2D::new(0., 0.));
        }
        assert_eq!(p2p.progress().segment, 0);
        p2p.next(on_target);
        assert_eq!(p2p.progress().segment, 1);
        assert_eq!(p2p.next(on_target), Point2D::new(50., 0.));
    }

    #[test]
    fn noise_restarts_the_count() {
        let mut p2p = point_to_point();
        for _ in 0..15 {
            p2p.next(Point2D::default());
        }
        assert_eq!(p2p.settled(), 15);
        p2p.next(Point2D::new(10., 0.));
        assert_eq!(p2p.settled(), 0);
        for _ in 0..19 {
            p2p.next(Point2D::default());
        }
        assert_eq!(p2p.progress().segment, 0);
    }

    #[test]
    fn wrap_around() {
        let mut p2p = point_to_point();
        for target in [Point2D::new(0., 0.), Point2D::new(50., 0.)] {
            for _ in 0..20 {
                p2p.next(target);
            }
        }
        assert_eq!(p2p.repeats(), 1);
        assert_eq!(p2p.progress(), Progress::default());
        p2p.next(Point2D::default());
        p2p.reset();
        assert_eq!(p2p.settled(), 0);
    }
}
