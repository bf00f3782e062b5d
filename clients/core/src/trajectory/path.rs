use std::f64::consts::PI;

use ferroservo_clients_io::{linspace, Point2D};

use super::{Arrival, Progress, Trajectory};

/// Trajectory through precomputed points
///
/// Used for the [circle](SampledPath::circle) and the [spiral](SampledPath::spiral)
#[derive(Debug, Clone)]
pub struct SampledPath {
    points: Vec<Point2D>,
    arrival: Arrival,
    index: usize,
    repeats: usize,
}

impl SampledPath {
    pub fn new(points: Vec<Point2D>, arrival: Arrival) -> Self {
        Self {
            points,
            arrival,
            index: 0,
            repeats: 0,
        }
    }
    /// Circle of radius `radius` around `centre` sampled at `n` equal angles over `[0,2π]`
    ///
    /// `u = cx + r sin θ`, `v = cy + r cos θ`
    pub fn circle(centre: Point2D, radius: f64, n: usize, arrival: Arrival) -> Self {
        let points = linspace(0f64, 2. * PI, n)
            .into_iter()
            .map(|theta| centre + Point2D::new(theta.sin(), theta.cos()) * radius)
            .collect();
        Self::new(points, arrival)
    }
    /// Archimedean spiral `ρ = a + b θ / 2π` from `ρ = a` to `ρ = outer_radius` sampled at `n` angles
    ///
    /// `u = cx + ρ cos θ`, `v = cy + ρ sin θ`
    pub fn spiral(
        centre: Point2D,
        a: f64,
        b: f64,
        outer_radius: f64,
        n: usize,
        arrival: Arrival,
    ) -> Self {
        let revolutions = (outer_radius - a) / b;
        let points = linspace(0f64, 2. * PI * revolutions, n)
            .into_iter()
            .map(|theta| {
                let rho = a + b * theta / (2. * PI);
                centre + Point2D::new(theta.cos(), theta.sin()) * rho
            })
            .collect();
        Self::new(points, arrival)
    }
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }
}

impl Trajectory for SampledPath {
    fn next(&mut self, position: Point2D) -> Point2D {
        let Some(&first) = self.points.first() else {
            return position;
        };
        let mut command = first;
        if self.index == 0 && self.arrival.reached(&first, &position) {
            self.index = 1;
        }
        if self.index > 0 && self.index < self.points.len() {
            command = self.points[self.index];
            self.index += self
                .arrival
                .advance(&self.points[self.index..], &position);
        }
        if self.index >= self.points.len() {
            self.index = 0;
            self.repeats += 1;
            log::info!("iteration #{} completed", self.repeats);
        }
        command
    }
    fn reset(&mut self) {
        self.index = 0;
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
