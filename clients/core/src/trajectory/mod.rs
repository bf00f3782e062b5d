/*!
# Trajectory generators

Stateful generators of the commanded particle position.
A generator is called once per control cycle with the measured particle
position and returns the position to command; it advances along its
waypoints as the particle reaches them.

A waypoint is reached when both image axis errors are below the position
error tolerance.
With a [SkipLevel] other than [SkipLevel::None], the generator may also jump
one or two points ahead if the particle is already within tolerance of them.

[Trajectories] is the client that draws the operator selected [Shape].
*/

use std::fmt;

use ferroservo_clients_io::{ParticlePosition, Point2D, TargetPosition};
use interface::{Data, Read, Update, Write};
use serde::{Deserialize, Serialize};

mod path;
mod point_to_point;
mod shapes;
mod step;
mod waypoints;

pub use path::SampledPath;
pub use point_to_point::PointToPoint;
pub use shapes::{Shape, ShapeLayout};
pub use step::{Axis, StepTrajectory};
pub use waypoints::WaypointTrajectory;

/// Progress of a generator along its trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Index of the current waypoint or segment
    pub segment: usize,
    /// Index of the interpolated point within the segment
    pub sub_step: usize,
}

/// Trajectory generator interface
pub trait Trajectory: Send + Sync {
    /// Returns the commanded position given the measured `position`
    fn next(&mut self, position: Point2D) -> Point2D;
    /// Rewinds the generator to its first waypoint
    fn reset(&mut self);
    fn progress(&self) -> Progress;
    /// Number of completed passes
    fn repeats(&self) -> usize;
    /// Arrival criteria, if the generator has any
    fn arrival_mut(&mut self) -> Option<&mut Arrival> {
        None
    }
    fn set_stepsize(&mut self, _stepsize: f64) {}
}

/// Number of points a generator may skip ahead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipLevel {
    #[default]
    None,
    One,
    Two,
}

impl SkipLevel {
    pub fn level(&self) -> usize {
        match self {
            SkipLevel::None => 0,
            SkipLevel::One => 1,
            SkipLevel::Two => 2,
        }
    }
    /// Next skip level, wrapping around
    pub fn next(self) -> Self {
        match self {
            SkipLevel::None => SkipLevel::One,
            SkipLevel::One => SkipLevel::Two,
            SkipLevel::Two => SkipLevel::None,
        }
    }
}

impl fmt::Display for SkipLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skip level {}", self.level())
    }
}

/// Waypoint arrival criteria
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arrival {
    /// Position error tolerance `[px]`
    pub tolerance: f64,
    pub skip: SkipLevel,
}

impl Default for Arrival {
    fn default() -> Self {
        Self {
            tolerance: 3.,
            skip: SkipLevel::None,
        }
    }
}

impl Arrival {
    pub fn new(tolerance: f64, skip: SkipLevel) -> Self {
        Self { tolerance, skip }
    }
    /// Checks if `position` is within tolerance of `target`
    pub fn reached(&self, target: &Point2D, position: &Point2D) -> bool {
        target.within(position, self.tolerance)
    }
    /// Number of points to advance by, `points[0]` being the current one
    ///
    /// The points ahead are tested in order up to the skip level,
    /// the first reached point `points[k]` advances by `k+1`.
    pub fn advance(&self, points: &[Point2D], position: &Point2D) -> usize {
        let n = (self.skip.level() + 1).min(points.len());
        points[..n]
            .iter()
            .position(|point| self.reached(point, position))
            .map_or(0, |k| {
                if k > 0 {
                    log::debug!("skipped {k}");
                }
                k + 1
            })
    }
}

/// Circle trajectory settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleConfig {
    pub radius: f64,
    pub samples: usize,
}

impl Default for CircleConfig {
    fn default() -> Self {
        Self {
            radius: 93.,
            samples: 94,
        }
    }
}

/// Spiral trajectory settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralConfig {
    pub inner_radius: f64,
    /// Radius increment per revolution `[px]`
    pub pitch: f64,
    pub outer_radius: f64,
    pub samples: usize,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            inner_radius: 5.,
            pitch: 30.,
            outer_radius: 185.,
            samples: 200,
        }
    }
}

/// Trajectory generators settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    pub shape: Shape,
    pub layout: ShapeLayout,
    pub arrival: Arrival,
    /// Distance between interpolated points `[px]`
    pub stepsize: f64,
    pub circle: CircleConfig,
    pub spiral: SpiralConfig,
    /// Point-to-point consecutive cycles on target
    pub settle_cycles: usize,
    /// Step trajectory increment `[px]`
    pub step_increment: f64,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            shape: Shape::default(),
            layout: ShapeLayout::default(),
            arrival: Arrival::default(),
            stepsize: 6.,
            circle: CircleConfig::default(),
            spiral: SpiralConfig::default(),
            settle_cycles: 20,
            step_increment: 50.,
        }
    }
}

impl TrajectoryConfig {
    /// Builds the generator of a shape
    pub fn build(&self, shape: Shape) -> Box<dyn Trajectory> {
        let centre = self.layout.centre;
        match self.layout.waypoints(shape) {
            Some(waypoints) => Box::new(WaypointTrajectory::new(
                waypoints,
                self.stepsize,
                self.arrival,
            )),
            None if shape == Shape::Circle => Box::new(SampledPath::circle(
                centre,
                self.circle.radius,
                self.circle.samples,
                self.arrival,
            )),
            None => Box::new(SampledPath::spiral(
                centre,
                self.spiral.inner_radius,
                self.spiral.pitch,
                self.spiral.outer_radius,
                self.spiral.samples,
                self.arrival,
            )),
        }
    }
    /// Builds the point-to-point generator of a shape
    pub fn point_to_point(&self, shape: Shape) -> PointToPoint {
        PointToPoint::new(
            self.layout.point_to_point(shape),
            self.settle_cycles,
            self.arrival,
        )
    }
    pub fn step(&self) -> StepTrajectory {
        StepTrajectory::new(self.step_increment)
    }
}

/// Shape drawing client
///
/// Reads [ParticlePosition] and writes [TargetPosition]
pub struct Trajectories {
    config: TrajectoryConfig,
    shape: Shape,
    generator: Box<dyn Trajectory>,
    position: Point2D,
    target: Option<Point2D>,
}

impl Default for Trajectories {
    fn default() -> Self {
        Self::new(TrajectoryConfig::default())
    }
}

impl fmt::Display for Trajectories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Progress { segment, sub_step } = self.generator.progress();
        write!(
            f,
            "{} ({}, stepsize: {}px): segment #{segment}, step #{sub_step}, {} repeats",
            self.shape,
            self.config.arrival.skip,
            self.config.stepsize,
            self.generator.repeats()
        )
    }
}

impl Trajectories {
    pub fn new(config: TrajectoryConfig) -> Self {
        let shape = config.shape;
        Self {
            generator: config.build(shape),
            config,
            shape,
            position: Point2D::default(),
            target: None,
        }
    }
    pub fn config(&self) -> &TrajectoryConfig {
        &self.config
    }
    pub fn shape(&self) -> Shape {
        self.shape
    }
    /// Draws a new shape from its first waypoint
    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        self.config.shape = shape;
        self.restart();
        log::info!("trajectory: {shape}");
    }
    /// Selects the next shape
    pub fn next_shape(&mut self) -> Shape {
        self.set_shape(self.shape.next());
        self.shape
    }
    /// Rebuilds the generator, clearing the repeat counter
    pub fn restart(&mut self) {
        self.generator = self.config.build(self.shape);
    }
    pub fn skip(&self) -> SkipLevel {
        self.config.arrival.skip
    }
    pub fn set_skip(&mut self, skip: SkipLevel) {
        self.config.arrival.skip = skip;
        if let Some(arrival) = self.generator.arrival_mut() {
            arrival.skip = skip;
        }
        log::info!("{skip}");
    }
    pub fn stepsize(&self) -> f64 {
        self.config.stepsize
    }
    pub fn set_stepsize(&mut self, stepsize: f64) {
        self.config.stepsize = stepsize;
        self.generator.set_stepsize(stepsize);
    }
    /// Point-to-point generator of the current shape
    pub fn point_to_point(&self) -> PointToPoint {
        self.config.point_to_point(self.shape)
    }
    pub fn step(&self) -> StepTrajectory {
        self.config.step()
    }
}

impl Trajectory for Trajectories {
    fn next(&mut self, position: Point2D) -> Point2D {
        self.generator.next(position)
    }
    fn reset(&mut self) {
        self.generator.reset();
    }
    fn progress(&self) -> Progress {
        self.generator.progress()
    }
    fn repeats(&self) -> usize {
        self.generator.repeats()
    }
    fn arrival_mut(&mut self) -> Option<&mut Arrival> {
        self.generator.arrival_mut()
    }
    fn set_stepsize(&mut self, stepsize: f64) {
        Trajectories::set_stepsize(self, stepsize);
    }
}

impl Update for Trajectories {
    fn update(&mut self) {
        self.target = Some(self.generator.next(self.position));
    }
}

impl Read<ParticlePosition> for Trajectories {
    fn read(&mut self, data: Data<ParticlePosition>) {
        self.position = data.get();
    }
}

impl Write<TargetPosition> for Trajectories {
    fn write(&mut self) -> Option<Data<TargetPosition>> {
        self.target.take().map(Data::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance() {
        let points = [
            Point2D::new(0., 0.),
            Point2D::new(10., 0.),
            Point2D::new(20., 0.),
        ];
        let arrival = Arrival::new(3., SkipLevel::Two);
        assert_eq!(arrival.advance(&points, &Point2D::new(1., 1.)), 1);
        assert_eq!(arrival.advance(&points, &Point2D::new(19., 1.)), 3);
        assert_eq!(arrival.advance(&points[2..], &Point2D::new(10., 0.)), 0);
        assert_eq!(arrival.advance(&[], &Point2D::new(10., 0.)), 0);
        // both axis errors must be below tolerance
        assert_eq!(arrival.advance(&points, &Point2D::new(2.9, 3.)), 0);
    }

    #[test]
    fn restart_any_shape() {
        let mut trajectories = Trajectories::default();
        for _ in Shape::ALL {
            let mut position = Point2D::new(470., 532.);
            for _ in 0..50 {
                position = trajectories.next(position);
            }
            trajectories.reset();
            assert_eq!(trajectories.progress(), Progress::default());
            trajectories.next_shape();
        }
        assert_eq!(trajectories.shape(), Shape::default());
    }

    #[test]
    fn draw_letter_l() {
        let mut trajectories = Trajectories::new(TrajectoryConfig {
            shape: Shape::LetterL,
            ..Default::default()
        });
        let mut position = Point2D::new(470., 532.);
        let mut commands = Vec::new();
        while trajectories.repeats() == 0 && commands.len() < 1_000 {
            position = trajectories.next(position);
            commands.push(position);
        }
        assert_eq!(trajectories.repeats(), 1);
        assert!(commands.contains(&Point2D::new(410., 442.)));
        assert!(commands.contains(&Point2D::new(410., 622.)));
        assert_eq!(commands.last(), Some(&Point2D::new(530., 622.)));
    }

    #[test]
    fn client() {
        let mut trajectories = Trajectories::default();
        assert!(<Trajectories as Write<TargetPosition>>::write(&mut trajectories).is_none());
        <Trajectories as Read<ParticlePosition>>::read(
            &mut trajectories,
            Data::new(Point2D::new(470., 532.)),
        );
        trajectories.update();
        let target = <Trajectories as Write<TargetPosition>>::write(&mut trajectories).unwrap();
        // first waypoint of the vertical lines
        assert_eq!(*target, Point2D::new(470., 622.));
    }

    #[test]
    fn live_settings() {
        let mut trajectories = Trajectories::default();
        trajectories.set_skip(trajectories.skip().next());
        assert_eq!(trajectories.skip(), SkipLevel::One);
        assert_eq!(trajectories.arrival_mut().map(|a| a.skip), Some(SkipLevel::One));
        trajectories.set_stepsize(11.);
        assert_eq!(trajectories.stepsize(), 11.);
    }
}
