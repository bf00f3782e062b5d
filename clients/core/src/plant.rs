//! Simulated ferrofluid particle
//!
//! First order response to the coil forces:
//! `p(t+dt) = p(t) + mobility * Σ F_i * dt`, summed over the energized coils,
//! with the same force law as the [coil response](crate::CoilResponse) model.

use std::time::Duration;

use ferroservo_clients_io::{ActivationMask, CoilActivation, CoilGeometry, ParticlePosition, Point2D};
use interface::{Data, Read, Update, Write};
use nalgebra as na;

use crate::{coil_force, ModelParams};

/// Simulated particle client
///
/// Reads [CoilActivation] and writes [ParticlePosition]
#[derive(Debug, Clone)]
pub struct Particle {
    position: Point2D,
    coils: CoilGeometry,
    params: ModelParams,
    /// Velocity per unit force `[px/s/mN]`
    mobility: f64,
    dt: Duration,
    mask: ActivationMask,
}

impl Particle {
    /// Creates a particle at `position` moving with the time step `dt`
    pub fn new(position: Point2D, dt: Duration) -> Self {
        Self {
            position,
            coils: CoilGeometry::default(),
            params: ModelParams::default(),
            mobility: 20.,
            dt,
            mask: ActivationMask::OFF,
        }
    }
    pub fn coils(mut self, coils: CoilGeometry) -> Self {
        self.coils = coils;
        self
    }
    pub fn params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }
    pub fn mobility(mut self, mobility: f64) -> Self {
        self.mobility = mobility;
        self
    }
    pub fn position(&self) -> Point2D {
        self.position
    }
    pub fn set_position(&mut self, position: Point2D) {
        self.position = position;
    }
    /// Sets the coil activation
    pub fn actuate(&mut self, mask: ActivationMask) {
        self.mask = mask;
    }
    /// Net force of the energized coils
    pub fn force(&self) -> na::Vector2<f64> {
        self.mask
            .active()
            .map(|i| coil_force(self.position, self.coils[i], &self.params))
            .fold(na::Vector2::zeros(), |a, f| a + f)
    }
    /// Moves the particle by one time step
    pub fn step(&mut self) -> Point2D {
        let displacement = self.force() * self.mobility * self.dt.as_secs_f64();
        self.position = self.position + Point2D::from(displacement);
        self.position
    }
}

impl Update for Particle {
    fn update(&mut self) {
        self.step();
    }
}

impl Read<CoilActivation> for Particle {
    fn read(&mut self, data: Data<CoilActivation>) {
        self.actuate(data.get());
    }
}

impl Write<ParticlePosition> for Particle {
    fn write(&mut self) -> Option<Data<ParticlePosition>> {
        Some(Data::new(self.position))
    }
}
