//! # Coil response model
//!
//! The magnetic force of coil `i` on the particle follows an inverse power law
//! of the coil tip to particle distance `d` in millimeters:
//! `|F| = s * 2.4675 * d^-0.8652`, with `s` the [scaling factor](ModelParams::scaling_factor),
//! directed along the coil tip to particle vector.
//!
//! Each force is projected onto the particle to target direction (`vx`) and onto
//! its orthogonal direction (`vy`, magnitude only).

use ferroservo_clients_io::{CoilGeometry, Point2D, NUMBER_OF_COILS};
use nalgebra as na;

use crate::ModelParams;

/// Force law gain `[mN]`
pub const FORCE_GAIN: f64 = 2.4675;
/// Force law exponent
pub const FORCE_EXPONENT: f64 = -0.8652;

/// Force of a single coil on the particle
///
/// Returns a null force when the particle sits on the coil tip,
/// where the direction of the force is undefined.
pub fn coil_force(particle: Point2D, coil_tip: Point2D, params: &ModelParams) -> na::Vector2<f64> {
    let mp: na::Vector2<f64> = (particle - coil_tip).into();
    let mp_norm = mp.norm();
    if mp_norm == 0f64 {
        return na::Vector2::zeros();
    }
    let magnitude =
        params.scaling_factor() * FORCE_GAIN * (mp_norm / params.mm2pix).powf(FORCE_EXPONENT);
    mp * (magnitude / mp_norm)
}

/// Projections of the coil forces
#[derive(Debug, Clone, PartialEq)]
pub struct CoilResponse {
    /// Force components along the particle to target direction
    pub vx: [f64; NUMBER_OF_COILS],
    /// Force component magnitudes orthogonal to the particle to target direction
    pub vy: [f64; NUMBER_OF_COILS],
    /// Particle to target distance `[mm]`
    pub pt_norm_mm: f64,
}

impl CoilResponse {
    /// Computes the coil force projections
    ///
    /// Returns `None` if the particle is on target as the direction to target is undefined.
    pub fn new(
        particle: Point2D,
        target: Point2D,
        coils: &CoilGeometry,
        params: &ModelParams,
    ) -> Option<Self> {
        let pt = target - particle;
        let pt_unit: na::Vector2<f64> = pt.unit()?.into();
        let pto_unit: na::Vector2<f64> = pt.perpendicular().unit()?.into();
        let mut vx = [0f64; NUMBER_OF_COILS];
        let mut vy = [0f64; NUMBER_OF_COILS];
        for ((tip, vx), vy) in coils.iter().zip(vx.iter_mut()).zip(vy.iter_mut()) {
            let mf = coil_force(particle, *tip, params);
            *vx = mf.dot(&pt_unit);
            *vy = mf.dot(&pto_unit).abs();
        }
        log::debug!("Vx: {vx:+.4?}");
        log::debug!("Vy: {vy:+.4?}");
        Some(Self {
            vx,
            vy,
            pt_norm_mm: pt.norm() / params.mm2pix,
        })
    }
    /// Marginal contribution of each coil to the objective
    ///
    /// `alpha * vx[i] - beta * vy[i] - gamma / pt_norm_mm^2`
    pub fn marginals(&self, params: &ModelParams) -> [f64; NUMBER_OF_COILS] {
        let distance_penalty = params.gamma / (self.pt_norm_mm * self.pt_norm_mm);
        let mut c = [0f64; NUMBER_OF_COILS];
        for ((c, vx), vy) in c.iter_mut().zip(&self.vx).zip(&self.vy) {
            *c = params.alpha * vx - params.beta * vy - distance_penalty;
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> CoilGeometry {
        CoilGeometry::default()
    }

    #[test]
    fn lateral_projection_is_positive() {
        let params = ModelParams::default();
        let coils = ring();
        for (particle, target) in [
            ((470., 532.), (500., 500.)),
            ((400., 600.), (350., 640.)),
            ((600., 400.), (600., 380.)),
            ((300., 500.), (650., 520.)),
        ] {
            let response =
                CoilResponse::new(particle.into(), target.into(), &coils, &params).unwrap();
            assert!(response.vy.iter().all(|vy| *vy >= 0f64));
        }
    }

    #[test]
    fn force_points_from_coil_to_particle() {
        let params = ModelParams::default();
        let f = coil_force(Point2D::new(46.5, 0.), Point2D::new(0., 0.), &params);
        // 1mm away: the magnitude is the force law gain
        assert!((f.x - FORCE_GAIN).abs() < 1e-12);
        assert_eq!(f.y, 0.);
        let g = coil_force(Point2D::new(93., 0.), Point2D::new(0., 0.), &params);
        assert!(g.x < f.x);
    }

    #[test]
    fn particle_on_coil_tip() {
        let params = ModelParams::default();
        let coils = ring();
        let response = CoilResponse::new(coils[2], Point2D::new(470., 532.), &coils, &params)
            .unwrap();
        assert_eq!((response.vx[2], response.vy[2]), (0., 0.));
        assert!(response.marginals(&params)[2] < 0f64);
    }

    #[test]
    fn on_target() {
        let p = Point2D::new(470., 532.);
        assert!(CoilResponse::new(p, p, &ring(), &ModelParams::default()).is_none());
    }

    #[test]
    fn aligned_coil() {
        // A coil behind the particle along the direction of motion pushes it forward
        let params = ModelParams::default();
        let mut tips = *ring().tips();
        tips[0] = Point2D::new(400., 532.);
        let coils = CoilGeometry::new(tips);
        let response = CoilResponse::new(
            Point2D::new(470., 532.),
            Point2D::new(570., 532.),
            &coils,
            &params,
        )
        .unwrap();
        assert!(response.vx[0] > 0f64);
        assert!(response.vy[0].abs() < 1e-12);
        assert!((response.pt_norm_mm - 100. / 46.5).abs() < 1e-12);
    }
}
