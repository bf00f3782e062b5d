/*!
# Coil selection

At each control cycle the [CoilSelector] solves the 0/1 program

maximize `Σ (alpha * vx[i] - beta * vy[i] - gamma / pt_mm²) * w[i]`, `w ∈ {0,1}⁸`

where `vx` and `vy` are the [coil response](crate::CoilResponse) projections and
`pt_mm` is the particle to target distance in millimeters.
Coil `i` is energized if `w[i] = 1`.

Any solver failure yields all coils off.
*/

use std::fmt;

use ferroservo_clients_io::{
    ActivationMask, CoilActivation, CoilGeometry, ParticlePosition, Point2D, TargetPosition,
};
use interface::{Data, Read, Update, Write};

use crate::{CoilResponse, ModelParams};

mod branch_and_bound;
mod program;
mod separable;

pub use branch_and_bound::BranchAndBound;
pub use program::{BinaryProgram, LinearConstraint, Result, Solution, SolveError, Solver};
pub use separable::Separable;

/// Outcome of the coil selection
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Optimal(ActivationMask),
    /// The particle is on target, no coil is selected
    AtTarget,
    Failed(SolveError),
}

impl Selection {
    /// Activation mask with the fail-safe applied
    pub fn mask(&self) -> ActivationMask {
        match self {
            Selection::Optimal(mask) => *mask,
            Selection::AtTarget | Selection::Failed(_) => ActivationMask::OFF,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Optimal(mask) => write!(f, "optimal: {mask}"),
            Selection::AtTarget => write!(f, "at target"),
            Selection::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// Coil selection client
///
/// Reads [ParticlePosition] and [TargetPosition] and writes [CoilActivation]
pub struct CoilSelector {
    coils: CoilGeometry,
    params: ModelParams,
    solver: Box<dyn Solver>,
    particle: Point2D,
    target: Point2D,
    mask: ActivationMask,
    failures: usize,
}

impl Default for CoilSelector {
    fn default() -> Self {
        Self::new(CoilGeometry::default(), ModelParams::default())
    }
}

impl fmt::Display for CoilSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Coil selector ({} solver):", self.solver.name())?;
        writeln!(f, " - {}", self.params)?;
        write!(f, " - solver failures: {}", self.failures)
    }
}

impl CoilSelector {
    /// Creates a coil selector with the [BranchAndBound] solver
    pub fn new(coils: CoilGeometry, params: ModelParams) -> Self {
        Self {
            coils,
            params,
            solver: Box::new(BranchAndBound::new()),
            particle: Point2D::default(),
            target: Point2D::default(),
            mask: ActivationMask::OFF,
            failures: 0,
        }
    }
    /// Replaces the solver
    pub fn solver<S: Solver + 'static>(mut self, solver: S) -> Self {
        self.solver = Box::new(solver);
        self
    }
    pub fn solver_name(&self) -> &'static str {
        self.solver.name()
    }
    pub fn coils(&self) -> &CoilGeometry {
        &self.coils
    }
    pub fn params(&self) -> &ModelParams {
        &self.params
    }
    pub fn params_mut(&mut self) -> &mut ModelParams {
        &mut self.params
    }
    /// Number of failed selections since creation
    pub fn failures(&self) -> usize {
        self.failures
    }
    /// Last selected activation mask
    pub fn mask(&self) -> ActivationMask {
        self.mask
    }
    /// Formulates the coil selection program
    ///
    /// Returns `None` if the particle is on target
    pub fn program(&self, particle: Point2D, target: Point2D) -> Option<BinaryProgram> {
        CoilResponse::new(particle, target, &self.coils, &self.params)
            .map(|response| BinaryProgram::maximize(response.marginals(&self.params).to_vec()))
    }
    /// Solves the coil selection program
    pub fn select(&self, particle: Point2D, target: Point2D) -> Selection {
        if !particle.is_finite() || !target.is_finite() {
            return Selection::Failed(SolveError::NonFinite(format!(
                "particle {particle} or target {target}"
            )));
        }
        let Some(program) = self.program(particle, target) else {
            return Selection::AtTarget;
        };
        match self.solver.solve(&program) {
            Ok(solution) => {
                log::debug!("{solution}");
                Selection::Optimal(
                    solution
                        .values
                        .iter()
                        .enumerate()
                        .filter_map(|(i, &w)| w.then_some(i))
                        .collect(),
                )
            }
            Err(e) => Selection::Failed(e),
        }
    }
    /// Selects the coils to energize, all off if the selection fails
    pub fn select_coils(&mut self, particle: Point2D, target: Point2D) -> ActivationMask {
        let selection = self.select(particle, target);
        if let Selection::Failed(e) = &selection {
            self.failures += 1;
            interface::print_info(
                format!("coil selection failed ({}), all coils off", self.solver.name()),
                Some(e),
            );
        }
        self.mask = selection.mask();
        self.mask
    }
}

impl Update for CoilSelector {
    fn update(&mut self) {
        self.select_coils(self.particle, self.target);
    }
}

impl Read<ParticlePosition> for CoilSelector {
    fn read(&mut self, data: Data<ParticlePosition>) {
        self.particle = data.get();
    }
}

impl Read<TargetPosition> for CoilSelector {
    fn read(&mut self, data: Data<TargetPosition>) {
        self.target = data.get();
    }
}

impl Write<CoilActivation> for CoilSelector {
    fn write(&mut self) -> Option<Data<CoilActivation>> {
        Some(Data::new(self.mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferroservo_clients_io::NUMBER_OF_COILS;

    struct Faulty;
    impl Solver for Faulty {
        fn name(&self) -> &'static str {
            "faulty"
        }
        fn solve(&self, _program: &BinaryProgram) -> Result<Solution> {
            Err(SolveError::Other("injected".into()))
        }
    }

    fn centre() -> Point2D {
        Point2D::new(470., 532.)
    }

    #[test]
    fn failing_solver_turns_coils_off() {
        let mut selector = CoilSelector::default().solver(Faulty);
        let mask = selector.select_coils(centre(), Point2D::new(520., 480.));
        assert_eq!(mask.bits(), 0b0000_0000);
        assert_eq!(selector.failures(), 1);
        assert!(matches!(
            selector.select(centre(), Point2D::new(520., 480.)),
            Selection::Failed(SolveError::Other(_))
        ));
    }

    #[test]
    fn non_finite_position() {
        let mut selector = CoilSelector::default();
        let mask = selector.select_coils(Point2D::new(f64::NAN, 0.), centre());
        assert!(mask.is_off());
        assert_eq!(selector.failures(), 1);
    }

    #[test]
    fn on_target() {
        let mut selector = CoilSelector::default();
        assert_eq!(selector.select(centre(), centre()), Selection::AtTarget);
        assert!(selector.select_coils(centre(), centre()).is_off());
        assert_eq!(selector.failures(), 0);
    }

    #[test]
    fn drives_towards_target() {
        let selector = CoilSelector::default();
        let particle = centre();
        for target in [
            Point2D::new(560., 625.),
            Point2D::new(380., 440.),
            Point2D::new(470., 620.),
        ] {
            let mask = selector.select(particle, target).mask();
            assert!(!mask.is_off());
            let force = mask
                .active()
                .map(|i| crate::coil_force(particle, selector.coils()[i], selector.params()))
                .fold(nalgebra::Vector2::zeros(), |a, f| a + f);
            let pt: nalgebra::Vector2<f64> = (target - particle).into();
            assert!(force.dot(&pt) > 0f64, "{mask}: {force:?}");
        }
    }

    #[test]
    fn positive_marginals_are_selected() {
        let selector = CoilSelector::default();
        let particle = Point2D::new(430., 500.);
        for target in [
            Point2D::new(600., 400.),
            Point2D::new(300., 650.),
            Point2D::new(470., 300.),
            Point2D::new(431., 501.),
        ] {
            let response =
                CoilResponse::new(particle, target, selector.coils(), selector.params()).unwrap();
            let marginals = response.marginals(selector.params());
            let mask = selector.select(particle, target).mask();
            for (i, c) in marginals.iter().enumerate() {
                assert_eq!(mask.is_set(i), *c > 0f64, "coil #{i}: {c}");
            }
        }
    }

    #[test]
    fn coils_are_independent() {
        // moving one coil changes its own bit only
        let params = ModelParams::default();
        let particle = Point2D::new(470., 532.);
        let target = Point2D::new(500., 600.);
        let reference = CoilSelector::new(CoilGeometry::default(), params)
            .select(particle, target)
            .mask();
        for i in 0..NUMBER_OF_COILS {
            let mut tips = *CoilGeometry::default().tips();
            // mirror coil i about the particle
            tips[i] = particle * 2. - tips[i];
            let selector = CoilSelector::new(CoilGeometry::new(tips), params);
            let mask = selector.select(particle, target).mask();
            for j in (0..NUMBER_OF_COILS).filter(|&j| j != i) {
                assert_eq!(mask.is_set(j), reference.is_set(j), "coil #{j}");
            }
            let response =
                CoilResponse::new(particle, target, selector.coils(), &params).unwrap();
            assert_eq!(mask.is_set(i), response.marginals(&params)[i] > 0f64);
        }
    }

    #[test]
    fn solvers_agree_on_coil_selection() {
        let bnb = CoilSelector::default();
        let separable = CoilSelector::default().solver(Separable);
        for (u, v) in [(300., 300.), (700., 700.), (470., 800.), (200., 532.)] {
            for particle in [centre(), Point2D::new(400., 600.), Point2D::new(550., 450.)] {
                let target = Point2D::new(u, v);
                assert_eq!(
                    bnb.select(particle, target),
                    separable.select(particle, target)
                );
            }
        }
    }

    #[test]
    fn weights_are_read_live() {
        let mut selector = CoilSelector::default();
        let target = Point2D::new(560., 625.);
        assert!(!selector.select(centre(), target).mask().is_off());
        selector.params_mut().alpha = 0.;
        assert!(selector.select(centre(), target).mask().is_off());
    }

    #[test]
    fn client() {
        let mut selector = CoilSelector::default();
        <CoilSelector as Read<ParticlePosition>>::read(&mut selector, Data::new(centre()));
        <CoilSelector as Read<TargetPosition>>::read(
            &mut selector,
            Data::new(Point2D::new(560., 625.)),
        );
        selector.update();
        let mask = <CoilSelector as Write<CoilActivation>>::write(&mut selector).unwrap();
        assert_eq!(*mask, selector.mask());
        assert!(!mask.is_off());
    }
}
