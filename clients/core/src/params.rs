//! # Optimizer weights
//!
//! The weights of the coil selection objective and the operator-facing
//! editor that tunes them while the loop is running.
//! The selector reads the weights on every call, so an edit takes effect
//! at the next control cycle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coil selection objective weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Weight of the force projected onto the particle-to-target direction
    pub alpha: f64,
    /// Weight of the lateral force magnitude
    pub beta: f64,
    /// Weight of the inverse squared distance to target
    pub gamma: f64,
    /// Reserved weight, tuned but not part of the objective
    pub delta: f64,
    /// Pixels per millimeter
    pub mm2pix: f64,
    /// The force law is scaled by `10^scaling_factor_power`
    pub scaling_factor_power: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            alpha: 0.4145,
            beta: 0.2685,
            gamma: 0.0001,
            delta: 0.5,
            mm2pix: 46.5,
            scaling_factor_power: 0.,
        }
    }
}

impl ModelParams {
    /// Force law scaling factor
    pub fn scaling_factor(&self) -> f64 {
        10f64.powf(self.scaling_factor_power)
    }
}

impl fmt::Display for ModelParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "alpha: {}, beta: {}, gamma: {}, delta: {}, scaling factor power: {}, mm2pix: {}",
            self.alpha, self.beta, self.gamma, self.delta, self.scaling_factor_power, self.mm2pix
        )
    }
}

/// Variable under edition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TuningVariable {
    #[default]
    Alpha,
    Beta,
    Gamma,
    Delta,
    ScalingFactorPower,
    Mm2Pix,
    /// The edition step itself, scaled by 10 on each increment
    Step,
}

impl TuningVariable {
    pub fn next(self) -> Self {
        use TuningVariable::*;
        match self {
            Alpha => Beta,
            Beta => Gamma,
            Gamma => Delta,
            Delta => ScalingFactorPower,
            ScalingFactorPower => Mm2Pix,
            Mm2Pix => Step,
            Step => Alpha,
        }
    }
}

impl fmt::Display for TuningVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TuningVariable::*;
        let name = match self {
            Alpha => "alpha",
            Beta => "beta",
            Gamma => "gamma",
            Delta => "delta",
            ScalingFactorPower => "scaling factor power",
            Mm2Pix => "mm2pix",
            Step => "tuning step",
        };
        write!(f, "{name}")
    }
}

/// One-variable-at-a-time editor of [ModelParams]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningEditor {
    variable: TuningVariable,
    step: f64,
}

impl Default for TuningEditor {
    fn default() -> Self {
        Self {
            variable: TuningVariable::Alpha,
            step: 0.005,
        }
    }
}

impl TuningEditor {
    pub fn new(step: f64) -> Self {
        Self {
            step,
            ..Default::default()
        }
    }
    pub fn variable(&self) -> TuningVariable {
        self.variable
    }
    pub fn step(&self) -> f64 {
        self.step
    }
    /// Moves the edition to the next variable
    pub fn select_next(&mut self) -> TuningVariable {
        self.variable = self.variable.next();
        log::info!("varying {}", self.variable);
        self.variable
    }
    /// Increments the selected variable by the edition step
    pub fn increment(&mut self, params: &mut ModelParams) -> f64 {
        self.apply(params, 1f64)
    }
    /// Decrements the selected variable by the edition step
    pub fn decrement(&mut self, params: &mut ModelParams) -> f64 {
        self.apply(params, -1f64)
    }
    fn apply(&mut self, params: &mut ModelParams, sign: f64) -> f64 {
        let value = match weight_mut(params, self.variable) {
            Some(weight) => {
                *weight += sign * self.step;
                *weight
            }
            None => {
                if sign > 0f64 {
                    self.step *= 10f64;
                } else {
                    self.step /= 10f64;
                }
                self.step
            }
        };
        log::info!("{}: {}", self.variable, value);
        value
    }
    /// Logs all the weights and the edition step
    pub fn print(&self, params: &ModelParams) {
        log::info!("{params}, tuning step: {}", self.step);
    }
}

fn weight_mut(params: &mut ModelParams, variable: TuningVariable) -> Option<&mut f64> {
    match variable {
        TuningVariable::Alpha => Some(&mut params.alpha),
        TuningVariable::Beta => Some(&mut params.beta),
        TuningVariable::Gamma => Some(&mut params.gamma),
        TuningVariable::Delta => Some(&mut params.delta),
        TuningVariable::ScalingFactorPower => Some(&mut params.scaling_factor_power),
        TuningVariable::Mm2Pix => Some(&mut params.mm2pix),
        TuningVariable::Step => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_through_variables() {
        let mut editor = TuningEditor::default();
        let visited: Vec<_> = (0..7).map(|_| editor.select_next()).collect();
        assert_eq!(visited.last(), Some(&TuningVariable::Alpha));
        assert_eq!(visited[5], TuningVariable::Step);
    }

    #[test]
    fn edit_weights() {
        let mut params = ModelParams::default();
        let mut editor = TuningEditor::default();
        editor.increment(&mut params);
        assert!((params.alpha - 0.4195).abs() < 1e-12);
        editor.select_next();
        editor.decrement(&mut params);
        assert!((params.beta - 0.2635).abs() < 1e-12);
    }

    #[test]
    fn scale_the_step() {
        let mut params = ModelParams::default();
        let mut editor = TuningEditor::default();
        while editor.variable() != TuningVariable::Step {
            editor.select_next();
        }
        editor.increment(&mut params);
        assert!((editor.step() - 0.05).abs() < 1e-12);
        editor.decrement(&mut params);
        editor.decrement(&mut params);
        assert!((editor.step() - 0.0005).abs() < 1e-12);
        assert_eq!(params, ModelParams::default());
    }

    #[test]
    fn unit_scaling() {
        let params = ModelParams {
            scaling_factor_power: 2.,
            ..Default::default()
        };
        assert!((params.scaling_factor() - 100.).abs() < 1e-9);
    }
}
