use std::{fmt, time::Duration};

/// Linear inequality `coefficients · w <= bound`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub coefficients: Vec<f64>,
    pub bound: f64,
}

impl LinearConstraint {
    pub fn new(coefficients: Vec<f64>, bound: f64) -> Self {
        Self {
            coefficients,
            bound,
        }
    }
    /// At most `n` of the variables can be set
    pub fn at_most(n_variable: usize, n: usize) -> Self {
        Self::new(vec![1f64; n_variable], n as f64)
    }
}

/// 0/1 integer linear program
///
/// maximize `objective · w` subject to `constraints`, `w ∈ {0,1}ⁿ`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BinaryProgram {
    pub objective: Vec<f64>,
    pub constraints: Vec<LinearConstraint>,
}

impl BinaryProgram {
    /// Creates a program without constraints
    pub fn maximize(objective: Vec<f64>) -> Self {
        Self {
            objective,
            constraints: Vec::new(),
        }
    }
    /// Adds a constraint to the program
    pub fn subject_to(mut self, constraint: LinearConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }
    pub fn n_variable(&self) -> usize {
        self.objective.len()
    }
    /// Objective value of the assignment `w`
    pub fn value(&self, w: &[bool]) -> f64 {
        self.objective
            .iter()
            .zip(w)
            .filter_map(|(c, w)| w.then_some(*c))
            .sum()
    }
    /// Checks that the assignment `w` satisfies all the constraints
    pub fn is_feasible(&self, w: &[bool]) -> bool {
        self.constraints.iter().all(|constraint| {
            constraint
                .coefficients
                .iter()
                .zip(w)
                .filter_map(|(a, w)| w.then_some(*a))
                .sum::<f64>()
                <= constraint.bound
        })
    }
    /// Checks that the program is well formed
    pub fn validate(&self) -> Result<()> {
        let n = self.n_variable();
        if let Some(i) = self.objective.iter().position(|c| !c.is_finite()) {
            return Err(SolveError::NonFinite(format!("objective coefficient #{i}")));
        }
        for (k, constraint) in self.constraints.iter().enumerate() {
            if constraint.coefficients.len() != n {
                return Err(SolveError::Dimension {
                    constraint: k,
                    expected: n,
                    found: constraint.coefficients.len(),
                });
            }
            if !constraint.bound.is_finite()
                || constraint.coefficients.iter().any(|a| !a.is_finite())
            {
                return Err(SolveError::NonFinite(format!("constraint #{k}")));
            }
        }
        Ok(())
    }
}

/// Optimal assignment of a [BinaryProgram]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub values: Vec<bool>,
    pub objective: f64,
    /// Number of nodes explored by the solver
    pub nodes: usize,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<_> = self.values.iter().map(|&w| w as u8).collect();
        write!(
            f,
            "objective: {:+.6e}, values: {:?} ({} nodes)",
            self.objective, values, self.nodes
        )
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum SolveError {
    #[error("non finite coefficient in {0}")]
    NonFinite(String),
    #[error("constraint #{constraint} has {found} coefficients, expected {expected}")]
    Dimension {
        constraint: usize,
        expected: usize,
        found: usize,
    },
    #[error("no feasible assignment")]
    Infeasible,
    #[error("node budget of {0} exhausted")]
    NodeBudget(usize),
    #[error("solver deadline of {0:?} exceeded")]
    Deadline(Duration),
    #[error("{0} does not support linear constraints")]
    Unsupported(&'static str),
    #[error("solver failure: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SolveError>;

/// 0/1 integer linear program solver
pub trait Solver: Send + Sync {
    fn name(&self) -> &'static str;
    fn solve(&self, program: &BinaryProgram) -> Result<Solution>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feasibility() {
        let program = BinaryProgram::maximize(vec![1., 2., 3.])
            .subject_to(LinearConstraint::at_most(3, 2));
        assert!(program.is_feasible(&[true, false, true]));
        assert!(!program.is_feasible(&[true, true, true]));
        assert_eq!(program.value(&[true, false, true]), 4.);
    }

    #[test]
    fn malformed_programs() {
        let program = BinaryProgram::maximize(vec![1., f64::NAN]);
        assert!(matches!(program.validate(), Err(SolveError::NonFinite(_))));
        let program = BinaryProgram::maximize(vec![1., 1.])
            .subject_to(LinearConstraint::new(vec![1.], 1.));
        assert_eq!(
            program.validate(),
            Err(SolveError::Dimension {
                constraint: 0,
                expected: 2,
                found: 1
            })
        );
    }
}
