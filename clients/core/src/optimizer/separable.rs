use super::{BinaryProgram, Result, Solution, SolveError, Solver};

/// Per-variable sign test
///
/// Without constraints the objective is separable and `w[i]` is set if and only if
/// the objective coefficient `c[i]` is strictly positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct Separable;

impl Solver for Separable {
    fn name(&self) -> &'static str {
        "separable"
    }
    fn solve(&self, program: &BinaryProgram) -> Result<Solution> {
        program.validate()?;
        if !program.constraints.is_empty() {
            return Err(SolveError::Unsupported(self.name()));
        }
        let values: Vec<_> = program.objective.iter().map(|&c| c > 0f64).collect();
        Ok(Solution {
            objective: program.value(&values),
            values,
            nodes: program.n_variable(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::{BranchAndBound, LinearConstraint};

    #[test]
    fn sign_test() {
        let program = BinaryProgram::maximize(vec![0.3, -0.2, 0., 1e-12]);
        let solution = Separable.solve(&program).unwrap();
        assert_eq!(solution.values, vec![true, false, false, true]);
    }

    #[test]
    fn constraints_are_unsupported() {
        let program =
            BinaryProgram::maximize(vec![1.]).subject_to(LinearConstraint::at_most(1, 1));
        assert_eq!(
            Separable.solve(&program),
            Err(SolveError::Unsupported("separable"))
        );
    }

    #[test]
    fn agrees_with_branch_and_bound() {
        // deterministic pseudo-random coefficients with some ties at zero
        let mut seed = 0x2545_f491_u32;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            (seed % 2001) as f64 / 1000. - 1.
        };
        for _ in 0..200 {
            let objective: Vec<f64> = (0..8)
                .map(|_| {
                    let c = next();
                    if c.abs() < 0.1 {
                        0.
                    } else {
                        c
                    }
                })
                .collect();
            let program = BinaryProgram::maximize(objective);
            let separable = Separable.solve(&program).unwrap();
            let bnb = BranchAndBound::new().solve(&program).unwrap();
            assert_eq!(separable.values, bnb.values, "{:?}", program.objective);
            assert!((separable.objective - bnb.objective).abs() < 1e-12);
        }
    }
}
