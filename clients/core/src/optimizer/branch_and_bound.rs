use std::time::{Duration, Instant};

use super::{BinaryProgram, Result, Solution, SolveError, Solver};

/// Depth-first branch and bound 0/1 solver
///
/// Variables are branched in order, the branch that improves the objective first.
/// A node is pruned when the sum of the remaining positive coefficients cannot
/// improve on the incumbent or when a constraint can no longer be satisfied.
/// The search is bounded by a node budget and an optional wall-clock deadline.
#[derive(Debug, Clone)]
pub struct BranchAndBound {
    max_nodes: usize,
    deadline: Option<Duration>,
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self {
            max_nodes: 1 << 16,
            deadline: None,
        }
    }
}

impl BranchAndBound {
    pub fn new() -> Self {
        Default::default()
    }
    /// Sets the maximum number of explored nodes
    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }
    /// Sets the solver deadline
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

struct Search<'a> {
    program: &'a BinaryProgram,
    // optimistic gain of the variables from index i onward
    headroom: Vec<f64>,
    // smallest achievable left hand side of each constraint from index i onward
    slack: Vec<Vec<f64>>,
    assignment: Vec<bool>,
    lhs: Vec<f64>,
    best: Option<(f64, Vec<bool>)>,
    nodes: usize,
    max_nodes: usize,
    start: Instant,
    deadline: Option<Duration>,
}

impl<'a> Search<'a> {
    fn new(program: &'a BinaryProgram, solver: &BranchAndBound) -> Self {
        let n = program.n_variable();
        let mut headroom = vec![0f64; n + 1];
        for i in (0..n).rev() {
            headroom[i] = headroom[i + 1] + program.objective[i].max(0f64);
        }
        let slack = program
            .constraints
            .iter()
            .map(|constraint| {
                let mut slack = vec![0f64; n + 1];
                for i in (0..n).rev() {
                    slack[i] = slack[i + 1] + constraint.coefficients[i].min(0f64);
                }
                slack
            })
            .collect();
        Self {
            program,
            headroom,
            slack,
            assignment: vec![false; n],
            lhs: vec![0f64; program.constraints.len()],
            best: None,
            nodes: 0,
            max_nodes: solver.max_nodes,
            start: Instant::now(),
            deadline: solver.deadline,
        }
    }

    fn branch(&mut self, i: usize, value: f64) -> Result<()> {
        self.nodes += 1;
        if self.nodes > self.max_nodes {
            return Err(SolveError::NodeBudget(self.max_nodes));
        }
        if let Some(deadline) = self.deadline {
            if self.start.elapsed() > deadline {
                return Err(SolveError::Deadline(deadline));
            }
        }
        // constraints that cannot be met anymore
        if self
            .lhs
            .iter()
            .zip(&self.slack)
            .zip(&self.program.constraints)
            .any(|((lhs, slack), constraint)| lhs + slack[i] > constraint.bound)
        {
            return Ok(());
        }
        if let Some((best, _)) = &self.best {
            if value + self.headroom[i] <= *best {
                return Ok(());
            }
        }
        if i == self.program.n_variable() {
            // the bound checks above guarantee feasibility and strict improvement
            self.best = Some((value, self.assignment.clone()));
            return Ok(());
        }
        let c = self.program.objective[i];
        let order = if c > 0f64 { [true, false] } else { [false, true] };
        for w in order {
            self.assignment[i] = w;
            if w {
                self.add(i, 1f64);
                let result = self.branch(i + 1, value + c);
                self.add(i, -1f64);
                result?;
            } else {
                self.branch(i + 1, value)?;
            }
        }
        self.assignment[i] = false;
        Ok(())
    }

    fn add(&mut self, i: usize, sign: f64) {
        for (lhs, constraint) in self.lhs.iter_mut().zip(&self.program.constraints) {
            *lhs += sign * constraint.coefficients[i];
        }
    }
}

impl Solver for BranchAndBound {
    fn name(&self) -> &'static str {
        "branch and bound"
    }
    fn solve(&self, program: &BinaryProgram) -> Result<Solution> {
        program.validate()?;
        let mut search = Search::new(program, self);
        search.branch(0, 0f64)?;
        let nodes = search.nodes;
        search
            .best
            .map(|(objective, values)| Solution {
                values,
                objective,
                nodes,
            })
            .ok_or(SolveError::Infeasible)
    }
}
