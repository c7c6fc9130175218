//! HiGHS-backed integer-programming oracle for assignment sub-problems.

use crate::data::{Assignment, Instance, Semester};
use crate::error::OracleError;
use crate::objective;
use crate::oracle::{Oracle, PairBound, PairValues, SubProblem, SubProblemOutcome};
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    default_solver, variable,
};
use log::{debug, trace};
use std::time::Instant;

/// Integer-programming oracle backed by the HiGHS MIP solver.
///
/// One binary variable per (course, professor) pair that the bounds do not forbid, maximising the
/// assignment objective subject to single coverage, annual minimums and semester maximums.
#[derive(Debug, Clone)]
pub struct HighsOracle {
    seed: u64,
}

impl HighsOracle {
    pub fn new(seed: u64) -> Self {
        HighsOracle { seed }
    }
}

impl Oracle for HighsOracle {
    fn solve(
        &mut self,
        instance: &Instance,
        problem: &SubProblem,
    ) -> Result<SubProblemOutcome, OracleError> {
        let start_time = Instant::now();
        let num_professors = instance.num_professors();
        let mut vars = ProblemVariables::new();

        // x_cp = 1 if course c is taught by professor p
        let mut pair_vars: Vec<Option<Variable>> =
            Vec::with_capacity(instance.num_courses() * num_professors);
        for course in instance.courses() {
            for professor in instance.professors() {
                let var = match problem.bounds.get(course.id, professor.id) {
                    PairBound::ForcedFalse => None,
                    PairBound::ForcedTrue => Some(vars.add(variable().binary().min(1))),
                    PairBound::Free => Some(vars.add(variable().binary())),
                };
                pair_vars.push(var);
            }
        }
        let var = |c: usize, p: usize| pair_vars[c * num_professors + p];

        if let Some(course) = (0..instance.num_courses())
            .find(|c| (0..num_professors).all(|p| var(*c, p).is_none()))
        {
            debug!("Course {} has no permitted professor", course);
            return Ok(SubProblemOutcome::Infeasible);
        }
        trace!(
            "Built {} pair variables out of {}",
            pair_vars.iter().flatten().count(),
            pair_vars.len()
        );

        let objective: Expression = instance
            .courses()
            .iter()
            .flat_map(|course| {
                instance.professors().iter().filter_map(move |professor| {
                    var(course.id, professor.id)
                        .map(|x| objective::coefficient(instance, professor, course) * x)
                })
            })
            .sum();

        let mut model = vars
            .maximise(objective.clone())
            .using(default_solver)
            .set_option("threads", 1)
            .set_option("random_seed", (self.seed % i32::MAX as u64) as i32)
            .set_option("time_limit", problem.limits.time_limit.as_secs_f64())
            .set_option("log_to_console", "false");
        if let Some(nodes) = problem.limits.node_limit {
            model = model.set_option("mip_max_nodes", nodes.min(i32::MAX as u32) as i32);
        }

        // every course taught exactly once
        for course in instance.courses() {
            let taught: Expression = (0..num_professors).filter_map(|p| var(course.id, p)).sum();
            model.add_constraint(constraint!(taught == 1));
        }

        for professor in instance.professors() {
            let load_in = |semester: Option<Semester>| -> Expression {
                instance
                    .courses()
                    .iter()
                    .filter(|c| semester.is_none_or(|s| c.semester == s))
                    .filter_map(|c| var(c.id, professor.id).map(|x| c.workload as f64 * x))
                    .sum()
            };
            let annual = load_in(None);
            let min = professor.min_workload as f64;
            model.add_constraint(constraint!(annual >= min));
            for semester in [Semester::First, Semester::Second] {
                let load = load_in(Some(semester));
                let max = professor.max_workload(semester) as f64;
                model.add_constraint(constraint!(load <= max));
            }
        }

        if let Some(cutoff) = problem.cutoff {
            model.add_constraint(constraint!(objective >= cutoff));
        }

        let solution = match model.solve() {
            Ok(s) => s,
            Err(ResolutionError::Infeasible) => {
                debug!("HiGHS: sub-problem infeasible after {:.2?}", start_time.elapsed());
                return Ok(SubProblemOutcome::Infeasible);
            }
            Err(e) => return Err(OracleError::new(format!("HiGHS failed: {}", e))),
        };

        let mut values = PairValues::zeros(instance.num_courses(), num_professors);
        for c in 0..instance.num_courses() {
            for p in 0..num_professors {
                if let Some(x) = var(c, p) {
                    values.set(c, p, solution.value(x));
                }
            }
        }

        // a budget stop can hand back a point that is not a complete assignment
        let pairs = values.selected_pairs();
        let Some(assignment) = Assignment::from_pairs(instance.num_courses(), pairs) else {
            debug!("HiGHS: no feasible point within budget");
            return Ok(SubProblemOutcome::NoSolution);
        };
        let objective = self.objective(instance, &assignment);
        debug!(
            "HiGHS: objective {} found in {:.2?}",
            objective,
            start_time.elapsed()
        );
        Ok(SubProblemOutcome::Solved { values, objective })
    }
}
