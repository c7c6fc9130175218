//! End-to-end solve: construction, LNS refinement and the request/response model.

use crate::config::HeuristicConfig;
use crate::data::{Assignment, CourseId, Instance, PairRef, ProfessorId, UnmetMinimum};
use crate::error::SolveError;
use crate::greedy;
use crate::highs::HighsOracle;
use crate::lns::{self, LnsOutcome};
use crate::loads::{ProfessorLoad, WorkloadLedger};
use crate::multistart;
use crate::oracle::{Oracle, PairBounds};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Problem data plus the caller's parameters and the oracle's global pair bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    pub instance: Instance,
    #[serde(default)]
    pub config: HeuristicConfig,
    #[serde(default)]
    pub forced_assignments: Vec<PairRef>,
    #[serde(default)]
    pub forbidden_assignments: Vec<PairRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentEntry {
    pub course_id: CourseId,
    pub professor_id: ProfessorId,
    pub subject: String,
    pub professor: String,
}

/// Constructor whose assignment seeded the LNS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstructionSource {
    Grasp,
    Greedy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveOutput {
    pub assignments: Vec<AssignmentEntry>,
    pub objective: f64,
    pub unmet_minimums: Vec<UnmetMinimum>,
    pub loads: Vec<ProfessorLoad>,
    pub trials: usize,
    pub construction: ConstructionSource,
    pub lns_improvements: usize,
}

struct Incumbent {
    assignment: Assignment,
    unmet_minimums: usize,
    objective: f64,
    source: ConstructionSource,
}

/// Solves the assignment problem with the multi-start heuristic, refined by LNS over HiGHS.
pub fn solve(request: &SolveRequest) -> Result<SolveOutput, SolveError> {
    let mut oracle = HighsOracle::new(request.config.seed);
    solve_with(request, &mut oracle)
}

/// Same pipeline as [`solve`] with any oracle.
pub fn solve_with<O>(request: &SolveRequest, oracle: &mut O) -> Result<SolveOutput, SolveError>
where
    O: Oracle + ?Sized,
{
    let start_time = Instant::now();
    let instance = &request.instance;
    let config = &request.config;
    config.validate()?;
    let bounds = PairBounds::from_lists(
        instance,
        &request.forced_assignments,
        &request.forbidden_assignments,
    )?;
    info!(
        "Solving assignment of {} courses to {} professors ({} forced, {} forbidden pairs)...",
        instance.num_courses(),
        instance.num_professors(),
        request.forced_assignments.len(),
        request.forbidden_assignments.len()
    );

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let (best, stats) = multistart::run(instance, &bounds, &config.grasp, &mut rng);
    let mut start = best.map(|b| Incumbent {
        assignment: b.assignment,
        unmet_minimums: b.unmet_minimums,
        objective: b.objective,
        source: ConstructionSource::Grasp,
    });
    if config.greedy.enabled {
        match greedy::run(instance, &bounds) {
            Ok(g) => {
                // same ranking as between trials; GRASP keeps ties
                let better = start.as_ref().is_none_or(|s| {
                    g.unmet_minimums < s.unmet_minimums
                        || (g.unmet_minimums == s.unmet_minimums && g.objective > s.objective)
                });
                if better {
                    info!(
                        "Greedy construction taken: {} unmet minimum(s), objective {}",
                        g.unmet_minimums, g.objective
                    );
                    start = Some(Incumbent {
                        assignment: g.assignment,
                        unmet_minimums: g.unmet_minimums,
                        objective: g.objective,
                        source: ConstructionSource::Greedy,
                    });
                }
            }
            Err(e) => debug!("Greedy construction discarded: {}", e),
        }
    }
    let start = start.ok_or(SolveError::NoCompleteAssignment {
        trials: stats.trials_run,
    })?;
    let construction = start.source;

    let mut incumbent = start.assignment;
    let mut improvements = 0;
    if config.lns.enabled && config.lns.rounds > 0 {
        let mut order = config.lns.order;
        let mut stale_rounds = 0;
        for round in 0..config.lns.rounds {
            match lns::improve(oracle, instance, &bounds, &incumbent, &config.lns, order)? {
                LnsOutcome::Improved {
                    assignment,
                    objective,
                } => {
                    info!("LNS round {}: improved objective to {}", round, objective);
                    incumbent = assignment;
                    improvements += 1;
                    stale_rounds = 0;
                }
                LnsOutcome::NoImprovement(reason) => {
                    debug!("LNS round {}: no improvement ({:?})", round, reason);
                    stale_rounds += 1;
                    if stale_rounds >= 2 {
                        break;
                    }
                    order = order.reversed();
                }
            }
        }
    }

    let output = report(
        instance,
        oracle,
        &incumbent,
        stats.trials_run,
        construction,
        improvements,
    );
    info!(
        "Solution found in {:.2?}: objective {}, {} unmet minimum(s)",
        start_time.elapsed(),
        output.objective,
        output.unmet_minimums.len()
    );
    Ok(output)
}

fn report<O>(
    instance: &Instance,
    oracle: &O,
    assignment: &Assignment,
    trials: usize,
    construction: ConstructionSource,
    lns_improvements: usize,
) -> SolveOutput
where
    O: Oracle + ?Sized,
{
    let loads = WorkloadLedger::from_assignment(instance, assignment);
    let mut assignments: Vec<AssignmentEntry> = assignment
        .pairs()
        .map(|(c, p)| AssignmentEntry {
            course_id: c,
            professor_id: p,
            subject: instance.course(c).subject.clone(),
            professor: instance.professor(p).name.clone(),
        })
        .collect();
    assignments.sort();

    SolveOutput {
        assignments,
        objective: oracle.objective(instance, assignment),
        unmet_minimums: loads.unmet_minimums(instance),
        loads: loads.summary(instance),
        trials,
        construction,
        lns_improvements,
    }
}
