//! Destroy-and-rebuild large neighborhood search around an incumbent assignment.
//!
//! A fraction of the incumbent's free assignments is released, everything else the incumbent
//! decided stays fixed, and the resulting smaller problem is handed to the oracle with a cutoff
//! just above the incumbent's objective. The incumbent itself is never touched; an improvement
//! is returned as a fresh assignment.

use crate::config::{CandidateOrder, LnsConfig};
use crate::data::{Assignment, CourseId, Instance, ProfessorId};
use crate::error::OracleError;
use crate::loads::WorkloadLedger;
use crate::oracle::{Oracle, PairBound, PairBounds, PairValues, SearchLimits, SubProblem, SubProblemOutcome};
use itertools::Itertools;
use log::debug;

/// Split of the incumbent's pairs into kept and released ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhood {
    /// Pairs forced by the oracle's global bounds.
    pub forced: Vec<(CourseId, ProfessorId)>,
    /// Removable pairs that stay fixed in the sub-problem.
    pub kept: Vec<(CourseId, ProfessorId)>,
    /// Removable pairs released for re-optimisation.
    pub freed: Vec<(CourseId, ProfessorId)>,
}

/// Why a neighborhood produced no improvement.
#[derive(Debug, Clone, PartialEq)]
pub enum NoImprovement {
    EmptyNeighborhood,
    Infeasible,
    NoSolution,
    /// The oracle's values do not form a complete, capacity-feasible assignment.
    Rejected,
    NotBetter { objective: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LnsOutcome {
    Improved { assignment: Assignment, objective: f64 },
    NoImprovement(NoImprovement),
}

/// Number of candidates to release: `round(fraction * candidates)`, at least one when the
/// fraction is positive and at most `candidates - 1` so the sub-problem stays strictly smaller.
/// A single candidate is never released.
pub fn freed_count(candidates: usize, fraction: f64) -> usize {
    if candidates < 2 || fraction <= 0.0 {
        return 0;
    }
    ((fraction * candidates as f64).round() as usize).clamp(1, candidates - 1)
}

/// Selects the pairs of `incumbent` to release.
pub fn destroy(
    instance: &Instance,
    bounds: &PairBounds,
    incumbent: &Assignment,
    fraction: f64,
    order: CandidateOrder,
) -> Neighborhood {
    let (forced, removable): (Vec<_>, Vec<_>) =
        incumbent.pairs().partition(|(c, p)| bounds.is_forced(*c, *p));

    let averages: Vec<f64> = instance
        .professors()
        .iter()
        .map(|p| p.average_preference_weight())
        .collect();
    let ordered: Vec<(CourseId, ProfessorId)> = removable
        .into_iter()
        .sorted_by(|a, b| {
            let by_weight = match order {
                CandidateOrder::Ascending => averages[a.1].total_cmp(&averages[b.1]),
                CandidateOrder::Descending => averages[b.1].total_cmp(&averages[a.1]),
            };
            by_weight.then(a.0.cmp(&b.0))
        })
        .collect();

    let n = freed_count(ordered.len(), fraction);
    let (freed, kept) = ordered.split_at(n);
    Neighborhood {
        forced,
        kept: kept.to_vec(),
        freed: freed.to_vec(),
    }
}

/// Sub-problem with the forced and kept pairs fixed, the global forbidden pairs kept out and
/// everything else free.
pub fn sub_problem(
    bounds: &PairBounds,
    neighborhood: &Neighborhood,
    limits: SearchLimits,
    cutoff: f64,
) -> SubProblem {
    let mut sub_bounds = bounds.clone();
    for (c, p) in neighborhood.forced.iter().chain(&neighborhood.kept) {
        sub_bounds.set(*c, *p, PairBound::ForcedTrue);
    }
    SubProblem {
        bounds: sub_bounds,
        limits,
        cutoff: Some(cutoff),
    }
}

/// Reads a complete assignment back from the oracle's pair values, taking a pair as selected
/// above 0.5. Returns `None` unless the values cover exactly the instance's pairs and every
/// course has exactly one selected professor.
pub fn translate(instance: &Instance, values: &PairValues) -> Option<Assignment> {
    if values.num_professors() != instance.num_professors()
        || values.num_courses() != instance.num_courses()
    {
        return None;
    }
    Assignment::from_pairs(instance.num_courses(), values.selected_pairs())
}

/// Tries to improve `incumbent` by re-optimising one neighborhood through `oracle`.
///
/// Returns an improvement only when the re-optimised assignment is complete, respects both
/// semester capacities and beats the incumbent's objective by more than the tolerance.
pub fn improve<O>(
    oracle: &mut O,
    instance: &Instance,
    bounds: &PairBounds,
    incumbent: &Assignment,
    config: &LnsConfig,
    order: CandidateOrder,
) -> Result<LnsOutcome, OracleError>
where
    O: Oracle + ?Sized,
{
    let incumbent_objective = oracle.objective(instance, incumbent);
    let neighborhood = destroy(instance, bounds, incumbent, config.destroy_fraction, order);
    if neighborhood.freed.is_empty() {
        debug!("LNS: nothing to release");
        return Ok(LnsOutcome::NoImprovement(NoImprovement::EmptyNeighborhood));
    }
    debug!(
        "LNS: releasing {} of {} removable assignment(s) ({} forced), incumbent {}",
        neighborhood.freed.len(),
        neighborhood.freed.len() + neighborhood.kept.len(),
        neighborhood.forced.len(),
        incumbent_objective
    );

    let limits = SearchLimits {
        time_limit: config.time_limit(),
        node_limit: config.node_limit,
    };
    let problem = sub_problem(bounds, &neighborhood, limits, incumbent_objective + config.tolerance);

    let values = match oracle.solve(instance, &problem)? {
        SubProblemOutcome::Solved { values, .. } => values,
        SubProblemOutcome::Infeasible => {
            debug!("LNS: neighborhood infeasible, abandoned");
            return Ok(LnsOutcome::NoImprovement(NoImprovement::Infeasible));
        }
        SubProblemOutcome::NoSolution => {
            debug!("LNS: no solution within budget");
            return Ok(LnsOutcome::NoImprovement(NoImprovement::NoSolution));
        }
    };

    let Some(candidate) = translate(instance, &values) else {
        debug!("LNS: oracle values do not form a complete assignment");
        return Ok(LnsOutcome::NoImprovement(NoImprovement::Rejected));
    };
    if !WorkloadLedger::from_assignment(instance, &candidate).within_capacity(instance) {
        debug!("LNS: oracle solution exceeds a semester capacity");
        return Ok(LnsOutcome::NoImprovement(NoImprovement::Rejected));
    }
    let objective = oracle.objective(instance, &candidate);
    if objective > incumbent_objective + config.tolerance {
        debug!("LNS: improved {} -> {}", incumbent_objective, objective);
        Ok(LnsOutcome::Improved {
            assignment: candidate,
            objective,
        })
    } else {
        Ok(LnsOutcome::NoImprovement(NoImprovement::NotBetter { objective }))
    }
}
