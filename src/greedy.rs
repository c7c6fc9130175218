//! Deterministic preference-first construction.
//!
//! Professors are visited by descending average preference weight. Each takes their most
//! preferred open courses that fit until their minimum workload is reached. Whatever is left is
//! completed course by course, still in professor order, and the result goes through the same
//! load repair as a GRASP trial.

use crate::data::{Assignment, CourseId, Instance, ProfessorId};
use crate::error::ConstructionError;
use crate::loads::WorkloadLedger;
use crate::objective;
use crate::oracle::PairBounds;
use crate::repair::{self, RepairReport};
use itertools::Itertools;
use log::{debug, trace};

/// A repaired greedy construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GreedyOutcome {
    pub assignment: Assignment,
    pub loads: WorkloadLedger,
    pub unmet_minimums: usize,
    pub objective: f64,
    pub repair: RepairReport,
}

/// Professors by descending average preference weight, lowest id first on ties.
pub fn professor_order(instance: &Instance) -> Vec<ProfessorId> {
    instance
        .professors()
        .iter()
        .sorted_by(|a, b| {
            b.average_preference_weight()
                .total_cmp(&a.average_preference_weight())
                .then(a.id.cmp(&b.id))
        })
        .map(|p| p.id)
        .collect()
}

/// Builds one assignment without randomness. `loads` is reset first and, on success, holds the
/// loads of the returned assignment.
pub fn construct(
    instance: &Instance,
    bounds: &PairBounds,
    loads: &mut WorkloadLedger,
) -> Result<Assignment, ConstructionError> {
    loads.reset();
    let mut owners: Vec<Option<ProfessorId>> = vec![None; instance.num_courses()];

    let mut overloaded = Vec::new();
    for (c, p) in bounds.forced_pairs() {
        let course = instance.course(c);
        if loads.fits(instance, p, course) {
            loads.add(p, course);
            owners[c] = Some(p);
        } else {
            overloaded.push(c);
        }
    }
    if !overloaded.is_empty() {
        return Err(ConstructionError::new(overloaded));
    }

    let order = professor_order(instance);
    let open = |owners: &[Option<ProfessorId>], c: CourseId, p: ProfessorId| {
        owners[c].is_none() && !bounds.is_forbidden(c, p)
    };

    // preferred courses up to each minimum
    for &p in &order {
        let professor = instance.professor(p);
        let preferred = instance
            .courses()
            .iter()
            .filter(|c| professor.preference(c.id) > 0.0)
            .sorted_by(|a, b| {
                professor
                    .preference(b.id)
                    .total_cmp(&professor.preference(a.id))
                    .then(a.id.cmp(&b.id))
            });
        for course in preferred {
            if loads.total(p) >= professor.min_workload {
                break;
            }
            if open(&owners, course.id, p) && loads.fits(instance, p, course) {
                trace!("Greedy: course {} -> professor {}", course.id, p);
                loads.add(p, course);
                owners[course.id] = Some(p);
            }
        }
    }

    // completion: professors still below minimum, then any eligible one, then capacity alone
    for course in instance.courses() {
        if owners[course.id].is_some() {
            continue;
        }
        let fits = |p: &ProfessorId| open(&owners, course.id, *p) && loads.fits(instance, *p, course);
        let eligible = |p: &ProfessorId| instance.professor(*p).is_eligible(course);
        let chosen = order
            .iter()
            .copied()
            .find(|p| fits(p) && eligible(p) && loads.below_minimum(instance, *p))
            .or_else(|| order.iter().copied().find(|p| fits(p) && eligible(p)))
            .or_else(|| order.iter().copied().find(|p| fits(p)));
        if let Some(p) = chosen {
            trace!("Greedy completion: course {} -> professor {}", course.id, p);
            loads.add(p, course);
            owners[course.id] = Some(p);
        }
    }

    let uncovered: Vec<CourseId> = owners.iter().positions(|o| o.is_none()).collect();
    if !uncovered.is_empty() {
        return Err(ConstructionError::new(uncovered));
    }
    Ok(Assignment::from_owners(owners.into_iter().flatten().collect()))
}

/// Greedy construction followed by load repair.
pub fn run(instance: &Instance, bounds: &PairBounds) -> Result<GreedyOutcome, ConstructionError> {
    let mut loads = WorkloadLedger::new(instance.num_professors());
    let mut assignment = construct(instance, bounds, &mut loads)?;
    let report = repair::repair(instance, bounds, &mut assignment, &mut loads);
    let outcome = GreedyOutcome {
        objective: objective::evaluate(instance, &assignment),
        unmet_minimums: report.unmet_after,
        assignment,
        loads,
        repair: report,
    };
    debug!(
        "Greedy construction: {} unmet minimum(s) ({} repair moves), objective {}",
        outcome.unmet_minimums, report.moves, outcome.objective
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::PairBound;
    use crate::testing::{WithAreas, course, department_instance, professor, three_course_instance};

    #[test]
    fn test_professor_order_by_average_weight() {
        let instance = Instance::new(
            vec![course(0, 2, 1), course(1, 2, 1)],
            vec![
                professor(0, 0, 4, 4, &[1.0, 0.0]),
                professor(1, 0, 4, 4, &[3.0, 5.0]),
                professor(2, 0, 4, 4, &[1.0, 1.0]),
            ],
        )
        .unwrap();
        assert_eq!(professor_order(&instance), vec![1, 0, 2]);
    }

    #[test]
    fn test_three_course_example() {
        let instance = three_course_instance();
        let bounds = PairBounds::free(&instance);
        let outcome = run(&instance, &bounds).unwrap();
        assert_eq!(outcome.assignment.owners(), &[0, 0, 1]);
        assert_eq!(outcome.unmet_minimums, 0);
    }

    #[test]
    fn test_preferred_courses_fill_minimums_first() {
        // professor 1 has the higher average and takes its favourite course 2 first
        let instance = Instance::new(
            vec![
                course(0, 2, 1).with_areas(1),
                course(1, 2, 1).with_areas(1),
                course(2, 2, 1).with_areas(1),
            ],
            vec![
                professor(0, 2, 4, 0, &[2.0, 2.0, 2.0]).with_areas(1),
                professor(1, 2, 4, 0, &[0.0, 1.0, 9.0]).with_areas(1),
            ],
        )
        .unwrap();
        let bounds = PairBounds::free(&instance);
        let mut loads = WorkloadLedger::new(2);
        let assignment = construct(&instance, &bounds, &mut loads).unwrap();
        // professor 0 stops at its minimum with course 0; course 1 completes onto professor 1
        assert_eq!(assignment.owners(), &[0, 1, 1]);
        assert_eq!(loads, WorkloadLedger::from_assignment(&instance, &assignment));
    }

    #[test]
    fn test_forbidden_and_forced_pairs_are_honoured() {
        let instance = department_instance();
        let mut bounds = PairBounds::free(&instance);
        bounds.set(0, 3, PairBound::ForcedTrue);
        for p in 0..4 {
            if p != 2 {
                bounds.set(7, p, PairBound::ForcedFalse);
            }
        }
        let outcome = run(&instance, &bounds).unwrap();
        assert_eq!(outcome.assignment.owner(0), 3);
        assert_eq!(outcome.assignment.owner(7), 2);
        assert!(outcome.loads.within_capacity(&instance));
    }

    #[test]
    fn test_forced_pairs_beyond_capacity_fail() {
        let instance = Instance::new(
            vec![course(0, 4, 1), course(1, 4, 1)],
            vec![
                professor(0, 0, 4, 0, &[1.0, 1.0]),
                professor(1, 0, 8, 0, &[1.0, 1.0]),
            ],
        )
        .unwrap();
        let mut bounds = PairBounds::free(&instance);
        bounds.set(0, 0, PairBound::ForcedTrue);
        bounds.set(1, 0, PairBound::ForcedTrue);
        let err = run(&instance, &bounds).unwrap_err();
        assert_eq!(err.uncovered(), &[1]);
    }

    #[test]
    fn test_department_instance_is_feasible_and_stable() {
        let instance = department_instance();
        let bounds = PairBounds::free(&instance);
        let first = run(&instance, &bounds).unwrap();
        let second = run(&instance, &bounds).unwrap();
        assert_eq!(first, second);
        assert!(first.loads.within_capacity(&instance));
        assert_eq!(
            first.loads,
            WorkloadLedger::from_assignment(&instance, &first.assignment)
        );
    }
}
