//! Randomised greedy construction of one complete assignment.
//!
//! Courses are covered scarcest first: after every assignment the scoring graph is rebuilt and
//! the uncovered course with the lowest remaining degree is handled next. Its candidates are the
//! professors holding a scored edge to it and semester capacity for it; one of them is drawn
//! uniformly from the restricted candidate list. Courses without candidates are deferred to a
//! capacity-only fallback at the end of the pass.

use crate::data::{Assignment, CourseId, Instance, ProfessorId};
use crate::error::ConstructionError;
use crate::loads::WorkloadLedger;
use crate::oracle::PairBounds;
use crate::scoring::ScoringGraph;
use itertools::Itertools;
use log::trace;
use rand::Rng;
use rand::seq::SliceRandom;

/// Professor able to take the course at hand, with their current edge score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub professor: ProfessorId,
    pub score: i64,
}

/// Fills `rcl` with the positions of every candidate scoring at least
/// `min + alpha * (max - min)`.
///
/// `alpha = 1` keeps only the best-scoring candidates, `alpha = 0` keeps all of them.
pub fn restricted_candidate_list(candidates: &[Candidate], alpha: f64, rcl: &mut Vec<usize>) {
    rcl.clear();
    let Some((min, max)) = candidates.iter().map(|c| c.score).minmax().into_option() else {
        return;
    };
    let threshold = min as f64 + alpha * (max - min) as f64;
    rcl.extend(
        candidates
            .iter()
            .positions(|c| c.score as f64 >= threshold),
    );
    if rcl.is_empty() {
        // rounding on the threshold can only exclude the maximum itself
        rcl.extend(candidates.iter().positions(|c| c.score == max));
    }
}

/// Builds complete assignments for one instance. Owns the scoring graph and all scratch buffers
/// so repeated trials reuse them.
pub struct GraspConstructor<'a> {
    instance: &'a Instance,
    bounds: &'a PairBounds,
    graph: ScoringGraph,
    owners: Vec<Option<ProfessorId>>,
    covered: Vec<bool>,
    deferred: Vec<bool>,
    fallback: Vec<CourseId>,
    candidates: Vec<Candidate>,
    rcl: Vec<usize>,
}

impl<'a> GraspConstructor<'a> {
    pub fn new(instance: &'a Instance, bounds: &'a PairBounds) -> Self {
        let m = instance.num_courses();
        GraspConstructor {
            instance,
            bounds,
            graph: ScoringGraph::new(instance, crate::scoring::DEFAULT_AMPLIFICATION),
            owners: vec![None; m],
            covered: vec![false; m],
            deferred: vec![false; m],
            fallback: Vec::with_capacity(m),
            candidates: Vec::with_capacity(instance.num_professors()),
            rcl: Vec::with_capacity(instance.num_professors()),
        }
    }

    /// Runs one construction. `loads` is reset first and, on success, holds the loads of the
    /// returned assignment.
    pub fn construct<R>(
        &mut self,
        alpha: f64,
        amplification: f64,
        loads: &mut WorkloadLedger,
        rng: &mut R,
    ) -> Result<Assignment, ConstructionError>
    where
        R: Rng + ?Sized,
    {
        self.graph.set_amplification(amplification);
        loads.reset();
        self.owners.iter_mut().for_each(|o| *o = None);
        self.covered.iter_mut().for_each(|c| *c = false);

        // a forced course that does not fit cannot go anywhere else either
        let forced: Vec<_> = self.bounds.forced_pairs().collect();
        let mut overloaded = Vec::new();
        for (c, p) in forced {
            if loads.fits(self.instance, p, self.instance.course(c)) {
                self.assign(c, p, loads);
            } else {
                trace!("Forced course {} exceeds the capacity of professor {}", c, p);
                overloaded.push(c);
            }
        }
        if !overloaded.is_empty() {
            return Err(ConstructionError::new(overloaded));
        }

        while self.covered.iter().any(|c| !c) {
            let mut progress = self.greedy_pass(alpha, loads, rng);
            progress |= self.fallback_pass(loads);
            if !progress {
                break;
            }
        }

        let uncovered: Vec<CourseId> = self.covered.iter().positions(|c| !c).collect();
        if !uncovered.is_empty() {
            return Err(ConstructionError::new(uncovered));
        }
        Ok(Assignment::from_owners(self.owners.iter().flatten().copied().collect()))
    }

    /// One pass over the uncovered courses. Returns whether anything was assigned.
    fn greedy_pass<R>(&mut self, alpha: f64, loads: &mut WorkloadLedger, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        self.deferred.iter_mut().for_each(|d| *d = false);
        self.fallback.clear();
        let mut progress = false;
        let mut stale = true;

        loop {
            if stale {
                self.graph
                    .recompute(self.instance, self.bounds, &self.covered);
                stale = false;
            }
            let Some(course_id) = self.scarcest_open_course() else {
                break;
            };
            let course = self.instance.course(course_id);

            self.candidates.clear();
            for p in 0..self.instance.num_professors() {
                if let Some(score) = self.graph.score(p, course_id) {
                    if loads.fits(self.instance, p, course) {
                        self.candidates.push(Candidate {
                            professor: p,
                            score,
                        });
                    }
                }
            }

            restricted_candidate_list(&self.candidates, alpha, &mut self.rcl);
            match self.rcl.choose(rng) {
                Some(&idx) => {
                    let chosen = self.candidates[idx];
                    trace!(
                        "Course {} -> professor {} (score {}, {} candidates, rcl {})",
                        course_id,
                        chosen.professor,
                        chosen.score,
                        self.candidates.len(),
                        self.rcl.len()
                    );
                    self.assign(course_id, chosen.professor, loads);
                    progress = true;
                    stale = true;
                }
                None => {
                    trace!("Course {} has no candidate, deferring", course_id);
                    self.deferred[course_id] = true;
                    self.fallback.push(course_id);
                }
            }
        }
        progress
    }

    /// Places deferred courses on the first professor, in id order, with semester capacity.
    fn fallback_pass(&mut self, loads: &mut WorkloadLedger) -> bool {
        let mut progress = false;
        for i in 0..self.fallback.len() {
            let course_id = self.fallback[i];
            let course = self.instance.course(course_id);
            let professor = (0..self.instance.num_professors()).find(|p| {
                !self.bounds.is_forbidden(course_id, *p) && loads.fits(self.instance, *p, course)
            });
            if let Some(p) = professor {
                trace!("Fallback: course {} -> professor {}", course_id, p);
                self.assign(course_id, p, loads);
                progress = true;
            }
        }
        self.fallback.clear();
        progress
    }

    /// Uncovered, not yet deferred course with the lowest remaining degree (lowest id on ties).
    fn scarcest_open_course(&self) -> Option<CourseId> {
        (0..self.instance.num_courses())
            .filter(|c| !self.covered[*c] && !self.deferred[*c])
            .min_by_key(|c| (self.graph.course_degree(*c), *c))
    }

    fn assign(&mut self, course: CourseId, professor: ProfessorId, loads: &mut WorkloadLedger) {
        loads.add(professor, self.instance.course(course));
        self.owners[course] = Some(professor);
        self.covered[course] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::PairBound;
    use crate::testing::{course, department_instance, professor, three_course_instance};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn construct_with(
        instance: &Instance,
        bounds: &PairBounds,
        alpha: f64,
        seed: u64,
    ) -> Result<Assignment, ConstructionError> {
        let mut constructor = GraspConstructor::new(instance, bounds);
        let mut loads = WorkloadLedger::new(instance.num_professors());
        let mut rng = SmallRng::seed_from_u64(seed);
        constructor.construct(alpha, 5.0, &mut loads, &mut rng)
    }

    #[test]
    fn test_rcl_boundaries() {
        let candidates = [
            Candidate { professor: 0, score: 3 },
            Candidate { professor: 1, score: 7 },
            Candidate { professor: 2, score: 5 },
        ];
        let mut rcl = Vec::new();
        restricted_candidate_list(&candidates, 1.0, &mut rcl);
        assert_eq!(rcl, vec![1]);
        restricted_candidate_list(&candidates, 0.0, &mut rcl);
        assert_eq!(rcl, vec![0, 1, 2]);
        restricted_candidate_list(&candidates, 0.5, &mut rcl);
        assert_eq!(rcl, vec![1, 2]);
        restricted_candidate_list(&[], 0.5, &mut rcl);
        assert!(rcl.is_empty());
    }

    #[test]
    fn test_three_course_example() {
        let instance = three_course_instance();
        let bounds = PairBounds::free(&instance);
        for seed in 0..20 {
            let assignment = construct_with(&instance, &bounds, 0.0, seed).unwrap();
            assert_eq!(assignment.owners(), &[0, 0, 1]);
        }
    }

    #[test]
    fn test_scarce_courses_are_covered_first() {
        // course 1 can only go to professor 0, who has room for a single course
        let instance = Instance::new(
            vec![course(0, 4, 1), course(1, 4, 1)],
            vec![
                professor(0, 0, 4, 0, &[1.0, 1.0]),
                professor(1, 0, 4, 0, &[1.0, 0.0]),
            ],
        )
        .unwrap();
        let bounds = PairBounds::free(&instance);
        for seed in 0..20 {
            let assignment = construct_with(&instance, &bounds, 0.0, seed).unwrap();
            assert_eq!(assignment.owners(), &[1, 0]);
        }
    }

    #[test]
    fn test_fallback_ignores_eligibility_but_not_capacity() {
        // nobody is eligible for course 1; professor 0 is full after course 0
        let instance = Instance::new(
            vec![course(0, 4, 1), course(1, 2, 1)],
            vec![
                professor(0, 0, 4, 0, &[1.0, 0.0]),
                professor(1, 0, 4, 0, &[0.0, 0.0]),
            ],
        )
        .unwrap();
        let bounds = PairBounds::free(&instance);
        let assignment = construct_with(&instance, &bounds, 1.0, 3).unwrap();
        assert_eq!(assignment.owners(), &[0, 1]);
    }

    #[test]
    fn test_fallback_honours_forbidden_pairs() {
        let instance = Instance::new(
            vec![course(0, 2, 1)],
            vec![
                professor(0, 0, 4, 0, &[0.0]),
                professor(1, 0, 4, 0, &[0.0]),
            ],
        )
        .unwrap();
        let mut bounds = PairBounds::free(&instance);
        bounds.set(0, 0, PairBound::ForcedFalse);
        let assignment = construct_with(&instance, &bounds, 1.0, 0).unwrap();
        assert_eq!(assignment.owners(), &[1]);
    }

    #[test]
    fn test_partial_construction_is_reported() {
        let instance = Instance::new(
            vec![course(0, 4, 1), course(1, 4, 1), course(2, 4, 2)],
            vec![professor(0, 0, 4, 4, &[1.0, 1.0, 1.0])],
        )
        .unwrap();
        let bounds = PairBounds::free(&instance);
        let err = construct_with(&instance, &bounds, 0.9, 1).unwrap_err();
        assert_eq!(err.uncovered().len(), 1);
        assert!(err.uncovered()[0] < 2);
    }

    #[test]
    fn test_constructions_respect_capacity() {
        let instance = department_instance();
        let bounds = PairBounds::free(&instance);
        let mut constructor = GraspConstructor::new(&instance, &bounds);
        let mut loads = WorkloadLedger::new(instance.num_professors());
        let mut rng = SmallRng::seed_from_u64(99);
        for trial in 0..25 {
            let alpha = (trial % 5) as f64 / 4.0;
            let assignment = constructor
                .construct(alpha, trial as f64, &mut loads, &mut rng)
                .unwrap();
            assert_eq!(assignment.len(), instance.num_courses());
            assert_eq!(loads, WorkloadLedger::from_assignment(&instance, &assignment));
            assert!(loads.within_capacity(&instance));
        }
    }

    #[test]
    fn test_same_seed_same_assignment() {
        let instance = department_instance();
        let bounds = PairBounds::free(&instance);
        let first = construct_with(&instance, &bounds, 0.3, 42).unwrap();
        let second = construct_with(&instance, &bounds, 0.3, 42).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_forced_pairs_are_kept() {
        let instance = department_instance();
        let mut bounds = PairBounds::free(&instance);
        bounds.set(0, 3, PairBound::ForcedTrue);
        bounds.set(5, 2, PairBound::ForcedTrue);
        for seed in 0..5 {
            let assignment = construct_with(&instance, &bounds, 0.5, seed).unwrap();
            assert_eq!(assignment.owner(0), 3);
            assert_eq!(assignment.owner(5), 2);
            let loads = WorkloadLedger::from_assignment(&instance, &assignment);
            assert!(loads.within_capacity(&instance));
        }
    }

    #[test]
    fn test_forced_pairs_beyond_capacity_fail_the_trial() {
        let instance = Instance::new(
            vec![course(0, 4, 1), course(1, 4, 1), course(2, 2, 2)],
            vec![
                professor(0, 0, 4, 4, &[1.0, 1.0, 1.0]),
                professor(1, 0, 8, 8, &[1.0, 1.0, 1.0]),
            ],
        )
        .unwrap();
        let mut bounds = PairBounds::free(&instance);
        bounds.set(0, 0, PairBound::ForcedTrue);
        bounds.set(1, 0, PairBound::ForcedTrue);
        let err = construct_with(&instance, &bounds, 0.5, 1).unwrap_err();
        assert_eq!(err.uncovered(), &[1]);
    }
}
