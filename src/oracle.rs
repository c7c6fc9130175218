//! Boundary with the external integer-programming oracle.
//!
//! The oracle owns the exact search. The heuristics only see two things from it: the global
//! bound of every (course, professor) pair, and the ability to solve a bounded sub-problem.

use crate::data::{Assignment, CourseId, Instance, PairRef, ProfessorId};
use crate::error::{InstanceError, OracleError};
use crate::objective;
use std::time::Duration;

/// Global bound the oracle reports for one (course, professor) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PairBound {
    #[default]
    Free,
    ForcedTrue,
    ForcedFalse,
}

/// Dense (course x professor) matrix of pair bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairBounds {
    num_professors: usize,
    bounds: Vec<PairBound>,
}

impl PairBounds {
    /// All pairs free.
    pub fn free(instance: &Instance) -> Self {
        PairBounds {
            num_professors: instance.num_professors(),
            bounds: vec![PairBound::Free; instance.num_courses() * instance.num_professors()],
        }
    }

    /// Builds bounds from explicit forced and forbidden pair lists, rejecting unknown pairs,
    /// pairs listed as both, and courses forced onto two professors.
    pub fn from_lists(
        instance: &Instance,
        forced: &[PairRef],
        forbidden: &[PairRef],
    ) -> Result<Self, InstanceError> {
        let mut bounds = PairBounds::free(instance);
        for pair in forbidden {
            bounds.check(instance, pair)?;
            bounds.set(pair.course_id, pair.professor_id, PairBound::ForcedFalse);
        }
        for pair in forced {
            bounds.check(instance, pair)?;
            let clash = bounds.get(pair.course_id, pair.professor_id) == PairBound::ForcedFalse
                || bounds.forced_owner(pair.course_id).is_some();
            if clash {
                return Err(InstanceError::ConflictingBounds {
                    course: pair.course_id,
                    professor: pair.professor_id,
                });
            }
            bounds.set(pair.course_id, pair.professor_id, PairBound::ForcedTrue);
        }
        Ok(bounds)
    }

    fn check(&self, instance: &Instance, pair: &PairRef) -> Result<(), InstanceError> {
        if pair.course_id >= instance.num_courses() || pair.professor_id >= self.num_professors
        {
            return Err(InstanceError::UnknownPair {
                course: pair.course_id,
                professor: pair.professor_id,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, course: CourseId, professor: ProfessorId) -> PairBound {
        self.bounds[course * self.num_professors + professor]
    }

    #[inline]
    pub fn set(&mut self, course: CourseId, professor: ProfessorId, bound: PairBound) {
        self.bounds[course * self.num_professors + professor] = bound;
    }

    #[inline]
    pub fn is_forbidden(&self, course: CourseId, professor: ProfessorId) -> bool {
        self.get(course, professor) == PairBound::ForcedFalse
    }

    #[inline]
    pub fn is_forced(&self, course: CourseId, professor: ProfessorId) -> bool {
        self.get(course, professor) == PairBound::ForcedTrue
    }

    /// Professor the course is forced onto, if any.
    pub fn forced_owner(&self, course: CourseId) -> Option<ProfessorId> {
        (0..self.num_professors).find(|p| self.is_forced(course, *p))
    }

    pub fn forced_pairs(&self) -> impl Iterator<Item = (CourseId, ProfessorId)> + '_ {
        self.bounds
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == PairBound::ForcedTrue)
            .map(|(idx, _)| (idx / self.num_professors, idx % self.num_professors))
    }
}

/// Budget handed to the oracle for one sub-problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub time_limit: Duration,
    pub node_limit: Option<u32>,
}

/// A bounded problem the oracle is asked to solve: pair bounds, a search budget, and an optional
/// objective value the solution must reach.
#[derive(Debug, Clone, PartialEq)]
pub struct SubProblem {
    pub bounds: PairBounds,
    pub limits: SearchLimits,
    pub cutoff: Option<f64>,
}

/// Per-pair variable values returned by the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct PairValues {
    num_professors: usize,
    values: Vec<f64>,
}

impl PairValues {
    pub fn zeros(num_courses: usize, num_professors: usize) -> Self {
        PairValues {
            num_professors,
            values: vec![0.0; num_courses * num_professors],
        }
    }

    pub fn from_assignment(assignment: &Assignment, num_professors: usize) -> Self {
        let mut values = PairValues::zeros(assignment.len(), num_professors);
        for (course, professor) in assignment.pairs() {
            values.set(course, professor, 1.0);
        }
        values
    }

    #[inline]
    pub fn get(&self, course: CourseId, professor: ProfessorId) -> f64 {
        self.values[course * self.num_professors + professor]
    }

    #[inline]
    pub fn set(&mut self, course: CourseId, professor: ProfessorId, value: f64) {
        self.values[course * self.num_professors + professor] = value;
    }

    /// Pairs whose value rounds to 1.
    pub fn selected_pairs(&self) -> impl Iterator<Item = (CourseId, ProfessorId)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0.5)
            .map(|(idx, _)| (idx / self.num_professors, idx % self.num_professors))
    }

    #[inline]
    pub fn num_professors(&self) -> usize {
        self.num_professors
    }

    #[inline]
    pub fn num_courses(&self) -> usize {
        if self.num_professors == 0 {
            0
        } else {
            self.values.len() / self.num_professors
        }
    }
}

/// What the oracle found for a sub-problem within its budget.
#[derive(Debug, Clone, PartialEq)]
pub enum SubProblemOutcome {
    Solved { values: PairValues, objective: f64 },
    Infeasible,
    /// Budget exhausted without a feasible point.
    NoSolution,
}

/// The external integer-programming solver the heuristics report to and delegate to.
pub trait Oracle {
    /// Solves a bounded sub-problem synchronously, honouring its limits.
    fn solve(
        &mut self,
        instance: &Instance,
        problem: &SubProblem,
    ) -> Result<SubProblemOutcome, OracleError>;

    /// Objective value of a complete assignment.
    fn objective(&self, instance: &Instance, assignment: &Assignment) -> f64 {
        objective::evaluate(instance, assignment)
    }
}
