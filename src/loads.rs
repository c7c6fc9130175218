use crate::data::{Assignment, Course, Instance, ProfessorId, Semester, UnmetMinimum, Workload};
use serde::Serialize;

/// Per-professor workload currently assigned in each semester.
///
/// Owned by exactly one trial (or one LNS check) at a time; reset rather than reallocated
/// between trials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadLedger {
    first: Vec<Workload>,
    second: Vec<Workload>,
}

impl WorkloadLedger {
    pub fn new(num_professors: usize) -> Self {
        WorkloadLedger {
            first: vec![0; num_professors],
            second: vec![0; num_professors],
        }
    }

    /// Ledger of the loads induced by a complete assignment.
    pub fn from_assignment(instance: &Instance, assignment: &Assignment) -> Self {
        let mut ledger = WorkloadLedger::new(instance.num_professors());
        for (c, p) in assignment.pairs() {
            ledger.add(p, instance.course(c));
        }
        ledger
    }

    pub fn reset(&mut self) {
        self.first.iter_mut().for_each(|w| *w = 0);
        self.second.iter_mut().for_each(|w| *w = 0);
    }

    #[inline]
    pub fn load(&self, professor: ProfessorId, semester: Semester) -> Workload {
        match semester {
            Semester::First => self.first[professor],
            Semester::Second => self.second[professor],
        }
    }

    #[inline]
    pub fn total(&self, professor: ProfessorId) -> Workload {
        self.first[professor] + self.second[professor]
    }

    /// Whether `professor` has semester capacity left for `course`.
    #[inline]
    pub fn fits(&self, instance: &Instance, professor: ProfessorId, course: &Course) -> bool {
        let max = instance.professor(professor).max_workload(course.semester);
        self.load(professor, course.semester) + course.workload <= max
    }

    #[inline]
    pub fn add(&mut self, professor: ProfessorId, course: &Course) {
        *self.slot(professor, course.semester) += course.workload;
    }

    #[inline]
    pub fn remove(&mut self, professor: ProfessorId, course: &Course) {
        let slot = self.slot(professor, course.semester);
        *slot = slot.saturating_sub(course.workload);
    }

    fn slot(&mut self, professor: ProfessorId, semester: Semester) -> &mut Workload {
        match semester {
            Semester::First => &mut self.first[professor],
            Semester::Second => &mut self.second[professor],
        }
    }

    #[inline]
    pub fn below_minimum(&self, instance: &Instance, professor: ProfessorId) -> bool {
        self.total(professor) < instance.professor(professor).min_workload
    }

    /// Number of professors whose annual total is below their minimum.
    pub fn count_unmet_minimums(&self, instance: &Instance) -> usize {
        (0..instance.num_professors())
            .filter(|p| self.below_minimum(instance, *p))
            .count()
    }

    pub fn unmet_minimums(&self, instance: &Instance) -> Vec<UnmetMinimum> {
        instance
            .professors()
            .iter()
            .filter(|p| self.below_minimum(instance, p.id))
            .map(|p| UnmetMinimum {
                professor_id: p.id,
                name: p.name.clone(),
                assigned: self.total(p.id),
                minimum: p.min_workload,
            })
            .collect()
    }

    /// Whether every professor is within both semester maximums.
    pub fn within_capacity(&self, instance: &Instance) -> bool {
        instance.professors().iter().all(|p| {
            self.first[p.id] <= p.max_workload_first && self.second[p.id] <= p.max_workload_second
        })
    }

    pub fn summary(&self, instance: &Instance) -> Vec<ProfessorLoad> {
        instance
            .professors()
            .iter()
            .map(|p| ProfessorLoad {
                professor_id: p.id,
                first_semester: self.first[p.id],
                second_semester: self.second[p.id],
                minimum: p.min_workload,
            })
            .collect()
    }
}

/// Reported workload of one professor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessorLoad {
    pub professor_id: ProfessorId,
    pub first_semester: Workload,
    pub second_semester: Workload,
    pub minimum: Workload,
}
