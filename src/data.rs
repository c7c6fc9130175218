use crate::error::InstanceError;
use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for clarity
pub type CourseId = usize;
pub type ProfessorId = usize;
pub type Workload = u32;
pub type AreaMask = u32;

/// Base weight used for a pair that is eligible only through a shared expertise area.
pub const AREA_ONLY_WEIGHT: f64 = 1.0;

/// Half of the academic year a course is taught in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Semester {
    First,
    Second,
}

impl TryFrom<u8> for Semester {
    type Error = InstanceError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Semester::First),
            2 => Ok(Semester::Second),
            other => Err(InstanceError::InvalidSemester(other)),
        }
    }
}

impl From<Semester> for u8 {
    fn from(semester: Semester) -> Self {
        match semester {
            Semester::First => 1,
            Semester::Second => 2,
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "semester {}", u8::from(*self))
    }
}

/// A course (class) that must be taught by exactly one professor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub subject: String,
    pub workload: Workload,
    pub semester: Semester,
    #[serde(default)]
    pub areas: AreaMask,
}

/// A professor with workload limits, expertise areas and stated preferences.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    pub id: ProfessorId,
    pub name: String,
    pub min_workload: Workload,
    pub max_workload_first: Workload,
    pub max_workload_second: Workload,
    #[serde(default)]
    pub areas: AreaMask,
    /// Preference weight per course id, 0 meaning no stated preference.
    pub preferences: Vec<f64>,
}

impl Professor {
    #[inline]
    pub fn max_workload(&self, semester: Semester) -> Workload {
        match semester {
            Semester::First => self.max_workload_first,
            Semester::Second => self.max_workload_second,
        }
    }

    #[inline]
    pub fn preference(&self, course: CourseId) -> f64 {
        self.preferences.get(course).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn shares_area(&self, course: &Course) -> bool {
        self.areas & course.areas != 0
    }

    /// Weight the scoring graph starts from, or `None` if the professor may not teach the course.
    pub fn base_weight(&self, course: &Course) -> Option<f64> {
        let weight = self.preference(course.id);
        if weight > 0.0 {
            Some(weight)
        } else if self.shares_area(course) {
            Some(AREA_ONLY_WEIGHT)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_eligible(&self, course: &Course) -> bool {
        self.base_weight(course).is_some()
    }

    /// Mean of the stated (non-zero) preference weights.
    pub fn average_preference_weight(&self) -> f64 {
        let (sum, count) = self
            .preferences
            .iter()
            .filter(|w| **w > 0.0)
            .fold((0.0, 0usize), |(sum, count), w| (sum + w, count + 1));
        if count == 0 { 0.0 } else { sum / count as f64 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInstance {
    courses: Vec<Course>,
    professors: Vec<Professor>,
    #[serde(default)]
    area_penalty: f64,
}

/// Read-only problem data shared by every trial and every sub-problem.
///
/// Ids are dense: course `i` is `courses[i]` and professor `j` is `professors[j]`. This is
/// checked once on construction so the heuristics can index without lookups.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(try_from = "RawInstance", rename_all = "camelCase")]
pub struct Instance {
    courses: Vec<Course>,
    professors: Vec<Professor>,
    area_penalty: f64,
}

impl TryFrom<RawInstance> for Instance {
    type Error = InstanceError;

    fn try_from(raw: RawInstance) -> Result<Self, Self::Error> {
        Instance::with_area_penalty(raw.courses, raw.professors, raw.area_penalty)
    }
}

impl Instance {
    pub fn new(courses: Vec<Course>, professors: Vec<Professor>) -> Result<Self, InstanceError> {
        Self::with_area_penalty(courses, professors, 0.0)
    }

    pub fn with_area_penalty(
        courses: Vec<Course>,
        professors: Vec<Professor>,
        area_penalty: f64,
    ) -> Result<Self, InstanceError> {
        if !area_penalty.is_finite() || area_penalty < 0.0 {
            return Err(InstanceError::InvalidAreaPenalty(area_penalty));
        }
        for (index, course) in courses.iter().enumerate() {
            if course.id != index {
                return Err(InstanceError::NonDenseCourseId {
                    expected: index,
                    found: course.id,
                });
            }
        }
        for (index, professor) in professors.iter().enumerate() {
            if professor.id != index {
                return Err(InstanceError::NonDenseProfessorId {
                    expected: index,
                    found: professor.id,
                });
            }
            if professor.preferences.len() != courses.len() {
                return Err(InstanceError::PreferenceLength {
                    professor: index,
                    expected: courses.len(),
                    found: professor.preferences.len(),
                });
            }
            if let Some((course, weight)) = professor
                .preferences
                .iter()
                .enumerate()
                .find(|(_, w)| !w.is_finite() || **w < 0.0)
            {
                return Err(InstanceError::InvalidWeight {
                    professor: index,
                    course,
                    weight: *weight,
                });
            }
        }
        Ok(Instance {
            courses,
            professors,
            area_penalty,
        })
    }

    #[inline]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[inline]
    pub fn professors(&self) -> &[Professor] {
        &self.professors
    }

    #[inline]
    pub fn course(&self, id: CourseId) -> &Course {
        &self.courses[id]
    }

    #[inline]
    pub fn professor(&self, id: ProfessorId) -> &Professor {
        &self.professors[id]
    }

    #[inline]
    pub fn num_courses(&self) -> usize {
        self.courses.len()
    }

    #[inline]
    pub fn num_professors(&self) -> usize {
        self.professors.len()
    }

    #[inline]
    pub fn area_penalty(&self) -> f64 {
        self.area_penalty
    }
}

/// A complete candidate solution: every course mapped to exactly one professor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Assignment {
    owners: Vec<ProfessorId>,
}

impl Assignment {
    /// Builds an assignment from a per-course owner list.
    pub fn from_owners(owners: Vec<ProfessorId>) -> Self {
        Assignment { owners }
    }

    /// Builds an assignment from (course, professor) pairs. Returns `None` unless every one of
    /// the `num_courses` courses appears exactly once.
    pub fn from_pairs<I>(num_courses: usize, pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (CourseId, ProfessorId)>,
    {
        let mut owners: Vec<Option<ProfessorId>> = vec![None; num_courses];
        for (course, professor) in pairs {
            let slot = owners.get_mut(course)?;
            if slot.is_some() {
                return None;
            }
            *slot = Some(professor);
        }
        owners
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .map(Assignment::from_owners)
    }

    #[inline]
    pub fn owner(&self, course: CourseId) -> ProfessorId {
        self.owners[course]
    }

    #[inline]
    pub fn set_owner(&mut self, course: CourseId, professor: ProfessorId) {
        self.owners[course] = professor;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn owners(&self) -> &[ProfessorId] {
        &self.owners
    }

    /// Iterates the (course, professor) pairs with value 1.
    pub fn pairs(&self) -> impl Iterator<Item = (CourseId, ProfessorId)> + '_ {
        self.owners.iter().copied().enumerate()
    }

    /// Courses currently owned by `professor`, in id order.
    pub fn courses_of(&self, professor: ProfessorId) -> impl Iterator<Item = CourseId> + '_ {
        self.pairs()
            .filter(move |(_, owner)| *owner == professor)
            .map(|(course, _)| course)
    }
}

/// Reference to one (course, professor) pair, as exchanged over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct PairRef {
    pub course_id: CourseId,
    pub professor_id: ProfessorId,
}

/// Describes a professor whose annual minimum workload is not met in the final assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmetMinimum {
    pub professor_id: ProfessorId,
    pub name: String,
    pub assigned: Workload,
    pub minimum: Workload,
}

impl fmt::Display for UnmetMinimum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Professor {} ({}) is assigned {} of a minimum {}",
            self.professor_id, self.name, self.assigned, self.minimum
        )
    }
}
