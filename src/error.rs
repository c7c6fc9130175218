use crate::data::{CourseId, ProfessorId};
use std::fmt;

/// Malformed problem data rejected while building an `Instance`.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceError {
    InvalidSemester(u8),
    InvalidAreaPenalty(f64),
    NonDenseCourseId {
        expected: CourseId,
        found: CourseId,
    },
    NonDenseProfessorId {
        expected: ProfessorId,
        found: ProfessorId,
    },
    PreferenceLength {
        professor: ProfessorId,
        expected: usize,
        found: usize,
    },
    InvalidWeight {
        professor: ProfessorId,
        course: CourseId,
        weight: f64,
    },
    UnknownPair {
        course: CourseId,
        professor: ProfessorId,
    },
    ConflictingBounds {
        course: CourseId,
        professor: ProfessorId,
    },
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceError::InvalidSemester(value) => {
                write!(f, "Semester must be 1 or 2, got {}", value)
            }
            InstanceError::InvalidAreaPenalty(value) => {
                write!(f, "Area penalty must be finite and non-negative, got {}", value)
            }
            InstanceError::NonDenseCourseId { expected, found } => write!(
                f,
                "Course at position {} has id {}; course ids must be dense",
                expected, found
            ),
            InstanceError::NonDenseProfessorId { expected, found } => write!(
                f,
                "Professor at position {} has id {}; professor ids must be dense",
                expected, found
            ),
            InstanceError::PreferenceLength {
                professor,
                expected,
                found,
            } => write!(
                f,
                "Professor {} has {} preference weights, expected one per course ({})",
                professor, found, expected
            ),
            InstanceError::InvalidWeight {
                professor,
                course,
                weight,
            } => write!(
                f,
                "Professor {} has invalid preference weight {} for course {}",
                professor, weight, course
            ),
            InstanceError::UnknownPair { course, professor } => write!(
                f,
                "Pair (course {}, professor {}) does not exist in the instance",
                course, professor
            ),
            InstanceError::ConflictingBounds { course, professor } => write!(
                f,
                "Pair (course {}, professor {}) is both forced and forbidden, or the course is forced twice",
                course, professor
            ),
        }
    }
}

impl std::error::Error for InstanceError {}

/// Caller-supplied configuration outside its valid range.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NoTrials,
    AlphaOutOfRange { min: f64, max: f64 },
    AmplificationOutOfRange { min: f64, max: f64 },
    DestroyFractionOutOfRange(f64),
    NonPositiveTimeLimit(f64),
    NegativeTolerance(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoTrials => write!(f, "At least one construction trial is required"),
            ConfigError::AlphaOutOfRange { min, max } => write!(
                f,
                "Alpha range [{}, {}] must lie within [0, 1] with min <= max",
                min, max
            ),
            ConfigError::AmplificationOutOfRange { min, max } => write!(
                f,
                "Amplification range [{}, {}] must be finite, non-negative, with min <= max",
                min, max
            ),
            ConfigError::DestroyFractionOutOfRange(value) => {
                write!(f, "Destroy fraction must lie within [0, 1], got {}", value)
            }
            ConfigError::NonPositiveTimeLimit(value) => {
                write!(f, "Time limit must be positive, got {} seconds", value)
            }
            ConfigError::NegativeTolerance(value) => {
                write!(f, "Tolerance must be non-negative, got {}", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A construction trial could not place every course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionError {
    uncovered: Vec<CourseId>,
}

impl ConstructionError {
    #[inline]
    pub fn new(uncovered: Vec<CourseId>) -> Self {
        Self { uncovered }
    }

    #[inline]
    pub fn uncovered(&self) -> &[CourseId] {
        &self.uncovered
    }
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No complete assignment produced; {} course(s) left uncovered: {:?}",
            self.uncovered.len(),
            self.uncovered
        )
    }
}

impl std::error::Error for ConstructionError {}

/// The oracle failed to build or run a sub-problem.
///
/// An infeasible sub-problem is not an error; see `SubProblemOutcome::Infeasible`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleError {
    message: String,
}

impl OracleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oracle failure: {}", self.message)
    }
}

impl std::error::Error for OracleError {}

/// Top-level failure of the solve pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    Instance(InstanceError),
    Config(ConfigError),
    Oracle(OracleError),
    NoCompleteAssignment { trials: usize },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Instance(e) => write!(f, "Invalid instance: {}", e),
            SolveError::Config(e) => write!(f, "Invalid configuration: {}", e),
            SolveError::Oracle(e) => write!(f, "{}", e),
            SolveError::NoCompleteAssignment { trials } => write!(
                f,
                "None of {} construction trial(s) produced a complete assignment. The problem might be too constrained.",
                trials
            ),
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolveError::Instance(e) => Some(e),
            SolveError::Config(e) => Some(e),
            SolveError::Oracle(e) => Some(e),
            SolveError::NoCompleteAssignment { .. } => None,
        }
    }
}

impl From<InstanceError> for SolveError {
    fn from(e: InstanceError) -> Self {
        SolveError::Instance(e)
    }
}

impl From<ConfigError> for SolveError {
    fn from(e: ConfigError) -> Self {
        SolveError::Config(e)
    }
}

impl From<OracleError> for SolveError {
    fn from(e: OracleError) -> Self {
        SolveError::Oracle(e)
    }
}
