//! Adaptive, degree-aware scoring of the remaining professor/course graph.
//!
//! The graph has an edge for every uncovered course a professor may teach (stated preference or
//! shared area) that the oracle has not forbidden. Each edge is scored from its base weight,
//! amplified by the inverse degrees of both endpoints so that scarce professors and scarce
//! courses are matched first:
//!
//! `score = ceil(base * (1 + K * (1 / (1 + deg(p)) + 1 / (1 + deg(c)))))`
//!
//! Covering a course changes the degree of every neighbour, so the graph is always rebuilt from
//! scratch rather than patched.

use crate::data::{CourseId, Instance, ProfessorId};
use crate::oracle::PairBounds;

/// Reference amplification constant.
pub const DEFAULT_AMPLIFICATION: f64 = 5.0;

/// Scored edge from a professor to a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredCourse {
    pub course: CourseId,
    pub score: i64,
}

#[inline]
pub fn edge_score(base: f64, professor_degree: usize, course_degree: usize, amplification: f64) -> i64 {
    let bonus = amplification
        * (1.0 / (1.0 + professor_degree as f64) + 1.0 / (1.0 + course_degree as f64));
    (base * (1.0 + bonus)).ceil() as i64
}

/// Per-professor scored course lists plus the remaining degree of every vertex.
///
/// The buffers are sized once for the instance and cleared on every recomputation.
#[derive(Debug, Clone)]
pub struct ScoringGraph {
    amplification: f64,
    entries: Vec<Vec<ScoredCourse>>,
    professor_degree: Vec<usize>,
    course_degree: Vec<usize>,
    base: Vec<Option<f64>>,
}

impl ScoringGraph {
    pub fn new(instance: &Instance, amplification: f64) -> Self {
        let n = instance.num_professors();
        let m = instance.num_courses();
        ScoringGraph {
            amplification,
            entries: (0..n).map(|_| Vec::with_capacity(m)).collect(),
            professor_degree: vec![0; n],
            course_degree: vec![0; m],
            base: vec![None; n * m],
        }
    }

    #[inline]
    pub fn amplification(&self) -> f64 {
        self.amplification
    }

    #[inline]
    pub fn set_amplification(&mut self, amplification: f64) {
        self.amplification = amplification;
    }

    /// Rebuilds degrees and scores for the courses not yet covered.
    pub fn recompute(&mut self, instance: &Instance, bounds: &PairBounds, covered: &[bool]) {
        let m = instance.num_courses();
        self.professor_degree.iter_mut().for_each(|d| *d = 0);
        self.course_degree.iter_mut().for_each(|d| *d = 0);
        self.entries.iter_mut().for_each(Vec::clear);

        // degrees
        for professor in instance.professors() {
            for course in instance.courses() {
                let slot = professor.id * m + course.id;
                if covered[course.id] || bounds.is_forbidden(course.id, professor.id) {
                    self.base[slot] = None;
                    continue;
                }
                self.base[slot] = professor.base_weight(course);
                if self.base[slot].is_some() {
                    self.professor_degree[professor.id] += 1;
                    self.course_degree[course.id] += 1;
                }
            }
        }

        // scores
        for p in 0..instance.num_professors() {
            let degree = self.professor_degree[p];
            if degree == 0 {
                continue;
            }
            for c in 0..m {
                if let Some(base) = self.base[p * m + c] {
                    let score = edge_score(base, degree, self.course_degree[c], self.amplification);
                    self.entries[p].push(ScoredCourse { course: c, score });
                }
            }
        }
    }

    /// Scored courses of `professor`, in ascending course id.
    #[inline]
    pub fn entries(&self, professor: ProfessorId) -> &[ScoredCourse] {
        &self.entries[professor]
    }

    /// Score of the (professor, course) edge if it is still in the graph.
    pub fn score(&self, professor: ProfessorId, course: CourseId) -> Option<i64> {
        let entries = &self.entries[professor];
        entries
            .binary_search_by_key(&course, |e| e.course)
            .ok()
            .map(|idx| entries[idx].score)
    }

    #[inline]
    pub fn professor_degree(&self, professor: ProfessorId) -> usize {
        self.professor_degree[professor]
    }

    #[inline]
    pub fn course_degree(&self, course: CourseId) -> usize {
        self.course_degree[course]
    }
}
