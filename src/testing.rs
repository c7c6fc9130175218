//! Shared fixtures for unit tests.

use crate::data::{AreaMask, Course, Instance, Professor, Semester, Workload};

pub fn course(id: usize, workload: Workload, semester: u8) -> Course {
    Course {
        id,
        subject: format!("Course {}", id),
        workload,
        semester: if semester == 1 {
            Semester::First
        } else {
            Semester::Second
        },
        areas: 0,
    }
}

pub fn professor(
    id: usize,
    min_workload: Workload,
    max_workload_first: Workload,
    max_workload_second: Workload,
    preferences: &[f64],
) -> Professor {
    Professor {
        id,
        name: format!("Professor {}", id),
        min_workload,
        max_workload_first,
        max_workload_second,
        areas: 0,
        preferences: preferences.to_vec(),
    }
}

pub trait WithAreas {
    fn with_areas(self, areas: AreaMask) -> Self;
}

impl WithAreas for Course {
    fn with_areas(mut self, areas: AreaMask) -> Self {
        self.areas = areas;
        self
    }
}

impl WithAreas for Professor {
    fn with_areas(mut self, areas: AreaMask) -> Self {
        self.areas = areas;
        self
    }
}

/// Three courses (workloads 4, 4, 6 in semesters 1, 1, 2) and two professors who like every
/// course equally. Only professor 0 can teach in semester 1 and only professor 1 in semester 2.
pub fn three_course_instance() -> Instance {
    Instance::new(
        vec![course(0, 4, 1), course(1, 4, 1), course(2, 6, 2)],
        vec![
            professor(0, 4, 8, 0, &[1.0, 1.0, 1.0]),
            professor(1, 6, 0, 10, &[1.0, 1.0, 1.0]),
        ],
    )
    .expect("fixture instance is valid")
}

/// A mid-sized instance with mixed preferences, area matches and enough capacity for every
/// course: 12 courses over two semesters and 4 professors.
pub fn department_instance() -> Instance {
    let courses = (0..12)
        .map(|i| {
            course(i, 2 + (i as Workload % 3) * 2, if i % 2 == 0 { 1 } else { 2 })
                .with_areas(1 << (i % 3))
        })
        .collect::<Vec<_>>();
    let professors = (0..4)
        .map(|p| {
            let preferences = (0..12)
                .map(|c| if (c + p) % 4 == 0 { (1 + (c % 5)) as f64 } else { 0.0 })
                .collect::<Vec<_>>();
            professor(p, 8, 14, 14, &preferences).with_areas(1 << (p % 3))
        })
        .collect::<Vec<_>>();
    Instance::new(courses, professors).expect("fixture instance is valid")
}
