use crate::data::{Assignment, Course, Instance, Professor};

/// Objective coefficient of assigning `course` to `professor`.
///
/// Within a shared area the stated weight counts (1 when none is stated); outside it the
/// assignment costs the instance's area penalty.
pub fn coefficient(instance: &Instance, professor: &Professor, course: &Course) -> f64 {
    if professor.shares_area(course) {
        let weight = professor.preference(course.id);
        if weight > 0.0 { weight } else { 1.0 }
    } else {
        -instance.area_penalty()
    }
}

/// Total preference satisfaction of a complete assignment (maximised).
pub fn evaluate(instance: &Instance, assignment: &Assignment) -> f64 {
    assignment
        .pairs()
        .map(|(c, p)| coefficient(instance, instance.professor(p), instance.course(c)))
        .sum()
}
