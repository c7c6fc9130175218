//! Load repair: move courses from professors above their minimum to professors below it.

use crate::data::{Assignment, CourseId, Instance, ProfessorId};
use crate::loads::WorkloadLedger;
use crate::oracle::PairBounds;
use log::trace;

/// Summary of one repair run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepairReport {
    pub moves: usize,
    pub passes: usize,
    pub unmet_before: usize,
    pub unmet_after: usize,
}

/// A single course transfer from `donor` to `receiver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub course: CourseId,
    pub donor: ProfessorId,
    pub receiver: ProfessorId,
}

/// First valid move that gives `needy` a course, scanning courses in id order.
///
/// The donor must stay at or above its own minimum, the receiver must have semester capacity and
/// be eligible, and neither pair may be fixed by the oracle bounds.
pub fn find_move(
    instance: &Instance,
    bounds: &PairBounds,
    assignment: &Assignment,
    loads: &WorkloadLedger,
    needy: ProfessorId,
) -> Option<Move> {
    let receiver = instance.professor(needy);
    instance.courses().iter().find_map(|course| {
        let donor = assignment.owner(course.id);
        if donor == needy
            || bounds.is_forced(course.id, donor)
            || bounds.is_forbidden(course.id, needy)
            || !receiver.is_eligible(course)
            || !loads.fits(instance, needy, course)
        {
            return None;
        }
        let donor_min = instance.professor(donor).min_workload;
        if loads.total(donor) < donor_min + course.workload {
            return None;
        }
        Some(Move {
            course: course.id,
            donor,
            receiver: needy,
        })
    })
}

/// Runs donor/needy moves until every professor meets their minimum or a full pass finds no
/// move. The number of professors below minimum never increases.
pub fn repair(
    instance: &Instance,
    bounds: &PairBounds,
    assignment: &mut Assignment,
    loads: &mut WorkloadLedger,
) -> RepairReport {
    let mut report = RepairReport {
        unmet_before: loads.count_unmet_minimums(instance),
        ..RepairReport::default()
    };

    loop {
        report.passes += 1;
        let mut changed = false;
        for needy in 0..instance.num_professors() {
            if !loads.below_minimum(instance, needy) {
                continue;
            }
            if let Some(mv) = find_move(instance, bounds, assignment, loads, needy) {
                apply(instance, assignment, loads, mv);
                trace!(
                    "Repair: course {} moved from professor {} to professor {}",
                    mv.course, mv.donor, mv.receiver
                );
                report.moves += 1;
                changed = true;
            }
        }
        if !changed || loads.count_unmet_minimums(instance) == 0 {
            break;
        }
    }

    report.unmet_after = loads.count_unmet_minimums(instance);
    report
}

pub fn apply(instance: &Instance, assignment: &mut Assignment, loads: &mut WorkloadLedger, mv: Move) {
    let course = instance.course(mv.course);
    loads.remove(mv.donor, course);
    loads.add(mv.receiver, course);
    assignment.set_owner(mv.course, mv.receiver);
}
