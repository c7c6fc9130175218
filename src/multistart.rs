use crate::config::GraspConfig;
use crate::data::{Assignment, Instance};
use crate::grasp::GraspConstructor;
use crate::loads::WorkloadLedger;
use crate::objective;
use crate::oracle::PairBounds;
use crate::repair::{self, RepairReport};
use log::{debug, info};
use rand::Rng;
use std::time::Instant;

/// Best assignment kept by the multi-start driver, with how it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub assignment: Assignment,
    pub loads: WorkloadLedger,
    pub unmet_minimums: usize,
    pub objective: f64,
    pub trial: usize,
    pub alpha: f64,
    pub amplification: f64,
    pub repair: RepairReport,
}

impl TrialOutcome {
    /// Fewer unmet minimums first, then the higher objective.
    pub fn is_better_than(&self, other: &TrialOutcome) -> bool {
        match self.unmet_minimums.cmp(&other.unmet_minimums) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => self.objective > other.objective,
        }
    }
}

/// Aggregate counters of one multi-start run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MultiStartStats {
    pub trials_run: usize,
    pub trials_failed: usize,
}

/// Degree-bonus weight for trial `trial` of `trials`, linear from min to max.
pub fn amplification_for(config: &GraspConfig, trial: usize) -> f64 {
    if config.trials <= 1 {
        return config.amplification_min;
    }
    let t = trial as f64 / (config.trials - 1) as f64;
    config.amplification_min + (config.amplification_max - config.amplification_min) * t
}

/// Runs up to `config.trials` construct+repair trials and returns the best complete assignment.
///
/// Trials that leave courses uncovered are discarded. The run stops early once a trial leaves
/// no professor below minimum, and stops at a trial boundary once the time budget is spent.
pub fn run<R>(
    instance: &Instance,
    bounds: &PairBounds,
    config: &GraspConfig,
    rng: &mut R,
) -> (Option<TrialOutcome>, MultiStartStats)
where
    R: Rng + ?Sized,
{
    let start = Instant::now();
    let deadline = config.time_limit();
    let mut constructor = GraspConstructor::new(instance, bounds);
    let mut loads = WorkloadLedger::new(instance.num_professors());
    let mut best: Option<TrialOutcome> = None;
    let mut stats = MultiStartStats::default();

    for trial in 0..config.trials {
        if deadline.is_some_and(|limit| start.elapsed() >= limit) {
            debug!("Construction budget spent after {} trial(s)", trial);
            break;
        }
        let alpha = if config.alpha_min < config.alpha_max {
            rng.gen_range(config.alpha_min..=config.alpha_max)
        } else {
            config.alpha_min
        };
        let amplification = amplification_for(config, trial);
        stats.trials_run += 1;

        let mut assignment = match constructor.construct(alpha, amplification, &mut loads, rng) {
            Ok(assignment) => assignment,
            Err(e) => {
                debug!("Trial {} discarded: {}", trial, e);
                stats.trials_failed += 1;
                continue;
            }
        };
        let report = repair::repair(instance, bounds, &mut assignment, &mut loads);
        let outcome = TrialOutcome {
            objective: objective::evaluate(instance, &assignment),
            unmet_minimums: report.unmet_after,
            assignment,
            loads: loads.clone(),
            trial,
            alpha,
            amplification,
            repair: report,
        };
        debug!(
            "Trial {}: alpha {:.3}, K {:.2}, {} unmet minimum(s) ({} repair moves), objective {}",
            trial, alpha, amplification, outcome.unmet_minimums, report.moves, outcome.objective
        );

        let done = outcome.unmet_minimums == 0;
        if best.as_ref().is_none_or(|b| outcome.is_better_than(b)) {
            best = Some(outcome);
        }
        if done {
            debug!("Trial {} meets every minimum workload, stopping early", trial);
            break;
        }
    }

    match &best {
        Some(b) => info!(
            "Best construction from trial {}: {} unmet minimum(s), objective {}",
            b.trial, b.unmet_minimums, b.objective
        ),
        None => info!(
            "No complete construction in {} trial(s)",
            stats.trials_run
        ),
    }
    (best, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{course, department_instance, professor, three_course_instance};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_amplification_schedule_is_linear() {
        let config = GraspConfig {
            trials: 5,
            amplification_min: 1.0,
            amplification_max: 9.0,
            ..GraspConfig::default()
        };
        let ks: Vec<f64> = (0..5).map(|t| amplification_for(&config, t)).collect();
        assert_eq!(ks, vec![1.0, 3.0, 5.0, 7.0, 9.0]);

        let single = GraspConfig {
            trials: 1,
            ..config
        };
        assert_eq!(amplification_for(&single, 0), 1.0);
    }

    #[test]
    fn test_three_course_example_meets_all_minimums() {
        let instance = three_course_instance();
        let bounds = PairBounds::free(&instance);
        let mut rng = SmallRng::seed_from_u64(1);
        let (best, stats) = run(&instance, &bounds, &GraspConfig::default(), &mut rng);
        let best = best.unwrap();
        assert_eq!(best.assignment.owners(), &[0, 0, 1]);
        assert_eq!(best.unmet_minimums, 0);
        assert_eq!(best.loads.total(0), 8);
        assert_eq!(best.loads.total(1), 6);
        // zero deficit on the first trial stops the run
        assert_eq!(stats.trials_run, 1);
    }

    #[test]
    fn test_failed_trials_are_discarded() {
        let instance = Instance::new(
            vec![course(0, 4, 1), course(1, 4, 1)],
            vec![professor(0, 0, 4, 0, &[1.0, 1.0])],
        )
        .unwrap();
        let bounds = PairBounds::free(&instance);
        let mut rng = SmallRng::seed_from_u64(1);
        let config = GraspConfig {
            trials: 3,
            ..GraspConfig::default()
        };
        let (best, stats) = run(&instance, &bounds, &config, &mut rng);
        assert!(best.is_none());
        assert_eq!(stats.trials_run, 3);
        assert_eq!(stats.trials_failed, 3);
    }

    #[test]
    fn test_best_trial_is_feasible_and_deterministic() {
        let instance = department_instance();
        let bounds = PairBounds::free(&instance);
        let config = GraspConfig::default();
        let (first, _) = run(&instance, &bounds, &config, &mut SmallRng::seed_from_u64(8));
        let (second, _) = run(&instance, &bounds, &config, &mut SmallRng::seed_from_u64(8));
        let first = first.unwrap();
        assert_eq!(Some(&first), second.as_ref());
        assert!(first.loads.within_capacity(&instance));
        assert_eq!(
            first.loads,
            WorkloadLedger::from_assignment(&instance, &first.assignment)
        );
        assert_eq!(
            first.unmet_minimums,
            first.loads.count_unmet_minimums(&instance)
        );
    }

    #[test]
    fn test_outcome_ordering() {
        let base = TrialOutcome {
            assignment: Assignment::from_owners(vec![0]),
            loads: WorkloadLedger::new(1),
            unmet_minimums: 1,
            objective: 10.0,
            trial: 0,
            alpha: 0.5,
            amplification: 5.0,
            repair: RepairReport::default(),
        };
        let fewer_unmet = TrialOutcome {
            unmet_minimums: 0,
            objective: 1.0,
            ..base.clone()
        };
        let higher_objective = TrialOutcome {
            objective: 11.0,
            ..base.clone()
        };
        assert!(fewer_unmet.is_better_than(&base));
        assert!(higher_objective.is_better_than(&base));
        assert!(!base.is_better_than(&base));
    }
}
