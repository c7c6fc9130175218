//! Primal heuristics for assigning professors to courses: an adaptive scoring graph, a GRASP
//! constructor with load repair, a multi-start driver, a deterministic greedy constructor, and
//! large neighborhood search that delegates sub-problems to an integer-programming oracle.

pub mod config;
pub mod data;
pub mod error;
pub mod grasp;
pub mod greedy;
pub mod highs;
pub mod lns;
pub mod loads;
pub mod multistart;
pub mod objective;
pub mod oracle;
pub mod repair;
pub mod scoring;
pub mod server;
pub mod solver;

#[cfg(test)]
mod testing;
