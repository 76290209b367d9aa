//! # finsync-plan
//!
//! Reconciliation planner and snapshot/plan serialization.
//!
//! Call [`generate_plan`] with both account snapshots to get the minimal
//! update plan plus match/unmatch counters. [`io`] reads and writes the
//! snapshot CSVs and the plan JSON document.

pub mod error;
pub mod io;
pub mod planner;

pub use error::PlanError;
pub use planner::{generate_plan, PlanOutcome};
