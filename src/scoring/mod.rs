pub mod config;
pub mod engine;
pub mod inputs;
pub mod ranking;
pub mod validation;

pub use config::*;
pub use engine::{calculate_score, compute_totals, round2, Category, Contribution, ScoreResult, Totals};
pub use inputs::{RawInput, RawInputs};
pub use ranking::{group_by_award, plan_awards, rank, AwardGroup, AwardPlan, Ranked, UNASSIGNED};
pub use validation::validate_rubric;
