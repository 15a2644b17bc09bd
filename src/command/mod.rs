//! Command pipeline
//!
//! Text -> SemanticMatcher -> MatchDecision -> TransactionPlan
//! (pick tokens + vectors, place tokens + vectors)

pub mod orchestrator;
pub mod plan;

pub use orchestrator::{CommandOutcome, Orchestrator};
pub use plan::{drop_position, Subtask, TransactionPlan};
