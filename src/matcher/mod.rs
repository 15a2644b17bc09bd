//! Semantic grounding of pick and place references
//!
//! Flow per command: extract phrases, build descriptor candidates, embed
//! everything in one batch, pool scores per object, then run the ordered
//! resolver chains for pick and place.

pub mod decision;
pub mod scoring;
pub mod semantic;
pub mod strategy;

pub use decision::{MatchDecision, MatchDiagnostics, PlaceTarget};
pub use scoring::{ObjectScores, ScoreSet};
pub use semantic::SemanticMatcher;
pub use strategy::{Resolved, Strategy};
