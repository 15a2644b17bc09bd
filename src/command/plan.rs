//! Transaction plans: the pick and place subtasks of one command

use crate::action::discretizer::{token_strings, ActionToken};
use crate::action::vector::ActionVector;
use crate::core::config::DropConfig;
use crate::core::types::{Position, SceneSnapshot};
use crate::matcher::decision::{MatchDecision, PlaceTarget};
use serde::{Deserialize, Serialize};

/// Release position for the picked object
///
/// Ground releases sit beside the pick spot, stacks sit one cube above the
/// target, and anything unresolved goes to the configured default drop.
pub fn drop_position(
    decision: &MatchDecision,
    snapshot: &SceneSnapshot,
    pick_position: Position,
    config: &DropConfig,
) -> Position {
    match decision.place {
        Some(PlaceTarget::Ground) => Position::new(
            pick_position.x + config.ground_offset_x,
            pick_position.y,
            config.ground_height,
        ),
        Some(PlaceTarget::Object(id)) => match snapshot.position_of(id) {
            Some(target) => target.lifted(config.stack_height),
            None => {
                tracing::warn!("Place target {} missing from snapshot, using default drop", id);
                config.default_drop
            }
        },
        None => config.default_drop,
    }
}

/// One half of a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub label: String,
    pub target: Position,
    pub tokens: Vec<ActionToken>,
    pub vectors: Vec<ActionVector>,
}

impl Subtask {
    pub fn token_strings(&self) -> Vec<String> {
        token_strings(&self.tokens)
    }
}

/// Pick followed by place, ready for FIFO replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPlan {
    pub pick: Subtask,
    pub place: Subtask,
    pub drop_position: Position,
}

impl TransactionPlan {
    /// All vectors in replay order
    pub fn vectors(&self) -> impl Iterator<Item = &ActionVector> {
        self.pick.vectors.iter().chain(&self.place.vectors)
    }

    pub fn terminate_count(&self) -> usize {
        self.vectors().filter(|v| v.terminate).count()
    }

    /// Exactly one terminate vector, and it is the last one
    pub fn is_well_terminated(&self) -> bool {
        self.terminate_count() == 1 && self.vectors().last().is_some_and(|v| v.terminate)
    }
}
