//! Command orchestration: text in, decision and transaction plan out

use crate::action::discretizer::SpatialDiscretizer;
use crate::action::sequence::ActionSequenceGenerator;
use crate::command::plan::{drop_position, Subtask, TransactionPlan};
use crate::core::config::{DropConfig, GroundingConfig};
use crate::core::error::{GroundingError, Result};
use crate::core::types::SceneSnapshot;
use crate::embedding::TextEncoder;
use crate::matcher::decision::MatchDecision;
use crate::matcher::semantic::SemanticMatcher;
use serde::{Deserialize, Serialize};

/// Result of handling one command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub decision: MatchDecision,
    /// `None` when no pick target resolved
    pub plan: Option<TransactionPlan>,
}

impl CommandOutcome {
    pub fn is_executable(&self) -> bool {
        self.plan.is_some()
    }
}

/// Runs one command at a time through matching, tokenization and motion
/// generation
pub struct Orchestrator<'a> {
    matcher: SemanticMatcher<'a>,
    discretizer: SpatialDiscretizer,
    generator: ActionSequenceGenerator,
    drop: DropConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(encoder: &'a dyn TextEncoder, config: &GroundingConfig) -> Result<Self> {
        config.validate().map_err(GroundingError::Config)?;

        Ok(Self {
            matcher: SemanticMatcher::new(encoder, &config.matcher)?,
            discretizer: SpatialDiscretizer::new(&config.discretizer),
            generator: ActionSequenceGenerator::new(config.motion.clone()),
            drop: config.drop.clone(),
        })
    }

    pub fn matcher(&self) -> &SemanticMatcher<'a> {
        &self.matcher
    }

    pub fn discretizer(&self) -> &SpatialDiscretizer {
        &self.discretizer
    }

    pub fn generator(&self) -> &ActionSequenceGenerator {
        &self.generator
    }

    /// Ground `command` against `snapshot` and plan the transaction
    ///
    /// Unresolvable text is not an error; it yields an outcome without a
    /// plan. Only an encoder failure is returned as `Err`.
    pub fn handle(&self, command: &str, snapshot: &SceneSnapshot) -> Result<CommandOutcome> {
        let decision = self.matcher.decide(command, snapshot)?;
        let plan = self.plan(&decision, snapshot);

        match &plan {
            Some(plan) => tracing::info!(
                "Planned pick {:?} -> place {:?} at ({:.2}, {:.2}, {:.2})",
                plan.pick.token_strings(),
                decision.place,
                plan.drop_position.x,
                plan.drop_position.y,
                plan.drop_position.z
            ),
            None => tracing::info!("No pick target for command {:?}", command),
        }

        Ok(CommandOutcome { decision, plan })
    }

    /// Build the transaction for a decision made against `snapshot`
    ///
    /// `None` when nothing was picked, or when the decision belongs to a
    /// different perception cycle.
    pub fn plan(&self, decision: &MatchDecision, snapshot: &SceneSnapshot) -> Option<TransactionPlan> {
        if !decision.is_valid_for(snapshot) {
            tracing::warn!(
                "Decision from cycle {} is stale at cycle {}",
                decision.cycle,
                snapshot.cycle
            );
            return None;
        }

        let picked = snapshot.get(decision.pick?)?;
        let drop = drop_position(decision, snapshot, picked.position, &self.drop);

        let pick = Subtask {
            label: "pick".into(),
            target: picked.position,
            tokens: self
                .discretizer
                .action_to_tokens("pick", picked.position, picked.yaw),
            vectors: self.generator.generate_pick(picked.position, false),
        };
        // Release yaw is not tracked, so the place token always reads neutral
        let place = Subtask {
            label: "place".into(),
            target: drop,
            tokens: self.discretizer.action_to_tokens("place", drop, 0.0),
            vectors: self.generator.generate_place(drop, true),
        };

        Some(TransactionPlan {
            pick,
            place,
            drop_position: drop,
        })
    }
}
