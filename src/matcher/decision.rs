//! Match decision record and its diagnostics

use crate::core::types::{Cycle, ObjectId, SceneSnapshot};
use crate::language::phrase::ExtractedPhrases;
use crate::matcher::scoring::ObjectScores;
use crate::matcher::strategy::Strategy;
use serde::{Deserialize, Serialize};

/// Where the picked object goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceTarget {
    /// Stack on another object
    Object(ObjectId),
    /// Release on the work surface
    Ground,
}

/// How the decision came about. Never consulted by the pipeline itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchDiagnostics {
    pub pick_strategy: Option<Strategy>,
    pub place_strategy: Option<Strategy>,
    pub pick_scores: Option<ObjectScores>,
    pub place_scores: Option<ObjectScores>,
    pub command_scores: ObjectScores,
    /// Place collided with pick and was reassigned or dropped
    pub collision_resolved: bool,
    /// Model that produced the embeddings, if one was called
    pub encoder_model: Option<String>,
}

/// Outcome of grounding one command against one snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDecision {
    /// Snapshot cycle the ids refer to
    pub cycle: Cycle,
    pub pick: Option<ObjectId>,
    pub place: Option<PlaceTarget>,
    pub ground: bool,
    pub pick_score: Option<f32>,
    pub place_score: Option<f32>,
    pub phrases: ExtractedPhrases,
    pub diagnostics: MatchDiagnostics,
}

impl MatchDecision {
    /// Decision with nothing resolved
    pub fn unresolved(cycle: Cycle, phrases: ExtractedPhrases) -> Self {
        let ground = phrases.ground;
        Self {
            cycle,
            pick: None,
            place: ground.then_some(PlaceTarget::Ground),
            ground,
            pick_score: None,
            place_score: None,
            phrases,
            diagnostics: MatchDiagnostics::default(),
        }
    }

    /// A pick was found; without one there is nothing to execute
    pub fn is_resolved(&self) -> bool {
        self.pick.is_some()
    }

    /// Ids are only meaningful against the snapshot they were computed on
    pub fn is_valid_for(&self, snapshot: &SceneSnapshot) -> bool {
        self.cycle == snapshot.cycle
    }

    pub fn place_object(&self) -> Option<ObjectId> {
        match self.place {
            Some(PlaceTarget::Object(id)) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_keeps_ground() {
        let phrases = ExtractedPhrases {
            normalized: "put it on the table".into(),
            ground: true,
            ..Default::default()
        };
        let decision = MatchDecision::unresolved(3, phrases);
        assert!(!decision.is_resolved());
        assert_eq!(decision.place, Some(PlaceTarget::Ground));
        assert_eq!(decision.place_object(), None);
    }

    #[test]
    fn test_validity_tracks_cycle() {
        let decision = MatchDecision::unresolved(3, ExtractedPhrases::default());
        assert!(decision.is_valid_for(&SceneSnapshot::new(3, Vec::new())));
        assert!(!decision.is_valid_for(&SceneSnapshot::new(4, Vec::new())));
    }

    #[test]
    fn test_place_target_serialization() {
        assert_eq!(serde_json::to_string(&PlaceTarget::Ground).unwrap(), "\"ground\"");
        assert_eq!(
            serde_json::to_string(&PlaceTarget::Object(ObjectId(2))).unwrap(),
            r#"{"object":2}"#
        );
    }
}
