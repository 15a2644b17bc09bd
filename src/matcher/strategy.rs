//! Resolver strategies and the ordered chains they run in
//!
//! Each strategy either names an object (with a score) or declines. A chain
//! tries its strategies in order and the first one to answer wins.

use crate::core::types::{ObjectDescriptor, ObjectId};
use crate::language::phrase::ExtractedPhrases;
use crate::matcher::scoring::ScoreSet;
use serde::{Deserialize, Serialize};

/// How a role was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Embedding match on the extracted pick phrase
    PickPhrase,
    /// Embedding match on the extracted place phrase
    PlacePhrase,
    /// A canonical name appears verbatim in the command
    LiteralName,
    /// Embedding match on the whole command
    FullCommand,
    /// Ground keyword short-circuit
    Ground,
    /// Place reassigned after colliding with the pick
    CollisionRerank,
}

/// Pick: phrase, then literal name, then whole command
pub const PICK_CHAIN: &[Strategy] = &[Strategy::PickPhrase, Strategy::LiteralName, Strategy::FullCommand];

/// Place: phrase, then whole command skipping the picked object
pub const PLACE_CHAIN: &[Strategy] = &[Strategy::PlacePhrase, Strategy::FullCommand];

/// A strategy's answer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolved {
    pub object: ObjectId,
    pub score: f32,
    pub strategy: Strategy,
}

/// Everything a strategy may look at
pub struct ResolutionContext<'a> {
    pub phrases: &'a ExtractedPhrases,
    pub objects: &'a [&'a ObjectDescriptor],
    pub scores: &'a ScoreSet,
    pub literal_match: bool,
    pub min_score: Option<f32>,
}

impl ResolutionContext<'_> {
    fn accept(&self, found: Option<(ObjectId, f32)>) -> Option<(ObjectId, f32)> {
        match (found, self.min_score) {
            (Some((_, score)), Some(min)) if score < min => None,
            _ => found,
        }
    }
}

impl Strategy {
    /// Try this strategy; `claimed` is the object already taken by the
    /// other role
    ///
    /// Phrase strategies score without exclusion. If the place phrase lands
    /// on the picked object the matcher re-ranks afterwards.
    pub fn resolve(self, ctx: &ResolutionContext, claimed: Option<ObjectId>) -> Option<Resolved> {
        let found = match self {
            Strategy::PickPhrase => ctx.accept(ctx.scores.pick.as_ref()?.best(None)),
            Strategy::PlacePhrase => ctx.accept(ctx.scores.place.as_ref()?.best(None)),
            Strategy::LiteralName => {
                if !ctx.literal_match {
                    return None;
                }
                let id = literal_name_match(&ctx.phrases.normalized, ctx.objects, claimed)?;
                // Literal hits keep the command score for diagnostics; no threshold
                Some((id, ctx.scores.command.get(id).unwrap_or(1.0)))
            }
            Strategy::FullCommand => ctx.accept(ctx.scores.command.best(claimed)),
            Strategy::Ground | Strategy::CollisionRerank => None,
        }?;

        Some(Resolved {
            object: found.0,
            score: found.1,
            strategy: self,
        })
    }
}

/// First strategy in `chain` that answers
pub fn run_chain(chain: &[Strategy], ctx: &ResolutionContext, claimed: Option<ObjectId>) -> Option<Resolved> {
    chain.iter().find_map(|strategy| {
        let resolved = strategy.resolve(ctx, claimed);
        if resolved.is_none() {
            tracing::debug!("Strategy {:?} declined", strategy);
        }
        resolved
    })
}

/// Object whose canonical name occurs in `text`
///
/// Earliest occurrence wins, then the longer name ("light blue" over
/// "blue"), then perception order.
pub fn literal_name_match(text: &str, objects: &[&ObjectDescriptor], exclude: Option<ObjectId>) -> Option<ObjectId> {
    objects
        .iter()
        .filter(|o| !o.name.is_empty() && Some(o.id) != exclude)
        .filter_map(|o| text.find(o.name.as_str()).map(|pos| (pos, o.name.len(), o.id)))
        .enumerate()
        .min_by_key(|&(order, (pos, len, _))| (pos, std::cmp::Reverse(len), order))
        .map(|(_, (_, _, id))| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Position;
    use crate::matcher::scoring::ObjectScores;
    use crate::language::descriptors::Candidate;

    fn obj(id: u32, name: &str) -> ObjectDescriptor {
        ObjectDescriptor::new(ObjectId(id), name, Position::default(), 0.0)
    }

    fn scores(values: &[(u32, f32)]) -> ObjectScores {
        let candidates: Vec<Candidate> = values
            .iter()
            .map(|&(id, _)| Candidate {
                text: String::new(),
                object: ObjectId(id),
            })
            .collect();
        let sims = vec![values.iter().map(|&(_, s)| s).collect()];
        ObjectScores::pool(&sims, &candidates)
    }

    #[test]
    fn test_literal_earliest_occurrence_wins() {
        let objects = [obj(1, "red"), obj(2, "blue"), obj(3, "green")];
        let refs: Vec<&ObjectDescriptor> = objects.iter().collect();
        let id = literal_name_match("put the blue block on the green cube", &refs, None);
        assert_eq!(id, Some(ObjectId(2)));
    }

    #[test]
    fn test_literal_longer_name_wins_at_same_position() {
        let objects = [obj(1, "blue"), obj(2, "blue green")];
        let refs: Vec<&ObjectDescriptor> = objects.iter().collect();
        assert_eq!(literal_name_match("grab blue green", &refs, None), Some(ObjectId(2)));
    }

    #[test]
    fn test_literal_respects_exclusion_and_absence() {
        let objects = [obj(1, "red"), obj(2, "blue")];
        let refs: Vec<&ObjectDescriptor> = objects.iter().collect();
        assert_eq!(literal_name_match("red", &refs, Some(ObjectId(1))), None);
        assert_eq!(literal_name_match("yellow thing", &refs, None), None);
    }

    #[test]
    fn test_chain_first_success_wins() {
        let objects = [obj(1, "red"), obj(2, "blue")];
        let refs: Vec<&ObjectDescriptor> = objects.iter().collect();
        let phrases = ExtractedPhrases {
            normalized: "grab the blue thing".into(),
            ..Default::default()
        };
        let set = ScoreSet {
            command: scores(&[(1, 0.9), (2, 0.1)]),
            pick: None,
            place: None,
        };
        let ctx = ResolutionContext {
            phrases: &phrases,
            objects: &refs,
            scores: &set,
            literal_match: true,
            min_score: None,
        };

        // No pick phrase, so the literal name beats the better command score
        let resolved = run_chain(PICK_CHAIN, &ctx, None).unwrap();
        assert_eq!(resolved.object, ObjectId(2));
        assert_eq!(resolved.strategy, Strategy::LiteralName);
        assert_eq!(resolved.score, 0.1);
    }

    #[test]
    fn test_min_score_declines_weak_matches() {
        let objects = [obj(1, "red")];
        let refs: Vec<&ObjectDescriptor> = objects.iter().collect();
        let phrases = ExtractedPhrases {
            normalized: "grab something".into(),
            ..Default::default()
        };
        let set = ScoreSet {
            command: scores(&[(1, 0.2)]),
            pick: Some(scores(&[(1, 0.3)])),
            place: None,
        };
        let ctx = ResolutionContext {
            phrases: &phrases,
            objects: &refs,
            scores: &set,
            literal_match: true,
            min_score: Some(0.5),
        };
        assert_eq!(run_chain(PICK_CHAIN, &ctx, None), None);
    }

    #[test]
    fn test_full_command_skips_claimed() {
        let objects = [obj(1, "red"), obj(2, "blue")];
        let refs: Vec<&ObjectDescriptor> = objects.iter().collect();
        let phrases = ExtractedPhrases::default();
        let set = ScoreSet {
            command: scores(&[(1, 0.9), (2, 0.4)]),
            pick: None,
            place: None,
        };
        let ctx = ResolutionContext {
            phrases: &phrases,
            objects: &refs,
            scores: &set,
            literal_match: false,
            min_score: None,
        };
        let resolved = run_chain(PLACE_CHAIN, &ctx, Some(ObjectId(1))).unwrap();
        assert_eq!(resolved.object, ObjectId(2));
        assert_eq!(resolved.strategy, Strategy::FullCommand);
    }
}
