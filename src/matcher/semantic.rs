//! Semantic matcher: ground extracted phrases onto visible objects

use crate::core::config::MatcherConfig;
use crate::core::error::Result;
use crate::core::types::{ObjectDescriptor, ObjectId, SceneSnapshot};
use crate::embedding::{encode_checked, similarity_matrix, TextEncoder};
use crate::language::descriptors::{expand_templates, Candidate, CandidateDescriptorBuilder};
use crate::language::phrase::PhraseExtractor;
use crate::matcher::decision::{MatchDecision, MatchDiagnostics, PlaceTarget};
use crate::matcher::scoring::{ObjectScores, QueryBatch, ScoreSet};
use crate::matcher::strategy::{run_chain, ResolutionContext, Resolved, Strategy, PICK_CHAIN, PLACE_CHAIN};

/// Resolves pick and place references for one command at a time
///
/// Borrows the encoder; the caller owns it and may share it between
/// matchers.
pub struct SemanticMatcher<'a> {
    encoder: &'a dyn TextEncoder,
    extractor: PhraseExtractor,
    descriptors: CandidateDescriptorBuilder,
    config: MatcherConfig,
}

impl<'a> SemanticMatcher<'a> {
    /// Compiles the phrase rules; fails only on bad configuration
    pub fn new(encoder: &'a dyn TextEncoder, config: &MatcherConfig) -> Result<Self> {
        Ok(Self {
            encoder,
            extractor: PhraseExtractor::from_config(config)?,
            descriptors: CandidateDescriptorBuilder::from_config(config),
            config: config.clone(),
        })
    }

    pub fn extractor(&self) -> &PhraseExtractor {
        &self.extractor
    }

    /// Descriptor candidates for the visible objects of `snapshot`
    pub fn candidates(&self, snapshot: &SceneSnapshot) -> Vec<Candidate> {
        self.descriptors.build(snapshot.objects())
    }

    /// Best object for a single phrase, skipping `exclude`
    ///
    /// One encoder call covering the phrase variations and `candidates`.
    /// `Ok(None)` when there is nothing to match or every score falls under
    /// the configured minimum.
    pub fn resolve(
        &self,
        phrase: &str,
        candidates: &[Candidate],
        exclude: Option<ObjectId>,
    ) -> Result<Option<(ObjectId, f32)>> {
        let phrase = phrase.trim().to_lowercase();
        if phrase.is_empty() || candidates.is_empty() {
            return Ok(None);
        }

        let queries = expand_templates(&self.config.phrase_variations, &phrase);
        let split = queries.len();
        let texts: Vec<String> = queries
            .into_iter()
            .chain(candidates.iter().map(|c| c.text.clone()))
            .collect();

        let embeddings = encode_checked(self.encoder, &texts)?;
        let (query_vecs, target_vecs) = embeddings.split_at(split);
        let scores = ObjectScores::pool(&similarity_matrix(query_vecs, target_vecs), candidates);

        Ok(scores
            .best(exclude)
            .filter(|&(_, score)| self.config.min_score.map_or(true, |min| score >= min)))
    }

    /// Ground a full command against the visible objects of `snapshot`
    ///
    /// Never fails on odd wording. The only error is
    /// [`EncoderUnavailable`](crate::core::error::GroundingError::EncoderUnavailable).
    pub fn decide(&self, command: &str, snapshot: &SceneSnapshot) -> Result<MatchDecision> {
        let phrases = self.extractor.extract(command);
        let visible: Vec<&ObjectDescriptor> = snapshot.visible().collect();

        if phrases.normalized.is_empty() || visible.is_empty() {
            tracing::debug!(
                "Nothing to ground (command empty: {}, visible objects: {})",
                phrases.normalized.is_empty(),
                visible.len()
            );
            return Ok(MatchDecision::unresolved(snapshot.cycle, phrases));
        }

        let candidates = self.descriptors.build(visible.iter().copied());
        // A ground place never needs its phrase scored
        let place_query = if phrases.ground { None } else { phrases.place.as_deref() };
        let batch = QueryBatch::new(
            &phrases.normalized,
            phrases.pick.as_deref(),
            place_query,
            &self.config.phrase_variations,
        );

        let embeddings = encode_checked(self.encoder, &batch.texts(&candidates))?;
        let scores = batch.score(&embeddings, &candidates);

        let ctx = ResolutionContext {
            phrases: &phrases,
            objects: &visible,
            scores: &scores,
            literal_match: self.config.literal_match,
            min_score: self.config.min_score,
        };

        let pick = run_chain(PICK_CHAIN, &ctx, None);
        let mut collision_resolved = false;

        let place = if phrases.ground {
            None
        } else {
            let claimed = pick.map(|p| p.object);
            match (run_chain(PLACE_CHAIN, &ctx, claimed), pick) {
                (Some(place), Some(pick)) if place.object == pick.object => {
                    collision_resolved = true;
                    rerank_place(&scores, pick.object)
                }
                (place, _) => place,
            }
        };

        if let Some(p) = &pick {
            tracing::debug!("Pick resolved to {} via {:?} ({:.3})", p.object, p.strategy, p.score);
        }

        let (place_target, place_strategy) = if phrases.ground {
            (Some(PlaceTarget::Ground), Some(Strategy::Ground))
        } else {
            (
                place.map(|p| PlaceTarget::Object(p.object)),
                place.map(|p| p.strategy),
            )
        };

        let ScoreSet {
            command: command_scores,
            pick: pick_scores,
            place: place_scores,
        } = scores;

        Ok(MatchDecision {
            cycle: snapshot.cycle,
            pick: pick.map(|p| p.object),
            place: place_target,
            ground: phrases.ground,
            pick_score: pick.map(|p| p.score),
            place_score: place.map(|p| p.score),
            phrases,
            diagnostics: MatchDiagnostics {
                pick_strategy: pick.map(|p| p.strategy),
                place_strategy,
                pick_scores,
                place_scores,
                command_scores,
                collision_resolved,
                encoder_model: Some(self.encoder.model_name().to_string()),
            },
        })
    }
}

/// Next-best object by full-command score once place collided with pick;
/// `None` when the pick is the only object
fn rerank_place(scores: &ScoreSet, pick: ObjectId) -> Option<Resolved> {
    let reassigned = scores
        .command
        .ranked()
        .into_iter()
        .find(|&(id, _)| id != pick)
        .map(|(object, score)| Resolved {
            object,
            score,
            strategy: Strategy::CollisionRerank,
        });

    match &reassigned {
        Some(r) => tracing::info!("Place collided with pick {}, reassigned to {}", pick, r.object),
        None => tracing::info!("Place collided with pick {} and no other object is visible", pick),
    }

    reassigned
}
