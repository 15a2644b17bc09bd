//! Batched query layout and aggregate-max score pooling

use crate::core::types::ObjectId;
use crate::embedding::{similarity_matrix, Embedding};
use crate::language::descriptors::{expand_templates, Candidate};
use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::ops::Range;

/// One pooled score per object, in first-encountered order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectScores(Vec<(ObjectId, f32)>);

impl ObjectScores {
    /// Pool a `variations x candidates` similarity matrix
    ///
    /// Per candidate the max over phrase variations (any wording may hit),
    /// then per object the max over its own descriptors.
    pub fn pool(sims: &[Vec<f32>], candidates: &[Candidate]) -> Self {
        let mut order: Vec<(ObjectId, f32)> = Vec::new();
        let mut index: AHashMap<ObjectId, usize> = AHashMap::new();

        for (j, candidate) in candidates.iter().enumerate() {
            let best_variation = sims
                .iter()
                .filter_map(|row| row.get(j).copied())
                .fold(f32::NEG_INFINITY, f32::max);

            match index.get(&candidate.object) {
                Some(&i) => {
                    if best_variation > order[i].1 {
                        order[i].1 = best_variation;
                    }
                }
                None => {
                    index.insert(candidate.object, order.len());
                    order.push((candidate.object, best_variation));
                }
            }
        }

        Self(order)
    }

    /// Highest score, skipping `exclude`; ties go to the earlier object
    pub fn best(&self, exclude: Option<ObjectId>) -> Option<(ObjectId, f32)> {
        let mut best: Option<(ObjectId, f32)> = None;
        for &(id, score) in &self.0 {
            if Some(id) == exclude {
                continue;
            }
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((id, score)),
            }
        }
        best
    }

    /// Objects by descending score; the sort is stable so ties keep order
    pub fn ranked(&self) -> Vec<(ObjectId, f32)> {
        let mut ranked = self.0.clone();
        ranked.sort_by_key(|&(_, score)| Reverse(OrderedFloat(score)));
        ranked
    }

    pub fn get(&self, id: ObjectId) -> Option<f32> {
        self.0.iter().find(|(o, _)| *o == id).map(|(_, s)| *s)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ObjectId, f32)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pooled scores for every query group of one decision
#[derive(Debug, Clone, Default)]
pub struct ScoreSet {
    pub command: ObjectScores,
    pub pick: Option<ObjectScores>,
    pub place: Option<ObjectScores>,
}

/// Layout of the single encoder batch behind one decision
///
/// Texts are `[command, pick variations.., place variations..]`; candidate
/// descriptors are appended after the queries when the batch is sent.
#[derive(Debug, Clone)]
pub struct QueryBatch {
    queries: Vec<String>,
    pick: Option<Range<usize>>,
    place: Option<Range<usize>>,
}

impl QueryBatch {
    pub fn new(command: &str, pick: Option<&str>, place: Option<&str>, variations: &[String]) -> Self {
        let mut queries = vec![command.to_string()];
        let mut push_group = |phrase: Option<&str>| {
            phrase.map(|p| {
                let start = queries.len();
                queries.extend(expand_templates(variations, p));
                start..queries.len()
            })
        };
        let pick = push_group(pick);
        let place = push_group(place);

        Self {
            queries,
            pick,
            place,
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    /// Every text for the encoder: queries first, then descriptors
    pub fn texts(&self, candidates: &[Candidate]) -> Vec<String> {
        self.queries
            .iter()
            .cloned()
            .chain(candidates.iter().map(|c| c.text.clone()))
            .collect()
    }

    /// Split the encoder output back into groups and pool each one
    pub fn score(&self, embeddings: &[Embedding], candidates: &[Candidate]) -> ScoreSet {
        let (queries, targets) = embeddings.split_at(self.query_count().min(embeddings.len()));
        let pool_range = |range: &Range<usize>| {
            let sims = similarity_matrix(&queries[range.clone()], targets);
            ObjectScores::pool(&sims, candidates)
        };

        ScoreSet {
            command: pool_range(&(0..1)),
            pick: self.pick.as_ref().map(pool_range),
            place: self.place.as_ref().map(pool_range),
        }
    }
}
