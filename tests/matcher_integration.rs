//! Integration tests for command grounding

use std::cell::Cell;

use tabletop_grounding::core::config::MatcherConfig;
use tabletop_grounding::core::{GroundingError, ObjectDescriptor, ObjectId, Position, Result, SceneSnapshot};
use tabletop_grounding::embedding::{Embedding, HashingEncoder, TextEncoder};
use tabletop_grounding::matcher::{PlaceTarget, SemanticMatcher, Strategy};

/// Wraps the hashing encoder and counts provider calls
struct CountingEncoder {
    inner: HashingEncoder,
    calls: Cell<usize>,
    texts: Cell<usize>,
}

impl CountingEncoder {
    fn new() -> Self {
        Self {
            inner: HashingEncoder::default(),
            calls: Cell::new(0),
            texts: Cell::new(0),
        }
    }
}

impl TextEncoder for CountingEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        self.calls.set(self.calls.get() + 1);
        self.texts.set(self.texts.get() + texts.len());
        self.inner.encode(texts)
    }

    fn model_name(&self) -> &str {
        "counting"
    }
}

/// Returns one vector too few
struct TruncatingEncoder;

impl TextEncoder for TruncatingEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(vec![vec![1.0, 0.0]; texts.len().saturating_sub(1)])
    }

    fn model_name(&self) -> &str {
        "truncating"
    }
}

fn rgb_scene() -> SceneSnapshot {
    SceneSnapshot::new(
        1,
        vec![
            ObjectDescriptor::new(ObjectId(10), "red", Position::new(0.55, -0.15, 0.03), 0.0),
            ObjectDescriptor::new(ObjectId(11), "green", Position::new(0.55, 0.0, 0.03), 0.0),
            ObjectDescriptor::new(ObjectId(12), "blue", Position::new(0.55, 0.15, 0.03), 0.0),
        ],
    )
}

#[test]
fn test_ground_command_places_on_ground() {
    let encoder = HashingEncoder::default();
    let matcher = SemanticMatcher::new(&encoder, &MatcherConfig::default()).unwrap();
    let decision = matcher
        .decide("pick up the red cube and place it on the ground", &rgb_scene())
        .unwrap();

    assert!(decision.ground);
    assert_eq!(decision.place, Some(PlaceTarget::Ground));
    assert_eq!(decision.pick, Some(ObjectId(10)));
}

#[test]
fn test_empty_command_yields_no_pick() {
    let encoder = CountingEncoder::new();
    let matcher = SemanticMatcher::new(&encoder, &MatcherConfig::default()).unwrap();

    for command in ["", "   ", "\n\t"] {
        let decision = matcher.decide(command, &rgb_scene()).unwrap();
        assert_eq!(decision.pick, None);
        assert!(!decision.is_resolved());
    }
    assert_eq!(encoder.calls.get(), 0);
}

#[test]
fn test_no_visible_objects_yields_no_pick() {
    let encoder = CountingEncoder::new();
    let matcher = SemanticMatcher::new(&encoder, &MatcherConfig::default()).unwrap();
    let scene = SceneSnapshot::new(
        3,
        vec![ObjectDescriptor::new(ObjectId(1), "red", Position::default(), 0.0).hidden()],
    );

    let decision = matcher.decide("grab the red cube", &scene).unwrap();
    assert_eq!(decision.pick, None);
    assert_eq!(encoder.calls.get(), 0);
}

#[test]
fn test_identical_descriptors_first_wins() {
    let encoder = HashingEncoder::default();
    let matcher = SemanticMatcher::new(&encoder, &MatcherConfig::default()).unwrap();
    let scene = SceneSnapshot::new(
        1,
        vec![
            ObjectDescriptor::new(ObjectId(5), "red", Position::new(0.5, -0.1, 0.03), 0.0),
            ObjectDescriptor::new(ObjectId(9), "red", Position::new(0.5, 0.1, 0.03), 0.0),
        ],
    );

    let decision = matcher.decide("grab the red cube", &scene).unwrap();
    assert_eq!(decision.pick, Some(ObjectId(5)));
    assert_ne!(decision.place_object(), Some(ObjectId(5)));
}

#[test]
fn test_pick_and_place_never_collide_with_two_or_more_objects() {
    let encoder = HashingEncoder::default();
    let matcher = SemanticMatcher::new(&encoder, &MatcherConfig::default()).unwrap();
    let commands = [
        "put the red cube on the red block",
        "grab the green cube then put it on the green one",
        "stack blue on blue",
        "move the red cube",
        "red",
        "place it somewhere nice",
        "put the blue block on the green cube",
    ];

    for command in commands {
        let decision = matcher.decide(command, &rgb_scene()).unwrap();
        if let (Some(pick), Some(place)) = (decision.pick, decision.place_object()) {
            assert_ne!(pick, place, "collision for {:?}", command);
        }
        assert!(decision.pick.is_some(), "no pick for {:?}", command);
    }
}

#[test]
fn test_collision_rerank_is_recorded() {
    let encoder = HashingEncoder::default();
    let matcher = SemanticMatcher::new(&encoder, &MatcherConfig::default()).unwrap();
    let decision = matcher
        .decide("put the red cube on the red block", &rgb_scene())
        .unwrap();

    assert!(decision.diagnostics.collision_resolved);
    assert_eq!(decision.diagnostics.place_strategy, Some(Strategy::CollisionRerank));
}

#[test]
fn test_decide_uses_one_batched_encoder_call() {
    let encoder = CountingEncoder::new();
    let matcher = SemanticMatcher::new(&encoder, &MatcherConfig::default()).unwrap();
    matcher
        .decide("put the blue block on the green cube", &rgb_scene())
        .unwrap();

    assert_eq!(encoder.calls.get(), 1);
    // command + 4 pick variations + 4 place variations + 3 objects x 5 descriptors
    assert_eq!(encoder.texts.get(), 1 + 4 + 4 + 15);
}

#[test]
fn test_ground_command_skips_place_variations() {
    let encoder = CountingEncoder::new();
    let matcher = SemanticMatcher::new(&encoder, &MatcherConfig::default()).unwrap();
    matcher
        .decide("pick up the red cube and place it on the ground", &rgb_scene())
        .unwrap();

    assert_eq!(encoder.calls.get(), 1);
    assert_eq!(encoder.texts.get(), 1 + 4 + 15);
}

#[test]
fn test_short_encoder_response_is_encoder_unavailable() {
    let matcher = SemanticMatcher::new(&TruncatingEncoder, &MatcherConfig::default()).unwrap();
    let result = matcher.decide("grab the red cube", &rgb_scene());
    assert!(matches!(result, Err(GroundingError::EncoderUnavailable(_))));
}

#[test]
fn test_perception_descriptors_extend_recall() {
    let encoder = HashingEncoder::default();
    let matcher = SemanticMatcher::new(&encoder, &MatcherConfig::default()).unwrap();
    let scene = SceneSnapshot::new(
        1,
        vec![
            ObjectDescriptor::new(ObjectId(1), "red", Position::default(), 0.0),
            ObjectDescriptor::new(ObjectId(2), "yellow", Position::default(), 0.0)
                .with_descriptors(vec!["banana".into()]),
        ],
    );

    let decision = matcher.decide("grab the banana", &scene).unwrap();
    assert_eq!(decision.pick, Some(ObjectId(2)));
}

#[test]
fn test_decision_serializes() {
    let encoder = HashingEncoder::default();
    let matcher = SemanticMatcher::new(&encoder, &MatcherConfig::default()).unwrap();
    let decision = matcher
        .decide("put the blue block on the green cube", &rgb_scene())
        .unwrap();

    let json = serde_json::to_value(&decision).unwrap();
    assert_eq!(json["pick"], 12);
    assert_eq!(json["place"]["object"], 11);
    assert_eq!(json["diagnostics"]["pick_strategy"], "pick_phrase");
}
