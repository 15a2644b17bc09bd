//! Grounding configuration with documented constants
//!
//! All tunables of the pipeline live here. Every section has a `Default`
//! matching the tabletop setup the system was calibrated on (three 6 cm
//! cubes in a 3 m workspace, arm home pose 0.7 m above the base).

use crate::action::discretizer::AxisRange;
use crate::core::error::{GroundingError, Result};
use crate::core::types::Position;
use crate::language::phrase::{PhraseRuleSpec, Role};
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration, one section per component
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroundingConfig {
    pub matcher: MatcherConfig,
    pub discretizer: DiscretizerConfig,
    pub motion: MotionConfig,
    pub drop: DropConfig,
    pub encoder: EncoderConfig,
}

impl GroundingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text; missing sections and keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GroundingConfig = toml::from_str(content)?;
        config.validate().map_err(GroundingError::Config)?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Loaded grounding config from {}", path.display());
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (name, range) in self.discretizer.axes() {
            if !(range.lo < range.hi) {
                return Err(format!(
                    "discretizer axis {} has empty range [{}, {}]",
                    name, range.lo, range.hi
                ));
            }
        }

        if self.motion.clearance <= 0.0 {
            return Err(format!(
                "motion.clearance ({}) must be positive",
                self.motion.clearance
            ));
        }

        if self.motion.release_offset >= self.motion.clearance {
            return Err(format!(
                "motion.release_offset ({}) should be < motion.clearance ({})",
                self.motion.release_offset, self.motion.clearance
            ));
        }

        if self.matcher.descriptor_templates.is_empty() {
            return Err("matcher.descriptor_templates must not be empty".into());
        }

        if self.matcher.phrase_variations.is_empty() {
            return Err("matcher.phrase_variations must not be empty".into());
        }

        for template in self
            .matcher
            .descriptor_templates
            .iter()
            .chain(&self.matcher.phrase_variations)
        {
            if !template.contains(NAME_PLACEHOLDER) {
                return Err(format!(
                    "template '{}' is missing the {} placeholder",
                    template, NAME_PLACEHOLDER
                ));
            }
        }

        if self.encoder.timeout_secs == 0 {
            return Err("encoder.timeout_secs must be at least 1".into());
        }

        Ok(())
    }
}

/// Placeholder substituted by descriptor and variation templates
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Phrase extraction and semantic matching
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Ordered extraction rules; first match per role wins
    pub phrase_rules: Vec<PhraseRuleSpec>,

    /// Words that send the place target to the work surface
    pub ground_keywords: Vec<String>,

    /// Captures that are references, not descriptions ("place it on...")
    pub pronouns: Vec<String>,

    /// Descriptor templates per visible object
    ///
    /// Bare nouns embed poorly; several phrasings widen recall.
    pub descriptor_templates: Vec<String>,

    /// Variations generated for each extracted phrase before embedding
    pub phrase_variations: Vec<String>,

    /// Let a canonical name found verbatim in the command decide the pick
    /// before the full-command embedding fallback runs
    pub literal_match: bool,

    /// Pooled scores below this count as failed resolutions.
    /// `None` accepts any score, so a visible object is always found.
    pub min_score: Option<f32>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            phrase_rules: default_phrase_rules(),
            ground_keywords: ["ground", "table", "floor", "down", "surface"]
                .into_iter()
                .map(String::from)
                .collect(),
            pronouns: ["it", "them", "this", "that", "one", "these", "those"]
                .into_iter()
                .map(String::from)
                .collect(),
            descriptor_templates: [
                "{name}",
                "{name} cube",
                "{name} block",
                "the {name}",
                "the {name} cube",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            phrase_variations: ["{name}", "the {name}", "{name} cube", "{name} block"]
                .into_iter()
                .map(String::from)
                .collect(),
            literal_match: true,
            min_score: None,
        }
    }
}

fn default_phrase_rules() -> Vec<PhraseRuleSpec> {
    vec![
        // "pick up the red cube and ..." / "grab the blue one, then ..."
        PhraseRuleSpec::new(
            Role::Pick,
            r"\b(?:pick\s+up|pick|grab|take|lift|get|grasp)\s+(?:the\s+|a\s+|an\s+)?(.+?)(?:\s+(?:and|then)\b|\s*,|\s+(?:on|onto|to|into|over|from|off)\b|$)",
        ),
        // "put the blue block on the green cube"
        PhraseRuleSpec::new(
            Role::Pick,
            r"\b(?:put|place|set|move|stack|drop)\s+(?:the\s+|a\s+|an\s+)?(.+?)\s+(?:on|onto|in|into|at|over|to|atop|down)\b",
        ),
        // "... place it on (top of) the green cube"
        PhraseRuleSpec::new(
            Role::Place,
            r"\b(?:place|put|set|drop|stack|move)\b.*?\b(?:on|onto|in|into|at|over|to|atop)\s+(?:top\s+of\s+)?(?:the\s+|a\s+|an\s+)?(.+?)(?:\s+(?:and|then)\b|\s*,|$)",
        ),
        // bare "... onto the green cube"
        PhraseRuleSpec::new(
            Role::Place,
            r"\b(?:on|onto|atop|over)\s+(?:top\s+of\s+)?(?:the\s+|a\s+|an\s+)?(.+?)(?:\s+(?:and|then)\b|\s*,|$)",
        ),
    ]
}

/// Axis ranges for the 11-bin discretizer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscretizerConfig {
    /// Default ±1.5 m: a 3 m square workspace centred on the arm base
    pub x: AxisRange,
    pub y: AxisRange,
    /// Default 0 to 1 m above the table
    pub z: AxisRange,
    /// Default ±π/2; out-of-range yaw clamps, it does not wrap
    pub yaw: AxisRange,
}

impl Default for DiscretizerConfig {
    fn default() -> Self {
        let half_size = WORKSPACE_SIZE_METERS / 2.0;
        Self {
            x: AxisRange::new(-half_size, half_size),
            y: AxisRange::new(-half_size, half_size),
            z: AxisRange::new(0.0, WORKSPACE_HEIGHT_METERS),
            yaw: AxisRange::new(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2),
        }
    }
}

impl DiscretizerConfig {
    pub fn axes(&self) -> [(&'static str, AxisRange); 4] {
        [("x", self.x), ("y", self.y), ("z", self.z), ("yaw", self.yaw)]
    }
}

const WORKSPACE_SIZE_METERS: f32 = 3.0;
const WORKSPACE_HEIGHT_METERS: f32 = 1.0;

/// Geometry of generated pick and place motions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Height above the target for approach and retreat waypoints (meters)
    pub clearance: f32,

    /// Height above the target at which the gripper closes
    pub grasp_offset: f32,

    /// Height above the drop position at which the gripper opens
    pub release_offset: f32,

    /// Pose the arm returns to after a place
    pub home: Position,

    /// Roll, pitch, yaw held on every vector.
    /// Not taken from the object yaw, even though the yaw token is.
    pub neutral_orientation: [f32; 3],
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            clearance: 0.1,
            grasp_offset: 0.0,
            release_offset: 0.0,
            home: Position::new(0.0, 0.0, 0.7),
            neutral_orientation: [0.0, 0.0, 0.0],
        }
    }
}

/// Where a picked object is released
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// X shift from the pick position for ground releases, keeps the drop
    /// clear of the spot the object came from
    pub ground_offset_x: f32,

    /// Resting height of a released cube's centre on the table
    pub ground_height: f32,

    /// Height added to a target object's centre when stacking (one cube)
    pub stack_height: f32,

    /// Release point when no place target resolved
    pub default_drop: Position,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            ground_offset_x: -0.1,
            ground_height: 0.03,
            stack_height: 0.06,
            default_drop: Position::new(0.4, 0.0, 0.03),
        }
    }
}

/// Embedding provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Model requested from the embeddings endpoint
    pub model: String,

    /// OpenAI-compatible embeddings endpoint
    pub api_url: String,

    /// Upper bound on one batched encode call
    pub timeout_secs: u64,

    /// Output dimension of the offline hashing encoder
    pub hashing_dim: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".into(),
            api_url: "http://localhost:8080/v1/embeddings".into(),
            timeout_secs: 10,
            hashing_dim: 256,
        }
    }
}
