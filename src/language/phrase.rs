//! Extract pick/place reference phrases from free-text commands
//!
//! Extraction is rule-driven: an ordered list of `(role, pattern)` pairs is
//! evaluated per role and the first rule producing a usable phrase wins.
//! New phrasings are added by adding rules, never by touching the matcher.

use crate::core::config::MatcherConfig;
use crate::core::error::{GroundingError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which part of a pick-and-place command a phrase refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The object to grasp
    Pick,
    /// Where the grasped object goes
    Place,
}

/// Uncompiled rule as it appears in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseRuleSpec {
    pub role: Role,
    /// Regex with exactly one capture group holding the phrase
    pub pattern: String,
}

impl PhraseRuleSpec {
    pub fn new(role: Role, pattern: impl Into<String>) -> Self {
        Self {
            role,
            pattern: pattern.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct PhraseRule {
    role: Role,
    pattern: Regex,
}

/// Phrases pulled out of one command
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPhrases {
    /// The command after lowercasing and trimming
    pub normalized: String,
    pub pick: Option<String>,
    pub place: Option<String>,
    /// A ground keyword appeared; overrides any place object
    pub ground: bool,
}

impl ExtractedPhrases {
    pub fn phrase(&self, role: Role) -> Option<&str> {
        match role {
            Role::Pick => self.pick.as_deref(),
            Role::Place => self.place.as_deref(),
        }
    }
}

/// Ordered-rule phrase extractor
#[derive(Debug, Clone)]
pub struct PhraseExtractor {
    rules: Vec<PhraseRule>,
    ground_keywords: Vec<String>,
    pronouns: Vec<String>,
}

impl PhraseExtractor {
    /// Compile the rules and keyword lists from matcher configuration
    pub fn from_config(config: &MatcherConfig) -> Result<Self> {
        Self::new(&config.phrase_rules, &config.ground_keywords, &config.pronouns)
    }

    pub fn new(specs: &[PhraseRuleSpec], ground_keywords: &[String], pronouns: &[String]) -> Result<Self> {
        let mut rules = Vec::with_capacity(specs.len());
        for spec in specs {
            let pattern = Regex::new(&spec.pattern)?;
            // captures_len counts the implicit whole-match group
            if pattern.captures_len() != 2 {
                return Err(GroundingError::Config(format!(
                    "phrase rule '{}' must have exactly one capture group",
                    spec.pattern
                )));
            }
            rules.push(PhraseRule {
                role: spec.role,
                pattern,
            });
        }

        Ok(Self {
            rules,
            ground_keywords: ground_keywords.iter().map(|k| k.to_lowercase()).collect(),
            pronouns: pronouns.iter().map(|p| p.to_lowercase()).collect(),
        })
    }

    /// Extract pick and place phrases plus the ground flag
    ///
    /// Never fails: text no rule understands yields `None` for that role.
    pub fn extract(&self, command: &str) -> ExtractedPhrases {
        let normalized = command.trim().to_lowercase();
        if normalized.is_empty() {
            return ExtractedPhrases::default();
        }

        let pick = self.first_match(Role::Pick, &normalized, None);
        let place = self.first_match(Role::Place, &normalized, pick.as_deref());

        let ground = self.contains_ground_keyword(&normalized)
            || place
                .as_deref()
                .is_some_and(|p| self.contains_ground_keyword(p));

        tracing::debug!(
            "Extracted phrases: pick={:?} place={:?} ground={}",
            pick,
            place,
            ground
        );

        ExtractedPhrases {
            normalized,
            pick,
            place,
            ground,
        }
    }

    fn first_match(&self, role: Role, text: &str, reserved: Option<&str>) -> Option<String> {
        self.rules
            .iter()
            .filter(|rule| rule.role == role)
            .filter_map(|rule| rule.pattern.captures(text))
            .filter_map(|caps| caps.get(1).map(|m| clean_phrase(m.as_str())))
            .find(|phrase| self.is_usable(phrase) && Some(phrase.as_str()) != reserved)
    }

    fn is_usable(&self, phrase: &str) -> bool {
        !phrase.is_empty() && !self.pronouns.iter().any(|p| p == phrase)
    }

    /// Whole-word keyword test, so "tablet" does not read as "table"
    pub fn contains_ground_keyword(&self, text: &str) -> bool {
        words(text).any(|w| self.ground_keywords.iter().any(|k| k == w))
    }
}

fn clean_phrase(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .trim()
        .to_string()
}

/// Lowercase alphanumeric words of `text`
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_extractor() -> PhraseExtractor {
        PhraseExtractor::from_config(&MatcherConfig::default()).unwrap()
    }

    fn extract(text: &str) -> ExtractedPhrases {
        default_extractor().extract(text)
    }

    #[test]
    fn test_pick_up_and_place_on_ground() {
        let phrases = extract("Pick up the red cube and place it on the ground");
        assert_eq!(phrases.pick.as_deref(), Some("red cube"));
        assert_eq!(phrases.place.as_deref(), Some("ground"));
        assert!(phrases.ground);
    }

    #[test]
    fn test_put_x_on_y() {
        let phrases = extract("put the blue block on the green cube");
        assert_eq!(phrases.pick.as_deref(), Some("blue block"));
        assert_eq!(phrases.place.as_deref(), Some("green cube"));
        assert!(!phrases.ground);
    }

    #[test]
    fn test_stack_on_top_of() {
        let phrases = extract("grab the green cube, then stack it on top of the red cube");
        assert_eq!(phrases.pick.as_deref(), Some("green cube"));
        assert_eq!(phrases.place.as_deref(), Some("red cube"));
    }

    #[test]
    fn test_table_sets_ground_flag() {
        let phrases = extract("grab the red cube and place it on the table");
        assert!(phrases.ground);
    }

    #[test]
    fn test_put_down_sets_ground_flag() {
        let phrases = extract("put the red cube down");
        assert_eq!(phrases.pick.as_deref(), Some("red cube"));
        assert!(phrases.ground);
    }

    #[test]
    fn test_ground_keyword_is_whole_word() {
        let extractor = default_extractor();
        assert!(!extractor.contains_ground_keyword("the tablet cube"));
        assert!(extractor.contains_ground_keyword("on the table."));
    }

    #[test]
    fn test_pronoun_capture_is_skipped() {
        let phrases = extract("lift it");
        assert_eq!(phrases.pick, None);
    }

    #[test]
    fn test_place_does_not_reuse_pick_phrase() {
        let extractor = PhraseExtractor::new(
            &[
                PhraseRuleSpec::new(Role::Pick, r"move\s+(\w+)"),
                PhraseRuleSpec::new(Role::Place, r"move\s+(\w+)"),
            ],
            &[],
            &[],
        )
        .unwrap();
        let phrases = extractor.extract("move red");
        assert_eq!(phrases.pick.as_deref(), Some("red"));
        assert_eq!(phrases.place, None);
    }

    #[test]
    fn test_rule_order_decides() {
        let extractor = PhraseExtractor::new(
            &[
                PhraseRuleSpec::new(Role::Pick, r"fetch\s+(\w+)"),
                PhraseRuleSpec::new(Role::Pick, r"fetch\s+(\w+\s+\w+)"),
            ],
            &[],
            &[],
        )
        .unwrap();
        assert_eq!(extractor.extract("fetch red cube").pick.as_deref(), Some("red"));
    }

    #[test]
    fn test_empty_and_unparseable_text() {
        assert_eq!(extract(""), ExtractedPhrases::default());
        let phrases = extract("hello there");
        assert_eq!(phrases.pick, None);
        assert_eq!(phrases.place, None);
        assert!(!phrases.ground);
        assert_eq!(phrases.normalized, "hello there");
    }

    #[test]
    fn test_rule_without_capture_group_rejected() {
        let result = PhraseExtractor::new(&[PhraseRuleSpec::new(Role::Pick, r"pick\s+\w+")], &[], &[]);
        assert!(matches!(result, Err(GroundingError::Config(_))));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let result = PhraseExtractor::new(&[PhraseRuleSpec::new(Role::Pick, r"pick\s+(")], &[], &[]);
        assert!(matches!(result, Err(GroundingError::InvalidPattern(_))));
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Place).unwrap(), "\"place\"");
    }
}
