//! Command text handling
//!
//! Turns raw command text into reference phrases, and object names into the
//! descriptor phrasings those references are scored against.

pub mod descriptors;
pub mod phrase;

pub use descriptors::{Candidate, CandidateDescriptorBuilder};
pub use phrase::{ExtractedPhrases, PhraseExtractor, PhraseRuleSpec, Role};
