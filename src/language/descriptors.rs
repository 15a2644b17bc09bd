//! Expand object names into descriptor phrasings for embedding lookup

use crate::core::config::{MatcherConfig, NAME_PLACEHOLDER};
use crate::core::types::{ObjectDescriptor, ObjectId};
use serde::{Deserialize, Serialize};

/// One descriptor string standing in for an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub text: String,
    pub object: ObjectId,
}

/// Builds the candidate list the matcher scores phrases against
#[derive(Debug, Clone)]
pub struct CandidateDescriptorBuilder {
    templates: Vec<String>,
}

impl CandidateDescriptorBuilder {
    pub fn new(templates: Vec<String>) -> Self {
        Self { templates }
    }

    pub fn from_config(config: &MatcherConfig) -> Self {
        Self::new(config.descriptor_templates.clone())
    }

    /// Descriptor strings for one canonical name, in template order
    pub fn descriptors_for(&self, name: &str) -> Vec<String> {
        expand_templates(&self.templates, name)
    }

    /// `(descriptor, object)` pairs for every visible object
    ///
    /// Objects keep perception order. Each contributes its template
    /// expansions followed by its own extra descriptors, and strings that
    /// repeat across objects are still emitted once per object.
    pub fn build<'a>(&self, objects: impl IntoIterator<Item = &'a ObjectDescriptor>) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for obj in objects.into_iter().filter(|o| o.visible) {
            let texts = self
                .descriptors_for(&obj.name)
                .into_iter()
                .chain(obj.descriptors.iter().cloned());
            candidates.extend(texts.map(|text| Candidate {
                text,
                object: obj.id,
            }));
        }
        candidates
    }
}

impl Default for CandidateDescriptorBuilder {
    fn default() -> Self {
        Self::from_config(&MatcherConfig::default())
    }
}

/// Substitute `name` into each `{name}` template
pub fn expand_templates(templates: &[String], name: &str) -> Vec<String> {
    templates
        .iter()
        .map(|t| t.replace(NAME_PLACEHOLDER, name))
        .collect()
}
