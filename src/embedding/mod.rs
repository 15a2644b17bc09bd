//! Text embedding seam
//!
//! The matcher never talks to a model directly. It goes through
//! [`TextEncoder`], which is constructed once by the caller and passed
//! down by reference. Two providers ship with the crate:
//!
//! - [`HttpEncoder`]: OpenAI-compatible `/embeddings` endpoint
//! - [`HashingEncoder`]: deterministic offline bag-of-words projection

pub mod hashing;
pub mod http;

pub use hashing::HashingEncoder;
pub use http::HttpEncoder;

use crate::core::error::{GroundingError, Result};

/// One embedding vector
pub type Embedding = Vec<f32>;

/// External embedding provider
///
/// Implementations must return one L2-normalized vector per input text, in
/// input order, and must be deterministic for identical text under a fixed
/// model version. Any failure is reported as
/// [`GroundingError::EncoderUnavailable`].
pub trait TextEncoder {
    /// Embed a batch of texts in a single provider call
    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>>;

    /// Model identifier, for diagnostics
    fn model_name(&self) -> &str;
}

/// Encode and verify the provider honoured the one-vector-per-text contract
pub fn encode_checked(encoder: &dyn TextEncoder, texts: &[String]) -> Result<Vec<Embedding>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    tracing::debug!(
        "Encoding batch of {} texts with {}",
        texts.len(),
        encoder.model_name()
    );

    let embeddings = encoder.encode(texts)?;
    if embeddings.len() != texts.len() {
        return Err(GroundingError::EncoderUnavailable(format!(
            "{} returned {} vectors for {} texts",
            encoder.model_name(),
            embeddings.len(),
            texts.len()
        )));
    }

    Ok(embeddings)
}

/// Cosine similarity; zero when either vector has no length
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom > 1e-12 {
        dot / denom
    } else {
        0.0
    }
}

/// Pairwise similarities: `result[i][j] = cos(queries[i], targets[j])`
pub fn similarity_matrix(queries: &[Embedding], targets: &[Embedding]) -> Vec<Vec<f32>> {
    queries
        .iter()
        .map(|q| targets.iter().map(|t| cosine_similarity(q, t)).collect())
        .collect()
}

/// Scale to unit length in place; zero vectors are left alone
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 1e-12 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
