//! Offline feature-hashing embedder.
//!
//! Lower-cased word tokens are hashed into a fixed number of buckets and the
//! resulting count vector is L2-normalised. Texts sharing vocabulary land
//! close together, which is enough for lexical retrieval without a model.

use super::Embedder;
use crate::error::Result;
use async_trait::async_trait;

/// Deterministic bag-of-words embedder.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase());

        for token in tokens {
            let bucket = (fnv1a(token.as_bytes()) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

/// 64-bit FNV-1a. Stable across runs and platforms, unlike `DefaultHasher`.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    bytes.iter().fold(OFFSET, |hash, b| (hash ^ *b as u64).wrapping_mul(PRIME))
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::cosine_similarity;

    #[tokio::test]
    async fn test_deterministic_and_normalised() {
        let embedder = HashEmbedder::new(256);
        let a = embedder.embed("The Krebs cycle").await.unwrap();
        let b = embedder.embed("the KREBS cycle!").await.unwrap();

        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shared_words_score_higher() {
        let embedder = HashEmbedder::new(512);
        let query = embedder.vectorize("photosynthesis chlorophyll");
        let related = embedder.vectorize("Chlorophyll drives photosynthesis in leaves.");
        let unrelated = embedder.vectorize("The French revolution began in 1789.");

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(8);
        assert_eq!(embedder.vectorize("  ...  "), vec![0.0; 8]);
    }
}
