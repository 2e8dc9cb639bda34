//! Sentence-embedding vectorization using fastembed, with an in-memory cache.

use std::collections::HashMap;
use std::sync::RwLock;

use fastembed::{EmbeddingModel as FastEmbedModel, InitOptions, TextEmbedding};
use ndarray::Array2;

use crate::core::config::{EmbeddingConfig, EmbeddingModelKind};
use crate::core::errors::{Result, SkaldError};

/// Provider for generating document embeddings.
pub struct EmbeddingVectorizer {
    model: RwLock<TextEmbedding>,
    dimension: usize,
    cache: RwLock<EmbeddingCache>,
}

/// Per-run cache keyed by xxh3 of the joined document text.
struct EmbeddingCache {
    entries: HashMap<u64, Vec<f32>>,
    max_entries: usize,
    hits: usize,
    misses: usize,
}

impl EmbeddingCache {
    fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
            hits: 0,
            misses: 0,
        }
    }

    fn get(&mut self, hash: u64) -> Option<Vec<f32>> {
        if let Some(vec) = self.entries.get(&hash) {
            self.hits += 1;
            Some(vec.clone())
        } else {
            self.misses += 1;
            None
        }
    }

    fn insert(&mut self, hash: u64, embedding: Vec<f32>) {
        // At capacity, shed half the entries before inserting
        if self.entries.len() >= self.max_entries {
            let evicted: Vec<u64> = self
                .entries
                .keys()
                .take(self.max_entries / 2)
                .copied()
                .collect();
            for key in evicted {
                self.entries.remove(&key);
            }
        }
        self.entries.insert(hash, embedding);
    }

    fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl EmbeddingVectorizer {
    /// Create a new embedding vectorizer with the given configuration.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let dimension = config.model.dimension();

        let mut init_options = InitOptions::new(config.model.to_fastembed_model());
        init_options = init_options.with_show_download_progress(config.show_download_progress);
        if let Some(ref cache_dir) = config.cache_dir {
            init_options = init_options.with_cache_dir(cache_dir.into());
        }

        let model = TextEmbedding::try_new(init_options).map_err(|e| {
            SkaldError::external(format!("Failed to initialize embedding model: {e}"))
        })?;

        Ok(Self {
            model: RwLock::new(model),
            dimension,
            cache: RwLock::new(EmbeddingCache::new(10_000)),
        })
    }

    /// Fixed embedding width of the loaded model.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed a batch of documents into an N×D matrix, N preserving input order.
    pub fn embed_documents(&self, texts: &[String]) -> Result<Array2<f64>> {
        if texts.is_empty() {
            return Err(SkaldError::pipeline("vectorize", "no documents to embed"));
        }

        let vectors = self.embed_batch(texts)?;
        let mut matrix = Array2::<f64>::zeros((vectors.len(), self.dimension));
        for (row, vector) in vectors.iter().enumerate() {
            if vector.len() != self.dimension {
                return Err(SkaldError::internal(format!(
                    "embedding width {} does not match model dimension {}",
                    vector.len(),
                    self.dimension
                )));
            }
            for (col, &value) in vector.iter().enumerate() {
                matrix[[row, col]] = f64::from(value);
            }
        }
        Ok(matrix)
    }

    /// Generate embeddings for multiple texts, consulting the cache first.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut uncached_indices: Vec<usize> = Vec::new();
        let mut uncached_texts: Vec<String> = Vec::new();

        {
            let mut cache = self
                .cache
                .write()
                .map_err(|e| SkaldError::internal(format!("cache lock poisoned: {e}")))?;
            for (i, text) in texts.iter().enumerate() {
                if let Some(embedding) = cache.get(hash_text(text)) {
                    results[i] = Some(embedding);
                } else {
                    uncached_indices.push(i);
                    uncached_texts.push(text.clone());
                }
            }
        }

        if !uncached_texts.is_empty() {
            let text_refs: Vec<&str> = uncached_texts.iter().map(String::as_str).collect();
            let new_embeddings = {
                let mut model = self
                    .model
                    .write()
                    .map_err(|e| SkaldError::internal(format!("model lock poisoned: {e}")))?;
                model
                    .embed(text_refs, None)
                    .map_err(|e| SkaldError::external(format!("Batch embedding failed: {e}")))?
            };

            let mut cache = self
                .cache
                .write()
                .map_err(|e| SkaldError::internal(format!("cache lock poisoned: {e}")))?;
            for (i, embedding) in uncached_indices.into_iter().zip(new_embeddings) {
                cache.insert(hash_text(&texts[i]), embedding.clone());
                results[i] = Some(embedding);
            }
        }

        results
            .into_iter()
            .enumerate()
            .map(|(i, opt)| {
                opt.ok_or_else(|| {
                    SkaldError::internal(format!("missing embedding for document {i}"))
                })
            })
            .collect()
    }

    /// Cache statistics: (entries, hit rate).
    pub fn cache_stats(&self) -> Result<(usize, f64)> {
        let cache = self
            .cache
            .read()
            .map_err(|e| SkaldError::internal(format!("cache lock poisoned: {e}")))?;
        Ok((cache.entries.len(), cache.hit_rate()))
    }
}

/// Hash text for the cache key.
fn hash_text(text: &str) -> u64 {
    use xxhash_rust::xxh3::xxh3_64;
    xxh3_64(text.as_bytes())
}

impl EmbeddingModelKind {
    /// Convert to the fastembed model enum.
    pub fn to_fastembed_model(self) -> FastEmbedModel {
        match self {
            Self::AllMiniLmL6V2 => FastEmbedModel::AllMiniLML6V2,
            Self::BgeSmallEnV15 => FastEmbedModel::BGESmallENV15,
            Self::NomicEmbedTextV15 => FastEmbedModel::NomicEmbedTextV15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_counts_hits_and_misses() {
        let mut cache = EmbeddingCache::new(16);
        let key = hash_text("space travel");

        assert!(cache.get(key).is_none());
        cache.insert(key, vec![0.5, -0.5]);
        assert_eq!(cache.get(key).as_deref(), Some([0.5, -0.5].as_slice()));

        assert_eq!(cache.hits, 1);
        assert_eq!(cache.misses, 1);
        assert!((cache.hit_rate() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn cache_sheds_entries_at_capacity() {
        let mut cache = EmbeddingCache::new(8);
        for i in 0..9 {
            cache.insert(i, vec![i as f32]);
        }

        // The ninth insert evicted half of the first eight
        assert_eq!(cache.entries.len(), 5);
        assert!(cache.entries.contains_key(&8));
    }

    #[test]
    fn cache_keys_are_stable_per_text() {
        assert_eq!(hash_text("space travel"), hash_text("space travel"));
        assert_ne!(hash_text("space travel"), hash_text("space travels"));
    }
}
