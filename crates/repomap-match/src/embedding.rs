//! Pluggable embedding matcher with a two-tier cache: an in-memory map
//! keyed by SHA-256 of the text, backed by a directory of one file per
//! embedding. The embedding model itself is a pluggable provider — this
//! crate ships a lightweight hashing-based default rather than bundling
//! a multi-gigabyte pretrained model (see DESIGN.md).

use crate::Matcher;
use parking_lot::RwLock;
use repomap_core::error::Result;
use repomap_core::types::{sort_matches, Match};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub type Embedding = Vec<f32>;

/// A pretrained code-embedding model, or a stand-in for one. Batch
/// computation is preferred over one-at-a-time calls.
pub trait EmbeddingProvider: Send + Sync {
    fn dimensions(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> Vec<Embedding>;

    fn embed(&self, text: &str) -> Embedding {
        self.embed_batch(std::slice::from_ref(&text.to_string())).into_iter().next().unwrap_or_default()
    }
}

/// A deterministic, dependency-free stand-in: hashes token n-grams into
/// a fixed-width bag-of-features vector. Not semantically meaningful
/// across unrelated vocabularies, but stable, fast, and good enough to
/// exercise the caching and fusion layers above it without a model
/// download.
pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(8),
        }
    }
}

impl Default for HashingEmbeddingProvider {
    fn default() -> Self {
        Self::new(128)
    }
}

impl EmbeddingProvider for HashingEmbeddingProvider {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed_batch(&self, texts: &[String]) -> Vec<Embedding> {
        texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0_f32; self.dimensions];
                for word in crate::tokenize::tokenize(text) {
                    let hash = Sha256::digest(word.as_bytes());
                    let bucket = (u32::from_le_bytes([hash[0], hash[1], hash[2], hash[3]]) as usize) % self.dimensions;
                    vector[bucket] += 1.0;
                }
                let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
                if norm > 0.0 {
                    for v in vector.iter_mut() {
                        *v /= norm;
                    }
                }
                vector
            })
            .collect()
    }
}

fn content_key(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    hex(&hash)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub struct EmbeddingMatcher {
    provider: Box<dyn EmbeddingProvider>,
    memory_cache: RwLock<HashMap<String, Embedding>>,
    disk_cache_dir: Option<PathBuf>,
}

impl EmbeddingMatcher {
    pub fn new(provider: Box<dyn EmbeddingProvider>, disk_cache_dir: Option<PathBuf>) -> Self {
        Self {
            provider,
            memory_cache: RwLock::new(HashMap::new()),
            disk_cache_dir,
        }
    }

    fn embedding_for(&self, text: &str) -> Embedding {
        let key = content_key(text);
        if let Some(hit) = self.memory_cache.read().get(&key) {
            return hit.clone();
        }
        if let Some(dir) = &self.disk_cache_dir {
            if let Ok(Some(cached)) = self.read_disk(dir, &key) {
                self.memory_cache.write().insert(key, cached.clone());
                return cached;
            }
        }
        let embedding = self.provider.embed(text);
        if let Some(dir) = &self.disk_cache_dir {
            if let Err(e) = self.write_disk(dir, &key, &embedding) {
                tracing::warn!(error = %e, "failed to persist embedding to disk cache");
            }
        }
        self.memory_cache.write().insert(key, embedding.clone());
        embedding
    }

    /// Precompute embeddings for a whole corpus in one provider call.
    pub fn warm(&self, texts: &[String]) {
        let uncached: Vec<String> = texts.iter().filter(|t| !self.memory_cache.read().contains_key(&content_key(t))).cloned().collect();
        if uncached.is_empty() {
            return;
        }
        let embeddings = self.provider.embed_batch(&uncached);
        for (text, embedding) in uncached.into_iter().zip(embeddings) {
            let key = content_key(&text);
            if let Some(dir) = &self.disk_cache_dir {
                let _ = self.write_disk(dir, &key, &embedding);
            }
            self.memory_cache.write().insert(key, embedding);
        }
    }

    fn disk_path(dir: &Path, key: &str) -> PathBuf {
        dir.join(format!("{key}.bin"))
    }

    fn read_disk(&self, dir: &Path, key: &str) -> Result<Option<Embedding>> {
        let path = Self::disk_path(dir, key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path)?;
        let embedding = bytes.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect();
        Ok(Some(embedding))
    }

    fn write_disk(&self, dir: &Path, key: &str, embedding: &[f32]) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let mut bytes = Vec::with_capacity(embedding.len() * 4);
        for v in embedding {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        std::fs::write(Self::disk_path(dir, key), bytes)?;
        Ok(())
    }

    pub fn similarity(&self, query: &str, candidate: &str) -> f64 {
        let a = self.embedding_for(query);
        let b = self.embedding_for(candidate);
        cosine(&a, &b)
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        ((dot / (norm_a * norm_b)) as f64).clamp(0.0, 1.0)
    }
}

impl Matcher for EmbeddingMatcher {
    fn match_query(&self, query: &str, corpus: &[String]) -> Vec<Match> {
        let mut matches: Vec<Match> = corpus
            .iter()
            .map(|candidate| Match::new(candidate.clone(), self.similarity(query, candidate)))
            .filter(|m| m.score > 0)
            .collect();
        sort_matches(&mut matches);
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_scores_one() {
        let matcher = EmbeddingMatcher::new(Box::new(HashingEmbeddingProvider::default()), None);
        assert!((matcher.similarity("get_user", "get_user") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn disk_cache_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = EmbeddingMatcher::new(Box::new(HashingEmbeddingProvider::default()), Some(dir.path().to_path_buf()));
        let first = matcher.embedding_for("get_user");
        // Fresh matcher, same disk cache dir: should read back the same
        // vector rather than recomputing and drifting.
        let second_matcher = EmbeddingMatcher::new(Box::new(HashingEmbeddingProvider::default()), Some(dir.path().to_path_buf()));
        let second = second_matcher.embedding_for("get_user");
        assert_eq!(first, second);
    }

    #[test]
    fn warm_populates_memory_cache_for_whole_corpus() {
        let matcher = EmbeddingMatcher::new(Box::new(HashingEmbeddingProvider::default()), None);
        let corpus = vec!["get_user".to_string(), "set_user".to_string()];
        matcher.warm(&corpus);
        assert_eq!(matcher.memory_cache.read().len(), 2);
    }
}
