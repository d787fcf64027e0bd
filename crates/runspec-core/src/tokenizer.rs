//! Name-keyed tokenizer cache for execution engines consuming run specs.
//!
//! Each distinct (alias-resolved) name is loaded at most once, even under
//! concurrent `get` calls. The critical section is per key: a slow load for
//! one tokenizer does not block hits or loads for another. A failed load is
//! not cached; the next caller retries.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

/// Tokenizer cache errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerError {
    #[error("unknown tokenizer: {0}")]
    UnknownTokenizer(String),

    #[error("failed to load tokenizer '{name}': {reason}")]
    Load { name: String, reason: String },
}

/// Alternate names that resolve to one underlying tokenizer.
const TOKENIZER_ALIASES: &[(&str, &str)] = &[
    ("huggingface/gpt2", "gpt2"),
    ("google/t5-11b", "t5-11b"),
];

/// Canonical cache key for `name`.
pub fn resolve_tokenizer_name(name: &str) -> &str {
    TOKENIZER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Source of tokenizers, typically a network or disk fetch.
#[async_trait]
pub trait TokenizerLoader: Send + Sync {
    type Tokenizer: Send + Sync;

    async fn load(&self, name: &str) -> Result<Self::Tokenizer, TokenizerError>;
}

type Slot<T> = Arc<OnceCell<Arc<T>>>;

pub struct TokenizerCache<L: TokenizerLoader> {
    loader: L,
    slots: Mutex<HashMap<String, Slot<L::Tokenizer>>>,
}

impl<L: TokenizerLoader> TokenizerCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Tokenizer for `name`, loading it on first use.
    pub async fn get(&self, name: &str) -> Result<Arc<L::Tokenizer>, TokenizerError> {
        let key = resolve_tokenizer_name(name).to_string();
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(key.clone()).or_default().clone()
        };

        let loaded = slot
            .get_or_try_init(|| async {
                debug!(tokenizer = %key, "loading tokenizer");
                self.loader.load(&key).await.map(Arc::new)
            })
            .await;

        match loaded {
            Ok(tokenizer) => Ok(Arc::clone(tokenizer)),
            Err(e) => {
                warn!(tokenizer = %key, error = %e, "tokenizer load failed");
                self.evict_empty(&key, &slot).await;
                Err(e)
            }
        }
    }

    /// Drop `slot` from the map if it is still the one stored under `key`
    /// and nobody has filled it since.
    async fn evict_empty(&self, key: &str, slot: &Slot<L::Tokenizer>) {
        let mut slots = self.slots.lock().await;
        let stale = slots
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.initialized());
        if stale {
            slots.remove(key);
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Whether `name` is loaded (after alias resolution).
    pub async fn is_loaded(&self, name: &str) -> bool {
        let slots = self.slots.lock().await;
        slots
            .get(resolve_tokenizer_name(name))
            .is_some_and(|slot| slot.initialized())
    }

    /// Number of names holding a slot, loaded or still loading.
    pub async fn tracked_count(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// Number of loaded tokenizers.
    pub async fn loaded_count(&self) -> usize {
        let slots = self.slots.lock().await;
        slots.values().filter(|slot| slot.initialized()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(resolve_tokenizer_name("huggingface/gpt2"), "gpt2");
        assert_eq!(resolve_tokenizer_name("google/t5-11b"), "t5-11b");
        assert_eq!(resolve_tokenizer_name("EleutherAI/gpt-j-6B"), "EleutherAI/gpt-j-6B");
    }
}
