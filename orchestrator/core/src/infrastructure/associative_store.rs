// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory associative store with FIFO eviction and cosine-similarity lookup.

use nalgebra::DVector;
use parking_lot::RwLock;
use std::collections::VecDeque;
use tracing::{debug, trace};

use crate::domain::config::MemoryConfig;
use crate::domain::error::{AmemError, AmemResult, VectorRole};
use crate::domain::memory::{cosine_similarity, MemoryEntry};
use crate::domain::repository::MemoryStore;

struct Slot {
    key: DVector<f64>,
    value: DVector<f64>,
}

/// Bounded key/value memory. Oldest entries sit at the front of the deque and
/// are evicted first once `capacity` is exceeded.
///
/// Mutations take the write lock and retrieval the read lock, so readers never
/// observe a half-appended or half-evicted state.
pub struct InMemoryAssociativeStore {
    capacity: usize,
    embedding_dim: usize,
    slots: RwLock<VecDeque<Slot>>,
}

impl InMemoryAssociativeStore {
    pub fn new(capacity: usize, embedding_dim: usize) -> Self {
        Self {
            capacity,
            embedding_dim,
            slots: RwLock::new(VecDeque::with_capacity(capacity.min(1024) + 1)),
        }
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        Self::new(config.capacity, config.embedding_dim)
    }

    fn check_dim(&self, role: VectorRole, vector: &DVector<f64>) -> AmemResult<()> {
        if vector.len() != self.embedding_dim {
            return Err(AmemError::dimension(role, self.embedding_dim, vector.len()));
        }
        Ok(())
    }
}

impl MemoryStore for InMemoryAssociativeStore {
    fn store(&self, key: &DVector<f64>, value: &DVector<f64>) -> AmemResult<()> {
        self.check_dim(VectorRole::Key, key)?;
        self.check_dim(VectorRole::Value, value)?;

        let mut slots = self.slots.write();
        slots.push_back(Slot {
            key: key.clone(),
            value: value.clone(),
        });

        if slots.len() > self.capacity {
            slots.pop_front();
            debug!(capacity = self.capacity, "Memory full, evicted oldest entry");
        }
        trace!(size = slots.len(), "Stored memory entry");

        Ok(())
    }

    fn retrieve(&self, query: &DVector<f64>, k: usize) -> AmemResult<Vec<MemoryEntry>> {
        self.check_dim(VectorRole::Query, query)?;

        let slots = self.slots.read();
        let mut scored: Vec<(&Slot, f64)> = slots
            .iter()
            .map(|slot| (slot, cosine_similarity(query, &slot.key)))
            .collect();

        // Stable: equal similarities keep insertion order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(slot, similarity)| MemoryEntry {
                key: slot.key.clone(),
                value: slot.value.clone(),
                similarity,
            })
            .collect())
    }

    fn update(&self, key: &DVector<f64>, value: &DVector<f64>) -> AmemResult<()> {
        let mut slots = self.slots.write();
        if slots.is_empty() {
            return Err(AmemError::EmptyStore);
        }
        self.check_dim(VectorRole::Key, key)?;
        self.check_dim(VectorRole::Value, value)?;

        let mut best_idx = 0;
        let mut best_similarity = f64::NEG_INFINITY;
        for (idx, slot) in slots.iter().enumerate() {
            let similarity = cosine_similarity(key, &slot.key);
            if similarity > best_similarity {
                best_idx = idx;
                best_similarity = similarity;
            }
        }

        slots[best_idx].value = value.clone();
        debug!(index = best_idx, similarity = best_similarity, "Updated memory entry");

        Ok(())
    }

    fn clear(&self) {
        self.slots.write().clear();
    }

    fn size(&self) -> usize {
        self.slots.read().len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }
}
