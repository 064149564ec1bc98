// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local [`DurableStore`] for tests and ephemeral runs.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DurableStore, StoreResult};

#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-seeded with one document, as a previous process
    /// would have left it.
    pub fn with_document(key: impl Into<String>, value: Value) -> Self {
        let mut documents = HashMap::new();
        documents.insert(key.into(), value);
        Self {
            documents: RwLock::new(documents),
        }
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn upsert(&self, key: &str, value: Value) -> StoreResult<()> {
        self.documents.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
