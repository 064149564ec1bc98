// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded document store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `documents`: dataset key → JSON bytes of the latest payload

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, TableDefinition};
use serde_json::Value;

use super::{DurableStore, StoreError, StoreResult};

/// Dataset key → serialized payload (JSON bytes).
const DOCUMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

/// redb-backed [`DurableStore`].
///
/// redb is synchronous, so every call runs on the blocking thread pool.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so read transactions on a fresh file succeed
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DOCUMENTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    fn get_blocking(db: &Database, key: &str) -> StoreResult<Option<Value>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS)?;
        match table.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes.value())?)),
            None => Ok(None),
        }
    }

    fn upsert_blocking(db: &Database, key: &str, value: &Value) -> StoreResult<()> {
        let json = serde_json::to_vec(value)?;
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(DOCUMENTS)?;
            table.insert(key, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[async_trait]
impl DurableStore for RedbStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let db = Arc::clone(&self.db);
        let key = key.to_string();
        tokio::task::spawn_blocking(move || Self::get_blocking(&db, &key))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    async fn upsert(&self, key: &str, value: Value) -> StoreResult<()> {
        let db = Arc::clone(&self.db);
        let key = key.to_string();
        tokio::task::spawn_blocking(move || Self::upsert_blocking(&db, &key, &value))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_store() -> (RedbStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(&dir.path().join("gateway.redb")).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let (store, _dir) = temp_store();
        assert!(store.get("version").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_replaces_document() {
        let (store, _dir) = temp_store();
        store
            .upsert("version", json!({ "version": "v1.1.0" }))
            .await
            .unwrap();
        store
            .upsert("version", json!({ "version": "v1.2.0" }))
            .await
            .unwrap();

        let doc = store.get("version").await.unwrap().unwrap();
        assert_eq!(doc["version"], "v1.2.0");
    }

    #[tokio::test]
    async fn documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gateway.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.upsert("fiat", json!({ "EUR": 0.92 })).await.unwrap();
        }

        let reopened = RedbStore::open(&path).unwrap();
        let doc = reopened.get("fiat").await.unwrap().unwrap();
        assert_eq!(doc, json!({ "EUR": 0.92 }));
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let (store, _dir) = temp_store();
        store.upsert("apps", json!({ "eos": [] })).await.unwrap();

        assert!(store.get("proxies").await.unwrap().is_none());
        assert!(store.get("apps").await.unwrap().is_some());
    }
}
