// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Durable Document Store
//!
//! Key/value persistence shared by every watched dataset. Each dataset owns
//! exactly one key and stores its whole payload as a JSON document under it.
//!
//! ## Contract
//!
//! - `get(key)` returns the last upserted document, or `None`
//! - `upsert(key, value)` replaces the document unconditionally
//!
//! There are no transactions across keys and no schema. Several gateway
//! processes may point at the same store; the last writer wins.

use async_trait::async_trait;
use serde_json::Value;

pub mod memory;
pub mod redb_store;

pub use self::memory::MemoryStore;
pub use self::redb_store::RedbStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("store task failed: {0}")]
    Task(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store used as the durable backing for watched caches.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Read the document stored under `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Insert or replace the document stored under `key`.
    async fn upsert(&self, key: &str, value: Value) -> StoreResult<()>;
}
