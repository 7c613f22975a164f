//! Persistence providers for the Period Store.
//!
//! A provider is a plain key-value store of JSON documents. The store reads
//! every key once when it opens and writes the affected key after each
//! mutation. Three implementations are available:
//!
//! - [`MemoryProvider`]: process memory, for tests.
//! - [`FileProvider`]: one JSON file per key in a directory.
//! - [`DatabaseProvider`]: a `snapshots` table reached through sea-orm.

use std::future::Future;

use serde::{Serialize, de::DeserializeOwned};

use crate::ResultEngine;

pub use database::DatabaseProvider;
pub use file::FileProvider;
pub use memory::MemoryProvider;

mod database;
mod file;
mod memory;

/// The documents the store persists, one per logical entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SnapshotKey {
    EmployeeInfo,
    CurrentPeriod,
    SalaryData,
    ExpensesByPeriod,
}

impl SnapshotKey {
    pub const ALL: [SnapshotKey; 4] = [
        Self::EmployeeInfo,
        Self::CurrentPeriod,
        Self::SalaryData,
        Self::ExpensesByPeriod,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmployeeInfo => "employee_info",
            Self::CurrentPeriod => "current_period",
            Self::SalaryData => "salary_data",
            Self::ExpensesByPeriod => "expenses_by_period",
        }
    }
}

/// Key-value storage of serialized snapshots.
///
/// Each call acquires whatever handle the backend needs and releases it
/// before returning, so implementations can be shared freely.
pub trait SnapshotProvider: Send + Sync {
    /// Returns the stored document, or `None` if the key was never written.
    fn load(&self, key: &str) -> impl Future<Output = ResultEngine<Option<String>>> + Send;

    /// Stores `value` under `key`, replacing any previous document.
    fn save(&self, key: &str, value: &str) -> impl Future<Output = ResultEngine<()>> + Send;

    /// Deletes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = ResultEngine<()>> + Send;
}

/// Loads and decodes `key`.
///
/// Returns `None` when the key is absent. Read and decode failures are logged
/// and also yield `None`, so the caller falls back to its default.
pub async fn load_snapshot<P, T>(provider: &P, key: SnapshotKey) -> Option<T>
where
    P: SnapshotProvider + ?Sized,
    T: DeserializeOwned,
{
    let raw = match provider.load(key.as_str()).await {
        Ok(raw) => raw?,
        Err(err) => {
            tracing::warn!("failed to load {}: {err}", key.as_str());
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!("discarding unreadable {}: {err}", key.as_str());
            None
        }
    }
}

/// Encodes `value` and writes it under `key`.
pub async fn save_snapshot<P, T>(provider: &P, key: SnapshotKey, value: &T) -> ResultEngine<()>
where
    P: SnapshotProvider + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    provider.save(key.as_str(), &raw).await
}
