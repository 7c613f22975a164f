use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{EngineError, ResultEngine};

use super::SnapshotProvider;

/// In-process provider. Clones share the same map.
///
/// [`set_failing`](MemoryProvider::set_failing) makes every call fail, which
/// is how tests reach the fallback paths.
#[derive(Clone, Debug, Default)]
pub struct MemoryProvider {
    documents: Arc<Mutex<HashMap<String, String>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryProvider {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn is_empty(&self) -> bool {
        self.documents
            .lock()
            .map(|documents| documents.is_empty())
            .unwrap_or(true)
    }

    fn documents(&self) -> ResultEngine<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EngineError::Storage("memory provider unavailable".to_string()));
        }
        self.documents
            .lock()
            .map_err(|_| EngineError::Storage("memory provider poisoned".to_string()))
    }
}

impl SnapshotProvider for MemoryProvider {
    async fn load(&self, key: &str) -> ResultEngine<Option<String>> {
        Ok(self.documents()?.get(key).cloned())
    }

    async fn save(&self, key: &str, value: &str) -> ResultEngine<()> {
        self.documents()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> ResultEngine<()> {
        self.documents()?.remove(key);
        Ok(())
    }
}
