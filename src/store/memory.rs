use crate::core::snapshot::{PriceSnapshot, SnapshotKind};
use crate::core::store::SnapshotStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// In-memory snapshot store, used for tests and dry runs
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<SnapshotKind, PriceSnapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given documents.
    pub fn with(documents: impl IntoIterator<Item = (SnapshotKind, PriceSnapshot)>) -> Self {
        let store = Self::new();
        store
            .inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .extend(documents);
        store
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, kind: SnapshotKind) -> Result<PriceSnapshot> {
        let documents = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Ok(documents.get(&kind).cloned().unwrap_or_default())
    }

    fn save(&self, kind: SnapshotKind, snapshot: &PriceSnapshot) -> Result<()> {
        let mut documents = self.inner.write().unwrap_or_else(|e| e.into_inner());
        debug!("Memory store PUT {}", kind);
        documents.insert(kind, snapshot.clone());
        Ok(())
    }
}
