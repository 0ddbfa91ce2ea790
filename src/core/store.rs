use crate::core::snapshot::{PriceSnapshot, SnapshotKind};
use anyhow::Result;

/// Backing storage for the `new`, `current` and `previous` documents.
///
/// Loading a document that was never saved yields an empty snapshot. Saves
/// overwrite unconditionally; there is no locking or cross-document
/// transaction, so only one sync may run against a store at a time.
pub trait SnapshotStore: Send + Sync {
    fn load(&self, kind: SnapshotKind) -> Result<PriceSnapshot>;

    fn save(&self, kind: SnapshotKind, snapshot: &PriceSnapshot) -> Result<()>;
}
