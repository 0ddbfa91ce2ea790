use crate::core::config::FilesConfig;
use crate::core::snapshot::{PriceSnapshot, SnapshotKind};
use crate::core::store::SnapshotStore;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Stores each snapshot as an indented UTF-8 JSON file under `data_dir`.
pub struct DiskStore {
    data_dir: PathBuf,
    files: FilesConfig,
}

impl DiskStore {
    pub fn new(data_dir: impl Into<PathBuf>, files: FilesConfig) -> Self {
        DiskStore {
            data_dir: data_dir.into(),
            files,
        }
    }

    pub fn path_for(&self, kind: SnapshotKind) -> PathBuf {
        let name = match kind {
            SnapshotKind::New => &self.files.new,
            SnapshotKind::Current => &self.files.current,
            SnapshotKind::Previous => &self.files.previous,
        };
        self.data_dir.join(name)
    }
}

impl SnapshotStore for DiskStore {
    fn load(&self, kind: SnapshotKind) -> Result<PriceSnapshot> {
        let path = self.path_for(kind);
        if !path.exists() {
            debug!("No {} snapshot at {}", kind, path.display());
            return Ok(PriceSnapshot::new());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
        let snapshot: PriceSnapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot file: {}", path.display()))?;
        debug!("Loaded {} snapshot with {} keys", kind, snapshot.len());
        Ok(snapshot)
    }

    fn save(&self, kind: SnapshotKind, snapshot: &PriceSnapshot) -> Result<()> {
        fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Failed to create data directory: {}", self.data_dir.display())
        })?;

        let mut buf = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        snapshot
            .serialize(&mut serializer)
            .with_context(|| format!("Failed to serialize {kind} snapshot"))?;

        let path = self.path_for(kind);
        fs::write(&path, buf)
            .with_context(|| format!("Failed to write snapshot file: {}", path.display()))?;
        debug!("Saved {} snapshot to {}", kind, path.display());
        Ok(())
    }
}
