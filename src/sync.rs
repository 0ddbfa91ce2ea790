//! Merges fetched rates into the rolling `current`/`previous` snapshot pair.
use crate::core::snapshot::{
    LAST_MODIFIED, convert_timestamp, is_meta_field, last_modified, parse_timestamp,
};
use crate::core::{PriceFetcher, PriceSnapshot, SnapshotKind, SnapshotStore};
use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Outcome of a single successful sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub current_updated: bool,
    pub previous_refresh_due: bool,
    pub previous_updated: bool,
}

/// Converts a fetched `last_modified` into the display zone, keeping the raw
/// value when it is not a parseable timestamp string.
fn localize_last_modified(value: &Value, tz: Tz) -> Value {
    value
        .as_str()
        .and_then(|raw| convert_timestamp(raw, tz))
        .map(Value::String)
        .unwrap_or_else(|| value.clone())
}

/// Compares snapshot values, treating `61500` and `61500.0` as the same rate.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y || x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Overwrites keys of `current` with differing values from `fetched`.
///
/// Keys missing from `current` are never added. Returns whether anything
/// changed.
pub fn merge_into_current(current: &mut PriceSnapshot, fetched: &PriceSnapshot, tz: Tz) -> bool {
    let mut updated = false;
    for (key, value) in current.iter_mut() {
        let Some(new_value) = fetched.get(key) else {
            continue;
        };
        let new_value = if key == LAST_MODIFIED {
            localize_last_modified(new_value, tz)
        } else {
            new_value.clone()
        };
        if !same_value(value, &new_value) {
            debug!(key = %key, old = %value, new = %new_value, "Updating current");
            *value = new_value;
            updated = true;
        }
    }
    updated
}

/// `previous` is up to date only when its `last_modified` date is exactly one
/// day before the date of `current`'s. Missing or unparseable timestamps
/// always call for a refresh.
pub fn previous_needs_refresh(current: &PriceSnapshot, previous: &PriceSnapshot) -> bool {
    let current_ts = last_modified(current).and_then(parse_timestamp);
    let previous_ts = last_modified(previous).and_then(parse_timestamp);
    match (current_ts, previous_ts) {
        (Some(current_ts), Some(previous_ts)) => current_ts
            .date()
            .pred_opt()
            .is_none_or(|day_before| previous_ts.date() != day_before),
        _ => true,
    }
}

/// Copies differing price values from `current` into `previous`.
///
/// Only keys present in both are touched and metadata fields are skipped.
pub fn roll_previous(previous: &mut PriceSnapshot, current: &PriceSnapshot) -> bool {
    let mut changed = false;
    for (key, value) in previous.iter_mut() {
        if is_meta_field(key) {
            continue;
        }
        if let Some(current_value) = current.get(key)
            && !same_value(value, current_value)
        {
            debug!(key = %key, old = %value, new = %current_value, "Rolling previous");
            *value = current_value.clone();
            changed = true;
        }
    }
    changed
}

/// Runs the fetch-then-merge flow against a snapshot store.
///
/// Not safe to run concurrently against the same store; callers serialise.
pub struct SnapshotSync {
    fetcher: Arc<dyn PriceFetcher>,
    store: Arc<dyn SnapshotStore>,
    tz: Tz,
}

impl SnapshotSync {
    pub fn new(fetcher: Arc<dyn PriceFetcher>, store: Arc<dyn SnapshotStore>, tz: Tz) -> Self {
        SnapshotSync { fetcher, store, tz }
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    #[instrument(name = "SnapshotSync", skip(self))]
    pub async fn run(&self) -> Result<SyncReport> {
        let fetched = self
            .fetcher
            .fetch_snapshot()
            .await
            .context("Failed to fetch prices")?;
        let mut report = SyncReport::default();

        self.store.save(SnapshotKind::New, &fetched)?;

        let mut current = self.store.load(SnapshotKind::Current)?;
        if merge_into_current(&mut current, &fetched, self.tz) {
            self.store.save(SnapshotKind::Current, &current)?;
            report.current_updated = true;
        }

        let mut previous = self.store.load(SnapshotKind::Previous)?;
        report.previous_refresh_due = previous_needs_refresh(&current, &previous);
        if report.previous_refresh_due
            && !previous.is_empty()
            && roll_previous(&mut previous, &current)
        {
            self.store.save(SnapshotKind::Previous, &previous)?;
            report.previous_updated = true;
        }

        info!(
            current_updated = report.current_updated,
            previous_updated = report.previous_updated,
            "Sync flow finished"
        );
        Ok(report)
    }

    /// Initialises empty `current` and `previous` documents from the last
    /// stored `new` document. Returns whether anything was written.
    pub fn seed(&self) -> Result<bool> {
        let mut latest = self.store.load(SnapshotKind::New)?;
        anyhow::ensure!(
            !latest.is_empty(),
            "No fetched snapshot to seed from; run a sync first"
        );
        if let Some(value) = latest.get_mut(LAST_MODIFIED) {
            *value = localize_last_modified(value, self.tz);
        }

        let mut seeded = false;
        for kind in [SnapshotKind::Current, SnapshotKind::Previous] {
            if self.store.load(kind)?.is_empty() {
                info!("Seeding {} snapshot with {} keys", kind, latest.len());
                self.store.save(kind, &latest)?;
                seeded = true;
            }
        }
        Ok(seeded)
    }
}
