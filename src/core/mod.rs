//! Core business logic abstractions

pub mod config;
pub mod fetch;
pub mod log;
pub mod snapshot;
pub mod store;

// Re-export main types for cleaner imports
pub use fetch::{FetchError, PriceFetcher, TokenExtractor};
pub use snapshot::{PriceSnapshot, SnapshotKind};
pub use store::SnapshotStore;
