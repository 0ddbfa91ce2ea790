//! Fetching abstractions

use crate::core::snapshot::PriceSnapshot;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Could not find dynamic parameter in page body")]
    TokenNotFound,
    #[error("Expected a JSON object from {0}")]
    NotAnObject(String),
}

/// Pulls the short-lived session token out of an unstructured page body.
pub trait TokenExtractor: Send + Sync {
    fn extract(&self, body: &str) -> Result<String, FetchError>;
}

#[async_trait]
pub trait PriceFetcher: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<PriceSnapshot>;
}
