use crate::core::{FetchError, PriceFetcher, PriceSnapshot, TokenExtractor};
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, COOKIE, REFERER};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, instrument};

/// Matches the token in `$.post('/json', {param: "..."})` style page scripts.
static PARAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"param:\s*"([^"]+)""#).expect("Invalid regex"));

/// Extracts the first capture group of a regex from the page body.
#[derive(Debug, Clone)]
pub struct RegexTokenExtractor {
    pattern: Regex,
}

impl RegexTokenExtractor {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern =
            Regex::new(pattern).with_context(|| format!("Invalid token pattern: {pattern}"))?;
        Ok(Self { pattern })
    }
}

impl Default for RegexTokenExtractor {
    fn default() -> Self {
        Self {
            pattern: PARAM_REGEX.clone(),
        }
    }
}

impl TokenExtractor for RegexTokenExtractor {
    fn extract(&self, body: &str) -> Result<String, FetchError> {
        self.pattern
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(FetchError::TokenNotFound)
    }
}

/// Fetches the live rate table from bonbast.com.
///
/// The `/json` endpoint only answers when the request carries the `param`
/// token embedded in the homepage, so every fetch is two sequential calls.
/// Nothing is retried.
pub struct BonbastProvider {
    base_url: String,
    client: reqwest::Client,
    extractor: Box<dyn TokenExtractor>,
}

impl BonbastProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_extractor(base_url, Box::new(RegexTokenExtractor::default()))
    }

    pub fn with_extractor(base_url: &str, extractor: Box<dyn TokenExtractor>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("nerkh/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(BonbastProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            extractor,
        })
    }

    async fn fetch_token(&self) -> Result<String> {
        debug!("Fetching dynamic parameter from {}", self.base_url);
        let page = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.base_url))?
            .error_for_status()
            .with_context(|| format!("Homepage request failed: {}", self.base_url))?
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", self.base_url))?;

        let token = self.extractor.extract(&page)?;
        debug!(token = %token, "Extracted dynamic parameter");
        Ok(token)
    }
}

#[async_trait]
impl PriceFetcher for BonbastProvider {
    #[instrument(name = "BonbastFetch", skip(self), fields(base_url = %self.base_url))]
    async fn fetch_snapshot(&self) -> Result<PriceSnapshot> {
        let token = self.fetch_token().await?;

        let url = format!("{}/json", self.base_url);
        debug!("Requesting price data from {}", url);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded; charset=UTF-8")
            .header(COOKIE, "st_bb=0")
            .header(REFERER, format!("{}/", self.base_url))
            .body(format!("param={token}"))
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?
            .error_for_status()
            .with_context(|| format!("Price request failed: {url}"))?;

        let response_text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;

        let value: Value = serde_json::from_str(&response_text).with_context(|| {
            format!("Failed to parse price response from {url}. Response: '{response_text}'")
        })?;

        match value {
            Value::Object(snapshot) => {
                debug!("Fetched snapshot with {} keys", snapshot.len());
                Ok(snapshot)
            }
            _ => Err(FetchError::NotAnObject(url).into()),
        }
    }
}
