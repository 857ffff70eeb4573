//! HTTP ingestion of marketplace source documents.
//!
//! Source documents are JSON objects keyed by repository id. Fetches retry
//! on transient failures and successful bodies are cached in memory for a
//! configurable TTL.

use std::collections::HashMap;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use ureq::Agent;

use crate::marketplace::{MarketplaceRecord, SourceConfig, validate_source_url};
use crate::{Error, Result};

const MAX_RETRIES: u32 = 3;
const RETRY_DELAYS_MS: [u64; 3] = [100, 500, 2000];
const SIZE_LIMIT: u64 = 10 * 1024 * 1024;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

struct CacheEntry {
    body: String,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// HTTP client for source documents, with retries and an in-memory TTL
/// cache keyed by URL.
pub struct Fetcher {
    agent: Agent,
    cache_ttl: Duration,
    cache: HashMap<String, CacheEntry>,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_settings(
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        )
    }

    pub fn with_settings(timeout: Duration, cache_ttl: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            cache_ttl,
            cache: HashMap::new(),
        }
    }

    /// Fetches a URL body as text, consulting the cache first.
    pub fn fetch_text(&mut self, url: &str) -> Result<String> {
        if let Some(entry) = self.cache.get(url) {
            if entry.is_fresh(self.cache_ttl) {
                debug!("cache hit for {url}");
                return Ok(entry.body.clone());
            }
            debug!("cache expired for {url}");
            self.cache.remove(url);
        }

        let body = self.fetch_with_retries(url)?;
        self.cache.insert(
            url.to_string(),
            CacheEntry {
                body: body.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(body)
    }

    /// Fetches and deserializes a JSON document.
    pub fn fetch_json<T: DeserializeOwned>(&mut self, url: &str) -> Result<T> {
        let text = self.fetch_text(url)?;
        serde_json::from_str(&text).map_err(Error::from)
    }

    /// Fetches a source document and flattens it into validated records.
    /// Invalid entries are logged and skipped.
    pub fn fetch_source_records(&mut self, source: &SourceConfig) -> Result<Vec<MarketplaceRecord>> {
        validate_source_url(&source.url)?;
        let document: serde_json::Map<String, serde_json::Value> = self.fetch_json(&source.url)?;
        let records = flatten_records(document, &source.url);
        info!("fetched {} marketplace records from {}", records.len(), source.url);
        Ok(records)
    }

    fn fetch_with_retries(&self, url: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match self.try_fetch(url) {
                Ok(body) => return Ok(body),
                Err(e) => {
                    if is_retryable(&e) && attempt < MAX_RETRIES - 1 {
                        thread::sleep(Duration::from_millis(RETRY_DELAYS_MS[attempt as usize]));
                        last_error = Some(e);
                    } else {
                        error!("failed to fetch {url}: {e}");
                        return Err(e);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Http("max retries exceeded".into())))
    }

    fn try_fetch(&self, url: &str) -> Result<String> {
        info!("fetching {url}");
        let mut response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::StatusCode(code) => Error::Http(format!("HTTP {code} for {url}")),
            ureq::Error::Io(io_err) => Error::Http(format!("transport error: {io_err}")),
            _ => Error::Http(format!("request failed: {e}")),
        })?;

        // Check content-length header before reading body
        if let Some(len) = response.headers().get("content-length")
            && let Ok(size) = len.to_str().unwrap_or("").parse::<u64>()
            && size > SIZE_LIMIT
        {
            return Err(Error::SizeLimit {
                size,
                limit: SIZE_LIMIT,
            });
        }

        // ureq 3.x: must use body_mut().with_config().limit() to override 10MB default
        let bytes = response
            .body_mut()
            .with_config()
            .limit(SIZE_LIMIT)
            .read_to_vec()
            .map_err(|e| Error::Http(format!("read error: {e}")))?;

        if bytes.len() as u64 > SIZE_LIMIT {
            return Err(Error::SizeLimit {
                size: bytes.len() as u64,
                limit: SIZE_LIMIT,
            });
        }

        String::from_utf8(bytes).map_err(|e| Error::Http(format!("invalid UTF-8: {e}")))
    }
}

/// Flattens a `{repo_id: record}` document, assigning each record the id it
/// was keyed under and dropping entries that fail validation.
fn flatten_records(
    document: serde_json::Map<String, serde_json::Value>,
    source_url: &str,
) -> Vec<MarketplaceRecord> {
    let mut records = Vec::new();
    for (repo_id, value) in document {
        let mut record: MarketplaceRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(err) => {
                warn!("skipping malformed record '{repo_id}' from {source_url}: {err}");
                continue;
            }
        };
        record.id = repo_id;
        if let Err(err) = record.validate() {
            warn!("skipping invalid record '{}' from {source_url}: {err}", record.id);
            continue;
        }
        records.push(record);
    }
    records
}

fn is_retryable(e: &Error) -> bool {
    match e {
        Error::Http(msg) => {
            msg.contains("transport")
                || msg.contains("HTTP 5")
                || msg.contains("timeout")
                || msg.contains("connection")
        }
        _ => false,
    }
}
