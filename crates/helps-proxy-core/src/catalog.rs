//! Tool catalog with a short-lived cache
//!
//! The catalog is the only state shared across calls. A snapshot is an
//! immutable [`CacheEntry`] behind an `Arc`; refreshes replace it wholesale,
//! so a reader always sees a complete list. Concurrent refreshes are allowed
//! (last writer wins).

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::error::{ProxyError, ProxyResult};
use crate::logging::SharedLogger;
use crate::types::{CancellationToken, Tool};
use crate::{log_debug, log_warn};

/// Where the catalog gets its tools from
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn fetch_tools(&self, cancel: &CancellationToken) -> ProxyResult<Vec<Tool>>;
}

/// One fetched snapshot
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub tools: Vec<Tool>,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn new(tools: Vec<Tool>) -> Self {
        Self {
            tools,
            fetched_at: Instant::now(),
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.name == name)
    }
}

pub struct ToolCatalog {
    source: Arc<dyn ToolSource>,
    ttl: Duration,
    cache: RwLock<Option<Arc<CacheEntry>>>,
    logger: SharedLogger,
}

impl ToolCatalog {
    pub fn new(source: Arc<dyn ToolSource>, ttl: Duration, logger: SharedLogger) -> Self {
        Self {
            source,
            ttl,
            cache: RwLock::new(None),
            logger,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current snapshot, fresh or not
    pub fn snapshot(&self) -> Option<Arc<CacheEntry>> {
        self.cache.read().clone()
    }

    /// A fresh snapshot, refetching when the cached one has expired.
    ///
    /// When the refetch fails and an expired snapshot exists, the expired
    /// snapshot is returned instead of the error.
    pub async fn entry(&self, cancel: &CancellationToken) -> ProxyResult<Arc<CacheEntry>> {
        let cached = self.snapshot();
        if let Some(entry) = cached.as_ref().filter(|e| e.is_fresh(self.ttl)) {
            return Ok(entry.clone());
        }

        match self.source.fetch_tools(cancel).await {
            Ok(tools) => {
                log_debug!(self.logger, "[ToolCatalog] cached {} tools", tools.len());
                let entry = Arc::new(CacheEntry::new(tools));
                *self.cache.write() = Some(entry.clone());
                Ok(entry)
            }
            Err(ProxyError::Cancelled) => Err(ProxyError::Cancelled),
            Err(err) => match cached {
                Some(stale) => {
                    log_warn!(
                        self.logger,
                        "[ToolCatalog] refresh failed, serving stale list of {} tools: {}",
                        stale.tools.len(),
                        err
                    );
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }

    pub async fn get_all_tools(&self, cancel: &CancellationToken) -> ProxyResult<Vec<Tool>> {
        Ok(self.entry(cancel).await?.tools.clone())
    }

    pub async fn get_tool(&self, name: &str, cancel: &CancellationToken) -> ProxyResult<Option<Tool>> {
        Ok(self.entry(cancel).await?.get(name).cloned())
    }

    pub async fn has_tool(&self, name: &str, cancel: &CancellationToken) -> ProxyResult<bool> {
        Ok(self.entry(cancel).await?.get(name).is_some())
    }

    /// Force the next lookup to refetch
    pub fn clear_cache(&self) {
        *self.cache.write() = None;
        log_debug!(self.logger, "[ToolCatalog] cache cleared");
    }
}

impl std::fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCatalog")
            .field("ttl", &self.ttl)
            .field("cached", &self.cache.read().as_ref().map(|e| e.tools.len()))
            .finish()
    }
}

/// Every `required` key must be present and non-null
pub fn validate_arguments(tool: &Tool, arguments: &Map<String, Value>) -> ProxyResult<()> {
    let missing: Vec<&str> = tool
        .input_schema
        .required
        .iter()
        .filter(|key| arguments.get(key.as_str()).map_or(true, Value::is_null))
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ProxyError::invalid_arguments(
            &tool.name,
            format!("missing required parameter(s): {}", missing.join(", ")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays scripted fetch results
    struct ScriptedSource {
        results: Mutex<VecDeque<ProxyResult<Vec<Tool>>>>,
        fetches: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(results: Vec<ProxyResult<Vec<Tool>>>) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                fetches: AtomicUsize::new(0),
            })
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ToolSource for ScriptedSource {
        async fn fetch_tools(&self, _cancel: &CancellationToken) -> ProxyResult<Vec<Tool>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.results
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ProxyError::connection("http://up", "script exhausted")))
        }
    }

    fn tools(names: &[&str]) -> Vec<Tool> {
        names.iter().map(|n| Tool::new(*n, "")).collect()
    }

    fn catalog(source: &Arc<ScriptedSource>, ttl: Duration) -> ToolCatalog {
        ToolCatalog::new(source.clone(), ttl, NoOpLogger::shared())
    }

    #[tokio::test]
    async fn test_fresh_cache_is_reused() {
        let source = ScriptedSource::new(vec![Ok(tools(&["a", "b"]))]);
        let catalog = catalog(&source, Duration::from_secs(300));
        let cancel = CancellationToken::new();

        assert_eq!(catalog.get_all_tools(&cancel).await.unwrap().len(), 2);
        assert!(catalog.has_tool("b", &cancel).await.unwrap());
        assert!(catalog.get_tool("zzz", &cancel).await.unwrap().is_none());
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn test_expired_cache_is_refreshed() {
        let source = ScriptedSource::new(vec![Ok(tools(&["a"])), Ok(tools(&["a", "b", "c"]))]);
        let catalog = catalog(&source, Duration::from_millis(20));
        let cancel = CancellationToken::new();

        assert_eq!(catalog.get_all_tools(&cancel).await.unwrap().len(), 1);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(catalog.get_all_tools(&cancel).await.unwrap().len(), 3);
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn test_stale_entry_served_on_refresh_failure() {
        let source = ScriptedSource::new(vec![
            Ok(tools(&["a"])),
            Err(ProxyError::response("http://up", 503, "busy")),
        ]);
        let catalog = catalog(&source, Duration::from_millis(10));
        let cancel = CancellationToken::new();

        catalog.get_all_tools(&cancel).await.unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;

        let served = catalog.get_all_tools(&cancel).await.unwrap();
        assert_eq!(served[0].name, "a");
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn test_failure_without_cache_propagates() {
        let source = ScriptedSource::new(vec![Err(ProxyError::invalid_response("no tools"))]);
        let err = catalog(&source, Duration::from_secs(1))
            .get_all_tools(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidUpstreamResponse(_)));
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let source = ScriptedSource::new(vec![Ok(tools(&["a"])), Ok(tools(&["b"]))]);
        let catalog = catalog(&source, Duration::from_secs(300));
        let cancel = CancellationToken::new();

        catalog.get_all_tools(&cancel).await.unwrap();
        catalog.clear_cache();
        assert!(catalog.snapshot().is_none());

        let refreshed = catalog.get_all_tools(&cancel).await.unwrap();
        assert_eq!(refreshed[0].name, "b");
    }

    #[test]
    fn test_validate_arguments() {
        let tool = Tool::new("fetch_scripture", "")
            .with_property("reference", json!({"type": "string"}), true)
            .with_property("language", json!({"type": "string"}), true);

        let ok = json!({"reference": "John 3:16", "language": "en"});
        assert!(validate_arguments(&tool, ok.as_object().unwrap()).is_ok());

        let partial = json!({"reference": null});
        let err = validate_arguments(&tool, partial.as_object().unwrap()).unwrap_err();
        match err {
            ProxyError::InvalidArguments { tool, message } => {
                assert_eq!(tool, "fetch_scripture");
                assert!(message.contains("reference"));
                assert!(message.contains("language"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
