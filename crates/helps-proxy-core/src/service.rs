//! Tool call pipeline
//!
//! One path serves both direct `call_tool` requests and calls the model
//! makes inside the tool loop:
//!
//! 1. allow-list check
//! 2. catalog lookup
//! 3. hidden parameters dropped
//! 4. required arguments checked against the filtered schema
//! 5. upstream call, intro-note filter, normalization

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::catalog::{validate_arguments, ToolCatalog};
use crate::config::FilterConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::execution::ToolExecutor;
use crate::filter::{filter_arguments, filter_book_chapter_notes, filter_schema, filter_tools};
use crate::logging::SharedLogger;
use crate::normalize::normalize;
use crate::types::{CancellationToken, CanonicalContent, Tool, ToolCall};
use crate::upstream::ToolRouter;
use crate::{log_debug, log_info};

pub struct ToolService {
    router: Arc<ToolRouter>,
    catalog: Arc<ToolCatalog>,
    filters: RwLock<FilterConfig>,
    logger: SharedLogger,
}

impl ToolService {
    pub fn new(
        router: Arc<ToolRouter>,
        catalog: Arc<ToolCatalog>,
        filters: FilterConfig,
        logger: SharedLogger,
    ) -> Self {
        Self {
            router,
            catalog,
            filters: RwLock::new(filters),
            logger,
        }
    }

    pub fn router(&self) -> &Arc<ToolRouter> {
        &self.router
    }

    pub fn catalog(&self) -> &Arc<ToolCatalog> {
        &self.catalog
    }

    /// Snapshot of the live filter settings
    pub fn filters(&self) -> FilterConfig {
        self.filters.read().clone()
    }

    pub fn set_filters(&self, filters: FilterConfig) {
        *self.filters.write() = filters;
    }

    /// Catalog tools visible under the current filters
    pub async fn list_tools(&self, cancel: &CancellationToken) -> ProxyResult<Vec<Tool>> {
        let tools = self.catalog.get_all_tools(cancel).await?;
        Ok(filter_tools(&tools, &self.filters()))
    }

    pub async fn call_tool(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
        cancel: &CancellationToken,
    ) -> ProxyResult<CanonicalContent> {
        // One snapshot for the whole call, so a concurrent update cannot
        // mix two filter sets inside a single request.
        let filters = self.filters();

        if !filters.is_tool_enabled(name) {
            return Err(ProxyError::tool_disabled(name));
        }

        let tool = self
            .catalog
            .get_tool(name, cancel)
            .await?
            .ok_or_else(|| ProxyError::tool_not_found(name))?;

        let arguments = filter_arguments(arguments, &filters);
        let visible = Tool {
            input_schema: filter_schema(&tool.input_schema, &filters),
            ..tool
        };
        validate_arguments(&visible, &arguments)?;

        log_info!(self.logger, "[ToolService] calling {}", name);
        let payload = self.router.call(name, &arguments, cancel).await?;
        let payload = filter_book_chapter_notes(payload, &filters);
        let content = normalize(&payload);

        log_debug!(self.logger, "[ToolService] {} returned {} block(s)", name, content.len());
        Ok(content)
    }
}

#[async_trait]
impl ToolExecutor for ToolService {
    async fn execute(&self, call: &ToolCall, cancel: &CancellationToken) -> ProxyResult<CanonicalContent> {
        self.call_tool(&call.name, &call.arguments, cancel).await
    }
}

impl std::fmt::Debug for ToolService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolService")
            .field("catalog", &self.catalog)
            .field("filters", &*self.filters.read())
            .finish()
    }
}
