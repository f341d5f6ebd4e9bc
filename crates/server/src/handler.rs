//! MCP server handler implementation.
//!
//! This module defines the main server handler that routes tool calls to the
//! coordinator's event surface.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use novel_sw_client::{Coordinator, RecordingHost};

use crate::tools::{
    ClickParams, MessageParams, PushParams, SwFetchParams, SyncParams, click_impl, fetch_impl, list_impl,
    message_impl, push_impl, status_impl, sync_impl,
};

/// The main MCP server handler for novel-sw.
#[derive(Clone)]
pub struct NovelSwServer {
    tool_router: ToolRouter<Self>,
    coordinator: Arc<Coordinator>,
    host: Arc<RecordingHost>,
}

#[tool_router]
impl NovelSwServer {
    /// Create a handler around an installed and activated coordinator.
    pub fn new(coordinator: Arc<Coordinator>, host: Arc<RecordingHost>) -> Self {
        Self { tool_router: Self::tool_router(), coordinator, host }
    }

    #[tool(
        description = "Offer a request to the offline cache coordinator as if a page issued it. Returns the response, the strategy used and where the response came from."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.coordinator, params.0).await
    }

    #[tool(description = "Post a control message (SKIP_WAITING, CLEAR_CACHE, CACHE_URLS). Unknown messages are ignored.")]
    async fn sw_message(&self, params: Parameters<MessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.coordinator, &self.host, params.0).await
    }

    #[tool(description = "Deliver a push message. Shows the payload's notification, or the default one.")]
    async fn sw_push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.coordinator, &self.host, params.0).await
    }

    #[tool(description = "Click a notification. Opens a window at its data.url, or the site root.")]
    async fn sw_notification_click(&self, params: Parameters<ClickParams>) -> Result<CallToolResult, McpError> {
        click_impl(&self.coordinator, &self.host, params.0).await
    }

    #[tool(description = "Fire a background sync event for a tag.")]
    async fn sw_sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.coordinator, &self.host, params.0).await
    }

    #[tool(description = "Report the coordinator's lifecycle state, version and partition names.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.coordinator).await
    }

    #[tool(description = "List every cache partition with its entry count.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.coordinator).await
    }
}

impl ServerHandler for NovelSwServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "novel-sw".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
