//! MCP tool implementations.
//!
//! This module contains all tools exposed by the novel-sw server. Each tool
//! returns its output as pretty-printed JSON text content.

pub mod cache;
pub mod events;
pub mod sw_fetch;
pub mod sw_status;

#[cfg(test)]
pub(crate) mod testing;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use novel_sw_core::Error;

pub use cache::list_impl;
pub use events::{
    ClickParams, MessageParams, PushParams, SyncParams, click_impl, message_impl, push_impl, sync_impl,
};
pub use sw_fetch::{SwFetchParams, fetch_impl};
pub use sw_status::status_impl;

/// Serialize a tool output into a successful text result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
