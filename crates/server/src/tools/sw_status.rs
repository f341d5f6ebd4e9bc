//! sw_status tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::{Deserialize, Serialize};

use novel_sw_client::{Coordinator, Lifecycle};

use super::json_result;

/// Output from the sw_status tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwStatusOutput {
    pub state: Lifecycle,
    pub version: String,
    pub origin: String,
    /// Partition names of the running version.
    pub partitions: Vec<String>,
    pub precache: Vec<String>,
    pub offline_fallback: String,
}

pub async fn status_impl(coordinator: &Coordinator) -> Result<CallToolResult, McpError> {
    let config = coordinator.config();
    let output = SwStatusOutput {
        state: coordinator.state().await,
        version: config.partitions.version().to_string(),
        origin: config.origin.to_string(),
        partitions: config.partitions.names(),
        precache: config.precache.iter().map(ToString::to_string).collect(),
        offline_fallback: config.offline_fallback.to_string(),
    };
    json_result(&output)
}
