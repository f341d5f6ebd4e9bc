//! cache_list tool implementation.
//!
//! Lists every partition in storage with its entry count, marking the ones
//! that belong to the running version.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use novel_sw_client::Coordinator;

use crate::tools::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PartitionSummary {
    pub name: String,
    pub entries: u64,
    /// Whether the partition belongs to the running version.
    pub current: bool,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    pub partitions: Vec<PartitionSummary>,
    pub total_entries: u64,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(coordinator: &Coordinator) -> Result<CallToolResult, McpError> {
    let set = &coordinator.config().partitions;
    let partitions: Vec<PartitionSummary> = coordinator
        .storage()
        .describe()
        .await?
        .into_iter()
        .map(|p| PartitionSummary { current: set.is_current(&p.name), name: p.name, entries: p.entries })
        .collect();
    let total_entries = partitions.iter().map(|p| p.entries).sum();

    json_result(&CacheListOutput { partitions, total_entries })
}
