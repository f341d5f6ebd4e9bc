//! Partition naming.
//!
//! A partition name is `{prefix}-{category}-{version}`. Bumping the version
//! orphans every partition of the previous version; activation then removes
//! them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four content categories the coordinator partitions its cache into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Static,
    Pages,
    Images,
    Novels,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Static, Category::Pages, Category::Images, Category::Novels];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Static => "static",
            Category::Pages => "pages",
            Category::Images => "images",
            Category::Novels => "novels",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The version-tagged set of partition names owned by one coordinator build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSet {
    prefix: String,
    version: String,
}

impl PartitionSet {
    pub fn new(prefix: impl Into<String>, version: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), version: version.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Full partition name for a category.
    pub fn name(&self, category: Category) -> String {
        format!("{}-{}-{}", self.prefix, category, self.version)
    }

    /// Names of every current partition, in category order.
    pub fn names(&self) -> Vec<String> {
        Category::ALL.iter().map(|c| self.name(*c)).collect()
    }

    /// Whether a partition name belongs to the current version set.
    pub fn is_current(&self, name: &str) -> bool {
        Category::ALL.iter().any(|c| self.name(*c) == name)
    }

    /// A partition carrying our prefix that no longer belongs to the current set.
    ///
    /// The prefix test is a plain string prefix match, so `novel-readerX` also counts.
    pub fn is_orphaned(&self, name: &str) -> bool {
        name.starts_with(&self.prefix) && !self.is_current(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_names() {
        let set = PartitionSet::new("novel-reader", "v2.0.0");
        assert_eq!(set.name(Category::Static), "novel-reader-static-v2.0.0");
        assert_eq!(set.name(Category::Novels), "novel-reader-novels-v2.0.0");
        assert_eq!(set.names().len(), 4);
    }

    #[test]
    fn test_orphan_detection() {
        let set = PartitionSet::new("novel-reader", "v2");
        assert!(set.is_orphaned("novel-reader-static-v1"));
        assert!(!set.is_orphaned("novel-reader-static-v2"));
        assert!(!set.is_orphaned("other-app-static-v1"));
    }
}
