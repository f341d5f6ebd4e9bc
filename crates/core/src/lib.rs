//! Core types and shared functionality for novel-sw.
//!
//! This crate provides:
//! - Request/response model seen by the offline cache coordinator
//! - Partitioned cache storage (in-memory and SQLite backends)
//! - Unified error types
//! - Layered configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub use cache::{CacheDb, CacheStorage, Category, MemoryStorage, PartitionInfo, PartitionSet};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use request::{CacheMode, Destination, Request};
pub use response::{Response, http_date};
