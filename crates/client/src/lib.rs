//! Client side of novel-sw.
//!
//! This crate provides the HTTP fetcher used to reach the origin and the
//! offline cache coordinator that decides, per request, whether to answer
//! from a cache partition, the network, or a fallback.

pub mod fetch;
pub mod worker;

pub use fetch::{FetchConfig, Fetcher, HttpFetcher};

pub use worker::{
    ClientHost, ControlMessage, Coordinator, FetchOutcome, HostEvent, Lifecycle, Notification, RecordingHost,
    ResponseSource, Served, Strategy, WorkerConfig,
};
