//! HTTP client for snapvault.
//!
//! This crate provides the network collaborator consumed by the core's
//! fetch-through caching: a reqwest-based [`snapvault_core::Fetcher`]
//! implementation with URI canonicalization and response-size limits.

pub mod fetch;

pub use fetch::{FetchConfig, HttpFetcher, UrlError, canonicalize};
