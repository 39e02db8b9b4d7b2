//! Progressive-disclosure search client for a remote semantic memory store.
//!
//! deep-mem queries a memory backend for brief memory summaries, then
//! opportunistically expands to the conversation threads those memories came
//! from. Thread resolution prefers the exact provenance reference a memory
//! carries and falls back to a keyword thread search only when no reference
//! resolves — try precise, then approximate.
//!
//! # Architecture
//!
//! - **Client**: bearer-authenticated HTTP via reqwest behind the
//!   [`client::Backend`] trait
//! - **Normalizer**: tolerant multi-shape payload parsing in
//!   [`search::parse`]
//! - **Orchestrator**: the two-phase search in [`search::DeepSearcher`]
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`client`] — The [`client::Backend`] seam and the reqwest API client
//! - [`search`] — Core search engine: orchestration, normalization, result types
//! - [`error`] — Error kinds shared across the crate

pub mod client;
pub mod config;
pub mod error;
pub mod search;
