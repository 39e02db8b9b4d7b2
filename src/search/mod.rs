//! Progressive-disclosure search: brief memory summaries first, related
//! conversation threads on expansion.
//!
//! Phase 1 queries the backend's semantic memory search. Phase 2 resolves
//! related threads, preferring the exact provenance references carried by the
//! memories (high precision) and falling back to a keyword thread search only
//! when reference resolution yields nothing (recall over precision). That
//! ordering, including the fall-back-on-zero rule, is the defining behavior
//! of this module.

pub mod parse;
pub mod types;

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::client::{Backend, MemorySearchMode, ThreadSearchMode};
use crate::error::Result;

pub use types::{DeepSearchResult, MemoryResult, SearchOptions, ThreadResult};

/// The search orchestrator. Stateless per invocation — a single instance may
/// serve concurrent searches as long as the backend supports concurrent use.
pub struct DeepSearcher<B> {
    backend: B,
}

impl<B: Backend> DeepSearcher<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Execute a deep search.
    ///
    /// Phase-1 failures of any kind abort the whole search. Per-thread
    /// failures during reference resolution are tolerated (the result simply
    /// carries fewer threads); a failure of the fallback thread search
    /// propagates, since no further fallback exists.
    pub async fn search(&self, query: &str, opts: &SearchOptions) -> Result<DeepSearchResult> {
        // Phase 1: memory search
        let payload = self
            .backend
            .search_memories(
                query,
                opts.memory_limit,
                MemorySearchMode::Deep,
                opts.filter_labels.as_deref(),
            )
            .await?;
        let memories = parse::parse_memories(&payload)?;

        // A bare array cannot report a paginated total, so its length is the total.
        let total_memories = match &payload {
            Value::Array(items) => items.len() as u64,
            _ => parse::reported_total(&payload).unwrap_or(memories.len() as u64),
        };

        // Phase 2: thread resolution
        let mut related_threads = Vec::new();
        let mut reported_thread_total = None;

        if opts.expand_threads && !memories.is_empty() {
            related_threads = self
                .resolve_referenced_threads(&memories, opts.thread_limit)
                .await;

            // Fallback keyword search — only on zero resolved threads, never
            // on a partial result.
            if related_threads.is_empty() {
                debug!("no provenance threads resolved, falling back to keyword search");
                let payload = self
                    .backend
                    .search_threads(query, opts.thread_limit, ThreadSearchMode::Full)
                    .await?;
                related_threads = dedup_by_thread_id(parse::parse_threads(&payload)?);
                reported_thread_total = parse::reported_total(&payload);
            }
        }

        let total_threads = reported_thread_total.unwrap_or(related_threads.len() as u64);

        Ok(DeepSearchResult {
            query: query.to_string(),
            memories,
            related_threads,
            total_memories_found: total_memories,
            total_threads_found: total_threads,
        })
    }

    /// Fetch the raw payload of a single thread for full-detail display.
    pub async fn thread_detail(&self, thread_id: &str) -> Result<Value> {
        self.backend.get_thread(thread_id).await
    }

    /// Reference-based resolution: fetch every distinct provenance thread the
    /// memories point at, up to `limit`.
    ///
    /// Each fetch attempt is collected as its own `Result`; failures (a
    /// deleted thread, a transport hiccup, an unparseable record) are logged
    /// and filtered out, never aborting the batch.
    async fn resolve_referenced_threads(
        &self,
        memories: &[MemoryResult],
        limit: usize,
    ) -> Vec<ThreadResult> {
        let ids = referenced_thread_ids(memories, limit);

        let mut attempts = Vec::with_capacity(ids.len());
        for thread_id in &ids {
            let attempt = match self.backend.get_thread(thread_id).await {
                Ok(payload) => parse::parse_thread(&payload),
                Err(err) => Err(err),
            };
            attempts.push((thread_id, attempt));
        }

        let threads = attempts
            .into_iter()
            .filter_map(|(thread_id, attempt)| match attempt {
                Ok(thread) => Some(thread),
                Err(err) => {
                    debug!(%thread_id, %err, "skipping referenced thread");
                    None
                }
            })
            .collect();

        dedup_by_thread_id(threads)
    }
}

/// Distinct non-empty provenance references in first-seen order across the
/// memory list, truncated to `limit`. First-seen order makes truncation
/// deterministic and keeps the references of the most relevant memories.
fn referenced_thread_ids(memories: &[MemoryResult], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for memory in memories {
        if ids.len() >= limit {
            break;
        }
        if let Some(thread_id) = &memory.source_thread_id {
            if seen.insert(thread_id.clone()) {
                ids.push(thread_id.clone());
            }
        }
    }
    ids
}

/// Drop threads whose `thread_id` was already seen, keeping the first.
fn dedup_by_thread_id(threads: Vec<ThreadResult>) -> Vec<ThreadResult> {
    let mut seen = HashSet::new();
    threads
        .into_iter()
        .filter(|thread| seen.insert(thread.thread_id.clone()))
        .collect()
}
