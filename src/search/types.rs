//! Result types produced by a deep search.
//!
//! All of these are created fresh per search invocation and are immutable
//! after construction — nothing here persists between calls.

use serde::Serialize;

/// A memory search result with an optional provenance thread reference.
///
/// `importance` and `similarity_score` are backend-assigned and passed
/// through unvalidated; out-of-range values are the backend's to own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryResult {
    pub memory_id: String,
    pub title: Option<String>,
    pub content: String,
    pub importance: f64,
    pub similarity_score: f64,
    pub relevance_reason: Option<String>,
    /// Weak reference to the thread this memory originated from, if any.
    pub source_thread_id: Option<String>,
    pub labels: Vec<String>,
    /// Opaque timestamp string, displayed as-is.
    pub created_at: Option<String>,
}

/// A thread search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadResult {
    /// The externally addressable thread key, used for all further API
    /// calls. Distinct from any internal numeric/UUID `id` the backend may
    /// also expose.
    pub thread_id: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub message_count: u64,
    pub created_at: Option<String>,
}

/// Combined search result: memories plus derived related threads.
///
/// `memories` preserves backend relevance order; `related_threads` never
/// contains two entries with the same `thread_id`. The totals may exceed the
/// returned sequence lengths when the backend reports paginated totals.
#[derive(Debug, Clone, Serialize)]
pub struct DeepSearchResult {
    pub query: String,
    pub memories: Vec<MemoryResult>,
    pub related_threads: Vec<ThreadResult>,
    pub total_memories_found: u64,
    pub total_threads_found: u64,
}

/// Search knobs.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Max memories to return.
    pub memory_limit: usize,
    /// Max related threads to resolve.
    pub thread_limit: usize,
    /// Whether phase 2 (thread resolution) runs at all.
    pub expand_threads: bool,
    /// Optional comma-separated label filter forwarded to the backend.
    pub filter_labels: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            memory_limit: 10,
            thread_limit: 5,
            expand_threads: true,
            filter_labels: None,
        }
    }
}
