//! Tolerant extraction of results from loosely shaped backend payloads.
//!
//! The backend is not consistent about envelopes: memory search may answer
//! with a bare array or a `{"results": [...]}` object, records may be nested
//! under a `memory`/`thread` field or flat on the envelope, and identifiers
//! appear under more than one key. Each field here is resolved by an ordered
//! list of extraction rules, tried in sequence until one yields a value, as
//! pure functions over `serde_json::Value` — no network, no state.
//!
//! Missing optional fields default per the result types and never fail
//! parsing. Only a structurally unrecognizable payload (neither array nor
//! object where one is required, or a record missing every identifier key)
//! is a [`Error::MalformedResponse`].

use serde_json::Value;

use super::types::{MemoryResult, ThreadResult};
use crate::error::{Error, Result};

/// Parse a memory-search payload into results, preserving backend order.
pub fn parse_memories(payload: &Value) -> Result<Vec<MemoryResult>> {
    result_items(payload)?.iter().map(parse_memory).collect()
}

/// Parse a thread-search payload: threads live under a `threads` field.
pub fn parse_threads(payload: &Value) -> Result<Vec<ThreadResult>> {
    let Some(map) = payload.as_object() else {
        return Err(Error::MalformedResponse(
            "thread search payload is not an object".into(),
        ));
    };
    match map.get("threads") {
        Some(Value::Array(items)) => items.iter().map(parse_thread).collect(),
        Some(_) => Err(Error::MalformedResponse(
            "`threads` field is not an array".into(),
        )),
        None => Ok(Vec::new()),
    }
}

/// Parse a single thread record. Accepts both a `{"thread": {...}}` envelope
/// (the fetch-thread response shape) and a flat record.
pub fn parse_thread(value: &Value) -> Result<ThreadResult> {
    let record = unwrap_envelope(value, "thread");
    if !record.is_object() {
        return Err(Error::MalformedResponse(
            "thread record is not an object".into(),
        ));
    }

    // `thread_id` is the externally addressable key; `id` may be an internal
    // UUID. Prefer `thread_id` whenever both exist.
    let thread_id = first_nonempty_string(record, &["thread_id", "id"]).ok_or_else(|| {
        Error::MalformedResponse("thread record carries neither `thread_id` nor `id`".into())
    })?;

    Ok(ThreadResult {
        thread_id,
        title: string_field(record, "title"),
        summary: string_field(record, "summary"),
        message_count: record
            .get("message_count")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        created_at: string_field(record, "created_at")
            .or_else(|| string_field(record, "last_activity")),
    })
}

/// The backend's reported result total, when the payload carries one.
pub fn reported_total(payload: &Value) -> Option<u64> {
    payload.get("total_found").and_then(Value::as_u64)
}

/// The result envelopes of a memory search: a bare array, or the `results`
/// field of an object. An object without `results` parses as empty.
fn result_items(payload: &Value) -> Result<&[Value]> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(Error::MalformedResponse(
                "`results` field is not an array".into(),
            )),
            None => Ok(&[]),
        },
        _ => Err(Error::MalformedResponse(
            "memory search payload is neither an array nor an object".into(),
        )),
    }
}

/// Parse one result envelope. The memory record may be nested under a
/// `memory` field or flat on the envelope; matching fields
/// (`similarity_score`, `relevance_reason`) always live on the envelope.
fn parse_memory(envelope: &Value) -> Result<MemoryResult> {
    let record = unwrap_envelope(envelope, "memory");
    if !record.is_object() {
        return Err(Error::MalformedResponse(
            "memory record is not an object".into(),
        ));
    }

    let memory_id = first_nonempty_string(record, &["id", "memory_id"]).ok_or_else(|| {
        Error::MalformedResponse("memory record carries neither `id` nor `memory_id`".into())
    })?;

    Ok(MemoryResult {
        memory_id,
        title: string_field(record, "title"),
        content: string_field(record, "content").unwrap_or_default(),
        importance: float_field(record, "importance").unwrap_or(0.5),
        similarity_score: float_field(envelope, "similarity_score").unwrap_or(0.0),
        relevance_reason: string_field(envelope, "relevance_reason"),
        source_thread_id: source_thread_id(record),
        labels: labels(record),
        created_at: string_field(record, "created_at"),
    })
}

/// Unwrap `{"<key>": {...}}` envelopes; flat records pass through unchanged.
fn unwrap_envelope<'a>(value: &'a Value, key: &str) -> &'a Value {
    match value.get(key) {
        Some(inner) if inner.is_object() => inner,
        _ => value,
    }
}

/// A string field, `None` when absent, null, or not a string.
fn string_field(record: &Value, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(String::from)
}

/// A numeric field as f64 (integers included), `None` when absent or non-numeric.
fn float_field(record: &Value, key: &str) -> Option<f64> {
    record.get(key).and_then(Value::as_f64)
}

/// First non-empty string among `keys`, tried in order.
fn first_nonempty_string(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| string_field(record, key))
        .find(|s| !s.is_empty())
}

/// Labels from the top-level `labels` field, falling back to
/// `metadata.labels` when the top-level field is absent or empty.
fn labels(record: &Value) -> Vec<String> {
    let top = string_array(record.get("labels"));
    if !top.is_empty() {
        return top;
    }
    string_array(record.get("metadata").and_then(|m| m.get("labels")))
}

/// The provenance thread reference: `metadata.source_id`. Absent metadata is
/// not an error — the memory simply has no reference.
fn source_thread_id(record: &Value) -> Option<String> {
    record
        .get("metadata")
        .and_then(|m| m.get("source_id"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Collect string elements of a JSON array, skipping non-strings.
fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_and_nested_envelopes_parse_identically() {
        let fields = json!({
            "id": "m1",
            "title": "Title",
            "content": "body",
            "importance": 0.7,
            "created_at": "2026-01-01T00:00:00Z",
            "metadata": {"source_id": "t1", "labels": ["a", "b"]}
        });

        let mut flat = fields.clone();
        flat["similarity_score"] = json!(0.9);
        flat["relevance_reason"] = json!("matched title");

        let nested = json!({
            "memory": fields,
            "similarity_score": 0.9,
            "relevance_reason": "matched title"
        });

        let from_flat = parse_memories(&json!([flat])).unwrap();
        let from_nested = parse_memories(&json!([nested])).unwrap();
        assert_eq!(from_flat, from_nested);
        assert_eq!(from_flat[0].memory_id, "m1");
        assert_eq!(from_flat[0].similarity_score, 0.9);
        assert_eq!(from_flat[0].source_thread_id.as_deref(), Some("t1"));
        assert_eq!(from_flat[0].labels, vec!["a", "b"]);
    }

    #[test]
    fn bare_array_payload_parses() {
        let payload = json!([
            {"id": "m1", "content": "one"},
            {"id": "m2", "content": "two"},
        ]);
        let memories = parse_memories(&payload).unwrap();
        assert_eq!(memories.len(), 2);
        assert_eq!(memories[0].memory_id, "m1");
        assert_eq!(memories[1].memory_id, "m2");
    }

    #[test]
    fn object_without_results_parses_empty() {
        let memories = parse_memories(&json!({"status": "ok"})).unwrap();
        assert!(memories.is_empty());
    }

    #[test]
    fn scalar_payload_is_malformed() {
        let err = parse_memories(&json!("nope")).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn memory_id_falls_back_to_memory_id_key() {
        let memories =
            parse_memories(&json!([{"memory_id": "m7"}, {"id": "", "memory_id": "m8"}])).unwrap();
        assert_eq!(memories[0].memory_id, "m7");
        assert_eq!(memories[1].memory_id, "m8");
    }

    #[test]
    fn memory_without_any_id_is_malformed() {
        let err = parse_memories(&json!([{"content": "orphan"}])).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn optional_memory_fields_default() {
        let memories = parse_memories(&json!([{"id": "m1"}])).unwrap();
        let mem = &memories[0];
        assert_eq!(mem.content, "");
        assert_eq!(mem.importance, 0.5);
        assert_eq!(mem.similarity_score, 0.0);
        assert!(mem.title.is_none());
        assert!(mem.relevance_reason.is_none());
        assert!(mem.source_thread_id.is_none());
        assert!(mem.labels.is_empty());
        assert!(mem.created_at.is_none());
    }

    #[test]
    fn out_of_range_scores_pass_through() {
        let memories = parse_memories(&json!([
            {"id": "m1", "importance": 3.5, "similarity_score": -0.2}
        ]))
        .unwrap();
        assert_eq!(memories[0].importance, 3.5);
        assert_eq!(memories[0].similarity_score, -0.2);
    }

    #[test]
    fn labels_fall_back_to_metadata() {
        let memories = parse_memories(&json!([
            {"id": "m1", "labels": ["top"], "metadata": {"labels": ["meta"]}},
            {"id": "m2", "metadata": {"labels": ["meta"]}},
            {"id": "m3", "labels": [], "metadata": {"labels": ["meta"]}},
        ]))
        .unwrap();
        assert_eq!(memories[0].labels, vec!["top"]);
        assert_eq!(memories[1].labels, vec!["meta"]);
        assert_eq!(memories[2].labels, vec!["meta"]);
    }

    #[test]
    fn empty_source_id_is_no_reference() {
        let memories =
            parse_memories(&json!([{"id": "m1", "metadata": {"source_id": ""}}])).unwrap();
        assert!(memories[0].source_thread_id.is_none());
    }

    #[test]
    fn thread_id_preferred_over_internal_id() {
        let thread = parse_thread(&json!({"id": "u-123", "thread_id": "abc"})).unwrap();
        assert_eq!(thread.thread_id, "abc");

        let thread = parse_thread(&json!({"id": "u-123"})).unwrap();
        assert_eq!(thread.thread_id, "u-123");
    }

    #[test]
    fn thread_envelope_and_flat_share_a_parse_path() {
        let flat = json!({"thread_id": "t1", "title": "T", "message_count": 4});
        let enveloped = json!({"thread": {"thread_id": "t1", "title": "T", "message_count": 4}});
        assert_eq!(parse_thread(&flat).unwrap(), parse_thread(&enveloped).unwrap());
    }

    #[test]
    fn thread_timestamp_falls_back_to_last_activity() {
        let thread =
            parse_thread(&json!({"thread_id": "t1", "last_activity": "2026-02-02"})).unwrap();
        assert_eq!(thread.created_at.as_deref(), Some("2026-02-02"));

        let thread = parse_thread(&json!({
            "thread_id": "t1",
            "created_at": "2026-01-01",
            "last_activity": "2026-02-02"
        }))
        .unwrap();
        assert_eq!(thread.created_at.as_deref(), Some("2026-01-01"));
    }

    #[test]
    fn thread_without_any_id_is_malformed() {
        let err = parse_thread(&json!({"title": "orphan"})).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn parse_threads_reads_threads_field() {
        let payload = json!({
            "threads": [
                {"thread_id": "t1", "message_count": 2},
                {"thread_id": "t2"},
            ],
            "total_found": 9
        });
        let threads = parse_threads(&payload).unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].thread_id, "t1");
        assert_eq!(threads[0].message_count, 2);
        assert_eq!(reported_total(&payload), Some(9));
    }

    #[test]
    fn parse_threads_without_field_is_empty() {
        assert!(parse_threads(&json!({"status": "ok"})).unwrap().is_empty());
    }

    #[test]
    fn reported_total_absent_is_none() {
        assert_eq!(reported_total(&json!({"results": []})), None);
        assert_eq!(reported_total(&json!([])), None);
    }
}
