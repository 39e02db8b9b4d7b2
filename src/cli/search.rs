//! CLI `search` command — run a deep search and render the result.

use anyhow::Result;

use crate::client::ApiClient;
use crate::config::DeepMemConfig;
use crate::search::{DeepSearchResult, DeepSearcher, SearchOptions};

/// Run an interactive search from the terminal.
pub async fn search(
    config: &DeepMemConfig,
    query: &str,
    opts: &SearchOptions,
    verbose: bool,
    as_json: bool,
) -> Result<()> {
    let client = ApiClient::new(&config.api)?;
    let searcher = DeepSearcher::new(client);
    let result = searcher.search(query, opts).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_result(&result, verbose, config.output.content_preview_chars);
    }
    Ok(())
}

/// Progressive-disclosure rendering: memory summaries first, then the related
/// threads as expansion hints. Recalled content is wrapped in sentinels so
/// agents reading the output treat it as untrusted.
fn render_result(result: &DeepSearchResult, verbose: bool, preview_chars: usize) {
    println!();
    println!("Query: {}", result.query);
    println!(
        "Found {} memories, {} related threads",
        result.total_memories_found, result.total_threads_found
    );
    println!();

    if result.memories.is_empty() {
        println!("No memories found.");
        return;
    }

    println!("== Memories ==");
    println!();
    println!("<untrusted_memory_content>");

    let budget = if verbose { preview_chars * 2 } else { preview_chars };
    for (i, memory) in result.memories.iter().enumerate() {
        let title = memory.title.as_deref().unwrap_or("[untitled]");
        println!(
            "{}. {} ({} match, {} importance)",
            i + 1,
            title,
            format_score(memory.similarity_score),
            importance_bucket(memory.importance),
        );
        println!("   {}", truncate(&memory.content, budget));

        if !memory.labels.is_empty() {
            let tags: Vec<String> = memory.labels.iter().map(|l| format!("#{l}")).collect();
            println!("   {}", tags.join(" "));
        }
        if let Some(thread_id) = &memory.source_thread_id {
            println!("   Source: thread/{}...", char_prefix(thread_id, 8));
        }
        println!();
    }

    println!("</untrusted_memory_content>");
    println!();

    if result.related_threads.is_empty() {
        return;
    }

    println!("== Related Threads ==");
    println!();
    println!("<untrusted_thread_metadata>");
    for thread in &result.related_threads {
        let title = thread
            .title
            .as_deref()
            .or(thread.summary.as_deref())
            .unwrap_or("[untitled thread]");
        println!("  > {title}");
        println!(
            "    id: {} ({} messages)",
            thread.thread_id, thread.message_count
        );
    }
    println!("</untrusted_thread_metadata>");
    println!();
    println!("Tip: run `deep-mem expand <thread_id>` to view full thread content");
}

/// Format a similarity score as a percentage.
fn format_score(score: f64) -> String {
    format!("{:.0}%", score * 100.0)
}

/// Bucket an importance value for display.
fn importance_bucket(importance: f64) -> &'static str {
    if importance >= 0.8 {
        "critical"
    } else if importance >= 0.6 {
        "high"
    } else if importance >= 0.4 {
        "medium"
    } else {
        "low"
    }
}

/// Truncate text to `max_chars` characters, appending "..." if truncated.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// First `n` characters of a string, respecting char boundaries.
fn char_prefix(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}
