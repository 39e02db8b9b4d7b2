//! CLI `expand` command — render one thread with its full message history.

use anyhow::Result;
use serde_json::Value;

use crate::client::ApiClient;
use crate::config::DeepMemConfig;
use crate::search::DeepSearcher;

/// Fetch a thread by ID and print its messages.
pub async fn expand(config: &DeepMemConfig, thread_id: &str) -> Result<()> {
    let client = ApiClient::new(&config.api)?;
    let searcher = DeepSearcher::new(client);
    let payload = searcher.thread_detail(thread_id).await?;
    render_thread(&payload);
    Ok(())
}

/// Render a fetched thread payload: `{"thread": {...}, "messages": [...]}`
/// envelope or a flat record.
fn render_thread(payload: &Value) {
    let record = match payload.get("thread") {
        Some(inner) if inner.is_object() => inner,
        _ => payload,
    };

    let title = record
        .get("title")
        .and_then(Value::as_str)
        .or_else(|| record.get("summary").and_then(Value::as_str))
        .unwrap_or("Thread Detail");
    println!();
    println!("{title}");
    println!();

    // Messages may sit on the envelope or on the thread record itself.
    let messages = payload
        .get("messages")
        .and_then(Value::as_array)
        .or_else(|| record.get("messages").and_then(Value::as_array));

    let messages = match messages {
        Some(messages) if !messages.is_empty() => messages,
        _ => {
            println!("No messages in this thread.");
            return;
        }
    };

    // Sentinels mark recalled content as untrusted for agents reading the
    // output — prompt-injection guard.
    println!("<untrusted_historical_content>");
    for message in messages {
        let role = message
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let content = message.get("content").and_then(Value::as_str).unwrap_or("");

        match role {
            "user" => println!("\nUser:"),
            "assistant" => println!("\nA:"),
            other => println!("\n{other}:"),
        }
        println!("{content}");
    }
    println!();
    println!("</untrusted_historical_content>");
}
