//! CLI `doctor` command — check configuration and API connectivity.

use anyhow::Result;

use crate::client::{ApiClient, Backend, MemorySearchMode, ThreadSearchMode};
use crate::config::DeepMemConfig;

/// Validate the configuration, then exercise both search operations with
/// minimal inputs. Any failure exits non-zero.
pub async fn doctor(config: &DeepMemConfig) -> Result<()> {
    println!("Checking configuration...");
    println!();

    if let Err(err) = config.validate() {
        println!("FAIL  Configuration: {err}");
        anyhow::bail!("configuration check failed");
    }
    println!("OK    API URL: {}", config.api.base_url);
    println!("OK    Auth token: ********...");

    println!();
    println!("Checking API connectivity...");
    println!();

    let client = ApiClient::new(&config.api)?;

    if let Err(err) = client
        .search_memories("test", 1, MemorySearchMode::Deep, None)
        .await
    {
        println!("FAIL  Memory search: {err}");
        anyhow::bail!("connectivity check failed");
    }
    println!("OK    Memory search working");

    if let Err(err) = client.search_threads("test", 1, ThreadSearchMode::Full).await {
        println!("FAIL  Thread search: {err}");
        anyhow::bail!("connectivity check failed");
    }
    println!("OK    Thread search working");

    println!();
    println!("All checks passed!");
    Ok(())
}
