//! Command-line client for a running ringcache server.

use anyhow::Result;
use clap::{Parser, Subcommand};
use ringcache::network::DEFAULT_SERVER_URL;
use ringcache::CacheClient;

#[derive(Parser)]
#[command(name = "ringcache")]
#[command(about = "Talk to a ringcache server")]
struct Cli {
    /// Base URL of the server.
    #[arg(long, global = true, default_value = DEFAULT_SERVER_URL, env = "RINGCACHE_URL")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Get a value from the cache.
    Get { key: String },
    /// Set a value in the cache.
    Set { key: String, value: String },
    /// Delete a value from the cache.
    Delete { key: String },
    /// Add a node to the ring.
    AddNode { node: String },
    /// Remove a node from the ring.
    RemoveNode { node: String },
    /// List the nodes in the ring.
    ListNodes,
    /// Dump everything a node stores.
    NodeData { node: String },
    /// Show cache statistics.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = CacheClient::new(cli.url);

    match cli.command {
        Command::Get { key } => match client.get(&key).await? {
            Some(value) => println!("{}", value),
            None => println!("Error: key '{}' not found", key),
        },
        Command::Set { key, value } => {
            client.set(&key, &value).await?;
            println!("Value set for key '{}'", key);
        }
        Command::Delete { key } => {
            if client.delete(&key).await? {
                println!("Value for key '{}' deleted", key);
            } else {
                println!("Error: key '{}' not found", key);
            }
        }
        Command::AddNode { node } => {
            client.add_node(&node).await?;
            println!("Node '{}' added", node);
        }
        Command::RemoveNode { node } => match client.remove_node(&node).await? {
            Some(_) => println!("Node '{}' removed", node),
            None => println!("Error: node '{}' not found", node),
        },
        Command::ListNodes => {
            for node in client.list_nodes().await? {
                println!("{}", node);
            }
        }
        Command::NodeData { node } => match client.node_data(&node).await? {
            Some(data) => {
                let mut entries: Vec<_> = data.into_iter().collect();
                entries.sort();
                for (key, value) in entries {
                    println!("{} = {}", key, value);
                }
            }
            None => println!("Error: node '{}' not found", node),
        },
        Command::Stats => {
            let stats = client.stats().await?;
            println!("Owners:         {}", stats.owner_count);
            println!("Ring positions: {}", stats.position_count);
            println!("Entries:        {}", stats.entry_count);
            println!("Hits:           {}", stats.hits);
            println!("Misses:         {}", stats.misses);
            println!("Hit rate:       {:.1}%", stats.hit_rate() * 100.0);
            println!("Keys migrated:  {}", stats.keys_migrated);
        }
    }

    Ok(())
}
