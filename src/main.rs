use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use npc_dialogue::classifier::MistralClassifier;
use npc_dialogue::graph::check_characters;
use npc_dialogue::http::ChatServer;
use npc_dialogue::{Config, DialogueEngine, GraphStore};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "npc-dialogue")]
#[command(about = "LLM-driven branching dialogue server for scripted NPCs", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the chat API over HTTP (default)
    Serve,
    /// Print a character's entry node as JSON
    FirstNode {
        #[arg(short, long)]
        character: Option<String>,
    },
    /// Check dialogue graphs for duplicate ids, a missing entry node and broken intents
    Check {
        /// Only check this character (default: all configured characters)
        #[arg(short, long)]
        character: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Control verbosity with RUST_LOG (debug shows classifier requests and raw replies)
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server().await?,
        Command::FirstNode { character } => print_first_node(character).await?,
        Command::Check { character } => run_check(character).await?,
    }

    Ok(())
}

/// Run the HTTP chat server
async fn run_server() -> Result<()> {
    log::info!("Starting npc-dialogue v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    log::info!("Dialogue data: {}", config.data_dir().display());
    if config.dialogue.graph_cache_capacity > 0 {
        log::info!(
            "Graph cache enabled ({} characters); document edits need a restart",
            config.dialogue.graph_cache_capacity
        );
    }

    let classifier = MistralClassifier::new(config.classifier_settings()?)?;
    let store = GraphStore::from_config(&config.dialogue);
    let engine = Arc::new(DialogueEngine::new(store, Arc::new(classifier)));

    let server = ChatServer::new(engine, config.http_server.clone());
    server.run().await?;

    Ok(())
}

async fn print_first_node(character: Option<String>) -> Result<()> {
    let config = Config::load_offline()?;
    let store = GraphStore::from_config(&config.dialogue);
    let character = character.unwrap_or_else(|| store.default_character().to_string());

    let node = store
        .find_entry_node(&character)
        .await?
        .with_context(|| format!("Character {} has no entry node", character))?;

    println!("{}", serde_json::to_string_pretty(&node)?);
    Ok(())
}

/// Report data-quality problems in the configured graphs
async fn run_check(character: Option<String>) -> Result<()> {
    let config = Config::load_offline()?;
    let store = GraphStore::from_config(&config.dialogue).with_strict_character_keys(true);

    let characters = match character {
        Some(c) => vec![c],
        None => store.characters().to_vec(),
    };

    let mut problems = 0;
    for check in check_characters(&store, &characters).await {
        let character = &check.character;
        if check.is_clean() {
            if let Ok(report) = &check.graph {
                log::info!("✓ Character {}: {} nodes, no problems", character, report.node_count);
            }
            continue;
        }

        problems += 1;
        match &check.graph {
            Ok(report) => {
                if report.missing_entry {
                    log::error!("Character {}: no \"initial\" node", character);
                }
                for id in &report.duplicate_ids {
                    log::error!("Character {}: duplicate node id '{}'", character, id);
                }
                for (from, to) in &report.dangling_intents {
                    log::error!("Character {}: node '{}' targets unknown node '{}'", character, from, to);
                }
            }
            Err(e) => log::error!("Character {}: {}", character, e),
        }
        if let Err(e) = &check.persona {
            log::error!("Character {}: {}", character, e);
        }
    }

    if problems > 0 {
        anyhow::bail!("{} of {} graphs have problems", problems, characters.len());
    }

    log::info!("✓ All {} graphs passed", characters.len());
    Ok(())
}
