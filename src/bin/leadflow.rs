use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use leadflow::cli::{agents_as_json, build_demo_stack, demo_agents};
use leadflow::config::{load_agents_from_file, load_templates_from_file};
use leadflow::model::{Channel, InboundMessage};
use leadflow::utils::LoggingConfig;
use leadflow::workflow::builtin_templates;

#[derive(Parser)]
#[command(name = "leadflow", version, about = "Lead orchestration core CLI", author)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the agent team (default demo team or a JSON config).
    Agents {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the workflow templates (builtin or a JSON config).
    Templates {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run a chat conversation through the full pipeline in memory.
    Simulate {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Sender handle (phone or email).
        #[arg(long, default_value = "+5511999990000")]
        from: String,
        /// Messages submitted in order.
        messages: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Agents { config } => {
            let agents = match config {
                Some(path) => load_agents_from_file(path)?,
                None => demo_agents(),
            };
            println!("{}", serde_json::to_string_pretty(&agents_as_json(&agents))?);
        }
        Command::Templates { config } => {
            let templates = match config {
                Some(path) => load_templates_from_file(path)?,
                None => builtin_templates(),
            };
            println!("{}", serde_json::to_string_pretty(&templates)?);
        }
        Command::Simulate {
            config,
            from,
            messages,
        } => {
            let agents = match config {
                Some(path) => load_agents_from_file(path)?,
                None => demo_agents(),
            };
            // Scaled-down minutes so delayed workflow actions run promptly.
            let stack = build_demo_stack(agents, Duration::from_millis(10));

            for content in &messages {
                stack
                    .queue
                    .submit(InboundMessage::new(Channel::Chat, from.clone(), content.clone()))?;
            }
            stack.queue.drained().await;

            for (to, content) in stack.chat.sent() {
                println!("-> {to}: {content}");
            }
            let status = stack.monitor.queue_status();
            println!(
                "processed={} failed={} pending={}",
                status.processed, status.failed, status.pending
            );
        }
    }
    Ok(())
}
