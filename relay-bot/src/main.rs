//! relay-bot CLI: run the Telegram relay or send a one-shot prompt. Config from env and optional CLI args.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llm_client::EnvLlmConfig;
use relay_bot::{ask, run_relay_bot, RelayConfig};
use telegram_bot::init_console_tracing;

#[derive(Parser)]
#[command(name = "relay-bot")]
#[command(about = "Telegram ↔ LLM conversation relay: run, ask", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Telegram relay (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Send one prompt to the configured model and print the sanitized reply (no Telegram).
    Ask {
        /// Prompt text.
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = RelayConfig::load(token)?;
            run_relay_bot(config).await
        }
        Commands::Ask { text } => {
            // Logs go to stderr; stdout carries only the reply.
            init_console_tracing()?;
            let config = EnvLlmConfig::from_env()
                .context("Load LLM config from .env (LLM_PROVIDER, GEN_AI_API_KEY / OPENAI_API_KEY)")?;
            config.validate()?;
            let reply = ask(&config, &text).await?;
            println!("{}", reply);
            Ok(())
        }
    }
}
