//! companion CLI: terminal chat client for the emotional companion service

use clap::{Parser, Subcommand};
use companion_engine::{
    Completion, Config, Conversation, HttpReplyClient, ReplyService, BACKEND_URL_ENV,
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "COMPANION_LOG";

/// A supportive chat companion in your terminal
#[derive(Debug, Parser)]
#[command(name = "companion")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: the platform config dir, companion/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file and environment
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Open the chat UI (default when no command specified)
    Chat,

    /// Send one message and print the reply
    Ask {
        /// The message; multiple words are joined with spaces
        #[arg(required = true)]
        message: Vec<String>,

        /// Print the resulting message log as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init,
}

fn main() {
    let cli = Cli::parse();

    let tui_mode = matches!(cli.command, None | Some(Commands::Chat));
    if let Err(e) = init_logging(cli.log_file.as_deref(), tui_mode) {
        fail(&format!("Failed to open log file: {e}"));
    }

    match &cli.command {
        None | Some(Commands::Chat) => cmd_chat(&resolve_config(&cli)),
        Some(Commands::Ask { message, json }) => {
            cmd_ask(&resolve_config(&cli), &message.join(" "), *json);
        }
        Some(Commands::Config { json }) => cmd_config(&cli, &resolve_config(&cli), *json),
        Some(Commands::Init) => cmd_init(cli.config.as_deref()),
    }
}

/// Install the log subscriber.
///
/// The chat UI owns the terminal, so in that mode logs only go to a file.
fn init_logging(log_file: Option<&Path>, tui_mode: bool) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if tui_mode => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn resolve_config(cli: &Cli) -> Config {
    match Config::resolve(cli.config.as_deref(), cli.backend_url.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&format!("Failed to load config: {e}")),
    }
}

fn build_runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => fail(&format!("Failed to create tokio runtime: {e}")),
    }
}

fn build_client(config: &Config) -> HttpReplyClient {
    match HttpReplyClient::new(config) {
        Ok(client) => client,
        Err(e) => fail(&e.to_string()),
    }
}

fn cmd_chat(config: &Config) {
    let service: Arc<dyn ReplyService> = Arc::new(build_client(config));
    let rt = build_runtime();
    if let Err(e) = rt.block_on(companion_tui::run_tui(config, service)) {
        fail(&e.to_string());
    }
}

fn cmd_ask(config: &Config, message: &str, json: bool) {
    let client = build_client(config);
    let rt = build_runtime();

    let mut conversation = Conversation::new();
    let Some(completion) = rt.block_on(conversation.submit(&client, message)) else {
        fail("Nothing to send: the message is blank");
    };
    info!(?completion, endpoint = client.endpoint(), "exchange finished");

    if json {
        match serde_json::to_string_pretty(conversation.messages()) {
            Ok(out) => println!("{out}"),
            Err(e) => fail(&format!("Failed to serialize messages: {e}")),
        }
    }

    let reply = conversation.last().map(|m| (m.text.clone(), m.emotion.clone()));
    match (completion, reply) {
        (Completion::Replied, Some((text, emotion))) => {
            if !json {
                println!("{text}");
                if let Some(emotion) = emotion {
                    println!("({emotion})");
                }
            }
        }
        (_, reply) => {
            if let Some((text, _)) = reply {
                eprintln!("{text}");
            }
            for notice in conversation.take_notices() {
                eprintln!("{}: {}", notice.title, notice.description);
            }
            std::process::exit(1);
        }
    }
}

fn cmd_config(cli: &Cli, config: &Config, json: bool) {
    if json {
        match serde_json::to_string_pretty(config) {
            Ok(out) => println!("{out}"),
            Err(e) => fail(&format!("Failed to serialize config: {e}")),
        }
        return;
    }

    let path = cli.config.clone().or_else(Config::default_path);

    println!("Companion Configuration\n");
    println!("  Backend URL:   {}", config.backend_url);
    println!("  Chat endpoint: {}", config.chat_endpoint());
    match config.request_timeout_secs {
        Some(secs) => println!("  Timeout:       {secs}s"),
        None => println!("  Timeout:       none"),
    }
    match path {
        Some(path) if path.exists() => println!("  Config file:   {}", path.display()),
        Some(path) => println!("  Config file:   {} (not found, using defaults)", path.display()),
        None => println!("  Config file:   (no config directory)"),
    }
    if std::env::var_os(BACKEND_URL_ENV).is_some() {
        println!("\n  {BACKEND_URL_ENV} is set and overrides the file");
    }
}

fn cmd_init(explicit_path: Option<&Path>) {
    let Some(path) = explicit_path
        .map(Path::to_path_buf)
        .or_else(Config::default_path)
    else {
        fail("No config directory available; pass --config PATH");
    };

    if path.exists() {
        println!("Config already exists at {}", path.display());
        return;
    }

    match Config::default().save(&path) {
        Ok(()) => println!("Created {}", path.display()),
        Err(e) => fail(&format!("Failed to write config: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command_means_chat() {
        let cli = Cli::try_parse_from(["companion"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_ask_joins_words_and_accepts_global_flags() {
        let cli = Cli::try_parse_from([
            "companion",
            "ask",
            "I",
            "feel",
            "anxious",
            "--json",
            "--backend-url",
            "http://localhost:8000",
        ])
        .unwrap();

        assert_eq!(cli.backend_url.as_deref(), Some("http://localhost:8000"));
        match cli.command {
            Some(Commands::Ask { message, json }) => {
                assert_eq!(message.join(" "), "I feel anxious");
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_ask_requires_a_message() {
        assert!(Cli::try_parse_from(["companion", "ask"]).is_err());
    }

    #[test]
    fn test_init_writes_default_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        cmd_init(Some(&path));
        let written = Config::load(&path).unwrap();
        assert_eq!(written, Config::default());

        std::fs::write(&path, r#"{"backend_url":"http://localhost:1"}"#).unwrap();
        cmd_init(Some(&path));
        let kept = Config::load(&path).unwrap();
        assert_eq!(kept.backend_url, "http://localhost:1");
    }
}
