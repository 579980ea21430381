//! Siftwire CLI entry point.
//!
//! Commands:
//! - `ask`: Answer a question from curated news sites
//! - `tool`: Run one tool on a raw protocol string
//! - `tools`: List the available tools
//! - `config`: Print the default config or validate the current one

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "siftwire",
    about = "Siftwire: article extraction and question answering over news sites",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question using the sites in the topic directory
    Ask {
        /// The question to answer
        question: String,

        /// Directory database to query (overrides config)
        #[arg(long, env = "SIFTWIRE_DATABASE_ID")]
        database_id: Option<String>,

        /// Print every tool call made on the way
        #[arg(long)]
        thoughts: bool,

        /// Print the answer and tool calls as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a single tool with a raw input string
    Tool {
        /// Tool name (see `siftwire tools`)
        name: String,

        /// Input in the tool's protocol format
        input: String,
    },

    /// List the available tools
    Tools,

    /// Print the default configuration
    Config {
        /// Validate the current configuration instead
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask {
            question,
            database_id,
            thoughts,
            json,
        } => commands::ask::run(&question, database_id, thoughts, json).await?,
        Commands::Tool { name, input } => commands::tool::run(&name, &input).await?,
        Commands::Tools => commands::tool::list().await?,
        Commands::Config { validate } => {
            if validate {
                commands::config_cmd::validate().await?
            } else {
                commands::config_cmd::show_default().await?
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_parses_flags() {
        let cli = Cli::parse_from([
            "siftwire",
            "ask",
            "What is new?",
            "--database-id",
            "db1",
            "--thoughts",
        ]);
        match cli.command {
            Commands::Ask {
                question,
                database_id,
                thoughts,
                json,
            } => {
                assert_eq!(question, "What is new?");
                assert_eq!(database_id.as_deref(), Some("db1"));
                assert!(thoughts);
                assert!(!json);
            }
            _ => panic!("expected ask"),
        }
    }
}
