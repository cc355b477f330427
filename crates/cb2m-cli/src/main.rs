//! cb2m CLI - codebottle snippets as Maven artifacts.

mod classify;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cb2m")]
#[command(about = "Serve codebottle snippets as Maven artifacts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the artifact server
    Serve(serve::ServeArgs),

    /// Classify a Java source file the way archive requests do
    Classify {
        /// Path to the source file
        file: PathBuf,

        /// Author the snippet belongs to
        #[arg(short, long)]
        username: String,

        /// Language reported for the snippet
        #[arg(short, long, default_value = "java")]
        language: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve(args) => serve::execute(args).await?,

        Commands::Classify {
            file,
            username,
            language,
        } => classify::execute(&file, &username, &language)?,
    }

    Ok(())
}
