pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "site-api")]
#[command(about = "Personal website backend: HTTP server and maintenance commands")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Listen port (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Use in-memory storage instead of Postgres")]
        in_memory: bool,
    },

    #[command(about = "Apply or revert database migrations")]
    Migrate {
        #[command(subcommand)]
        cmd: commands::migrate::MigrateCommands,
    },

    #[command(about = "Delete expired contact submissions and old visitor stats")]
    Prune,

    #[command(about = "Sign a token with JWT_SECRET for local testing")]
    IssueToken(commands::token::IssueTokenArgs),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve { port, in_memory } => commands::serve::handle(port, in_memory).await,
        Commands::Migrate { cmd } => commands::migrate::handle(cmd, output_format).await,
        Commands::Prune => commands::prune::handle(output_format).await,
        Commands::IssueToken(args) => commands::token::handle(args, output_format),
    }
}
