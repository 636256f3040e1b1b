pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::config;

#[derive(Parser)]
#[command(name = "order-desk")]
#[command(about = "Order Desk - customer and order management API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, short, help = "Port to listen on (overrides APP_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = config().clone();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            commands::serve::handle(config).await
        }
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}
