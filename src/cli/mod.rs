pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "abroad-admission")]
#[command(about = "Study-abroad admission API - server and maintenance commands")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Keep all data in memory instead of PostgreSQL")]
        memory: bool,
    },

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create the bootstrap admin account if it does not exist")]
    CreateSuperuser {
        #[arg(long, help = "Admin username (overrides SUPERUSER_USERNAME)")]
        username: Option<String>,

        #[arg(long, help = "Admin email (overrides SUPERUSER_EMAIL)")]
        email: Option<String>,

        #[arg(long, help = "Admin password (overrides SUPERUSER_PASSWORD)")]
        password: Option<String>,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = crate::config::config();

    match cli.command {
        Commands::Serve { port, memory } => commands::serve::handle(config, port, memory).await,
        Commands::Migrate => commands::migrate::handle(config).await,
        Commands::CreateSuperuser {
            username,
            email,
            password,
        } => commands::superuser::handle(config, username, email, password).await,
    }
}
