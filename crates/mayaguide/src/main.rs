//! mayaguide - a guide to Mayan medicinal plants

use clap::{Parser, Subcommand};
use mayaguide_content::Language;
use tracing::error;

mod commands;

use commands::{
    articles_command, ask_command, init_command, plants_command, recommend_command,
    setup_command, status_command,
};

/// mayaguide - ask about Mayan medicinal plants
#[derive(Parser)]
#[command(name = "mayaguide")]
#[command(about = "A guide to Mayan medicinal plants and their traditions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config and content file
    Init,
    /// Interactive setup wizard
    Setup,
    /// Show configuration status
    Status,
    /// List plants in the content file
    Plants {
        /// Display language (en or es)
        #[arg(short, long, default_value = "en")]
        lang: Language,
    },
    /// List articles in the content file
    Articles {
        /// Display language (en or es)
        #[arg(short, long, default_value = "en")]
        lang: Language,
    },
    /// Ask the guide a question, or chat when no message is given
    Ask {
        /// Question to ask
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Get plant and article recommendations for your symptoms
    Recommend {
        /// Describe your symptoms
        #[arg(short, long)]
        symptoms: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Init => init_command().await,
        Commands::Setup => setup_command().await,
        Commands::Status => status_command().await,
        Commands::Plants { lang } => plants_command(lang).await,
        Commands::Articles { lang } => articles_command(lang).await,
        Commands::Ask { message } => ask_command(message).await,
        Commands::Recommend { symptoms } => recommend_command(symptoms).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
