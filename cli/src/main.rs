use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod util;

use commands::submission::SubmissionCommands;

#[derive(Parser)]
#[command(
    name = "formsg",
    version,
    about = "FormSG CLI: validate email-mode submissions locally or against the API"
)]
struct Cli {
    /// API base URL
    #[arg(long, env = "FORMSG_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// List the field types the API knows
    FieldTypes,
    #[command(flatten)]
    Submission(SubmissionCommands),
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formsg_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Health => commands::health::run(&cli.api_url).await,
        Commands::FieldTypes => commands::health::field_types(&cli.api_url).await,
        Commands::Submission(command) => commands::submission::run(&cli.api_url, command).await,
    };

    std::process::exit(exit_code);
}
