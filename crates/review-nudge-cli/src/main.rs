use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "review-nudge", version, about = "review-nudge CLI")]
struct Cli {
    /// App version reported to the engine (overrides config `app.version`)
    #[arg(long, global = true)]
    app_version: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an app launch
    Launch,
    /// Record a significant action and run the gate
    Action,
    /// Simulate the app becoming active and run the gate
    Active,
    /// Show persisted prompt state and the current gate decision
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove all persisted prompt state
    Reset,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app_version = cli.app_version;
    let result = match cli.command {
        Commands::Launch => commands::prompt::launch(app_version),
        Commands::Action => commands::prompt::action(app_version),
        Commands::Active => commands::prompt::active(app_version),
        Commands::Status { json } => commands::prompt::status(app_version, json),
        Commands::Reset => commands::prompt::reset(app_version),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
