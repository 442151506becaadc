mod cmd;
mod output;

use clap::{Parser, Subcommand};
use workout_core::Config;

#[derive(Parser)]
#[command(
    name = "workout-dup",
    about = "Copy a workout template's entries into a workout",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the duplication endpoint over HTTP
    Serve {
        /// Port to listen on
        #[arg(long, short, env = "PORT", default_value = "8787")]
        port: u16,
    },

    /// Duplicate the template entries of one workout
    Duplicate {
        /// Workout page id (dashes optional)
        workout_id: String,
    },

    /// Build the template index and summarize it
    Templates,

    /// Show the property names and types of a database
    Schema {
        /// Database id (default: the template-entries database)
        database: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = Config::from_env()
        .map_err(anyhow::Error::from)
        .and_then(|config| {
            let default_level = if config.debug {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            };

            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(default_level.into()),
                )
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();

            match cli.command {
                Commands::Serve { port } => cmd::serve::run(config, port),
                Commands::Duplicate { workout_id } => {
                    cmd::duplicate::run(config, &workout_id, cli.json)
                }
                Commands::Templates => cmd::templates::run(config, cli.json),
                Commands::Schema { database } => {
                    cmd::schema::run(config, database.as_deref(), cli.json)
                }
            }
        });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
