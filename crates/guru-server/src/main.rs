mod config;
mod generate_cmd;
mod relay;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use guru_core::generator::{DEFAULT_MODEL, GeminiClient};

use config::GuruConfig;

#[derive(Parser)]
#[command(
    name = "guru",
    about = "Streaming lesson-document generator for Indonesian teachers"
)]
struct Cli {
    /// Gemini API key (overrides GURU_API_KEY / GEMINI_API_KEY env vars)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Gemini model name (overrides GURU_MODEL env var)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a guru config file
    Init {
        /// API key to store (omit to fill in later)
        #[arg(long)]
        api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP server
    Serve {
        /// Address to listen on (overrides GURU_LISTEN env var)
        #[arg(long)]
        listen: Option<String>,
    },
    /// Generate a document set once and print it to stdout
    Generate {
        /// Subject, e.g. "Matematika"
        #[arg(long)]
        subject: String,
        /// Grade, e.g. "Kelas 7"
        #[arg(long)]
        grade: String,
        /// Topic for the daily package
        #[arg(long, required_unless_present = "planning")]
        topic: Option<String>,
        /// Also request video suggestions
        #[arg(long, conflicts_with = "planning")]
        with_video: bool,
        /// Generate the annual plan (PROTA and PROMES) instead of a daily package
        #[arg(long)]
        planning: bool,
    },
}

/// Execute the `guru init` command: write config file.
fn cmd_init(api_key: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        gemini: config::GeminiSection {
            api_key: api_key.unwrap_or_default().to_string(),
            model: DEFAULT_MODEL.to_string(),
        },
        server: config::ServerSection {
            listen: config::DEFAULT_LISTEN.to_string(),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  gemini.model = {}", cfg.gemini.model);
    println!("  server.listen = {}", cfg.server.listen);
    if cfg.gemini.api_key.is_empty() {
        println!();
        println!("Next: add your key under [gemini] in that file, or set GURU_API_KEY.");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { api_key, force } => {
            cmd_init(api_key.as_deref(), force)?;
        }
        Commands::Serve { listen } => {
            let resolved = GuruConfig::resolve(
                cli.api_key.as_deref(),
                cli.model.as_deref(),
                listen.as_deref(),
            )?;
            let generator = GeminiClient::new(resolved.api_key, resolved.model);
            tracing::info!(model = generator.model(), "starting guru serve");
            serve_cmd::run_serve(Arc::new(generator), &resolved.listen).await?;
        }
        Commands::Generate {
            subject,
            grade,
            topic,
            with_video,
            planning,
        } => {
            let resolved =
                GuruConfig::resolve(cli.api_key.as_deref(), cli.model.as_deref(), None)?;
            let generator = GeminiClient::new(resolved.api_key, resolved.model);
            generate_cmd::run_generate(
                &generator,
                &subject,
                &grade,
                topic.as_deref(),
                with_video,
                planning,
            )
            .await?;
        }
    }

    Ok(())
}
