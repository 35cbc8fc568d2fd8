//! onboard: society onboarding from the terminal.
//!
//! Codes are delivered by printing them; accounts and societies are accepted
//! in-process.

mod commands;
mod config;
mod console;
mod directory;
mod prompt;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use onboard_types::{LoginIdentity, OnboardingPayload, SignupPayload};
use onboard_utils::LogFormat;

use crate::commands::Backend;
use crate::config::AppConfig;
use crate::prompt::Prompt;

#[derive(Parser)]
#[command(name = "onboard", about = "Sign up, log in, and register a society")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "ONBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter: "trace", "debug", "info", "warn", "error", or a directive list.
    #[arg(long, env = "ONBOARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output: "human" or "json".
    #[arg(long, env = "ONBOARD_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Seconds before a code may be resent.
    #[arg(long, env = "ONBOARD_COOLDOWN_SECS")]
    cooldown_secs: Option<u64>,

    /// Quiet period before a society search is sent, in milliseconds.
    #[arg(long, env = "ONBOARD_DEBOUNCE_MS")]
    debounce_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Create an account after verifying phone and email.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
    },
    /// Log in to a society with a code sent to your phone.
    Login {
        #[arg(long)]
        phone: String,
        /// Society value, as listed by `onboard societies`.
        #[arg(long)]
        society: String,
    },
    /// Search the society list.
    Societies {
        /// Part of the society name; omit to list all.
        query: Option<String>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Register a new society.
    Register {
        #[arg(long)]
        society_name: String,
        #[arg(long)]
        subdomain: String,
        /// Country code, e.g. IN.
        #[arg(long)]
        country: String,
        /// State code, e.g. MH.
        #[arg(long)]
        state: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        zipcode: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_toml_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(secs) = cli.cooldown_secs {
        config.verification.cooldown_secs = secs;
    }
    if let Some(ms) = cli.debounce_ms {
        config.search.debounce_ms = ms;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    onboard_utils::init_logging(config.log_format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    let backend = Backend::console(&config.verification);
    let mut prompt = Prompt::stdin();

    match cli.command {
        Command::Signup { name, phone, email } => {
            let payload = SignupPayload { name, phone, email };
            let receipt =
                commands::signup(&backend, &config.verification, payload, &mut prompt).await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Command::Login { phone, society } => {
            let identity = LoginIdentity { phone, society };
            let identity =
                commands::login(&backend, &config.verification, identity, &mut prompt).await?;
            let society =
                directory::society_label(&identity.society).unwrap_or(identity.society.as_str());
            eprintln!("logged in to {society}");
            println!("{}", serde_json::to_string_pretty(&identity)?);
        }
        Command::Societies { query, json } => {
            let catalog = Arc::new(directory::society_catalog());
            let found =
                commands::search_societies(catalog, &config.search, query.as_deref().unwrap_or(""))
                    .await;
            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else if found.is_empty() {
                eprintln!("no society matches");
            } else {
                for option in &found {
                    println!("{:<32} {}", option.value, option.label);
                }
            }
        }
        Command::Register {
            society_name,
            subdomain,
            country,
            state,
            city,
            zipcode,
        } => {
            let payload = OnboardingPayload {
                society_name,
                subdomain,
                country,
                state,
                city,
                zipcode,
            };
            let receipt = commands::register(&backend, payload).await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
    }

    Ok(())
}
