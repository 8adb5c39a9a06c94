use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use reqwest::Url;
use std::{env, path::PathBuf, time::Duration};

use crate::services::{
    api_service::DEFAULT_API_BASE, availability_service::MalformedDatePolicy,
};

const DEFAULT_STORAGE_DIR: &str = "./data/holidaze";
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: Url,
    pub api_key: Option<String>,
    pub storage_dir: PathBuf,
    pub strict_dates: bool,
    pub search_debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub ephemeral: bool,
}

// The API key stays out of logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base", &self.api_base.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("storage_dir", &self.storage_dir)
            .field("strict_dates", &self.strict_dates)
            .field("search_debounce_ms", &self.search_debounce_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("ephemeral", &self.ephemeral)
            .finish()
    }
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Holidaze venue booking client")]
pub struct Args {
    /// API base URL (overrides HOLIDAZE_API_BASE)
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Noroff API key (overrides HOLIDAZE_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Directory holding the persisted session (overrides HOLIDAZE_STORAGE_DIR)
    #[arg(long, global = true)]
    pub storage_dir: Option<PathBuf>,

    /// Treat bookings with unparseable dates as taken (overrides HOLIDAZE_STRICT_DATES)
    #[arg(long, global = true)]
    pub strict_dates: bool,

    /// Search debounce in milliseconds (overrides HOLIDAZE_SEARCH_DEBOUNCE_MS)
    #[arg(long, global = true)]
    pub search_debounce_ms: Option<u64>,

    /// Request timeout in seconds (overrides HOLIDAZE_REQUEST_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub request_timeout_secs: Option<u64>,

    /// Keep the session in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List venues, optionally filtered by a search query
    Venues {
        #[arg(long, short)]
        query: Option<String>,
    },
    /// Show one venue
    Venue { id: String },
    /// Log in
    Login {
        email: String,
        #[arg(long, env = "HOLIDAZE_PASSWORD", hide_env_values = true)]
        password: String,
        /// Path to continue at after login
        #[arg(long)]
        from: Option<String>,
    },
    /// Create an account and log in
    Register {
        name: String,
        email: String,
        #[arg(long, env = "HOLIDAZE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        venue_manager: bool,
        #[arg(long)]
        from: Option<String>,
    },
    /// Log out
    Logout,
    /// Show the current session
    Whoami,
    /// List your upcoming bookings
    Profile,
    /// Change your avatar
    Avatar {
        url: String,
        #[arg(long)]
        alt: Option<String>,
    },
    /// Book a venue for [FROM, TO)
    Book {
        venue_id: String,
        from: String,
        to: String,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        guests: i64,
    },
    /// Venue manager dashboard
    #[command(subcommand)]
    Manage(ManageCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ManageCommand {
    /// List the venues you manage
    Venues,
    /// Create a venue
    Create(NewVenueArgs),
    /// Edit a venue you own; omitted fields keep their value
    Update(VenueUpdateArgs),
    /// Delete a venue you own
    Delete { id: String },
    /// List bookings for a venue you own
    Bookings { id: String },
}

#[derive(ClapArgs, Debug, Clone, PartialEq)]
pub struct NewVenueArgs {
    pub name: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub price: String,
    #[arg(long)]
    pub max_guests: String,
    /// Comma-separated image URLs
    #[arg(long, default_value = "")]
    pub media: String,
    #[arg(long, default_value = "")]
    pub city: String,
    #[arg(long, default_value = "")]
    pub country: String,
    #[arg(long)]
    pub wifi: bool,
    #[arg(long)]
    pub parking: bool,
    #[arg(long)]
    pub breakfast: bool,
    #[arg(long)]
    pub pets: bool,
}

#[derive(ClapArgs, Debug, Clone, PartialEq)]
pub struct VenueUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub max_guests: Option<String>,
    #[arg(long)]
    pub media: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub wifi: Option<bool>,
    #[arg(long)]
    pub parking: Option<bool>,
    #[arg(long)]
    pub breakfast: Option<bool>,
    #[arg(long)]
    pub pets: Option<bool>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the command.
    pub fn from_env_and_args() -> Result<(Self, Command)> {
        let args = Args::parse();
        Self::merge(args, |key| env::var(key))
    }

    /// Merge parsed flags over values found through `lookup`, then defaults.
    pub fn merge<F>(args: Args, lookup: F) -> Result<(Self, Command)>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let read = |key: &str| -> Result<Option<String>> {
            match lookup(key) {
                Ok(value) => Ok(Some(value)),
                Err(env::VarError::NotPresent) => Ok(None),
                Err(err) => Err(err).with_context(|| format!("reading {key}")),
            }
        };

        // --- Environment fallback ---
        let env_api_base = read("HOLIDAZE_API_BASE")?.unwrap_or_else(|| DEFAULT_API_BASE.into());
        let env_api_key = read("HOLIDAZE_API_KEY")?.filter(|key| !key.trim().is_empty());
        let env_storage = read("HOLIDAZE_STORAGE_DIR")?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));
        let env_strict = match read("HOLIDAZE_STRICT_DATES")? {
            Some(value) => parse_flag(&value)
                .with_context(|| format!("parsing HOLIDAZE_STRICT_DATES value `{value}`"))?,
            None => false,
        };
        let env_debounce = match read("HOLIDAZE_SEARCH_DEBOUNCE_MS")? {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("parsing HOLIDAZE_SEARCH_DEBOUNCE_MS value `{value}`"))?,
            None => DEFAULT_SEARCH_DEBOUNCE_MS,
        };
        let env_timeout = match read("HOLIDAZE_REQUEST_TIMEOUT_SECS")? {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("parsing HOLIDAZE_REQUEST_TIMEOUT_SECS value `{value}`"))?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        // --- Merge ---
        let api_base = args.api_base.unwrap_or(env_api_base);
        let api_base =
            Url::parse(&api_base).with_context(|| format!("parsing API base URL `{api_base}`"))?;
        let request_timeout_secs = args.request_timeout_secs.unwrap_or(env_timeout);
        if request_timeout_secs == 0 {
            bail!("request timeout must be at least one second");
        }

        let cfg = Self {
            api_base,
            api_key: args.api_key.or(env_api_key),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            strict_dates: args.strict_dates || env_strict,
            search_debounce_ms: args.search_debounce_ms.unwrap_or(env_debounce),
            request_timeout_secs,
            ephemeral: args.ephemeral,
        };

        Ok((cfg, args.command))
    }

    pub fn date_policy(&self) -> MalformedDatePolicy {
        if self.strict_dates {
            MalformedDatePolicy::Strict
        } else {
            MalformedDatePolicy::Lenient
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got `{other}`"),
    }
}
