use chrono_tz::Tz;
use clap::Parser;
use serde::Deserialize;

use engine::Currency;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/bilancio.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database path, or `:memory:` for a throwaway store.
    pub database: String,
    /// IANA timezone used for monthly windows.
    pub timezone: String,
    /// Display currency code.
    pub currency: String,
    /// Log level for the env filter.
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: "bilancio.db".to_string(),
            timezone: "Europe/Rome".to_string(),
            currency: "EUR".to_string(),
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Connection URL for the configured database.
    pub fn database_url(&self) -> String {
        if self.database == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", self.database)
        }
    }

    pub fn parsed_timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Settings(format!("unknown timezone '{}'", self.timezone)))
    }

    pub fn parsed_currency(&self) -> Result<Currency> {
        Currency::try_from(self.currency.as_str())
            .map_err(|_| AppError::Settings(format!("unknown currency '{}'", self.currency)))
    }
}

#[derive(Debug, Parser)]
#[command(name = "bilancio", disable_version_flag = true)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override database path (or `:memory:`).
    #[arg(long)]
    database: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Override currency code.
    #[arg(long)]
    currency: Option<String>,
    /// Override log level.
    #[arg(long)]
    level: Option<String>,
}

pub fn load() -> Result<AppConfig> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("BILANCIO"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(database) = args.database {
        settings.database = database;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(currency) = args.currency {
        settings.currency = currency;
    }
    if let Some(level) = args.level {
        settings.level = level;
    }

    Ok(settings)
}
