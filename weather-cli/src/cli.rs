use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use inquire::{Password, Text};
use std::path::PathBuf;
use weather_core::{Config, ResolutionResult, SqliteStore, resolver_from_parts};
use weather_server::AppState;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather by postal code and date")]
pub struct Cli {
    /// OpenWeather API key; overrides the configured one.
    #[arg(long, env = "OPENWEATHER_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// SQLite database file; overrides the configured one.
    #[arg(long, env = "WEATHER_DB", global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively store the API key, endpoints and database location.
    Configure,

    /// Show weather for a postal code.
    Show {
        postal_code: String,

        /// Date as YYYY-MM-DD; defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Serve the HTTP API.
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:8080.
        #[arg(long)]
        bind: Option<String>,
    },
}

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    weather_server::api::parse_date(input)
        .ok_or_else(|| format!("invalid date '{input}', expected YYYY-MM-DD"))
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;

        // Overrides apply to this run only and are never written back by `configure`.
        match self.command {
            Command::Configure => configure(config),
            Command::Show { postal_code, date } => {
                apply_overrides(&mut config, self.api_key, self.db);
                let date = date.unwrap_or_else(|| Local::now().date_naive());
                show(&config, &postal_code, date).await
            }
            Command::Serve { bind } => {
                apply_overrides(&mut config, self.api_key, self.db);
                let bind = bind.unwrap_or_else(|| config.server.bind.clone());
                serve(&config, &bind).await
            }
        }
    }
}

fn apply_overrides(config: &mut Config, api_key: Option<String>, db: Option<PathBuf>) {
    if let Some(key) = api_key {
        config.set_api_key(key);
    }
    if let Some(path) = db {
        config.database.path = Some(path);
    }
}

/// Store the prompted key unless it was left empty.
fn update_api_key(config: &mut Config, input: &str) {
    let input = input.trim();
    if !input.is_empty() {
        config.set_api_key(input.to_string());
    }
}

async fn build_state(config: &Config) -> Result<AppState> {
    let provider = config.provider_config()?;
    let db_path = config.database_path()?;
    tracing::debug!("Database path: {}", db_path.display());

    let store = SqliteStore::connect(&db_path)
        .await
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    Ok(AppState::new(resolver_from_parts(store, provider)))
}

fn configure(mut config: Config) -> Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    update_api_key(&mut config, &api_key);

    config.openweather.geocoding_url = Text::new("Geocoding URL template:")
        .with_default(&config.openweather.geocoding_url)
        .with_help_message("Placeholders: {postal_code}, {api_key}")
        .prompt()?;

    config.openweather.weather_url = Text::new("Weather URL:")
        .with_default(&config.openweather.weather_url)
        .prompt()?;

    let db_default = config.database_path()?.display().to_string();
    let db_path = Text::new("Database file:").with_default(&db_default).prompt()?;
    config.database.path = Some(PathBuf::from(db_path));

    config.server.bind = Text::new("Server bind address:")
        .with_default(&config.server.bind)
        .prompt()?;

    let saved_to = config.save()?;
    println!("Configuration saved to {}", saved_to.display());
    Ok(())
}

async fn show(config: &Config, postal_code: &str, date: NaiveDate) -> Result<()> {
    let state = build_state(config).await?;

    match state.resolver.resolve(postal_code, date).await {
        Ok(result) => {
            print!("{}", render(&result));
            Ok(())
        }
        Err(err) => Err(anyhow::anyhow!("{err} (status {})", err.status_code())),
    }
}

async fn serve(config: &Config, bind: &str) -> Result<()> {
    let state = build_state(config).await?;
    weather_server::serve(bind, state).await
}

fn render(result: &ResolutionResult) -> String {
    format!(
        "Weather for {} on {}\n  Temperature: {:.1}°C\n  Humidity:    {:.0}%\n  Conditions:  {}\n  Source:      {}\n",
        result.postal_code,
        result.date,
        result.temperature,
        result.humidity,
        result.description,
        result.source,
    )
}
