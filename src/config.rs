use crate::adapter::clickhouse::ClickHouseSettings;
use crate::adapter::mysql::MySqlSettings;
use crate::domain::DEFAULT_FLUSH_THRESHOLD;
use crate::writer::DEFAULT_REST_CHUNK_SIZE;
use clap::{Args, Parser, Subcommand};
use std::fs;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

const DEFAULT_TEAM_A: &str = "11111111-1111-1111-1111-111111111111";
const DEFAULT_TEAM_B: &str = "22222222-2222-2222-2222-222222222222";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to read {env}: {source}")]
    SecretFile {
        env: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Parser, Debug, Clone)]
#[command(name = "observex-seeder", author, version, about = "Seeds the ObserveX demo datasets")]
pub struct Config {
    /// Clear existing data before seeding
    #[arg(long, global = true, env = "SEEDER_CLEAR")]
    pub clear: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Seed organizations, teams, users, services, charts, endpoints and alerts into MySQL
    Relational(RelationalArgs),
    /// Seed spans, logs and incidents into ClickHouse
    Analytics(AnalyticsArgs),
    /// Relational phase, then analytics phase
    All {
        #[command(flatten)]
        relational: RelationalArgs,
        #[command(flatten)]
        analytics: AnalyticsArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RelationalArgs {
    /// MySQL host
    #[arg(long, env = "MYSQL_HOST", default_value = "localhost")]
    pub mysql_host: String,

    /// MySQL port
    #[arg(long, env = "MYSQL_PORT", default_value = "3306")]
    pub mysql_port: u16,

    /// MySQL database
    #[arg(long, env = "MYSQL_DATABASE", default_value = "metabase")]
    pub mysql_database: String,

    /// MySQL user
    #[arg(long, env = "MYSQL_USER", default_value = "metabase")]
    pub mysql_user: String,

    /// MySQL password (MYSQL_PASSWORD_FILE is also honored)
    #[arg(
        long,
        env = "MYSQL_PASSWORD",
        default_value = "metabasepass",
        hide_env_values = true
    )]
    pub mysql_password: String,
}

impl RelationalArgs {
    #[must_use]
    pub fn mysql_settings(&self) -> MySqlSettings {
        MySqlSettings {
            host: self.mysql_host.clone(),
            port: self.mysql_port,
            database: self.mysql_database.clone(),
            user: self.mysql_user.clone(),
            password: self.mysql_password.clone(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_host("MySQL", &self.mysql_host)?;
        validate_port("MySQL", self.mysql_port)?;
        Ok(())
    }
}

#[derive(Args, Debug, Clone)]
pub struct AnalyticsArgs {
    /// ClickHouse host
    #[arg(long, env = "CLICKHOUSE_HOST", default_value = "localhost")]
    pub clickhouse_host: String,

    /// ClickHouse HTTP port
    #[arg(long, env = "CLICKHOUSE_PORT", default_value = "8123")]
    pub clickhouse_port: u16,

    /// ClickHouse database
    #[arg(long, env = "CLICKHOUSE_DATABASE", default_value = "observex")]
    pub clickhouse_database: String,

    /// ClickHouse user
    #[arg(long, env = "CLICKHOUSE_USER", default_value = "observex")]
    pub clickhouse_user: String,

    /// ClickHouse password (CLICKHOUSE_PASSWORD_FILE is also honored)
    #[arg(
        long,
        env = "CLICKHOUSE_PASSWORD",
        default_value = "observex123",
        hide_env_values = true
    )]
    pub clickhouse_password: String,

    /// Hours of spans and logs to generate, counted back from now
    #[arg(long, env = "SEED_HOURS", default_value = "24")]
    pub hours: u32,

    #[arg(long, env = "SEED_TRACES_PER_HOUR", default_value = "100")]
    pub traces_per_hour: u32,

    #[arg(long, env = "SEED_LOGS_PER_HOUR", default_value = "500")]
    pub logs_per_hour: u32,

    /// Days of incidents to generate, counted back from now
    #[arg(long, env = "SEED_INCIDENT_DAYS", default_value = "30")]
    pub incident_days: u32,

    #[arg(long, env = "SEED_INCIDENTS_PER_DAY", default_value = "5")]
    pub incidents_per_day: u32,

    /// Comma-separated team UUIDs
    #[arg(
        long,
        env = "SEED_TEAM_IDS",
        value_delimiter = ',',
        default_values = [DEFAULT_TEAM_A, DEFAULT_TEAM_B]
    )]
    pub team_ids: Vec<Uuid>,

    /// Backend base URL used for REST ingestion
    #[arg(long, env = "OBSERVEX_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Bearer token; when present, spans and logs go through the ingestion API
    /// (OBSERVEX_AUTH_TOKEN_FILE is also honored)
    #[arg(long, env = "OBSERVEX_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    #[arg(long, env = "SEED_SPAN_BATCH_SIZE", default_value_t = DEFAULT_FLUSH_THRESHOLD)]
    pub span_batch_size: usize,

    #[arg(long, env = "SEED_LOG_BATCH_SIZE", default_value_t = DEFAULT_FLUSH_THRESHOLD)]
    pub log_batch_size: usize,

    /// Maximum rows per REST request
    #[arg(long, env = "SEED_REST_CHUNK_SIZE", default_value_t = DEFAULT_REST_CHUNK_SIZE)]
    pub rest_chunk_size: usize,
}

impl AnalyticsArgs {
    #[must_use]
    pub fn clickhouse_settings(&self) -> ClickHouseSettings {
        ClickHouseSettings {
            host: self.clickhouse_host.clone(),
            port: self.clickhouse_port,
            database: self.clickhouse_database.clone(),
            user: self.clickhouse_user.clone(),
            password: self.clickhouse_password.clone(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_host("ClickHouse", &self.clickhouse_host)?;
        validate_port("ClickHouse", self.clickhouse_port)?;

        Url::parse(&self.api_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid API URL '{}': {e}", self.api_url))
        })?;

        for (name, value) in [
            ("hours", self.hours as usize),
            ("traces-per-hour", self.traces_per_hour as usize),
            ("logs-per-hour", self.logs_per_hour as usize),
            ("incident-days", self.incident_days as usize),
            ("incidents-per-day", self.incidents_per_day as usize),
            ("span-batch-size", self.span_batch_size),
            ("log-batch-size", self.log_batch_size),
            ("rest-chunk-size", self.rest_chunk_size),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidConfig(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        if self.team_ids.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "At least one team id is required".to_string(),
            ));
        }

        if matches!(&self.auth_token, Some(token) if token.trim().is_empty()) {
            return Err(ConfigError::InvalidConfig(
                "Auth token cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Parses arguments (with env fallbacks), applies `*_FILE` secrets and validates.
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut config = Config::parse_from(args);
        config.post_process(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces secrets with the contents of the file named by `{VAR}_FILE`,
    /// when that variable is set.
    pub fn post_process<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (relational, analytics) = self.sections_mut();
        if let Some(args) = relational {
            if let Some(secret) = read_secret_file("MYSQL_PASSWORD", &lookup)? {
                args.mysql_password = secret;
            }
        }
        if let Some(args) = analytics {
            if let Some(secret) = read_secret_file("CLICKHOUSE_PASSWORD", &lookup)? {
                args.clickhouse_password = secret;
            }
            if let Some(secret) = read_secret_file("OBSERVEX_AUTH_TOKEN", &lookup)? {
                args.auth_token = Some(secret);
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(args) = self.relational() {
            args.validate()?;
        }
        if let Some(args) = self.analytics() {
            args.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn relational(&self) -> Option<&RelationalArgs> {
        match &self.command {
            Command::Relational(args) | Command::All { relational: args, .. } => Some(args),
            Command::Analytics(_) => None,
        }
    }

    #[must_use]
    pub fn analytics(&self) -> Option<&AnalyticsArgs> {
        match &self.command {
            Command::Analytics(args) | Command::All { analytics: args, .. } => Some(args),
            Command::Relational(_) => None,
        }
    }

    fn sections_mut(&mut self) -> (Option<&mut RelationalArgs>, Option<&mut AnalyticsArgs>) {
        match &mut self.command {
            Command::Relational(args) => (Some(args), None),
            Command::Analytics(args) => (None, Some(args)),
            Command::All {
                relational,
                analytics,
            } => (Some(relational), Some(analytics)),
        }
    }
}

fn validate_host(store: &str, host: &str) -> Result<(), ConfigError> {
    if host.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(format!(
            "{store} host cannot be empty"
        )));
    }
    Ok(())
}

fn validate_port(store: &str, port: u16) -> Result<(), ConfigError> {
    if port == 0 {
        return Err(ConfigError::InvalidConfig(format!(
            "{store} port cannot be 0"
        )));
    }
    Ok(())
}

/// Docker-secrets style `{VAR}_FILE` lookup. Surrounding whitespace is trimmed.
fn read_secret_file<F>(env_name: &str, lookup: &F) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let file_env = format!("{env_name}_FILE");
    let Some(path) = lookup(&file_env) else {
        return Ok(None);
    };
    fs::read_to_string(&path)
        .map(|content| Some(content.trim().to_string()))
        .map_err(|source| ConfigError::SecretFile {
            env: file_env,
            source,
        })
}
