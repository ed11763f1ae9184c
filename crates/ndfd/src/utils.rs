use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use ndfd_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_TIME_ZONE, DEFAULT_USER_AGENT,
};
use reqwest::Client;
use slog::{debug, o, Drain, Level, Logger};
use std::env;

use crate::forecasts::{self, FetchXml, SummaryRequest};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "NDFD forecast tools - staged forecast files and daily forecast summaries",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $NDFD_FORECAST_CONFIG, ./ndfd.toml,
    /// $XDG_CONFIG_HOME/ndfd-forecast/ndfd.toml, /etc/ndfd-forecast/ndfd.toml
    #[arg(short, long, global = true)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, global = true, env = "NDFD_FORECAST_LEVEL")]
    pub level: Option<String>,

    /// HTTP User-Agent header for forecast service requests
    #[arg(short, long, global = true, env = "NDFD_FORECAST_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Working timezone for naive local times
    #[arg(short, long, global = true, env = "NDFD_FORECAST_TIMEZONE")]
    pub timezone: Option<String>,

    /// Directory of staged NDFD forecast files, only read from the config file
    #[arg(skip)]
    pub ndfd_dir: Option<String>,

    #[command(subcommand)]
    #[serde(skip)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Summarize the digital forecast for a point by day
    Summary(SummaryArgs),
    /// Read the staged forecast file in effect at a time
    Local(LocalArgs),
}

#[derive(Args, Clone, Debug)]
pub struct SummaryArgs {
    /// Latitude in decimal degrees (-90..90)
    #[arg(short = 'y', long, value_parser = parse_latitude, allow_negative_numbers = true)]
    pub latitude: f64,

    /// Longitude in decimal degrees (-180..180)
    #[arg(short = 'x', long, value_parser = parse_longitude, allow_negative_numbers = true)]
    pub longitude: f64,

    /// Label added as the first column of every row
    #[arg(long)]
    pub location: Option<String>,

    /// Append the query latitude and longitude to every row
    #[arg(long)]
    pub add_coordinates: bool,

    /// Start of the forecast window, defaults to local midnight today
    #[arg(long)]
    pub begin: Option<String>,

    /// End of the forecast window
    #[arg(long)]
    pub end: Option<String>,
}

impl From<&SummaryArgs> for SummaryRequest {
    fn from(args: &SummaryArgs) -> Self {
        SummaryRequest {
            latitude: args.latitude,
            longitude: args.longitude,
            begin: args.begin.clone(),
            end: args.end.clone(),
            location: args.location.clone(),
            add_coordinates: args.add_coordinates,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct LocalArgs {
    /// Directory of staged NDFD forecast files
    #[arg(short, long, env = "NDFD_DIR")]
    pub ndfd_dir: Option<String>,

    /// Daily variable code: maxr, minr, maxt, mint, qpfd
    #[arg(long, default_value = "mint")]
    pub variable: String,

    /// Local time (naive values use the working timezone), defaults to now
    #[arg(long)]
    pub time: Option<String>,

    /// Only keep these stations, may be repeated
    #[arg(short, long)]
    pub station: Vec<String>,

    /// One row per station and forecast day
    #[arg(long)]
    pub long: bool,
}

pub fn parse_latitude(value: &str) -> Result<f64, String> {
    parse_in_range(value, "latitude", 90.0)
}

pub fn parse_longitude(value: &str) -> Result<f64, String> {
    parse_in_range(value, "longitude", 180.0)
}

fn parse_in_range(value: &str, name: &str, limit: f64) -> Result<f64, String> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("{} must be a number: {}", name, value))?;
    if !(-limit..=limit).contains(&parsed) {
        return Err(format!(
            "{} out of range [-{}, {}]: {}",
            name, limit, limit, parsed
        ));
    }
    Ok(parsed)
}

impl Cli {
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    pub fn timezone(&self) -> String {
        self.timezone
            .clone()
            .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string())
    }

    /// Command line value first, then the config file
    pub fn ndfd_dir(&self, args: &LocalArgs) -> Option<String> {
        args.ndfd_dir.clone().or_else(|| self.ndfd_dir.clone())
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Result<Cli, anyhow::Error> {
    merge_config(Cli::parse())
}

fn merge_config(cli_args: Cli) -> Result<Cli, anyhow::Error> {
    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("NDFD_FORECAST_CONFIG", "ndfd.toml")
    };

    let file_config: Cli = load_config(&source)?;

    // CLI args override file config (env vars are handled by clap)
    Ok(Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        user_agent: cli_args.user_agent.or(file_config.user_agent),
        timezone: cli_args.timezone.or(file_config.timezone),
        ndfd_dir: cli_args.ndfd_dir.or(file_config.ndfd_dir),
        command: cli_args.command,
    })
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "info" => Level::Info,
        "warn" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = match cli.level.as_ref() {
        Some(level) => parse_level(level),
        None => parse_level(&env::var("RUST_LOG").unwrap_or_default()),
    };

    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// HTTP transport for the digital forecast service. Responses are returned
/// as received: no retry, no timeout, no status check.
pub struct XmlFetcher {
    logger: Logger,
    user_agent: String,
    client: Client,
}

impl XmlFetcher {
    pub fn new(logger: Logger, user_agent: String) -> Result<XmlFetcher, forecasts::Error> {
        let client = Client::builder().user_agent(&user_agent).build()?;
        Ok(Self {
            logger,
            user_agent,
            client,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl FetchXml for XmlFetcher {
    async fn fetch_xml(&self, url: &str) -> Result<String, forecasts::Error> {
        debug!(self.logger, "requesting: {}", url);
        let response = self.client.get(url).send().await?;
        debug!(self.logger, "response status: {}", response.status());
        Ok(response.text().await?)
    }
}
