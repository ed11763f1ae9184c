//! NDFD Forecast Core Library
//!
//! Shared utilities for the forecast reader and the command line tool:
//! - Configuration loading (XDG-compliant)
//! - File system predicates
//! - Common defaults

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::{is_directory, path_exists};

/// Application name used for XDG paths
pub const APP_NAME: &str = "ndfd-forecast";

/// Working timezone used when none is configured
pub const DEFAULT_TIME_ZONE: &str = "US/Eastern";

/// HTTP User-Agent sent to the digital forecast service
pub const DEFAULT_USER_AGENT: &str = "(enviroweather.msu.edu, ewx@enviroweather.msu.edu)";

/// End of the requested forecast window when the caller does not supply one
pub const DEFAULT_FORECAST_END: &str = "2030-04-20T00:00:00";
