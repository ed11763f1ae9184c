use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use ndfd_core::{is_directory, path_exists};
use slog::{debug, info, Logger};

use crate::datetime_utils::{self, now_in, Timestamp};
use crate::local_files::{file_for_local, file_for_utc, VariableDescriptor, VariableType};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid variable type: {0}")]
    UnsupportedVariable(String),
    #[error("hourly variable type is not supported for daily forecasts: {0}")]
    HourlyVariable(String),
    #[error("NDFD directory does not exist: {0}")]
    DirectoryNotFound(String),
    #[error("NDFD forecast file not found: {0}")]
    FileNotFound(String),
    #[error("unable to read NDFD forecast file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("forecast column is not a date range: {0}")]
    ColumnDate(String),
    #[error("timestamp error: {0}")]
    Time(#[from] datetime_utils::Error),
}

/// One record of a forecast file, column order preserved
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForecastRow {
    fields: Vec<(String, String)>,
}

impl ForecastRow {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    fn from_record(headers: &csv::StringRecord, record: &csv::StringRecord) -> Self {
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn station(&self) -> Option<&str> {
        self.get("station")
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// Path and contents of the most recent successful read.
#[derive(Debug, Clone, PartialEq)]
pub struct LastRead {
    pub path: PathBuf,
    pub rows: Vec<ForecastRow>,
}

/// One station's forecast value for a single day
#[derive(Debug, Clone, PartialEq)]
pub struct LongForecast {
    pub station: String,
    pub forecast_date: NaiveDate,
    pub variable: VariableType,
    pub value: Option<f64>,
}

/// Finds, reads and filters staged NDFD forecast files for one variable.
pub struct NdfdForecast {
    logger: Logger,
    ndfd_dir: PathBuf,
    variable: VariableDescriptor,
    timezone: String,
    /// Overwritten by every successful read, never consulted to skip one.
    pub last_read: Option<LastRead>,
}

impl NdfdForecast {
    pub fn new<P: Into<PathBuf>>(
        logger: Logger,
        ndfd_dir: P,
        variable_code: &str,
        unit_name: &str,
        unit_abbr: &str,
        timezone: &str,
    ) -> Result<Self, Error> {
        let ndfd_dir = existing_dir(ndfd_dir.into())?;
        let variable = VariableDescriptor::new(variable_code, unit_name, unit_abbr)?;
        Ok(Self::build(logger, ndfd_dir, variable, timezone))
    }

    pub fn from_descriptor<P: Into<PathBuf>>(
        logger: Logger,
        ndfd_dir: P,
        variable: VariableDescriptor,
        timezone: &str,
    ) -> Result<Self, Error> {
        let ndfd_dir = existing_dir(ndfd_dir.into())?;
        Ok(Self::build(logger, ndfd_dir, variable, timezone))
    }

    pub fn preset<P: Into<PathBuf>>(
        logger: Logger,
        ndfd_dir: P,
        variable_type: VariableType,
        timezone: &str,
    ) -> Result<Self, Error> {
        Self::from_descriptor(
            logger,
            ndfd_dir,
            VariableDescriptor::preset(variable_type),
            timezone,
        )
    }

    /// Daily minimum temperature in Celsius
    pub fn min_temperature<P: Into<PathBuf>>(
        logger: Logger,
        ndfd_dir: P,
        timezone: &str,
    ) -> Result<Self, Error> {
        Self::preset(logger, ndfd_dir, VariableType::MinTemperature, timezone)
    }

    pub fn max_temperature<P: Into<PathBuf>>(
        logger: Logger,
        ndfd_dir: P,
        timezone: &str,
    ) -> Result<Self, Error> {
        Self::preset(logger, ndfd_dir, VariableType::MaxTemperature, timezone)
    }

    pub fn min_relative_humidity<P: Into<PathBuf>>(
        logger: Logger,
        ndfd_dir: P,
        timezone: &str,
    ) -> Result<Self, Error> {
        Self::preset(logger, ndfd_dir, VariableType::MinRelativeHumidity, timezone)
    }

    pub fn max_relative_humidity<P: Into<PathBuf>>(
        logger: Logger,
        ndfd_dir: P,
        timezone: &str,
    ) -> Result<Self, Error> {
        Self::preset(logger, ndfd_dir, VariableType::MaxRelativeHumidity, timezone)
    }

    pub fn daily_precipitation<P: Into<PathBuf>>(
        logger: Logger,
        ndfd_dir: P,
        timezone: &str,
    ) -> Result<Self, Error> {
        Self::preset(logger, ndfd_dir, VariableType::DailyPrecipitation, timezone)
    }

    fn build(
        logger: Logger,
        ndfd_dir: PathBuf,
        variable: VariableDescriptor,
        timezone: &str,
    ) -> Self {
        Self {
            logger,
            ndfd_dir,
            variable,
            timezone: timezone.to_string(),
            last_read: None,
        }
    }

    pub fn ndfd_dir(&self) -> &Path {
        &self.ndfd_dir
    }

    pub fn variable(&self) -> &VariableDescriptor {
        &self.variable
    }

    pub fn variable_type(&self) -> VariableType {
        self.variable.variable_type()
    }

    pub fn unit_name(&self) -> &str {
        self.variable.unit_name()
    }

    pub fn unit_abbr(&self) -> &str {
        self.variable.unit_abbr()
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn file_for_utc(&self, utc_ts: &Timestamp) -> Result<String, Error> {
        Ok(file_for_utc(self.variable_type(), utc_ts)?)
    }

    pub fn file_for_local(&self, local_ts: &Timestamp) -> Result<String, Error> {
        Ok(file_for_local(self.variable_type(), local_ts, &self.timezone)?)
    }

    /// Forecast file in effect right now
    pub fn current_file(&self) -> Result<String, Error> {
        let now = now_in(&self.timezone)?;
        self.file_for_local(&now)
    }

    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.ndfd_dir.join(file_name)
    }

    /// Read the forecast in effect at `local_ts` (now when omitted), keeping
    /// only `stations` when the list is non-empty.
    pub fn read<S: AsRef<str>>(
        &mut self,
        local_ts: Option<&Timestamp>,
        stations: &[S],
    ) -> Result<Vec<ForecastRow>, Error> {
        let file_name = match local_ts {
            Some(ts) => self.file_for_local(ts)?,
            None => self.current_file()?,
        };
        let path = self.file_path(&file_name);
        debug!(self.logger, "resolved forecast file: {}", path.display());

        if !path_exists(&path) {
            return Err(Error::FileNotFound(path.display().to_string()));
        }

        let rows = read_rows(&path)?;
        info!(
            self.logger,
            "read {} rows from {}",
            rows.len(),
            path.display()
        );
        self.last_read = Some(LastRead {
            path,
            rows: rows.clone(),
        });

        Ok(filter_stations(rows, stations))
    }
}

fn existing_dir(ndfd_dir: PathBuf) -> Result<PathBuf, Error> {
    if !is_directory(&ndfd_dir) {
        return Err(Error::DirectoryNotFound(ndfd_dir.display().to_string()));
    }
    Ok(ndfd_dir)
}

fn read_rows(path: &Path) -> Result<Vec<ForecastRow>, Error> {
    let read_error = |source: csv::Error| Error::Read {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_error)?;
    let headers = reader.headers().map_err(read_error)?.clone();
    let mut rows = vec![];
    for record in reader.records() {
        let record = record.map_err(read_error)?;
        rows.push(ForecastRow::from_record(&headers, &record));
    }
    Ok(rows)
}

/// Keep rows whose trimmed `station` matches a trimmed entry of `stations`.
/// An empty list keeps everything.
pub fn filter_stations<S: AsRef<str>>(rows: Vec<ForecastRow>, stations: &[S]) -> Vec<ForecastRow> {
    if stations.is_empty() {
        return rows;
    }

    let wanted: HashSet<&str> = stations.iter().map(|s| s.as_ref().trim()).collect();
    rows.into_iter()
        .filter(|row| {
            row.station()
                .map(|station| wanted.contains(station.trim()))
                .unwrap_or(false)
        })
        .collect()
}

/// Turn wide rows (one column per forecast period, `YYYYMMDD-YYYYMMDD`)
/// into one record per station and day.
pub fn wide_to_long(
    rows: &[ForecastRow],
    variable: VariableType,
) -> Result<Vec<LongForecast>, Error> {
    let mut long = vec![];
    for row in rows {
        let station = row.station().unwrap_or_default().trim().to_string();
        for (column, value) in row.iter() {
            if column == "station" {
                continue;
            }
            long.push(LongForecast {
                station: station.clone(),
                forecast_date: period_start(column)?,
                variable,
                value: value.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            });
        }
    }
    Ok(long)
}

fn period_start(column: &str) -> Result<NaiveDate, Error> {
    let start = column.trim().split('-').next().unwrap_or_default();
    NaiveDate::parse_from_str(start, "%Y%m%d").map_err(|_| Error::ColumnDate(column.to_string()))
}
