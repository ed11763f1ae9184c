use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use chrono::NaiveDate;
use slog::{debug, info, warn};

use crate::forecasts::{
    extract_series, metric_label, validate_response, Dwml, Error, ForecastService, Metric,
    MetricSeries,
};

pub const FORECAST_DATE_COLUMN: &str = "forecast_date";

/// Parameters for one daily summary run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub begin: Option<String>,
    pub end: Option<String>,
    pub location: Option<String>,
    pub add_coordinates: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySummaryRow {
    pub forecast_date: NaiveDate,
    /// One entry per metric column, `None` where the metric has no data
    pub values: Vec<Option<f64>>,
}

/// Per-date aggregates of every requested metric, sorted by date
#[derive(Debug, Clone, PartialEq)]
pub struct DailySummary {
    pub location: Option<String>,
    pub coordinates: Option<(f64, f64)>,
    pub metric_columns: Vec<String>,
    pub rows: Vec<DailySummaryRow>,
}

impl DailySummary {
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec![];
        if self.location.is_some() {
            headers.push("location".to_string());
        }
        headers.push(FORECAST_DATE_COLUMN.to_string());
        headers.extend(self.metric_columns.iter().cloned());
        if self.coordinates.is_some() {
            headers.push("latitude".to_string());
            headers.push("longitude".to_string());
        }
        headers
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|row| row.forecast_date).collect()
    }

    /// Value of `column` on `date`; `None` when missing or unknown.
    pub fn value(&self, date: NaiveDate, column: &str) -> Option<f64> {
        let index = self.metric_columns.iter().position(|c| c == column)?;
        self.rows
            .iter()
            .find(|row| row.forecast_date == date)
            .and_then(|row| row.values[index])
    }

    /// Comma separated output with a header line; missing values are empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(self.headers())?;

        for row in &self.rows {
            let mut record = vec![];
            if let Some(location) = &self.location {
                record.push(location.clone());
            }
            record.push(row.forecast_date.format("%Y-%m-%d").to_string());
            record.extend(
                row.values
                    .iter()
                    .map(|value| value.map(|v| v.to_string()).unwrap_or_default()),
            );
            if let Some((latitude, longitude)) = self.coordinates {
                record.push(latitude.to_string());
                record.push(longitude.to_string());
            }
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// Extract every metric with its declared label. Any metric missing from the
/// document fails the whole set.
pub fn extract_labeled_series(
    document: &Dwml,
    metrics: &[Metric],
) -> Result<Vec<(MetricSeries, String)>, Error> {
    metrics
        .iter()
        .map(|metric| {
            let series = extract_series(document, *metric)?;
            let label = metric_label(document, *metric)?;
            Ok((series, label))
        })
        .collect()
}

/// Aggregate each series by calendar date and outer-merge them, so a date
/// covered by any series gets a row.
pub fn merge_daily(
    labeled_series: &[(MetricSeries, String)],
    location: Option<&str>,
    coordinates: Option<(f64, f64)>,
) -> DailySummary {
    let mut metric_columns = vec![];
    // column index -> date -> aggregate
    let mut column_values: Vec<BTreeMap<NaiveDate, Option<f64>>> = vec![];
    let mut dates = BTreeSet::new();

    for (series, label) in labeled_series {
        let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
        for point in &series.points {
            by_date
                .entry(point.forecast_date)
                .or_default()
                .push(point.value);
        }
        dates.extend(by_date.keys().copied());

        for (aggregation, prefix) in series.metric.columns() {
            metric_columns.push(match prefix {
                Some(prefix) => format!("{} {}", prefix, label),
                None => label.clone(),
            });
            column_values.push(
                by_date
                    .iter()
                    .map(|(date, values)| (*date, aggregation.apply(values)))
                    .collect(),
            );
        }
    }

    let rows = dates
        .into_iter()
        .map(|forecast_date| DailySummaryRow {
            forecast_date,
            values: column_values
                .iter()
                .map(|column| column.get(&forecast_date).copied().flatten())
                .collect(),
        })
        .collect();

    DailySummary {
        location: location.map(String::from),
        coordinates,
        metric_columns,
        rows,
    }
}

/// Extract, aggregate and outer-merge `metrics` by calendar date. Any
/// metric missing from the document fails the whole summary.
pub fn summarize(
    document: &Dwml,
    metrics: &[Metric],
    location: Option<&str>,
    coordinates: Option<(f64, f64)>,
) -> Result<DailySummary, Error> {
    let labeled_series = extract_labeled_series(document, metrics)?;
    Ok(merge_daily(&labeled_series, location, coordinates))
}

impl ForecastService {
    /// Fetch, validate, parse and summarize the fixed daily metric set.
    pub async fn daily_summary(&self, request: &SummaryRequest) -> Result<DailySummary, Error> {
        let body = self
            .fetch(
                request.latitude,
                request.longitude,
                request.begin.as_deref(),
                request.end.as_deref(),
            )
            .await?;
        validate_response(&body)?;

        let document = Dwml::parse(&body)?;
        debug!(
            self.logger,
            "parsed {} time-layouts, {} parameter blocks",
            document.data.time_layout.len(),
            document.data.parameters.len()
        );

        let labeled_series = extract_labeled_series(&document, &Metric::ALL)?;
        for (series, _) in &labeled_series {
            self.log_series_gaps(series);
        }

        let coordinates = request
            .add_coordinates
            .then_some((request.latitude, request.longitude));
        let summary = merge_daily(
            &labeled_series,
            request.location.as_deref(),
            coordinates,
        );
        info!(
            self.logger,
            "summarized {} days across {} columns",
            summary.rows.len(),
            summary.metric_columns.len()
        );
        Ok(summary)
    }

    fn log_series_gaps(&self, series: &MetricSeries) {
        if series.points.is_empty() {
            warn!(self.logger, "no time-layout resolved for {}", series.metric);
            return;
        }
        let missing = series.points.iter().filter(|p| p.value.is_none()).count();
        if missing > 0 {
            warn!(
                self.logger,
                "{} of {} values for {} are not numeric",
                missing,
                series.points.len(),
                series.metric
            );
        }
    }
}
