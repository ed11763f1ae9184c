use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use reqwest::Url;
use slog::{debug, info, Logger};

use crate::forecasts::Metric;
use ndfd_core::DEFAULT_FORECAST_END;

/// Time-series endpoint of the NDFD digital forecast XML service
pub const NDFD_DIGITAL_FORECAST_URL: &str =
    "https://digital.weather.gov/xml/sample_products/browser_interface/ndfdXMLclient.php";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("request to forecast service failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("forecast service returned an error: {0}")]
    DataSource(String),
    #[error("unable to parse forecast document: {0}")]
    Xml(#[from] serde_xml_rs::Error),
    #[error("unable to build forecast query: {0}")]
    InvalidUrl(String),
    #[error("metric not found in forecast document: {0}")]
    MetricNotFound(String),
    #[error("{metric} has {values} values but time-layout {layout} has {times} start times")]
    MisalignedSeries {
        metric: String,
        layout: String,
        values: usize,
        times: usize,
    },
    #[error("invalid start time {value}: {source}")]
    TimeParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Transport used to retrieve a forecast document
#[async_trait]
pub trait FetchXml: Send + Sync {
    async fn fetch_xml(&self, url: &str) -> Result<String, Error>;
}

/// Metric-unit time-series query for one point. `begin` defaults to local
/// midnight today and `end` to a fixed far-future date. Every value is
/// form encoded, so offsets like `+00:00` reach the service intact.
pub fn build_query_url(
    latitude: f64,
    longitude: f64,
    begin: Option<&str>,
    end: Option<&str>,
    metrics: &[Metric],
) -> Result<String, Error> {
    let begin = match begin {
        Some(begin) => begin.to_string(),
        None => format!("{}T00:00:00", Local::now().date_naive().format("%Y-%m-%d")),
    };
    let end = end.unwrap_or(DEFAULT_FORECAST_END);

    let mut params = vec![
        ("Unit", "m".to_string()),
        ("lat", latitude.to_string()),
        ("lon", longitude.to_string()),
        ("product", "time-series".to_string()),
        ("begin", begin),
        ("end", end.to_string()),
    ];
    for metric in metrics {
        let code = metric.query_code();
        params.push((code, code.to_string()));
    }

    let url = Url::parse_with_params(NDFD_DIGITAL_FORECAST_URL, &params)
        .map_err(|e| Error::InvalidUrl(e.to_string()))?;
    Ok(url.into())
}

/// The service answers failures with a 200 and an error document, so the
/// body itself is the only reliable signal.
pub fn validate_response(body: &str) -> Result<(), Error> {
    if body.to_uppercase().contains("ERROR") {
        let excerpt: String = body.trim().chars().take(200).collect();
        return Err(Error::DataSource(excerpt));
    }
    Ok(())
}

pub struct ForecastService {
    pub(crate) logger: Logger,
    fetcher: Arc<dyn FetchXml>,
}

impl ForecastService {
    pub fn new(logger: Logger, fetcher: Arc<dyn FetchXml>) -> Self {
        ForecastService { logger, fetcher }
    }

    /// Raw response for the fixed daily metric set, unvalidated.
    pub async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> Result<String, Error> {
        let url = build_query_url(latitude, longitude, begin, end, &Metric::ALL)?;
        info!(
            self.logger,
            "requesting forecast for ({}, {})", latitude, longitude
        );
        debug!(self.logger, "url: {}", url);
        let body = self.fetcher.fetch_xml(&url).await?;
        debug!(self.logger, "received {} bytes", body.len());
        Ok(body)
    }
}
