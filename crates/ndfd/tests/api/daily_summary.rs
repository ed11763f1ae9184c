use crate::helpers::{fixture_text, test_logger, MockFetcher};
use chrono::NaiveDate;
use ndfd::{forecasts::Error, ErrorKind, ForecastService, SummaryRequest};
use std::sync::Arc;

fn lansing(location: Option<&str>, add_coordinates: bool) -> SummaryRequest {
    SummaryRequest {
        latitude: 42.73,
        longitude: -84.55,
        begin: Some("2025-11-19T00:00:00".to_string()),
        end: None,
        location: location.map(String::from),
        add_coordinates,
    }
}

fn service_returning(body: String) -> ForecastService {
    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch_xml()
        .withf(|url: &str| {
            url.contains("lat=42.73&lon=-84.55")
                && url.contains("begin=2025-11-19T00%3A00%3A00&end=2030-04-20T00%3A00%3A00")
        })
        .times(1)
        .returning(move |_| Ok(body.clone()));
    ForecastService::new(test_logger(), Arc::new(fetcher))
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
}

#[tokio::test]
async fn summarizes_every_metric_by_day() {
    let service = service_returning(fixture_text("dwml_sample.xml"));
    let summary = service.daily_summary(&lansing(None, false)).await.unwrap();

    assert_eq!(summary.dates(), vec![day(19), day(20), day(21), day(22)]);
    assert_eq!(
        summary.metric_columns,
        vec![
            "Maximum Relative Humidity (percent)",
            "Minimum Relative Humidity (percent)",
            "Maximum Wind Speed (meters/second)",
            "Mean Wind Speed (meters/second)",
            "Total Liquid Precipitation Amount (inches)",
            "Daily Minimum Temperature (Celsius)",
            "Daily Maximum Temperature (Celsius)",
        ]
    );

    assert_eq!(
        summary.value(day(19), "Maximum Relative Humidity (percent)"),
        Some(60.0)
    );
    assert_eq!(
        summary.value(day(19), "Minimum Relative Humidity (percent)"),
        Some(40.0)
    );
    assert_eq!(
        summary.value(day(19), "Total Liquid Precipitation Amount (inches)"),
        Some(3.5)
    );
    assert_eq!(
        summary.value(day(19), "Mean Wind Speed (meters/second)"),
        Some(4.0)
    );
    assert_eq!(
        summary.value(day(20), "Daily Minimum Temperature (Celsius)"),
        Some(-3.0)
    );
}

#[tokio::test]
async fn dates_missing_from_a_metric_stay_missing() {
    let service = service_returning(fixture_text("dwml_sample.xml"));
    let summary = service.daily_summary(&lansing(None, false)).await.unwrap();

    // humidity ends on the 20th while temperatures run through the 21st
    assert_eq!(
        summary.value(day(21), "Maximum Relative Humidity (percent)"),
        None
    );
    assert_eq!(
        summary.value(day(21), "Daily Maximum Temperature (Celsius)"),
        Some(4.0)
    );

    // the only humidity sample on the 22nd is not numeric
    assert_eq!(
        summary.value(day(22), "Minimum Relative Humidity (percent)"),
        None
    );
    assert_eq!(
        summary.value(day(22), "Maximum Wind Speed (meters/second)"),
        Some(5.0)
    );
    assert_eq!(
        summary.value(day(22), "Total Liquid Precipitation Amount (inches)"),
        None
    );
}

#[tokio::test]
async fn writes_location_and_coordinates() {
    let service = service_returning(fixture_text("dwml_sample.xml"));
    let summary = service
        .daily_summary(&lansing(Some("Lansing"), true))
        .await
        .unwrap();

    let mut out = vec![];
    summary.write_csv(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("location,forecast_date,Maximum Relative Humidity (percent),"));
    assert!(lines[0].ends_with(",latitude,longitude"));
    assert_eq!(lines[1], "Lansing,2025-11-19,60,40,6,4,3.5,-1,8,42.73,-84.55");
    assert_eq!(lines[4], "Lansing,2025-11-22,,,5,5,,,,42.73,-84.55");
}

#[tokio::test]
async fn error_payload_is_a_data_source_error() {
    let body = "<?xml version='1.0'?><error><h2>ERROR</h2><pre>Invalid latitude</pre></error>";
    let service = service_returning(body.to_string());

    let err = service
        .daily_summary(&lansing(None, false))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DataSource(_)));
    assert_eq!(err.kind(), ErrorKind::DataSource);
}

#[tokio::test]
async fn fetch_returns_the_body_unfiltered() {
    let body = "<error>error</error>".to_string();
    let service = service_returning(body.clone());

    let raw = service
        .fetch(42.73, -84.55, Some("2025-11-19T00:00:00"), None)
        .await
        .unwrap();
    assert_eq!(raw, body);
}

#[tokio::test]
async fn missing_metric_aborts_the_summary() {
    let body = fixture_text("dwml_sample.xml").replace("type=\"sustained\"", "type=\"gust\"");
    let service = service_returning(body);

    let err = service
        .daily_summary(&lansing(None, false))
        .await
        .unwrap_err();
    assert!(matches!(&err, Error::MetricNotFound(metric) if metric.contains("wind-speed")));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn truncated_document_is_an_xml_error() {
    let full = fixture_text("dwml_sample.xml");
    let cut = full.find("<parameters ").unwrap();
    let service = service_returning(full[..cut].to_string());

    let err = service
        .daily_summary(&lansing(None, false))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Xml(_)));
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[tokio::test]
async fn unparseable_start_time_is_reported_with_its_value() {
    let body = fixture_text("dwml_sample.xml").replacen(
        "<start-valid-time>2025-11-19T07:00:00-05:00</start-valid-time>",
        "<start-valid-time>soon</start-valid-time>",
        1,
    );
    let service = service_returning(body);

    let err = service
        .daily_summary(&lansing(None, false))
        .await
        .unwrap_err();
    assert!(matches!(&err, Error::TimeParse { value, .. } if value == "soon"));
    assert_eq!(err.kind(), ErrorKind::Io);
}
