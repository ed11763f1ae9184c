use crate::helpers::{fixture, test_logger};
use chrono::NaiveDate;
use ndfd::{local_files::Error, wide_to_long, ErrorKind, NdfdForecast, Timestamp, VariableType};
use std::fs;
use tempfile::TempDir;

fn staged_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(
        fixture("mint_20251119t06.csv"),
        dir.path().join("mint_20251119t06.csv"),
    )
    .unwrap();
    dir
}

fn local(value: &str) -> Timestamp {
    value.parse().unwrap()
}

#[test]
fn reads_file_for_local_time_and_filters_stations() {
    let dir = staged_dir();
    let mut forecast = NdfdForecast::min_temperature(test_logger(), dir.path(), "US/Eastern").unwrap();

    let rows = forecast
        .read(Some(&local("2025-11-19T02:00")), &["ewx_001", "ewx_002"])
        .unwrap();
    let stations: Vec<&str> = rows.iter().filter_map(|row| row.station()).collect();
    assert_eq!(stations, vec!["ewx_001", "ewx_002 "]);

    let last_read = forecast.last_read.as_ref().unwrap();
    assert_eq!(last_read.path, dir.path().join("mint_20251119t06.csv"));
    assert_eq!(last_read.rows.len(), 3);
}

#[test]
fn empty_filter_keeps_every_row() {
    let dir = staged_dir();
    let mut forecast = NdfdForecast::min_temperature(test_logger(), dir.path(), "US/Eastern").unwrap();

    let none: [&str; 0] = [];
    let rows = forecast
        .read(Some(&local("2025-11-19T06:59")), &none)
        .unwrap();
    assert_eq!(rows.len(), 3);
}

#[test]
fn aware_time_ignores_working_zone() {
    let dir = staged_dir();
    let mut forecast =
        NdfdForecast::min_temperature(test_logger(), dir.path(), "America/Denver").unwrap();

    let rows = forecast
        .read(Some(&local("2025-11-19T07:00:00Z")), &["ewx_003"])
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("20251120-20251121"), Some("-2.25"));
}

#[test]
fn missing_cycle_file_is_not_found() {
    let dir = staged_dir();
    let mut forecast = NdfdForecast::min_temperature(test_logger(), dir.path(), "US/Eastern").unwrap();

    let none: [&str; 0] = [];
    let err = forecast
        .read(Some(&local("2025-11-19T08:00")), &none)
        .unwrap_err();
    assert!(matches!(&err, Error::FileNotFound(path) if path.ends_with("mint_20251119t12.csv")));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(forecast.last_read.is_none());
}

#[test]
fn construction_validates_directory_and_variable() {
    let dir = staged_dir();

    let err = NdfdForecast::new(
        test_logger(),
        dir.path().join("missing"),
        "mint",
        "Celsius",
        "°C",
        "US/Eastern",
    )
    .err()
    .unwrap();
    assert!(matches!(err, Error::DirectoryNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = NdfdForecast::new(test_logger(), dir.path(), "notavalid", "", "", "US/Eastern")
        .err()
        .unwrap();
    assert!(matches!(err, Error::UnsupportedVariable(_)));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = NdfdForecast::new(test_logger(), dir.path(), "relh", "percent", "%", "US/Eastern")
        .err()
        .unwrap();
    assert!(matches!(err, Error::HourlyVariable(_)));
}

#[test]
fn units_and_zone_are_kept_as_given() {
    let dir = staged_dir();
    let forecast = NdfdForecast::new(
        test_logger(),
        dir.path(),
        "maxt",
        "Fahrenheit",
        "F",
        "Not/AZone",
    )
    .unwrap();
    assert_eq!(forecast.variable_type(), VariableType::MaxTemperature);
    assert_eq!(forecast.unit_name(), "Fahrenheit");
    assert_eq!(forecast.timezone(), "Not/AZone");
    assert!(forecast.current_file().is_err());
}

#[test]
fn rows_convert_to_long_records() {
    let dir = staged_dir();
    let mut forecast = NdfdForecast::min_temperature(test_logger(), dir.path(), "US/Eastern").unwrap();
    let rows = forecast
        .read(Some(&local("2025-11-19T02:00")), &["ewx_002"])
        .unwrap();

    let long = wide_to_long(&rows, forecast.variable_type()).unwrap();
    assert_eq!(long.len(), 3);
    assert!(long.iter().all(|record| record.station == "ewx_002"));
    assert_eq!(
        long[1].forecast_date,
        NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
    );
    assert_eq!(long[0].value, Some(2.0));
    assert_eq!(long[1].value, None);
}

#[test]
fn ragged_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("mint_20251119t06.csv"),
        "station,20251119-20251120,20251120-20251121,20251121-20251122\newx_001,-1.2\n",
    )
    .unwrap();
    let mut forecast = NdfdForecast::min_temperature(test_logger(), dir.path(), "US/Eastern").unwrap();

    let none: [&str; 0] = [];
    let err = forecast
        .read(Some(&local("2025-11-19T02:00")), &none)
        .unwrap_err();
    assert!(matches!(&err, Error::Read { path, .. } if path.contains("mint_20251119t06.csv")));
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(forecast.last_read.is_none());
}
