pub mod forecasts;
pub mod local_files;

pub use forecasts::{
    build_query_url, extract_labeled_series, merge_daily, summarize, validate_response,
    DailySummary, DailySummaryRow, Dwml, FetchXml, ForecastService, Metric, SummaryRequest,
    NDFD_DIGITAL_FORECAST_URL,
};
pub use local_files::{
    file_for_local, file_for_utc, file_name, filter_stations, issuance_hour_for_utc_hour,
    wide_to_long, ForecastRow, LongForecast, NdfdForecast, VariableDescriptor, VariableType,
    HOURLY_VARIABLE_CODES, ISSUANCE_HOURS,
};
