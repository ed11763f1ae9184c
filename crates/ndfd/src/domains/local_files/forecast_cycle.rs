//! NDFD issues new forecasts four times a day at 00, 06, 12 and 18 UTC.
//! Staged files are named after the variable and the cycle that produced
//! them, e.g. `mint_20251119t06.csv`.

use chrono::NaiveDate;

use crate::datetime_utils::{self, is_utc, to_utc, with_zone_if_absent, Timestamp};
use crate::VariableType;

pub const ISSUANCE_HOURS: [u32; 4] = [0, 6, 12, 18];

pub fn issuance_hour_for_utc_hour(hour: u32) -> u32 {
    match hour {
        0..=5 => 0,
        6..=11 => 6,
        12..=17 => 12,
        _ => 18,
    }
}

pub fn file_name(variable: VariableType, issuance_date: NaiveDate, issuance_hour: u32) -> String {
    format!(
        "{}_{}t{:02}.csv",
        variable.code(),
        issuance_date.format("%Y%m%d"),
        issuance_hour
    )
}

/// Forecast file in effect at a UTC instant.
pub fn file_for_utc(variable: VariableType, utc_ts: &Timestamp) -> Result<String, datetime_utils::Error> {
    if !is_utc(utc_ts) {
        return Err(datetime_utils::Error::NotUtc(utc_ts.to_string()));
    }
    let hour = issuance_hour_for_utc_hour(utc_ts.hour());
    Ok(file_name(variable, utc_ts.date_naive(), hour))
}

/// Forecast file in effect at a local time. Naive values are taken to be in
/// `zone_name`. The issuance date is the UTC date, which can differ from the
/// local calendar date late in the evening.
pub fn file_for_local(
    variable: VariableType,
    local_ts: &Timestamp,
    zone_name: &str,
) -> Result<String, datetime_utils::Error> {
    let zoned = with_zone_if_absent(local_ts, zone_name)?;
    let utc = to_utc(&zoned, None)?;
    file_for_utc(variable, &utc)
}
