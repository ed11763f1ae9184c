use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::datetime_utils::Timestamp;
use crate::forecasts::{Error, Metric};

#[derive(Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(rename = "dwml")]
pub struct Dwml {
    #[serde(rename = "data")]
    pub data: Data,
}

#[derive(Deserialize, Debug, PartialEq, Clone, Default)]
pub struct Data {
    #[serde(rename = "location", default)]
    pub location: Vec<Location>,

    #[serde(rename = "time-layout", default)]
    pub time_layout: Vec<TimeLayout>,

    #[serde(rename = "parameters", default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Deserialize, Debug, PartialEq, Clone)]
pub struct Location {
    #[serde(rename = "location-key")]
    pub location_key: String,

    #[serde(rename = "point")]
    pub point: Option<Point>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Point {
    #[serde(rename = "latitude")]
    pub latitude: String,

    #[serde(rename = "longitude")]
    pub longitude: String,
}

#[derive(Deserialize, Debug, PartialEq, Clone)]
pub struct Parameter {
    #[serde(rename = "applicable-location")]
    pub applicable_location: String,

    #[serde(rename = "temperature")]
    // holds max and min
    pub temperature: Option<Vec<DataReading>>,

    #[serde(rename = "precipitation")]
    pub precipitation: Option<Vec<DataReading>>,

    #[serde(rename = "wind-speed")]
    pub wind_speed: Option<Vec<DataReading>>,

    #[serde(rename = "humidity")]
    pub humidity: Option<Vec<DataReading>>,
}

impl Parameter {
    fn readings(&self, element: &str) -> &[DataReading] {
        let readings = match element {
            "temperature" => &self.temperature,
            "precipitation" => &self.precipitation,
            "wind-speed" => &self.wind_speed,
            "humidity" => &self.humidity,
            _ => &None,
        };
        readings.as_deref().unwrap_or_default()
    }
}

#[derive(Deserialize, Debug, PartialEq, Clone)]
pub struct DataReading {
    #[serde(rename = "name")]
    pub name: String,

    #[serde(rename = "value", default)]
    pub value: Vec<String>,

    #[serde(rename = "type")]
    pub reading_type: String,

    #[serde(rename = "units")]
    pub units: String,

    #[serde(rename = "time-layout")]
    pub time_layout: String,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct TimeLayout {
    #[serde(rename = "time-coordinate")]
    pub time_coordinate: Option<String>,
    pub summarization: Option<String>,
    #[serde(rename = "$value", default)]
    pub time: Vec<Time>,
}

impl TimeLayout {
    pub fn layout_key(&self) -> Option<&str> {
        self.time.iter().find_map(|item| match item {
            Time::LayoutKey(key) => Some(key.trim()),
            _ => None,
        })
    }

    pub fn start_times(&self) -> impl Iterator<Item = &str> {
        self.time.iter().filter_map(|item| match item {
            Time::StartTime(start) => Some(start.trim()),
            _ => None,
        })
    }
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub enum Time {
    #[serde(rename = "layout-key")]
    LayoutKey(String),
    #[serde(rename = "start-valid-time")]
    StartTime(String),
    #[serde(rename = "end-valid-time")]
    EndTime(String),
}

/// One reading of a metric, dated by its period start as published
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub start: Timestamp,
    pub forecast_date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub metric: Metric,
    pub points: Vec<SeriesPoint>,
}

impl Dwml {
    /// Parse a raw service response.
    pub fn parse(raw_xml: &str) -> Result<Self, Error> {
        let grouped_xml = group_parameter_elements(raw_xml);
        Ok(serde_xml_rs::from_str(&grouped_xml)?)
    }

    /// First reading matching the metric's element and `type` across all
    /// parameter blocks.
    pub fn find_reading(&self, metric: Metric) -> Option<&DataReading> {
        self.data.parameters.iter().find_map(|parameter| {
            parameter.readings(metric.element()).iter().find(|reading| {
                metric
                    .reading_type()
                    .map_or(true, |wanted| reading.reading_type == wanted)
            })
        })
    }
}

/// Start times of the time-layout with `layout_key`; empty when none match.
pub fn resolve_time_layout(document: &Dwml, layout_key: &str) -> Result<Vec<Timestamp>, Error> {
    let Some(layout) = document
        .data
        .time_layout
        .iter()
        .find(|layout| layout.layout_key() == Some(layout_key.trim()))
    else {
        return Ok(vec![]);
    };

    layout
        .start_times()
        .map(|start| {
            DateTime::parse_from_rfc3339(start)
                .map(Timestamp::Fixed)
                .map_err(|source| Error::TimeParse {
                    value: start.to_string(),
                    source,
                })
        })
        .collect()
}

/// Pair a metric's values with the start times of its time-layout.
///
/// An unresolvable time-layout gives an empty series. A layout whose length
/// differs from the value count is rejected rather than truncated.
pub fn extract_series(document: &Dwml, metric: Metric) -> Result<MetricSeries, Error> {
    let reading = document
        .find_reading(metric)
        .ok_or_else(|| Error::MetricNotFound(metric.to_string()))?;

    let start_times = resolve_time_layout(document, &reading.time_layout)?;
    if start_times.is_empty() {
        return Ok(MetricSeries {
            metric,
            points: vec![],
        });
    }

    if start_times.len() != reading.value.len() {
        return Err(Error::MisalignedSeries {
            metric: metric.to_string(),
            layout: reading.time_layout.clone(),
            values: reading.value.len(),
            times: start_times.len(),
        });
    }

    let points = start_times
        .into_iter()
        .zip(reading.value.iter())
        .map(|(start, value)| SeriesPoint {
            forecast_date: start.date_naive(),
            start,
            value: value.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        })
        .collect();

    Ok(MetricSeries { metric, points })
}

/// `"{name} ({units})"` as declared on the metric's element
pub fn metric_label(document: &Dwml, metric: Metric) -> Result<String, Error> {
    let reading = document
        .find_reading(metric)
        .ok_or_else(|| Error::MetricNotFound(metric.to_string()))?;
    Ok(format!("{} ({})", reading.name.trim(), reading.units.trim()))
}

/// Reorder child elements within `<parameters>` blocks so that elements with
/// the same tag name are adjacent. `serde-xml-rs` cannot collect
/// non-adjacent siblings into a Vec, and the service interleaves the two
/// `<temperature>` blocks with other elements depending on the request.
pub fn group_parameter_elements(xml: &str) -> String {
    const CLOSE: &str = "</parameters>";
    let mut result = String::with_capacity(xml.len());
    let mut remaining = xml;

    while let Some(params_start) = remaining.find("<parameters ") {
        result.push_str(&remaining[..params_start]);

        let after_params = &remaining[params_start..];
        let Some(close_pos) = after_params.find(CLOSE) else {
            result.push_str(after_params);
            return result;
        };
        let params_end = close_pos + CLOSE.len();
        let params_block = &after_params[..params_end];

        let Some(open_tag_end) = params_block.find('>').map(|pos| pos + 1) else {
            result.push_str(params_block);
            remaining = &after_params[params_end..];
            continue;
        };

        let opening_tag = &params_block[..open_tag_end];
        let inner = &params_block[open_tag_end..close_pos];

        let mut elements = child_elements(inner);
        // stable, so max/min temperature keep their published order
        elements.sort_by(|a, b| a.0.cmp(b.0));

        result.push_str(opening_tag);
        result.push('\n');
        for (_, element) in &elements {
            result.push_str(element);
            result.push('\n');
        }
        result.push_str(CLOSE);

        remaining = &after_params[params_end..];
    }

    result.push_str(remaining);
    result
}

/// Top-level child elements as (tag name, full element text).
fn child_elements(inner: &str) -> Vec<(&str, &str)> {
    let mut elements = vec![];
    let mut pos = 0;

    while let Some(offset) = inner[pos..].find('<') {
        let tag_start = pos + offset;
        let after_lt = &inner[tag_start + 1..];
        let tag_name_end = after_lt
            .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
            .unwrap_or(after_lt.len());
        let tag_name = &after_lt[..tag_name_end];

        if tag_name.is_empty() || tag_name.starts_with('!') || tag_name.starts_with('?') {
            pos = tag_start + 1;
            continue;
        }

        let open_end = match after_lt.find('>') {
            Some(end) => tag_start + 1 + end + 1,
            None => break,
        };

        // <element ... />
        if inner[..open_end].ends_with("/>") {
            elements.push((tag_name, &inner[tag_start..open_end]));
            pos = open_end;
            continue;
        }

        let closing_tag = format!("</{}>", tag_name);
        match inner[open_end..].find(&closing_tag) {
            Some(close_pos) => {
                let element_end = open_end + close_pos + closing_tag.len();
                elements.push((tag_name, &inner[tag_start..element_end]));
                pos = element_end;
            }
            None => pos = open_end,
        }
    }

    elements
}
