use std::fmt::{self, Display};

/*
Element input names for the digital forecast service:
https://graphical.weather.gov/xml/docs/elementInputNames.php

Maximum Temperature 	maxt
Minimum Temperature 	mint
Relative Humidity 	rh
Wind Speed 	wspd
Liquid Precipitation Amount 	qpf
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Humidity,
    WindSpeed,
    LiquidPrecipitation,
    MinTemperature,
    MaxTemperature,
}

/// How one metric's readings for a calendar date collapse to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Max,
    Min,
    Mean,
    Sum,
}

impl Aggregation {
    /// Missing readings are skipped; a date with nothing but missing
    /// readings stays missing.
    pub fn apply(&self, values: &[Option<f64>]) -> Option<f64> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }
        match self {
            Aggregation::Max => present.iter().copied().reduce(f64::max),
            Aggregation::Min => present.iter().copied().reduce(f64::min),
            Aggregation::Sum => Some(present.iter().sum()),
            Aggregation::Mean => Some(present.iter().sum::<f64>() / present.len() as f64),
        }
    }
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Humidity,
        Metric::WindSpeed,
        Metric::LiquidPrecipitation,
        Metric::MinTemperature,
        Metric::MaxTemperature,
    ];

    /// Query parameter requesting this metric from the service
    pub fn query_code(&self) -> &'static str {
        match self {
            Metric::Humidity => "rh",
            Metric::WindSpeed => "wspd",
            Metric::LiquidPrecipitation => "qpf",
            Metric::MinTemperature => "mint",
            Metric::MaxTemperature => "maxt",
        }
    }

    /// Element holding the metric inside `<parameters>`
    pub fn element(&self) -> &'static str {
        match self {
            Metric::Humidity => "humidity",
            Metric::WindSpeed => "wind-speed",
            Metric::LiquidPrecipitation => "precipitation",
            Metric::MinTemperature | Metric::MaxTemperature => "temperature",
        }
    }

    /// Required `type` attribute, `None` accepts any
    pub fn reading_type(&self) -> Option<&'static str> {
        match self {
            Metric::Humidity => None,
            Metric::WindSpeed => Some("sustained"),
            Metric::LiquidPrecipitation => Some("liquid"),
            Metric::MinTemperature => Some("minimum"),
            Metric::MaxTemperature => Some("maximum"),
        }
    }

    /// Output columns as (aggregation, label prefix). Temperatures are
    /// already daily and keep the declared label as is.
    pub fn columns(&self) -> &'static [(Aggregation, Option<&'static str>)] {
        match self {
            Metric::Humidity => &[
                (Aggregation::Max, Some("Maximum")),
                (Aggregation::Min, Some("Minimum")),
            ],
            Metric::WindSpeed => &[
                (Aggregation::Max, Some("Maximum")),
                (Aggregation::Mean, Some("Mean")),
            ],
            Metric::LiquidPrecipitation => &[(Aggregation::Sum, Some("Total"))],
            Metric::MinTemperature => &[(Aggregation::Min, None)],
            Metric::MaxTemperature => &[(Aggregation::Max, None)],
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.reading_type() {
            Some(reading_type) => write!(f, "{}[@type='{}']", self.element(), reading_type),
            None => write!(f, "{}", self.element()),
        }
    }
}
