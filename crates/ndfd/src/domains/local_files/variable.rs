use std::fmt::{self, Display};
use std::str::FromStr;

use crate::local_files::Error;

/// Hourly NDFD variable names, recognized but not read by the daily tools
pub const HOURLY_VARIABLE_CODES: [&str; 6] = ["relh", "pops", "qpf6", "temp", "wdir", "wspd"];

/// Daily NDFD variables staged as local forecast files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    MaxRelativeHumidity,
    MinRelativeHumidity,
    MaxTemperature,
    MinTemperature,
    DailyPrecipitation,
}

impl VariableType {
    pub const ALL: [VariableType; 5] = [
        VariableType::MaxRelativeHumidity,
        VariableType::MinRelativeHumidity,
        VariableType::MaxTemperature,
        VariableType::MinTemperature,
        VariableType::DailyPrecipitation,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            VariableType::MaxRelativeHumidity => "maxr",
            VariableType::MinRelativeHumidity => "minr",
            VariableType::MaxTemperature => "maxt",
            VariableType::MinTemperature => "mint",
            VariableType::DailyPrecipitation => "qpfd",
        }
    }

    /// Unit name and abbreviation the staged files are written in
    pub fn default_units(&self) -> (&'static str, &'static str) {
        match self {
            VariableType::MaxRelativeHumidity | VariableType::MinRelativeHumidity => {
                ("percent", "%")
            }
            VariableType::MaxTemperature | VariableType::MinTemperature => ("Celsius", "°C"),
            VariableType::DailyPrecipitation => ("millimeters", "mm"),
        }
    }
}

impl Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for VariableType {
    type Err = Error;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        if let Some(variable) = Self::ALL.iter().find(|v| v.code() == code) {
            return Ok(*variable);
        }
        if HOURLY_VARIABLE_CODES.contains(&code) {
            return Err(Error::HourlyVariable(code.to_string()));
        }
        Err(Error::UnsupportedVariable(code.to_string()))
    }
}

/// Identity of a forecast variable along with the units it is reported in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDescriptor {
    variable_type: VariableType,
    unit_name: String,
    unit_abbr: String,
}

impl VariableDescriptor {
    pub fn new(code: &str, unit_name: &str, unit_abbr: &str) -> Result<Self, Error> {
        Ok(Self {
            variable_type: code.parse()?,
            unit_name: unit_name.to_string(),
            unit_abbr: unit_abbr.to_string(),
        })
    }

    pub fn preset(variable_type: VariableType) -> Self {
        let (unit_name, unit_abbr) = variable_type.default_units();
        Self {
            variable_type,
            unit_name: unit_name.to_string(),
            unit_abbr: unit_abbr.to_string(),
        }
    }

    pub fn variable_type(&self) -> VariableType {
        self.variable_type
    }

    pub fn code(&self) -> &'static str {
        self.variable_type.code()
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    pub fn unit_abbr(&self) -> &str {
        &self.unit_abbr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_daily_code() {
        for code in ["maxr", "minr", "maxt", "mint", "qpfd"] {
            let variable: VariableType = code.parse().unwrap();
            assert_eq!(variable.code(), code);
        }
    }

    #[test]
    fn hourly_codes_are_reported_separately() {
        assert!(matches!(
            "wspd".parse::<VariableType>(),
            Err(Error::HourlyVariable(code)) if code == "wspd"
        ));
        assert!(matches!(
            "notavalid".parse::<VariableType>(),
            Err(Error::UnsupportedVariable(_))
        ));
    }

    #[test]
    fn presets_carry_units() {
        let mint = VariableDescriptor::preset(VariableType::MinTemperature);
        assert_eq!(mint.code(), "mint");
        assert_eq!(mint.unit_name(), "Celsius");
        assert_eq!(mint.unit_abbr(), "°C");

        let qpfd = VariableDescriptor::preset(VariableType::DailyPrecipitation);
        assert_eq!(qpfd.unit_abbr(), "mm");
    }

    #[test]
    fn descriptor_keeps_units_verbatim() {
        let descriptor = VariableDescriptor::new("maxt", "Fahrenheit", "F").unwrap();
        assert_eq!(descriptor.variable_type(), VariableType::MaxTemperature);
        assert_eq!(descriptor.unit_name(), "Fahrenheit");
        assert!(VariableDescriptor::new("temp", "Celsius", "°C").is_err());
    }
}
