use std::fmt::{self, Display};

use crate::{datetime_utils, forecasts, local_files};

/// Broad failure category shared by every module's error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Ambiguous or conflicting timezone intent, unsupported variable code,
    /// malformed input
    InvalidArgument,
    /// Missing directory, forecast file or forecast metric
    NotFound,
    /// Upstream reported an error in a successful response
    DataSource,
    /// Transport, read or parse failure
    Io,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::NotFound => "not found",
            ErrorKind::DataSource => "data source error",
            ErrorKind::Io => "i/o error",
        };
        write!(f, "{}", kind)
    }
}

impl datetime_utils::Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            datetime_utils::Error::Parse(_) => ErrorKind::Io,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

impl local_files::Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            local_files::Error::UnsupportedVariable(_) | local_files::Error::HourlyVariable(_) => {
                ErrorKind::InvalidArgument
            }
            local_files::Error::DirectoryNotFound(_) | local_files::Error::FileNotFound(_) => {
                ErrorKind::NotFound
            }
            local_files::Error::Read { .. } | local_files::Error::ColumnDate(_) => ErrorKind::Io,
            local_files::Error::Time(err) => err.kind(),
        }
    }
}

impl forecasts::Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            forecasts::Error::MetricNotFound(_) => ErrorKind::NotFound,
            forecasts::Error::InvalidUrl(_) => ErrorKind::InvalidArgument,
            forecasts::Error::DataSource(_) => ErrorKind::DataSource,
            forecasts::Error::Request(_)
            | forecasts::Error::Xml(_)
            | forecasts::Error::MisalignedSeries { .. }
            | forecasts::Error::TimeParse { .. } => ErrorKind::Io,
        }
    }
}
