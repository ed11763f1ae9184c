mod daily_summary;
mod download_forecast;
mod metric;
mod xml_forecast;

pub use daily_summary::*;
pub use download_forecast::*;
pub use metric::*;
pub use xml_forecast::*;
