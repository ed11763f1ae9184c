pub mod datetime_utils;
mod domains;
mod errors;
mod utils;

pub use datetime_utils::Timestamp;
pub use domains::*;
pub use errors::*;
pub use utils::*;
