mod forecast_cycle;
mod ndfd_file;
mod variable;

pub use forecast_cycle::*;
pub use ndfd_file::*;
pub use variable::*;
