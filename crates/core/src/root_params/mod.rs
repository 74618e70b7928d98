mod manager;
mod root_parameter;

pub use manager::*;
pub use root_parameter::*;
