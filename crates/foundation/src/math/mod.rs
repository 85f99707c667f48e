pub mod geodesy;
pub mod local;
pub mod precision;

pub use geodesy::*;
pub use local::*;
pub use precision::*;
