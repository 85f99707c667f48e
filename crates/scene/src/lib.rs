pub mod hover;
pub mod registry;
pub mod surface;

pub use hover::*;
pub use registry::*;
pub use surface::*;
