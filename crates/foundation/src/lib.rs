pub mod bounds;
pub mod ids;
pub mod math;
pub mod polygon;

// Foundation crate: small, well-tested geographic primitives only.
pub use bounds::*;
pub use ids::*;
pub use polygon::*;
