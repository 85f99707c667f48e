//! The exhibit session: interaction modes, previews, placements, visits and
//! postcards over a host map engine.
//!
//! Everything here is driven synchronously from UI events. The two network
//! lookups (elevation and postcard generation) happen outside the session;
//! their results come back through [`Session::apply_elevation`] and
//! [`Session::complete_postcard`].

pub mod config;
pub mod error;
pub mod host;
pub mod journal;
pub mod ledger;
pub mod mode;
pub mod postcard;
pub mod session;
pub mod visit;

pub use config::*;
pub use error::*;
pub use host::*;
pub use journal::*;
pub use ledger::*;
pub use mode::*;
pub use postcard::*;
pub use session::*;
pub use visit::*;
