//! Local inventory of installed plugins.
//!
//! [`Catalog`] is the YAML document; [`CatalogStore`] owns its path and
//! performs every read-modify-write under a cross-process lock.

pub mod catalog;
pub mod error;
pub mod store;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use store::CatalogStore;
