//! Filesystem primitives for the plugin manager
//!
//! Provides atomic and executable writes, a cross-process advisory lock with
//! a bounded timeout, checksums, path-segment validation for untrusted
//! metadata, and the on-disk layout of the plugin root.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod layout;
pub mod lock;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use layout::PluginLayout;
pub use lock::FileLock;
pub use path::{relative_path, validate_path_identifier};
