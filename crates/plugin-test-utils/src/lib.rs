//! Shared test fixtures for the pluginctl workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`home`]: [`TestHome`], a throwaway plugin root, catalog and source tree
//! - [`manifest`]: builders for manifest records
//! - [`script`]: shell-script stand-ins for plugin binaries

pub mod home;
pub mod manifest;
pub mod script;

pub use home::TestHome;
pub use manifest::{bucket_plugin, descriptor_json};
pub use script::PluginScript;
