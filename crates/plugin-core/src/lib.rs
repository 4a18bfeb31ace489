//! Plugin manager orchestration.
//!
//! [`PluginManager`] ties the layers together: it asks every configured
//! discovery for plugins, resolves a version against the plugin's
//! constraints, fetches the binary through its distribution, verifies it by
//! running `info`, and records the result in the catalog.
//!
//! All state lives in the [`ManagerConfig`] the manager was built with.

pub mod config;
pub mod error;
pub mod manager;
pub mod runner;

pub use config::{ClientConfig, ContextConfig, ManagerConfig};
pub use error::{Error, ErrorKind, Result};
pub use manager::{InstallState, PluginManager, PluginStatus, SyncReport};
pub use runner::{PluginRunner, PostInstall, ProcessRunner};
