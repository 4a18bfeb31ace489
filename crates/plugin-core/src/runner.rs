//! Subprocess boundary to installed plugin binaries.
//!
//! A plugin binary answers two commands:
//!
//! - `info` prints its [`PluginDescriptor`] as JSON on stdout
//! - `post-install` runs optional one-time setup; older plugins reject it
//!   with an "unknown command" message

use std::path::Path;
use std::process::Command;

use plugin_meta::PluginDescriptor;

use crate::error::{Error, Result};

pub const INFO_COMMAND: &str = "info";
pub const POST_INSTALL_COMMAND: &str = "post-install";

const UNKNOWN_COMMAND_MARKER: &str = "unknown command";

/// Outcome of the best-effort post-install hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostInstall {
    Completed,
    /// The plugin predates the hook.
    Unsupported,
    /// The hook ran and failed; carries its combined output.
    Failed(String),
}

/// Runs commands against an installed plugin binary.
pub trait PluginRunner: Send + Sync {
    /// Execute `<binary> info` and parse its descriptor.
    fn describe(&self, binary: &Path) -> Result<PluginDescriptor>;

    /// Execute `<binary> post-install`. Never fails the caller.
    fn post_install(&self, binary: &Path) -> PostInstall;
}

/// Runs plugin binaries as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl PluginRunner for ProcessRunner {
    fn describe(&self, binary: &Path) -> Result<PluginDescriptor> {
        let describe_err = |reason: String| Error::Describe {
            binary: binary.to_path_buf(),
            reason,
        };

        let output = Command::new(binary)
            .arg(INFO_COMMAND)
            .output()
            .map_err(|e| describe_err(format!("failed to run: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output.status.code().unwrap_or(-1);
            return Err(describe_err(format!("exited with code {code}: {}", stderr.trim())));
        }

        PluginDescriptor::from_json(&output.stdout)
            .map_err(|e| describe_err(format!("could not parse `{INFO_COMMAND}` output: {e}")))
    }

    fn post_install(&self, binary: &Path) -> PostInstall {
        let output = match Command::new(binary).arg(POST_INSTALL_COMMAND).output() {
            Ok(output) => output,
            Err(e) => return PostInstall::Failed(e.to_string()),
        };

        if output.status.success() {
            return PostInstall::Completed;
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        classify_failure(combined)
    }
}

fn classify_failure(combined: String) -> PostInstall {
    if combined.to_ascii_lowercase().contains(UNKNOWN_COMMAND_MARKER) {
        PostInstall::Unsupported
    } else {
        PostInstall::Failed(combined.trim().to_string())
    }
}
