//! Shell scripts standing in for plugin binaries.
//!
//! Only usable where `/bin/sh` exists.

use crate::manifest::descriptor_json;

/// Renders a script answering `info` and `post-install`.
///
/// ```rust,no_run
/// use plugin_test_utils::PluginScript;
///
/// let bytes = PluginScript::new("cluster", "v1.2.0").failing_post_install().render();
/// ```
#[derive(Debug, Clone)]
pub struct PluginScript {
    info: String,
    post_install: PostInstallMode,
}

#[derive(Debug, Clone, Copy)]
enum PostInstallMode {
    Unknown,
    Succeed,
    Fail,
}

impl PluginScript {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            info: descriptor_json(name, version),
            post_install: PostInstallMode::Unknown,
        }
    }

    /// Replace the `info` output verbatim.
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    pub fn with_post_install(mut self) -> Self {
        self.post_install = PostInstallMode::Succeed;
        self
    }

    pub fn failing_post_install(mut self) -> Self {
        self.post_install = PostInstallMode::Fail;
        self
    }

    pub fn render(&self) -> Vec<u8> {
        let post_install = match self.post_install {
            PostInstallMode::Unknown => {
                "echo 'Error: unknown command \"post-install\"' >&2\n    exit 1"
            }
            PostInstallMode::Succeed => "echo 'configured'",
            PostInstallMode::Fail => "echo 'post-install: cannot reach server' >&2\n    exit 3",
        };
        format!(
            "#!/bin/sh\ncase \"$1\" in\n  info)\n    cat <<'JSON'\n{info}\nJSON\n    ;;\n  post-install)\n    {post_install}\n    ;;\n  *)\n    echo \"unknown command $1\" >&2\n    exit 1\n    ;;\nesac\n",
            info = self.info,
        )
        .into_bytes()
    }
}
