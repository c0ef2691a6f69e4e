// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration file that wtp uses to decide where
//! new worktrees go, and what happens right after they are created. The same
//! layout is used at two scopes:
//!
//! 1. __global__: `~/.wtp.yml`, applies to every repository of the user.
//! 2. __repository__: `<repository_root>/.wtp.yml`, applies to one repository.
//!
//! # General Layout
//!
//! ```yaml
//! version: "1.0"
//! defaults:
//!   base_dir: ../worktrees
//! hooks:
//!   post_create:
//!     - type: copy
//!       from: .env
//! ```
//!
//! Every field is optional. Missing fields receive defaults through
//! [`ConfigDocument::apply_defaults`]. Reading and writing the files, and
//! layering the two scopes together, is handled by [`loader`].
//!
//! # See Also
//!
//! 1. [`hook`]
//! 2. [`expand`](crate::expand)

pub mod hook;
pub mod loader;

use crate::{config::hook::Hook, path::resolve_worktree_path};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Name of configuration file at every scope.
pub const CONFIG_FILE_NAME: &str = ".wtp.yml";

/// Format version stamped onto documents that do not state one.
pub const CURRENT_VERSION: &str = "1.0";

/// Base directory template used when no scope sets one.
pub const DEFAULT_BASE_DIR: &str = "../worktrees";

/// Configuration document.
///
/// # Invariant
///
/// - After [`apply_defaults`](Self::apply_defaults), `version` and
///   `defaults.base_dir` are never empty.
/// - Hooks are kept in execution order.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct ConfigDocument {
    /// Format version of document.
    #[serde(default)]
    pub version: String,

    /// Default settings for new worktrees.
    #[serde(default, skip_serializing_if = "Defaults::is_empty")]
    pub defaults: Defaults,

    /// Hooks to run around worktree creation.
    #[serde(default, skip_serializing_if = "Hooks::is_empty")]
    pub hooks: Hooks,
}

impl ConfigDocument {
    /// Merge overlay document on top of base document.
    ///
    /// Scalar settings of `overlay` win when they are not empty. Hooks
    /// accumulate instead: the hooks of `overlay` run after the hooks of
    /// `base`. Neither input is modified.
    pub fn merge(base: &Self, overlay: &Self) -> Self {
        let mut merged = base.clone();

        if !overlay.version.is_empty() {
            merged.version = overlay.version.clone();
        }

        if !overlay.defaults.base_dir.is_empty() {
            merged.defaults.base_dir = overlay.defaults.base_dir.clone();
        }

        merged
            .hooks
            .post_create
            .extend(overlay.hooks.post_create.iter().cloned());

        merged
    }

    /// Apply default values in-place.
    ///
    /// Fills in missing version and base directory, then applies hook-level
    /// defaults to every hook in order. Idempotent.
    pub fn apply_defaults(&mut self) {
        if self.version.is_empty() {
            self.version = CURRENT_VERSION.into();
        }

        if self.defaults.base_dir.is_empty() {
            self.defaults.base_dir = DEFAULT_BASE_DIR.into();
        }

        for hook in &mut self.hooks.post_create {
            hook.apply_defaults();
        }
    }

    /// Validate document without mutating it.
    ///
    /// All hooks are checked in order, and the first invalid hook fails the
    /// entire document.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::InvalidHook`] with the 1-based position of the
    ///   first invalid hook.
    pub fn validate(&self) -> Result<()> {
        for (position, hook) in self.hooks.post_create.iter().enumerate() {
            hook.validate().map_err(|source| ConfigError::InvalidHook {
                index: position + 1,
                source,
            })?;
        }

        Ok(())
    }

    /// Check if any post-create hooks are configured.
    pub fn has_hooks(&self) -> bool {
        !self.hooks.post_create.is_empty()
    }

    /// Determine where a new worktree named `worktree_name` should be placed.
    ///
    /// See [`resolve_worktree_path`] for details.
    pub fn resolve_worktree_path(
        &self,
        repository_root: impl AsRef<Path>,
        worktree_name: impl AsRef<str>,
    ) -> PathBuf {
        resolve_worktree_path(self, repository_root, worktree_name)
    }

    /// Deserialize configuration from raw file contents.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Deserialize`] if data is not valid UTF-8 YAML
    ///   describing a configuration document.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        // INVARIANT: Empty or comment-only files are empty documents.
        let document: Option<ConfigDocument> =
            serde_yaml::from_slice(data).map_err(ConfigError::Deserialize)?;

        Ok(document.unwrap_or_default())
    }
}

impl FromStr for ConfigDocument {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        Self::from_slice(data.as_bytes())
    }
}

impl Display for ConfigDocument {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            serde_yaml::to_string(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Default settings for new worktrees.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Template of directory that new worktrees are placed in.
    ///
    /// Relative paths are anchored at the repository root. May contain
    /// placeholders understood by [`expand_variables`](crate::expand::expand_variables).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_dir: String,
}

impl Defaults {
    fn is_empty(&self) -> bool {
        self.base_dir.is_empty()
    }
}

/// Hook listing.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Hooks {
    /// Hooks to run after a worktree is created, in execution order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_create: Vec<Hook>,
}

impl Hooks {
    fn is_empty(&self) -> bool {
        self.post_create.is_empty()
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(serde_yaml::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(serde_yaml::Error),

    /// Hook at 1-based position `index` is invalid.
    #[error("invalid hook {index}")]
    InvalidHook {
        index: usize,
        #[source]
        source: crate::config::hook::HookError,
    },
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::hook::HookError;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn command_hooks(commands: &[&str]) -> Hooks {
        Hooks {
            post_create: commands.iter().copied().map(Hook::command).collect(),
        }
    }

    fn document(version: &str, base_dir: &str, commands: &[&str]) -> ConfigDocument {
        ConfigDocument {
            version: version.into(),
            defaults: Defaults {
                base_dir: base_dir.into(),
            },
            hooks: command_hooks(commands),
        }
    }

    #[test]
    fn deserialize_config_document() -> anyhow::Result<()> {
        let result: ConfigDocument = indoc! {r#"
            version: "1.0"
            defaults:
              base_dir: ../my-worktrees
            hooks:
              post_create:
                - type: copy
                  from: .env.example
                  to: .env
                - type: command
                  command: echo test
                - type: symlink
                  from: .bin
                  to: .bin
        "#}
        .parse()?;

        let expect = ConfigDocument {
            version: "1.0".into(),
            defaults: Defaults {
                base_dir: "../my-worktrees".into(),
            },
            hooks: Hooks {
                post_create: vec![
                    Hook::Copy {
                        from: ".env.example".into(),
                        to: Some(".env".into()),
                    },
                    Hook::command("echo test"),
                    Hook::symlink(".bin", ".bin"),
                ],
            },
        };
        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn deserialize_empty_document() -> anyhow::Result<()> {
        let result: ConfigDocument = "".parse()?;
        assert_eq!(result, ConfigDocument::default());

        let result: ConfigDocument = "# nothing to see here\n".parse()?;
        assert_eq!(result, ConfigDocument::default());

        Ok(())
    }

    #[test]
    fn deserialize_rejects_malformed_document() {
        let result = indoc! {r#"
            version: "1.0"
            hooks:
              post_create:
                - type: copy
                  from: ".env.example"
                  to: ".env"
                invalid_structure
        "#}
        .parse::<ConfigDocument>();
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[test]
    fn serialize_config_document() {
        let mut config = document("", "", &["make setup"]);
        config.hooks.post_create.insert(0, Hook::copy(".env"));
        config.apply_defaults();

        let result = config.to_string();
        let expect = indoc! {r#"
            version: '1.0'
            defaults:
              base_dir: ../worktrees
            hooks:
              post_create:
              - type: copy
                from: .env
                to: .env
              - type: command
                command: make setup
        "#};
        assert_eq!(result, expect);
    }

    #[test]
    fn serialize_round_trip() -> anyhow::Result<()> {
        let mut config = document("1.0", "../${DIRNAME}-trees", &["npm ci", "make"]);
        config.hooks.post_create.push(Hook::symlink("../shared", "shared"));

        let result: ConfigDocument = config.to_string().parse()?;
        assert_eq!(result, config);

        Ok(())
    }

    #[test]
    fn merge_overrides_scalar_fields() {
        let base = document("1.0", "../base-dir", &[]);
        let overlay = document("2.0", "../override-dir", &[]);
        let result = ConfigDocument::merge(&base, &overlay);
        assert_eq!(result, document("2.0", "../override-dir", &[]));
    }

    #[test]
    fn merge_empty_overlay_keeps_base() {
        let base = document("1.0", "../base-dir", &["echo A"]);
        let result = ConfigDocument::merge(&base, &ConfigDocument::default());
        assert_eq!(result, base);
    }

    #[test]
    fn merge_concatenates_hooks() {
        let base = document("", "", &["echo A", "echo B"]);
        let overlay = document("", "", &["echo C"]);
        let result = ConfigDocument::merge(&base, &overlay);
        assert_eq!(result.hooks, command_hooks(&["echo A", "echo B", "echo C"]));

        let result = ConfigDocument::merge(&ConfigDocument::default(), &overlay);
        assert_eq!(result.hooks, command_hooks(&["echo C"]));
    }

    #[test]
    fn merge_leaves_inputs_alone() {
        let base = document("1.0", "../a", &["echo A"]);
        let overlay = document("", "../b", &["echo B"]);
        let (base_before, overlay_before) = (base.clone(), overlay.clone());
        let _ = ConfigDocument::merge(&base, &overlay);
        assert_eq!(base, base_before);
        assert_eq!(overlay, overlay_before);
    }

    #[test]
    fn apply_defaults_fills_missing_fields() {
        let mut config = ConfigDocument::default();
        config.hooks.post_create.push(Hook::copy(".env"));
        config.apply_defaults();

        assert_eq!(config.version, CURRENT_VERSION);
        assert_eq!(config.defaults.base_dir, DEFAULT_BASE_DIR);
        assert_eq!(
            config.hooks.post_create,
            vec![Hook::Copy {
                from: ".env".into(),
                to: Some(".env".into()),
            }]
        );
        assert_eq!(config.validate().ok(), Some(()));
    }

    #[test]
    fn apply_defaults_keeps_existing_fields() {
        let mut config = document("2.0", "/srv/trees", &[]);
        config.apply_defaults();
        assert_eq!(config, document("2.0", "/srv/trees", &[]));
    }

    #[test]
    fn apply_defaults_is_idempotent() {
        let mut once = document("", "", &["make"]);
        once.hooks.post_create.push(Hook::copy("config/local.toml"));
        once.hooks.post_create.push(Hook::copy("/etc/hosts"));
        once.apply_defaults();

        let mut twice = once.clone();
        twice.apply_defaults();
        assert_eq!(twice, once);
    }

    #[test]
    fn validate_reports_first_invalid_hook() {
        let mut config = document("", "", &["echo ok"]);
        config.hooks.post_create.push(Hook::copy("/tmp/x"));
        config.hooks.post_create.push(Hook::command(""));
        config.apply_defaults();

        let before = config.clone();
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidHook {
                index: 2,
                source: HookError::MissingTo
            })
        ));
        assert_eq!(config, before);

        let error = result.unwrap_err();
        assert_eq!(error.to_string(), "invalid hook 2");
        assert_eq!(
            std::error::Error::source(&error).map(ToString::to_string),
            Some("copy hook with absolute 'from' requires 'to' field".into())
        );
    }

    #[test]
    fn validate_accepts_document_without_hooks() {
        assert!(ConfigDocument::default().validate().is_ok());
    }

    #[test]
    fn has_hooks() {
        assert!(!ConfigDocument::default().has_hooks());
        assert!(document("", "", &["make"]).has_hooks());
    }
}
