// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Post-create hook layout.
//!
//! A __hook__ is an action that runs right after a new worktree has been
//! created. There are three kinds of hooks:
//!
//! 1. __copy__: copy a file from the repository into the new worktree.
//! 2. __command__: run a shell command inside of the new worktree.
//! 3. __symlink__: link a path of the new worktree back to another path.
//!
//! Each kind of hook only carries the fields that make sense for it. On disk
//! a hook is a flat record tagged by its `type` field:
//!
//! ```yaml
//! - type: copy
//!   from: .env.example
//!   to: .env
//! - type: command
//!   command: npm install
//!   env:
//!     NODE_ENV: development
//!   work_dir: web
//! - type: symlink
//!   from: .bin
//!   to: .bin
//! ```
//!
//! Records that name an unknown type, or carry a field that is forbidden for
//! their type, are rejected while decoding. Fields that are merely required
//! are checked by [`Hook::validate`], because a copy hook can still receive a
//! default destination through [`Hook::apply_defaults`].
//!
//! Only the layout of hooks is defined here. Executing them is left to the
//! caller.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result as FmtResult},
    path::Path,
    str::FromStr,
};
use tracing::warn;

/// A single post-create action.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(try_from = "HookRecord", into = "HookRecord")]
pub enum Hook {
    /// Copy file into new worktree.
    Copy {
        /// Source path, relative to the repository root unless absolute.
        from: String,

        /// Destination path inside new worktree.
        ///
        /// Defaults to `from` when `from` is relative.
        to: Option<String>,
    },

    /// Run shell command in new worktree.
    Command {
        /// Shell command text.
        command: String,

        /// Extra environment variables for the command.
        env: BTreeMap<String, String>,

        /// Working directory override for the command.
        work_dir: Option<String>,
    },

    /// Create symbolic link in new worktree.
    Symlink {
        /// Path the link points to.
        from: String,

        /// Path of the link itself.
        to: String,
    },
}

impl Hook {
    /// Construct new copy hook without explicit destination.
    pub fn copy(from: impl Into<String>) -> Self {
        Self::Copy {
            from: from.into(),
            to: None,
        }
    }

    /// Construct new command hook with no extra environment.
    pub fn command(command: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            env: BTreeMap::new(),
            work_dir: None,
        }
    }

    /// Construct new symlink hook.
    pub fn symlink(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Symlink {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Kind of hook.
    pub fn kind(&self) -> HookKind {
        match self {
            Self::Copy { .. } => HookKind::Copy,
            Self::Command { .. } => HookKind::Command,
            Self::Symlink { .. } => HookKind::Symlink,
        }
    }

    /// Apply default values in-place.
    ///
    /// A copy hook with a relative source and no destination copies to the
    /// same relative path in the new worktree. Absolute sources never receive
    /// a default destination. Idempotent.
    pub fn apply_defaults(&mut self) {
        if let Self::Copy { from, to } = self {
            if is_blank(to) && !from.is_empty() && !Path::new(from.as_str()).is_absolute() {
                *to = Some(from.clone());
            }
        }
    }

    /// Validate hook without mutating it.
    ///
    /// # Errors
    ///
    /// - Return [`HookError::MissingFrom`] if a copy hook has no source.
    /// - Return [`HookError::MissingTo`] if a copy hook has an absolute source
    ///   but no destination.
    /// - Return [`HookError::MissingCommand`] if a command hook has no command.
    /// - Return [`HookError::MissingLinkPaths`] if a symlink hook lacks a
    ///   source or a destination.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Copy { from, .. } if from.is_empty() => Err(HookError::MissingFrom),
            Self::Copy { from, to } if is_blank(to) && Path::new(from).is_absolute() => {
                Err(HookError::MissingTo)
            }
            Self::Command { command, .. } if command.is_empty() => Err(HookError::MissingCommand),
            Self::Symlink { from, to } if from.is_empty() || to.is_empty() => {
                Err(HookError::MissingLinkPaths)
            }
            _ => Ok(()),
        }
    }
}

impl Display for Hook {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Copy { from, to } => {
                write!(fmt, "copy {from} -> {}", to.as_deref().unwrap_or(from))
            }
            Self::Command {
                command, work_dir, ..
            } => match work_dir {
                Some(work_dir) => write!(fmt, "command `{command}` in {work_dir}"),
                None => write!(fmt, "command `{command}`"),
            },
            Self::Symlink { from, to } => write!(fmt, "symlink {to} -> {from}"),
        }
    }
}

/// Kinds of hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Copy,
    Command,
    Symlink,
}

impl HookKind {
    /// Name of hook kind as written in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Command => "command",
            Self::Symlink => "symlink",
        }
    }
}

impl FromStr for HookKind {
    type Err = HookError;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "copy" => Ok(Self::Copy),
            "command" => Ok(Self::Command),
            "symlink" => Ok(Self::Symlink),
            _ => Err(HookError::InvalidType(kind.into())),
        }
    }
}

impl Display for HookKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

/// Flat on-disk layout of a hook.
///
/// Every field is optional so that a record can describe any kind of hook.
/// Converting a record into a [`Hook`] is where the type tag gets checked.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct HookRecord {
    /// Kind of hook.
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<String>,
}

impl TryFrom<HookRecord> for Hook {
    type Error = HookError;

    fn try_from(record: HookRecord) -> Result<Self> {
        let kind: HookKind = record.kind.parse()?;
        let from = present(record.from);
        let to = present(record.to);
        let command = present(record.command);
        let work_dir = present(record.work_dir);

        match kind {
            HookKind::Copy | HookKind::Symlink => {
                if command.is_some() {
                    return Err(HookError::UnexpectedCommand(kind));
                }

                if !record.env.is_empty() {
                    warn!("ignoring 'env' field of {kind} hook");
                }

                if work_dir.is_some() {
                    warn!("ignoring 'work_dir' field of {kind} hook");
                }

                let from = from.unwrap_or_default();
                Ok(match kind {
                    HookKind::Copy => Self::Copy { from, to },
                    _ => Self::Symlink {
                        from,
                        to: to.unwrap_or_default(),
                    },
                })
            }
            HookKind::Command => {
                if from.is_some() || to.is_some() {
                    return Err(HookError::UnexpectedPaths);
                }

                Ok(Self::Command {
                    command: command.unwrap_or_default(),
                    env: record.env,
                    work_dir,
                })
            }
        }
    }
}

impl From<Hook> for HookRecord {
    fn from(hook: Hook) -> Self {
        let kind = hook.kind().as_str().into();
        match hook {
            Hook::Copy { from, to } => Self {
                kind,
                from: present(Some(from)),
                to: present(to),
                ..Default::default()
            },
            Hook::Command {
                command,
                env,
                work_dir,
            } => Self {
                kind,
                command: present(Some(command)),
                env,
                work_dir: present(work_dir),
                ..Default::default()
            },
            Hook::Symlink { from, to } => Self {
                kind,
                from: present(Some(from)),
                to: present(Some(to)),
                ..Default::default()
            },
        }
    }
}

// Empty strings mean the same thing as absent fields.
fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

fn is_blank(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, str::is_empty)
}

/// Hook layout error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    /// Record names a hook type that does not exist.
    #[error("invalid hook type '{0}', must be 'copy', 'command', or 'symlink'")]
    InvalidType(String),

    /// Copy or symlink hook carries a command.
    #[error("{0} hook should not have 'command' field")]
    UnexpectedCommand(HookKind),

    /// Command hook carries source or destination paths.
    #[error("command hook should not have 'from' or 'to' fields")]
    UnexpectedPaths,

    /// Copy hook has no source.
    #[error("copy hook requires 'from' field")]
    MissingFrom,

    /// Copy hook with absolute source has no destination.
    #[error("copy hook with absolute 'from' requires 'to' field")]
    MissingTo,

    /// Command hook has no command.
    #[error("command hook requires 'command' field")]
    MissingCommand,

    /// Symlink hook lacks source or destination.
    #[error("symlink hook requires both 'from' and 'to' fields")]
    MissingLinkPaths,
}

/// Friendly result alias :3
pub type Result<T, E = HookError> = std::result::Result<T, E>;
