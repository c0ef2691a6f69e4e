// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Worktree configuration.
//!
//! Resolve the effective configuration that decides where new worktrees of a
//! Git repository are placed, and which hooks run once they exist. The
//! configuration is layered from a per-user global file and a per-repository
//! file, merged, given defaults, and validated before anything else gets to
//! see it.
//!
//! # See Also
//!
//! 1. [`config`]
//! 2. [`config::loader`]
//! 3. [`path::resolve_worktree_path`]

pub mod config;
pub mod expand;
pub mod path;

pub use config::{
    hook::{Hook, HookError, HookKind},
    loader::{save_config, ConfigLoader, LoadError, Scope},
    ConfigDocument, ConfigError, Defaults, Hooks, CONFIG_FILE_NAME, CURRENT_VERSION,
    DEFAULT_BASE_DIR,
};
pub use expand::{expand_variables, slugify};
pub use path::{resolve_worktree_path, HomeLocator, NoWayHome, SystemHome};
