// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine where configuration files live, and where new worktrees should
//! be placed on the user's file system. Everything here except the home
//! directory lookup and [`absolute`] is purely lexical, i.e., no path is ever
//! checked for existence.

use crate::{config::ConfigDocument, expand::expand_variables};

use std::{
    io,
    path::{Component, Path, PathBuf},
};

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Strategy for locating the current user's home directory.
///
/// The global configuration layer lives in the home directory. Loaders take
/// a locator instead of asking the operating system directly, so callers can
/// point the global layer somewhere else, or turn it off entirely.
pub trait HomeLocator {
    /// Locate home directory of current user.
    ///
    /// # Errors
    ///
    /// - Return [`NoWayHome`] if home directory cannot be determined.
    fn home_dir(&self) -> Result<PathBuf>;
}

/// Locate home directory through the operating system.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SystemHome;

impl HomeLocator for SystemHome {
    fn home_dir(&self) -> Result<PathBuf> {
        home_dir()
    }
}

/// Lexically clean a path.
///
/// Drops `.` components, and resolves `..` against the component before it.
/// Leading `..` components of a relative path are kept, but `..` never climbs
/// above the root of an absolute path. An empty result becomes `.`.
pub fn clean(path: impl AsRef<Path>) -> PathBuf {
    let mut cleaned = PathBuf::new();
    let mut depth = 0usize;

    for component in path.as_ref().components() {
        match component {
            Component::Prefix(_) | Component::RootDir => cleaned.push(component),
            Component::CurDir => continue,
            Component::ParentDir if depth > 0 => {
                cleaned.pop();
                depth -= 1;
            }
            Component::ParentDir if cleaned.has_root() => continue,
            Component::ParentDir => cleaned.push(".."),
            Component::Normal(part) => {
                cleaned.push(part);
                depth += 1;
            }
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }

    cleaned
}

/// Resolve path to a cleaned absolute path.
///
/// Relative paths are resolved against the current working directory.
///
/// # Errors
///
/// - Return [`io::Error`] if current working directory cannot be determined.
pub fn absolute(path: impl AsRef<Path>) -> io::Result<PathBuf> {
    std::path::absolute(path.as_ref()).map(clean)
}

/// Determine where a new worktree should be placed.
///
/// Expands variables in the configured base directory, anchors a relative
/// base directory at the repository root, and places the worktree named
/// `worktree_name` inside of it. Never fails. Any ambiguity about the
/// repository root is absorbed by [`expand_variables`].
pub fn resolve_worktree_path(
    config: &ConfigDocument,
    repository_root: impl AsRef<Path>,
    worktree_name: impl AsRef<str>,
) -> PathBuf {
    let repository_root = repository_root.as_ref();
    let worktree_name = worktree_name.as_ref();
    let base_dir = PathBuf::from(expand_variables(
        &config.defaults.base_dir,
        repository_root,
        worktree_name,
    ));

    let base_dir = if base_dir.is_absolute() {
        base_dir
    } else {
        repository_root.join(base_dir)
    };

    // INVARIANT: Worktree name never replaces base directory.
    let worktree_name: PathBuf = Path::new(worktree_name)
        .components()
        .filter(|component| {
            !matches!(component, Component::Prefix(_) | Component::RootDir)
        })
        .collect();

    clean(base_dir.join(worktree_name))
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
