// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Layered configuration loading.
//!
//! The effective configuration of a repository is built from two scopes,
//! where each scope may or may not have a configuration file:
//!
//! 1. Empty document.
//! 2. Global file at `~/.wtp.yml`.
//! 3. Repository file at `<repository_root>/.wtp.yml`.
//!
//! Each layer is merged on top of the previous one through
//! [`ConfigDocument::merge`]. The result then receives defaults and is
//! validated as a whole. A missing file is never an error, but a file that
//! exists and cannot be read or parsed always is.

use crate::{
    config::{ConfigDocument, ConfigError, CONFIG_FILE_NAME},
    path::{absolute, HomeLocator, SystemHome},
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{read, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Permissions of configuration files written by [`save_config`].
#[cfg(unix)]
const CONFIG_FILE_MODE: u32 = 0o600;

/// Scope that a configuration file applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every repository of current user.
    Global,

    /// A single repository.
    Repository,
}

impl Display for Scope {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Global => fmt.write_str("global"),
            Self::Repository => fmt.write_str("repository"),
        }
    }
}

/// Layered configuration loader.
///
/// Uses a [`HomeLocator`] to find the global configuration file. Loading is
/// read-only, so a single loader can serve any number of repositories.
#[derive(Debug, Default, Clone)]
pub struct ConfigLoader<H = SystemHome>
where
    H: HomeLocator,
{
    home: H,
}

impl ConfigLoader {
    /// Construct new loader that uses the home directory of current user.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H> ConfigLoader<H>
where
    H: HomeLocator,
{
    /// Construct new loader with custom home directory locator.
    pub fn with_home(home: H) -> Self {
        Self { home }
    }

    /// Path to global configuration file.
    ///
    /// # Errors
    ///
    /// - Return [`NoWayHome`](crate::path::NoWayHome) if home directory cannot
    ///   be determined.
    pub fn global_config_path(&self) -> crate::path::Result<PathBuf> {
        self.home.home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Path to configuration file of repository.
    pub fn repository_config_path(&self, repository_root: impl AsRef<Path>) -> PathBuf {
        repository_root.as_ref().join(CONFIG_FILE_NAME)
    }

    /// Load effective configuration of repository.
    ///
    /// Merges the global and repository scopes, applies defaults, and
    /// validates the result. If the home directory cannot be determined, the
    /// global scope is skipped.
    ///
    /// # Errors
    ///
    /// - Return [`LoadError::ResolveRoot`] if repository root cannot be made
    ///   absolute.
    /// - Return [`LoadError::Read`] if an existing configuration file cannot
    ///   be read.
    /// - Return [`LoadError::Parse`] if a configuration file is malformed.
    /// - Return [`LoadError::Invalid`] if the merged configuration is invalid.
    #[instrument(skip(self, repository_root), level = "debug")]
    pub fn load(&self, repository_root: impl AsRef<Path>) -> Result<ConfigDocument> {
        let repository_root = repository_root.as_ref();
        let repository_root = absolute(repository_root).map_err(|err| LoadError::ResolveRoot {
            source: err,
            path: repository_root.to_path_buf(),
        })?;
        debug!("loading configuration of {}", repository_root.display());

        let global = match self.global_config_path() {
            Ok(path) => read_layer(Scope::Global, &path)?,
            Err(err) => {
                debug!("skipping global configuration: {err}");
                None
            }
        };

        let repository_path = self.repository_config_path(&repository_root);
        let repository = read_layer(Scope::Repository, &repository_path)?;

        let mut config = [global, repository]
            .into_iter()
            .flatten()
            .fold(ConfigDocument::default(), |merged, layer| {
                ConfigDocument::merge(&merged, &layer)
            });

        config.apply_defaults();
        config.validate().map_err(LoadError::Invalid)?;

        Ok(config)
    }
}

/// Write configuration of repository.
///
/// Defaults are applied to a copy of `config`, which must then pass
/// validation before anything is written. The file is only readable and
/// writable by its owner on Unix systems. Returns path of written file.
///
/// # Errors
///
/// - Return [`LoadError::Invalid`] if configuration is invalid.
/// - Return [`LoadError::Encode`] if configuration cannot be serialized.
/// - Return [`LoadError::Write`] if configuration file cannot be written.
#[instrument(skip(repository_root, config), level = "debug")]
pub fn save_config(
    repository_root: impl AsRef<Path>,
    config: &ConfigDocument,
) -> Result<PathBuf> {
    let mut config = config.clone();
    config.apply_defaults();
    config.validate().map_err(LoadError::Invalid)?;

    let data = serde_yaml::to_string(&config)
        .map_err(|err| LoadError::Encode(ConfigError::Serialize(err)))?;
    let path = repository_root.as_ref().join(CONFIG_FILE_NAME);
    write_private(&path, data.as_bytes()).map_err(|err| LoadError::Write {
        source: err,
        path: path.clone(),
    })?;
    info!("wrote configuration to {}", path.display());

    Ok(path)
}

fn read_layer(scope: Scope, path: &Path) -> Result<Option<ConfigDocument>> {
    let data = match read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("no {scope} configuration at {}", path.display());
            return Ok(None);
        }
        Err(err) => {
            return Err(LoadError::Read {
                source: err,
                scope,
                path: path.to_path_buf(),
            })
        }
    };

    let config = ConfigDocument::from_slice(&data).map_err(|err| LoadError::Parse {
        source: err,
        scope,
        path: path.to_path_buf(),
    })?;
    debug!("loaded {scope} configuration from {}", path.display());

    Ok(Some(config))
}

fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(CONFIG_FILE_MODE);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;

    // INVARIANT: Tighten permissions of files that existed before.
    #[cfg(unix)]
    {
        use std::{fs::Permissions, os::unix::fs::PermissionsExt};
        file.set_permissions(Permissions::from_mode(CONFIG_FILE_MODE))?;
    }

    Ok(())
}

/// Configuration loading error types.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Repository root cannot be resolved to an absolute path.
    #[error("failed to resolve repository root {:?}", path.display())]
    ResolveRoot {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Existing configuration file cannot be read.
    #[error("failed to read {scope} config file at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        scope: Scope,
        path: PathBuf,
    },

    /// Configuration file is malformed.
    #[error("failed to parse {scope} config file at {:?}", path.display())]
    Parse {
        #[source]
        source: ConfigError,
        scope: Scope,
        path: PathBuf,
    },

    /// Configuration is well-formed, but invalid.
    #[error("invalid configuration")]
    Invalid(#[source] ConfigError),

    /// Configuration cannot be serialized.
    #[error("failed to encode configuration")]
    Encode(#[source] ConfigError),

    /// Configuration file cannot be written.
    #[error("failed to write config file at {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = LoadError> = std::result::Result<T, E>;
