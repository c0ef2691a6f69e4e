// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT


use anyhow::Result;
use std::{
    env::current_dir,
    fs::{create_dir_all, write},
    path::{Path, PathBuf},
};
use wtp::{path::NoWayHome, ConfigLoader, HomeLocator, CONFIG_FILE_NAME};

/// Home directory locator pinned to a fixed path.
#[derive(Debug, Clone)]
pub(crate) struct FixedHome(PathBuf);

impl HomeLocator for FixedHome {
    fn home_dir(&self) -> Result<PathBuf, NoWayHome> {
        Ok(self.0.clone())
    }
}

/// Scratch layout with a fake home directory and a repository root.
///
/// Meant to be used from sealed tests, where the current directory is a
/// fresh temporary directory.
pub(crate) struct ScopeFixture {
    home: PathBuf,
    repo: PathBuf,
}

impl ScopeFixture {
    pub(crate) fn new() -> Result<Self> {
        let cwd = current_dir()?;
        let home = cwd.join("home");
        let repo = cwd.join("src").join("project");
        create_dir_all(&home)?;
        create_dir_all(&repo)?;

        Ok(Self { home, repo })
    }

    pub(crate) fn home(&self) -> &Path {
        &self.home
    }

    pub(crate) fn repo(&self) -> &Path {
        &self.repo
    }

    pub(crate) fn write_global(&self, contents: impl AsRef<str>) -> Result<PathBuf> {
        let path = self.home.join(CONFIG_FILE_NAME);
        write(&path, contents.as_ref())?;
        Ok(path)
    }

    pub(crate) fn write_repo(&self, contents: impl AsRef<str>) -> Result<PathBuf> {
        let path = self.repo.join(CONFIG_FILE_NAME);
        write(&path, contents.as_ref())?;
        Ok(path)
    }

    pub(crate) fn loader(&self) -> ConfigLoader<FixedHome> {
        ConfigLoader::with_home(FixedHome(self.home.clone()))
    }
}
