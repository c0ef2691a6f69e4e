// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use wtp::{path::absolute, save_config, ConfigDocument, ConfigLoader, CONFIG_FILE_NAME};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use git2::Repository;
use std::{
    env::current_dir,
    path::{Path, PathBuf},
    process::exit,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "wtp [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Repository root to use instead of the one containing current directory.
    #[arg(short, long, global = true, value_name = "path")]
    pub repo: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let root = repository_root(self.repo)?;
        match self.command {
            Command::Show => run_show(root),
            Command::Init(opts) => run_init(root, opts),
            Command::Path(opts) => run_path(root, opts),
            Command::Hooks => run_hooks(root),
            Command::Validate => run_validate(root),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Show effective configuration of repository.
    #[command(override_usage = "wtp show [options]")]
    Show,

    /// Write default configuration file into repository.
    #[command(override_usage = "wtp init [options]")]
    Init(InitOptions),

    /// Show where a worktree would be placed.
    #[command(override_usage = "wtp path [options] <name>")]
    Path(PathOptions),

    /// List post-create hooks in execution order.
    #[command(override_usage = "wtp hooks [options]")]
    Hooks,

    /// Check that configuration of repository is valid.
    #[command(override_usage = "wtp validate [options]")]
    Validate,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct InitOptions {
    /// Overwrite existing configuration file.
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct PathOptions {
    /// Branch or worktree name.
    #[arg(required = true, value_name = "name")]
    pub name: String,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn repository_root(repo: Option<PathBuf>) -> Result<PathBuf> {
    let root = match repo {
        Some(repo) => repo,
        None => {
            let cwd = current_dir().context("failed to determine current directory")?;
            Repository::discover(&cwd)
                .ok()
                .and_then(|repository| repository.workdir().map(PathBuf::from))
                .unwrap_or(cwd)
        }
    };

    absolute(&root)
        .with_context(|| format!("failed to resolve repository root {}", root.display()))
}

fn load(root: &Path) -> Result<ConfigDocument> {
    ConfigLoader::new()
        .load(root)
        .with_context(|| format!("failed to load configuration of {}", root.display()))
}

fn run_show(root: PathBuf) -> Result<()> {
    print!("{}", load(&root)?);
    Ok(())
}

fn run_init(root: PathBuf, opts: InitOptions) -> Result<()> {
    let path = root.join(CONFIG_FILE_NAME);
    if path.exists() && !opts.force {
        bail!("{} already exists, use --force to overwrite", path.display());
    }

    save_config(&root, &ConfigDocument::default())?;
    Ok(())
}

fn run_path(root: PathBuf, opts: PathOptions) -> Result<()> {
    let config = load(&root)?;
    println!("{}", config.resolve_worktree_path(&root, &opts.name).display());
    Ok(())
}

fn run_hooks(root: PathBuf) -> Result<()> {
    let config = load(&root)?;
    if !config.has_hooks() {
        info!("no post-create hooks configured");
        return Ok(());
    }

    for (position, hook) in config.hooks.post_create.iter().enumerate() {
        println!("{}. {hook}", position + 1);
    }

    Ok(())
}

fn run_validate(root: PathBuf) -> Result<()> {
    load(&root)?;
    info!("configuration of {} is valid", root.display());
    Ok(())
}
