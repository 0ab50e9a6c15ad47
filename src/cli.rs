use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use crate::{
    command::{self, Poetry, Runner},
    lockfile,
    manifest::{Manifest, ManifestDocument},
};

/// Update every dependency of a Poetry project to its latest version
#[derive(Debug, Parser)]
#[command(version)]
pub struct UpdateOption {
    /// Path to pyproject.toml
    #[arg(long, short = 'p', value_name = "PATH", default_value = "pyproject.toml")]
    pyproject: PathBuf,

    /// Path to poetry.lock
    #[arg(long, short = 'l', value_name = "PATH", default_value = "poetry.lock")]
    lockfile: PathBuf,
}

pub(crate) trait UpdateOptionPyproject {
    fn pyproject(&self) -> &Path;
}

pub(crate) trait UpdateOptionLockfile {
    fn lockfile(&self) -> &Path;
}

impl UpdateOptionPyproject for UpdateOption {
    fn pyproject(&self) -> &Path {
        &self.pyproject
    }
}

impl UpdateOptionLockfile for UpdateOption {
    fn lockfile(&self) -> &Path {
        &self.lockfile
    }
}

pub(crate) fn execute() -> Result<()> {
    let option = UpdateOption::parse();
    let mut poetry = Poetry::for_manifest(option.pyproject());

    update(&option, &mut poetry)
}

/// Strips the manifest, drops the lock file and re-adds everything at latest.
///
/// The manifest is parsed before anything is deleted, so a missing or broken
/// manifest leaves the project untouched.
pub(crate) fn update<Option>(option: &Option, runner: &mut impl Runner) -> Result<()>
where
    Option: UpdateOptionPyproject + UpdateOptionLockfile,
{
    let mut manifest = Manifest::load(option.pyproject())?;
    lockfile::remove(option.lockfile())?;

    let packages = manifest.extract();
    manifest.write()?;
    info!("Updated {}", manifest.path().display());

    for group in packages.groups().filter(|group| !group.packages.is_empty()) {
        info!("Found {} in group {}", group.names().join(", "), group.name);
    }

    if packages.is_empty() {
        warn!("No packages found to update.");
        return Ok(());
    }

    let commands = command::synthesize(&packages);
    command::run_all(&commands, runner)
}
