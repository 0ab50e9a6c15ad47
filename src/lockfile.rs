use std::{fs, io, path::Path};

use anyhow::Result;
use tracing::{debug, info};

use crate::error::Error;

/// Deletes the lock file, returning whether there was one to delete.
pub(crate) fn remove(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("Removed {}", path.display());
            Ok(true)
        },
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!("no lock file at {}", path.display());
            Ok(false)
        },
        Err(source) => Err(Error::RemoveLockfile {
            path: path.to_path_buf(),
            source,
        }
        .into()),
    }
}
