use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use toml_edit::Document;
use tracing::{debug, warn};

use self::{
    document::{DependenciesGetter, DrainTable, GroupGetter, PoetryGetter},
    packages::{Packages, MAIN_GROUP},
};
use crate::error::Error;

pub(crate) mod document;
pub(crate) mod packages;

/// Dependency kept in `tool.poetry.dependencies`.
pub(crate) const PYTHON_PIN: &str = "python";

pub(crate) struct Manifest {
    document: Document,
    path: PathBuf,
}

pub(crate) trait ManifestDocument {
    fn extract(&mut self) -> Packages;
    fn write(&self) -> Result<()>;
}

impl Manifest {
    pub(crate) fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => Error::NotFound { path: path.clone() },
            _ => Error::Read {
                path: path.clone(),
                source,
            },
        })?;

        Self::build(path, &text)
    }

    pub(crate) fn build(path: impl Into<PathBuf>, text: &str) -> Result<Self> {
        let path = path.into();
        let document = text.parse::<Document>().map_err(|source| Error::Parse {
            path: path.clone(),
            source,
        })?;

        Ok(Self { document, path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl ManifestDocument for Manifest {
    /// Moves every dependency except the python pin out of the document.
    ///
    /// Missing `dependencies` tables are created empty. A manifest without
    /// `tool.poetry` is left as is.
    fn extract(&mut self) -> Packages {
        let mut packages = Packages::default();
        let groups = self.document.get_groups();

        let Some(poetry) = self.document.get_poetry() else {
            debug!("no [tool.poetry] section in {:?}", self.path);
            return packages;
        };

        match poetry.get_dependencies() {
            Some(dependencies) => packages.extend(MAIN_GROUP, dependencies.drain_except(&[PYTHON_PIN])),
            None => warn!("tool.poetry.dependencies in {:?} is not a table", self.path),
        }

        for group in groups {
            let Some(dependencies) = self
                .document
                .get_group(&group)
                .and_then(|group| group.get_dependencies())
            else {
                warn!("tool.poetry.group.{group}.dependencies in {:?} is not a table", self.path);
                continue;
            };

            let keep: &[&str] = if group == MAIN_GROUP { &[PYTHON_PIN] } else { &[] };
            packages.extend(&group, dependencies.drain_except(keep));
        }

        packages
    }

    fn write(&self) -> Result<()> {
        File::create(&self.path)
            .and_then(|file| bufwrite(file, self.document.to_string()))
            .map_err(|source| Error::Write {
                path: self.path.clone(),
                source,
            })?;

        Ok(())
    }
}

fn bufwrite(inner: impl Write, content: impl Into<String>) -> io::Result<()> {
    let mut buffer = BufWriter::new(inner);
    write!(buffer, "{}", content.into())?;
    buffer.flush()
}
