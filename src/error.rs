use std::{io, path::PathBuf, process::ExitStatus};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("{path:?} not found")]
    NotFound { path: PathBuf },

    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path:?} as manifest")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },

    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {path:?}")]
    RemoveLockfile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed dependency {name}: {reason}")]
    Malformed { name: String, reason: &'static str },

    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },

    #[error("{failed} of {total} commands failed")]
    Commands { failed: usize, total: usize },
}
