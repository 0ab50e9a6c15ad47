use std::{
    ffi::OsString,
    fmt::{self, Display},
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Result;
use toml_edit::{Item, TableLike, Value};
use tracing::{error, info, warn};

use crate::{
    error::Error,
    manifest::packages::{Group, Packages},
};

pub(crate) const PROGRAM: &str = "poetry";

/// A package requested at its latest version, e.g. `requests[socks]@latest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    name: String,
    extras: Vec<String>,
}

/// One `poetry add` invocation covering a whole dependency group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AddCommand {
    group: Option<String>,
    tokens: Vec<Token>,
}

pub(crate) trait Runner {
    /// Runs `command` and returns its standard output.
    fn run(&mut self, command: &AddCommand) -> Result<String>;
}

/// Runs the poetry executable directly, without a shell in between.
pub(crate) struct Poetry {
    program: OsString,
    directory: Option<PathBuf>,
}

impl Token {
    pub(crate) fn from_item(name: &str, item: &Item) -> Result<Self, Error> {
        let malformed = |reason| Error::Malformed {
            name: name.to_string(),
            reason,
        };

        let extras = match item {
            Item::Value(Value::String(_)) => Vec::new(),
            Item::Value(Value::Array(constraints)) => {
                let constraints = constraints
                    .iter()
                    .map(|constraint| constraint.as_inline_table().map(|table| table as &dyn TableLike))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| malformed("constraint list contains a non-table value"))?;
                first_extras(&constraints).map_err(malformed)?
            },
            Item::ArrayOfTables(constraints) => {
                let constraints = constraints.iter().map(|table| table as &dyn TableLike).collect::<Vec<_>>();
                first_extras(&constraints).map_err(malformed)?
            },
            _ => {
                let table = item
                    .as_table_like()
                    .ok_or_else(|| malformed("expected a version string or a table"))?;
                extras(table).map_err(malformed)?
            },
        };

        Ok(Self {
            name: name.to_string(),
            extras,
        })
    }

    /// The argument handed to poetry.
    pub(crate) fn arg(&self) -> String {
        if self.extras.is_empty() {
            format!("{}@latest", self.name)
        } else {
            format!("{}[{}]@latest", self.name, self.extras.join(","))
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extras.is_empty() {
            write!(f, "{}@latest", self.name)
        } else {
            write!(f, "'{}[{}]'@latest", self.name, self.extras.join(","))
        }
    }
}

fn extras(table: &dyn TableLike) -> Result<Vec<String>, &'static str> {
    let Some(extras) = table.get("extras") else {
        return Ok(Vec::new());
    };
    let Some(extras) = extras.as_array() else {
        return Err("extras is not an array");
    };

    extras
        .iter()
        .map(|extra| extra.as_str().map(str::to_string).ok_or("extras contains a non-string value"))
        .collect()
}

/// Extras of a multiple-constraint dependency come from the first constraint declaring any.
fn first_extras(constraints: &[&dyn TableLike]) -> Result<Vec<String>, &'static str> {
    if constraints.is_empty() {
        return Err("constraint list is empty");
    }

    for constraint in constraints {
        let extras = extras(*constraint)?;
        if !extras.is_empty() {
            return Ok(extras);
        }
    }

    Ok(Vec::new())
}

impl AddCommand {
    /// Builds the command for `group`, or `None` when no package in it is usable.
    /// Malformed packages are skipped with a warning.
    pub(crate) fn build(group: &Group) -> Option<Self> {
        let tokens = group
            .packages
            .iter()
            .filter_map(|(name, item)| match Token::from_item(name, item) {
                Ok(token) => Some(token),
                Err(error) => {
                    warn!("Skipping {error}");
                    None
                },
            })
            .collect::<Vec<_>>();

        if tokens.is_empty() {
            return None;
        }

        Some(Self {
            group: (!group.is_main()).then(|| group.name.clone()),
            tokens,
        })
    }

    pub(crate) fn args(&self) -> Vec<String> {
        let mut args = vec!["add".to_string()];
        args.extend(self.tokens.iter().map(Token::arg));

        if let Some(group) = &self.group {
            args.push("--group".to_string());
            args.push(group.clone());
        }

        args
    }
}

impl Display for AddCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PROGRAM} add")?;

        for token in &self.tokens {
            write!(f, " {token}")?;
        }

        if let Some(group) = &self.group {
            write!(f, " --group {group}")?;
        }

        Ok(())
    }
}

pub(crate) fn synthesize(packages: &Packages) -> Vec<AddCommand> {
    packages.groups().filter_map(AddCommand::build).collect()
}

/// Runs every command in order.
///
/// A failing command is logged and the rest still run; the run as a whole
/// fails afterwards if any of them did.
pub(crate) fn run_all(commands: &[AddCommand], runner: &mut impl Runner) -> Result<()> {
    let mut failed = 0;

    for command in commands {
        info!("Executing: {command}");

        match runner.run(command) {
            Ok(output) => info!("Output: {output}"),
            Err(error) => {
                error!("{error:#}");
                failed += 1;
            },
        }
    }

    if failed > 0 {
        return Err(Error::Commands {
            failed,
            total: commands.len(),
        }
        .into());
    }

    Ok(())
}

impl Default for Poetry {
    fn default() -> Self {
        Self {
            program: PROGRAM.into(),
            directory: None,
        }
    }
}

impl Poetry {
    /// Runs poetry next to `manifest` so it picks up that project.
    pub(crate) fn for_manifest(manifest: &Path) -> Self {
        let directory = manifest
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf);

        Self {
            directory,
            ..Self::default()
        }
    }
}

impl Runner for Poetry {
    fn run(&mut self, command: &AddCommand) -> Result<String> {
        let mut process = Command::new(&self.program);
        process.args(command.args());

        if let Some(directory) = &self.directory {
            process.current_dir(directory);
        }

        let output = process.output().map_err(|source| Error::Spawn {
            program: self.program.to_string_lossy().into_owned(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

        if !output.status.success() {
            info!("Output: {stdout}");

            return Err(Error::Command {
                command: command.to_string(),
                status: output.status,
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(stdout)
    }
}
