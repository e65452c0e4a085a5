//! Import: replace a database's contents with the statements in a SQL file

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use super::Provisioner;
use crate::command::{Command, CommandIntent};
use crate::config::{ConnectionConfig, Mount};
use crate::engine::Executor;
use crate::error::{PgDockError, Result};

/// The steps of an import, in the order they run. A failure stops the
/// sequence; completed steps are not rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStep {
    /// Terminate connections and drop the database if present
    Drop,
    /// Recreate the user, database and grants
    Create,
    /// Work out which host directory to bind into the container
    Mount,
    /// Run the SQL file against the new database
    Restore,
}

impl ImportStep {
    pub const SEQUENCE: [ImportStep; 4] = [
        ImportStep::Drop,
        ImportStep::Create,
        ImportStep::Mount,
        ImportStep::Restore,
    ];
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportStep::Drop => "drop",
            ImportStep::Create => "create",
            ImportStep::Mount => "mount",
            ImportStep::Restore => "restore",
        };
        f.write_str(name)
    }
}

/// Bind mount that makes `sql_file` visible inside the container at the
/// same relative location.
///
/// `sql_file` is taken relative to `cwd`; one leading `.` and one leading `/`
/// are stripped, so `data/a.sql`, `./data/a.sql` and `/data/a.sql` all mount
/// `<cwd>/data` at `/data/`. The host side is cleaned lexically, `..`
/// included; the container side keeps the directory as written.
pub fn mount_for(sql_file: &str, cwd: &Path) -> Mount {
    let file = sql_file.strip_prefix('.').unwrap_or(sql_file);
    let file = file.strip_prefix('/').unwrap_or(file);
    let dir = match file.rfind('/') {
        Some(i) => &file[..=i],
        None => "",
    };

    Mount {
        host: clean(&cwd.join(dir)),
        container: format!("/{}", dir),
    }
}

/// Resolve `.` and `..` without touching the filesystem. `..` at the root
/// stays at the root.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

impl<E: Executor> Provisioner<E> {
    /// Drop and recreate `db_name`, then load `sql_file` into it.
    pub fn import(&self, db_name: &str, sql_file: &str, config: &ConnectionConfig) -> Result<()> {
        self.import_with(db_name, sql_file, config, &std::env::current_dir)
    }

    pub(crate) fn import_with(
        &self,
        db_name: &str,
        sql_file: &str,
        config: &ConnectionConfig,
        current_dir: &dyn Fn() -> io::Result<PathBuf>,
    ) -> Result<()> {
        if sql_file.is_empty() {
            return Err(PgDockError::MissingSqlFile);
        }
        config.validate(db_name)?;

        let mut mount = None;
        for step in ImportStep::SEQUENCE {
            debug!(database = db_name, %step, "import step");
            let outcome = match step {
                ImportStep::Drop => self.drop(db_name, config),
                ImportStep::Create => self.create(db_name, config),
                ImportStep::Mount => current_dir().map_err(PgDockError::from).map(|cwd| {
                    let m = mount_for(sql_file, &cwd);
                    debug!(mount = %m, "import mount");
                    mount = Some(m);
                }),
                ImportStep::Restore => {
                    let mut command = Command::new(CommandIntent::file(db_name, sql_file), config);
                    if let Some(m) = mount.take() {
                        command = command.with_mount(m);
                    }
                    self.execute(&command).map(|out| {
                        debug!(output = %out, "restore output");
                    })
                }
            };
            outcome.map_err(|error| PgDockError::Import {
                step,
                error: Box::new(error),
            })?;
        }

        info!(database = db_name, file = sql_file, "imported");
        Ok(())
    }
}
