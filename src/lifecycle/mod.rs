//! Database lifecycle operations
//!
//! Each operation is a short, fixed sequence of statements sent through an
//! [`Executor`]. Operations are idempotent where the database allows it:
//! creating an existing database and dropping a missing one both succeed.
//!
//! Nothing here holds a lock. Two callers working on the same database name
//! at the same time can see each other's intermediate states.

mod import;

pub use import::{mount_for, ImportStep};

use tracing::{debug, info};

use crate::command::{Command, CommandIntent};
use crate::config::{ConnectionConfig, BOOTSTRAP_DATABASE};
use crate::engine::{select_executor, Environment, Executor};
use crate::error::{PgDockError, Result};

/// Privileges handed to the configured user on a freshly created database.
const GRANTS: [&str; 4] = [
    "GRANT ALL PRIVILEGES ON ALL TABLES IN SCHEMA public TO {user}",
    "GRANT ALL PRIVILEGES ON ALL SEQUENCES IN SCHEMA public TO {user}",
    "ALTER DEFAULT PRIVILEGES IN SCHEMA public GRANT ALL PRIVILEGES ON TABLES TO {user}",
    "ALTER DEFAULT PRIVILEGES IN SCHEMA public GRANT ALL PRIVILEGES ON SEQUENCES TO {user}",
];

/// Runs lifecycle operations against a postgres server through one executor.
pub struct Provisioner<E = Box<dyn Executor>> {
    executor: E,
}

impl Provisioner<Box<dyn Executor>> {
    /// Provisioner whose executor matches the environment this process runs in.
    pub fn detect() -> Self {
        let env = Environment::detect();
        debug!(environment = %env, "selected executor");
        Self::new(select_executor(env))
    }
}

impl<E: Executor> Provisioner<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Create the configured user (if missing) and the database (if missing),
    /// then grant the user privileges on it.
    pub fn create(&self, db_name: &str, config: &ConnectionConfig) -> Result<()> {
        config.validate(db_name)?;

        let user_exists = self.query_bool(
            BOOTSTRAP_DATABASE,
            format!(
                "SELECT EXISTS ( SELECT usename FROM pg_catalog.pg_user WHERE usename = '{}');",
                config.user
            ),
            config,
        )?;
        if !user_exists {
            let out = self.query(
                BOOTSTRAP_DATABASE,
                format!(
                    "CREATE USER {} WITH PASSWORD '{}';",
                    config.user, config.password
                ),
                config,
            )?;
            info!(user = %config.user, output = %out, "created user");
        }

        match self.exists(db_name, config) {
            Ok(()) => {
                debug!(database = db_name, "skipping creating existing database");
                return Ok(());
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let out = self.query(
            BOOTSTRAP_DATABASE,
            format!(
                "CREATE DATABASE {} ENCODING 'UTF-8' LC_COLLATE='en_US.UTF-8' \
                 LC_CTYPE='en_US.UTF-8' TEMPLATE template0 OWNER {};",
                db_name, config.user
            ),
            config,
        )?;
        info!(database = db_name, output = %out, "created database");

        let grants = GRANTS
            .iter()
            .map(|g| g.replace("{user}", &config.user))
            .collect::<Vec<_>>()
            .join("; ");
        self.query(db_name, grants, config)?;
        debug!(user = %config.user, database = db_name, "applied privileges");

        Ok(())
    }

    /// `Ok(())` when the database exists, [`PgDockError::DatabaseNotExist`]
    /// when it does not.
    pub fn exists(&self, db_name: &str, config: &ConnectionConfig) -> Result<()> {
        config.validate(db_name)?;

        let exists = self.query_bool(
            BOOTSTRAP_DATABASE,
            format!(
                "SELECT EXISTS ( SELECT datname FROM pg_database WHERE datname = '{}')",
                db_name
            ),
            config,
        )?;
        if exists {
            debug!(database = db_name, "database exists");
            Ok(())
        } else {
            Err(PgDockError::DatabaseNotExist(db_name.to_string()))
        }
    }

    /// Terminate every backend connected to the database. Succeeds whether or
    /// not there was anything to terminate.
    pub fn terminate(&self, db_name: &str, config: &ConnectionConfig) -> Result<()> {
        config.validate(db_name)?;

        let out = self.query(
            BOOTSTRAP_DATABASE,
            format!(
                "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}';",
                db_name
            ),
            config,
        )?;
        debug!(
            database = db_name,
            terminated = out.lines().filter(|l| !l.trim().is_empty()).count(),
            "terminated connections"
        );
        Ok(())
    }

    /// Terminate connections, then drop the database if it exists.
    pub fn drop(&self, db_name: &str, config: &ConnectionConfig) -> Result<()> {
        self.terminate(db_name, config)?;

        let out = self.query(
            BOOTSTRAP_DATABASE,
            format!("DROP DATABASE IF EXISTS {};", db_name),
            config,
        )?;
        info!(database = db_name, output = %out, "dropped database");
        Ok(())
    }

    pub(crate) fn run(&self, intent: CommandIntent, config: &ConnectionConfig) -> Result<String> {
        self.execute(&Command::new(intent, config))
    }

    pub(crate) fn execute(&self, command: &Command) -> Result<String> {
        debug!(command = %command, environment = %self.executor.environment(), "executing");
        self.executor.run(command)
    }

    fn query(&self, database: &str, sql: String, config: &ConnectionConfig) -> Result<String> {
        self.run(CommandIntent::statement(database, sql), config)
    }

    fn query_bool(&self, database: &str, sql: String, config: &ConnectionConfig) -> Result<bool> {
        let out = self.query(database, sql, config)?;
        parse_bool(&out)
    }
}

/// Parse a boolean the way psql prints it, plus the usual spellings.
pub fn parse_bool(s: &str) -> Result<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(PgDockError::InvalidBool(s.to_string())),
    }
}
