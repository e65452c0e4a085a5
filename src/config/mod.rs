//! Connection configuration
//!
//! A `ConnectionConfig` carries everything needed to reach the database and,
//! when the process is not already inside a container, to provision one.
//! It is passed by value into each operation and never shared between calls.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PgDockError, Result};

/// Port used when the configured port is left at zero.
pub const DEFAULT_PORT: u16 = 5432;

/// Database every administrative query connects to. The target database may
/// not exist yet, and `postgres` is always there on a fresh cluster.
pub const BOOTSTRAP_DATABASE: &str = "postgres";

/// A host directory bound into the ephemeral container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub host: PathBuf,
    pub container: String,
}

impl fmt::Display for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host.display(), self.container)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Container image holding the postgres client tools, e.g. `postgres:16-alpine`
    pub image: String,
    /// Container network to attach to, if any
    pub network: Option<String>,
    pub host: String,
    /// Zero means "use the default port"
    pub port: u16,
    pub user: String,
    pub password: String,
    pub debug: bool,
}

impl ConnectionConfig {
    /// Check that every field an operation on `db_name` needs is present.
    pub fn validate(&self, db_name: &str) -> Result<()> {
        if db_name.is_empty() {
            return Err(PgDockError::MissingOption("db name"));
        }
        if self.host.is_empty() {
            return Err(PgDockError::MissingOption("db host"));
        }
        if self.user.is_empty() {
            return Err(PgDockError::MissingOption("db user"));
        }
        if self.password.is_empty() {
            return Err(PgDockError::MissingOption("db password"));
        }
        if self.image.is_empty() {
            return Err(PgDockError::MissingOption(
                "docker base image (ex: postgres:11.7-alpine)",
            ));
        }
        Ok(())
    }

    /// The port commands are rendered with.
    pub fn effective_port(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_PORT
        } else {
            self.port
        }
    }

    /// Copy of this configuration with the default port filled in.
    pub fn normalized(mut self) -> Self {
        self.port = self.effective_port();
        self
    }
}

/// Load a connection configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ConnectionConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        PgDockError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<ConnectionConfig> {
    toml::from_str(content).map_err(|e| PgDockError::Config(e.to_string()))
}
