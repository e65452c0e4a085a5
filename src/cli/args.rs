//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{load_config, ConnectionConfig};
use crate::error::Result;

#[derive(Parser, Debug)]
#[command(name = "pgdock")]
#[command(author, version, about = "Create, inspect, import into and drop postgres databases", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// TOML file with connection settings; flags override it
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Image with the postgres client tools (e.g. postgres:16-alpine)
    #[arg(long, global = true, env = "PGDOCK_IMAGE")]
    pub image: Option<String>,

    /// Container network to attach to
    #[arg(long, global = true, env = "PGDOCK_NETWORK")]
    pub network: Option<String>,

    /// Database host
    #[arg(long, global = true, env = "PGDOCK_HOST")]
    pub host: Option<String>,

    /// Database port (default: 5432)
    #[arg(long, global = true, env = "PGDOCK_PORT")]
    pub port: Option<u16>,

    /// Database user, created if missing
    #[arg(long, global = true, env = "PGDOCK_USER")]
    pub user: Option<String>,

    /// Password for the database user
    #[arg(long, global = true, env = "PGDOCK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum SubCommand {
    /// Create the user and database if they do not exist
    Create {
        database: String,
    },

    /// Check whether a database exists (exit status 1 when absent)
    Exists {
        database: String,
    },

    /// Terminate all connections to a database
    Terminate {
        database: String,
    },

    /// Drop a database if it exists
    Drop {
        database: String,
    },

    /// Drop, recreate and load a database from a SQL file
    Import {
        database: String,

        /// SQL file, relative to the current directory
        file: String,
    },

    /// Schema-only dump with ownership, grants and comments stripped
    Dump {
        database: String,

        /// Write the dump to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print the psql command a statement would run, without running it
    Render {
        database: String,

        /// SQL statement
        sql: String,
    },
}

impl SubCommand {
    pub fn database(&self) -> &str {
        match self {
            SubCommand::Create { database }
            | SubCommand::Exists { database }
            | SubCommand::Terminate { database }
            | SubCommand::Drop { database }
            | SubCommand::Import { database, .. }
            | SubCommand::Dump { database, .. }
            | SubCommand::Render { database, .. } => database,
        }
    }
}

impl Args {
    /// Connection settings from the config file (if any) with flags and
    /// environment variables layered on top.
    pub fn connection_config(&self) -> Result<ConnectionConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ConnectionConfig::default(),
        };

        if let Some(image) = &self.image {
            config.image = image.clone();
        }
        if let Some(network) = &self.network {
            config.network = Some(network.clone());
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(user) = &self.user {
            config.user = user.clone();
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        if self.verbose {
            config.debug = true;
        }

        Ok(config.normalized())
    }
}
