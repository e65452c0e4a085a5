//! pgdock - provision and tear down postgres databases from anywhere
//!
//! Every operation renders a `psql` or `pg_dump` command line and runs it
//! either directly (when the process already lives inside a container with
//! the client tools) or inside a throwaway container pulled for the call.
//!
//! # Example
//!
//! ```no_run
//! use pgdock::{ConnectionConfig, Provisioner};
//!
//! let config = ConnectionConfig {
//!     image: "postgres:16-alpine".to_string(),
//!     host: "localhost".to_string(),
//!     user: "app".to_string(),
//!     password: "secret".to_string(),
//!     ..Default::default()
//! };
//! let provisioner = Provisioner::detect();
//! provisioner.import("app", "./db/schema.sql", &config).unwrap();
//! let schema = provisioner.schema_dump("app", None, &config).unwrap();
//! println!("{}", schema);
//! ```

pub mod cli;
pub mod command;
pub mod config;
pub mod dump;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod output;

pub use command::{Command, CommandIntent};
pub use config::{load_config, ConnectionConfig, Mount, BOOTSTRAP_DATABASE, DEFAULT_PORT};
pub use dump::filter_schema;
pub use engine::{select_executor, ContainerExecutor, Environment, Executor, NativeExecutor};
pub use error::{PgDockError, Result};
pub use lifecycle::{ImportStep, Provisioner};
pub use output::{format_output, OutputFormat, Report};
