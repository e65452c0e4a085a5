//! Schema dumps
//!
//! Runs a schema-only `pg_dump` and strips everything that ties the schema
//! to a particular cluster: ownership, privileges, comments and session
//! settings. What is left can be diffed between environments.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::command::CommandIntent;
use crate::config::ConnectionConfig;
use crate::engine::Executor;
use crate::error::Result;
use crate::lifecycle::Provisioner;

/// Lines containing any of these are dropped.
const REJECT_CONTAINING: [&str; 2] = ["ALTER DEFAULT PRIVILEGES", "OWNER TO"];

/// Lines starting with any of these are dropped.
static REJECT_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(--|REVOKE|COMMENT ON|SET|GRANT)").expect("static pattern is valid")
});

/// Filter raw `pg_dump` output. Every kept line ends with a newline and runs
/// of empty lines are squeezed down to one.
pub fn filter_schema(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_blank = false;

    for line in raw.lines() {
        if REJECT_CONTAINING.iter().any(|s| line.contains(s)) || REJECT_PREFIX.is_match(line) {
            continue;
        }
        let blank = line.is_empty();
        if blank && previous_blank {
            continue;
        }
        previous_blank = blank;
        out.push_str(line);
        out.push('\n');
    }

    out
}

/// Write a dump to `path`, replacing whatever was there.
pub fn write_dump(path: &Path, dump: &str) -> Result<()> {
    fs::write(path, dump)?;
    Ok(())
}

impl<E: Executor> Provisioner<E> {
    /// Schema-only dump of `db_name`, filtered by [`filter_schema`]. When
    /// `output_file` is given the dump is also written there; if that write
    /// fails the dump is not returned.
    pub fn schema_dump(
        &self,
        db_name: &str,
        output_file: Option<&Path>,
        config: &ConnectionConfig,
    ) -> Result<String> {
        config.validate(db_name)?;
        let config = config.clone().normalized();

        let raw = self.run(CommandIntent::schema_dump(db_name), &config)?;
        let dump = filter_schema(&raw);
        debug!(
            database = db_name,
            raw_lines = raw.lines().count(),
            kept_lines = dump.lines().count(),
            "filtered schema dump"
        );

        if let Some(path) = output_file {
            write_dump(path, &dump)?;
            info!(database = db_name, file = %path.display(), "wrote schema dump");
        }

        Ok(dump)
    }
}
