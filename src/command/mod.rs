//! Command construction
//!
//! Every database call starts life as a [`CommandIntent`] and is rendered into
//! a shell command line for `psql` or `pg_dump`. Rendering is pure: the same
//! intent and configuration always produce the same line.
//!
//! Statement text is passed through as-is. It is wrapped in double quotes so
//! the shell hands it to `psql` as one argument, but it is never sanitized.

use std::fmt;

use crate::config::{ConnectionConfig, Mount};

const PASSWORD_MASK: &str = "***";

/// What a command should do, before it is turned into a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandIntent {
    /// Run an inline SQL statement with tuples-only output
    Statement { database: String, sql: String },
    /// Run the statements in a file
    File { database: String, path: String },
    /// Schema-only dump of a database
    SchemaDump { database: String },
}

impl CommandIntent {
    pub fn statement(database: impl Into<String>, sql: impl Into<String>) -> Self {
        CommandIntent::Statement {
            database: database.into(),
            sql: sql.into(),
        }
    }

    pub fn file(database: impl Into<String>, path: impl Into<String>) -> Self {
        CommandIntent::File {
            database: database.into(),
            path: path.into(),
        }
    }

    pub fn schema_dump(database: impl Into<String>) -> Self {
        CommandIntent::SchemaDump {
            database: database.into(),
        }
    }

    pub fn database(&self) -> &str {
        match self {
            CommandIntent::Statement { database, .. }
            | CommandIntent::File { database, .. }
            | CommandIntent::SchemaDump { database } => database,
        }
    }

    /// Render into a shell command line using the credentials in `config`.
    pub fn render(&self, config: &ConnectionConfig) -> String {
        self.render_with_password(config, &config.password)
    }

    fn render_with_password(&self, config: &ConnectionConfig, password: &str) -> String {
        let port = config.effective_port();
        match self {
            CommandIntent::Statement { database, sql } => format!(
                "PGPASSWORD={} psql -h {} -d {} -U {} -p {} -v ON_ERROR_STOP=1 -t -c {}",
                password,
                config.host,
                database,
                config.user,
                port,
                double_quote(sql)
            ),
            CommandIntent::File { database, path } => format!(
                "PGPASSWORD={} psql -h {} -d {} -U {} -p {} -v ON_ERROR_STOP=1 --file={}",
                password, config.host, database, config.user, port, path
            ),
            CommandIntent::SchemaDump { database } => format!(
                "PGPASSWORD={} pg_dump -h {} -p {} -U {} {} --schema-only",
                password, config.host, port, config.user, database
            ),
        }
    }
}

/// A fully rendered command line plus the configuration it was built from.
///
/// The executor needs the configuration to decide how to run the line
/// (image, network), so the two travel together. A mount is only ever set
/// on the restore command of an import.
#[derive(Debug, Clone)]
pub struct Command {
    intent: CommandIntent,
    line: String,
    config: ConnectionConfig,
    mount: Option<Mount>,
}

impl Command {
    pub fn new(intent: CommandIntent, config: &ConnectionConfig) -> Self {
        let line = intent.render(config);
        Self {
            intent,
            line,
            config: config.clone(),
            mount: None,
        }
    }

    /// Bind `mount` into the container this command runs in.
    pub fn with_mount(mut self, mount: Mount) -> Self {
        self.mount = Some(mount);
        self
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn intent(&self) -> &CommandIntent {
        &self.intent
    }

    pub fn mount(&self) -> Option<&Mount> {
        self.mount.as_ref()
    }

    /// The command line with the password masked, safe for logs.
    pub fn redacted(&self) -> String {
        self.intent.render_with_password(&self.config, PASSWORD_MASK)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Wrap `s` in double quotes, escaping the characters the shell treats
/// specially inside them.
fn double_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
