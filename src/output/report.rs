//! What a CLI invocation did, ready to be printed

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::engine::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Exists,
    Terminate,
    Drop,
    Import,
    Dump,
    Render,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Exists => "exists",
            Operation::Terminate => "terminate",
            Operation::Drop => "drop",
            Operation::Import => "import",
            Operation::Dump => "dump",
            Operation::Render => "render",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub operation: Operation,
    pub database: String,
    /// Absent for operations that never execute anything
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(flatten)]
    pub data: ReportData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReportData {
    Done,
    Exists {
        exists: bool,
    },
    Imported {
        file: String,
    },
    Dump {
        schema: String,
        file: Option<PathBuf>,
        bytes: u64,
    },
    Command {
        line: String,
    },
}

impl Report {
    pub fn new(operation: Operation, database: impl Into<String>, data: ReportData) -> Self {
        Self {
            operation,
            database: database.into(),
            environment: None,
            data,
        }
    }

    pub fn in_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn dump(database: impl Into<String>, schema: String, file: Option<PathBuf>) -> Self {
        let bytes = schema.len() as u64;
        Self::new(
            Operation::Dump,
            database,
            ReportData::Dump {
                schema,
                file,
                bytes,
            },
        )
    }
}
