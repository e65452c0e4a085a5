//! Test doubles for the process and executor seams.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::rc::Rc;

use regex::Regex;

use crate::command::{Command, CommandIntent};
use crate::engine::environment::Environment;
use crate::engine::executor::{ExecutionResult, Executor};
use crate::engine::runner::{ProcessOutput, ProcessRunner};
use crate::error::PgDockError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
}

/// Records every process it is asked to run and replays queued responses.
/// Once the queue is empty every call succeeds with no output.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    calls: Rc<RefCell<Vec<RecordedCall>>>,
    responses: Rc<RefCell<VecDeque<ProcessOutput>>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: i32, output: &str) {
        self.respond_bytes(status, output.as_bytes().to_vec());
    }

    pub fn respond_bytes(&self, status: i32, output: Vec<u8>) {
        self.responses
            .borrow_mut()
            .push_back(ProcessOutput { status, output });
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Number of calls whose first argument is `subcommand`.
    pub fn count_subcommand(&self, subcommand: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.args.first().map(String::as_str) == Some(subcommand))
            .count()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, program: &str, args: &[String]) -> io::Result<ProcessOutput> {
        self.calls.borrow_mut().push(RecordedCall {
            program: program.to_string(),
            args: args.to_vec(),
        });
        Ok(self
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(ProcessOutput {
                status: 0,
                output: Vec::new(),
            }))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeDatabase {
    pub owner: String,
    pub granted: bool,
    pub restored_from: Option<String>,
    pub connections: u32,
}

#[derive(Debug, Default)]
struct ClusterState {
    users: BTreeSet<String>,
    databases: BTreeMap<String, FakeDatabase>,
    commands: Vec<Command>,
    failures: Vec<(String, String)>,
    bool_override: Option<String>,
    dump: String,
}

/// An in-memory stand-in for a postgres server, answering the statements
/// the lifecycle operations send.
#[derive(Debug, Clone, Default)]
pub struct FakeCluster {
    state: Rc<RefCell<ClusterState>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        let cluster = Self::default();
        cluster.add_user("postgres");
        cluster
    }

    pub fn add_user(&self, name: &str) {
        self.state.borrow_mut().users.insert(name.to_string());
    }

    pub fn add_database(&self, name: &str, db: FakeDatabase) {
        self.state
            .borrow_mut()
            .databases
            .insert(name.to_string(), db);
    }

    pub fn has_user(&self, name: &str) -> bool {
        self.state.borrow().users.contains(name)
    }

    pub fn database(&self, name: &str) -> Option<FakeDatabase> {
        self.state.borrow().databases.get(name).cloned()
    }

    /// Fail any command whose line contains `needle`, with `output`.
    pub fn fail_on(&self, needle: &str, output: &str) {
        self.state
            .borrow_mut()
            .failures
            .push((needle.to_string(), output.to_string()));
    }

    /// Answer database existence queries with `raw` instead of `t`/`f`.
    /// User existence queries keep answering normally.
    pub fn answer_exists_with(&self, raw: &str) {
        self.state.borrow_mut().bool_override = Some(raw.to_string());
    }

    pub fn set_dump(&self, dump: &str) {
        self.state.borrow_mut().dump = dump.to_string();
    }

    pub fn commands(&self) -> Vec<Command> {
        self.state.borrow().commands.clone()
    }

    /// Statements sent so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.commands()
            .iter()
            .map(|c| match c.intent() {
                CommandIntent::Statement { sql, .. } => sql.clone(),
                CommandIntent::File { path, .. } => format!("--file={}", path),
                CommandIntent::SchemaDump { database } => format!("pg_dump {}", database),
            })
            .collect()
    }

    fn answer(&self, command: &Command) -> ExecutionResult {
        let mut state = self.state.borrow_mut();
        state.commands.push(command.clone());

        if let Some((_, output)) = state
            .failures
            .iter()
            .find(|(needle, _)| command.line().contains(needle.as_str()))
        {
            return Err(PgDockError::CommandFailed {
                status: 1,
                output: output.clone(),
            });
        }

        match command.intent() {
            CommandIntent::Statement { database, sql } => {
                let database = database.clone();
                let sql = sql.clone();
                state.statement(&database, &sql)
            }
            CommandIntent::File { database, path } => match state.databases.get_mut(database) {
                Some(db) => {
                    db.restored_from = Some(path.clone());
                    Ok(String::new())
                }
                None => Err(missing_database(database)),
            },
            CommandIntent::SchemaDump { database } => {
                if state.databases.contains_key(database) {
                    Ok(state.dump.trim().to_string())
                } else {
                    Err(missing_database(database))
                }
            }
        }
    }
}

impl ClusterState {
    fn statement(&mut self, database: &str, sql: &str) -> ExecutionResult {
        if database != "postgres" && !self.databases.contains_key(database) {
            return Err(missing_database(database));
        }

        if let Some(name) = capture(r"WHERE usename = '([^']*)'", sql) {
            return Ok(boolean(self.users.contains(&name)));
        }
        if let Some(name) = capture(r"FROM pg_database WHERE datname = '([^']*)'", sql) {
            return Ok(match &self.bool_override {
                Some(raw) => raw.clone(),
                None => boolean(self.databases.contains_key(&name)),
            });
        }
        if let Some(name) = capture(r"^CREATE USER (\S+) WITH PASSWORD", sql) {
            if !self.users.insert(name.clone()) {
                return Err(failed(format!("ERROR:  role \"{}\" already exists", name)));
            }
            return Ok("CREATE ROLE".to_string());
        }
        if let Some(name) = capture(r"^CREATE DATABASE (\S+) ", sql) {
            if self.databases.contains_key(&name) {
                return Err(failed(format!("ERROR:  database \"{}\" already exists", name)));
            }
            let owner = capture(r"OWNER (\S+);", sql).unwrap_or_default();
            self.databases.insert(
                name,
                FakeDatabase {
                    owner,
                    ..Default::default()
                },
            );
            return Ok("CREATE DATABASE".to_string());
        }
        if sql.starts_with("GRANT ALL PRIVILEGES") {
            if let Some(db) = self.databases.get_mut(database) {
                db.granted = true;
            }
            return Ok("GRANT".to_string());
        }
        if let Some(name) = capture(r"pg_stat_activity WHERE datname = '([^']*)'", sql) {
            let killed = match self.databases.get_mut(&name) {
                Some(db) => std::mem::take(&mut db.connections),
                None => 0,
            };
            return Ok(vec!["t"; killed as usize].join("\n"));
        }
        if let Some(name) = capture(r"^DROP DATABASE IF EXISTS (\S+);", sql) {
            if let Some(db) = self.databases.get(&name) {
                if db.connections > 0 {
                    return Err(failed(format!(
                        "ERROR:  database \"{}\" is being accessed by other users",
                        name
                    )));
                }
            }
            self.databases.remove(&name);
            return Ok("DROP DATABASE".to_string());
        }
        Ok(String::new())
    }
}

fn boolean(value: bool) -> String {
    let s = if value { "t" } else { "f" };
    s.to_string()
}

impl Executor for FakeCluster {
    fn run(&self, command: &Command) -> ExecutionResult {
        self.answer(command)
    }

    fn environment(&self) -> Environment {
        Environment::InsideContainer
    }
}

fn capture(pattern: &str, haystack: &str) -> Option<String> {
    Regex::new(pattern)
        .ok()?
        .captures(haystack)
        .map(|c| c[1].to_string())
}

fn failed(output: String) -> PgDockError {
    PgDockError::CommandFailed { status: 1, output }
}

fn missing_database(name: &str) -> PgDockError {
    failed(format!(
        "psql: error: FATAL:  database \"{}\" does not exist",
        name
    ))
}
