//! pgdock CLI - manage postgres databases natively or through a throwaway container

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pgdock::cli::{Args, SubCommand};
use pgdock::output::{Operation, ReportData};
use pgdock::{format_output, Command, CommandIntent, Executor, OutputFormat, Provisioner, Report};

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "pgdock=debug" } else { "pgdock=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = args
        .connection_config()
        .context("loading connection settings")?;
    init_logging(config.debug);

    let format = if args.json { OutputFormat::Json } else { OutputFormat::Human };
    let database = args.command.database().to_string();

    let provisioner = Provisioner::detect();
    let environment = provisioner.executor().environment();
    let mut code = ExitCode::SUCCESS;

    let report = match &args.command {
        SubCommand::Render { sql, .. } => {
            config.validate(&database)?;
            let command = Command::new(CommandIntent::statement(&database, sql.as_str()), &config);
            Report::new(
                Operation::Render,
                &database,
                ReportData::Command {
                    line: command.redacted(),
                },
            )
        }
        SubCommand::Create { .. } => {
            provisioner.create(&database, &config)?;
            Report::new(Operation::Create, &database, ReportData::Done).in_environment(environment)
        }
        SubCommand::Exists { .. } => {
            let exists = match provisioner.exists(&database, &config) {
                Ok(()) => true,
                Err(e) if e.is_not_found() => false,
                Err(e) => return Err(e.into()),
            };
            if !exists {
                code = ExitCode::FAILURE;
            }
            Report::new(Operation::Exists, &database, ReportData::Exists { exists })
                .in_environment(environment)
        }
        SubCommand::Terminate { .. } => {
            provisioner.terminate(&database, &config)?;
            Report::new(Operation::Terminate, &database, ReportData::Done)
                .in_environment(environment)
        }
        SubCommand::Drop { .. } => {
            provisioner.drop(&database, &config)?;
            Report::new(Operation::Drop, &database, ReportData::Done).in_environment(environment)
        }
        SubCommand::Import { file, .. } => {
            provisioner
                .import(&database, file, &config)
                .with_context(|| format!("importing {} into {}", file, database))?;
            Report::new(
                Operation::Import,
                &database,
                ReportData::Imported { file: file.clone() },
            )
            .in_environment(environment)
        }
        SubCommand::Dump { output, .. } => {
            let schema = provisioner.schema_dump(&database, output.as_deref(), &config)?;
            Report::dump(&database, schema, output.clone()).in_environment(environment)
        }
    };

    println!("{}", format_output(&report, &format));
    Ok(code)
}
