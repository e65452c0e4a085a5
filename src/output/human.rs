//! Human-readable output formatting

use crate::output::report::{Report, ReportData};
use bytesize::ByteSize;

pub fn format_human(report: &Report) -> String {
    let where_ = report
        .environment
        .map(|e| format!(" ({})", e))
        .unwrap_or_default();

    match &report.data {
        ReportData::Done => {
            format!("{} {}: ok{}", report.operation, report.database, where_)
        }
        ReportData::Exists { exists } => {
            let state = if *exists { "present" } else { "absent" };
            format!("{}: {}", report.database, state)
        }
        ReportData::Imported { file } => {
            format!("imported {} into {}{}", file, report.database, where_)
        }
        ReportData::Dump {
            file: Some(path),
            bytes,
            ..
        } => {
            format!(
                "wrote schema dump of {} ({}) to {}",
                report.database,
                ByteSize(*bytes),
                path.display()
            )
        }
        ReportData::Dump { schema, file: None, .. } => schema.trim_end().to_string(),
        ReportData::Command { line } => line.clone(),
    }
}
