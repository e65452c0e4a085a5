//! JSON output formatting

use crate::output::report::{Report, ReportData};
use serde_json::{json, Value};

pub fn format_json(report: &Report) -> String {
    let mut value: Value = serde_json::to_value(report).unwrap_or(json!(null));

    // A dump written to a file is reported by size only.
    if let ReportData::Dump { file: Some(_), .. } = &report.data {
        if let Some(obj) = value.as_object_mut() {
            obj.remove("schema");
        }
    }

    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}
