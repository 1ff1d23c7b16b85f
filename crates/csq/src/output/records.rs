//! Record output formatting.

use changespec_query::ChangeRecord;
use owo_colors::OwoColorize;
use serde::Serialize;

use super::helpers::{format_signals, format_status, truncate_str};

const NAME_WIDTH: usize = 32;
const STATUS_WIDTH: usize = 24;
const PROJECT_WIDTH: usize = 16;

/// JSON output structure for the list command.
#[derive(Serialize)]
pub struct RecordsListOutput<'a> {
    pub query: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
    pub total: usize,
    pub records: Vec<RecordOutput<'a>>,
}

/// JSON output structure for a single record.
#[derive(Serialize)]
pub struct RecordOutput<'a> {
    pub name: &'a str,
    pub status: &'a str,
    pub base_status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<&'a str>,
    pub file_path: &'a str,
    pub error_suffix: bool,
    pub running_agent: bool,
    pub running_process: bool,
}

impl<'a> From<&'a ChangeRecord> for RecordOutput<'a> {
    fn from(record: &'a ChangeRecord) -> Self {
        Self {
            name: &record.name,
            status: &record.status,
            base_status: record.base_status(),
            project: record.project(),
            parent: record.parent.as_deref(),
            file_path: &record.file_path,
            error_suffix: record.signals.error_suffix,
            running_agent: record.signals.running_agent,
            running_process: record.signals.running_process,
        }
    }
}

/// Formats records as JSON.
///
/// `total` is the number of matches before any limit was applied.
pub fn format_records_json(
    query: Option<&str>,
    canonical: Option<String>,
    records: &[&ChangeRecord],
    total: usize,
) -> Result<String, serde_json::Error> {
    let output = RecordsListOutput {
        query,
        canonical,
        total,
        records: records.iter().map(|r| RecordOutput::from(*r)).collect(),
    };

    serde_json::to_string_pretty(&output)
}

/// Formats records as a table.
pub fn format_records_table(records: &[&ChangeRecord], total: usize, use_colors: bool) -> String {
    if records.is_empty() {
        return "No matching records.\n".to_string();
    }

    let mut output = String::new();

    // Header
    let header = format!(
        "{:<NAME_WIDTH$} {:<STATUS_WIDTH$} {:<PROJECT_WIDTH$} {:<5} {}",
        "Name", "Status", "Project", "Flags", "Parent"
    );
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for record in records {
        let name = truncate_str(&record.name, NAME_WIDTH);
        let status = format_status(
            &record.status,
            record.base_status(),
            STATUS_WIDTH,
            use_colors,
        );
        let project = truncate_str(record.project().unwrap_or("-"), PROJECT_WIDTH);
        let flags = format!("{:<5}", format_signals(&record.signals));
        let flags = if use_colors && record.signals.error_suffix {
            flags.red().bold().to_string()
        } else {
            flags
        };
        let parent = record.parent.as_deref().unwrap_or("");

        let line = format!("{name:<NAME_WIDTH$} {status} {project:<PROJECT_WIDTH$} {flags} {parent}");
        output.push_str(line.trim_end());
        output.push('\n');
    }

    if total > records.len() {
        let footer = format!("({} of {total} records shown)", records.len());
        if use_colors {
            output.push_str(&format!("{}\n", footer.dimmed()));
        } else {
            output.push_str(&footer);
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use changespec_query::RecordSignals;

    fn sample_records() -> Vec<ChangeRecord> {
        vec![
            ChangeRecord::new("base_cl", "Submitted", "/p/myproj/myproj.gp"),
            ChangeRecord::new("child_cl", "Drafted - (!: READY TO MAIL)", "/p/myproj/myproj.gp")
                .with_parent("base_cl")
                .with_signals(RecordSignals {
                    error_suffix: true,
                    running_agent: true,
                    running_process: false,
                }),
        ]
    }

    #[test]
    fn test_format_records_table_empty() {
        assert_eq!(format_records_table(&[], 0, false), "No matching records.\n");
    }

    #[test]
    fn test_format_records_table() {
        let records = sample_records();
        let refs: Vec<&ChangeRecord> = records.iter().collect();
        let table = format_records_table(&refs, refs.len(), false);

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Name"));
        assert!(lines[1].starts_with("base_cl"));
        assert!(lines[1].contains("Submitted"));
        assert!(lines[1].contains("myproj"));
        assert!(lines[2].contains("!@"));
        assert!(lines[2].ends_with("base_cl"));
    }

    #[test]
    fn test_format_records_table_limit_footer() {
        let records = sample_records();
        let refs: Vec<&ChangeRecord> = records.iter().take(1).collect();
        let table = format_records_table(&refs, 2, false);
        assert!(table.ends_with("(1 of 2 records shown)\n"));
    }

    #[test]
    fn test_format_records_json() {
        let records = sample_records();
        let refs: Vec<&ChangeRecord> = records.iter().collect();
        let json = format_records_json(Some("%d"), Some("status:DRAFTED".into()), &refs, 2).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["query"], "%d");
        assert_eq!(value["canonical"], "status:DRAFTED");
        assert_eq!(value["total"], 2);
        assert_eq!(value["records"][1]["name"], "child_cl");
        assert_eq!(value["records"][1]["base_status"], "Drafted");
        assert_eq!(value["records"][1]["project"], "myproj");
        assert_eq!(value["records"][1]["parent"], "base_cl");
        assert_eq!(value["records"][1]["error_suffix"], true);
        assert!(value["records"][0].get("parent").is_none());
    }
}
