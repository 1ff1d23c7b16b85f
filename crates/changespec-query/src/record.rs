//! The read-only view of a change record that queries are evaluated against.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Suffix appended to a status when the change is ready to be mailed.
const READY_TO_MAIL_SUFFIX: &str = " - (!: READY TO MAIL)";

/// Derived boolean signals exposed by the record store.
///
/// These back the `!!!`, `@@@` and `$$$` query shorthands. The store computes
/// them from whatever metadata it keeps (commit/hook/comment suffixes); the
/// query core only reads them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSignals {
    /// The record carries at least one error suffix.
    #[serde(default)]
    pub error_suffix: bool,

    /// An agent is currently running against the record.
    #[serde(default)]
    pub running_agent: bool,

    /// A background process is currently running for the record.
    #[serde(default)]
    pub running_process: bool,
}

/// A single change record (a "ChangeSpec").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Unique name of the change, possibly with a `__<N>` sibling suffix.
    pub name: String,

    /// Free-form description text.
    #[serde(default)]
    pub description: String,

    /// Raw status, e.g. `Drafted`, `Mailed (proj_2)`, `Drafted - (!: READY TO MAIL)`.
    pub status: String,

    /// Name of the parent change, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Path of the project file the record was loaded from.
    pub file_path: String,

    /// Signals derived by the record store.
    #[serde(default)]
    pub signals: RecordSignals,
}

impl ChangeRecord {
    /// Creates a record with an empty description, no parent and no signals.
    pub fn new(
        name: impl Into<String>,
        status: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            status: status.into(),
            parent: None,
            file_path: file_path.into(),
            signals: RecordSignals::default(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the parent change name.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the derived signals.
    pub fn with_signals(mut self, signals: RecordSignals) -> Self {
        self.signals = signals;
        self
    }

    /// Returns the status with the ready-to-mail and workspace suffixes removed.
    ///
    /// `"Drafted - (!: READY TO MAIL)"` and `"Mailed (myproj_3)"` become
    /// `"Drafted"` and `"Mailed"`.
    pub fn base_status(&self) -> &str {
        let status = self
            .status
            .strip_suffix(READY_TO_MAIL_SUFFIX)
            .unwrap_or(&self.status);
        let status = match status.find(" (") {
            Some(idx) => &status[..idx],
            None => status,
        };
        status.trim()
    }

    /// Returns the project name: the basename of the project file's directory.
    pub fn project(&self) -> Option<&str> {
        Path::new(&self.file_path)
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
    }

    /// Returns the text searched by plain string matches.
    pub fn searchable_text(&self) -> String {
        if self.description.is_empty() {
            self.name.clone()
        } else {
            format!("{}\n{}", self.name, self.description)
        }
    }
}

/// Strips a trailing `__<N>` sibling suffix from a change name.
///
/// Names without a numeric suffix are returned unchanged.
pub fn base_name(name: &str) -> &str {
    match name.rfind("__") {
        Some(idx) => {
            let suffix = &name[idx + 2..];
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                &name[..idx]
            } else {
                name
            }
        }
        None => name,
    }
}
