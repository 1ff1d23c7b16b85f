//! Output formatting utilities for the csq CLI.
//!
//! This module provides functions for formatting data as tables or JSON.
//! It is organized into submodules:
//!
//! - [`records`] - Record output formatting (list)
//! - [`query`] - Query output formatting (canonical, tokens, check)
//! - [`helpers`] - Common formatting utilities (truncation, status, markers)

pub mod helpers;
mod query;
mod records;

// Records
pub use records::{format_records_json, format_records_table};

// Queries
pub use query::{format_canonical_json, format_check_ok, format_tokens_json, format_tokens_table};
