//! List command implementation.
//!
//! Loads the record dump and prints the records matching a query.

use std::path::Path;

use changespec_query::{parse_query, ChangeRecord, QueryContext, QueryEvaluator, QueryExpr};

use super::config::Config;
use super::records::load_records;
use super::{CommandContext, CommandError, Result};
use crate::output::{format_records_json, format_records_table};

/// Options for the list command.
#[derive(Debug, Default)]
pub struct ListOptions {
    /// Query expression given on the command line.
    pub query: Option<String>,
    /// Name of a saved query from the config file.
    pub saved: Option<String>,
    /// Limit results.
    pub limit: Option<usize>,
}

/// Executes the list command.
///
/// # Arguments
///
/// * `ctx` - Command context with output settings
/// * `opts` - List command options
/// * `config` - Loaded configuration, for saved queries
/// * `records_path` - Records file to query
///
/// # Errors
///
/// Returns an error if the query is invalid or the records cannot be loaded.
pub fn execute(
    ctx: &CommandContext,
    opts: &ListOptions,
    config: &Config,
    records_path: &Path,
) -> Result<()> {
    let query = resolve_query(opts, config)?;
    let expr = query
        .map(|q| parse_query(q).map_err(|e| CommandError::query(q, e)))
        .transpose()?;

    let records = load_records(records_path)?;
    let matching = filter_records(&records, expr.as_ref());
    let total = matching.len();

    tracing::debug!(
        query = query.unwrap_or(""),
        matched = total,
        loaded = records.len(),
        "filtered records"
    );

    let shown = apply_limit(matching, opts.limit);

    if ctx.json_output {
        let canonical = expr.as_ref().map(ToString::to_string);
        let output = format_records_json(query, canonical, &shown, total)?;
        println!("{output}");
    } else if !ctx.quiet {
        let output = format_records_table(&shown, total, ctx.use_colors);
        print!("{output}");
    }

    Ok(())
}

/// Picks the query text: a saved query by name, the command-line query, or none.
fn resolve_query<'a>(opts: &'a ListOptions, config: &'a Config) -> Result<Option<&'a str>> {
    if let Some(name) = &opts.saved {
        return config.saved_query(name).map(Some);
    }
    Ok(opts.query.as_deref())
}

/// Filters the records by the query; without a query every record matches.
fn filter_records<'a>(records: &'a [ChangeRecord], expr: Option<&QueryExpr>) -> Vec<&'a ChangeRecord> {
    match expr {
        Some(expr) => {
            let context = QueryContext::new(records);
            QueryEvaluator::new(expr, Some(&context)).filter_records(records)
        }
        None => records.iter().collect(),
    }
}

/// Applies the limit to the matching records.
fn apply_limit(records: Vec<&ChangeRecord>, limit: Option<usize>) -> Vec<&ChangeRecord> {
    match limit {
        Some(limit) => records.into_iter().take(limit).collect(),
        None => records,
    }
}
