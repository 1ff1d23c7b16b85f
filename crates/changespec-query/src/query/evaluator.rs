//! Query evaluation against change records.
//!
//! This module provides the [`QueryEvaluator`] for evaluating parsed query
//! expressions against [`ChangeRecord`]s, and the [`evaluate`] convenience
//! function for one-off checks.
//!
//! # Example
//!
//! ```
//! use changespec_query::{parse_query, ChangeRecord, QueryContext, QueryEvaluator};
//!
//! let records = vec![
//!     ChangeRecord::new("base", "Submitted", "/p/proj/proj.gp"),
//!     ChangeRecord::new("child", "Drafted", "/p/proj/proj.gp").with_parent("base"),
//! ];
//!
//! let expr = parse_query("^base %d").unwrap();
//! let context = QueryContext::new(&records);
//! let evaluator = QueryEvaluator::new(&expr, Some(&context));
//!
//! let names: Vec<&str> = evaluator
//!     .filter_records(&records)
//!     .into_iter()
//!     .map(|r| r.name.as_str())
//!     .collect();
//! assert_eq!(names, vec!["child"]);
//! ```

use std::collections::{HashMap, HashSet};

use crate::record::{base_name, ChangeRecord};

use super::ast::{PropertyKey, QueryExpr};

/// Context for query evaluation.
///
/// Holds the full set of loaded records, indexed by lowercased name, for
/// queries that need to look beyond the record being tested (`ancestor:`).
#[derive(Debug, Clone)]
pub struct QueryContext<'a> {
    by_name: HashMap<String, &'a ChangeRecord>,
}

impl<'a> QueryContext<'a> {
    /// Creates a new query context over all loaded records.
    ///
    /// Names are compared case-insensitively. When several records share a
    /// name, the first one wins.
    pub fn new(records: &'a [ChangeRecord]) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        for record in records {
            by_name.entry(record.name.to_lowercase()).or_insert(record);
        }
        Self { by_name }
    }

    /// Finds a record by name, ignoring case.
    pub fn find_record(&self, name: &str) -> Option<&'a ChangeRecord> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    /// Returns true if `target` is the record itself or one of its ancestors.
    ///
    /// Follows `parent` links transitively. A parent chain that revisits a
    /// name stops the walk.
    pub fn has_ancestor(&self, record: &ChangeRecord, target: &str) -> bool {
        let target = target.to_lowercase();
        let own_name = record.name.to_lowercase();
        if own_name == target {
            return true;
        }

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(own_name);

        let mut next = record.parent.as_deref();
        while let Some(parent) = next {
            let parent_key = parent.to_lowercase();
            if parent_key == target {
                return true;
            }
            if !visited.insert(parent_key) {
                tracing::debug!(
                    record = %record.name,
                    parent,
                    "parent cycle detected while resolving ancestors"
                );
                return false;
            }
            next = self
                .find_record(parent)
                .and_then(|ancestor| ancestor.parent.as_deref());
        }

        false
    }
}

/// Evaluates a parsed query against change records.
///
/// The evaluator takes a reference to a parsed [`QueryExpr`] and an optional
/// [`QueryContext`], then can test whether records match the query.
#[derive(Debug)]
pub struct QueryEvaluator<'a> {
    expr: &'a QueryExpr,
    context: Option<&'a QueryContext<'a>>,
}

impl<'a> QueryEvaluator<'a> {
    /// Creates a new query evaluator.
    ///
    /// # Arguments
    ///
    /// * `expr` - The parsed query to evaluate
    /// * `context` - All loaded records; without it `ancestor:` never matches
    pub fn new(expr: &'a QueryExpr, context: Option<&'a QueryContext<'a>>) -> Self {
        Self { expr, context }
    }

    /// Returns true if the record matches the query.
    pub fn matches(&self, record: &ChangeRecord) -> bool {
        self.evaluate_expr(self.expr, record)
    }

    /// Filters a slice of records, returning only those that match.
    pub fn filter_records<'b>(&self, records: &'b [ChangeRecord]) -> Vec<&'b ChangeRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Evaluates an expression against a record.
    fn evaluate_expr(&self, expr: &QueryExpr, record: &ChangeRecord) -> bool {
        match expr {
            QueryExpr::StringMatch {
                value,
                case_sensitive,
                is_error_suffix,
                is_running_agent,
                is_running_process,
            } => {
                if *is_error_suffix {
                    record.signals.error_suffix
                } else if *is_running_agent {
                    record.signals.running_agent
                } else if *is_running_process {
                    record.signals.running_process
                } else {
                    self.contains_text(record, value, *case_sensitive)
                }
            }

            QueryExpr::PropertyMatch { key, value } => self.matches_property(record, *key, value),

            // Boolean operators
            QueryExpr::And { operands } => operands.iter().all(|e| self.evaluate_expr(e, record)),
            QueryExpr::Or { operands } => operands.iter().any(|e| self.evaluate_expr(e, record)),
            QueryExpr::Not { operand } => !self.evaluate_expr(operand, record),
        }
    }

    /// Checks whether the record's searchable text contains `needle`.
    fn contains_text(&self, record: &ChangeRecord, needle: &str, case_sensitive: bool) -> bool {
        let haystack = record.searchable_text();
        if case_sensitive {
            haystack.contains(needle)
        } else {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
    }

    /// Checks a `key:value` property against the record.
    fn matches_property(&self, record: &ChangeRecord, key: PropertyKey, value: &str) -> bool {
        match key {
            PropertyKey::Status => record.base_status().eq_ignore_ascii_case(value),
            PropertyKey::Project => record
                .project()
                .is_some_and(|project| project.to_lowercase() == value.to_lowercase()),
            PropertyKey::Name => record.name.to_lowercase() == value.to_lowercase(),
            PropertyKey::Sibling => {
                base_name(&record.name).to_lowercase() == base_name(value).to_lowercase()
            }
            PropertyKey::Ancestor => self
                .context
                .is_some_and(|context| context.has_ancestor(record, value)),
        }
    }
}

/// Evaluates a query against one record.
///
/// `all_records` supplies the loaded record set for `ancestor:` lookups; when
/// it is `None`, ancestor matches are always false.
///
/// The name index is rebuilt on every call. To filter many records, build one
/// [`QueryContext`] and use [`QueryEvaluator::filter_records`].
pub fn evaluate(
    expr: &QueryExpr,
    record: &ChangeRecord,
    all_records: Option<&[ChangeRecord]>,
) -> bool {
    let context = all_records.map(QueryContext::new);
    QueryEvaluator::new(expr, context.as_ref()).matches(record)
}
