//! Query language for filtering ChangeSpec change records.
//!
//! This crate provides the tokenizer, parser, evaluator, and canonicalizer
//! for the ChangeSpec query language, along with the [`ChangeRecord`] view
//! of a change that queries are evaluated against.
//!
//! The record store itself (loading project files, locking, writes) lives
//! outside this crate; callers hand in already-materialized records.
//!
//! # Example
//!
//! ```
//! use changespec_query::{evaluate, parse_query, to_canonical_string, ChangeRecord};
//!
//! let expr = parse_query("%d AND \"foo\"").unwrap();
//! assert_eq!(to_canonical_string(&expr), "status:DRAFTED AND \"foo\"");
//!
//! let record = ChangeRecord::new("my_change", "Drafted", "/projects/myproj/myproj.gp")
//!     .with_description("fix the foo widget");
//! assert!(evaluate(&expr, &record, None));
//! ```

pub mod query;
mod record;

pub use query::{
    evaluate, parse_query, to_canonical_string, tokenize, ParseError, PropertyKey, QueryContext,
    QueryError, QueryEvaluator, QueryExpr, QueryResult, Token, TokenKind, TokenizerError,
    MAX_NESTING_DEPTH,
};
pub use record::{base_name, ChangeRecord, RecordSignals};
