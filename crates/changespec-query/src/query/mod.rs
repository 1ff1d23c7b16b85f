//! Query language parser and evaluator for ChangeSpec records.
//!
//! # Supported Syntax
//!
//! ## Text
//! - `foo`, `"foo bar"` - Case-insensitive substring of the name or description
//! - `c"Foo"` - Case-sensitive substring
//!
//! ## Properties
//! - `status:DRAFTED` - Status, ignoring workspace and ready-to-mail suffixes
//!   (shorthands `%d`, `%m`, `%r`, `%s`, `%w`)
//! - `project:name` - Project the record belongs to (shorthand `+name`)
//! - `ancestor:name` - The record or any of its parents (shorthand `^name`)
//! - `name:name` - Exact record name (shorthand `&name`)
//! - `sibling:name` - Same base name, ignoring a `__<N>` suffix
//!
//! ## Special Markers
//! - `!!!` (or a lone `!`) - Has an error suffix; `!!` negates it
//! - `@@@` (or a lone `@`) - Has a running agent; `!@` negates it
//! - `$$$` (or a lone `$`) - Has a running process; `!$` negates it
//! - `*` - Any of the three
//!
//! ## Boolean Operators
//! - `AND` (or juxtaposition), `OR`, `NOT` / `!` - case-insensitive
//! - `()` - Grouping
//!
//! # Example
//!
//! ```
//! use changespec_query::query::{parse_query, to_canonical_string, QueryExpr, PropertyKey};
//!
//! let expr = parse_query("%d foo").unwrap();
//! assert_eq!(
//!     expr,
//!     QueryExpr::And {
//!         operands: vec![
//!             QueryExpr::property(PropertyKey::Status, "DRAFTED"),
//!             QueryExpr::string("foo", false),
//!         ],
//!     }
//! );
//! assert_eq!(to_canonical_string(&expr), "status:DRAFTED AND \"foo\"");
//! ```

mod ast;
mod canonical;
mod error;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{
    PropertyKey, QueryExpr, ERROR_SUFFIX_QUERY, RUNNING_AGENT_QUERY, RUNNING_PROCESS_QUERY,
};
pub use canonical::to_canonical_string;
pub use error::{ParseError, QueryError, QueryResult, TokenizerError};
pub use evaluator::{evaluate, QueryContext, QueryEvaluator};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use parser::{parse_query, QueryParser, MAX_NESTING_DEPTH};
