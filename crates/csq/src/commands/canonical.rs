//! Canonical command implementation.
//!
//! Prints the shorthand-free canonical form of a query.

use changespec_query::{parse_query, to_canonical_string};

use super::{CommandContext, CommandError, Result};
use crate::output::format_canonical_json;

/// Executes the canonical command.
pub fn execute(ctx: &CommandContext, query: &str) -> Result<()> {
    let canonical = canonicalize(query)?;

    if ctx.json_output {
        println!("{}", format_canonical_json(query, &canonical)?);
    } else {
        println!("{canonical}");
    }

    Ok(())
}

/// Parses `query` and renders it canonically.
pub fn canonicalize(query: &str) -> Result<String> {
    let expr = parse_query(query).map_err(|e| CommandError::query(query, e))?;
    Ok(to_canonical_string(&expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("%d foo").unwrap(), "status:DRAFTED AND \"foo\"");
        assert_eq!(canonicalize("+p !!").unwrap(), "project:p AND !!");
    }

    #[test]
    fn test_canonicalize_error_keeps_query() {
        let err = canonicalize("(foo").unwrap_err();
        match err {
            CommandError::Query { query, source } => {
                assert_eq!(query, "(foo");
                assert_eq!(source.position(), 4);
            }
            other => panic!("expected query error, got {other:?}"),
        }
    }
}
