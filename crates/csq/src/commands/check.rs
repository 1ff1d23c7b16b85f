//! Check command implementation.
//!
//! Validates a query. Errors are reported by the caller with a caret under
//! the offending position.

use super::canonical::canonicalize;
use super::{CommandContext, Result};
use crate::output::format_check_ok;

/// Executes the check command.
pub fn execute(ctx: &CommandContext, query: &str) -> Result<()> {
    let canonical = canonicalize(query)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "valid": true,
            "query": query,
            "canonical": canonical,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        print!("{}", format_check_ok(&canonical, ctx.use_colors));
    }

    Ok(())
}
