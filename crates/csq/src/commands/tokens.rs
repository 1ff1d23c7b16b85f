//! Tokens command implementation.
//!
//! Prints the token stream of a query, for debugging query syntax.

use changespec_query::{tokenize, QueryError};

use super::{CommandContext, CommandError, Result};
use crate::output::{format_tokens_json, format_tokens_table};

/// Executes the tokens command.
pub fn execute(ctx: &CommandContext, query: &str) -> Result<()> {
    let tokens =
        tokenize(query).map_err(|e| CommandError::query(query, QueryError::Tokenize(e)))?;

    if ctx.json_output {
        println!("{}", format_tokens_json(&tokens)?);
    } else if !ctx.quiet {
        print!("{}", format_tokens_table(&tokens, ctx.use_colors));
    }

    Ok(())
}
