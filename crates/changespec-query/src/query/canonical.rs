//! Canonical text rendering of query expressions.
//!
//! The canonical form is shorthand-free and deterministic, so it can be used
//! as a stable cache key or for display. Parsing a canonical string and
//! rendering it again yields the same text.

use super::ast::{QueryExpr, ERROR_SUFFIX_QUERY, RUNNING_AGENT_QUERY, RUNNING_PROCESS_QUERY};
use super::lexer::is_word_char;

/// Renders a query expression as canonical query text.
///
/// # Example
///
/// ```
/// use changespec_query::{parse_query, to_canonical_string};
///
/// let expr = parse_query("+myproj %m").unwrap();
/// assert_eq!(to_canonical_string(&expr), "project:myproj AND status:MAILED");
/// ```
pub fn to_canonical_string(expr: &QueryExpr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

fn write_expr(out: &mut String, expr: &QueryExpr) {
    match expr {
        QueryExpr::StringMatch { .. } => write_string_match(out, expr),

        QueryExpr::PropertyMatch { key, value } => {
            out.push_str(key.as_str());
            out.push(':');
            if is_bare_value(value) {
                out.push_str(value);
            } else {
                write_quoted(out, value);
            }
        }

        QueryExpr::And { operands } => {
            for (i, operand) in operands.iter().enumerate() {
                if i > 0 {
                    out.push_str(" AND ");
                }
                if matches!(operand, QueryExpr::Or { .. }) {
                    write_grouped(out, operand);
                } else {
                    write_expr(out, operand);
                }
            }
        }

        QueryExpr::Or { operands } => {
            for (i, operand) in operands.iter().enumerate() {
                if i > 0 {
                    out.push_str(" OR ");
                }
                write_expr(out, operand);
            }
        }

        QueryExpr::Not { operand } => match sentinel_negation(operand) {
            Some(marker) => out.push_str(marker),
            None => {
                let mut inner = String::new();
                if matches!(**operand, QueryExpr::And { .. } | QueryExpr::Or { .. }) {
                    write_grouped(&mut inner, operand);
                } else {
                    write_expr(&mut inner, operand);
                }
                // A third `!` would lex as the `!!!` error-suffix marker.
                if inner.starts_with("!!") {
                    out.push_str("NOT ");
                } else {
                    out.push('!');
                }
                out.push_str(&inner);
            }
        },
    }
}

fn write_string_match(out: &mut String, expr: &QueryExpr) {
    let QueryExpr::StringMatch {
        value,
        case_sensitive,
        is_error_suffix,
        is_running_agent,
        is_running_process,
    } = expr
    else {
        return;
    };

    if *is_error_suffix {
        out.push_str(ERROR_SUFFIX_QUERY);
    } else if *is_running_agent {
        out.push_str(RUNNING_AGENT_QUERY);
    } else if *is_running_process {
        out.push_str(RUNNING_PROCESS_QUERY);
    } else {
        if *case_sensitive {
            out.push('c');
        }
        write_quoted(out, value);
    }
}

/// The dedicated negated marker for a sentinel match (`!!`, `!@`, `!$`).
fn sentinel_negation(operand: &QueryExpr) -> Option<&'static str> {
    match operand {
        QueryExpr::StringMatch {
            is_error_suffix: true,
            ..
        } => Some("!!"),
        QueryExpr::StringMatch {
            is_running_agent: true,
            ..
        } => Some("!@"),
        QueryExpr::StringMatch {
            is_running_process: true,
            ..
        } => Some("!$"),
        _ => None,
    }
}

fn write_grouped(out: &mut String, expr: &QueryExpr) {
    out.push('(');
    write_expr(out, expr);
    out.push(')');
}

/// Property values made only of identifier characters need no quotes.
fn is_bare_value(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_word_char)
}

fn write_quoted(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
}
