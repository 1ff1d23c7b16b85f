//! Query output formatting (canonical, tokens, check).

use changespec_query::{Token, TokenKind};
use owo_colors::OwoColorize;
use serde::Serialize;

/// JSON output structure for the canonical command.
#[derive(Serialize)]
pub struct CanonicalOutput<'a> {
    pub query: &'a str,
    pub canonical: &'a str,
}

/// Formats a canonicalized query as JSON.
pub fn format_canonical_json(query: &str, canonical: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&CanonicalOutput { query, canonical })
}

/// JSON output structure for a single token.
#[derive(Serialize)]
pub struct TokenOutput<'a> {
    pub kind: String,
    pub text: &'a str,
    pub position: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub case_sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<&'static str>,
}

/// Returns the display name of a token kind.
fn kind_name(kind: TokenKind) -> String {
    format!("{kind:?}")
}

/// Formats a token stream as JSON.
pub fn format_tokens_json(tokens: &[Token]) -> Result<String, serde_json::Error> {
    let output: Vec<TokenOutput> = tokens
        .iter()
        .map(|t| TokenOutput {
            kind: kind_name(t.kind),
            text: &t.text,
            position: t.position,
            case_sensitive: t.case_sensitive,
            property: t.property_key.map(|k| k.as_str()),
        })
        .collect();

    serde_json::to_string_pretty(&output)
}

/// Formats a token stream as a table.
pub fn format_tokens_table(tokens: &[Token], use_colors: bool) -> String {
    let mut output = String::new();

    let header = format!("{:<5} {:<18} {}", "Pos", "Kind", "Value");
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for token in tokens {
        let value = match (token.kind, token.property_key) {
            (TokenKind::Property, Some(key)) => format!("{key}:{}", token.text),
            (TokenKind::String, _) if token.case_sensitive => format!("c{:?}", token.text),
            (TokenKind::String, _) => format!("{:?}", token.text),
            _ => token.text.clone(),
        };
        let line = format!("{:<5} {:<18} {}", token.position, kind_name(token.kind), value);
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output
}

/// Formats the result of a successful check.
pub fn format_check_ok(canonical: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{} {canonical}\n", "✓".green())
    } else {
        format!("OK: {canonical}\n")
    }
}
