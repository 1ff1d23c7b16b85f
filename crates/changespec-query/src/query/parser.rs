//! Recursive descent parser for query expressions.

use super::ast::QueryExpr;
use super::error::{ParseError, QueryResult};
use super::lexer::{tokenize, Token, TokenKind};

/// Maximum number of open parentheses and stacked negations on any path.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parser for ChangeSpec query expressions.
///
/// # Grammar
///
/// ```text
/// query      ::= or_expr EOF
/// or_expr    ::= and_expr ("OR" and_expr)*
/// and_expr   ::= unary_expr (["AND"] unary_expr)*
/// unary_expr ::= "NOT"* primary
/// primary    ::= STRING | PROPERTY | shorthand | "(" or_expr ")"
/// shorthand  ::= "!!!" | "!!" | "@@@" | "!@" | "$$$" | "!$" | "*"
/// ```
///
/// Juxtaposed expressions are joined with an implicit AND, so `"a" "b"`
/// parses the same as `"a" AND "b"`.
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `NOT` / `!` - unary
/// 2. `AND` (explicit or implicit) - n-ary
/// 3. `OR` - n-ary
///
/// Nesting (open parentheses plus stacked `NOT`s) is limited to
/// [`MAX_NESTING_DEPTH`], so every AST it produces is shallow enough to
/// evaluate, render, and drop without exhausting the stack.
///
/// # Example
///
/// ```
/// use changespec_query::{parse_query, QueryExpr};
///
/// let expr = parse_query("foo OR bar").unwrap();
/// assert!(matches!(expr, QueryExpr::Or { .. }));
/// ```
pub struct QueryParser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl QueryParser {
    /// Creates a parser over a token stream produced by [`tokenize`].
    ///
    /// A stream that does not end with [`TokenKind::Eof`] is treated as if it did.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parses the whole token stream into a query expression.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for an empty query, an unexpected token, an
    /// unclosed parenthesis, trailing tokens after a complete expression, or
    /// nesting deeper than [`MAX_NESTING_DEPTH`].
    pub fn parse(mut self) -> Result<QueryExpr, ParseError> {
        if self.check(TokenKind::Eof) {
            return Err(ParseError::new("Empty query", self.current_position()));
        }

        let expr = self.parse_or_expr()?;

        // Check that we consumed all tokens
        if !self.check(TokenKind::Eof) {
            let remaining = self.describe_current();
            return Err(ParseError::new(
                format!("Unexpected {remaining} after complete expression"),
                self.current_position(),
            ));
        }

        Ok(expr)
    }

    /// Returns the current token kind, treating a missing token as `Eof`.
    fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.position)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    /// Consumes and returns the current token.
    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Checks if the current token has the expected kind.
    fn check(&self, expected: TokenKind) -> bool {
        self.peek_kind() == expected
    }

    /// Byte position of the current token (end of input when exhausted).
    fn current_position(&self) -> usize {
        match self.tokens.get(self.position) {
            Some(token) => token.position,
            None => self
                .tokens
                .last()
                .map_or(0, |token| token.position + token.text.len()),
        }
    }

    fn describe_current(&self) -> String {
        self.tokens
            .get(self.position)
            .map_or_else(|| "end of query".to_string(), Token::describe)
    }

    /// Enters one nesting level for the token at `position`.
    fn enter_nested(&mut self, position: usize) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::new("Query nested too deeply", position));
        }
        self.depth += 1;
        Ok(())
    }

    /// Returns true if the current token can begin a unary expression.
    fn starts_unary(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::String
                | TokenKind::Property
                | TokenKind::Not
                | TokenKind::LParen
                | TokenKind::ErrorSuffix
                | TokenKind::NotErrorSuffix
                | TokenKind::RunningAgent
                | TokenKind::NotRunningAgent
                | TokenKind::RunningProcess
                | TokenKind::NotRunningProcess
                | TokenKind::AnySpecial
        )
    }

    /// Parses OR expressions: `and_expr ("OR" and_expr)*`
    fn parse_or_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let first = self.parse_and_expr()?;
        let mut rest = Vec::new();

        while self.check(TokenKind::Or) {
            self.advance(); // consume OR
            rest.push(self.parse_and_expr()?);
        }

        Ok(QueryExpr::or(first, rest))
    }

    /// Parses AND expressions: `unary_expr (["AND"] unary_expr)*`
    fn parse_and_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let first = self.parse_unary_expr()?;
        let mut rest = Vec::new();

        loop {
            if self.check(TokenKind::And) {
                self.advance(); // consume AND
            } else if !self.starts_unary() {
                break;
            }
            rest.push(self.parse_unary_expr()?);
        }

        Ok(QueryExpr::and(first, rest))
    }

    /// Parses unary expressions: `"NOT"* primary`
    fn parse_unary_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let mut negations = 0usize;
        while self.check(TokenKind::Not) {
            self.enter_nested(self.current_position())?;
            self.advance(); // consume NOT
            negations += 1;
        }

        let mut expr = self.parse_primary()?;
        for _ in 0..negations {
            expr = QueryExpr::negate(expr);
        }
        self.depth -= negations;
        Ok(expr)
    }

    /// Parses primary expressions, desugaring the shorthand tokens.
    fn parse_primary(&mut self) -> Result<QueryExpr, ParseError> {
        let position = self.current_position();
        let description = self.describe_current();
        let Some(token) = self.advance().cloned() else {
            return Err(ParseError::new("Unexpected end of query", position));
        };

        match token.kind {
            TokenKind::String => Ok(QueryExpr::string(token.text, token.case_sensitive)),

            TokenKind::Property => match token.property_key {
                Some(key) => Ok(QueryExpr::property(key, token.text)),
                None => Err(ParseError::new(
                    format!("Property token without a key: {description}"),
                    position,
                )),
            },

            TokenKind::ErrorSuffix => Ok(QueryExpr::error_suffix()),
            TokenKind::NotErrorSuffix => Ok(QueryExpr::negate(QueryExpr::error_suffix())),
            TokenKind::RunningAgent => Ok(QueryExpr::running_agent()),
            TokenKind::NotRunningAgent => Ok(QueryExpr::negate(QueryExpr::running_agent())),
            TokenKind::RunningProcess => Ok(QueryExpr::running_process()),
            TokenKind::NotRunningProcess => Ok(QueryExpr::negate(QueryExpr::running_process())),
            TokenKind::AnySpecial => Ok(QueryExpr::any_special()),

            // Parenthesized expression
            TokenKind::LParen => {
                self.enter_nested(position)?;
                let inner = self.parse_or_expr()?;
                if !self.check(TokenKind::RParen) {
                    return Err(ParseError::new(
                        format!(
                            "Expected ')' to close '(' at position {position}, found {}",
                            self.describe_current()
                        ),
                        self.current_position(),
                    ));
                }
                self.advance(); // consume ')'
                self.depth -= 1;
                Ok(inner)
            }

            // Unexpected tokens
            TokenKind::Eof => {
                // Leave EOF in place so callers still see the end of input.
                self.position -= 1;
                Err(ParseError::new("Unexpected end of query", position))
            }
            TokenKind::And | TokenKind::Or | TokenKind::Not | TokenKind::RParen => Err(
                ParseError::new(format!("Unexpected {description}"), position),
            ),
        }
    }
}

/// Parses query text into an AST, tokenizing it first.
///
/// # Errors
///
/// Returns [`QueryError::Tokenize`](super::QueryError::Tokenize) for malformed
/// lexemes and [`QueryError::Parse`](super::QueryError::Parse) for invalid
/// token sequences.
pub fn parse_query(query: &str) -> QueryResult<QueryExpr> {
    let tokens = tokenize(query)?;
    let expr = QueryParser::new(tokens).parse()?;
    tracing::trace!(query, canonical = %expr, "parsed query");
    Ok(expr)
}
