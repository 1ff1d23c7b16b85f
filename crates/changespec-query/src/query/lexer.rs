//! Lexer (tokenizer) for query expressions.

use strsim::levenshtein;

use super::ast::PropertyKey;
use super::error::TokenizerError;

/// Maximum edit distance for "did you mean" suggestions on property keys.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// The kind of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A quoted string or bare word.
    String,
    /// A `key:value` property, or one of the `%x`, `+`, `^`, `&` shorthands.
    Property,
    /// The `AND` keyword.
    And,
    /// The `OR` keyword.
    Or,
    /// The `NOT` keyword, or a `!` prefixing a primary expression.
    Not,
    /// `!!!` or a standalone `!`.
    ErrorSuffix,
    /// A standalone `!!`.
    NotErrorSuffix,
    /// `@@@` or a standalone `@`.
    RunningAgent,
    /// A standalone `!@`.
    NotRunningAgent,
    /// `$$$` or a standalone `$`.
    RunningProcess,
    /// A standalone `!$`.
    NotRunningProcess,
    /// A standalone `*`.
    AnySpecial,
    /// Opening parenthesis `(`.
    LParen,
    /// Closing parenthesis `)`.
    RParen,
    /// End of input.
    Eof,
}

/// A token with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The string value for strings and properties, the source text otherwise.
    pub text: String,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
    /// Set for `c"..."` strings.
    pub case_sensitive: bool,
    /// The property addressed by a `Property` token.
    pub property_key: Option<PropertyKey>,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
            case_sensitive: false,
            property_key: None,
        }
    }

    fn property(key: PropertyKey, value: impl Into<String>, position: usize) -> Self {
        Self {
            kind: TokenKind::Property,
            text: value.into(),
            position,
            case_sensitive: false,
            property_key: Some(key),
        }
    }

    /// Returns a short description of the token for error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of query".to_string(),
            TokenKind::String => format!("string \"{}\"", self.text),
            TokenKind::Property => match self.property_key {
                Some(key) => format!("property '{}:{}'", key, self.text),
                None => format!("property '{}'", self.text),
            },
            _ => format!("'{}'", self.text),
        }
    }
}

/// Expands a `%x` status shorthand letter.
fn status_shorthand(letter: char) -> Option<&'static str> {
    match letter.to_ascii_lowercase() {
        'd' => Some("DRAFTED"),
        'm' => Some("MAILED"),
        'r' => Some("REVERTED"),
        's' => Some("SUBMITTED"),
        'w' => Some("WIP"),
        _ => None,
    }
}

/// Returns true for characters that may start a bare word.
fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Returns true for characters that may continue a bare word.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Suggests the closest known property key for a misspelled one.
fn suggest_property_key(word: &str) -> Option<&'static str> {
    let word = word.to_ascii_lowercase();
    PropertyKey::ALL
        .iter()
        .map(|key| (key.as_str(), levenshtein(&word, key.as_str())))
        .min_by_key(|(_, distance)| *distance)
        .filter(|(_, distance)| *distance <= MAX_SUGGESTION_DISTANCE)
        .map(|(name, _)| name)
}

/// Lexer for tokenizing query expressions.
pub struct Lexer<'a> {
    input: &'a str,
    /// Current byte position in the input string.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Peeks at the next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// Peeks at the byte `offset` bytes past the current position.
    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.position + offset).copied()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    /// Returns true if the remaining input starts with `pattern`.
    fn lookahead(&self, pattern: &str) -> bool {
        self.input[self.position..].starts_with(pattern)
    }

    /// Returns true if a marker of `len` bytes is followed by end of input,
    /// whitespace, or a closing parenthesis.
    fn is_standalone(&self, len: usize) -> bool {
        match self.input[self.position + len..].chars().next() {
            None => true,
            Some(c) => c.is_whitespace() || c == ')',
        }
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Reads a run of identifier characters (`[A-Za-z0-9_-]*`).
    fn read_identifier(&mut self) -> &'a str {
        let input = self.input;
        let start = self.position;
        while let Some(c) = self.peek() {
            if is_word_char(c) {
                self.next_char();
            } else {
                break;
            }
        }
        &input[start..self.position]
    }

    /// Reads a double-quoted string, with the cursor on the opening quote.
    fn read_quoted_string(&mut self) -> Result<String, TokenizerError> {
        let start = self.position;
        // Consume the opening quote
        self.next_char();

        let mut result = String::new();
        loop {
            let escape_position = self.position;
            match self.next_char() {
                None => return Err(TokenizerError::new("Unterminated string", start)),
                Some('"') => return Ok(result),
                Some('\\') => match self.next_char() {
                    Some('n') => result.push('\n'),
                    Some('r') => result.push('\r'),
                    Some('t') => result.push('\t'),
                    // `\\`, `\"` and any other escaped character stand for themselves.
                    Some(escaped) => result.push(escaped),
                    None => {
                        return Err(TokenizerError::new(
                            "Unterminated escape sequence",
                            escape_position,
                        ))
                    }
                },
                Some(c) => result.push(c),
            }
        }
    }

    /// Reads a property value: a quoted string or a run of identifier characters.
    fn read_property_value(&mut self, key: PropertyKey) -> Result<String, TokenizerError> {
        if self.peek() == Some('"') {
            return self.read_quoted_string();
        }

        let value = self.read_identifier();
        if value.is_empty() {
            return Err(TokenizerError::new(
                format!("Expected value after '{key}:'"),
                self.position,
            ));
        }
        Ok(value.to_string())
    }

    /// Reads the operand of a `+`, `^` or `&` sigil.
    fn read_sigil_operand(&mut self, sigil: char, what: &str) -> Result<String, TokenizerError> {
        let sigil_position = self.position;
        self.next_char();

        let value = self.read_identifier();
        if value.is_empty() {
            return Err(TokenizerError::new(
                format!("Expected {what} after '{sigil}'"),
                sigil_position,
            ));
        }
        Ok(value.to_string())
    }

    /// Consumes a marker of `len` bytes and returns it as a token.
    fn marker(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.position;
        self.position += len;
        Token::new(kind, &self.input[start..self.position], start)
    }

    fn unexpected_character(&self, c: char) -> TokenizerError {
        TokenizerError::new(format!("Unexpected character '{c}'"), self.position)
    }

    /// Lexes a token beginning with `!`.
    fn lex_bang(&mut self) -> Token {
        if self.lookahead("!!!") {
            return self.marker(TokenKind::ErrorSuffix, 3);
        }
        if self.lookahead("!!") && self.is_standalone(2) {
            return self.marker(TokenKind::NotErrorSuffix, 2);
        }
        if self.lookahead("!@") && self.is_standalone(2) {
            return self.marker(TokenKind::NotRunningAgent, 2);
        }
        if self.lookahead("!$") && self.is_standalone(2) {
            return self.marker(TokenKind::NotRunningProcess, 2);
        }
        if self.is_standalone(1) {
            return self.marker(TokenKind::ErrorSuffix, 1);
        }
        self.marker(TokenKind::Not, 1)
    }

    /// Lexes `@@@`/`@` or `$$$`/`$`.
    fn lex_repeated_marker(&mut self, c: char, kind: TokenKind) -> Result<Token, TokenizerError> {
        let triple = c.to_string().repeat(3);
        if self.lookahead(&triple) {
            return Ok(self.marker(kind, 3));
        }
        if self.is_standalone(1) {
            return Ok(self.marker(kind, 1));
        }
        Err(self.unexpected_character(c))
    }

    /// Lexes a `%x` status shorthand.
    fn lex_status_shorthand(&mut self) -> Result<Token, TokenizerError> {
        let start = self.position;
        self.next_char();

        let letter = self.peek();
        match letter.and_then(status_shorthand) {
            Some(status) => {
                self.next_char();
                Ok(Token::property(PropertyKey::Status, status, start))
            }
            None => {
                let shown = letter.map(|c| format!("%{c}")).unwrap_or_else(|| "%".to_string());
                Err(TokenizerError::new(
                    format!("Invalid status shorthand '{shown}' (expected one of %d, %m, %r, %s, %w)"),
                    start,
                ))
            }
        }
    }

    /// Lexes a bare word: a property, a keyword, or a plain string.
    fn lex_word(&mut self) -> Result<Token, TokenizerError> {
        let start = self.position;
        let word = self.read_identifier();

        if self.peek() == Some(':') {
            let Some(key) = PropertyKey::from_name(word) else {
                let message = match suggest_property_key(word) {
                    Some(suggestion) => {
                        format!("Unknown property key '{word}' (did you mean '{suggestion}'?)")
                    }
                    None => format!(
                        "Unknown property key '{word}' (expected status, project, ancestor, name, or sibling)"
                    ),
                };
                return Err(TokenizerError::new(message, start));
            };
            self.next_char(); // consume ':'
            let value = self.read_property_value(key)?;
            return Ok(Token::property(key, value, start));
        }

        let kind = match word.to_ascii_uppercase().as_str() {
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            _ => TokenKind::String,
        };
        Ok(Token::new(kind, word, start))
    }

    /// Returns the next token, or `Eof` at end of input.
    pub fn next_token(&mut self) -> Result<Token, TokenizerError> {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", self.position));
        };
        let token_start = self.position;

        match c {
            '(' => Ok(self.marker(TokenKind::LParen, 1)),
            ')' => Ok(self.marker(TokenKind::RParen, 1)),

            '"' => {
                let value = self.read_quoted_string()?;
                Ok(Token::new(TokenKind::String, value, token_start))
            }

            // Case-sensitive string
            'c' if self.peek_byte(1) == Some(b'"') => {
                self.next_char(); // consume 'c'
                let value = self.read_quoted_string()?;
                let mut token = Token::new(TokenKind::String, value, token_start);
                token.case_sensitive = true;
                Ok(token)
            }

            '!' => Ok(self.lex_bang()),
            '@' => self.lex_repeated_marker('@', TokenKind::RunningAgent),
            '$' => self.lex_repeated_marker('$', TokenKind::RunningProcess),
            '*' if self.is_standalone(1) => Ok(self.marker(TokenKind::AnySpecial, 1)),

            '%' => self.lex_status_shorthand(),
            '+' => {
                let value = self.read_sigil_operand('+', "project name")?;
                Ok(Token::property(PropertyKey::Project, value, token_start))
            }
            '^' => {
                let value = self.read_sigil_operand('^', "ancestor name")?;
                Ok(Token::property(PropertyKey::Ancestor, value, token_start))
            }
            '&' => {
                let value = self.read_sigil_operand('&', "name")?;
                Ok(Token::property(PropertyKey::Name, value, token_start))
            }

            _ if is_word_start(c) => self.lex_word(),

            _ => Err(self.unexpected_character(c)),
        }
    }

    /// Collects all tokens, ending with a single `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, TokenizerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

/// Tokenizes a query string.
///
/// The returned vector always ends with exactly one [`TokenKind::Eof`] token.
pub fn tokenize(query: &str) -> Result<Vec<Token>, TokenizerError> {
    Lexer::new(query).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(query: &str) -> Vec<TokenKind> {
        tokenize(query)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn single(query: &str) -> Token {
        let mut tokens = tokenize(query).unwrap();
        assert_eq!(tokens.len(), 2, "expected one token plus EOF for {query:?}");
        tokens.remove(0)
    }

    fn error(query: &str) -> TokenizerError {
        tokenize(query).unwrap_err()
    }

    #[test]
    fn test_tokenize_empty() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   \t\n"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_tokenize_quoted_string() {
        let token = single("\"hello world\"");
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.text, "hello world");
        assert!(!token.case_sensitive);
        assert_eq!(token.position, 0);
    }

    #[test]
    fn test_tokenize_escapes() {
        let token = single(r#""a\"b\\c\nd\re\tf""#);
        assert_eq!(token.text, "a\"b\\c\nd\re\tf");
    }

    #[test]
    fn test_tokenize_unterminated_string() {
        let err = error("foo \"bar");
        assert_eq!(err.message, "Unterminated string");
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_tokenize_unterminated_escape() {
        let err = error("\"bar\\");
        assert_eq!(err.message, "Unterminated escape sequence");
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_tokenize_case_sensitive_string() {
        let token = single("c\"FooBar\"");
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.text, "FooBar");
        assert!(token.case_sensitive);
    }

    #[test]
    fn test_tokenize_bare_c_is_a_word() {
        let token = single("c");
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.text, "c");

        let token = single("cat");
        assert_eq!(token.text, "cat");
    }

    #[test]
    fn test_tokenize_bare_word() {
        let token = single("my_change-2");
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.text, "my_change-2");
        assert!(!token.case_sensitive);
    }

    #[test]
    fn test_tokenize_keywords_case_insensitive() {
        assert_eq!(
            kinds("a AND b or c Not d"),
            vec![
                TokenKind::String,
                TokenKind::And,
                TokenKind::String,
                TokenKind::Or,
                TokenKind::String,
                TokenKind::Not,
                TokenKind::String,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_quoted_keyword_is_string() {
        let token = single("\"AND\"");
        assert_eq!(token.kind, TokenKind::String);
    }

    #[test]
    fn test_tokenize_property() {
        let token = single("status:Drafted");
        assert_eq!(token.kind, TokenKind::Property);
        assert_eq!(token.property_key, Some(PropertyKey::Status));
        assert_eq!(token.text, "Drafted");
    }

    #[test]
    fn test_tokenize_property_key_case_insensitive() {
        let token = single("SIBLING:foo__2");
        assert_eq!(token.property_key, Some(PropertyKey::Sibling));
        assert_eq!(token.text, "foo__2");
    }

    #[test]
    fn test_tokenize_property_quoted_value() {
        let token = single("project:\"my project\"");
        assert_eq!(token.property_key, Some(PropertyKey::Project));
        assert_eq!(token.text, "my project");
    }

    #[test]
    fn test_tokenize_property_missing_value() {
        let err = error("status: foo");
        assert_eq!(err.message, "Expected value after 'status:'");
        assert_eq!(err.position, 7);
    }

    #[test]
    fn test_tokenize_unknown_property_key() {
        let err = error("owner:bob");
        assert!(err.message.starts_with("Unknown property key 'owner'"));
        assert_eq!(err.position, 0);
    }

    #[test]
    fn test_tokenize_unknown_property_key_suggestion() {
        let err = error("x stauts:foo");
        assert_eq!(
            err.message,
            "Unknown property key 'stauts' (did you mean 'status'?)"
        );
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_tokenize_error_suffix_markers() {
        assert_eq!(kinds("!!!"), vec![TokenKind::ErrorSuffix, TokenKind::Eof]);
        assert_eq!(kinds("!"), vec![TokenKind::ErrorSuffix, TokenKind::Eof]);
        assert_eq!(kinds("!!"), vec![TokenKind::NotErrorSuffix, TokenKind::Eof]);
        assert_eq!(
            kinds("!! foo"),
            vec![TokenKind::NotErrorSuffix, TokenKind::String, TokenKind::Eof]
        );
    }

    #[test]
    fn test_tokenize_not_prefix() {
        assert_eq!(
            kinds("!\"foo\""),
            vec![TokenKind::Not, TokenKind::String, TokenKind::Eof]
        );
        assert_eq!(
            kinds("!!\"foo\""),
            vec![TokenKind::Not, TokenKind::Not, TokenKind::String, TokenKind::Eof]
        );
        assert_eq!(
            kinds("!status:WIP"),
            vec![TokenKind::Not, TokenKind::Property, TokenKind::Eof]
        );
    }

    #[test]
    fn test_tokenize_not_running_markers() {
        assert_eq!(kinds("!@"), vec![TokenKind::NotRunningAgent, TokenKind::Eof]);
        assert_eq!(kinds("!$"), vec![TokenKind::NotRunningProcess, TokenKind::Eof]);
        assert_eq!(
            kinds("!@@@"),
            vec![TokenKind::Not, TokenKind::RunningAgent, TokenKind::Eof]
        );
    }

    #[test]
    fn test_tokenize_running_markers() {
        assert_eq!(kinds("@"), vec![TokenKind::RunningAgent, TokenKind::Eof]);
        assert_eq!(kinds("@@@"), vec![TokenKind::RunningAgent, TokenKind::Eof]);
        assert_eq!(kinds("$"), vec![TokenKind::RunningProcess, TokenKind::Eof]);
        assert_eq!(kinds("$$$"), vec![TokenKind::RunningProcess, TokenKind::Eof]);
    }

    #[test]
    fn test_tokenize_markers_before_close_paren() {
        assert_eq!(
            kinds("(@ OR !!)"),
            vec![
                TokenKind::LParen,
                TokenKind::RunningAgent,
                TokenKind::Or,
                TokenKind::NotErrorSuffix,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_running_marker_not_standalone() {
        let err = error("@foo");
        assert_eq!(err.message, "Unexpected character '@'");
        assert_eq!(err.position, 0);

        let err = error("a @@");
        assert_eq!(err.position, 2);

        let err = error("$x");
        assert_eq!(err.message, "Unexpected character '$'");
    }

    #[test]
    fn test_tokenize_any_special() {
        assert_eq!(kinds("*"), vec![TokenKind::AnySpecial, TokenKind::Eof]);
        let err = error("*foo");
        assert_eq!(err.message, "Unexpected character '*'");
    }

    #[test]
    fn test_tokenize_status_shorthands() {
        for (query, status) in [
            ("%d", "DRAFTED"),
            ("%M", "MAILED"),
            ("%r", "REVERTED"),
            ("%s", "SUBMITTED"),
            ("%w", "WIP"),
        ] {
            let token = single(query);
            assert_eq!(token.kind, TokenKind::Property);
            assert_eq!(token.property_key, Some(PropertyKey::Status));
            assert_eq!(token.text, status);
        }
    }

    #[test]
    fn test_tokenize_invalid_status_shorthand() {
        let err = error("foo %x");
        assert!(err.message.starts_with("Invalid status shorthand '%x'"));
        assert_eq!(err.position, 4);

        let err = error("%");
        assert!(err.message.starts_with("Invalid status shorthand '%'"));
    }

    #[test]
    fn test_tokenize_sigil_shorthands() {
        let token = single("+myproj");
        assert_eq!(token.property_key, Some(PropertyKey::Project));
        assert_eq!(token.text, "myproj");

        let token = single("^parent_cl");
        assert_eq!(token.property_key, Some(PropertyKey::Ancestor));
        assert_eq!(token.text, "parent_cl");

        let token = single("&exact-name");
        assert_eq!(token.property_key, Some(PropertyKey::Name));
        assert_eq!(token.text, "exact-name");
    }

    #[test]
    fn test_tokenize_sigil_missing_operand() {
        let err = error("+");
        assert_eq!(err.message, "Expected project name after '+'");

        let err = error("a ^ b");
        assert_eq!(err.message, "Expected ancestor name after '^'");
        assert_eq!(err.position, 2);

        let err = error("& foo");
        assert_eq!(err.message, "Expected name after '&'");
    }

    #[test]
    fn test_tokenize_parentheses() {
        assert_eq!(
            kinds("(a OR b) c"),
            vec![
                TokenKind::LParen,
                TokenKind::String,
                TokenKind::Or,
                TokenKind::String,
                TokenKind::RParen,
                TokenKind::String,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_unexpected_character() {
        let err = error("foo # bar");
        assert_eq!(err.message, "Unexpected character '#'");
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_tokenize_unexpected_multibyte_character() {
        let err = error("\"é\" ü");
        assert_eq!(err.message, "Unexpected character 'ü'");
        assert_eq!(err.position, 5);
    }

    #[test]
    fn test_tokenize_positions() {
        let tokens = tokenize("%d AND \"foo\"").unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 3, 7, 12]);
    }

    #[test]
    fn test_token_describe() {
        let tokens = tokenize("\"a\" status:x ) ").unwrap();
        assert_eq!(tokens[0].describe(), "string \"a\"");
        assert_eq!(tokens[1].describe(), "property 'status:x'");
        assert_eq!(tokens[2].describe(), "')'");
        assert_eq!(tokens[3].describe(), "end of query");
    }
}
