//! Abstract Syntax Tree (AST) for query expressions.

use std::fmt;

/// Sentinel value substituted for the error-suffix shorthand (`!!!`).
pub const ERROR_SUFFIX_QUERY: &str = "!!!";

/// Sentinel value substituted for the running-agent shorthand (`@@@`).
pub const RUNNING_AGENT_QUERY: &str = "@@@";

/// Sentinel value substituted for the running-process shorthand (`$$$`).
pub const RUNNING_PROCESS_QUERY: &str = "$$$";

/// A record property addressable with `key:value` syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// `status:` (shorthand `%d`, `%m`, ...).
    Status,
    /// `project:` (shorthand `+name`).
    Project,
    /// `ancestor:` (shorthand `^name`).
    Ancestor,
    /// `name:` (shorthand `&name`).
    Name,
    /// `sibling:`.
    Sibling,
}

impl PropertyKey {
    /// All property keys, in declaration order.
    pub const ALL: [PropertyKey; 5] = [
        PropertyKey::Status,
        PropertyKey::Project,
        PropertyKey::Ancestor,
        PropertyKey::Name,
        PropertyKey::Sibling,
    ];

    /// Looks up a property key by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "status" => Some(PropertyKey::Status),
            "project" => Some(PropertyKey::Project),
            "ancestor" => Some(PropertyKey::Ancestor),
            "name" => Some(PropertyKey::Name),
            "sibling" => Some(PropertyKey::Sibling),
            _ => None,
        }
    }

    /// Returns the canonical lowercase name used in `key:value` syntax.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKey::Status => "status",
            PropertyKey::Project => "project",
            PropertyKey::Ancestor => "ancestor",
            PropertyKey::Name => "name",
            PropertyKey::Sibling => "sibling",
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a parsed query expression.
///
/// `And` and `Or` always hold at least two operands; the parser returns a
/// lone operand unwrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryExpr {
    /// Substring match against the record text, or one of the sentinel checks.
    StringMatch {
        /// The text to search for (or a sentinel value).
        value: String,
        /// Match case exactly (`c"..."`).
        case_sensitive: bool,
        /// Matches records with an error suffix (`!!!`).
        is_error_suffix: bool,
        /// Matches records with a running agent (`@@@`).
        is_running_agent: bool,
        /// Matches records with a running process (`$$$`).
        is_running_process: bool,
    },

    /// Exact match against a record property.
    PropertyMatch {
        /// Which property to compare.
        key: PropertyKey,
        /// The value to compare against.
        value: String,
    },

    /// Logical AND of two or more expressions.
    And {
        /// The operands, evaluated left to right.
        operands: Vec<QueryExpr>,
    },

    /// Logical OR of two or more expressions.
    Or {
        /// The operands, evaluated left to right.
        operands: Vec<QueryExpr>,
    },

    /// Logical NOT of an expression.
    Not {
        /// The negated expression.
        operand: Box<QueryExpr>,
    },
}

impl QueryExpr {
    /// Creates a plain string match.
    pub fn string(value: impl Into<String>, case_sensitive: bool) -> Self {
        QueryExpr::StringMatch {
            value: value.into(),
            case_sensitive,
            is_error_suffix: false,
            is_running_agent: false,
            is_running_process: false,
        }
    }

    /// Creates the sentinel match for the error-suffix shorthand.
    pub fn error_suffix() -> Self {
        QueryExpr::StringMatch {
            value: ERROR_SUFFIX_QUERY.to_string(),
            case_sensitive: false,
            is_error_suffix: true,
            is_running_agent: false,
            is_running_process: false,
        }
    }

    /// Creates the sentinel match for the running-agent shorthand.
    pub fn running_agent() -> Self {
        QueryExpr::StringMatch {
            value: RUNNING_AGENT_QUERY.to_string(),
            case_sensitive: false,
            is_error_suffix: false,
            is_running_agent: true,
            is_running_process: false,
        }
    }

    /// Creates the sentinel match for the running-process shorthand.
    pub fn running_process() -> Self {
        QueryExpr::StringMatch {
            value: RUNNING_PROCESS_QUERY.to_string(),
            case_sensitive: false,
            is_error_suffix: false,
            is_running_agent: false,
            is_running_process: true,
        }
    }

    /// Creates a property match.
    pub fn property(key: PropertyKey, value: impl Into<String>) -> Self {
        QueryExpr::PropertyMatch {
            key,
            value: value.into(),
        }
    }

    /// Combines operands with AND, unwrapping a lone operand.
    ///
    /// # Example
    ///
    /// ```
    /// use changespec_query::QueryExpr;
    ///
    /// let expr = QueryExpr::and(QueryExpr::string("a", false), Vec::new());
    /// assert_eq!(expr, QueryExpr::string("a", false));
    /// ```
    pub fn and(first: QueryExpr, rest: Vec<QueryExpr>) -> Self {
        if rest.is_empty() {
            return first;
        }
        let mut operands = Vec::with_capacity(rest.len() + 1);
        operands.push(first);
        operands.extend(rest);
        QueryExpr::And { operands }
    }

    /// Combines operands with OR, unwrapping a lone operand.
    pub fn or(first: QueryExpr, rest: Vec<QueryExpr>) -> Self {
        if rest.is_empty() {
            return first;
        }
        let mut operands = Vec::with_capacity(rest.len() + 1);
        operands.push(first);
        operands.extend(rest);
        QueryExpr::Or { operands }
    }

    /// Creates a NOT expression.
    pub fn negate(inner: QueryExpr) -> Self {
        QueryExpr::Not {
            operand: Box::new(inner),
        }
    }

    /// The `*` shorthand: any of the three sentinel conditions.
    pub fn any_special() -> Self {
        QueryExpr::Or {
            operands: vec![
                QueryExpr::error_suffix(),
                QueryExpr::running_agent(),
                QueryExpr::running_process(),
            ],
        }
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::canonical::to_canonical_string(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_key_from_name_case_insensitive() {
        assert_eq!(PropertyKey::from_name("STATUS"), Some(PropertyKey::Status));
        assert_eq!(PropertyKey::from_name("Sibling"), Some(PropertyKey::Sibling));
        assert_eq!(PropertyKey::from_name("owner"), None);
    }

    #[test]
    fn test_property_key_round_trip() {
        for key in PropertyKey::ALL {
            assert_eq!(PropertyKey::from_name(key.as_str()), Some(key));
        }
    }

    #[test]
    fn test_or_unwraps_single_operand() {
        let expr = QueryExpr::or(QueryExpr::error_suffix(), Vec::new());
        assert_eq!(expr, QueryExpr::error_suffix());
    }

    #[test]
    fn test_and_keeps_multiple_operands() {
        let expr = QueryExpr::and(
            QueryExpr::string("a", false),
            vec![QueryExpr::string("b", false)],
        );
        assert!(matches!(expr, QueryExpr::And { ref operands } if operands.len() == 2));
    }

    #[test]
    fn test_any_special_has_three_sentinels() {
        let QueryExpr::Or { operands } = QueryExpr::any_special() else {
            panic!("expected OR");
        };
        assert_eq!(
            operands,
            vec![
                QueryExpr::error_suffix(),
                QueryExpr::running_agent(),
                QueryExpr::running_process(),
            ]
        );
    }
}
