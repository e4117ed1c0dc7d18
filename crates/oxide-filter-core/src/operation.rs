//! Comparison operation vocabulary.
//!
//! Tags are append-only: renderers are registered against them, so an
//! existing tag never changes meaning.

use std::fmt;

/// A comparison kind that a column may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterOrEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessOrEqual,
    /// `IN (...)`
    InList,
    /// `NOT IN (...)`
    NotInList,
    /// Suffix match.
    EndsWith,
    /// Negated suffix match.
    NotEndsWith,
    /// Prefix match.
    BeginsWith,
    /// Negated prefix match.
    NotBeginsWith,
    /// Substring match.
    Contains,
    /// Negated substring match.
    NotContains,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::GreaterOrEqual,
        Self::LessThan,
        Self::LessOrEqual,
        Self::InList,
        Self::NotInList,
        Self::EndsWith,
        Self::NotEndsWith,
        Self::BeginsWith,
        Self::NotBeginsWith,
        Self::Contains,
        Self::NotContains,
    ];

    /// Returns the stable name of the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "not-equal",
            Self::GreaterThan => "greater-than",
            Self::GreaterOrEqual => "greater-or-equal",
            Self::LessThan => "less-than",
            Self::LessOrEqual => "less-or-equal",
            Self::InList => "in-list",
            Self::NotInList => "not-in-list",
            Self::EndsWith => "ends-with",
            Self::NotEndsWith => "not-ends-with",
            Self::BeginsWith => "begins-with",
            Self::NotBeginsWith => "not-begins-with",
            Self::Contains => "contains",
            Self::NotContains => "not-contains",
        }
    }

    /// Returns the short code used by the textual filter language.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Equal => "eq",
            Self::NotEqual => "ne",
            Self::GreaterThan => "gt",
            Self::GreaterOrEqual => "gte",
            Self::LessThan => "lt",
            Self::LessOrEqual => "lte",
            Self::InList => "in",
            Self::NotInList => "nin",
            Self::EndsWith => "ew",
            Self::NotEndsWith => "new",
            Self::BeginsWith => "bw",
            Self::NotBeginsWith => "nbw",
            Self::Contains => "ct",
            Self::NotContains => "nct",
        }
    }

    /// Looks up an operation by its textual code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    /// Returns true if the operation compares against a list of values.
    #[must_use]
    pub const fn takes_list(self) -> bool {
        matches!(self, Self::InList | Self::NotInList)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in Operation::ALL.iter().enumerate() {
            for b in &Operation::ALL[i + 1..] {
                assert_ne!(a.code(), b.code());
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Operation::from_code("gt"), Some(Operation::GreaterThan));
        assert_eq!(Operation::from_code("nbw"), Some(Operation::NotBeginsWith));
        assert_eq!(Operation::from_code("GT"), None);
        assert_eq!(Operation::from_code("like"), None);
    }

    #[test]
    fn test_code_length() {
        assert!(Operation::ALL
            .iter()
            .all(|op| (2..=3).contains(&op.code().len())));
    }

    #[test]
    fn test_takes_list() {
        assert!(Operation::InList.takes_list());
        assert!(Operation::NotInList.takes_list());
        assert!(!Operation::Equal.takes_list());
    }
}
