//! Error types for query parsing.
//!
//! Every error carries the byte offset in the input at which it occurred.
//! Errors surface to the caller unchanged: the parser does not recover or
//! continue past a failure, it returns the first error.

use thiserror::Error;

/// A structured query parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The grammar did not accept the input at this offset.
    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        /// Byte offset of the offending input.
        offset: usize,
        /// What the grammar would have accepted here.
        expected: &'static str,
        /// What was actually found.
        found: String,
    },

    /// A `"` or `/` literal was opened but never closed.
    #[error("unterminated literal at offset {offset}: missing closing `{delimiter}`")]
    UnterminatedLiteral {
        /// Byte offset of the opening delimiter.
        offset: usize,
        /// The delimiter that was never closed.
        delimiter: char,
    },

    /// A `~`, `^`, or `@` suffix was not followed by a valid number.
    #[error("invalid number at offset {offset}: found {found}")]
    InvalidNumber {
        /// Byte offset of the malformed number.
        offset: usize,
        /// The malformed text.
        found: String,
    },

    /// A reserved operator word appeared in field-name position.
    #[error("reserved word `{name}` cannot be a field name (offset {offset})")]
    ReservedFieldName {
        /// Byte offset of the field name.
        offset: usize,
        /// The reserved word.
        name: String,
    },

    /// The input ended on a dangling binary operator.
    #[error("dangling `{operator}` at offset {offset}")]
    TrailingOperator {
        /// Byte offset of the operator.
        offset: usize,
        /// The dangling operator.
        operator: &'static str,
    },

    /// The grammar accepted a prefix of the input but bytes remain.
    #[error("unexpected trailing input at offset {offset}")]
    TrailingInput {
        /// Byte offset where the leftover input starts.
        offset: usize,
    },

    /// Nesting exceeded the configured depth limit.
    #[error("nesting depth exceeds the limit of {limit} at offset {offset}")]
    DepthExceeded {
        /// Byte offset at which the limit was crossed.
        offset: usize,
        /// The configured limit.
        limit: usize,
    },
}

impl ParseError {
    /// Byte offset in the input where the error occurred.
    pub fn offset(&self) -> usize {
        match self {
            Self::UnexpectedToken { offset, .. }
            | Self::UnterminatedLiteral { offset, .. }
            | Self::InvalidNumber { offset, .. }
            | Self::ReservedFieldName { offset, .. }
            | Self::TrailingOperator { offset, .. }
            | Self::TrailingInput { offset }
            | Self::DepthExceeded { offset, .. } => *offset,
        }
    }

    /// Formats the error with the input and a caret marking the position.
    pub fn format_with_context(&self, input: &str) -> String {
        let offset = self.offset().min(input.len());
        let column = input[..offset].chars().count();
        format!(
            "query syntax error: {self}\n  {input}\n  {}^",
            " ".repeat(column)
        )
    }
}
