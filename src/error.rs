//! # Reduction Error Types
//!
//! This module defines [`ReduceError`], the single error surface of the term
//! reducer, and [`SyntaxError`], the user-facing rejections raised while
//! tokens are validated or reduced.
//!
//! Two kinds of failure are kept apart:
//!
//! - **Syntax errors** abort the term under construction. The caller decides
//!   whether to skip to the next clause or stop.
//! - **Internal errors** signal a broken reducer contract (unbalanced output
//!   stack, an adjacency the validator does not cover). They should never be
//!   observed for any input.
use smartstring::alias::String;
use thiserror::Error;

/// A rejection of the token sequence.
///
/// Operator descriptions embedded in the messages use the `op/3` notation,
/// e.g. `op(500, yfx, '-')`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// Two tokens that may never be neighbours, e.g. two operands in a row.
    #[error("{prev} may not be followed by {next}")]
    IllegalAdjacency {
        /// The token already on the input stack.
        prev: String,
        /// The incoming token.
        next: String,
    },

    /// The sequence ended right after an operator that needs a right operand.
    #[error("unexpected end of term after {after}")]
    UnexpectedEnd {
        /// The operator left without an operand.
        after: String,
    },

    /// No tokens at all.
    #[error("empty term")]
    EmptyTerm,

    /// A pure infix operator started the term and was not used as an atom.
    #[error("infix operator {oper} cannot start a term")]
    InfixAtStart {
        /// The offending operator.
        oper: String,
    },

    /// Equal precedence and neither operator may nest inside the other.
    #[error("operator clash between {left} and {right}; use parenthesis")]
    Clash {
        /// The operator on the left.
        left: String,
        /// The operator on the right.
        right: String,
    },

    /// Equal precedence and both nestings are possible.
    #[error("ambiguous operator combination of {left} and {right}; use parenthesis")]
    Ambiguous {
        /// The operator on the left.
        left: String,
        /// The operator on the right.
        right: String,
    },

    /// The term on the left of an operator binds too loosely.
    #[error("{arg} is not a valid left argument of {oper}")]
    InvalidLeftArg {
        /// The operator whose argument is checked.
        oper: String,
        /// The operator heading the argument.
        arg: String,
    },

    /// The term on the right of an operator binds too loosely.
    #[error("{arg} is not a valid right argument of {oper}")]
    InvalidRightArg {
        /// The operator whose argument is checked.
        oper: String,
        /// The operator heading the argument.
        arg: String,
    },

    /// [`TermBuilder::add_operator`](crate::TermBuilder::add_operator) was
    /// given a name with no operator definition.
    #[error("{name:?} is not an operator")]
    NotAnOperator {
        /// The name that was looked up.
        name: String,
    },

    /// A parenthesized argument group with nothing in it.
    #[error("empty argument list")]
    EmptyArgumentList,
}

/// Errors returned by the reducer.
///
/// [`ReduceError::Syntax`] converts from [`SyntaxError`] with `#[from]`, so
/// validation code can write `?` on `Result<_, SyntaxError>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
    /// The token sequence is not a well-formed term.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// The reducer broke its own contract.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ReduceError {
    /// Builds an [`ReduceError::Internal`] from any message.
    pub fn internal(message: impl AsRef<str>) -> Self {
        ReduceError::Internal(String::from(message.as_ref()))
    }

    /// Returns `true` for errors caused by the input.
    pub fn is_syntax(&self) -> bool {
        matches!(self, ReduceError::Syntax(_))
    }

    /// Returns `true` for reducer defects.
    pub fn is_internal(&self) -> bool {
        matches!(self, ReduceError::Internal(_))
    }

    /// Returns the wrapped [`SyntaxError`], if any.
    pub fn syntax(&self) -> Option<&SyntaxError> {
        match self {
            ReduceError::Syntax(e) => Some(e),
            ReduceError::Internal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_error_trait_obj(e: &dyn std::error::Error) -> &dyn std::error::Error {
        e
    }

    #[test]
    fn syntax_error_maps_to_reduce_error() {
        let err: ReduceError = SyntaxError::EmptyTerm.into();
        assert!(err.is_syntax());
        assert!(!err.is_internal());
        assert_eq!(err.syntax(), Some(&SyntaxError::EmptyTerm));
        let _ = _assert_error_trait_obj(&err);
        assert_eq!(err.to_string(), "syntax error: empty term");
    }

    #[test]
    fn internal_error_is_distinguishable() {
        let err = ReduceError::internal("stack underflow");
        assert!(err.is_internal());
        assert!(err.syntax().is_none());
        assert!(err.to_string().contains("stack underflow"));
    }

    #[test]
    fn messages_name_both_operators() {
        let err = SyntaxError::Clash {
            left: "op(700, xfx, =)".into(),
            right: "op(700, xfx, <)".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("op(700, xfx, =)"));
        assert!(msg.contains("op(700, xfx, <)"));

        let err = SyntaxError::IllegalAdjacency {
            prev: "operand a".into(),
            next: "operand b".into(),
        };
        assert_eq!(err.to_string(), "operand a may not be followed by operand b");
    }

    // If ReduceError ever stops being Send + Sync + 'static this will fail to compile.
    fn _assert_send_sync_static<T: Send + Sync + 'static>() {}
    #[test]
    fn reduce_error_is_send_sync_static() {
        _assert_send_sync_static::<ReduceError>();
    }
}
