//! Print expression trees back into source text.
//!
//! The printer does not have access to the original tokens. It emits a
//! canonical form of every node and only inserts the parentheses required by
//! operator precedence. Spacing is recovered approximately from the node
//! offsets in a [`SourceInfo`]: before a node is printed, spaces are added until
//! the output reaches the node's original offset. Once the whole expression is
//! printed, the first space at or after each recorded line break offset is
//! turned into a line break.
//!
//! Some formatting is lost in translation:
//!
//! - String literals are always double-quoted and re-escaped.
//! - Bytes literals are written as `b"..."` with their raw contents.
//! - Doubles use the shortest representation that reads back as the same value.
//! - Unary operators do not parenthesize compound operands.
use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::ast::{Expr, ExprId};
use crate::source::SourceInfo;

mod line_breaks;
mod unparser;

use unparser::Unparser;

/// Options for [`to_string_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pad the output with spaces up to the recorded offset of each node.
    pub pad_positions: bool,
    /// Turn spaces at recorded line break offsets into line breaks.
    pub line_breaks: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pad_positions: true,
            line_breaks: true,
        }
    }
}

impl RenderOptions {
    /// Options that produce the expression on a single line with canonical
    /// spacing, ignoring source positions.
    pub fn compact() -> Self {
        Self {
            pad_positions: false,
            line_breaks: false,
        }
    }
}

/// Error printing an expression. Every variant carries the id of the offending
/// node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("unimplemented: cannot print {kind} expression {id}")]
    Unimplemented { id: ExprId, kind: &'static str },
    #[error("cannot unmangle operator {function} in expression {id}")]
    UnknownOperator { id: ExprId, function: SmolStr },
    #[error("{function} in expression {id} expects {expected} arguments, found {found}")]
    Arity {
        id: ExprId,
        function: SmolStr,
        expected: usize,
        found: usize,
    },
    #[error("entry {id} does not match the kind of its enclosing struct")]
    MalformedEntry { id: ExprId },
}

impl RenderError {
    /// The id of the node that could not be printed.
    pub fn id(&self) -> ExprId {
        match self {
            RenderError::Unimplemented { id, .. }
            | RenderError::UnknownOperator { id, .. }
            | RenderError::Arity { id, .. }
            | RenderError::MalformedEntry { id } => *id,
        }
    }
}

/// Shorthand for a result specialised to render errors.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;

/// Print an expression into a string, recovering the original layout from
/// the given source positions as far as possible.
///
/// Comprehensions can not be printed and result in
/// [`RenderError::Unimplemented`].
pub fn to_string(expr: &Expr, info: &SourceInfo) -> Result<String> {
    to_string_with(expr, info, RenderOptions::default())
}

/// Print an expression into a string with the given options.
pub fn to_string_with(expr: &Expr, info: &SourceInfo, options: RenderOptions) -> Result<String> {
    trace!(id = expr.id, ?options, "printing expression");

    let mut unparser = Unparser::new(info, options.pad_positions);
    unparser
        .visit(expr)
        .inspect_err(|err| debug!(id = err.id(), %err, "failed to print expression"))?;
    let string = unparser.finish();

    if options.line_breaks {
        Ok(line_breaks::apply(string, &info.line_offsets()))
    } else {
        Ok(string)
    }
}
