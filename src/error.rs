//! # Error taxonomy
//!
//! Covers parse, link, and fatal runtime errors. A malformed token (bad
//! escape, unterminated literal, invalid numeric base) has no error type
//! of its own — the lexer has no separate pass to fail out of, it feeds
//! tokens to the parser one at a time, so an illegal token surfaces as a
//! `ParseError` carrying the lexer's own message (see `TokenKind::Illegal`
//! in `parser.rs`). Recoverable operand-stack underflow is not
//! represented here at all — see `vm::ops_stack`'s `pop` helper, which
//! logs and continues rather than returning a `Result`. Plain enums with
//! hand-written `Display` + `std::error::Error` impls; no `thiserror`
//! pulled in.

use std::fmt;

use crate::span::Span;

/// One malformed statement. The parser records one of these per bad line and
/// continues to the next; the driver refuses to run if any accumulated.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: parse error: {}", self.span, self.message)
    }
}

/// A fatal failure during the link pass: an unresolved label or data name.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkError {
    UnknownLabel(String),
    UnknownData(String),
    /// An identifier immediate was used on a push opcode other than
    /// `PPUSH`. The grammar allows an identifier IMM on the whole push
    /// family, but only `PPUSH` has defined pointer semantics for one;
    /// reject the ambiguous case rather than guess.
    NonPointerIdentImmediate(String),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::UnknownLabel(name) => write!(f, "link error: unknown label '{}'", name),
            LinkError::UnknownData(name) => write!(f, "link error: unknown data name '{}'", name),
            LinkError::NonPointerIdentImmediate(name) => write!(
                f,
                "link error: identifier immediate '{}' is only valid on ppush",
                name
            ),
        }
    }
}

/// Fatal runtime failures. Operand-stack underflow is deliberately
/// absent — it's recoverable (logged, instruction becomes a no-op, `pc`
/// still advances), so it never reaches this type.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Pushing past the end of the fixed-size operand stack.
    StackOverflow,
    /// Pushing past the end of the fixed-size return stack, or calling when
    /// it is already full.
    ReturnStackOverflow,
    /// The dispatcher reached an opcode with no execution arm (should be
    /// unreachable given the link pass, but the VM checks anyway).
    UnimplementedOpcode(&'static str),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::StackOverflow => write!(f, "runtime error: operand stack overflow"),
            RuntimeError::ReturnStackOverflow => {
                write!(f, "runtime error: return stack overflow")
            }
            RuntimeError::UnimplementedOpcode(op) => {
                write!(f, "runtime error: unimplemented opcode '{}'", op)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Top-level error type returned by [`crate::run_source`].
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Parse(Vec<ParseError>),
    Link(LinkError),
    Runtime(RuntimeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(errs) => {
                for (i, e) in errs.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
            Error::Link(e) => write!(f, "{}", e),
            Error::Runtime(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Error::Link(e)
    }
}

impl From<RuntimeError> for Error {
    fn from(e: RuntimeError) -> Self {
        Error::Runtime(e)
    }
}
