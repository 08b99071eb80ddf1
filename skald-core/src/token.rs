//! Token types for the Skald tokenizer.
//!
//! A token is a `(kind, lexeme)` pair. Lexemes preserve exactly what later
//! stages need: a call-start token keeps the trailing `(` (`"add("`), an
//! assignment keeps the trailing `:` (`"x:"`), a named argument the trailing
//! `=` (`"y="`), and an argument reference the full `$n` form. String and
//! comment tokens carry their unquoted, unescaped content.

use std::fmt;

// ---------------------------------------------------------------------------
// Token kinds
// ---------------------------------------------------------------------------

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Not yet classified.
    Invalid,
    /// Script argument reference (`$1`, `$2`, …).
    ArgRef,
    /// Raw argument value awaiting classification.
    ArgValue,
    /// Boolean literal.
    Boolean,
    /// Comment content.
    Comment,
    /// Statement terminator.
    Terminator,
    /// Floating-point literal.
    Float,
    /// Start of a function call (`name(`).
    CallStart,
    /// End of a function call (`)`).
    CallEnd,
    /// Integer literal.
    Integer,
    /// Named argument (`name=`).
    NamedArg,
    /// The `nil` literal.
    Null,
    /// String literal content.
    Str,
    /// Unsigned integer literal.
    Uinteger,
    /// Variable assignment (`name:`).
    Assign,
    /// Variable reference.
    VarRef,
    /// Whitespace.
    Space,
    /// Bare function name.
    FnName,
    /// Opening parenthesis.
    ParenOpen,
    /// Closing parenthesis.
    ParenClose,
    /// Start of a slice literal (`{`).
    SliceStart,
    /// End of a slice literal (`}`).
    SliceEnd,
    /// Start of a matrix row (`<`).
    RowStart,
    /// End of a matrix row (`>`).
    RowEnd,
    /// Start of an index expression (`[`).
    IndexStart,
    /// End of an index expression (`]`).
    IndexEnd,
    /// The `for` keyword.
    ForLoop,
    /// The `done` keyword.
    Done,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invalid => "INVALID",
            Self::ArgRef => "ARG_REF",
            Self::ArgValue => "VALUE",
            Self::Boolean => "BOOL",
            Self::Comment => "COMMENT",
            Self::Terminator => "TERMINATOR",
            Self::Float => "FLOAT",
            Self::CallStart => "CALL_START",
            Self::CallEnd => "CALL_END",
            Self::Integer => "INT",
            Self::NamedArg => "ARG",
            Self::Null => "NIL",
            Self::Str => "STRING",
            Self::Uinteger => "UINT",
            Self::Assign => "ASSIGN",
            Self::VarRef => "VAR",
            Self::Space => "WHITESPACE",
            Self::FnName => "FUNC_NAME",
            Self::ParenOpen => "OPEN_PAREN",
            Self::ParenClose => "CLOSE_PAREN",
            Self::SliceStart => "SLICE_START",
            Self::SliceEnd => "SLICE_END",
            Self::RowStart => "ROW_START",
            Self::RowEnd => "ROW_END",
            Self::IndexStart => "INDEX_START",
            Self::IndexEnd => "INDEX_END",
            Self::ForLoop => "FOR",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A lexical token: a kind and its lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of the token.
    pub kind: TokenKind,
    /// The lexeme text.
    pub text: String,
}

impl Token {
    /// Create a new token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// A synthetic statement terminator.
    #[must_use]
    pub fn terminator() -> Self {
        Self::new(TokenKind::Terminator, ";")
    }

    /// Returns `true` if this token has the given kind.
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{`{}`}}", self.kind, self.text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
