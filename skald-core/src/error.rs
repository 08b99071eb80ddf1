//! Error types for the Skald tokenizer, parser, registries and cast engine.

use std::fmt;

// ---------------------------------------------------------------------------
// Error kinds
// ---------------------------------------------------------------------------

/// Categories of errors, grouped by the stage that raises them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // -- Tokenizer errors --
    /// String literal not closed before end of input.
    UnterminatedString,
    /// Comment not closed before end of input.
    UnterminatedComment,
    /// Function call not closed before the statement ended.
    UnterminatedFunc,
    /// Argument still open when the statement ended.
    UnterminatedArg,
    /// Unbalanced `()`, `{}` or `[]`.
    ParenMismatch,
    /// Function name contains whitespace.
    FuncNameHasSpace,
    /// Token could not be classified.
    TokenNotValid,
    /// Assignment without a variable name.
    AssignNameMissing,
    /// Assignment without a value.
    AssignValueMissing,
    /// Assignment in an invalid position.
    AssignUnexpected,
    /// Malformed `$n` argument reference.
    InvalidArgRef,

    // -- Parser / evaluator errors --
    /// Nothing to parse.
    InputEmpty,
    /// An argument was expected.
    ExpectedArgument,
    /// Token not valid at this point.
    UnexpectedTokenType,
    /// More `(` than `)`.
    UnexpectedOpeningParen,
    /// More `)` than `(`.
    UnexpectedClosingParen,
    /// Assignment node without a name.
    AssignMissingName,
    /// Assignment node without a value.
    AssignMissingValue,
    /// Assignment node malformed.
    AssignInvalid,
    /// `$n` reference that is not a number.
    ArgRefInvalid,
    /// `$n` beyond the supplied arguments, or an index out of bounds.
    ArgRefOutOfRange,
    /// Variable not registered and never assigned.
    VarUndefined,
    /// Function not registered.
    FuncUnknown,
    /// Named argument does not match any declared parameter.
    ParamUnknown,
    /// Positional argument after a named argument.
    ParamStyleMismatch,
    /// More positional arguments than declared parameters.
    ParamTooMany,
    /// Node kind the evaluator cannot handle.
    UnsupportedNodeType,
    /// `for` loop variable list has the wrong shape.
    ForInvalidVars,
    /// `for` target is not a sequence.
    ForTargetNotIterable,

    // -- Registry validation errors --
    /// Value type does not match the declared type.
    WrongType,
    /// Numeric value outside the declared range.
    OutOfBounds,
    /// Length outside the declared bounds.
    OutOfBoundsLength,

    // -- Cast errors --
    /// Source value cannot be coerced at all.
    UnsupportedSourceType,
    /// Target type name is not part of the vocabulary.
    UnsupportedTargetType,
    /// String does not parse as the target type.
    StringCast,
    /// The nil value cannot be coerced.
    NilCast,
    /// Source/target pair has no defined conversion.
    CastNotPossible,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// An error raised while tokenizing, parsing, evaluating or casting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    /// Machine-readable error kind.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl ScriptError {
    /// Create an error with an explicit kind and message.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    // -- tokenizer builders --

    #[must_use]
    pub fn unterminated_string(pos: usize) -> Self {
        Self::new(
            ErrorKind::UnterminatedString,
            format!("unterminated string at position {pos}"),
        )
    }

    #[must_use]
    pub fn unterminated_comment(pos: usize) -> Self {
        Self::new(
            ErrorKind::UnterminatedComment,
            format!("unterminated comment at position {pos}"),
        )
    }

    #[must_use]
    pub fn unterminated_func(pos: usize) -> Self {
        Self::new(
            ErrorKind::UnterminatedFunc,
            format!("unterminated function at position {pos}"),
        )
    }

    #[must_use]
    pub fn func_incomplete() -> Self {
        Self::new(ErrorKind::UnterminatedFunc, "func call incomplete")
    }

    #[must_use]
    pub fn unterminated_arg(pos: usize) -> Self {
        Self::new(
            ErrorKind::UnterminatedArg,
            format!("unterminated argument at position {pos}"),
        )
    }

    #[must_use]
    pub fn paren_mismatch() -> Self {
        Self::new(ErrorKind::ParenMismatch, "parenthesis mismatch")
    }

    #[must_use]
    pub fn func_name_has_space() -> Self {
        Self::new(
            ErrorKind::FuncNameHasSpace,
            "function names cannot contain whitespaces",
        )
    }

    #[must_use]
    pub fn token_not_valid(text: &str) -> Self {
        Self::new(
            ErrorKind::TokenNotValid,
            format!("'{text}' is not a valid token"),
        )
    }

    #[must_use]
    pub fn assign_name_missing() -> Self {
        Self::new(ErrorKind::AssignNameMissing, "missing var name in assign")
    }

    #[must_use]
    pub fn assign_value_missing() -> Self {
        Self::new(ErrorKind::AssignValueMissing, "missing var value in assign")
    }

    #[must_use]
    pub fn assign_unexpected(pos: usize) -> Self {
        Self::new(
            ErrorKind::AssignUnexpected,
            format!("unexpected variable assignment at position {pos}"),
        )
    }

    #[must_use]
    pub fn invalid_arg_ref(pos: usize, reason: &str) -> Self {
        Self::new(
            ErrorKind::InvalidArgRef,
            format!("invalid argument reference at position {pos}: {reason}"),
        )
    }

    // -- parser / evaluator builders --

    #[must_use]
    pub fn input_empty() -> Self {
        Self::new(ErrorKind::InputEmpty, "input is empty")
    }

    #[must_use]
    pub fn expected_argument() -> Self {
        Self::new(ErrorKind::ExpectedArgument, "expected argument")
    }

    #[must_use]
    pub fn unexpected_token_type(kind_name: &str) -> Self {
        Self::new(
            ErrorKind::UnexpectedTokenType,
            format!("unexpected token type: {kind_name}"),
        )
    }

    #[must_use]
    pub fn unexpected_opening_paren() -> Self {
        Self::new(
            ErrorKind::UnexpectedOpeningParen,
            "unexpected opening parenthesis",
        )
    }

    #[must_use]
    pub fn unexpected_closing_paren() -> Self {
        Self::new(
            ErrorKind::UnexpectedClosingParen,
            "unexpected closing parenthesis",
        )
    }

    #[must_use]
    pub fn assign_missing_name() -> Self {
        Self::new(
            ErrorKind::AssignMissingName,
            "missing variable name in assignment",
        )
    }

    #[must_use]
    pub fn assign_missing_value() -> Self {
        Self::new(
            ErrorKind::AssignMissingValue,
            "expected value after variable assignment",
        )
    }

    #[must_use]
    pub fn assign_invalid() -> Self {
        Self::new(ErrorKind::AssignInvalid, "invalid variable assignment")
    }

    #[must_use]
    pub fn arg_ref_invalid(text: &str) -> Self {
        Self::new(
            ErrorKind::ArgRefInvalid,
            format!("invalid argument reference: {text}"),
        )
    }

    #[must_use]
    pub fn arg_ref_out_of_range(index: i64) -> Self {
        Self::new(
            ErrorKind::ArgRefOutOfRange,
            format!("argument ${index} out of range"),
        )
    }

    #[must_use]
    pub fn var_undefined(name: &str) -> Self {
        Self::new(ErrorKind::VarUndefined, format!("undefined variable: {name}"))
    }

    #[must_use]
    pub fn func_unknown(name: &str) -> Self {
        Self::new(ErrorKind::FuncUnknown, format!("unknown function: {name}"))
    }

    #[must_use]
    pub fn param_unknown(name: &str) -> Self {
        Self::new(ErrorKind::ParamUnknown, format!("unknown parameter: {name}"))
    }

    #[must_use]
    pub fn param_style_mismatch() -> Self {
        Self::new(
            ErrorKind::ParamStyleMismatch,
            "must use positional or named arguments, not both",
        )
    }

    #[must_use]
    pub fn param_too_many(name: &str) -> Self {
        Self::new(
            ErrorKind::ParamTooMany,
            format!("too many arguments for function {name}"),
        )
    }

    #[must_use]
    pub fn unsupported_node_type(kind_name: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedNodeType,
            format!("unsupported node type: {kind_name}"),
        )
    }

    #[must_use]
    pub fn for_invalid_vars() -> Self {
        Self::new(
            ErrorKind::ForInvalidVars,
            "for loop requires 2 or 3 loop variables",
        )
    }

    #[must_use]
    pub fn for_target_not_iterable() -> Self {
        Self::new(
            ErrorKind::ForTargetNotIterable,
            "for loop target is not iterable",
        )
    }

    // -- registry validation builders --

    #[must_use]
    pub fn wrong_type(what: &str, name: &str, expected: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::WrongType,
            format!("{what} {name}: expected {expected}, got {got}"),
        )
    }

    #[must_use]
    pub fn out_of_bounds(what: &str, name: &str, min: &str, max: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::OutOfBounds,
            format!("{what} {name}: value {got} is out of bounds ({min} - {max})"),
        )
    }

    #[must_use]
    pub fn out_of_bounds_length(what: &str, name: &str, min: &str, max: &str, got: usize) -> Self {
        Self::new(
            ErrorKind::OutOfBoundsLength,
            format!("{what} {name}: length {got} is out of bounds ({min} - {max})"),
        )
    }

    // -- cast builders --

    #[must_use]
    pub fn unsupported_source_type(type_name: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedSourceType,
            format!("unsupported source type: {type_name}"),
        )
    }

    #[must_use]
    pub fn unsupported_target_type(type_name: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedTargetType,
            format!("unsupported target type: {type_name}"),
        )
    }

    #[must_use]
    pub fn string_cast(text: &str, target: &str) -> Self {
        Self::new(
            ErrorKind::StringCast,
            format!("cannot cast string \"{text}\" to {target}"),
        )
    }

    #[must_use]
    pub fn nil_cast() -> Self {
        Self::new(ErrorKind::NilCast, "cannot cast nil value")
    }

    #[must_use]
    pub fn cast_not_possible(source: &str, target: &str) -> Self {
        Self::new(
            ErrorKind::CastNotPossible,
            format!("cannot cast from {source} to {target}"),
        )
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ScriptError {}

/// Convenience alias for results using [`ScriptError`].
pub type ScriptResult<T> = Result<T, ScriptError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
