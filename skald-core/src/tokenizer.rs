//! Character-driven tokenizer for Skald source code.
//!
//! Scanning is a single left-to-right pass over the source bytes with an
//! explicit state record. Characters accumulate into a pending lexeme which
//! is flushed on delimiters; the flush step classifies unlabelled lexemes by
//! shape (boolean, nil, float, integer, keyword, variable reference).
//!
//! # Statement terminators
//!
//! A literal `;` always produces one terminator token. Synthetic terminators
//! are inserted wherever a new top-level call or assignment begins while the
//! previous statement has closed, so that `x: 1 y: 2 add(x y)` and
//! `x: 1; y: 2; add(x y)` tokenize identically. A call that closes inside a
//! slice or index context does *not* end the statement.
//!
//! After scanning, [`Tokenizer::lex`] validates the stream: balanced
//! delimiters (`()` outside slice/index contexts, `{}`, `[]`), well-formed
//! function names and assignments, and the by-value reclassification of
//! single-token programs.

use crate::error::{ScriptError, ScriptResult};
use crate::token::{Token, TokenKind};

// ---------------------------------------------------------------------------
// Character classes
// ---------------------------------------------------------------------------

const fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r')
}

const fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

/// Digits with an optional leading minus sign.
fn only_digits(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(is_digit)
}

/// Classify a pending lexeme that has no explicit kind yet.
///
/// Only lexemes still tagged [`TokenKind::ArgValue`] or
/// [`TokenKind::Invalid`] are touched; anything the scanner labelled
/// explicitly (strings, comments, call starts, …) keeps its kind.
fn determine_kind(kind: &mut TokenKind, text: &str) {
    if !matches!(kind, TokenKind::ArgValue | TokenKind::Invalid) {
        return;
    }
    *kind = if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
        TokenKind::Boolean
    } else if text.eq_ignore_ascii_case("nil") {
        TokenKind::Null
    } else if text == "for" {
        TokenKind::ForLoop
    } else if text == "done" {
        TokenKind::Done
    } else if text.contains('.') {
        TokenKind::Float
    } else if text.is_empty() {
        TokenKind::Str
    } else if only_digits(text) {
        TokenKind::Integer
    } else {
        TokenKind::VarRef
    };
}

// ---------------------------------------------------------------------------
// Tokenizer state
// ---------------------------------------------------------------------------

/// The scanning context, updated as the pass moves through the source.
#[derive(Debug, Clone)]
struct State {
    /// Inside a string literal.
    in_string: bool,
    /// The previous character was an unconsumed escape backslash.
    in_escape: bool,
    /// Inside a `# … #` comment.
    in_comment: bool,
    /// Inside a function call (between `name(` and its final `)`).
    in_call: bool,
    /// Collecting an argument value.
    in_arg_value: bool,
    /// Inside a statement (false only right after a top-level call closed).
    in_statement: bool,
    /// Right after a `name:` assignment, eating padding whitespace.
    in_assign: bool,
    /// Nesting depth of `(` `)`.
    parens: i32,
    /// Nesting depth of `{` `}`.
    slices: i32,
    /// Nesting depth of `[` `]`.
    indexes: i32,
}

impl State {
    const fn new() -> Self {
        Self {
            in_string: false,
            in_escape: false,
            in_comment: false,
            in_call: false,
            in_arg_value: false,
            in_statement: true,
            in_assign: false,
            parens: 0,
            slices: 0,
            indexes: 0,
        }
    }

    /// Inside a call, collecting arguments.
    const fn waiting_for_args(&self) -> bool {
        self.in_call && self.in_arg_value
    }

    /// Inside a slice or index context, where statements must not end.
    const fn in_delimited(&self) -> bool {
        self.slices > 0 || self.indexes > 0
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Converts source text into a validated token stream.
pub struct Tokenizer {
    /// Source bytes.
    src: Vec<u8>,
    /// Current byte position.
    pos: usize,
    /// Lexeme of the token being built.
    lexeme: String,
    /// Kind of the token being built.
    kind: TokenKind,
    /// All tokens produced so far.
    tokens: Vec<Token>,
    /// Scanning context.
    state: State,
}

impl Tokenizer {
    /// Create a tokenizer over the given source.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            src: source.as_bytes().to_vec(),
            pos: 0,
            lexeme: String::new(),
            kind: TokenKind::Invalid,
            tokens: Vec::new(),
            state: State::new(),
        }
    }

    /// The tokens produced so far.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Consume the tokenizer, returning its tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// A `kind{lexeme}` rendering of the whole stream, for diagnostics.
    #[must_use]
    pub fn kinds(&self) -> String {
        let parts: Vec<String> = self.tokens.iter().map(ToString::to_string).collect();
        parts.join(" ")
    }

    // -- token emission --

    fn last_kind(&self) -> Option<TokenKind> {
        self.tokens.last().map(|t| t.kind)
    }

    /// Push a token, applying stream normalization: empty and newline-only
    /// lexemes are dropped, and outside strings/comments embedded
    /// newlines/tabs fold to spaces before trimming.
    fn push_token(&mut self, kind: TokenKind, text: String) {
        if text.is_empty() || text == "\n" || text == "\r\n" {
            return;
        }
        let text = if matches!(kind, TokenKind::Str | TokenKind::Comment) {
            text
        } else {
            let folded: String = text
                .chars()
                .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
                .collect();
            folded.trim_matches(' ').to_string()
        };
        if text.is_empty() && !matches!(kind, TokenKind::Str | TokenKind::Comment) {
            return;
        }
        self.tokens.push(Token::new(kind, text));
    }

    /// Push a token bypassing normalization (used for the empty-string
    /// named-argument value, which must survive despite being empty).
    fn push_raw(&mut self, kind: TokenKind, text: String) {
        self.tokens.push(Token::new(kind, text));
    }

    /// Flush the pending token and start a fresh one of kind `next`.
    ///
    /// Consecutive terminators collapse to one. A top-level `callStart`
    /// beginning a new statement (previous token neither terminator nor
    /// assignment) gets a synthetic terminator in front of it.
    fn flush_as(&mut self, next: TokenKind) {
        let mut kind = self.kind;
        let mut text = std::mem::take(&mut self.lexeme);
        self.kind = next;

        if !self.tokens.is_empty()
            && kind == TokenKind::Terminator
            && self.last_kind() == Some(TokenKind::Terminator)
        {
            return;
        }
        if !self.tokens.is_empty()
            && kind == TokenKind::CallStart
            && self.state.parens == 0
            && !self.state.in_delimited()
            && !matches!(
                self.last_kind(),
                Some(TokenKind::Terminator | TokenKind::Assign)
            )
        {
            self.push_token(TokenKind::Terminator, ";".to_string());
        }

        determine_kind(&mut kind, &text);
        while text.ends_with(' ') {
            text.pop();
        }
        self.push_token(kind, text);
    }

    /// Emit a standalone synthetic terminator (deduplicated).
    fn emit_terminator(&mut self) {
        if self.last_kind() == Some(TokenKind::Terminator) {
            return;
        }
        self.push_token(TokenKind::Terminator, ";".to_string());
    }

    // -- scanning helpers --

    fn has_char(&self) -> bool {
        self.pos < self.src.len()
    }

    fn has_next(&self) -> bool {
        self.pos + 1 < self.src.len()
    }

    /// Whether the scanner sits at a statement boundary: the previous
    /// statement closed and no string/comment/call/argument is open.
    const fn at_statement_boundary(&self) -> bool {
        !self.state.in_statement
            && !self.state.in_string
            && !self.state.in_comment
            && !self.state.in_call
            && !self.state.in_arg_value
    }

    /// Close the current statement: emit a terminator, reset statement
    /// state, and verify nothing is left half-open.
    fn handle_statement_boundary(&mut self) -> ScriptResult<()> {
        self.emit_terminator();
        self.kind = TokenKind::Invalid;
        self.state.in_statement = true;
        self.state.in_assign = false;
        if self.state.in_string {
            return Err(ScriptError::unterminated_string(self.pos));
        }
        if self.state.in_comment {
            return Err(ScriptError::unterminated_comment(self.pos));
        }
        if self.state.in_call {
            return Err(ScriptError::unterminated_func(self.pos));
        }
        if self.state.in_arg_value {
            return Err(ScriptError::unterminated_arg(self.pos));
        }
        self.pos += 1;
        Ok(())
    }

    /// Scan a `$n` argument reference. The `$` is at `self.pos`.
    fn handle_arg_ref(&mut self) -> ScriptResult<()> {
        self.pos += 1;

        let start = self.pos;
        while self.has_char() && is_digit(self.src[self.pos]) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(ScriptError::invalid_arg_ref(
                self.pos,
                "missing number after $",
            ));
        }

        let digits = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or_default();
        self.kind = TokenKind::ArgRef;
        self.lexeme = format!("${digits}");

        if self.state.in_call {
            self.flush_as(TokenKind::Invalid);
        } else {
            self.flush_as(TokenKind::ArgValue);
        }
        Ok(())
    }

    /// Scan a string literal. The opening `"` is at `self.pos`.
    ///
    /// Escapes: `\n` → LF, `\r` → CR, `\t` → HT, `\\` → `\`, `\"` → `"`,
    /// `\#` → `#`; any other escaped character is emitted literally.
    fn handle_string(&mut self) -> ScriptResult<()> {
        self.state.in_string = true;
        self.kind = TokenKind::Str;
        self.pos += 1;

        while self.has_char() {
            let c = self.src[self.pos];

            if self.state.in_escape {
                let mapped = match c {
                    b'n' => '\n',
                    b'r' => '\r',
                    b't' => '\t',
                    other => other as char,
                };
                self.lexeme.push(mapped);
                self.state.in_escape = false;
                self.pos += 1;
                continue;
            }
            if c == b'\\' {
                self.state.in_escape = true;
                self.pos += 1;
                continue;
            }
            if c == b'"' {
                self.state.in_string = false;
                self.state.in_escape = false;
                self.flush_as(TokenKind::ArgValue);
                self.pos += 1;
                return Ok(());
            }

            self.lexeme.push(c as char);
            self.pos += 1;
        }

        Err(ScriptError::unterminated_string(self.pos))
    }

    /// Handle a `#` delimiter or a character inside a comment.
    ///
    /// Returns `true` when the character was consumed.
    fn handle_comment(&mut self, c: u8) -> bool {
        if c == b'#' && !self.state.in_escape {
            self.state.in_comment = !self.state.in_comment;
            if !self.state.in_comment {
                // comment finished
                self.lexeme.push('#');
                self.kind = TokenKind::Comment;
                self.lexeme = self.lexeme.trim_matches(['#', ' ']).to_string();
                self.flush_as(TokenKind::Invalid);
                self.pos += 1;
                return true;
            }
        }

        if self.state.in_comment {
            self.lexeme.push(c as char);
            self.state.in_escape = false;
            self.pos += 1;
            return true;
        }

        false
    }

    /// Rewrite the pending (or just-flushed) lexeme into a `name=` named
    /// argument token. The `=` is at `self.pos`.
    fn handle_named_arg(&mut self) {
        if self.kind == TokenKind::CallStart {
            self.flush_as(TokenKind::ArgValue);
            self.pos += 1;
            return;
        }

        // `x =1` flushed the name at the space; pull it back.
        if self.lexeme.is_empty() {
            if let Some(prev) = self.tokens.pop() {
                self.lexeme = prev.text;
            }
        }

        self.kind = TokenKind::NamedArg;
        self.lexeme = self.lexeme.trim_matches(' ').to_string();
        self.lexeme.push('=');

        let was_in_arg_value = self.state.in_arg_value;
        self.state.in_arg_value = false;
        self.flush_as(TokenKind::ArgValue);
        self.state.in_arg_value = was_in_arg_value;
        self.pos += 1;
    }

    /// Close one `)` of a call. Returns `Ok(true)` when this closed the
    /// outermost call (the caller should just advance), `Ok(false)` when an
    /// enclosing call continues (the `)` token was flushed as an argument
    /// boundary).
    fn add_call_end(&mut self) -> ScriptResult<bool> {
        self.flush_as(TokenKind::CallEnd);
        self.lexeme = ")".to_string();

        self.state.in_arg_value = false;
        self.state.parens -= 1;
        if self.state.parens < 0 {
            return Err(ScriptError::paren_mismatch());
        }
        if self.state.parens == 0 {
            self.state.in_call = false;
            // Inside a slice or index the enclosing statement continues.
            if !self.state.in_delimited() {
                self.state.in_statement = false;
            }
            self.flush_as(TokenKind::Invalid);
            return Ok(true);
        }
        self.state.in_arg_value = true;
        Ok(false)
    }

    // -- main pass --

    /// Run the scanning pass. On success the token stream is available via
    /// [`Tokenizer::tokens`]; every error is fatal and leaves no usable
    /// stream behind.
    pub fn tokenize(&mut self) -> ScriptResult<()> {
        while self.has_char() {
            if self.at_statement_boundary() {
                self.handle_statement_boundary()?;
                continue;
            }

            let c = self.src[self.pos];

            // argument reference
            if c == b'$' && !self.state.in_string && !self.state.in_comment {
                self.handle_arg_ref()?;
                continue;
            }

            // escape introducer inside strings and comments
            if c == b'\\' && (self.state.in_string || self.state.in_comment) {
                self.state.in_escape = true;
                self.pos += 1;
                continue;
            }

            // whitespace inside strings/comments is content
            if is_whitespace(c) && (self.state.in_string || self.state.in_comment) {
                self.lexeme.push(c as char);
                self.state.in_escape = false;
                self.pos += 1;
                continue;
            }

            if self.handle_comment(c) {
                continue;
            }

            if c == b'"' && !self.state.in_escape {
                self.handle_string()?;
                continue;
            }

            // eat the padding between `name:` and its value
            if self.state.in_assign {
                if is_whitespace(c) {
                    self.pos += 1;
                    continue;
                }
                self.state.in_assign = false;
            }

            if self.state.waiting_for_args() {
                if c == b')' {
                    if self.lexeme.is_empty() && self.last_kind() == Some(TokenKind::NamedArg) {
                        // named argument whose value is the empty string
                        self.push_raw(TokenKind::Str, String::new());
                    }
                    if !self.add_call_end()? {
                        self.flush_as(TokenKind::ArgValue);
                    }
                    self.pos += 1;
                    continue;
                }
                if c == b'=' {
                    self.handle_named_arg();
                    continue;
                }
                if is_whitespace(c) {
                    self.lexeme = self.lexeme.trim_matches(' ').to_string();
                    self.flush_as(TokenKind::ArgValue);
                    self.pos += 1;
                    continue;
                }
            }

            // slice, row and index delimiters
            if c == b'{' {
                self.flush_as(TokenKind::Invalid);
                self.push_token(TokenKind::SliceStart, "{".to_string());
                self.state.slices += 1;
                self.pos += 1;
                continue;
            }
            if c == b'}' {
                self.flush_as(TokenKind::Invalid);
                self.push_token(TokenKind::SliceEnd, "}".to_string());
                self.state.slices -= 1;
                if self.state.slices < 0 {
                    return Err(ScriptError::paren_mismatch());
                }
                self.pos += 1;
                continue;
            }
            if c == b'<' && self.state.slices > 0 {
                self.flush_as(TokenKind::Invalid);
                self.push_token(TokenKind::RowStart, "<".to_string());
                self.pos += 1;
                continue;
            }
            if c == b'>' && self.state.slices > 0 {
                self.flush_as(TokenKind::Invalid);
                self.push_token(TokenKind::RowEnd, ">".to_string());
                self.pos += 1;
                continue;
            }
            if c == b'[' {
                self.flush_as(TokenKind::Invalid);
                self.push_token(TokenKind::IndexStart, "[".to_string());
                self.state.indexes += 1;
                self.pos += 1;
                continue;
            }
            if c == b']' {
                self.flush_as(TokenKind::Invalid);
                self.push_token(TokenKind::IndexEnd, "]".to_string());
                self.state.indexes -= 1;
                if self.state.indexes < 0 {
                    return Err(ScriptError::paren_mismatch());
                }
                self.pos += 1;
                continue;
            }

            // variable assignment `name:`
            if c == b':' {
                self.lexeme.push(':');
                if self.state.in_assign {
                    return Err(ScriptError::assign_unexpected(self.pos));
                }
                self.state.in_assign = true;
                self.kind = TokenKind::Assign;
                if !self.tokens.is_empty() {
                    self.emit_terminator();
                }
                self.flush_as(TokenKind::ArgValue);
                self.pos += 1;
                while self.has_next() && is_whitespace(self.src[self.pos]) {
                    self.pos += 1;
                }
                continue;
            }

            // function call start `name(`
            if c == b'(' {
                self.lexeme.push('(');
                self.kind = TokenKind::CallStart;
                self.flush_as(TokenKind::ArgValue);
                self.state.parens += 1;
                self.state.in_call = true;
                self.state.in_arg_value = true;
                self.pos += 1;
                continue;
            }

            // function call end outside argument collection
            if c == b')' {
                if !self.add_call_end()? {
                    self.flush_as(TokenKind::Invalid);
                }
                self.pos += 1;
                continue;
            }

            // literal statement terminator
            if c == b';' {
                self.lexeme.push(';');
                self.kind = TokenKind::Terminator;
                self.flush_as(TokenKind::Invalid);
                self.pos += 1;
                continue;
            }

            // bare whitespace ends the pending token
            if is_whitespace(c) {
                self.flush_as(TokenKind::Invalid);
                self.pos += 1;
                continue;
            }

            self.lexeme.push(c as char);
            self.pos += 1;
        }

        // end of input
        if self.state.in_string {
            return Err(ScriptError::unterminated_string(self.pos));
        }
        if self.state.in_comment {
            return Err(ScriptError::unterminated_comment(self.pos));
        }
        if !self.lexeme.is_empty() {
            let mut kind = self.kind;
            let text = std::mem::take(&mut self.lexeme);
            determine_kind(&mut kind, &text);
            self.push_token(kind, text);
        }
        Ok(())
    }

    // -- validation pass --

    /// Validate the scanned stream: single-token programs are reclassified
    /// by value; multi-token programs get delimiter-balance and
    /// well-formedness checks.
    pub fn lex(&mut self) -> ScriptResult<()> {
        if self.tokens.len() == 1 {
            let token = &mut self.tokens[0];
            match token.kind {
                TokenKind::Assign => return Err(ScriptError::assign_value_missing()),
                TokenKind::CallStart | TokenKind::CallEnd => {
                    return Err(ScriptError::func_incomplete());
                }
                TokenKind::SliceStart
                | TokenKind::SliceEnd
                | TokenKind::IndexStart
                | TokenKind::IndexEnd => return Err(ScriptError::paren_mismatch()),
                TokenKind::ArgRef
                | TokenKind::Str
                | TokenKind::Comment
                | TokenKind::Integer
                | TokenKind::Float
                | TokenKind::Boolean
                | TokenKind::Null => return Ok(()),
                _ => {}
            }
            // probably a bare primitive; settle its type by value
            token.kind = TokenKind::Invalid;
            let mut kind = token.kind;
            determine_kind(&mut kind, &token.text);
            token.kind = kind;
            if token.kind == TokenKind::Invalid {
                return Err(ScriptError::token_not_valid(&token.text));
            }
            return Ok(());
        }

        let mut parens = 0i32;
        let mut slices = 0i32;
        let mut indexes = 0i32;

        for i in 0..self.tokens.len() {
            match self.tokens[i].kind {
                TokenKind::CallStart => {
                    let trimmed = self.tokens[i].text.trim().to_string();
                    if trimmed.contains([' ', '\t', '\r', '\n']) {
                        return Err(ScriptError::func_name_has_space());
                    }
                    self.tokens[i].text = trimmed;
                    // parens inside slice/index contexts are the parser's
                    // business; only top-level calls are balanced here
                    if slices == 0 && indexes == 0 {
                        parens += 1;
                    }
                }
                TokenKind::CallEnd => {
                    if slices == 0 && indexes == 0 {
                        parens -= 1;
                        if parens < 0 {
                            return Err(ScriptError::paren_mismatch());
                        }
                    }
                }
                TokenKind::SliceStart => slices += 1,
                TokenKind::SliceEnd => {
                    slices -= 1;
                    if slices < 0 {
                        return Err(ScriptError::paren_mismatch());
                    }
                }
                TokenKind::IndexStart => indexes += 1,
                TokenKind::IndexEnd => {
                    indexes -= 1;
                    if indexes < 0 {
                        return Err(ScriptError::paren_mismatch());
                    }
                }
                TokenKind::Assign => {
                    if self.tokens[i].text.starts_with(':') {
                        return Err(ScriptError::assign_name_missing());
                    }
                    let next_is_terminator = self
                        .tokens
                        .get(i + 1)
                        .is_none_or(|t| t.kind == TokenKind::Terminator);
                    if next_is_terminator {
                        return Err(ScriptError::assign_value_missing());
                    }
                }
                _ => {}
            }
        }

        if parens != 0 || slices != 0 || indexes != 0 {
            return Err(ScriptError::paren_mismatch());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn scan(input: &str) -> Result<Vec<Token>, ScriptError> {
        let mut t = Tokenizer::new(input);
        t.tokenize()?;
        t.lex()?;
        Ok(t.into_tokens())
    }

    fn kinds_of(input: &str) -> Vec<TokenKind> {
        scan(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text)
    }

    use TokenKind::{
        ArgRef, Assign, Boolean, CallEnd, CallStart, Comment, Done, Float, ForLoop, IndexEnd,
        IndexStart, Integer, NamedArg, Null, RowEnd, RowStart, SliceEnd, SliceStart, Str,
        Terminator, VarRef,
    };

    // -- single tokens --

    #[test]
    fn empty_input() {
        assert!(scan("").unwrap().is_empty());
    }

    #[test]
    fn just_an_int() {
        assert_eq!(scan("42").unwrap(), vec![tok(Integer, "42")]);
    }

    #[test]
    fn just_a_negative_int() {
        assert_eq!(scan("-42").unwrap(), vec![tok(Integer, "-42")]);
    }

    #[test]
    fn just_a_float() {
        assert_eq!(scan("42.0").unwrap(), vec![tok(Float, "42.0")]);
    }

    #[test]
    fn just_a_string() {
        assert_eq!(scan("\"hi\"").unwrap(), vec![tok(Str, "hi")]);
    }

    #[test]
    fn just_a_bool() {
        assert_eq!(scan("true").unwrap(), vec![tok(Boolean, "true")]);
    }

    #[test]
    fn just_nil() {
        assert_eq!(scan("nil").unwrap(), vec![tok(Null, "nil")]);
    }

    #[test]
    fn bare_identifier_is_var_ref() {
        assert_eq!(scan("answer").unwrap(), vec![tok(VarRef, "answer")]);
    }

    // -- strings and escapes --

    #[test]
    fn string_escapes() {
        assert_eq!(
            scan(r#""a\"b\\c\#d\ne""#).unwrap(),
            vec![tok(Str, "a\"b\\c#d\ne")]
        );
    }

    #[test]
    fn string_keeps_newlines() {
        assert_eq!(
            scan("yetAnother(\"with a string and a newline\nthis time\" y)").unwrap(),
            vec![
                tok(CallStart, "yetAnother("),
                tok(Str, "with a string and a newline\nthis time"),
                tok(VarRef, "y"),
                tok(CallEnd, ")"),
            ]
        );
    }

    #[test]
    fn unterminated_string_errors() {
        let err = scan("\"hello").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedString);
    }

    // -- comments --

    #[test]
    fn comment_is_trimmed() {
        assert_eq!(
            scan("# just a note #").unwrap(),
            vec![tok(Comment, "just a note")]
        );
    }

    #[test]
    fn escaped_hash_stays_in_comment() {
        assert_eq!(
            scan(r"# I can comment inline using \# to escape the hash sign #").unwrap(),
            vec![tok(Comment, "I can comment inline using # to escape the hash sign")]
        );
    }

    #[test]
    fn unterminated_comment_errors() {
        let err = scan("# dangling").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedComment);
    }

    // -- calls --

    #[test]
    fn simple_call() {
        assert_eq!(
            scan("func1(1 2 3)").unwrap(),
            vec![
                tok(CallStart, "func1("),
                tok(Integer, "1"),
                tok(Integer, "2"),
                tok(Integer, "3"),
                tok(CallEnd, ")"),
            ]
        );
    }

    #[test]
    fn call_without_args() {
        assert_eq!(
            scan("func()").unwrap(),
            vec![tok(CallStart, "func("), tok(CallEnd, ")")]
        );
    }

    #[test]
    fn call_with_escaped_quotes() {
        assert_eq!(
            scan(r#"test-function-1(1 2 "hello \" mean\"world!\"")"#).unwrap(),
            vec![
                tok(CallStart, "test-function-1("),
                tok(Integer, "1"),
                tok(Integer, "2"),
                tok(Str, "hello \" mean\"world!\""),
                tok(CallEnd, ")"),
            ]
        );
    }

    #[test]
    fn nested_calls() {
        assert_eq!(
            scan("sin(cos(tan(0)))").unwrap(),
            vec![
                tok(CallStart, "sin("),
                tok(CallStart, "cos("),
                tok(CallStart, "tan("),
                tok(Integer, "0"),
                tok(CallEnd, ")"),
                tok(CallEnd, ")"),
                tok(CallEnd, ")"),
            ]
        );
    }

    #[test]
    fn sequential_calls_get_terminators() {
        assert_eq!(
            scan("add(1 2) sub(5 3)").unwrap(),
            vec![
                tok(CallStart, "add("),
                tok(Integer, "1"),
                tok(Integer, "2"),
                tok(CallEnd, ")"),
                tok(Terminator, ";"),
                tok(CallStart, "sub("),
                tok(Integer, "5"),
                tok(Integer, "3"),
                tok(CallEnd, ")"),
            ]
        );
    }

    #[test]
    fn literal_semicolon_not_duplicated() {
        assert_eq!(
            scan("func(); other(x= 4.5 do = false)").unwrap(),
            vec![
                tok(CallStart, "func("),
                tok(CallEnd, ")"),
                tok(Terminator, ";"),
                tok(CallStart, "other("),
                tok(NamedArg, "x="),
                tok(Float, "4.5"),
                tok(NamedArg, "do="),
                tok(Boolean, "false"),
                tok(CallEnd, ")"),
            ]
        );
    }

    #[test]
    fn missing_closing_paren_errors() {
        let err = scan("test-function-1(1 2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParenMismatch);
    }

    #[test]
    fn lone_open_call_errors() {
        let err = scan("musthaveclosingbracket(").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedFunc);
    }

    #[test]
    fn garbage_statement_errors() {
        assert!(scan("this is not a valid statement I believe(").is_err());
    }

    // -- named arguments --

    #[test]
    fn named_arguments() {
        assert_eq!(
            scan(r#"test-function-1(x=1 y=2 str="hello")"#).unwrap(),
            vec![
                tok(CallStart, "test-function-1("),
                tok(NamedArg, "x="),
                tok(Integer, "1"),
                tok(NamedArg, "y="),
                tok(Integer, "2"),
                tok(NamedArg, "str="),
                tok(Str, "hello"),
                tok(CallEnd, ")"),
            ]
        );
    }

    #[test]
    fn named_argument_spacing_variants() {
        // x=1, x =1, x= 1, x = 1 all tokenize identically
        for src in [
            "f(x=123 y=50)",
            "f(x =123 y=50)",
            "f(x= 123 y=50)",
            "f(x = 123 y= 50)",
        ] {
            assert_eq!(
                scan(src).unwrap(),
                vec![
                    tok(CallStart, "f("),
                    tok(NamedArg, "x="),
                    tok(Integer, "123"),
                    tok(NamedArg, "y="),
                    tok(Integer, "50"),
                    tok(CallEnd, ")"),
                ],
                "source: {src}"
            );
        }
    }

    #[test]
    fn named_argument_with_empty_string() {
        assert_eq!(
            scan(r#"users(search="")"#).unwrap(),
            vec![
                tok(CallStart, "users("),
                tok(NamedArg, "search="),
                tok(Str, ""),
                tok(CallEnd, ")"),
            ]
        );
    }

    #[test]
    fn named_argument_with_nested_call() {
        assert_eq!(
            scan("add(x=1 y=subtract(1 2))").unwrap(),
            vec![
                tok(CallStart, "add("),
                tok(NamedArg, "x="),
                tok(Integer, "1"),
                tok(NamedArg, "y="),
                tok(CallStart, "subtract("),
                tok(Integer, "1"),
                tok(Integer, "2"),
                tok(CallEnd, ")"),
                tok(CallEnd, ")"),
            ]
        );
    }

    // -- assignments --

    #[test]
    fn single_assignment() {
        assert_eq!(
            scan("a: 100").unwrap(),
            vec![tok(Assign, "a:"), tok(Integer, "100")]
        );
    }

    #[test]
    fn assignments_split_into_statements() {
        assert_eq!(
            scan("x:10 y:20 z:add(x y)").unwrap(),
            vec![
                tok(Assign, "x:"),
                tok(Integer, "10"),
                tok(Terminator, ";"),
                tok(Assign, "y:"),
                tok(Integer, "20"),
                tok(Terminator, ";"),
                tok(Assign, "z:"),
                tok(CallStart, "add("),
                tok(VarRef, "x"),
                tok(VarRef, "y"),
                tok(CallEnd, ")"),
            ]
        );
    }

    #[test]
    fn assignment_from_string() {
        assert_eq!(
            scan("y: \"you can also escape \\\" in strings\"").unwrap(),
            vec![tok(Assign, "y:"), tok(Str, "you can also escape \" in strings")]
        );
    }

    #[test]
    fn empty_var_name_errors() {
        let err = scan(": hi").unwrap_err();
        assert_eq!(err.kind, ErrorKind::AssignNameMissing);
    }

    #[test]
    fn assignment_without_value_errors() {
        let err = scan("mustassignsomething:").unwrap_err();
        assert_eq!(err.kind, ErrorKind::AssignValueMissing);
    }

    #[test]
    fn double_assignment_errors() {
        // the first assignment never receives a value
        let err = scan("x: y: 1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::AssignValueMissing);
    }

    // -- argument references --

    #[test]
    fn arg_refs_in_call_and_assignments() {
        assert_eq!(
            scan("func($1 $2) x: $3 y: $4").unwrap(),
            vec![
                tok(CallStart, "func("),
                tok(ArgRef, "$1"),
                tok(ArgRef, "$2"),
                tok(CallEnd, ")"),
                tok(Terminator, ";"),
                tok(Assign, "x:"),
                tok(ArgRef, "$3"),
                tok(Terminator, ";"),
                tok(Assign, "y:"),
                tok(ArgRef, "$4"),
            ]
        );
    }

    #[test]
    fn bare_dollar_errors() {
        let err = scan("func($)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgRef);
    }

    // -- slices, rows, indexes --

    #[test]
    fn slice_literal() {
        assert_eq!(
            scan("{ 1 2 3 }").unwrap(),
            vec![
                tok(SliceStart, "{"),
                tok(Integer, "1"),
                tok(Integer, "2"),
                tok(Integer, "3"),
                tok(SliceEnd, "}"),
            ]
        );
    }

    #[test]
    fn matrix_literal() {
        assert_eq!(
            scan("{ <1 2> <3 4> }").unwrap(),
            vec![
                tok(SliceStart, "{"),
                tok(RowStart, "<"),
                tok(Integer, "1"),
                tok(Integer, "2"),
                tok(RowEnd, ">"),
                tok(RowStart, "<"),
                tok(Integer, "3"),
                tok(Integer, "4"),
                tok(RowEnd, ">"),
                tok(SliceEnd, "}"),
            ]
        );
    }

    #[test]
    fn assignment_of_matrix_then_index() {
        assert_eq!(
            scan("m: { <1 2> <3 4> } m[1 0]").unwrap(),
            vec![
                tok(Assign, "m:"),
                tok(SliceStart, "{"),
                tok(RowStart, "<"),
                tok(Integer, "1"),
                tok(Integer, "2"),
                tok(RowEnd, ">"),
                tok(RowStart, "<"),
                tok(Integer, "3"),
                tok(Integer, "4"),
                tok(RowEnd, ">"),
                tok(SliceEnd, "}"),
                tok(VarRef, "m"),
                tok(IndexStart, "["),
                tok(Integer, "1"),
                tok(Integer, "0"),
                tok(IndexEnd, "]"),
            ]
        );
    }

    #[test]
    fn chained_indexing() {
        assert_eq!(
            scan("a[1][0]").unwrap(),
            vec![
                tok(VarRef, "a"),
                tok(IndexStart, "["),
                tok(Integer, "1"),
                tok(IndexEnd, "]"),
                tok(IndexStart, "["),
                tok(Integer, "0"),
                tok(IndexEnd, "]"),
            ]
        );
    }

    #[test]
    fn call_inside_slice_does_not_end_statement() {
        assert_eq!(
            scan("x: { add(1 2) 3 }").unwrap(),
            vec![
                tok(Assign, "x:"),
                tok(SliceStart, "{"),
                tok(CallStart, "add("),
                tok(Integer, "1"),
                tok(Integer, "2"),
                tok(CallEnd, ")"),
                tok(Integer, "3"),
                tok(SliceEnd, "}"),
            ]
        );
    }

    #[test]
    fn unbalanced_slice_errors() {
        assert_eq!(scan("{ 1 2").unwrap_err().kind, ErrorKind::ParenMismatch);
        assert_eq!(scan("1 2 }").unwrap_err().kind, ErrorKind::ParenMismatch);
    }

    #[test]
    fn unbalanced_index_errors() {
        assert_eq!(scan("a[1").unwrap_err().kind, ErrorKind::ParenMismatch);
    }

    // -- for loops --

    #[test]
    fn for_loop_tokens() {
        assert_eq!(
            scan("for xs[ i v ]{ add(i v) } done").unwrap(),
            vec![
                tok(ForLoop, "for"),
                tok(VarRef, "xs"),
                tok(IndexStart, "["),
                tok(VarRef, "i"),
                tok(VarRef, "v"),
                tok(IndexEnd, "]"),
                tok(SliceStart, "{"),
                tok(CallStart, "add("),
                tok(VarRef, "i"),
                tok(VarRef, "v"),
                tok(CallEnd, ")"),
                tok(SliceEnd, "}"),
                tok(Done, "done"),
            ]
        );
    }

    #[test]
    fn keywords_inside_strings_stay_strings() {
        assert_eq!(scan("\"for\"").unwrap(), vec![tok(Str, "for")]);
        assert_eq!(scan("\"done\"").unwrap(), vec![tok(Str, "done")]);
    }

    // -- complex programs --

    #[test]
    fn operators_as_function_names() {
        assert_eq!(
            scan(r#"l:+(test-function-1(1 2 "hi, this will be printed") *(50 2)) +(l +(1 gx))"#)
                .unwrap(),
            vec![
                tok(Assign, "l:"),
                tok(CallStart, "+("),
                tok(CallStart, "test-function-1("),
                tok(Integer, "1"),
                tok(Integer, "2"),
                tok(Str, "hi, this will be printed"),
                tok(CallEnd, ")"),
                tok(CallStart, "*("),
                tok(Integer, "50"),
                tok(Integer, "2"),
                tok(CallEnd, ")"),
                tok(CallEnd, ")"),
                tok(Terminator, ";"),
                tok(CallStart, "+("),
                tok(VarRef, "l"),
                tok(CallStart, "+("),
                tok(Integer, "1"),
                tok(VarRef, "gx"),
                tok(CallEnd, ")"),
                tok(CallEnd, ")"),
            ]
        );
    }

    #[test]
    fn inline_comment_inside_call() {
        assert_eq!(
            scan("x: c(5 \"hello world\" 1 # a note \\# here #)").unwrap(),
            vec![
                tok(Assign, "x:"),
                tok(CallStart, "c("),
                tok(Integer, "5"),
                tok(Str, "hello world"),
                tok(Integer, "1"),
                tok(Comment, "a note # here"),
                tok(CallEnd, ")"),
            ]
        );
    }

    #[test]
    fn kitchen_sink_statement_splitting() {
        let toks = scan("x: 25 y: 25 add(x y)").unwrap();
        assert_eq!(
            toks,
            vec![
                tok(Assign, "x:"),
                tok(Integer, "25"),
                tok(Terminator, ";"),
                tok(Assign, "y:"),
                tok(Integer, "25"),
                tok(Terminator, ";"),
                tok(CallStart, "add("),
                tok(VarRef, "x"),
                tok(VarRef, "y"),
                tok(CallEnd, ")"),
            ]
        );
    }

    #[test]
    fn value_then_call_gets_terminator() {
        assert_eq!(
            kinds_of("42 add(1 2)"),
            vec![Integer, Terminator, CallStart, Integer, Integer, CallEnd]
        );
    }

    // -- balance property --

    #[test]
    fn lex_balances_parens_outside_slices_only() {
        // parens belonging to a call nested in a slice are not counted
        assert!(scan("x: { add(1 2) }").is_ok());
        // top level imbalance is always caught
        assert!(scan("add(1 2").is_err());
    }

    mod balance_property {
        use super::*;
        use proptest::prelude::*;

        /// Build a syntactically plausible program from a shape seed and
        /// track its bracket imbalance. Call parens are only emitted at
        /// slice depth zero, where the scanner and the `lex` balance pass
        /// agree on the count.
        fn render(ops: &[u8]) -> (String, bool) {
            let mut src = String::new();
            let mut parens = 0i32;
            let mut slices = 0i32;
            let mut unbalanced = false;
            for (i, op) in ops.iter().enumerate() {
                let mut op = op % 6;
                if slices > 0 && (op == 0 || op == 1) {
                    op = 4;
                }
                match op {
                    0 => {
                        src.push_str("f( ");
                        parens += 1;
                    }
                    1 => {
                        src.push_str(") ");
                        parens -= 1;
                        if parens < 0 {
                            unbalanced = true;
                        }
                    }
                    2 => {
                        src.push_str("{ ");
                        slices += 1;
                    }
                    3 => {
                        src.push_str("} ");
                        slices -= 1;
                        if slices < 0 {
                            unbalanced = true;
                        }
                    }
                    4 => {
                        src.push_str(&format!("{i} "));
                    }
                    _ => {
                        src.push(' ');
                    }
                }
            }
            unbalanced = unbalanced || parens != 0 || slices != 0;
            (src, unbalanced)
        }

        proptest! {
            #[test]
            fn mismatch_reported_iff_unbalanced(ops in proptest::collection::vec(any::<u8>(), 2..40)) {
                let (src, unbalanced) = render(&ops);
                let mut t = Tokenizer::new(&src);
                let outcome = t.tokenize().and_then(|()| t.lex());
                if unbalanced {
                    prop_assert!(outcome.is_err(), "expected error for {src:?}");
                } else {
                    prop_assert!(outcome.is_ok(), "expected ok for {src:?}: {outcome:?}");
                }
            }
        }
    }
}
