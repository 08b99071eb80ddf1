//! Token stream → AST parser.
//!
//! A cursor walks the validated token stream with one token of lookahead
//! (`next`) and one of look-behind (`prev`). The look-behind exists for a
//! single context-sensitive rule: a value token directly after a `name=`
//! token becomes a named argument. Top-level statements are chained through
//! the `next` link on their first node.

use crate::error::{ScriptError, ScriptResult};
use crate::node::{Node, NodeKind};
use crate::token::{Token, TokenKind};

// ---------------------------------------------------------------------------
// Program entry point
// ---------------------------------------------------------------------------

/// Parse a whole token stream into a chain of statements.
///
/// Returns `None` for programs with nothing to evaluate (empty input or a
/// lone comment). Single-token programs map straight to their literal node.
pub fn parse_program(tokens: &[Token]) -> ScriptResult<Option<Node>> {
    if tokens.len() == 1 {
        let token = &tokens[0];
        let node = match token.kind {
            TokenKind::Comment => return Ok(None),
            TokenKind::ArgRef => Node::new(NodeKind::ArgRef, &token.text),
            TokenKind::Integer => Node::new(NodeKind::Integer, &token.text),
            TokenKind::Float => Node::new(NodeKind::Float, &token.text),
            TokenKind::Str => Node::new(NodeKind::Str, &token.text),
            TokenKind::Boolean => Node::new(NodeKind::Boolean, &token.text),
            TokenKind::Null => Node::new(NodeKind::Arg, "nil"),
            _ => Node::new(NodeKind::VarRef, &token.text),
        };
        return Ok(Some(node));
    }

    let mut parser = Parser::new(tokens);
    let mut first: Option<Node> = None;

    while parser.advance() {
        if parser.curr_is(TokenKind::Terminator) {
            continue;
        }
        if let Some(node) = parser.parse_node()? {
            match first {
                Some(ref mut head) => head.chain(node),
                None => first = Some(node),
            }
        }
    }

    Ok(first)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// The token cursor.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: isize,
    curr: Option<&'a Token>,
    prev: Option<&'a Token>,
    next: Option<&'a Token>,
}

impl<'a> Parser<'a> {
    /// Create a parser over a token stream. Call [`Parser::advance`] before
    /// reading the first token.
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: -1,
            curr: None,
            prev: None,
            next: None,
        }
    }

    /// Move the cursor one token forward. Returns `false` at the end of the
    /// stream (`curr` then keeps its last value).
    fn advance(&mut self) -> bool {
        self.prev = self.curr;
        self.next = None;
        self.pos += 1;

        let pos = usize::try_from(self.pos).unwrap_or(usize::MAX);
        if pos >= self.tokens.len() {
            return false;
        }
        self.curr = Some(&self.tokens[pos]);
        self.next = self.tokens.get(pos + 1);
        true
    }

    fn curr_is(&self, kind: TokenKind) -> bool {
        self.curr.is_some_and(|t| t.kind == kind)
    }

    fn curr_kind(&self) -> Option<TokenKind> {
        self.curr.map(|t| t.kind)
    }

    fn curr_text(&self) -> &str {
        self.curr.map_or("", |t| t.text.as_str())
    }

    // -- expression forms --

    /// Parse one argument expression: a literal, variable reference, nested
    /// call, or slice. Used inside index brackets, where full statement
    /// syntax is not available.
    fn parse_argument(&mut self) -> ScriptResult<Option<Node>> {
        let Some(curr) = self.curr else {
            return Err(ScriptError::expected_argument());
        };

        match curr.kind {
            TokenKind::Comment => Ok(None),
            TokenKind::VarRef => Ok(Some(Node::new(NodeKind::VarRef, &curr.text))),
            TokenKind::ArgRef => Ok(Some(Node::new(NodeKind::ArgRef, &curr.text))),
            TokenKind::Integer => match curr.text.parse::<i64>() {
                Ok(v) => Ok(Some(Node::new(NodeKind::Integer, v.to_string()))),
                Err(_) => Err(ScriptError::token_not_valid(&curr.text)),
            },
            TokenKind::Float => match curr.text.parse::<f64>() {
                Ok(v) => Ok(Some(Node::new(NodeKind::Float, v.to_string()))),
                Err(_) => Err(ScriptError::token_not_valid(&curr.text)),
            },
            TokenKind::Str => Ok(Some(Node::new(NodeKind::Str, &curr.text))),
            TokenKind::Boolean => Ok(Some(Node::new(
                NodeKind::Boolean,
                curr.text.to_lowercase(),
            ))),
            TokenKind::Null => Ok(Some(Node::new(NodeKind::Arg, "nil"))),
            TokenKind::CallStart => self.parse_call().map(Some),
            TokenKind::SliceStart => self.parse_slice().map(Some),
            _ => Err(ScriptError::unexpected_token_type(&curr.kind.to_string())),
        }
    }

    /// Parse a function call. The cursor is on the `name(` token.
    fn parse_call(&mut self) -> ScriptResult<Node> {
        let name = self
            .curr_text()
            .strip_suffix('(')
            .unwrap_or(self.curr_text())
            .to_string();
        let mut node = Node::new(NodeKind::Call, name);

        while self.advance() {
            match self.curr_kind() {
                Some(TokenKind::CallEnd) => break,
                Some(TokenKind::Comment) => continue,
                // robustness when a call is embedded in a slice that closes
                // before the call's own parenthesis
                Some(TokenKind::SliceEnd) => break,
                _ => {}
            }
            if let Some(arg) = self.parse_node()? {
                node.children.push(arg);
            }
        }

        Ok(node)
    }

    /// Parse a slice literal `{ … }` or, when `<…>` rows appear, a matrix.
    fn parse_slice(&mut self) -> ScriptResult<Node> {
        let mut elements = Vec::new();
        let mut rows = Vec::new();
        let mut saw_row = false;

        while self.advance() {
            match self.curr_kind() {
                Some(TokenKind::SliceEnd) => break,
                Some(TokenKind::Space | TokenKind::Comment | TokenKind::Terminator) => continue,
                Some(TokenKind::RowStart) => {
                    saw_row = true;
                    let mut row = Node::new(NodeKind::Row, "");
                    while self.advance() {
                        match self.curr_kind() {
                            Some(TokenKind::RowEnd) => break,
                            Some(
                                TokenKind::Space | TokenKind::Comment | TokenKind::Terminator,
                            ) => continue,
                            _ => {}
                        }
                        if self.curr_text().is_empty() {
                            continue;
                        }
                        if let Some(element) = self.parse_node()? {
                            row.children.push(element);
                        }
                    }
                    rows.push(row);
                    continue;
                }
                _ => {}
            }
            if self.curr_text().is_empty() {
                continue;
            }
            if let Some(element) = self.parse_node()? {
                elements.push(element);
            }
        }

        if saw_row {
            Ok(Node::with_children(NodeKind::Matrix, "", rows))
        } else {
            Ok(Node::with_children(NodeKind::Slice, "", elements))
        }
    }

    /// Parse `for target[ vars ]{ body } done`. The cursor is on `for`.
    fn parse_for_range(&mut self) -> ScriptResult<Node> {
        let mut node = Node::new(NodeKind::ForRange, "");

        if !self.advance() {
            return Err(ScriptError::for_invalid_vars());
        }
        node.children
            .push(Node::new(NodeKind::VarRef, self.curr_text()));

        if !self.advance() || !self.curr_is(TokenKind::IndexStart) {
            return Err(ScriptError::for_invalid_vars());
        }

        let mut names: Vec<String> = Vec::new();
        while self.advance() {
            match self.curr_kind() {
                Some(TokenKind::IndexEnd | TokenKind::Terminator) => break,
                Some(TokenKind::Space | TokenKind::Comment) => continue,
                Some(TokenKind::VarRef) => names.push(self.curr_text().to_string()),
                _ => return Err(ScriptError::for_invalid_vars()),
            }
        }
        if names.is_empty() {
            return Err(ScriptError::for_invalid_vars());
        }
        node.data = names.join(" ");

        if !self.advance() {
            return Err(ScriptError::for_invalid_vars());
        }

        // the body is brace-delimited; `done` is the hard boundary
        let mut body = Vec::new();
        loop {
            let Some(curr) = self.curr else { break };
            match curr.kind {
                TokenKind::Done => break,
                TokenKind::SliceStart
                | TokenKind::SliceEnd
                | TokenKind::Space
                | TokenKind::Comment => {
                    if !self.advance() {
                        break;
                    }
                    continue;
                }
                _ => {}
            }
            if curr.text.is_empty() {
                if !self.advance() {
                    break;
                }
                continue;
            }

            if let Some(statement) = self.parse_node()? {
                body.push(statement);
            }
            if !self.advance() {
                break;
            }
        }

        if body.is_empty() {
            return Err(ScriptError::for_invalid_vars());
        }
        node.children.extend(body);

        Ok(node)
    }

    /// Parse one or more chained index operations onto `base`. The cursor is
    /// on the `[` token; on return it sits on the matching `]`.
    fn parse_index(&mut self, base: Node) -> ScriptResult<Node> {
        let mut depth = 1;
        let mut inner: Vec<Token> = Vec::new();
        while self.advance() {
            match self.curr_kind() {
                Some(TokenKind::IndexStart) => depth += 1,
                Some(TokenKind::IndexEnd) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            if let Some(t) = self.curr {
                inner.push(t.clone());
            }
        }
        if depth != 0 {
            return Err(ScriptError::unexpected_closing_paren());
        }
        if inner.is_empty() {
            return Err(ScriptError::expected_argument());
        }

        let mut sub = Parser::new(&inner);
        let mut indices: Vec<Node> = Vec::new();
        while sub.advance() {
            match sub.curr_kind() {
                Some(TokenKind::Terminator | TokenKind::Space) => continue,
                Some(TokenKind::IndexEnd) => break,
                _ => {}
            }
            if sub.curr_text().is_empty() {
                continue;
            }
            if let Some(n) = sub.parse_argument()? {
                indices.push(n);
                if indices.len() > 2 {
                    return Err(ScriptError::param_too_many("index"));
                }
            }
        }
        if indices.is_empty() {
            return Err(ScriptError::expected_argument());
        }

        let mut children = vec![base];
        children.extend(indices);
        Ok(Node::with_children(NodeKind::Index, "", children))
    }

    /// Parse one node from the stream: a statement or an argument within a
    /// call/slice context.
    fn parse_node(&mut self) -> ScriptResult<Option<Node>> {
        let Some(curr) = self.curr else {
            return Ok(None);
        };

        match curr.kind {
            TokenKind::Comment | TokenKind::Terminator => Ok(None),
            TokenKind::Str => Ok(Some(Node::new(NodeKind::Str, &curr.text))),
            TokenKind::ArgRef => Ok(Some(Node::new(NodeKind::ArgRef, &curr.text))),
            TokenKind::Null => Ok(Some(Node::new(NodeKind::Arg, "nil"))),
            TokenKind::ForLoop => self.parse_for_range().map(Some),
            TokenKind::CallStart => self.parse_call().map(Some),
            TokenKind::SliceStart => self.parse_slice().map(Some),
            TokenKind::SliceEnd | TokenKind::IndexEnd => Ok(None),
            TokenKind::CallEnd => {
                // recount parens over the whole stream; calls nested in
                // slices are balanced by their own context
                let mut parens = 0i32;
                let mut slice_depth = 0i32;
                for t in self.tokens {
                    match t.kind {
                        TokenKind::SliceStart => slice_depth += 1,
                        TokenKind::SliceEnd => slice_depth -= 1,
                        TokenKind::CallStart if slice_depth == 0 => parens += 1,
                        TokenKind::CallEnd if slice_depth == 0 => parens -= 1,
                        _ => {}
                    }
                }
                if parens < 0 {
                    return Err(ScriptError::unexpected_closing_paren());
                }
                if parens > 0 {
                    return Err(ScriptError::unexpected_opening_paren());
                }
                Ok(None)
            }
            TokenKind::Assign => {
                let name = curr.text.strip_suffix(':').unwrap_or(&curr.text).to_string();
                if name.is_empty() {
                    return Err(ScriptError::assign_missing_name());
                }
                if !self.advance() {
                    return Err(ScriptError::assign_missing_value());
                }
                let Some(value) = self.parse_node()? else {
                    return Err(ScriptError::assign_missing_value());
                };
                Ok(Some(Node::with_children(
                    NodeKind::Assign,
                    name,
                    vec![value],
                )))
            }
            _ => self.parse_default(),
        }
    }

    /// The fall-through arm of [`Parser::parse_node`]: literal tokens,
    /// variable references with chained indexing, and the look-behind rule
    /// that turns the token after `name=` into a named argument.
    fn parse_default(&mut self) -> ScriptResult<Option<Node>> {
        let Some(curr) = self.curr else {
            return Ok(None);
        };

        if curr.kind == TokenKind::Integer {
            if let Ok(v) = curr.text.parse::<i64>() {
                return Ok(Some(Node::new(NodeKind::Integer, v.to_string())));
            }
        }
        if curr.kind == TokenKind::Float {
            if let Ok(v) = curr.text.parse::<f64>() {
                return Ok(Some(Node::new(NodeKind::Float, v.to_string())));
            }
        }
        if curr.kind == TokenKind::Boolean {
            let text = curr.text.to_lowercase();
            if text.parse::<bool>().is_ok() {
                return Ok(Some(Node::new(NodeKind::Boolean, text)));
            }
        }
        if curr.kind == TokenKind::VarRef {
            let mut base = Node::new(NodeKind::VarRef, &curr.text);
            // fold any number of `[...]` groups into a left-associative
            // chain of index nodes
            while self.next.is_some_and(|t| t.kind == TokenKind::IndexStart) {
                if !self.advance() || !self.curr_is(TokenKind::IndexStart) {
                    break;
                }
                base = self.parse_index(base)?;
            }
            return Ok(Some(base));
        }

        if self.next.is_some_and(|t| t.kind == TokenKind::CallStart) {
            return self.parse_call().map(Some);
        }
        if curr.kind == TokenKind::IndexStart {
            // an index with no base expression to attach to
            return Err(ScriptError::expected_argument());
        }

        if !self.advance() {
            return Ok(None);
        }

        if self.prev.is_some_and(|t| t.kind == TokenKind::NamedArg) {
            let arg_name = self
                .prev
                .map(|t| t.text.trim_end_matches('=').to_string())
                .unwrap_or_default();
            let mut node = Node::new(NodeKind::Arg, self.curr_text());
            node.named = true;
            node.arg_name = arg_name;
            return Ok(Some(node));
        }

        Ok(Some(Node::new(NodeKind::Arg, self.curr_text())))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
