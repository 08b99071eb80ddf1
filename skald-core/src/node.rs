//! AST nodes produced by the parser.
//!
//! Statements are chained through the `next` link on the first node of each
//! statement; every statement is reachable from the first node and the chain
//! is acyclic by construction.

use std::fmt;
use std::fmt::Write as _;

// ---------------------------------------------------------------------------
// Node kinds
// ---------------------------------------------------------------------------

/// The kind of an AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Function call; `data` is the function name.
    Call,
    /// Raw argument payload (named argument values, `nil`).
    Arg,
    /// Variable reference; `data` is the variable name.
    VarRef,
    /// String literal.
    Str,
    /// Floating-point literal.
    Float,
    /// Integer literal.
    Integer,
    /// Boolean literal.
    Boolean,
    /// Assignment; `data` is the variable name, the single child the value.
    Assign,
    /// Statement terminator (never evaluated).
    Terminator,
    /// Script argument reference; `data` is the `$n` form.
    ArgRef,
    /// Slice literal; children are the elements.
    Slice,
    /// Matrix literal; children are `Row` nodes.
    Matrix,
    /// One row of a matrix literal.
    Row,
    /// Index expression; first child is the base, then 1 or 2 indices.
    Index,
    /// `for … done` loop; `data` holds the space-joined variable names,
    /// first child the target, remaining children the body statements.
    ForRange,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Call => "func",
            Self::Arg => "arg",
            Self::VarRef => "var",
            Self::Str => "string",
            Self::Float => "float",
            Self::Integer => "int",
            Self::Boolean => "bool",
            Self::Assign => "assign",
            Self::Terminator => "end",
            Self::ArgRef => "arg ref",
            Self::Slice => "slice",
            Self::Matrix => "matrix",
            Self::Row => "row",
            Self::Index => "index",
            Self::ForRange => "for",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A single node in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The kind, determining how the node is evaluated.
    pub kind: NodeKind,
    /// The payload: function name, literal text, variable name, …
    pub data: String,
    /// Child nodes (arguments, elements, body statements).
    pub children: Vec<Node>,
    /// Whether this is a named argument.
    pub named: bool,
    /// The parameter name when `named` is set.
    pub arg_name: String,
    /// The next statement in the chain.
    pub next: Option<Box<Node>>,
}

impl Node {
    /// Create a childless node.
    #[must_use]
    pub fn new(kind: NodeKind, data: impl Into<String>) -> Self {
        Self {
            kind,
            data: data.into(),
            children: Vec::new(),
            named: false,
            arg_name: String::new(),
            next: None,
        }
    }

    /// Create a node with children.
    #[must_use]
    pub fn with_children(kind: NodeKind, data: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            kind,
            data: data.into(),
            children,
            named: false,
            arg_name: String::new(),
            next: None,
        }
    }

    /// Append a statement to the end of the `next` chain.
    pub fn chain(&mut self, node: Node) {
        let mut current = self;
        while let Some(ref mut next) = current.next {
            current = next;
        }
        current.next = Some(Box::new(node));
    }

    /// Number of statements in the chain, including this one.
    #[must_use]
    pub fn statement_count(&self) -> usize {
        let mut count = 1;
        let mut current = self;
        while let Some(ref next) = current.next {
            count += 1;
            current = next;
        }
        count
    }

    /// Render the node (ignoring `next` links) as an indented tree, for
    /// debug runs.
    #[must_use]
    pub fn to_tree(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, "", true, true);
        out
    }

    fn render(&self, out: &mut String, prefix: &str, is_last: bool, is_root: bool) {
        if !is_root {
            out.push_str(prefix);
            out.push_str(if is_last { "└── " } else { "├── " });
        }

        let label = if self.data.is_empty() {
            format!("({})", self.kind)
        } else {
            self.data.clone()
        };
        if self.named {
            let _ = writeln!(out, "{}: {label}", self.arg_name);
        } else {
            let _ = writeln!(out, "{label}");
        }

        let child_prefix = if is_root {
            String::new()
        } else {
            format!("{prefix}{}", if is_last { "    " } else { "│   " })
        };
        for (i, child) in self.children.iter().enumerate() {
            child.render(out, &child_prefix, i + 1 == self.children.len(), false);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
