//! The Skald interpreter and its embedding surface.
//!
//! An [`Interpreter`] owns the language metadata, the variable and function
//! registries, and the run machinery. The host configures it once, registers
//! its variables and functions, and then calls [`Interpreter::run`] per
//! script. One interpreter runs one script at a time; registrations must not
//! happen while a run is in progress.
//!
//! ```
//! use skald_core::interpreter::Interpreter;
//! use skald_core::registry::ParamMeta;
//! use skald_core::value::Value;
//!
//! let interp = Interpreter::new("demo", "Demo", "A demo language", "0.1.0", "demo");
//! interp.register_func(
//!     "double",
//!     "Doubles a number",
//!     vec![ParamMeta::new("x", "int", Value::Int(0))],
//!     vec![ParamMeta::new("result", "int", Value::Int(0))],
//!     Box::new(|args| match &args[0] {
//!         Value::Int(x) => Ok(Value::Int(x * 2)),
//!         _ => Ok(Value::Nil),
//!     }),
//! );
//! let result = interp.run("double($1)", false, &[Value::Int(21)]).unwrap();
//! assert_eq!(result, Value::Int(42));
//! ```

mod eval;

use crate::error::ScriptResult;
use crate::parser;
use crate::registry::funcs::{FnBody, FnRegistry};
use crate::registry::vars::{VarGetFn, VarRegistry, VarSetFn};
use crate::registry::ParamMeta;
use crate::tokenizer::Tokenizer;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Editor theme
// ---------------------------------------------------------------------------

/// Color hints for editors and syntax highlighters embedding the language.
///
/// Purely descriptive metadata; the interpreter itself never reads it.
#[derive(Debug, Clone)]
pub struct ColorTheme {
    /// Editor background color.
    pub editor_background: String,
    /// Editor default foreground color.
    pub editor_foreground: String,
    /// Color for comments.
    pub comments: String,
    /// Color for string literals.
    pub strings: String,
    /// Color for numeric literals.
    pub numbers: String,
    /// Color for function names.
    pub functions: String,
    /// Color for variable assignments.
    pub variable_assignments: String,
    /// Color for keywords.
    pub keywords: String,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            editor_background: "#1E1E1E".to_string(),
            editor_foreground: "#D4D4D4".to_string(),
            comments: "#6A9955".to_string(),
            strings: "#CE9178".to_string(),
            numbers: "#B5CEA8".to_string(),
            functions: "#DCDCAA".to_string(),
            variable_assignments: "#9CDCFE".to_string(),
            keywords: "#C586C0".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// An embeddable interpreter instance.
///
/// Create one per embedding; there is no process-wide state.
pub struct Interpreter {
    /// Machine-readable language id, e.g. `"test-script"`.
    pub id: String,
    /// Display name, e.g. `"Test Script"`.
    pub name: String,
    /// Short description of the language.
    pub description: String,
    /// Version string.
    pub version: String,
    /// File extension (without dot).
    pub extension: String,
    /// Editor color hints.
    pub theme: ColorTheme,
    /// The variable registry.
    pub vars: VarRegistry,
    /// The function registry.
    pub funcs: FnRegistry,
}

impl Interpreter {
    /// Create an interpreter with the given language metadata and the
    /// default editor theme.
    #[must_use]
    pub fn new(id: &str, name: &str, description: &str, version: &str, extension: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            version: version.to_string(),
            extension: extension.to_string(),
            theme: ColorTheme::default(),
            vars: VarRegistry::new(),
            funcs: FnRegistry::new(),
        }
    }

    /// Replace the editor theme.
    #[must_use]
    pub fn with_theme(mut self, theme: ColorTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Register a host variable.
    ///
    /// `get` reads the current value from host state; `set` writes a value
    /// that already passed type and range validation.
    pub fn register_var(&self, meta: ParamMeta, get: VarGetFn, set: VarSetFn) {
        self.vars.register(meta, get, set);
    }

    /// Register a host function.
    pub fn register_func(
        &self,
        name: &str,
        description: &str,
        params: Vec<ParamMeta>,
        returns: Vec<ParamMeta>,
        body: FnBody,
    ) {
        self.funcs.register(name, description, params, returns, body);
    }

    /// Snapshot both registries; a later [`Interpreter::restore_state`]
    /// removes everything registered after this point.
    pub fn store_state(&self) {
        self.vars.store_state();
        self.funcs.store_state();
    }

    /// Remove all variables and functions registered since the last
    /// [`Interpreter::store_state`]. Idempotent.
    pub fn restore_state(&self) {
        self.vars.restore_state();
        self.funcs.restore_state();
    }

    /// Run a script and return the value of its last statement.
    ///
    /// `args` are exposed to the script as `$1`, `$2`, … (1-indexed). With
    /// `debug` set, each statement's AST is rendered to stderr before it is
    /// evaluated. The first error in tokenize → lex → parse → evaluate
    /// aborts the run and is returned unchanged; no partial result is
    /// produced.
    pub fn run(&self, script: &str, debug: bool, args: &[Value]) -> ScriptResult<Value> {
        let mut tokenizer = Tokenizer::new(script.trim());
        tokenizer.tokenize()?;
        tokenizer.lex()?;

        let Some(first) = parser::parse_program(tokenizer.tokens())? else {
            return Ok(Value::Nil);
        };

        let ctx = eval::EvalContext {
            vars: &self.vars,
            funcs: &self.funcs,
            args,
        };

        let mut result = Value::Nil;
        let mut current = Some(&first);
        while let Some(node) = current {
            if debug {
                eprintln!("{}", node.to_tree());
            }
            result = eval::evaluate(&ctx, node)?;
            current = node.next.as_deref();
        }
        Ok(result)
    }
}
