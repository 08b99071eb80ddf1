//! The function registry.
//!
//! Functions carry ordered parameter metadata (name, type, bounds, default)
//! and a host-supplied body. Invocation receives the argument vector already
//! bound to declared order by the evaluator; this module applies the
//! call-time finishing steps: variable substitution, per-parameter casting,
//! and range validation, then runs the body.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cast::cast;
use crate::error::{ScriptError, ScriptResult};
use crate::registry::state::RegistryState;
use crate::registry::vars::VarRegistry;
use crate::registry::{validate, ParamMeta};
use crate::value::Value;

/// A host function body. Arguments arrive in declared order, cast to their
/// declared types and validated.
pub type FnBody = Box<dyn Fn(&[Value]) -> ScriptResult<Value> + Send + Sync>;

/// Metadata describing a registered function.
#[derive(Debug, Clone)]
pub struct FnMeta {
    /// Unique function name.
    pub name: String,
    /// Human-readable description.
    pub desc: String,
    /// Ordered parameter metadata.
    pub params: Vec<ParamMeta>,
    /// Return value metadata (documentation only).
    pub returns: Vec<ParamMeta>,
}

struct FnEntry {
    meta: FnMeta,
    body: FnBody,
}

struct FnTable {
    data: HashMap<String, Arc<FnEntry>>,
    state: RegistryState,
}

/// Mutex-guarded name → function mapping.
pub struct FnRegistry {
    inner: Mutex<FnTable>,
}

impl FnRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(FnTable {
                data: HashMap::new(),
                state: RegistryState::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FnTable> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a function. An existing entry with the same name is
    /// replaced.
    pub fn register(
        &self,
        name: &str,
        desc: &str,
        params: Vec<ParamMeta>,
        returns: Vec<ParamMeta>,
        body: FnBody,
    ) {
        let mut table = self.lock();
        table.state.add(name);
        table.data.insert(
            name.to_string(),
            Arc::new(FnEntry {
                meta: FnMeta {
                    name: name.to_string(),
                    desc: desc.to_string(),
                    params,
                    returns,
                },
                body,
            }),
        );
    }

    /// Whether a function with this name exists.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.lock().data.contains_key(name)
    }

    /// A function's parameter metadata, for argument binding.
    #[must_use]
    pub fn params(&self, name: &str) -> Option<Vec<ParamMeta>> {
        self.lock()
            .data
            .get(name)
            .map(|entry| entry.meta.params.clone())
    }

    /// A function's full metadata.
    #[must_use]
    pub fn meta(&self, name: &str) -> Option<FnMeta> {
        self.lock().data.get(name).map(|entry| entry.meta.clone())
    }

    /// Invoke a function with arguments already bound to declared order.
    ///
    /// Before the body runs, each argument goes through three steps:
    ///
    /// 1. a string value equal to a registered variable's name is replaced
    ///    by that variable's current value (a documented quirk of the
    ///    language: string literals can shadow into variables at call time);
    /// 2. the value is cast to the parameter's declared type;
    /// 3. the result is validated against the parameter's bounds.
    ///
    /// The registry lock is not held while the body runs.
    pub fn invoke(&self, name: &str, args: Vec<Value>, vars: &VarRegistry) -> ScriptResult<Value> {
        let entry = {
            let table = self.lock();
            table
                .data
                .get(name)
                .cloned()
                .ok_or_else(|| ScriptError::func_unknown(name))?
        };

        let mut call_args = args;
        // pad missing trailing arguments with declared defaults
        while call_args.len() < entry.meta.params.len() {
            call_args.push(entry.meta.params[call_args.len()].def.clone());
        }

        for (i, param) in entry.meta.params.iter().enumerate() {
            if let Value::Str(s) = &call_args[i] {
                if let Some(substituted) = vars.get(s) {
                    call_args[i] = substituted;
                }
            }
            if !param.typ.is_empty() && param.typ != "any" {
                call_args[i] = cast(&call_args[i], &param.typ)?;
            }
            validate("parameter", param, &call_args[i])?;
        }

        (entry.body)(&call_args)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let table = self.lock();
        let mut names: Vec<String> = table.data.keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot the current key set as the rollback baseline.
    pub fn store_state(&self) {
        self.lock().state.store();
    }

    /// Delete every function registered since the last snapshot.
    pub fn restore_state(&self) {
        let mut table = self.lock();
        for name in table.state.take_new() {
            table.data.remove(&name);
        }
    }
}

impl Default for FnRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn registry_with_add() -> FnRegistry {
        let registry = FnRegistry::new();
        registry.register(
            "add",
            "Adds two numbers together",
            vec![
                ParamMeta::new("x", "int", Value::Int(0)),
                ParamMeta::new("y", "int", Value::Int(0)),
            ],
            vec![ParamMeta::new("result", "int", Value::Int(0))],
            Box::new(|args| {
                let x = if let Value::Int(v) = &args[0] { *v } else { 0 };
                let y = if let Value::Int(v) = &args[1] { *v } else { 0 };
                Ok(Value::Int(x + y))
            }),
        );
        registry
    }

    #[test]
    fn invoke_casts_arguments_to_declared_types() {
        let registry = registry_with_add();
        let vars = VarRegistry::new();
        let got = registry
            .invoke("add", vec![Value::I64(5), Value::F64(3.9)], &vars)
            .unwrap();
        assert_eq!(got, Value::Int(8));
    }

    #[test]
    fn invoke_parses_string_arguments() {
        let registry = registry_with_add();
        let vars = VarRegistry::new();
        let got = registry
            .invoke(
                "add",
                vec![Value::Str("5".into()), Value::Str("3".into())],
                &vars,
            )
            .unwrap();
        assert_eq!(got, Value::Int(8));
    }

    #[test]
    fn invoke_pads_missing_arguments_with_defaults() {
        let registry = registry_with_add();
        let vars = VarRegistry::new();
        let got = registry.invoke("add", vec![Value::Int(5)], &vars).unwrap();
        assert_eq!(got, Value::Int(5));
    }

    #[test]
    fn string_matching_variable_name_is_substituted() {
        let registry = registry_with_add();
        let vars = VarRegistry::new();
        vars.set("width", Value::I64(30)).unwrap();
        let got = registry
            .invoke(
                "add",
                vec![Value::Str("width".into()), Value::Int(1)],
                &vars,
            )
            .unwrap();
        assert_eq!(got, Value::Int(31));
    }

    #[test]
    fn unknown_function_errors() {
        let registry = FnRegistry::new();
        let vars = VarRegistry::new();
        let err = registry.invoke("ghost", vec![], &vars).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FuncUnknown);
    }

    #[test]
    fn out_of_range_parameter_aborts_call() {
        let registry = FnRegistry::new();
        registry.register(
            "clamp-test",
            "",
            vec![ParamMeta::new("x", "int", Value::Int(0)).with_range(0.0, 10.0)],
            vec![],
            Box::new(|_| Ok(Value::Bool(true))),
        );
        let vars = VarRegistry::new();
        let err = registry
            .invoke("clamp-test", vec![Value::Int(11)], &vars)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::OutOfBounds);
    }

    #[test]
    fn uncastable_argument_aborts_call() {
        let registry = registry_with_add();
        let vars = VarRegistry::new();
        let err = registry
            .invoke("add", vec![Value::Str("pony".into()), Value::Int(0)], &vars)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::StringCast);
    }

    #[test]
    fn restore_removes_functions_registered_after_store() {
        let registry = registry_with_add();
        registry.store_state();
        registry.register("temp", "", vec![], vec![], Box::new(|_| Ok(Value::Nil)));
        assert!(registry.has("temp"));

        registry.restore_state();
        assert!(!registry.has("temp"));
        assert!(registry.has("add"));

        registry.restore_state();
        assert_eq!(registry.names(), vec!["add".to_string()]);
    }
}
