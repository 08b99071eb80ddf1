//! The variable registry.
//!
//! Variables couple a name and declared type to host-owned storage through a
//! pair of closures: `get` reads the current value, `set` writes it after
//! validation. Assigning to a name that was never registered creates a
//! registry-owned variable whose type is inferred from the first value; its
//! closures capture registry-held storage, so scripts and hosts see the same
//! state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ScriptResult;
use crate::registry::state::RegistryState;
use crate::registry::{validate, ParamMeta};
use crate::value::Value;

/// Reads the variable's current value from host state.
pub type VarGetFn = Box<dyn Fn() -> Value + Send>;

/// Writes a validated value into host state.
pub type VarSetFn = Box<dyn FnMut(Value) + Send>;

struct VarEntry {
    meta: ParamMeta,
    get: VarGetFn,
    set: VarSetFn,
    /// Script-created variables are dynamically typed and skip validation.
    dynamic: bool,
}

struct VarTable {
    data: HashMap<String, VarEntry>,
    state: RegistryState,
}

/// Mutex-guarded name → variable mapping.
pub struct VarRegistry {
    inner: Mutex<VarTable>,
}

impl VarRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VarTable {
                data: HashMap::new(),
                state: RegistryState::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VarTable> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a host variable. An existing entry with the same name is
    /// replaced.
    pub fn register(&self, meta: ParamMeta, get: VarGetFn, set: VarSetFn) {
        let mut table = self.lock();
        table.state.add(&meta.name);
        let name = meta.name.clone();
        table.data.insert(
            name,
            VarEntry {
                meta,
                get,
                set,
                dynamic: false,
            },
        );
    }

    /// Whether a variable with this name exists.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.lock().data.contains_key(name)
    }

    /// Read a variable's current value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        let table = self.lock();
        table.data.get(name).map(|entry| (entry.get)())
    }

    /// A variable's metadata.
    #[must_use]
    pub fn meta(&self, name: &str) -> Option<ParamMeta> {
        self.lock().data.get(name).map(|entry| entry.meta.clone())
    }

    /// Write a variable, creating it when absent.
    ///
    /// Existing variables validate the value against their declared type and
    /// bounds before the host setter runs; on failure host state is left
    /// untouched. A new variable infers its declared type from the value and
    /// stores it in registry-owned storage.
    pub fn set(&self, name: &str, value: Value) -> ScriptResult<()> {
        let mut table = self.lock();

        if let Some(entry) = table.data.get_mut(name) {
            if !entry.dynamic {
                validate("variable", &entry.meta, &value)?;
            }
            (entry.set)(value);
            return Ok(());
        }

        let meta = ParamMeta::new(name, value.type_name(), value.clone());
        let cell = Arc::new(Mutex::new(value));
        let get_cell = Arc::clone(&cell);
        let get: VarGetFn = Box::new(move || {
            get_cell
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        });
        let set: VarSetFn = Box::new(move |v| {
            *cell.lock().unwrap_or_else(PoisonError::into_inner) = v;
        });

        table.state.add(name);
        table.data.insert(
            name.to_string(),
            VarEntry {
                meta,
                get,
                set,
                dynamic: true,
            },
        );
        Ok(())
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

    /// Delete every variable registered since the last snapshot.
    pub fn restore_state(&self) {
        let mut table = self.lock();
        for name in table.state.take_new() {
            table.data.remove(&name);
        }
    }
}

impl Default for VarRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
