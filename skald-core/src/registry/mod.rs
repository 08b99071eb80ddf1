//! Variable and function registries.
//!
//! Registries map unique names to host-registered entries. All public
//! operations are serialized by a mutex per registry; hosts may register
//! from any thread but must not do so while a script is running on the same
//! interpreter. The snapshot/new-set protocol ([`state::RegistryState`])
//! gives embedders transactional rollback of registrations between test
//! cases or shell sessions.

pub mod funcs;
pub mod state;
pub mod vars;

use crate::error::{ScriptError, ScriptResult};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Parameter / variable metadata
// ---------------------------------------------------------------------------

/// Metadata describing a variable or a function parameter.
#[derive(Debug, Clone)]
pub struct ParamMeta {
    /// Name (parameter name or variable name).
    pub name: String,
    /// Declared type, e.g. `"int"`, `"float64"`, `"string"`, `"nrgba8"`.
    pub typ: String,
    /// Unit hint for documentation (`"px"`, `"°"`, …).
    pub unit: String,
    /// Human-readable description.
    pub desc: String,
    /// Lower bound: numeric value for numbers, length for strings.
    pub min: Option<f64>,
    /// Upper bound: numeric value for numbers, length for strings.
    pub max: Option<f64>,
    /// Default value, used for unbound parameters.
    pub def: Value,
}

impl ParamMeta {
    /// Create metadata with just a name, type and default; the rest empty.
    #[must_use]
    pub fn new(name: &str, typ: &str, def: Value) -> Self {
        Self {
            name: name.to_string(),
            typ: typ.to_string(),
            unit: String::new(),
            desc: String::new(),
            min: None,
            max: None,
            def,
        }
    }

    /// Attach a numeric range (or length bounds for strings).
    #[must_use]
    pub const fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Attach a unit hint.
    #[must_use]
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn with_desc(mut self, desc: &str) -> Self {
        self.desc = desc.to_string();
        self
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a value against declared type and bounds before it reaches host
/// state. `what` names the entry class in error messages (`"variable"` or
/// `"parameter"`).
#[allow(clippy::cast_precision_loss)]
pub(crate) fn validate(what: &str, meta: &ParamMeta, value: &Value) -> ScriptResult<()> {
    match meta.typ.as_str() {
        "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16" | "uint32"
        | "uint64" => {
            if !value.is_numeric() || matches!(value, Value::F32(_) | Value::F64(_)) {
                return Err(ScriptError::wrong_type(
                    what,
                    &meta.name,
                    &meta.typ,
                    value.type_name(),
                ));
            }
            check_bounds(what, meta, value)
        }
        "float32" | "float64" => {
            if !matches!(value, Value::F32(_) | Value::F64(_)) {
                return Err(ScriptError::wrong_type(
                    what,
                    &meta.name,
                    &meta.typ,
                    value.type_name(),
                ));
            }
            check_bounds(what, meta, value)
        }
        "bool" => {
            if !matches!(value, Value::Bool(_)) {
                return Err(ScriptError::wrong_type(
                    what,
                    &meta.name,
                    "bool",
                    value.type_name(),
                ));
            }
            Ok(())
        }
        "string" => {
            let Value::Str(s) = value else {
                return Err(ScriptError::wrong_type(
                    what,
                    &meta.name,
                    "string",
                    value.type_name(),
                ));
            };
            let len = s.chars().count();
            let too_short = meta.min.is_some_and(|min| (len as f64) < min);
            let too_long = meta.max.is_some_and(|max| (len as f64) > max);
            if too_short || too_long {
                return Err(ScriptError::out_of_bounds_length(
                    what,
                    &meta.name,
                    &bound_text(meta.min),
                    &bound_text(meta.max),
                    len,
                ));
            }
            Ok(())
        }
        // untyped, image and host-opaque entries are not range-checked
        _ => Ok(()),
    }
}

fn check_bounds(what: &str, meta: &ParamMeta, value: &Value) -> ScriptResult<()> {
    let Some(v) = value.as_f64() else {
        return Ok(());
    };
    let below = meta.min.is_some_and(|min| v < min);
    let above = meta.max.is_some_and(|max| v > max);
    if below || above {
        return Err(ScriptError::out_of_bounds(
            what,
            &meta.name,
            &bound_text(meta.min),
            &bound_text(meta.max),
            &value.to_string(),
        ));
    }
    Ok(())
}

fn bound_text(bound: Option<f64>) -> String {
    bound.map_or_else(|| "-".to_string(), |b| b.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn int_meta() -> ParamMeta {
        ParamMeta::new("pos", "int", Value::Int(0)).with_range(0.0, 10.0)
    }

    #[test]
    fn integer_in_range_passes() {
        assert!(validate("variable", &int_meta(), &Value::Int(5)).is_ok());
        assert!(validate("variable", &int_meta(), &Value::I64(10)).is_ok());
    }

    #[test]
    fn integer_out_of_range_fails() {
        let err = validate("variable", &int_meta(), &Value::Int(11)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OutOfBounds);
        let err = validate("variable", &int_meta(), &Value::I64(-1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OutOfBounds);
    }

    #[test]
    fn integer_rejects_other_types() {
        let err = validate("variable", &int_meta(), &Value::Str("5".into())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::WrongType);
        let err = validate("variable", &int_meta(), &Value::F64(5.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::WrongType);
    }

    #[test]
    fn float_accepts_both_widths() {
        let meta = ParamMeta::new("lat", "float64", Value::F64(0.0)).with_range(-90.0, 90.0);
        assert!(validate("parameter", &meta, &Value::F64(45.0)).is_ok());
        assert!(validate("parameter", &meta, &Value::F32(45.0)).is_ok());
        let err = validate("parameter", &meta, &Value::F64(91.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OutOfBounds);
    }

    #[test]
    fn string_length_bounds() {
        let meta = ParamMeta::new("tag", "string", Value::Str(String::new())).with_range(1.0, 3.0);
        assert!(validate("parameter", &meta, &Value::Str("ab".into())).is_ok());
        let err = validate("parameter", &meta, &Value::Str(String::new())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OutOfBoundsLength);
        let err = validate("parameter", &meta, &Value::Str("abcd".into())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OutOfBoundsLength);
    }

    #[test]
    fn bool_requires_bool() {
        let meta = ParamMeta::new("on", "bool", Value::Bool(false));
        assert!(validate("variable", &meta, &Value::Bool(true)).is_ok());
        let err = validate("variable", &meta, &Value::Int(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::WrongType);
    }

    #[test]
    fn untyped_entries_accept_anything() {
        let meta = ParamMeta::new("item", "any", Value::Nil);
        assert!(validate("variable", &meta, &Value::Str("x".into())).is_ok());
        assert!(validate("variable", &meta, &Value::FloatSlice(vec![1.0])).is_ok());
    }
}
