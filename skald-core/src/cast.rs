//! The value coercion engine.
//!
//! [`cast`] converts a [`Value`] to a named target type. Conversion is total
//! over the supported pairs and *saturating* on overflow:
//!
//! - out-of-range floats and integers clamp to the target's min/max;
//! - negative values become 0 for unsigned targets;
//! - `NaN` becomes 0 for any integral target;
//! - ±∞ saturates to the target extreme;
//! - floats beyond `f32` range clamp to ±[`f32::MAX`].
//!
//! Strings parse as booleans (`true/false/t/f/1/0`, case-insensitive) or as
//! decimal/floating-point/scientific numbers; hex and other bases are
//! rejected. Bool ↔ numeric maps `true`/`false` to 1/0 and any nonzero
//! numeric to `true`. Image values convert between the four raster layouts
//! through `skald-raster`.

use skald_raster::convert;
use skald_raster::image::{PixelFormat, Raster};

use crate::error::{ScriptError, ScriptResult};
use crate::value::Value;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Coerce `value` to the type named `target`.
pub fn cast(value: &Value, target: &str) -> ScriptResult<Value> {
    match value {
        Value::Nil => Err(ScriptError::nil_cast()),
        Value::Image(img) => cast_image(img, target),
        Value::Str(s) => {
            if target == "string" {
                return Ok(value.clone());
            }
            let text = s.trim().to_lowercase();
            if let Some(b) = parse_bool_token(&text) {
                return cast_scalar(&Value::Bool(b), target);
            }
            if let Ok(f) = text.parse::<f64>() {
                return cast_scalar(&Value::F64(f), target);
            }
            Err(ScriptError::string_cast(&text, target))
        }
        v if Num::of(v).is_some() => cast_scalar(v, target),
        other => Err(ScriptError::unsupported_source_type(other.type_name())),
    }
}

// ---------------------------------------------------------------------------
// Scalar coercion
// ---------------------------------------------------------------------------

/// A numeric scalar lifted onto one of three wide lanes.
enum Num {
    I(i64),
    U(u64),
    F(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Bool(b) => Self::I(i64::from(*b)),
            Value::I8(v) => Self::I(i64::from(*v)),
            Value::I16(v) => Self::I(i64::from(*v)),
            Value::I32(v) => Self::I(i64::from(*v)),
            Value::I64(v) => Self::I(*v),
            Value::Int(v) => Self::I(*v as i64),
            Value::U8(v) => Self::U(u64::from(*v)),
            Value::U16(v) => Self::U(u64::from(*v)),
            Value::U32(v) => Self::U(u64::from(*v)),
            Value::U64(v) => Self::U(*v),
            Value::Uint(v) => Self::U(*v as u64),
            Value::F32(v) => Self::F(f64::from(*v)),
            Value::F64(v) => Self::F(*v),
            _ => return None,
        })
    }
}

/// Saturating conversion onto one integer target type. Float lanes rely on
/// Rust's saturating float-to-int casts (`NaN` → 0, ±∞ → extremes).
macro_rules! int_cast {
    ($t:ty, $variant:ident, $n:expr) => {{
        let v: $t = match $n {
            Num::I(i) => <$t>::try_from(i).unwrap_or(if i < 0 { <$t>::MIN } else { <$t>::MAX }),
            Num::U(u) => <$t>::try_from(u).unwrap_or(<$t>::MAX),
            Num::F(f) => f as $t,
        };
        Value::$variant(v)
    }};
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn cast_scalar(value: &Value, target: &str) -> ScriptResult<Value> {
    let Some(n) = Num::of(value) else {
        return Err(ScriptError::unsupported_source_type(value.type_name()));
    };

    Ok(match target {
        "bool" => Value::Bool(match n {
            Num::I(i) => i != 0,
            Num::U(u) => u != 0,
            Num::F(f) => f != 0.0,
        }),
        "string" => Value::Str(value.to_string()),
        "int8" => int_cast!(i8, I8, n),
        "int16" => int_cast!(i16, I16, n),
        "int32" => int_cast!(i32, I32, n),
        "int64" => int_cast!(i64, I64, n),
        "int" => int_cast!(isize, Int, n),
        "uint8" => int_cast!(u8, U8, n),
        "uint16" => int_cast!(u16, U16, n),
        "uint32" => int_cast!(u32, U32, n),
        "uint64" => int_cast!(u64, U64, n),
        "uint" => int_cast!(usize, Uint, n),
        "float32" => Value::F32(match n {
            Num::I(i) => i as f32,
            Num::U(u) => u as f32,
            Num::F(f) if f.is_finite() => {
                f.clamp(f64::from(f32::MIN), f64::from(f32::MAX)) as f32
            }
            Num::F(f) => f as f32,
        }),
        "float64" => Value::F64(match n {
            Num::I(i) => i as f64,
            Num::U(u) => u as f64,
            Num::F(f) => f,
        }),
        _ => return Err(ScriptError::unsupported_target_type(target)),
    })
}

/// Boolean spellings accepted from strings (already trimmed and lowercased).
fn parse_bool_token(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Image coercion
// ---------------------------------------------------------------------------

fn cast_image(img: &Raster, target: &str) -> ScriptResult<Value> {
    PixelFormat::from_name(target).map_or_else(
        || Err(ScriptError::cast_not_possible(img.format().name(), target)),
        |format| Ok(Value::Image(convert::convert(img, format))),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
