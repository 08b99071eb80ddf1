//! Runtime values for the Skald interpreter.
//!
//! Every expression evaluates to a [`Value`]: a tagged sum with one variant
//! per supported scalar type, strings, the nil value, typed homogeneous
//! sequences (1D and 2D) for floats, strings and images, heterogeneous
//! fallback sequences for mixed collections, and raster images in the four
//! supported layouts.
//!
//! A variant stores exactly the type its tag implies; coercion between
//! variants happens only through the cast engine ([`crate::cast`]).

use std::fmt;

use skald_raster::image::Raster;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The nil value.
    Nil,
    /// Boolean.
    Bool(bool),
    /// 8-bit signed integer.
    I8(i8),
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// Platform-sized signed integer.
    Int(isize),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit unsigned integer.
    U64(u64),
    /// Platform-sized unsigned integer.
    Uint(usize),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
    /// String.
    Str(String),
    /// Raster image (any of the four layouts).
    Image(Raster),
    /// Homogeneous float sequence.
    FloatSlice(Vec<f64>),
    /// Homogeneous string sequence.
    StrSlice(Vec<String>),
    /// Homogeneous image sequence (all the same layout).
    ImageSlice(Vec<Raster>),
    /// Homogeneous 2D float sequence with equal-length rows.
    FloatMatrix(Vec<Vec<f64>>),
    /// Homogeneous 2D string sequence with equal-length rows.
    StrMatrix(Vec<Vec<String>>),
    /// Heterogeneous sequence (numerics promoted to float64).
    Seq(Vec<Value>),
    /// Heterogeneous 2D sequence with equal-length rows.
    Rows(Vec<Vec<Value>>),
}

impl Value {
    /// The type name used by registries and the cast engine.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::I8(_) => "int8",
            Self::I16(_) => "int16",
            Self::I32(_) => "int32",
            Self::I64(_) => "int64",
            Self::Int(_) => "int",
            Self::U8(_) => "uint8",
            Self::U16(_) => "uint16",
            Self::U32(_) => "uint32",
            Self::U64(_) => "uint64",
            Self::Uint(_) => "uint",
            Self::F32(_) => "float32",
            Self::F64(_) => "float64",
            Self::Str(_) => "string",
            Self::Image(img) => img.format().name(),
            Self::FloatSlice(_) => "[]float64",
            Self::StrSlice(_) => "[]string",
            Self::ImageSlice(_) => "[]image",
            Self::FloatMatrix(_) => "[][]float64",
            Self::StrMatrix(_) => "[][]string",
            Self::Seq(_) => "[]any",
            Self::Rows(_) => "[][]any",
        }
    }

    /// Whether this is a numeric scalar (integer, unsigned or float).
    ///
    /// Booleans are not numeric.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::I8(_)
                | Self::I16(_)
                | Self::I32(_)
                | Self::I64(_)
                | Self::Int(_)
                | Self::U8(_)
                | Self::U16(_)
                | Self::U32(_)
                | Self::U64(_)
                | Self::Uint(_)
                | Self::F32(_)
                | Self::F64(_)
        )
    }

    /// Extract a numeric scalar as `f64`.
    #[expect(
        clippy::cast_precision_loss,
        reason = "numeric scripting values are promoted through f64 by design"
    )]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::I8(v) => Some(f64::from(*v)),
            Self::I16(v) => Some(f64::from(*v)),
            Self::I32(v) => Some(f64::from(*v)),
            Self::I64(v) => Some(*v as f64),
            Self::Int(v) => Some(*v as f64),
            Self::U8(v) => Some(f64::from(*v)),
            Self::U16(v) => Some(f64::from(*v)),
            Self::U32(v) => Some(f64::from(*v)),
            Self::U64(v) => Some(*v as f64),
            Self::Uint(v) => Some(*v as f64),
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        if let Self::Str(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Extract a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Extract an image.
    #[must_use]
    pub const fn as_image(&self) -> Option<&Raster> {
        if let Self::Image(img) = self {
            Some(img)
        } else {
            None
        }
    }

    /// Whether this value is one of the sequence variants (1D or 2D).
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(
            self,
            Self::FloatSlice(_)
                | Self::StrSlice(_)
                | Self::ImageSlice(_)
                | Self::FloatMatrix(_)
                | Self::StrMatrix(_)
                | Self::Seq(_)
                | Self::Rows(_)
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Image(img) => write!(f, "{img}"),
            Self::FloatSlice(xs) => write_list(f, xs),
            Self::StrSlice(xs) => write_list(f, xs),
            Self::ImageSlice(xs) => write_list(f, xs),
            Self::Seq(xs) => write_list(f, xs),
            Self::FloatMatrix(rows) => write_rows(f, rows),
            Self::StrMatrix(rows) => write_rows(f, rows),
            Self::Rows(rows) => write_rows(f, rows),
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "}}")
}

fn write_rows<T: fmt::Display>(f: &mut fmt::Formatter<'_>, rows: &[Vec<T>]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "<")?;
        for (j, item) in row.iter().enumerate() {
            if j > 0 {
                write!(f, " ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, ">")?;
    }
    write!(f, "}}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
