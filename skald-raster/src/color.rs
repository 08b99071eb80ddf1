//! Channel-level color math.
//!
//! All helpers operate on `u32` lanes carrying a value at the depth named in
//! the function (0..=255 for 8-bit, 0..=65535 for 16-bit). Keeping the lanes
//! wide lets the intermediate products of the premultiply/unpremultiply
//! formulas stay exact before the final division.

/// Maximum channel value at 8-bit depth.
pub const MAX8: u32 = 0xff;

/// Maximum channel value at 16-bit depth.
pub const MAX16: u32 = 0xffff;

/// Widen an 8-bit channel to 16 bits.
///
/// `257 = 65535 / 255`, so 0 maps to 0 and 255 maps to 65535 exactly.
#[must_use]
pub const fn widen(c: u32) -> u32 {
    c * 257
}

/// Narrow a 16-bit channel to 8 bits.
#[must_use]
pub const fn narrow(c: u32) -> u32 {
    c >> 8
}

/// Premultiply a color channel by alpha at the given depth maximum.
///
/// `Cpm = C * A / Amax`. With `A = 0` every channel collapses to zero,
/// which is the canonical transparent-black pixel.
#[must_use]
pub const fn premultiply(c: u32, a: u32, max: u32) -> u32 {
    c * a / max
}

/// Undo premultiplication at the given depth maximum.
///
/// `C = Cpm * Amax / A` for `A > 0`; a fully transparent pixel has no
/// recoverable color and stays zero.
#[must_use]
pub const fn unpremultiply(c: u32, a: u32, max: u32) -> u32 {
    if a == 0 {
        0
    } else {
        c * max / a
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
