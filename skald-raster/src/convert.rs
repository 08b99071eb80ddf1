//! Conversions between the four pixel layouts.
//!
//! Every directed conversion composes at most two channel steps, always in
//! this order:
//!
//! 1. **depth change** — widen ×257 (8→16) or narrow >>8 (16→8), applied to
//!    all four channels;
//! 2. **alpha change** — premultiply or unpremultiply at the *target* depth,
//!    with fully transparent pixels collapsing to `(0, 0, 0, 0)`.
//!
//! Same-layout conversion is a plain clone. The heavy lifting runs on the
//! banded parallel map, one closure per conversion.

use crate::color;
use crate::image::{PixelFormat, Raster};
use crate::map::{default_workers, map_to};

/// Convert `src` to the given layout using the default worker count.
#[must_use]
pub fn convert(src: &Raster, target: PixelFormat) -> Raster {
    convert_with_workers(src, target, default_workers())
}

/// Convert `src` to the given layout on `workers` parallel workers.
#[must_use]
pub fn convert_with_workers(src: &Raster, target: PixelFormat, workers: usize) -> Raster {
    let source = src.format();
    if source == target {
        return src.clone();
    }

    let widen = source.depth() < target.depth();
    let narrow = source.depth() > target.depth();
    let max = target.channel_max();

    // (source premul, target premul) decides the alpha step.
    let premultiply = !source.is_premultiplied() && target.is_premultiplied();
    let unpremultiply = source.is_premultiplied() && !target.is_premultiplied();

    let f = move |r: u32, g: u32, b: u32, a: u32| {
        let (r, g, b, a) = if widen {
            (
                color::widen(r),
                color::widen(g),
                color::widen(b),
                color::widen(a),
            )
        } else if narrow {
            (
                color::narrow(r),
                color::narrow(g),
                color::narrow(b),
                color::narrow(a),
            )
        } else {
            (r, g, b, a)
        };

        if premultiply {
            if a == 0 {
                (0, 0, 0, 0)
            } else {
                (
                    color::premultiply(r, a, max),
                    color::premultiply(g, a, max),
                    color::premultiply(b, a, max),
                    a,
                )
            }
        } else if unpremultiply {
            if a == 0 {
                (0, 0, 0, 0)
            } else {
                (
                    color::unpremultiply(r, a, max),
                    color::unpremultiply(g, a, max),
                    color::unpremultiply(b, a, max),
                    a,
                )
            }
        } else {
            (r, g, b, a)
        }
    };

    map_to(src, target, &f, workers)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
