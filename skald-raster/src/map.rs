//! Row-parallel per-pixel processing.
//!
//! [`map`] applies a pixel function to every pixel of a source raster and
//! collects the results into a freshly allocated output. Rows are split into
//! contiguous bands of `ceil(height / workers)` rows and each band is
//! processed by one worker on the rayon pool. Bands write to disjoint slices
//! of the output buffer, so the result is deterministic even though band
//! completion order is not. Workers are joined before the call returns;
//! partial output is never observable.
//!
//! The pixel function receives and returns `(r, g, b, a)` lanes at the
//! *source* depth for reads and the *output* depth for writes; for the
//! common same-format [`map`] the two coincide.

use crate::image::{PixelFormat, Raster};

/// A per-pixel transform on `u32` channel lanes.
pub type PixelFn = dyn Fn(u32, u32, u32, u32) -> (u32, u32, u32, u32) + Sync;

/// The default worker count: the host's logical CPU count.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

/// Apply `f` to every pixel, producing a raster of the same layout.
#[must_use]
pub fn map(src: &Raster, f: &PixelFn, workers: usize) -> Raster {
    map_to(src, src.format(), f, workers)
}

/// Apply `f` to every pixel, producing a raster of layout `format`.
///
/// Used by the conversion pipeline, where `f` carries the depth/alpha
/// channel math and the output layout differs from the input.
#[must_use]
pub fn map_to(src: &Raster, format: PixelFormat, f: &PixelFn, workers: usize) -> Raster {
    let width = src.width();
    let height = src.height();
    let mut out = Raster::new(format, width, height);

    if width == 0 || height == 0 {
        return out;
    }

    let workers = workers.max(1);
    let band_rows = height.div_ceil(workers);

    match &mut out {
        Raster::Nrgba8(p) | Raster::Rgba8(p) => {
            process_bands(&mut p.pix, src, f, width, band_rows);
        }
        Raster::Nrgba16(p) | Raster::Rgba16(p) => {
            process_bands(&mut p.pix, src, f, width, band_rows);
        }
    }

    out
}

/// A channel type a `u32` lane can be stored into.
trait Lane: Copy + Send {
    fn from_lane(v: u32) -> Self;
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "lanes carry values at the buffer's depth"
)]
impl Lane for u8 {
    fn from_lane(v: u32) -> Self {
        v as Self
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "lanes carry values at the buffer's depth"
)]
impl Lane for u16 {
    fn from_lane(v: u32) -> Self {
        v as Self
    }
}

/// Split `pix` into bands of `band_rows` rows and process each on its own
/// rayon task. The chunking guarantees disjoint writes.
fn process_bands<C: Lane>(pix: &mut [C], src: &Raster, f: &PixelFn, width: usize, band_rows: usize) {
    let row_len = width * 4;

    rayon::scope(|s| {
        for (band, rows) in pix.chunks_mut(band_rows * row_len).enumerate() {
            s.spawn(move |_| {
                let y0 = band * band_rows;
                for (dy, row) in rows.chunks_mut(row_len).enumerate() {
                    let y = y0 + dy;
                    for x in 0..width {
                        let (r, g, b, a) = src.get_pixel(x, y);
                        let (r, g, b, a) = f(r, g, b, a);
                        row[x * 4] = C::from_lane(r);
                        row[x * 4 + 1] = C::from_lane(g);
                        row[x * 4 + 2] = C::from_lane(b);
                        row[x * 4 + 3] = C::from_lane(a);
                    }
                }
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
