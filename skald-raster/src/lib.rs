//! Raster image support for the Skald scripting language.
//!
//! Provides the in-memory pixel model the interpreter's image values are
//! built on: 8- and 16-bit RGBA buffers in premultiplied and
//! non-premultiplied layouts, conversions between all four, and a
//! row-parallel per-pixel map. Image file I/O is deliberately absent; hosts
//! decode and encode however they like and hand buffers across.

pub mod color;
pub mod convert;
pub mod image;
pub mod map;
