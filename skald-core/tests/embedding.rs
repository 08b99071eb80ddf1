//! Embedding integration tests: drive the public API the way a host
//! program would, including an image-processing pipeline built entirely
//! from registered functions.

use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

use skald_core::error::ErrorKind;
use skald_core::interpreter::{ColorTheme, Interpreter};
use skald_core::registry::ParamMeta;
use skald_core::value::Value;
use skald_raster::image::{PixelFormat, Raster};
use skald_raster::{convert, map};

fn int_of(value: &Value) -> isize {
    if let Value::Int(v) = value {
        *v
    } else {
        0
    }
}

/// A host language for image work: generate, filter, measure.
fn image_language() -> Interpreter {
    let interp = Interpreter::new(
        "pixelscript",
        "PixelScript",
        "A tiny image processing language",
        "1.0.0",
        "pxs",
    );

    interp.register_func(
        "gradient",
        "Generates a horizontal gradient test image",
        vec![
            ParamMeta::new("w", "int", Value::Int(4)).with_range(1.0, 4096.0),
            ParamMeta::new("h", "int", Value::Int(4)).with_range(1.0, 4096.0),
        ],
        vec![ParamMeta::new("res", "nrgba8", Value::Nil)],
        Box::new(|args| {
            let w = usize::try_from(int_of(&args[0])).unwrap_or(1);
            let h = usize::try_from(int_of(&args[1])).unwrap_or(1);
            let mut img = Raster::new(PixelFormat::Nrgba8, w, h);
            for y in 0..h {
                for x in 0..w {
                    let v = u32::try_from(x * 255 / w.max(1)).unwrap_or(0);
                    img.set_pixel(x, y, v, v, v, 255);
                }
            }
            Ok(Value::Image(img))
        }),
    );

    interp.register_func(
        "invert",
        "Inverts the image's color channels",
        vec![ParamMeta::new("img", "nrgba8", Value::Nil)],
        vec![ParamMeta::new("res", "nrgba8", Value::Nil)],
        Box::new(|args| {
            let Value::Image(img) = &args[0] else {
                return Ok(Value::Nil);
            };
            Ok(Value::Image(map::map(
                img,
                &|r, g, b, a| (255 - r, 255 - g, 255 - b, a),
                map::default_workers(),
            )))
        }),
    );

    interp.register_func(
        "premultiply",
        "Converts to the premultiplied 8-bit layout",
        vec![ParamMeta::new("img", "nrgba8", Value::Nil)],
        vec![ParamMeta::new("res", "rgba8", Value::Nil)],
        Box::new(|args| {
            let Value::Image(img) = &args[0] else {
                return Ok(Value::Nil);
            };
            Ok(Value::Image(convert::convert(img, PixelFormat::Rgba8)))
        }),
    );

    interp.register_func(
        "mean-red",
        "Mean of the red channel",
        vec![ParamMeta::new("img", "nrgba8", Value::Nil)],
        vec![ParamMeta::new("res", "float64", Value::F64(0.0))],
        Box::new(|args| {
            let Value::Image(img) = &args[0] else {
                return Ok(Value::Nil);
            };
            let (w, h) = (img.width(), img.height());
            if w == 0 || h == 0 {
                return Ok(Value::F64(0.0));
            }
            let mut sum = 0u64;
            for y in 0..h {
                for x in 0..w {
                    sum += u64::from(img.get_pixel(x, y).0);
                }
            }
            #[allow(clippy::cast_precision_loss)]
            Ok(Value::F64(sum as f64 / (w * h) as f64))
        }),
    );

    interp.store_state();
    interp
}

// ---------------------------------------------------------------------------
// Image pipelines
// ---------------------------------------------------------------------------

#[test]
fn filter_pipeline_runs_end_to_end() {
    let interp = image_language();
    // inverting twice restores the original mean
    let original = interp.run("mean-red(gradient(8 8))", false, &[]).unwrap();
    let twice = interp
        .run("mean-red(invert(invert(gradient(8 8))))", false, &[])
        .unwrap();
    assert_eq!(original, twice);
}

#[test]
fn pipeline_with_variables() {
    let interp = image_language();
    let result = interp
        .run(
            "img: gradient(4 4) inverted: invert(img) mean-red(inverted)",
            false,
            &[],
        )
        .unwrap();
    let Value::F64(mean) = result else {
        panic!("expected float, got {result:?}");
    };
    // gradient reds are 0, 63, 127, 191 → inverted 255, 192, 128, 64
    assert!((mean - 159.75).abs() < f64::EPSILON, "mean = {mean}");
}

#[test]
fn layout_conversion_through_declared_types() {
    let interp = image_language();
    // premultiply returns rgba8; feeding it back into a nrgba8 parameter
    // converts it at call time
    let result = interp
        .run("mean-red(premultiply(gradient(4 4)))", false, &[])
        .unwrap();
    let Value::F64(mean) = result else {
        panic!("expected float, got {result:?}");
    };
    // solid alpha, so premultiplication changes nothing
    assert!((mean - 95.25).abs() < f64::EPSILON, "mean = {mean}");
}

#[test]
fn image_values_survive_slices_and_loops() {
    let interp = image_language();
    let result = interp
        .run(
            "imgs: { gradient(2 2) gradient(4 4) } total: 0 \
             for imgs[ i img ]{ total: mean-red(img) } done total",
            false,
            &[],
        )
        .unwrap();
    // the loop overwrote `total` per image; the last one wins
    assert_eq!(result, Value::F64(95.25));
}

// ---------------------------------------------------------------------------
// Host state and sessions
// ---------------------------------------------------------------------------

#[test]
fn session_rollback_between_scripts() {
    let interp = image_language();

    interp.run("scratch: 1", false, &[]).unwrap();
    assert!(interp.vars.has("scratch"));

    interp.restore_state();
    assert!(!interp.vars.has("scratch"));
    assert!(interp.funcs.has("gradient"));

    // a fresh session can reuse the name
    interp.run("scratch: 2 scratch", false, &[]).unwrap();
    assert_eq!(interp.vars.get("scratch"), Some(Value::I64(2)));
}

#[test]
fn host_counter_variable() {
    let interp = image_language();
    let counter = Arc::new(AtomicIsize::new(0));
    let get = Arc::clone(&counter);
    let set = Arc::clone(&counter);
    interp.register_var(
        ParamMeta::new("count", "int", Value::Int(0)).with_range(0.0, 100.0),
        Box::new(move || Value::Int(get.load(Ordering::SeqCst))),
        Box::new(move |v| {
            if let Value::Int(i) = v {
                set.store(i, Ordering::SeqCst);
            }
        }),
    );

    interp.run("count: 42", false, &[]).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 42);

    let err = interp.run("count: 200", false, &[]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::OutOfBounds);
    assert_eq!(counter.load(Ordering::SeqCst), 42);
}

#[test]
fn language_metadata_is_exposed() {
    let interp = image_language().with_theme(ColorTheme::default());
    assert_eq!(interp.id, "pixelscript");
    assert_eq!(interp.name, "PixelScript");
    assert_eq!(interp.extension, "pxs");
    assert!(!interp.theme.editor_background.is_empty());
    assert_eq!(
        interp.funcs.names(),
        vec![
            "gradient".to_string(),
            "invert".to_string(),
            "mean-red".to_string(),
            "premultiply".to_string(),
        ]
    );
}

#[test]
fn script_arguments_parameterize_pipelines() {
    let interp = image_language();
    let result = interp
        .run(
            "mean-red(gradient($1 $2))",
            false,
            &[Value::Int(4), Value::Int(4)],
        )
        .unwrap();
    assert_eq!(result, Value::F64(95.25));
}

#[test]
fn errors_carry_messages_for_hosts() {
    let interp = image_language();
    let err = interp.run("blur(gradient(2 2))", false, &[]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::FuncUnknown);
    assert_eq!(err.to_string(), "unknown function: blur");
}
