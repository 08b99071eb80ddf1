//! AST evaluation.
//!
//! Walks nodes recursively and produces values. Argument binding for calls
//! happens here (defaults, named slots, positional fill); the finishing
//! steps (variable substitution, casting, range validation) live in the
//! function registry so hosts invoking functions directly get the same
//! semantics.

use crate::cast::cast;
use crate::error::{ScriptError, ScriptResult};
use crate::node::{Node, NodeKind};
use crate::registry::funcs::FnRegistry;
use crate::registry::vars::VarRegistry;
use crate::value::Value;

/// Everything an evaluation needs: the registries and the script arguments.
pub(crate) struct EvalContext<'a> {
    pub vars: &'a VarRegistry,
    pub funcs: &'a FnRegistry,
    pub args: &'a [Value],
}

/// Evaluate one node (one statement or sub-expression).
pub(crate) fn evaluate(ctx: &EvalContext<'_>, node: &Node) -> ScriptResult<Value> {
    match node.kind {
        NodeKind::ArgRef => eval_arg_ref(ctx, node),
        NodeKind::VarRef => ctx
            .vars
            .get(&node.data)
            .ok_or_else(|| ScriptError::var_undefined(&node.data)),
        NodeKind::Arg => {
            if node.data.is_empty() {
                return Err(ScriptError::input_empty());
            }
            if node.data == "nil" {
                return Ok(Value::Nil);
            }
            Ok(Value::Str(node.data.clone()))
        }
        NodeKind::Call => eval_call(ctx, node),
        NodeKind::Assign => {
            if node.children.len() != 1 {
                return Err(ScriptError::assign_invalid());
            }
            let value = evaluate(ctx, &node.children[0])?;
            ctx.vars.set(&node.data, value.clone())?;
            Ok(value)
        }
        NodeKind::Str => Ok(Value::Str(node.data.clone())),
        NodeKind::Integer => node
            .data
            .parse::<i64>()
            .map(Value::I64)
            .map_err(|_| ScriptError::token_not_valid(&node.data)),
        NodeKind::Float => node
            .data
            .parse::<f64>()
            .map(Value::F64)
            .map_err(|_| ScriptError::token_not_valid(&node.data)),
        NodeKind::Boolean => node
            .data
            .parse::<bool>()
            .map(Value::Bool)
            .map_err(|_| ScriptError::token_not_valid(&node.data)),
        NodeKind::Slice => eval_slice(ctx, node),
        NodeKind::Matrix => eval_matrix(ctx, node),
        NodeKind::Index => eval_index(ctx, node),
        NodeKind::ForRange => eval_for_range(ctx, node),
        NodeKind::Row | NodeKind::Terminator => {
            Err(ScriptError::unsupported_node_type(&node.kind.to_string()))
        }
    }
}

// ---------------------------------------------------------------------------
// Argument references
// ---------------------------------------------------------------------------

fn eval_arg_ref(ctx: &EvalContext<'_>, node: &Node) -> ScriptResult<Value> {
    let Ok(index) = node.data.trim_start_matches('$').parse::<i64>() else {
        return Err(ScriptError::arg_ref_invalid(&node.data));
    };
    let len = i64::try_from(ctx.args.len()).unwrap_or(i64::MAX);
    if index < 1 || index > len {
        return Err(ScriptError::arg_ref_out_of_range(index));
    }
    let slot = usize::try_from(index - 1).unwrap_or(usize::MAX);
    Ok(ctx.args[slot].clone())
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

fn eval_call(ctx: &EvalContext<'_>, node: &Node) -> ScriptResult<Value> {
    let name = &node.data;
    let Some(params) = ctx.funcs.params(name) else {
        return Err(ScriptError::func_unknown(name));
    };

    let mut ordered: Vec<Value> = params.iter().map(|p| p.def.clone()).collect();
    let mut positional: Vec<Value> = Vec::new();
    let mut named_mode = false;

    for child in &node.children {
        if child.named {
            named_mode = true;
            let Some(slot) = params.iter().position(|p| p.name == child.arg_name) else {
                return Err(ScriptError::param_unknown(&child.arg_name));
            };
            ordered[slot] = if child.children.is_empty() {
                Value::Str(child.data.clone())
            } else {
                evaluate(ctx, &child.children[0])?
            };
        } else {
            if named_mode {
                return Err(ScriptError::param_style_mismatch());
            }
            positional.push(evaluate(ctx, child)?);
        }
    }

    for (i, value) in positional.into_iter().enumerate() {
        if i >= ordered.len() {
            return Err(ScriptError::param_too_many(name));
        }
        ordered[i] = value;
    }

    ctx.funcs.invoke(name, ordered, ctx.vars)
}

// ---------------------------------------------------------------------------
// Slices and matrices
// ---------------------------------------------------------------------------

/// Promote numerics to `f64`, leave everything else alone.
fn promote(value: Value) -> Value {
    match value.as_f64() {
        Some(f) if value.is_numeric() => Value::F64(f),
        _ => value,
    }
}

fn eval_slice(ctx: &EvalContext<'_>, node: &Node) -> ScriptResult<Value> {
    let mut values = Vec::with_capacity(node.children.len());
    for child in &node.children {
        values.push(evaluate(ctx, child)?);
    }
    Ok(infer_slice(values))
}

/// Slice element-type inference: all-numeric → `[]float64`, all-string →
/// `[]string`, all-images-of-one-layout → `[]image`, otherwise a
/// heterogeneous sequence with numerics promoted to float64.
fn infer_slice(values: Vec<Value>) -> Value {
    if values.is_empty() {
        return Value::Seq(values);
    }

    if values.iter().all(Value::is_numeric) {
        let floats = values
            .iter()
            .filter_map(Value::as_f64)
            .collect::<Vec<f64>>();
        return Value::FloatSlice(floats);
    }

    if values.iter().all(|v| matches!(v, Value::Str(_))) {
        let strings = values
            .into_iter()
            .map(|v| match v {
                Value::Str(s) => s,
                _ => String::new(),
            })
            .collect();
        return Value::StrSlice(strings);
    }

    let uniform_image = match values.first() {
        Some(Value::Image(first)) => {
            let format = first.format();
            values
                .iter()
                .all(|v| matches!(v, Value::Image(img) if img.format() == format))
        }
        _ => false,
    };
    if uniform_image {
        let images = values
            .into_iter()
            .filter_map(|v| match v {
                Value::Image(img) => Some(img),
                _ => None,
            })
            .collect();
        return Value::ImageSlice(images);
    }

    Value::Seq(values.into_iter().map(promote).collect())
}

fn eval_matrix(ctx: &EvalContext<'_>, node: &Node) -> ScriptResult<Value> {
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(node.children.len());
    let mut expected_len: Option<usize> = None;

    for row in &node.children {
        if row.kind != NodeKind::Row {
            return Err(ScriptError::unsupported_node_type(&row.kind.to_string()));
        }
        let mut values = Vec::with_capacity(row.children.len());
        for child in &row.children {
            values.push(evaluate(ctx, child)?);
        }
        match expected_len {
            None => expected_len = Some(values.len()),
            Some(expected) if expected != values.len() => {
                let bound = expected.to_string();
                return Err(ScriptError::out_of_bounds_length(
                    "matrix",
                    "row",
                    &bound,
                    &bound,
                    values.len(),
                ));
            }
            Some(_) => {}
        }
        rows.push(values);
    }

    let has_elements = rows.iter().any(|row| !row.is_empty());
    if has_elements && rows.iter().flatten().all(Value::is_numeric) {
        let out = rows
            .iter()
            .map(|row| row.iter().filter_map(Value::as_f64).collect())
            .collect();
        return Ok(Value::FloatMatrix(out));
    }
    if has_elements && rows.iter().flatten().all(|v| matches!(v, Value::Str(_))) {
        let out = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|v| match v {
                        Value::Str(s) => s,
                        _ => String::new(),
                    })
                    .collect()
            })
            .collect();
        return Ok(Value::StrMatrix(out));
    }

    Ok(Value::Rows(
        rows.into_iter()
            .map(|row| row.into_iter().map(promote).collect())
            .collect(),
    ))
}

// ---------------------------------------------------------------------------
// Indexing
// ---------------------------------------------------------------------------

/// Evaluate an index expression and truncate it through float64, so that
/// `m[1]`, `m[1.0]` and `m["1"]` agree.
#[allow(clippy::cast_possible_truncation)]
fn index_of(ctx: &EvalContext<'_>, node: &Node) -> ScriptResult<i64> {
    let value = evaluate(ctx, node)?;
    match cast(&value, "float64")? {
        Value::F64(f) => Ok(f as i64),
        other => Err(ScriptError::cast_not_possible(other.type_name(), "float64")),
    }
}

fn checked(index: i64, len: usize) -> ScriptResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| ScriptError::arg_ref_out_of_range(index))
}

fn eval_index(ctx: &EvalContext<'_>, node: &Node) -> ScriptResult<Value> {
    if node.children.len() < 2 || node.children.len() > 3 {
        return Err(ScriptError::assign_invalid());
    }
    let base = evaluate(ctx, &node.children[0])?;
    let two_d = node.children.len() == 3;

    match base {
        Value::FloatMatrix(m) => {
            if !two_d {
                return Err(ScriptError::expected_argument());
            }
            let r = checked(index_of(ctx, &node.children[1])?, m.len())?;
            let c = checked(index_of(ctx, &node.children[2])?, m[r].len())?;
            Ok(Value::F64(m[r][c]))
        }
        Value::StrMatrix(m) => {
            if !two_d {
                return Err(ScriptError::expected_argument());
            }
            let r = checked(index_of(ctx, &node.children[1])?, m.len())?;
            let c = checked(index_of(ctx, &node.children[2])?, m[r].len())?;
            Ok(Value::Str(m[r][c].clone()))
        }
        Value::Rows(rows) => {
            let r = checked(index_of(ctx, &node.children[1])?, rows.len())?;
            if two_d {
                let c = checked(index_of(ctx, &node.children[2])?, rows[r].len())?;
                Ok(rows[r][c].clone())
            } else {
                Ok(Value::Seq(rows[r].clone()))
            }
        }
        Value::FloatSlice(xs) => {
            if two_d {
                return Err(ScriptError::cast_not_possible("index base", "[][]T"));
            }
            let i = checked(index_of(ctx, &node.children[1])?, xs.len())?;
            Ok(Value::F64(xs[i]))
        }
        Value::StrSlice(xs) => {
            if two_d {
                return Err(ScriptError::cast_not_possible("index base", "[][]T"));
            }
            let i = checked(index_of(ctx, &node.children[1])?, xs.len())?;
            Ok(Value::Str(xs[i].clone()))
        }
        Value::ImageSlice(xs) => {
            if two_d {
                return Err(ScriptError::cast_not_possible("index base", "[][]T"));
            }
            let i = checked(index_of(ctx, &node.children[1])?, xs.len())?;
            Ok(Value::Image(xs[i].clone()))
        }
        Value::Seq(xs) => {
            if two_d {
                return Err(ScriptError::cast_not_possible("index base", "[][]T"));
            }
            let i = checked(index_of(ctx, &node.children[1])?, xs.len())?;
            Ok(xs[i].clone())
        }
        other => Err(ScriptError::cast_not_possible(
            other.type_name(),
            "slice or slice of slices",
        )),
    }
}

// ---------------------------------------------------------------------------
// For-range loops
// ---------------------------------------------------------------------------

fn eval_for_range(ctx: &EvalContext<'_>, node: &Node) -> ScriptResult<Value> {
    if node.children.len() < 2 {
        return Err(ScriptError::for_invalid_vars());
    }
    let target = evaluate(ctx, &node.children[0])?;
    let names: Vec<&str> = node.data.split_whitespace().collect();
    if names.is_empty() {
        return Err(ScriptError::for_invalid_vars());
    }
    let body = &node.children[1..];

    match target {
        Value::FloatSlice(xs) => {
            for_1d(ctx, &names, body, xs.into_iter().map(Value::F64).collect())
        }
        Value::StrSlice(xs) => {
            for_1d(ctx, &names, body, xs.into_iter().map(Value::Str).collect())
        }
        Value::ImageSlice(xs) => {
            for_1d(ctx, &names, body, xs.into_iter().map(Value::Image).collect())
        }
        Value::Seq(xs) => for_1d(ctx, &names, body, xs),
        Value::FloatMatrix(m) => {
            let rows = m.iter().cloned().map(Value::FloatSlice).collect();
            let elems = m
                .into_iter()
                .map(|row| row.into_iter().map(Value::F64).collect())
                .collect();
            for_2d(ctx, &names, body, rows, elems)
        }
        Value::StrMatrix(m) => {
            let rows = m.iter().cloned().map(Value::StrSlice).collect();
            let elems = m
                .into_iter()
                .map(|row| row.into_iter().map(Value::Str).collect())
                .collect();
            for_2d(ctx, &names, body, rows, elems)
        }
        Value::Rows(m) => {
            let rows = m.iter().cloned().map(Value::Seq).collect();
            for_2d(ctx, &names, body, rows, m)
        }
        _ => Err(ScriptError::for_target_not_iterable()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn for_1d(
    ctx: &EvalContext<'_>,
    names: &[&str],
    body: &[Node],
    items: Vec<Value>,
) -> ScriptResult<Value> {
    if items.is_empty() {
        return Ok(Value::Nil);
    }
    if names.len() != 2 {
        return Err(ScriptError::for_invalid_vars());
    }
    for (i, item) in items.into_iter().enumerate() {
        ctx.vars.set(names[0], Value::F64(i as f64))?;
        ctx.vars.set(names[1], item)?;
        for statement in body {
            evaluate(ctx, statement)?;
        }
    }
    Ok(Value::Nil)
}

#[allow(clippy::cast_precision_loss)]
fn for_2d(
    ctx: &EvalContext<'_>,
    names: &[&str],
    body: &[Node],
    rows: Vec<Value>,
    elems: Vec<Vec<Value>>,
) -> ScriptResult<Value> {
    if elems.is_empty() {
        return Ok(Value::Nil);
    }
    match names.len() {
        3 => {
            for (i, row) in elems.into_iter().enumerate() {
                for (j, elem) in row.into_iter().enumerate() {
                    ctx.vars.set(names[0], Value::F64(i as f64))?;
                    ctx.vars.set(names[1], Value::F64(j as f64))?;
                    ctx.vars.set(names[2], elem)?;
                    for statement in body {
                        evaluate(ctx, statement)?;
                    }
                }
            }
            Ok(Value::Nil)
        }
        2 => {
            for (i, row) in rows.into_iter().enumerate() {
                ctx.vars.set(names[0], Value::F64(i as f64))?;
                ctx.vars.set(names[1], row)?;
                for statement in body {
                    evaluate(ctx, statement)?;
                }
            }
            Ok(Value::Nil)
        }
        _ => Err(ScriptError::for_invalid_vars()),
    }
}
