//! Canonical textual rendering, plus `print_debug`/`print_ast` dumps for
//! inspecting a value tree during development.

use crate::ctx::Context;
use crate::value::{Tag, Value};

/// Renders `v` in the canonical format. `Null` renders as an empty
/// string — callers of the newline-terminating printer (`println`)
/// should skip the trailing newline for `Null` entirely; see
/// [`println`].
pub fn display(cx: &Context, v: Value) -> String {
  match cx.tag(v) {
    Tag::Int => cx.as_int(v).to_string(),
    Tag::Dec => format!("{:.6}", cx.as_dec(v)),
    Tag::Bool => cx.as_bool(v).to_string(),
    Tag::Str => format!("\"{}\"", cx.str_as_str(v)),
    Tag::Sym => cx.str_as_str(v),
    Tag::Err => format!("Error: {}", cx.str_as_str(v)),
    Tag::List => bracket(cx, v, '[', ']'),
    Tag::SExpr => bracket(cx, v, '(', ')'),
    Tag::Dict => {
      let len = cx.dict_len(v);
      let entries: Vec<String> = (0..len)
        .map(|i| {
          let k = cx.dict_key_at(v, i);
          let val = cx.dict_val_at(v, i);
          format!("{}:{}", display(cx, k), display(cx, val))
        })
        .collect();
      format!("{{{}}}", entries.join(" "))
    }
    Tag::Lambda => "<Scam function>".to_string(),
    Tag::Builtin => "<Scam builtin>".to_string(),
    Tag::Port => "<Scam port>".to_string(),
    Tag::Null => String::new(),
    Tag::Uninit => unreachable!("Uninit is never observable"),
  }
}

fn bracket(cx: &Context, v: Value, open: char, close: char) -> String {
  let len = cx.seq_len(v);
  let elements: Vec<String> = (0..len).map(|i| display(cx, cx.seq_get(v, i))).collect();
  format!("{open}{}{close}", elements.join(" "))
}

/// The newline-terminating printer: a no-op for `Null`, otherwise
/// `display(v)` followed by a newline.
pub fn println(cx: &Context, v: Value) -> Option<String> {
  if cx.tag(v) == Tag::Null {
    None
  } else {
    Some(format!("{}\n", display(cx, v)))
  }
}

/// `value (DEBUG_TYPE_NAME)`, e.g. `3 (SCAM_INT)` — a debugging aid
/// mirroring `scamval_print_debug`.
pub fn print_debug(cx: &Context, v: Value) -> String {
  format!("{} ({})", display(cx, v), cx.type_of(v).debug_name())
}

/// A recursive indented dump of an `SExpr` tree, for inspecting parser
/// output. Non-`SExpr` nodes print as leaves via [`display`]; `SExpr`
/// nodes print an `EXPR`/`EMPTY EXPR` header (annotated `(root)` at
/// `depth == 0`) followed by each child indented two spaces deeper.
/// Mirrors `scamval_print_ast`.
pub fn print_ast(cx: &Context, v: Value) -> String {
  let mut out = String::new();
  print_ast_at(cx, v, 0, &mut out);
  out
}

fn print_ast_at(cx: &Context, v: Value, depth: usize, out: &mut String) {
  let indent = "  ".repeat(depth);
  if cx.tag(v) == Tag::SExpr {
    let len = cx.seq_len(v);
    let root = if depth == 0 { " (root)" } else { "" };
    if len == 0 {
      out.push_str(&format!("{indent}EMPTY EXPR{root}\n"));
    } else {
      out.push_str(&format!("{indent}EXPR{root}\n"));
      for i in 0..len {
        print_ast_at(cx, cx.seq_get(v, i), depth + 1, out);
      }
    }
  } else {
    out.push_str(&format!("{indent}{}\n", display(cx, v)));
  }
}
