//! Value-level error construction ("Error-reporting helpers") plus the
//! one native Rust error type this crate surfaces: I/O failures on a
//! [`crate::object::Port`].

use crate::ctx::Context;
use crate::types::Type;
use crate::value::Value;

/// `Err` message bodies are truncated at this many bytes, mirroring the
/// reference C implementation's `MAX_ERROR_SIZE` /
/// `vsnprintf(ret->vals.s, MAX_ERROR_SIZE, ...)`. Longer formatted
/// messages are silently cut; this is contractual, not a bug — see
/// DESIGN.md.
pub const MAX_ERROR_LEN: usize = 100;

fn truncate(message: String) -> String {
  if message.len() <= MAX_ERROR_LEN {
    message
  } else {
    let mut cut = MAX_ERROR_LEN;
    while !message.is_char_boundary(cut) {
      cut -= 1;
    }
    message[..cut].to_string()
  }
}

/// Constructs an `Err` value from an already-formatted message, applying
/// the truncation limit. This is the primitive every other `err_*` helper
/// and `format_args!`-style call site goes through.
pub fn err(cx: &Context, message: impl Into<String>) -> Value {
  cx.alloc_err(&truncate(message.into()))
}

/// "attempted sequence access out of range" — `pop`/`delete` out of
/// bounds (`scamseq_pop`).
pub fn err_seq_range(cx: &Context) -> Value {
  err(cx, "attempted sequence access out of range")
}

/// "attempted sequence access out of bounds" — `subseq` out of bounds
/// (`scamseq_subseq`); kept as a distinct wording from the above, per the
/// original.
pub fn err_seq_bounds(cx: &Context) -> Value {
  err(cx, "attempted sequence access out of bounds")
}

/// "string access out of bounds" — `substr` out of bounds
/// (`scamstr_substr`).
pub fn err_str_bounds(cx: &Context) -> Value {
  err(cx, "string access out of bounds")
}

/// `'{name}' got {got} arg(s), expected {expected}`.
pub fn err_arity(cx: &Context, name: &str, got: usize, expected: usize) -> Value {
  err(
    cx,
    format!("'{name}' got {got} arg(s), expected {expected}"),
  )
}

/// `'{name}' got {got} arg(s), expected at least {expected}`.
pub fn err_min_arity(cx: &Context, name: &str, got: usize, expected: usize) -> Value {
  err(
    cx,
    format!("'{name}' got {got} arg(s), expected at least {expected}"),
  )
}

/// `'{name}' got {got} as arg {pos+1}, expected {expected}` — `pos` is
/// 0-indexed, the message is 1-indexed, matching `scamerr_type`.
pub fn err_type(cx: &Context, name: &str, pos: usize, got: Type, expected: Type) -> Value {
  err(
    cx,
    format!(
      "'{name}' got {} as arg {}, expected {}",
      got.display_name(),
      pos + 1,
      expected.display_name()
    ),
  )
}

/// "reached EOF while reading from a port".
pub fn err_eof(cx: &Context) -> Value {
  err(cx, "reached EOF while reading from a port")
}

/// "unbound variable '{name}'" / "unbound variable" — produced by
/// `Context::dict_lookup` on a terminal miss.
pub fn err_unbound(cx: &Context, key_name: Option<&str>) -> Value {
  match key_name {
    Some(name) => err(cx, format!("unbound variable '{name}'")),
    None => err(cx, "unbound variable"),
  }
}

/// Failures from the one place this crate touches the OS directly: a
/// [`crate::object::Port`]'s backing file handle.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
  #[error("could not open port '{0}': {1}")]
  Open(String, #[source] std::io::Error),
  #[error("port is closed")]
  Closed,
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncates_long_messages() {
    let long = "x".repeat(500);
    let cx = Context::new();
    let e = err(&cx, long);
    assert_eq!(cx.str_len(e), MAX_ERROR_LEN);
  }

  #[test]
  fn arity_message_format() {
    let cx = Context::new();
    let e = err_arity(&cx, "foo", 1, 2);
    assert_eq!(cx.str_as_str(e), "'foo' got 1 arg(s), expected 2");
  }

  #[test]
  fn min_arity_message_format() {
    let cx = Context::new();
    let e = err_min_arity(&cx, "foo", 1, 2);
    assert_eq!(
      cx.str_as_str(e),
      "'foo' got 1 arg(s), expected at least 2"
    );
  }

  #[test]
  fn type_message_is_one_indexed() {
    let cx = Context::new();
    let e = err_type(&cx, "foo", 0, Type::Str, Type::Int);
    assert_eq!(
      cx.str_as_str(e),
      "'foo' got string as arg 1, expected integer"
    );
  }

  #[test]
  fn unbound_with_and_without_name() {
    let cx = Context::new();
    let with_name = err_unbound(&cx, Some("x"));
    assert_eq!(cx.str_as_str(with_name), "unbound variable 'x'");
    let without_name = err_unbound(&cx, None);
    assert_eq!(cx.str_as_str(without_name), "unbound variable");
  }
}
