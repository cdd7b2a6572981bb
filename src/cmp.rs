//! Structural equality and ordering.

use crate::ctx::Context;
use crate::value::{Tag, Value};

/// Structural equality. Numeric tags compare across `Int`/`Dec` by
/// promoting the `Int` operand; `List`/`SExpr` compare element-wise with
/// a fast-fail on length; `Str`/`Sym`/`Err` compare bytes; `Null` is
/// always equal to `Null`; every other tag pairing (including any two
/// `Lambda`, `Builtin` or `Port` values, even the same value compared to
/// itself through two different handles) is `false`.
///
/// `Dict` equality is intentionally asymmetric: `a == b` iff every key of
/// `a` has a value in `b` (via `lookup`) that is itself `eq`. It does not
/// check that `b` has no extra keys, so `{} == {"x":1}` is `true` but not
/// the reverse. See DESIGN.md for why this asymmetry is kept rather than
/// "fixed".
pub fn eq(cx: &Context, a: Value, b: Value) -> bool {
  let ta = cx.tag(a);
  let tb = cx.tag(b);

  if ta.is_numeric() && tb.is_numeric() {
    return cx.as_dec(a) == cx.as_dec(b);
  }

  if ta != tb {
    return false;
  }

  match ta {
    Tag::Bool => cx.as_bool(a) == cx.as_bool(b),
    Tag::Str | Tag::Sym | Tag::Err => cx.str_as_bytes(a) == cx.str_as_bytes(b),
    Tag::List | Tag::SExpr => {
      let len = cx.seq_len(a);
      if len != cx.seq_len(b) {
        return false;
      }
      (0..len).all(|i| eq(cx, cx.seq_get(a, i), cx.seq_get(b, i)))
    }
    Tag::Dict => {
      let len = cx.dict_len(a);
      (0..len).all(|i| {
        let key = cx.dict_key_at(a, i);
        let val = cx.dict_val_at(a, i);
        let looked_up = cx.dict_lookup(b, key);
        cx.tag(looked_up) != Tag::Err && eq(cx, val, looked_up)
      })
    }
    Tag::Null => true,
    Tag::Int | Tag::Dec | Tag::Lambda | Tag::Builtin | Tag::Port | Tag::Uninit => false,
  }
}

/// Strict ordering: numeric tags compare across `Int`/`Dec` by
/// promotion; `Str`/`Sym`/`Err` compare lexicographically by byte; every
/// other pairing is `false` (lists, dicts, lambdas etc. have no defined
/// order).
pub fn gt(cx: &Context, a: Value, b: Value) -> bool {
  let ta = cx.tag(a);
  let tb = cx.tag(b);

  if ta.is_numeric() && tb.is_numeric() {
    return cx.as_dec(a) > cx.as_dec(b);
  }

  if ta != tb {
    return false;
  }

  match ta {
    Tag::Str | Tag::Sym | Tag::Err => cx.str_as_bytes(a) > cx.str_as_bytes(b),
    _ => false,
  }
}
