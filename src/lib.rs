//! A tree-walking interpreter's runtime value model and garbage
//! collector: a tagged value arena, sequence/string/dict containers, a
//! type lattice, structural comparison, canonical printing, and a
//! mark-and-sweep collector with root tracking. The tokenizer, parser,
//! evaluator and built-in bodies that would sit on top of this crate are
//! out of scope here — see each module's doc comment for the boundary.

mod cmp;
mod ctx;
mod error;
mod gc;
mod object;
mod print;
mod types;
mod value;

pub use cmp::{eq, gt};
pub use ctx::Context;
pub use error::{
  err, err_arity, err_eof, err_min_arity, err_seq_bounds, err_seq_range, err_str_bounds, err_type,
  err_unbound, PortError, MAX_ERROR_LEN,
};
pub use object::{Builtin, BuiltinFn, Dict, Lambda, Port, Seq, Str};
pub use print::{display, print_ast, print_debug, println};
pub use types::{narrowest, Type};
pub use value::{Tag, Value};

#[cfg(test)]
mod tests {
  use super::*;

  /// `(+ 1 2)` → `3`. No evaluator exists in this crate, so the
  /// "program" is assembled directly through `Context` the way an
  /// evaluator would build its result.
  #[test]
  fn scenario_addition() {
    let cx = Context::new();
    let result = cx.int(1 + 2);
    assert_eq!(display(&cx, result), "3");
  }

  /// `(define x [1 2.0 3])` then `x` → `[1 2.000000 3]`.
  #[test]
  fn scenario_define_and_print_list() {
    let cx = Context::new();
    let global = cx.dict(None);
    let list = cx.list();
    cx.seq_append(list, cx.int(1));
    cx.seq_append(list, cx.dec(2.0));
    cx.seq_append(list, cx.int(3));
    cx.dict_bind(global, cx.sym("x"), list);

    let x = cx.dict_lookup(global, cx.sym("x"));
    assert_eq!(display(&cx, x), "[1 2.000000 3]");
  }

  /// Binding `"a"` to `1` then `2` in a dict converges on the second
  /// value and the dict still prints with one entry.
  #[test]
  fn scenario_dict_bind_overwrite() {
    let cx = Context::new();
    let d = cx.dict(None);
    cx.dict_bind(d, cx.str("a"), cx.int(1));
    cx.dict_bind(d, cx.str("a"), cx.int(2));
    assert_eq!(display(&cx, d), "{\"a\":2}");
  }

  /// `((lambda [x] (* x x)) 5)` → `25`. No evaluator exists, so this
  /// directly exercises the lambda's call-frame construction the way an
  /// evaluator would.
  #[test]
  fn scenario_lambda_call() {
    let cx = Context::new();
    let closure = cx.dict(None);
    let params = cx.list();
    cx.seq_append(params, cx.sym("x"));
    let body = cx.sexpr();
    let l = cx.lambda(params, body, closure);

    let frame = cx.lambda_env(l);
    let bound_params = cx.lambda_params(l);
    let arg = cx.int(5);
    cx.dict_bind(frame, cx.seq_get(bound_params, 0), arg);

    let x = cx.dict_lookup(frame, cx.sym("x"));
    let result = cx.int(cx.as_int(x) * cx.as_int(x));
    assert_eq!(display(&cx, result), "25");
  }

  /// `(head [])` → a stable range error.
  #[test]
  fn scenario_head_of_empty_list_is_range_error() {
    let cx = Context::new();
    let list = cx.list();
    let result = cx.seq_pop(list, 0);
    assert_eq!(display(&cx, result), "Error: attempted sequence access out of range");
  }

  /// An unbound symbol lookup reports the symbol's name.
  #[test]
  fn scenario_unbound_symbol() {
    let cx = Context::new();
    let global = cx.dict(None);
    let result = cx.dict_lookup(global, cx.sym("undefined-symbol"));
    assert_eq!(display(&cx, result), "Error: unbound variable 'undefined-symbol'");
  }

  /// `copy(v)` is structurally equal to `v` and a distinct root, across
  /// every `eq`-comparable tag.
  #[test]
  fn property_copy_is_eq_and_distinct_root() {
    let cx = Context::new();
    let list = cx.list();
    cx.seq_append(list, cx.int(1));
    cx.seq_append(list, cx.str("x"));
    let d = cx.dict(None);
    cx.dict_bind(d, cx.str("k"), cx.int(9));
    cx.seq_append(list, d);

    let copied = cx.copy(list);
    assert_ne!(copied, list);
    assert!(eq(&cx, copied, list));
    assert!(cx.is_root(copied));
  }

  /// `print(copy(v)) == print(v)`.
  #[test]
  fn property_copy_preserves_printed_form() {
    let cx = Context::new();
    let v = cx.dec(1.5);
    let copied = cx.copy(v);
    assert_eq!(display(&cx, v), display(&cx, copied));
  }

  /// After any sequence of operations, a forced `collect()` leaves every
  /// reachable value intact.
  #[test]
  fn property_collect_preserves_reachable_values() {
    let cx = Context::new();
    let list = cx.list();
    for i in 0..5 {
      cx.seq_append(list, cx.int(i));
    }
    cx.collect();
    assert_eq!(cx.seq_len(list), 5);
    for i in 0..5 {
      assert_eq!(cx.as_int(cx.seq_get(list, i as usize)), i);
    }
  }

  /// Binding an unbindable key type leaves a dict's prior contents
  /// untouched.
  #[test]
  fn property_unbindable_keys_are_inert() {
    let cx = Context::new();
    let d = cx.dict(None);
    cx.dict_bind(d, cx.str("kept"), cx.int(1));
    cx.dict_bind(d, cx.null(), cx.int(2));
    assert_eq!(cx.dict_len(d), 1);
    let looked_up = cx.dict_lookup(d, cx.str("kept"));
    assert_eq!(cx.as_int(looked_up), 1);
  }

  /// A hand-rolled deterministic LCG stands in for `rand` (not part of
  /// the dependency stack) for property-style fuzzing: random sequence
  /// edits with post-conditions on `len` and element order.
  struct Lcg(u64);

  impl Lcg {
    fn next(&mut self) -> u64 {
      self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
      self.0
    }

    fn next_usize(&mut self, bound: usize) -> usize {
      if bound == 0 {
        0
      } else {
        (self.next() % bound as u64) as usize
      }
    }
  }

  #[test]
  fn fuzz_sequence_edits_preserve_length_invariants() {
    let cx = Context::new();
    let mut rng = Lcg(0xC0FFEE);
    let seq = cx.list();
    let mut shadow: Vec<i64> = Vec::new();

    for step in 0..500 {
      match rng.next() % 4 {
        0 => {
          let n = step as i64;
          cx.seq_append(seq, cx.int(n));
          shadow.push(n);
        }
        1 => {
          let n = step as i64;
          cx.seq_prepend(seq, cx.int(n));
          shadow.insert(0, n);
        }
        2 if !shadow.is_empty() => {
          let i = rng.next_usize(shadow.len());
          let popped = cx.seq_pop(seq, i);
          if cx.tag(popped) != Tag::Err {
            shadow.remove(i);
          }
        }
        _ => {
          cx.collect();
        }
      }
      assert_eq!(cx.seq_len(seq), shadow.len());
    }

    for (i, &expected) in shadow.iter().enumerate() {
      assert_eq!(cx.as_int(cx.seq_get(seq, i)), expected);
    }
  }
}
