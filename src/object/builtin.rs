//! A host-implemented function: receives a single evaluated `List`-or-
//! `SExpr` of arguments and returns any value, including `Err`. May be
//! flagged "constant" to signal the evaluator it's pure and foldable.

use crate::ctx::Context;
use crate::value::Value;

/// Mirrors `scambuiltin_t`: a plain function pointer, not a closure —
/// built-ins don't capture state, they receive the interpreter context
/// and their evaluated argument list explicitly.
pub type BuiltinFn = fn(&Context, Value) -> Value;

#[derive(Clone, Copy)]
pub struct Builtin {
  func: BuiltinFn,
  is_const: bool,
}

impl Builtin {
  pub fn new(func: BuiltinFn, is_const: bool) -> Self {
    Self { func, is_const }
  }

  pub fn call(&self, cx: &Context, args: Value) -> Value {
    (self.func)(cx, args)
  }

  pub fn is_const(&self) -> bool {
    self.is_const
  }
}
