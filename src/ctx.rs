//! `Context`: the cloneable handle threaded through every constructor and
//! mutator, modeling the collector's global mutable state explicitly
//! rather than hiding it behind module-level statics.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error;
use crate::gc::{Gc, Payload};
use crate::object::{Builtin, BuiltinFn, Dict, Lambda, Port, Seq, Str};
use crate::types::{narrowest_types, Type};
use crate::value::{Tag, Value};

#[derive(Clone)]
pub struct Context {
  gc: Rc<RefCell<Gc>>,
}

impl Context {
  pub fn new() -> Self {
    Self {
      gc: Rc::new(RefCell::new(Gc::new())),
    }
  }

  pub fn with_threshold(threshold: usize) -> Self {
    Self {
      gc: Rc::new(RefCell::new(Gc::with_threshold(threshold))),
    }
  }

  /// Reclaims every live value regardless of reachability. Any `Value`
  /// handle from this `Context` is invalid after this call.
  pub fn teardown(&self) {
    self.gc.borrow_mut().teardown();
  }

  pub fn collect(&self) {
    self.gc.borrow_mut().collect();
  }

  pub fn live_count(&self) -> usize {
    self.gc.borrow().live_count()
  }

  pub fn heap_size(&self) -> usize {
    self.gc.borrow().heap_size()
  }

  pub fn tag(&self, v: Value) -> Tag {
    self.gc.borrow().tag(v)
  }

  pub fn type_of(&self, v: Value) -> Type {
    Type::from_tag(self.tag(v))
  }

  pub fn is_root(&self, v: Value) -> bool {
    self.gc.borrow().is_root(v)
  }

  pub fn set_root(&self, v: Value) {
    self.gc.borrow_mut().set_root(v);
  }

  pub fn unset_root(&self, v: Value) {
    self.gc.borrow_mut().unset_root(v);
  }

  pub fn set_pos(&self, v: Value, line: u32, col: u32) {
    self.gc.borrow_mut().set_pos(v, (line, col));
  }

  pub fn pos(&self, v: Value) -> Option<(u32, u32)> {
    self.gc.borrow().pos(v)
  }

  pub fn typecheck(&self, v: Value, ty: Type) -> bool {
    ty.accepts(self.tag(v))
  }

  // ---------------------------------------------------------------------
  // constructors & accessors
  // ---------------------------------------------------------------------

  pub fn int(&self, n: i64) -> Value {
    self.gc.borrow_mut().alloc(Payload::Int(n))
  }

  pub fn dec(&self, d: f64) -> Value {
    self.gc.borrow_mut().alloc(Payload::Dec(d))
  }

  pub fn bool(&self, b: bool) -> Value {
    self.gc.borrow_mut().alloc(Payload::Bool(b))
  }

  /// `Null` is allocated but never a root — it is the unique "no value"
  /// marker and is never owned by a container, so it has nothing to be
  /// rooted against. Mirrors `scamnull()` clearing `is_root` immediately.
  pub fn null(&self) -> Value {
    let mut gc = self.gc.borrow_mut();
    let v = gc.alloc(Payload::Null);
    gc.unset_root(v);
    v
  }

  pub fn str(&self, s: &str) -> Value {
    self.gc.borrow_mut().alloc(Payload::Str(Str::from_bytes(s.as_bytes())))
  }

  /// Takes ownership of an already-allocated buffer without copying.
  pub fn str_no_copy(&self, bytes: Vec<u8>) -> Value {
    self
      .gc
      .borrow_mut()
      .alloc(Payload::Str(Str::from_owned_bytes(bytes)))
  }

  pub fn sym(&self, s: &str) -> Value {
    self.gc.borrow_mut().alloc(Payload::Sym(Str::from_bytes(s.as_bytes())))
  }

  /// Internal: allocates an `Err` value holding `message` verbatim
  /// (truncation is the caller's — `error::err`'s — responsibility).
  pub(crate) fn alloc_err(&self, message: &str) -> Value {
    self.gc.borrow_mut().alloc(Payload::Err(Str::from_bytes(message.as_bytes())))
  }

  pub fn as_int(&self, v: Value) -> i64 {
    match self.gc.borrow().payload(v) {
      Payload::Int(n) => *n,
      _ => panic!("as_int called on a non-Int value"),
    }
  }

  /// One-way coercion: `Int -> Dec` widens; calling this on anything but
  /// `Int`/`Dec` is a contract violation.
  pub fn as_dec(&self, v: Value) -> f64 {
    match self.gc.borrow().payload(v) {
      Payload::Dec(d) => *d,
      Payload::Int(n) => *n as f64,
      _ => panic!("as_dec called on a non-numeric value"),
    }
  }

  pub fn as_bool(&self, v: Value) -> bool {
    match self.gc.borrow().payload(v) {
      Payload::Bool(b) => *b,
      _ => panic!("as_bool called on a non-Bool value"),
    }
  }

  // ---------------------------------------------------------------------
  // sequence container (List / SExpr)
  // ---------------------------------------------------------------------

  pub fn list(&self) -> Value {
    self.gc.borrow_mut().alloc(Payload::List(Seq::new()))
  }

  pub fn sexpr(&self) -> Value {
    self.gc.borrow_mut().alloc(Payload::SExpr(Seq::new()))
  }

  /// Assembles an `SExpr` from pre-constructed children, transferring
  /// their root status to the new parent. This is the parser-facing
  /// `sexpr_from_vals` entry point.
  pub fn sexpr_from_vals(&self, vals: Vec<Value>) -> Value {
    let mut gc = self.gc.borrow_mut();
    let mut seq = Seq::with_capacity(vals.len());
    for v in &vals {
      seq.append(*v);
    }
    let sexpr = gc.alloc(Payload::SExpr(seq));
    for v in vals {
      gc.unset_root(v);
    }
    sexpr
  }

  fn with_seq<R>(&self, v: Value, f: impl FnOnce(&Seq) -> R) -> R {
    match self.gc.borrow().payload(v) {
      Payload::List(seq) | Payload::SExpr(seq) => f(seq),
      _ => panic!("expected a List or SExpr value"),
    }
  }

  fn with_seq_mut<R>(&self, v: Value, f: impl FnOnce(&mut Seq) -> R) -> R {
    match self.gc.borrow_mut().payload_mut(v) {
      Payload::List(seq) | Payload::SExpr(seq) => f(seq),
      _ => panic!("expected a List or SExpr value"),
    }
  }

  pub fn seq_len(&self, v: Value) -> usize {
    self.with_seq(v, |s| s.len())
  }

  pub fn seq_get(&self, v: Value, i: usize) -> Value {
    self.with_seq(v, |s| s.get(i)).expect("seq_get index in bounds")
  }

  /// An `Err` the caller can propagate, on an out-of-range `i`.
  pub fn seq_pop(&self, v: Value, i: usize) -> Value {
    let popped = self.with_seq_mut(v, |s| s.pop(i));
    match popped {
      Some(val) => {
        self.set_root(val);
        val
      }
      None => error::err_seq_range(self),
    }
  }

  pub fn seq_delete(&self, v: Value, i: usize) {
    // the popped value is never rooted, so it becomes unreachable and is
    // reclaimed on the next collection.
    let _ = self.with_seq_mut(v, |s| s.pop(i));
  }

  /// The sequence takes ownership of `value`; its root flag is cleared.
  pub fn seq_append(&self, v: Value, value: Value) {
    self.with_seq_mut(v, |s| s.append(value));
    self.unset_root(value);
  }

  pub fn seq_prepend(&self, v: Value, value: Value) {
    self.with_seq_mut(v, |s| s.prepend(value));
    self.unset_root(value);
  }

  pub fn seq_insert(&self, v: Value, i: usize, value: Value) {
    self.with_seq_mut(v, |s| s.insert(i, value));
    self.unset_root(value);
  }

  /// Moves every element of `b` into `a`, leaving `b` empty; `b` itself
  /// is not freed.
  pub fn seq_concat(&self, a: Value, b: Value) {
    assert_ne!(a, b, "seq_concat requires two distinct sequences");
    let mut gc = self.gc.borrow_mut();
    // We can't borrow two arena slots mutably at once, so we extract
    // `b`'s storage, operate, then put the (now-empty) storage back.
    let mut b_seq = match gc.payload_mut(b) {
      Payload::List(seq) | Payload::SExpr(seq) => std::mem::take(seq),
      _ => panic!("expected a List or SExpr value"),
    };
    match gc.payload_mut(a) {
      Payload::List(seq) | Payload::SExpr(seq) => seq.concat(&mut b_seq),
      _ => panic!("expected a List or SExpr value"),
    }
    match gc.payload_mut(b) {
      Payload::List(seq) | Payload::SExpr(seq) => *seq = b_seq,
      _ => unreachable!(),
    }
  }

  /// A new sequence of the same tag containing deep copies of the
  /// selected elements. `Err` on an out-of-range range.
  pub fn seq_subseq(&self, v: Value, start: usize, end: usize) -> Value {
    let (tag, items) = {
      let gc = self.gc.borrow();
      match gc.payload(v) {
        Payload::List(seq) if seq.is_valid_range(start, end) => {
          (Tag::List, Some(seq.slice(start, end).to_vec()))
        }
        Payload::List(_) => (Tag::List, None),
        Payload::SExpr(seq) if seq.is_valid_range(start, end) => {
          (Tag::SExpr, Some(seq.slice(start, end).to_vec()))
        }
        Payload::SExpr(_) => (Tag::SExpr, None),
        _ => panic!("expected a List or SExpr value"),
      }
    };
    let Some(items) = items else {
      return error::err_seq_bounds(self);
    };
    let copies: Vec<Value> = items.into_iter().map(|item| self.copy(item)).collect();
    let mut seq = Seq::with_capacity(copies.len());
    for c in &copies {
      seq.append(*c);
      self.unset_root(*c);
    }
    let payload = match tag {
      Tag::List => Payload::List(seq),
      Tag::SExpr => Payload::SExpr(seq),
      _ => unreachable!(),
    };
    self.gc.borrow_mut().alloc(payload)
  }

  /// Reduce element tags pairwise under `narrowest`; `Any` on empty. The
  /// accumulator stays a `Type` across the whole fold instead of being
  /// re-concretized between steps — once it has widened to an abstract
  /// supertype, a further differing element widens it again rather than
  /// narrowing back down, matching `scamseq_narrowest_type`.
  pub fn seq_narrowest(&self, v: Value) -> Type {
    self.with_seq(v, |seq| {
      let mut iter = seq.iter();
      let Some(&first) = iter.next() else {
        return Type::Any;
      };
      let mut acc = Type::from_tag(self.tag(first));
      for &next in iter {
        acc = narrowest_types(acc, Type::from_tag(self.tag(next)));
      }
      acc
    })
  }

  // ---------------------------------------------------------------------
  // string container (Str / Sym / Err)
  // ---------------------------------------------------------------------

  fn with_str<R>(&self, v: Value, f: impl FnOnce(&Str) -> R) -> R {
    match self.gc.borrow().payload(v) {
      Payload::Str(s) | Payload::Sym(s) | Payload::Err(s) => f(s),
      _ => panic!("expected a Str, Sym or Err value"),
    }
  }

  fn with_str_mut<R>(&self, v: Value, f: impl FnOnce(&mut Str) -> R) -> R {
    match self.gc.borrow_mut().payload_mut(v) {
      Payload::Str(s) | Payload::Sym(s) | Payload::Err(s) => f(s),
      _ => panic!("expected a Str, Sym or Err value"),
    }
  }

  pub fn str_len(&self, v: Value) -> usize {
    self.with_str(v, |s| s.len())
  }

  pub fn str_as_bytes(&self, v: Value) -> Vec<u8> {
    self.with_str(v, |s| s.as_bytes().to_vec())
  }

  pub fn str_as_str(&self, v: Value) -> String {
    self.with_str(v, |s| s.as_str_lossy().into_owned())
  }

  pub fn str_get(&self, v: Value, i: usize) -> Option<u8> {
    self.with_str(v, |s| s.get(i))
  }

  pub fn str_set(&self, v: Value, i: usize, byte: u8) {
    self.with_str_mut(v, |s| s.set(i, byte));
  }

  pub fn str_pop(&self, v: Value, i: usize) -> Option<u8> {
    self.with_str_mut(v, |s| s.pop(i))
  }

  pub fn str_remove(&self, v: Value, start: usize, end: usize) {
    self.with_str_mut(v, |s| s.remove(start, end));
  }

  pub fn str_truncate(&self, v: Value, i: usize) {
    self.with_str_mut(v, |s| s.truncate(i));
  }

  pub fn str_substr(&self, v: Value, start: usize, end: usize) -> Value {
    let (tag, bytes) = {
      let gc = self.gc.borrow();
      match gc.payload(v) {
        Payload::Str(s) if s.is_valid_range(start, end) => (Tag::Str, Some(s.substr_bytes(start, end).to_vec())),
        Payload::Str(_) => (Tag::Str, None),
        Payload::Sym(s) if s.is_valid_range(start, end) => (Tag::Sym, Some(s.substr_bytes(start, end).to_vec())),
        Payload::Sym(_) => (Tag::Sym, None),
        Payload::Err(s) if s.is_valid_range(start, end) => (Tag::Err, Some(s.substr_bytes(start, end).to_vec())),
        Payload::Err(_) => (Tag::Err, None),
        _ => panic!("expected a Str, Sym or Err value"),
      }
    };
    let Some(bytes) = bytes else {
      return error::err_str_bounds(self);
    };
    let payload = match tag {
      Tag::Str => Payload::Str(Str::from_bytes(&bytes)),
      Tag::Sym => Payload::Sym(Str::from_bytes(&bytes)),
      Tag::Err => Payload::Err(Str::from_bytes(&bytes)),
      _ => unreachable!(),
    };
    self.gc.borrow_mut().alloc(payload)
  }

  /// Moves `b`'s bytes into `a`, leaving `b` empty.
  pub fn str_concat(&self, a: Value, b: Value) {
    assert_ne!(a, b, "str_concat requires two distinct strings");
    let mut gc = self.gc.borrow_mut();
    let mut b_str = match gc.payload_mut(b) {
      Payload::Str(s) | Payload::Sym(s) | Payload::Err(s) => std::mem::take(s),
      _ => panic!("expected a Str, Sym or Err value"),
    };
    match gc.payload_mut(a) {
      Payload::Str(s) | Payload::Sym(s) | Payload::Err(s) => s.concat(&mut b_str),
      _ => panic!("expected a Str, Sym or Err value"),
    }
    match gc.payload_mut(b) {
      Payload::Str(s) | Payload::Sym(s) | Payload::Err(s) => *s = b_str,
      _ => unreachable!(),
    }
  }

  pub fn str_map(&self, v: Value, f: impl FnMut(u8) -> u8) {
    self.with_str_mut(v, |s| s.map(f));
  }

  // ---------------------------------------------------------------------
  // dictionary / environment
  // ---------------------------------------------------------------------

  /// Allocates a new `Dict` enclosed by `enclosing` (`None` for the
  /// global scope). Guards against the allocation-ordering hazard the
  /// same way `scamdict` does: the dict is registered with the
  /// placeholder `Uninit` tag before its keys/values lists exist, so a
  /// collection triggered while allocating those lists can't reclaim the
  /// dict out from under itself, and can't walk into its not-yet-
  /// installed fields either.
  pub fn dict(&self, enclosing: Option<Value>) -> Value {
    let mut gc = self.gc.borrow_mut();
    let placeholder = gc.alloc_placeholder();
    gc.finish_placeholder(placeholder, Payload::Dict(Dict::new(enclosing)));
    placeholder
  }

  /// A fresh child scope enclosed by `lambda`'s captured environment —
  /// the evaluator's per-call frame. Lambda accessors return fresh
  /// copies, isolating the evaluator from accidental mutation of the
  /// lambda template; for the environment specifically that means a new
  /// empty scope chained to the template's closure, not the closure
  /// itself, matching `scamlambda_env`'s `scamdict(v->vals.fun->env)`.
  pub fn lambda_env(&self, lambda: Value) -> Value {
    let env = match self.gc.borrow().payload(lambda) {
      Payload::Lambda(l) => l.env,
      _ => panic!("expected a Lambda value"),
    };
    self.dict(Some(env))
  }

  pub fn lambda_params(&self, lambda: Value) -> Value {
    let params = match self.gc.borrow().payload(lambda) {
      Payload::Lambda(l) => l.params,
      _ => panic!("expected a Lambda value"),
    };
    self.copy(params)
  }

  pub fn lambda_body(&self, lambda: Value) -> Value {
    let body = match self.gc.borrow().payload(lambda) {
      Payload::Lambda(l) => l.body,
      _ => panic!("expected a Lambda value"),
    };
    self.copy(body)
  }

  pub fn lambda(&self, params: Value, body: Value, env: Value) -> Value {
    let v = self.gc.borrow_mut().alloc(Payload::Lambda(Lambda::new(params, body, env)));
    self.unset_root(params);
    self.unset_root(body);
    v
  }

  pub fn builtin(&self, func: BuiltinFn, is_const: bool) -> Value {
    self.gc.borrow_mut().alloc(Payload::Builtin(Builtin::new(func, is_const)))
  }

  pub fn call_builtin(&self, builtin: Value, args: Value) -> Value {
    let b = match self.gc.borrow().payload(builtin) {
      Payload::Builtin(b) => *b,
      _ => panic!("expected a Builtin value"),
    };
    b.call(self, args)
  }

  pub fn builtin_is_const(&self, builtin: Value) -> bool {
    match self.gc.borrow().payload(builtin) {
      Payload::Builtin(b) => b.is_const(),
      _ => panic!("expected a Builtin value"),
    }
  }

  pub fn port(&self, port: Port) -> Value {
    self.gc.borrow_mut().alloc(Payload::Port(port))
  }

  pub fn port_is_open(&self, v: Value) -> bool {
    match self.gc.borrow().payload(v) {
      Payload::Port(p) => p.is_open(),
      _ => panic!("expected a Port value"),
    }
  }

  pub fn port_close(&self, v: Value) {
    match self.gc.borrow_mut().payload_mut(v) {
      Payload::Port(p) => p.close(),
      _ => panic!("expected a Port value"),
    }
  }

  /// Reads one line from the port. `Err` (via `err_eof`) at end of file.
  pub fn port_read_line(&self, v: Value) -> Value {
    let line = {
      let mut gc = self.gc.borrow_mut();
      match gc.payload_mut(v) {
        Payload::Port(p) => p.read_line(),
        _ => panic!("expected a Port value"),
      }
    };
    match line {
      Ok(Some(s)) => self.str(&s),
      Ok(None) => error::err_eof(self),
      Err(e) => error::err(self, e.to_string()),
    }
  }

  pub fn port_write(&self, v: Value, bytes: &[u8]) -> Value {
    let result = match self.gc.borrow_mut().payload_mut(v) {
      Payload::Port(p) => p.write(bytes),
      _ => panic!("expected a Port value"),
    };
    match result {
      Ok(()) => self.null(),
      Err(e) => error::err(self, e.to_string()),
    }
  }

  pub fn dict_len(&self, v: Value) -> usize {
    match self.gc.borrow().payload(v) {
      Payload::Dict(d) => d.len(),
      _ => panic!("expected a Dict value"),
    }
  }

  pub fn dict_enclosing(&self, v: Value) -> Option<Value> {
    match self.gc.borrow().payload(v) {
      Payload::Dict(d) => d.enclosing(),
      _ => panic!("expected a Dict value"),
    }
  }

  pub fn dict_key_at(&self, v: Value, i: usize) -> Value {
    match self.gc.borrow().payload(v) {
      Payload::Dict(d) => d.key_at(i).expect("index in bounds"),
      _ => panic!("expected a Dict value"),
    }
  }

  pub fn dict_val_at(&self, v: Value, i: usize) -> Value {
    match self.gc.borrow().payload(v) {
      Payload::Dict(d) => d.val_at(i).expect("index in bounds"),
      _ => panic!("expected a Dict value"),
    }
  }

  pub fn dict_keys(&self, v: Value) -> Vec<Value> {
    match self.gc.borrow().payload(v) {
      Payload::Dict(d) => d.keys().collect(),
      _ => panic!("expected a Dict value"),
    }
  }

  pub fn dict_vals(&self, v: Value) -> Vec<Value> {
    match self.gc.borrow().payload(v) {
      Payload::Dict(d) => d.vals().collect(),
      _ => panic!("expected a Dict value"),
    }
  }

  /// Binds `key` to `val` in `dict`. Unbindable key types (`Port`,
  /// `Lambda`, `Builtin`, `Null`) are silently ignored. Otherwise, a
  /// linear scan by structural equality: an existing equal key has its
  /// value replaced (earliest-inserted slot wins on ties); a new key is
  /// appended. Ownership of both `key` and `val` transfers to the dict.
  ///
  /// `key` and `val` are unrooted unconditionally up front, matching
  /// `scamdict_bind`'s own unconditional `gc_unset_root` calls: neither
  /// argument is ever left pinned as a root, whether it ends up owned by
  /// the dict, discarded as a replaced duplicate key, or dropped outright
  /// because its type isn't bindable.
  pub fn dict_bind(&self, dict: Value, key: Value, val: Value) {
    self.unset_root(key);
    self.unset_root(val);

    let key_tag = self.tag(key);
    if matches!(key_tag, Tag::Port | Tag::Lambda | Tag::Builtin | Tag::Null) {
      return;
    }

    let len = self.dict_len(dict);
    for i in 0..len {
      let existing_key = self.dict_key_at(dict, i);
      if crate::cmp::eq(self, existing_key, key) {
        let old = match self.gc.borrow_mut().payload_mut(dict) {
          Payload::Dict(d) => d.replace_val(i, val),
          _ => unreachable!(),
        };
        self.unset_root(old);
        return;
      }
    }
    match self.gc.borrow_mut().payload_mut(dict) {
      Payload::Dict(d) => d.append(key, val),
      _ => panic!("expected a Dict value"),
    }
  }

  /// Linear scan of local entries; on miss, recurses into the enclosing
  /// dict; on terminal miss, an `Err` naming the key if it's a string.
  pub fn dict_lookup(&self, dict: Value, key: Value) -> Value {
    let len = self.dict_len(dict);
    for i in 0..len {
      let existing_key = self.dict_key_at(dict, i);
      if crate::cmp::eq(self, existing_key, key) {
        return self.dict_val_at(dict, i);
      }
    }
    if let Some(enclosing) = self.dict_enclosing(dict) {
      self.dict_lookup(enclosing, key)
    } else {
      let name = matches!(self.tag(key), Tag::Str).then(|| self.str_as_str(key));
      error::err_unbound(self, name.as_deref())
    }
  }

  // ---------------------------------------------------------------------
  // copy
  // ---------------------------------------------------------------------

  /// A deep structural copy whose children are freshly allocated; the
  /// result is a distinct root.
  pub fn copy(&self, v: Value) -> Value {
    match self.tag(v) {
      Tag::Int => self.int(self.as_int(v)),
      Tag::Dec => self.dec(self.as_dec(v)),
      Tag::Bool => self.bool(self.as_bool(v)),
      Tag::Null => self.null(),
      Tag::Str => self.str(&self.str_as_str(v)),
      Tag::Sym => self.sym(&self.str_as_str(v)),
      Tag::Err => self.alloc_err(&self.str_as_str(v)),
      Tag::List | Tag::SExpr => {
        let len = self.seq_len(v);
        let copies: Vec<Value> = (0..len).map(|i| self.copy(self.seq_get(v, i))).collect();
        let target = if self.tag(v) == Tag::List { self.list() } else { self.sexpr() };
        for c in copies {
          self.seq_append(target, c);
        }
        target
      }
      Tag::Dict => {
        let enclosing = self.dict_enclosing(v);
        let target = self.dict(enclosing);
        let len = self.dict_len(v);
        for i in 0..len {
          let k = self.copy(self.dict_key_at(v, i));
          let val = self.copy(self.dict_val_at(v, i));
          self.dict_bind(target, k, val);
        }
        target
      }
      Tag::Lambda => {
        let (params, body, env) = match self.gc.borrow().payload(v) {
          Payload::Lambda(l) => (l.params, l.body, l.env),
          _ => unreachable!(),
        };
        // functions are immutable templates: share params/body/env by
        // reference rather than deep-copying the whole closure chain.
        self.gc.borrow_mut().alloc(Payload::Lambda(Lambda::new(params, body, env)))
      }
      Tag::Builtin => {
        let b = match self.gc.borrow().payload(v) {
          Payload::Builtin(b) => *b,
          _ => unreachable!(),
        };
        self.gc.borrow_mut().alloc(Payload::Builtin(b))
      }
      Tag::Port => {
        let cloned = match self.gc.borrow().payload(v) {
          Payload::Port(p) => p.try_clone(),
          _ => unreachable!(),
        };
        self.gc.borrow_mut().alloc(Payload::Port(cloned))
      }
      Tag::Uninit => unreachable!("Uninit is never observable"),
    }
  }
}

impl Default for Context {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn null_is_never_a_root() {
    let cx = Context::new();
    let n = cx.null();
    assert!(!cx.is_root(n));
  }

  #[test]
  fn append_clears_root_and_grows_len() {
    let cx = Context::new();
    let list = cx.list();
    let item = cx.int(1);
    cx.seq_append(list, item);
    assert_eq!(cx.seq_len(list), 1);
    assert!(!cx.is_root(item));
  }

  #[test]
  fn pop_then_prepend_restores_order() {
    let cx = Context::new();
    let list = cx.list();
    let a = cx.int(1);
    let b = cx.int(2);
    cx.seq_append(list, a);
    cx.seq_append(list, b);
    let popped = cx.seq_pop(list, 0);
    cx.seq_prepend(list, popped);
    assert_eq!(cx.as_int(cx.seq_get(list, 0)), 1);
    assert_eq!(cx.as_int(cx.seq_get(list, 1)), 2);
  }

  #[test]
  fn seq_subseq_out_of_range_is_err() {
    let cx = Context::new();
    let list = cx.list();
    cx.seq_append(list, cx.int(1));
    let sub = cx.seq_subseq(list, 0, 5);
    assert_eq!(cx.tag(sub), Tag::Err);
  }

  #[test]
  fn seq_narrowest_on_empty_is_any() {
    let cx = Context::new();
    let list = cx.list();
    assert_eq!(cx.seq_narrowest(list), Type::Any);
  }

  #[test]
  fn seq_narrowest_of_two_numeric_tags_is_num() {
    let cx = Context::new();
    let list = cx.list();
    cx.seq_append(list, cx.int(1));
    cx.seq_append(list, cx.dec(2.0));
    assert_eq!(cx.seq_narrowest(list), Type::Num);
  }

  /// Once the accumulator has widened to `Num`, folding in a third
  /// numeric element widens it again rather than narrowing back down —
  /// `Num` itself isn't a numeric leaf, so `[Dec, Int, Int]` ends up
  /// `Any`, not `Num`.
  #[test]
  fn seq_narrowest_does_not_renarrow_after_widening() {
    let cx = Context::new();
    let list = cx.list();
    cx.seq_append(list, cx.dec(1.0));
    cx.seq_append(list, cx.int(2));
    cx.seq_append(list, cx.int(3));
    assert_eq!(cx.seq_narrowest(list), Type::Any);
  }

  #[test]
  fn dict_round_trip_and_overwrite() {
    let cx = Context::new();
    let d = cx.dict(None);
    let k = cx.str("a");
    let v1 = cx.int(1);
    cx.dict_bind(d, k, v1);
    assert_eq!(cx.dict_len(d), 1);

    let k2 = cx.str("a");
    let v2 = cx.int(2);
    cx.dict_bind(d, k2, v2);
    assert_eq!(cx.dict_len(d), 1);
    let looked_up = cx.dict_lookup(d, cx.str("a"));
    assert_eq!(cx.as_int(looked_up), 2);
  }

  #[test]
  fn lookup_falls_through_enclosing_chain() {
    let cx = Context::new();
    let parent = cx.dict(None);
    let k = cx.str("x");
    let v = cx.int(7);
    cx.dict_bind(parent, k, v);
    let child = cx.dict(Some(parent));
    let looked_up = cx.dict_lookup(child, cx.str("x"));
    assert_eq!(cx.as_int(looked_up), 7);
  }

  #[test]
  fn unbindable_key_types_are_ignored() {
    let cx = Context::new();
    let d = cx.dict(None);
    let null_key = cx.null();
    cx.dict_bind(d, null_key, cx.int(1));
    assert_eq!(cx.dict_len(d), 0);
  }

  /// An unbindable-type bind still unroots both arguments — they aren't
  /// left pinned just because the dict declined to take ownership.
  #[test]
  fn unbindable_key_types_still_unroot_key_and_val() {
    let cx = Context::new();
    let d = cx.dict(None);
    let null_key = cx.null();
    let val = cx.int(1);
    cx.dict_bind(d, null_key, val);
    assert!(!cx.is_root(null_key));
    assert!(!cx.is_root(val));
  }

  /// Re-binding an existing key unroots the discarded duplicate `key`
  /// argument along with the replaced `old` value, not just the new `val`.
  #[test]
  fn dict_bind_overwrite_unroots_duplicate_key() {
    let cx = Context::new();
    let d = cx.dict(None);
    cx.dict_bind(d, cx.str("a"), cx.int(1));

    let dup_key = cx.str("a");
    let v2 = cx.int(2);
    cx.dict_bind(d, dup_key, v2);
    assert!(!cx.is_root(dup_key));
    assert!(!cx.is_root(v2));
  }

  #[test]
  fn unbound_lookup_names_string_keys() {
    let cx = Context::new();
    let d = cx.dict(None);
    let miss = cx.dict_lookup(d, cx.str("missing"));
    assert_eq!(cx.tag(miss), Tag::Err);
    assert_eq!(cx.str_as_str(miss), "unbound variable 'missing'");
  }

  #[test]
  fn copy_is_a_distinct_root_and_structurally_equal() {
    let cx = Context::new();
    let list = cx.list();
    cx.seq_append(list, cx.int(1));
    cx.seq_append(list, cx.int(2));
    let copied = cx.copy(list);
    assert_ne!(copied, list);
    assert!(crate::cmp::eq(&cx, list, copied));
    assert!(cx.is_root(copied));
  }

  #[test]
  fn allocation_ordering_hazard_dict_survives_low_threshold() {
    // A tiny threshold forces `collect()` mid-construction; the dict's
    // keys/values lists must not be reclaimed out from under it.
    let cx = Context::with_threshold(1);
    let d = cx.dict(None);
    assert_eq!(cx.dict_len(d), 0);
    let k = cx.str("k");
    let v = cx.int(1);
    cx.dict_bind(d, k, v);
    cx.collect();
    assert_eq!(cx.dict_len(d), 1);
  }

  #[test]
  fn lambda_env_is_a_fresh_scope_chained_to_the_closure() {
    let cx = Context::new();
    let closure = cx.dict(None);
    let outer_key = cx.str("outer");
    let outer_val = cx.int(1);
    cx.dict_bind(closure, outer_key, outer_val);
    let params = cx.list();
    let body = cx.sexpr();
    let l = cx.lambda(params, body, closure);

    let frame = cx.lambda_env(l);
    assert_eq!(cx.dict_len(frame), 0);
    let looked_up = cx.dict_lookup(frame, cx.str("outer"));
    assert_eq!(cx.as_int(looked_up), 1);
  }
}
