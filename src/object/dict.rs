//! Backing store shared by user dictionaries and lexical environments:
//! ordered insertions as two parallel sequences (keys, values) plus an
//! optional enclosing dict.
//!
//! `Dict` itself only owns the raw storage; the structural-equality-aware
//! operations (`bind`, `lookup`) live on `Context`, since they need the
//! full `eq` algorithm, which in turn needs the arena to look at nested
//! values.

use super::Seq;
use crate::value::Value;

#[derive(Clone, Default)]
pub struct Dict {
  keys: Seq,
  vals: Seq,
  enclosing: Option<Value>,
}

impl Dict {
  pub fn new(enclosing: Option<Value>) -> Self {
    Self {
      keys: Seq::new(),
      vals: Seq::new(),
      enclosing,
    }
  }

  pub fn len(&self) -> usize {
    self.keys.len()
  }

  pub fn is_empty(&self) -> bool {
    self.keys.is_empty()
  }

  pub fn enclosing(&self) -> Option<Value> {
    self.enclosing
  }

  pub fn key_at(&self, i: usize) -> Option<Value> {
    self.keys.get(i)
  }

  pub fn val_at(&self, i: usize) -> Option<Value> {
    self.vals.get(i)
  }

  pub fn keys(&self) -> impl Iterator<Item = Value> + '_ {
    self.keys.iter().copied()
  }

  pub fn vals(&self) -> impl Iterator<Item = Value> + '_ {
    self.vals.iter().copied()
  }

  /// Appends a new key/value pair. Callers (`Context::dict_bind`) must
  /// have already checked that no equal key exists and that the key's
  /// type is bindable.
  pub fn append(&mut self, key: Value, val: Value) {
    self.keys.append(key);
    self.vals.append(val);
  }

  /// Replaces the value at `i`, returning the value it displaced.
  pub fn replace_val(&mut self, i: usize, val: Value) -> Value {
    let old = self.vals.get(i).expect("index in bounds");
    self.vals_mut_set(i, val);
    old
  }

  fn vals_mut_set(&mut self, i: usize, val: Value) {
    // Seq has no public `set`; dict replacement is a pop+insert at the
    // same index, which preserves order identically to an in-place set.
    self.vals.pop(i);
    self.vals.insert(i, val);
  }
}
