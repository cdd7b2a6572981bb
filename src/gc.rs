//! The collector: owns every live value, tracks which ones are roots, and
//! reclaims the rest with mark-and-sweep.

use crate::object::{Builtin, Dict, Lambda, Port, Seq, Str};
use crate::value::{Tag, Value};

pub(crate) enum Payload {
  Int(i64),
  Dec(f64),
  Bool(bool),
  Null,
  Str(Str),
  Sym(Str),
  Err(Str),
  List(Seq),
  SExpr(Seq),
  Lambda(Lambda),
  Builtin(Builtin),
  Port(Port),
  Dict(Dict),
  /// Placeholder installed while a composite value's children are still
  /// being allocated, guarding against the allocation-ordering hazard
  /// where a collection mid-construction could reclaim them. The marker
  /// treats it as a leaf, exactly like `Null`.
  Uninit,
}

impl Payload {
  pub(crate) fn tag(&self) -> Tag {
    match self {
      Payload::Int(_) => Tag::Int,
      Payload::Dec(_) => Tag::Dec,
      Payload::Bool(_) => Tag::Bool,
      Payload::Null => Tag::Null,
      Payload::Str(_) => Tag::Str,
      Payload::Sym(_) => Tag::Sym,
      Payload::Err(_) => Tag::Err,
      Payload::List(_) => Tag::List,
      Payload::SExpr(_) => Tag::SExpr,
      Payload::Lambda(_) => Tag::Lambda,
      Payload::Builtin(_) => Tag::Builtin,
      Payload::Port(_) => Tag::Port,
      Payload::Dict(_) => Tag::Dict,
      Payload::Uninit => Tag::Uninit,
    }
  }

  /// Child `Value`s reachable directly from this payload — sequence
  /// slots, dict key/value lists and the enclosing dict, a lambda's
  /// parameters/body/environment. Atoms and `Uninit` have none.
  fn for_each_child(&self, mut visit: impl FnMut(Value)) {
    match self {
      Payload::List(seq) | Payload::SExpr(seq) => {
        for &v in seq.iter() {
          visit(v);
        }
      }
      Payload::Dict(dict) => {
        for k in dict.keys() {
          visit(k);
        }
        for v in dict.vals() {
          visit(v);
        }
        if let Some(enclosing) = dict.enclosing() {
          visit(enclosing);
        }
      }
      Payload::Lambda(lambda) => {
        visit(lambda.params);
        visit(lambda.body);
        visit(lambda.env);
      }
      Payload::Int(_)
      | Payload::Dec(_)
      | Payload::Bool(_)
      | Payload::Null
      | Payload::Str(_)
      | Payload::Sym(_)
      | Payload::Err(_)
      | Payload::Builtin(_)
      | Payload::Port(_)
      | Payload::Uninit => {}
    }
  }
}

pub(crate) struct Slot {
  pub is_root: bool,
  mark: bool,
  pub generation: u32,
  pub pos: Option<(u32, u32)>,
  pub payload: Payload,
}

/// Rough per-value cost used for the allocation-threshold heuristic. Not
/// a precise `size_of`, just enough to make `collect()` trigger under
/// sustained allocation.
fn payload_weight(payload: &Payload) -> usize {
  match payload {
    Payload::Str(s) | Payload::Sym(s) | Payload::Err(s) => 32 + s.capacity(),
    Payload::List(s) | Payload::SExpr(s) => 32 + s.capacity() * 4,
    Payload::Dict(_) => 64,
    Payload::Lambda(_) => 48,
    _ => 24,
  }
}

const DEFAULT_THRESHOLD: usize = 64 * 1024;

pub struct Gc {
  slots: Vec<Option<Slot>>,
  free: Vec<u32>,
  heap_size: usize,
  threshold: usize,
}

impl Gc {
  pub fn new() -> Self {
    Self::with_threshold(DEFAULT_THRESHOLD)
  }

  pub fn with_threshold(threshold: usize) -> Self {
    Self {
      slots: Vec::new(),
      free: Vec::new(),
      heap_size: 0,
      threshold,
    }
  }

  pub fn live_count(&self) -> usize {
    self.slots.iter().filter(|s| s.is_some()).count()
  }

  pub fn heap_size(&self) -> usize {
    self.heap_size
  }

  /// Registers `payload`, marks it a root, and runs a collection first if
  /// the heap is already over threshold. Returns the fresh handle.
  pub(crate) fn alloc(&mut self, payload: Payload) -> Value {
    if self.heap_size > self.threshold {
      self.collect();
      self.threshold = (self.heap_size * 2).max(DEFAULT_THRESHOLD);
    }
    self.heap_size += payload_weight(&payload);
    let slot = Slot {
      is_root: true,
      mark: false,
      generation: 0,
      pos: None,
      payload,
    };
    if let Some(index) = self.free.pop() {
      self.slots[index as usize] = Some(slot);
      Value::from_index(index)
    } else {
      let index = self.slots.len() as u32;
      self.slots.push(Some(slot));
      Value::from_index(index)
    }
  }

  /// Registers an `Uninit` placeholder root, for composite constructors
  /// that need to allocate children after the parent is already
  /// reachable. The caller installs the real payload with
  /// `finish_placeholder` once children are ready.
  pub(crate) fn alloc_placeholder(&mut self) -> Value {
    self.alloc(Payload::Uninit)
  }

  pub(crate) fn finish_placeholder(&mut self, v: Value, payload: Payload) {
    let slot = self.slots[v.index()].as_mut().expect("live placeholder");
    debug_assert!(matches!(slot.payload, Payload::Uninit));
    self.heap_size += payload_weight(&payload);
    slot.payload = payload;
  }

  fn slot(&self, v: Value) -> &Slot {
    self.slots[v.index()]
      .as_ref()
      .expect("Value used after being collected")
  }

  fn slot_mut(&mut self, v: Value) -> &mut Slot {
    self.slots[v.index()]
      .as_mut()
      .expect("Value used after being collected")
  }

  pub(crate) fn payload(&self, v: Value) -> &Payload {
    &self.slot(v).payload
  }

  pub(crate) fn payload_mut(&mut self, v: Value) -> &mut Payload {
    &mut self.slot_mut(v).payload
  }

  pub fn tag(&self, v: Value) -> Tag {
    self.slot(v).payload.tag()
  }

  pub fn is_root(&self, v: Value) -> bool {
    self.slot(v).is_root
  }

  pub fn set_root(&mut self, v: Value) {
    self.slot_mut(v).is_root = true;
  }

  pub fn unset_root(&mut self, v: Value) {
    self.slot_mut(v).is_root = false;
  }

  pub fn set_pos(&mut self, v: Value, pos: (u32, u32)) {
    self.slot_mut(v).pos = Some(pos);
  }

  pub fn pos(&self, v: Value) -> Option<(u32, u32)> {
    self.slot(v).pos
  }

  /// Mark-and-sweep: walk every root, follow child references, then free
  /// every unmarked live slot. Cycles (a lambda reaching itself through
  /// its captured environment) are handled correctly because `mark`
  /// short-circuits on an already-marked slot.
  pub fn collect(&mut self) {
    let roots: Vec<u32> = self
      .slots
      .iter()
      .enumerate()
      .filter_map(|(i, s)| s.as_ref().filter(|s| s.is_root).map(|_| i as u32))
      .collect();

    for index in roots {
      self.mark(Value::from_index(index));
    }

    let mut reclaimed = 0usize;
    for slot in self.slots.iter_mut() {
      if let Some(s) = slot {
        if s.mark {
          s.mark = false;
        } else {
          reclaimed += payload_weight(&s.payload);
          *slot = None;
        }
      }
    }
    self.heap_size = self.heap_size.saturating_sub(reclaimed);
    self.free = self
      .slots
      .iter()
      .enumerate()
      .filter_map(|(i, s)| s.is_none().then_some(i as u32))
      .collect();
  }

  fn mark(&mut self, v: Value) {
    let index = v.index();
    let Some(slot) = self.slots[index].as_ref() else {
      return;
    };
    if slot.mark {
      return;
    }
    // Two-pass to satisfy the borrow checker without cloning children:
    // collect child handles first, then recurse.
    let mut children = Vec::new();
    slot.payload.for_each_child(|child| children.push(child));
    self.slots[index].as_mut().unwrap().mark = true;
    for child in children {
      self.mark(child);
    }
  }

  /// Reclaims every live slot regardless of reachability — the release
  /// half of the init/teardown bracket around a collector's lifetime.
  pub fn teardown(&mut self) {
    self.slots.clear();
    self.free.clear();
    self.heap_size = 0;
  }
}

impl Default for Gc {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn alloc_sets_root() {
    let mut gc = Gc::new();
    let v = gc.alloc(Payload::Int(1));
    assert!(gc.is_root(v));
  }

  #[test]
  fn collect_keeps_reachable_root() {
    let mut gc = Gc::new();
    let v = gc.alloc(Payload::Int(1));
    gc.collect();
    assert_eq!(gc.live_count(), 1);
    assert_eq!(gc.tag(v), Tag::Int);
  }

  #[test]
  fn collect_frees_unrooted_value() {
    let mut gc = Gc::new();
    let v = gc.alloc(Payload::Int(1));
    gc.unset_root(v);
    gc.collect();
    assert_eq!(gc.live_count(), 0);
  }

  #[test]
  fn collect_follows_list_children() {
    let mut gc = Gc::new();
    let child = gc.alloc(Payload::Int(42));
    gc.unset_root(child);
    let mut seq = Seq::new();
    seq.append(child);
    let list = gc.alloc(Payload::List(seq));
    gc.collect();
    assert_eq!(gc.live_count(), 2);
    assert_eq!(gc.tag(list), Tag::List);
  }

  #[test]
  fn collect_handles_cycle_through_lambda_env() {
    let mut gc = Gc::new();
    let params = gc.alloc(Payload::List(Seq::new()));
    gc.unset_root(params);
    let body = gc.alloc(Payload::SExpr(Seq::new()));
    gc.unset_root(body);
    let env = gc.alloc(Payload::Dict(Dict::new(None)));
    let lambda = gc.alloc(Payload::Lambda(Lambda::new(params, body, env)));
    gc.unset_root(lambda);

    // the environment binds the lambda's own name, forming a cycle
    let key = gc.alloc(Payload::Int(0));
    gc.unset_root(key);
    if let Payload::Dict(dict) = gc.payload_mut(env) {
      dict.append(key, lambda);
    }
    gc.unset_root(env);

    gc.collect();
    // lambda is unreachable (nothing roots it or env anymore)
    assert_eq!(gc.live_count(), 0);
  }
}
