//! The universal runtime value handle.

use std::fmt;

/// A handle to a value living in a [`crate::ctx::Context`]'s arena.
///
/// `Value` is a small `Copy` index, not the payload itself: every real
/// operation on it (reading its tag, its payload, mutating a container it
/// points at) goes through the `Context` that allocated it. A single
/// arena addressed by index — containers and dict slots store `Value`s
/// directly — means cycles through a lambda's captured environment are
/// just ordinary graph edges instead of a reference-counting hazard.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Value(pub(crate) u32);

impl Value {
  pub(crate) fn from_index(index: u32) -> Self {
    Value(index)
  }

  pub(crate) fn index(self) -> usize {
    self.0 as usize
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Value(#{})", self.0)
  }
}

/// The concrete and placeholder tags a [`Value`] can carry.
///
/// `Uninit` is never observable outside of `Context::dict` — it's a
/// placeholder tag installed while a `Dict`'s keys/values lists are still
/// being allocated, so the marker skips its uninitialized fields instead
/// of following garbage.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tag {
  Int,
  Dec,
  Bool,
  Str,
  Sym,
  Err,
  List,
  SExpr,
  Lambda,
  Builtin,
  Port,
  Dict,
  Null,
  Uninit,
}

impl Tag {
  pub fn is_numeric(self) -> bool {
    matches!(self, Tag::Int | Tag::Dec)
  }

  pub fn is_seq(self) -> bool {
    matches!(self, Tag::List | Tag::Str)
  }

  pub fn is_container(self) -> bool {
    matches!(self, Tag::List | Tag::Str | Tag::Dict)
  }
}

impl fmt::Display for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Tag::Int => "Int",
      Tag::Dec => "Dec",
      Tag::Bool => "Bool",
      Tag::Str => "Str",
      Tag::Sym => "Sym",
      Tag::Err => "Err",
      Tag::List => "List",
      Tag::SExpr => "SExpr",
      Tag::Lambda => "Lambda",
      Tag::Builtin => "Builtin",
      Tag::Port => "Port",
      Tag::Dict => "Dict",
      Tag::Null => "Null",
      Tag::Uninit => "Uninit",
    };
    write!(f, "{name}")
  }
}
