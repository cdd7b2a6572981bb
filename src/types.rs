//! The type lattice: concrete tags plus the abstract supertypes `Num`,
//! `Seq`, `Container`, `Cmp`, `Function`, `Any`.

use crate::value::Tag;

/// Unlike [`Tag`], `Type` also has abstract variants used only for
/// typechecking and error messages — never as a value's own tag.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Type {
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
  Num,
  Seq,
  Container,
  Cmp,
  Function,
  Any,
}

impl Type {
  pub fn from_tag(tag: Tag) -> Self {
    match tag {
      Tag::Int => Type::Int,
      Tag::Dec => Type::Dec,
      Tag::Bool => Type::Bool,
      Tag::Str => Type::Str,
      Tag::Sym => Type::Sym,
      Tag::Err => Type::Err,
      Tag::List => Type::List,
      Tag::SExpr => Type::SExpr,
      Tag::Lambda => Type::Lambda,
      Tag::Builtin => Type::Builtin,
      Tag::Port => Type::Port,
      Tag::Dict => Type::Dict,
      Tag::Null => Type::Null,
      Tag::Uninit => unreachable!("Uninit is never observable outside Context::dict"),
    }
  }

  /// `typecheck(v, T)`: true iff `v`'s tag is in `T`'s set. For concrete
  /// `T` this is tag equality; `Any` always matches.
  pub fn accepts(self, tag: Tag) -> bool {
    match self {
      Type::Any => true,
      Type::Num => tag.is_numeric(),
      Type::Seq => tag.is_seq(),
      Type::Container => tag.is_container(),
      Type::Cmp => matches!(tag, Tag::Int | Tag::Dec | Tag::Str),
      Type::Function => matches!(tag, Tag::Lambda | Tag::Builtin),
      concrete => Type::from_tag(tag) == concrete,
    }
  }

  pub fn display_name(self) -> &'static str {
    match self {
      Type::Int => "integer",
      Type::Dec => "decimal",
      Type::Bool => "boolean",
      Type::Str => "string",
      Type::Sym => "symbol",
      Type::Err => "error",
      Type::List => "list",
      Type::SExpr => "S-expression",
      Type::Lambda => "function",
      Type::Builtin => "builtin",
      Type::Port => "port",
      Type::Dict => "dictionary",
      Type::Null => "null",
      Type::Num => "integer or decimal",
      Type::Seq => "list or string",
      Type::Container => "list, string or dictionary",
      Type::Cmp => "integer, decimal or string",
      Type::Function => "function",
      Type::Any => "any value",
    }
  }

  pub fn debug_name(self) -> &'static str {
    match self {
      Type::Int => "SCAM_INT",
      Type::Dec => "SCAM_DEC",
      Type::Bool => "SCAM_BOOL",
      Type::Str => "SCAM_STR",
      Type::Sym => "SCAM_SYM",
      Type::Err => "SCAM_ERR",
      Type::List => "SCAM_LIST",
      Type::SExpr => "SCAM_SEXPR",
      Type::Lambda => "SCAM_LAMBDA",
      Type::Builtin => "SCAM_BUILTIN",
      Type::Port => "SCAM_PORT",
      Type::Dict => "SCAM_DICT",
      Type::Null => "SCAM_NULL",
      Type::Num => "SCAM_NUM",
      Type::Seq => "SCAM_SEQ",
      Type::Container => "SCAM_CONTAINER",
      Type::Cmp => "SCAM_CMP",
      Type::Function => "SCAM_FUNCTION",
      Type::Any => "SCAM_ANY",
    }
  }
}

/// The smallest supertype containing both tags.
pub fn narrowest(a: Tag, b: Tag) -> Type {
  narrowest_types(Type::from_tag(a), Type::from_tag(b))
}

/// The reduction `narrowest` actually runs on: it operates on the
/// *accumulator*, which may already be an abstract supertype from a
/// previous reduction step, not just on a pair of concrete tags.
/// Numeric/seq/container membership is checked against the concrete
/// leaves only (`Int`/`Dec`, `List`/`Str`, `List`/`Str`/`Dict`) — once an
/// accumulator has widened to `Num`, `Seq` or `Container` it no longer
/// counts as numeric/seq/container itself, so folding in a third,
/// differently-tagged element widens straight to `Any` rather than
/// re-narrowing. This mirrors `scamseq_narrowest_type`'s own
/// concrete-only membership checks.
pub(crate) fn narrowest_types(a: Type, b: Type) -> Type {
  if a == b {
    a
  } else if is_numeric_type(a) && is_numeric_type(b) {
    Type::Num
  } else if is_seq_type(a) && is_seq_type(b) {
    Type::Seq
  } else if is_container_type(a) && is_container_type(b) {
    Type::Container
  } else {
    Type::Any
  }
}

fn is_numeric_type(t: Type) -> bool {
  matches!(t, Type::Int | Type::Dec)
}

fn is_seq_type(t: Type) -> bool {
  matches!(t, Type::List | Type::Str)
}

fn is_container_type(t: Type) -> bool {
  matches!(t, Type::List | Type::Str | Type::Dict)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn typecheck_concrete() {
    assert!(Type::Int.accepts(Tag::Int));
    assert!(!Type::Int.accepts(Tag::Dec));
  }

  #[test]
  fn typecheck_any_accepts_everything() {
    for tag in [
      Tag::Int,
      Tag::Dec,
      Tag::Bool,
      Tag::Str,
      Tag::Sym,
      Tag::Err,
      Tag::List,
      Tag::SExpr,
      Tag::Lambda,
      Tag::Builtin,
      Tag::Port,
      Tag::Dict,
      Tag::Null,
    ] {
      assert!(Type::Any.accepts(tag));
    }
  }

  #[test]
  fn narrowest_equal_tags() {
    assert_eq!(narrowest(Tag::Int, Tag::Int), Type::Int);
  }

  #[test]
  fn narrowest_numeric() {
    assert_eq!(narrowest(Tag::Int, Tag::Dec), Type::Num);
  }

  #[test]
  fn narrowest_seq() {
    assert_eq!(narrowest(Tag::List, Tag::Str), Type::Seq);
  }

  #[test]
  fn narrowest_container() {
    assert_eq!(narrowest(Tag::Dict, Tag::Str), Type::Container);
  }

  #[test]
  fn narrowest_unrelated_is_any() {
    assert_eq!(narrowest(Tag::Lambda, Tag::Int), Type::Any);
  }

  #[test]
  fn narrowest_is_commutative() {
    let tags = [Tag::Int, Tag::Dec, Tag::Str, Tag::List, Tag::Dict, Tag::Bool];
    for &a in &tags {
      for &b in &tags {
        assert_eq!(narrowest(a, b), narrowest(b, a));
      }
    }
  }

  /// Folding a third element into an already-abstract accumulator
  /// doesn't re-narrow: `Num` is not itself a numeric leaf, so a
  /// third `Int` widens straight to `Any` rather than back to `Num`.
  #[test]
  fn narrowest_types_does_not_renarrow_an_abstract_accumulator() {
    let acc = narrowest_types(Type::Dec, Type::Int);
    assert_eq!(acc, Type::Num);
    assert_eq!(narrowest_types(acc, Type::Int), Type::Any);
  }
}
