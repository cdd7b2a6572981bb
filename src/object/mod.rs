//! Backing stores for the container tags: [`Seq`] (List/SExpr), [`Str`]
//! (Str/Sym/Err), [`Dict`] (dict/environment), plus [`Lambda`], [`Builtin`]
//! and [`Port`].

mod builtin;
mod dict;
mod lambda;
mod port;
mod seq;
mod string;

pub use builtin::{Builtin, BuiltinFn};
pub use dict::Dict;
pub use lambda::Lambda;
pub use port::Port;
pub use seq::Seq;
pub use string::Str;

/// Shared growth policy for [`Seq`] and [`Str`]: capacity starts at zero;
/// the first growth jumps to `max(5, required)`; every subsequent growth
/// doubles, still clamped up to `required`.
pub(crate) fn grow(current_capacity: usize, required: usize) -> usize {
  if current_capacity == 0 {
    required.max(5)
  } else {
    (current_capacity * 2).max(required)
  }
}
