//! Finite-state automata over an alphabet of bytes plus two zero-width marks.
//!
//! An [`Fsm`] is a nondeterministic automaton with epsilon edges. Every
//! transition consumes either a byte range or one of the anchor [`Mark`]s
//! (start of text, end of text). The automata are built incrementally and
//! combined through a small algebra:
//!
//! - [`ops::union`], [`ops::intersect`] and [`ops::concat`] combine two
//!   automata by value.
//! - [`ops::star`] and [`ops::repeat`] build closures and fixed repetitions
//!   without touching their operand.
//! - [`Fsm::complement`], [`Fsm::iterate`], [`Fsm::append_strings`],
//!   [`Fsm::append_special`] and [`Fsm::remove_dead_ends`] rewrite an
//!   automaton in place.
//!
//! Complement and intersection go through [`determinize`], which resolves the
//! marks against the input boundaries and produces a complete deterministic
//! automaton over the 256 bytes. The `_within` variants of these take a
//! state budget and fail with [`SizeLimitExceeded`] instead of growing past it.
//!
//! [`Matcher`] checks whether a whole input is accepted. It exists to verify
//! constructions; there is no search API.

#[macro_use]
mod macros;

pub mod determinize;
pub mod fsm;
pub mod matcher;
pub mod ops;

pub use determinize::{determinize, determinize_within, SizeLimitExceeded};
pub use fsm::{Fsm, Label, Mark, State, StateId, Transition};
pub use matcher::Matcher;
