//! Compile regular expressions into finite-state automata.
//!
//! A pattern is tokenized into terms and fed through a table-driven LALR(1)
//! grammar. Every reduction builds its result with the automaton algebra in
//! [`automata`], so the whole pattern ends up as one [`Fsm`] that accepts
//! exactly the language the pattern denotes.
//!
//! Besides the usual alternation, concatenation and repetition, the grammar
//! has conjunction (`a&b`, both must match) and negation (`!a`, anything
//! `a` doesn't match). Literals and the wildcard are built in an
//! [`Encoding`]; characters an encoding cannot represent are dropped rather
//! than rejected.
//!
//! ```
//! let fsm = regex_fsm::compile("(ab|c)+&!.*c").unwrap();
//! assert!(fsm.accepts(b"abcab"));
//! assert!(!fsm.accepts(b"abc"));
//! ```
//!
//! The grammar only talks to its input through [`TokenSource`]. [`Lexer`] is
//! the built-in implementation; [`Builder`] configures it.

#[macro_use]
mod macros;

mod config;
mod convert;
mod encoding;
mod error;
mod grammar;
mod lexer;
mod repetition;
mod term;
mod value;

pub use regex_fsm_automata as automata;
pub use regex_fsm_automata::Fsm;

pub use config::{Builder, Config};
pub use convert::{append_range, convert_to_fsm};
pub use encoding::Encoding;
pub use error::{Error, ParseResult};
pub use lexer::{LexError, LexErrorKind, Lexer, TerminalKind, Token, TokenSource};
pub use repetition::repeat_bounded;
pub use term::{Limit, Term};
pub use value::Value;

/// Run the grammar over `source` and return the automaton for the whole
/// pattern.
///
/// The first lexical or syntax error ends the parse. Nothing partial is
/// returned. Automata are held to the default [`Config::size_limit`].
pub fn parse<S: TokenSource + ?Sized>(source: &mut S) -> ParseResult<Fsm> {
    parse_within(source, Config::default().size_limit())
}

pub(crate) fn parse_within<S: TokenSource + ?Sized>(
    source: &mut S,
    size_limit: usize,
) -> ParseResult<Fsm> {
    let fsm = grammar::Parser::new(source, size_limit).parse()?;
    debug!(
        "compiled pattern into {} states ({} accepting)",
        fsm.state_count(),
        fsm.accepting_states().len()
    );
    Ok(fsm)
}

/// Compile `pattern` with the default [`Config`].
pub fn compile(pattern: &str) -> ParseResult<Fsm> {
    Builder::new().build(pattern)
}
