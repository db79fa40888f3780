//! The pattern grammar and the table-driven parser that runs it.
//!
//! ```text
//! pattern       → alternative
//! alternative   → conjunction | alternative '|' conjunction
//! conjunction   → negation | conjunction '&' negation
//! negation      → concatenation | '!' concatenation
//! concatenation → ε | concatenation iteration
//! iteration     → term | term COUNT
//! term          → LETTERS | DOT | '^' | '$' | '(' alternative ')'
//! ```
//!
//! The LALR(1) automaton for this grammar has 22 states. The action and goto
//! tables below are written out by hand, one `match` arm per state. Each
//! reduction builds its parent's value with the automaton algebra.

use regex_fsm_automata::{ops, Fsm};

use crate::convert::append_range;
use crate::encoding::Encoding;
use crate::error::Error;
use crate::lexer::{TerminalKind, Token, TokenSource};
use crate::repetition::{repeat_bounded, repetition_size};
use crate::term::Term;
use crate::value::Value;

/// Parser states. Each is named after the symbol that was just shifted or
/// reduced to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Accept,
    Alternative,
    Conjunction,
    Negation,
    Concatenation,
    Bang,
    Pipe,
    Amp,
    Iteration,
    Term,
    Letters,
    Dot,
    Caret,
    Dollar,
    Open,
    /// `'!' concatenation`
    Negated,
    /// `alternative '|' conjunction`
    Union,
    /// `conjunction '&' negation`
    Intersection,
    /// `term COUNT`
    Counted,
    /// `'(' alternative`
    Group,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nonterminal {
    Pattern,
    Alternative,
    Conjunction,
    Negation,
    Concatenation,
    Iteration,
    Term,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Production {
    Pattern,
    AltSingle,
    AltUnion,
    ConjSingle,
    ConjIntersect,
    NegPlain,
    NegComplement,
    ConcatEmpty,
    ConcatAppend,
    IterPlain,
    IterCount,
    TermLetters,
    TermDot,
    TermBegin,
    TermEnd,
    TermGroup,
}

impl Production {
    /// Number of symbols on the right-hand side
    fn len(self) -> usize {
        match self {
            Production::ConcatEmpty => 0,
            Production::Pattern
            | Production::AltSingle
            | Production::ConjSingle
            | Production::NegPlain
            | Production::IterPlain
            | Production::TermLetters
            | Production::TermDot
            | Production::TermBegin
            | Production::TermEnd => 1,
            Production::NegComplement | Production::ConcatAppend | Production::IterCount => 2,
            Production::AltUnion | Production::ConjIntersect | Production::TermGroup => 3,
        }
    }

    fn lhs(self) -> Nonterminal {
        match self {
            Production::Pattern => Nonterminal::Pattern,
            Production::AltSingle | Production::AltUnion => Nonterminal::Alternative,
            Production::ConjSingle | Production::ConjIntersect => Nonterminal::Conjunction,
            Production::NegPlain | Production::NegComplement => Nonterminal::Negation,
            Production::ConcatEmpty | Production::ConcatAppend => Nonterminal::Concatenation,
            Production::IterPlain | Production::IterCount => Nonterminal::Iteration,
            Production::TermLetters
            | Production::TermDot
            | Production::TermBegin
            | Production::TermEnd
            | Production::TermGroup => Nonterminal::Term,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Shift(State),
    Reduce(Production),
    Accept,
    Error,
}

/// Terminals that can begin a term.
fn starts_term(t: TerminalKind) -> bool {
    use TerminalKind::*;
    matches!(t, Letters | Dot | Begin | End | Open)
}

/// Terminals that can follow a negation.
fn ends_negation(t: TerminalKind) -> bool {
    use TerminalKind::*;
    matches!(t, Pipe | Amp | Close | Eof)
}

/// The state reached by shifting the first terminal of a term.
fn shift_term(t: TerminalKind) -> Action {
    match t {
        TerminalKind::Letters => Action::Shift(State::Letters),
        TerminalKind::Dot => Action::Shift(State::Dot),
        TerminalKind::Begin => Action::Shift(State::Caret),
        TerminalKind::End => Action::Shift(State::Dollar),
        TerminalKind::Open => Action::Shift(State::Open),
        _ => Action::Error,
    }
}

fn action(state: State, t: TerminalKind) -> Action {
    use TerminalKind as T;

    let follows_term = starts_term(t) || ends_negation(t);
    let reduce_if = |cond: bool, production| {
        if cond {
            Action::Reduce(production)
        } else {
            Action::Error
        }
    };

    match state {
        State::Start => match t {
            T::Bang => Action::Shift(State::Bang),
            T::Close | T::Count => Action::Error,
            _ => Action::Reduce(Production::ConcatEmpty),
        },
        State::Pipe | State::Amp | State::Open => match t {
            T::Bang => Action::Shift(State::Bang),
            _ => reduce_if(follows_term, Production::ConcatEmpty),
        },
        State::Bang => reduce_if(follows_term, Production::ConcatEmpty),
        State::Accept => match t {
            T::Eof => Action::Accept,
            _ => Action::Error,
        },
        State::Alternative => match t {
            T::Pipe => Action::Shift(State::Pipe),
            T::Eof => Action::Reduce(Production::Pattern),
            _ => Action::Error,
        },
        State::Conjunction => match t {
            T::Amp => Action::Shift(State::Amp),
            T::Pipe | T::Close | T::Eof => Action::Reduce(Production::AltSingle),
            _ => Action::Error,
        },
        State::Union => match t {
            T::Amp => Action::Shift(State::Amp),
            T::Pipe | T::Close | T::Eof => Action::Reduce(Production::AltUnion),
            _ => Action::Error,
        },
        State::Negation => reduce_if(ends_negation(t), Production::ConjSingle),
        State::Intersection => reduce_if(ends_negation(t), Production::ConjIntersect),
        State::Concatenation if starts_term(t) => shift_term(t),
        State::Concatenation => reduce_if(ends_negation(t), Production::NegPlain),
        State::Negated if starts_term(t) => shift_term(t),
        State::Negated => reduce_if(ends_negation(t), Production::NegComplement),
        State::Iteration => reduce_if(follows_term, Production::ConcatAppend),
        State::Term => match t {
            T::Count => Action::Shift(State::Counted),
            _ => reduce_if(follows_term, Production::IterPlain),
        },
        State::Counted => reduce_if(follows_term, Production::IterCount),
        State::Letters => reduce_if(follows_term || t == T::Count, Production::TermLetters),
        State::Dot => reduce_if(follows_term || t == T::Count, Production::TermDot),
        State::Caret => reduce_if(follows_term || t == T::Count, Production::TermBegin),
        State::Dollar => reduce_if(follows_term || t == T::Count, Production::TermEnd),
        State::Close => reduce_if(follows_term || t == T::Count, Production::TermGroup),
        State::Group => match t {
            T::Close => Action::Shift(State::Close),
            T::Pipe => Action::Shift(State::Pipe),
            _ => Action::Error,
        },
    }
}

fn goto(state: State, nt: Nonterminal) -> State {
    use Nonterminal as N;

    match (state, nt) {
        (State::Start, N::Pattern) => State::Accept,
        (State::Start, N::Alternative) => State::Alternative,
        (State::Open, N::Alternative) => State::Group,
        (State::Start | State::Open, N::Conjunction) => State::Conjunction,
        (State::Pipe, N::Conjunction) => State::Union,
        (State::Start | State::Open | State::Pipe, N::Negation) => State::Negation,
        (State::Amp, N::Negation) => State::Intersection,
        (State::Start | State::Open | State::Pipe | State::Amp, N::Concatenation) => {
            State::Concatenation
        }
        (State::Bang, N::Concatenation) => State::Negated,
        (State::Concatenation | State::Negated, N::Iteration) => State::Iteration,
        (State::Concatenation | State::Negated, N::Term) => State::Term,
        (state, nt) => unreachable!("no goto from {:?} on {:?}", state, nt),
    }
}

/// One entry of the parse stack.
#[derive(Debug)]
struct Slot {
    state: State,
    value: Option<Value>,
}

/// Runs the grammar over a token source.
pub(crate) struct Parser<'s, S: TokenSource + ?Sized> {
    source: &'s mut S,
    stack: Vec<Slot>,
    size_limit: usize,
}

impl<'s, S: TokenSource + ?Sized> Parser<'s, S> {
    pub(crate) fn new(source: &'s mut S, size_limit: usize) -> Self {
        Parser {
            source,
            size_limit,
            stack: vec![Slot {
                state: State::Start,
                value: None,
            }],
        }
    }

    /// Parse the whole token stream into one automaton.
    pub(crate) fn parse(mut self) -> Result<Fsm, Error> {
        let mut token = self.source.next_term()?;
        loop {
            let state = self.top_state()?;
            match action(state, token.kind) {
                Action::Shift(next) => {
                    trace!(
                        "shift {} at {}: {:?} -> {:?}",
                        token.kind,
                        token.offset,
                        state,
                        next
                    );
                    self.stack.push(Slot {
                        state: next,
                        value: token.term.take().map(Value::from),
                    });
                    token = self.source.next_term()?;
                }
                Action::Reduce(production) => {
                    let value = self.reduce(production)?;
                    let next = goto(self.top_state()?, production.lhs());
                    trace!("reduce {:?}: {:?} -> {:?}", production, state, next);
                    self.stack.push(Slot {
                        state: next,
                        value: Some(value),
                    });
                }
                Action::Accept => {
                    let encoding = self.source.encoding();
                    let value = operand(self.stack.pop().and_then(|slot| slot.value))?;
                    return Ok(value.into_fsm(encoding));
                }
                Action::Error => return Err(syntax_error(&token)),
            }
        }
    }

    fn top_state(&self) -> Result<State, Error> {
        self.stack
            .last()
            .map(|slot| slot.state)
            .ok_or_else(|| Error::Internal("parse stack is empty".to_string()))
    }

    fn check_size(&self, states: usize) -> Result<(), Error> {
        if states > self.size_limit {
            debug!("{} states exceed the size limit of {}", states, self.size_limit);
            return Err(Error::SizeLimitExceeded {
                limit: self.size_limit,
            });
        }
        Ok(())
    }

    /// Pop the right-hand side of `production` and build its value.
    fn reduce(&mut self, production: Production) -> Result<Value, Error> {
        let encoding = self.source.encoding();
        let at = self
            .stack
            .len()
            .checked_sub(production.len())
            .filter(|&at| at > 0)
            .ok_or_else(|| Error::Internal(format!("parse stack too short for {:?}", production)))?;
        let mut rhs = self.stack.split_off(at).into_iter().map(|slot| slot.value);

        let value = match production {
            Production::ConcatEmpty => Value::from(Fsm::empty()),
            Production::Pattern => Value::from(operand(rhs.next().flatten())?.into_fsm(encoding)),
            Production::AltSingle
            | Production::ConjSingle
            | Production::NegPlain
            | Production::IterPlain
            | Production::TermLetters
            | Production::TermDot
            | Production::TermBegin
            | Production::TermEnd => operand(rhs.next().flatten())?,
            Production::AltUnion => {
                let a = operand(rhs.next().flatten())?;
                rhs.next();
                let b = operand(rhs.next().flatten())?;
                Value::from(ops::union(a.into_fsm(encoding), b.into_fsm(encoding)))
            }
            Production::ConjIntersect => {
                let a = operand(rhs.next().flatten())?;
                rhs.next();
                let b = operand(rhs.next().flatten())?;
                Value::from(ops::intersect_within(
                    a.into_fsm(encoding),
                    b.into_fsm(encoding),
                    self.size_limit,
                )?)
            }
            Production::NegComplement => {
                rhs.next();
                let mut value = operand(rhs.next().flatten())?;
                value.as_fsm_mut(encoding).complement_within(self.size_limit)?;
                value
            }
            Production::ConcatAppend => {
                let mut value = operand(rhs.next().flatten())?;
                let item = operand(rhs.next().flatten())?;
                append(value.as_fsm_mut(encoding), item, encoding);
                value
            }
            Production::IterCount => {
                let item = operand(rhs.next().flatten())?;
                let (min, max) = match operand(rhs.next().flatten())? {
                    Value::Term(Term::RepetitionCount { min, max }) => (min, max),
                    other => {
                        return Err(Error::Internal(format!(
                            "expected a repetition count, found {:?}",
                            other
                        )))
                    }
                };
                let item = item.into_fsm(encoding);
                self.check_size(repetition_size(item.state_count(), min, max))?;
                let mut fsm = repeat_bounded(item, min, max);
                self.source.on_parenthesized(&mut fsm);
                Value::from(fsm)
            }
            Production::TermGroup => {
                rhs.next();
                let mut fsm = operand(rhs.next().flatten())?.into_fsm(encoding);
                self.source.on_parenthesized(&mut fsm);
                Value::from(fsm)
            }
        };
        if let Value::Automaton(fsm) = &value {
            self.check_size(fsm.state_count())?;
        }
        Ok(value)
    }
}

/// Append one iteration onto the running concatenation.
///
/// Plain classes and the wildcard are appended directly. Everything else is
/// materialized first and then concatenated.
fn append(fsm: &mut Fsm, item: Value, encoding: Encoding) {
    match item {
        Value::Term(Term::CharacterRange {
            alternatives,
            negated: false,
        }) => append_range(&alternatives, encoding, fsm),
        Value::Term(Term::Dot) => encoding.append_wildcard(fsm),
        other => {
            let prefix = std::mem::replace(fsm, Fsm::never());
            *fsm = ops::concat(prefix, other.into_fsm(encoding));
        }
    }
}

fn operand(value: Option<Value>) -> Result<Value, Error> {
    value.ok_or_else(|| Error::Internal("grammar slot carries no value".to_string()))
}

fn syntax_error(token: &Token) -> Error {
    Error::Syntax {
        offset: token.offset,
        found: token.kind,
    }
}
