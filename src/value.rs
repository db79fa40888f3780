use regex_fsm_automata::Fsm;

use crate::convert::materialize;
use crate::encoding::Encoding;
use crate::term::Term;

/// The unit of data flowing between grammar reductions.
///
/// The lexer hands out terms. A term is promoted to an automaton the first
/// time it takes part in an algebra operation, and stays promoted.
#[derive(Debug, PartialEq)]
pub enum Value {
    Term(Term),
    Automaton(Fsm),
}

impl Value {
    /// Borrow the automaton form, promoting a term in place first.
    pub fn as_fsm_mut(&mut self, encoding: Encoding) -> &mut Fsm {
        if let Value::Term(term) = self {
            let fsm = materialize(term, encoding);
            *self = Value::Automaton(fsm);
        }
        match self {
            Value::Automaton(fsm) => fsm,
            Value::Term(_) => unreachable!("term was promoted above"),
        }
    }

    /// Take the automaton form, promoting a term first.
    pub fn into_fsm(self, encoding: Encoding) -> Fsm {
        match self {
            Value::Automaton(fsm) => fsm,
            Value::Term(term) => materialize(&term, encoding),
        }
    }

    /// Store `fsm` and hand back the previous value.
    pub fn replace(&mut self, fsm: Fsm) -> Value {
        std::mem::replace(self, Value::Automaton(fsm))
    }

    pub fn is_automaton(&self) -> bool {
        matches!(self, Value::Automaton(_))
    }
}

impl From<Term> for Value {
    fn from(term: Term) -> Self {
        Value::Term(term)
    }
}

impl From<Fsm> for Value {
    fn from(fsm: Fsm) -> Self {
        Value::Automaton(fsm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_is_idempotent() {
        let mut value = Value::from(Term::chars(['a', 'b']));
        assert!(!value.is_automaton());

        let first = value.as_fsm_mut(Encoding::Ascii).clone();
        assert!(value.is_automaton());
        let second = value.as_fsm_mut(Encoding::Ascii).clone();
        assert_eq!(first, second);
        assert!(second.accepts(b"a"));
        assert!(second.accepts(b"b"));
    }

    #[test]
    fn replace_returns_previous_value() {
        let mut value = Value::from(Term::Dot);
        let previous = value.replace(Fsm::empty());
        assert_eq!(previous, Value::Term(Term::Dot));
        assert_eq!(value.into_fsm(Encoding::Utf8), Fsm::empty());
    }
}
