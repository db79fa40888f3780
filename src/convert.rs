//! Turning terms into automata.

use std::collections::BTreeSet;

use regex_fsm_automata::{ops, Fsm, Mark};

use crate::encoding::Encoding;
use crate::term::Term;
use crate::value::Value;

/// Promote `value` to its automaton form in place and borrow it.
///
/// Converting a value that already holds an automaton is a no-op, so calling
/// this repeatedly observes the same automaton.
pub fn convert_to_fsm(value: &mut Value, encoding: Encoding) -> &mut Fsm {
    value.as_fsm_mut(encoding)
}

/// Build the automaton for a single term.
pub(crate) fn materialize(term: &Term, encoding: Encoding) -> Fsm {
    let mut fsm = Fsm::empty();
    match term {
        Term::Dot => encoding.append_wildcard(&mut fsm),
        Term::Begin => fsm.append_special(Mark::Begin),
        Term::End => fsm.append_special(Mark::End),
        Term::CharacterRange {
            alternatives,
            negated,
        } => {
            append_range(alternatives, encoding, &mut fsm);
            if *negated {
                // Complementing the literal automaton alone would also accept
                // every string that isn't one character long. Mixing in the
                // complement of the wildcard pins the result to single
                // characters.
                let mut others = Fsm::empty();
                encoding.append_wildcard(&mut others);
                others.complement();
                fsm = ops::union(fsm, others);
                fsm.complement();
                fsm.remove_dead_ends();
            }
        }
        Term::RepetitionCount { .. } => {
            unreachable!("repetition counts are consumed by the iteration rule")
        }
    }
    fsm
}

/// Concatenate the alternation of `alternatives` onto `fsm`.
///
/// Every codepoint goes through [`Encoding::to_local`]. An alternative with
/// any unrepresentable codepoint is dropped whole. If nothing survives, `fsm`
/// becomes the automaton that accepts nothing; this is not an error.
pub fn append_range(alternatives: &BTreeSet<Vec<char>>, encoding: Encoding, fsm: &mut Fsm) {
    let strings: BTreeSet<Vec<u8>> = alternatives
        .iter()
        .filter_map(|sequence| {
            sequence
                .iter()
                .map(|&c| encoding.to_local(c))
                .collect::<Option<Vec<Vec<u8>>>>()
                .map(|bytes| bytes.concat())
        })
        .collect();

    if strings.len() < alternatives.len() {
        debug!(
            "dropped {} of {} alternatives unrepresentable in {}",
            alternatives.len() - strings.len(),
            alternatives.len(),
            encoding.name()
        );
    }

    if strings.is_empty() {
        *fsm = Fsm::never();
    } else {
        fsm.append_strings(&strings);
    }
}
