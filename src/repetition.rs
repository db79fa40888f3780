use regex_fsm_automata::{ops, Fsm};

use crate::term::Limit;

/// Build the automaton for `min..=max` occurrences of `orig`.
///
/// `orig` is consumed. The caller reports the result to the lexer as one
/// completed atom.
pub fn repeat_bounded(orig: Fsm, min: u32, max: Limit) -> Fsm {
    match (min, max) {
        (0, Limit::Finite(1)) => ops::union(orig, Fsm::empty()),
        (0, Limit::Infinity) => {
            let mut cur = orig;
            cur.iterate();
            cur
        }
        (1, Limit::Infinity) => {
            let closure = ops::star(&orig);
            ops::concat(orig, closure)
        }
        (m, max) => {
            let cur = ops::repeat(&orig, m);
            match max {
                Limit::Infinity => ops::concat(cur, ops::star(&orig)),
                Limit::Finite(n) if n != m => {
                    // Each of the remaining occurrences is optional on its own.
                    let optional = ops::union(orig, Fsm::empty());
                    ops::concat(cur, ops::repeat(&optional, n.saturating_sub(m)))
                }
                Limit::Finite(_) => cur,
            }
        }
    }
}

/// Upper estimate of the states [`repeat_bounded`] creates for an operand of
/// `states` states.
pub(crate) fn repetition_size(states: usize, min: u32, max: Limit) -> usize {
    let copies = match max {
        Limit::Finite(n) => n.max(min),
        Limit::Infinity => min.saturating_add(1),
    };
    // Every copy may carry two extra states: the optional branch and the
    // closure's new start.
    states
        .saturating_add(2)
        .saturating_mul(copies.max(1) as usize)
        .saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn letter() -> Fsm {
        let mut fsm = Fsm::empty();
        fsm.append_strings(&BTreeSet::from([b"a".to_vec()]));
        fsm
    }

    fn accepted_counts(fsm: &Fsm, up_to: usize) -> Vec<usize> {
        (0..=up_to)
            .filter(|&k| fsm.accepts(&vec![b'a'; k]))
            .collect()
    }

    #[test]
    fn optional() {
        let fsm = repeat_bounded(letter(), 0, Limit::Finite(1));
        assert_eq!(accepted_counts(&fsm, 4), vec![0, 1]);
    }

    #[test]
    fn zero_or_more() {
        let fsm = repeat_bounded(letter(), 0, Limit::Infinity);
        assert_eq!(accepted_counts(&fsm, 4), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn one_or_more() {
        let fsm = repeat_bounded(letter(), 1, Limit::Infinity);
        assert_eq!(accepted_counts(&fsm, 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn at_least() {
        let fsm = repeat_bounded(letter(), 3, Limit::Infinity);
        assert_eq!(accepted_counts(&fsm, 6), vec![3, 4, 5, 6]);
    }

    #[test]
    fn bounded_range() {
        let fsm = repeat_bounded(letter(), 2, Limit::Finite(4));
        assert_eq!(accepted_counts(&fsm, 6), vec![2, 3, 4]);
    }

    #[test]
    fn exact() {
        let fsm = repeat_bounded(letter(), 3, Limit::Finite(3));
        assert_eq!(accepted_counts(&fsm, 5), vec![3]);
    }

    #[test]
    fn zero_times() {
        let fsm = repeat_bounded(letter(), 0, Limit::Finite(0));
        assert_eq!(accepted_counts(&fsm, 3), vec![0]);
    }

    #[test]
    fn up_to() {
        let fsm = repeat_bounded(letter(), 0, Limit::Finite(2));
        assert_eq!(accepted_counts(&fsm, 4), vec![0, 1, 2]);
    }

    #[test]
    fn multi_byte_occurrence() {
        let mut ab = Fsm::empty();
        ab.append_strings(&BTreeSet::from([b"ab".to_vec()]));
        let fsm = repeat_bounded(ab, 1, Limit::Finite(2));
        assert!(fsm.accepts(b"ab"));
        assert!(fsm.accepts(b"abab"));
        assert!(!fsm.accepts(b"aba"));
        assert!(!fsm.accepts(b""));
    }

    #[test]
    fn size_estimate_covers_construction() {
        let cases = [
            (0, Limit::Finite(1)),
            (0, Limit::Infinity),
            (1, Limit::Infinity),
            (3, Limit::Finite(3)),
            (2, Limit::Finite(5)),
            (4, Limit::Infinity),
        ];
        for (min, max) in cases {
            let states = letter().state_count();
            let built = repeat_bounded(letter(), min, max).state_count();
            assert!(
                built <= repetition_size(states, min, max),
                "{{{},{:?}}}: {} states",
                min,
                max,
                built
            );
        }
        assert_eq!(repetition_size(usize::MAX, 2, Limit::Finite(2)), usize::MAX);
    }
}
