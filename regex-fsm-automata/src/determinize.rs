//! Subset construction and the product of two automata.
//!
//! Marks are zero-width, so a deterministic automaton cannot consume them
//! like bytes. Determinization resolves them against the boundaries of the
//! input instead: `Mark::Begin` edges are followed before the first byte,
//! `Mark::End` edges when acceptance is decided. The result reads bytes only
//! and accepts the same inputs as the original under [`crate::Matcher`].
//!
//! Anchors inside an automaton that is later concatenated behind other text
//! are therefore resolved as if that automaton started the input.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

use crate::fsm::{Fsm, Label, Mark, StateId};

/// Every byte.
const SYMBOLS: usize = 256;

/// A construction needed more states than its budget allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimitExceeded {
    pub limit: usize,
}

impl fmt::Display for SizeLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "automaton exceeds the limit of {} states", self.limit)
    }
}

impl std::error::Error for SizeLimitExceeded {}

/// Build a complete deterministic automaton for the inputs `nfa` accepts.
///
/// Every state of the result has transitions covering all 256 bytes, and
/// there are no mark transitions or epsilon edges. The empty subset becomes
/// an explicit non-accepting sink when some byte leads nowhere.
pub fn determinize(nfa: &Fsm) -> Fsm {
    match determinize_within(nfa, usize::MAX) {
        Ok(dfa) => dfa,
        Err(err) => unreachable!("{}", err),
    }
}

/// Like [`determinize`], but gives up once the result would have more than
/// `limit` states.
pub fn determinize_within(nfa: &Fsm, limit: usize) -> Result<Fsm, SizeLimitExceeded> {
    let closure = nfa.epsilon_closure(&BTreeSet::from([nfa.start()]));
    let start = nfa.follow_marks(&closure, &[Mark::Begin]);

    let mut dfa = Fsm::never();
    // The start state is kept apart from the subset map: on the empty input
    // both marks apply to it, so its acceptance differs from a later state
    // with the same subset.
    let empty_input = nfa.follow_marks(&start, &[Mark::Begin, Mark::End]);
    dfa.set_accepting(0, nfa.is_accepting(&empty_input));

    let mut ids: HashMap<BTreeSet<StateId>, StateId> = HashMap::new();
    let mut queue = VecDeque::new();
    queue.push_back((start, 0));

    while let Some((subset, id)) = queue.pop_front() {
        let mut row = Vec::with_capacity(SYMBOLS);
        for next in successors(nfa, &subset) {
            let closure = nfa.epsilon_closure(&next);
            let target = match ids.get(&closure) {
                Some(&target) => target,
                None => {
                    if dfa.state_count() >= limit {
                        return Err(SizeLimitExceeded { limit });
                    }
                    let target = dfa.add_state();
                    let at_end = nfa.follow_marks(&closure, &[Mark::End]);
                    dfa.set_accepting(target, nfa.is_accepting(&at_end));
                    ids.insert(closure.clone(), target);
                    queue.push_back((closure, target));
                    target
                }
            };
            row.push(target);
        }
        add_row(&mut dfa, id, &row);
    }

    debug!(
        "determinized {} states into {} states",
        nfa.state_count(),
        dfa.state_count()
    );
    Ok(dfa)
}

/// Product construction over the determinized operands.
///
/// A product state accepts when `accept` holds for the acceptance of its
/// two components. Neither operand nor the product may exceed `limit` states.
pub(crate) fn product(
    a: &Fsm,
    b: &Fsm,
    accept: impl Fn(bool, bool) -> bool,
    limit: usize,
) -> Result<Fsm, SizeLimitExceeded> {
    let (a, b) = (determinize_within(a, limit)?, determinize_within(b, limit)?);
    let (a_table, b_table) = (transition_table(&a), transition_table(&b));

    let mut fsm = Fsm::never();
    let mut ids: HashMap<(StateId, StateId), StateId> = HashMap::new();
    let mut queue = VecDeque::new();
    ids.insert((a.start(), b.start()), 0);
    queue.push_back(((a.start(), b.start()), 0));

    while let Some(((p, q), id)) = queue.pop_front() {
        if accept(a.is_accepting_state(p), b.is_accepting_state(q)) {
            fsm.set_accepting(id, true);
        }

        let mut row = Vec::with_capacity(SYMBOLS);
        for symbol in 0..SYMBOLS {
            let pair = (a_table[p][symbol], b_table[q][symbol]);
            let target = match ids.get(&pair) {
                Some(&target) => target,
                None => {
                    if fsm.state_count() >= limit {
                        return Err(SizeLimitExceeded { limit });
                    }
                    let target = fsm.add_state();
                    ids.insert(pair, target);
                    queue.push_back((pair, target));
                    target
                }
            };
            row.push(target);
        }
        add_row(&mut fsm, id, &row);
    }

    debug!("product automaton has {} states", fsm.state_count());
    Ok(fsm)
}

/// Raw successor sets of `subset`, one per byte.
fn successors(nfa: &Fsm, subset: &BTreeSet<StateId>) -> Vec<BTreeSet<StateId>> {
    let mut targets = vec![BTreeSet::new(); SYMBOLS];
    for &id in subset {
        for t in &nfa.states()[id].transitions {
            if let Label::Range { start, end } = t.label {
                for byte in start..=end {
                    targets[byte as usize].insert(t.target);
                }
            }
        }
    }
    targets
}

/// Dense transition table of a complete deterministic automaton.
fn transition_table(dfa: &Fsm) -> Vec<Vec<StateId>> {
    dfa.states()
        .iter()
        .map(|state| {
            let mut row = vec![0; SYMBOLS];
            for t in &state.transitions {
                if let Label::Range { start, end } = t.label {
                    for byte in start..=end {
                        row[byte as usize] = t.target;
                    }
                }
            }
            row
        })
        .collect()
}

/// Emit one transition per run of consecutive bytes sharing a target.
fn add_row(fsm: &mut Fsm, from: StateId, row: &[StateId]) {
    let mut run = 0;
    for byte in 1..=SYMBOLS {
        if byte == SYMBOLS || row[byte] != row[run] {
            fsm.add_transition(from, Label::range(run as u8, (byte - 1) as u8), row[run]);
            run = byte;
        }
    }
}
