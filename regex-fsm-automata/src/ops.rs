//! The automaton algebra.
//!
//! Binary operations take their operands by value and return the combined
//! automaton. Unary rewrites (`complement`, `iterate`, the `append_*`
//! family and `remove_dead_ends`) mutate the receiver.

use std::collections::{BTreeSet, HashSet};

use crate::determinize::{determinize_within, product, SizeLimitExceeded};
use crate::fsm::{Fsm, Label, Mark, State, StateId, Transition};

/// Accepts a string iff `a` or `b` accepts it.
pub fn union(a: Fsm, b: Fsm) -> Fsm {
    let mut fsm = Fsm::never();
    let a_start = fsm.embed(a);
    let b_start = fsm.embed(b);
    fsm.connect(0, a_start);
    fsm.connect(0, b_start);
    fsm
}

/// Accepts a string iff both `a` and `b` accept it.
pub fn intersect(a: Fsm, b: Fsm) -> Fsm {
    match intersect_within(a, b, usize::MAX) {
        Ok(fsm) => fsm,
        Err(err) => unreachable!("{}", err),
    }
}

/// [`intersect`] with a budget on the deterministic automata it builds.
pub fn intersect_within(a: Fsm, b: Fsm, limit: usize) -> Result<Fsm, SizeLimitExceeded> {
    let mut fsm = product(&a, &b, |x, y| x && y, limit)?;
    fsm.remove_dead_ends();
    Ok(fsm)
}

/// Accepts a string iff it splits into a prefix accepted by `a` followed by
/// a suffix accepted by `b`.
pub fn concat(a: Fsm, b: Fsm) -> Fsm {
    let mut fsm = a;
    let finals = fsm.accepting_states();
    for &id in &finals {
        fsm.set_accepting(id, false);
    }
    let b_start = fsm.embed(b);
    for id in finals {
        fsm.connect(id, b_start);
    }
    fsm
}

/// Zero or more repeats of `a`. The operand is left untouched.
pub fn star(a: &Fsm) -> Fsm {
    let mut fsm = a.clone();
    fsm.iterate();
    fsm
}

/// Exactly `n` concatenated repeats of `a`.
pub fn repeat(a: &Fsm, n: u32) -> Fsm {
    (0..n).fold(Fsm::empty(), |acc, _| concat(acc, a.clone()))
}

impl Fsm {
    /// Rewrite into the Kleene closure of the current language.
    pub fn iterate(&mut self) {
        let old_start = self.start();
        let start = self.add_state();
        self.connect(start, old_start);
        for id in self.accepting_states() {
            self.connect(id, start);
        }
        self.set_accepting(start, true);
        self.set_start(start);
    }

    /// Rewrite into the complement of the current language.
    ///
    /// The complement is taken over every byte string, with anchors resolved
    /// as in [`determinize`](crate::determinize). The result is a complete
    /// deterministic automaton without mark transitions.
    pub fn complement(&mut self) {
        if let Err(err) = self.complement_within(usize::MAX) {
            unreachable!("{}", err)
        }
    }

    /// [`complement`](Fsm::complement) that leaves `self` untouched when the
    /// deterministic automaton would exceed `limit` states.
    pub fn complement_within(&mut self, limit: usize) -> Result<(), SizeLimitExceeded> {
        let mut dfa = determinize_within(self, limit)?;
        for id in 0..dfa.state_count() {
            let accepting = dfa.is_accepting_state(id);
            dfa.set_accepting(id, !accepting);
        }
        *self = dfa;
        Ok(())
    }

    /// Concatenate the alternation of the given literal strings.
    ///
    /// The strings are laid out as a trie so shared prefixes share states.
    /// An empty set appends the empty language.
    pub fn append_strings(&mut self, strings: &BTreeSet<Vec<u8>>) {
        let mut tail = Fsm::never();
        for string in strings {
            let mut state = tail.start();
            for &byte in string {
                let existing = tail.states()[state]
                    .transitions
                    .iter()
                    .find(|t| t.label == Label::byte(byte))
                    .map(|t| t.target);
                state = match existing {
                    Some(next) => next,
                    None => {
                        let next = tail.add_state();
                        tail.add_transition(state, Label::byte(byte), next);
                        next
                    }
                };
            }
            tail.set_accepting(state, true);
        }

        let head = self.take();
        *self = concat(head, tail);
    }

    /// Concatenate the alternation of the given byte-range sequences.
    ///
    /// Each sequence matches one byte per range, in order. Encodings use
    /// this to describe "any single character".
    pub fn append_sequences(&mut self, sequences: &[Vec<(u8, u8)>]) {
        let mut tail = Fsm::never();
        let end = tail.add_state();
        tail.set_accepting(end, true);

        for sequence in sequences {
            let mut state = tail.start();
            for (i, &(start, last)) in sequence.iter().enumerate() {
                let next = if i + 1 == sequence.len() {
                    end
                } else {
                    tail.add_state()
                };
                tail.add_transition(state, Label::range(start, last), next);
                state = next;
            }
            if sequence.is_empty() {
                tail.connect(state, end);
            }
        }

        let head = self.take();
        *self = concat(head, tail);
    }

    /// Concatenate a single zero-width `mark` transition.
    pub fn append_special(&mut self, mark: Mark) {
        let mut tail = Fsm::never();
        let end = tail.add_state();
        tail.add_transition(0, Label::Mark(mark), end);
        tail.set_accepting(end, true);

        let head = self.take();
        *self = concat(head, tail);
    }

    /// Drop every state that is unreachable from the start or cannot reach
    /// an accepting state. The language is unchanged.
    pub fn remove_dead_ends(&mut self) {
        let count = self.state_count();

        let mut reachable = vec![false; count];
        let mut stack = vec![self.start()];
        reachable[self.start()] = true;
        while let Some(id) = stack.pop() {
            let state = &self.states()[id];
            let targets = state
                .transitions
                .iter()
                .map(|t| t.target)
                .chain(state.epsilons.iter().copied());
            for next in targets {
                if !reachable[next] {
                    reachable[next] = true;
                    stack.push(next);
                }
            }
        }

        let mut predecessors: Vec<Vec<StateId>> = vec![Vec::new(); count];
        for (id, state) in self.states().iter().enumerate() {
            for t in &state.transitions {
                predecessors[t.target].push(id);
            }
            for &e in &state.epsilons {
                predecessors[e].push(id);
            }
        }

        let mut live = vec![false; count];
        let mut stack = self.accepting_states();
        for &id in &stack {
            live[id] = true;
        }
        while let Some(id) = stack.pop() {
            for &prev in &predecessors[id] {
                if !live[prev] {
                    live[prev] = true;
                    stack.push(prev);
                }
            }
        }

        if !(reachable[self.start()] && live[self.start()]) {
            trace!("start state is a dead end, automaton accepts nothing");
            *self = Fsm::never();
            return;
        }

        let mut remap: Vec<Option<StateId>> = vec![None; count];
        let mut kept = 0;
        for id in 0..count {
            if reachable[id] && live[id] {
                remap[id] = Some(kept);
                kept += 1;
            }
        }

        let mut states = vec![State::default(); kept];
        for (id, state) in self.states().iter().enumerate() {
            let Some(new_id) = remap[id] else { continue };
            for t in &state.transitions {
                if let Some(target) = remap[t.target] {
                    states[new_id].transitions.push(Transition {
                        label: t.label,
                        target,
                    });
                }
            }
            for &e in &state.epsilons {
                if let Some(target) = remap[e] {
                    states[new_id].epsilons.push(target);
                }
            }
        }

        let accepting: HashSet<StateId> = self
            .accepting_states()
            .into_iter()
            .filter_map(|id| remap[id])
            .collect();
        let start = remap[self.start()].unwrap_or(0);

        trace!("pruned {} of {} states", count - kept, count);
        self.rebuild(states, start, accepting);
    }
}
