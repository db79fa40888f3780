use crate::fsm::{Fsm, Mark};
use std::collections::BTreeSet;

/// Checks whole inputs against an automaton.
///
/// `Mark::Begin` transitions may only be taken before the first byte and
/// `Mark::End` transitions only after the last one.
pub struct Matcher<'a> {
    fsm: &'a Fsm,
}

impl<'a> Matcher<'a> {
    /// Create a new matcher for the given automaton
    pub fn new(fsm: &'a Fsm) -> Self {
        Self { fsm }
    }

    /// Check if the entire input is accepted
    pub fn is_match(&self, input: &[u8]) -> bool {
        let start = self.fsm.epsilon_closure(&BTreeSet::from([self.fsm.start()]));
        let at_start: &[Mark] = if input.is_empty() {
            &[Mark::Begin, Mark::End]
        } else {
            &[Mark::Begin]
        };
        let mut current = self.fsm.follow_marks(&start, at_start);

        for &byte in input {
            if current.is_empty() {
                return false;
            }
            current = self
                .fsm
                .epsilon_closure(&self.fsm.step_byte(&current, byte));
        }

        let current = self.fsm.follow_marks(&current, &[Mark::End]);
        self.fsm.is_accepting(&current)
    }
}

impl Fsm {
    /// Shorthand for [`Matcher::is_match`].
    pub fn accepts(&self, input: &[u8]) -> bool {
        Matcher::new(self).is_match(input)
    }
}
