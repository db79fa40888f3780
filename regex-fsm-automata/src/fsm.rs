use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// A state ID in the automaton
pub type StateId = usize;

/// A zero-width position recognized by a transition instead of a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mark {
    /// Start of text (`^`).
    Begin,
    /// End of text (`$`).
    End,
}

/// What a single transition consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    /// Any byte in `start..=end`.
    Range { start: u8, end: u8 },
    /// A zero-width anchor mark.
    Mark(Mark),
}

impl Label {
    /// A transition on exactly one byte
    pub fn byte(byte: u8) -> Self {
        Label::Range {
            start: byte,
            end: byte,
        }
    }

    /// A transition on an inclusive byte range
    pub fn range(start: u8, end: u8) -> Self {
        Label::Range { start, end }
    }

    /// Whether this label consumes `byte`
    pub fn matches_byte(&self, byte: u8) -> bool {
        match *self {
            Label::Range { start, end } => start <= byte && byte <= end,
            Label::Mark(_) => false,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn byte(f: &mut fmt::Formatter<'_>, b: u8) -> fmt::Result {
            if b.is_ascii_graphic() {
                write!(f, "'{}'", b as char)
            } else {
                write!(f, "\\x{:02X}", b)
            }
        }

        match *self {
            Label::Range { start, end } if start == end => byte(f, start),
            Label::Range { start, end } => {
                byte(f, start)?;
                write!(f, "-")?;
                byte(f, end)
            }
            Label::Mark(Mark::Begin) => write!(f, "^"),
            Label::Mark(Mark::End) => write!(f, "$"),
        }
    }
}

/// A labelled edge to another state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub label: Label,
    pub target: StateId,
}

/// One state: its labelled transitions and its epsilon edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub transitions: Vec<Transition>,
    pub epsilons: Vec<StateId>,
}

/// A finite-state automaton over bytes and anchor marks.
///
/// The automaton always has at least one state, the start state. Any subset
/// of states may be accepting.
#[derive(Debug, Clone, PartialEq)]
pub struct Fsm {
    states: Vec<State>,
    start: StateId,
    accepting: HashSet<StateId>,
}

impl Fsm {
    /// An automaton with a lone, non-accepting start state
    fn with_start() -> Self {
        Self {
            states: vec![State::default()],
            start: 0,
            accepting: HashSet::new(),
        }
    }

    /// The automaton accepting exactly the empty string
    pub fn empty() -> Self {
        let mut fsm = Self::with_start();
        fsm.accepting.insert(0);
        fsm
    }

    /// The automaton accepting nothing
    pub fn never() -> Self {
        Self::with_start()
    }

    /// Add a new state and return its ID
    pub fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    /// Add a labelled transition between two existing states
    pub fn add_transition(&mut self, from: StateId, label: Label, to: StateId) {
        self.states[from].transitions.push(Transition { label, target: to });
    }

    /// Connect two states with an epsilon edge
    pub fn connect(&mut self, from: StateId, to: StateId) {
        if !self.states[from].epsilons.contains(&to) {
            self.states[from].epsilons.push(to);
        }
    }

    pub fn set_start(&mut self, start: StateId) {
        self.start = start;
    }

    pub fn set_accepting(&mut self, id: StateId, accepting: bool) {
        if accepting {
            self.accepting.insert(id);
        } else {
            self.accepting.remove(&id);
        }
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn is_accepting_state(&self, id: StateId) -> bool {
        self.accepting.contains(&id)
    }

    /// Accepting states in ascending order
    pub fn accepting_states(&self) -> Vec<StateId> {
        let mut accepting: Vec<_> = self.accepting.iter().copied().collect();
        accepting.sort_unstable();
        accepting
    }

    /// Whether any state carries an epsilon edge
    pub fn has_epsilons(&self) -> bool {
        self.states.iter().any(|state| !state.epsilons.is_empty())
    }

    /// Move the contents out, leaving an automaton that accepts nothing
    pub(crate) fn take(&mut self) -> Fsm {
        std::mem::replace(self, Fsm::never())
    }

    /// Copy all states of `other` into this automaton.
    ///
    /// The embedded accepting states stay accepting. Returns the embedded
    /// start state; nothing points at it yet.
    pub(crate) fn embed(&mut self, other: Fsm) -> StateId {
        let offset = self.states.len();
        for state in other.states {
            self.states.push(State {
                transitions: state
                    .transitions
                    .into_iter()
                    .map(|t| Transition {
                        label: t.label,
                        target: t.target + offset,
                    })
                    .collect(),
                epsilons: state.epsilons.into_iter().map(|e| e + offset).collect(),
            });
        }
        self.accepting
            .extend(other.accepting.into_iter().map(|id| id + offset));
        other.start + offset
    }

    /// Replace the whole state table
    pub(crate) fn rebuild(&mut self, states: Vec<State>, start: StateId, accepting: HashSet<StateId>) {
        self.states = states;
        self.start = start;
        self.accepting = accepting;
    }

    /// Get epsilon closure of a set of states
    pub fn epsilon_closure(&self, states: &BTreeSet<StateId>) -> BTreeSet<StateId> {
        let mut closure = states.clone();
        let mut stack: Vec<StateId> = states.iter().copied().collect();

        while let Some(id) = stack.pop() {
            for &next in &self.states[id].epsilons {
                if closure.insert(next) {
                    stack.push(next);
                }
            }
        }

        closure
    }

    /// Check if any state in the set is accepting
    pub fn is_accepting(&self, states: &BTreeSet<StateId>) -> bool {
        states.iter().any(|id| self.accepting.contains(id))
    }

    /// States reached from `states` by consuming `byte`, before closure
    pub fn step_byte(&self, states: &BTreeSet<StateId>, byte: u8) -> BTreeSet<StateId> {
        states
            .iter()
            .flat_map(|&id| self.states[id].transitions.iter())
            .filter(|t| t.label.matches_byte(byte))
            .map(|t| t.target)
            .collect()
    }

    /// States reached from `states` through a `mark` transition, before closure
    pub fn step_mark(&self, states: &BTreeSet<StateId>, mark: Mark) -> BTreeSet<StateId> {
        states
            .iter()
            .flat_map(|&id| self.states[id].transitions.iter())
            .filter(|t| t.label == Label::Mark(mark))
            .map(|t| t.target)
            .collect()
    }

    /// Grow a closed set of states through the given marks, and the epsilon
    /// edges after them, until nothing changes
    pub fn follow_marks(&self, states: &BTreeSet<StateId>, marks: &[Mark]) -> BTreeSet<StateId> {
        let mut states = states.clone();
        loop {
            let mut grown = states.clone();
            for &mark in marks {
                grown.extend(self.epsilon_closure(&self.step_mark(&states, mark)));
            }
            if grown.len() == states.len() {
                return states;
            }
            states = grown;
        }
    }
}
