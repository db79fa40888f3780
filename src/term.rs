use std::collections::BTreeSet;
use std::fmt;

/// The upper bound of a repetition count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Finite(u32),
    Infinity,
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Finite(n) => write!(f, "{}", n),
            Limit::Infinity => write!(f, "inf"),
        }
    }
}

/// The semantic payload of a single lexical unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A character class, spelled out as the literal codepoint sequences it
    /// matches. Most alternatives are a single codepoint; quoted strings and
    /// multi-codepoint equivalences are longer.
    ///
    /// When `negated` is set the class matches any single character that is
    /// *not* one of the alternatives.
    CharacterRange {
        alternatives: BTreeSet<Vec<char>>,
        negated: bool,
    },
    /// Any single character of the active encoding.
    Dot,
    /// Zero-width start-of-text anchor.
    Begin,
    /// Zero-width end-of-text anchor.
    End,
    /// A postfix repetition bound. `min <= max` is the producer's job.
    RepetitionCount { min: u32, max: Limit },
}

impl Term {
    /// A class matching exactly the given characters
    pub fn chars(chars: impl IntoIterator<Item = char>) -> Term {
        Term::CharacterRange {
            alternatives: chars.into_iter().map(|c| vec![c]).collect(),
            negated: false,
        }
    }

    /// A class matching exactly one literal string
    pub fn literal(text: &str) -> Term {
        Term::CharacterRange {
            alternatives: BTreeSet::from([text.chars().collect()]),
            negated: false,
        }
    }

    pub fn count(min: u32, max: Limit) -> Term {
        Term::RepetitionCount { min, max }
    }
}
