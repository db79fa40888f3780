use regex_fsm_automata::Fsm;

use crate::encoding::Encoding;
use crate::error::Error;
use crate::lexer::Lexer;

/// Options that control how a pattern is lexed and compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub(crate) encoding: Encoding,
    pub(crate) case_insensitive: bool,
    pub(crate) nest_limit: u32,
    pub(crate) class_limit: usize,
    pub(crate) repetition_limit: u32,
    pub(crate) size_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            encoding: Encoding::Utf8,
            case_insensitive: false,
            nest_limit: 250,
            class_limit: 10_000,
            repetition_limit: 1_000,
            size_limit: 1_000_000,
        }
    }
}

impl Config {
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn nest_limit(&self) -> u32 {
        self.nest_limit
    }

    pub fn class_limit(&self) -> usize {
        self.class_limit
    }

    pub fn repetition_limit(&self) -> u32 {
        self.repetition_limit
    }

    pub fn size_limit(&self) -> usize {
        self.size_limit
    }
}

/// A builder for compiling patterns with non-default options.
///
/// ```
/// use regex_fsm::{Builder, Encoding};
///
/// let fsm = Builder::new()
///     .encoding(Encoding::Ascii)
///     .case_insensitive(true)
///     .build("abc")
///     .unwrap();
/// assert!(fsm.accepts(b"aBc"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Compile `pattern` with the current options.
    pub fn build(&self, pattern: &str) -> Result<Fsm, Error> {
        let mut lexer = Lexer::new(pattern, self.config);
        crate::parse_within(&mut lexer, self.config.size_limit)
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Set the encoding used for literals and the wildcard.
    ///
    /// Defaults to UTF-8.
    pub fn encoding(&mut self, encoding: Encoding) -> &mut Builder {
        self.config.encoding = encoding;
        self
    }

    /// When enabled, literal characters and classes also match their simple
    /// case folds. Quoted strings are always matched exactly.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut Builder {
        self.config.case_insensitive = yes;
        self
    }

    /// Maximum parenthesis depth.
    pub fn nest_limit(&mut self, limit: u32) -> &mut Builder {
        self.config.nest_limit = limit;
        self
    }

    /// Maximum number of codepoints a single class may expand to.
    pub fn class_limit(&mut self, limit: usize) -> &mut Builder {
        self.config.class_limit = limit;
        self
    }

    /// Maximum bound accepted in a `{m,n}` repetition.
    pub fn repetition_limit(&mut self, limit: u32) -> &mut Builder {
        self.config.repetition_limit = limit;
        self
    }

    /// Maximum number of states any automaton built for the pattern may
    /// have, including the deterministic ones behind `!` and `&`.
    ///
    /// Nested counts multiply, so `((a{1000}){1000}){1000}` passes the
    /// repetition limit but not the default size limit.
    pub fn size_limit(&mut self, limit: usize) -> &mut Builder {
        self.config.size_limit = limit;
        self
    }
}
