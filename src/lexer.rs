//! Tokenizing pattern text into terminals and terms.
//!
//! The grammar only sees the [`TokenSource`] trait. [`Lexer`] is the
//! implementation used by [`crate::compile`] and [`crate::Builder`].

use std::fmt;

use regex_fsm_automata::Fsm;
use regex_syntax::hir::{ClassUnicode, ClassUnicodeRange};

use crate::config::Config;
use crate::encoding::Encoding;
use crate::term::{Limit, Term};

/// Characters with a syntactic meaning outside of classes and strings.
const META_CHARS: [char; 17] = [
    '\\', // escape
    '|',  // alternation
    '&',  // conjunction
    '!',  // negation
    '(', ')', // group brackets
    '[', ']', // class brackets
    '{', '}', // repetition brackets
    '*', // zero or more
    '+', // one or more
    '?', // optional
    '.', // any character
    '^', // start of text
    '$', // end of text
    '"', // quoted string
];

/// The kind of terminal the grammar consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    Letters,
    Dot,
    Begin,
    End,
    Open,
    Close,
    Pipe,
    Amp,
    Bang,
    Count,
    Eof,
}

impl fmt::Display for TerminalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminalKind::Letters => "literal",
            TerminalKind::Dot => "'.'",
            TerminalKind::Begin => "'^'",
            TerminalKind::End => "'$'",
            TerminalKind::Open => "'('",
            TerminalKind::Close => "')'",
            TerminalKind::Pipe => "'|'",
            TerminalKind::Amp => "'&'",
            TerminalKind::Bang => "'!'",
            TerminalKind::Count => "repetition",
            TerminalKind::Eof => "end of pattern",
        };
        f.write_str(name)
    }
}

/// One terminal, its semantic payload if any, and where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TerminalKind,
    pub term: Option<Term>,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TerminalKind, term: Option<Term>, offset: usize) -> Token {
        Token { kind, term, offset }
    }
}

/// Anything the grammar can pull terminals from.
pub trait TokenSource {
    /// Advance the token stream. At the end of input this keeps returning
    /// [`TerminalKind::Eof`].
    fn next_term(&mut self) -> Result<Token, LexError>;

    /// The encoding literals and wildcards are built with.
    fn encoding(&self) -> Encoding;

    /// Called once `fsm` has become one complete atom: a parenthesized
    /// group, or a term with its repetition applied.
    fn on_parenthesized(&mut self, _fsm: &mut Fsm) {}
}

/// An error found while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    offset: usize,
    kind: LexErrorKind,
}

/// What went wrong while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    InvalidEscape(char),
    UnterminatedEscape,
    UnterminatedClass,
    UnterminatedString,
    EmptyClass,
    InvalidClassRange,
    InvalidCount,
    CountOutOfOrder { min: u32, max: u32 },
    RepetitionTooLarge { limit: u32 },
    ClassTooLarge { limit: usize },
    NestLimitExceeded { limit: u32 },
    InvalidCodepoint,
}

impl LexError {
    pub fn new(offset: usize, kind: LexErrorKind) -> LexError {
        LexError { offset, kind }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn kind(&self) -> &LexErrorKind {
        &self.kind
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error at offset {}: ", self.offset)?;
        match &self.kind {
            LexErrorKind::InvalidEscape(c) => write!(f, "invalid escape sequence \\{}", c),
            LexErrorKind::UnterminatedEscape => write!(f, "incomplete escape sequence"),
            LexErrorKind::UnterminatedClass => write!(f, "unclosed character class"),
            LexErrorKind::UnterminatedString => write!(f, "unclosed quoted string"),
            LexErrorKind::EmptyClass => write!(f, "empty character class"),
            LexErrorKind::InvalidClassRange => write!(f, "invalid character class range"),
            LexErrorKind::InvalidCount => write!(f, "invalid repetition count"),
            LexErrorKind::CountOutOfOrder { min, max } => {
                write!(f, "repetition count out of order: {} > {}", min, max)
            }
            LexErrorKind::RepetitionTooLarge { limit } => {
                write!(f, "repetition count exceeds the limit of {}", limit)
            }
            LexErrorKind::ClassTooLarge { limit } => {
                write!(f, "character class expands to more than {} codepoints", limit)
            }
            LexErrorKind::NestLimitExceeded { limit } => {
                write!(f, "parentheses nested deeper than {}", limit)
            }
            LexErrorKind::InvalidCodepoint => write!(f, "invalid codepoint in escape sequence"),
        }
    }
}

impl std::error::Error for LexError {}

/// A decoded backslash escape.
enum Escape {
    Char(char),
    Class { class: ClassUnicode, negated: bool },
}

/// Tokenizer for pattern text.
pub struct Lexer<'p> {
    pattern: &'p str,
    pos: usize,
    config: Config,
    depth: u32,
    atoms: usize,
}

impl<'p> Lexer<'p> {
    pub fn new(pattern: &'p str, config: Config) -> Lexer<'p> {
        Lexer {
            pattern,
            pos: 0,
            config,
            depth: 0,
            atoms: 0,
        }
    }

    /// Current parenthesis nesting depth
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// How many atoms the grammar has reported complete so far
    pub fn completed_atoms(&self) -> usize {
        self.atoms
    }

    fn peek(&self) -> Option<char> {
        self.pattern[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.pattern[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn letters(&self, term: Term, offset: usize) -> Token {
        Token::new(TerminalKind::Letters, Some(term), offset)
    }

    fn count(&self, min: u32, max: Limit, offset: usize) -> Token {
        Token::new(TerminalKind::Count, Some(Term::count(min, max)), offset)
    }

    /// A literal character, widened to its case folds when requested
    fn letter(&self, c: char) -> Term {
        if !self.config.case_insensitive {
            return Term::chars([c]);
        }
        let mut class = ClassUnicode::new([ClassUnicodeRange::new(c, c)]);
        class.case_fold_simple();
        Term::chars(class.iter().flat_map(|r| r.start()..=r.end()))
    }

    /// Every character the active encoding can represent
    fn repertoire(&self) -> ClassUnicode {
        ClassUnicode::new([ClassUnicodeRange::new('\0', self.config.encoding.max_char())])
    }

    fn class_term(&self, class: &ClassUnicode, negated: bool, offset: usize) -> Result<Term, LexError> {
        let size: usize = class
            .iter()
            .map(|r| (r.end() as u32 - r.start() as u32) as usize + 1)
            .sum();
        if size > self.config.class_limit {
            return Err(LexError::new(
                offset,
                LexErrorKind::ClassTooLarge {
                    limit: self.config.class_limit,
                },
            ));
        }

        Ok(Term::CharacterRange {
            alternatives: class
                .iter()
                .flat_map(|r| r.start()..=r.end())
                .map(|c| vec![c])
                .collect(),
            negated,
        })
    }

    fn lex_escape(&mut self, offset: usize) -> Result<Escape, LexError> {
        let c = self
            .bump()
            .ok_or_else(|| LexError::new(offset, LexErrorKind::UnterminatedEscape))?;

        let escape = match c {
            'n' => Escape::Char('\n'),
            't' => Escape::Char('\t'),
            'r' => Escape::Char('\r'),
            'f' => Escape::Char('\x0C'),
            'v' => Escape::Char('\x0B'),
            '0' => Escape::Char('\0'),
            'x' => Escape::Char(self.lex_hex(offset)?),
            'u' => Escape::Char(self.lex_unicode(offset)?),
            'd' | 'w' | 's' | 'D' | 'W' | 'S' => Escape::Class {
                class: perl_class(c.to_ascii_lowercase()),
                negated: c.is_ascii_uppercase(),
            },
            c if META_CHARS.contains(&c) || c.is_ascii_punctuation() || c == ' ' => {
                Escape::Char(c)
            }
            c => return Err(LexError::new(offset, LexErrorKind::InvalidEscape(c))),
        };
        Ok(escape)
    }

    /// `\xHH`
    fn lex_hex(&mut self, offset: usize) -> Result<char, LexError> {
        let mut value = 0;
        for _ in 0..2 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| LexError::new(offset, LexErrorKind::InvalidCodepoint))?;
            value = value * 16 + digit;
        }
        char::from_u32(value).ok_or_else(|| LexError::new(offset, LexErrorKind::InvalidCodepoint))
    }

    /// `\u{H...}`
    fn lex_unicode(&mut self, offset: usize) -> Result<char, LexError> {
        let invalid = || LexError::new(offset, LexErrorKind::InvalidCodepoint);
        if !self.eat('{') {
            return Err(invalid());
        }
        let mut value: u32 = 0;
        let mut digits = 0;
        loop {
            match self.bump() {
                Some('}') if digits > 0 => break,
                Some(c) => {
                    let digit = c.to_digit(16).ok_or_else(invalid)?;
                    value = value
                        .checked_mul(16)
                        .and_then(|v| v.checked_add(digit))
                        .ok_or_else(invalid)?;
                    digits += 1;
                }
                None => return Err(invalid()),
            }
        }
        char::from_u32(value).ok_or_else(invalid)
    }

    /// Everything after `[` up to and including the closing `]`
    fn lex_class(&mut self, offset: usize) -> Result<Term, LexError> {
        let unclosed = || LexError::new(offset, LexErrorKind::UnterminatedClass);
        let negated = self.eat('^');
        let mut class = ClassUnicode::empty();

        loop {
            let item = self.pos;
            let start = match self.bump().ok_or_else(unclosed)? {
                ']' => break,
                '\\' => match self.lex_escape(item)? {
                    Escape::Char(c) => c,
                    Escape::Class {
                        class: mut perl,
                        negated: complement,
                    } => {
                        if complement {
                            perl.negate();
                            perl.intersect(&self.repertoire());
                        }
                        class.union(&perl);
                        continue;
                    }
                },
                c => c,
            };

            let is_range = self.peek() == Some('-') && !matches!(self.peek_second(), Some(']') | None);
            if !is_range {
                class.push(ClassUnicodeRange::new(start, start));
                continue;
            }

            self.bump();
            let end_offset = self.pos;
            let end = match self.bump().ok_or_else(unclosed)? {
                '\\' => match self.lex_escape(end_offset)? {
                    Escape::Char(c) => c,
                    Escape::Class { .. } => {
                        return Err(LexError::new(item, LexErrorKind::InvalidClassRange))
                    }
                },
                c => c,
            };
            if start > end {
                return Err(LexError::new(item, LexErrorKind::InvalidClassRange));
            }
            class.push(ClassUnicodeRange::new(start, end));
        }

        if class.ranges().is_empty() {
            return Err(LexError::new(offset, LexErrorKind::EmptyClass));
        }
        if self.config.case_insensitive {
            class.case_fold_simple();
        }
        self.class_term(&class, negated, offset)
    }

    /// Everything after `"` up to and including the closing `"`
    fn lex_string(&mut self, offset: usize) -> Result<Term, LexError> {
        let mut text = Vec::new();
        loop {
            let item = self.pos;
            match self.bump() {
                Some('"') => break,
                Some('\\') => match self.lex_escape(item)? {
                    Escape::Char(c) => text.push(c),
                    Escape::Class { .. } => {
                        let c = self.pattern[item + 1..].chars().next().unwrap_or('\\');
                        return Err(LexError::new(item, LexErrorKind::InvalidEscape(c)));
                    }
                },
                Some(c) => text.push(c),
                None => return Err(LexError::new(offset, LexErrorKind::UnterminatedString)),
            }
        }
        Ok(Term::CharacterRange {
            alternatives: [text].into_iter().collect(),
            negated: false,
        })
    }

    /// Everything after `{` up to and including the closing `}`
    fn lex_count(&mut self, offset: usize) -> Result<Token, LexError> {
        let invalid = || LexError::new(offset, LexErrorKind::InvalidCount);

        let min = self.lex_number(offset)?;
        let (min, max) = match self.bump() {
            Some('}') => {
                let n = min.ok_or_else(invalid)?;
                (n, Limit::Finite(n))
            }
            Some(',') => {
                let max = self.lex_number(offset)?;
                if !self.eat('}') || (min.is_none() && max.is_none()) {
                    return Err(invalid());
                }
                (min.unwrap_or(0), max.map_or(Limit::Infinity, Limit::Finite))
            }
            _ => return Err(invalid()),
        };

        let limit = self.config.repetition_limit;
        let largest = match max {
            Limit::Finite(n) => n.max(min),
            Limit::Infinity => min,
        };
        if largest > limit {
            return Err(LexError::new(offset, LexErrorKind::RepetitionTooLarge { limit }));
        }
        if let Limit::Finite(n) = max {
            if min > n {
                return Err(LexError::new(offset, LexErrorKind::CountOutOfOrder { min, max: n }));
            }
        }
        Ok(self.count(min, max, offset))
    }

    fn lex_number(&mut self, offset: usize) -> Result<Option<u32>, LexError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        self.pattern[start..self.pos]
            .parse()
            .map(Some)
            .map_err(|_| LexError::new(offset, LexErrorKind::InvalidCount))
    }
}

impl TokenSource for Lexer<'_> {
    fn next_term(&mut self) -> Result<Token, LexError> {
        let offset = self.pos;
        let c = match self.bump() {
            Some(c) => c,
            None => return Ok(Token::new(TerminalKind::Eof, None, offset)),
        };

        let token = match c {
            '|' => Token::new(TerminalKind::Pipe, None, offset),
            '&' => Token::new(TerminalKind::Amp, None, offset),
            '!' => Token::new(TerminalKind::Bang, None, offset),
            '(' => {
                self.depth += 1;
                if self.depth > self.config.nest_limit {
                    let limit = self.config.nest_limit;
                    return Err(LexError::new(offset, LexErrorKind::NestLimitExceeded { limit }));
                }
                Token::new(TerminalKind::Open, None, offset)
            }
            ')' => {
                self.depth = self.depth.saturating_sub(1);
                Token::new(TerminalKind::Close, None, offset)
            }
            '.' => Token::new(TerminalKind::Dot, Some(Term::Dot), offset),
            '^' => Token::new(TerminalKind::Begin, Some(Term::Begin), offset),
            '$' => Token::new(TerminalKind::End, Some(Term::End), offset),
            '*' => self.count(0, Limit::Infinity, offset),
            '+' => self.count(1, Limit::Infinity, offset),
            '?' => self.count(0, Limit::Finite(1), offset),
            '{' => self.lex_count(offset)?,
            '[' => {
                let term = self.lex_class(offset)?;
                self.letters(term, offset)
            }
            '"' => {
                let term = self.lex_string(offset)?;
                self.letters(term, offset)
            }
            '\\' => {
                let term = match self.lex_escape(offset)? {
                    Escape::Char(c) => self.letter(c),
                    Escape::Class { mut class, negated } => {
                        if self.config.case_insensitive {
                            class.case_fold_simple();
                        }
                        self.class_term(&class, negated, offset)?
                    }
                };
                self.letters(term, offset)
            }
            c => self.letters(self.letter(c), offset),
        };
        Ok(token)
    }

    fn encoding(&self) -> Encoding {
        self.config.encoding
    }

    fn on_parenthesized(&mut self, fsm: &mut Fsm) {
        self.atoms += 1;
        #[cfg(not(feature = "logging"))]
        let _ = fsm;
        trace!(
            "atom {} complete at depth {} with {} states",
            self.atoms,
            self.depth,
            fsm.state_count()
        );
    }
}

/// ASCII `\d`, `\w` and `\s`
fn perl_class(c: char) -> ClassUnicode {
    let ranges: &[(char, char)] = match c {
        'd' => &[('0', '9')],
        'w' => &[('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')],
        _ => &[('\t', '\r'), (' ', ' ')],
    };
    ClassUnicode::new(ranges.iter().map(|&(a, b)| ClassUnicodeRange::new(a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(pattern: &str) -> Result<Vec<Token>, LexError> {
        lex_with(pattern, Config::default())
    }

    fn lex_with(pattern: &str, config: Config) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(pattern, config);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_term()?;
            if token.kind == TerminalKind::Eof {
                return Ok(tokens);
            }
            tokens.push(token);
        }
    }

    fn kinds(pattern: &str) -> Vec<TerminalKind> {
        lex(pattern).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn single(pattern: &str) -> Term {
        let mut tokens = lex(pattern).unwrap();
        assert_eq!(tokens.len(), 1, "{:?}", tokens);
        tokens.remove(0).term.unwrap()
    }

    fn error(pattern: &str) -> LexErrorKind {
        lex(pattern).unwrap_err().kind().clone()
    }

    #[test]
    fn structural_terminals() {
        use TerminalKind::*;
        assert_eq!(
            kinds("(a|b)&!.^$"),
            vec![Open, Letters, Pipe, Letters, Close, Amp, Bang, Dot, Begin, End]
        );
    }

    #[test]
    fn one_token_per_letter() {
        let tokens = lex("ab").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].term, Some(Term::chars(['a'])));
        assert_eq!(tokens[1].offset, 1);
    }

    #[test]
    fn counts() {
        assert_eq!(single("*"), Term::count(0, Limit::Infinity));
        assert_eq!(single("+"), Term::count(1, Limit::Infinity));
        assert_eq!(single("?"), Term::count(0, Limit::Finite(1)));
        assert_eq!(single("{3}"), Term::count(3, Limit::Finite(3)));
        assert_eq!(single("{2,}"), Term::count(2, Limit::Infinity));
        assert_eq!(single("{,4}"), Term::count(0, Limit::Finite(4)));
        assert_eq!(single("{2,5}"), Term::count(2, Limit::Finite(5)));
    }

    #[test]
    fn count_errors() {
        assert_eq!(error("a{}"), LexErrorKind::InvalidCount);
        assert_eq!(error("a{,}"), LexErrorKind::InvalidCount);
        assert_eq!(error("a{2"), LexErrorKind::InvalidCount);
        assert_eq!(error("a{x}"), LexErrorKind::InvalidCount);
        assert_eq!(
            error("a{5,2}"),
            LexErrorKind::CountOutOfOrder { min: 5, max: 2 }
        );
        assert_eq!(
            error("a{1001}"),
            LexErrorKind::RepetitionTooLarge { limit: 1000 }
        );
        assert_eq!(error("a{99999999999}"), LexErrorKind::InvalidCount);
    }

    #[test]
    fn classes() {
        assert_eq!(single("[a-c]"), Term::chars(['a', 'b', 'c']));
        assert_eq!(single("[a-]"), Term::chars(['-', 'a']));
        assert_eq!(single(r"[\d_]"), Term::chars("0123456789_".chars()));
        assert_eq!(
            single("[^xy]"),
            Term::CharacterRange {
                alternatives: [vec!['x'], vec!['y']].into_iter().collect(),
                negated: true,
            }
        );
    }

    #[test]
    fn negated_shorthand_inside_class_uses_encoding() {
        let mut config = Config::default();
        config.encoding = Encoding::Ascii;
        let tokens = lex_with(r"[\D]", config).unwrap();
        match &tokens[0].term {
            Some(Term::CharacterRange {
                alternatives,
                negated: false,
            }) => {
                assert_eq!(alternatives.len(), 128 - 10);
                assert!(!alternatives.contains(&vec!['5']));
            }
            other => panic!("unexpected term {:?}", other),
        }
    }

    #[test]
    fn class_errors() {
        assert_eq!(error("[abc"), LexErrorKind::UnterminatedClass);
        assert_eq!(error("[]"), LexErrorKind::EmptyClass);
        assert_eq!(error("[z-a]"), LexErrorKind::InvalidClassRange);
        assert_eq!(error(r"[a-\d]"), LexErrorKind::InvalidClassRange);
        assert_eq!(
            error("[\u{0}-\u{FFFF}]"),
            LexErrorKind::ClassTooLarge { limit: 10_000 }
        );
    }

    #[test]
    fn escapes() {
        assert_eq!(single(r"\n"), Term::chars(['\n']));
        assert_eq!(single(r"\."), Term::chars(['.']));
        assert_eq!(single(r"\x41"), Term::chars(['A']));
        assert_eq!(single(r"\u{263A}"), Term::chars(['☺']));
        assert_eq!(
            single(r"\S"),
            Term::CharacterRange {
                alternatives: "\t\n\x0B\x0C\r ".chars().map(|c| vec![c]).collect(),
                negated: true,
            }
        );
        assert_eq!(error(r"\q"), LexErrorKind::InvalidEscape('q'));
        assert_eq!(error("\\"), LexErrorKind::UnterminatedEscape);
        assert_eq!(error(r"\u{110000}"), LexErrorKind::InvalidCodepoint);
        assert_eq!(error(r"\xZ1"), LexErrorKind::InvalidCodepoint);
    }

    #[test]
    fn quoted_strings() {
        assert_eq!(single(r#""a|b""#), Term::literal("a|b"));
        assert_eq!(single(r#""a\"b""#), Term::literal("a\"b"));
        assert_eq!(single(r#""""#), Term::literal(""));
        assert_eq!(error(r#""abc"#), LexErrorKind::UnterminatedString);
        assert_eq!(error(r#""\d""#), LexErrorKind::InvalidEscape('d'));
    }

    #[test]
    fn case_insensitive_letters() {
        let mut config = Config::default();
        config.case_insensitive = true;
        let tokens = lex_with("k[a-b]", config).unwrap();
        // U+212A KELVIN SIGN folds to 'k' too.
        assert_eq!(tokens[0].term, Some(Term::chars(['K', 'k', '\u{212A}'])));
        assert_eq!(tokens[1].term, Some(Term::chars(['A', 'B', 'a', 'b'])));
    }

    #[test]
    fn nesting_depth() {
        let mut config = Config::default();
        config.nest_limit = 2;
        let mut lexer = Lexer::new("((", config);
        lexer.next_term().unwrap();
        lexer.next_term().unwrap();
        assert_eq!(lexer.depth(), 2);

        let err = lex_with("(((", config).unwrap_err();
        assert_eq!(err.kind(), &LexErrorKind::NestLimitExceeded { limit: 2 });
        assert_eq!(err.offset(), 2);
    }

    #[test]
    fn eof_is_sticky() {
        let mut lexer = Lexer::new("", Config::default());
        assert_eq!(lexer.next_term().unwrap().kind, TerminalKind::Eof);
        assert_eq!(lexer.next_term().unwrap().kind, TerminalKind::Eof);
    }

    #[test]
    fn error_display() {
        let err = lex("ab[").unwrap_err();
        assert_eq!(err.to_string(), "error at offset 2: unclosed character class");
    }
}
