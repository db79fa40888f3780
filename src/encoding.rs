use regex_fsm_automata::Fsm;
use regex_syntax::utf8::Utf8Sequences;

/// How codepoints map onto the byte alphabet of the automaton.
///
/// Encodings may be partial: ASCII and Latin-1 cannot represent most
/// codepoints, and [`Encoding::to_local`] reports that with `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// 7-bit ASCII, one byte per character.
    Ascii,
    /// ISO 8859-1, one byte per character.
    Latin1,
    /// UTF-8, one to four bytes per character.
    #[default]
    Utf8,
}

impl Encoding {
    /// Encode one codepoint, or `None` if this encoding cannot represent it.
    pub fn to_local(self, c: char) -> Option<Vec<u8>> {
        match self {
            Encoding::Ascii if c.is_ascii() => Some(vec![c as u8]),
            Encoding::Latin1 if (c as u32) <= 0xFF => Some(vec![c as u32 as u8]),
            Encoding::Utf8 => {
                let mut buf = [0; 4];
                Some(c.encode_utf8(&mut buf).as_bytes().to_vec())
            }
            _ => None,
        }
    }

    /// Concatenate "any single character" onto `fsm`.
    pub fn append_wildcard(self, fsm: &mut Fsm) {
        fsm.append_sequences(&self.wildcard_sequences());
    }

    /// The highest codepoint this encoding can represent.
    pub fn max_char(self) -> char {
        match self {
            Encoding::Ascii => '\x7F',
            Encoding::Latin1 => '\u{FF}',
            Encoding::Utf8 => char::MAX,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::Ascii => "ascii",
            Encoding::Latin1 => "latin1",
            Encoding::Utf8 => "utf-8",
        }
    }

    fn wildcard_sequences(self) -> Vec<Vec<(u8, u8)>> {
        match self {
            Encoding::Ascii => vec![vec![(0x00, 0x7F)]],
            Encoding::Latin1 => vec![vec![(0x00, 0xFF)]],
            Encoding::Utf8 => Utf8Sequences::new('\0', char::MAX)
                .map(|seq| seq.as_slice().iter().map(|r| (r.start, r.end)).collect())
                .collect(),
        }
    }
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(Encoding::Ascii),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Encoding::Latin1),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            _ => Err(format!("unknown encoding: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_local() {
        assert_eq!(Encoding::Ascii.to_local('a'), Some(vec![b'a']));
        assert_eq!(Encoding::Ascii.to_local('é'), None);
        assert_eq!(Encoding::Latin1.to_local('é'), Some(vec![0xE9]));
        assert_eq!(Encoding::Latin1.to_local('☃'), None);
        assert_eq!(Encoding::Utf8.to_local('é'), Some(vec![0xC3, 0xA9]));
    }

    #[test]
    fn test_wildcard() {
        let mut ascii = Fsm::empty();
        Encoding::Ascii.append_wildcard(&mut ascii);
        assert!(ascii.accepts(b"z"));
        assert!(!ascii.accepts(&[0xE9]));
        assert!(!ascii.accepts(b""));

        let mut latin1 = Fsm::empty();
        Encoding::Latin1.append_wildcard(&mut latin1);
        assert!(latin1.accepts(&[0xE9]));

        let mut utf8 = Fsm::empty();
        Encoding::Utf8.append_wildcard(&mut utf8);
        assert!(utf8.accepts("☃".as_bytes()));
        assert!(utf8.accepts("𝄞".as_bytes()));
        assert!(!utf8.accepts(&[0xE9]));
        assert!(!utf8.accepts("ab".as_bytes()));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("UTF-8".parse::<Encoding>(), Ok(Encoding::Utf8));
        assert_eq!("latin1".parse::<Encoding>(), Ok(Encoding::Latin1));
        assert!("ebcdic".parse::<Encoding>().is_err());
    }
}
