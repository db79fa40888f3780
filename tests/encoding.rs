use regex_fsm::{Builder, Encoding, Fsm};

fn build(encoding: Encoding, pattern: &str) -> Fsm {
    Builder::new().encoding(encoding).build(pattern).unwrap()
}

#[test]
fn unrepresentable_literal_accepts_nothing() {
    let fsm = build(Encoding::Ascii, "é");
    assert!(!fsm.accepts(b""));
    assert!(!fsm.accepts(&[0xE9]));
    assert!(!fsm.accepts("é".as_bytes()));

    // It only poisons its own branch.
    let fsm = build(Encoding::Ascii, "é|a");
    assert!(fsm.accepts(b"a"));
}

#[test]
fn unrepresentable_class_members_are_dropped() {
    let fsm = build(Encoding::Ascii, "[éa]");
    assert!(fsm.accepts(b"a"));
    assert!(!fsm.accepts(&[0xE9]));
}

#[test]
fn latin1_is_one_byte_per_character() {
    let fsm = build(Encoding::Latin1, "é.");
    assert!(fsm.accepts(&[0xE9, 0xFF]));
    assert!(!fsm.accepts("é".as_bytes()));

    let fsm = build(Encoding::Latin1, r"\u{2603}");
    assert!(!fsm.accepts(b""));
}

#[test]
fn utf8_literals_and_wildcard() {
    let fsm = build(Encoding::Utf8, "é.");
    assert!(fsm.accepts("é☃".as_bytes()));
    assert!(fsm.accepts("éa".as_bytes()));
    assert!(!fsm.accepts(&[0xE9, b'a']));
    assert!(!fsm.accepts("é☃☃".as_bytes()));
}

#[test]
fn ascii_wildcard_excludes_high_bytes() {
    let fsm = build(Encoding::Ascii, ".");
    assert!(fsm.accepts(b"\x7F"));
    assert!(!fsm.accepts(&[0x80]));
}

#[test]
fn case_folding_in_latin1() {
    let fsm = Builder::new()
        .encoding(Encoding::Latin1)
        .case_insensitive(true)
        .build("é")
        .unwrap();
    assert!(fsm.accepts(&[0xE9]));
    assert!(fsm.accepts(&[0xC9]));
}
