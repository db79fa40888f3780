use std::error::Error as _;

use regex_fsm::{compile, Builder, Encoding, Error, LexErrorKind, TerminalKind};

fn syntax(pattern: &str) -> (usize, TerminalKind) {
    match compile(pattern) {
        Err(Error::Syntax { offset, found }) => (offset, found),
        other => panic!("expected a syntax error for {:?}, got {:?}", pattern, other),
    }
}

fn lexical(pattern: &str) -> (usize, LexErrorKind) {
    match compile(pattern) {
        Err(Error::Lexical(err)) => (err.offset(), err.kind().clone()),
        other => panic!("expected a lexical error for {:?}, got {:?}", pattern, other),
    }
}

#[test]
fn syntax_errors_report_the_offending_terminal() {
    assert_eq!(syntax("*a"), (0, TerminalKind::Count));
    assert_eq!(syntax("a)"), (1, TerminalKind::Close));
    assert_eq!(syntax("a**"), (2, TerminalKind::Count));
    assert_eq!(syntax("(a"), (2, TerminalKind::Eof));
    assert_eq!(syntax("a|)"), (2, TerminalKind::Close));
    assert_eq!(syntax("a!b"), (1, TerminalKind::Bang));
    assert_eq!(syntax("!!a"), (1, TerminalKind::Bang));
}

#[test]
fn lexical_errors_are_reported_once() {
    // The group is never closed, but the bad count stops the parse first.
    assert_eq!(
        lexical("(a{5,2}"),
        (2, LexErrorKind::CountOutOfOrder { min: 5, max: 2 })
    );
    assert_eq!(lexical("ab["), (2, LexErrorKind::UnterminatedClass));
    assert_eq!(lexical(r"a\q"), (1, LexErrorKind::InvalidEscape('q')));
    assert_eq!(lexical(r#"x"abc"#), (1, LexErrorKind::UnterminatedString));
}

#[test]
fn configured_limits() {
    let err = Builder::new().nest_limit(3).build("((((a))))").unwrap_err();
    assert!(matches!(
        err,
        Error::Lexical(ref e) if *e.kind() == LexErrorKind::NestLimitExceeded { limit: 3 }
    ));
    assert_eq!(err.offset(), Some(3));

    let err = Builder::new().repetition_limit(10).build("a{11}").unwrap_err();
    assert!(matches!(
        err,
        Error::Lexical(ref e) if *e.kind() == LexErrorKind::RepetitionTooLarge { limit: 10 }
    ));

    let err = Builder::new().class_limit(5).build("[a-z]").unwrap_err();
    assert!(matches!(
        err,
        Error::Lexical(ref e) if *e.kind() == LexErrorKind::ClassTooLarge { limit: 5 }
    ));
}

#[test]
fn negated_shorthand_in_utf8_class_is_too_large() {
    let (_, kind) = lexical(r"[\D]");
    assert_eq!(kind, LexErrorKind::ClassTooLarge { limit: 10_000 });
}

#[test]
fn nested_counts_hit_the_size_limit() {
    // Each count passes the repetition limit; together they would need
    // billions of states.
    let err = compile("((a{1000}){1000}){1000}").unwrap_err();
    assert_eq!(err, Error::SizeLimitExceeded { limit: 1_000_000 });
    assert_eq!(err.offset(), None);

    let err = Builder::new().size_limit(50).build("(abc){20}").unwrap_err();
    assert_eq!(err, Error::SizeLimitExceeded { limit: 50 });
    assert!(Builder::new().size_limit(50).build("(abc){2}").is_ok());
}

#[test]
fn determinization_respects_the_size_limit() {
    // Remembering the ninth byte from the end takes 2^9 deterministic states.
    let pattern = "!((a|b)*a(a|b){8})";
    let err = Builder::new().size_limit(200).build(pattern).unwrap_err();
    assert_eq!(err, Error::SizeLimitExceeded { limit: 200 });
    assert_eq!(
        err.to_string(),
        "compiled automaton would exceed the limit of 200 states"
    );

    let err = Builder::new()
        .encoding(Encoding::Ascii)
        .size_limit(200)
        .build(".*a.{8}&.*b.{8}")
        .unwrap_err();
    assert_eq!(err, Error::SizeLimitExceeded { limit: 200 });

    let fsm = compile(pattern).unwrap();
    assert!(!fsm.accepts(b"abbbbbbbb"));
    assert!(fsm.accepts(b"bbbbbbbbb"));
}

#[test]
fn display_and_source() -> anyhow::Result<()> {
    let err = compile("a)").unwrap_err();
    assert_eq!(err.to_string(), "syntax error at offset 1: unexpected ')'");
    assert!(err.source().is_none());

    let err = compile("a{2").unwrap_err();
    assert_eq!(err.to_string(), "error at offset 1: invalid repetition count");
    assert!(err.source().is_some());

    // Errors convert into anyhow like any other std error.
    let fsm = compile("ok").map_err(anyhow::Error::from)?;
    assert!(fsm.accepts(b"ok"));
    Ok(())
}
