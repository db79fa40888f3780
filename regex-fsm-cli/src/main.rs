use anyhow::Context;
use regex_fsm::{automata::determinize, Builder, Encoding, Fsm};

const USAGE: &str = "\
Compile a pattern into a finite-state automaton and print it.

Usage:
    regex-fsm [options] <pattern> [<input> ...]

Every <input> is checked for whole-input acceptance and reported as
accepted or rejected.

Options:
    -e, --encoding <name>   ascii, latin1 or utf-8 (default: utf-8)
    -i, --case-insensitive  match literals and classes case insensitively
    -d, --dfa               print the determinized automaton
    -q, --quiet             don't print the automaton
    -h, --help              show this message

Set RUST_LOG=trace to see the grammar at work.
";

#[derive(Debug)]
struct Args {
    encoding: Encoding,
    case_insensitive: bool,
    dfa: bool,
    quiet: bool,
    pattern: String,
    inputs: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1))? {
        Some(args) => args,
        None => {
            print!("{}", USAGE);
            return Ok(());
        }
    };

    let fsm = Builder::new()
        .encoding(args.encoding)
        .case_insensitive(args.case_insensitive)
        .build(&args.pattern)
        .with_context(|| format!("failed to compile pattern '{}'", args.pattern))?;
    let fsm = if args.dfa { determinize(&fsm) } else { fsm };

    if !args.quiet {
        println!("=== Pattern: '{}' ({}) ===", args.pattern, args.encoding.name());
        print_fsm(&fsm);
    }

    for input in &args.inputs {
        let bytes = match encode(input, args.encoding) {
            Some(bytes) => bytes,
            None => {
                println!("{:?}: not representable in {}", input, args.encoding.name());
                continue;
            }
        };
        let verdict = if fsm.accepts(&bytes) { "accepted" } else { "rejected" };
        println!("{:?}: {}", input, verdict);
    }
    Ok(())
}

/// Returns `None` when help was requested.
fn parse_args(mut argv: impl Iterator<Item = String>) -> anyhow::Result<Option<Args>> {
    let mut encoding = Encoding::default();
    let mut case_insensitive = false;
    let mut dfa = false;
    let mut quiet = false;
    let mut positional = Vec::new();

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "-i" | "--case-insensitive" => case_insensitive = true,
            "-d" | "--dfa" => dfa = true,
            "-q" | "--quiet" => quiet = true,
            "-e" | "--encoding" => {
                let name = argv.next().context("--encoding needs a value")?;
                encoding = name.parse().map_err(anyhow::Error::msg)?;
            }
            "--" => {
                positional.extend(argv.by_ref());
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                anyhow::bail!("unknown option '{}'\n\n{}", flag, USAGE)
            }
            other => positional.push(other.to_string()),
        }
    }

    let mut positional = positional.into_iter();
    let pattern = positional
        .next()
        .with_context(|| format!("missing <pattern>\n\n{}", USAGE))?;
    Ok(Some(Args {
        encoding,
        case_insensitive,
        dfa,
        quiet,
        pattern,
        inputs: positional.collect(),
    }))
}

fn encode(input: &str, encoding: Encoding) -> Option<Vec<u8>> {
    let mut bytes = Vec::with_capacity(input.len());
    for c in input.chars() {
        bytes.extend(encoding.to_local(c)?);
    }
    Some(bytes)
}

fn print_fsm(fsm: &Fsm) {
    println!("Start state: {}", fsm.start());
    println!("Accepting states: {:?}", fsm.accepting_states());
    println!("States:");

    for (id, state) in fsm.states().iter().enumerate() {
        let marker = if fsm.is_accepting_state(id) { " (accepting)" } else { "" };
        println!("  {}{}:", id, marker);
        for &target in &state.epsilons {
            println!("    ε -> {}", target);
        }
        for transition in &state.transitions {
            println!("    {} -> {}", transition.label, transition.target);
        }
    }
}
