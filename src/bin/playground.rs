//! Runs an automaton description over some inputs.
//!
//! ```text
//! playground <description-file> <input>... [--debug] [--not-bol] [--not-eol] [--newline]
//! ```

use std::process::ExitCode;

use tnfa_match::assertion::MatchFlags;
use tnfa_match::matcher::Matcher;
use tnfa_match::parallel::Match;
use tnfa_match::submatch::Captures;
use tnfa_match::tnfa::Tnfa;

fn main() -> ExitCode {
	let mut debug: bool = false;
	let mut flags: MatchFlags = MatchFlags::empty();
	let mut positional: Vec<String> = Vec::new();
	for arg in std::env::args().skip(1) {
		match arg.as_str() {
			"--debug" => debug = true,
			"--not-bol" => flags |= MatchFlags::NOT_BOL,
			"--not-eol" => flags |= MatchFlags::NOT_EOL,
			"--newline" => flags |= MatchFlags::NEWLINE,
			_ => positional.push(arg),
		}
	}

	if debug {
		tracing_subscriber::fmt()
			.with_max_level(tracing::Level::TRACE)
			.with_file(true)
			.with_line_number(true)
			.with_writer(std::io::stderr)
			.init();
	}

	let Some((path, inputs)): Option<(&String, &[String])> = positional.split_first() else {
		eprintln!("usage: playground <description-file> <input>... [--debug] [--not-bol] [--not-eol] [--newline]");
		return ExitCode::FAILURE;
	};

	let description: String = match std::fs::read_to_string(path) {
		Ok(description) => description,
		Err(err) => {
			eprintln!("cannot read {path}: {err}");
			return ExitCode::FAILURE;
		},
	};
	let tnfa: Tnfa = match Tnfa::from_description(&description) {
		Ok(tnfa) => tnfa,
		Err(err) => {
			eprintln!("{path}: {err}");
			return ExitCode::FAILURE;
		},
	};

	let matcher: Matcher<'_> = Matcher::new(&tnfa).flags(flags);
	for input in inputs {
		let found: Match = match matcher.find(input.as_str()) {
			Ok(Some(found)) => found,
			Ok(None) => {
				println!("{input:?}: no match");
				continue;
			},
			Err(err) => {
				eprintln!("{input:?}: {err}");
				return ExitCode::FAILURE;
			},
		};

		match found.start() {
			Some(start) => {
				let text: &str = input.get(start..found.end()).unwrap_or_default();
				print!("{input:?}: {start}..{} {text:?}", found.end());
			},
			None => print!("{input:?}: ..{}", found.end()),
		}
		let captures: Captures = Captures::fill(tnfa.submatches(), &found);
		for (i, span) in captures.iter().enumerate() {
			match span {
				Some(span) => print!(" {i}={}..{}", span.start, span.end),
				None => print!(" {i}=-"),
			}
		}
		println!();
	}

	ExitCode::SUCCESS
}
