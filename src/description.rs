//! A line-oriented text format for automata.
//!
//! ```text
//! # `(a)|(b)`
//! states 3
//! final 2
//! tags min min min min min
//! group 0 end
//! group 1 2 parents 0
//! group 3 4 parents 0
//! init -> 0 tags(0 1)
//! init -> 1 tags(0 3)
//! 0 -> 2 'a' tags(2)
//! 1 -> 2 'b' tags(4)
//! ```
//!
//! A consuming transition reads `'c'`, a range `'a'-'z'`, `any`, or `not` followed by the characters and
//! ranges it must not read. Transitions may carry `tags(...)`, the assertions `bol eol bow eow wb nwb`,
//! `class(name)` and `!class(name)`.

use std::str::Chars;

use nom::Err as NomErr;
use nom::IResult;
use nom::Parser;
use nom::error::ErrorKind as NomErrorKind;
use nom::error::ParseError;

use crate::assertion::Assertions;
use crate::assertion::CharClass;
use crate::interval_tree::Interval;
use crate::submatch::Endpoint;
use crate::submatch::Submatch;
use crate::tags::TagDirection;
use crate::tnfa::StateIdx;
use crate::tnfa::TagIdx;
use crate::tnfa::Tnfa;
use crate::tnfa::TnfaBuilder;
use crate::tnfa::TnfaError;
use crate::tnfa::Transition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionError<'a> {
	/// 1-based; 0 when the automaton as a whole is invalid.
	pub line: usize,
	/// The rest of the offending line, starting where parsing stopped.
	pub remaining: &'a str,
	pub kind: DescriptionErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionErrorKind {
	ExpectedChar(char),
	ExpectedNumber,
	NumberTooBig,
	ExpectedArrow,
	ExpectedSpace,
	ExpectedSymbol,
	ExpectedDirection,
	ExpectedEndpoint,
	UnknownDirective,
	UnknownAttribute,
	UnknownClass,
	InvalidEscape,
	MissingClose(char, char),
	TrailingInput,
	DuplicateStates,
	ClassOnInitial,
	Automaton(TnfaError),
	Nom(NomErrorKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive {
	States(usize),
	Final(usize),
	Tags(Vec<TagDirection>),
	Minimal {
		end: usize,
		start: usize,
	},
	Group {
		start: Endpoint,
		end: Endpoint,
		parents: Vec<usize>,
	},
	CaseInsensitive,
	Initial {
		target: usize,
		attributes: Vec<Attribute>,
	},
	Transition {
		from: usize,
		target: usize,
		symbol: Symbol,
		attributes: Vec<Attribute>,
	},
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Symbol {
	Range(char, char),
	Any,
	Not(Vec<(char, char)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Attribute {
	Tags(Vec<usize>),
	Assert(Assertions),
	Class(CharClass),
	NotClass(CharClass),
}

#[derive(Debug)]
struct DescriptionParsingError<'a> {
	pub input: &'a str,
	pub kind: DescriptionErrorKind,
}

impl<'a> ParseError<&'a str> for DescriptionParsingError<'a> {
	fn from_error_kind(input: &'a str, nom: NomErrorKind) -> Self {
		Self {
			input,
			kind: DescriptionErrorKind::Nom(nom),
		}
	}

	fn append(_: &'a str, _: NomErrorKind, other: Self) -> Self {
		other
	}
}

impl<'a> DescriptionParsingError<'a> {
	fn new(input: &'a str, kind: DescriptionErrorKind) -> Self {
		Self { input, kind }
	}
}

type ParsingResult<'a, T> = IResult<&'a str, T, DescriptionParsingError<'a>>;

impl std::fmt::Display for DescriptionErrorKind {
	fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::ExpectedChar(ch) => write!(fmt, "expected {ch:?}"),
			Self::ExpectedNumber => write!(fmt, "expected a number"),
			Self::NumberTooBig => write!(fmt, "number too big"),
			Self::ExpectedArrow => write!(fmt, "expected `->`"),
			Self::ExpectedSpace => write!(fmt, "expected a space"),
			Self::ExpectedSymbol => write!(fmt, "expected a quoted character, `any` or `not`"),
			Self::ExpectedDirection => write!(fmt, "expected `min` or `max`"),
			Self::ExpectedEndpoint => write!(fmt, "expected a tag index or `end`"),
			Self::UnknownDirective => write!(fmt, "unknown directive"),
			Self::UnknownAttribute => write!(fmt, "unknown transition attribute"),
			Self::UnknownClass => write!(fmt, "unknown character class"),
			Self::InvalidEscape => write!(fmt, "invalid escape sequence"),
			Self::MissingClose(open, close) => write!(fmt, "{open:?} is never closed by {close:?}"),
			Self::TrailingInput => write!(fmt, "unexpected input at the end of the line"),
			Self::DuplicateStates => write!(fmt, "the number of states is already declared"),
			Self::ClassOnInitial => write!(fmt, "initial transitions read no character to classify"),
			Self::Automaton(err) => write!(fmt, "{err}"),
			Self::Nom(kind) => write!(fmt, "parse error ({})", kind.description()),
		}
	}
}

impl std::fmt::Display for DescriptionError<'_> {
	fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.line == 0 {
			write!(fmt, "{}", self.kind)
		} else if self.remaining.is_empty() {
			write!(fmt, "line {}: {}", self.line, self.kind)
		} else {
			write!(fmt, "line {}: {} at {:?}", self.line, self.kind, self.remaining)
		}
	}
}

impl std::error::Error for DescriptionError<'_> {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match &self.kind {
			DescriptionErrorKind::Automaton(err) => Some(err),
			_ => None,
		}
	}
}

impl Tnfa {
	pub fn from_description(description: &str) -> Result<Self, DescriptionError<'_>> {
		let mut builder: TnfaBuilder = TnfaBuilder::new();
		let mut states_declared: bool = false;

		for (i, line) in description.lines().enumerate() {
			let directive: Directive = match parse_line(line) {
				Ok((_, Some(directive))) => directive,
				Ok((_, None)) => continue,
				Err(NomErr::Incomplete(_)) => {
					return Err(DescriptionError {
						line: i + 1,
						remaining: "",
						kind: DescriptionErrorKind::TrailingInput,
					});
				},
				Err(NomErr::Error(err) | NomErr::Failure(err)) => {
					return Err(DescriptionError {
						line: i + 1,
						remaining: err.input,
						kind: err.kind,
					});
				},
			};

			if let Directive::States(_) = directive {
				if states_declared {
					return Err(DescriptionError {
						line: i + 1,
						remaining: line.trim_start(),
						kind: DescriptionErrorKind::DuplicateStates,
					});
				}
				states_declared = true;
			}
			apply(&mut builder, directive).map_err(|kind| DescriptionError {
				line: i + 1,
				remaining: line.trim_start(),
				kind,
			})?;
		}

		builder.build().map_err(|err| DescriptionError {
			line: 0,
			remaining: "",
			kind: DescriptionErrorKind::Automaton(err),
		})
	}
}

fn apply(builder: &mut TnfaBuilder, directive: Directive) -> Result<(), DescriptionErrorKind> {
	match directive {
		Directive::States(n) => builder.add_states(n).map_err(DescriptionErrorKind::Automaton)?,
		Directive::Final(state) => builder.set_final(StateIdx::new(state)).map_err(DescriptionErrorKind::Automaton)?,
		Directive::Tags(directions) => {
			for direction in directions {
				builder.add_tag(direction);
			}
		},
		Directive::Minimal { end, start } => builder.add_minimal(TagIdx::new(end), TagIdx::new(start)),
		Directive::Group { start, end, parents } => {
			builder.add_submatch(Submatch::new(start, end).with_parents(parents));
		},
		Directive::CaseInsensitive => builder.set_case_insensitive(true),
		Directive::Initial { target, attributes } => {
			if attributes
				.iter()
				.any(|attribute| matches!(attribute, Attribute::Class(_) | Attribute::NotClass(_)))
			{
				return Err(DescriptionErrorKind::ClassOnInitial);
			}
			let transition: Transition = with_attributes(Transition::initial(StateIdx::new(target)), attributes);
			builder.add_initial(transition).map_err(DescriptionErrorKind::Automaton)?;
		},
		Directive::Transition {
			from,
			target,
			symbol,
			attributes,
		} => {
			let from: StateIdx = StateIdx::new(from);
			let target: StateIdx = StateIdx::new(target);
			match symbol {
				Symbol::Range(start, end) => {
					let transition: Transition = Transition::new(target, char_interval(start, end)?);
					builder
						.add_transition(from, with_attributes(transition, attributes))
						.map_err(DescriptionErrorKind::Automaton)?;
				},
				Symbol::Any => {
					let transition: Transition = Transition::new(target, Interval::all_chars());
					builder
						.add_transition(from, with_attributes(transition, attributes))
						.map_err(DescriptionErrorKind::Automaton)?;
				},
				Symbol::Not(ranges) => {
					let mut excluded: Vec<Interval> = ranges
						.into_iter()
						.map(|(start, end)| char_interval(start, end))
						.collect::<Result<Vec<_>, _>>()?;
					let template: Transition = with_attributes(Transition::new(target, Interval::all_chars()), attributes);
					builder
						.add_excluding(from, template, &mut excluded)
						.map_err(DescriptionErrorKind::Automaton)?;
				},
			}
		},
	}
	Ok(())
}

fn char_interval(start: char, end: char) -> Result<Interval, DescriptionErrorKind> {
	let (start, end): (u32, u32) = (u32::from(start), u32::from(end));
	Interval::try_new(start, end).ok_or(DescriptionErrorKind::Automaton(TnfaError::EmptyRange { start, end }))
}

fn with_attributes(mut transition: Transition, attributes: Vec<Attribute>) -> Transition {
	for attribute in attributes {
		transition = match attribute {
			Attribute::Tags(tags) => transition.with_tags(tags.into_iter().map(TagIdx::new)),
			Attribute::Assert(assertions) => transition.with_assertions(assertions),
			Attribute::Class(class) => transition.with_class(class),
			Attribute::NotClass(class) => transition.with_negated_class(class),
		};
	}
	transition
}

// ==================================

fn parse_line(input: &str) -> ParsingResult<'_, Option<Directive>> {
	use nom::combinator::cut;

	let (input, _): (&str, &str) = parse_space0(input)?;
	if input.is_empty() || input.starts_with('#') {
		return Ok(("", None));
	}
	let (input, directive): (&str, Directive) = cut(parse_directive).parse(input)?;
	let (input, _): (&str, ()) = parse_line_end(input)?;
	Ok((input, Some(directive)))
}

fn parse_line_end(input: &str) -> ParsingResult<'_, ()> {
	let (rest, _): (&str, &str) = parse_space0(input)?;
	if rest.is_empty() || rest.starts_with('#') {
		Ok(("", ()))
	} else {
		failure(rest, DescriptionErrorKind::TrailingInput)
	}
}

fn parse_directive(input: &str) -> ParsingResult<'_, Directive> {
	use nom::multi::many1;
	use nom::sequence::preceded;

	if input.starts_with(|ch: char| ch.is_ascii_digit()) {
		return parse_transition(input);
	}

	let (rest, keyword): (&str, &str) = parse_word(input)?;
	match keyword {
		"states" => preceded(parse_space1, parse_number).map(Directive::States).parse(rest),
		"final" => preceded(parse_space1, parse_number).map(Directive::Final).parse(rest),
		"tags" => many1(preceded(parse_space1, parse_direction))
			.map(Directive::Tags)
			.parse(rest),
		"minimal" => {
			let (rest, end): (&str, usize) = preceded(parse_space1, parse_number).parse(rest)?;
			let (rest, start): (&str, usize) = preceded(parse_space1, parse_number).parse(rest)?;
			Ok((rest, Directive::Minimal { end, start }))
		},
		"group" => {
			use nom::combinator::opt;

			let (rest, start): (&str, Endpoint) = preceded(parse_space1, parse_endpoint).parse(rest)?;
			let (rest, end): (&str, Endpoint) = preceded(parse_space1, parse_endpoint).parse(rest)?;
			let (rest, parents): (&str, Option<Vec<usize>>) = opt(parse_parents).parse(rest)?;
			Ok((
				rest,
				Directive::Group {
					start,
					end,
					parents: parents.unwrap_or_default(),
				},
			))
		},
		"icase" => Ok((rest, Directive::CaseInsensitive)),
		"init" => {
			let (rest, _): (&str, ()) = preceded(parse_space1, parse_arrow).parse(rest)?;
			let (rest, target): (&str, usize) = preceded(parse_space1, parse_number).parse(rest)?;
			let (rest, attributes): (&str, Vec<Attribute>) = parse_attributes(rest)?;
			Ok((rest, Directive::Initial { target, attributes }))
		},
		_ => failure(input, DescriptionErrorKind::UnknownDirective),
	}
}

fn parse_transition(input: &str) -> ParsingResult<'_, Directive> {
	use nom::sequence::preceded;

	let (input, from): (&str, usize) = parse_number(input)?;
	let (input, _): (&str, ()) = preceded(parse_space1, parse_arrow).parse(input)?;
	let (input, target): (&str, usize) = preceded(parse_space1, parse_number).parse(input)?;
	let (input, symbol): (&str, Symbol) = preceded(parse_space1, parse_symbol).parse(input)?;
	let (input, attributes): (&str, Vec<Attribute>) = parse_attributes(input)?;
	Ok((
		input,
		Directive::Transition {
			from,
			target,
			symbol,
			attributes,
		},
	))
}

fn parse_direction(input: &str) -> ParsingResult<'_, TagDirection> {
	let (rest, word): (&str, &str) = parse_word(input)?;
	match word {
		"min" => Ok((rest, TagDirection::Minimize)),
		"max" => Ok((rest, TagDirection::Maximize)),
		_ => failure(input, DescriptionErrorKind::ExpectedDirection),
	}
}

fn parse_endpoint(input: &str) -> ParsingResult<'_, Endpoint> {
	if input.starts_with(|ch: char| ch.is_ascii_digit()) {
		let (rest, tag): (&str, usize) = parse_number(input)?;
		return Ok((rest, Endpoint::Tag(TagIdx::new(tag))));
	}
	match parse_word(input) {
		Ok((rest, "end")) => Ok((rest, Endpoint::MatchEnd)),
		_ => diagnostic(input, DescriptionErrorKind::ExpectedEndpoint),
	}
}

fn parse_parents(input: &str) -> ParsingResult<'_, Vec<usize>> {
	use nom::combinator::cut;
	use nom::multi::many1;
	use nom::sequence::preceded;

	let (rest, _): (&str, &str) = parse_space1(input)?;
	match parse_word(rest) {
		Ok((rest, "parents")) => cut(many1(preceded(parse_space1, parse_number))).parse(rest),
		_ => diagnostic(input, DescriptionErrorKind::UnknownAttribute),
	}
}

fn parse_symbol(input: &str) -> ParsingResult<'_, Symbol> {
	use nom::combinator::cut;
	use nom::multi::many1;
	use nom::sequence::preceded;

	if input.starts_with('\'') {
		let (rest, (start, end)): (&str, (char, char)) = parse_range(input)?;
		return Ok((rest, Symbol::Range(start, end)));
	}
	match parse_word(input) {
		Ok((rest, "any")) => Ok((rest, Symbol::Any)),
		Ok((rest, "not")) => cut(many1(preceded(parse_space1, parse_range)))
			.map(Symbol::Not)
			.parse(rest),
		_ => failure(input, DescriptionErrorKind::ExpectedSymbol),
	}
}

fn parse_range(input: &str) -> ParsingResult<'_, (char, char)> {
	use nom::combinator::cut;

	let (rest, start): (&str, char) = parse_quoted(input)?;
	let Ok((rest, _)): ParsingResult<'_, char> = parse_char::<'-'>(rest) else {
		return Ok((rest, (start, start)));
	};
	let (rest, end): (&str, char) = cut(parse_quoted).parse(rest)?;
	if start > end {
		let (start, end): (u32, u32) = (u32::from(start), u32::from(end));
		return failure(input, DescriptionErrorKind::Automaton(TnfaError::EmptyRange { start, end }));
	}
	Ok((rest, (start, end)))
}

fn parse_attributes(input: &str) -> ParsingResult<'_, Vec<Attribute>> {
	use nom::multi::many0;
	use nom::sequence::preceded;

	many0(preceded(parse_space1, parse_attribute)).parse(input)
}

fn parse_attribute(input: &str) -> ParsingResult<'_, Attribute> {
	use nom::combinator::cut;
	use nom::multi::separated_list0;

	if let Some(rest) = input.strip_prefix('!') {
		return match parse_word(rest) {
			Ok((rest, "class")) => cut(combinator_surrounded_cut::<'(', ')', _, _>(parse_class))
				.map(Attribute::NotClass)
				.parse(rest),
			_ => failure(input, DescriptionErrorKind::UnknownAttribute),
		};
	}

	let (rest, word): (&str, &str) = parse_word(input)?;
	let assertion: Assertions = match word {
		"tags" => {
			return combinator_surrounded_cut::<'(', ')', _, _>(separated_list0(parse_space1, parse_number))
				.map(Attribute::Tags)
				.parse(rest);
		},
		"class" => {
			return combinator_surrounded_cut::<'(', ')', _, _>(parse_class)
				.map(Attribute::Class)
				.parse(rest);
		},
		"bol" => Assertions::BOL,
		"eol" => Assertions::EOL,
		"bow" => Assertions::BOW,
		"eow" => Assertions::EOW,
		"wb" => Assertions::WB,
		"nwb" => Assertions::NOT_WB,
		_ => return failure(input, DescriptionErrorKind::UnknownAttribute),
	};
	Ok((rest, Attribute::Assert(assertion)))
}

fn parse_class(input: &str) -> ParsingResult<'_, CharClass> {
	let (rest, name): (&str, &str) = parse_word(input)?;
	match CharClass::from_name(name) {
		Some(class) => Ok((rest, class)),
		None => failure(input, DescriptionErrorKind::UnknownClass),
	}
}

fn parse_quoted(input: &str) -> ParsingResult<'_, char> {
	use nom::combinator::cut;

	let (rest, _): (&str, char) = parse_char::<'\''>(input)?;
	let (rest, ch): (&str, char) = cut(parse_quoted_character).parse(rest)?;
	match parse_char::<'\''>(rest) {
		Ok((rest, _)) => Ok((rest, ch)),
		Err(_) => failure(rest, DescriptionErrorKind::MissingClose('\'', '\'')),
	}
}

fn parse_quoted_character(input: &str) -> ParsingResult<'_, char> {
	let mut chars: Chars = input.chars();
	match chars.next() {
		Some('\\') => parse_escape(chars.as_str()),
		Some('\'') | None => diagnostic(input, DescriptionErrorKind::ExpectedSymbol),
		Some(ch) => Ok((chars.as_str(), ch)),
	}
}

fn parse_escape(input: &str) -> ParsingResult<'_, char> {
	let mut chars: Chars = input.chars();
	let unescaped: char = match chars.next() {
		Some('n') => '\n',
		Some('t') => '\t',
		Some('r') => '\r',
		Some('0') => '\0',
		Some('\\') => '\\',
		Some('\'') => '\'',
		Some('u') => return parse_unicode_escape(chars.as_str()),
		_ => return diagnostic(input, DescriptionErrorKind::InvalidEscape),
	};
	Ok((chars.as_str(), unescaped))
}

/// `{HEX}`, after `\u`.
fn parse_unicode_escape(input: &str) -> ParsingResult<'_, char> {
	let (rest, _): (&str, char) = parse_char::<'{'>(input)?;
	let (rest, digits): (&str, &str) = parse_hex_digits(rest)?;
	let (rest, _): (&str, char) = parse_char::<'}'>(rest)?;
	match u32::from_str_radix(digits, 16).ok().and_then(char::from_u32) {
		Some(ch) => Ok((rest, ch)),
		None => diagnostic(input, DescriptionErrorKind::InvalidEscape),
	}
}

fn parse_arrow(input: &str) -> ParsingResult<'_, ()> {
	match input.strip_prefix("->") {
		Some(rest) => Ok((rest, ())),
		None => diagnostic(input, DescriptionErrorKind::ExpectedArrow),
	}
}

fn parse_char<const CHAR: char>(input: &str) -> ParsingResult<'_, char> {
	let mut chars: Chars = input.chars();

	if let Some(ch) = chars.next() {
		if ch == CHAR {
			return Ok((chars.as_str(), ch));
		}
	}

	diagnostic(input, DescriptionErrorKind::ExpectedChar(CHAR))
}

fn parse_word(input: &str) -> ParsingResult<'_, &str> {
	use nom::bytes::complete::take_while1;

	take_while1(|ch: char| ch.is_ascii_alphabetic() || ch == '_').parse(input)
}

fn parse_number(input: &str) -> ParsingResult<'_, usize> {
	use nom::character::complete::digit1;

	match digit1(input) {
		Ok((remaining, lexeme)) => match lexeme.parse::<usize>() {
			Ok(n) => Ok((remaining, n)),
			Err(_) => diagnostic(input, DescriptionErrorKind::NumberTooBig),
		},
		Err(err @ NomErr::Incomplete(_)) => Err(err),
		Err(NomErr::Error(_) | NomErr::Failure(_)) => diagnostic(input, DescriptionErrorKind::ExpectedNumber),
	}
}

fn parse_hex_digits(input: &str) -> ParsingResult<'_, &str> {
	nom::character::complete::hex_digit1(input)
}

fn parse_space0(input: &str) -> ParsingResult<'_, &str> {
	nom::character::complete::space0(input)
}

fn parse_space1(input: &str) -> ParsingResult<'_, &str> {
	match nom::character::complete::space1(input) {
		output @ Ok(_) => output,
		Err(_) => diagnostic(input, DescriptionErrorKind::ExpectedSpace),
	}
}

// ==================================

/// A recoverable error: another alternative may still match.
fn diagnostic<T>(input: &str, kind: DescriptionErrorKind) -> ParsingResult<'_, T> {
	Err(NomErr::Error(DescriptionParsingError::new(input, kind)))
}

/// The input is malformed.
fn failure<T>(input: &str, kind: DescriptionErrorKind) -> ParsingResult<'_, T> {
	Err(NomErr::Failure(DescriptionParsingError::new(input, kind)))
}

fn combinator_surrounded_cut<'a, const OPEN: char, const CLOSE: char, O, F>(
	mut inside: F,
) -> impl Parser<&'a str, Output = O, Error = DescriptionParsingError<'a>>
where
	F: Parser<&'a str, Output = O, Error = DescriptionParsingError<'a>>,
{
	move |input| {
		let (input, _): (&str, char) = parse_char::<OPEN>(input)?;

		// Once the opening character matched, the inside must match too.
		let (input, output): (&str, O) = match inside.parse(input) {
			Ok(ok) => ok,
			Err(err @ NomErr::Incomplete(_)) => return Err(err),
			Err(NomErr::Error(err) | NomErr::Failure(err)) => return Err(NomErr::Failure(err)),
		};

		let (input, _): (&str, char) = match parse_char::<CLOSE>(input) {
			Ok(ok) => ok,
			Err(_) => return failure(input, DescriptionErrorKind::MissingClose(OPEN, CLOSE)),
		};

		Ok((input, output))
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn line(text: &str) -> Option<Directive> {
		parse_line(text).unwrap().1
	}

	fn error(description: &str) -> (usize, &str, DescriptionErrorKind) {
		let err: DescriptionError<'_> = Tnfa::from_description(description).unwrap_err();
		(err.line, err.remaining, err.kind)
	}

	#[test]
	fn directives() {
		assert_eq!(line("  # nothing"), None);
		assert_eq!(line(""), None);
		assert_eq!(line("states 12"), Some(Directive::States(12)));
		assert_eq!(line("\tfinal 3 # the end"), Some(Directive::Final(3)));
		assert_eq!(
			line("tags min max  min"),
			Some(Directive::Tags(vec![
				TagDirection::Minimize,
				TagDirection::Maximize,
				TagDirection::Minimize
			]))
		);
		assert_eq!(line("minimal 3 2"), Some(Directive::Minimal { end: 3, start: 2 }));
		assert_eq!(
			line("group 1 end parents 0 2"),
			Some(Directive::Group {
				start: Endpoint::Tag(TagIdx::new(1)),
				end: Endpoint::MatchEnd,
				parents: vec![0, 2],
			})
		);
		assert_eq!(line("icase"), Some(Directive::CaseInsensitive));
		assert_eq!(
			line("init -> 4 tags(0 1) bol wb"),
			Some(Directive::Initial {
				target: 4,
				attributes: vec![
					Attribute::Tags(vec![0, 1]),
					Attribute::Assert(Assertions::BOL),
					Attribute::Assert(Assertions::WB),
				],
			})
		);
	}

	#[test]
	fn symbols_and_attributes() {
		assert_eq!(
			line(r"0 -> 1 '\n' tags() class(alpha) !class(upper) eow"),
			Some(Directive::Transition {
				from: 0,
				target: 1,
				symbol: Symbol::Range('\n', '\n'),
				attributes: vec![
					Attribute::Tags(vec![]),
					Attribute::Class(CharClass::Alpha),
					Attribute::NotClass(CharClass::Upper),
					Attribute::Assert(Assertions::EOW),
				],
			})
		);
		assert_eq!(
			line(r"2 -> 2 not 'a'-'z' '\'' '\u{1F600}' nwb"),
			Some(Directive::Transition {
				from: 2,
				target: 2,
				symbol: Symbol::Not(vec![('a', 'z'), ('\'', '\''), ('😀', '😀')]),
				attributes: vec![Attribute::Assert(Assertions::NOT_WB)],
			})
		);
		assert_eq!(
			line("1 -> 0 any # '#'"),
			Some(Directive::Transition {
				from: 1,
				target: 0,
				symbol: Symbol::Any,
				attributes: vec![],
			})
		);
		assert_eq!(
			line("1 -> 0 '#'"),
			Some(Directive::Transition {
				from: 1,
				target: 0,
				symbol: Symbol::Range('#', '#'),
				attributes: vec![],
			})
		);
	}

	#[test]
	fn syntax_errors() {
		assert_eq!(
			error("states 2\nstart 1"),
			(2, "start 1", DescriptionErrorKind::UnknownDirective)
		);
		assert_eq!(error("states x"), (1, "x", DescriptionErrorKind::ExpectedNumber));
		assert_eq!(
			error("states 2\n0 -> 1 'ab'"),
			(2, "b'", DescriptionErrorKind::MissingClose('\'', '\''))
		);
		assert_eq!(
			error("states 2\n0 -> 1 'a' tags(0"),
			(2, "", DescriptionErrorKind::MissingClose('(', ')'))
		);
		assert_eq!(
			error("states 2\n0 -> 1 'a' loud"),
			(2, "loud", DescriptionErrorKind::UnknownAttribute)
		);
		assert_eq!(
			error("states 2\n0 -> 1 'a' class(vowel)"),
			(2, "vowel)", DescriptionErrorKind::UnknownClass)
		);
		assert_eq!(
			error(r"states 2\n0 -> 1 '\q'"),
			(1, r"\n0 -> 1 '\q'", DescriptionErrorKind::TrailingInput)
		);
		assert_eq!(
			error("states 2\n0 -> 1 '\\q'"),
			(2, "q'", DescriptionErrorKind::InvalidEscape)
		);
		assert_eq!(
			error("states 2\n0 -> 1 'z'-'a'"),
			(
				2,
				"'z'-'a'",
				DescriptionErrorKind::Automaton(TnfaError::EmptyRange { start: 0x7a, end: 0x61 })
			)
		);
		assert_eq!(error("states 2\n0 => 1 'a'"), (2, "=> 1 'a'", DescriptionErrorKind::ExpectedArrow));
		assert_eq!(error("tags min mid"), (1, "mid", DescriptionErrorKind::ExpectedDirection));
		assert_eq!(error("final 1 2"), (1, "2", DescriptionErrorKind::TrailingInput));
	}

	#[test]
	fn semantic_errors() {
		assert_eq!(
			error("states 2\nstates 3"),
			(2, "states 3", DescriptionErrorKind::DuplicateStates)
		);
		assert_eq!(
			error("states 2\nfinal 2"),
			(
				2,
				"final 2",
				DescriptionErrorKind::Automaton(TnfaError::DanglingState { state: 2, states: 2 })
			)
		);
		assert_eq!(
			error("states 2\ninit -> 0 class(digit)"),
			(2, "init -> 0 class(digit)", DescriptionErrorKind::ClassOnInitial)
		);
		assert_eq!(
			error("states 2\ninit -> 0"),
			(0, "", DescriptionErrorKind::Automaton(TnfaError::NoFinalState))
		);
		assert_eq!(
			error("states 100000000000000\nfinal 0"),
			(
				1,
				"states 100000000000000",
				DescriptionErrorKind::Automaton(TnfaError::TooManyStates {
					states: 100_000_000_000_000
				})
			)
		);
		let err: DescriptionError<'_> = Tnfa::from_description("states 1\nfinal 0\ninit -> 0 tags(1)").unwrap_err();
		assert_eq!(err.to_string(), "tag 1 does not exist (the automaton has 0 tags)");
		assert!(std::error::Error::source(&err).is_some());
	}

	#[test]
	fn loads_an_automaton() {
		let tnfa: Tnfa = Tnfa::from_description(
			"
			# `[^a-c]x|ÿ`
			states 3
			final 2
			icase
			tags min
			group 0 end
			init -> 0 tags(0)
			init -> 1 tags(0)
			0 -> 1 not 'a'-'c' class(alpha)
			1 -> 2 'x'
			0 -> 2 '\\u{ff}'
			",
		)
		.unwrap();
		assert_eq!(tnfa.num_states(), 3);
		assert_eq!(tnfa.num_tags(), 1);
		assert_eq!(tnfa.submatches().len(), 1);
		assert!(tnfa.is_case_insensitive());
		assert_eq!(tnfa[StateIdx::new(0)].transitions().len(), 3);
		assert_eq!(tnfa.initial().len(), 2);
		assert_eq!(tnfa[StateIdx::new(0)].candidates('ÿ').count(), 2);
		assert_eq!(tnfa[StateIdx::new(0)].candidates('b').count(), 0);
	}
}
