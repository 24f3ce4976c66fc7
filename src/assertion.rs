//! Zero-width assertions and character-class predicates.
//!
//! Both are pure functions of the code points around a position and the match flags;
//! the simulation in [`crate::parallel`] calls them once per candidate transition.

use std::ops::BitOr;
use std::ops::BitOrAssign;

/// Zero-width conditions attached to a transition.
///
/// This is a bitset: a transition may carry several assertions,
/// and it may be taken only if every one of them holds.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Assertions(u8);

/// Per-call options that change how assertions evaluate at the edges of the input.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MatchFlags(u8);

macro_rules! bit_set_impl {
	($ty:ty, $($tt:tt)*) => {
		bit_set_impl!($ty);
		bit_set_impl!($($tt)*);
	};
	($ty:ty) => {
		impl $ty {
			#[inline]
			#[must_use]
			pub const fn empty() -> Self {
				Self(0)
			}

			#[inline]
			#[must_use]
			pub const fn from_bits_truncate(bits: u8) -> Self {
				Self(bits & Self::ALL.0)
			}

			#[inline]
			#[must_use]
			pub const fn bits(self) -> u8 {
				self.0
			}

			#[inline]
			#[must_use]
			pub const fn is_empty(self) -> bool {
				self.0 == 0
			}

			#[inline]
			#[must_use]
			pub const fn contains(self, other: Self) -> bool {
				(self.0 & other.0) == other.0
			}

			#[inline]
			#[must_use]
			pub const fn intersects(self, other: Self) -> bool {
				(self.0 & other.0) != 0
			}
		}

		impl BitOr for $ty {
			type Output = Self;

			fn bitor(self, rhs: Self) -> Self::Output {
				Self(self.0 | rhs.0)
			}
		}

		impl BitOrAssign for $ty {
			fn bitor_assign(&mut self, rhs: Self) {
				self.0 |= rhs.0;
			}
		}
	};
}

bit_set_impl!(Assertions, MatchFlags);

impl Assertions {
	/// `^`: beginning of the input, or after a newline in newline-sensitive mode.
	pub const BOL: Self = Self(1 << 0);
	/// `$`: end of the input, or before a newline in newline-sensitive mode.
	pub const EOL: Self = Self(1 << 1);
	/// Beginning of a word.
	pub const BOW: Self = Self(1 << 2);
	/// End of a word.
	pub const EOW: Self = Self(1 << 3);
	/// Word boundary.
	pub const WB: Self = Self(1 << 4);
	/// Not a word boundary.
	pub const NOT_WB: Self = Self(1 << 5);

	const ALL: Self = Self(0b11_1111);
}

impl MatchFlags {
	/// The start of the input is not the beginning of a line.
	pub const NOT_BOL: Self = Self(1 << 0);
	/// The end of the input is not the end of a line.
	pub const NOT_EOL: Self = Self(1 << 1);
	/// `^` and `$` also match right after and right before a `\n`.
	pub const NEWLINE: Self = Self(1 << 2);

	const ALL: Self = Self(0b111);
}

/// The surroundings of an input position, as seen by an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
	/// Offset of the position in input units.
	pub pos: usize,
	/// Code point right before the position; `None` at the start of the input.
	pub prev: Option<char>,
	/// Code point right after the position; `None` at the end of the input.
	pub next: Option<char>,
}

impl Boundary {
	/// Whether every assertion in `assertions` holds here.
	pub fn satisfies(&self, assertions: Assertions, flags: MatchFlags) -> bool {
		!self.violates(assertions, flags)
	}

	fn violates(&self, assertions: Assertions, flags: MatchFlags) -> bool {
		let newline: bool = flags.contains(MatchFlags::NEWLINE);
		let prev_is_word: bool = self.prev.is_some_and(is_word_char);
		let next_is_word: bool = self.next.is_some_and(is_word_char);

		(assertions.contains(Assertions::BOL)
			&& (self.pos > 0 || flags.contains(MatchFlags::NOT_BOL))
			&& !(newline && self.prev == Some('\n')))
			|| (assertions.contains(Assertions::EOL)
				&& (self.next.is_some() || flags.contains(MatchFlags::NOT_EOL))
				&& !(newline && self.next == Some('\n')))
			|| (assertions.contains(Assertions::BOW) && (prev_is_word || !next_is_word))
			|| (assertions.contains(Assertions::EOW) && (!prev_is_word || next_is_word))
			|| (assertions.contains(Assertions::WB)
				&& self.pos != 0
				&& self.next.is_some()
				&& prev_is_word == next_is_word)
			|| (assertions.contains(Assertions::NOT_WB)
				&& (self.pos == 0 || self.next.is_none() || prev_is_word != next_is_word))
	}
}

/// Letters, digits and `_`.
pub fn is_word_char(ch: char) -> bool {
	ch == '_' || ch.is_alphanumeric()
}

/// Named character classes a transition may require or exclude.
#[derive(Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum CharClass {
	Alnum,
	Alpha,
	Blank,
	Cntrl,
	Digit,
	Graph,
	Lower,
	Print,
	Punct,
	Space,
	Upper,
	Xdigit,
	Word,
}

impl CharClass {
	const NAMES: [(&'static str, CharClass); 13] = [
		("alnum", CharClass::Alnum),
		("alpha", CharClass::Alpha),
		("blank", CharClass::Blank),
		("cntrl", CharClass::Cntrl),
		("digit", CharClass::Digit),
		("graph", CharClass::Graph),
		("lower", CharClass::Lower),
		("print", CharClass::Print),
		("punct", CharClass::Punct),
		("space", CharClass::Space),
		("upper", CharClass::Upper),
		("xdigit", CharClass::Xdigit),
		("word", CharClass::Word),
	];

	pub fn from_name(name: &str) -> Option<Self> {
		Self::NAMES
			.iter()
			.find(|(candidate, _)| *candidate == name)
			.map(|&(_, class)| class)
	}

	pub fn name(self) -> &'static str {
		// `NAMES` lists every variant.
		Self::NAMES
			.iter()
			.find(|(_, class)| *class == self)
			.map_or("", |&(name, _)| name)
	}

	pub fn contains(self, ch: char) -> bool {
		match self {
			Self::Alnum => ch.is_alphanumeric(),
			Self::Alpha => ch.is_alphabetic(),
			Self::Blank => (ch == ' ') || (ch == '\t'),
			Self::Cntrl => ch.is_control(),
			Self::Digit => ch.is_ascii_digit(),
			Self::Graph => !ch.is_control() && !ch.is_whitespace(),
			Self::Lower => ch.is_lowercase(),
			Self::Print => !ch.is_control(),
			Self::Punct => !ch.is_control() && !ch.is_whitespace() && !ch.is_alphanumeric(),
			Self::Space => ch.is_whitespace(),
			Self::Upper => ch.is_uppercase(),
			Self::Xdigit => ch.is_ascii_hexdigit(),
			Self::Word => is_word_char(ch),
		}
	}

	/// Membership, optionally ignoring case: either case form of `ch` may belong.
	pub fn contains_folded(self, ch: char, case_insensitive: bool) -> bool {
		if case_insensitive {
			self.contains(to_lower(ch)) || self.contains(to_upper(ch))
		} else {
			self.contains(ch)
		}
	}
}

/// Whether a consumed code point passes a transition's class requirements.
pub fn classes_match(
	class: Option<CharClass>,
	negated_classes: &[CharClass],
	ch: char,
	case_insensitive: bool,
) -> bool {
	if let Some(class) = class {
		if !class.contains_folded(ch, case_insensitive) {
			return false;
		}
	}
	!negated_classes
		.iter()
		.any(|negated| negated.contains_folded(ch, case_insensitive))
}

/// Single code point case mappings; a character whose mapping expands stays as it is.
fn to_lower(ch: char) -> char {
	let mut lower = ch.to_lowercase();
	match (lower.next(), lower.next()) {
		(Some(mapped), None) => mapped,
		_ => ch,
	}
}

fn to_upper(ch: char) -> char {
	let mut upper = ch.to_uppercase();
	match (upper.next(), upper.next()) {
		(Some(mapped), None) => mapped,
		_ => ch,
	}
}
