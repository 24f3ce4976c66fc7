//! Character sources.
//!
//! The simulation pulls one code point at a time and needs to see the code points on both sides of its
//! current position. Positions are counted in input units: bytes for [`Input::Bytes`] and [`Input::Utf8`],
//! code points for [`Input::Wide`], and whatever widths a [`CharSource`] reports for [`Input::User`].

use crate::assertion::Boundary;
use crate::parallel::MatchError;

/// A caller-provided decoder.
pub trait CharSource {
	/// The next code point and the number of input units it spans, or `None` at the end of the input.
	///
	/// A width of zero is counted as one.
	fn decode_next(&mut self) -> Option<(char, usize)>;
}

/// The text to search.
pub enum Input<'a> {
	/// One code point per byte (ISO-8859-1).
	Bytes(&'a [u8]),
	Wide(&'a [char]),
	Utf8(&'a str),
	User(&'a mut dyn CharSource),
}

impl std::fmt::Debug for Input<'_> {
	fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Bytes(bytes) => fmt.debug_tuple("Bytes").field(bytes).finish(),
			Self::Wide(chars) => fmt.debug_tuple("Wide").field(chars).finish(),
			Self::Utf8(text) => fmt.debug_tuple("Utf8").field(text).finish(),
			Self::User(_) => fmt.write_str("User(..)"),
		}
	}
}

impl<'a> From<&'a str> for Input<'a> {
	fn from(text: &'a str) -> Self {
		Self::Utf8(text)
	}
}

impl<'a> From<&'a [u8]> for Input<'a> {
	fn from(bytes: &'a [u8]) -> Self {
		Self::Bytes(bytes)
	}
}

impl<'a> From<&'a [char]> for Input<'a> {
	fn from(chars: &'a [char]) -> Self {
		Self::Wide(chars)
	}
}

/// A position in the input together with the code points around it.
///
/// The code point after the position has already been decoded; consuming it moves the position past it.
pub(crate) struct Cursor<'a> {
	input: Input<'a>,
	pos: usize,
	prev: Option<char>,
	next: Option<(char, usize)>,
}

impl<'a> Cursor<'a> {
	/// Places a cursor at `start`. The code point before `start`, if any, is visible as the previous one.
	pub fn new(input: Input<'a>, start: usize) -> Result<Self, MatchError> {
		let valid: bool = match &input {
			Input::Bytes(bytes) => start <= bytes.len(),
			Input::Wide(chars) => start <= chars.len(),
			Input::Utf8(text) => text.is_char_boundary(start),
			Input::User(_) => true,
		};
		if !valid {
			return Err(MatchError::InvalidStart { offset: start });
		}

		let mut cursor: Self = Self {
			input,
			pos: 0,
			prev: None,
			next: None,
		};
		if matches!(cursor.input, Input::User(_)) {
			cursor.next = cursor.decode();
			while cursor.pos < start {
				if cursor.advance().is_none() {
					return Err(MatchError::InvalidStart { offset: start });
				}
			}
			if cursor.pos != start {
				return Err(MatchError::InvalidStart { offset: start });
			}
		} else {
			cursor.seek(start);
		}
		Ok(cursor)
	}

	pub fn pos(&self) -> usize {
		self.pos
	}

	pub fn boundary(&self) -> Boundary {
		Boundary {
			pos: self.pos,
			prev: self.prev,
			next: self.next.map(|(ch, _)| ch),
		}
	}

	/// Consumes the next code point.
	pub fn advance(&mut self) -> Option<char> {
		let (ch, width): (char, usize) = self.next?;
		self.prev = Some(ch);
		self.pos += width.max(1);
		self.next = self.decode();
		Some(ch)
	}

	/// Moves forward to the first position whose next code point is `symbol`.
	/// Returns `false` if there is none. Slice inputs are then left where they were; a user source is
	/// left at its end.
	pub fn skip_to(&mut self, symbol: char) -> bool {
		if matches!(self.input, Input::User(_)) {
			loop {
				match self.next {
					Some((ch, _)) if ch == symbol => return true,
					Some(_) => {
						self.advance();
					},
					None => return false,
				}
			}
		}

		let pos: usize = self.pos;
		let found: Option<usize> = match &self.input {
			Input::Bytes(bytes) => {
				u8::try_from(symbol).ok().and_then(|byte| memchr::memchr(byte, &bytes[pos..]))
			},
			Input::Utf8(text) => match u8::try_from(symbol) {
				Ok(byte) if symbol.is_ascii() => memchr::memchr(byte, &text.as_bytes()[pos..]),
				_ => text[pos..].find(symbol),
			},
			Input::Wide(chars) => chars[pos..].iter().position(|&ch| ch == symbol),
			Input::User(_) => None,
		};

		match found {
			Some(offset) => {
				self.seek(pos + offset);
				true
			},
			None => false,
		}
	}

	fn seek(&mut self, pos: usize) {
		self.pos = pos;
		self.prev = match &self.input {
			Input::Bytes(bytes) => pos.checked_sub(1).map(|i| char::from(bytes[i])),
			Input::Wide(chars) => pos.checked_sub(1).map(|i| chars[i]),
			Input::Utf8(text) => text[..pos].chars().next_back(),
			Input::User(_) => self.prev,
		};
		self.next = self.decode();
	}

	fn decode(&mut self) -> Option<(char, usize)> {
		let pos: usize = self.pos;
		match &mut self.input {
			Input::Bytes(bytes) => bytes.get(pos).map(|&byte| (char::from(byte), 1)),
			Input::Wide(chars) => chars.get(pos).map(|&ch| (ch, 1)),
			Input::Utf8(text) => text[pos..].chars().next().map(|ch| (ch, ch.len_utf8())),
			Input::User(source) => source.decode_next(),
		}
	}
}
