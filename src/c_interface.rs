use std::ffi::c_char;
use std::marker::PhantomData;
use std::str::Utf8Error;

use crate::assertion::Assertions;
use crate::assertion::MatchFlags;
use crate::config::Config;
use crate::input::Input;
use crate::interval_tree::Interval;
use crate::matcher::Matcher;
use crate::parallel::Match;
use crate::parallel::MatchError;
use crate::tags::TagDirection;
use crate::tnfa::StateIdx;
use crate::tnfa::TagIdx;
use crate::tnfa::Tnfa;
use crate::tnfa::TnfaBuilder;
use crate::tnfa::Transition;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CSlice<'lifetime, T> {
	pointer: *const T,
	length: usize,
	_lifetime: PhantomData<&'lifetime [T]>,
}

pub type CStringView<'lifetime> = CSlice<'lifetime, c_char>;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TnfaMatchStatus {
	Match = 0,
	NoMatch = 1,
	OutOfMemory = 2,
	InvalidArgument = 3,
}

/// `None` (a null pointer) if `final_state` is not one of the `num_states` states, or if that many states
/// cannot be allocated.
#[unsafe(no_mangle)]
extern "C" fn tnfa_match_builder_new(num_states: usize, final_state: usize) -> Option<Box<TnfaBuilder>> {
	let mut builder: TnfaBuilder = TnfaBuilder::new();
	builder.add_states(num_states).ok()?;
	builder.set_final(StateIdx::new(final_state)).ok()?;
	Some(Box::new(builder))
}

#[unsafe(no_mangle)]
unsafe extern "C" fn tnfa_match_builder_delete(builder: Box<TnfaBuilder>) {
	std::mem::drop(builder);
}

/// `assertions` is a bit set of `Assertions`.
#[unsafe(no_mangle)]
unsafe extern "C" fn tnfa_match_builder_add_initial(
	builder: &mut TnfaBuilder,
	target: usize,
	tags: CSlice<'_, usize>,
	assertions: u8,
) -> TnfaMatchStatus {
	let transition: Transition = Transition::initial(StateIdx::new(target))
		.with_tags(tags.as_slice().iter().copied().map(TagIdx::new))
		.with_assertions(Assertions::from_bits_truncate(assertions));
	match builder.add_initial(transition) {
		Ok(()) => TnfaMatchStatus::Match,
		Err(err) => {
			debug!("rejected initial transition: {err}");
			TnfaMatchStatus::InvalidArgument
		},
	}
}

/// Adds a transition consuming one code point in `first..=last`.
#[unsafe(no_mangle)]
unsafe extern "C" fn tnfa_match_builder_add_transition(
	builder: &mut TnfaBuilder,
	from: usize,
	target: usize,
	first: u32,
	last: u32,
	tags: CSlice<'_, usize>,
	assertions: u8,
) -> TnfaMatchStatus {
	let Some(symbols): Option<Interval> = Interval::try_new(first, last) else {
		return TnfaMatchStatus::InvalidArgument;
	};
	let transition: Transition = Transition::new(StateIdx::new(target), symbols)
		.with_tags(tags.as_slice().iter().copied().map(TagIdx::new))
		.with_assertions(Assertions::from_bits_truncate(assertions));
	match builder.add_transition(StateIdx::new(from), transition) {
		Ok(()) => TnfaMatchStatus::Match,
		Err(err) => {
			debug!("rejected transition from {from}: {err}");
			TnfaMatchStatus::InvalidArgument
		},
	}
}

/// Declares one tag per entry: 0 prefers the smallest position, 1 the largest.
#[unsafe(no_mangle)]
unsafe extern "C" fn tnfa_match_builder_set_tag_directions(
	builder: &mut TnfaBuilder,
	directions: CSlice<'_, u8>,
) -> TnfaMatchStatus {
	let directions: Option<Vec<TagDirection>> = directions
		.as_slice()
		.iter()
		.map(|&direction| match direction {
			0 => Some(TagDirection::Minimize),
			1 => Some(TagDirection::Maximize),
			_ => None,
		})
		.collect::<Option<Vec<_>>>();
	let Some(directions): Option<Vec<TagDirection>> = directions else {
		return TnfaMatchStatus::InvalidArgument;
	};
	for direction in directions {
		builder.add_tag(direction);
	}
	TnfaMatchStatus::Match
}

#[unsafe(no_mangle)]
unsafe extern "C" fn tnfa_match_builder_add_minimal(builder: &mut TnfaBuilder, end: usize, start: usize) {
	builder.add_minimal(TagIdx::new(end), TagIdx::new(start));
}

/// Consumes the builder. `None` (a null pointer) if the automaton refers to tags it does not declare.
#[unsafe(no_mangle)]
unsafe extern "C" fn tnfa_match_builder_build(builder: Box<TnfaBuilder>) -> Option<Box<Tnfa>> {
	match builder.build() {
		Ok(tnfa) => Some(Box::new(tnfa)),
		Err(err) => {
			debug!("invalid automaton: {err}");
			None
		},
	}
}

/// `None` (a null pointer) if the description is not valid UTF-8 or does not describe an automaton.
#[unsafe(no_mangle)]
unsafe extern "C" fn tnfa_match_from_description(description: CStringView<'_>) -> Option<Box<Tnfa>> {
	let description: &str = description.as_utf8().ok()?;
	match Tnfa::from_description(description) {
		Ok(tnfa) => Some(Box::new(tnfa)),
		Err(err) => {
			debug!("invalid description: {err}");
			None
		},
	}
}

#[unsafe(no_mangle)]
unsafe extern "C" fn tnfa_match_delete(tnfa: Box<Tnfa>) {
	std::mem::drop(tnfa);
}

#[unsafe(no_mangle)]
unsafe extern "C" fn tnfa_match_num_tags(tnfa: &Tnfa) -> usize {
	tnfa.num_tags()
}

/// Searches `input` from its start.
///
/// Input that is not valid UTF-8 is read as ISO-8859-1. On a match, `end` and the first
/// `tnfa_match_num_tags` entries of `tags` are filled in, with -1 for unset tags. `tags` may be null if the
/// automaton has no tags. `flags` is a bit set of `MatchFlags`; `memory_limit` of 0 means unlimited.
#[unsafe(no_mangle)]
unsafe extern "C" fn tnfa_match_search(
	tnfa: &Tnfa,
	input: CStringView<'_>,
	flags: u8,
	memory_limit: usize,
	end: &mut usize,
	tags: *mut isize,
	tags_length: usize,
) -> TnfaMatchStatus {
	if tags_length < tnfa.num_tags() || (tags.is_null() && tnfa.num_tags() > 0) {
		return TnfaMatchStatus::InvalidArgument;
	}

	let input: Input<'_> = match input.as_utf8() {
		Ok(utf8) => Input::Utf8(utf8),
		Err(_) => Input::Bytes(input.as_bytes()),
	};
	let config: Config = Config::new()
		.flags(MatchFlags::from_bits_truncate(flags))
		.memory_limit((memory_limit != 0).then_some(memory_limit));

	let found: Match = match Matcher::with_config(tnfa, config).find(input) {
		Ok(Some(found)) => found,
		Ok(None) => return TnfaMatchStatus::NoMatch,
		Err(MatchError::OutOfMemory { .. }) => return TnfaMatchStatus::OutOfMemory,
		Err(MatchError::InvalidStart { .. }) => return TnfaMatchStatus::InvalidArgument,
	};

	*end = found.end();
	if !found.tags().is_empty() {
		let output: &mut [isize] = unsafe { std::slice::from_raw_parts_mut(tags, found.tags().len()) };
		for (slot, &tag) in output.iter_mut().zip(found.tags().iter()) {
			*slot = tag.and_then(|pos| isize::try_from(pos).ok()).unwrap_or(-1);
		}
	}
	TnfaMatchStatus::Match
}

impl<'lifetime, T> CSlice<'lifetime, T> {
	pub fn from_slice(slice: &'lifetime [T]) -> Self {
		Self {
			pointer: slice.as_ptr(),
			length: slice.len(),
			_lifetime: PhantomData,
		}
	}

	pub fn as_slice(&self) -> &'lifetime [T] {
		if self.length == 0 {
			return &[];
		}
		unsafe { std::slice::from_raw_parts(self.pointer, self.length) }
	}
}

impl<'lifetime> CStringView<'lifetime> {
	pub fn from_utf8(utf8: &'lifetime str) -> Self {
		Self::from_bytes(utf8.as_bytes())
	}

	pub fn from_bytes(bytes: &'lifetime [u8]) -> Self {
		Self {
			pointer: bytes.as_ptr().cast::<c_char>(),
			length: bytes.len(),
			_lifetime: PhantomData,
		}
	}

	pub fn as_bytes(&self) -> &'lifetime [u8] {
		if self.length == 0 {
			return &[];
		}
		unsafe { std::slice::from_raw_parts(self.pointer.cast::<u8>(), self.length) }
	}

	pub fn as_utf8(&self) -> Result<&'lifetime str, Utf8Error> {
		str::from_utf8(self.as_bytes())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn search(tnfa: &Tnfa, input: &[u8], tags: &mut [isize]) -> (TnfaMatchStatus, usize) {
		let mut end: usize = usize::MAX;
		let status: TnfaMatchStatus = unsafe {
			tnfa_match_search(
				tnfa,
				CStringView::from_bytes(input),
				0,
				0,
				&mut end,
				tags.as_mut_ptr(),
				tags.len(),
			)
		};
		(status, end)
	}

	#[test]
	fn builder() {
		// `(a+?)b?`
		let mut builder: Box<TnfaBuilder> = tnfa_match_builder_new(3, 2).unwrap();
		assert!(tnfa_match_builder_new(3, 3).is_none());
		assert!(tnfa_match_builder_new(usize::MAX, 0).is_none());
		let tags: [usize; 2] = [0, 1];
		unsafe {
			assert_eq!(
				tnfa_match_builder_set_tag_directions(&mut builder, CSlice::from_slice(&[0, 0, 0])),
				TnfaMatchStatus::Match
			);
			assert_eq!(
				tnfa_match_builder_set_tag_directions(&mut builder, CSlice::from_slice(&[2])),
				TnfaMatchStatus::InvalidArgument
			);
			assert_eq!(
				tnfa_match_builder_add_initial(&mut builder, 0, CSlice::from_slice(&tags[..]), 0),
				TnfaMatchStatus::Match
			);
			let a: u32 = u32::from('a');
			let b: u32 = u32::from('b');
			assert_eq!(
				tnfa_match_builder_add_transition(&mut builder, 0, 0, a, a, CSlice::from_slice(&[]), 0),
				TnfaMatchStatus::Match
			);
			assert_eq!(
				tnfa_match_builder_add_transition(&mut builder, 0, 1, a, a, CSlice::from_slice(&[2]), 0),
				TnfaMatchStatus::Match
			);
			assert_eq!(
				tnfa_match_builder_add_transition(&mut builder, 0, 2, a, a, CSlice::from_slice(&[2]), 0),
				TnfaMatchStatus::Match
			);
			assert_eq!(
				tnfa_match_builder_add_transition(&mut builder, 1, 2, b, b, CSlice::from_slice(&[]), 0),
				TnfaMatchStatus::Match
			);
			assert_eq!(
				tnfa_match_builder_add_transition(&mut builder, 1, 2, b, a, CSlice::from_slice(&[]), 0),
				TnfaMatchStatus::InvalidArgument
			);
			assert_eq!(
				tnfa_match_builder_add_transition(&mut builder, 1, 7, b, b, CSlice::from_slice(&[]), 0),
				TnfaMatchStatus::InvalidArgument
			);
			tnfa_match_builder_add_minimal(&mut builder, 2, 1);
		}
		let tnfa: Box<Tnfa> = unsafe { tnfa_match_builder_build(builder) }.unwrap();
		assert_eq!(unsafe { tnfa_match_num_tags(&tnfa) }, 3);

		let mut tags: [isize; 3] = [0; 3];
		assert_eq!(search(&tnfa, b"xaab!", &mut tags), (TnfaMatchStatus::Match, 2));
		assert_eq!(tags, [1, 1, 2]);
		assert_eq!(search(&tnfa, b"\xffa", &mut tags), (TnfaMatchStatus::Match, 2));
		assert_eq!(tags, [1, 1, 2]);
		assert_eq!(search(&tnfa, b"xyz", &mut tags).0, TnfaMatchStatus::NoMatch);
		assert_eq!(search(&tnfa, b"a", &mut tags[..2]).0, TnfaMatchStatus::InvalidArgument);
		unsafe { tnfa_match_delete(tnfa) };
	}

	#[test]
	fn description() {
		let tnfa: Box<Tnfa> = unsafe {
			tnfa_match_from_description(CStringView::from_utf8(
				"states 2\nfinal 1\ntags min max\ninit -> 0 tags(0)\n0 -> 1 'é' tags(1) eol",
			))
		}
		.unwrap();
		let mut tags: [isize; 2] = [0; 2];
		assert_eq!(search(&tnfa, "aé".as_bytes(), &mut tags), (TnfaMatchStatus::Match, 3));
		assert_eq!(tags, [1, 3]);

		let mut end: usize = 0;
		let status: TnfaMatchStatus = unsafe {
			tnfa_match_search(
				&tnfa,
				CStringView::from_utf8("é"),
				MatchFlags::NOT_EOL.bits(),
				0,
				&mut end,
				tags.as_mut_ptr(),
				tags.len(),
			)
		};
		assert_eq!(status, TnfaMatchStatus::NoMatch);
		let status: TnfaMatchStatus = unsafe {
			tnfa_match_search(
				&tnfa,
				CStringView::from_utf8("é"),
				0,
				1,
				&mut end,
				tags.as_mut_ptr(),
				tags.len(),
			)
		};
		assert_eq!(status, TnfaMatchStatus::OutOfMemory);

		assert!(unsafe { tnfa_match_from_description(CStringView::from_utf8("states 1\nfinal 2")) }.is_none());
		assert!(unsafe { tnfa_match_from_description(CStringView::from_bytes(b"\xff")) }.is_none());
	}
}
