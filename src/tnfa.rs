use crate::assertion::Assertions;
use crate::assertion::CharClass;
use crate::interval_tree::Interval;
use crate::interval_tree::IntervalTree;
use crate::submatch::Endpoint;
use crate::submatch::Submatch;
use crate::tags::TagDirection;

/// A compiled tagged NFA.
///
/// Zero-width moves have already been folded into the transitions: `initial` holds every way into the
/// automaton from the start state, and each consuming transition leads straight to a state that is ready
/// to consume again. The automaton is never mutated by matching, so one instance can serve any number of
/// concurrent searches.
#[derive(Debug, Clone)]
pub struct Tnfa {
	states: Vec<TnfaState>,
	initial: Vec<Transition>,
	final_state: StateIdx,
	tag_directions: Vec<TagDirection>,
	minimal_tags: Vec<MinimalPair>,
	submatches: Vec<Submatch>,
	first_symbol: Option<char>,
	case_insensitive: bool,
}

#[derive(Debug, Clone)]
pub struct TnfaState {
	transitions: Vec<Transition>,
	/// Code point to indices into `transitions`, in declaration order.
	index: IntervalTree<Vec<usize>>,
}

#[derive(Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct StateIdx(usize);

#[derive(Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TagIdx(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
	target: StateIdx,
	/// Ignored for initial transitions.
	symbols: Interval,
	assertions: Assertions,
	class: Option<CharClass>,
	negated_classes: Vec<CharClass>,
	tags: Vec<TagIdx>,
}

/// A lazily quantified subexpression, bounded by an end tag and a start tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimalPair {
	pub end: TagIdx,
	pub start: TagIdx,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TnfaError {
	DanglingState { state: usize, states: usize },
	TagOutOfRange { tag: usize, tags: usize },
	NoFinalState,
	EmptyRange { start: u32, end: u32 },
	SubmatchOutOfRange { submatch: usize, submatches: usize },
	/// The state table could not be allocated.
	TooManyStates { states: usize },
}

impl std::fmt::Display for TnfaError {
	fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::DanglingState { state, states } => {
				write!(fmt, "state {state} does not exist (the automaton has {states} states)")
			},
			Self::TagOutOfRange { tag, tags } => {
				write!(fmt, "tag {tag} does not exist (the automaton has {tags} tags)")
			},
			Self::NoFinalState => write!(fmt, "no final state"),
			Self::EmptyRange { start, end } => write!(fmt, "empty symbol range {start:#x}-{end:#x}"),
			Self::SubmatchOutOfRange {
				submatch,
				submatches,
			} => write!(fmt, "submatch {submatch} does not exist (there are {submatches} submatches)"),
			Self::TooManyStates { states } => write!(fmt, "cannot allocate {states} states"),
		}
	}
}

impl std::error::Error for TnfaError {}

impl StateIdx {
	pub const fn new(i: usize) -> Self {
		Self(i)
	}

	pub const fn get(self) -> usize {
		self.0
	}
}

impl TagIdx {
	pub const fn new(i: usize) -> Self {
		Self(i)
	}

	pub const fn get(self) -> usize {
		self.0
	}
}

impl Transition {
	/// A transition consuming one code point from `symbols`.
	pub fn new(target: StateIdx, symbols: Interval) -> Self {
		Self {
			target,
			symbols,
			assertions: Assertions::empty(),
			class: None,
			negated_classes: Vec::new(),
			tags: Vec::new(),
		}
	}

	pub fn on_char(target: StateIdx, ch: char) -> Self {
		Self::new(target, Interval::single(u32::from(ch)))
	}

	/// A transition into the automaton from its start state.
	pub fn initial(target: StateIdx) -> Self {
		Self::new(target, Interval::all_chars())
	}

	pub fn with_tags<I>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = TagIdx>,
	{
		self.tags.extend(tags);
		self
	}

	pub fn with_assertions(mut self, assertions: Assertions) -> Self {
		self.assertions |= assertions;
		self
	}

	pub fn with_class(mut self, class: CharClass) -> Self {
		self.class = Some(class);
		self
	}

	pub fn with_negated_class(mut self, class: CharClass) -> Self {
		self.negated_classes.push(class);
		self
	}

	pub fn target(&self) -> StateIdx {
		self.target
	}

	pub fn symbols(&self) -> Interval {
		self.symbols
	}

	pub fn assertions(&self) -> Assertions {
		self.assertions
	}

	pub fn class(&self) -> Option<CharClass> {
		self.class
	}

	pub fn negated_classes(&self) -> &[CharClass] {
		&self.negated_classes
	}

	pub fn tags(&self) -> &[TagIdx] {
		&self.tags
	}

	fn has_class_checks(&self) -> bool {
		self.class.is_some() || !self.negated_classes.is_empty()
	}

	/// Whether the code point passes this transition's class requirements.
	pub fn accepts_class(&self, ch: char, case_insensitive: bool) -> bool {
		!self.has_class_checks()
			|| crate::assertion::classes_match(self.class, &self.negated_classes, ch, case_insensitive)
	}
}

impl TnfaState {
	pub fn transitions(&self) -> &[Transition] {
		&self.transitions
	}

	/// Transitions whose symbol range contains `ch`, in declaration order.
	pub fn candidates(&self, ch: char) -> impl Iterator<Item = &Transition> {
		self.index
			.lookup(u32::from(ch))
			.into_iter()
			.flatten()
			.map(|&i| &self.transitions[i])
	}
}

impl Tnfa {
	pub fn states(&self) -> &[TnfaState] {
		&self.states
	}

	pub fn num_states(&self) -> usize {
		self.states.len()
	}

	pub fn initial(&self) -> &[Transition] {
		&self.initial
	}

	pub fn final_state(&self) -> StateIdx {
		self.final_state
	}

	pub fn num_tags(&self) -> usize {
		self.tag_directions.len()
	}

	pub fn tag_directions(&self) -> &[TagDirection] {
		&self.tag_directions
	}

	pub fn minimal_tags(&self) -> &[MinimalPair] {
		&self.minimal_tags
	}

	pub fn submatches(&self) -> &[Submatch] {
		&self.submatches
	}

	/// The only code point any match can begin with, if there is exactly one and the empty string cannot
	/// match.
	pub fn first_symbol(&self) -> Option<char> {
		self.first_symbol
	}

	pub fn is_case_insensitive(&self) -> bool {
		self.case_insensitive
	}

	pub fn num_transitions(&self) -> usize {
		self.states.iter().map(|state| state.transitions.len()).sum::<usize>()
	}
}

impl std::ops::Index<StateIdx> for Tnfa {
	type Output = TnfaState;

	fn index(&self, i: StateIdx) -> &Self::Output {
		&self.states[i.0]
	}
}

/// Assembles a [`Tnfa`], checking that every state, tag and submatch it refers to exists.
///
/// States must be added before transitions mention them; tags and submatches are checked by
/// [`TnfaBuilder::build`].
#[derive(Debug, Default)]
pub struct TnfaBuilder {
	states: Vec<Vec<Transition>>,
	initial: Vec<Transition>,
	final_state: Option<StateIdx>,
	tag_directions: Vec<TagDirection>,
	minimal_tags: Vec<MinimalPair>,
	submatches: Vec<Submatch>,
	case_insensitive: bool,
}

impl TnfaBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_state(&mut self) -> StateIdx {
		self.states.push(Vec::new());
		StateIdx(self.states.len() - 1)
	}

	pub fn add_states(&mut self, n: usize) -> Result<(), TnfaError> {
		let states: usize = self.states.len().saturating_add(n);
		self.states.try_reserve(n).map_err(|_| TnfaError::TooManyStates { states })?;
		self.states.resize_with(states, Vec::new);
		Ok(())
	}

	pub fn num_states(&self) -> usize {
		self.states.len()
	}

	pub fn set_final(&mut self, state: StateIdx) -> Result<(), TnfaError> {
		self.check_state(state)?;
		self.final_state = Some(state);
		Ok(())
	}

	pub fn add_tag(&mut self, direction: TagDirection) -> TagIdx {
		self.tag_directions.push(direction);
		TagIdx(self.tag_directions.len() - 1)
	}

	pub fn add_minimal(&mut self, end: TagIdx, start: TagIdx) {
		self.minimal_tags.push(MinimalPair { end, start });
	}

	/// Returns the submatch's index.
	pub fn add_submatch(&mut self, submatch: Submatch) -> usize {
		self.submatches.push(submatch);
		self.submatches.len() - 1
	}

	pub fn set_case_insensitive(&mut self, case_insensitive: bool) {
		self.case_insensitive = case_insensitive;
	}

	pub fn add_initial(&mut self, transition: Transition) -> Result<(), TnfaError> {
		self.check_state(transition.target)?;
		self.initial.push(transition);
		Ok(())
	}

	pub fn add_transition(&mut self, from: StateIdx, transition: Transition) -> Result<(), TnfaError> {
		self.check_state(from)?;
		self.check_state(transition.target)?;
		self.states[from.0].push(transition);
		Ok(())
	}

	/// Adds copies of `transition` covering every code point outside `excluded`.
	pub fn add_excluding(
		&mut self,
		from: StateIdx,
		transition: Transition,
		excluded: &mut [Interval],
	) -> Result<(), TnfaError> {
		for symbols in Interval::complement(excluded, Interval::all_chars()) {
			self.add_transition(
				from,
				Transition {
					symbols,
					..transition.clone()
				},
			)?;
		}
		Ok(())
	}

	pub fn build(self) -> Result<Tnfa, TnfaError> {
		let final_state: StateIdx = self.final_state.ok_or(TnfaError::NoFinalState)?;

		let tags: usize = self.tag_directions.len();
		let check_tag = |tag: TagIdx| -> Result<(), TnfaError> {
			if tag.0 < tags {
				Ok(())
			} else {
				Err(TnfaError::TagOutOfRange { tag: tag.0, tags })
			}
		};
		for transition in self.initial.iter().chain(self.states.iter().flatten()) {
			for &tag in transition.tags.iter() {
				check_tag(tag)?;
			}
		}
		for pair in self.minimal_tags.iter() {
			check_tag(pair.end)?;
			check_tag(pair.start)?;
		}
		for submatch in self.submatches.iter() {
			for endpoint in [submatch.start, submatch.end] {
				if let Endpoint::Tag(tag) = endpoint {
					check_tag(tag)?;
				}
			}
			for &parent in submatch.parents.iter() {
				if parent >= self.submatches.len() {
					return Err(TnfaError::SubmatchOutOfRange {
						submatch: parent,
						submatches: self.submatches.len(),
					});
				}
			}
		}

		let states: Vec<TnfaState> = self
			.states
			.into_iter()
			.map(|transitions| {
				let index: IntervalTree<Vec<usize>> = IntervalTree::from_overlapping(
					transitions.iter().enumerate().map(|(i, transition)| (transition.symbols, i)),
					|indices: &mut Vec<usize>, i: &usize| indices.push(*i),
				);
				TnfaState { transitions, index }
			})
			.collect::<Vec<_>>();
		let first_symbol: Option<char> = find_first_symbol(&states, &self.initial, final_state);

		debug!(
			"built automaton: {} states, {} initial transitions, {tags} tags, first symbol {first_symbol:?}",
			states.len(),
			self.initial.len()
		);

		Ok(Tnfa {
			states,
			initial: self.initial,
			final_state,
			tag_directions: self.tag_directions,
			minimal_tags: self.minimal_tags,
			submatches: self.submatches,
			first_symbol,
			case_insensitive: self.case_insensitive,
		})
	}

	fn check_state(&self, state: StateIdx) -> Result<(), TnfaError> {
		if state.0 < self.states.len() {
			Ok(())
		} else {
			Err(TnfaError::DanglingState {
				state: state.0,
				states: self.states.len(),
			})
		}
	}
}

/// A match must begin with the consuming transitions out of the initial targets. If those all consume the
/// same single code point, and no initial target already accepts, then that code point starts every match.
fn find_first_symbol(states: &[TnfaState], initial: &[Transition], final_state: StateIdx) -> Option<char> {
	if initial.is_empty() {
		return None;
	}
	let mut symbol: Option<u32> = None;
	for transition in initial.iter() {
		if transition.target == final_state {
			return None;
		}
		for next in states[transition.target.0].transitions.iter() {
			let point: u32 = next.symbols.as_single()?;
			if *symbol.get_or_insert(point) != point {
				return None;
			}
		}
	}
	char::from_u32(symbol?)
}
