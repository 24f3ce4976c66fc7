//! Parallel simulation of a tagged NFA.
//!
//! Every state reachable at the current position is kept in a reach set together with the tags of the one
//! path that got there. When two paths meet in the same state at the same position, the tag comparator keeps
//! exactly one of them, so a search touches each transition at most once per input position.
//!
//! - <https://laurikari.net/ville/spire2000-tnfa.pdf>

use crate::assertion::Boundary;
use crate::assertion::MatchFlags;
use crate::config::Config;
use crate::input::Cursor;
use crate::input::Input;
use crate::tags::TagBuf;
use crate::tags::TagDirection;
use crate::tags::TagPool;
use crate::tags::TagValue;
use crate::tags::tag_order;
use crate::tnfa::MinimalPair;
use crate::tnfa::StateIdx;
use crate::tnfa::Tnfa;
use crate::tnfa::Transition;

/// The leftmost-longest match found by a search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Match {
	end: usize,
	tags: Vec<Option<usize>>,
}

/// Counters describing the work done by one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
	/// Code points consumed.
	pub steps: usize,
	/// Transitions whose symbol range contained the consumed code point.
	pub transitions_examined: usize,
	/// Paths that replaced another path in the same state.
	pub merges: usize,
	/// Paths dropped because a lazy subexpression could only grow along them.
	pub pruned: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
	/// The scratch memory for the search could not be obtained.
	OutOfMemory { requested: usize },
	/// The search start is not a position of the input.
	InvalidStart { offset: usize },
}

impl std::fmt::Display for MatchError {
	fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::OutOfMemory { requested } => {
				write!(fmt, "out of memory: a search needs {requested} bytes of scratch space")
			},
			Self::InvalidStart { offset } => write!(fmt, "offset {offset} is not a position in the input"),
		}
	}
}

impl std::error::Error for MatchError {}

impl Match {
	pub fn new(end: usize, tags: Vec<Option<usize>>) -> Self {
		Self { end, tags }
	}

	/// Where the match begins: the position of tag 0. Unknown if the automaton has no tags.
	pub fn start(&self) -> Option<usize> {
		self.tags.first().copied().flatten()
	}

	pub fn end(&self) -> usize {
		self.end
	}

	pub fn tags(&self) -> &[Option<usize>] {
		&self.tags
	}
}

/// Finds the leftmost-longest match of `tnfa` in `input`.
///
/// `Ok(None)` means there is no match.
pub fn run(tnfa: &Tnfa, input: Input<'_>, flags: MatchFlags) -> Result<Option<Match>, MatchError> {
	let config: Config = Config::new().flags(flags);
	simulate(tnfa, input, 0, &config).map(|(found, _)| found)
}

#[derive(Debug, Clone, Copy)]
struct ReachEntry {
	state: StateIdx,
	tags: TagBuf,
}

/// The states reached at one position, at most one entry per state.
///
/// Every slot owns a tag buffer for the whole search, including slots past `len`.
/// Entries are filled by exchanging buffers with the caller instead of copying tags.
#[derive(Debug)]
struct ReachSet {
	entries: Vec<ReachEntry>,
	len: usize,
}

#[derive(Debug, Clone, Copy)]
struct Visit {
	/// Last position the state was added to a reach set at.
	pos: Option<usize>,
	/// The state's entry in that reach set.
	slot: usize,
}

/// All scratch memory of one search, obtained in one go before any input is read.
struct Arena {
	pool: TagPool,
	reach: ReachSet,
	reach_next: ReachSet,
	visits: Vec<Visit>,
	/// Buffer for tags of a path being extended.
	candidate: TagBuf,
	/// Tags of the best match so far.
	best: TagBuf,
}

impl ReachSet {
	fn is_empty(&self) -> bool {
		self.len == 0
	}

	fn clear(&mut self) {
		self.len = 0;
	}

	/// Appends `state`, handing it the tags in `*tags`. `*tags` receives the slot's previous buffer.
	fn push(&mut self, state: StateIdx, tags: &mut TagBuf) -> usize {
		let slot: usize = self.len;
		debug_assert!(slot < self.entries.len(), "a reach set holds each state at most once");
		let entry: &mut ReachEntry = &mut self.entries[slot];
		entry.state = state;
		std::mem::swap(&mut entry.tags, tags);
		self.len += 1;
		slot
	}

	/// Keeps the entries for which `keep` returns `true`, in order. Returns how many were dropped.
	fn retain<F>(&mut self, mut keep: F) -> usize
	where
		F: FnMut(&ReachEntry) -> bool,
	{
		let mut kept: usize = 0;
		for i in 0..self.len {
			if keep(&self.entries[i]) {
				self.entries.swap(kept, i);
				kept += 1;
			}
		}
		let dropped: usize = self.len - kept;
		self.len = kept;
		dropped
	}
}

impl Arena {
	fn try_new(tnfa: &Tnfa, memory_limit: Option<usize>) -> Result<Self, MatchError> {
		let states: usize = tnfa.num_states();
		// An automaton without tags still needs the start of each path.
		let width: usize = tnfa.num_tags().max(1);

		let Some((slots, buffers, requested)): Option<(usize, usize, usize)> = Self::size(states, width) else {
			return Err(MatchError::OutOfMemory { requested: usize::MAX });
		};
		debug!("arena for {states} states and {width} tags: {buffers} tag buffers, {requested} bytes");
		if memory_limit.is_some_and(|limit| requested > limit) {
			debug!("arena exceeds the memory limit of {memory_limit:?} bytes");
			return Err(MatchError::OutOfMemory { requested });
		}
		let out_of_memory = |_| MatchError::OutOfMemory { requested };

		let pool: TagPool = TagPool::try_new(buffers, width).map_err(out_of_memory)?;
		let mut handles = (0..buffers).map(|i| pool.buf(i));
		let mut reach_sets: [ReachSet; 2] = [
			ReachSet {
				entries: Vec::new(),
				len: 0,
			},
			ReachSet {
				entries: Vec::new(),
				len: 0,
			},
		];
		for reach_set in reach_sets.iter_mut() {
			reach_set.entries.try_reserve_exact(slots).map_err(out_of_memory)?;
			for tags in handles.by_ref().take(slots) {
				reach_set.entries.push(ReachEntry {
					state: StateIdx::new(0),
					tags,
				});
			}
		}
		let (candidate, best): (TagBuf, TagBuf) = match (handles.next(), handles.next()) {
			(Some(candidate), Some(best)) => (candidate, best),
			_ => return Err(MatchError::OutOfMemory { requested }),
		};

		let mut visits: Vec<Visit> = Vec::new();
		visits.try_reserve_exact(states).map_err(out_of_memory)?;
		visits.resize(states, Visit { pos: None, slot: 0 });

		let [reach, reach_next]: [ReachSet; 2] = reach_sets;
		Ok(Self {
			pool,
			reach,
			reach_next,
			visits,
			candidate,
			best,
		})
	}

	/// Slots per reach set, tag buffers, and total bytes; `None` on overflow.
	fn size(states: usize, width: usize) -> Option<(usize, usize, usize)> {
		let slots: usize = states.checked_add(1)?;
		let buffers: usize = slots.checked_mul(2)?.checked_add(2)?;
		let tag_bytes: usize = buffers.checked_mul(width)?.checked_mul(size_of::<TagValue>())?;
		let entry_bytes: usize = slots.checked_mul(2)?.checked_mul(size_of::<ReachEntry>())?;
		let visit_bytes: usize = states.checked_mul(size_of::<Visit>())?;
		let requested: usize = tag_bytes.checked_add(entry_bytes)?.checked_add(visit_bytes)?;
		Some((slots, buffers, requested))
	}
}

/// The search loop. Consumes one code point per iteration and never allocates.
pub(crate) fn simulate(
	tnfa: &Tnfa,
	input: Input<'_>,
	start: usize,
	config: &Config,
) -> Result<(Option<Match>, RunStats), MatchError> {
	let flags: MatchFlags = config.get_flags();
	let num_tags: usize = tnfa.num_tags();
	let final_state: StateIdx = tnfa.final_state();
	let minimal_tags: &[MinimalPair] = tnfa.minimal_tags();
	let case_insensitive: bool = tnfa.is_case_insensitive();
	// Without tags, slot 0 of every tag array holds the path's start, as tag 0 would.
	let directions: &[TagDirection] = if num_tags == 0 {
		&[TagDirection::Minimize]
	} else {
		tnfa.tag_directions()
	};

	let mut cursor: Cursor<'_> = Cursor::new(input, start)?;
	let Arena {
		mut pool,
		mut reach,
		mut reach_next,
		mut visits,
		mut candidate,
		best,
	} = Arena::try_new(tnfa, config.get_memory_limit())?;
	let mut stats: RunStats = RunStats::default();

	if config.get_first_symbol_skip() {
		if let Some(symbol) = tnfa.first_symbol() {
			let from: usize = cursor.pos();
			if !cursor.skip_to(symbol) {
				debug!("{symbol:?} does not occur after {from}, no match");
				return Ok((None, stats));
			}
			debug!("skipped from {from} to {} looking for {symbol:?}", cursor.pos());
		}
	}

	let mut best_end: Option<usize> = None;
	let mut new_match: bool = false;

	// Writes `pos` into the listed tags of the candidate buffer. Every tag written in one step shares the
	// step's generation.
	let set_tags = |pool: &mut TagPool, candidate: TagBuf, transition: &Transition, pos: usize, generation: u64| {
		let tags: &mut [TagValue] = pool.get_mut(candidate);
		for tag in transition.tags() {
			if let Some(value) = tags.get_mut(tag.get()) {
				*value = TagValue {
					position: Some(pos),
					generation,
				};
			}
		}
	};

	loop {
		let here: Boundary = cursor.boundary();
		let generation: u64 = stats.steps as u64;

		if best_end.is_none() {
			for transition in tnfa.initial() {
				let target: StateIdx = transition.target();
				if visits[target.get()].pos == Some(here.pos) || !here.satisfies(transition.assertions(), flags) {
					continue;
				}

				pool.reset(candidate);
				set_tags(&mut pool, candidate, transition, here.pos, generation);
				if num_tags == 0 {
					pool.get_mut(candidate)[0] = TagValue {
						position: Some(here.pos),
						generation,
					};
				}
				let slot: usize = reach_next.push(target, &mut candidate);
				visits[target.get()] = Visit {
					pos: Some(here.pos),
					slot,
				};

				if target == final_state {
					debug!("match from the initial state at {}", here.pos);
					best_end = Some(here.pos);
					new_match = true;
					pool.copy(reach_next.entries[slot].tags, best);
				}
			}
		} else if reach_next.is_empty() {
			break;
		}

		let Some(consumed): Option<char> = cursor.advance() else {
			break;
		};
		let here: Boundary = cursor.boundary();
		let pos: usize = here.pos;
		stats.steps += 1;
		let generation: u64 = stats.steps as u64;

		std::mem::swap(&mut reach, &mut reach_next);
		reach_next.clear();
		trace!("at {pos} after {consumed:?}: {} live paths", reach.len);

		if new_match && !minimal_tags.is_empty() {
			new_match = false;
			let dropped: usize = reach.retain(|entry| {
				let tags: &[TagValue] = pool.get(entry.tags);
				let best_tags: &[TagValue] = pool.get(best);
				!minimal_tags.iter().any(|pair| {
					tags[pair.start.get()].position == best_tags[pair.start.get()].position
						&& tags[pair.end.get()].position < best_tags[pair.end.get()].position
				})
			});
			if dropped > 0 {
				trace!("pruned {dropped} paths that extend a lazy subexpression");
			}
			stats.pruned += dropped;
		}

		for i in 0..reach.len {
			let ReachEntry { state, tags } = reach.entries[i];
			for transition in tnfa[state].candidates(consumed) {
				stats.transitions_examined += 1;
				if !here.satisfies(transition.assertions(), flags)
					|| !transition.accepts_class(consumed, case_insensitive)
				{
					continue;
				}

				pool.copy(tags, candidate);
				set_tags(&mut pool, candidate, transition, pos, generation);

				let target: StateIdx = transition.target();
				let visit: Visit = visits[target.get()];
				let accepted: TagBuf = if visit.pos != Some(pos) {
					let slot: usize = reach_next.push(target, &mut candidate);
					visits[target.get()] = Visit { pos: Some(pos), slot };
					reach_next.entries[slot].tags
				} else {
					let incumbent: TagBuf = reach_next.entries[visit.slot].tags;
					if !tag_order(directions, pool.get(candidate), pool.get(incumbent)) {
						continue;
					}
					trace!("path into {target:?} at {pos} replaces the previous one");
					stats.merges += 1;
					reach_next.entries[visit.slot].tags = candidate;
					candidate = incumbent;
					reach_next.entries[visit.slot].tags
				};

				if target != final_state {
					continue;
				}
				let improves: bool = match best_end {
					None => true,
					Some(_) => pool.get(accepted)[0].position <= pool.get(best)[0].position,
				};
				if improves {
					trace!("match ending at {pos}");
					best_end = Some(pos);
					new_match = true;
					pool.copy(accepted, best);
				}
			}
		}
	}

	let found: Option<Match> = best_end.map(|end| {
		let tags: Vec<Option<usize>> = pool.get(best).iter().take(num_tags).map(|tag| tag.position).collect::<Vec<_>>();
		Match::new(end, tags)
	});
	debug!("search finished: {found:?}, {stats:?}");
	Ok((found, stats))
}
