use std::ops::Range;

use crate::parallel::Match;
use crate::tnfa::TagIdx;

/// Where a submatch boundary is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
	Tag(TagIdx),
	/// The end offset of the whole match.
	MatchEnd,
}

/// A capturing subexpression, described by the tags bounding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submatch {
	pub start: Endpoint,
	pub end: Endpoint,
	/// Enclosing submatches. A submatch that falls outside any of them is reported as unset.
	pub parents: Vec<usize>,
}

/// Submatch offsets of one match, indexed like [`crate::tnfa::Tnfa::submatches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
	spans: Vec<Option<Range<usize>>>,
}

impl Submatch {
	pub fn new(start: Endpoint, end: Endpoint) -> Self {
		Self {
			start,
			end,
			parents: Vec::new(),
		}
	}

	pub fn with_parents<I>(mut self, parents: I) -> Self
	where
		I: IntoIterator<Item = usize>,
	{
		self.parents.extend(parents);
		self
	}
}

impl Endpoint {
	fn resolve(self, found: &Match) -> Option<usize> {
		match self {
			Self::Tag(tag) => found.tags().get(tag.get()).copied().flatten(),
			Self::MatchEnd => Some(found.end()),
		}
	}
}

impl Captures {
	/// Reads every submatch's offsets out of a match's tags.
	///
	/// Submatches are visited in order, so a parent should come before its children: a child is checked
	/// against its parents' final spans, and an unset parent unsets all of its children.
	pub fn fill(submatches: &[Submatch], found: &Match) -> Self {
		let mut spans: Vec<Option<Range<usize>>> = submatches
			.iter()
			.map(|submatch| match (submatch.start.resolve(found), submatch.end.resolve(found)) {
				(Some(start), Some(end)) => Some(start..end),
				_ => None,
			})
			.collect::<Vec<_>>();

		for (i, submatch) in submatches.iter().enumerate() {
			let Some(span): Option<Range<usize>> = spans[i].clone() else {
				continue;
			};
			let inside_parents: bool = submatch.parents.iter().all(|&parent| {
				spans
					.get(parent)
					.and_then(Option::as_ref)
					.is_some_and(|outer| outer.start <= span.start && span.end <= outer.end)
			});
			if !inside_parents {
				trace!("submatch {i} at {span:?} lies outside its parents");
				spans[i] = None;
			}
		}

		Self { spans }
	}

	pub fn len(&self) -> usize {
		self.spans.len()
	}

	pub fn is_empty(&self) -> bool {
		self.spans.is_empty()
	}

	pub fn get(&self, i: usize) -> Option<Range<usize>> {
		self.spans.get(i).cloned().flatten()
	}

	pub fn iter(&self) -> impl Iterator<Item = Option<Range<usize>>> + '_ {
		self.spans.iter().cloned()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn tag(i: usize) -> Endpoint {
		Endpoint::Tag(TagIdx::new(i))
	}

	#[test]
	fn unset_endpoints() {
		let found: Match = Match::new(5, vec![Some(1), Some(2), None]);
		let submatches: Vec<Submatch> = vec![
			Submatch::new(tag(0), Endpoint::MatchEnd),
			Submatch::new(tag(1), tag(2)),
			Submatch::new(tag(2), tag(1)),
			Submatch::new(tag(0), tag(1)),
		];
		let captures: Captures = Captures::fill(&submatches, &found);
		assert_eq!(captures.len(), 4);
		assert_eq!(captures.get(0), Some(1..5));
		assert_eq!(captures.get(1), None);
		assert_eq!(captures.get(2), None);
		assert_eq!(captures.get(3), Some(1..2));
		assert_eq!(captures.get(4), None);
	}

	#[test]
	fn children_must_lie_inside_parents() {
		let found: Match = Match::new(6, vec![Some(1), Some(2), Some(4), Some(0), Some(3)]);
		let submatches: Vec<Submatch> = vec![
			Submatch::new(tag(0), Endpoint::MatchEnd),
			Submatch::new(tag(1), tag(2)).with_parents([0]),
			Submatch::new(tag(3), tag(4)).with_parents([0]),
			Submatch::new(tag(1), tag(4)).with_parents([0, 1]),
			Submatch::new(tag(1), tag(4)).with_parents([2]),
		];
		let captures: Captures = Captures::fill(&submatches, &found);
		assert_eq!(
			captures.iter().collect::<Vec<_>>(),
			vec![Some(1..6), Some(2..4), None, Some(2..3), None]
		);
	}
}
