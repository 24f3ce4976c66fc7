use std::cmp::Ordering;
use std::collections::TryReserveError;

/// The value of one tag along one path.
///
/// `generation` is the step of the matching call that wrote the tag. Every tag written during one step
/// shares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagValue {
	pub position: Option<usize>,
	pub generation: u64,
}

/// Which of two differing positions a tag prefers when paths compete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagDirection {
	/// Smaller position wins. Unset is smaller than every position.
	Minimize,
	/// Larger position wins.
	Maximize,
}

#[derive(Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct TagBuf(usize);

/// Fixed-width tag arrays stored back to back, addressed by [`TagBuf`] handles.
///
/// All arrays are allocated up front; nothing grows afterwards.
#[derive(Debug)]
pub struct TagPool {
	values: Vec<TagValue>,
	width: usize,
	buffers: usize,
}

impl TagValue {
	pub const UNSET: Self = Self {
		position: None,
		generation: 0,
	};

	pub fn is_set(&self) -> bool {
		self.position.is_some()
	}
}

impl Default for TagValue {
	fn default() -> Self {
		Self::UNSET
	}
}

impl TagDirection {
	/// Whether `candidate` beats `incumbent` under this direction.
	/// Equal values never win.
	pub fn prefers<T: Ord>(self, candidate: &T, incumbent: &T) -> bool {
		match (self, candidate.cmp(incumbent)) {
			(Self::Minimize, Ordering::Less) => true,
			(Self::Maximize, Ordering::Greater) => true,
			_ => false,
		}
	}
}

/// Does the `candidate` tag array win over the `incumbent` one?
///
/// Tags are compared in index order and the first tag whose positions differ decides, following its direction.
/// If every position agrees, generations are compared the same way.
/// A complete tie is not a win, so the path that reached the state first keeps it.
///
/// The search stamps each step's tags with one generation, which makes generations follow positions there.
/// Two paths whose positions all agree then tie completely, whatever the directions.
pub fn tag_order(directions: &[TagDirection], candidate: &[TagValue], incumbent: &[TagValue]) -> bool {
	debug_assert_eq!(candidate.len(), directions.len());
	debug_assert_eq!(incumbent.len(), directions.len());

	let triples = || std::iter::zip(directions.iter(), std::iter::zip(candidate.iter(), incumbent.iter()));

	for (direction, (new, old)) in triples() {
		if new.position != old.position {
			return direction.prefers(&new.position, &old.position);
		}
	}
	for (direction, (new, old)) in triples() {
		if new.generation != old.generation {
			return direction.prefers(&new.generation, &old.generation);
		}
	}
	false
}

impl TagPool {
	/// Allocates `buffers` arrays of `width` tags each, all unset.
	pub fn try_new(buffers: usize, width: usize) -> Result<Self, TryReserveError> {
		let total: usize = buffers.saturating_mul(width);
		let mut values: Vec<TagValue> = Vec::new();
		values.try_reserve_exact(total)?;
		values.resize(total, TagValue::UNSET);
		Ok(Self {
			values,
			width,
			buffers,
		})
	}

	pub fn width(&self) -> usize {
		self.width
	}

	pub fn buffers(&self) -> usize {
		self.buffers
	}

	/// Handle of the `i`-th array.
	pub fn buf(&self, i: usize) -> TagBuf {
		debug_assert!(i < self.buffers);
		TagBuf(i)
	}

	pub fn get(&self, buf: TagBuf) -> &[TagValue] {
		&self.values[self.range(buf)]
	}

	pub fn get_mut(&mut self, buf: TagBuf) -> &mut [TagValue] {
		let range: std::ops::Range<usize> = self.range(buf);
		&mut self.values[range]
	}

	pub fn copy(&mut self, from: TagBuf, to: TagBuf) {
		if from != to {
			let src: std::ops::Range<usize> = self.range(from);
			self.values.copy_within(src, to.0 * self.width);
		}
	}

	pub fn reset(&mut self, buf: TagBuf) {
		self.get_mut(buf).fill(TagValue::UNSET);
	}

	fn range(&self, buf: TagBuf) -> std::ops::Range<usize> {
		let start: usize = buf.0 * self.width;
		start..(start + self.width)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn at(position: usize, generation: u64) -> TagValue {
		TagValue {
			position: Some(position),
			generation,
		}
	}

	#[test]
	fn first_differing_tag_decides() {
		let directions: [TagDirection; 2] = [TagDirection::Minimize, TagDirection::Maximize];
		assert!(tag_order(&directions, &[at(1, 0), at(0, 0)], &[at(2, 0), at(9, 0)]));
		assert!(!tag_order(&directions, &[at(2, 0), at(9, 0)], &[at(1, 0), at(0, 0)]));
		assert!(tag_order(&directions, &[at(1, 0), at(5, 0)], &[at(1, 0), at(4, 0)]));
		assert!(!tag_order(&directions, &[at(1, 0), at(4, 0)], &[at(1, 0), at(5, 0)]));
	}

	#[test]
	fn unset_is_smallest() {
		let directions: [TagDirection; 1] = [TagDirection::Minimize];
		assert!(tag_order(&directions, &[TagValue::UNSET], &[at(0, 0)]));
		assert!(!tag_order(&directions, &[at(0, 0)], &[TagValue::UNSET]));

		let directions: [TagDirection; 1] = [TagDirection::Maximize];
		assert!(tag_order(&directions, &[at(0, 0)], &[TagValue::UNSET]));
	}

	#[test]
	fn generations_break_positional_ties() {
		let directions: [TagDirection; 2] = [TagDirection::Minimize, TagDirection::Maximize];
		assert!(tag_order(&directions, &[at(3, 1), at(3, 2)], &[at(3, 4), at(3, 2)]));
		assert!(tag_order(&directions, &[at(3, 4), at(3, 5)], &[at(3, 4), at(3, 2)]));
		// Positions outrank generations.
		assert!(!tag_order(&directions, &[at(4, 0), at(3, 0)], &[at(3, 9), at(3, 9)]));
	}

	#[test]
	fn ties_do_not_win() {
		let directions: [TagDirection; 2] = [TagDirection::Minimize, TagDirection::Maximize];
		let tags: [TagValue; 2] = [at(1, 1), TagValue::UNSET];
		assert!(!tag_order(&directions, &tags, &tags));
		assert!(!tag_order(&[], &[], &[]));
	}

	#[test]
	fn pool() {
		let mut pool: TagPool = TagPool::try_new(3, 2).unwrap();
		let (a, b, c): (TagBuf, TagBuf, TagBuf) = (pool.buf(0), pool.buf(1), pool.buf(2));
		pool.get_mut(a)[1] = at(7, 3);
		pool.copy(a, c);
		assert_eq!(pool.get(c), &[TagValue::UNSET, at(7, 3)]);
		assert_eq!(pool.get(b), &[TagValue::UNSET, TagValue::UNSET]);
		pool.reset(a);
		assert_eq!(pool.get(a), &[TagValue::UNSET, TagValue::UNSET]);
		assert_eq!(pool.get(c)[1], at(7, 3));

		let empty: TagPool = TagPool::try_new(4, 0).unwrap();
		assert!(empty.get(empty.buf(3)).is_empty());
	}
}
