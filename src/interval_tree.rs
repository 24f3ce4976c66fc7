/// An inclusive range of code points.
#[derive(Debug, Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub struct Interval {
	start: u32,
	end: u32,
}

/// Disjoint, sorted intervals, each mapped to a value.
///
/// Built once from possibly overlapping entries (see [`IntervalTree::from_overlapping`]);
/// afterwards a lookup is a single binary search.
#[derive(Debug, Clone)]
pub struct IntervalTree<V> {
	intervals: Vec<(Interval, V)>,
}

impl Interval {
	pub fn new(start: u32, end: u32) -> Self {
		assert!(start <= end, "interval start {start} is past its end {end}");
		Self { start, end }
	}

	pub fn try_new(start: u32, end: u32) -> Option<Self> {
		(start <= end).then_some(Self { start, end })
	}

	pub fn single(point: u32) -> Self {
		Self {
			start: point,
			end: point,
		}
	}

	/// Every Unicode scalar value.
	pub fn all_chars() -> Self {
		Self {
			start: 0,
			end: u32::from(char::MAX),
		}
	}

	pub fn start(&self) -> u32 {
		self.start
	}

	pub fn end(&self) -> u32 {
		self.end
	}

	pub fn contains(&self, point: u32) -> bool {
		(self.start <= point) && (point <= self.end)
	}

	pub fn covers(&self, other: &Interval) -> bool {
		(self.start <= other.start) && (other.end <= self.end)
	}

	/// The code point, if this interval holds exactly one.
	pub fn as_single(&self) -> Option<u32> {
		(self.start == self.end).then_some(self.start)
	}

	/// The parts of `within` not covered by any of `intervals`.
	///
	/// `intervals` may overlap and come in any order; they are sorted in place.
	pub fn complement(intervals: &mut [Interval], within: Interval) -> Vec<Interval> {
		intervals.sort_unstable();

		let mut complement: Vec<Interval> = Vec::new();
		let mut pos: u32 = within.start;
		for &Interval { start, end } in intervals.iter() {
			if end < pos {
				continue;
			}
			if start > within.end {
				break;
			}
			if pos < start {
				complement.push(Interval::new(pos, start - 1));
			}
			if end >= within.end {
				return complement;
			}
			pos = end + 1;
		}

		complement.push(Interval::new(pos, within.end));
		complement
	}
}

impl<V> IntervalTree<V> {
	pub const fn new() -> Self {
		Self { intervals: Vec::new() }
	}

	pub fn len(&self) -> usize {
		self.intervals.len()
	}

	pub fn is_empty(&self) -> bool {
		self.intervals.is_empty()
	}

	pub fn lookup(&self, point: u32) -> Option<&V> {
		// `partition_point` assumes partitioning as `[true, ..., false]` and returns the index of the first `false`,
		// i.e. the first interval that does not end before `point`.
		let index: usize = self.intervals.partition_point(|(interval, _)| interval.end < point);
		match self.intervals.get(index) {
			Some((interval, value)) if interval.start <= point => Some(value),
			_ => None,
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = (Interval, &V)> {
		self.intervals.iter().map(|(interval, value)| (*interval, value))
	}
}

impl<V> IntervalTree<V>
where
	V: Default + PartialEq,
{
	/// Splits overlapping `entries` into disjoint pieces.
	///
	/// A piece maps to `V::default()` folded with `merge` over every entry covering it, in entry order.
	/// Code points covered by no entry are absent from the tree.
	/// Adjacent pieces that end up with equal values are coalesced.
	pub fn from_overlapping<T, I, Merge>(entries: I, mut merge: Merge) -> Self
	where
		I: IntoIterator<Item = (Interval, T)>,
		Merge: FnMut(&mut V, &T),
	{
		let entries: Vec<(Interval, T)> = entries.into_iter().collect::<Vec<_>>();

		// Every piece starts at some entry's start or right after some entry's end.
		let mut cuts: Vec<u32> = Vec::with_capacity(2 * entries.len());
		for (interval, _) in entries.iter() {
			cuts.push(interval.start);
			if let Some(after) = interval.end.checked_add(1) {
				cuts.push(after);
			}
		}
		cuts.sort_unstable();
		cuts.dedup();

		let mut intervals: Vec<(Interval, V)> = Vec::new();
		for (i, &start) in cuts.iter().enumerate() {
			let end: u32 = match cuts.get(i + 1) {
				Some(&next) => next - 1,
				None => u32::MAX,
			};
			let piece: Interval = Interval::new(start, end);

			let mut maybe_value: Option<V> = None;
			for (interval, item) in entries.iter() {
				if interval.covers(&piece) {
					merge(maybe_value.get_or_insert_with(V::default), item);
				}
			}
			let Some(value): Option<V> = maybe_value else {
				continue;
			};

			if let Some((last, last_value)) = intervals.last_mut() {
				if last.end.checked_add(1) == Some(start) && *last_value == value {
					last.end = end;
					continue;
				}
			}
			intervals.push((piece, value));
		}

		Self { intervals }
	}
}

impl<V> Default for IntervalTree<V> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn push(values: &mut Vec<u32>, item: &u32) {
		values.push(*item);
	}

	#[test]
	fn overlapping_entries_are_split() {
		let tree: IntervalTree<Vec<u32>> = IntervalTree::from_overlapping(
			[
				(Interval::new(0, 10), 0),
				(Interval::new(5, 15), 1),
				(Interval::single(15), 2),
			],
			push,
		);
		assert_eq!(tree.len(), 4);
		assert_eq!(tree.lookup(3), Some(&vec![0]));
		assert_eq!(tree.lookup(4), Some(&vec![0]));
		assert_eq!(tree.lookup(5), Some(&vec![0, 1]));
		assert_eq!(tree.lookup(10), Some(&vec![0, 1]));
		assert_eq!(tree.lookup(12), Some(&vec![1]));
		assert_eq!(tree.lookup(15), Some(&vec![1, 2]));
		assert_eq!(tree.lookup(16), None);
	}

	#[test]
	fn values_keep_entry_order() {
		let tree: IntervalTree<Vec<u32>> = IntervalTree::from_overlapping(
			[
				(Interval::new(u32::from('a'), u32::from('z')), 0),
				(Interval::single(u32::from('q')), 1),
				(Interval::new(u32::from('a'), u32::from('z')), 2),
			],
			push,
		);
		assert_eq!(tree.lookup(u32::from('q')), Some(&vec![0, 1, 2]));
		assert_eq!(tree.lookup(u32::from('b')), Some(&vec![0, 2]));
		assert_eq!(tree.lookup(u32::from('A')), None);
	}

	#[test]
	fn equal_neighbours_coalesce() {
		let tree: IntervalTree<Vec<u32>> = IntervalTree::from_overlapping(
			[
				(Interval::new(0, 4), 7),
				(Interval::new(5, 9), 7),
				(Interval::new(20, u32::MAX), 8),
			],
			|values: &mut Vec<u32>, item: &u32| {
				if !values.contains(item) {
					values.push(*item);
				}
			},
		);
		assert_eq!(tree.len(), 2);
		assert_eq!(tree.lookup(9), Some(&vec![7]));
		assert_eq!(tree.lookup(10), None);
		assert_eq!(tree.lookup(u32::MAX), Some(&vec![8]));
	}

	#[test]
	fn empty_tree() {
		let tree: IntervalTree<Vec<u32>> = IntervalTree::from_overlapping(Vec::<(Interval, u32)>::new(), push);
		assert!(tree.is_empty());
		assert_eq!(tree.lookup(0), None);
	}

	#[test]
	fn complement() {
		{
			let intervals: &mut [Interval] = &mut [
				Interval::new(10, 15),
				Interval::new(25, 40),
				Interval::new(20, 30),
			];
			let complement: Vec<Interval> = Interval::complement(intervals, Interval::new(0, 100));
			assert_eq!(
				complement,
				vec![Interval::new(0, 9), Interval::new(16, 19), Interval::new(41, 100)]
			);
		}
		{
			let intervals: &mut [Interval] = &mut [Interval::new(0, 5), Interval::new(90, 200)];
			let complement: Vec<Interval> = Interval::complement(intervals, Interval::new(3, 100));
			assert_eq!(complement, vec![Interval::new(6, 89)]);
		}
		{
			let complement: Vec<Interval> = Interval::complement(&mut [], Interval::all_chars());
			assert_eq!(complement, vec![Interval::all_chars()]);
		}
	}
}
