//! Per-pattern ignore sets.

use crate::pattern::PatternList;

/// The ignore globs of each positive pattern, indexed by its position among positives.
///
/// A positive pattern ignores every global ignore, plus every negation that comes _after_ it in the
/// pattern list. Negations placed before a positive pattern don't apply to it: in
/// `["a/*", "!a/*.ext", "a/f.ext"]`, the first glob skips `.ext` files but the third still matches
/// `a/f.ext`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct IgnoreTable(Vec<Vec<String>>);

impl IgnoreTable {
	pub fn build(list: &PatternList, global: &[String]) -> Self {
		Self(
			list.positives
				.iter()
				.map(|positive| {
					global
						.iter()
						.cloned()
						.chain(
							list.negatives
								.iter()
								.filter(|negative| negative.index > positive.index)
								.map(|negative| negative.raw.clone()),
						)
						.collect()
				})
				.collect(),
		)
	}

	/// The ignore set for the positive at `position`; empty if out of range.
	pub fn get(&self, position: usize) -> &[String] {
		self.0.get(position).map_or(&[][..], Vec::as_slice)
	}
}
