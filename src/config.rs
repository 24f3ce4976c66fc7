use crate::assertion::MatchFlags;

/// Knobs for a [`crate::matcher::Matcher`].
///
/// Every field is optional so that "not set" can be told apart from "set to the default";
/// [`Config::overwrite`] relies on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
	flags: Option<MatchFlags>,
	memory_limit: Option<Option<usize>>,
	first_symbol_skip: Option<bool>,
}

impl Config {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn flags(mut self, flags: MatchFlags) -> Self {
		self.flags = Some(flags);
		self
	}

	/// Upper bound, in bytes, on the scratch memory one search may allocate.
	/// A search that would need more fails with [`crate::parallel::MatchError::OutOfMemory`] before reading
	/// any input.
	pub fn memory_limit(mut self, bytes: Option<usize>) -> Self {
		self.memory_limit = Some(bytes);
		self
	}

	/// Whether to jump ahead to the first occurrence of the automaton's first symbol before searching.
	pub fn first_symbol_skip(mut self, yes: bool) -> Self {
		self.first_symbol_skip = Some(yes);
		self
	}

	pub fn get_flags(&self) -> MatchFlags {
		self.flags.unwrap_or_default()
	}

	pub fn get_memory_limit(&self) -> Option<usize> {
		self.memory_limit.unwrap_or(None)
	}

	pub fn get_first_symbol_skip(&self) -> bool {
		self.first_symbol_skip.unwrap_or(true)
	}

	/// Options set in `other` take precedence.
	pub fn overwrite(self, other: Config) -> Config {
		Config {
			flags: other.flags.or(self.flags),
			memory_limit: other.memory_limit.or(self.memory_limit),
			first_symbol_skip: other.first_symbol_skip.or(self.first_symbol_skip),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn defaults() {
		let config: Config = Config::new();
		assert_eq!(config.get_flags(), MatchFlags::empty());
		assert_eq!(config.get_memory_limit(), None);
		assert!(config.get_first_symbol_skip());
	}

	#[test]
	fn overwrite_keeps_unset_options() {
		let base: Config = Config::new().memory_limit(Some(64)).first_symbol_skip(false);
		let call: Config = Config::new().flags(MatchFlags::NOT_BOL);
		let merged: Config = base.overwrite(call);
		assert_eq!(merged.get_flags(), MatchFlags::NOT_BOL);
		assert_eq!(merged.get_memory_limit(), Some(64));
		assert!(!merged.get_first_symbol_skip());

		let lifted: Config = merged.overwrite(Config::new().memory_limit(None));
		assert_eq!(lifted.get_memory_limit(), None);
	}
}
