use crate::assertion::MatchFlags;
use crate::config::Config;
use crate::input::Input;
use crate::parallel::Match;
use crate::parallel::MatchError;
use crate::parallel::RunStats;
use crate::parallel::simulate;
use crate::submatch::Captures;
use crate::tnfa::Tnfa;

/// Searches text with one automaton.
///
/// Cheap to create; holds no scratch memory between searches. Each search allocates its own, so a
/// `Matcher` may be shared between threads.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'t> {
	tnfa: &'t Tnfa,
	config: Config,
}

impl<'t> Matcher<'t> {
	pub fn new(tnfa: &'t Tnfa) -> Self {
		Self::with_config(tnfa, Config::new())
	}

	pub fn with_config(tnfa: &'t Tnfa, config: Config) -> Self {
		Self { tnfa, config }
	}

	pub fn tnfa(&self) -> &'t Tnfa {
		self.tnfa
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// The same matcher with different match flags.
	pub fn flags(self, flags: MatchFlags) -> Self {
		Self {
			tnfa: self.tnfa,
			config: self.config.flags(flags),
		}
	}

	/// The leftmost-longest match in `input`, if any.
	pub fn find<'i, I>(&self, input: I) -> Result<Option<Match>, MatchError>
	where
		I: Into<Input<'i>>,
	{
		self.find_at(input, 0)
	}

	/// Like [`Matcher::find`], starting at `offset` in input units.
	///
	/// Reported positions are still relative to the start of `input`, and the code point before `offset`
	/// is visible to assertions.
	pub fn find_at<'i, I>(&self, input: I, offset: usize) -> Result<Option<Match>, MatchError>
	where
		I: Into<Input<'i>>,
	{
		self.find_with_stats(input, offset).map(|(found, _)| found)
	}

	/// Like [`Matcher::find_at`], also reporting how much work the search did.
	pub fn find_with_stats<'i, I>(&self, input: I, offset: usize) -> Result<(Option<Match>, RunStats), MatchError>
	where
		I: Into<Input<'i>>,
	{
		simulate(self.tnfa, input.into(), offset, &self.config)
	}

	pub fn is_match<'i, I>(&self, input: I) -> Result<bool, MatchError>
	where
		I: Into<Input<'i>>,
	{
		Ok(self.find(input)?.is_some())
	}

	/// The submatches of the leftmost-longest match in `input`, if any.
	pub fn captures<'i, I>(&self, input: I) -> Result<Option<Captures>, MatchError>
	where
		I: Into<Input<'i>>,
	{
		self.captures_at(input, 0)
	}

	pub fn captures_at<'i, I>(&self, input: I, offset: usize) -> Result<Option<Captures>, MatchError>
	where
		I: Into<Input<'i>>,
	{
		let found: Option<Match> = self.find_at(input, offset)?;
		Ok(found.map(|found| Captures::fill(self.tnfa.submatches(), &found)))
	}
}
