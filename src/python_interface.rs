use pyo3::buffer::PyBuffer;
use pyo3::exceptions::PyMemoryError;
use pyo3::exceptions::PyRuntimeError;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyBytes;
use pyo3::types::PyString;

use crate::assertion::MatchFlags;
use crate::input::Input;
use crate::matcher::Matcher;
use crate::parallel::Match;
use crate::parallel::MatchError;
use crate::submatch::Captures;
use crate::tnfa::Tnfa;

pyo3::create_exception!(tnfa_match, TnfaMatchException, PyRuntimeError);
pyo3::create_exception!(tnfa_match, TnfaMatchInvalidDescription, TnfaMatchException);

#[pyclass(frozen)]
#[derive(Debug)]
struct Automaton {
	tnfa: Tnfa,
}

#[pymethods]
impl Automaton {
	#[new]
	fn new(description: &str) -> PyResult<Self> {
		let tnfa: Tnfa = Tnfa::from_description(description)
			.map_err(|err| TnfaMatchInvalidDescription::new_err(format!("Invalid description: {err}")))?;
		Ok(Self { tnfa })
	}

	#[getter]
	fn num_tags(&self) -> usize {
		self.tnfa.num_tags()
	}

	/// `None`, or the end offset and the tag positions of the leftmost-longest match.
	#[pyo3(signature = (input, not_bol = false, not_eol = false, newline = false))]
	fn search(
		&self,
		input: &Bound<'_, PyAny>,
		not_bol: bool,
		not_eol: bool,
		newline: bool,
	) -> PyResult<Option<(usize, Vec<Option<usize>>)>> {
		let found: Option<Match> = self.find(input, flags(not_bol, not_eol, newline))?;
		Ok(found.map(|found| (found.end(), found.tags().to_vec())))
	}

	/// `None`, or one `(start, end)` pair per submatch, `None` for submatches that did not participate.
	#[pyo3(signature = (input, not_bol = false, not_eol = false, newline = false))]
	fn captures(
		&self,
		input: &Bound<'_, PyAny>,
		not_bol: bool,
		not_eol: bool,
		newline: bool,
	) -> PyResult<Option<Vec<Option<(usize, usize)>>>> {
		let found: Option<Match> = self.find(input, flags(not_bol, not_eol, newline))?;
		Ok(found.map(|found| {
			Captures::fill(self.tnfa.submatches(), &found)
				.iter()
				.map(|span| span.map(|span| (span.start, span.end)))
				.collect::<Vec<_>>()
		}))
	}
}

impl Automaton {
	/// `str` positions are byte offsets into its UTF-8 encoding; anything else exposing a byte buffer is
	/// read as ISO-8859-1.
	fn find(&self, input: &Bound<'_, PyAny>, flags: MatchFlags) -> PyResult<Option<Match>> {
		let matcher: Matcher<'_> = Matcher::new(&self.tnfa).flags(flags);
		let found: Result<Option<Match>, MatchError> = if let Ok(unicode) = input.cast::<PyString>() {
			matcher.find(Input::Utf8(unicode.to_str()?))
		} else if let Ok(bytes) = input.cast::<PyBytes>() {
			matcher.find(Input::Bytes(bytes.as_bytes()))
		} else {
			let buffer: PyBuffer<u8> = PyBuffer::<u8>::get(input)?;
			let mut bytes: Vec<u8> = vec![0; buffer.len_bytes()];
			buffer.copy_to_slice(input.py(), &mut bytes[..])?;
			matcher.find(Input::Bytes(&bytes[..]))
		};
		found.map_err(|err| match err {
			MatchError::OutOfMemory { .. } => PyMemoryError::new_err(err.to_string()),
			MatchError::InvalidStart { .. } => PyValueError::new_err(err.to_string()),
		})
	}
}

fn flags(not_bol: bool, not_eol: bool, newline: bool) -> MatchFlags {
	let mut flags: MatchFlags = MatchFlags::empty();
	if not_bol {
		flags |= MatchFlags::NOT_BOL;
	}
	if not_eol {
		flags |= MatchFlags::NOT_EOL;
	}
	if newline {
		flags |= MatchFlags::NEWLINE;
	}
	flags
}

#[pymodule]
mod tnfa_match {
	#[pymodule_export]
	use super::Automaton;
	#[pymodule_export]
	use super::TnfaMatchException;
	#[pymodule_export]
	use super::TnfaMatchInvalidDescription;
}
