//! Pattern lists: raw entries, their classification into positive and negative globs.

use std::{
	ffi::OsString,
	path::{Path, PathBuf},
};

use serde_json::Value;
use tracing::trace;

use crate::{error::CreateError, paths::syntax};

/// Whether a pattern includes or excludes paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
	/// The pattern contributes matches.
	Positive,

	/// The pattern (written with a leading `!`) excludes matches of earlier positive patterns.
	Negative,
}

/// A classified pattern.
///
/// The `raw` glob never contains the leading `!` of a negation: that's recorded in `sign`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatternEntry {
	/// The glob, as given (minus any negation marker).
	pub raw: String,

	/// Whether this includes or excludes.
	pub sign: Sign,

	/// The position of the entry in the pattern list.
	pub index: usize,
}

impl PatternEntry {
	/// Classify a glob string, stripping a leading `!` into a [`Sign::Negative`].
	pub fn parse(glob: &str, index: usize) -> Self {
		match glob.strip_prefix('!') {
			Some(raw) => Self {
				raw: raw.into(),
				sign: Sign::Negative,
				index,
			},
			None => Self {
				raw: glob.into(),
				sign: Sign::Positive,
				index,
			},
		}
	}

	/// A positive entry for this glob.
	pub fn positive(raw: impl Into<String>) -> Self {
		Self {
			raw: raw.into(),
			sign: Sign::Positive,
			index: 0,
		}
	}

	/// A negative entry for this glob.
	///
	/// The glob should not include the `!` marker.
	pub fn negative(raw: impl Into<String>) -> Self {
		Self {
			raw: raw.into(),
			sign: Sign::Negative,
			index: 0,
		}
	}

	/// Whether this is a positive pattern.
	#[must_use]
	pub fn is_positive(&self) -> bool {
		self.sign == Sign::Positive
	}

	/// Whether this pattern is singular: it has neither wildcards nor brace alternations.
	///
	/// A singular pattern names exactly one path, so matching nothing is an error (unless the
	/// stream allows empty results). Braces always make a pattern plural, even if they would only
	/// expand to one alternative.
	#[must_use]
	pub fn is_singular(&self) -> bool {
		!syntax(&self.raw).is_magic()
	}
}

/// One entry of a pattern list, before classification.
///
/// This is mostly built through its `From` implementations. Values which can't be globs (numbers,
/// objects, non-UTF-8 strings...) are kept as [`RawPattern::Unsupported`] so that they can be
/// reported with their position when the list is classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawPattern {
	/// A glob string, possibly negated with a leading `!`.
	Glob(String),

	/// An already-classified entry. Its `index` is replaced by its position in the list.
	Entry(PatternEntry),

	/// Something that isn't a glob, described by its kind.
	Unsupported(&'static str),
}

impl From<&str> for RawPattern {
	fn from(glob: &str) -> Self {
		Self::Glob(glob.into())
	}
}

impl From<String> for RawPattern {
	fn from(glob: String) -> Self {
		Self::Glob(glob)
	}
}

impl From<&String> for RawPattern {
	fn from(glob: &String) -> Self {
		Self::Glob(glob.clone())
	}
}

impl From<PatternEntry> for RawPattern {
	fn from(entry: PatternEntry) -> Self {
		Self::Entry(entry)
	}
}

impl From<OsString> for RawPattern {
	fn from(glob: OsString) -> Self {
		match glob.into_string() {
			Ok(glob) => Self::Glob(glob),
			Err(_) => Self::Unsupported("non-UTF-8 string"),
		}
	}
}

impl From<&Path> for RawPattern {
	fn from(glob: &Path) -> Self {
		match glob.to_str() {
			Some(glob) => Self::Glob(glob.into()),
			None => Self::Unsupported("non-UTF-8 path"),
		}
	}
}

impl From<PathBuf> for RawPattern {
	fn from(glob: PathBuf) -> Self {
		glob.into_os_string().into()
	}
}

impl From<Value> for RawPattern {
	fn from(value: Value) -> Self {
		match value {
			Value::String(glob) => Self::Glob(glob),
			Value::Null => Self::Unsupported("null"),
			Value::Bool(_) => Self::Unsupported("boolean"),
			Value::Number(_) => Self::Unsupported("number"),
			Value::Array(_) => Self::Unsupported("array"),
			Value::Object(_) => Self::Unsupported("object"),
		}
	}
}

/// An ordered list of raw patterns.
///
/// Build it from a single glob, a `Vec` or array of globs, or a JSON value (a string or an array
/// of strings) read from configuration:
///
/// ```
/// use glob_stream::Patterns;
///
/// let one = Patterns::from("src/**/*.rs");
/// let many = Patterns::from(["src/**/*.rs", "!src/generated/**"]);
/// let json = Patterns::from(serde_json::json!(["src/**/*.rs", "!src/generated/**"]));
/// assert_eq!(many, json);
/// # let _ = one;
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Patterns(pub Vec<RawPattern>);

impl Patterns {
	/// The number of raw entries.
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether there are no entries at all.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<RawPattern> for Patterns {
	fn from(pattern: RawPattern) -> Self {
		Self(vec![pattern])
	}
}

impl From<&str> for Patterns {
	fn from(glob: &str) -> Self {
		RawPattern::from(glob).into()
	}
}

impl From<String> for Patterns {
	fn from(glob: String) -> Self {
		RawPattern::from(glob).into()
	}
}

impl From<PatternEntry> for Patterns {
	fn from(entry: PatternEntry) -> Self {
		RawPattern::from(entry).into()
	}
}

impl From<PathBuf> for Patterns {
	fn from(glob: PathBuf) -> Self {
		RawPattern::from(glob).into()
	}
}

impl<T: Into<RawPattern>> From<Vec<T>> for Patterns {
	fn from(patterns: Vec<T>) -> Self {
		patterns.into_iter().collect()
	}
}

impl<T: Into<RawPattern>, const N: usize> From<[T; N]> for Patterns {
	fn from(patterns: [T; N]) -> Self {
		patterns.into_iter().collect()
	}
}

impl From<Value> for Patterns {
	fn from(value: Value) -> Self {
		match value {
			Value::Array(values) => values.into_iter().collect(),
			other => RawPattern::from(other).into(),
		}
	}
}

impl<T: Into<RawPattern>> FromIterator<T> for Patterns {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		Self(iter.into_iter().map(Into::into).collect())
	}
}

/// A pattern list split by sign, in input order.
///
/// There is always at least one positive pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PatternList {
	pub positives: Vec<PatternEntry>,
	pub negatives: Vec<PatternEntry>,
}

impl PatternList {
	/// Validate and classify raw patterns.
	///
	/// Every entry is checked before the positive count, so that an invalid entry is reported
	/// even in a list with no positive globs.
	pub fn classify(patterns: Patterns) -> Result<Self, CreateError> {
		let mut positives = Vec::new();
		let mut negatives = Vec::new();

		for (index, pattern) in patterns.0.into_iter().enumerate() {
			let entry = match pattern {
				RawPattern::Glob(glob) if glob.is_empty() => {
					return Err(CreateError::InvalidEntry {
						index,
						kind: "empty string",
					});
				}
				RawPattern::Glob(glob) => PatternEntry::parse(&glob, index),
				RawPattern::Entry(entry) => PatternEntry { index, ..entry },
				RawPattern::Unsupported(kind) => {
					return Err(CreateError::InvalidEntry { index, kind });
				}
			};

			trace!(?entry, "classified pattern");
			match entry.sign {
				Sign::Positive => positives.push(entry),
				Sign::Negative => negatives.push(entry),
			}
		}

		if positives.is_empty() {
			return Err(CreateError::MissingPositiveGlob);
		}

		Ok(Self {
			positives,
			negatives,
		})
	}
}
