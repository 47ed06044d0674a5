//! Configuration for [`GlobStream`](crate::GlobStream).

use std::path::PathBuf;

use serde::Deserialize;

/// Options for building a [`GlobStream`](crate::GlobStream).
///
/// All fields are public, but the builder methods are usually more convenient:
///
/// ```
/// use glob_stream::StreamOptions;
///
/// let options = StreamOptions::default()
/// 	.cwd("/srv/site")
/// 	.dot(true)
/// 	.ignore(["**/node_modules/**"]);
/// # assert!(options.dot);
/// ```
///
/// Options can also be read from configuration. Keys are camelCased, and missing keys take their
/// default value:
///
/// ```
/// use glob_stream::StreamOptions;
///
/// let options: StreamOptions = serde_json::from_str(r#"{ "allowEmpty": true, "objectMode": false }"#).unwrap();
/// assert!(options.allow_empty);
/// assert!(!options.object_mode);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamOptions {
	/// The directory relative globs are resolved from.
	///
	/// Defaults to the process working directory. A relative value is resolved from the process
	/// working directory.
	pub cwd: Option<PathBuf>,

	/// Where globs starting with `/` are resolved from, instead of the filesystem root.
	pub root: Option<PathBuf>,

	/// An explicit `base` for every record, instead of each glob's parent directory.
	pub base: Option<PathBuf>,

	/// Use the `cwd` as the `base` of every record.
	///
	/// This takes precedence over `base`.
	pub cwdbase: bool,

	/// Let wildcards match files and directories whose name starts with a dot.
	pub dot: bool,

	/// Don't error when a singular glob (one without wildcards or braces) matches nothing.
	pub allow_empty: bool,

	/// Globs to ignore for every positive pattern, in addition to negated patterns.
	///
	/// These are resolved like patterns are, relative to `cwd`.
	pub ignore: Vec<String>,

	/// Whether the stream carries file records (the default), or only raw byte payloads.
	///
	/// With this set to false, any file record going through the stream is an error.
	pub object_mode: bool,
}

impl Default for StreamOptions {
	fn default() -> Self {
		Self {
			cwd: None,
			root: None,
			base: None,
			cwdbase: false,
			dot: false,
			allow_empty: false,
			ignore: Vec::new(),
			object_mode: true,
		}
	}
}

impl StreamOptions {
	/// Set the directory relative globs are resolved from.
	#[must_use]
	pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
		self.cwd = Some(cwd.into());
		self
	}

	/// Set the directory globs starting with `/` are resolved from.
	#[must_use]
	pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
		self.root = Some(root.into());
		self
	}

	/// Set an explicit base for every record.
	#[must_use]
	pub fn base(mut self, base: impl Into<PathBuf>) -> Self {
		self.base = Some(base.into());
		self
	}

	/// Use the cwd as the base of every record.
	#[must_use]
	pub const fn cwdbase(mut self, cwdbase: bool) -> Self {
		self.cwdbase = cwdbase;
		self
	}

	/// Let wildcards match dot-files.
	#[must_use]
	pub const fn dot(mut self, dot: bool) -> Self {
		self.dot = dot;
		self
	}

	/// Don't error when a singular glob matches nothing.
	#[must_use]
	pub const fn allow_empty(mut self, allow_empty: bool) -> Self {
		self.allow_empty = allow_empty;
		self
	}

	/// Add globs to ignore for every pattern.
	#[must_use]
	pub fn ignore<I, S>(mut self, ignore: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.ignore.extend(ignore.into_iter().map(Into::into));
		self
	}

	/// Set whether the stream carries records or raw payloads.
	#[must_use]
	pub const fn object_mode(mut self, object_mode: bool) -> Self {
		self.object_mode = object_mode;
		self
	}
}
