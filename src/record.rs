//! File records, and how they're made from matched paths.

use std::{
	env,
	path::{Path, PathBuf},
};

use normalize_path::NormalizePath;
use serde::{Deserialize, Serialize};

use crate::{
	error::CreateError,
	options::StreamOptions,
	paths::{glob_parent, resolve_glob},
};

/// A matched path, with the directories it is relative to.
///
/// All three paths are absolute. The `base` is the directory the path should be considered
/// relative to by consumers (e.g. to recreate a tree elsewhere): by default that's the glob's
/// parent directory, the part of the glob before any wildcard.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
	path: PathBuf,
	base: PathBuf,
	cwd: PathBuf,
}

impl FileRecord {
	/// Create a record from its parts.
	pub fn new(path: impl Into<PathBuf>, base: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			base: base.into(),
			cwd: cwd.into(),
		}
	}

	/// The matched path.
	#[must_use]
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// The base directory of the match.
	#[must_use]
	pub fn base(&self) -> &Path {
		&self.base
	}

	/// The working directory the match was made from.
	#[must_use]
	pub fn cwd(&self) -> &Path {
		&self.cwd
	}

	/// The path relative to the base, if it is inside it.
	#[must_use]
	pub fn relative(&self) -> Option<&Path> {
		self.path.strip_prefix(&self.base).ok()
	}

	/// Consume the record, keeping only its path.
	#[must_use]
	pub fn into_path(self) -> PathBuf {
		self.path
	}
}

/// Builds [`FileRecord`]s for one stream.
#[derive(Clone, Debug)]
pub(crate) struct RecordFactory {
	cwd: PathBuf,
	root: Option<PathBuf>,
	base: Option<PathBuf>,
	cwdbase: bool,
}

impl RecordFactory {
	/// Resolve the directories in the options.
	///
	/// Only reads the process working directory, and only if `cwd` is unset or relative.
	pub fn new(options: &StreamOptions) -> Result<Self, CreateError> {
		let cwd = match &options.cwd {
			Some(cwd) if cwd.is_absolute() => cwd.clone(),
			Some(cwd) => env::current_dir().map_err(CreateError::CurrentDir)?.join(cwd),
			None => env::current_dir().map_err(CreateError::CurrentDir)?,
		};
		let cwd = dunce::simplified(&cwd.normalize()).to_path_buf();

		let resolve = |path: &PathBuf| dunce::simplified(&cwd.join(path).normalize()).to_path_buf();
		let root = options.root.as_ref().map(resolve);
		let base = options.base.as_ref().map(resolve);

		Ok(Self {
			root,
			base,
			cwdbase: options.cwdbase,
			cwd,
		})
	}

	pub fn cwd(&self) -> &Path {
		&self.cwd
	}

	pub fn root(&self) -> Option<&Path> {
		self.root.as_deref()
	}

	/// Make a glob absolute, against the cwd or the root.
	pub fn resolve(&self, glob: &str) -> String {
		resolve_glob(glob, &self.cwd, self.root.as_deref())
	}

	/// The base of records matched by a resolved glob.
	///
	/// When neither `cwdbase` nor `base` are set, that's the glob parent with a trailing separator.
	pub fn glob_base(&self, resolved: &str) -> PathBuf {
		self.configured_base()
			.unwrap_or_else(|| PathBuf::from(glob_parent(resolved)).join(""))
	}

	/// The base of a record written in as a bare path: its parent directory by default.
	pub fn path_base(&self, path: &Path) -> PathBuf {
		self.configured_base().unwrap_or_else(|| {
			path.parent()
				.map_or_else(|| path.to_owned(), |parent| parent.join(""))
		})
	}

	fn configured_base(&self) -> Option<PathBuf> {
		if self.cwdbase {
			Some(self.cwd.clone())
		} else {
			self.base.clone()
		}
	}

	pub fn record(&self, path: PathBuf, base: PathBuf) -> FileRecord {
		FileRecord {
			path,
			base,
			cwd: self.cwd.clone(),
		}
	}

	/// Take in a record written by a producer, resolving its paths against the cwd if they're
	/// relative so that it deduplicates against matches.
	pub fn adopt(&self, record: FileRecord) -> FileRecord {
		let FileRecord { path, base, cwd } = record;
		let cwd = if cwd.as_os_str().is_empty() {
			self.cwd.clone()
		} else {
			self.absolute(cwd)
		};
		let path = if path.is_absolute() {
			path
		} else {
			cwd.join(path).normalize()
		};
		let base = if base.as_os_str().is_empty() {
			self.path_base(&path)
		} else if base.is_absolute() {
			base
		} else {
			cwd.join(base).normalize()
		};

		FileRecord { path, base, cwd }
	}

	fn absolute(&self, path: PathBuf) -> PathBuf {
		if path.is_absolute() {
			path
		} else {
			self.cwd.join(path).normalize()
		}
	}

	/// Make a record out of a bare path, resolving it against the cwd if it's relative.
	pub fn shape(&self, path: PathBuf) -> FileRecord {
		let path = self.absolute(path);
		let base = self.path_base(&path);
		self.record(path, base)
	}
}
