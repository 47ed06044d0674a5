//! The glob matching collaborator.
//!
//! A [`GlobStream`](crate::GlobStream) doesn't match globs against the filesystem itself: it asks
//! a [`Matcher`] for the paths matching each of its positive globs, one glob at a time. The
//! default is [`WalkMatcher`], which walks the directory tree under each glob's parent.

use std::{
	fmt,
	io::ErrorKind,
	path::PathBuf,
	sync::Arc,
};

use futures::{
	future,
	stream::{self, BoxStream},
	StreamExt,
};
use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, trace, trace_span};
use walkdir::{DirEntry, WalkDir};

use crate::{
	error::MatcherError,
	paths::{glob_parent, glob_remainder, slashed, syntax},
};

/// A lazy stream of matched absolute paths.
pub type Matches = BoxStream<'static, Result<PathBuf, MatcherError>>;

/// Options passed to a [`Matcher`] with every glob.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchOptions {
	/// Let wildcards match names starting with a dot.
	pub dot: bool,

	/// The directory rooted globs were resolved under, if any.
	///
	/// Globs are already absolute when a matcher sees them; this is informational.
	pub root: Option<PathBuf>,
}

/// Something which can find the paths matching a glob.
///
/// Implementations are given absolute, `/`-separated globs, and ignore globs in the same form.
/// They must not yield paths matching any of the ignore globs. The order of the yielded paths is
/// up to the implementation; it is preserved in the stream output.
pub trait Matcher: fmt::Debug + Send + Sync {
	/// Start matching a glob.
	///
	/// Errors which prevent matching at all (such as an invalid glob) should be returned directly;
	/// errors encountered while matching are yielded by the stream, which stops there.
	fn find(
		&self,
		glob: &str,
		ignore: &[String],
		options: &MatchOptions,
	) -> Result<Matches, MatcherError>;
}

impl<M: Matcher + ?Sized> Matcher for Arc<M> {
	fn find(
		&self,
		glob: &str,
		ignore: &[String],
		options: &MatchOptions,
	) -> Result<Matches, MatcherError> {
		(**self).find(glob, ignore, options)
	}
}

impl<M: Matcher + ?Sized> Matcher for Box<M> {
	fn find(
		&self,
		glob: &str,
		ignore: &[String],
		options: &MatchOptions,
	) -> Result<Matches, MatcherError> {
		(**self).find(glob, ignore, options)
	}
}

/// The default matcher: walks the filesystem from each glob's parent directory.
///
/// - Globs are compiled with [`globset`]: `*` and `?` never match `/`, `**` matches across
///   directories, `{a,b}` alternates, `[ab]` is a character class.
/// - Globs without wildcards or braces aren't walked: the path is yielded if it exists.
/// - Entries are visited in file name order, and only as deep as the glob can match.
/// - Without `dot`, names starting with a dot are only matched when the glob itself spells out
///   a dot-prefixed segment.
/// - A glob ending with `/` only matches directories.
/// - Directories matched by an ignore glob ending in `/**` are not descended into.
///
/// The walk runs on Tokio's blocking pool and sends its matches through a bounded channel, so a
/// stream that isn't being read doesn't walk far ahead. Streams must thus be read from within a
/// Tokio runtime.
#[derive(Clone, Debug)]
pub struct WalkMatcher {
	buffer: usize,
}

impl Default for WalkMatcher {
	fn default() -> Self {
		Self { buffer: 64 }
	}
}

impl WalkMatcher {
	/// Set how many matches may be found ahead of the stream being read.
	#[must_use]
	pub fn with_buffer(buffer: usize) -> Self {
		Self {
			buffer: buffer.max(1),
		}
	}
}

impl Matcher for WalkMatcher {
	fn find(
		&self,
		glob: &str,
		ignore: &[String],
		options: &MatchOptions,
	) -> Result<Matches, MatcherError> {
		let only_dirs = glob.len() > 1 && glob.ends_with('/');
		let pattern = if only_dirs {
			glob.trim_end_matches('/')
		} else {
			glob
		};

		let ignores = Ignores::new(ignore)?;

		if !syntax(pattern).is_magic() {
			trace!(?pattern, "literal glob, checking existence");
			return Ok(literal(PathBuf::from(pattern), only_dirs, ignores));
		}

		let parent = glob_parent(glob);
		let remainder = glob_remainder(pattern, parent);
		let job = WalkJob {
			parent: PathBuf::from(parent),
			matcher: compile(pattern)?.compile_matcher(),
			depth: max_depth(remainder),
			dot: options.dot,
			dot_names: dot_names(remainder)?,
			only_dirs,
			ignores,
		};

		debug!(?glob, parent=?job.parent, depth=?job.depth, "walking for glob");
		let (tx, rx) = mpsc::channel(self.buffer);
		tokio::task::spawn_blocking(move || job.run(&tx));
		Ok(ReceiverStream::new(rx).boxed())
	}
}

fn compile(glob: &str) -> Result<globset::Glob, MatcherError> {
	GlobBuilder::new(glob)
		.literal_separator(true)
		.build()
		.map_err(|err| MatcherError::Glob {
			glob: glob.into(),
			err,
		})
}

/// How deep a walk needs to go for a remainder, or `None` if it can match at any depth.
///
/// Alternations may hold slashes and differ in depth, so they walk unbounded like `**`.
fn max_depth(remainder: &str) -> Option<usize> {
	if remainder.contains("**") || syntax(remainder).braces {
		None
	} else {
		Some(remainder.split('/').count())
	}
}

/// Segments of a remainder which spell out a leading dot, as name matchers.
///
/// Without `dot`, a hidden entry is only visited if its name matches one of these. Segments cut
/// out of an alternation aren't globs on their own, and are skipped.
fn dot_names(remainder: &str) -> Result<GlobSet, MatcherError> {
	let mut names = GlobSetBuilder::new();
	for segment in remainder
		.split('/')
		.filter(|seg| seg.starts_with('.') && !seg.contains(['{', '}']))
	{
		names.add(compile(segment)?);
	}

	names.build().map_err(|err| MatcherError::Glob {
		glob: remainder.into(),
		err,
	})
}

fn literal(path: PathBuf, only_dirs: bool, ignores: Ignores) -> Matches {
	stream::once(async move {
		if ignores.matches(&slashed(&path)) {
			trace!(?path, "literal path is ignored");
			return None;
		}

		match tokio::fs::metadata(&path).await {
			Ok(meta) if only_dirs && !meta.is_dir() => None,
			Ok(_) => Some(Ok(path)),
			Err(err) if err.kind() == ErrorKind::NotFound => None,
			Err(err) => Some(Err(MatcherError::Io { path, err })),
		}
	})
	.filter_map(future::ready)
	.boxed()
}

/// Ignore globs, and the directories they cover entirely.
#[derive(Debug)]
struct Ignores {
	paths: GlobSet,
	trees: GlobSet,
}

impl Ignores {
	fn new(globs: &[String]) -> Result<Self, MatcherError> {
		let mut paths = GlobSetBuilder::new();
		let mut trees = GlobSetBuilder::new();
		for glob in globs {
			let glob = glob.trim_end_matches('/');
			paths.add(compile(glob)?);
			if let Some(tree) = glob.strip_suffix("/**") {
				trees.add(compile(tree)?);
			}
		}

		let build = |builder: GlobSetBuilder| {
			builder.build().map_err(|err| MatcherError::Glob {
				glob: globs.join(", "),
				err,
			})
		};

		Ok(Self {
			paths: build(paths)?,
			trees: build(trees)?,
		})
	}

	fn matches(&self, path: &str) -> bool {
		self.paths.is_match(path) || self.trees.is_match(path)
	}

	fn covers_tree(&self, dir: &str) -> bool {
		self.trees.is_match(dir)
	}
}

struct WalkJob {
	parent: PathBuf,
	matcher: GlobMatcher,
	depth: Option<usize>,
	dot: bool,
	dot_names: GlobSet,
	only_dirs: bool,
	ignores: Ignores,
}

impl WalkJob {
	fn run(self, tx: &mpsc::Sender<Result<PathBuf, MatcherError>>) {
		let _span = trace_span!("walk", parent=?self.parent).entered();

		let mut walker = WalkDir::new(&self.parent).min_depth(1).sort_by_file_name();
		if let Some(depth) = self.depth {
			walker = walker.max_depth(depth);
		}

		for entry in walker.into_iter().filter_entry(|entry| self.descend(entry)) {
			let entry = match entry {
				Ok(entry) => entry,
				Err(err) if err.depth() == 0 && is_not_found(&err) => {
					trace!("glob parent doesn't exist, nothing to match");
					return;
				}
				Err(err) => {
					let path = err.path().unwrap_or(&self.parent).to_owned();
					tx.blocking_send(Err(MatcherError::Walk { path, err })).ok();
					return;
				}
			};

			if !self.matches(&entry) {
				continue;
			}

			trace!(path=?entry.path(), "matched");
			if tx.blocking_send(Ok(entry.into_path())).is_err() {
				trace!("matches receiver dropped, stopping walk");
				return;
			}
		}
	}

	fn descend(&self, entry: &DirEntry) -> bool {
		if !entry.file_type().is_dir() {
			return true;
		}

		if !self.visible(entry) {
			trace!(path=?entry.path(), "not descending into hidden directory");
			return false;
		}

		if self.ignores.covers_tree(&slashed(entry.path())) {
			trace!(path=?entry.path(), "not descending into ignored directory");
			return false;
		}

		true
	}

	fn matches(&self, entry: &DirEntry) -> bool {
		if self.only_dirs && !entry.file_type().is_dir() {
			return false;
		}

		if !self.visible(entry) {
			return false;
		}

		let path = slashed(entry.path());
		self.matcher.is_match(&path) && !self.ignores.matches(&path)
	}

	fn visible(&self, entry: &DirEntry) -> bool {
		self.dot || !is_hidden(entry) || self.dot_names.is_match(entry.file_name())
	}
}

fn is_hidden(entry: &DirEntry) -> bool {
	entry.file_name().to_string_lossy().starts_with('.')
}

fn is_not_found(err: &walkdir::Error) -> bool {
	err.io_error()
		.map_or(false, |err| err.kind() == ErrorKind::NotFound)
}
