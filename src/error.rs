//! Error types for building and running a [`GlobStream`](crate::GlobStream).
//!
//! Errors come in two flavours. [`CreateError`]s are returned synchronously from the constructors,
//! before any filesystem access: they mean the pattern list itself is unusable. [`RuntimeError`]s
//! are yielded by the stream as its final item, and end the enumeration. Records that were yielded
//! before a runtime error remain valid.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors which prevent a stream from being built at all.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum CreateError {
	/// Error received when a pattern list entry is not a glob string.
	#[error("invalid glob at index {index}: expected a string, got {kind}")]
	#[diagnostic(code(glob_stream::create::invalid_entry))]
	InvalidEntry {
		/// The position of the entry in the pattern list.
		index: usize,

		/// What was found instead, for display.
		kind: &'static str,
	},

	/// Error received when the pattern list only contains negations (or nothing).
	#[error("missing positive glob")]
	#[diagnostic(
		code(glob_stream::create::missing_positive),
		help("negated globs (starting with `!`) only exclude paths, add at least one glob to match")
	)]
	MissingPositiveGlob,

	/// Error received when no `cwd` was given and the process working directory can't be read.
	#[error("cannot obtain the current working directory: {0}")]
	#[diagnostic(code(glob_stream::create::current_dir))]
	CurrentDir(#[source] std::io::Error),
}

/// Errors which end a running stream.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum RuntimeError {
	/// A singular glob (one without wildcards or braces) matched nothing.
	///
	/// This is not raised when the stream was built with `allow_empty`.
	#[error("file not found with singular glob: {pattern}")]
	#[diagnostic(code(glob_stream::runtime::not_found))]
	NotFound {
		/// The glob as it was given, before resolution.
		pattern: String,
	},

	/// The [`Matcher`](crate::Matcher) failed for a pattern.
	#[error("cannot match glob {pattern}: {err}")]
	#[diagnostic(code(glob_stream::runtime::matcher))]
	Matcher {
		/// The glob as it was given, before resolution.
		pattern: String,

		/// The underlying error.
		#[source]
		err: MatcherError,
	},

	/// A value was written or generated which isn't valid for the stream's mode.
	///
	/// In non-object mode, only raw byte payloads may go through the stream.
	#[error("invalid non-string/buffer chunk: got {kind}")]
	#[diagnostic(code(glob_stream::runtime::invalid_chunk))]
	InvalidChunk {
		/// What kind of value was refused.
		kind: &'static str,
	},
}

/// Errors from a [`Matcher`](crate::Matcher) implementation.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum MatcherError {
	/// The glob (or one of its ignore globs) could not be compiled.
	#[error("cannot parse glob {glob:?}: {err}")]
	#[diagnostic(code(glob_stream::matcher::glob))]
	Glob {
		/// The glob which failed to parse.
		glob: String,

		/// The underlying error.
		#[source]
		err: globset::Error,
	},

	/// Walking the directory tree failed.
	#[error("cannot walk {path:?}: {err}")]
	#[diagnostic(code(glob_stream::matcher::walk))]
	Walk {
		/// The path at which the walk failed.
		path: PathBuf,

		/// The underlying error.
		#[source]
		err: walkdir::Error,
	},

	/// Generic I/O error on a path.
	#[error("io({path:?}): {err}")]
	#[diagnostic(code(glob_stream::matcher::io))]
	Io {
		/// The path being looked at.
		path: PathBuf,

		/// The underlying error.
		#[source]
		err: std::io::Error,
	},

	/// For custom matcher errors.
	///
	/// This should be used by external [`Matcher`](crate::Matcher) implementations; the built-in
	/// matcher never uses it.
	#[error("external(matcher): {0}")]
	#[diagnostic(code(glob_stream::matcher::external))]
	External(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Error returned when writing into a stream whose read side has gone away.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum WriteError {
	/// The stream was dropped, or has ended because of an error.
	#[error("cannot write: the stream is closed")]
	#[diagnostic(code(glob_stream::write::closed))]
	Closed,
}
