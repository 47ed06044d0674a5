//! Glob-stream: turn an ordered list of globs into a stream of unique file records.
//!
//! Given a list of globs, some of them negated with a leading `!`, a [`GlobStream`] yields a
//! [`FileRecord`] (a path, its base directory, and the working directory) for every path matched
//! by the positive globs, with these guarantees:
//!
//! - **Pattern order**: all records from one glob come before those of the next glob in the list.
//!   The order within one glob is up to the [`Matcher`] (the default [`WalkMatcher`] sorts by name).
//! - **Uniqueness**: a path is yielded at most once, however many globs match it.
//! - **Directional negation**: a negated glob only excludes matches of the globs _before_ it. Use
//!   the `ignore` option to exclude paths from every glob.
//! - **Singular globs must match**: a glob with no wildcards and no braces which matches nothing is
//!   an error, unless `allow_empty` is set.
//!
//! Streams can also be written into (see [`GlobStream::duplex()`]), so that the output of one
//! stream can be merged into another's, still without duplicates.
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use glob_stream::{GlobStream, StreamOptions};
//!
//! #[tokio::main]
//! async fn main() -> miette::Result<()> {
//!     let stream = GlobStream::new(
//!         ["src/**/*.rs", "!src/generated/**", "src/generated/keep.rs"],
//!         StreamOptions::default().cwd("/path/to/project"),
//!     )?;
//!
//!     let records: Vec<_> = stream.try_collect().await?;
//!     for record in records {
//!         println!("{}", record.path().display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Errors implement [`miette::Diagnostic`]. Building a stream fails synchronously if the pattern
//! list is unusable ([`CreateError`]); everything else is reported as the last item of the stream
//! ([`RuntimeError`]).
//!
//! The library logs with [tracing], mostly at `trace` and `debug` levels.

#![warn(clippy::unwrap_used, missing_docs)]
#![deny(rust_2018_idioms)]

pub mod error;
pub mod matcher;
pub mod options;
pub mod pattern;

mod dedup;
mod generate;
mod ignore_set;
mod paths;
mod record;
mod stream;

#[doc(inline)]
pub use crate::{
	error::{CreateError, MatcherError, RuntimeError, WriteError},
	matcher::{MatchOptions, Matcher, Matches, WalkMatcher},
	options::StreamOptions,
	pattern::{PatternEntry, Patterns, RawPattern, Sign},
	record::FileRecord,
	stream::{Chunk, FlowControl, GlobStream, StreamWriter},
};
