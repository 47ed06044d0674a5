//! Matching positive patterns one after the other.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, trace, trace_span, Instrument};

use crate::{
	dedup::Emitter,
	error::{RuntimeError, WriteError},
	ignore_set::IgnoreTable,
	matcher::{MatchOptions, Matcher},
	pattern::PatternEntry,
	record::RecordFactory,
};

/// The read side of a stream: runs the matcher for each positive pattern, in order.
///
/// Each pattern's matches are drained completely before the next pattern is started, so the output
/// is grouped by pattern in the order patterns were given, even though the order _within_ a
/// pattern is up to the matcher.
#[derive(Debug)]
pub(crate) struct Generator {
	pub positives: Vec<PatternEntry>,
	pub ignores: IgnoreTable,
	pub factory: Arc<RecordFactory>,
	pub matcher: Arc<dyn Matcher>,
	pub options: MatchOptions,
	pub allow_empty: bool,
	pub object_mode: bool,
	pub emitter: Emitter,
}

impl Generator {
	/// Run to completion, queueing any error as the last output of the generator.
	pub async fn run(self) {
		match self.generate().await {
			Ok(()) => debug!("all patterns drained"),
			Err(err) => {
				debug!(%err, "pattern matching failed");
				self.emitter.fail(err).ok();
			}
		}
	}

	async fn generate(&self) -> Result<(), RuntimeError> {
		for (position, entry) in self.positives.iter().enumerate() {
			let span = trace_span!("pattern", glob=%entry.raw, index=%entry.index);
			if !self.drain(position, entry).instrument(span).await? {
				debug!("output closed, not matching further patterns");
				break;
			}
		}

		Ok(())
	}

	/// Match one pattern and emit its records.
	///
	/// Returns `false` if the output has closed and there's no point going on.
	async fn drain(&self, position: usize, entry: &PatternEntry) -> Result<bool, RuntimeError> {
		let glob = self.factory.resolve(&entry.raw);
		let ignore: Vec<String> = self
			.ignores
			.get(position)
			.iter()
			.map(|ignore| self.factory.resolve(ignore))
			.collect();
		let base = self.factory.glob_base(&glob);
		debug!(?glob, ?ignore, ?base, "matching pattern");

		let matcher_error = |err| RuntimeError::Matcher {
			pattern: entry.raw.clone(),
			err,
		};

		let mut matches = self
			.matcher
			.find(&glob, &ignore, &self.options)
			.map_err(matcher_error)?;

		let mut found = 0_usize;
		let mut emitted = 0_usize;
		while let Some(path) = matches.next().await {
			let path = path.map_err(matcher_error)?;
			found += 1;

			if !self.object_mode {
				return Err(RuntimeError::InvalidChunk {
					kind: "file record",
				});
			}

			trace!(?path, "emitting match");
			match self.emitter.emit(self.factory.record(path, base.clone())) {
				Ok(true) => emitted += 1,
				Ok(false) => {}
				Err(WriteError::Closed) => return Ok(false),
			}
		}

		debug!(%found, %emitted, "pattern drained");
		if found == 0 && !self.allow_empty && entry.is_singular() {
			return Err(RuntimeError::NotFound {
				pattern: entry.raw.clone(),
			});
		}

		Ok(true)
	}
}
