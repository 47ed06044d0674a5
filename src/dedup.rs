//! Deduplication of emitted paths, shared by every producer of a stream.

use std::{
	collections::HashSet,
	path::{Path, PathBuf},
	sync::{Arc, Mutex, PoisonError},
};

use normalize_path::NormalizePath;
use tokio::sync::mpsc;
use tracing::trace;

use crate::{
	error::{RuntimeError, WriteError},
	record::FileRecord,
};

/// The key paths are deduplicated on: absolute, lexically normalised, and simplified.
///
/// This doesn't touch the filesystem, so symlinks are not resolved.
pub(crate) fn canonical(path: &Path) -> PathBuf {
	dunce::simplified(&path.normalize()).to_path_buf()
}

/// The set of paths already emitted by a stream.
#[derive(Debug, Default)]
pub(crate) struct SeenPaths(Mutex<HashSet<PathBuf>>);

impl SeenPaths {
	/// Record a path, returning whether it was new.
	#[cfg(test)]
	pub fn admit(&self, path: &Path) -> bool {
		self.admit_then(path, || ()).is_some()
	}

	/// Record a path and, if it was new, run `then` while still holding the lock.
	///
	/// Two producers admitting the same path concurrently will see exactly one of them succeed,
	/// and whatever `then` does is ordered the same way as admissions.
	pub fn admit_then<T>(&self, path: &Path, then: impl FnOnce() -> T) -> Option<T> {
		let key = canonical(path);
		let mut seen = self.0.lock().unwrap_or_else(PoisonError::into_inner);
		if seen.insert(key) {
			Some(then())
		} else {
			None
		}
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
	}
}

pub(crate) type Output = Result<FileRecord, RuntimeError>;

/// The write end of a stream's output queue, behind its dedup filter.
///
/// The generator and every writer hold one; the queue closes once they're all dropped.
#[derive(Clone, Debug)]
pub(crate) struct Emitter {
	seen: Arc<SeenPaths>,
	queue: mpsc::UnboundedSender<Output>,
}

impl Emitter {
	pub fn new(queue: mpsc::UnboundedSender<Output>) -> Self {
		Self {
			seen: Arc::default(),
			queue,
		}
	}

	/// Queue a record if its path hasn't been seen yet.
	///
	/// Returns whether the record was queued (`false` for a duplicate).
	pub fn emit(&self, record: FileRecord) -> Result<bool, WriteError> {
		let path = record.path().to_owned();
		match self
			.seen
			.admit_then(&path, move || self.queue.send(Ok(record)))
		{
			Some(Ok(())) => Ok(true),
			Some(Err(_)) => Err(WriteError::Closed),
			None => {
				trace!(?path, "already seen, dropping");
				Ok(false)
			}
		}
	}

	/// Queue an error, which ends the stream once it's read.
	pub fn fail(&self, err: RuntimeError) -> Result<(), WriteError> {
		self.queue.send(Err(err)).map_err(|_| WriteError::Closed)
	}
}
