//! The stream itself: generated matches and written-in records, merged into one output.

use std::{
	fmt,
	path::PathBuf,
	pin::Pin,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	task::{Context, Poll},
};

use futures::{future::BoxFuture, task::AtomicWaker, FutureExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::{
	dedup::{Emitter, Output},
	error::{CreateError, RuntimeError, WriteError},
	generate::Generator,
	ignore_set::IgnoreTable,
	matcher::{MatchOptions, Matcher, WalkMatcher},
	options::StreamOptions,
	pattern::{PatternList, Patterns},
	record::{FileRecord, RecordFactory},
};

/// A stream of unique [`FileRecord`]s matching an ordered list of globs.
///
/// Records come out grouped by pattern, in the order the patterns were given, and no path is ever
/// yielded twice. A stream may also have a write side (see [`GlobStream::duplex()`]): records
/// written there are merged into the output, and deduplicated along with matches.
///
/// Matching only progresses while the stream is being polled, and must happen within a Tokio
/// runtime. Dropping the stream stops matching.
///
/// The stream ends once all patterns have been matched and the write side (if any) is closed. If
/// an error occurs, it is the last item of the stream.
pub struct GlobStream {
	generator: Option<BoxFuture<'static, ()>>,
	output: mpsc::UnboundedReceiver<Output>,
	flow: FlowControl,
	finished: bool,
}

impl fmt::Debug for GlobStream {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GlobStream")
			.field("generating", &self.generator.is_some())
			.field("flow", &self.flow)
			.field("finished", &self.finished)
			.finish_non_exhaustive()
	}
}

impl GlobStream {
	/// Build a stream matching patterns with the default [`WalkMatcher`].
	///
	/// This returns immediately, without touching the filesystem, and fails if the pattern list is
	/// unusable.
	pub fn new(patterns: impl Into<Patterns>, options: StreamOptions) -> Result<Self, CreateError> {
		Self::with_matcher(patterns, options, WalkMatcher::default())
	}

	/// Build a stream matching patterns with a custom [`Matcher`].
	pub fn with_matcher(
		patterns: impl Into<Patterns>,
		options: StreamOptions,
		matcher: impl Matcher + 'static,
	) -> Result<Self, CreateError> {
		Self::build(patterns.into(), options, Arc::new(matcher)).map(|(stream, _)| stream)
	}

	/// Build a stream with a write side.
	///
	/// The stream won't end until every clone of the [`StreamWriter`] has been ended or dropped.
	pub fn duplex(
		patterns: impl Into<Patterns>,
		options: StreamOptions,
	) -> Result<(Self, StreamWriter), CreateError> {
		Self::duplex_with_matcher(patterns, options, WalkMatcher::default())
	}

	/// Build a stream with a write side and a custom [`Matcher`].
	pub fn duplex_with_matcher(
		patterns: impl Into<Patterns>,
		options: StreamOptions,
		matcher: impl Matcher + 'static,
	) -> Result<(Self, StreamWriter), CreateError> {
		Self::build(patterns.into(), options, Arc::new(matcher))
	}

	fn build(
		patterns: Patterns,
		options: StreamOptions,
		matcher: Arc<dyn Matcher>,
	) -> Result<(Self, StreamWriter), CreateError> {
		let list = PatternList::classify(patterns)?;
		let factory = Arc::new(RecordFactory::new(&options)?);
		let ignores = IgnoreTable::build(&list, &options.ignore);

		debug!(
			positives=%list.positives.len(),
			negatives=%list.negatives.len(),
			global_ignores=%options.ignore.len(),
			cwd=?factory.cwd(),
			?matcher,
			"glob stream built",
		);

		let (queue, output) = mpsc::unbounded_channel();
		let emitter = Emitter::new(queue);

		let generator = Generator {
			positives: list.positives,
			ignores,
			factory: factory.clone(),
			matcher,
			options: MatchOptions {
				dot: options.dot,
				root: factory.root().map(ToOwned::to_owned),
			},
			allow_empty: options.allow_empty,
			object_mode: options.object_mode,
			emitter: emitter.clone(),
		};

		let writer = StreamWriter {
			emitter,
			factory,
			object_mode: options.object_mode,
		};

		Ok((
			Self {
				generator: Some(generator.run().boxed()),
				output,
				flow: FlowControl::default(),
				finished: false,
			},
			writer,
		))
	}

	/// A handle to pause and resume this stream, from anywhere.
	#[must_use]
	pub fn flow(&self) -> FlowControl {
		self.flow.clone()
	}

	/// Write every record of this stream into another stream's write side, then end it.
	///
	/// This is how streams are chained: the downstream stream yields its own matches and those of
	/// this stream, without duplicates. Errors of this stream are returned here, not forwarded.
	pub async fn pipe_into(mut self, writer: StreamWriter) -> Result<(), RuntimeError> {
		while let Some(record) = self.next().await {
			if writer.write(Chunk::Record(record?)).is_err() {
				debug!("downstream closed, stopping pipe");
				break;
			}
		}

		writer.end();
		Ok(())
	}

	fn finish(&mut self) {
		self.finished = true;
		self.generator = None;
		self.output.close();
	}
}

impl Stream for GlobStream {
	type Item = Result<FileRecord, RuntimeError>;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		if self.finished {
			return Poll::Ready(None);
		}

		if self.flow.poll_paused(cx) {
			return Poll::Pending;
		}

		if let Some(generator) = self.generator.as_mut() {
			if generator.poll_unpin(cx).is_ready() {
				trace!("generator finished");
				self.generator = None;
			}
		}

		match self.output.poll_recv(cx) {
			Poll::Ready(Some(Ok(record))) => Poll::Ready(Some(Ok(record))),
			Poll::Ready(Some(Err(err))) => {
				self.finish();
				Poll::Ready(Some(Err(err)))
			}
			Poll::Ready(None) => {
				self.finished = true;
				Poll::Ready(None)
			}
			Poll::Pending => Poll::Pending,
		}
	}
}

/// What can be written into a stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Chunk {
	/// A complete record. Relative paths in it are resolved against its own cwd, or the stream's.
	Record(FileRecord),

	/// A bare path, made into a record with the stream's cwd and base options.
	Path(PathBuf),

	/// A raw payload: the bytes of a path. The only chunk allowed in non-object mode.
	Bytes(Vec<u8>),
}

impl Chunk {
	const fn kind(&self) -> &'static str {
		match self {
			Self::Record(_) => "file record",
			Self::Path(_) => "path",
			Self::Bytes(_) => "bytes",
		}
	}
}

impl From<FileRecord> for Chunk {
	fn from(record: FileRecord) -> Self {
		Self::Record(record)
	}
}

impl From<PathBuf> for Chunk {
	fn from(path: PathBuf) -> Self {
		Self::Path(path)
	}
}

impl From<Vec<u8>> for Chunk {
	fn from(bytes: Vec<u8>) -> Self {
		Self::Bytes(bytes)
	}
}

/// The write side of a [`GlobStream`].
///
/// Cloning a writer makes another producer for the same stream: the stream ends once all of them
/// are gone.
#[derive(Clone, Debug)]
pub struct StreamWriter {
	emitter: Emitter,
	factory: Arc<RecordFactory>,
	object_mode: bool,
}

impl StreamWriter {
	/// Write a chunk into the stream.
	///
	/// The chunk goes through the same deduplication as matches: if its path was already yielded
	/// (or written), it is dropped. A chunk which isn't valid for the stream's mode makes the
	/// stream end with [`RuntimeError::InvalidChunk`]; that's reported on the stream, not here.
	///
	/// This only errors if the stream is gone.
	pub fn write(&self, chunk: impl Into<Chunk>) -> Result<(), WriteError> {
		let chunk = chunk.into();
		trace!(kind=%chunk.kind(), "chunk written");

		let record = match chunk {
			Chunk::Bytes(bytes) => match path_from_bytes(bytes) {
				Some(path) => self.factory.shape(path),
				None => {
					return self.emitter.fail(RuntimeError::InvalidChunk {
						kind: "non-path bytes",
					});
				}
			},
			chunk if !self.object_mode => {
				return self.emitter.fail(RuntimeError::InvalidChunk { kind: chunk.kind() });
			}
			Chunk::Record(record) => self.factory.adopt(record),
			Chunk::Path(path) => self.factory.shape(path),
		};

		self.emitter.emit(record).map(drop)
	}

	/// Close this writer.
	///
	/// This is the same as dropping it, but reads better at the end of a producer.
	pub fn end(self) {
		trace!("writer ended");
	}
}

#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> Option<PathBuf> {
	use std::{ffi::OsString, os::unix::ffi::OsStringExt};
	(!bytes.is_empty()).then(|| OsString::from_vec(bytes).into())
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> Option<PathBuf> {
	String::from_utf8(bytes)
		.ok()
		.filter(|path| !path.is_empty())
		.map(Into::into)
}

/// Pauses and resumes a [`GlobStream`].
///
/// While paused, the stream yields nothing and doesn't start matching further patterns. Nothing
/// is dropped: records written in the meantime are queued.
#[derive(Clone, Debug, Default)]
pub struct FlowControl(Arc<FlowState>);

#[derive(Debug, Default)]
struct FlowState {
	paused: AtomicBool,
	waker: AtomicWaker,
}

impl FlowControl {
	/// Stop the stream from yielding.
	pub fn pause(&self) {
		trace!("pausing stream");
		self.0.paused.store(true, Ordering::SeqCst);
	}

	/// Let the stream yield again, waking its consumer.
	pub fn resume(&self) {
		trace!("resuming stream");
		self.0.paused.store(false, Ordering::SeqCst);
		self.0.waker.wake();
	}

	/// Whether the stream is paused.
	#[must_use]
	pub fn is_paused(&self) -> bool {
		self.0.paused.load(Ordering::SeqCst)
	}

	fn poll_paused(&self, cx: &Context<'_>) -> bool {
		if !self.is_paused() {
			return false;
		}

		self.0.waker.register(cx.waker());
		// in case of a resume between the check and the registration
		self.is_paused()
	}
}
