#![allow(dead_code)]

use std::{
	fs,
	path::{Path, PathBuf},
};

use futures::StreamExt;
use glob_stream::{FileRecord, GlobStream, Patterns, RuntimeError, StreamOptions};
use tempfile::TempDir;

/// Every file of the fixture tree, relative to its root.
pub const FIXTURE_FILES: &[&str] = &[
	"fixtures/.swag",
	"fixtures/test.coffee",
	"fixtures/has (parens)/test.dmc",
	"fixtures/stuff/run.dmc",
	"fixtures/stuff/test.dmc",
	"fixtures/whatsgoingon/test.js",
	"fixtures/whatsgoingon/hey/isaidhey/whatsgoingon/test.txt",
];

pub fn tracing_init() {
	use tracing_subscriber::{
		fmt::{format::FmtSpan, Subscriber},
		util::SubscriberInitExt,
		EnvFilter,
	};
	Subscriber::builder()
		.pretty()
		.with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
		.with_env_filter(EnvFilter::from_default_env())
		.finish()
		.try_init()
		.ok();
}

/// A temporary directory holding the fixture tree.
pub struct Fixtures {
	dir: TempDir,
}

impl Fixtures {
	pub fn new() -> Self {
		tracing_init();
		let dir = tempfile::tempdir().expect("creating tempdir");
		for file in FIXTURE_FILES {
			let path = dir.path().join(file);
			fs::create_dir_all(path.parent().expect("fixture has a parent"))
				.expect("creating fixture dir");
			fs::write(&path, file.as_bytes()).expect("writing fixture");
		}
		Self { dir }
	}

	/// The directory containing `fixtures/`, used as the cwd of most tests.
	pub fn root(&self) -> &Path {
		self.dir.path()
	}

	pub fn join(&self, path: &str) -> PathBuf {
		self.dir.path().join(path)
	}

	/// An absolute glob inside the tree, `/`-separated.
	pub fn glob(&self, glob: &str) -> String {
		format!("{}/{glob}", self.dir.path().to_string_lossy().replace('\\', "/"))
	}

	/// The fixture `base` of records from a glob under `dir`: the directory with a trailing separator.
	pub fn base(&self, dir: &str) -> PathBuf {
		self.join(dir).join("")
	}

	pub fn options(&self) -> StreamOptions {
		StreamOptions::default().cwd(self.root())
	}
}

/// Collect a whole stream, splitting its records from the error it ended with (if any).
pub async fn drain(mut stream: GlobStream) -> (Vec<FileRecord>, Option<RuntimeError>) {
	let mut records = Vec::new();
	while let Some(item) = stream.next().await {
		match item {
			Ok(record) => records.push(record),
			Err(err) => {
				assert!(stream.next().await.is_none(), "stream continued after an error");
				return (records, Some(err));
			}
		}
	}
	(records, None)
}

/// Collect a stream which must not error.
pub async fn records(stream: GlobStream) -> Vec<FileRecord> {
	let (records, err) = drain(stream).await;
	if let Some(err) = err {
		panic!("stream errored: {err}");
	}
	records
}

/// Build a stream and collect its paths.
pub async fn paths(patterns: impl Into<Patterns>, options: StreamOptions) -> Vec<PathBuf> {
	records(GlobStream::new(patterns, options).expect("building stream"))
		.await
		.into_iter()
		.map(FileRecord::into_path)
		.collect()
}

pub fn names(paths: &[PathBuf]) -> Vec<&str> {
	paths
		.iter()
		.map(|path| {
			path.file_name()
				.and_then(|name| name.to_str())
				.expect("fixture names are utf-8")
		})
		.collect()
}
