use std::path::Path;

use glob_stream::{CreateError, GlobStream, RuntimeError, StreamOptions};
use serde_json::json;

mod helpers;
use helpers::*;

#[tokio::test]
async fn folder_from_a_literal_glob() {
	let fx = Fixtures::new();
	let records = records(GlobStream::new("./fixtures/whatsgoingon", fx.options()).unwrap()).await;

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].path(), fx.join("fixtures/whatsgoingon"));
	assert_eq!(records[0].base(), fx.base("fixtures"));
	assert_eq!(records[0].cwd(), fx.root());
}

#[tokio::test]
async fn trailing_slash_yields_folders_only() {
	let fx = Fixtures::new();
	assert_eq!(
		paths("./fixtures/whatsgoingon/*/", fx.options()).await,
		[fx.join("fixtures/whatsgoingon/hey")]
	);
}

#[tokio::test]
async fn files_from_a_glob() {
	let fx = Fixtures::new();
	let records = records(GlobStream::new("./fixtures/*.coffee", fx.options()).unwrap()).await;

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].path(), fx.join("fixtures/test.coffee"));
	assert_eq!(records[0].base(), fx.base("fixtures"));
	assert_eq!(records[0].relative(), Some(Path::new("test.coffee")));
}

#[cfg(unix)]
#[tokio::test]
async fn glob_parent_base_keeps_its_trailing_separator() {
	let fx = Fixtures::new();
	let records = records(GlobStream::new("./fixtures/*.coffee", fx.options()).unwrap()).await;

	let expected = format!("{}/fixtures/", fx.root().display());
	assert_eq!(records[0].base().to_str(), Some(expected.as_str()));
}

#[tokio::test]
async fn parens_in_the_cwd() {
	let fx = Fixtures::new();
	let cwd = fx.join("fixtures/has (parens)");
	let records = records(
		GlobStream::new("*.dmc", StreamOptions::default().cwd(&cwd)).unwrap(),
	)
	.await;

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].path(), cwd.join("test.dmc"));
	assert_eq!(records[0].base(), cwd);
	assert_eq!(records[0].cwd(), cwd);
}

#[tokio::test]
async fn parens_in_the_glob() {
	let fx = Fixtures::new();
	let records = records(
		GlobStream::new("./fixtures/has (parens)/*.dmc", fx.options()).unwrap(),
	)
	.await;

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].path(), fx.join("fixtures/has (parens)/test.dmc"));
	assert_eq!(records[0].base(), fx.base("fixtures/has (parens)"));
}

#[tokio::test]
async fn globstar_walks_in_name_order() {
	let fx = Fixtures::new();
	assert_eq!(
		paths("./fixtures/**/*.dmc", fx.options()).await,
		[
			fx.join("fixtures/has (parens)/test.dmc"),
			fx.join("fixtures/stuff/run.dmc"),
			fx.join("fixtures/stuff/test.dmc"),
		]
	);
}

#[tokio::test]
async fn output_follows_pattern_order() {
	let fx = Fixtures::new();
	let found = paths(
		[
			fx.glob("fixtures/**/test.txt"),
			fx.glob("fixtures/**/test.coffee"),
			fx.glob("fixtures/**/test.js"),
			fx.glob("fixtures/**/test.dmc"),
		],
		fx.options(),
	)
	.await;

	assert_eq!(
		names(&found),
		["test.txt", "test.coffee", "test.js", "test.dmc", "test.dmc"]
	);
}

#[tokio::test]
async fn literal_paths_keep_their_order() {
	let fx = Fixtures::new();
	let globs = [
		fx.glob("fixtures/whatsgoingon/hey/isaidhey/whatsgoingon/test.txt"),
		fx.glob("fixtures/test.coffee"),
		fx.glob("fixtures/whatsgoingon/test.js"),
	];
	assert_eq!(
		paths(globs, fx.options()).await,
		[
			fx.join("fixtures/whatsgoingon/hey/isaidhey/whatsgoingon/test.txt"),
			fx.join("fixtures/test.coffee"),
			fx.join("fixtures/whatsgoingon/test.js"),
		]
	);
}

#[tokio::test]
async fn explicit_base() {
	let fx = Fixtures::new();
	let base = fx.join("fixtures");
	let records = records(
		GlobStream::new(
			[
				"./whatsgoingon/hey/isaidhey/whatsgoingon/test.txt",
				"./test.coffee",
				"./whatsgoingon/test.js",
			],
			StreamOptions::default().cwd(&base).base(&base),
		)
		.unwrap(),
	)
	.await;

	assert_eq!(records.len(), 3);
	for record in records {
		assert_eq!(record.base(), base);
	}
}

#[tokio::test]
async fn cwdbase() {
	let fx = Fixtures::new();
	let cwd = fx.join("fixtures");
	let records = records(
		GlobStream::new(
			["./whatsgoingon/*.js", "./test.coffee"],
			StreamOptions::default().cwd(&cwd).cwdbase(true),
		)
		.unwrap(),
	)
	.await;

	assert_eq!(records.len(), 2);
	for record in records {
		assert_eq!(record.base(), cwd);
	}
}

#[tokio::test]
async fn duplicate_globs_yield_once() {
	let fx = Fixtures::new();
	assert_eq!(
		paths(
			["./fixtures/test.coffee", "./fixtures/test.coffee"],
			fx.options()
		)
		.await,
		[fx.join("fixtures/test.coffee")]
	);
}

#[tokio::test]
async fn overlapping_globs_yield_once() {
	let fx = Fixtures::new();
	assert_eq!(
		paths(
			["./fixtures/stuff/*.dmc", "./fixtures/**/*.dmc"],
			fx.options()
		)
		.await,
		[
			fx.join("fixtures/stuff/run.dmc"),
			fx.join("fixtures/stuff/test.dmc"),
			fx.join("fixtures/has (parens)/test.dmc"),
		]
	);
}

#[tokio::test]
async fn dotfiles_need_dot() {
	let fx = Fixtures::new();
	assert!(paths("./fixtures/*swag", fx.options()).await.is_empty());
	assert_eq!(
		paths("./fixtures/*swag", fx.options().dot(true)).await,
		[fx.join("fixtures/.swag")]
	);
}

#[tokio::test]
async fn dotfiles_can_be_negated() {
	let fx = Fixtures::new();
	assert!(paths(["./fixtures/*swag", "!./fixtures/**"], fx.options().dot(true))
		.await
		.is_empty());
}

#[tokio::test]
async fn default_cwd_is_the_process_cwd() {
	let fx = Fixtures::new();
	let records = records(
		GlobStream::new(fx.glob("fixtures/test.coffee"), StreamOptions::default()).unwrap(),
	)
	.await;

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].cwd(), std::env::current_dir().unwrap());
	assert_eq!(records[0].base(), fx.base("fixtures"));
	assert_eq!(records[0].path(), fx.join("fixtures/test.coffee"));
}

#[tokio::test]
async fn root_only_applies_to_rooted_globs() {
	let fx = Fixtures::new();
	let options = fx.options().root(fx.join("fixtures"));

	let relative = records(GlobStream::new("./fixtures/test.coffee", options.clone()).unwrap()).await;
	assert_eq!(relative.len(), 1);
	assert_eq!(relative[0].path(), fx.join("fixtures/test.coffee"));
	assert_eq!(relative[0].base(), fx.base("fixtures"));

	let rooted = records(GlobStream::new("/test.coffee", options).unwrap()).await;
	assert_eq!(rooted.len(), 1);
	assert_eq!(rooted[0].path(), fx.join("fixtures/test.coffee"));
	assert_eq!(rooted[0].base(), fx.base("fixtures"));
	assert_eq!(rooted[0].cwd(), fx.root());
}

#[tokio::test]
async fn singular_glob_not_found() {
	let fx = Fixtures::new();
	let (records, err) = drain(GlobStream::new("notfound", fx.options()).unwrap()).await;

	assert!(records.is_empty());
	let err = err.expect("stream should error");
	assert!(matches!(&err, RuntimeError::NotFound { pattern } if pattern == "notfound"));
	assert!(err
		.to_string()
		.starts_with("file not found with singular glob"));
}

#[tokio::test]
async fn one_missing_glob_among_many() {
	let fx = Fixtures::new();
	let (records, err) = drain(
		GlobStream::new(["./fixtures/test.coffee", "notfound", "./fixtures/whatsgoingon"], fx.options())
			.unwrap(),
	)
	.await;

	assert_eq!(records.len(), 1);
	assert_eq!(records[0].path(), fx.join("fixtures/test.coffee"));
	assert!(matches!(err, Some(RuntimeError::NotFound { .. })));
}

#[tokio::test]
async fn braces_may_span_directories() {
	let fx = Fixtures::new();
	let records = records(
		GlobStream::new(
			"./fixtures/{whatsgoingon/test.js,test.coffee}",
			fx.options(),
		)
		.unwrap(),
	)
	.await;

	assert_eq!(records.len(), 2);
	assert_eq!(records[0].path(), fx.join("fixtures/test.coffee"));
	assert_eq!(records[1].path(), fx.join("fixtures/whatsgoingon/test.js"));
	for record in records {
		assert_eq!(record.base(), fx.base("fixtures"));
	}
}

#[tokio::test]
async fn braces_are_never_singular() {
	let fx = Fixtures::new();
	assert!(paths("notfound{a,b}", fx.options()).await.is_empty());
}

#[tokio::test]
async fn allow_empty() {
	let fx = Fixtures::new();
	assert!(paths("notfound", fx.options().allow_empty(true)).await.is_empty());
}

#[tokio::test]
async fn singular_glob_matched_elsewhere_still_counts() {
	let fx = Fixtures::new();
	assert_eq!(
		paths(["./fixtures/*.coffee", "./fixtures/test.coffee"], fx.options()).await,
		[fx.join("fixtures/test.coffee")]
	);
}

#[test]
fn invalid_entries_are_reported_by_index() {
	let err = GlobStream::new(json!(42), StreamOptions::default()).unwrap_err();
	assert!(matches!(err, CreateError::InvalidEntry { index: 0, .. }));
	assert!(err.to_string().starts_with("invalid glob at index 0"));

	let err = GlobStream::new(json!([".", 42]), StreamOptions::default()).unwrap_err();
	assert!(matches!(err, CreateError::InvalidEntry { index: 1, .. }));
	assert!(err.to_string().starts_with("invalid glob at index 1"));
}

#[test]
fn positive_glob_is_required() {
	let err = GlobStream::new("!c", StreamOptions::default()).unwrap_err();
	assert!(matches!(err, CreateError::MissingPositiveGlob));
	assert_eq!(err.to_string(), "missing positive glob");

	let err = GlobStream::new(["!a", "!b"], StreamOptions::default()).unwrap_err();
	assert!(matches!(err, CreateError::MissingPositiveGlob));
}

#[tokio::test]
async fn records_are_refused_outside_object_mode() {
	let fx = Fixtures::new();
	let (records, err) = drain(
		GlobStream::new(["./fixtures/stuff/run.dmc"], fx.options().object_mode(false)).unwrap(),
	)
	.await;

	assert!(records.is_empty());
	let err = err.expect("stream should error");
	assert!(matches!(err, RuntimeError::InvalidChunk { .. }));
	assert!(err
		.to_string()
		.starts_with("invalid non-string/buffer chunk"));
}

#[tokio::test]
async fn options_from_json() {
	let fx = Fixtures::new();
	let options: StreamOptions = serde_json::from_value(json!({
		"cwd": fx.root(),
		"dot": true,
		"ignore": ["./fixtures/**/*.dmc"],
	}))
	.unwrap();

	assert_eq!(
		paths("./fixtures/**/*", options).await,
		[
			fx.join("fixtures/.swag"),
			fx.join("fixtures/has (parens)"),
			fx.join("fixtures/stuff"),
			fx.join("fixtures/test.coffee"),
			fx.join("fixtures/whatsgoingon"),
			fx.join("fixtures/whatsgoingon/hey"),
			fx.join("fixtures/whatsgoingon/hey/isaidhey"),
			fx.join("fixtures/whatsgoingon/hey/isaidhey/whatsgoingon"),
			fx.join("fixtures/whatsgoingon/hey/isaidhey/whatsgoingon/test.txt"),
			fx.join("fixtures/whatsgoingon/test.js"),
		]
	);
}
