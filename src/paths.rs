//! Glob string utilities: syntax detection, resolution against a cwd or root, glob parents.
//!
//! Globs are handled as `/`-separated strings throughout, on every platform, because that's what
//! [`globset`] matches against. Filesystem paths are converted with [`slashed()`] before being
//! compared to globs.

use std::{borrow::Cow, path::Path};

/// What kind of glob syntax a string contains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct GlobSyntax {
	/// `*`, `?`, or a `[...]` class.
	pub wildcard: bool,

	/// A `{...}` alternation.
	pub braces: bool,
}

impl GlobSyntax {
	pub const fn is_magic(self) -> bool {
		self.wildcard || self.braces
	}
}

/// Scan a glob for wildcards and brace alternations.
///
/// On unix, a backslash escapes the next character.
pub(crate) fn syntax(glob: &str) -> GlobSyntax {
	let mut found = GlobSyntax::default();
	let mut in_braces = false;
	let mut chars = glob.chars();
	while let Some(c) = chars.next() {
		match c {
			'\\' if cfg!(unix) => {
				chars.next();
			}
			'*' | '?' | '[' => found.wildcard = true,
			'{' => in_braces = true,
			'}' if in_braces => found.braces = true,
			_ => {}
		}
	}
	found
}

/// Render a path as a `/`-separated string.
pub(crate) fn slashed(path: &Path) -> String {
	let path = path.to_string_lossy();
	if cfg!(windows) {
		path.replace('\\', "/")
	} else {
		path.into_owned()
	}
}

fn to_slashes(glob: &str) -> Cow<'_, str> {
	if cfg!(windows) {
		Cow::Owned(glob.replace('\\', "/"))
	} else {
		Cow::Borrowed(glob)
	}
}

/// Make a glob absolute.
///
/// A glob starting with `/` is placed under `root` when one is given. Other relative globs are
/// placed under `cwd`. The result is normalised with [`normalize_glob()`].
pub(crate) fn resolve_glob(glob: &str, cwd: &Path, root: Option<&Path>) -> String {
	let glob = to_slashes(glob);
	let joined = match root {
		Some(root) if glob.starts_with('/') => {
			format!("{}{glob}", slashed(root).trim_end_matches('/'))
		}
		_ if Path::new(glob.as_ref()).is_absolute() => glob.into_owned(),
		_ => format!("{}/{glob}", slashed(cwd).trim_end_matches('/')),
	};

	normalize_glob(&joined)
}

/// Remove empty, `.` and `..` segments from a glob, keeping its anchor and any trailing slash.
pub(crate) fn normalize_glob(glob: &str) -> String {
	let Some((head, rest)) = glob.split_once('/') else {
		return glob.to_owned();
	};

	// "" for a unix root, "C:" for a windows drive
	let anchored = head.is_empty() || head.ends_with(':');
	let trailing = glob.ends_with('/');

	let mut segments: Vec<&str> = Vec::new();
	let relative_head = (!anchored).then_some(head);
	for segment in relative_head.into_iter().chain(rest.split('/')) {
		match segment {
			"" | "." => {}
			".." => match segments.last() {
				Some(&last) if last != ".." => {
					segments.pop();
				}
				_ if anchored => {}
				_ => segments.push(".."),
			},
			other => segments.push(other),
		}
	}

	let mut normalized = if anchored {
		format!("{head}/")
	} else {
		String::new()
	};
	normalized.push_str(&segments.join("/"));
	if trailing && !segments.is_empty() {
		normalized.push('/');
	}
	if normalized.is_empty() {
		normalized.push('.');
	}
	normalized
}

/// The longest leading run of directory segments without glob syntax.
///
/// A literal glob's parent is its directory; a glob ending in `/` denotes the directory itself.
/// Slashes inside a brace alternation don't separate segments: the parent of `/a/{b/c,d}.js` is
/// `/a`.
pub(crate) fn glob_parent(glob: &str) -> &str {
	let alternates = syntax(glob).braces;
	let mut parent = match glob.strip_suffix('/') {
		Some(dir) if !dir.is_empty() && !dir.ends_with(':') => dir,
		_ => dirname(glob),
	};

	while syntax(parent).is_magic() || (alternates && open_brace(parent)) {
		let next = dirname(parent);
		if next == parent {
			break;
		}
		parent = next;
	}

	parent
}

/// The part of a glob below its [`glob_parent()`].
pub(crate) fn glob_remainder<'g>(glob: &'g str, parent: &str) -> &'g str {
	glob.strip_prefix(parent)
		.unwrap_or(glob)
		.trim_start_matches('/')
		.trim_end_matches('/')
}

/// Whether a string ends inside a `{...}` group, i.e. it was cut in the middle of an alternation.
fn open_brace(glob: &str) -> bool {
	let mut depth = 0_usize;
	let mut chars = glob.chars();
	while let Some(c) = chars.next() {
		match c {
			'\\' if cfg!(unix) => {
				chars.next();
			}
			'{' => depth += 1,
			'}' => depth = depth.saturating_sub(1),
			_ => {}
		}
	}
	depth > 0
}

fn dirname(path: &str) -> &str {
	match path.rfind('/') {
		Some(0) => &path[..1],
		Some(i) if path[..i].ends_with(':') => &path[..=i],
		Some(i) => &path[..i],
		None => ".",
	}
}
