//! Reader for syscall allow-list profiles.
//!
//! One syscall name per line. A line starting with `#` is a comment.
//! Trailing whitespace is trimmed and empty lines are skipped. A line may
//! hold at most [`MAX_ALLOWLIST_LINE_LEN`] characters before its newline;
//! a longer line fails the whole read. The whole-line token `@unrestricted`
//! ends the read: nothing after it is looked at.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use confine_common::constants::{COMMENT_PREFIX, MAX_ALLOWLIST_LINE_LEN, UNRESTRICTED_TOKEN};
use confine_common::error::{ConfineError, Result};
use serde::Serialize;

/// A syscall name read from an allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowListEntry {
    /// Syscall name as written, trailing whitespace removed.
    pub name: String,
    /// 1-based line number.
    pub line: usize,
}

/// One meaningful line of an allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowListItem {
    /// A line naming a syscall.
    Syscall(AllowListEntry),
    /// The `@unrestricted` token. Always the last item.
    Unrestricted {
        /// 1-based line number.
        line: usize,
    },
}

/// A fully read allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AllowList {
    /// Syscall names in file order, up to `@unrestricted` if present.
    pub entries: Vec<AllowListEntry>,
    /// Whether `@unrestricted` was reached.
    pub unrestricted: bool,
}

/// Streaming allow-list reader yielding one [`AllowListItem`] per meaningful line.
#[derive(Debug)]
pub struct AllowListReader<R> {
    reader: R,
    path: PathBuf,
    line: usize,
    done: bool,
    buf: Vec<u8>,
}

impl<R: BufRead> AllowListReader<R> {
    /// Wraps `reader`. `path` is only used in errors.
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            path: path.into(),
            line: 0,
            done: false,
            buf: Vec::with_capacity(MAX_ALLOWLIST_LINE_LEN + 1),
        }
    }

    /// Path this reader reports in errors.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn next_item(&mut self) -> Result<Option<AllowListItem>> {
        while !self.done {
            self.buf.clear();
            let limit = (MAX_ALLOWLIST_LINE_LEN + 1) as u64;
            let read = self
                .reader
                .by_ref()
                .take(limit)
                .read_until(b'\n', &mut self.buf);
            let read = read.map_err(|e| io_error(&self.path, e))?;
            if read == 0 {
                self.done = true;
                break;
            }
            self.line += 1;

            let terminated = self.buf.last() == Some(&b'\n');
            if self.buf.first() == Some(&COMMENT_PREFIX) {
                if !terminated {
                    let _ = self
                        .reader
                        .skip_until(b'\n')
                        .map_err(|e| io_error(&self.path, e))?;
                }
                continue;
            }
            if !terminated && self.buf.len() > MAX_ALLOWLIST_LINE_LEN {
                self.done = true;
                return Err(ConfineError::LineTooLong {
                    path: self.path.clone(),
                    line: self.line,
                    max: MAX_ALLOWLIST_LINE_LEN,
                });
            }

            let trimmed = self.buf.trim_ascii_end();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed == UNRESTRICTED_TOKEN.as_bytes() {
                self.done = true;
                return Ok(Some(AllowListItem::Unrestricted { line: self.line }));
            }
            return Ok(Some(AllowListItem::Syscall(AllowListEntry {
                name: String::from_utf8_lossy(trimmed).into_owned(),
                line: self.line,
            })));
        }
        Ok(None)
    }
}

impl<R: BufRead> Iterator for AllowListReader<R> {
    type Item = Result<AllowListItem>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_item().transpose()
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ConfineError {
    ConfineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Builds the path of profile `name` inside `dir`.
///
/// # Errors
///
/// Returns [`ConfineError::InvalidProfileName`] if `name` is empty, `.` or
/// `..`, or contains `/` or a NUL byte.
pub fn profile_path(dir: &Path, name: &str) -> Result<PathBuf> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
        return Err(ConfineError::InvalidProfileName {
            name: name.to_owned(),
        });
    }
    Ok(dir.join(name))
}

/// Opens the allow-list at `path` for streaming.
///
/// # Errors
///
/// Returns [`ConfineError::Io`] if the file cannot be opened. A missing
/// allow-list is an error.
pub fn open(path: &Path) -> Result<AllowListReader<BufReader<File>>> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    Ok(AllowListReader::new(BufReader::new(file), path))
}

/// Reads a whole allow-list from `reader`.
///
/// # Errors
///
/// Returns [`ConfineError::LineTooLong`] for an overlong line and
/// [`ConfineError::Io`] for read failures.
pub fn parse<R: BufRead>(reader: R, path: impl Into<PathBuf>) -> Result<AllowList> {
    collect(AllowListReader::new(reader, path))
}

/// Reads the allow-list file at `path`.
///
/// # Errors
///
/// See [`open`] and [`parse`].
pub fn load(path: &Path) -> Result<AllowList> {
    let list = collect(open(path)?)?;
    tracing::debug!(
        path = %path.display(),
        syscalls = list.entries.len(),
        unrestricted = list.unrestricted,
        "read seccomp allow-list"
    );
    Ok(list)
}

fn collect<R: BufRead>(reader: AllowListReader<R>) -> Result<AllowList> {
    let mut list = AllowList::default();
    for item in reader {
        match item? {
            AllowListItem::Syscall(entry) => list.entries.push(entry),
            AllowListItem::Unrestricted { .. } => list.unrestricted = true,
        }
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn read(text: &str) -> Result<AllowList> {
        parse(Cursor::new(text.as_bytes().to_vec()), "profile")
    }

    fn names(list: &AllowList) -> Vec<&str> {
        list.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn allowlist_reads_names_in_order() {
        let list = read("read\nwrite\nexit_group\n").expect("parse");
        assert_eq!(names(&list), ["read", "write", "exit_group"]);
        assert!(!list.unrestricted);
    }

    #[test]
    fn allowlist_skips_comments_and_blank_lines() {
        let list = read("# comment\n\n   \nread\n#write\n").expect("parse");
        assert_eq!(names(&list), ["read"]);
        assert_eq!(list.entries[0].line, 4);
    }

    #[test]
    fn allowlist_trims_trailing_whitespace_only() {
        let list = read("read \t\r\n  write\n").expect("parse");
        assert_eq!(names(&list), ["read", "  write"]);
    }

    #[test]
    fn allowlist_stops_at_unrestricted() {
        let list = read("# comment\n\nread\n@unrestricted\nwrite\n").expect("parse");
        assert_eq!(names(&list), ["read"]);
        assert!(list.unrestricted);
    }

    #[test]
    fn allowlist_ignores_overlong_line_after_unrestricted() {
        let text = format!("@unrestricted\n{}", "x".repeat(200));
        let list = read(&text).expect("parse");
        assert!(list.unrestricted);
        assert!(list.entries.is_empty());
    }

    #[test]
    fn allowlist_unrestricted_must_be_whole_line() {
        let list = read("@unrestricted-ish\n").expect("parse");
        assert!(!list.unrestricted);
        assert_eq!(names(&list), ["@unrestricted-ish"]);
    }

    #[test]
    fn allowlist_rejects_unterminated_81_chars() {
        let text = format!("read\n{}", "a".repeat(81));
        let err = read(&text).expect_err("too long");
        match err {
            ConfineError::LineTooLong { line, max, .. } => {
                assert_eq!(line, 2);
                assert_eq!(max, 80);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn allowlist_rejects_81_chars_with_newline() {
        let text = format!("{}\nread\n", "a".repeat(81));
        let err = read(&text).expect_err("too long");
        assert!(matches!(err, ConfineError::LineTooLong { line: 1, .. }));
    }

    #[test]
    fn allowlist_accepts_79_chars_with_newline() {
        let name = "a".repeat(79);
        let list = read(&format!("{name}\n")).expect("parse");
        assert_eq!(names(&list), [name.as_str()]);
    }

    #[test]
    fn allowlist_accepts_80_chars_with_and_without_newline() {
        let name = "b".repeat(80);
        assert!(read(&format!("{name}\n")).is_ok());
        assert!(read(&name).is_ok());
    }

    #[test]
    fn allowlist_overlong_comment_is_skipped() {
        let text = format!("#{}\nread\n", "c".repeat(300));
        let list = read(&text).expect("parse");
        assert_eq!(names(&list), ["read"]);
        assert_eq!(list.entries[0].line, 2);
    }

    #[test]
    fn allowlist_reader_is_lazy() {
        let text = format!("read\n{}\n", "z".repeat(100));
        let mut reader = AllowListReader::new(Cursor::new(text.into_bytes()), "p");
        let first = reader.next().expect("item").expect("ok");
        assert_eq!(
            first,
            AllowListItem::Syscall(AllowListEntry {
                name: "read".into(),
                line: 1
            })
        );
        assert!(reader.next().expect("item").is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn allowlist_empty_input() {
        let list = read("").expect("parse");
        assert_eq!(list, AllowList::default());
    }

    #[test]
    fn profile_path_joins_plain_names() {
        let path = profile_path(Path::new("/var/lib/profiles"), "snap.app.cmd").expect("path");
        assert_eq!(path, PathBuf::from("/var/lib/profiles/snap.app.cmd"));
    }

    #[test]
    fn profile_path_rejects_traversal() {
        for bad in ["", ".", "..", "../etc/passwd", "a/b", "nul\0byte"] {
            let err = profile_path(Path::new("/p"), bad).expect_err(bad);
            assert!(matches!(err, ConfineError::InvalidProfileName { .. }));
        }
    }

    #[test]
    fn open_missing_profile_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load(&dir.path().join("absent")).expect_err("missing");
        assert!(matches!(err, ConfineError::Io { .. }));
    }
}
