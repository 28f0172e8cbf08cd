//! Loading and saving mount profiles.
//!
//! A mount profile is fstab-formatted text, one entry per line:
//!
//! ```text
//! source target fs_type options dump_frequency fsck_pass
//! ```
//!
//! Whitespace, tabs, newlines and backslashes inside fields are written as
//! the octal escapes `\040`, `\011`, `\012` and `\134`, as `getmntent(3)`
//! expects. A `#` starting a field is written as `\043` so the line is not
//! read back as a comment. Blank lines and `#` comments are ignored on load.
//! The two integer fields may be omitted and then default to zero. Anything
//! else that does not parse fails the whole load.
//!
//! Empty text fields have no representation and are refused on save.

use std::fmt;
use std::fs::{File, Permissions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use confine_common::error::{ConfineError, Result};

use super::entry::MountEntry;
use super::list::MountEntryList;

const PROFILE_FILE_MODE: u32 = 0o644;

/// Loads the mount profile at `path`.
///
/// A missing file is not an error: it yields an empty list, since a sandbox
/// may start without any stored profile.
///
/// # Errors
///
/// Returns [`ConfineError::Io`] if the file exists but cannot be read and
/// [`ConfineError::MalformedMountEntry`] for the first line that does not
/// parse.
pub fn load_mount_profile(path: &Path) -> Result<MountEntryList> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no mount profile, starting empty");
            return Ok(MountEntryList::new());
        }
        Err(e) => {
            return Err(ConfineError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let list = read_mount_profile(BufReader::new(file), path)?;
    tracing::debug!(path = %path.display(), entries = list.len(), "loaded mount profile");
    Ok(list)
}

/// Parses mount profile text from `reader`. `path` is only used in errors.
///
/// # Errors
///
/// See [`load_mount_profile`].
pub fn read_mount_profile<R: BufRead>(reader: R, path: &Path) -> Result<MountEntryList> {
    let mut list = MountEntryList::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ConfineError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        match parse_mount_line(&line) {
            Ok(Some(entry)) => list.push(entry),
            Ok(None) => {}
            Err(reason) => {
                return Err(ConfineError::MalformedMountEntry {
                    path: path.to_path_buf(),
                    line: index + 1,
                    reason,
                });
            }
        }
    }
    Ok(list)
}

/// Writes `list` to `path`, replacing any previous file atomically.
///
/// The profile is written to a temporary file in the same directory and
/// renamed into place, so readers see either the old or the new profile.
///
/// # Errors
///
/// Returns [`ConfineError::MalformedMountEntry`] if an entry has an empty
/// text field, and [`ConfineError::Io`] if the temporary file cannot be
/// created, written, or renamed. The destination is left untouched in both
/// cases.
pub fn save_mount_profile(list: &MountEntryList, path: &Path) -> Result<()> {
    for (index, entry) in list.iter().enumerate() {
        if let Some(field) = empty_text_field(entry) {
            return Err(ConfineError::MalformedMountEntry {
                path: path.to_path_buf(),
                line: index + 1,
                reason: format!("{field} is empty"),
            });
        }
    }

    let io_err = |source: io::Error| ConfineError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write_mount_profile(list, &mut writer).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    tmp.as_file()
        .set_permissions(Permissions::from_mode(PROFILE_FILE_MODE))
        .map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    let _ = tmp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(path = %path.display(), entries = list.len(), "saved mount profile");
    Ok(())
}

/// Serializes `list` in profile format, one line per entry.
///
/// # Errors
///
/// Propagates errors from `writer`.
pub fn write_mount_profile<W: Write>(list: &MountEntryList, writer: &mut W) -> io::Result<()> {
    for entry in list {
        writeln!(writer, "{entry}")?;
    }
    Ok(())
}

impl fmt::Display for MountEntry {
    /// Formats the entry as one profile line, without the trailing newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            Escaped(&self.source),
            Escaped(&self.target),
            Escaped(&self.fs_type),
            Escaped(&self.options),
            self.dump_frequency,
            self.fsck_pass
        )
    }
}

fn empty_text_field(entry: &MountEntry) -> Option<&'static str> {
    [
        ("source", &entry.source),
        ("target", &entry.target),
        ("filesystem type", &entry.fs_type),
        ("options", &entry.options),
    ]
    .into_iter()
    .find(|(_, value)| value.is_empty())
    .map(|(name, _)| name)
}

/// Parses one profile line. `Ok(None)` means the line carries no entry.
fn parse_mount_line(line: &str) -> std::result::Result<Option<MountEntry>, String> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    if fields.len() < 4 {
        return Err(format!("expected at least 4 fields, found {}", fields.len()));
    }
    if fields.len() > 6 {
        return Err(format!("expected at most 6 fields, found {}", fields.len()));
    }

    let dump_frequency = parse_integer(fields.get(4).copied(), "dump frequency")?;
    let fsck_pass = parse_integer(fields.get(5).copied(), "fsck pass")?;
    Ok(Some(MountEntry {
        source: unescape(fields[0]),
        target: unescape(fields[1]),
        fs_type: unescape(fields[2]),
        options: unescape(fields[3]),
        dump_frequency,
        fsck_pass,
    }))
}

fn parse_integer(field: Option<&str>, what: &str) -> std::result::Result<i32, String> {
    let Some(raw) = field else {
        return Ok(0);
    };
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("{what} {raw:?} is not a decimal number"));
    }
    raw.parse()
        .map_err(|e| format!("{what} {raw:?} out of range: {e}"))
}

/// Characters that must be escaped inside a field, with their escape.
const ESCAPES: [(char, &str); 4] = [
    (' ', "\\040"),
    ('\t', "\\011"),
    ('\n', "\\012"),
    ('\\', "\\134"),
];

/// Escape for a `#` at the start of a field.
const LEADING_HASH: (char, &str) = ('#', "\\043");

/// Display adapter writing a field with octal escapes applied.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        if let Some(tail) = rest.strip_prefix(LEADING_HASH.0) {
            f.write_str(LEADING_HASH.1)?;
            rest = tail;
        }
        for c in rest.chars() {
            match ESCAPES.iter().find(|(raw, _)| *raw == c) {
                Some((_, escaped)) => f.write_str(escaped)?,
                None => write!(f, "{c}")?,
            }
        }
        Ok(())
    }
}

/// Decodes the octal escapes in [`ESCAPES`] and `\043`; other backslashes
/// are kept as is.
fn unescape(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_owned();
    }
    let mut out = String::with_capacity(field.len());
    let mut rest = field;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = ESCAPES
            .iter()
            .chain(std::iter::once(&LEADING_HASH))
            .find(|(_, escaped)| tail.starts_with(*escaped));
        match decoded {
            Some((raw, escaped)) => {
                out.push(*raw);
                rest = &tail[escaped.len()..];
            }
            None => {
                out.push('\\');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
