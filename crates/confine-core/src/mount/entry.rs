//! A single mount-table record.

use serde::{Deserialize, Serialize};

/// One mount entry as stored in a mount profile.
///
/// Field order matches the fstab line layout:
/// `source target fs_type options dump_frequency fsck_pass`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MountEntry {
    /// Device or path being mounted.
    pub source: String,
    /// Mount point.
    pub target: String,
    /// Filesystem type (`none` for bind mounts).
    pub fs_type: String,
    /// Comma-joined mount options.
    pub options: String,
    /// Dump frequency, as consumed by `dump(8)`.
    pub dump_frequency: i32,
    /// Pass number for `fsck(8)`.
    pub fsck_pass: i32,
}

impl MountEntry {
    /// Creates an entry from its six fields.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        fs_type: impl Into<String>,
        options: impl Into<String>,
        dump_frequency: i32,
        fsck_pass: i32,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            fs_type: fs_type.into(),
            options: options.into(),
            dump_frequency,
            fsck_pass,
        }
    }

    /// Deep-copies an OS-level mount record.
    #[must_use]
    pub fn from_record(record: &MountRecord<'_>) -> Self {
        Self::new(
            record.source,
            record.target,
            record.fs_type,
            record.options,
            record.dump_frequency,
            record.fsck_pass,
        )
    }

    /// Returns true if `option` appears in the comma-separated option string.
    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.split(',').any(|o| o == option)
    }
}

/// Borrowed view of one record from the live mount table.
///
/// Whatever enumerates mounts (for example a `/proc/self/mounts` reader)
/// hands records over in this shape; nothing here enumerates mounts itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountRecord<'a> {
    /// Device or path being mounted.
    pub source: &'a str,
    /// Mount point.
    pub target: &'a str,
    /// Filesystem type.
    pub fs_type: &'a str,
    /// Comma-joined mount options.
    pub options: &'a str,
    /// Dump frequency.
    pub dump_frequency: i32,
    /// Pass number for `fsck(8)`.
    pub fsck_pass: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_from_record_copies_all_fields() {
        let record = MountRecord {
            source: "/snap/core/current/usr/lib",
            target: "/usr/lib",
            fs_type: "none",
            options: "bind,ro",
            dump_frequency: 1,
            fsck_pass: 2,
        };
        let entry = MountEntry::from_record(&record);
        assert_eq!(
            entry,
            MountEntry::new("/snap/core/current/usr/lib", "/usr/lib", "none", "bind,ro", 1, 2)
        );
    }

    #[test]
    fn entry_has_option_matches_whole_options_only() {
        let entry = MountEntry::new("tmpfs", "/tmp", "tmpfs", "rw,nosuid,nodev", 0, 0);
        assert!(entry.has_option("nosuid"));
        assert!(!entry.has_option("suid"));
        assert!(!entry.has_option("ro"));
    }
}
