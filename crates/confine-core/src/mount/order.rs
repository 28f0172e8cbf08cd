//! Total ordering of mount entries and stable sorting of entry lists.
//!
//! Keys, most significant first: `source`, `target`, `fs_type`, `options`
//! (byte-wise), then `dump_frequency`, `fsck_pass` (numeric). Every field
//! takes part, so two entries compare equal exactly when they are equal.

use std::cmp::Ordering;

use super::entry::MountEntry;
use super::list::MountEntryList;

/// Compares two mount entries field by field.
#[must_use]
pub fn compare_mount_entries(a: &MountEntry, b: &MountEntry) -> Ordering {
    a.source
        .as_bytes()
        .cmp(b.source.as_bytes())
        .then_with(|| a.target.as_bytes().cmp(b.target.as_bytes()))
        .then_with(|| a.fs_type.as_bytes().cmp(b.fs_type.as_bytes()))
        .then_with(|| a.options.as_bytes().cmp(b.options.as_bytes()))
        .then_with(|| a.dump_frequency.cmp(&b.dump_frequency))
        .then_with(|| a.fsck_pass.cmp(&b.fsck_pass))
}

impl Ord for MountEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_mount_entries(self, other)
    }
}

impl PartialOrd for MountEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sorts a list in ascending order, keeping equal entries in their original order.
pub fn sort_mount_entries(list: &mut MountEntryList) {
    if list.len() < 2 {
        return;
    }
    list.entries_mut().sort_by(compare_mount_entries);
    tracing::trace!(entries = list.len(), "sorted mount entries");
}
