//! Owning, ordered collection of mount entries.
//!
//! Entries live in a `Vec`, so neighbour links are positional and always
//! consistent: the first entry has no predecessor, the last has no
//! successor, and `a` precedes `b` exactly when `b` follows `a`. Dropping
//! the list drops every entry once.

use serde::{Deserialize, Serialize};

use super::chain::DetachedEntry;
use super::entry::MountEntry;

/// An ordered list of mount entries, usually loaded from a mount profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MountEntryList {
    entries: Vec<MountEntry>,
}

impl MountEntryList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry at the end of the list.
    pub fn push(&mut self, entry: MountEntry) {
        self.entries.push(entry);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the list holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry, if any.
    #[must_use]
    pub fn first(&self) -> Option<&MountEntry> {
        self.entries.first()
    }

    /// Last entry, if any.
    #[must_use]
    pub fn last(&self) -> Option<&MountEntry> {
        self.entries.last()
    }

    /// Entry at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MountEntry> {
        self.entries.get(index)
    }

    /// Cursor positioned on the first entry.
    #[must_use]
    pub fn cursor_front(&self) -> Option<Cursor<'_>> {
        self.cursor_at(0)
    }

    /// Cursor positioned on the last entry.
    #[must_use]
    pub fn cursor_back(&self) -> Option<Cursor<'_>> {
        self.len().checked_sub(1).and_then(|i| self.cursor_at(i))
    }

    /// Cursor positioned on `index`, if in range.
    #[must_use]
    pub fn cursor_at(&self, index: usize) -> Option<Cursor<'_>> {
        (index < self.len()).then_some(Cursor { list: self, index })
    }

    /// Iterates over entries in list order.
    pub fn iter(&self) -> std::slice::Iter<'_, MountEntry> {
        self.entries.iter()
    }

    /// Entries as a slice, in list order.
    #[must_use]
    pub fn as_slice(&self) -> &[MountEntry] {
        &self.entries
    }

    /// Sorts the list in place. See [`super::order`].
    pub fn sort(&mut self) {
        super::order::sort_mount_entries(self);
    }

    /// Hands every entry over to a detached chain for node-by-node draining.
    ///
    /// Returns `None` for an empty list.
    #[must_use]
    pub fn into_detached(self) -> Option<DetachedEntry> {
        DetachedEntry::from_entries(self.entries)
    }

    /// Takes ownership of a detached chain, keeping its order.
    #[must_use]
    pub fn from_detached(chain: DetachedEntry) -> Self {
        chain.into_entries().collect()
    }

    pub(crate) const fn entries_mut(&mut self) -> &mut Vec<MountEntry> {
        &mut self.entries
    }
}

impl FromIterator<MountEntry> for MountEntryList {
    fn from_iter<I: IntoIterator<Item = MountEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<MountEntry> for MountEntryList {
    fn extend<I: IntoIterator<Item = MountEntry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for MountEntryList {
    type Item = MountEntry;
    type IntoIter = std::vec::IntoIter<MountEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a MountEntryList {
    type Item = &'a MountEntry;
    type IntoIter = std::slice::Iter<'a, MountEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Read-only position inside a [`MountEntryList`] with neighbour navigation.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    list: &'a MountEntryList,
    index: usize,
}

impl<'a> Cursor<'a> {
    /// Entry under the cursor.
    #[must_use]
    pub fn get(&self) -> &'a MountEntry {
        &self.list.entries[self.index]
    }

    /// Position of the entry in the list.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Cursor on the following entry, or `None` at the end.
    #[must_use]
    pub fn next_entry(&self) -> Option<Self> {
        self.list.cursor_at(self.index + 1)
    }

    /// Cursor on the preceding entry, or `None` at the start.
    #[must_use]
    pub fn prev_entry(&self) -> Option<Self> {
        self.index.checked_sub(1).and_then(|i| self.list.cursor_at(i))
    }
}
