//! Caller-owned chains of mount entries, consumed one node at a time.
//!
//! A [`DetachedEntry`] is never owned by a [`super::MountEntryList`]. The
//! only way to advance is [`DetachedEntry::take_next`], which consumes the
//! current node, so a chain is drained exactly once.

use super::entry::{MountEntry, MountRecord};

/// One mount entry plus the rest of its chain.
#[derive(Debug)]
pub struct DetachedEntry {
    entry: MountEntry,
    next: Option<Box<DetachedEntry>>,
}

impl DetachedEntry {
    /// Wraps a single entry with no successor.
    #[must_use]
    pub const fn new(entry: MountEntry) -> Self {
        Self { entry, next: None }
    }

    /// Builds a detached entry by copying an OS-level mount record.
    #[must_use]
    pub fn from_record(record: &MountRecord<'_>) -> Self {
        Self::new(MountEntry::from_record(record))
    }

    /// Links `entries` into a chain, preserving their order.
    ///
    /// Returns `None` when `entries` is empty.
    pub fn from_entries<I>(entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = MountEntry>,
    {
        let entries: Vec<MountEntry> = entries.into_iter().collect();
        let mut head: Option<Self> = None;
        for entry in entries.into_iter().rev() {
            head = Some(Self {
                entry,
                next: head.map(Box::new),
            });
        }
        head
    }

    /// The entry held by this node.
    #[must_use]
    pub const fn entry(&self) -> &MountEntry {
        &self.entry
    }

    /// The following node, without consuming anything.
    #[must_use]
    pub fn successor(&self) -> Option<&Self> {
        self.next.as_deref()
    }

    /// Returns true if another node follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Frees this node and returns its successor, if any.
    #[must_use]
    pub fn take_next(mut self) -> Option<Self> {
        self.next.take().map(|next| *next)
    }

    /// Splits this node into its entry and the remainder of the chain.
    #[must_use]
    pub fn into_parts(mut self) -> (MountEntry, Option<Self>) {
        let next = self.next.take().map(|next| *next);
        (std::mem::take(&mut self.entry), next)
    }

    /// Drains the chain front to back, yielding owned entries.
    #[must_use]
    pub fn into_entries(self) -> Drain {
        Drain {
            current: Some(self),
        }
    }
}

impl Drop for DetachedEntry {
    fn drop(&mut self) {
        // Unlink iteratively so long chains do not recurse once per node.
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

/// Iterator returned by [`DetachedEntry::into_entries`].
#[derive(Debug)]
pub struct Drain {
    current: Option<DetachedEntry>,
}

impl Iterator for Drain {
    type Item = MountEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let (entry, rest) = self.current.take()?.into_parts();
        self.current = rest;
        Some(entry)
    }
}
