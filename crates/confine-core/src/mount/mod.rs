//! Mount profiles: the ordered set of mounts that make up a sandbox's
//! filesystem view.
//!
//! Two ownership disciplines are kept apart by type:
//! - [`MountEntryList`] owns its entries and drops them together.
//! - [`DetachedEntry`] is a caller-owned chain drained node by node.

pub mod chain;
pub mod entry;
pub mod list;
pub mod order;
pub mod profile;

pub use chain::DetachedEntry;
pub use entry::{MountEntry, MountRecord};
pub use list::{Cursor, MountEntryList};
pub use order::{compare_mount_entries, sort_mount_entries};
pub use profile::{load_mount_profile, save_mount_profile};
