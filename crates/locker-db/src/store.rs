//! Storage seams. [`Database`](crate::Database) implements both traits for
//! production; [`MemoryStore`](crate::MemoryStore) and
//! [`MemoryIndex`](crate::MemoryIndex) are the in-memory fakes.

use anyhow::Result;
use locker_types::{Gift, Locker};

/// Append-only tables of lockers and gifts. The one exception is
/// [`remove_locker`](LockerStore::remove_locker), which undoes an insert.
///
/// Implementors must return rows in insertion order. The lookup methods have
/// scan-and-filter defaults; backends with indexes should override them.
pub trait LockerStore: Send + Sync {
    fn list_lockers(&self) -> Result<Vec<Locker>>;

    /// Appends without any uniqueness check.
    fn insert_locker(&self, locker: &Locker) -> Result<()>;

    /// Deletes the locker with this id. Only used to roll back an
    /// `insert_locker` whose ownership entry could not be written.
    fn remove_locker(&self, locker_id: &str) -> Result<()>;

    fn list_gifts(&self) -> Result<Vec<Gift>>;

    /// Appends without checking that `gift.locker_id` exists.
    fn insert_gift(&self, gift: &Gift) -> Result<()>;

    /// First locker with this slug, in insertion order.
    fn find_locker_by_slug(&self, slug: &str) -> Result<Option<Locker>> {
        Ok(self.list_lockers()?.into_iter().find(|l| l.slug == slug))
    }

    fn find_locker_by_token(&self, token: &str) -> Result<Option<Locker>> {
        Ok(self.list_lockers()?.into_iter().find(|l| l.owner_token == token))
    }

    /// Gifts of one locker, oldest first.
    fn gifts_for_locker(&self, locker_id: &str) -> Result<Vec<Gift>> {
        Ok(self
            .list_gifts()?
            .into_iter()
            .filter(|g| g.locker_id == locker_id)
            .collect())
    }
}

/// `slug -> owner_token` for lockers created by one client.
/// A recall convenience, not an authorization mechanism.
pub trait OwnershipIndex: Send + Sync {
    /// Sets `index[slug] = owner_token`, replacing any previous entry.
    fn remember(&self, slug: &str, owner_token: &str) -> Result<()>;

    fn token_for_slug(&self, slug: &str) -> Result<Option<String>>;
}
