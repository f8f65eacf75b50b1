use std::sync::Arc;

use anyhow::Result;
use locker_types::{Gift, GiftSummary, Locker};
use tracing::{debug, error, warn};

use crate::store::{LockerStore, OwnershipIndex};

/// The persistence layer as the flows see it: the shared locker/gift tables
/// plus the ownership index of whichever client is acting.
///
/// Misses are `Ok(None)` or an empty `Vec`. `Err` always means the backing
/// storage itself failed.
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn LockerStore>,
    index: Arc<dyn OwnershipIndex>,
}

impl Persistence {
    pub fn new(store: Arc<dyn LockerStore>, index: Arc<dyn OwnershipIndex>) -> Self {
        Self { store, index }
    }

    // -- Lockers --

    pub fn list_lockers(&self) -> Result<Vec<Locker>> {
        self.store.list_lockers()
    }

    /// Appends the locker and records `slug -> owner_token` in the ownership index.
    /// Both land or neither does: if the index write fails the locker is
    /// removed again.
    pub fn save_locker(&self, locker: &Locker) -> Result<()> {
        self.store.insert_locker(locker)?;
        if let Err(err) = self.index.remember(&locker.slug, &locker.owner_token) {
            warn!(locker_id = %locker.id, "Ownership index write failed, rolling back locker");
            if let Err(undo) = self.store.remove_locker(&locker.id) {
                error!(locker_id = %locker.id, "Locker rollback failed: {:#}", undo);
            }
            return Err(err);
        }
        debug!(locker_id = %locker.id, slug = %locker.slug, "locker saved");
        Ok(())
    }

    pub fn find_locker_by_slug(&self, slug: &str) -> Result<Option<Locker>> {
        self.store.find_locker_by_slug(slug)
    }

    pub fn find_locker_by_token(&self, token: &str) -> Result<Option<Locker>> {
        self.store.find_locker_by_token(token)
    }

    // -- Gifts --

    pub fn list_gifts(&self) -> Result<Vec<Gift>> {
        self.store.list_gifts()
    }

    pub fn save_gift(&self, gift: &Gift) -> Result<()> {
        self.store.insert_gift(gift)?;
        debug!(gift_id = %gift.id, locker_id = %gift.locker_id, "gift saved");
        Ok(())
    }

    /// Summaries only, oldest first. Safe to hand to anyone holding the slug.
    pub fn gift_summaries_for_locker(&self, locker_id: &str) -> Result<Vec<GiftSummary>> {
        Ok(self
            .store
            .gifts_for_locker(locker_id)?
            .iter()
            .map(GiftSummary::from)
            .collect())
    }

    /// Full gifts, sender and message included. The only read that exposes
    /// message content; an unknown token yields an empty list.
    pub fn full_gifts_for_owner_token(&self, token: &str) -> Result<Vec<Gift>> {
        match self.store.find_locker_by_token(token)? {
            Some(locker) => self.store.gifts_for_locker(&locker.id),
            None => Ok(vec![]),
        }
    }

    // -- Ownership index --

    pub fn my_token_for_slug(&self, slug: &str) -> Result<Option<String>> {
        self.index.token_for_slug(slug)
    }
}
