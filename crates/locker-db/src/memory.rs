use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow, bail};
use locker_types::{Gift, Locker};

use crate::store::{LockerStore, OwnershipIndex};

/// In-memory [`LockerStore`]. Can be switched into an "unavailable" mode
/// where every call fails, to exercise storage-failure handling.
#[derive(Default)]
pub struct MemoryStore {
    lockers: Mutex<Vec<Locker>>,
    gifts: Mutex<Vec<Gift>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("memory store marked unavailable");
        }
        Ok(())
    }
}

impl LockerStore for MemoryStore {
    fn list_lockers(&self) -> Result<Vec<Locker>> {
        self.check()?;
        let lockers = self.lockers.lock().map_err(|e| anyhow!("lockers lock poisoned: {}", e))?;
        Ok(lockers.clone())
    }

    fn insert_locker(&self, locker: &Locker) -> Result<()> {
        self.check()?;
        let mut lockers = self.lockers.lock().map_err(|e| anyhow!("lockers lock poisoned: {}", e))?;
        lockers.push(locker.clone());
        Ok(())
    }

    fn remove_locker(&self, locker_id: &str) -> Result<()> {
        self.check()?;
        let mut lockers = self.lockers.lock().map_err(|e| anyhow!("lockers lock poisoned: {}", e))?;
        lockers.retain(|l| l.id != locker_id);
        Ok(())
    }

    fn list_gifts(&self) -> Result<Vec<Gift>> {
        self.check()?;
        let gifts = self.gifts.lock().map_err(|e| anyhow!("gifts lock poisoned: {}", e))?;
        Ok(gifts.clone())
    }

    fn insert_gift(&self, gift: &Gift) -> Result<()> {
        self.check()?;
        let mut gifts = self.gifts.lock().map_err(|e| anyhow!("gifts lock poisoned: {}", e))?;
        gifts.push(gift.clone());
        Ok(())
    }
}

/// In-memory [`OwnershipIndex`]. Also serves as the detached index for
/// clients that have not created anything yet.
#[derive(Default)]
pub struct MemoryIndex {
    tokens: Mutex<HashMap<String, String>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OwnershipIndex for MemoryIndex {
    fn remember(&self, slug: &str, owner_token: &str) -> Result<()> {
        let mut tokens = self.tokens.lock().map_err(|e| anyhow!("index lock poisoned: {}", e))?;
        tokens.insert(slug.to_string(), owner_token.to_string());
        Ok(())
    }

    fn token_for_slug(&self, slug: &str) -> Result<Option<String>> {
        let tokens = self.tokens.lock().map_err(|e| anyhow!("index lock poisoned: {}", e))?;
        Ok(tokens.get(slug).cloned())
    }
}
