use locker_db::Persistence;
use locker_identity::IdentityGenerator;
use locker_types::models::MAX_OWNER_NAME_CHARS;
use locker_types::{Locker, Theme};
use tracing::{info, warn};

use crate::error::{LockerError, Validation};
use crate::flows::now_millis;

/// How many fresh slug/token pairs to try before giving up on collisions.
const MAX_IDENTITY_ATTEMPTS: usize = 5;

/// `Editing -> Created`. A flow creates at most one locker; starting over
/// means a new flow.
#[derive(Debug, Clone)]
pub enum CreationFlow {
    Editing { owner_name: String, theme: Theme },
    Created(Locker),
}

impl Default for CreationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CreationFlow {
    pub fn new() -> Self {
        Self::Editing {
            owner_name: String::new(),
            theme: Theme::default(),
        }
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Editing { .. } => "editing",
            Self::Created(_) => "created",
        }
    }

    pub fn set_owner_name(&mut self, name: impl Into<String>) -> Result<(), LockerError> {
        match self {
            Self::Editing { owner_name, .. } => {
                *owner_name = name.into();
                Ok(())
            }
            Self::Created(_) => Err(self.invalid("edit the name")),
        }
    }

    pub fn set_theme(&mut self, new_theme: Theme) -> Result<(), LockerError> {
        match self {
            Self::Editing { theme, .. } => {
                *theme = new_theme;
                Ok(())
            }
            Self::Created(_) => Err(self.invalid("change the theme")),
        }
    }

    /// Whether the submit action is enabled.
    pub fn can_submit(&self) -> bool {
        match self {
            Self::Editing { owner_name, .. } => validate_owner_name(owner_name).is_ok(),
            Self::Created(_) => false,
        }
    }

    /// Mint identifiers, persist the locker and move to `Created`.
    ///
    /// Slug and token are regenerated when either already belongs to a
    /// stored locker.
    pub fn submit(
        &mut self,
        persistence: &Persistence,
        ids: &dyn IdentityGenerator,
    ) -> Result<Locker, LockerError> {
        let (owner_name, theme) = match self {
            Self::Editing { owner_name, theme } => (validate_owner_name(owner_name)?, *theme),
            Self::Created(_) => return Err(self.invalid("submit")),
        };

        let (slug, owner_token) = unique_identity(persistence, ids, &owner_name)?;
        let locker = Locker {
            id: ids.record_id(),
            slug,
            owner_name,
            owner_token,
            theme,
            created_at: now_millis(),
        };

        persistence.save_locker(&locker)?;
        info!(locker_id = %locker.id, slug = %locker.slug, theme = %locker.theme, "Locker created");

        *self = Self::Created(locker.clone());
        Ok(locker)
    }

    pub fn created(&self) -> Option<&Locker> {
        match self {
            Self::Created(locker) => Some(locker),
            Self::Editing { .. } => None,
        }
    }

    fn invalid(&self, action: &'static str) -> LockerError {
        LockerError::InvalidTransition {
            action,
            state: self.state_name(),
        }
    }
}

/// Trimmed name, 1..=10 characters.
pub fn validate_owner_name(raw: &str) -> Result<String, Validation> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Validation::EmptyName);
    }
    if name.chars().count() > MAX_OWNER_NAME_CHARS {
        return Err(Validation::NameTooLong);
    }
    Ok(name.to_string())
}

fn unique_identity(
    persistence: &Persistence,
    ids: &dyn IdentityGenerator,
    owner_name: &str,
) -> Result<(String, String), LockerError> {
    for attempt in 1..=MAX_IDENTITY_ATTEMPTS {
        let slug = ids.slug(owner_name);
        let token = ids.owner_token();
        let slug_taken = persistence.find_locker_by_slug(&slug)?.is_some();
        let token_taken = persistence.find_locker_by_token(&token)?.is_some();
        if !slug_taken && !token_taken {
            return Ok((slug, token));
        }
        warn!(attempt, slug_taken, token_taken, "Identifier collision, regenerating");
    }
    Err(LockerError::Conflict("could not generate a unique locker address"))
}

/// Public link visitors use to leave gifts.
pub fn share_url(public_url: &str, slug: &str) -> String {
    format!("{}/#/locker/{}", public_url.trim_end_matches('/'), slug)
}

/// Private link that reveals every gift. Anyone holding it can read them.
pub fn owner_url(public_url: &str, owner_token: &str) -> String {
    format!("{}/#/owner/{}", public_url.trim_end_matches('/'), owner_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use locker_db::{LockerStore, MemoryIndex, MemoryStore, OwnershipIndex};
    use locker_identity::{OWNER_TOKEN_PREFIX, RandomIdentity};
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    fn persistence() -> Persistence {
        Persistence::new(Arc::new(MemoryStore::new()), Arc::new(MemoryIndex::new()))
    }

    /// Hands out a scripted sequence of slugs/tokens, then falls back to random.
    struct Scripted {
        slugs: Mutex<Vec<&'static str>>,
        tokens: Mutex<Vec<&'static str>>,
    }

    impl Scripted {
        fn new(slugs: Vec<&'static str>, tokens: Vec<&'static str>) -> Self {
            Self {
                slugs: Mutex::new(slugs),
                tokens: Mutex::new(tokens),
            }
        }
    }

    impl IdentityGenerator for Scripted {
        fn slug(&self, owner_name: &str) -> String {
            let mut slugs = self.slugs.lock().unwrap();
            if slugs.is_empty() {
                RandomIdentity.slug(owner_name)
            } else {
                slugs.remove(0).to_string()
            }
        }

        fn owner_token(&self) -> String {
            let mut tokens = self.tokens.lock().unwrap();
            if tokens.is_empty() {
                RandomIdentity.owner_token()
            } else {
                tokens.remove(0).to_string()
            }
        }

        fn record_id(&self) -> String {
            RandomIdentity.record_id()
        }
    }

    fn create(p: &Persistence, ids: &dyn IdentityGenerator, name: &str) -> Result<Locker, LockerError> {
        let mut flow = CreationFlow::new();
        flow.set_owner_name(name)?;
        flow.submit(p, ids)
    }

    #[test]
    fn submit_is_disabled_until_name_is_valid() {
        let mut flow = CreationFlow::new();
        assert!(!flow.can_submit());
        flow.set_owner_name("   ").unwrap();
        assert!(!flow.can_submit());
        flow.set_owner_name("abcdefghijk").unwrap();
        assert!(!flow.can_submit());
        flow.set_owner_name(" abcdefghij ").unwrap();
        assert!(flow.can_submit());
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        assert!(validate_owner_name("가나다라마바사아자차").is_ok());
        assert_eq!(validate_owner_name("가나다라마바사아자차카"), Err(Validation::NameTooLong));
        assert_eq!(validate_owner_name(""), Err(Validation::EmptyName));
    }

    #[test]
    fn mint_locker_for_korean_name() {
        let p = persistence();
        let mut flow = CreationFlow::new();
        flow.set_owner_name("지민").unwrap();
        flow.set_theme(Theme::Mint).unwrap();
        let locker = flow.submit(&p, &RandomIdentity).unwrap();

        let suffix = locker.slug.strip_prefix("지민-").unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert!(locker.owner_token.starts_with(OWNER_TOKEN_PREFIX));
        assert!(locker.owner_token.len() > OWNER_TOKEN_PREFIX.len());
        assert_eq!(locker.theme, Theme::Mint);
        assert_eq!(locker.owner_name, "지민");

        assert_eq!(p.find_locker_by_slug(&locker.slug).unwrap(), Some(locker.clone()));
        assert_eq!(p.my_token_for_slug(&locker.slug).unwrap(), Some(locker.owner_token));
    }

    #[test]
    fn stored_name_is_trimmed() {
        let p = persistence();
        let locker = create(&p, &RandomIdentity, "  Mina Kim ").unwrap();
        assert_eq!(locker.owner_name, "Mina Kim");
        assert!(locker.slug.starts_with("mina-kim-"));
    }

    #[test]
    fn every_valid_length_yields_a_distinct_token() {
        let p = persistence();
        let mut tokens = HashSet::new();
        for len in 1..=MAX_OWNER_NAME_CHARS {
            let name = "a".repeat(len);
            let locker = create(&p, &RandomIdentity, &name).unwrap();
            assert!(locker.slug.starts_with(&format!("{name}-")));
            assert!(tokens.insert(locker.owner_token));
        }
    }

    #[test]
    fn created_is_terminal() {
        let p = persistence();
        let mut flow = CreationFlow::new();
        flow.set_owner_name("mina").unwrap();
        flow.submit(&p, &RandomIdentity).unwrap();

        assert!(!flow.can_submit());
        assert!(matches!(
            flow.submit(&p, &RandomIdentity),
            Err(LockerError::InvalidTransition { state: "created", .. })
        ));
        assert!(flow.set_owner_name("other").is_err());
        assert!(flow.set_theme(Theme::Mint).is_err());
        assert_eq!(p.list_lockers().unwrap().len(), 1);
    }

    #[test]
    fn invalid_name_never_reaches_storage() {
        let p = persistence();
        let mut flow = CreationFlow::new();
        flow.set_owner_name("  ").unwrap();
        assert!(matches!(
            flow.submit(&p, &RandomIdentity),
            Err(LockerError::ValidationFailed(Validation::EmptyName))
        ));
        assert_eq!(flow.state_name(), "editing");
        assert!(p.list_lockers().unwrap().is_empty());
    }

    #[test]
    fn colliding_slug_is_regenerated() {
        let p = persistence();
        let ids = Scripted::new(vec!["mina-aaaa", "mina-aaaa", "mina-bbbb"], vec![]);
        let first = create(&p, &ids, "mina").unwrap();
        let second = create(&p, &ids, "mina").unwrap();
        assert_eq!(first.slug, "mina-aaaa");
        assert_eq!(second.slug, "mina-bbbb");
    }

    #[test]
    fn colliding_token_is_regenerated() {
        let p = persistence();
        let ids = Scripted::new(vec![], vec!["ot_same", "ot_same", "ot_fresh"]);
        create(&p, &ids, "a").unwrap();
        assert_eq!(create(&p, &ids, "b").unwrap().owner_token, "ot_fresh");
    }

    #[test]
    fn persistent_collisions_give_up() {
        let p = persistence();
        let ids = Scripted::new(vec!["x-0000"; 1 + MAX_IDENTITY_ATTEMPTS], vec![]);
        create(&p, &ids, "x").unwrap();
        assert!(matches!(create(&p, &ids, "x"), Err(LockerError::Conflict(_))));
        assert_eq!(p.list_lockers().unwrap().len(), 1);
    }

    #[test]
    fn storage_failure_keeps_flow_editable() {
        let store = Arc::new(MemoryStore::new());
        let p = Persistence::new(store.clone(), Arc::new(MemoryIndex::new()));
        store.set_unavailable(true);

        let mut flow = CreationFlow::new();
        flow.set_owner_name("mina").unwrap();
        assert!(matches!(
            flow.submit(&p, &RandomIdentity),
            Err(LockerError::StorageUnavailable(_))
        ));
        assert!(flow.can_submit());

        store.set_unavailable(false);
        assert!(flow.submit(&p, &RandomIdentity).is_ok());
    }

    struct BrokenIndex;

    impl OwnershipIndex for BrokenIndex {
        fn remember(&self, _slug: &str, _owner_token: &str) -> anyhow::Result<()> {
            anyhow::bail!("index unavailable")
        }

        fn token_for_slug(&self, _slug: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn failed_index_write_does_not_leave_orphans_on_retry() {
        let store = Arc::new(MemoryStore::new());
        let p = Persistence::new(store.clone(), Arc::new(BrokenIndex));

        let mut flow = CreationFlow::new();
        flow.set_owner_name("mina").unwrap();
        for _ in 0..2 {
            assert!(matches!(
                flow.submit(&p, &RandomIdentity),
                Err(LockerError::StorageUnavailable(_))
            ));
            assert_eq!(flow.state_name(), "editing");
        }
        assert!(store.list_lockers().unwrap().is_empty());
    }

    #[test]
    fn derived_urls() {
        assert_eq!(share_url("https://v.day/", "mina-ab12"), "https://v.day/#/locker/mina-ab12");
        assert_eq!(owner_url("https://v.day", "ot_x"), "https://v.day/#/owner/ot_x");
    }
}
