use locker_db::Persistence;
use locker_types::{Gift, Locker};
use tracing::debug;

use crate::error::LockerError;

/// Whether the locker door is drawn open. Purely presentational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Reveal {
    #[default]
    Closed,
    Open,
}

/// Read-only view behind an owner token.
#[derive(Debug, Clone)]
pub enum OwnerView {
    /// Token did not resolve. Carries nothing, so a malformed token and an
    /// unknown one look the same.
    Denied,
    Granted {
        locker: Locker,
        gifts: Vec<Gift>,
        reveal: Reveal,
        /// Index into `gifts` of the gift being read, if any.
        current: Option<usize>,
    },
}

impl OwnerView {
    pub fn load(persistence: &Persistence, token: &str) -> Result<Self, LockerError> {
        let Some(locker) = persistence.find_locker_by_token(token)? else {
            debug!("Owner token did not resolve");
            return Ok(Self::Denied);
        };
        let gifts = persistence.full_gifts_for_owner_token(token)?;
        Ok(Self::Granted {
            locker,
            gifts,
            reveal: Reveal::Closed,
            current: None,
        })
    }

    /// `Denied` becomes `LockerError::AccessDenied`.
    pub fn into_granted(self) -> Result<(Locker, Vec<Gift>), LockerError> {
        match self {
            Self::Granted { locker, gifts, .. } => Ok((locker, gifts)),
            Self::Denied => Err(LockerError::AccessDenied),
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied)
    }

    pub fn gifts(&self) -> &[Gift] {
        match self {
            Self::Granted { gifts, .. } => gifts,
            Self::Denied => &[],
        }
    }

    pub fn reveal(&self) -> Reveal {
        match self {
            Self::Granted { reveal, .. } => *reveal,
            Self::Denied => Reveal::Closed,
        }
    }

    pub fn toggle_reveal(&mut self) {
        if let Self::Granted { reveal, .. } = self {
            *reveal = match reveal {
                Reveal::Closed => Reveal::Open,
                Reveal::Open => Reveal::Closed,
            };
        }
    }

    /// Open the gift with `gift_id`. Returns false if no such gift.
    pub fn select(&mut self, gift_id: &str) -> bool {
        let Self::Granted { gifts, current, .. } = self else {
            return false;
        };
        match gifts.iter().position(|g| g.id == gift_id) {
            Some(index) => {
                *current = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn close_detail(&mut self) {
        if let Self::Granted { current, .. } = self {
            *current = None;
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match self {
            Self::Granted { current, .. } => *current,
            Self::Denied => None,
        }
    }

    pub fn current(&self) -> Option<&Gift> {
        self.current_index().and_then(|i| self.gifts().get(i))
    }

    /// Move to the next gift, stopping at the last.
    pub fn next(&mut self) {
        self.step_by(1);
    }

    /// Move to the previous gift, stopping at the first.
    pub fn prev(&mut self) {
        self.step_by(-1);
    }

    fn step_by(&mut self, delta: isize) {
        if let Self::Granted { gifts, current: Some(index), .. } = self {
            let last = gifts.len().saturating_sub(1);
            *index = index.saturating_add_signed(delta).min(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use locker_db::{MemoryIndex, MemoryStore};
    use locker_types::{GiftType, Theme};
    use std::sync::Arc;

    fn with_gifts(n: usize) -> Persistence {
        let p = Persistence::new(Arc::new(MemoryStore::new()), Arc::new(MemoryIndex::new()));
        p.save_locker(&Locker {
            id: "l1".into(),
            slug: "jimin-ab12".into(),
            owner_name: "지민".into(),
            owner_token: "ot_secret".into(),
            theme: Theme::Mint,
            created_at: 0,
        })
        .unwrap();
        for i in 0..n {
            p.save_gift(&Gift {
                id: format!("g{i}"),
                locker_id: "l1".into(),
                gift_type: GiftType::Note,
                sender_name: "민수".into(),
                message: format!("message {i}"),
                created_at: i as i64,
            })
            .unwrap();
        }
        p
    }

    #[test]
    fn unknown_token_is_denied() {
        let p = with_gifts(2);
        for token in ["ot_wrong", "", "not-even-a-token", "ot_secret "] {
            let view = OwnerView::load(&p, token).unwrap();
            assert!(view.is_denied());
            assert!(view.gifts().is_empty());
            assert!(matches!(view.into_granted(), Err(LockerError::AccessDenied)));
        }
    }

    #[test]
    fn granted_view_exposes_full_gifts() {
        let view = OwnerView::load(&with_gifts(3), "ot_secret").unwrap();
        let (locker, gifts) = view.into_granted().unwrap();
        assert_eq!(locker.slug, "jimin-ab12");
        assert_eq!(gifts.len(), 3);
        assert_eq!(gifts[2].message, "message 2");
        assert_eq!(gifts[2].sender_name, "민수");
    }

    #[test]
    fn reveal_toggles_without_touching_data() {
        let mut view = OwnerView::load(&with_gifts(1), "ot_secret").unwrap();
        assert_eq!(view.reveal(), Reveal::Closed);
        view.toggle_reveal();
        assert_eq!(view.reveal(), Reveal::Open);
        view.toggle_reveal();
        assert_eq!(view.reveal(), Reveal::Closed);
        assert_eq!(view.gifts().len(), 1);
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut view = OwnerView::load(&with_gifts(5), "ot_secret").unwrap();

        assert!(view.select("g0"));
        view.prev();
        assert_eq!(view.current_index(), Some(0));

        assert!(view.select("g4"));
        view.next();
        assert_eq!(view.current_index(), Some(4));

        view.prev();
        view.prev();
        assert_eq!(view.current().unwrap().id, "g2");
    }

    #[test]
    fn select_unknown_gift_keeps_position() {
        let mut view = OwnerView::load(&with_gifts(2), "ot_secret").unwrap();
        assert!(view.select("g1"));
        assert!(!view.select("missing"));
        assert_eq!(view.current_index(), Some(1));
        view.close_detail();
        assert_eq!(view.current(), None);
        view.next();
        assert_eq!(view.current_index(), None);
    }

    #[test]
    fn denied_view_ignores_interaction() {
        let mut view = OwnerView::Denied;
        view.toggle_reveal();
        assert!(!view.select("g0"));
        view.next();
        assert_eq!(view.reveal(), Reveal::Closed);
        assert_eq!(view.current(), None);
    }
}
