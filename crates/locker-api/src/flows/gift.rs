use std::time::Duration;

use locker_db::Persistence;
use locker_identity::IdentityGenerator;
use locker_types::models::{ANONYMOUS_SENDER, MAX_MESSAGE_CHARS};
use locker_types::{Gift, GiftSummary, GiftType, Locker};
use tracing::{debug, info, warn};

use crate::error::{LockerError, Validation};
use crate::flows::now_millis;

/// Time the "gift flying into the locker" animation needs before the gift
/// may be stored or shown.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Closed,
    TypeSelect,
    Compose,
    /// Gift built, waiting out the send delay. Not cancellable.
    Sending(Gift),
    Sent,
    /// Visitor left to create their own locker. Terminal.
    Left,
}

/// Gift submission wizard for one locker:
/// `Closed -> TypeSelect -> Compose -> Sending -> Sent`.
///
/// Holds the locker's gift summaries so the pile can be redrawn without a
/// reload once a gift lands.
#[derive(Debug, Clone)]
pub struct GiftFlow {
    locker: Locker,
    summaries: Vec<GiftSummary>,
    step: Step,
    selected: Option<GiftType>,
    sender_name: String,
    message: String,
    anonymous: bool,
}

impl GiftFlow {
    pub fn new(locker: Locker, summaries: Vec<GiftSummary>) -> Self {
        Self {
            locker,
            summaries,
            step: Step::Closed,
            selected: None,
            sender_name: String::new(),
            message: String::new(),
            anonymous: false,
        }
    }

    /// Resolve the locker behind a public slug and load its gift pile.
    pub fn load(persistence: &Persistence, slug: &str) -> Result<Self, LockerError> {
        let locker = persistence
            .find_locker_by_slug(slug)?
            .ok_or(LockerError::NotFound("locker"))?;
        let summaries = persistence.gift_summaries_for_locker(&locker.id)?;
        Ok(Self::new(locker, summaries))
    }

    pub fn locker(&self) -> &Locker {
        &self.locker
    }

    pub fn summaries(&self) -> &[GiftSummary] {
        &self.summaries
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn selected_type(&self) -> Option<GiftType> {
        self.selected
    }

    pub fn state_name(&self) -> &'static str {
        match self.step {
            Step::Closed => "closed",
            Step::TypeSelect => "selecting a gift type",
            Step::Compose => "composing",
            Step::Sending(_) => "sending",
            Step::Sent => "sent",
            Step::Left => "left",
        }
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.step, Step::Sending(_))
    }

    // -- Transitions --

    /// "Give a gift".
    pub fn open(&mut self) -> Result<(), LockerError> {
        self.require_step(&[Step::Closed], "open the gift flow")?;
        self.step = Step::TypeSelect;
        Ok(())
    }

    pub fn select_type(&mut self, gift_type: GiftType) -> Result<(), LockerError> {
        self.require_step(&[Step::TypeSelect], "select a gift type")?;
        self.selected = Some(gift_type);
        Ok(())
    }

    pub fn can_advance(&self) -> bool {
        self.step == Step::TypeSelect && self.selected.is_some()
    }

    /// TypeSelect -> Compose.
    pub fn next(&mut self) -> Result<(), LockerError> {
        self.require_step(&[Step::TypeSelect], "advance")?;
        if self.selected.is_none() {
            return Err(Validation::NoGiftType.into());
        }
        self.step = Step::Compose;
        Ok(())
    }

    /// Compose -> TypeSelect keeping the chosen type; TypeSelect -> Closed.
    pub fn back(&mut self) -> Result<(), LockerError> {
        match self.step {
            Step::Compose => {
                self.step = Step::TypeSelect;
                Ok(())
            }
            Step::TypeSelect => self.cancel(),
            _ => Err(self.invalid("go back")),
        }
    }

    /// Close the wizard and drop everything composed so far. Not offered
    /// once sending has started.
    pub fn cancel(&mut self) -> Result<(), LockerError> {
        self.require_step(&[Step::TypeSelect, Step::Compose], "cancel")?;
        self.clear_draft();
        self.step = Step::Closed;
        Ok(())
    }

    pub fn set_sender_name(&mut self, name: impl Into<String>) -> Result<(), LockerError> {
        self.require_step(&[Step::Compose], "edit the sender name")?;
        self.sender_name = name.into();
        Ok(())
    }

    pub fn set_anonymous(&mut self, anonymous: bool) -> Result<(), LockerError> {
        self.require_step(&[Step::Compose], "toggle anonymity")?;
        self.anonymous = anonymous;
        Ok(())
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> Result<(), LockerError> {
        self.require_step(&[Step::Compose], "edit the message")?;
        self.message = message.into();
        Ok(())
    }

    /// Whether the send action is enabled.
    pub fn can_send(&self) -> bool {
        self.step == Step::Compose && self.selected.is_some() && validate_message(&self.message).is_ok()
    }

    /// Compose -> Sending. Builds the gift but stores nothing.
    pub fn begin_send(&mut self, ids: &dyn IdentityGenerator) -> Result<Gift, LockerError> {
        self.require_step(&[Step::Compose], "send")?;
        let gift_type = self.selected.ok_or(Validation::NoGiftType)?;
        let message = validate_message(&self.message)?;

        let gift = Gift {
            id: ids.record_id(),
            locker_id: self.locker.id.clone(),
            gift_type,
            sender_name: resolve_sender(&self.sender_name, self.anonymous),
            message,
            created_at: now_millis(),
        };

        debug!(gift_id = %gift.id, locker_id = %gift.locker_id, "Gift in flight");
        self.step = Step::Sending(gift.clone());
        Ok(gift)
    }

    /// Sending -> Sent. Stores the gift and appends its summary locally.
    ///
    /// On storage failure the flow returns to `Compose` with the draft intact
    /// so the visitor can retry.
    pub fn complete_send(&mut self, persistence: &Persistence) -> Result<GiftSummary, LockerError> {
        let gift = match &self.step {
            Step::Sending(gift) => gift.clone(),
            _ => return Err(self.invalid("finish sending")),
        };

        if let Err(err) = persistence.save_gift(&gift) {
            warn!(gift_id = %gift.id, "Gift could not be stored, back to compose");
            self.step = Step::Compose;
            return Err(err.into());
        }

        let summary = GiftSummary::from(&gift);
        self.summaries.push(summary.clone());
        self.step = Step::Sent;
        info!(gift_id = %gift.id, locker_id = %gift.locker_id, gift_type = %gift.gift_type, "Gift delivered");
        Ok(summary)
    }

    /// The whole send: build, wait out `delay`, then store.
    pub async fn send(
        &mut self,
        persistence: &Persistence,
        ids: &dyn IdentityGenerator,
        delay: Duration,
    ) -> Result<GiftSummary, LockerError> {
        self.begin_send(ids)?;
        tokio::time::sleep(delay).await;
        self.complete_send(persistence)
    }

    /// Sent -> TypeSelect with a blank draft ("send another").
    pub fn restart(&mut self) -> Result<(), LockerError> {
        self.require_step(&[Step::Sent], "restart")?;
        self.clear_draft();
        self.step = Step::TypeSelect;
        Ok(())
    }

    /// Sent -> Left ("make my own locker").
    pub fn leave(&mut self) -> Result<(), LockerError> {
        self.require_step(&[Step::Sent], "leave")?;
        self.step = Step::Left;
        Ok(())
    }

    fn clear_draft(&mut self) {
        self.selected = None;
        self.sender_name.clear();
        self.message.clear();
        self.anonymous = false;
    }

    fn require_step(&self, allowed: &[Step], action: &'static str) -> Result<(), LockerError> {
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> LockerError {
        LockerError::InvalidTransition {
            action,
            state: self.state_name(),
        }
    }
}

/// Trimmed message, 1..=200 characters.
pub fn validate_message(raw: &str) -> Result<String, Validation> {
    let message = raw.trim();
    if message.is_empty() {
        return Err(Validation::EmptyMessage);
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(Validation::MessageTooLong);
    }
    Ok(message.to_string())
}

fn resolve_sender(name: &str, anonymous: bool) -> String {
    let name = name.trim();
    if anonymous || name.is_empty() {
        ANONYMOUS_SENDER.to_string()
    } else {
        name.to_string()
    }
}
