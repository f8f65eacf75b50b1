use serde::{Deserialize, Serialize};

use crate::models::{Gift, GiftSummary, GiftType, Theme};

// -- Lockers --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateLockerRequest {
    pub owner_name: String,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLockerResponse {
    pub locker_id: String,
    pub slug: String,
    pub owner_token: String,
    pub share_url: String,
    pub owner_url: String,
}

/// Public view of a locker: what any visitor holding the slug may see.
#[derive(Debug, Serialize, Deserialize)]
pub struct LockerResponse {
    pub slug: String,
    pub owner_name: String,
    pub theme: Theme,
    pub gifts: Vec<GiftSummary>,
    /// Gifts beyond the ones drawn in the locker, shown as "+N".
    pub extra_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MyLockerResponse {
    pub slug: String,
    pub owner_token: String,
    pub owner_url: String,
}

// -- Gifts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendGiftRequest {
    pub gift_type: Option<GiftType>,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub anonymous: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGiftResponse {
    pub gift: GiftSummary,
    /// Every summary in the locker, the new one last.
    pub gifts: Vec<GiftSummary>,
}

// -- Owner --

#[derive(Debug, Serialize, Deserialize)]
pub struct OwnerLockerResponse {
    pub slug: String,
    pub owner_name: String,
    pub theme: Theme,
    pub gifts: Vec<OwnerGift>,
}

/// A full gift plus its age as the owner view prints it.
#[derive(Debug, Serialize, Deserialize)]
pub struct OwnerGift {
    #[serde(flatten)]
    pub gift: Gift,
    /// e.g. "3시간 전"
    pub received: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
