use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sender name stored when a visitor opts out of disclosure or leaves the field blank.
pub const ANONYMOUS_SENDER: &str = "익명";

/// Owner names are 1..=10 characters after trimming.
pub const MAX_OWNER_NAME_CHARS: usize = 10;

/// Gift messages are 1..=200 characters after trimming.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// Presentation theme of a locker. Has no effect on behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Pink,
    Mint,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pink => "pink",
            Self::Mint => "mint",
        }
    }

    /// Accent colour token the front-end uses for buttons and headings.
    pub fn accent(self) -> &'static str {
        match self {
            Self::Pink => "pink-500",
            Self::Mint => "teal-500",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pink" => Ok(Self::Pink),
            "mint" => Ok(Self::Mint),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// The closed set of gifts a visitor can leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GiftType {
    Note,
    ChocoBar,
    TeddyBear,
}

impl GiftType {
    pub const ALL: [GiftType; 3] = [Self::Note, Self::ChocoBar, Self::TeddyBear];

    /// Wire and storage name, e.g. `CHOCO_BAR`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "NOTE",
            Self::ChocoBar => "CHOCO_BAR",
            Self::TeddyBear => "TEDDY_BEAR",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Note => "✉️",
            Self::ChocoBar => "🍫",
            Self::TeddyBear => "🧸",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Note => "쪽지",
            Self::ChocoBar => "초콜릿",
            Self::TeddyBear => "곰인형",
        }
    }
}

impl fmt::Display for GiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GiftType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Returned when a stored enum column holds a value outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

/// A named, themed container. Created once, never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locker {
    pub id: String,
    /// Public, URL-safe identifier (e.g. `jimin-x7k2`)
    pub slug: String,
    pub owner_name: String,
    /// Bearer credential for reading every gift in this locker.
    pub owner_token: String,
    pub theme: Theme,
    /// Epoch milliseconds
    pub created_at: i64,
}

/// A message left in a locker. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gift {
    pub id: String,
    pub locker_id: String,
    pub gift_type: GiftType,
    pub sender_name: String,
    pub message: String,
    /// Epoch milliseconds
    pub created_at: i64,
}

/// The privacy-safe projection of a [`Gift`]: no sender, no message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftSummary {
    pub id: String,
    pub gift_type: GiftType,
    pub created_at: i64,
}

impl From<&Gift> for GiftSummary {
    fn from(gift: &Gift) -> Self {
        Self {
            id: gift.id.clone(),
            gift_type: gift.gift_type,
            created_at: gift.created_at,
        }
    }
}

/// Gifts drawn inside the locker before the rest collapse into a "+N" badge.
pub const PILE_LIMIT: usize = 12;

/// Split a gift pile into the summaries that are drawn and the count of
/// those that are not.
pub fn pile(summaries: &[GiftSummary]) -> (&[GiftSummary], usize) {
    let shown = summaries.len().min(PILE_LIMIT);
    (&summaries[..shown], summaries.len() - shown)
}

/// How long ago `created_at` was, as the owner view prints it: "방금 전",
/// "N분 전", "N시간 전" or "N일 전". Both arguments are epoch milliseconds;
/// timestamps in the future read as "방금 전".
pub fn relative_age(now: i64, created_at: i64) -> String {
    let minutes = now.saturating_sub(created_at).max(0) / 60_000;
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 1 {
        "방금 전".to_string()
    } else if minutes < 60 {
        format!("{minutes}분 전")
    } else if hours < 24 {
        format!("{hours}시간 전")
    } else {
        format!("{days}일 전")
    }
}
