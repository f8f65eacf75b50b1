//! Client-facing state machines. Each flow owns its in-progress state and
//! talks to storage only through [`Persistence`](locker_db::Persistence).

pub mod creation;
pub mod gift;
pub mod owner;

pub use creation::{CreationFlow, owner_url, share_url};
pub use gift::{DEFAULT_SEND_DELAY, GiftFlow};
pub use owner::{OwnerView, Reveal};

/// Epoch milliseconds, the timestamp unit of every stored record.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
