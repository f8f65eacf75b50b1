pub mod api;
pub mod models;

pub use models::{Gift, GiftSummary, GiftType, Locker, Theme, pile, relative_age};
