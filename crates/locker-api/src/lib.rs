//! Locker flows and their HTTP surface.
//!
//! `flows` holds the three state machines (locker creation, gift submission,
//! owner view) and is usable without any web framework. The remaining
//! modules expose those flows over axum.

pub mod device;
pub mod error;
pub mod flows;
pub mod gifts;
pub mod lockers;
pub mod owner;
pub mod router;
pub mod state;

pub use error::{LockerError, Validation};
pub use router::router;
pub use state::{AppState, AppStateInner};
