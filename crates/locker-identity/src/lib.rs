//! Locker identity generation
//!
//! Slugs are public and only need to avoid collisions between lockers that
//! share an owner name. Owner tokens are the sole access control for reading
//! gift contents, so both are drawn from the thread-local CSPRNG
//! (`rand::rng()`, OS-seeded ChaCha).
//!
//! Tokens are bearer credentials: no revocation, rotation or expiry.

pub mod slug;
pub mod token;

pub use slug::{generate_slug, slug_base};
pub use token::{generate_owner_token, new_record_id, OWNER_TOKEN_PREFIX};

/// Source of the identifiers minted when a locker or gift is created.
/// Swappable so callers can script collisions in tests.
pub trait IdentityGenerator: Send + Sync {
    fn slug(&self, owner_name: &str) -> String;
    fn owner_token(&self) -> String;
    fn record_id(&self) -> String;
}

/// Production generator backed by the thread RNG and UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdentity;

impl IdentityGenerator for RandomIdentity {
    fn slug(&self, owner_name: &str) -> String {
        generate_slug(owner_name)
    }

    fn owner_token(&self) -> String {
        generate_owner_token()
    }

    fn record_id(&self) -> String {
        new_record_id()
    }
}

/// Lowercase alphanumerics only, so generated parts survive any URL context.
pub(crate) const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub(crate) fn random_string<R: rand::Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
