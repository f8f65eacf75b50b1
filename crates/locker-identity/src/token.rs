use rand::Rng;

use crate::random_string;

/// Every owner token starts with this, so tokens are recognisable in logs and URLs.
pub const OWNER_TOKEN_PREFIX: &str = "ot_";

/// 24 characters from a 36-symbol alphabet, ~124 bits.
pub const OWNER_TOKEN_RANDOM_LEN: usize = 24;

pub fn generate_owner_token() -> String {
    generate_owner_token_with(&mut rand::rng())
}

pub fn generate_owner_token_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}{}", OWNER_TOKEN_PREFIX, random_string(rng, OWNER_TOKEN_RANDOM_LEN))
}

/// Opaque id for a locker or gift row.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
