use rand::Rng;

use crate::random_string;

/// Random characters appended to every slug.
pub const SLUG_SUFFIX_LEN: usize = 4;

/// Used when nothing URL-safe survives normalisation (e.g. a name of only punctuation).
const FALLBACK_BASE: &str = "locker";

/// Normalise an owner name into the human-readable half of a slug.
///
/// Trims, lowercases, collapses whitespace runs into a single `-`, and drops
/// anything that is not alphanumeric, `-` or `_`. Non-ASCII letters are kept:
/// `"지민"` stays `"지민"`.
pub fn slug_base(owner_name: &str) -> String {
    let mut base = String::with_capacity(owner_name.len());
    let mut pending_dash = false;

    for c in owner_name.trim().chars() {
        if c.is_whitespace() {
            pending_dash = !base.is_empty();
            continue;
        }
        if !(c.is_alphanumeric() || c == '-' || c == '_') {
            continue;
        }
        if pending_dash {
            base.push('-');
            pending_dash = false;
        }
        base.extend(c.to_lowercase());
    }

    if base.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        base
    }
}

/// `"Ji Min"` -> `"ji-min-k3x9"`.
pub fn generate_slug(owner_name: &str) -> String {
    generate_slug_with(&mut rand::rng(), owner_name)
}

pub fn generate_slug_with<R: Rng + ?Sized>(rng: &mut R, owner_name: &str) -> String {
    format!("{}-{}", slug_base(owner_name), random_string(rng, SLUG_SUFFIX_LEN))
}
