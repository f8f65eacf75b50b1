//! The `locker_device` cookie: an opaque id that scopes the ownership index
//! to the browser that created a locker. Knowing it grants nothing beyond
//! recalling that browser's own owner links.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use locker_identity::new_record_id;

pub const DEVICE_COOKIE: &str = "locker_device";

pub fn device_id(jar: &CookieJar) -> Option<String> {
    jar.get(DEVICE_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Existing device id, or a freshly minted one added to the jar.
pub fn ensure_device(jar: CookieJar) -> (CookieJar, String) {
    if let Some(id) = device_id(&jar) {
        return (jar, id);
    }
    let id = new_record_id();
    let cookie = Cookie::build((DEVICE_COOKIE, id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .permanent();
    (jar.add(cookie), id)
}
