use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;

use locker_types::pile;
use locker_types::api::{CreateLockerRequest, CreateLockerResponse, LockerResponse, MyLockerResponse};

use crate::device;
use crate::error::LockerError;
use crate::flows::{CreationFlow, GiftFlow, owner_url, share_url};
use crate::state::{AppState, blocking};

/// POST /api/lockers: runs the creation flow and remembers the new locker
/// in the caller's ownership index.
pub async fn create_locker(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<CreateLockerRequest>,
) -> Result<impl IntoResponse, LockerError> {
    let (jar, device_id) = device::ensure_device(jar);
    let persistence = state.persistence(Some(&device_id));
    let ids = state.ids.clone();

    let locker = blocking(move || {
        let mut flow = CreationFlow::new();
        flow.set_owner_name(req.owner_name)?;
        flow.set_theme(req.theme)?;
        flow.submit(&persistence, ids.as_ref())
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        jar,
        Json(CreateLockerResponse {
            share_url: share_url(&state.public_url, &locker.slug),
            owner_url: owner_url(&state.public_url, &locker.owner_token),
            locker_id: locker.id,
            slug: locker.slug,
            owner_token: locker.owner_token,
        }),
    ))
}

/// GET /api/lockers/{slug}. Public view with owner name, theme and the gift pile
/// as summaries only.
pub async fn get_locker(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, LockerError> {
    let persistence = state.persistence(None);
    let flow = blocking(move || GiftFlow::load(&persistence, &slug)).await?;
    let locker = flow.locker();
    let (_, extra_count) = pile(flow.summaries());

    Ok(Json(LockerResponse {
        slug: locker.slug.clone(),
        owner_name: locker.owner_name.clone(),
        theme: locker.theme,
        gifts: flow.summaries().to_vec(),
        extra_count,
    }))
}

/// GET /api/lockers/{slug}/mine: the owner link for a locker this browser
/// created, if it did.
pub async fn my_locker(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, LockerError> {
    let device_id = device::device_id(&jar).ok_or(LockerError::NotFound("locker"))?;
    let persistence = state.persistence(Some(&device_id));

    let lookup_slug = slug.clone();
    let owner_token = blocking(move || Ok(persistence.my_token_for_slug(&lookup_slug)?))
        .await?
        .ok_or(LockerError::NotFound("locker"))?;

    Ok(Json(MyLockerResponse {
        owner_url: owner_url(&state.public_url, &owner_token),
        slug,
        owner_token,
    }))
}
