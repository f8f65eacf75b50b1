use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use locker_types::api::{OwnerGift, OwnerLockerResponse};
use locker_types::relative_age;

use crate::error::LockerError;
use crate::flows::{OwnerView, now_millis};
use crate::state::{AppState, blocking};

/// GET /api/owner/{token}: every gift with sender and message.
/// Any token that does not resolve gets the same 403.
pub async fn get_owner_locker(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, LockerError> {
    let persistence = state.persistence(None);
    let view = blocking(move || OwnerView::load(&persistence, &token)).await?;
    let (locker, gifts) = view.into_granted()?;

    let now = now_millis();
    let gifts = gifts
        .into_iter()
        .map(|gift| OwnerGift {
            received: relative_age(now, gift.created_at),
            gift,
        })
        .collect();

    Ok(Json(OwnerLockerResponse {
        slug: locker.slug,
        owner_name: locker.owner_name,
        theme: locker.theme,
        gifts,
    }))
}
