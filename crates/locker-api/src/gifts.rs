use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{debug, error};

use locker_types::api::{SendGiftRequest, SendGiftResponse};

use crate::error::LockerError;
use crate::flows::GiftFlow;
use crate::state::{AppState, blocking};

/// POST /api/lockers/{slug}/gifts: walks the gift wizard in one request.
///
/// Responds only after the send delay, once the gift is stored, so a client
/// can time its animation against the response. The gift is stored even if
/// the client goes away first.
pub async fn send_gift(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<SendGiftRequest>,
) -> Result<impl IntoResponse, LockerError> {
    let persistence = state.persistence(None);

    let loader = persistence.clone();
    let mut flow = blocking(move || GiftFlow::load(&loader, &slug)).await?;

    flow.open()?;
    if let Some(gift_type) = req.gift_type {
        flow.select_type(gift_type)?;
    }
    flow.next()?;
    flow.set_sender_name(req.sender_name)?;
    flow.set_anonymous(req.anonymous)?;
    flow.set_message(req.message)?;

    flow.begin_send(state.ids.as_ref())?;

    // Detached: a client hanging up mid-delay must not drop the gift.
    let delay = state.send_delay;
    debug!(slug = %flow.locker().slug, delay_ms = delay.as_millis() as u64, "Sending gift");
    let sending = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        blocking(move || {
            let gift = flow.complete_send(&persistence)?;
            Ok((gift, flow.summaries().to_vec()))
        })
        .await
    });

    let (gift, gifts) = sending.await.map_err(|e| {
        error!("gift send task failed: {}", e);
        LockerError::StorageUnavailable(anyhow::anyhow!("gift send task failed: {}", e))
    })??;

    Ok((StatusCode::CREATED, Json(SendGiftResponse { gift, gifts })))
}
