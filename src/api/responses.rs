use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    api::middleware::{ApiResult, AppState},
    models::{CreateInviteRequest, SponsorInvite, SponsorReply},
    services::ResponseService,
};

/// POST /api/campaigns/:id/sponsors - Add a sponsor and mint their token
pub async fn create_sponsor(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Json(req): Json<CreateInviteRequest>,
) -> ApiResult<(StatusCode, Json<SponsorInvite>)> {
    let invite = ResponseService::create_invite(state.store.as_ref(), &campaign_id, &req).await?;
    Ok((StatusCode::CREATED, Json(invite)))
}

/// GET /api/sponsor-responses/:token - Public invite lookup
///
/// Returns only what the response page needs to render; the sponsor's email
/// stays private.
pub async fn get_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<Value>> {
    let invite = ResponseService::get_invite(state.store.as_ref(), &token).await?;

    Ok(Json(json!({
        "campaign_id": invite.campaign_id,
        "sponsor_name": invite.sponsor_name,
        "status": invite.status,
    })))
}

/// POST /api/sponsor-responses/:token - Accept or decline an invitation
pub async fn submit_response(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(reply): Json<SponsorReply>,
) -> ApiResult<Json<Value>> {
    let invite = ResponseService::submit_reply(state.store.as_ref(), &token, &reply).await?;

    Ok(Json(json!({
        "ok": true,
        "status": invite.status,
    })))
}
