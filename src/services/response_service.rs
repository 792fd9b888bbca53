use crate::api::middleware::error::{ApiError, ApiResult};
use crate::datasource::{DataSource, Filter};
use crate::models::{CreateInviteRequest, InviteStatus, ReplyDecision, SponsorInvite, SponsorReply};
use serde_json::{json, Value};

pub const SPONSORS_TABLE: &str = "campaign_sponsors";

const SPONSOR_COLUMNS: &str = "id,campaign_id,tenant_id,sponsor_name,sponsor_email,token,\
                               status,response_message,responded_at,created_at";

/// Generate an unguessable response token (32 bytes = 64 hex characters).
pub fn generate_response_token() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

fn decode_invite(row: &Value) -> ApiResult<SponsorInvite> {
    serde_json::from_value(row.clone())
        .map_err(|e| ApiError::Internal(format!("Malformed sponsor row: {}", e)))
}

/// Service for the public sponsor-response flow.
pub struct ResponseService;

impl ResponseService {
    /// Add a sponsor to a campaign and mint their response token.
    pub async fn create_invite(
        store: &dyn DataSource,
        campaign_id: &str,
        req: &CreateInviteRequest,
    ) -> ApiResult<SponsorInvite> {
        if !email_address::EmailAddress::is_valid(&req.sponsor_email) {
            return Err(ApiError::BadRequest("Invalid sponsor email address".to_string()));
        }

        let invite = SponsorInvite::new(
            campaign_id.to_string(),
            req.club_id.clone(),
            req.sponsor_name.clone(),
            req.sponsor_email.clone(),
            generate_response_token(),
        );

        let payload = serde_json::to_value(&invite)
            .map_err(|e| ApiError::Internal(format!("Failed to encode sponsor invite: {}", e)))?;

        store
            .insert_row(SPONSORS_TABLE, payload)
            .await
            .map_err(|e| {
                ApiError::Internal(format!("Failed to create sponsor invite: {}", e.message))
            })?;

        tracing::info!(campaign_id, sponsor = %invite.sponsor_name, "sponsor invite created");
        Ok(invite)
    }

    /// Look up an invite by its public token.
    pub async fn get_invite(store: &dyn DataSource, token: &str) -> ApiResult<SponsorInvite> {
        let rows = store
            .select_rows(
                SPONSORS_TABLE,
                SPONSOR_COLUMNS,
                &Filter::Eq("token", token.to_string()),
                &[],
            )
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to load invite: {}", e.message)))?;

        match rows.first() {
            Some(row) => decode_invite(row),
            None => Err(ApiError::NotFound("Unknown or expired response token".to_string())),
        }
    }

    /// Record a sponsor's decision.
    ///
    /// An invite can be answered once; a token that matches no row after the
    /// status check means it was revoked meanwhile and reads as not found.
    pub async fn submit_reply(
        store: &dyn DataSource,
        token: &str,
        reply: &SponsorReply,
    ) -> ApiResult<SponsorInvite> {
        let invite = Self::get_invite(store, token).await?;
        if invite.status != InviteStatus::Pending {
            return Err(ApiError::Conflict(
                "This invitation has already been answered".to_string(),
            ));
        }

        let status = match reply.decision {
            ReplyDecision::Accepted => InviteStatus::Accepted,
            ReplyDecision::Declined => InviteStatus::Declined,
        };
        let payload = json!({
            "status": status.to_string(),
            "response_message": reply.message,
            "responded_at": chrono::Utc::now().to_rfc3339(),
        });

        let rows = store
            .update_rows(SPONSORS_TABLE, payload, &Filter::Eq("token", token.to_string()))
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to record response: {}", e.message)))?;

        match rows.first() {
            Some(row) => {
                tracing::info!(token_prefix = &token[..8.min(token.len())], status = %status, "sponsor responded");
                decode_invite(row)
            }
            None => Err(ApiError::NotFound("Unknown or expired response token".to_string())),
        }
    }
}
