use serde::{Deserialize, Serialize};

/// Lifecycle of a sponsor invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

impl std::fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InviteStatus::Pending => write!(f, "pending"),
            InviteStatus::Accepted => write!(f, "accepted"),
            InviteStatus::Declined => write!(f, "declined"),
        }
    }
}

/// A sponsor's invitation to a campaign, addressed by an unguessable token
/// on the public response page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SponsorInvite {
    pub id: String,
    pub campaign_id: String,
    pub tenant_id: Option<String>,
    pub sponsor_name: String,
    pub sponsor_email: String,
    pub token: String,
    pub status: InviteStatus,
    pub response_message: Option<String>,
    pub responded_at: Option<String>, // ISO8601
    pub created_at: String,           // ISO8601
}

impl SponsorInvite {
    /// Create a pending invite. The token comes from the caller so token
    /// generation stays in one place.
    pub fn new(
        campaign_id: String,
        tenant_id: Option<String>,
        sponsor_name: String,
        sponsor_email: String,
        token: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            campaign_id,
            tenant_id,
            sponsor_name,
            sponsor_email,
            token,
            status: InviteStatus::Pending,
            response_message: None,
            responded_at: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Request to add a sponsor to a campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInviteRequest {
    pub club_id: Option<String>,
    pub sponsor_name: String,
    pub sponsor_email: String,
}

/// A sponsor's answer on the public response page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyDecision {
    Accepted,
    Declined,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SponsorReply {
    pub decision: ReplyDecision,
    pub message: Option<String>,
}
