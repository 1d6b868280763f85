use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use sharegate_core::{CreatedLink, LinkStatus, LinkSummary, ShareLink};

#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub subject_ids: Vec<String>,
    pub ttl_seconds: u64,
}

/// Owner view of a link. The token is only ever returned once, at creation.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: String,
    pub subject_ids: Vec<String>,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub access_count: u64,
    pub status: LinkStatus,
}

impl From<LinkSummary> for LinkResponse {
    fn from(summary: LinkSummary) -> Self {
        let LinkSummary { link, status } = summary;
        Self {
            id: link.id.to_string(),
            subject_ids: link.subject_ids.into_iter().map(String::from).collect(),
            created_at: link.created_at,
            expires_at: link.expires_at,
            access_count: link.access_count,
            status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedLinkResponse {
    #[serde(flatten)]
    pub link: LinkResponse,
    pub url: String,
}

impl From<CreatedLink> for CreatedLinkResponse {
    fn from(created: CreatedLink) -> Self {
        let summary = LinkSummary {
            link: created.link,
            status: LinkStatus::Active,
        };
        Self {
            link: summary.into(),
            url: created.url,
        }
    }
}

/// What an anonymous holder of the token gets to see.
#[derive(Debug, Serialize)]
pub struct SharedLinkResponse {
    pub id: String,
    pub subject_ids: Vec<String>,
    pub expires_at: Timestamp,
    pub access_count: u64,
}

impl From<ShareLink> for SharedLinkResponse {
    fn from(link: ShareLink) -> Self {
        Self {
            id: link.id.to_string(),
            subject_ids: link.subject_ids.into_iter().map(String::from).collect(),
            expires_at: link.expires_at,
            access_count: link.access_count,
        }
    }
}
