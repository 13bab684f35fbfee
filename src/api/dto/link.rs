//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{Link, LinkPage};

/// Upper bound on accepted target length, in characters.
pub const MAX_TARGET_LENGTH: u64 = 8192;

/// Request to create one short link.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Address the short code should resolve to.
    #[validate(length(max = 8192, message = "Target is too long"))]
    pub target: String,

    /// Caller-chosen code. Format rules are enforced by the allocator so the
    /// error kind stays the same for every caller.
    #[serde(default)]
    pub custom_code: Option<String>,
}

impl CreateLinkRequest {
    /// Custom code, with an empty string treated as absent.
    pub fn custom_code(&self) -> Option<&str> {
        self.custom_code.as_deref().filter(|code| !code.is_empty())
    }
}

/// JSON representation of a stored link.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub code: String,
    pub target: String,
    pub access_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            code: link.code,
            target: link.target,
            access_count: link.access_count,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// One page of links.
#[derive(Debug, Serialize)]
pub struct ListLinksResponse {
    pub links: Vec<LinkResponse>,
    pub total: u64,
    pub offset: u64,
    pub count: u32,
}

impl ListLinksResponse {
    pub fn from_page(page: LinkPage, offset: u64, count: u32) -> Self {
        Self {
            links: page.links.into_iter().map(LinkResponse::from).collect(),
            total: page.total,
            offset,
            count,
        }
    }
}
