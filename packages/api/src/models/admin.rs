use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use store::Role;

/// A row of the admin user list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub nickname: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Body of `PUT /admin/users/{id}/role`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleChange {
    pub role: Role,
}

/// Site-wide counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteStats {
    pub pages: u64,
    pub published_pages: u64,
    pub pending_pages: u64,
    pub users: u64,
    pub comments: u64,
}

/// One entry of the moderation/audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: String,
    pub actor: String,
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    pub created_at: DateTime<Utc>,
}
