//! # Identity models shared by the session store and the API client
//!
//! These types are `Serialize + Deserialize` so they can be persisted in the
//! session blob and decoded straight from API responses.
//!
//! | Type | Represents |
//! |------|-----------|
//! | [`Role`] | The ordered permission level of a user: `contributor < editor < moderator < admin`. |
//! | [`SessionUser`] | The profile fields the client keeps for the signed-in user. |
//! | [`UserPatch`] | A partial update merged into a [`SessionUser`] after a profile edit. |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Permission level of a user. Variants are declared in ascending order so the
/// derived `Ord` matches the wiki's role hierarchy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Contributor,
    Editor,
    Moderator,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Contributor, Role::Editor, Role::Moderator, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Contributor => "contributor",
            Role::Editor => "editor",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    pub fn at_least(&self, required: Role) -> bool {
        *self >= required
    }

    /// Editors and above may edit pages they did not author.
    pub fn can_edit_any_page(&self) -> bool {
        self.at_least(Role::Editor)
    }

    /// Moderators and above approve pending pages and moderate comments.
    pub fn can_moderate(&self) -> bool {
        self.at_least(Role::Moderator)
    }

    /// Only admins manage users and read stats and audit logs.
    pub fn can_administer(&self) -> bool {
        *self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// The signed-in user's profile as held by the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub nickname: String,
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    pub nickname: Option<String>,
    pub role: Option<Role>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

impl SessionUser {
    /// Merge the set fields of `patch` into this user.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(nickname) = &patch.nickname {
            self.nickname = nickname.clone();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(avatar_url) = &patch.avatar_url {
            self.avatar_url = Some(avatar_url.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_order() {
        assert!(Role::Contributor < Role::Editor);
        assert!(Role::Editor < Role::Moderator);
        assert!(Role::Moderator < Role::Admin);
        assert!(Role::Moderator.can_moderate());
        assert!(!Role::Editor.can_moderate());
        assert!(!Role::Moderator.can_administer());
        assert!(Role::Admin.can_edit_any_page());
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Moderator).unwrap(), "\"moderator\"");
        let role: Role = serde_json::from_str("\"editor\"").unwrap();
        assert_eq!(role, Role::Editor);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_apply_patch_keeps_unset_fields() {
        let mut user = SessionUser {
            id: "u1".into(),
            nickname: "ada".into(),
            role: Role::Contributor,
            email: Some("ada@example.com".into()),
            avatar_url: None,
        };
        user.apply(&UserPatch {
            nickname: Some("lovelace".into()),
            ..Default::default()
        });
        assert_eq!(user.nickname, "lovelace");
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert_eq!(user.role, Role::Contributor);
    }
}
