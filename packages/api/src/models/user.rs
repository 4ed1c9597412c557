//! # User and authentication models
//!
//! - [`UserProfile`]: the public profile served by `GET /users/{id}` and
//!   `GET /auth/me`. [`UserProfile::to_session_user`] projects it into the
//!   [`store::SessionUser`] that the session store persists.
//! - [`LoginRequest`] / [`RegisterRequest`]: credentials for `POST /auth/login`
//!   and `POST /auth/register`. Both are checked locally first so that an
//!   obviously incomplete form never reaches the network.
//! - [`AuthResponse`]: the bearer token plus profile returned on success.
//! - [`ProfilePatch`]: partial update for `PUT /users/me`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use store::{Role, SessionUser, UserPatch};

use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub nickname: String,
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            nickname: self.nickname.clone(),
            role: self.role,
            email: self.email.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    /// Patch that brings a stored session user in line with this profile.
    pub fn to_user_patch(&self) -> UserPatch {
        UserPatch {
            nickname: Some(self.nickname.clone()),
            role: Some(self.role),
            email: self.email.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_lowercase(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::invalid("Enter your email and password"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

impl RegisterRequest {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        nickname: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into().trim().to_lowercase(),
            password: password.into(),
            nickname: nickname.into().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.is_empty() || !self.email.contains('@') {
            return Err(ApiError::invalid_field("email", "Invalid email address"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::invalid_field(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        if self.nickname.is_empty() {
            return Err(ApiError::invalid_field("nickname", "Nickname is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfilePatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.nickname.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ApiError::invalid_field("nickname", "Nickname cannot be empty"));
        }
        Ok(())
    }
}
