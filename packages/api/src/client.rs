//! # WikiClient: every endpoint, cached reads, invalidating writes
//!
//! [`WikiClient`] wraps a [`Transport`] with the session token and a
//! [`QueryCache`]. Reads are keyed, cached and retried on transient failures;
//! writes are sent once and then invalidate the queries they affect:
//!
//! | Mutation | Invalidates |
//! |----------|-------------|
//! | `create_page` | page lists, tags, pending list, stats |
//! | `update_page` | that page, page lists, tags, search |
//! | `delete_page` | that page, page lists, search, pending list, stats |
//! | `approve_page` | that page, page lists, pending list, stats |
//! | comment writes | that page's comments |
//! | `update_profile` | own profile |
//! | `change_user_role` | admin user lists, that user's profile, admin logs |
//! | `upload_image` | nothing |
//!
//! Inputs with local rules (`LoginRequest`, `PageInput`, ...) are validated
//! before anything is sent.

use std::sync::{Arc, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use serde_json::Value;
use store::Role;

use crate::cache::{Invalidation, QueryCache, QueryFamily, QueryKey};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::{
    AdminUser, AuditLogEntry, AuthResponse, Comment, CommentInput, LoginRequest, Page,
    PageInput, PageQuery, PageSummary, Paginated, ProfilePatch, RegisterRequest, RoleChange,
    SearchHit, SiteStats, TagCount, UploadedImage, UserProfile,
};
use crate::transport::{ApiRequest, HttpTransport, Transport};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub struct WikiClient<T> {
    transport: Arc<T>,
    cache: QueryCache,
    token: Arc<RwLock<Option<String>>>,
    read_retries: u32,
}

impl<T> Clone for WikiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            cache: self.cache.clone(),
            token: self.token.clone(),
            read_retries: self.read_retries,
        }
    }
}

impl<T> PartialEq for WikiClient<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.transport, &other.transport)
    }
}

impl WikiClient<HttpTransport> {
    /// Client for the configured API over HTTP.
    pub fn connect(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self::new(HttpTransport::new(config)?, config))
    }
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

impl<T: Transport> WikiClient<T> {
    pub fn new(transport: T, config: &ApiConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            cache: QueryCache::from_config(config),
            token: Arc::new(RwLock::new(None)),
            read_retries: config.read_retries,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Attach `token` to subsequent requests. Changing identity drops the cache.
    pub fn set_token(&self, token: Option<String>) {
        let mut current = self.token.write().unwrap_or_else(PoisonError::into_inner);
        if *current != token {
            *current = token;
            self.cache.clear();
            tracing::debug!(signed_in = current.is_some(), "client token changed");
        }
    }

    pub fn sign_out(&self) {
        self.set_token(None);
        self.cache.clear();
    }

    /// Cached value for `key`, stale or not, for rendering while a re-fetch runs.
    pub fn peek<R: DeserializeOwned>(&self, key: &QueryKey) -> Option<R> {
        self.cache.peek(key).and_then(|v| serde_json::from_value(v).ok())
    }

    pub fn invalidate(&self, invalidations: &[Invalidation]) {
        self.cache.invalidate(invalidations);
    }

    async fn send_with_retry(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let mut attempt = 0;
        loop {
            match self.transport.send(request.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.read_retries => {
                    attempt += 1;
                    tracing::warn!(path = %request.path, attempt, "retrying read: {e}");
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn read<R: DeserializeOwned>(
        &self,
        key: QueryKey,
        request: ApiRequest,
    ) -> Result<R, ApiError> {
        let request = request.bearer(self.token());
        let value = self
            .cache
            .get_or_fetch(key, || self.send_with_retry(request))
            .await?;
        decode(value)
    }

    async fn mutate<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
        invalidations: &[Invalidation],
    ) -> Result<R, ApiError> {
        let request = request.bearer(self.token());
        let path = request.path.clone();
        let value = self.transport.send(request).await.map_err(|e| {
            tracing::error!(%path, "mutation failed: {e}");
            e
        })?;
        self.cache.invalidate(invalidations);
        tracing::info!(%path, "mutation applied");
        decode(value)
    }

    // Auth

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, ApiError> {
        request.validate()?;
        let response: AuthResponse = self
            .mutate(ApiRequest::post("/auth/login").json(&request)?, &[])
            .await?;
        self.set_token(Some(response.token.clone()));
        Ok(response)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ApiError> {
        request.validate()?;
        let response: AuthResponse = self
            .mutate(ApiRequest::post("/auth/register").json(&request)?, &[])
            .await?;
        self.set_token(Some(response.token.clone()));
        Ok(response)
    }

    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.read(QueryKey::Me, ApiRequest::get("/auth/me")).await
    }

    // Pages

    pub async fn list_pages(&self, query: &PageQuery) -> Result<Paginated<PageSummary>, ApiError> {
        let mut request = ApiRequest::get("/pages")
            .query("page", query.page)
            .query("per_page", query.per_page);
        if let Some(tag) = &query.tag {
            request = request.query("tag", tag);
        }
        self.read(QueryKey::Pages(query.clone()), request).await
    }

    pub async fn get_page(&self, id: &str) -> Result<Page, ApiError> {
        self.read(QueryKey::Page(id.to_string()), ApiRequest::get(format!("/pages/{id}")))
            .await
    }

    pub async fn create_page(&self, input: &PageInput) -> Result<Page, ApiError> {
        input.validate()?;
        self.mutate(
            ApiRequest::post("/pages").json(input)?,
            &[
                QueryFamily::Pages.into(),
                QueryKey::Tags.into(),
                QueryKey::AdminPending.into(),
                QueryKey::AdminStats.into(),
            ],
        )
        .await
    }

    pub async fn update_page(&self, id: &str, input: &PageInput) -> Result<Page, ApiError> {
        input.validate()?;
        self.mutate(
            ApiRequest::put(format!("/pages/{id}")).json(input)?,
            &[
                QueryKey::Page(id.to_string()).into(),
                QueryFamily::Pages.into(),
                QueryKey::Tags.into(),
                QueryFamily::Search.into(),
            ],
        )
        .await
    }

    pub async fn delete_page(&self, id: &str) -> Result<(), ApiError> {
        let _: Value = self
            .mutate(
                ApiRequest::delete(format!("/pages/{id}")),
                &[
                    QueryKey::Page(id.to_string()).into(),
                    QueryFamily::Pages.into(),
                    QueryFamily::Search.into(),
                    QueryKey::AdminPending.into(),
                    QueryKey::AdminStats.into(),
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn approve_page(&self, id: &str) -> Result<Page, ApiError> {
        self.mutate(
            ApiRequest::post(format!("/pages/{id}/approve")),
            &[
                QueryKey::Page(id.to_string()).into(),
                QueryFamily::Pages.into(),
                QueryKey::AdminPending.into(),
                QueryKey::AdminStats.into(),
            ],
        )
        .await
    }

    // Comments

    pub async fn list_comments(&self, page_id: &str) -> Result<Vec<Comment>, ApiError> {
        self.read(
            QueryKey::Comments(page_id.to_string()),
            ApiRequest::get(format!("/pages/{page_id}/comments")),
        )
        .await
    }

    pub async fn create_comment(
        &self,
        page_id: &str,
        input: &CommentInput,
    ) -> Result<Comment, ApiError> {
        input.validate()?;
        self.mutate(
            ApiRequest::post(format!("/pages/{page_id}/comments")).json(input)?,
            &[QueryKey::Comments(page_id.to_string()).into()],
        )
        .await
    }

    pub async fn update_comment(
        &self,
        page_id: &str,
        comment_id: &str,
        input: &CommentInput,
    ) -> Result<Comment, ApiError> {
        input.validate()?;
        self.mutate(
            ApiRequest::put(format!("/comments/{comment_id}")).json(input)?,
            &[QueryKey::Comments(page_id.to_string()).into()],
        )
        .await
    }

    /// Removes the comment from the cached list right away and puts it back if
    /// the server refuses.
    pub async fn delete_comment(&self, page_id: &str, comment_id: &str) -> Result<(), ApiError> {
        let key = QueryKey::Comments(page_id.to_string());
        let snapshot = self.cache.update_optimistic(&key, |data| {
            if let Some(items) = data.as_array_mut() {
                items.retain(|c| c.get("id").and_then(Value::as_str) != Some(comment_id));
            }
        });

        let result: Result<Value, ApiError> = self
            .mutate(
                ApiRequest::delete(format!("/comments/{comment_id}")),
                &[key.into()],
            )
            .await;
        if let Err(e) = result {
            tracing::warn!(comment_id, "rolling back optimistic delete");
            self.cache.rollback(snapshot);
            return Err(e);
        }
        Ok(())
    }

    // Users

    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile, ApiError> {
        self.read(
            QueryKey::Profile(user_id.to_string()),
            ApiRequest::get(format!("/users/{user_id}")),
        )
        .await
    }

    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<UserProfile, ApiError> {
        patch.validate()?;
        let profile: UserProfile = self
            .mutate(ApiRequest::put("/users/me").json(patch)?, &[QueryKey::Me.into()])
            .await?;
        self.cache
            .invalidate(&[QueryKey::Profile(profile.id.clone()).into()]);
        Ok(profile)
    }

    // Search, tags, uploads

    /// A blank query matches nothing and is not sent.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.read(
            QueryKey::Search(query.to_string()),
            ApiRequest::get("/search").query("q", query),
        )
        .await
    }

    pub async fn list_tags(&self) -> Result<Vec<TagCount>, ApiError> {
        self.read(QueryKey::Tags, ApiRequest::get("/tags")).await
    }

    pub async fn upload_image(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ApiError> {
        if !mime.starts_with("image/") {
            return Err(ApiError::invalid_field("file", "Only images can be uploaded"));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::invalid_field(
                "file",
                format!("Images are limited to {} MiB", MAX_UPLOAD_BYTES / (1024 * 1024)),
            ));
        }
        self.mutate(
            ApiRequest::post("/uploads/images").file(file_name, mime, bytes),
            &[],
        )
        .await
    }

    // Admin

    pub async fn admin_users(&self, page: u32) -> Result<Paginated<AdminUser>, ApiError> {
        let page = page.max(1);
        self.read(
            QueryKey::AdminUsers { page },
            ApiRequest::get("/admin/users").query("page", page),
        )
        .await
    }

    pub async fn change_user_role(&self, user_id: &str, role: Role) -> Result<AdminUser, ApiError> {
        self.mutate(
            ApiRequest::put(format!("/admin/users/{user_id}/role")).json(&RoleChange { role })?,
            &[
                QueryFamily::AdminUsers.into(),
                QueryKey::Profile(user_id.to_string()).into(),
                QueryFamily::AdminLogs.into(),
            ],
        )
        .await
    }

    pub async fn site_stats(&self) -> Result<SiteStats, ApiError> {
        self.read(QueryKey::AdminStats, ApiRequest::get("/admin/stats"))
            .await
    }

    pub async fn audit_logs(&self, page: u32) -> Result<Paginated<AuditLogEntry>, ApiError> {
        let page = page.max(1);
        self.read(
            QueryKey::AdminLogs { page },
            ApiRequest::get("/admin/logs").query("page", page),
        )
        .await
    }

    pub async fn pending_pages(&self) -> Result<Vec<PageSummary>, ApiError> {
        self.read(QueryKey::AdminPending, ApiRequest::get("/admin/pages/pending"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fake::FakeTransport;
    use crate::transport::{Body, Method};
    use serde_json::json;

    fn client(fake: &FakeTransport) -> WikiClient<FakeTransport> {
        WikiClient::new(fake.clone(), &ApiConfig::default())
    }

    fn admin_user(id: &str, role: &str) -> Value {
        json!({
            "id": id, "nickname": id, "role": role,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    fn users_page(users: Vec<Value>) -> Value {
        json!({ "items": users, "page": 1, "per_page": 20, "total": 1 })
    }

    fn comment(id: &str) -> Value {
        json!({
            "id": id, "page_id": "p1",
            "author": { "id": "u1", "nickname": "ada" },
            "body": "hi", "created_at": "2024-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_login_with_empty_password_sends_nothing() {
        let fake = FakeTransport::default();
        let client = client(&fake);

        let err = client
            .login(LoginRequest::new("ada@example.com", ""))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.detail().as_deref(), Some("Enter your email and password"));
        assert!(fake.requests().is_empty());
        assert_eq!(client.token(), None);
    }

    #[tokio::test]
    async fn test_login_stores_token_for_later_requests() {
        let fake = FakeTransport::default();
        fake.respond(
            Method::Post,
            "/auth/login",
            Ok(json!({
                "token": "tok-1",
                "user": { "id": "u1", "nickname": "ada", "role": "editor" }
            })),
        );
        fake.respond(Method::Get, "/tags", Ok(json!([])));
        let client = client(&fake);

        let auth = client
            .login(LoginRequest::new("ada@example.com", "secret"))
            .await
            .unwrap();
        assert_eq!(auth.user.role, Role::Editor);

        client.list_tags().await.unwrap();
        let sent = fake.requests();
        assert_eq!(sent[0].token, None);
        assert_eq!(sent[1].token.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_role_change_refetches_user_list() {
        let fake = FakeTransport::default();
        fake.respond(
            Method::Get,
            "/admin/users",
            Ok(users_page(vec![admin_user("u2", "contributor")])),
        );
        let client = client(&fake);

        let before = client.admin_users(1).await.unwrap();
        assert_eq!(before.items[0].role, Role::Contributor);
        // Served from cache.
        client.admin_users(1).await.unwrap();
        assert_eq!(fake.count(Method::Get, "/admin/users"), 1);

        fake.respond(
            Method::Put,
            "/admin/users/u2/role",
            Ok(admin_user("u2", "moderator")),
        );
        fake.respond(
            Method::Get,
            "/admin/users",
            Ok(users_page(vec![admin_user("u2", "moderator")])),
        );
        client.change_user_role("u2", Role::Moderator).await.unwrap();

        let role_request = fake.last(Method::Put, "/admin/users/u2/role").unwrap();
        assert_eq!(role_request.body, Body::Json(json!({ "role": "moderator" })));

        let after = client.admin_users(1).await.unwrap();
        assert_eq!(after.items[0].role, Role::Moderator);
        assert_eq!(fake.count(Method::Get, "/admin/users"), 2);
    }

    #[tokio::test]
    async fn test_comment_create_invalidates_that_page_only() {
        let fake = FakeTransport::default();
        fake.respond(Method::Get, "/pages/p1/comments", Ok(json!([])));
        fake.respond(Method::Get, "/pages/p2/comments", Ok(json!([])));
        fake.respond(Method::Post, "/pages/p1/comments", Ok(comment("c1")));
        let client = client(&fake);

        client.list_comments("p1").await.unwrap();
        client.list_comments("p2").await.unwrap();

        fake.respond(Method::Get, "/pages/p1/comments", Ok(json!([comment("c1")])));
        client
            .create_comment("p1", &CommentInput::new("hi"))
            .await
            .unwrap();

        let comments = client.list_comments("p1").await.unwrap();
        assert_eq!(comments.len(), 1);
        client.list_comments("p2").await.unwrap();

        assert_eq!(fake.count(Method::Get, "/pages/p1/comments"), 2);
        assert_eq!(fake.count(Method::Get, "/pages/p2/comments"), 1);
    }

    #[tokio::test]
    async fn test_failed_comment_delete_rolls_back() {
        let fake = FakeTransport::default();
        fake.respond(
            Method::Get,
            "/pages/p1/comments",
            Ok(json!([comment("c1"), comment("c2")])),
        );
        fake.respond(
            Method::Delete,
            "/comments/c1",
            Err(ApiError::from_response(403, "")),
        );
        let client = client(&fake);
        client.list_comments("p1").await.unwrap();

        let err = client.delete_comment("p1", "c1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let cached: Vec<Comment> = client.peek(&QueryKey::Comments("p1".into())).unwrap();
        assert_eq!(cached.len(), 2);
    }

    #[tokio::test]
    async fn test_comment_delete_removes_from_cache_and_refetches() {
        let fake = FakeTransport::default();
        fake.respond(
            Method::Get,
            "/pages/p1/comments",
            Ok(json!([comment("c1"), comment("c2")])),
        );
        fake.respond(Method::Delete, "/comments/c1", Ok(Value::Null));
        let client = client(&fake);
        client.list_comments("p1").await.unwrap();

        client.delete_comment("p1", "c1").await.unwrap();
        let cached: Vec<Comment> = client.peek(&QueryKey::Comments("p1".into())).unwrap();
        assert_eq!(cached.len(), 1);
        assert!(client.cache().is_stale(&QueryKey::Comments("p1".into())));
    }

    #[tokio::test]
    async fn test_reads_retry_transient_failures() {
        let fake = FakeTransport::default();
        fake.respond(Method::Get, "/tags", Err(ApiError::Network("reset".into())));
        fake.respond(Method::Get, "/tags", Err(ApiError::from_response(502, "")));
        fake.respond(Method::Get, "/tags", Ok(json!([{ "name": "rust", "count": 3 }])));
        let client = client(&fake);

        let tags = client.list_tags().await.unwrap();
        assert_eq!(tags[0].name, "rust");
        assert_eq!(fake.count(Method::Get, "/tags"), 3);
    }

    #[tokio::test]
    async fn test_reads_give_up_after_retries() {
        let fake = FakeTransport::default();
        fake.respond(Method::Get, "/tags", Err(ApiError::Network("down".into())));
        let client = client(&fake);

        assert!(client.list_tags().await.is_err());
        // One attempt plus the default two retries.
        assert_eq!(fake.count(Method::Get, "/tags"), 3);
    }

    #[tokio::test]
    async fn test_mutations_are_not_retried() {
        let fake = FakeTransport::default();
        fake.respond(Method::Post, "/pages", Err(ApiError::Network("reset".into())));
        let client = client(&fake);

        let input = PageInput {
            title: "Rust".into(),
            content: "Ownership".into(),
            tags: vec!["lang".into()],
        };
        assert!(client.create_page(&input).await.is_err());
        assert_eq!(fake.count(Method::Post, "/pages"), 1);
    }

    #[tokio::test]
    async fn test_invalid_page_is_not_sent() {
        let fake = FakeTransport::default();
        let client = client(&fake);
        let input = PageInput {
            title: "".into(),
            content: "x".into(),
            tags: vec![],
        };
        assert!(client.create_page(&input).await.is_err());
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_blank_search_sends_nothing() {
        let fake = FakeTransport::default();
        let client = client(&fake);
        assert!(client.search("   ").await.unwrap().is_empty());
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_clears_cache() {
        let fake = FakeTransport::default();
        fake.respond(
            Method::Get,
            "/auth/me",
            Ok(json!({ "id": "u1", "nickname": "ada", "role": "admin" })),
        );
        let client = client(&fake);
        client.set_token(Some("tok".into()));
        client.me().await.unwrap();
        assert!(!client.cache().is_empty());

        client.sign_out();
        assert!(client.cache().is_empty());
        assert_eq!(client.token(), None);
    }

    #[tokio::test]
    async fn test_upload_checks_type_and_size() {
        let fake = FakeTransport::default();
        fake.respond(
            Method::Post,
            "/uploads/images",
            Ok(json!({ "url": "https://cdn.test/a.png" })),
        );
        let client = client(&fake);

        assert!(client.upload_image("a.txt", "text/plain", vec![1]).await.is_err());
        assert!(client
            .upload_image("a.png", "image/png", vec![0; MAX_UPLOAD_BYTES + 1])
            .await
            .is_err());
        let image = client.upload_image("a.png", "image/png", vec![1, 2]).await.unwrap();
        assert_eq!(image.url, "https://cdn.test/a.png");
        assert_eq!(fake.requests().len(), 1);
    }
}
