//! Session context, hooks and guards for the UI.

use api::{ApiError, AuthResponse, Client, ErrorKind, LoginRequest, RegisterRequest, UserProfile};
use dioxus::prelude::*;
use store::{DraftStore, Role, SessionState, SessionStore, SessionUser};

use crate::notifications::use_notifier;
use crate::storage::{make_store, AppStore};

/// Long-lived services shared through context.
#[derive(Clone)]
pub struct Services {
    pub client: Client,
    pub session: SessionStore<AppStore>,
    pub drafts: DraftStore<AppStore>,
    pub kv: AppStore,
}

impl Services {
    pub fn new(client: Client, kv: AppStore) -> Self {
        Self {
            client,
            session: SessionStore::new(kv.clone()),
            drafts: DraftStore::new(kv.clone()),
            kv,
        }
    }
}

/// The reactive session state plus the services that change it.
#[derive(Clone)]
pub struct SessionHandle {
    state: Signal<SessionState>,
    services: Services,
}

impl SessionHandle {
    /// Current state; subscribes the calling component.
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn signal(&self) -> Signal<SessionState> {
        self.state
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.state.read().user().cloned()
    }

    pub fn role(&self) -> Option<Role> {
        self.state.read().role()
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn client(&self) -> &Client {
        &self.services.client
    }

    pub async fn sign_in(&self, auth: &AuthResponse) {
        let next = self
            .services
            .session
            .login(auth.token.clone(), auth.user.to_session_user())
            .await;
        self.services
            .client
            .set_token(next.token().map(str::to_string));
        let mut state = self.state;
        state.set(next);
    }

    pub async fn sign_out(&self) {
        self.services.client.sign_out();
        let next = self.services.session.logout().await;
        let mut state = self.state;
        state.set(next);
    }

    /// Bring the stored user in line with a freshly fetched own profile.
    pub async fn refresh_user(&self, profile: &UserProfile) {
        let next = self.services.session.update_user(&profile.to_user_patch()).await;
        let mut state = self.state;
        state.set(next);
    }

    /// Sign out when the API rejects our credentials. Returns whether it did.
    pub async fn handle_error(&self, err: &ApiError) -> bool {
        if err.kind() != ErrorKind::Unauthorized || !self.state.peek().is_authenticated() {
            return false;
        }
        tracing::info!("credentials rejected, signing out");
        self.sign_out().await;
        true
    }
}

pub fn use_session() -> SessionHandle {
    SessionHandle {
        state: use_context::<Signal<SessionState>>(),
        services: use_context::<Services>(),
    }
}

pub fn use_services() -> Services {
    use_context::<Services>()
}

/// Provider component that owns the session.
/// Wrap the router with it; everything below can call [`use_session`].
#[component]
pub fn SessionProvider(client: Client, children: Element) -> Element {
    let services = use_context_provider(|| Services::new(client.clone(), make_store()));
    let mut state = use_signal(|| SessionState::Loading);
    use_context_provider(|| state);

    // Restore on mount, then confirm the stored user with the API
    use_future(move || {
        let services = services.clone();
        async move {
            let restored = services.session.restore().await;
            let token = restored.token().map(str::to_string);
            services.client.set_token(token.clone());
            state.set(restored.clone());
            if !restored.is_authenticated() {
                return;
            }

            let result = services.client.me().await;
            // A login or logout may have happened meanwhile.
            if services.session.token() != token {
                return;
            }
            match result {
                Ok(profile) => {
                    let next = services.session.update_user(&profile.to_user_patch()).await;
                    state.set(next);
                }
                Err(e) if e.kind() == ErrorKind::Unauthorized => {
                    tracing::info!("stored session is no longer valid");
                    services.client.sign_out();
                    state.set(services.session.logout().await);
                }
                Err(e) => tracing::warn!("could not refresh the signed-in user: {e}"),
            }
        }
    });

    rsx! {
        {children}
    }
}

/// Renders `children` only for a signed-in user with at least `min_role`.
///
/// While the session is loading nothing is decided; anonymous visitors are
/// sent to `login_path`.
#[component]
pub fn RequireAuth(
    #[props(default)] min_role: Option<Role>,
    #[props(default = "/login".to_string())] login_path: String,
    children: Element,
) -> Element {
    let session = use_session();
    let state_signal = session.signal();
    let nav = use_navigator();

    use_effect(move || {
        let state = state_signal();
        if state.is_ready() && !state.is_authenticated() {
            nav.replace(login_path.clone());
        }
    });

    match session.state() {
        SessionState::Loading => rsx! {
            div { class: "guard-loading", "Loading…" }
        },
        SessionState::Anonymous => rsx! {
            div { class: "guard-loading", "Redirecting to sign in…" }
        },
        SessionState::Authenticated(s) => {
            if min_role.is_some_and(|required| !s.user.role.at_least(required)) {
                rsx! {
                    div {
                        class: "guard-forbidden",
                        h2 { "Not allowed" }
                        p { "You do not have permission to view this page." }
                    }
                }
            } else {
                rsx! { {children} }
            }
        }
    }
}

/// Email/password sign-in form.
#[component]
pub fn LoginForm(on_success: EventHandler<()>) -> Element {
    let session = use_session();
    let notifier = use_notifier();
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let session = session.clone();
        async move {
            let request = LoginRequest::new(email(), password());
            if let Err(e) = request.validate() {
                error.set(e.detail());
                return;
            }
            busy.set(true);
            let result = session.client().login(request).await;
            busy.set(false);
            match result {
                Ok(auth) => {
                    error.set(None);
                    session.sign_in(&auth).await;
                    notifier.success(format!("Welcome back, {}", auth.user.nickname));
                    on_success.call(());
                }
                Err(e) => {
                    error.set(e.detail());
                    notifier.error(&e);
                }
            }
        }
    };

    rsx! {
        form {
            class: "auth-form",
            onsubmit: onsubmit,
            label {
                "Email"
                input {
                    r#type: "email",
                    autocomplete: "email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
            }
            label {
                "Password"
                input {
                    r#type: "password",
                    autocomplete: "current-password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
            }
            if let Some(message) = error() {
                p { class: "form-error", "{message}" }
            }
            button {
                r#type: "submit",
                class: "btn btn-primary",
                disabled: busy(),
                if busy() { "Signing in…" } else { "Sign in" }
            }
        }
    }
}

/// Account creation form. Field errors from the API are shown inline.
#[component]
pub fn RegisterForm(on_success: EventHandler<()>) -> Element {
    let session = use_session();
    let notifier = use_notifier();
    let mut email = use_signal(String::new);
    let mut nickname = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<ApiError>);
    let mut busy = use_signal(|| false);

    let onsubmit = move |evt: FormEvent| {
        evt.prevent_default();
        let session = session.clone();
        async move {
            let request = RegisterRequest::new(email(), password(), nickname());
            if let Err(e) = request.validate() {
                error.set(Some(e));
                return;
            }
            busy.set(true);
            let result = session.client().register(request).await;
            busy.set(false);
            match result {
                Ok(auth) => {
                    error.set(None);
                    session.sign_in(&auth).await;
                    notifier.success("Account created");
                    on_success.call(());
                }
                Err(e) => {
                    notifier.error(&e);
                    error.set(Some(e));
                }
            }
        }
    };

    let field_message = move |field: &str| {
        error
            .read()
            .as_ref()
            .and_then(|e| e.field_errors().iter().find(|f| f.field == field))
            .map(|f| f.message.clone())
    };

    rsx! {
        form {
            class: "auth-form",
            onsubmit: onsubmit,
            label {
                "Email"
                input {
                    r#type: "email",
                    value: email(),
                    oninput: move |evt: FormEvent| email.set(evt.value()),
                }
                if let Some(message) = field_message("email") {
                    span { class: "field-error", "{message}" }
                }
            }
            label {
                "Nickname"
                input {
                    value: nickname(),
                    oninput: move |evt: FormEvent| nickname.set(evt.value()),
                }
                if let Some(message) = field_message("nickname") {
                    span { class: "field-error", "{message}" }
                }
            }
            label {
                "Password"
                input {
                    r#type: "password",
                    autocomplete: "new-password",
                    value: password(),
                    oninput: move |evt: FormEvent| password.set(evt.value()),
                }
                if let Some(message) = field_message("password") {
                    span { class: "field-error", "{message}" }
                }
            }
            button {
                r#type: "submit",
                class: "btn btn-primary",
                disabled: busy(),
                "Create account"
            }
        }
    }
}

/// Button to sign out the current user.
#[component]
pub fn LogoutButton(
    #[props(default = "Sign out".to_string())] label: String,
    #[props(default = "".to_string())] class: String,
    #[props(default)] on_signed_out: EventHandler<()>,
) -> Element {
    let session = use_session();
    let notifier = use_notifier();

    let onclick = move |_| {
        let session = session.clone();
        async move {
            session.sign_out().await;
            notifier.info("Signed out");
            on_signed_out.call(());
        }
    };

    rsx! {
        button {
            class: "{class}",
            onclick: onclick,
            "{label}"
        }
    }
}
