//! Moderation and administration.
//!
//! Moderators see the approval queue. Admins additionally get site stats,
//! the user table with role changes, and the audit log.

use api::{AdminUser, AuditLogEntry, PageSummary};
use dioxus::prelude::*;
use store::Role;
use ui::{use_notifier, use_session, RequireAuth};

use super::{guarded, ErrorPanel, Loading, Pager};
use crate::Route;

#[component]
pub fn Admin() -> Element {
    rsx! {
        RequireAuth { min_role: Some(Role::Moderator),
            AdminDashboard {}
        }
    }
}

#[component]
fn AdminDashboard() -> Element {
    let session = use_session();
    let is_admin = session.role().is_some_and(|r| r.can_administer());

    rsx! {
        div {
            class: "view admin",
            h1 { class: "view-title", "Administration" }
            PendingPages {}
            if is_admin {
                SiteStatsPanel {}
                UserTable {}
                AuditLog {}
            }
        }
    }
}

#[component]
fn PendingPages() -> Element {
    let session = use_session();
    let mut refresh = use_signal(|| 0u32);

    let pending = use_resource(move || {
        let session = session.clone();
        let _ = refresh();
        async move { guarded(&session, session.client().pending_pages().await).await }
    });

    let content = match &*pending.read() {
        None => rsx! { Loading {} },
        Some(Err(e)) => rsx! { ErrorPanel { error: e.clone() } },
        Some(Ok(pages)) if pages.is_empty() => rsx! {
            p { class: "view-muted", "Nothing is waiting for approval." }
        },
        Some(Ok(pages)) => rsx! {
            ul {
                class: "pending-list",
                for summary in pages.iter() {
                    PendingRow {
                        key: "{summary.id}",
                        summary: summary.clone(),
                        on_approved: move |_| refresh += 1,
                    }
                }
            }
        },
    };

    rsx! {
        section {
            class: "admin-section",
            h2 { "Pending approval" }
            {content}
        }
    }
}

#[component]
fn PendingRow(summary: PageSummary, on_approved: EventHandler<()>) -> Element {
    let session = use_session();
    let notifier = use_notifier();
    let mut busy = use_signal(|| false);
    let author = summary
        .author
        .as_ref()
        .map(|a| a.nickname.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let submitted = summary.updated_at.format("%Y-%m-%d %H:%M").to_string();

    let approve = {
        let id = summary.id.clone();
        move |_| {
            let session = session.clone();
            let id = id.clone();
            async move {
                busy.set(true);
                match session.client().approve_page(&id).await {
                    Ok(page) => {
                        notifier.success(format!("Approved “{}”", page.title));
                        on_approved.call(());
                    }
                    Err(e) => {
                        notifier.error(&e);
                        session.handle_error(&e).await;
                    }
                }
                busy.set(false);
            }
        }
    };

    rsx! {
        li {
            class: "page-row",
            Link { to: Route::PageDetail { id: summary.id.clone() }, "{summary.title}" }
            span { class: "view-muted", " by {author} · {submitted}" }
            button { class: "btn btn-primary", disabled: busy(), onclick: approve, "Approve" }
        }
    }
}

#[component]
fn SiteStatsPanel() -> Element {
    let session = use_session();

    let stats = use_resource(move || {
        let session = session.clone();
        async move { guarded(&session, session.client().site_stats().await).await }
    });

    let content = match &*stats.read() {
        None => rsx! { Loading {} },
        Some(Err(e)) => rsx! { p { class: "form-error", "{e.title()}" } },
        Some(Ok(stats)) => rsx! {
            dl {
                class: "stats-grid",
                dt { "Pages" }
                dd { "{stats.pages}" }
                dt { "Published" }
                dd { "{stats.published_pages}" }
                dt { "Pending" }
                dd { "{stats.pending_pages}" }
                dt { "Users" }
                dd { "{stats.users}" }
                dt { "Comments" }
                dd { "{stats.comments}" }
            }
        },
    };

    rsx! {
        section {
            class: "admin-section",
            h2 { "Site" }
            {content}
        }
    }
}

#[component]
fn UserTable() -> Element {
    let session = use_session();
    let mut page = use_signal(|| 1u32);
    let mut refresh = use_signal(|| 0u32);

    let users = use_resource(move || {
        let session = session.clone();
        let page = page();
        let _ = refresh();
        async move { guarded(&session, session.client().admin_users(page).await).await }
    });

    let content = match &*users.read() {
        None => rsx! { Loading {} },
        Some(Err(e)) => rsx! { ErrorPanel { error: e.clone() } },
        Some(Ok(listing)) => rsx! {
            table {
                class: "admin-table",
                thead {
                    tr {
                        th { "Nickname" }
                        th { "Email" }
                        th { "Joined" }
                        th { "Role" }
                    }
                }
                tbody {
                    for user in listing.items.iter() {
                        UserRow {
                            key: "{user.id}",
                            user: user.clone(),
                            on_changed: move |_| refresh += 1,
                        }
                    }
                }
            }
            Pager {
                current: listing.page,
                total: listing.total_pages(),
                has_next: listing.has_next(),
                on_change: move |p| page.set(p),
            }
        },
    };

    rsx! {
        section {
            class: "admin-section",
            h2 { "Users" }
            {content}
        }
    }
}

#[component]
fn UserRow(user: AdminUser, on_changed: EventHandler<()>) -> Element {
    let session = use_session();
    let notifier = use_notifier();
    let own_id = session.user().map(|u| u.id);
    let is_self = own_id.as_deref() == Some(user.id.as_str());
    let mut busy = use_signal(|| false);
    let joined = user.created_at.format("%Y-%m-%d").to_string();
    let email = user.email.clone().unwrap_or_default();

    let onchange = {
        let id = user.id.clone();
        let current = user.role;
        move |evt: FormEvent| {
            let session = session.clone();
            let id = id.clone();
            async move {
                let role = match evt.value().parse::<Role>() {
                    Ok(role) if role != current => role,
                    Ok(_) => return,
                    Err(message) => {
                        tracing::warn!("{message}");
                        return;
                    }
                };
                busy.set(true);
                match session.client().change_user_role(&id, role).await {
                    Ok(updated) => {
                        notifier.success(format!("{} is now {}", updated.nickname, updated.role));
                    }
                    Err(e) => {
                        notifier.error(&e);
                        session.handle_error(&e).await;
                    }
                }
                busy.set(false);
                on_changed.call(());
            }
        }
    };

    rsx! {
        tr {
            td {
                Link { to: Route::Profile { id: user.id.clone() }, "{user.nickname}" }
            }
            td { "{email}" }
            td { "{joined}" }
            td {
                select {
                    disabled: busy() || is_self,
                    onchange: onchange,
                    for role in Role::ALL {
                        option {
                            key: "{role}",
                            value: "{role}",
                            selected: role == user.role,
                            "{role}"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn AuditLog() -> Element {
    let session = use_session();
    let mut page = use_signal(|| 1u32);

    let logs = use_resource(move || {
        let session = session.clone();
        let page = page();
        async move { guarded(&session, session.client().audit_logs(page).await).await }
    });

    let content = match &*logs.read() {
        None => rsx! { Loading {} },
        Some(Err(e)) => rsx! { ErrorPanel { error: e.clone() } },
        Some(Ok(listing)) if listing.items.is_empty() => rsx! {
            p { class: "view-muted", "No activity recorded." }
        },
        Some(Ok(listing)) => rsx! {
            ul {
                class: "audit-log",
                for entry in listing.items.iter() {
                    AuditRow { key: "{entry.id}", entry: entry.clone() }
                }
            }
            Pager {
                current: listing.page,
                total: listing.total_pages(),
                has_next: listing.has_next(),
                on_change: move |p| page.set(p),
            }
        },
    };

    rsx! {
        section {
            class: "admin-section",
            h2 { "Audit log" }
            {content}
        }
    }
}

#[component]
fn AuditRow(entry: AuditLogEntry) -> Element {
    let at = entry.created_at.format("%Y-%m-%d %H:%M").to_string();
    let target = entry.target.clone().unwrap_or_default();
    rsx! {
        li {
            span { class: "audit-time", "{at}" }
            " {entry.actor} {entry.action} {target}"
        }
    }
}
