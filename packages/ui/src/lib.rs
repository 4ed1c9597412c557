//! Shared UI for the wiki front-end: session context and guards,
//! notifications, the page editor and its pieces.

mod storage;
pub use storage::{make_store, sleep, AppStore};

mod session;
pub use session::{
    use_services, use_session, LoginForm, LogoutButton, RegisterForm, RequireAuth, Services,
    SessionHandle, SessionProvider,
};

pub mod notifications;
pub use notifications::{use_notifier, Notice, NoticeLevel, NotificationProvider, Notifier};

pub mod flows;
pub use flows::{after_page_saved, Destination, SubmitOutcome};

mod markdown;
pub use markdown::{render_markdown, Markdown};

mod tag_input;
pub use tag_input::TagInput;

mod page_editor;
pub use page_editor::PageEditor;

mod theme;
pub use theme::{apply_theme, ThemeProvider, ThemeSelector, ThemeSignal};

mod navbar;
pub use navbar::Navbar;
