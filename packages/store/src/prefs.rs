//! UI preferences persisted under [`StorageKey::UiPreferences`].

use serde::{Deserialize, Serialize};

use crate::kv::{self, KvStore, StorageKey};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::System, Theme::Light, Theme::Dark];

    /// Value for the `data-theme` attribute; `None` follows the OS setting.
    pub fn attribute(&self) -> Option<&'static str> {
        match self {
            Theme::System => None,
            Theme::Light => Some("light"),
            Theme::Dark => Some("dark"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::System => "System",
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UiPreferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub sidebar_collapsed: bool,
}

impl UiPreferences {
    /// Stored preferences, or defaults when none are stored.
    pub async fn load<S: KvStore>(store: &S) -> Self {
        kv::load_json(store, StorageKey::UiPreferences)
            .await
            .unwrap_or_default()
    }

    pub async fn save<S: KvStore>(&self, store: &S) {
        kv::save_json(store, StorageKey::UiPreferences, self).await;
    }

    pub async fn clear<S: KvStore>(store: &S) {
        kv::clear(store, StorageKey::UiPreferences).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[tokio::test]
    async fn test_defaults_then_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(UiPreferences::load(&store).await, UiPreferences::default());

        let prefs = UiPreferences {
            theme: Theme::Dark,
            sidebar_collapsed: true,
        };
        prefs.save(&store).await;
        assert_eq!(UiPreferences::load(&store).await, prefs);

        UiPreferences::clear(&store).await;
        assert_eq!(UiPreferences::load(&store).await.theme, Theme::System);
    }

    #[test]
    fn test_missing_fields_default() {
        let prefs: UiPreferences = serde_json::from_str(r#"{"theme":"light"}"#).unwrap();
        assert_eq!(prefs.theme, Theme::Light);
        assert!(!prefs.sidebar_collapsed);
        assert_eq!(Theme::System.attribute(), None);
    }
}
