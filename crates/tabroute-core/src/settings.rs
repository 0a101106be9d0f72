use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::persistence::SettingsError;

/// User-facing switches that drive the open-in-new-tab policy.
///
/// Field names serialize in camelCase so the persisted blob keeps the keys
/// the settings surface has always written. Missing keys take their default
/// and unknown keys are ignored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "StoredSettings")]
pub struct Settings {
    pub open_all_files_in_new_tab: bool,
    pub open_canvas_in_new_tab: bool,
    pub open_graph_in_new_tab: bool,
    pub open_from_search_in_new_tab: bool,
    pub open_from_explorer_in_new_tab: bool,
    pub open_from_quick_switcher_in_new_tab: bool,
    pub show_notifications: bool,
    pub tags_for_new_tab: String,
    pub extensions_for_new_tab: String,
}

/// Shape of the blob on disk. Older blobs may carry `openFilesInNewTab`
/// next to `openAllFilesInNewTab`; the newer key wins when both are present.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StoredSettings {
    open_all_files_in_new_tab: Option<bool>,
    #[serde(rename = "openFilesInNewTab")]
    legacy_open_files_in_new_tab: Option<bool>,
    open_canvas_in_new_tab: Option<bool>,
    open_graph_in_new_tab: Option<bool>,
    open_from_search_in_new_tab: Option<bool>,
    open_from_explorer_in_new_tab: Option<bool>,
    open_from_quick_switcher_in_new_tab: Option<bool>,
    show_notifications: Option<bool>,
    tags_for_new_tab: Option<String>,
    extensions_for_new_tab: Option<String>,
}

impl From<StoredSettings> for Settings {
    fn from(stored: StoredSettings) -> Self {
        let defaults = Settings::default();
        Self {
            open_all_files_in_new_tab: stored
                .open_all_files_in_new_tab
                .or(stored.legacy_open_files_in_new_tab)
                .unwrap_or(defaults.open_all_files_in_new_tab),
            open_canvas_in_new_tab: stored
                .open_canvas_in_new_tab
                .unwrap_or(defaults.open_canvas_in_new_tab),
            open_graph_in_new_tab: stored
                .open_graph_in_new_tab
                .unwrap_or(defaults.open_graph_in_new_tab),
            open_from_search_in_new_tab: stored
                .open_from_search_in_new_tab
                .unwrap_or(defaults.open_from_search_in_new_tab),
            open_from_explorer_in_new_tab: stored
                .open_from_explorer_in_new_tab
                .unwrap_or(defaults.open_from_explorer_in_new_tab),
            open_from_quick_switcher_in_new_tab: stored
                .open_from_quick_switcher_in_new_tab
                .unwrap_or(defaults.open_from_quick_switcher_in_new_tab),
            show_notifications: stored
                .show_notifications
                .unwrap_or(defaults.show_notifications),
            tags_for_new_tab: stored.tags_for_new_tab.unwrap_or(defaults.tags_for_new_tab),
            extensions_for_new_tab: stored
                .extensions_for_new_tab
                .unwrap_or(defaults.extensions_for_new_tab),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            open_all_files_in_new_tab: true,
            open_canvas_in_new_tab: true,
            open_graph_in_new_tab: true,
            open_from_search_in_new_tab: true,
            open_from_explorer_in_new_tab: false,
            open_from_quick_switcher_in_new_tab: false,
            show_notifications: false,
            tags_for_new_tab: String::new(),
            extensions_for_new_tab: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    OpenAllFilesInNewTab,
    OpenCanvasInNewTab,
    OpenGraphInNewTab,
    OpenFromSearchInNewTab,
    OpenFromExplorerInNewTab,
    OpenFromQuickSwitcherInNewTab,
    ShowNotifications,
    TagsForNewTab,
    ExtensionsForNewTab,
}

pub const SETTING_KEYS: [SettingKey; 9] = [
    SettingKey::OpenAllFilesInNewTab,
    SettingKey::OpenCanvasInNewTab,
    SettingKey::OpenGraphInNewTab,
    SettingKey::OpenFromSearchInNewTab,
    SettingKey::OpenFromExplorerInNewTab,
    SettingKey::OpenFromQuickSwitcherInNewTab,
    SettingKey::ShowNotifications,
    SettingKey::TagsForNewTab,
    SettingKey::ExtensionsForNewTab,
];

impl SettingKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAllFilesInNewTab => "openAllFilesInNewTab",
            Self::OpenCanvasInNewTab => "openCanvasInNewTab",
            Self::OpenGraphInNewTab => "openGraphInNewTab",
            Self::OpenFromSearchInNewTab => "openFromSearchInNewTab",
            Self::OpenFromExplorerInNewTab => "openFromExplorerInNewTab",
            Self::OpenFromQuickSwitcherInNewTab => "openFromQuickSwitcherInNewTab",
            Self::ShowNotifications => "showNotifications",
            Self::TagsForNewTab => "tagsForNewTab",
            Self::ExtensionsForNewTab => "extensionsForNewTab",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("openFilesInNewTab") {
            return Ok(Self::OpenAllFilesInNewTab);
        }
        SETTING_KEYS
            .iter()
            .copied()
            .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SettingsError::UnknownKey(wanted.to_string()))
    }
}

impl Settings {
    /// Renders one key the way the settings surface displays it.
    pub fn get(&self, key: SettingKey) -> String {
        match key {
            SettingKey::TagsForNewTab => self.tags_for_new_tab.clone(),
            SettingKey::ExtensionsForNewTab => self.extensions_for_new_tab.clone(),
            flag => self.flag(flag).unwrap_or_default().to_string(),
        }
    }

    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<(), SettingsError> {
        match key {
            SettingKey::TagsForNewTab => self.tags_for_new_tab = value.to_string(),
            SettingKey::ExtensionsForNewTab => self.extensions_for_new_tab = value.to_string(),
            flag => {
                let parsed = parse_bool(value).ok_or_else(|| SettingsError::InvalidValue {
                    key: flag.as_str().to_string(),
                    value: value.to_string(),
                })?;
                if let Some(slot) = self.flag_mut(flag) {
                    *slot = parsed;
                }
            }
        }
        Ok(())
    }

    pub fn flag(&self, key: SettingKey) -> Option<bool> {
        match key {
            SettingKey::OpenAllFilesInNewTab => Some(self.open_all_files_in_new_tab),
            SettingKey::OpenCanvasInNewTab => Some(self.open_canvas_in_new_tab),
            SettingKey::OpenGraphInNewTab => Some(self.open_graph_in_new_tab),
            SettingKey::OpenFromSearchInNewTab => Some(self.open_from_search_in_new_tab),
            SettingKey::OpenFromExplorerInNewTab => Some(self.open_from_explorer_in_new_tab),
            SettingKey::OpenFromQuickSwitcherInNewTab => {
                Some(self.open_from_quick_switcher_in_new_tab)
            }
            SettingKey::ShowNotifications => Some(self.show_notifications),
            SettingKey::TagsForNewTab | SettingKey::ExtensionsForNewTab => None,
        }
    }

    fn flag_mut(&mut self, key: SettingKey) -> Option<&mut bool> {
        match key {
            SettingKey::OpenAllFilesInNewTab => Some(&mut self.open_all_files_in_new_tab),
            SettingKey::OpenCanvasInNewTab => Some(&mut self.open_canvas_in_new_tab),
            SettingKey::OpenGraphInNewTab => Some(&mut self.open_graph_in_new_tab),
            SettingKey::OpenFromSearchInNewTab => Some(&mut self.open_from_search_in_new_tab),
            SettingKey::OpenFromExplorerInNewTab => Some(&mut self.open_from_explorer_in_new_tab),
            SettingKey::OpenFromQuickSwitcherInNewTab => {
                Some(&mut self.open_from_quick_switcher_in_new_tab)
            }
            SettingKey::ShowNotifications => Some(&mut self.show_notifications),
            SettingKey::TagsForNewTab | SettingKey::ExtensionsForNewTab => None,
        }
    }

    /// Returns a copy with `key` inverted. List keys are returned unchanged.
    pub fn toggled(&self, key: SettingKey) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.flag_mut(key) {
            *slot = !*slot;
        }
        next
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Shared access to the current settings snapshot.
///
/// Readers take an `Arc<Settings>` and keep it for the whole evaluation;
/// writers only ever swap in a complete new snapshot, so an in-flight
/// evaluation never sees a half-applied change.
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle {
    current: Arc<RwLock<Arc<Settings>>>,
}

impl SettingsHandle {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(settings))),
        }
    }

    pub fn snapshot(&self) -> Arc<Settings> {
        Arc::clone(&*self.current.read())
    }

    /// Applies `edit` to a copy of the current snapshot and publishes it.
    pub fn update(&self, edit: impl FnOnce(&mut Settings)) -> Arc<Settings> {
        self.modify(edit).0
    }

    /// Like [`update`](Self::update), but hands back whatever `edit`
    /// returns. The read, the edit and the swap all happen under one write
    /// lock, so writers on other clones of the handle are never lost.
    pub fn modify<R>(&self, edit: impl FnOnce(&mut Settings) -> R) -> (Arc<Settings>, R) {
        let mut guard = self.current.write();
        let mut next = Settings::clone(&guard);
        let result = edit(&mut next);
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        (next, result)
    }
}
