use crate::settings::SettingKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteCommand {
    ToggleAllFiles,
    ToggleCanvas,
    ToggleGraph,
    ToggleSearch,
    ToggleExplorer,
    ToggleQuickSwitcher,
    ToggleNotifications,
    OpenGraphInNewTab,
}

impl PaletteCommand {
    /// The setting a toggle command flips.
    pub fn toggled_key(self) -> Option<SettingKey> {
        match self {
            Self::ToggleAllFiles => Some(SettingKey::OpenAllFilesInNewTab),
            Self::ToggleCanvas => Some(SettingKey::OpenCanvasInNewTab),
            Self::ToggleGraph => Some(SettingKey::OpenGraphInNewTab),
            Self::ToggleSearch => Some(SettingKey::OpenFromSearchInNewTab),
            Self::ToggleExplorer => Some(SettingKey::OpenFromExplorerInNewTab),
            Self::ToggleQuickSwitcher => Some(SettingKey::OpenFromQuickSwitcherInNewTab),
            Self::ToggleNotifications => Some(SettingKey::ShowNotifications),
            Self::OpenGraphInNewTab => None,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        PALETTE_ITEMS
            .iter()
            .find(|item| item.id == id)
            .map(|item| item.command)
    }

    pub fn item(self) -> &'static PaletteItem {
        match self {
            Self::ToggleAllFiles => &PALETTE_ITEMS[0],
            Self::ToggleCanvas => &PALETTE_ITEMS[1],
            Self::ToggleGraph => &PALETTE_ITEMS[2],
            Self::ToggleSearch => &PALETTE_ITEMS[3],
            Self::ToggleExplorer => &PALETTE_ITEMS[4],
            Self::ToggleQuickSwitcher => &PALETTE_ITEMS[5],
            Self::ToggleNotifications => &PALETTE_ITEMS[6],
            Self::OpenGraphInNewTab => &PALETTE_ITEMS[7],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteItem {
    pub id: &'static str,
    pub label: &'static str,
    /// Short name used in the ON/OFF notice after a toggle.
    pub notice: &'static str,
    pub command: PaletteCommand,
}

pub const PALETTE_ITEMS: [PaletteItem; 8] = [
    PaletteItem {
        id: "toggle-files-new-tab",
        label: "Toggle: Open files in new tab",
        notice: "Files in new tab",
        command: PaletteCommand::ToggleAllFiles,
    },
    PaletteItem {
        id: "toggle-canvas-new-tab",
        label: "Toggle: Open canvas in new tab",
        notice: "Canvas in new tab",
        command: PaletteCommand::ToggleCanvas,
    },
    PaletteItem {
        id: "toggle-graph-new-tab",
        label: "Toggle: Open graph in new tab",
        notice: "Graph in new tab",
        command: PaletteCommand::ToggleGraph,
    },
    PaletteItem {
        id: "toggle-search-new-tab",
        label: "Toggle: Open from search in new tab",
        notice: "Search in new tab",
        command: PaletteCommand::ToggleSearch,
    },
    PaletteItem {
        id: "toggle-explorer-new-tab",
        label: "Toggle: Open from explorer in new tab",
        notice: "Explorer in new tab",
        command: PaletteCommand::ToggleExplorer,
    },
    PaletteItem {
        id: "toggle-quick-switcher-new-tab",
        label: "Toggle: Open from quick switcher in new tab",
        notice: "Quick switcher in new tab",
        command: PaletteCommand::ToggleQuickSwitcher,
    },
    PaletteItem {
        id: "toggle-notifications",
        label: "Toggle: Show notifications",
        notice: "Notifications",
        command: PaletteCommand::ToggleNotifications,
    },
    PaletteItem {
        id: "open-graph-view-new-tab",
        label: "Open Graph View in New Tab",
        notice: "Graph view",
        command: PaletteCommand::OpenGraphInNewTab,
    },
];

pub fn filtered_palette_indices(query: &str) -> Vec<usize> {
    let query = query.trim().to_ascii_lowercase();
    if query.is_empty() {
        return (0..PALETTE_ITEMS.len()).collect();
    }

    PALETTE_ITEMS
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            if item.label.to_ascii_lowercase().contains(&query) || item.id.contains(&query) {
                Some(idx)
            } else {
                None
            }
        })
        .collect()
}
