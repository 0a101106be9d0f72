use std::cell::Cell;
use std::collections::BTreeSet;

pub(super) use super::evaluate;
pub(super) use super::explain;
pub(super) use super::DecisionRule;
pub(super) use super::FileDescriptor;
pub(super) use super::NoTags;
pub(super) use super::OpenOrigin;
pub(super) use super::TagLookup;
pub(super) use super::Verdict;
pub(super) use crate::settings::Settings;


const ORIGINS: [OpenOrigin; 4] = [
    OpenOrigin::Explorer,
    OpenOrigin::Search,
    OpenOrigin::QuickSwitcher,
    OpenOrigin::Other,
];

/// Everything off, so each test switches on only what it exercises.
fn quiet_settings() -> Settings {
    Settings {
        open_all_files_in_new_tab: false,
        open_canvas_in_new_tab: false,
        open_graph_in_new_tab: false,
        open_from_search_in_new_tab: false,
        open_from_explorer_in_new_tab: false,
        open_from_quick_switcher_in_new_tab: false,
        show_notifications: false,
        tags_for_new_tab: String::new(),
        extensions_for_new_tab: String::new(),
    }
}

fn tags<const N: usize>(values: [&str; N]) -> BTreeSet<String> {
    values.iter().map(|tag| tag.to_string()).collect()
}

fn file(path: &str) -> FileDescriptor {
    FileDescriptor::new(path)
}

/// Counts how often the policy asks for tags.
struct CountingTags {
    tags: BTreeSet<String>,
    calls: Cell<usize>,
}

impl CountingTags {
    fn new(tags: BTreeSet<String>) -> Self {
        Self {
            tags,
            calls: Cell::new(0),
        }
    }
}

impl TagLookup for CountingTags {
    fn tags_for(&self, _file: &FileDescriptor) -> BTreeSet<String> {
        self.calls.set(self.calls.get() + 1);
        self.tags.clone()
    }
}
