use std::fmt;

use serde::{Deserialize, Serialize};

use crate::policy_engine::FileDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub u64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub u64);

pub const GRAPH_VIEW: &str = "graph";

/// What a slot currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotContent {
    /// Opened as a new tab but not filled yet.
    Empty,
    /// A document view showing a file.
    File { path: String },
    /// Any non-file view (graph, search pane, ...).
    View { view_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSlot {
    pub id: SlotId,
    pub content: SlotContent,
    #[serde(default)]
    pub parent: Option<ContainerId>,
}

impl ViewSlot {
    pub fn shows_file(&self, path: &str) -> bool {
        matches!(&self.content, SlotContent::File { path: shown } if shown == path)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.content, SlotContent::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotFilter {
    All,
    Empty,
    Document,
    ViewType(String),
}

impl SlotFilter {
    pub fn matches(&self, slot: &ViewSlot) -> bool {
        match (self, &slot.content) {
            (Self::All, _) => true,
            (Self::Empty, SlotContent::Empty) => true,
            (Self::Document, SlotContent::File { .. }) => true,
            (Self::ViewType(wanted), SlotContent::View { view_type }) => wanted == view_type,
            _ => false,
        }
    }
}

/// Enumerates the slots the host has open, in the host's own order.
pub trait SlotEnumerator {
    fn open_slots(&self, filter: &SlotFilter) -> Vec<ViewSlot>;
}

impl SlotEnumerator for [ViewSlot] {
    fn open_slots(&self, filter: &SlotFilter) -> Vec<ViewSlot> {
        self.iter()
            .filter(|slot| filter.matches(slot))
            .cloned()
            .collect()
    }
}

impl SlotEnumerator for Vec<ViewSlot> {
    fn open_slots(&self, filter: &SlotFilter) -> Vec<ViewSlot> {
        self.as_slice().open_slots(filter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "slot", rename_all = "snake_case")]
pub enum ResolutionAction {
    ReuseEmptySlot(SlotId),
    ReuseExistingSlot(SlotId),
    CreateNewSlot,
}

impl ResolutionAction {
    /// Whether the file still has to be loaded into the chosen slot.
    pub fn needs_load(self) -> bool {
        !matches!(self, Self::ReuseExistingSlot(_))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ReuseEmptySlot(_) => "reuse-empty",
            Self::ReuseExistingSlot(_) => "reuse-existing",
            Self::CreateNewSlot => "create",
        }
    }
}

/// Picks the destination for a file that the policy sent to a new tab.
///
/// An empty slot left by an explicit "new tab" gesture comes first, then a
/// slot already showing the same file, and only then a fresh slot.
pub fn resolve<S>(slots: &S, file: &FileDescriptor) -> ResolutionAction
where
    S: SlotEnumerator + ?Sized,
{
    let action = if let Some(slot) = slots.open_slots(&SlotFilter::Empty).first() {
        ResolutionAction::ReuseEmptySlot(slot.id)
    } else if let Some(slot) = slots
        .open_slots(&SlotFilter::Document)
        .iter()
        .find(|slot| slot.shows_file(&file.path))
    {
        ResolutionAction::ReuseExistingSlot(slot.id)
    } else {
        ResolutionAction::CreateNewSlot
    };
    log::debug!("slot resolution for {}: {:?}", file.path, action);
    action
}

/// True when another open slot lives in the same parent container.
pub fn shares_container<S>(slots: &S, slot: &ViewSlot) -> bool
where
    S: SlotEnumerator + ?Sized,
{
    let Some(parent) = slot.parent else {
        return false;
    };
    slots
        .open_slots(&SlotFilter::All)
        .iter()
        .any(|other| other.id != slot.id && other.parent == Some(parent))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn file_slot(id: u64, path: &str) -> ViewSlot {
        ViewSlot {
            id: SlotId(id),
            content: SlotContent::File {
                path: path.to_string(),
            },
            parent: Some(ContainerId(1)),
        }
    }

    fn empty_slot(id: u64) -> ViewSlot {
        ViewSlot {
            id: SlotId(id),
            content: SlotContent::Empty,
            parent: Some(ContainerId(1)),
        }
    }

    fn view_slot(id: u64, view_type: &str, parent: Option<u64>) -> ViewSlot {
        ViewSlot {
            id: SlotId(id),
            content: SlotContent::View {
                view_type: view_type.to_string(),
            },
            parent: parent.map(ContainerId),
        }
    }

    #[test]
    fn empty_slot_beats_slot_showing_the_file() {
        let slots = vec![file_slot(1, "notes/todo.md"), empty_slot(2)];
        let action = resolve(&slots, &FileDescriptor::new("notes/todo.md"));
        assert_eq!(action, ResolutionAction::ReuseEmptySlot(SlotId(2)));
    }

    #[test]
    fn first_empty_slot_in_host_order_wins() {
        let slots = vec![empty_slot(5), empty_slot(3)];
        let action = resolve(&slots, &FileDescriptor::new("a.md"));
        assert_eq!(action, ResolutionAction::ReuseEmptySlot(SlotId(5)));
    }

    #[test]
    fn slot_showing_the_file_is_reused() {
        let slots = vec![
            file_slot(1, "notes/other.md"),
            view_slot(2, GRAPH_VIEW, Some(1)),
            file_slot(3, "notes/todo.md"),
            file_slot(4, "notes/todo.md"),
        ];
        let action = resolve(&slots, &FileDescriptor::new("notes/todo.md"));
        assert_eq!(action, ResolutionAction::ReuseExistingSlot(SlotId(3)));
        assert!(!action.needs_load());
    }

    #[test]
    fn path_match_is_exact() {
        let slots = vec![file_slot(1, "Notes/Todo.md")];
        let action = resolve(&slots, &FileDescriptor::new("notes/todo.md"));
        assert_eq!(action, ResolutionAction::CreateNewSlot);
    }

    #[test]
    fn no_slots_means_create() {
        let slots: Vec<ViewSlot> = Vec::new();
        let action = resolve(&slots, &FileDescriptor::new("notes/todo.md"));
        assert_eq!(action, ResolutionAction::CreateNewSlot);
        assert!(action.needs_load());
    }

    #[test]
    fn filters_select_by_content() {
        let slots = vec![
            empty_slot(1),
            file_slot(2, "a.md"),
            view_slot(3, GRAPH_VIEW, None),
            view_slot(4, "search", None),
        ];
        let ids = |filter: SlotFilter| -> Vec<u64> {
            slots.open_slots(&filter).iter().map(|slot| slot.id.0).collect()
        };
        assert_eq!(ids(SlotFilter::All), vec![1, 2, 3, 4]);
        assert_eq!(ids(SlotFilter::Empty), vec![1]);
        assert_eq!(ids(SlotFilter::Document), vec![2]);
        assert_eq!(ids(SlotFilter::ViewType(GRAPH_VIEW.to_string())), vec![3]);
    }

    #[test]
    fn sharing_needs_a_sibling_in_the_same_container() {
        let graph = view_slot(3, GRAPH_VIEW, Some(7));
        let alone = vec![file_slot(1, "a.md"), graph.clone()];
        assert!(!shares_container(&alone, &graph));

        let shared = vec![view_slot(2, "search", Some(7)), graph.clone()];
        assert!(shares_container(&shared, &graph));

        let orphan = view_slot(4, GRAPH_VIEW, None);
        assert!(!shares_container(&shared, &orphan));
    }
}
