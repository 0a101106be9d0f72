use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Serialize;
use tabroute_core::matching::normalize_tag;
use tabroute_core::ContainerId;
use tabroute_core::FileDescriptor;
use tabroute_core::SlotContent;
use tabroute_core::SlotEnumerator;
use tabroute_core::SlotFilter;
use tabroute_core::SlotId;
use tabroute_core::TagLookup;
use tabroute_core::ViewSlot;

use crate::contracts::HookHost;
use crate::contracts::HostError;
use crate::contracts::MetadataIndex;
use crate::contracts::Placement;
use crate::contracts::Workspace;
use crate::interception::SurfaceId;
use crate::interception::SurfaceKind;

/// Every mutation the router asked of the host, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    Reveal { slot: SlotId },
    Create { placement: Placement, slot: SlotId },
    Load { slot: SlotId, path: String },
    SetView { slot: SlotId, view_type: String },
    Detach { slot: SlotId },
    Notify { message: String },
    AttachHook { surface: SurfaceId },
    DetachHook { surface: SurfaceId },
}

/// A workspace held entirely in memory.
///
/// Backs the CLI simulator and the router tests. New tabs get a container of
/// their own; slots that share a container are splits of one pane.
#[derive(Debug, Default, Clone)]
pub struct InMemoryHost {
    slots: Vec<ViewSlot>,
    active: Option<SlotId>,
    next_slot: u64,
    next_container: u64,
    files: BTreeMap<String, BTreeSet<String>>,
    hooks: BTreeSet<SurfaceId>,
    unavailable: BTreeSet<SurfaceKind>,
    notifications: Vec<String>,
    calls: Vec<HostCall>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a vault file with its tags (frontmatter and inline alike).
    pub fn add_file(&mut self, path: impl Into<String>, tags: &[&str]) {
        let tags = tags.iter().map(|tag| normalize_tag(tag)).collect();
        self.files.insert(path.into(), tags);
    }

    pub fn new_container(&mut self) -> ContainerId {
        self.next_container += 1;
        ContainerId(self.next_container)
    }

    /// Adds a slot behind the router's back, as the user would by hand.
    pub fn add_slot(&mut self, content: SlotContent, parent: Option<ContainerId>) -> SlotId {
        self.next_slot += 1;
        let id = SlotId(self.next_slot);
        self.slots.push(ViewSlot {
            id,
            content,
            parent,
        });
        if self.active.is_none() {
            self.active = Some(id);
        }
        id
    }

    /// A document tab showing `path`, in a container of its own.
    pub fn open_file_tab(&mut self, path: impl Into<String>) -> SlotId {
        let parent = self.new_container();
        self.add_slot(SlotContent::File { path: path.into() }, Some(parent))
    }

    pub fn set_active(&mut self, id: SlotId) -> Result<(), HostError> {
        self.slot(id).ok_or(HostError::UnknownSlot(id))?;
        self.active = Some(id);
        Ok(())
    }

    /// Makes every surface of `kind` refuse instrumentation.
    pub fn mark_unavailable(&mut self, kind: SurfaceKind) {
        self.unavailable.insert(kind);
    }

    pub fn slots(&self) -> &[ViewSlot] {
        &self.slots
    }

    pub fn slot(&self, id: SlotId) -> Option<&ViewSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    pub fn hooked(&self) -> &BTreeSet<SurfaceId> {
        &self.hooks
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    fn slot_mut(&mut self, id: SlotId) -> Result<&mut ViewSlot, HostError> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .ok_or(HostError::UnknownSlot(id))
    }

    fn push_tab(&mut self) -> SlotId {
        let parent = self.new_container();
        self.next_slot += 1;
        let id = SlotId(self.next_slot);
        self.slots.push(ViewSlot {
            id,
            content: SlotContent::Empty,
            parent: Some(parent),
        });
        id
    }

    fn basename_match(&self, target: &str, source_path: &str) -> Option<&String> {
        let folder = parent_folder(source_path);
        let with_md = format!("{target}.md");
        let candidates: Vec<&String> = self
            .files
            .keys()
            .filter(|path| {
                let name = path.rsplit('/').next().unwrap_or(path.as_str());
                name == target || name == with_md
            })
            .collect();
        candidates
            .iter()
            .find(|path| parent_folder(path) == folder)
            .or_else(|| candidates.first())
            .copied()
    }
}

fn parent_folder(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

impl SlotEnumerator for InMemoryHost {
    fn open_slots(&self, filter: &SlotFilter) -> Vec<ViewSlot> {
        self.slots.open_slots(filter)
    }
}

impl TagLookup for InMemoryHost {
    fn tags_for(&self, file: &FileDescriptor) -> BTreeSet<String> {
        self.files.get(&file.path).cloned().unwrap_or_default()
    }
}

impl MetadataIndex for InMemoryHost {
    /// Resolves `[[target#heading|alias]]` style link text.
    ///
    /// Tries the exact path, then the path with `.md`, then any file with a
    /// matching name, preferring the linking note's own folder. An empty
    /// target points back at the source note.
    fn resolve_link_target(&self, link_text: &str, source_path: &str) -> Option<FileDescriptor> {
        let target = link_text.split(['#', '|']).next().unwrap_or("").trim();
        if target.is_empty() {
            return self
                .files
                .contains_key(source_path)
                .then(|| FileDescriptor::new(source_path));
        }

        let with_md = format!("{target}.md");
        for candidate in [target, with_md.as_str()] {
            if self.files.contains_key(candidate) {
                return Some(FileDescriptor::new(candidate));
            }
        }

        self.basename_match(target, source_path)
            .map(|path| FileDescriptor::new(path.as_str()))
    }
}

impl Workspace for InMemoryHost {
    fn active_slot(&self) -> Option<SlotId> {
        self.active
    }

    fn reveal_slot(&mut self, id: SlotId) -> Result<(), HostError> {
        self.set_active(id)?;
        self.calls.push(HostCall::Reveal { slot: id });
        Ok(())
    }

    fn create_slot(&mut self, placement: Placement) -> Result<SlotId, HostError> {
        let slot = match (placement, self.active) {
            (Placement::Current, Some(active)) => active,
            (Placement::Current, None) => {
                let id = self.push_tab();
                self.active = Some(id);
                id
            }
            (Placement::NewTab, _) => self.push_tab(),
        };
        self.calls.push(HostCall::Create { placement, slot });
        Ok(slot)
    }

    fn load_file_into_slot(&mut self, id: SlotId, file: &FileDescriptor) -> Result<(), HostError> {
        if !self.files.contains_key(&file.path) {
            return Err(HostError::LoadFailed {
                path: file.path.clone(),
                reason: "not in the vault".to_string(),
            });
        }
        self.slot_mut(id)?.content = SlotContent::File {
            path: file.path.clone(),
        };
        self.calls.push(HostCall::Load {
            slot: id,
            path: file.path.clone(),
        });
        Ok(())
    }

    fn set_view(&mut self, id: SlotId, view_type: &str) -> Result<(), HostError> {
        self.slot_mut(id)?.content = SlotContent::View {
            view_type: view_type.to_string(),
        };
        self.calls.push(HostCall::SetView {
            slot: id,
            view_type: view_type.to_string(),
        });
        Ok(())
    }

    fn detach_slot(&mut self, id: SlotId) -> Result<(), HostError> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.id == id)
            .ok_or(HostError::UnknownSlot(id))?;
        self.slots.remove(index);
        if self.active == Some(id) {
            self.active = self.slots.last().map(|slot| slot.id);
        }
        self.calls.push(HostCall::Detach { slot: id });
        Ok(())
    }

    fn notify(&mut self, message: &str) {
        log::info!("notice: {message}");
        self.notifications.push(message.to_string());
        self.calls.push(HostCall::Notify {
            message: message.to_string(),
        });
    }
}

impl HookHost for InMemoryHost {
    fn attach_hook(&mut self, surface: &SurfaceId) -> Result<(), HostError> {
        if self.unavailable.contains(&surface.kind) {
            return Err(HostError::HookUnavailable(*surface));
        }
        self.hooks.insert(*surface);
        self.calls.push(HostCall::AttachHook { surface: *surface });
        Ok(())
    }

    fn detach_hook(&mut self, surface: &SurfaceId) -> Result<(), HostError> {
        self.hooks.remove(surface);
        self.calls.push(HostCall::DetachHook { surface: *surface });
        Ok(())
    }
}
