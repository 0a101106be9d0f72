use serde::Deserialize;
use serde::Serialize;
use tabroute_core::FileDescriptor;
use tabroute_core::OpenOrigin;
use tabroute_core::SettingsError;
use tabroute_core::SlotEnumerator;
use tabroute_core::SlotId;
use tabroute_core::TagLookup;
use thiserror::Error;

use crate::interception::SurfaceId;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("no open slot with id {0}")]
    UnknownSlot(SlotId),
    #[error("could not load {path}: {reason}")]
    LoadFailed { path: String, reason: String },
    #[error("surface {0} cannot be instrumented")]
    HookUnavailable(SurfaceId),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Where a requested slot should come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// A fresh tab of its own.
    NewTab,
    /// The active slot, or a new one when nothing is open.
    Current,
}

/// A normalized open event, whatever surface produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRequest {
    pub file: FileDescriptor,
    #[serde(default)]
    pub origin: OpenOrigin,
}

impl OpenRequest {
    pub fn new(file: FileDescriptor, origin: OpenOrigin) -> Self {
        Self { file, origin }
    }
}

/// File index queries: link resolution and tags.
pub trait MetadataIndex: TagLookup {
    fn resolve_link_target(&self, link_text: &str, source_path: &str) -> Option<FileDescriptor>;
}

/// Slot queries and mutation primitives of the host workspace.
pub trait Workspace: SlotEnumerator {
    fn active_slot(&self) -> Option<SlotId>;
    fn reveal_slot(&mut self, id: SlotId) -> Result<(), HostError>;
    fn create_slot(&mut self, placement: Placement) -> Result<SlotId, HostError>;
    fn load_file_into_slot(&mut self, id: SlotId, file: &FileDescriptor) -> Result<(), HostError>;
    fn set_view(&mut self, id: SlotId, view_type: &str) -> Result<(), HostError>;
    fn detach_slot(&mut self, id: SlotId) -> Result<(), HostError>;
    fn notify(&mut self, message: &str);
}

/// Installs and removes the interception hook on one observed surface.
pub trait HookHost {
    fn attach_hook(&mut self, surface: &SurfaceId) -> Result<(), HostError>;
    fn detach_hook(&mut self, surface: &SurfaceId) -> Result<(), HostError>;
}

pub trait Host: Workspace + MetadataIndex + HookHost {}

impl<T> Host for T where T: Workspace + MetadataIndex + HookHost {}
