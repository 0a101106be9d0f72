use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use tabroute_core::FileDescriptor;
use tabroute_core::OpenOrigin;

use crate::contracts::HookHost;
use crate::contracts::HostError;
use crate::contracts::OpenRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    LinkNavigation,
    WorkspaceOpen,
    FileExplorer,
    SearchPane,
    QuickSwitcher,
}

impl SurfaceKind {
    /// The origin tag every event from this surface carries.
    pub fn origin(self) -> OpenOrigin {
        match self {
            Self::FileExplorer => OpenOrigin::Explorer,
            Self::SearchPane => OpenOrigin::Search,
            Self::QuickSwitcher => OpenOrigin::QuickSwitcher,
            Self::LinkNavigation | Self::WorkspaceOpen => OpenOrigin::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinkNavigation => "link_navigation",
            Self::WorkspaceOpen => "workspace_open",
            Self::FileExplorer => "file_explorer",
            Self::SearchPane => "search_pane",
            Self::QuickSwitcher => "quick_switcher",
        }
    }
}

/// One concrete observed surface, e.g. the second file explorer pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId {
    pub kind: SurfaceKind,
    #[serde(default)]
    pub instance: u64,
}

impl SurfaceId {
    pub const fn new(kind: SurfaceKind, instance: u64) -> Self {
        Self { kind, instance }
    }

    /// Surfaces that exist once per workspace.
    pub const fn singleton(kind: SurfaceKind) -> Self {
        Self { kind, instance: 0 }
    }

    pub fn request(&self, file: FileDescriptor) -> OpenRequest {
        OpenRequest::new(file, self.kind.origin())
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind.as_str(), self.instance)
    }
}

/// Tracks which surfaces carry our hook.
///
/// Installing twice on the same surface is a no-op, and teardown restores
/// surfaces in reverse install order so stacked hooks unwind cleanly.
#[derive(Debug, Default, Clone)]
pub struct InterceptionRegistry {
    installed: Vec<SurfaceId>,
}

impl InterceptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn installed(&self) -> &[SurfaceId] {
        &self.installed
    }

    pub fn is_installed(&self, surface: &SurfaceId) -> bool {
        self.installed.contains(surface)
    }

    /// Returns `false` when the surface was already instrumented.
    pub fn install<H>(&mut self, host: &mut H, surface: SurfaceId) -> Result<bool, HostError>
    where
        H: HookHost + ?Sized,
    {
        if self.is_installed(&surface) {
            log::debug!("surface {surface} already instrumented");
            return Ok(false);
        }
        host.attach_hook(&surface)?;
        self.installed.push(surface);
        log::info!("instrumented surface {surface}");
        Ok(true)
    }

    pub fn uninstall<H>(&mut self, host: &mut H, surface: &SurfaceId) -> Result<bool, HostError>
    where
        H: HookHost + ?Sized,
    {
        let Some(index) = self.installed.iter().position(|known| known == surface) else {
            return Ok(false);
        };
        host.detach_hook(surface)?;
        self.installed.remove(index);
        log::info!("restored surface {surface}");
        Ok(true)
    }

    /// Reconciles with the surfaces present after a layout change.
    ///
    /// New surfaces get a hook; surfaces that disappeared are forgotten
    /// without a detach call since the host already dropped them. A surface
    /// that refuses the hook stays uninstrumented and is retried next sync.
    /// Returns the newly instrumented surfaces.
    pub fn sync<H>(&mut self, host: &mut H, live: &[SurfaceId]) -> Result<Vec<SurfaceId>, HostError>
    where
        H: HookHost + ?Sized,
    {
        self.installed.retain(|known| {
            let keep = live.contains(known);
            if !keep {
                log::debug!("surface {known} is gone");
            }
            keep
        });
        let mut added = Vec::new();
        for surface in live {
            match self.install(host, *surface) {
                Ok(true) => added.push(*surface),
                Ok(false) => {}
                Err(HostError::HookUnavailable(refused)) => {
                    log::warn!("surface {refused} refused the hook; its opens pass through");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(added)
    }

    /// Removes every hook, newest first. Failures are logged and skipped so
    /// one stuck surface does not keep the others patched.
    pub fn teardown<H>(&mut self, host: &mut H) -> usize
    where
        H: HookHost + ?Sized,
    {
        let mut restored = 0;
        while let Some(surface) = self.installed.pop() {
            match host.detach_hook(&surface) {
                Ok(()) => restored += 1,
                Err(err) => log::warn!("could not restore surface {surface}: {err}"),
            }
        }
        restored
    }
}
