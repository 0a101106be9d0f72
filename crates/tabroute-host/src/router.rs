use std::sync::Arc;

use serde::Serialize;
use tabroute_core::explain;
use tabroute_core::reduce;
use tabroute_core::resolve;
use tabroute_core::shares_container;
use tabroute_core::CommandEffect;
use tabroute_core::CommandOutcome;
use tabroute_core::FileDescriptor;
use tabroute_core::OpenOrigin;
use tabroute_core::PaletteCommand;
use tabroute_core::ResolutionAction;
use tabroute_core::SettingKey;
use tabroute_core::Settings;
use tabroute_core::SettingsHandle;
use tabroute_core::SettingsStore;
use tabroute_core::SlotFilter;
use tabroute_core::SlotId;
use tabroute_core::GRAPH_VIEW;

use crate::contracts::Host;
use crate::contracts::HostError;
use crate::contracts::OpenRequest;
use crate::contracts::Placement;
use crate::interception::InterceptionRegistry;
use crate::interception::SurfaceId;
use crate::interception::SurfaceKind;

/// Surfaces that exist for the whole session and are hooked at load.
pub const BASE_SURFACES: [SurfaceId; 2] = [
    SurfaceId::singleton(SurfaceKind::LinkNavigation),
    SurfaceId::singleton(SurfaceKind::WorkspaceOpen),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteOutcome {
    /// The host's own open behavior applies.
    PassThrough,
    Routed {
        action: ResolutionAction,
        slot: SlotId,
    },
}

impl RouteOutcome {
    pub fn slot(self) -> Option<SlotId> {
        match self {
            Self::PassThrough => None,
            Self::Routed { slot, .. } => Some(slot),
        }
    }
}

/// Sits between the host's open surfaces and its workspace.
///
/// Every intercepted open is decided against one settings snapshot, then
/// either handed back to the host untouched or routed into the slot the
/// resolver picks.
pub struct OpenRouter<H> {
    host: H,
    settings: SettingsHandle,
    store: Option<SettingsStore>,
    interceptions: InterceptionRegistry,
}

impl<H: Host> OpenRouter<H> {
    pub fn new(host: H, settings: SettingsHandle) -> Self {
        Self {
            host,
            settings,
            store: None,
            interceptions: InterceptionRegistry::new(),
        }
    }

    /// Settings changes made through the router are written to `store`.
    pub fn with_store(mut self, store: SettingsStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }

    pub fn interceptions(&self) -> &InterceptionRegistry {
        &self.interceptions
    }

    /// Hooks the base surfaces plus whatever `live` surfaces exist now.
    pub fn load(&mut self, live: &[SurfaceId]) -> Result<Vec<SurfaceId>, HostError> {
        log::info!("loading open router");
        self.on_layout_change(live)
    }

    /// Re-instruments after panes were added or removed, then pulls any graph
    /// view that landed in a shared pane into a tab of its own.
    pub fn on_layout_change(&mut self, live: &[SurfaceId]) -> Result<Vec<SurfaceId>, HostError> {
        let mut surfaces = BASE_SURFACES.to_vec();
        surfaces.extend(live.iter().filter(|surface| !BASE_SURFACES.contains(surface)));
        let added = self.interceptions.sync(&mut self.host, &surfaces)?;
        self.isolate_shared_graphs()?;
        Ok(added)
    }

    /// Restores every hooked surface. Returns how many were restored.
    pub fn unload(&mut self) -> usize {
        let restored = self.interceptions.teardown(&mut self.host);
        log::info!("unloaded open router, restored {restored} surface(s)");
        restored
    }

    /// Entry point for a hooked surface. Events from surfaces we never
    /// instrumented keep the host's behavior.
    pub fn handle_surface_event(
        &mut self,
        surface: &SurfaceId,
        file: FileDescriptor,
    ) -> Result<RouteOutcome, HostError> {
        if !self.interceptions.is_installed(surface) {
            log::debug!("event from uninstrumented surface {surface}");
            return Ok(RouteOutcome::PassThrough);
        }
        self.handle_open(&surface.request(file))
    }

    pub fn handle_open(&mut self, request: &OpenRequest) -> Result<RouteOutcome, HostError> {
        let settings = self.settings.snapshot();
        let decision = explain(&settings, &request.file, request.origin, &self.host);
        if !decision.verdict.is_new_tab() {
            return Ok(RouteOutcome::PassThrough);
        }

        let action = resolve(&self.host, &request.file);
        let slot = match action {
            ResolutionAction::ReuseEmptySlot(id) | ResolutionAction::ReuseExistingSlot(id) => id,
            ResolutionAction::CreateNewSlot => self.host.create_slot(Placement::NewTab)?,
        };
        if action.needs_load() {
            self.host.load_file_into_slot(slot, &request.file)?;
        }
        self.host.reveal_slot(slot)?;

        if settings.show_notifications {
            self.host.notify(&open_notice(&request.file, request.origin));
        }
        log::info!(
            "routed {} to {slot} ({}, {})",
            request.file.path,
            action.label(),
            decision.rule.label()
        );
        Ok(RouteOutcome::Routed { action, slot })
    }

    /// Link clicks: an explicit new-tab gesture or an unresolved link is
    /// left to the host.
    pub fn handle_link(
        &mut self,
        link_text: &str,
        source_path: &str,
        new_tab_requested: bool,
    ) -> Result<RouteOutcome, HostError> {
        if new_tab_requested {
            return Ok(RouteOutcome::PassThrough);
        }
        let Some(file) = self.host.resolve_link_target(link_text, source_path) else {
            log::debug!("link {link_text:?} from {source_path} does not resolve");
            return Ok(RouteOutcome::PassThrough);
        };
        self.handle_open(&OpenRequest::new(file, OpenOrigin::Other))
    }

    /// Opens the graph view where the graph setting says.
    pub fn open_graph(&mut self) -> Result<SlotId, HostError> {
        let settings = self.settings.snapshot();
        let new_tab = settings.open_graph_in_new_tab;
        let slot = self.open_graph_in(new_tab)?;
        if new_tab && settings.show_notifications {
            self.host.notify("Graph view opened in new tab");
        }
        Ok(slot)
    }

    fn open_graph_in(&mut self, new_tab: bool) -> Result<SlotId, HostError> {
        let placement = if new_tab {
            Placement::NewTab
        } else {
            Placement::Current
        };
        let slot = self.host.create_slot(placement)?;
        self.host.set_view(slot, GRAPH_VIEW)?;
        self.host.reveal_slot(slot)?;
        Ok(slot)
    }

    /// Moves every graph view that shares its container into a fresh tab and
    /// closes the original. Returns the new slots.
    pub fn isolate_shared_graphs(&mut self) -> Result<Vec<SlotId>, HostError> {
        let settings = self.settings.snapshot();
        if !settings.open_graph_in_new_tab {
            return Ok(Vec::new());
        }

        let mut moved = Vec::new();
        let graphs = self
            .host
            .open_slots(&SlotFilter::ViewType(GRAPH_VIEW.to_string()));
        for graph in graphs {
            if !shares_container(&self.host, &graph) {
                continue;
            }
            let slot = self.host.create_slot(Placement::NewTab)?;
            self.host.set_view(slot, GRAPH_VIEW)?;
            self.host.detach_slot(graph.id)?;
            log::info!("moved graph view {} into its own tab {slot}", graph.id);
            if settings.show_notifications {
                self.host.notify("Graph view moved to new tab");
            }
            moved.push(slot);
        }
        Ok(moved)
    }

    /// Runs a palette command and carries out its effects in order.
    pub fn run_command(&mut self, command: PaletteCommand) -> Result<CommandOutcome, HostError> {
        let (_, outcome) = self.settings.modify(|settings| {
            let outcome = reduce(settings, command);
            *settings = outcome.settings.clone();
            outcome
        });

        for effect in &outcome.effects {
            match effect {
                CommandEffect::PersistSettings => self.persist(&outcome.settings)?,
                CommandEffect::Notify(message) => self.host.notify(message),
                CommandEffect::OpenGraph { new_tab } => {
                    self.open_graph_in(*new_tab)?;
                }
            }
        }
        Ok(outcome)
    }

    /// Settings-surface edits: sets one key from its text form, publishes
    /// the new snapshot and saves it. A rejected value saves nothing.
    pub fn set_setting(
        &mut self,
        key: SettingKey,
        value: &str,
    ) -> Result<Arc<Settings>, HostError> {
        let (next, applied) = self.settings.modify(|settings| settings.set(key, value));
        applied?;
        self.persist(&next)?;
        Ok(next)
    }

    fn persist(&self, settings: &Settings) -> Result<(), HostError> {
        match &self.store {
            Some(store) => store.save(settings).map_err(HostError::from),
            None => {
                log::debug!("no settings store attached; change kept in memory");
                Ok(())
            }
        }
    }
}

fn open_notice(file: &FileDescriptor, origin: OpenOrigin) -> String {
    match origin {
        OpenOrigin::Other => format!("Opening {} in new tab", file.name()),
        _ => format!("Opening {} from {} in new tab", file.name(), origin.label()),
    }
}

#[cfg(test)]
mod tests;
