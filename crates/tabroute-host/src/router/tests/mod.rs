use tabroute_core::Settings;
use tabroute_core::SettingsHandle;

pub(super) use super::OpenRouter;
pub(super) use super::RouteOutcome;
pub(super) use super::BASE_SURFACES;
pub(super) use crate::contracts::HostError;
pub(super) use crate::contracts::OpenRequest;
pub(super) use crate::contracts::Workspace;
pub(super) use crate::interception::SurfaceId;
pub(super) use crate::interception::SurfaceKind;
pub(super) use crate::memory::HostCall;
pub(super) use crate::memory::InMemoryHost;
pub(super) use tabroute_core::FileDescriptor;
pub(super) use tabroute_core::OpenOrigin;
pub(super) use tabroute_core::ResolutionAction;
pub(super) use tabroute_core::SlotContent;
pub(super) use tabroute_core::SlotId;

mod graph;

/// Nothing opens in a new tab until a test asks for it.
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

fn vault() -> InMemoryHost {
    let mut host = InMemoryHost::new();
    host.add_file("index.md", &[]);
    host.add_file("notes/todo.md", &[]);
    host.add_file("projects/alpha.md", &["project/active"]);
    host.add_file("boards/plan.canvas", &[]);
    host.add_file("papers/spec.pdf", &[]);
    host
}

/// A router over [`vault`] with one tab already showing `index.md`.
fn router(settings: Settings) -> OpenRouter<InMemoryHost> {
    let mut host = vault();
    host.open_file_tab("index.md");
    OpenRouter::new(host, SettingsHandle::new(settings))
}

fn request(path: &str, origin: OpenOrigin) -> OpenRequest {
    OpenRequest::new(FileDescriptor::new(path), origin)
}

fn shown_paths(router: &OpenRouter<InMemoryHost>) -> Vec<String> {
    router
        .host()
        .slots()
        .iter()
        .filter_map(|slot| match &slot.content {
            SlotContent::File { path } => Some(path.clone()),
            _ => None,
        })
        .collect()
}
