use super::*;
use pretty_assertions::assert_eq;
use tabroute_core::GRAPH_VIEW;

fn graph_content() -> SlotContent {
    SlotContent::View {
        view_type: GRAPH_VIEW.to_string(),
    }
}

#[test]
fn graph_opens_in_new_tab_when_enabled() {
    let mut router = router(Settings {
        open_graph_in_new_tab: true,
        show_notifications: true,
        ..quiet_settings()
    });
    let index_slot = router.host().slots()[0].id;

    let slot = router.open_graph().expect("graph");

    assert_ne!(slot, index_slot);
    assert_eq!(router.host().slots().len(), 2);
    assert_eq!(
        router.host().notifications(),
        &["Graph view opened in new tab".to_string()]
    );
}

#[test]
fn graph_replaces_active_view_when_disabled() {
    let mut router = router(Settings {
        show_notifications: true,
        ..quiet_settings()
    });
    let index_slot = router.host().slots()[0].id;

    let slot = router.open_graph().expect("graph");

    assert_eq!(slot, index_slot);
    assert_eq!(router.host().slots().len(), 1);
    assert!(router.host().notifications().is_empty());
}

#[test]
fn shared_graph_is_moved_into_its_own_tab() {
    let mut router = router(Settings {
        open_graph_in_new_tab: true,
        ..quiet_settings()
    });
    let pane = router.host_mut().new_container();
    router.host_mut().add_slot(
        SlotContent::File {
            path: "notes/todo.md".to_string(),
        },
        Some(pane),
    );
    let split_graph = router.host_mut().add_slot(graph_content(), Some(pane));

    let moved = router.isolate_shared_graphs().expect("isolate");

    assert_eq!(moved.len(), 1);
    assert!(router.host().slot(split_graph).is_none());
    let graphs: Vec<SlotId> = router
        .host()
        .slots()
        .iter()
        .filter(|slot| slot.content == graph_content())
        .map(|slot| slot.id)
        .collect();
    assert_eq!(graphs, moved);

    assert!(router.isolate_shared_graphs().expect("isolate").is_empty());
}

#[test]
fn shared_graph_stays_when_setting_is_off() {
    let mut router = router(quiet_settings());
    let pane = router.host_mut().new_container();
    router.host_mut().add_slot(
        SlotContent::File {
            path: "index.md".to_string(),
        },
        Some(pane),
    );
    let split_graph = router.host_mut().add_slot(graph_content(), Some(pane));

    assert!(router.isolate_shared_graphs().expect("isolate").is_empty());
    assert!(router.host().slot(split_graph).is_some());
}

#[test]
fn graph_alone_in_its_tab_is_left_alone() {
    let mut router = router(Settings {
        open_graph_in_new_tab: true,
        ..quiet_settings()
    });
    let own_tab = router.host_mut().new_container();
    let graph = router.host_mut().add_slot(graph_content(), Some(own_tab));

    assert!(router.isolate_shared_graphs().expect("isolate").is_empty());
    assert!(router.host().slot(graph).is_some());
}

#[test]
fn layout_change_instruments_new_panes_and_isolates_graphs() {
    let mut router = router(Settings {
        open_graph_in_new_tab: true,
        ..quiet_settings()
    });
    router.load(&[]).expect("load");
    assert_eq!(router.interceptions().installed(), &BASE_SURFACES);

    let pane = router.host_mut().new_container();
    router.host_mut().add_slot(SlotContent::Empty, Some(pane));
    let split_graph = router.host_mut().add_slot(graph_content(), Some(pane));
    let explorer = SurfaceId::new(SurfaceKind::FileExplorer, 1);

    let added = router.on_layout_change(&[explorer]).expect("layout");

    assert_eq!(added, vec![explorer]);
    assert!(router.host().slot(split_graph).is_none());

    assert_eq!(router.unload(), 3);
    assert!(router.host().hooked().is_empty());
}
