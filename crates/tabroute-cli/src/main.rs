mod cli;
mod scenario;

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tabroute_core::explain;
use tabroute_core::filtered_palette_indices;
use tabroute_core::CommandEffect;
use tabroute_core::DecisionRule;
use tabroute_core::FileDescriptor;
use tabroute_core::OpenOrigin;
use tabroute_core::PaletteCommand;
use tabroute_core::SettingKey;
use tabroute_core::Settings;
use tabroute_core::SettingsHandle;
use tabroute_core::SettingsStore;
use tabroute_core::SlotContent;
use tabroute_core::Verdict;
use tabroute_core::PALETTE_ITEMS;
use tabroute_core::SETTING_KEYS;
use tabroute_host::InMemoryHost;
use tabroute_host::OpenRouter;

use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::OutputFormat;
use crate::cli::PaletteAction;
use crate::cli::SettingsAction;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let store = SettingsStore::new(settings_path(cli.settings)?);
    log::debug!("settings file: {}", store.path().display());

    let output = match cli.command {
        Commands::Decide { path, origin, tags } => {
            let report = decide_stored(&store, &path, origin.into(), &tags);
            render(&report, cli.output, DecideReport::text)?
        }
        Commands::Settings { action } => settings_command(&store, action, cli.output)?,
        Commands::Palette { action } => palette_command(&store, action, cli.output)?,
        Commands::Simulate { scenario: path } => {
            let replay = scenario::replay(&scenario::load(&path)?)?;
            render(&replay, cli.output, render_replay)?
        }
    };
    println!("{output}");
    Ok(())
}

fn settings_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let base = dirs::config_dir().ok_or_else(|| anyhow!("no config directory; pass --settings"))?;
    Ok(base.join("tabroute").join("data.json"))
}

fn render<T: Serialize>(
    value: &T,
    format: OutputFormat,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(text(value)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
    }
}

#[derive(Debug, Serialize)]
struct DecideReport {
    path: String,
    origin: OpenOrigin,
    verdict: Verdict,
    rule: DecisionRule,
    message: String,
}

impl DecideReport {
    fn text(&self) -> String {
        let verdict = match self.verdict {
            Verdict::OpenInNewTab => "new tab",
            Verdict::ReuseCurrentTab => "current tab",
        };
        format!(
            "{} ({}): {verdict} [{}] {}",
            self.path,
            self.origin,
            self.rule.label(),
            self.message
        )
    }
}

fn decide(settings: &Settings, path: &str, origin: OpenOrigin, tags: &[String]) -> DecideReport {
    let file = FileDescriptor::new(path);
    let tags: BTreeSet<String> = tags.iter().cloned().collect();
    let decision = explain(settings, &file, origin, &tags);
    DecideReport {
        path: file.path,
        origin,
        verdict: decision.verdict,
        rule: decision.rule,
        message: decision.message,
    }
}

/// Read-only, so an unreadable settings file falls back to the defaults
/// instead of failing the command.
fn decide_stored(
    store: &SettingsStore,
    path: &str,
    origin: OpenOrigin,
    tags: &[String],
) -> DecideReport {
    decide(&store.load_or_default(), path, origin, tags)
}

fn settings_command(
    store: &SettingsStore,
    action: SettingsAction,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let settings = match action {
        SettingsAction::Show => store.load()?,
        SettingsAction::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let mut settings = store.load()?;
            settings.set(key, &value)?;
            store
                .save(&settings)
                .with_context(|| format!("could not update {key}"))?;
            log::info!("{key} set to {}", settings.get(key));
            settings
        }
        SettingsAction::Reset => {
            let settings = Settings::default();
            store.save(&settings)?;
            log::info!("settings reset at {}", store.path().display());
            settings
        }
    };
    render(&settings, format, render_settings)
}

fn render_settings(settings: &Settings) -> String {
    SETTING_KEYS
        .iter()
        .map(|key| format!("{key} = {}", settings.get(*key)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Serialize)]
struct PaletteEntry {
    id: &'static str,
    label: &'static str,
}

#[derive(Debug, Default, Serialize)]
struct PaletteRun {
    id: String,
    notices: Vec<String>,
    saved: bool,
    opened_graph: bool,
}

fn palette_command(
    store: &SettingsStore,
    action: PaletteAction,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match action {
        PaletteAction::List { query } => {
            let query = query.as_deref().unwrap_or("");
            let entries: Vec<PaletteEntry> = filtered_palette_indices(query)
                .into_iter()
                .map(|idx| PaletteEntry {
                    id: PALETTE_ITEMS[idx].id,
                    label: PALETTE_ITEMS[idx].label,
                })
                .collect();
            render(&entries, format, |entries| {
                entries
                    .iter()
                    .map(|entry| format!("{:<32} {}", entry.id, entry.label))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        PaletteAction::Run { id } => {
            let report = run_palette(store, &id)?;
            render(&report, format, |report| {
                let mut lines = report.notices.clone();
                if report.opened_graph {
                    lines.push("graph view opened in new tab".to_string());
                }
                if report.saved {
                    lines.push(format!("saved {}", store.path().display()));
                }
                lines.join("\n")
            })
        }
    }
}

fn run_palette(store: &SettingsStore, id: &str) -> anyhow::Result<PaletteRun> {
    let command =
        PaletteCommand::from_id(id).ok_or_else(|| anyhow!("unknown palette command: {id}"))?;
    let settings = store.load()?;
    let mut router = OpenRouter::new(InMemoryHost::new(), SettingsHandle::new(settings))
        .with_store(store.clone());
    let outcome = router.run_command(command)?;

    let mut report = PaletteRun {
        id: id.to_string(),
        ..PaletteRun::default()
    };
    for effect in outcome.effects {
        match effect {
            CommandEffect::Notify(message) => report.notices.push(message),
            CommandEffect::PersistSettings => report.saved = true,
            CommandEffect::OpenGraph { .. } => report.opened_graph = true,
        }
    }
    Ok(report)
}

fn render_replay(replay: &scenario::Replay) -> String {
    let mut lines: Vec<String> = replay
        .steps
        .iter()
        .map(|record| {
            format!(
                "{:>3}. {:<48} -> {}",
                record.index,
                record.step,
                record.result.summary()
            )
        })
        .collect();

    lines.push(String::new());
    lines.push("slots:".to_string());
    for slot in &replay.slots {
        lines.push(format!("  {} {}", slot.id, describe_content(&slot.content)));
    }
    if !replay.notifications.is_empty() {
        lines.push("notices:".to_string());
        lines.extend(replay.notifications.iter().map(|notice| format!("  {notice}")));
    }
    lines.push("host calls:".to_string());
    lines.extend(replay.calls.iter().map(|call| format!("  {call:?}")));
    lines.join("\n")
}

fn describe_content(content: &SlotContent) -> String {
    match content {
        SlotContent::Empty => "(empty)".to_string(),
        SlotContent::File { path } => path.clone(),
        SlotContent::View { view_type } => format!("[{view_type}]"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn temp_store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::new(dir.path().join("tabroute").join("data.json"));
        (dir, store)
    }

    #[test]
    fn explicit_settings_path_wins() {
        let path = PathBuf::from("/tmp/custom.json");
        assert_eq!(settings_path(Some(path.clone())).expect("path"), path);
    }

    #[test]
    fn decide_reports_the_deciding_rule() {
        let settings = Settings {
            open_all_files_in_new_tab: false,
            tags_for_new_tab: "project".to_string(),
            ..Settings::default()
        };

        let tagged = decide(
            &settings,
            "projects/alpha.md",
            OpenOrigin::Other,
            &["#Project/Active".to_string()],
        );
        assert_eq!(tagged.verdict, Verdict::OpenInNewTab);
        assert_eq!(tagged.rule, DecisionRule::TagOverride);

        let untagged = decide(&settings, "notes/todo.md", OpenOrigin::Explorer, &[]);
        assert_eq!(
            untagged.text(),
            "notes/todo.md (explorer): current tab [source-rule] opens from explorer follow the explorer setting"
        );
    }

    #[test]
    fn decide_survives_a_damaged_settings_file() {
        let (_dir, store) = temp_store();
        std::fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        std::fs::write(store.path(), "{not json").expect("write");

        let report = decide_stored(&store, "notes/todo.md", OpenOrigin::Other, &[]);
        assert_eq!(report.verdict, Verdict::OpenInNewTab);
        assert_eq!(report.rule, DecisionRule::GlobalOverride);

        let legacy = r#"{"openFilesInNewTab": true, "openAllFilesInNewTab": false}"#;
        std::fs::write(store.path(), legacy).expect("write");
        let report = decide_stored(&store, "notes/todo.md", OpenOrigin::Other, &[]);
        assert_eq!(report.verdict, Verdict::ReuseCurrentTab);
    }

    #[test]
    fn settings_set_persists_and_reset_restores_defaults() {
        let (_dir, store) = temp_store();

        let shown = settings_command(
            &store,
            SettingsAction::Set {
                key: "openFromExplorerInNewTab".to_string(),
                value: "on".to_string(),
            },
            OutputFormat::Text,
        )
        .expect("set");
        assert!(shown.contains("openFromExplorerInNewTab = true"));
        assert!(store.load().expect("load").open_from_explorer_in_new_tab);

        settings_command(&store, SettingsAction::Reset, OutputFormat::Text).expect("reset");
        assert_eq!(store.load().expect("load"), Settings::default());
    }

    #[test]
    fn settings_set_rejects_bad_input() {
        let (_dir, store) = temp_store();

        let unknown = SettingsAction::Set {
            key: "openEverything".to_string(),
            value: "true".to_string(),
        };
        assert!(settings_command(&store, unknown, OutputFormat::Text).is_err());

        let not_a_flag = SettingsAction::Set {
            key: "showNotifications".to_string(),
            value: "sometimes".to_string(),
        };
        assert!(settings_command(&store, not_a_flag, OutputFormat::Text).is_err());
        assert!(!store.path().exists());
    }

    #[test]
    fn settings_json_uses_stored_key_names() {
        let (_dir, store) = temp_store();
        let json =
            settings_command(&store, SettingsAction::Show, OutputFormat::Json).expect("show");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        assert_eq!(value["openAllFilesInNewTab"], serde_json::Value::Bool(true));
        assert_eq!(value["showNotifications"], serde_json::Value::Bool(false));
    }

    #[test]
    fn palette_toggle_saves_and_announces() {
        let (_dir, store) = temp_store();

        let report = run_palette(&store, "toggle-canvas-new-tab").expect("run");

        assert_eq!(report.notices, vec!["Canvas in new tab: OFF".to_string()]);
        assert!(report.saved);
        assert!(!store.load().expect("load").open_canvas_in_new_tab);
    }

    #[test]
    fn palette_graph_command_changes_nothing_on_disk() {
        let (_dir, store) = temp_store();

        let report = run_palette(&store, "open-graph-view-new-tab").expect("run");

        assert!(report.opened_graph);
        assert!(!report.saved);
        assert!(!store.path().exists());
        assert!(run_palette(&store, "no-such-command").is_err());
    }

    #[test]
    fn palette_list_filters_by_query() {
        let (_dir, store) = temp_store();
        let listed = palette_command(
            &store,
            PaletteAction::List {
                query: Some("switcher".to_string()),
            },
            OutputFormat::Text,
        )
        .expect("list");
        assert!(listed.starts_with("toggle-quick-switcher-new-tab"));
        assert_eq!(listed.lines().count(), 1);
    }
}
