use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::anyhow;
use anyhow::Context;
use serde::Deserialize;
use serde::Serialize;
use tabroute_core::FileDescriptor;
use tabroute_core::OpenOrigin;
use tabroute_core::PaletteCommand;
use tabroute_core::SettingKey;
use tabroute_core::Settings;
use tabroute_core::SettingsHandle;
use tabroute_core::SlotContent;
use tabroute_core::SlotId;
use tabroute_core::ViewSlot;
use tabroute_host::HostCall;
use tabroute_host::InMemoryHost;
use tabroute_host::OpenRequest;
use tabroute_host::OpenRouter;
use tabroute_host::RouteOutcome;
use tabroute_host::SurfaceId;

/// A workspace plus a sequence of user actions to replay against it.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub files: Vec<FileSpec>,
    #[serde(default)]
    pub slots: Vec<SlotSpec>,
    /// Panes present at load besides link navigation and workspace open.
    #[serde(default)]
    pub surfaces: Vec<SurfaceId>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct FileSpec {
    pub path: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An open slot. Slots naming the same `pane` are splits of one container;
/// without a pane the slot is a tab of its own.
#[derive(Debug, Deserialize)]
pub struct SlotSpec {
    #[serde(flatten)]
    pub content: SlotContent,
    #[serde(default)]
    pub pane: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "do", rename_all = "snake_case")]
pub enum Step {
    Open {
        path: String,
        #[serde(default)]
        origin: OpenOrigin,
    },
    Link {
        text: String,
        from: String,
        #[serde(default)]
        new_tab: bool,
    },
    Surface {
        surface: SurfaceId,
        path: String,
    },
    Command {
        id: String,
    },
    Graph,
    Layout {
        #[serde(default)]
        surfaces: Vec<SurfaceId>,
    },
    Set {
        key: String,
        value: String,
    },
}

impl Step {
    fn describe(&self) -> String {
        match self {
            Self::Open { path, origin } => format!("open {path} ({origin})"),
            Self::Link {
                text,
                from,
                new_tab,
            } => {
                let gesture = if *new_tab { ", new tab requested" } else { "" };
                format!("link [[{text}]] from {from}{gesture}")
            }
            Self::Surface { surface, path } => format!("open {path} via {surface}"),
            Self::Command { id } => format!("command {id}"),
            Self::Graph => "open graph view".to_string(),
            Self::Layout { surfaces } => format!("layout change ({} pane(s))", surfaces.len()),
            Self::Set { key, value } => format!("set {key} = {value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepResult {
    Route { outcome: RouteOutcome },
    Command { notices: Vec<String> },
    Graph { slot: SlotId },
    Layout { instrumented: Vec<SurfaceId> },
    Setting { key: String, value: String },
}

impl StepResult {
    pub fn summary(&self) -> String {
        match self {
            Self::Route {
                outcome: RouteOutcome::PassThrough,
            } => "host default".to_string(),
            Self::Route {
                outcome: RouteOutcome::Routed { action, slot },
            } => format!("{} {slot}", action.label()),
            Self::Command { notices } if notices.is_empty() => "done".to_string(),
            Self::Command { notices } => notices.join("; "),
            Self::Graph { slot } => format!("graph in {slot}"),
            Self::Layout { instrumented } if instrumented.is_empty() => {
                "no new panes".to_string()
            }
            Self::Layout { instrumented } => {
                let names: Vec<String> = instrumented.iter().map(ToString::to_string).collect();
                format!("instrumented {}", names.join(", "))
            }
            Self::Setting { key, value } => format!("{key} is now {value}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub step: String,
    #[serde(flatten)]
    pub result: StepResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct Replay {
    pub steps: Vec<StepRecord>,
    pub slots: Vec<ViewSlot>,
    pub notifications: Vec<String>,
    pub calls: Vec<HostCall>,
}

pub fn load(path: &Path) -> anyhow::Result<Scenario> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read scenario {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("invalid scenario {}", path.display()))
}

pub fn replay(scenario: &Scenario) -> anyhow::Result<Replay> {
    let mut host = InMemoryHost::new();
    for file in &scenario.files {
        let tags: Vec<&str> = file.tags.iter().map(String::as_str).collect();
        host.add_file(file.path.as_str(), &tags);
    }

    let mut panes = BTreeMap::new();
    for slot in &scenario.slots {
        let parent = match slot.pane {
            Some(pane) => *panes
                .entry(pane)
                .or_insert_with(|| host.new_container()),
            None => host.new_container(),
        };
        host.add_slot(slot.content.clone(), Some(parent));
    }

    let mut router = OpenRouter::new(host, SettingsHandle::new(scenario.settings.clone()));
    router.load(&scenario.surfaces)?;

    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let result = run_step(&mut router, step)
            .with_context(|| format!("step {} ({}) failed", index + 1, step.describe()))?;
        log::debug!("step {}: {}", index + 1, result.summary());
        steps.push(StepRecord {
            index: index + 1,
            step: step.describe(),
            result,
        });
    }

    let mut host = router.into_host();
    Ok(Replay {
        steps,
        slots: host.slots().to_vec(),
        notifications: host.notifications().to_vec(),
        calls: host.take_calls(),
    })
}

fn run_step(router: &mut OpenRouter<InMemoryHost>, step: &Step) -> anyhow::Result<StepResult> {
    let result = match step {
        Step::Open { path, origin } => {
            let request = OpenRequest::new(FileDescriptor::new(path.as_str()), *origin);
            StepResult::Route {
                outcome: router.handle_open(&request)?,
            }
        }
        Step::Link {
            text,
            from,
            new_tab,
        } => StepResult::Route {
            outcome: router.handle_link(text, from, *new_tab)?,
        },
        Step::Surface { surface, path } => StepResult::Route {
            outcome: router.handle_surface_event(surface, FileDescriptor::new(path.as_str()))?,
        },
        Step::Command { id } => {
            let command = PaletteCommand::from_id(id)
                .ok_or_else(|| anyhow!("unknown palette command: {id}"))?;
            let seen = router.host().notifications().len();
            router.run_command(command)?;
            StepResult::Command {
                notices: router.host().notifications()[seen..].to_vec(),
            }
        }
        Step::Graph => StepResult::Graph {
            slot: router.open_graph()?,
        },
        Step::Layout { surfaces } => StepResult::Layout {
            instrumented: router.on_layout_change(surfaces)?,
        },
        Step::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let next = router.set_setting(key, value)?;
            StepResult::Setting {
                key: key.to_string(),
                value: next.get(key),
            }
        }
    };
    Ok(result)
}
