use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::matching::any_tag_matches;
use crate::matching::extension_listed;
use crate::matching::normalize_tag;
use crate::matching::parse_extension_list;
use crate::matching::parse_tag_list;
use crate::settings::Settings;

pub const CANVAS_EXTENSION: &str = "canvas";

/// The file an open action targets, as seen by the policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: String,
    pub extension: String,
}

impl FileDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let extension = Path::new(&path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();
        Self { path, extension }
    }

    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn is_canvas(&self) -> bool {
        self.extension == CANVAS_EXTENSION
    }
}

/// Where an open request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenOrigin {
    Explorer,
    Search,
    #[serde(alias = "quick_switcher", alias = "quick-switcher")]
    QuickSwitcher,
    #[default]
    Other,
}

impl OpenOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Explorer => "explorer",
            Self::Search => "search",
            Self::QuickSwitcher => "quickswitcher",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Explorer => "explorer",
            Self::Search => "search",
            Self::QuickSwitcher => "quick switcher",
            Self::Other => "link",
        }
    }
}

impl fmt::Display for OpenOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpenOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explorer" => Ok(Self::Explorer),
            "search" => Ok(Self::Search),
            "quickswitcher" | "quick_switcher" | "quick-switcher" => Ok(Self::QuickSwitcher),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown origin: {other}")),
        }
    }
}

/// Tag lookup for a file: frontmatter tags plus inline tags.
///
/// Only consulted when a tag rule is configured.
pub trait TagLookup {
    fn tags_for(&self, file: &FileDescriptor) -> BTreeSet<String>;
}

/// A lookup for hosts that have no tag metadata.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTags;

impl TagLookup for NoTags {
    fn tags_for(&self, _file: &FileDescriptor) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

/// A fixed tag set, used as-is for whatever file is asked about.
impl TagLookup for BTreeSet<String> {
    fn tags_for(&self, _file: &FileDescriptor) -> BTreeSet<String> {
        self.iter().map(|tag| normalize_tag(tag)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    OpenInNewTab,
    ReuseCurrentTab,
}

impl Verdict {
    pub fn from_bool(new_tab: bool) -> Self {
        if new_tab {
            Self::OpenInNewTab
        } else {
            Self::ReuseCurrentTab
        }
    }

    pub fn is_new_tab(self) -> bool {
        matches!(self, Self::OpenInNewTab)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    GlobalOverride,
    CanvasRule,
    TagOverride,
    ExtensionOverride,
    SourceRule,
    Default,
}

impl DecisionRule {
    pub fn label(self) -> &'static str {
        match self {
            Self::GlobalOverride => "global-override",
            Self::CanvasRule => "canvas-rule",
            Self::TagOverride => "tag-override",
            Self::ExtensionOverride => "extension-override",
            Self::SourceRule => "source-rule",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub verdict: Verdict,
    pub rule: DecisionRule,
    pub message: String,
}

impl PolicyDecision {
    fn new(verdict: Verdict, rule: DecisionRule, message: impl Into<String>) -> Self {
        Self {
            verdict,
            rule,
            message: message.into(),
        }
    }
}

/// Decides whether opening `file` from `origin` should target a new tab.
pub fn evaluate(
    settings: &Settings,
    file: &FileDescriptor,
    origin: OpenOrigin,
    tags: &dyn TagLookup,
) -> Verdict {
    explain(settings, file, origin, tags).verdict
}

/// Same decision as [`evaluate`], with the rule that produced it.
///
/// Rules are checked in a fixed order and the first one that applies wins:
/// global switch, canvas files, tag override, extension override, then the
/// per-origin switch. Anything left over reuses the current tab.
pub fn explain(
    settings: &Settings,
    file: &FileDescriptor,
    origin: OpenOrigin,
    tags: &dyn TagLookup,
) -> PolicyDecision {
    let decision = decide(settings, file, origin, tags);
    log::debug!(
        "open policy for {} (origin {}): {:?} via {}",
        file.path,
        origin,
        decision.verdict,
        decision.rule.label()
    );
    decision
}

fn decide(
    settings: &Settings,
    file: &FileDescriptor,
    origin: OpenOrigin,
    tags: &dyn TagLookup,
) -> PolicyDecision {
    if settings.open_all_files_in_new_tab {
        return PolicyDecision::new(
            Verdict::OpenInNewTab,
            DecisionRule::GlobalOverride,
            "all files open in a new tab",
        );
    }

    let extension = file.extension.to_lowercase();
    if extension == CANVAS_EXTENSION {
        return PolicyDecision::new(
            Verdict::from_bool(settings.open_canvas_in_new_tab),
            DecisionRule::CanvasRule,
            "canvas files follow the canvas setting",
        );
    }

    let configured_tags = parse_tag_list(&settings.tags_for_new_tab);
    if !configured_tags.is_empty() && any_tag_matches(&configured_tags, &tags.tags_for(file)) {
        return PolicyDecision::new(
            Verdict::OpenInNewTab,
            DecisionRule::TagOverride,
            "file carries a tag listed for new tabs",
        );
    }

    let configured_extensions = parse_extension_list(&settings.extensions_for_new_tab);
    if extension_listed(&configured_extensions, &extension) {
        return PolicyDecision::new(
            Verdict::OpenInNewTab,
            DecisionRule::ExtensionOverride,
            format!("extension .{extension} is listed for new tabs"),
        );
    }

    let source_switch = match origin {
        OpenOrigin::Search => Some(settings.open_from_search_in_new_tab),
        OpenOrigin::Explorer => Some(settings.open_from_explorer_in_new_tab),
        OpenOrigin::QuickSwitcher => Some(settings.open_from_quick_switcher_in_new_tab),
        OpenOrigin::Other => None,
    };
    if let Some(new_tab) = source_switch {
        return PolicyDecision::new(
            Verdict::from_bool(new_tab),
            DecisionRule::SourceRule,
            format!("opens from {} follow the {} setting", origin.label(), origin),
        );
    }

    PolicyDecision::new(
        Verdict::ReuseCurrentTab,
        DecisionRule::Default,
        "no rule asked for a new tab",
    )
}

#[cfg(test)]
mod tests;
