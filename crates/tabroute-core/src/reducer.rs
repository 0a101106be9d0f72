use super::actions::PaletteCommand;
use super::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEffect {
    /// Show a transient notice to the user.
    Notify(String),
    /// Write the new snapshot through the settings store.
    PersistSettings,
    /// Open the graph view, in a new tab or in the active one.
    OpenGraph { new_tab: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub settings: Settings,
    pub effects: Vec<CommandEffect>,
}

impl CommandOutcome {
    pub fn changed_settings(&self, before: &Settings) -> bool {
        &self.settings != before
    }
}

/// Applies a palette command to the current snapshot.
///
/// Never mutates `settings`; the caller publishes `outcome.settings` as the
/// next snapshot and carries out the effects in order.
pub fn reduce(settings: &Settings, command: PaletteCommand) -> CommandOutcome {
    match command.toggled_key() {
        Some(key) => {
            let next = settings.toggled(key);
            let state = if next.flag(key).unwrap_or_default() {
                "ON"
            } else {
                "OFF"
            };
            let notice = format!("{}: {state}", command.item().notice);
            CommandOutcome {
                settings: next,
                effects: vec![CommandEffect::PersistSettings, CommandEffect::Notify(notice)],
            }
        }
        None => {
            let mut effects = vec![CommandEffect::OpenGraph { new_tab: true }];
            if settings.show_notifications {
                effects.push(CommandEffect::Notify(
                    "Graph view opened in new tab".to_string(),
                ));
            }
            CommandOutcome {
                settings: settings.clone(),
                effects,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::actions::PALETTE_ITEMS;

    #[test]
    fn toggle_flips_flag_and_announces_state() {
        let settings = Settings::default();
        let outcome = reduce(&settings, PaletteCommand::ToggleAllFiles);

        assert!(!outcome.settings.open_all_files_in_new_tab);
        assert_eq!(
            outcome.effects,
            vec![
                CommandEffect::PersistSettings,
                CommandEffect::Notify("Files in new tab: OFF".to_string()),
            ]
        );

        let again = reduce(&outcome.settings, PaletteCommand::ToggleAllFiles);
        assert_eq!(again.settings, settings);
        assert_eq!(
            again.effects.last(),
            Some(&CommandEffect::Notify("Files in new tab: ON".to_string()))
        );
    }

    #[test]
    fn toggle_notice_ignores_notification_setting() {
        let settings = Settings {
            show_notifications: false,
            ..Settings::default()
        };
        let outcome = reduce(&settings, PaletteCommand::ToggleExplorer);
        assert!(outcome.settings.open_from_explorer_in_new_tab);
        assert!(outcome
            .effects
            .contains(&CommandEffect::Notify("Explorer in new tab: ON".to_string())));
    }

    #[test]
    fn every_toggle_changes_exactly_one_setting() {
        let settings = Settings::default();
        for item in PALETTE_ITEMS.iter() {
            let outcome = reduce(&settings, item.command);
            match item.command.toggled_key() {
                Some(key) => {
                    assert!(outcome.changed_settings(&settings), "{}", item.id);
                    assert_eq!(outcome.settings.toggled(key), settings);
                }
                None => assert!(!outcome.changed_settings(&settings)),
            }
        }
    }

    #[test]
    fn graph_command_notifies_only_when_enabled() {
        let quiet = Settings::default();
        assert_eq!(
            reduce(&quiet, PaletteCommand::OpenGraphInNewTab).effects,
            vec![CommandEffect::OpenGraph { new_tab: true }]
        );

        let chatty = Settings {
            show_notifications: true,
            ..Settings::default()
        };
        assert_eq!(
            reduce(&chatty, PaletteCommand::OpenGraphInNewTab).effects,
            vec![
                CommandEffect::OpenGraph { new_tab: true },
                CommandEffect::Notify("Graph view opened in new tab".to_string()),
            ]
        );
    }
}
