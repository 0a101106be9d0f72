use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Debug, Parser)]
#[command(name = "tabroute")]
#[command(version, about = "Inspect and replay open-in-new-tab routing decisions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (default: <config dir>/tabroute/data.json)
    #[arg(long, global = true, env = "TABROUTE_SETTINGS")]
    pub settings: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show whether opening a file would target a new tab, and why
    Decide {
        /// Vault-relative path of the file
        path: String,

        /// Surface the open comes from
        #[arg(long, value_enum, default_value = "other")]
        origin: OriginArg,

        /// Tag carried by the file; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Read or change stored settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// List or run palette commands
    Palette {
        #[command(subcommand)]
        action: PaletteAction,
    },

    /// Replay a YAML scenario against an in-memory workspace
    Simulate {
        scenario: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    Show,
    /// Set one value, e.g. `set openFromSearchInNewTab off`
    Set { key: String, value: String },
    /// Write the defaults back
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum PaletteAction {
    List {
        /// Case-insensitive filter on label or id
        query: Option<String>,
    },
    Run {
        id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OriginArg {
    Explorer,
    Search,
    QuickSwitcher,
    Other,
}

impl From<OriginArg> for tabroute_core::OpenOrigin {
    fn from(arg: OriginArg) -> Self {
        match arg {
            OriginArg::Explorer => Self::Explorer,
            OriginArg::Search => Self::Search,
            OriginArg::QuickSwitcher => Self::QuickSwitcher,
            OriginArg::Other => Self::Other,
        }
    }
}
