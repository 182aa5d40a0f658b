pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{StdConsole, SystemRunner, TcpPortProbe};
pub use config::{load_settings, LauncherSettings};
pub use crate::core::{launcher::Launcher, plan::LaunchPlan};
pub use utils::error::{LauncherError, Result};
