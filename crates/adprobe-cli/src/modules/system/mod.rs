pub(crate) mod args;
pub(crate) mod config;
pub(crate) mod types;

pub(crate) use config::{handle_config_command, load_config, resolve_settings, save_config};
#[cfg(test)]
pub(crate) use types::{CliConfig, CliContext, ResolvedSettings};
