use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use adprobe_core::{resolve_base_url, ClientConfig, ServerMode};

use super::types::{CliConfig, CliContext, ResolvedSettings};
use crate::cli_args::{ConfigArgs, ConfigCommand};

pub(crate) fn handle_config_command(
    args: ConfigArgs,
    config: &mut CliConfig,
) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::SetContext(args) => {
            if let Some(api_url) = args.api_url.as_deref() {
                ClientConfig::new(api_url)?;
            }
            let entry = config
                .contexts
                .entry(args.name.clone())
                .or_insert_with(|| CliContext {
                    api_url: resolve_base_url(None, None),
                    mode: None,
                    timeout_secs: None,
                });
            if let Some(api_url) = args.api_url {
                entry.api_url = api_url.trim_end_matches('/').to_string();
            }
            if let Some(mode) = args.mode {
                entry.mode = Some(mode);
            }
            if let Some(timeout) = args.timeout {
                entry.timeout_secs = Some(timeout);
            }
            config.current_context = Some(args.name);
        }
        ConfigCommand::UseContext(args) => {
            if !config.contexts.contains_key(&args.name) {
                anyhow::bail!("context not found: {}", args.name);
            }
            config.current_context = Some(args.name);
        }
        ConfigCommand::CurrentContext => {
            if let Some(current) = config.current_context.clone() {
                println!("{current}");
            }
        }
        ConfigCommand::GetContexts => {
            let mut names: Vec<_> = config.contexts.keys().cloned().collect();
            names.sort();
            for name in names {
                let marker = if config.current_context.as_ref() == Some(&name) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {name}");
            }
        }
        ConfigCommand::Show(args) => {
            let name = args
                .name
                .or_else(|| config.current_context.clone())
                .ok_or_else(|| anyhow::anyhow!("context not set"))?;
            let context = config
                .contexts
                .get(&name)
                .ok_or_else(|| anyhow::anyhow!("context not found: {}", name))?;
            println!("{}", serde_json::to_string_pretty(context)?);
        }
    }
    Ok(())
}

/// Merges flags with the active context. An explicit `--upstream` means the
/// caller wants that origin, so it shadows the context's stored URL.
pub(crate) fn resolve_settings(
    api_url: Option<&str>,
    upstream: Option<&str>,
    context_arg: Option<&str>,
    mode: Option<ServerMode>,
    timeout_secs: Option<u64>,
    config: &CliConfig,
) -> anyhow::Result<ResolvedSettings> {
    let context_name = context_arg
        .map(str::to_string)
        .or_else(|| config.current_context.clone());
    let context = match context_name.as_deref() {
        Some(name) => Some(
            config
                .contexts
                .get(name)
                .ok_or_else(|| anyhow::anyhow!("context not found: {}", name))?,
        ),
        None => None,
    };

    let context_url = match upstream {
        Some(_) => None,
        None => context.map(|ctx| ctx.api_url.as_str()),
    };
    let timeout = timeout_secs
        .or_else(|| context.and_then(|ctx| ctx.timeout_secs))
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    Ok(ResolvedSettings {
        base_url: resolve_base_url(api_url.or(context_url), upstream),
        mode: mode.or_else(|| context.and_then(|ctx| ctx.mode)),
        timeout,
    })
}

fn config_path() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("HOME is not set"))?;
    Ok(Path::new(&home).join(".adprobe").join("config.json"))
}

pub(crate) fn load_config() -> anyhow::Result<CliConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let contents = fs::read_to_string(&path)?;
    let config = serde_json::from_str(&contents)
        .map_err(|err| anyhow::anyhow!("invalid config {}: {err}", path.display()))?;
    Ok(config)
}

pub(crate) fn save_config(config: &CliConfig) -> anyhow::Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}
