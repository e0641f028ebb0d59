use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use adprobe_core::{AuthClient, ClientConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod cli_command;
mod modules;

use crate::cli_args::*;
use crate::cli_command::handle_command;
use crate::modules::auth::ProbeContext;
use crate::modules::shared::OutputFormat;
use crate::modules::system::{handle_config_command, load_config, resolve_settings, save_config};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let mut config = load_config()?;

    let command = match cli.command {
        Command::Config(args) => {
            handle_config_command(args, &mut config)?;
            save_config(&config)?;
            return Ok(ExitCode::SUCCESS);
        }
        command => command,
    };

    let settings = resolve_settings(
        cli.api_url.as_deref(),
        cli.upstream.as_deref(),
        cli.context.as_deref(),
        cli.mode,
        cli.timeout,
        &config,
    )?;
    tracing::info!(base_url = %settings.base_url, mode = ?settings.mode, "resolved target");

    let client_config = ClientConfig::new(settings.base_url)?
        .with_timeout(settings.timeout)
        .with_negotiate_token(cli.negotiate_token)
        .with_insecure(cli.insecure);
    let ctx = ProbeContext {
        client: Arc::new(AuthClient::from_config(client_config)?),
        mode: settings.mode,
        output: OutputFormat::from_flag(cli.json),
    };

    let success = handle_command(command, &ctx).await?;
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

pub(crate) fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    let mut input = String::new();
    eprint!("{prompt}");
    io::stderr().flush()?;
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub(crate) fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    eprint!("{prompt}");
    io::stderr().flush()?;
    Ok(rpassword::read_password()?)
}
