use adprobe_core::OperationKind;

use crate::cli_args::*;
use crate::modules::auth::{handle_flow, handle_probe, ProbeContext};

/// Runs one probe command; `Ok(false)` means the canonical result was a
/// failure.
pub(crate) async fn handle_command(command: Command, ctx: &ProbeContext) -> anyhow::Result<bool> {
    let success = match command {
        Command::Windows => handle_probe(OperationKind::WindowsAuth, None, ctx).await?,
        Command::Info => handle_probe(OperationKind::AuthInfo, None, ctx).await?,
        Command::UserInfo => handle_probe(OperationKind::UserInfo, None, ctx).await?,
        Command::Basic(args) => handle_probe(OperationKind::BasicProbe, Some(args), ctx).await?,
        Command::Login(args) => handle_probe(OperationKind::AdLogin, Some(args), ctx).await?,
        Command::Session => handle_probe(OperationKind::CurrentSession, None, ctx).await?,
        Command::Kerberos => handle_probe(OperationKind::KerberosProbe, None, ctx).await?,
        Command::Logout => handle_probe(OperationKind::Logout, None, ctx).await?,
        Command::Health => handle_probe(OperationKind::Health, None, ctx).await?,
        Command::Flow(args) => handle_flow(args, ctx).await?,
        Command::Config(_) => anyhow::bail!("config commands do not run against a server"),
    };
    Ok(success)
}
