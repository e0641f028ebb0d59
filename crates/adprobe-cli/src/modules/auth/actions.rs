use std::sync::Arc;

use adprobe_core::{
    AuthClient, CanonicalResult, FormFields, LoginCredentials, Operation, OperationKind,
    ServerMode, Session,
};
use tracing::info;

use crate::cli_args::{CredentialArgs, FlowArgs};
use crate::modules::shared::{print_flow, print_result, OutputFormat};
use crate::{prompt_line, prompt_password};

pub(crate) struct ProbeContext {
    pub client: Arc<AuthClient>,
    pub mode: Option<ServerMode>,
    pub output: OutputFormat,
}

pub(crate) fn ensure_offered(mode: Option<ServerMode>, kind: OperationKind) -> anyhow::Result<()> {
    if let Some(mode) = mode {
        if !mode.offers(kind) {
            anyhow::bail!(
                "operation '{}' is not offered by the {} server mode",
                kind.label(),
                mode
            );
        }
    }
    Ok(())
}

pub(crate) fn resolve_credentials(args: CredentialArgs) -> anyhow::Result<LoginCredentials> {
    let username = match args.username {
        Some(username) => username,
        None => prompt_line("Username (DOMAIN\\user or UPN): ")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };
    Ok(LoginCredentials::new(username, password))
}

/// Builds the operation for `kind`, taking credentials from the form fields.
pub(crate) fn operation_for(kind: OperationKind, form: &FormFields) -> Operation {
    let credentials = || LoginCredentials::new(form.username.clone(), form.password.clone());
    match kind {
        OperationKind::WindowsAuth => Operation::WindowsAuth,
        OperationKind::AuthInfo => Operation::AuthInfo,
        OperationKind::UserInfo => Operation::UserInfo,
        OperationKind::Logout => Operation::Logout,
        OperationKind::BasicProbe => Operation::BasicProbe(credentials()),
        OperationKind::AdLogin => Operation::AdLogin(credentials()),
        OperationKind::CurrentSession => Operation::CurrentSession,
        OperationKind::KerberosProbe => Operation::KerberosProbe,
        OperationKind::Health => Operation::Health,
    }
}

async fn run_step(
    session: &mut Session,
    ctx: &ProbeContext,
    kind: OperationKind,
) -> anyhow::Result<CanonicalResult> {
    let operation = operation_for(kind, &session.form);
    let result = session
        .drive(&ctx.client, operation)
        .await
        .ok_or_else(|| anyhow::anyhow!("another operation is still running"))?;
    info!(
        operation = kind.label(),
        success = result.is_success(),
        "operation finished"
    );
    Ok(result.clone())
}

pub(crate) async fn handle_probe(
    kind: OperationKind,
    credentials: Option<CredentialArgs>,
    ctx: &ProbeContext,
) -> anyhow::Result<bool> {
    ensure_offered(ctx.mode, kind)?;
    let mut session = Session::new();
    if let Some(args) = credentials {
        let credentials = resolve_credentials(args)?;
        session.form.username = credentials.username;
        session.form.password = credentials.password;
    }
    let result = run_step(&mut session, ctx, kind).await?;
    print_result(&result, ctx.output)?;
    Ok(result.is_success())
}

/// Runs the steps in order through one client, so cookies set by an early
/// step travel with the later ones. The exit status follows the last step.
pub(crate) async fn handle_flow(args: FlowArgs, ctx: &ProbeContext) -> anyhow::Result<bool> {
    for step in &args.steps {
        ensure_offered(ctx.mode, step.kind())?;
    }
    let mut session = Session::new();
    if args.steps.iter().any(|step| step.needs_credentials()) {
        let credentials = resolve_credentials(args.credentials)?;
        session.form.username = credentials.username;
        session.form.password = credentials.password;
    }

    let mut outcomes = Vec::with_capacity(args.steps.len());
    for step in &args.steps {
        let kind = step.kind();
        let result = run_step(&mut session, ctx, kind).await?;
        outcomes.push((kind, result));
    }
    print_flow(&outcomes, ctx.output)?;
    Ok(outcomes
        .last()
        .map(|(_, result)| result.is_success())
        .unwrap_or(true))
}
