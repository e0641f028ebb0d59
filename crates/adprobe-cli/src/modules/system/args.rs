use adprobe_core::ServerMode;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Create or update a context")]
    SetContext(SetContextArgs),
    #[command(about = "Set the active context")]
    UseContext(UseContextArgs),
    #[command(about = "Print the active context name")]
    CurrentContext,
    #[command(about = "List known context names")]
    GetContexts,
    #[command(about = "Print a context's settings as JSON")]
    Show(ShowContextArgs),
}

#[derive(Args)]
pub struct SetContextArgs {
    #[arg(help = "Context name")]
    pub name: String,
    #[arg(long, help = "API base URL, e.g. https://host/api")]
    pub api_url: Option<String>,
    #[arg(long, help = "Server profile: ntlm or kerberos")]
    pub mode: Option<ServerMode>,
    #[arg(long, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,
}

#[derive(Args)]
pub struct UseContextArgs {
    #[arg(help = "Context name")]
    pub name: String,
}

#[derive(Args)]
pub struct ShowContextArgs {
    #[arg(help = "Context name (defaults to the active one)")]
    pub name: Option<String>,
}
