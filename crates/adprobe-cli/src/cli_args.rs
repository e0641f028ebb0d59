use adprobe_core::ServerMode;
use clap::{ArgAction, Parser, Subcommand};

pub use crate::modules::auth::args::*;
pub use crate::modules::system::args::*;

#[derive(Parser)]
#[command(name = "adprobe")]
#[command(about = "Windows/Active Directory authentication test harness")]
pub struct Cli {
    #[arg(long, env = "ADPROBE_API_URL", help = "API base URL, e.g. https://host/api")]
    pub api_url: Option<String>,
    #[arg(
        long,
        env = "ADPROBE_UPSTREAM",
        help = "Backend origin; the API is expected under /api"
    )]
    pub upstream: Option<String>,
    #[arg(long)]
    pub context: Option<String>,
    #[arg(long, help = "Server profile: ntlm or kerberos")]
    pub mode: Option<ServerMode>,
    #[arg(long, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,
    #[arg(
        long,
        env = "ADPROBE_NEGOTIATE_TOKEN",
        hide_env_values = true,
        help = "Pre-obtained SPNEGO token sent as Authorization: Negotiate"
    )]
    pub negotiate_token: Option<String>,
    #[arg(long, help = "Accept invalid TLS certificates")]
    pub insecure: bool,
    #[arg(long, help = "Print the canonical result as JSON")]
    pub json: bool,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Windows-integrated authentication (GET /user)")]
    Windows,
    #[command(about = "Fetch authentication info (GET /home)")]
    Info,
    #[command(about = "Fetch user info (GET /user-info)")]
    UserInfo,
    #[command(about = "Probe the secured endpoint with Basic credentials")]
    Basic(CredentialArgs),
    #[command(about = "AD form login (POST /login)")]
    Login(CredentialArgs),
    #[command(about = "Show the current session user (GET /user)")]
    Session,
    #[command(about = "SPNEGO/Kerberos probe for domain-joined clients")]
    Kerberos,
    #[command(about = "End the server session (POST /logout)")]
    Logout,
    #[command(about = "Check that the backend is up (GET /health)")]
    Health,
    #[command(about = "Run several operations against one session")]
    Flow(FlowArgs),
    Config(ConfigArgs),
}
