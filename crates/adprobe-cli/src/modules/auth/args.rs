use adprobe_core::OperationKind;
use clap::{Args, ValueEnum};

#[derive(Args, Clone, Default)]
pub struct CredentialArgs {
    #[arg(long, help = "DOMAIN\\user or UPN; prompted when omitted")]
    pub username: Option<String>,
    #[arg(long, help = "Prompted without echo when omitted")]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct FlowArgs {
    #[arg(required = true, value_enum, help = "Operations to run, in order")]
    pub steps: Vec<FlowStep>,
    #[command(flatten)]
    pub credentials: CredentialArgs,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlowStep {
    Windows,
    Info,
    UserInfo,
    Basic,
    Login,
    Session,
    Kerberos,
    Logout,
    Health,
}

impl FlowStep {
    pub fn kind(self) -> OperationKind {
        match self {
            Self::Windows => OperationKind::WindowsAuth,
            Self::Info => OperationKind::AuthInfo,
            Self::UserInfo => OperationKind::UserInfo,
            Self::Basic => OperationKind::BasicProbe,
            Self::Login => OperationKind::AdLogin,
            Self::Session => OperationKind::CurrentSession,
            Self::Kerberos => OperationKind::KerberosProbe,
            Self::Logout => OperationKind::Logout,
            Self::Health => OperationKind::Health,
        }
    }

    pub fn needs_credentials(self) -> bool {
        matches!(self, Self::Basic | Self::Login)
    }
}
