use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Diagnostic tag attached to failed results. Backends may send tags this
/// client does not know; those are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    HtmlResponse,
    HtmlErrorPage,
    NetworkError,
    UnknownError,
    LogoutError,
    UserInfoError,
    FetchError,
    BasicAuthError,
    UnexpectedError,
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::HtmlResponse => "HTML_RESPONSE",
            Self::HtmlErrorPage => "HTML_ERROR_PAGE",
            Self::NetworkError => "NETWORK_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::LogoutError => "LOGOUT_ERROR",
            Self::UserInfoError => "USER_INFO_ERROR",
            Self::FetchError => "FETCH_ERROR",
            Self::BasicAuthError => "BASIC_AUTH_ERROR",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(value: &str) -> Self {
        match value {
            "HTML_RESPONSE" => Self::HtmlResponse,
            "HTML_ERROR_PAGE" => Self::HtmlErrorPage,
            "NETWORK_ERROR" => Self::NetworkError,
            "UNKNOWN_ERROR" => Self::UnknownError,
            "LOGOUT_ERROR" => Self::LogoutError,
            "USER_INFO_ERROR" => Self::UserInfoError,
            "FETCH_ERROR" => Self::FetchError,
            "BASIC_AUTH_ERROR" => Self::BasicAuthError,
            "UNEXPECTED_ERROR" => Self::UnexpectedError,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

/// The eight user-facing operations plus the health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    WindowsAuth,
    AuthInfo,
    UserInfo,
    Logout,
    BasicProbe,
    AdLogin,
    CurrentSession,
    KerberosProbe,
    Health,
}

impl OperationKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::WindowsAuth => "windows",
            Self::AuthInfo => "info",
            Self::UserInfo => "user-info",
            Self::Logout => "logout",
            Self::BasicProbe => "basic",
            Self::AdLogin => "login",
            Self::CurrentSession => "session",
            Self::KerberosProbe => "kerberos",
            Self::Health => "health",
        }
    }
}

/// Server profile a harness session targets. Each profile exposes a
/// different set of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    /// AD/LDAP default profile: NTLM-integrated auth and Basic probes.
    Ntlm,
    /// Kerberos profile: SPNEGO probe and AD form login.
    Kerberos,
}

impl ServerMode {
    pub fn offers(self, kind: OperationKind) -> bool {
        use OperationKind::*;
        match self {
            Self::Ntlm => matches!(
                kind,
                WindowsAuth | AuthInfo | UserInfo | BasicProbe | Logout | Health
            ),
            Self::Kerberos => matches!(
                kind,
                AdLogin | KerberosProbe | CurrentSession | Logout | Health
            ),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ntlm => "ntlm",
            Self::Kerberos => "kerberos",
        }
    }
}

impl std::fmt::Display for ServerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct EnumParseError {
    enum_name: &'static str,
    value: String,
}

impl EnumParseError {
    fn new(enum_name: &'static str, value: impl Into<String>) -> Self {
        Self {
            enum_name,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} value: {}", self.enum_name, self.value)
    }
}

impl std::error::Error for EnumParseError {}

impl std::str::FromStr for ServerMode {
    type Err = EnumParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ntlm" => Ok(Self::Ntlm),
            "kerberos" => Ok(Self::Kerberos),
            other => Err(EnumParseError::new("ServerMode", other)),
        }
    }
}
