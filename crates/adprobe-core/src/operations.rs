use serde_json::json;
use tracing::{debug, warn};

use crate::{
    classify, AuthResult, CanonicalResult, ClassifyPolicy, ClientConfig, ConfigError, ErrorCode,
    HttpTransport, OperationKind, RawOutcome, RequestOptions, ResultShape, Transport,
};

pub const USER_PATH: &str = "/user";
pub const HOME_PATH: &str = "/home";
pub const USER_INFO_PATH: &str = "/user-info";
pub const LOGOUT_PATH: &str = "/logout";
pub const SECURE_PATH: &str = "/secure";
pub const LOGIN_PATH: &str = "/login";
pub const HEALTH_PATH: &str = "/health";

pub const LOGOUT_MESSAGE: &str = "Logged out";
pub const MISSING_CREDENTIALS_MESSAGE: &str = "enter username and password";
pub const KERBEROS_UNAVAILABLE_MESSAGE: &str =
    "Integrated Windows authentication is unavailable; check that this machine is joined to the domain";

#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    WindowsAuth,
    AuthInfo,
    UserInfo,
    Logout,
    BasicProbe(LoginCredentials),
    AdLogin(LoginCredentials),
    CurrentSession,
    KerberosProbe,
    Health,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::WindowsAuth => OperationKind::WindowsAuth,
            Self::AuthInfo => OperationKind::AuthInfo,
            Self::UserInfo => OperationKind::UserInfo,
            Self::Logout => OperationKind::Logout,
            Self::BasicProbe(_) => OperationKind::BasicProbe,
            Self::AdLogin(_) => OperationKind::AdLogin,
            Self::CurrentSession => OperationKind::CurrentSession,
            Self::KerberosProbe => OperationKind::KerberosProbe,
            Self::Health => OperationKind::Health,
        }
    }
}

pub fn policy_for(kind: OperationKind) -> ClassifyPolicy {
    use OperationKind::*;
    match kind {
        WindowsAuth => ClassifyPolicy::new(kind, ResultShape::Auth, "An error occurred")
            .with_default_code(ErrorCode::UnknownError)
            .reporting_unreachable()
            .inferring_shape(),
        AuthInfo => ClassifyPolicy::new(
            kind,
            ResultShape::Auth,
            "Failed to fetch authentication info",
        )
        .with_default_code(ErrorCode::FetchError),
        UserInfo => ClassifyPolicy::new(kind, ResultShape::Auth, "Failed to fetch user info")
            .with_default_code(ErrorCode::UserInfoError),
        Logout => ClassifyPolicy::new(kind, ResultShape::Auth, "Logout failed")
            .with_default_code(ErrorCode::LogoutError),
        BasicProbe => {
            ClassifyPolicy::new(kind, ResultShape::Auth, "Basic authentication failed")
                .with_default_code(ErrorCode::BasicAuthError)
        }
        AdLogin => ClassifyPolicy::new(kind, ResultShape::Login, "AD authentication failed"),
        CurrentSession => {
            ClassifyPolicy::new(kind, ResultShape::Login, "Failed to fetch user info")
                .inferring_shape()
        }
        KerberosProbe => ClassifyPolicy::new(kind, ResultShape::Login, "Authentication error")
            .with_unauthorized_message(KERBEROS_UNAVAILABLE_MESSAGE)
            .inferring_shape(),
        Health => ClassifyPolicy::new(kind, ResultShape::Auth, "Health check failed")
            .with_default_code(ErrorCode::FetchError)
            .reporting_unreachable()
            .accepting_text(),
    }
}

/// The harness operations over one transport. Every method returns a
/// canonical result; nothing here fails.
pub struct AuthClient<T = HttpTransport> {
    transport: T,
}

impl AuthClient<HttpTransport> {
    pub fn from_config(config: ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

impl<T: Transport> AuthClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn execute(&self, operation: &Operation) -> CanonicalResult {
        debug!(operation = operation.kind().label(), "running operation");
        match operation {
            Operation::WindowsAuth => self.authenticate_windows().await,
            Operation::AuthInfo => self.auth_info().await,
            Operation::UserInfo => self.user_info().await,
            Operation::Logout => self.logout().await,
            Operation::BasicProbe(credentials) => self.basic_probe(credentials).await,
            Operation::AdLogin(credentials) => self.ad_login(credentials).await,
            Operation::CurrentSession => self.current_session().await,
            Operation::KerberosProbe => self.kerberos_probe().await,
            Operation::Health => self.health().await,
        }
    }

    async fn get_classified(
        &self,
        kind: OperationKind,
        path: &str,
        options: RequestOptions,
    ) -> CanonicalResult {
        let outcome = RawOutcome::from_transport(self.transport.get(path, options).await);
        classify(outcome, &policy_for(kind))
    }

    pub async fn authenticate_windows(&self) -> CanonicalResult {
        self.get_classified(OperationKind::WindowsAuth, USER_PATH, RequestOptions::ambient())
            .await
    }

    pub async fn auth_info(&self) -> CanonicalResult {
        self.get_classified(OperationKind::AuthInfo, HOME_PATH, RequestOptions::ambient())
            .await
    }

    pub async fn user_info(&self) -> CanonicalResult {
        self.get_classified(
            OperationKind::UserInfo,
            USER_INFO_PATH,
            RequestOptions::ambient(),
        )
        .await
    }

    /// Session termination is idempotent from this side: any answer to the
    /// POST counts as logged out, whatever its status or body.
    pub async fn logout(&self) -> CanonicalResult {
        match self
            .transport
            .post(LOGOUT_PATH, None, RequestOptions::ambient())
            .await
        {
            Ok(response) => {
                debug!(status = response.status, "logout acknowledged");
                CanonicalResult::Auth(AuthResult::success(LOGOUT_MESSAGE))
            }
            Err(err) => classify(
                RawOutcome::from_transport(Err(err)),
                &policy_for(OperationKind::Logout),
            ),
        }
    }

    pub async fn basic_probe(&self, credentials: &LoginCredentials) -> CanonicalResult {
        if !credentials.is_complete() {
            warn!("basic probe skipped: missing credentials");
            return CanonicalResult::Auth(AuthResult::failure(
                MISSING_CREDENTIALS_MESSAGE,
                Some(ErrorCode::BasicAuthError),
            ));
        }
        self.get_classified(
            OperationKind::BasicProbe,
            SECURE_PATH,
            RequestOptions::basic(&credentials.username, &credentials.password),
        )
        .await
    }

    pub async fn ad_login(&self, credentials: &LoginCredentials) -> CanonicalResult {
        if !credentials.is_complete() {
            warn!("ad login skipped: missing credentials");
            return CanonicalResult::failure(ResultShape::Login, MISSING_CREDENTIALS_MESSAGE, None);
        }
        let body = json!({
            "username": credentials.username,
            "password": credentials.password,
        });
        let result = self
            .transport
            .post(LOGIN_PATH, Some(body), RequestOptions::ambient())
            .await;
        classify(
            RawOutcome::from_transport(result),
            &policy_for(OperationKind::AdLogin),
        )
    }

    pub async fn current_session(&self) -> CanonicalResult {
        self.get_classified(
            OperationKind::CurrentSession,
            USER_PATH,
            RequestOptions::ambient(),
        )
        .await
    }

    pub async fn kerberos_probe(&self) -> CanonicalResult {
        self.get_classified(
            OperationKind::KerberosProbe,
            USER_PATH,
            RequestOptions::ambient().no_cache(),
        )
        .await
    }

    pub async fn health(&self) -> CanonicalResult {
        self.get_classified(OperationKind::Health, HEALTH_PATH, RequestOptions::ambient())
            .await
    }
}
