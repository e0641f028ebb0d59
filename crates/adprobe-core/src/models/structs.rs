use serde::{Deserialize, Deserializer, Serialize};

use super::ErrorCode;

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub groups: Vec<GroupInfo>,
}

impl UserInfo {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            full_name: None,
            domain: None,
            sid: None,
            email: None,
            authentication_type: None,
            groups: Vec::new(),
        }
    }
}

/// Result shape of the integrated-auth, info and probe endpoints.
///
/// `success == true` never carries an error code, and a failure always has a
/// non-empty message. Values decoded from a backend go through
/// [`AuthResult::normalized`] before anyone sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl AuthResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            user_info: None,
            error_code: None,
        }
    }

    pub fn failure(message: impl Into<String>, error_code: Option<ErrorCode>) -> Self {
        Self {
            success: false,
            message: message.into(),
            user_info: None,
            error_code,
        }
    }

    pub fn normalized(mut self, fallback_message: &str) -> Self {
        if self.success {
            self.error_code = None;
        } else if self.message.trim().is_empty() {
            self.message = fallback_message.to_string();
        }
        self
    }
}

/// Result shape of the AD form-login transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<String>,
    /// Form-login backends never send one; routing and network failures do.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl LoginResponse {
    pub fn failure(message: impl Into<String>, error_code: Option<ErrorCode>) -> Self {
        Self {
            success: false,
            message: message.into(),
            username: None,
            roles: Vec::new(),
            error_code,
        }
    }

    pub fn normalized(mut self, fallback_message: &str) -> Self {
        if self.success {
            self.error_code = None;
        } else if self.message.trim().is_empty() {
            self.message = fallback_message.to_string();
        }
        self
    }
}

/// Which canonical shape an operation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Auth,
    Login,
}

/// The one value every operation converges on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CanonicalResult {
    Auth(AuthResult),
    Login(LoginResponse),
}

/// Render template picked from the fields a settled result actually carries.
#[derive(Debug, PartialEq, Eq)]
pub enum Template<'a> {
    UserInfo(&'a UserInfo),
    LoginSummary {
        username: &'a str,
        roles: &'a [String],
    },
    MessageOnly,
}

impl CanonicalResult {
    /// A failure in the shape an operation promised.
    pub fn failure(shape: ResultShape, message: impl Into<String>, code: Option<ErrorCode>) -> Self {
        match shape {
            ResultShape::Auth => Self::Auth(AuthResult::failure(message, code)),
            ResultShape::Login => Self::Login(LoginResponse::failure(message, code)),
        }
    }

    pub fn shape(&self) -> ResultShape {
        match self {
            Self::Auth(_) => ResultShape::Auth,
            Self::Login(_) => ResultShape::Login,
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Self::Auth(result) => result.success,
            Self::Login(result) => result.success,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Auth(result) => &result.message,
            Self::Login(result) => &result.message,
        }
    }

    pub fn error_code(&self) -> Option<&ErrorCode> {
        match self {
            Self::Auth(result) => result.error_code.as_ref(),
            Self::Login(result) => result.error_code.as_ref(),
        }
    }

    pub fn template(&self) -> Template<'_> {
        match self {
            Self::Auth(AuthResult {
                user_info: Some(info),
                ..
            }) => Template::UserInfo(info),
            Self::Login(LoginResponse {
                username: Some(username),
                roles,
                ..
            }) if !username.is_empty() => Template::LoginSummary { username, roles },
            _ => Template::MessageOnly,
        }
    }
}
