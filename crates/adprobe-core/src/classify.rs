//! Maps every raw HTTP outcome onto a canonical result.
//!
//! Rules are checked in order and the first match wins:
//!
//! 0. an operation-specific message for `401` (Kerberos probe only);
//! 1. an HTML document where JSON was expected is a routing failure;
//! 2. a JSON body in the expected shape is passed through;
//! 3. no response at all (or a timeout) is a network failure, for the
//!    operations that report it;
//! 4. anything else gets the operation's default code and failure title.

use serde_json::Value;
use tracing::warn;

use crate::{
    AuthResult, CanonicalResult, ErrorCode, LoginResponse, OperationKind, RawResponse,
    ResultShape, TransportError,
};

pub const HTML_RESPONSE_MESSAGE: &str =
    "The server returned an HTML page instead of an API response; check the API endpoint";
pub const HTML_ERROR_PAGE_MESSAGE: &str = "Server error: an HTML page was returned";
pub const NETWORK_ERROR_MESSAGE: &str =
    "Cannot connect to the server; check that it is running and reachable";

#[derive(Debug, Clone)]
pub enum RawOutcome {
    /// 2xx with a body.
    Success(RawResponse),
    /// Any other status with a body.
    Failure(RawResponse),
    /// Sent, but nothing came back.
    NoResponse { reason: String, timed_out: bool },
    /// Failed on this side before or after the exchange.
    Local { reason: String },
}

impl RawOutcome {
    pub fn from_transport(result: Result<RawResponse, TransportError>) -> Self {
        match result {
            Ok(response) if response.is_success() => Self::Success(response),
            Ok(response) => Self::Failure(response),
            Err(TransportError::NoResponse {
                reason, timed_out, ..
            }) => Self::NoResponse { reason, timed_out },
            Err(TransportError::Local { reason, .. }) => Self::Local { reason },
        }
    }
}

/// Per-operation knobs for the fallback branches.
#[derive(Debug, Clone)]
pub struct ClassifyPolicy {
    pub operation: OperationKind,
    pub shape: ResultShape,
    pub default_code: Option<ErrorCode>,
    /// Prefix of the branch-4 message, also used for blank backend failures.
    pub failure_title: &'static str,
    pub report_unreachable: bool,
    pub unauthorized_message: Option<&'static str>,
    /// Plain-text 2xx bodies become the success message.
    pub accepts_text: bool,
    /// The endpoint answers in either shape; the body's fields pick one.
    /// `shape` still applies to synthesized failures.
    pub infers_shape: bool,
}

impl ClassifyPolicy {
    pub fn new(operation: OperationKind, shape: ResultShape, failure_title: &'static str) -> Self {
        Self {
            operation,
            shape,
            default_code: None,
            failure_title,
            report_unreachable: false,
            unauthorized_message: None,
            accepts_text: false,
            infers_shape: false,
        }
    }

    pub fn with_default_code(mut self, code: ErrorCode) -> Self {
        self.default_code = Some(code);
        self
    }

    pub fn reporting_unreachable(mut self) -> Self {
        self.report_unreachable = true;
        self
    }

    pub fn with_unauthorized_message(mut self, message: &'static str) -> Self {
        self.unauthorized_message = Some(message);
        self
    }

    pub fn accepting_text(mut self) -> Self {
        self.accepts_text = true;
        self
    }

    pub fn inferring_shape(mut self) -> Self {
        self.infers_shape = true;
        self
    }

    pub fn fallback(&self, reason: &str) -> CanonicalResult {
        let message = if reason.trim().is_empty() {
            self.failure_title.to_string()
        } else {
            format!("{}: {}", self.failure_title, reason.trim())
        };
        CanonicalResult::failure(self.shape, message, self.default_code.clone())
    }
}

/// True when the body is a whole HTML document rather than API data.
///
/// A declared `text/html` content type decides on its own. Otherwise the body,
/// minus a BOM and leading whitespace, must open with a doctype or `<html`
/// tag; text that merely mentions one further in never counts.
pub fn is_html_document(content_type: Option<&str>, body: &str) -> bool {
    if let Some(content_type) = content_type {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("text/html") {
            return true;
        }
    }
    let lead = body.trim_start_matches('\u{feff}').trim_start();
    starts_with_ignore_case(lead, "<!doctype html") || starts_with_html_tag(lead)
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn starts_with_html_tag(text: &str) -> bool {
    if !starts_with_ignore_case(text, "<html") {
        return false;
    }
    matches!(
        text.as_bytes().get("<html".len()),
        None | Some(b'>' | b' ' | b'\t' | b'\r' | b'\n' | b'/')
    )
}

pub fn classify(outcome: RawOutcome, policy: &ClassifyPolicy) -> CanonicalResult {
    let operation = policy.operation.label();
    match outcome {
        RawOutcome::Failure(response)
            if response.status == 401 && policy.unauthorized_message.is_some() =>
        {
            warn!(operation, status = response.status, "integrated authentication refused");
            let message = policy.unauthorized_message.unwrap_or(policy.failure_title);
            CanonicalResult::failure(policy.shape, message, None)
        }
        RawOutcome::Success(response)
            if is_html_document(response.content_type.as_deref(), &response.body) =>
        {
            warn!(operation, status = response.status, "html page returned for api call");
            CanonicalResult::failure(
                policy.shape,
                HTML_RESPONSE_MESSAGE,
                Some(ErrorCode::HtmlResponse),
            )
        }
        RawOutcome::Failure(response)
            if is_html_document(response.content_type.as_deref(), &response.body) =>
        {
            warn!(operation, status = response.status, "html error page returned for api call");
            CanonicalResult::failure(
                policy.shape,
                HTML_ERROR_PAGE_MESSAGE,
                Some(ErrorCode::HtmlErrorPage),
            )
        }
        RawOutcome::Success(response) => match decode(&response.body, policy) {
            Ok(result) => result,
            Err(reason) => {
                if policy.accepts_text && !response.body.trim().is_empty() {
                    return CanonicalResult::Auth(AuthResult::success(response.body.trim()));
                }
                warn!(operation, status = response.status, %reason, "unreadable success body");
                policy.fallback(&reason)
            }
        },
        RawOutcome::Failure(response) => match decode(&response.body, policy) {
            Ok(result) => {
                warn!(operation, status = response.status, "backend reported failure");
                result
            }
            Err(reason) => {
                warn!(operation, status = response.status, %reason, "failure body is not a result");
                if let Some(message) = backend_message(&response.body) {
                    return CanonicalResult::failure(
                        policy.shape,
                        message,
                        policy.default_code.clone(),
                    );
                }
                let body = if response.body.trim().is_empty() {
                    "no result body"
                } else {
                    "an unrecognized result body"
                };
                policy.fallback(&format!(
                    "server answered with status {} and {body}",
                    response.status
                ))
            }
        },
        RawOutcome::NoResponse { reason, timed_out } => {
            warn!(operation, timed_out, %reason, "no response from server");
            if policy.report_unreachable || timed_out {
                CanonicalResult::failure(
                    policy.shape,
                    NETWORK_ERROR_MESSAGE,
                    Some(ErrorCode::NetworkError),
                )
            } else {
                policy.fallback(&reason)
            }
        }
        RawOutcome::Local { reason } => {
            warn!(operation, %reason, "request failed locally");
            policy.fallback(&reason)
        }
    }
}

fn decode(body: &str, policy: &ClassifyPolicy) -> Result<CanonicalResult, String> {
    if body.trim().is_empty() {
        return Err("empty response body".to_string());
    }
    let value: Value =
        serde_json::from_str(body).map_err(|err| format!("unreadable response body: {err}"))?;
    let shape = if policy.infers_shape {
        shape_of(&value).unwrap_or(policy.shape)
    } else {
        policy.shape
    };
    let result = match shape {
        ResultShape::Auth => serde_json::from_value::<AuthResult>(value)
            .map(|result| CanonicalResult::Auth(result.normalized(policy.failure_title))),
        ResultShape::Login => serde_json::from_value::<LoginResponse>(value)
            .map(|result| CanonicalResult::Login(result.normalized(policy.failure_title))),
    };
    result.map_err(|err| format!("unreadable response body: {err}"))
}

/// `userInfo` marks an auth result, `username`/`roles` a login response.
fn shape_of(value: &Value) -> Option<ResultShape> {
    let object = value.as_object()?;
    if object.contains_key("userInfo") {
        Some(ResultShape::Auth)
    } else if object.contains_key("username") || object.contains_key("roles") {
        Some(ResultShape::Login)
    } else {
        None
    }
}

/// A `message` string from a JSON failure body that is not a result.
fn backend_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = value.get("message")?.as_str()?.trim();
    (!message.is_empty()).then(|| message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
        }
    }

    fn html(status: u16) -> RawResponse {
        RawResponse {
            status,
            content_type: None,
            body: "<!doctype html>\n<html><body><div id=\"root\"></div></body></html>".to_string(),
        }
    }

    fn windows_policy() -> ClassifyPolicy {
        ClassifyPolicy::new(
            OperationKind::WindowsAuth,
            ResultShape::Auth,
            "An error occurred",
        )
        .with_default_code(ErrorCode::UnknownError)
        .reporting_unreachable()
    }

    fn assert_canonical_failure(result: &CanonicalResult) {
        assert!(!result.is_success());
        assert!(!result.message().trim().is_empty());
    }

    #[test]
    fn html_detection_is_structural() {
        assert!(is_html_document(None, "<!DOCTYPE html><html></html>"));
        assert!(is_html_document(None, "\u{feff}\n   <!doctype HTML>"));
        assert!(is_html_document(None, "<HTML lang=\"en\">"));
        assert!(is_html_document(Some("text/html; charset=utf-8"), "oops"));
        assert!(!is_html_document(
            Some("application/json"),
            r#"{"success":false,"message":"got <!doctype html> from upstream"}"#
        ));
        assert!(!is_html_document(None, "<htmlish>"));
        assert!(!is_html_document(None, "Server is running"));
    }

    #[test]
    fn html_success_is_routing_failure() {
        let result = classify(RawOutcome::Success(html(200)), &windows_policy());
        assert_canonical_failure(&result);
        assert_eq!(result.error_code(), Some(&ErrorCode::HtmlResponse));
    }

    #[test]
    fn html_error_page_is_routing_failure() {
        let result = classify(RawOutcome::Failure(html(502)), &windows_policy());
        assert_canonical_failure(&result);
        assert_eq!(result.error_code(), Some(&ErrorCode::HtmlErrorPage));
    }

    #[test]
    fn structured_failure_passes_through() {
        let body = r#"{"success":false,"message":"Account disabled","errorCode":"ACCOUNT_DISABLED"}"#;
        let result = classify(RawOutcome::Failure(json(403, body)), &windows_policy());
        assert_eq!(
            result,
            CanonicalResult::Auth(AuthResult::failure(
                "Account disabled",
                Some(ErrorCode::Other("ACCOUNT_DISABLED".to_string()))
            ))
        );
    }

    #[test]
    fn unreachable_server_uses_network_error_when_reported() {
        let outcome = RawOutcome::NoResponse {
            reason: "connection refused".to_string(),
            timed_out: false,
        };
        let result = classify(outcome.clone(), &windows_policy());
        assert_eq!(result.error_code(), Some(&ErrorCode::NetworkError));
        assert_eq!(result.message(), NETWORK_ERROR_MESSAGE);

        let policy = ClassifyPolicy::new(
            OperationKind::UserInfo,
            ResultShape::Auth,
            "Failed to fetch user info",
        )
        .with_default_code(ErrorCode::UserInfoError);
        let result = classify(outcome, &policy);
        assert_eq!(result.error_code(), Some(&ErrorCode::UserInfoError));
        assert!(result.message().contains("connection refused"));
    }

    #[test]
    fn timeout_is_always_network_error() {
        let policy = ClassifyPolicy::new(OperationKind::AuthInfo, ResultShape::Auth, "Failed")
            .with_default_code(ErrorCode::FetchError);
        let result = classify(
            RawOutcome::NoResponse {
                reason: "operation timed out".to_string(),
                timed_out: true,
            },
            &policy,
        );
        assert_eq!(result.error_code(), Some(&ErrorCode::NetworkError));
    }

    #[test]
    fn local_and_unparseable_outcomes_use_default_code() {
        let local = classify(
            RawOutcome::Local {
                reason: "invalid header".to_string(),
            },
            &windows_policy(),
        );
        assert_eq!(local.error_code(), Some(&ErrorCode::UnknownError));
        assert_eq!(local.message(), "An error occurred: invalid header");

        let garbled = classify(
            RawOutcome::Success(json(200, "{\"unexpected\": true}")),
            &windows_policy(),
        );
        assert_canonical_failure(&garbled);
        assert_eq!(garbled.error_code(), Some(&ErrorCode::UnknownError));

        let empty = classify(RawOutcome::Failure(json(500, "")), &windows_policy());
        assert_canonical_failure(&empty);
        assert!(empty.message().contains("500"));
    }

    #[test]
    fn failure_body_without_result_keeps_backend_message() {
        let policy = ClassifyPolicy::new(
            OperationKind::UserInfo,
            ResultShape::Auth,
            "Failed to fetch user info",
        )
        .with_default_code(ErrorCode::UserInfoError);
        let result = classify(
            RawOutcome::Failure(json(
                401,
                r#"{"authenticated":false,"message":"Authentication required"}"#,
            )),
            &policy,
        );
        assert_eq!(
            result,
            CanonicalResult::Auth(AuthResult::failure(
                "Authentication required",
                Some(ErrorCode::UserInfoError)
            ))
        );

        let spring = classify(
            RawOutcome::Failure(json(
                401,
                r#"{"status":401,"error":"Unauthorized","path":"/api/user-info"}"#,
            )),
            &policy,
        );
        assert_eq!(
            spring.message(),
            "Failed to fetch user info: server answered with status 401 and an unrecognized result body"
        );
    }

    #[test]
    fn either_shape_is_accepted_when_inferred() {
        let policy = ClassifyPolicy::new(OperationKind::WindowsAuth, ResultShape::Auth, "An error occurred")
            .inferring_shape();
        let login = classify(
            RawOutcome::Success(json(
                200,
                r#"{"success":true,"message":"Authenticated via NTLM","username":"CORP\\jdoe","roles":["ROLE_USER"]}"#,
            )),
            &policy,
        );
        assert_eq!(login.shape(), ResultShape::Login);
        assert!(matches!(
            login.template(),
            crate::Template::LoginSummary { username: "CORP\\jdoe", roles } if roles == ["ROLE_USER"]
        ));

        let plain = classify(
            RawOutcome::Failure(json(403, r#"{"success":false,"message":"Denied"}"#)),
            &policy,
        );
        assert_eq!(plain.shape(), ResultShape::Auth);

        let fixed = classify(
            RawOutcome::Success(json(
                200,
                r#"{"success":true,"message":"ok","username":"jdoe"}"#,
            )),
            &windows_policy(),
        );
        assert_eq!(fixed.shape(), ResultShape::Auth);
    }

    #[test]
    fn unauthorized_override_wins_over_body() {
        let policy = ClassifyPolicy::new(
            OperationKind::KerberosProbe,
            ResultShape::Login,
            "Authentication error",
        )
        .with_unauthorized_message("integrated auth unavailable");
        let result = classify(
            RawOutcome::Failure(json(401, r#"{"success":false,"message":"Negotiate"}"#)),
            &policy,
        );
        assert_eq!(result.shape(), ResultShape::Login);
        assert_eq!(result.message(), "integrated auth unavailable");
        assert!(result.error_code().is_none());
    }

    #[test]
    fn login_shape_failures_have_no_default_code() {
        let policy = ClassifyPolicy::new(
            OperationKind::AdLogin,
            ResultShape::Login,
            "AD authentication failed",
        );
        let result = classify(
            RawOutcome::Local {
                reason: "boom".to_string(),
            },
            &policy,
        );
        assert_eq!(result.shape(), ResultShape::Login);
        assert!(result.error_code().is_none());
        assert_eq!(result.message(), "AD authentication failed: boom");
    }

    #[test]
    fn text_bodies_are_accepted_when_allowed() {
        let policy = ClassifyPolicy::new(OperationKind::Health, ResultShape::Auth, "Health check failed")
            .accepting_text();
        let result = classify(
            RawOutcome::Success(RawResponse {
                status: 200,
                content_type: Some("text/plain".to_string()),
                body: "Server is running - 2024-01-01T00:00:00Z\n".to_string(),
            }),
            &policy,
        );
        assert!(result.is_success());
        assert_eq!(result.message(), "Server is running - 2024-01-01T00:00:00Z");
    }
}
