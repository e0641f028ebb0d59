use adprobe_core::{
    classify, is_html_document, policy_for, CanonicalResult, ErrorCode, OperationKind, RawOutcome,
    RawResponse,
};
use proptest::prelude::*;

fn toggle_case(text: &str, mask: &[bool]) -> String {
    text.chars()
        .zip(mask.iter().cycle())
        .map(|(ch, upper)| {
            if *upper {
                ch.to_ascii_uppercase()
            } else {
                ch.to_ascii_lowercase()
            }
        })
        .collect()
}

#[test]
fn spa_shell_is_detected() {
    let body = "<!doctype html>\n<html lang=\"en\">\n  <head><script type=\"module\" src=\"/src/main.tsx\"></script></head>\n</html>\n";
    assert!(is_html_document(None, body));
    assert!(is_html_document(Some("text/html"), body));
}

proptest! {
    #[test]
    fn doctype_detection_ignores_case_and_leading_whitespace(
        mask in proptest::collection::vec(any::<bool>(), 1..16),
        padding in "[ \t\r\n]{0,8}",
        tail in "[a-zA-Z0-9<>/ ]{0,32}",
    ) {
        let body = format!("{padding}{}{tail}", toggle_case("<!doctype html>", &mask));
        prop_assert!(is_html_document(None, &body));
        prop_assert_eq!(is_html_document(None, &body), is_html_document(None, &body));
    }

    #[test]
    fn json_bodies_mentioning_html_are_not_html(
        message in "[a-zA-Z ]{0,24}",
        position in 0usize..3,
    ) {
        let marker = "<!doctype html>";
        let text = match position {
            0 => format!("{marker}{message}"),
            1 => format!("{message}{marker}"),
            _ => format!("{message}{marker}{message}"),
        };
        let body = serde_json::json!({"success": false, "message": text}).to_string();
        prop_assert!(!is_html_document(None, &body));
        prop_assert!(!is_html_document(Some("application/json"), &body));

        let result = classify(
            RawOutcome::Failure(RawResponse {
                status: 403,
                content_type: Some("application/json".to_string()),
                body,
            }),
            &policy_for(OperationKind::WindowsAuth),
        );
        prop_assert!(matches!(result, CanonicalResult::Auth(ref auth) if auth.message == text));
    }

    #[test]
    fn every_outcome_yields_a_described_result(
        status in 100u16..600,
        body in ".{0,64}",
        reason in "[a-z ]{0,24}",
        timed_out in any::<bool>(),
        variant in 0usize..4,
    ) {
        let response = RawResponse { status, content_type: None, body };
        let outcome = match variant {
            0 => RawOutcome::Success(response),
            1 => RawOutcome::Failure(response),
            2 => RawOutcome::NoResponse { reason, timed_out },
            _ => RawOutcome::Local { reason },
        };
        for kind in [
            OperationKind::WindowsAuth,
            OperationKind::UserInfo,
            OperationKind::AdLogin,
            OperationKind::KerberosProbe,
        ] {
            let result = classify(outcome.clone(), &policy_for(kind));
            if !result.is_success() {
                prop_assert!(!result.message().trim().is_empty());
            } else {
                prop_assert!(result.error_code().is_none());
            }
            if let Some(code) = result.error_code() {
                prop_assert!(!matches!(code, ErrorCode::Other(_)) || variant < 2);
            }
        }
    }
}
