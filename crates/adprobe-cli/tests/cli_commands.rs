use assert_cmd::Command;
use mockito::Server;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;

fn base_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("adprobe"));
    cmd.env("HOME", home)
        .env_remove("ADPROBE_API_URL")
        .env_remove("ADPROBE_UPSTREAM")
        .env_remove("ADPROBE_NEGOTIATE_TOKEN");
    cmd
}

#[test]
fn windows_command_renders_user_info() {
    let home_dir = tempdir().expect("tempdir");
    let mut server = Server::new();
    server
        .mock("GET", "/api/user")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "success": true,
                "message": "Windows authentication succeeded",
                "userInfo": {
                    "username": "jdoe",
                    "domain": "CORP",
                    "groups": [{"name": "Admins"}]
                }
            })
            .to_string(),
        )
        .create();

    base_cmd(home_dir.path())
        .args(["--upstream", &server.url(), "windows"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Windows authentication succeeded"))
        .stdout(predicate::str::contains("Username: jdoe"))
        .stdout(predicate::str::contains("- Admins"));
}

#[test]
fn windows_command_renders_login_summary() {
    let home_dir = tempdir().expect("tempdir");
    let mut server = Server::new();
    server
        .mock("GET", "/api/user")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "success": true,
                "message": "Authenticated via NTLM",
                "username": "CORP\\jdoe",
                "roles": ["ROLE_USER"]
            })
            .to_string(),
        )
        .create();

    base_cmd(home_dir.path())
        .args(["--upstream", &server.url(), "windows"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Authentication result"))
        .stdout(predicate::str::contains("Username: CORP\\jdoe"))
        .stdout(predicate::str::contains("Roles:    ROLE_USER"));
}

#[test]
fn info_command_flags_html_as_json() {
    let home_dir = tempdir().expect("tempdir");
    let mut server = Server::new();
    server
        .mock("GET", "/api/home")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<!doctype html><html><body><div id=\"root\"></div></body></html>")
        .create();

    let output = base_cmd(home_dir.path())
        .args(["--api-url", &format!("{}/api", server.url()), "--json", "info"])
        .assert()
        .failure()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(value["success"], json!(false));
    assert_eq!(value["errorCode"], json!("HTML_RESPONSE"));
}

#[test]
fn user_info_reports_refused_connection() {
    let home_dir = tempdir().expect("tempdir");

    base_cmd(home_dir.path())
        .args(["--api-url", "http://127.0.0.1:1/api", "user-info"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Failed to fetch user info: "))
        .stdout(predicate::str::contains("Error code: USER_INFO_ERROR"));
}

#[test]
fn login_with_empty_password_fails_locally() {
    let home_dir = tempdir().expect("tempdir");
    let mut server = Server::new();
    let login = server.mock("POST", "/api/login").expect(0).create();

    base_cmd(home_dir.path())
        .args([
            "--upstream",
            &server.url(),
            "login",
            "--username",
            "jdoe",
            "--password",
            "",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("enter username and password"));
    login.assert();
}

#[test]
fn logout_always_succeeds_when_answered() {
    let home_dir = tempdir().expect("tempdir");
    let mut server = Server::new();
    server
        .mock("POST", "/api/logout")
        .with_status(403)
        .with_body("<!doctype html><html></html>")
        .create();

    base_cmd(home_dir.path())
        .args(["--upstream", &server.url(), "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));
}

#[test]
fn mode_rejects_foreign_operations() {
    let home_dir = tempdir().expect("tempdir");

    base_cmd(home_dir.path())
        .args(["--mode", "kerberos", "windows"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "operation 'windows' is not offered by the kerberos server mode",
        ));
}

#[test]
fn context_supplies_target_for_later_commands() {
    let home_dir = tempdir().expect("tempdir");
    let mut server = Server::new();
    server
        .mock("GET", "/api/health")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("Server is running")
        .create();

    base_cmd(home_dir.path())
        .args([
            "config",
            "set-context",
            "lab",
            "--api-url",
            &format!("{}/api", server.url()),
            "--mode",
            "ntlm",
        ])
        .assert()
        .success();
    assert!(home_dir.path().join(".adprobe").join("config.json").exists());

    base_cmd(home_dir.path())
        .args(["config", "get-contexts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* lab"));

    base_cmd(home_dir.path())
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("Server is running"));
}

#[test]
fn kerberos_probe_explains_unavailable_negotiate() {
    let home_dir = tempdir().expect("tempdir");
    let mut server = Server::new();
    server
        .mock("GET", "/api/user")
        .with_status(401)
        .with_header("www-authenticate", "Negotiate")
        .create();

    base_cmd(home_dir.path())
        .args(["--upstream", &server.url(), "--mode", "kerberos", "kerberos"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Integrated Windows authentication is unavailable",
        ));
}
