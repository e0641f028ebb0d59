use adprobe_core::{CanonicalResult, OperationKind, Template, UserInfo};
use serde::Serialize;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub(crate) fn from_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

#[derive(Serialize)]
struct FlowEntry<'a> {
    operation: &'static str,
    result: &'a CanonicalResult,
}

pub(crate) fn print_result(result: &CanonicalResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(result)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
    }
    Ok(())
}

pub(crate) fn print_flow(
    outcomes: &[(OperationKind, CanonicalResult)],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for (kind, result) in outcomes {
                println!("[{}]", kind.label());
                print!("{}", render_text(result));
            }
        }
        OutputFormat::Json => println!("{}", render_flow_json(outcomes)?),
    }
    Ok(())
}

pub(crate) fn render_flow_json(
    outcomes: &[(OperationKind, CanonicalResult)],
) -> anyhow::Result<String> {
    let entries: Vec<FlowEntry<'_>> = outcomes
        .iter()
        .map(|(kind, result)| FlowEntry {
            operation: kind.label(),
            result,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

pub(crate) fn render_text(result: &CanonicalResult) -> String {
    let heading = if result.is_success() { "Success" } else { "Error" };
    let mut out = format!("{heading}\n{}\n", result.message());

    match result.template() {
        Template::UserInfo(info) => out.push_str(&render_user_info(info)),
        Template::LoginSummary { username, roles } => {
            let mut rows = vec![("Username", username.to_string())];
            if !roles.is_empty() {
                rows.push(("Roles", roles.join(", ")));
            }
            out.push_str(&render_rows("Authentication result", &rows));
        }
        Template::MessageOnly => {}
    }

    if let Some(code) = result.error_code() {
        out.push_str(&format!("Error code: {code}\n"));
    }
    out
}

fn render_user_info(info: &UserInfo) -> String {
    let optional = [
        ("Full name", info.full_name.as_deref()),
        ("Domain", info.domain.as_deref()),
        ("Email", info.email.as_deref()),
        ("SID", info.sid.as_deref()),
        ("Auth type", info.authentication_type.as_deref()),
    ];
    let mut rows = vec![("Username", info.username.clone())];
    rows.extend(
        optional
            .into_iter()
            .filter_map(|(label, value)| value.map(|value| (label, value.to_string()))),
    );
    let mut out = render_rows("User info", &rows);

    if info.groups.is_empty() {
        return out;
    }
    out.push_str("Groups\n");
    for group in &info.groups {
        match group.full_name.as_deref() {
            Some(full_name) => out.push_str(&format!("  - {} - {}\n", group.name, full_name)),
            None => out.push_str(&format!("  - {}\n", group.name)),
        }
        if let Some(description) = group.description.as_deref() {
            out.push_str(&format!("      {description}\n"));
        }
    }
    out
}

fn render_rows(title: &str, rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
    let mut out = format!("{title}\n");
    for (label, value) in rows {
        let label = format!("{label}:");
        out.push_str(&format!("  {:<width$} {}\n", label, value, width = width));
    }
    out
}
