use std::collections::HashMap;
use std::time::Duration;

use adprobe_core::ServerMode;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub current_context: Option<String>,
    #[serde(default)]
    pub contexts: HashMap<String, CliContext>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CliContext {
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ServerMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Target after flags, environment and the active context are merged.
#[derive(Debug, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub base_url: String,
    pub mode: Option<ServerMode>,
    pub timeout: Option<Duration>,
}
