use serde::{Deserialize, Serialize};

/// Engine-wide limits shared by every run of a `FlowRunner`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Node visits allowed in one `start`/`resume` call.
    pub max_steps: usize,
    /// Used by API and Database nodes that do not set `timeoutMs`.
    pub default_timeout_ms: u64,
    /// Upper bound for any node's `retries`.
    pub max_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 200,
            default_timeout_ms: 10_000,
            max_retries: 5,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
