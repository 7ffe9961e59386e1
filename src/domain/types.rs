use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Which assistant backend produced a session or usage record. Used purely as
/// a filter dimension; the store accepts it as a query parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum SessionSource {
    Claude,
    Codex,
    Gemini,
}

impl SessionSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Claude => "Claude",
            Self::Codex => "Codex",
            Self::Gemini => "Gemini",
        }
    }

    pub fn as_query(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Codex => "codex",
            Self::Gemini => "gemini",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "claude" => Some(Self::Claude),
            "codex" => Some(Self::Codex),
            "gemini" => Some(Self::Gemini),
            _ => None,
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            Self::Claude => Self::Codex,
            Self::Codex => Self::Gemini,
            Self::Gemini => Self::Claude,
        }
    }
}

fn source_from_wire<'de, D>(deserializer: D) -> Result<Option<SessionSource>, D::Error>
where
    D: Deserializer<'de>,
{
    // Unknown source tags degrade to "no tag" instead of failing the record.
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(SessionSource::parse))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One invocation of a named tool within an assistant message. `name` is an
/// open string; unknown names must still render (see `classify`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub input: Map<String, Value>,
    #[serde(default)]
    pub result: Option<String>,
}

impl ToolCall {
    /// A tool call with a non-null result is "completed" for display purposes.
    /// Absence of a result is an unrendered-output state, not an error.
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Message {
    pub uuid: String,
    #[serde(rename = "type")]
    pub role: MessageRole,
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub project_path: String,
    pub project_name: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub message_count: usize,
    /// Distinct tool names used in the session, first-seen order.
    #[serde(default)]
    pub tool_calls: Vec<String>,
    #[serde(default, deserialize_with = "source_from_wire")]
    pub source: Option<SessionSource>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct FileChange {
    pub file_path: String,
    #[serde(default)]
    pub backup_file: Option<String>,
    pub version: u32,
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SessionDetail {
    pub id: String,
    pub project_path: String,
    pub project_name: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub file_changes: Vec<FileChange>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct SearchResult {
    pub session_id: String,
    pub project_name: String,
    pub title: String,
    pub timestamp: String,
    pub matched_content: String,
    pub message_type: String,
    #[serde(default, deserialize_with = "source_from_wire")]
    pub source: Option<SessionSource>,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct ProjectSummary {
    pub path: String,
    pub name: String,
    pub session_count: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_tokens: u64,
    #[serde(default)]
    pub cache_read_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub cost_usd: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DailyUsage {
    /// `YYYY-MM-DD`, as reported by the store.
    pub date: String,
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_tokens: u64,
    #[serde(default)]
    pub cache_read_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub cost_usd: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct UsageSummary {
    pub today: TokenUsage,
    pub this_month: TokenUsage,
    pub total: TokenUsage,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UsageDetail {
    #[serde(default)]
    pub daily_usage: Vec<DailyUsage>,
    #[serde(default)]
    pub by_model: Map<String, Value>,
}

impl UsageDetail {
    /// Per-model usage sorted by total tokens descending. Entries that do not
    /// decode as `TokenUsage` are skipped.
    pub fn models_by_total(&self) -> Vec<(String, TokenUsage)> {
        let mut models = self
            .by_model
            .iter()
            .filter_map(|(model, value)| {
                serde_json::from_value::<TokenUsage>(value.clone())
                    .ok()
                    .map(|usage| (model.clone(), usage))
            })
            .collect::<Vec<_>>();
        models.sort_by(|a, b| b.1.total_tokens.cmp(&a.1.total_tokens));
        models
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_session_summary_with_unknown_source() {
        let json = serde_json::json!({
            "id": "s1",
            "project_path": "/home/u/proj",
            "project_name": "proj",
            "title": "fix the build",
            "created_at": "2025-06-14T09:00:00Z",
            "updated_at": "2025-06-15T10:30:00Z",
            "message_count": 12,
            "tool_calls": ["Bash", "Edit"],
            "source": "mystery-agent"
        });
        let summary: SessionSummary = serde_json::from_value(json).unwrap();
        assert_eq!(summary.source, None);
        assert_eq!(summary.tool_calls, vec!["Bash", "Edit"]);
    }

    #[test]
    fn tool_call_result_presence_controls_completion() {
        let json = serde_json::json!({
            "id": "t1",
            "name": "Bash",
            "input": { "command": "ls" },
            "result": null
        });
        let tool: ToolCall = serde_json::from_value(json).unwrap();
        assert!(!tool.has_result());

        let json = serde_json::json!({
            "id": "t2",
            "name": "Bash",
            "input": { "command": "ls" },
            "result": "a.txt"
        });
        let tool: ToolCall = serde_json::from_value(json).unwrap();
        assert!(tool.has_result());
    }

    #[test]
    fn sorts_by_model_usage_by_total_tokens() {
        let json = serde_json::json!({
            "daily_usage": [],
            "by_model": {
                "claude-haiku": { "total_tokens": 10 },
                "claude-opus-4-5": { "total_tokens": 900 },
                "claude-sonnet-4-5": { "total_tokens": 400 }
            }
        });
        let detail: UsageDetail = serde_json::from_value(json).unwrap();
        let models = detail.models_by_total();
        assert_eq!(models[0].0, "claude-opus-4-5");
        assert_eq!(models[1].0, "claude-sonnet-4-5");
        assert_eq!(models[2].0, "claude-haiku");
    }
}
