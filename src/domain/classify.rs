use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::ToolCall;

const SUMMARY_MAX_CHARS: usize = 60;
const FALLBACK_MAX_FIELDS: usize = 3;
const FALLBACK_MAX_VALUE_CHARS: usize = 50;

/// Presentation category for a tool call. Tool names are an open set; every
/// name resolves to exactly one kind, unknown names to `Other`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ToolKind {
    Shell,
    FileRead,
    FileWrite,
    FileEdit,
    NotebookEdit,
    PatternSearch,
    GlobSearch,
    PlanExit,
    PlanEnter,
    Subtask,
    WebFetch,
    WebSearch,
    Question,
    TodoWrite,
    TaskCreate,
    TaskUpdate,
    TaskOutput,
    TaskList,
    Other,
}

/// Icon/color semantics shared by several kinds; the UI maps each accent to
/// one theme color.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ToolAccent {
    Shell,
    File,
    Edit,
    Search,
    Plan,
    Delegate,
    Web,
    Ask,
    Todo,
    Neutral,
}

// Dispatch table: tool name -> kind, with `Other` as the implicit default.
// New tool names fall through to the generic entry instead of failing.
const TOOL_KINDS: &[(&str, ToolKind)] = &[
    ("Bash", ToolKind::Shell),
    ("Read", ToolKind::FileRead),
    ("Write", ToolKind::FileWrite),
    ("Edit", ToolKind::FileEdit),
    ("NotebookEdit", ToolKind::NotebookEdit),
    ("Grep", ToolKind::PatternSearch),
    ("Glob", ToolKind::GlobSearch),
    ("ExitPlanMode", ToolKind::PlanExit),
    ("EnterPlanMode", ToolKind::PlanEnter),
    ("Task", ToolKind::Subtask),
    ("WebFetch", ToolKind::WebFetch),
    ("WebSearch", ToolKind::WebSearch),
    ("AskUserQuestion", ToolKind::Question),
    ("TodoWrite", ToolKind::TodoWrite),
    ("TaskCreate", ToolKind::TaskCreate),
    ("TaskUpdate", ToolKind::TaskUpdate),
    ("TaskOutput", ToolKind::TaskOutput),
    ("TaskList", ToolKind::TaskList),
];

pub fn classify_tool(name: &str) -> ToolKind {
    TOOL_KINDS
        .iter()
        .find(|(tool_name, _)| *tool_name == name)
        .map(|(_, kind)| *kind)
        .unwrap_or(ToolKind::Other)
}

impl ToolKind {
    pub fn accent(self) -> ToolAccent {
        match self {
            Self::Shell => ToolAccent::Shell,
            Self::FileRead => ToolAccent::File,
            Self::FileWrite | Self::FileEdit | Self::NotebookEdit => ToolAccent::Edit,
            Self::PatternSearch | Self::GlobSearch => ToolAccent::Search,
            Self::PlanExit | Self::PlanEnter => ToolAccent::Plan,
            Self::Subtask => ToolAccent::Delegate,
            Self::WebFetch | Self::WebSearch => ToolAccent::Web,
            Self::Question => ToolAccent::Ask,
            Self::TodoWrite
            | Self::TaskCreate
            | Self::TaskUpdate
            | Self::TaskOutput
            | Self::TaskList => ToolAccent::Todo,
            Self::Other => ToolAccent::Neutral,
        }
    }
}

/// One-line human-readable summary of a tool call's input. These strings are
/// the primary user-visible content of a collapsed tool card.
pub fn summarize_input(kind: ToolKind, input: &Map<String, Value>) -> String {
    match kind {
        ToolKind::Shell => str_field(input, "command").to_string(),
        ToolKind::FileRead | ToolKind::FileWrite | ToolKind::FileEdit | ToolKind::NotebookEdit => {
            str_field(input, "file_path").to_string()
        }
        ToolKind::PatternSearch | ToolKind::GlobSearch => {
            let pattern = str_field(input, "pattern");
            match opt_str_field(input, "path") {
                Some(path) => format!("{pattern} in {path}"),
                None => pattern.to_string(),
            }
        }
        ToolKind::PlanExit | ToolKind::PlanEnter => {
            let plan = str_field(input, "plan");
            let flat = flatten_newlines(plan);
            let mut summary: String = flat.chars().take(SUMMARY_MAX_CHARS).collect();
            if plan.chars().count() > SUMMARY_MAX_CHARS {
                summary.push_str("...");
            }
            summary
        }
        ToolKind::Subtask => {
            let description = str_field(input, "description");
            let text = if description.is_empty() {
                flatten_newlines(str_field(input, "prompt"))
            } else {
                description.to_string()
            };
            truncate_chars(&text, SUMMARY_MAX_CHARS)
        }
        ToolKind::WebFetch => str_field(input, "url").to_string(),
        ToolKind::WebSearch => str_field(input, "query").to_string(),
        ToolKind::Question => first_question_text(input)
            .chars()
            .take(SUMMARY_MAX_CHARS)
            .collect(),
        ToolKind::TodoWrite => {
            let count = input
                .get("todos")
                .and_then(|value| value.as_array())
                .map(|todos| todos.len())
                .unwrap_or(0);
            format!("{count} items")
        }
        ToolKind::TaskCreate => str_field(input, "subject").to_string(),
        ToolKind::TaskUpdate => {
            let id = field_display(input, "taskId");
            let status = opt_str_field(input, "status").unwrap_or("updated");
            format!("#{id} -> {status}")
        }
        ToolKind::TaskOutput | ToolKind::TaskList | ToolKind::Other => fallback_summary(input),
    }
}

// Generic fallback: the first few input fields, JSON-style, long values
// truncated with an ellipsis marker.
fn fallback_summary(input: &Map<String, Value>) -> String {
    input
        .iter()
        .take(FALLBACK_MAX_FIELDS)
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            let clipped = truncate_chars(&rendered, FALLBACK_MAX_VALUE_CHARS);
            format!("{key}: {clipped}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct QuestionOption {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct QuestionDetail {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct TodoItem {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Which structured renderer the expanded tool card uses.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolDetail {
    /// Line diff between two text fields (file edits).
    Diff {
        file_path: String,
        old_text: String,
        new_text: String,
    },
    /// Raw text with a file header (file writes and reads).
    Code { file_path: String, content: String },
    /// Normalized free text (plans).
    RichText(String),
    /// Subtask delegation: prompt text plus optional metadata header.
    Subtask {
        agent_type: Option<String>,
        description: Option<String>,
        prompt: String,
    },
    /// Non-empty result lines (pattern/glob searches).
    FileList(Vec<String>),
    WebFetch {
        url: String,
        content: Option<String>,
    },
    WebSearch {
        query: String,
        content: Option<String>,
    },
    Questions(Vec<QuestionDetail>),
    Todos(Vec<TodoItem>),
    TaskCreate {
        subject: String,
        description: Option<String>,
    },
    TaskUpdate {
        task_id: String,
        status: Option<String>,
    },
    /// Pretty-printed input fields plus raw output, when nothing more
    /// specific applies.
    Raw {
        input_json: Option<String>,
        output: Option<String>,
    },
    /// No result yet and nothing structured to show.
    NoOutput,
}

pub fn detail_for(tool: &ToolCall) -> ToolDetail {
    let kind = classify_tool(&tool.name);
    let input = &tool.input;

    match kind {
        ToolKind::FileEdit => {
            if let (Some(old_text), Some(new_text)) = (
                opt_str_field(input, "old_string"),
                opt_str_field(input, "new_string"),
            ) {
                return ToolDetail::Diff {
                    file_path: str_field(input, "file_path").to_string(),
                    old_text: old_text.to_string(),
                    new_text: new_text.to_string(),
                };
            }
        }
        ToolKind::FileWrite => {
            if let Some(content) = opt_str_field(input, "content") {
                return ToolDetail::Code {
                    file_path: str_field(input, "file_path").to_string(),
                    content: content.to_string(),
                };
            }
        }
        ToolKind::FileRead => {
            if let Some(result) = tool.result.as_deref() {
                return ToolDetail::Code {
                    file_path: str_field(input, "file_path").to_string(),
                    content: strip_line_number_prefixes(result),
                };
            }
        }
        ToolKind::PlanExit | ToolKind::PlanEnter => {
            if let Some(plan) = opt_str_field(input, "plan") {
                return ToolDetail::RichText(unescape_newlines(plan));
            }
        }
        ToolKind::Subtask => {
            if let Some(prompt) = opt_str_field(input, "prompt") {
                return ToolDetail::Subtask {
                    agent_type: opt_str_field(input, "subagent_type").map(str::to_string),
                    description: opt_str_field(input, "description").map(str::to_string),
                    prompt: unescape_newlines(prompt),
                };
            }
        }
        ToolKind::PatternSearch | ToolKind::GlobSearch => {
            if let Some(result) = tool.result.as_deref() {
                let lines = result
                    .split('\n')
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                return ToolDetail::FileList(lines);
            }
        }
        ToolKind::WebFetch => {
            return ToolDetail::WebFetch {
                url: str_field(input, "url").to_string(),
                content: tool.result.clone(),
            };
        }
        ToolKind::WebSearch => {
            return ToolDetail::WebSearch {
                query: str_field(input, "query").to_string(),
                content: tool.result.clone(),
            };
        }
        ToolKind::Question => {
            if let Some(questions) = input.get("questions") {
                let questions: Vec<QuestionDetail> =
                    serde_json::from_value(questions.clone()).unwrap_or_default();
                return ToolDetail::Questions(questions);
            }
        }
        ToolKind::TodoWrite => {
            if let Some(todos) = input.get("todos") {
                let todos: Vec<TodoItem> =
                    serde_json::from_value(todos.clone()).unwrap_or_default();
                return ToolDetail::Todos(todos);
            }
        }
        ToolKind::TaskCreate => {
            return ToolDetail::TaskCreate {
                subject: str_field(input, "subject").to_string(),
                description: opt_str_field(input, "description").map(str::to_string),
            };
        }
        ToolKind::TaskUpdate => {
            return ToolDetail::TaskUpdate {
                task_id: field_display(input, "taskId"),
                status: opt_str_field(input, "status").map(str::to_string),
            };
        }
        ToolKind::Shell
        | ToolKind::NotebookEdit
        | ToolKind::TaskOutput
        | ToolKind::TaskList
        | ToolKind::Other => {}
    }

    raw_detail(kind, tool)
}

fn raw_detail(kind: ToolKind, tool: &ToolCall) -> ToolDetail {
    if tool.result.is_none() && kind != ToolKind::FileEdit {
        return ToolDetail::NoOutput;
    }

    // The shell command already appears in the summary line; repeating the
    // input JSON would be noise.
    let input_json = if kind != ToolKind::Shell && !tool.input.is_empty() {
        serde_json::to_string_pretty(&tool.input).ok()
    } else {
        None
    };
    ToolDetail::Raw {
        input_json,
        output: tool.result.clone(),
    }
}

/// Strips `"<spaces><digits>→"` line-number prefixes from each line of a
/// file-read result, independently per line. Lines without the prefix pass
/// through unchanged.
pub fn strip_line_number_prefixes(content: &str) -> String {
    content
        .split('\n')
        .map(strip_one_line_number_prefix)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_one_line_number_prefix(line: &str) -> &str {
    let rest = line.trim_start_matches([' ', '\t']);
    let digits = rest.chars().take_while(|ch| ch.is_ascii_digit()).count();
    if digits == 0 {
        return line;
    }
    let after_digits = &rest[digits..];
    match after_digits.strip_prefix('→') {
        Some(stripped) => stripped,
        None => line,
    }
}

/// Turns escaped newline/tab sequences embedded in a JSON string into real
/// whitespace for rich-text display.
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\r\\n", "\n")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}

// Both escaped sequences and real line breaks collapse to a single space for
// one-line summaries.
fn flatten_newlines(text: &str) -> String {
    text.replace("\\r\\n", " ")
        .replace("\r\n", " ")
        .replace("\\n", " ")
        .replace('\n', " ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max_chars).collect();
    clipped.push_str("...");
    clipped
}

fn first_question_text(input: &Map<String, Value>) -> String {
    input
        .get("questions")
        .and_then(|value| value.as_array())
        .and_then(|questions| questions.first())
        .and_then(|question| question.get("question"))
        .and_then(|value| value.as_str())
        .unwrap_or("")
        .to_string()
}

fn str_field<'a>(input: &'a Map<String, Value>, key: &str) -> &'a str {
    input.get(key).and_then(|value| value.as_str()).unwrap_or("")
}

fn opt_str_field<'a>(input: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    input.get(key).and_then(|value| value.as_str())
}

// Task ids may arrive as strings or numbers; render either as-is.
fn field_display(input: &Map<String, Value>, key: &str) -> String {
    match input.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(name: &str, input: Value, result: Option<&str>) -> ToolCall {
        let Value::Object(input) = input else {
            panic!("tool input fixture must be an object");
        };
        ToolCall {
            id: "t1".to_string(),
            name: name.to_string(),
            input,
            result: result.map(str::to_string),
        }
    }

    #[test]
    fn edit_with_both_strings_renders_as_diff() {
        let tool = tool(
            "Edit",
            json!({ "file_path": "/a.ts", "old_string": "x", "new_string": "y" }),
            None,
        );
        assert_eq!(summarize_input(classify_tool(&tool.name), &tool.input), "/a.ts");
        assert_eq!(
            detail_for(&tool),
            ToolDetail::Diff {
                file_path: "/a.ts".to_string(),
                old_text: "x".to_string(),
                new_text: "y".to_string(),
            }
        );
    }

    #[test]
    fn unknown_tool_summarizes_first_three_fields() {
        let tool = tool(
            "FooBarTool",
            json!({ "a": "1", "b": "2", "c": "3", "d": "4" }),
            None,
        );
        let summary = summarize_input(classify_tool(&tool.name), &tool.input);
        assert_eq!(summary, "a: 1, b: 2, c: 3");
    }

    #[test]
    fn fallback_truncates_long_values() {
        let long = "x".repeat(80);
        let tool = tool("FooBarTool", json!({ "payload": long }), None);
        let summary = summarize_input(classify_tool(&tool.name), &tool.input);
        assert_eq!(summary, format!("payload: {}...", "x".repeat(50)));
    }

    #[test]
    fn shell_summary_is_the_command() {
        let tool = tool("Bash", json!({ "command": "cargo metadata" }), None);
        assert_eq!(
            summarize_input(classify_tool(&tool.name), &tool.input),
            "cargo metadata"
        );
    }

    #[test]
    fn search_summary_omits_missing_path() {
        let with_path = tool("Grep", json!({ "pattern": "fn main", "path": "src" }), None);
        assert_eq!(
            summarize_input(ToolKind::PatternSearch, &with_path.input),
            "fn main in src"
        );
        let without_path = tool("Glob", json!({ "pattern": "**/*.rs" }), None);
        assert_eq!(
            summarize_input(ToolKind::GlobSearch, &without_path.input),
            "**/*.rs"
        );
    }

    #[test]
    fn plan_summary_flattens_escaped_newlines_and_truncates() {
        let plan = format!("first\\nsecond {}", "p".repeat(60));
        let tool = tool("ExitPlanMode", json!({ "plan": plan }), None);
        let summary = summarize_input(ToolKind::PlanExit, &tool.input);
        assert!(summary.starts_with("first second "));
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), 63);
    }

    #[test]
    fn subtask_summary_prefers_description() {
        let tool_desc = tool(
            "Task",
            json!({ "description": "run tests", "prompt": "long\\nprompt" }),
            None,
        );
        assert_eq!(summarize_input(ToolKind::Subtask, &tool_desc.input), "run tests");

        let tool = tool("Task", json!({ "prompt": "line one\\nline two" }), None);
        assert_eq!(
            summarize_input(ToolKind::Subtask, &tool.input),
            "line one line two"
        );
    }

    #[test]
    fn todo_summary_counts_items() {
        let tool = tool(
            "TodoWrite",
            json!({ "todos": [{ "content": "a" }, { "content": "b" }] }),
            None,
        );
        assert_eq!(summarize_input(ToolKind::TodoWrite, &tool.input), "2 items");
    }

    #[test]
    fn task_update_summary_includes_id_and_status() {
        let tool_str = tool("TaskUpdate", json!({ "taskId": "7", "status": "completed" }), None);
        assert_eq!(
            summarize_input(ToolKind::TaskUpdate, &tool_str.input),
            "#7 -> completed"
        );
        let tool = tool("TaskUpdate", json!({ "taskId": 9 }), None);
        assert_eq!(summarize_input(ToolKind::TaskUpdate, &tool.input), "#9 -> updated");
    }

    #[test]
    fn read_result_strips_line_number_prefixes() {
        let result = "     1→fn main() {\n     2→}\nplain line";
        let tool = tool("Read", json!({ "file_path": "/m.rs" }), Some(result));
        assert_eq!(
            detail_for(&tool),
            ToolDetail::Code {
                file_path: "/m.rs".to_string(),
                content: "fn main() {\n}\nplain line".to_string(),
            }
        );
    }

    #[test]
    fn search_result_drops_blank_lines() {
        let tool = tool(
            "Glob",
            json!({ "pattern": "*.rs" }),
            Some("src/main.rs\n\nsrc/lib.rs\n"),
        );
        assert_eq!(
            detail_for(&tool),
            ToolDetail::FileList(vec!["src/main.rs".to_string(), "src/lib.rs".to_string()])
        );
    }

    #[test]
    fn unknown_tool_without_result_shows_placeholder() {
        let tool = tool("FooBarTool", json!({ "a": "1" }), None);
        assert_eq!(detail_for(&tool), ToolDetail::NoOutput);
    }

    #[test]
    fn unknown_tool_with_result_shows_raw_output() {
        let tool = tool("FooBarTool", json!({ "a": "1" }), Some("done"));
        match detail_for(&tool) {
            ToolDetail::Raw { input_json, output } => {
                assert!(input_json.is_some_and(|json| json.contains("\"a\"")));
                assert_eq!(output.as_deref(), Some("done"));
            }
            other => panic!("unexpected detail: {other:?}"),
        }
    }

    #[test]
    fn edit_without_result_is_not_a_placeholder() {
        // An edit with old/new strings renders a diff even though the call
        // has no result yet.
        let tool = tool(
            "Edit",
            json!({ "file_path": "/a", "old_string": "x", "new_string": "y" }),
            None,
        );
        assert_ne!(detail_for(&tool), ToolDetail::NoOutput);
    }

    #[test]
    fn unknown_names_classify_as_other() {
        assert_eq!(classify_tool("Bash"), ToolKind::Shell);
        assert_eq!(classify_tool("SomeNewTool"), ToolKind::Other);
        assert_eq!(classify_tool(""), ToolKind::Other);
    }
}
