use crate::domain::{
    classify_tool, detail_for, summarize_input, Message, MessageRole, SessionDetail, ToolCall,
    ToolDetail, ToolKind,
};

/// Render model for one tool call: classifier output resolved once, reused
/// by every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolCallView {
    pub id: String,
    pub name: String,
    pub kind: ToolKind,
    pub summary: String,
    pub has_result: bool,
    pub detail: ToolDetail,
}

/// Render model for one message turn.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageView {
    pub uuid: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: String,
    pub tool_calls: Vec<ToolCallView>,
}

impl MessageView {
    /// Messages whose only payload is tool calls render no text bubble.
    pub fn has_text(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

pub fn assemble_tool_call(tool: &ToolCall) -> ToolCallView {
    let kind = classify_tool(&tool.name);
    ToolCallView {
        id: tool.id.clone(),
        name: tool.name.clone(),
        kind,
        summary: summarize_input(kind, &tool.input),
        has_result: tool.has_result(),
        detail: detail_for(tool),
    }
}

pub fn assemble_message(message: &Message) -> MessageView {
    MessageView {
        uuid: message.uuid.clone(),
        role: message.role,
        content: message.content.clone(),
        timestamp: message.timestamp.clone(),
        tool_calls: message.tool_calls.iter().map(assemble_tool_call).collect(),
    }
}

pub fn assemble_transcript(detail: &SessionDetail) -> Vec<MessageView> {
    detail.messages.iter().map(assemble_message).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(content: &str, tools: Vec<ToolCall>) -> Message {
        Message {
            uuid: "m1".to_string(),
            role: MessageRole::Assistant,
            content: content.to_string(),
            timestamp: "2025-06-15T10:00:00Z".to_string(),
            tool_calls: tools,
        }
    }

    fn tool_call(name: &str, input: serde_json::Value, result: Option<&str>) -> ToolCall {
        let serde_json::Value::Object(input) = input else {
            panic!("tool input fixture must be an object");
        };
        ToolCall {
            id: format!("{name}-1"),
            name: name.to_string(),
            input,
            result: result.map(str::to_string),
        }
    }

    #[test]
    fn resolves_classifier_output_per_tool_call() {
        let message = message(
            "done",
            vec![
                tool_call("Bash", json!({ "command": "ls" }), Some("a\nb")),
                tool_call(
                    "Edit",
                    json!({ "file_path": "/a.ts", "old_string": "x", "new_string": "y" }),
                    None,
                ),
            ],
        );
        let view = assemble_message(&message);
        assert_eq!(view.tool_calls.len(), 2);

        let shell = &view.tool_calls[0];
        assert_eq!(shell.kind, ToolKind::Shell);
        assert_eq!(shell.summary, "ls");
        assert!(shell.has_result);

        let edit = &view.tool_calls[1];
        assert_eq!(edit.kind, ToolKind::FileEdit);
        assert!(!edit.has_result);
        assert!(matches!(edit.detail, ToolDetail::Diff { .. }));
    }

    #[test]
    fn tool_only_messages_have_no_text_bubble() {
        let view = assemble_message(&message(
            "  \n",
            vec![tool_call("Bash", json!({ "command": "ls" }), None)],
        ));
        assert!(!view.has_text());
    }
}
