//! Items: discrete units of agent output within a turn.
//!
//! Each `item.completed` event carries one [`ThreadItem`], discriminated on
//! the wire by a `type` field. Items are terminal facts: once recorded in a
//! turn's result they are never revised.

use std::path::PathBuf;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One discrete unit of agent output.
///
/// The set of item kinds grows over time; anything with an unrecognized
/// `type` is carried through as [`ThreadItem::Other`] instead of failing
/// the turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ThreadItem {
    /// A natural-language message from the agent.
    AgentMessage(AgentMessageItem),
    /// A summarized reasoning step.
    Reasoning(ReasoningItem),
    /// A shell command the agent ran.
    CommandExecution(CommandExecutionItem),
    /// A set of file modifications the agent applied.
    FileChange(FileChangeItem),
    /// A call to an MCP server tool.
    McpToolCall(McpToolCallItem),
    /// A web search the agent performed.
    WebSearch(WebSearchItem),
    /// The agent's current todo list.
    TodoList(TodoListItem),
    /// A non-fatal error surfaced as an item.
    Error(ErrorItem),
    /// An item kind this library does not know about yet.
    Other(Value),
}

impl ThreadItem {
    /// Get the item's identifier, if it carries one.
    pub fn id(&self) -> Option<&str> {
        match self {
            ThreadItem::AgentMessage(item) => Some(&item.id),
            ThreadItem::Reasoning(item) => Some(&item.id),
            ThreadItem::CommandExecution(item) => Some(&item.id),
            ThreadItem::FileChange(item) => Some(&item.id),
            ThreadItem::McpToolCall(item) => Some(&item.id),
            ThreadItem::WebSearch(item) => Some(&item.id),
            ThreadItem::TodoList(item) => Some(&item.id),
            ThreadItem::Error(item) => Some(&item.id),
            ThreadItem::Other(value) => value.get("id").and_then(Value::as_str),
        }
    }

    /// Get the agent message if this is one.
    pub fn as_agent_message(&self) -> Option<&AgentMessageItem> {
        match self {
            ThreadItem::AgentMessage(item) => Some(item),
            _ => None,
        }
    }
}

/// Status of a command execution or MCP tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    InProgress,
    Completed,
    Failed,
}

/// Outcome of applying a set of file changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchApplyStatus {
    Completed,
    Failed,
}

/// Kind of change applied to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchChangeKind {
    Add,
    Delete,
    Update,
}

/// A natural-language message from the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessageItem {
    pub id: String,
    pub text: String,
}

/// A summarized reasoning step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningItem {
    pub id: String,
    pub text: String,
}

/// A shell command the agent ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandExecutionItem {
    pub id: String,
    /// The command line as executed.
    pub command: String,
    /// Interleaved stdout/stderr of the command.
    #[serde(default)]
    pub aggregated_output: String,
    /// Exit code, absent while the command is still running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub status: ItemStatus,
}

/// One path touched by a file change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileUpdateChange {
    pub path: PathBuf,
    pub kind: PatchChangeKind,
}

/// A set of file modifications the agent applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileChangeItem {
    pub id: String,
    /// Touched paths in the order the agent listed them.
    pub changes: Vec<FileUpdateChange>,
    pub status: PatchApplyStatus,
}

/// Successful result payload of an MCP tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpToolCallResult {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default)]
    pub structured_content: Value,
}

/// Error payload of an MCP tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolCallError {
    pub message: String,
}

/// A call to an MCP server tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolCallItem {
    pub id: String,
    /// Name of the MCP server that owns the tool.
    pub server: String,
    /// Tool name within the server.
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<McpToolCallResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<McpToolCallError>,
    pub status: ItemStatus,
}

/// A web search the agent performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchItem {
    pub id: String,
    pub query: String,
}

/// One entry of the agent's todo list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoEntry {
    pub text: String,
    pub completed: bool,
}

/// The agent's current todo list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoListItem {
    pub id: String,
    pub items: Vec<TodoEntry>,
}

/// A non-fatal error surfaced as an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorItem {
    pub id: String,
    pub message: String,
}

fn classify_item(value: Value) -> serde_json::Result<ThreadItem> {
    let Some(tag) = value.get("type").and_then(Value::as_str) else {
        return Ok(ThreadItem::Other(value));
    };
    match tag {
        "agent_message" => Ok(ThreadItem::AgentMessage(serde_json::from_value(value)?)),
        "reasoning" => Ok(ThreadItem::Reasoning(serde_json::from_value(value)?)),
        "command_execution" => Ok(ThreadItem::CommandExecution(serde_json::from_value(value)?)),
        "file_change" => Ok(ThreadItem::FileChange(serde_json::from_value(value)?)),
        "mcp_tool_call" => Ok(ThreadItem::McpToolCall(serde_json::from_value(value)?)),
        "web_search" => Ok(ThreadItem::WebSearch(serde_json::from_value(value)?)),
        "todo_list" => Ok(ThreadItem::TodoList(serde_json::from_value(value)?)),
        "error" => Ok(ThreadItem::Error(serde_json::from_value(value)?)),
        _ => Ok(ThreadItem::Other(value)),
    }
}

impl<'de> Deserialize<'de> for ThreadItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        classify_item(value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for ThreadItem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ThreadItem::AgentMessage(item) => tagged("agent_message", item, serializer),
            ThreadItem::Reasoning(item) => tagged("reasoning", item, serializer),
            ThreadItem::CommandExecution(item) => tagged("command_execution", item, serializer),
            ThreadItem::FileChange(item) => tagged("file_change", item, serializer),
            ThreadItem::McpToolCall(item) => tagged("mcp_tool_call", item, serializer),
            ThreadItem::WebSearch(item) => tagged("web_search", item, serializer),
            ThreadItem::TodoList(item) => tagged("todo_list", item, serializer),
            ThreadItem::Error(item) => tagged("error", item, serializer),
            ThreadItem::Other(value) => value.serialize(serializer),
        }
    }
}

/// Serialize `item` with a `type` tag injected, matching the wire format.
fn tagged<S, T>(tag: &str, item: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    let mut value = serde_json::to_value(item).map_err(serde::ser::Error::custom)?;
    if let Value::Object(map) = &mut value {
        map.insert("type".to_string(), Value::String(tag.to_string()));
    }
    value.serialize(serializer)
}
