//! Normalization of decoded chat payloads.
//!
//! Cursor stores chat tabs as loosely-shaped JSON. Every field read here is
//! optional: missing or mistyped values fall back to the defaults below and
//! never abort the conversion.
//!
//! | Field                      | Default when missing/invalid         |
//! |----------------------------|--------------------------------------|
//! | `tabs`                     | no conversations                     |
//! | `chatTitle`                | synthesized from `lastSendTime`      |
//! | `lastSendTime`             | absent (`0` is treated as absent)    |
//! | `bubbles`                  | no messages                          |
//! | bubble `type`              | bubble dropped                       |
//! | bubble `text`              | absent; non-string text becomes `""` |
//! | selection `uri.path`       | no label                             |
//! | selection `text`           | `""`                                 |
//! | code block `language`      | no label                             |
//! | code block `code`          | `""`                                 |

use serde_json::Value;

use crate::domain::models::format_timestamp;
use crate::domain::{CodeArtifact, ConversationRecord, Message, RawRecord, Role, SourceKey};

/// Title used for tabs with neither a title nor a timestamp.
pub const UNTITLED_CHAT: &str = "Untitled_Chat";

/// Converts one raw record into zero or more conversations.
///
/// Composer session records are decoded upstream but not converted.
#[must_use]
pub fn normalize(record: &RawRecord) -> Vec<ConversationRecord> {
    match record.source_key {
        SourceKey::ChatData => normalize_chat_data(&record.workspace_id, &record.payload),
        SourceKey::ComposerData => {
            tracing::debug!(workspace = %record.workspace_id, "Composer data is not exported");
            Vec::new()
        }
    }
}

/// Converts a chat-data payload: one conversation per entry in `tabs`.
#[must_use]
pub fn normalize_chat_data(workspace_id: &str, payload: &Value) -> Vec<ConversationRecord> {
    payload
        .get("tabs")
        .and_then(Value::as_array)
        .map(|tabs| {
            tabs.iter()
                .map(|tab| normalize_tab(workspace_id, tab))
                .collect()
        })
        .unwrap_or_default()
}

/// Converts one stored tab.
#[must_use]
pub fn normalize_tab(workspace_id: &str, tab: &Value) -> ConversationRecord {
    let timestamp = read_millis(tab.get("lastSendTime"));
    let title = tab
        .get("chatTitle")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map_or_else(|| synthesize_title(timestamp), str::to_string);

    ConversationRecord {
        workspace_id: workspace_id.to_string(),
        title,
        timestamp,
        messages: normalize_bubbles(tab.get("bubbles")),
    }
}

/// Converts a conversation previously written by the JSON renderer.
///
/// Returns `None` if `value` is not an object.
#[must_use]
pub fn normalize_exported(value: &Value) -> Option<ConversationRecord> {
    value.as_object()?;

    let timestamp = read_millis(value.get("lastSendTime"));
    let title = value
        .get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map_or_else(|| synthesize_title(timestamp), str::to_string);

    Some(ConversationRecord {
        workspace_id: string_field(value, "workspace"),
        title,
        timestamp,
        messages: normalize_bubbles(value.get("bubbles")),
    })
}

/// Title for a tab without `chatTitle`.
#[must_use]
pub fn synthesize_title(timestamp: Option<i64>) -> String {
    match timestamp {
        Some(_) => format!("{}_{UNTITLED_CHAT}", format_timestamp(timestamp)),
        None => UNTITLED_CHAT.to_string(),
    }
}

fn normalize_bubbles(bubbles: Option<&Value>) -> Vec<Message> {
    bubbles
        .and_then(Value::as_array)
        .map(|bubbles| bubbles.iter().filter_map(normalize_bubble).collect())
        .unwrap_or_default()
}

fn normalize_bubble(bubble: &Value) -> Option<Message> {
    let Some(role) = bubble
        .get("type")
        .and_then(Value::as_str)
        .and_then(Role::from_bubble_type)
    else {
        tracing::trace!("Dropping bubble with unrecognized type");
        return None;
    };

    let code_artifacts = match role {
        Role::User => artifacts(bubble.get("selections"), |selection| CodeArtifact {
            label: selection
                .get("uri")
                .and_then(|uri| uri.get("path"))
                .and_then(Value::as_str)
                .map(str::to_string),
            content: string_field(selection, "text"),
        }),
        Role::Assistant => artifacts(bubble.get("codeBlocks"), |block| CodeArtifact {
            label: block
                .get("language")
                .and_then(Value::as_str)
                .map(str::to_string),
            content: string_field(block, "code"),
        }),
    };

    Some(Message {
        role,
        text: bubble
            .get("text")
            .filter(|t| !t.is_null())
            .map(|t| t.as_str().unwrap_or_default().to_string()),
        code_artifacts,
    })
}

fn artifacts(list: Option<&Value>, convert: impl Fn(&Value) -> CodeArtifact) -> Vec<CodeArtifact> {
    list.and_then(Value::as_array)
        .map(|items| items.iter().map(convert).collect())
        .unwrap_or_default()
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Reads epoch milliseconds stored as an integer or float. Zero means absent.
#[allow(clippy::cast_possible_truncation)]
fn read_millis(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    let millis = value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))?;
    (millis != 0).then_some(millis)
}
