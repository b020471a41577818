//! Output rendering for exported conversations.
//!
//! Markdown is streamed into any `Write`; JSON mirrors the stored bubble
//! layout so exported files can be read back with
//! [`normalize_exported`](super::parser::normalize_exported).

use std::io::{self, Write};

use serde::Serialize;

use crate::domain::{ConversationRecord, Message, Role};

/// Writes a conversation as Markdown.
///
/// # Errors
/// Returns error if the writer fails.
pub fn write_markdown<W: Write>(writer: &mut W, conv: &ConversationRecord) -> io::Result<()> {
    writeln!(writer, "# {}\n", conv.title)?;
    writeln!(writer, "Workspace: `{}`\n", conv.workspace_id)?;

    if let Some(timestamp) = conv.timestamp {
        writeln!(writer, "Last Updated: {timestamp}\n")?;
    }

    for message in &conv.messages {
        writeln!(writer, "## {}\n", message.role)?;

        if let Some(text) = message.text.as_deref().filter(|t| !t.is_empty()) {
            writeln!(writer, "{text}\n")?;
        }

        if message.role == Role::User && !message.code_artifacts.is_empty() {
            writeln!(writer, "Selected code:\n")?;
        }

        for artifact in &message.code_artifacts {
            writeln!(writer, "```{}", artifact.label.as_deref().unwrap_or_default())?;
            writeln!(writer, "{}", artifact.content)?;
            writeln!(writer, "```\n")?;
        }
    }

    Ok(())
}

/// Formats a conversation as a Markdown string.
#[must_use]
pub fn format_conversation_markdown(conv: &ConversationRecord) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_markdown(&mut out, conv);
    String::from_utf8_lossy(&out).into_owned()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonConversation<'a> {
    workspace: &'a str,
    title: &'a str,
    last_send_time: i64,
    bubbles: Vec<JsonBubble<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum JsonBubble<'a> {
    #[serde(rename = "user")]
    User {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<&'a str>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        selections: Vec<JsonSelection<'a>>,
    },
    #[serde(rename = "ai")]
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<&'a str>,
        #[serde(rename = "codeBlocks", skip_serializing_if = "Vec::is_empty")]
        code_blocks: Vec<JsonCodeBlock<'a>>,
    },
}

#[derive(Serialize)]
struct JsonSelection<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<JsonUri<'a>>,
    text: &'a str,
}

#[derive(Serialize)]
struct JsonUri<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct JsonCodeBlock<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    code: &'a str,
}

impl<'a> From<&'a Message> for JsonBubble<'a> {
    fn from(message: &'a Message) -> Self {
        let text = message.text.as_deref();
        match message.role {
            Role::User => Self::User {
                text,
                selections: message
                    .code_artifacts
                    .iter()
                    .map(|a| JsonSelection {
                        uri: a.label.as_deref().map(|path| JsonUri { path }),
                        text: &a.content,
                    })
                    .collect(),
            },
            Role::Assistant => Self::Assistant {
                text,
                code_blocks: message
                    .code_artifacts
                    .iter()
                    .map(|a| JsonCodeBlock {
                        language: a.label.as_deref(),
                        code: &a.content,
                    })
                    .collect(),
            },
        }
    }
}

/// Writes a conversation as pretty-printed JSON.
///
/// A missing timestamp is written as `0`.
///
/// # Errors
/// Returns error if serialization or the writer fails.
pub fn write_json<W: Write>(writer: &mut W, conv: &ConversationRecord) -> io::Result<()> {
    let doc = JsonConversation {
        workspace: &conv.workspace_id,
        title: &conv.title,
        last_send_time: conv.timestamp.unwrap_or(0),
        bubbles: conv.messages.iter().map(JsonBubble::from).collect(),
    };
    serde_json::to_writer_pretty(&mut *writer, &doc)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::parser::normalize_exported;
    use crate::domain::CodeArtifact;

    fn fix_bug() -> ConversationRecord {
        ConversationRecord {
            workspace_id: "ws1".into(),
            title: "Fix bug".into(),
            timestamp: Some(1_700_000_000_000),
            messages: vec![
                Message {
                    role: Role::User,
                    text: Some("why crash?".into()),
                    code_artifacts: vec![CodeArtifact {
                        label: Some("/src/a.go".into()),
                        content: "var x *int".into(),
                    }],
                },
                Message {
                    role: Role::Assistant,
                    text: Some("null pointer".into()),
                    code_artifacts: vec![CodeArtifact {
                        label: Some("go".into()),
                        content: "x := nil".into(),
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_markdown_layout() {
        let md = format_conversation_markdown(&fix_bug());
        let expected = "# Fix bug\n\n\
            Workspace: `ws1`\n\n\
            Last Updated: 1700000000000\n\n\
            ## User\n\n\
            why crash?\n\n\
            Selected code:\n\n\
            ```/src/a.go\nvar x *int\n```\n\n\
            ## Assistant\n\n\
            null pointer\n\n\
            ```go\nx := nil\n```\n\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_markdown_skips_empty_text_and_timestamp() {
        let conv = ConversationRecord {
            workspace_id: "ws".into(),
            title: "a/b".into(),
            timestamp: None,
            messages: vec![Message {
                role: Role::Assistant,
                text: Some(String::new()),
                code_artifacts: vec![CodeArtifact {
                    label: None,
                    content: "plain".into(),
                }],
            }],
        };
        let md = format_conversation_markdown(&conv);
        assert!(md.starts_with("# a/b\n\n"));
        assert!(!md.contains("Last Updated"));
        assert!(md.contains("## Assistant\n\n```\nplain\n```\n"));
        assert!(!md.contains("Selected code:"));
    }

    #[test]
    fn test_user_selections_are_labelled() {
        let conv = ConversationRecord {
            workspace_id: "ws".into(),
            title: "t".into(),
            timestamp: None,
            messages: vec![
                Message {
                    role: Role::User,
                    text: None,
                    code_artifacts: vec![CodeArtifact {
                        label: Some("main.rs".into()),
                        content: "fn main() {}".into(),
                    }],
                },
                Message {
                    role: Role::User,
                    text: Some("no code here".into()),
                    code_artifacts: vec![],
                },
            ],
        };
        let md = format_conversation_markdown(&conv);
        assert!(md.contains("## User\n\nSelected code:\n\n```main.rs\nfn main() {}\n```\n"));
        assert_eq!(md.matches("Selected code:").count(), 1);
    }

    #[test]
    fn test_json_shape() {
        let mut out = Vec::new();
        write_json(&mut out, &fix_bug()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["workspace"], "ws1");
        assert_eq!(value["title"], "Fix bug");
        assert_eq!(value["lastSendTime"], 1_700_000_000_000_i64);
        assert_eq!(value["bubbles"][0]["type"], "user");
        assert_eq!(value["bubbles"][0]["selections"][0]["uri"]["path"], "/src/a.go");
        assert_eq!(value["bubbles"][1]["type"], "ai");
        assert_eq!(value["bubbles"][1]["codeBlocks"][0]["language"], "go");
        assert_eq!(value["bubbles"][1]["codeBlocks"][0]["code"], "x := nil");
    }

    #[test]
    fn test_json_reads_back() {
        let original = fix_bug();
        let mut out = Vec::new();
        write_json(&mut out, &original).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let restored = normalize_exported(&value).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_json_missing_timestamp_reads_back_as_absent() {
        let mut conv = fix_bug();
        conv.timestamp = None;
        conv.messages[0].text = None;
        let mut out = Vec::new();
        write_json(&mut out, &conv).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["lastSendTime"], 0);
        assert_eq!(normalize_exported(&value).unwrap(), conv);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let conv = fix_bug();
        assert_eq!(
            format_conversation_markdown(&conv),
            format_conversation_markdown(&conv)
        );
    }
}
