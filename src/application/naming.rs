//! Output file naming.
//!
//! Two conversations that sanitize to the same base name share one output
//! file; the later one overwrites the earlier. No suffixes are invented.

use std::path::Path;

use crate::domain::models::format_timestamp;
use crate::domain::{ConversationRecord, ExportTarget};

/// Characters rejected by at least one common filesystem.
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
/// Maximum length, in characters, of the title part of a name.
pub const MAX_TITLE_CHARS: usize = 50;
/// Used when a title sanitizes to nothing.
pub const UNTITLED: &str = "untitled";

/// Makes a title safe to use as a file name.
///
/// Illegal and control characters are removed, whitespace runs become a
/// single `_`, and the result is capped at [`MAX_TITLE_CHARS`].
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .filter(|c| !ILLEGAL_CHARS.contains(c))
        .collect();

    let mut name = String::new();
    let mut len = 0;
    for word in cleaned.split_whitespace() {
        if len > 0 {
            // No separator unless at least one character of the next word fits
            if len + 1 >= MAX_TITLE_CHARS {
                break;
            }
            name.push('_');
            len += 1;
        }
        for c in word.chars().take(MAX_TITLE_CHARS - len) {
            name.push(c);
            len += 1;
        }
        if len == MAX_TITLE_CHARS {
            break;
        }
    }

    if name.is_empty() {
        UNTITLED.to_string()
    } else {
        name
    }
}

/// Derives the base name (no extension) for a conversation.
#[must_use]
pub fn base_name(conversation: &ConversationRecord, timestamp_prefix: bool) -> String {
    let title = sanitize_title(&conversation.title);
    if timestamp_prefix {
        format!("{}_{title}", format_timestamp(conversation.timestamp))
    } else {
        title
    }
}

/// Derives the output paths for a conversation.
#[must_use]
pub fn export_target(
    conversation: &ConversationRecord,
    timestamp_prefix: bool,
    markdown_dir: &Path,
    json_dir: Option<&Path>,
) -> ExportTarget {
    let base_name = base_name(conversation, timestamp_prefix);
    ExportTarget {
        markdown_path: markdown_dir.join(format!("{base_name}.md")),
        json_path: json_dir.map(|dir| dir.join(format!("{base_name}.json"))),
        base_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn conversation(title: &str, timestamp: Option<i64>) -> ConversationRecord {
        ConversationRecord {
            workspace_id: "ws".into(),
            title: title.into(),
            timestamp,
            messages: vec![],
        }
    }

    #[test]
    fn test_strips_illegal_characters() {
        let name = sanitize_title(r#"a<b>c:d"e/f\g|h?i*j"#);
        assert_eq!(name, "abcdefghij");
        assert!(!name.contains(ILLEGAL_CHARS));
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(sanitize_title("  Fix \n\t  bug  "), "Fix_bug");
        assert_eq!(sanitize_title("line1\r\nline2"), "line1_line2");
    }

    #[test]
    fn test_keeps_underscores_from_title() {
        assert_eq!(sanitize_title("__init__ question"), "__init___question");
        assert_eq!(sanitize_title("_private_"), "_private_");
        assert_eq!(sanitize_title("  _x_  "), "_x_");
    }

    #[test]
    fn test_cap_never_ends_on_separator() {
        let title = format!("{} tail", "a".repeat(MAX_TITLE_CHARS - 1));
        assert_eq!(sanitize_title(&title), "a".repeat(MAX_TITLE_CHARS - 1));

        let title = format!("{} tail", "a".repeat(MAX_TITLE_CHARS - 2));
        let name = sanitize_title(&title);
        assert_eq!(name.chars().count(), MAX_TITLE_CHARS);
        assert!(name.ends_with("_t"));
    }

    #[test]
    fn test_empty_falls_back() {
        assert_eq!(sanitize_title(""), UNTITLED);
        assert_eq!(sanitize_title("???"), UNTITLED);
        assert_eq!(sanitize_title(" / \\ "), UNTITLED);
    }

    #[test]
    fn test_length_cap_is_char_based() {
        let long = "é".repeat(80);
        let name = sanitize_title(&long);
        assert_eq!(name.chars().count(), MAX_TITLE_CHARS);

        let words = "word ".repeat(20);
        let name = sanitize_title(&words);
        assert!(name.chars().count() <= MAX_TITLE_CHARS);
        assert!(!name.ends_with('_'));
    }

    #[test]
    fn test_base_name_with_timestamp() {
        let conv = conversation("Fix bug", Some(1_700_000_000_000));
        assert_eq!(base_name(&conv, true), "2023-11-14_22-13_Fix_bug");
        assert_eq!(base_name(&conv, false), "Fix_bug");
    }

    #[test]
    fn test_base_name_without_timestamp_value() {
        let conv = conversation("Untitled_Chat", None);
        assert_eq!(base_name(&conv, true), "unknown_time_Untitled_Chat");
        assert!(!base_name(&conv, false).is_empty());
    }

    #[test]
    fn test_never_empty() {
        for title in ["", " ", "<>", "\n\n", "a"] {
            assert!(!base_name(&conversation(title, None), false).is_empty());
        }
    }

    #[test]
    fn test_export_target_paths() {
        let conv = conversation("Fix bug", None);
        let target = export_target(
            &conv,
            false,
            Path::new("/out/md"),
            Some(Path::new("/out/json")),
        );
        assert_eq!(target.base_name, "Fix_bug");
        assert_eq!(target.markdown_path, PathBuf::from("/out/md/Fix_bug.md"));
        assert_eq!(target.json_path, Some(PathBuf::from("/out/json/Fix_bug.json")));

        let target = export_target(&conv, false, Path::new("/out/md"), None);
        assert_eq!(target.json_path, None);
    }
}
