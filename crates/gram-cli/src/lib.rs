//! Helpers shared by the `gram-admin` binary.

use gram_console::descriptor::{ContentDescriptor, FieldKind};
use gram_core::models::{Language, Record};
use std::io::{BufRead, Write};

/// Initialize tracing for the CLI. Logs go to stderr so JSON output on stdout
/// stays machine readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Truncate to `max_len` characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// A `--set` argument: `name=value`, or `name.en=value` / `name.mr=value` for
/// bilingual fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub field: String,
    pub lang: Option<Language>,
    pub value: String,
}

pub fn parse_assignment(s: &str) -> Result<Assignment, String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected FIELD=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Missing field name in '{}'", s));
    }

    let (field, lang) = match key.rsplit_once('.') {
        Some((field, "en")) => (field, Some(Language::En)),
        Some((field, "mr")) => (field, Some(Language::Mr)),
        Some((_, other)) => return Err(format!("Unknown language '{}' (use en or mr)", other)),
        None => (key, None),
    };

    Ok(Assignment {
        field: field.to_string(),
        lang,
        value: value.to_string(),
    })
}

/// `key=value` list query parameter
pub fn parse_query_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("Expected KEY=VALUE, got '{}'", s)),
    }
}

/// Ask a yes/no question. Only `y` or `yes` (any case) counts as yes.
pub fn confirm_prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> bool {
    if write!(output, "{} [y/N] ", prompt).and_then(|_| output.flush()).is_err() {
        return false;
    }
    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// One-line summary of a record for list output
pub fn record_line(descriptor: &ContentDescriptor, record: &Record) -> String {
    let title = descriptor
        .fields
        .first()
        .and_then(|field| match field.kind {
            FieldKind::Bilingual => record.localized(field.name, Language::En),
            _ => record.text(field.name),
        })
        .unwrap_or("");
    let status = if record.is_active { "active" } else { "inactive" };
    let id = if record.id.is_empty() { "-" } else { record.id.as_str() };
    let image = if record.image_url().is_some() { " [image]" } else { "" };
    format!("{:<26} {:<8} {}{}", id, status, truncate_string(title, 60), image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gram_console::descriptor::{ANNOUNCEMENT, VILLAGE_DETAIL};
    use std::io::Cursor;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
        assert_eq!(truncate_string("hello", 5), "hello");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("hello", 0), "...");
    }

    #[test]
    fn truncate_string_counts_characters() {
        assert_eq!(truncate_string("ग्रामपंचायत कार्यालय", 6), "ग्र...");
    }

    #[test]
    fn plain_assignment() {
        let a = parse_assignment("name=Temple fair=2024").unwrap();
        assert_eq!(a.field, "name");
        assert_eq!(a.lang, None);
        assert_eq!(a.value, "Temple fair=2024");
    }

    #[test]
    fn localized_assignment() {
        let a = parse_assignment("title.mr=गाव").unwrap();
        assert_eq!(a.field, "title");
        assert_eq!(a.lang, Some(Language::Mr));
        assert!(parse_assignment("title.fr=x").is_err());
        assert!(parse_assignment("title").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn query_pairs() {
        assert_eq!(
            parse_query_pair("department=Health").unwrap(),
            ("department".to_string(), "Health".to_string())
        );
        assert!(parse_query_pair("department").is_err());
    }

    #[test]
    fn confirm_accepts_only_yes() {
        let mut out = Vec::new();
        assert!(confirm_prompt(&mut Cursor::new("y\n"), &mut out, "Delete?"));
        assert!(confirm_prompt(&mut Cursor::new("YES\n"), &mut out, "Delete?"));
        assert!(!confirm_prompt(&mut Cursor::new("\n"), &mut out, "Delete?"));
        assert!(!confirm_prompt(&mut Cursor::new(""), &mut out, "Delete?"));
        assert!(String::from_utf8(out).unwrap().starts_with("Delete? [y/N] "));
    }

    #[test]
    fn record_lines() {
        let record: Record = serde_json::from_value(serde_json::json!({
            "_id": "a1",
            "message": "Gram sabha on Monday",
            "isActive": false
        }))
        .unwrap();
        let line = record_line(&ANNOUNCEMENT, &record);
        assert!(line.starts_with("a1"));
        assert!(line.contains("inactive"));
        assert!(line.ends_with("Gram sabha on Monday"));

        let detail: Record = serde_json::from_value(serde_json::json!({
            "_id": "v1",
            "title": { "en": "History", "mr": "इतिहास" },
            "image": { "url": "https://cdn/x.jpg" }
        }))
        .unwrap();
        assert!(record_line(&VILLAGE_DETAIL, &detail).ends_with("History [image]"));
    }
}
