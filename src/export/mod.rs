//! Standalone HTML export of a session transcript.
//!
//! The document comes from a `minijinja` template with HTML auto-escaping, so
//! session ids, roles and timestamps are always escaped. Message bodies are
//! rendered from markdown with `pulldown-cmark`; raw HTML in a message is
//! emitted as escaped text, never as markup.

use crate::hub::HubApi;
use crate::model::{AppError, MessageRecord, SessionId};
use crate::parser::parse_records;
use chrono::{DateTime, Local, Utc};
use minijinja::{context, Environment};
use pulldown_cmark::{html, Event, Options, Parser};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const TEMPLATE_NAME: &str = "export.html";
const TEMPLATE: &str = include_str!("template.html");

/// Errors producing an export file.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The template failed to render.
    #[error("failed to render export: {0}")]
    Template(#[from] minijinja::Error),

    /// The file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
struct ExportedMessage {
    role: String,
    time: String,
    body_html: String,
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render message text as an HTML fragment.
///
/// Single newlines are kept as line breaks, matching how messages read in the
/// live view. Embedded HTML is shown literally.
pub fn markdown_to_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut buf = String::new();
    html::push_html(&mut buf, parser);
    buf
}

/// Build the full HTML document for `records`.
pub fn render_document(
    session: &SessionId,
    records: &[MessageRecord],
    exported_at: DateTime<Local>,
) -> Result<String, ExportError> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;
    let template = env.get_template(TEMPLATE_NAME)?;

    let messages: Vec<ExportedMessage> = records
        .iter()
        .map(|record| ExportedMessage {
            role: record.role().as_str().to_string(),
            time: record.timestamp().local_date_time(),
            body_html: markdown_to_html(&record.text()),
        })
        .collect();

    let document = template.render(context! {
        session_id => session.as_str(),
        exported_at => exported_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        messages => messages,
        version => env!("CARGO_PKG_VERSION"),
    })?;
    Ok(document)
}

/// File name for an export: `session-<id up to first '.'>-<epoch ms>.html`.
pub fn export_file_name(session: &SessionId, now: DateTime<Utc>) -> String {
    format!("session-{}-{}.html", session.stem(), now.timestamp_millis())
}

/// Render and write an export into `dir`, returning the written path.
pub fn write_export(
    dir: &Path,
    session: &SessionId,
    records: &[MessageRecord],
    now: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    let document = render_document(session, records, now.with_timezone(&Local))?;
    let path = dir.join(export_file_name(session, now));

    std::fs::create_dir_all(dir).map_err(|source| ExportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::write(&path, document).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Fetch a session from the hub and export it into `dir`.
///
/// Reads the content directly rather than through the view's cache, so an
/// export never waits on or disturbs an in-flight refresh.
pub fn export_session(
    hub: &dyn HubApi,
    dir: &Path,
    session: &SessionId,
    now: DateTime<Utc>,
) -> Result<PathBuf, AppError> {
    let content = hub.session_content(session)?;
    let records: Vec<MessageRecord> = parse_records(&content).collect();
    let path = write_export(dir, session, &records, now)?;
    info!(session = %session, records = records.len(), path = %path.display(), "Exported session");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Message, MessageContent, Role, Timestamp};
    use chrono::TimeZone;

    fn record(role: Role, text: &str) -> MessageRecord {
        MessageRecord::new(
            Timestamp::unknown(),
            Message::new(role, MessageContent::Text(text.to_string())),
        )
    }

    fn sid(raw: &str) -> SessionId {
        SessionId::new(raw).unwrap()
    }

    #[test]
    fn escape_html_escapes_all_special_characters() {
        insta::assert_snapshot!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            @"&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn markdown_renders_emphasis_and_code() {
        let html = markdown_to_html("**bold** and `code`");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<code>code</code>"));
    }

    #[test]
    fn markdown_neutralises_raw_html() {
        let html = markdown_to_html("hi <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn markdown_keeps_single_newlines() {
        let html = markdown_to_html("one\ntwo");
        assert!(html.contains("<br />"));
    }

    #[test]
    fn document_escapes_role_and_session_id() {
        let records = vec![record(Role::Other("<b>tool</b>".to_string()), "ok")];
        let exported_at = Local.with_ymd_and_hms(2025, 12, 25, 10, 0, 0).unwrap();

        let html = render_document(&sid("<id>.jsonl"), &records, exported_at).unwrap();

        assert!(!html.contains("<b>tool</b>"));
        assert!(html.contains("&lt;b&gt;tool&lt;&#x2f;b&gt;") || html.contains("&lt;b&gt;tool&lt;/b&gt;"));
        assert!(html.contains("Session: &lt;id&gt;.jsonl"));
        assert!(html.contains("Exported: 2025-12-25 10:00:00"));
    }

    #[test]
    fn document_lists_every_record_in_order() {
        let records = vec![record(Role::User, "first"), record(Role::Assistant, "second")];
        let exported_at = Local.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let html = render_document(&sid("s"), &records, exported_at).unwrap();

        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < second);
        assert!(html.contains(r#"class="message user""#));
        assert!(html.contains("2 messages"));
    }

    #[test]
    fn empty_session_exports_placeholder() {
        let exported_at = Local.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let html = render_document(&sid("s"), &[], exported_at).unwrap();
        assert!(html.contains("No messages in this session"));
    }

    #[test]
    fn file_name_uses_stem_and_millis() {
        let now = Utc.timestamp_millis_opt(1_735_120_800_123).unwrap();
        assert_eq!(
            export_file_name(&sid("abc.session.jsonl"), now),
            "session-abc-1735120800123.html"
        );
    }

    #[test]
    fn write_export_creates_file() {
        let dir = std::env::temp_dir().join(format!("hubmon-export-test-{}", std::process::id()));
        let now = Utc.timestamp_millis_opt(1_000).unwrap();

        let path = write_export(&dir, &sid("x.jsonl"), &[record(Role::User, "hello")], now).unwrap();

        assert_eq!(path.file_name().unwrap(), "session-x-1000.html");
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("hello"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
