use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::heuristics::{detect_format, JunkFilter};
use crate::stages::{decode_html_entities, normalize};

/// How a piece of fetched or read content should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Html,
    Unsupported,
}

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->")
        .expect("invalid script regex")
});

static LINE_BREAK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("invalid break regex"));

static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(p|div|li|ul|ol|h[1-6]|tr|table|section|article|header|footer|nav|aside|blockquote|main)\b[^>]*>",
    )
    .expect("invalid block regex")
});

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("invalid tag regex"));

/// Turn an HTML page (or already-plain text) into readable document text.
///
/// Markup is stripped, entities decoded and every junk line dropped. Kept
/// lines are separated by blank lines for prose and by single newlines for
/// transcripts, so segmentation sees the same structure either way.
pub fn cleanup_document(input: &str) -> String {
    let text = SCRIPT_STYLE.replace_all(input, "");
    let text = LINE_BREAK_TAG.replace_all(&text, "\n");
    let text = BLOCK_TAG.replace_all(&text, "\n\n");
    let text = ANY_TAG.replace_all(&text, "");
    let text = normalize(&decode_html_entities(&text));

    let format = detect_format(&text);
    let filter = JunkFilter::default();

    let mut dropped = 0usize;
    let kept: Vec<String> = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let junk = filter.is_junk(line);
            if junk {
                dropped += 1;
            }
            !junk
        })
        .collect();

    debug!(
        "Cleanup kept {} lines, dropped {} (transcript={})",
        kept.len(),
        dropped,
        format.is_transcript
    );

    let separator = if format.is_transcript { "\n" } else { "\n\n" };
    kept.join(separator)
}

/// Decide from a Content-Type header value
pub fn content_kind_for_mime(content_type: &str) -> ContentKind {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime.is_empty() || mime.starts_with("text/plain") || mime == "text/markdown" {
        ContentKind::Text
    } else if mime == "text/html" || mime == "application/xhtml+xml" {
        ContentKind::Html
    } else if mime.starts_with("text/") {
        ContentKind::Text
    } else {
        ContentKind::Unsupported
    }
}

/// Decide from a file extension
pub fn content_kind_for_path(path: &Path) -> ContentKind {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html" | "htm" | "xhtml") => ContentKind::Html,
        Some(
            "pdf" | "doc" | "docx" | "epub" | "png" | "jpg" | "jpeg" | "gif" | "mp3" | "mp4"
            | "wav" | "zip",
        ) => ContentKind::Unsupported,
        _ => ContentKind::Text,
    }
}

fn looks_binary(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-") || bytes.iter().take(8192).any(|&b| b == 0)
}

/// Bytes to document text, categorizing every failure
fn decode_document(
    bytes: &[u8],
    kind: ContentKind,
    source_name: &str,
) -> Result<String, LoadError> {
    if kind == ContentKind::Unsupported || looks_binary(bytes) {
        return Err(LoadError::Unsupported {
            message: format!("{} is not a text document", source_name),
        });
    }

    let text = std::str::from_utf8(bytes).map_err(|e| LoadError::Parse {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })?;
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);

    let text = match kind {
        ContentKind::Html => cleanup_document(text),
        _ => text.to_string(),
    };

    if text.trim().is_empty() {
        return Err(LoadError::Empty {
            source_name: source_name.to_string(),
        });
    }
    Ok(text)
}

/// Read a document from disk
pub fn load_file(path: &Path) -> Result<String, LoadError> {
    let source_name = path.display().to_string();
    info!("Reading {}", source_name);
    let bytes = std::fs::read(path)?;
    decode_document(&bytes, content_kind_for_path(path), &source_name)
}

/// Read a document from standard input
pub fn load_stdin() -> Result<String, LoadError> {
    let mut bytes = Vec::new();
    std::io::stdin().read_to_end(&mut bytes)?;
    decode_document(&bytes, ContentKind::Text, "stdin")
}

/// Fetch a document over HTTP(S)
pub async fn fetch_url(url: &str) -> Result<String, LoadError> {
    info!("Fetching {}", url);
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(LoadError::Network {
            message: format!("{} returned {}", url, response.status()),
        });
    }

    let kind = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(content_kind_for_mime)
        .unwrap_or(ContentKind::Html);
    debug!("Content kind for {}: {:?}", url, kind);

    let bytes = response.bytes().await?;
    decode_document(&bytes, kind, url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cleanup_strips_markup_and_junk() {
        let html = r#"<html><head><style>p { color: red; }</style>
            <script>var x = "<p>nope</p>";</script></head>
            <body><nav>Home</nav>
            <p>The committee met on Tuesday &amp; voted.</p>
            <p>Subscribe to our newsletter</p>
            <p>It passed easily.<br>Nobody objected.</p>
            <footer>© 2024 Example News</footer></body></html>"#;

        let text = cleanup_document(html);
        assert_eq!(
            text,
            "The committee met on Tuesday & voted.\n\nIt passed easily.\n\nNobody objected."
        );
    }

    #[test]
    fn test_cleanup_keeps_transcript_lines_together() {
        let html = "<div>Jane Doe (00:01): Welcome back.</div>\
                    <div>Share</div>\
                    <div>Bob Roe (00:05): Glad to be here.</div>";
        let text = cleanup_document(html);
        assert_eq!(
            text,
            "Jane Doe (00:01): Welcome back.\nBob Roe (00:05): Glad to be here."
        );
    }

    #[test]
    fn test_content_kinds() {
        assert_eq!(content_kind_for_mime("text/html; charset=utf-8"), ContentKind::Html);
        assert_eq!(content_kind_for_mime("text/plain"), ContentKind::Text);
        assert_eq!(content_kind_for_mime("application/pdf"), ContentKind::Unsupported);
        assert_eq!(content_kind_for_path(Path::new("a/b.PDF")), ContentKind::Unsupported);
        assert_eq!(content_kind_for_path(Path::new("notes.txt")), ContentKind::Text);
        assert_eq!(content_kind_for_path(Path::new("page.htm")), ContentKind::Html);
    }

    #[test]
    fn test_load_plain_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        write!(file, "\u{FEFF}Hello there.\n\nSecond paragraph.").unwrap();

        let text = load_file(file.path()).unwrap();
        assert_eq!(text, "Hello there.\n\nSecond paragraph.");
    }

    #[test]
    fn test_load_file_failures_are_categorized() {
        let mut empty = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        write!(empty, "  \n\n\t").unwrap();
        assert!(matches!(load_file(empty.path()), Err(LoadError::Empty { .. })));

        let mut pdf = tempfile::NamedTempFile::with_suffix(".bin").unwrap();
        pdf.write_all(b"%PDF-1.7\n...").unwrap();
        assert!(matches!(load_file(pdf.path()), Err(LoadError::Unsupported { .. })));

        let mut latin1 = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        latin1.write_all(b"caf\xe9 au lait").unwrap();
        assert!(matches!(load_file(latin1.path()), Err(LoadError::Parse { .. })));

        let missing = Path::new("/definitely/not/here.txt");
        assert!(matches!(load_file(missing), Err(LoadError::Io(_))));
    }

    #[test]
    fn test_load_html_file_is_cleaned() {
        let mut file = tempfile::NamedTempFile::with_suffix(".html").unwrap();
        write!(file, "<p>Body text here.</p><p>Advertisement</p>").unwrap();
        assert_eq!(load_file(file.path()).unwrap(), "Body text here.");
    }
}
