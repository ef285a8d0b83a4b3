use tracing::debug;

/// Perform Stage 0: text normalization
///
/// Applied in order:
/// 1. `\r\n` and lone `\r` become `\n`
/// 2. Non-breaking spaces become ordinary spaces
/// 3. Zero-width characters (U+200B..U+200D, U+FEFF) are removed
/// 4. Full-width `（）：` map to ASCII `():`
///
/// Total and idempotent.
pub fn normalize(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let normalized: String = unified
        .chars()
        .filter_map(|c| match c {
            '\u{00A0}' => Some(' '),
            '\u{200B}'..='\u{200D}' | '\u{FEFF}' => None,
            '（' => Some('('),
            '）' => Some(')'),
            '：' => Some(':'),
            other => Some(other),
        })
        .collect();

    debug!(
        "Stage 0: normalized {} bytes into {} bytes",
        raw.len(),
        normalized.len()
    );

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_endings() {
        assert_eq!(normalize("a\r\nb\rc\nd"), "a\nb\nc\nd");
        // "\r\r\n" is a lone CR followed by CRLF
        assert_eq!(normalize("a\r\r\nb"), "a\n\nb");
    }

    #[test]
    fn test_spaces_and_zero_width() {
        assert_eq!(normalize("a\u{00A0}b"), "a b");
        assert_eq!(normalize("\u{FEFF}wo\u{200B}rd\u{200D}"), "word");
    }

    #[test]
    fn test_full_width_punctuation() {
        assert_eq!(normalize("Jane（01:23）： hi"), "Jane(01:23): hi");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "plain text",
            "x\r\n\r\ny\u{00A0}\u{200C}z（）：",
            "\r\r\r\n\n",
            "Speaker 1 (00:01):\u{FEFF} hi",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once);
        }
    }
}
