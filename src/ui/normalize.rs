#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Rewrites every `\r\n`, lone `\r` and `\n` in captured process output to the
/// host line separator. Other bytes pass through; sequences that are not valid
/// UTF-8 render as U+FFFD.
pub fn normalize_output(raw: &[u8]) -> String {
    let mut out = Vec::with_capacity(raw.len());
    let mut bytes = raw.iter().copied().peekable();
    while let Some(byte) = bytes.next() {
        match byte {
            b'\r' => {
                if bytes.peek() == Some(&b'\n') {
                    bytes.next();
                }
                out.extend_from_slice(LINE_SEPARATOR.as_bytes());
            }
            b'\n' => out.extend_from_slice(LINE_SEPARATOR.as_bytes()),
            other => out.push(other),
        }
    }
    match String::from_utf8(out) {
        Ok(text) => text,
        Err(error) => {
            tracing::debug!(error = %error.utf8_error(), "replacing undecodable process output");
            String::from_utf8_lossy(error.as_bytes()).into_owned()
        }
    }
}

pub fn normalize_text(text: &str) -> String {
    normalize_output(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_mixed_line_endings() {
        let normalized = normalize_output(b"line1\r\nline2\rline3\n");
        assert_eq!(
            normalized,
            format!("line1{LINE_SEPARATOR}line2{LINE_SEPARATOR}line3{LINE_SEPARATOR}")
        );
        assert_eq!(normalized.lines().collect::<Vec<&str>>(), ["line1", "line2", "line3"]);
    }

    #[test]
    fn leaves_other_characters_alone() {
        assert_eq!(normalize_output("tab\there ünï \u{1b}[0m".as_bytes()), "tab\there ünï \u{1b}[0m");
        assert_eq!(normalize_output(b""), "");
    }

    #[test]
    fn keeps_consecutive_breaks_distinct() {
        assert_eq!(
            normalize_text("a\n\r\nb\r\r"),
            format!("a{0}{0}b{0}{0}", LINE_SEPARATOR)
        );
    }

    #[test]
    fn undecodable_bytes_are_replaced_not_dropped() {
        assert_eq!(
            normalize_output(b"bad file caf\xe9.c\r\nline 2"),
            format!("bad file caf\u{FFFD}.c{LINE_SEPARATOR}line 2")
        );
    }
}
