// src/output/filter.rs

//! Noise filter applied to every line before it is rendered.

/// Trim trailing line-ending characters and decide whether the line is worth
/// showing.
///
/// Returns `None` for:
/// - lines that are empty once `\r` / `\n` are trimmed,
/// - `tail`'s per-file header banner, `==> <file> <==`.
pub fn clean_line(raw: &str) -> Option<&str> {
    let content = raw.trim_end_matches(['\r', '\n']);
    if content.is_empty() || is_file_banner(content) {
        return None;
    }
    Some(content)
}

fn is_file_banner(content: &str) -> bool {
    content.starts_with("==>") && content.ends_with("<==")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_tail_file_banner() {
        assert_eq!(clean_line("==> /var/log/app.log <=="), None);
        assert_eq!(clean_line("==> /var/log/app.log <==\r\n"), None);
    }

    #[test]
    fn drops_blank_lines() {
        assert_eq!(clean_line(""), None);
        assert_eq!(clean_line("\r"), None);
        assert_eq!(clean_line("\r\n\r\n"), None);
    }

    #[test]
    fn keeps_content_and_trims_line_endings() {
        assert_eq!(
            clean_line("2024-01-01 ERROR boom\r\n"),
            Some("2024-01-01 ERROR boom")
        );
        // Only trailing endings are trimmed; leading whitespace is content.
        assert_eq!(clean_line("  indented\r"), Some("  indented"));
    }

    #[test]
    fn half_banners_are_content() {
        assert_eq!(clean_line("==> starting"), Some("==> starting"));
        assert_eq!(clean_line("done <=="), Some("done <=="));
    }
}
