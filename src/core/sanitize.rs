// src/core/sanitize.rs

/// Collapse sequences of whitespace into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Filesystem-safe stem: ASCII alphanumerics (lowercased) and `-` kept, everything else `_`.
/// Empty input falls back to `conversation`.
pub fn sanitize_filename(name: &str) -> String {
    if name.trim().is_empty() {
        return s!("conversation");
    }
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' { ch.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Collapse runs of 3+ newlines to a blank line and trim surrounding newlines.
pub fn collapse_blank_lines(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut newlines = 0usize;
    for ch in s.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines <= 2 { out.push('\n'); }
        } else {
            newlines = 0;
            out.push(ch);
        }
    }
    out.trim_matches('\n').to_string()
}

/// Drop trailing spaces/tabs on every line (keeps Markdown hard breaks: two spaces).
pub fn trim_line_ends(s: &str) -> String {
    s.split('\n')
        .map(|line| {
            let trimmed = line.trim_end_matches([' ', '\t']);
            if line.ends_with("  ") && !trimmed.is_empty() {
                join!(trimmed, "  ")
            } else {
                s!(trimmed)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_collapse() {
        assert_eq!(normalize_ws("  a \n\t b  "), "a b");
        assert_eq!(normalize_ws("\u{a0}x\u{a0}"), "x");
        assert_eq!(normalize_ws("   "), "");
    }

    #[test]
    fn filename_stems() {
        assert_eq!(sanitize_filename("Minha Conversa: v2"), "minha_conversa__v2");
        assert_eq!(sanitize_filename(""), "conversation");
    }

    #[test]
    fn blank_line_collapse() {
        assert_eq!(collapse_blank_lines("\n\na\n\n\n\nb\n"), "a\n\nb");
    }

    #[test]
    fn keeps_hard_breaks() {
        assert_eq!(trim_line_ends("a  \nb \n  "), "a  \nb\n");
    }
}
