//! Plain-text extraction for meta descriptions.

/// Entities decoded after tag stripping. `&amp;` goes last so that
/// `&amp;lt;` yields `&lt;` rather than `<`.
const ENTITIES: [(&str, &str); 7] = [
    ("&nbsp;", " "),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

/// Remove markup from an HTML fragment.
/// - Drops `<script>` and `<style>` blocks entirely (case-insensitive)
/// - Strips other tags like `<p>`, `<br>`
/// - Decodes common entities, then removes any `<`/`>` left over
/// - Collapses whitespace runs and trims the ends
pub fn strip_html(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut buf = input.to_string();
    for tag in ["script", "style"] {
        let open = format!("<{}", tag);
        let close = format!("</{}>", tag);
        loop {
            // ASCII lowercasing keeps byte offsets aligned with `buf`.
            let lower = buf.to_ascii_lowercase();
            let Some(start) = lower.find(&open) else { break };
            match lower[start..].find(&close) {
                Some(end_rel) => buf.replace_range(start..start + end_rel + close.len(), " "),
                None => {
                    buf.truncate(start);
                    break;
                }
            }
        }
    }

    let mut out = String::with_capacity(buf.len());
    let mut in_tag = false;
    let mut chars = buf.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            // Only `<a`, `</`, `<!` open a tag; a bare `<` is plain text.
            '<' if !in_tag => {
                in_tag = chars
                    .peek()
                    .is_some_and(|next| next.is_ascii_alphabetic() || matches!(next, '/' | '!'));
            }
            '>' if in_tag => {
                in_tag = false;
                // Tags separate words: "<p>a</p><p>b</p>" reads "a b".
                out.push(' ');
            }
            '>' => {}
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    let mut decoded = out;
    for (entity, replacement) in ENTITIES {
        decoded = decoded.replace(entity, replacement);
    }
    decoded.retain(|c| c != '<' && c != '>');

    collapse_whitespace(&decoded)
}

/// Collapse whitespace runs into single spaces and trim.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `limit` characters without splitting a code point.
pub fn truncate_chars(input: &str, limit: usize) -> String {
    match input.char_indices().nth(limit) {
        Some((byte_idx, _)) => input[..byte_idx].trim_end().to_string(),
        None => input.to_string(),
    }
}

/// Strip, collapse and truncate a description fragment.
pub fn plain_description(html: &str, limit: usize) -> String {
    truncate_chars(&strip_html(html), limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_basic_markup() {
        assert_eq!(strip_html("<p>نص</p>"), "نص");
        assert_eq!(strip_html("<p>one</p><p>two</p>"), "one two");
        assert_eq!(strip_html("a<br/>b"), "a b");
    }

    #[test]
    fn test_strip_script_and_style() {
        let html = "<style>p{color:red}</style><p>keep</p><SCRIPT>alert(1)</SCRIPT>";
        assert_eq!(strip_html(html), "keep");
        assert_eq!(strip_html("text<script>never closed"), "text");
    }

    #[test]
    fn test_entities_never_reintroduce_brackets() {
        let out = strip_html("<p>5 &lt; 6 &amp;&amp; 7 &gt; 2&nbsp;ok</p>");
        assert_eq!(out, "5 6 && 7 2 ok");
        assert!(!out.contains('<') && !out.contains('>'));
    }

    #[test]
    fn test_stray_brackets_removed() {
        let out = strip_html("a > b");
        assert_eq!(out, "a b");
    }

    #[test]
    fn test_bare_less_than_is_text() {
        assert_eq!(strip_html("a < b and c > d"), "a b and c d");
        assert_eq!(strip_html("<p>x<3 y</p>"), "x3 y");
        assert_eq!(strip_html("<!-- note -->kept"), "kept");
    }

    #[test]
    fn test_truncate_counts_characters() {
        let arabic = "م".repeat(250);
        let out = truncate_chars(&arabic, 200);
        assert_eq!(out.chars().count(), 200);

        assert_eq!(truncate_chars("short", 200), "short");
        assert_eq!(truncate_chars("ab cd", 3), "ab");
    }

    #[test]
    fn test_plain_description_bounds() {
        let html = format!("<div>{}</div>", "word ".repeat(100));
        let out = plain_description(&html, 200);
        assert!(out.chars().count() <= 200);
        assert!(!out.contains('<'));
    }
}
